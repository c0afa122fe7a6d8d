/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! List diff computation.
//!
//! The algorithm runs in three passes:
//!
//! 1. Match the longest common subsequence of `old` and `new` under the
//!    identity predicate. Common prefix and suffix are matched directly; the
//!    rest goes through Myers' divide-and-conquer diff, which needs
//!    `O((n + m) * d)` time and linear space for `d` edits.
//! 2. Optionally pair leftover old and new items that share an identity;
//!    those become moves instead of a remove plus an insert.
//! 3. Walk the new list front to back over a simulated copy of the old one,
//!    emitting removals, moves, inserts and content changes so that every
//!    position before the cursor is already final.
//!
//! Because of the last pass, `Inserted { position, count }` and
//! `Changed { position, count }` always cover `new[position..position + count]`.

use super::script::{DiffOp, DiffScript};
use crate::item::ItemCallback;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut, Range};

/// Diff engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Report re-ordered items as [`DiffOp::Moved`] instead of remove + insert.
    pub detect_moves: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self { detect_moves: true }
    }
}

/// Computes the edit script that turns `old` into `new`.
///
/// This is a pure function of its inputs: the same lists and predicates
/// always produce the same script.
///
/// # Examples
///
/// ```
/// use async_list_adapter::{calculate_diff, DiffConfig, DiffOp, ItemCallback};
///
/// let callback = ItemCallback::<(u32, &str)>::new(|a, b| a.0 == b.0, |a, b| a.1 == b.1);
/// let old = [(1, "a"), (2, "b")];
/// let new = [(1, "a2"), (2, "b")];
///
/// let script = calculate_diff(&old, &new, &callback, DiffConfig::default());
/// assert_eq!(script.ops(), &[DiffOp::Changed { position: 0, count: 1 }]);
/// ```
#[must_use]
pub fn calculate_diff<T>(
    old: &[T],
    new: &[T],
    callback: &ItemCallback<T>,
    config: DiffConfig,
) -> DiffScript {
    let mut source = match_common(old, new, callback);

    let mut claimed = vec![false; old.len()];
    for old_index in source.iter().flatten() {
        claimed[*old_index] = true;
    }

    if config.detect_moves {
        pair_moves(old, new, callback, &mut source, &mut claimed);
    }

    emit_script(old, new, callback, &source, &claimed)
}

/// Returns, for every position of `new`, the matched position in `old`.
fn match_common<T>(old: &[T], new: &[T], callback: &ItemCallback<T>) -> Vec<Option<usize>> {
    let mut source = vec![None; new.len()];
    if old.is_empty() || new.is_empty() {
        return source;
    }

    let mut myers = Myers::new(old, new, callback);
    myers.conquer(0..old.len(), 0..new.len());
    for (old_index, new_index) in myers.pairs {
        source[new_index] = Some(old_index);
    }
    source
}

/// Furthest-reaching x per diagonal `k`, indexed from `-max_d` to `max_d`.
struct Diagonals {
    offset: isize,
    reach: Vec<usize>,
}

impl Diagonals {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            reach: vec![0; 2 * max_d + 2],
        }
    }
}

impl Index<isize> for Diagonals {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.reach[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Diagonals {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.reach[(k + self.offset) as usize]
    }
}

fn max_d(n: usize, m: usize) -> usize {
    (n + m).div_ceil(2) + 1
}

/// Linear-space Myers diff; collects matched `(old, new)` pairs in
/// ascending order.
struct Myers<'a, T> {
    old: &'a [T],
    new: &'a [T],
    callback: &'a ItemCallback<T>,
    forward: Diagonals,
    backward: Diagonals,
    pairs: Vec<(usize, usize)>,
}

impl<'a, T> Myers<'a, T> {
    fn new(old: &'a [T], new: &'a [T], callback: &'a ItemCallback<T>) -> Self {
        let max_d = max_d(old.len(), new.len());
        Self {
            old,
            new,
            callback,
            forward: Diagonals::new(max_d),
            backward: Diagonals::new(max_d),
            pairs: Vec::new(),
        }
    }

    fn same(&self, old_index: usize, new_index: usize) -> bool {
        self.callback
            .same_identity(&self.old[old_index], &self.new[new_index])
    }

    fn prefix_len(&self, old: Range<usize>, new: Range<usize>) -> usize {
        old.zip(new).take_while(|&(i, j)| self.same(i, j)).count()
    }

    fn suffix_len(&self, old: Range<usize>, new: Range<usize>) -> usize {
        old.rev()
            .zip(new.rev())
            .take_while(|&(i, j)| self.same(i, j))
            .count()
    }

    fn conquer(&mut self, mut old: Range<usize>, mut new: Range<usize>) {
        let prefix = self.prefix_len(old.clone(), new.clone());
        self.pairs
            .extend((0..prefix).map(|offset| (old.start + offset, new.start + offset)));
        old.start += prefix;
        new.start += prefix;

        let suffix = self.suffix_len(old.clone(), new.clone());
        old.end -= suffix;
        new.end -= suffix;

        if !old.is_empty() && !new.is_empty() {
            if let Some((x, y)) = self.middle_snake(old.clone(), new.clone()) {
                self.conquer(old.start..x, new.start..y);
                self.conquer(x..old.end, y..new.end);
            }
        }

        self.pairs
            .extend((0..suffix).map(|offset| (old.end + offset, new.end + offset)));
    }

    /// Finds where a shortest edit path crosses the middle of the edit graph
    /// over `old x new`. Returns the absolute start of that snake.
    fn middle_snake(&mut self, old: Range<usize>, new: Range<usize>) -> Option<(usize, usize)> {
        let n = old.len();
        let m = new.len();
        let delta = n as isize - m as isize;
        let odd = delta & 1 == 1;
        self.forward[1] = 0;
        self.backward[1] = 0;

        for d in 0..max_d(n, m) as isize {
            for k in (-d..=d).rev().step_by(2) {
                let mut x = if k == -d || (k != d && self.forward[k - 1] < self.forward[k + 1]) {
                    self.forward[k + 1]
                } else {
                    self.forward[k - 1] + 1
                };
                let y = (x as isize - k) as usize;
                let (x0, y0) = (x, y);
                if x < n && y < m {
                    x += self.prefix_len(old.start + x..old.end, new.start + y..new.end);
                }
                self.forward[k] = x;
                if odd
                    && (k - delta).abs() < d
                    && self.forward[k] + self.backward[-(k - delta)] >= n
                {
                    return Some((old.start + x0, new.start + y0));
                }
            }

            for k in (-d..=d).rev().step_by(2) {
                let mut x = if k == -d || (k != d && self.backward[k - 1] < self.backward[k + 1])
                {
                    self.backward[k + 1]
                } else {
                    self.backward[k - 1] + 1
                };
                let mut y = (x as isize - k) as usize;
                if x < n && y < m {
                    let snake = self.suffix_len(
                        old.start..old.start + n - x,
                        new.start..new.start + m - y,
                    );
                    x += snake;
                    y += snake;
                }
                self.backward[k] = x;
                if !odd
                    && (k - delta).abs() <= d
                    && self.backward[k] + self.forward[-(k - delta)] >= n
                {
                    return Some((old.start + n - x, new.start + m - y));
                }
            }
        }
        None
    }
}

/// Pairs each unmatched new item with the first unclaimed old item of the
/// same identity.
///
/// Only identity predicates are available, so candidates cannot be hashed.
/// The scan runs over the unclaimed old items alone, which the common
/// subsequence pass has already reduced to the edit distance.
fn pair_moves<T>(
    old: &[T],
    new: &[T],
    callback: &ItemCallback<T>,
    source: &mut [Option<usize>],
    claimed: &mut [bool],
) {
    let mut candidates: Vec<usize> = (0..old.len()).filter(|&i| !claimed[i]).collect();
    for (new_index, slot) in source.iter_mut().enumerate() {
        if slot.is_some() || candidates.is_empty() {
            continue;
        }
        let found = candidates
            .iter()
            .position(|&old_index| callback.same_identity(&old[old_index], &new[new_index]));
        if let Some(position) = found {
            let old_index = candidates.remove(position);
            claimed[old_index] = true;
            *slot = Some(old_index);
        }
    }
}

/// Old items still sitting past the cursor of the simulated list, kept in a
/// Fenwick tree so an item's current position is a prefix count.
struct Remaining {
    tree: Vec<usize>,
    live: Vec<bool>,
    head: usize,
    len: usize,
}

impl Remaining {
    fn new(len: usize) -> Self {
        let mut tree = vec![0; len + 1];
        for i in 1..=len {
            tree[i] += 1;
            let parent = i + (i & i.wrapping_neg());
            if parent <= len {
                tree[parent] += tree[i];
            }
        }
        Self {
            tree,
            live: vec![true; len],
            head: 0,
            len,
        }
    }

    /// Number of live old items before `index`.
    fn before(&self, index: usize) -> usize {
        let mut i = index;
        let mut count = 0;
        while i > 0 {
            count += self.tree[i];
            i &= i - 1;
        }
        count
    }

    fn take(&mut self, index: usize) {
        self.live[index] = false;
        self.len -= 1;
        let mut i = index + 1;
        while i < self.tree.len() {
            self.tree[i] -= 1;
            i += i & i.wrapping_neg();
        }
    }

    /// Lowest live old index.
    fn first(&mut self) -> Option<usize> {
        while self.head < self.live.len() && !self.live[self.head] {
            self.head += 1;
        }
        (self.head < self.live.len()).then_some(self.head)
    }
}

fn emit_script<T>(
    old: &[T],
    new: &[T],
    callback: &ItemCallback<T>,
    source: &[Option<usize>],
    claimed: &[bool],
) -> DiffScript {
    let mut script = DiffScript::new();
    let mut remaining = Remaining::new(old.len());

    for (cursor, matched) in source.iter().enumerate() {
        let mut removed = 0;
        while let Some(old_index) = remaining.first() {
            if claimed[old_index] {
                break;
            }
            remaining.take(old_index);
            removed += 1;
        }
        if removed > 0 {
            script.push(DiffOp::Removed {
                position: cursor,
                count: removed,
            });
        }

        match *matched {
            Some(old_index) => {
                let from = cursor + remaining.before(old_index);
                remaining.take(old_index);
                if from != cursor {
                    script.push(DiffOp::Moved { from, to: cursor });
                }
                if !callback.same_content(&old[old_index], &new[cursor]) {
                    script.push(DiffOp::Changed {
                        position: cursor,
                        count: 1,
                    });
                }
            }
            None => script.push(DiffOp::Inserted {
                position: cursor,
                count: 1,
            }),
        }
    }

    if remaining.len > 0 {
        script.push(DiffOp::Removed {
            position: new.len(),
            count: remaining.len,
        });
    }

    script
}
