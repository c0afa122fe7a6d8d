use async_list_adapter::{DiffItem, DiffOp, ListUpdateCallback, ListView};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: u32,
    pub name: String,
}

pub fn contact(id: u32, name: &str) -> Contact {
    Contact {
        id,
        name: name.to_string(),
    }
}

impl DiffItem for Contact {
    fn same_identity(&self, other: &Self) -> bool {
        self.id == other.id
    }

    fn same_content(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// View that records every script and replays it onto its own rows.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub rows: Vec<Contact>,
    pub scripts: Vec<Vec<DiffOp>>,
    target: Vec<Contact>,
}

impl RecordingView {
    fn record(&mut self, op: DiffOp) {
        if let Some(script) = self.scripts.last_mut() {
            script.push(op);
        }
    }

    pub fn last_script(&self) -> &[DiffOp] {
        self.scripts.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ListUpdateCallback for RecordingView {
    fn on_changed(&mut self, position: usize, count: usize) {
        self.record(DiffOp::Changed { position, count });
        self.rows[position..position + count]
            .clone_from_slice(&self.target[position..position + count]);
    }

    fn on_inserted(&mut self, position: usize, count: usize) {
        self.record(DiffOp::Inserted { position, count });
        let inserted = self.target[position..position + count].to_vec();
        self.rows.splice(position..position, inserted);
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        self.record(DiffOp::Moved { from, to });
        let row = self.rows.remove(from);
        self.rows.insert(to, row);
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        self.record(DiffOp::Removed { position, count });
        self.rows.drain(position..position + count);
    }
}

impl ListView<Contact> for RecordingView {
    fn on_current_list(&mut self, items: &Arc<[Contact]>) {
        self.target = items.to_vec();
        self.scripts.push(Vec::new());
    }
}
