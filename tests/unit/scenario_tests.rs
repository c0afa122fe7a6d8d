use crate::common::{Contact, RecordingView, contact};
use async_list_adapter::{
    DiffOp, HookError, ListAdapter, ListAdapterBuilder, Outcome, StepError, StepSummary,
};
use std::sync::{Arc, Mutex};

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter_with_view() -> (ListAdapter<Contact>, Arc<Mutex<RecordingView>>) {
        let view = Arc::new(Mutex::new(RecordingView::default()));
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .view(Arc::clone(&view))
            .build()
            .unwrap();
        (adapter, view)
    }

    // --- Reference scenario ---

    #[tokio::test]
    async fn test_add_replace_remove_clear_scenario() {
        let (adapter, view) = adapter_with_view();

        adapter
            .add_and_wait(vec![contact(1, "a"), contact(2, "b")])
            .await
            .unwrap();
        assert_eq!(&*adapter.items(), &[contact(1, "a"), contact(2, "b")]);
        assert_eq!(
            view.lock().unwrap().last_script(),
            &[DiffOp::Inserted { position: 0, count: 2 }]
        );

        adapter.add_and_wait(vec![contact(1, "a2")]).await.unwrap();
        assert_eq!(&*adapter.items(), &[contact(1, "a2"), contact(2, "b")]);
        assert_eq!(
            view.lock().unwrap().last_script(),
            &[DiffOp::Changed { position: 0, count: 1 }]
        );

        adapter.remove_and_wait(contact(2, "")).await.unwrap();
        assert_eq!(&*adapter.items(), &[contact(1, "a2")]);
        assert_eq!(
            view.lock().unwrap().last_script(),
            &[DiffOp::Removed { position: 1, count: 1 }]
        );

        adapter.clear_and_wait().await.unwrap();
        assert!(adapter.is_empty());
        assert_eq!(
            view.lock().unwrap().last_script(),
            &[DiffOp::Removed { position: 0, count: 1 }]
        );

        let view = view.lock().unwrap();
        assert_eq!(view.scripts.len(), 4);
        assert!(view.rows.is_empty());
    }

    #[tokio::test]
    async fn test_view_rows_track_published_list() {
        let (adapter, view) = adapter_with_view();

        adapter.add(vec![contact(3, "c"), contact(1, "a")]).unwrap();
        adapter.add(vec![contact(2, "b"), contact(3, "c2")]).unwrap();
        adapter.remove(contact(1, "")).unwrap();
        adapter.add(vec![contact(4, "d")]).unwrap();
        adapter.flush().await.unwrap();

        assert_eq!(view.lock().unwrap().rows, adapter.items().to_vec());
        assert_eq!(
            &*adapter.items(),
            &[contact(3, "c2"), contact(2, "b"), contact(4, "d")]
        );
    }

    // --- Merge rules ---

    #[tokio::test]
    async fn test_remove_then_add_leaves_single_instance() {
        let (adapter, _view) = adapter_with_view();

        adapter.add(vec![contact(1, "old"), contact(2, "b")]).unwrap();
        adapter.remove(contact(1, "old")).unwrap();
        adapter.add(vec![contact(1, "new")]).unwrap();
        adapter.flush().await.unwrap();

        let items = adapter.items();
        let ones: Vec<&Contact> = items.iter().filter(|c| c.id == 1).collect();
        assert_eq!(ones, vec![&contact(1, "new")]);
        assert_eq!(adapter.len(), 2);
    }

    #[tokio::test]
    async fn test_first_identity_match_wins() {
        let (adapter, _view) = adapter_with_view();

        adapter.add(vec![contact(1, "a")]).unwrap();
        adapter
            .add(vec![contact(1, "x"), contact(1, "y"), contact(2, "b")])
            .unwrap();
        adapter.flush().await.unwrap();

        assert_eq!(&*adapter.items(), &[contact(1, "x"), contact(2, "b")]);
    }

    #[tokio::test]
    async fn test_insert_into_empty_keeps_duplicates() {
        let (adapter, _view) = adapter_with_view();

        adapter.add(vec![contact(1, "x"), contact(1, "y")]).unwrap();
        adapter.flush().await.unwrap();
        assert_eq!(adapter.len(), 2);

        adapter.remove(contact(1, "")).unwrap();
        adapter.flush().await.unwrap();
        assert!(adapter.is_empty());
    }

    #[tokio::test]
    async fn test_prefer_existing_reports_no_change() {
        let view = Arc::new(Mutex::new(RecordingView::default()));
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .prefer_existing()
            .view(Arc::clone(&view))
            .build()
            .unwrap();

        adapter.add(vec![contact(1, "a")]).unwrap();
        adapter.add(vec![contact(1, "ignored"), contact(2, "b")]).unwrap();
        adapter.flush().await.unwrap();

        assert_eq!(&*adapter.items(), &[contact(1, "a"), contact(2, "b")]);
        assert_eq!(
            view.lock().unwrap().last_script(),
            &[DiffOp::Inserted { position: 1, count: 1 }]
        );
    }

    #[tokio::test]
    async fn test_comparator_sorts_after_every_insert() {
        let view = Arc::new(Mutex::new(RecordingView::default()));
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .comparator(|a: &Contact, b: &Contact| a.name.cmp(&b.name))
            .view(Arc::clone(&view))
            .build()
            .unwrap();

        adapter
            .add(vec![contact(1, "carol"), contact(2, "alice"), contact(3, "bob")])
            .unwrap();
        adapter.add(vec![contact(3, "zed")]).unwrap();
        adapter.flush().await.unwrap();

        let names: Vec<String> = adapter.items().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["alice", "carol", "zed"]);
        assert_eq!(view.lock().unwrap().rows, adapter.items().to_vec());
    }

    // --- Failure isolation ---

    #[tokio::test]
    async fn test_failed_hook_keeps_state_and_lane_continues() {
        let view = Arc::new(Mutex::new(RecordingView::default()));
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .post_process(|items: Vec<Contact>| async move {
                if items.iter().any(|c| c.name == "bad") {
                    Err(HookError::from("bad contact"))
                } else {
                    Ok(items)
                }
            })
            .view(Arc::clone(&view))
            .build()
            .unwrap();

        adapter.add(vec![contact(1, "a")]).unwrap();
        let receipt = adapter.add_and_wait(vec![contact(2, "bad")]).await.unwrap();
        assert_eq!(
            receipt.outcome,
            Outcome::Failed {
                error: StepError::Hook("bad contact".to_string())
            }
        );
        assert_eq!(&*adapter.items(), &[contact(1, "a")]);
        assert_eq!(view.lock().unwrap().scripts.len(), 1);

        let receipt = adapter.clear_and_wait().await.unwrap();
        assert_eq!(
            receipt.outcome,
            Outcome::Applied(StepSummary {
                previous_len: 1,
                len: 0,
                edits: 1,
                delivered: true,
            })
        );
        assert_eq!(view.lock().unwrap().scripts.len(), 2);
    }

    #[tokio::test]
    async fn test_panicking_comparator_is_contained() {
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .comparator(|a: &Contact, b: &Contact| {
                if a.name == "boom" || b.name == "boom" {
                    panic!("comparator exploded");
                }
                a.id.cmp(&b.id)
            })
            .build()
            .unwrap();

        adapter.add(vec![contact(2, "b"), contact(1, "a")]).unwrap();
        let receipt = adapter.add_and_wait(vec![contact(3, "boom")]).await.unwrap();
        assert!(matches!(
            receipt.outcome,
            Outcome::Failed {
                error: StepError::Panicked { .. }
            }
        ));
        assert_eq!(&*adapter.items(), &[contact(1, "a"), contact(2, "b")]);

        adapter.add(vec![contact(0, "z")]).unwrap();
        adapter.flush().await.unwrap();
        assert_eq!(adapter.get(0), Some(contact(0, "z")));
    }
}
