use crate::common::{Contact, RecordingView, contact};
use async_list_adapter::{
    DiffOp, LaneError, LaneEvent, ListAdapterBuilder, Outcome, RequestKind, update_channel,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    // --- Acknowledged channel delivery ---

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_channel_delivery_to_view_task() {
        let (dispatcher, mut updates) = update_channel::<Contact>();
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .dispatcher(dispatcher)
            .build()
            .unwrap();

        let ui = tokio::spawn(async move {
            let mut view = RecordingView::default();
            while let Some(pending) = updates.recv().await {
                pending.apply_to(&mut view);
                if view.scripts.len() == 3 {
                    break;
                }
            }
            view
        });

        adapter.add(vec![contact(1, "a"), contact(2, "b")]).unwrap();
        adapter.add(vec![contact(2, "b2")]).unwrap();
        adapter.remove(contact(1, "")).unwrap();
        adapter.flush().await.unwrap();

        let view = ui.await.unwrap();
        assert_eq!(view.rows, adapter.items().to_vec());
        assert_eq!(
            view.scripts,
            vec![
                vec![DiffOp::Inserted { position: 0, count: 2 }],
                vec![DiffOp::Changed { position: 1, count: 1 }],
                vec![DiffOp::Removed { position: 0, count: 1 }],
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_after_waits_for_acknowledgment() {
        let (dispatcher, mut updates) = update_channel::<Contact>();
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .dispatcher(dispatcher)
            .build()
            .unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        let ui_log = Arc::clone(&log);
        let ui = tokio::spawn(async move {
            let pending = updates.recv().await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            ui_log.lock().unwrap().push("delivered");
            pending.acknowledge();
        });

        adapter.add(vec![contact(1, "a")]).unwrap();
        let callback_log = Arc::clone(&log);
        adapter
            .run_after(move || async move {
                callback_log.lock().unwrap().push("callback");
            })
            .unwrap();
        adapter.flush().await.unwrap();
        ui.await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["delivered", "callback"]);
    }

    #[tokio::test]
    async fn test_dropped_receiver_still_publishes() {
        let (dispatcher, updates) = update_channel::<Contact>();
        drop(updates);
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .dispatcher(dispatcher)
            .build()
            .unwrap();

        let receipt = adapter.add_and_wait(vec![contact(1, "a")]).await.unwrap();
        let summary = receipt.outcome.summary().copied().unwrap();
        assert!(!summary.delivered);
        assert_eq!(summary.len, 1);
        assert_eq!(adapter.get(0), Some(contact(1, "a")));
    }

    // --- Listeners ---

    #[tokio::test]
    async fn test_listener_sees_every_request() {
        let events: Arc<Mutex<Vec<LaneEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .listener(move |event| sink.lock().unwrap().push(event.clone()))
            .build()
            .unwrap();

        adapter.add(vec![contact(1, "a")]).unwrap();
        adapter.remove(contact(1, "")).unwrap();
        adapter.clear().unwrap();
        adapter.flush().await.unwrap();

        let events = events.lock().unwrap();
        let kinds: Vec<RequestKind> = events.iter().map(|event| event.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RequestKind::Insert,
                RequestKind::Remove,
                RequestKind::Clear,
                RequestKind::RunAfter,
            ]
        );
        assert!(events.iter().all(|event| event.outcome.is_success()));
        assert_eq!(events[3].outcome, Outcome::Barrier);
    }

    // --- Cancellation ---

    #[tokio::test]
    async fn test_enqueue_after_cancel_is_rejected() {
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item().build().unwrap();
        adapter.add(vec![contact(1, "a")]).unwrap();
        adapter.flush().await.unwrap();

        adapter.cancel();
        assert!(adapter.is_cancelled());
        assert_eq!(adapter.add(vec![contact(2, "b")]), Err(LaneError::Closed));
        assert_eq!(adapter.clear(), Err(LaneError::Closed));
        assert_eq!(adapter.flush().await, Err(LaneError::Closed));
        assert_eq!(adapter.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_drops_pending_requests() {
        let (dispatcher, _updates) = update_channel::<Contact>();
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .dispatcher(dispatcher)
            .build()
            .unwrap();

        adapter.add(vec![contact(1, "a")]).unwrap();
        while adapter.is_empty() {
            tokio::task::yield_now().await;
        }

        let waiter = {
            let adapter = adapter.clone();
            tokio::spawn(async move { adapter.add_and_wait(vec![contact(2, "b")]).await })
        };
        while adapter.lane().pending() == 0 {
            tokio::task::yield_now().await;
        }

        adapter.cancel();
        assert_eq!(waiter.await.unwrap().err(), Some(LaneError::Closed));
        assert_eq!(&*adapter.items(), &[contact(1, "a")]);
    }
}
