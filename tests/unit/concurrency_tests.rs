use crate::common::{Contact, RecordingView, contact};
use async_list_adapter::{ListAdapter, ListAdapterBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds an adapter whose post-process hook sleeps and records how many
    /// hooks ran at the same time.
    fn tracked_adapter(max_active: Arc<AtomicUsize>) -> ListAdapter<Contact> {
        let active = Arc::new(AtomicUsize::new(0));
        ListAdapterBuilder::<Contact>::for_diff_item()
            .comparator(|a: &Contact, b: &Contact| a.id.cmp(&b.id))
            .post_process(move |items: Vec<Contact>| {
                let active = Arc::clone(&active);
                let max_active = Arc::clone(&max_active);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_active.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(items)
                }
            })
            .build()
            .unwrap()
    }

    // --- Concurrent producers ---

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_lose_nothing() {
        let max_active = Arc::new(AtomicUsize::new(0));
        let adapter = tracked_adapter(Arc::clone(&max_active));

        let mut producers = Vec::new();
        for id in 0..32u32 {
            let adapter = adapter.clone();
            producers.push(tokio::spawn(async move {
                adapter.add(vec![contact(id, "x")]).unwrap();
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }
        adapter.flush().await.unwrap();

        let ids: Vec<u32> = adapter.items().iter().map(|c| c.id).collect();
        assert_eq!(ids, (0..32).collect::<Vec<_>>());
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_producers_on_plain_threads() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .build()
            .unwrap();
        let view = Arc::new(Mutex::new(RecordingView::default()));
        let adapter = ListAdapterBuilder::<Contact>::for_diff_item()
            .comparator(|a: &Contact, b: &Contact| a.id.cmp(&b.id))
            .view(Arc::clone(&view))
            .runtime(runtime.handle().clone())
            .build()
            .unwrap();

        let threads: Vec<_> = (0..4u32)
            .map(|thread| {
                let adapter = adapter.clone();
                std::thread::spawn(move || {
                    for i in 0..10u32 {
                        adapter.add(vec![contact(thread * 10 + i, "t")]).unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        runtime.block_on(adapter.flush()).unwrap();

        assert_eq!(adapter.len(), 40);
        assert_eq!(view.lock().unwrap().rows, adapter.items().to_vec());
    }

    // --- Ordering ---

    #[tokio::test]
    async fn test_final_state_matches_sequential_application() {
        let adapter = ListAdapter::<Contact>::new().unwrap();

        adapter.add(vec![contact(1, "a"), contact(2, "b"), contact(3, "c")]).unwrap();
        adapter.remove(contact(2, "")).unwrap();
        adapter.add(vec![contact(4, "d"), contact(1, "a2")]).unwrap();
        adapter.clear().unwrap();
        adapter.add(vec![contact(5, "e")]).unwrap();
        adapter.add(vec![contact(6, "f"), contact(5, "e2")]).unwrap();
        adapter.remove(contact(6, "")).unwrap();
        adapter.flush().await.unwrap();

        assert_eq!(&*adapter.items(), &[contact(5, "e2")]);
    }

    #[tokio::test]
    async fn test_run_after_observes_prior_mutations() {
        let adapter = ListAdapter::<Contact>::new().unwrap();
        let observed = Arc::new(Mutex::new(Vec::new()));

        adapter.add(vec![contact(1, "a"), contact(2, "b")]).unwrap();
        let reader = adapter.clone();
        let seen = Arc::clone(&observed);
        adapter
            .run_after(move || async move {
                seen.lock().unwrap().push(reader.len());
            })
            .unwrap();
        adapter.clear().unwrap();
        adapter.flush().await.unwrap();

        assert_eq!(*observed.lock().unwrap(), vec![2]);
        assert!(adapter.is_empty());
    }

    #[tokio::test]
    async fn test_sequence_numbers_follow_call_order() {
        let adapter = ListAdapter::<Contact>::new().unwrap();

        let first = adapter.add(vec![contact(1, "a")]).unwrap();
        let second = adapter.remove(contact(1, "")).unwrap();
        let third = adapter.clear().unwrap();
        let receipt = adapter.add_and_wait(vec![contact(2, "b")]).await.unwrap();

        assert_eq!((first, second, third), (1, 2, 3));
        assert_eq!(receipt.sequence_num, 4);
        assert!(receipt.is_success());
    }
}
