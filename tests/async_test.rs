/*!
 * Async Read Tests
 * Tokio tasks waiting on the same signals as threads
 */

use delay_map::{DelayMap, WaitError};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_async_fast_path() {
    let map = DelayMap::<u64, String>::new(Duration::from_secs(1));
    map.set(1, "one".to_string());
    assert_eq!(map.get_async(&1).await, Some("one".to_string()));
}

#[tokio::test]
async fn test_async_timeout() {
    let timeout = Duration::from_millis(80);
    let map = DelayMap::<u64, u64>::new(timeout);

    let start = Instant::now();
    assert_eq!(map.get_async(&1).await, None);
    assert!(start.elapsed() >= timeout);
    assert_eq!(map.pending_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_delayed_arrival() {
    let map = Arc::new(DelayMap::<u64, u64>::new(Duration::from_secs(1)));

    let writer = map.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        writer.set(5, 55);
    });

    let start = Instant::now();
    assert_eq!(map.get_async(&5).await, Some(55));
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tasks_and_threads_share_wakeup() {
    let map = Arc::new(DelayMap::<u64, u64>::new(Duration::from_secs(2)));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let map = map.clone();
            tokio::spawn(async move { map.get_async(&9).await })
        })
        .collect();
    let threads: Vec<_> = (0..2)
        .map(|_| {
            let map = map.clone();
            thread::spawn(move || map.get(&9))
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(map.waiter_count(&9), 6);
    map.set(9, 81);

    for task in tasks {
        assert_eq!(task.await.unwrap(), Some(81));
    }
    for handle in threads {
        assert_eq!(handle.join().unwrap(), Some(81));
    }
}

#[tokio::test]
async fn test_async_close() {
    let map = Arc::new(DelayMap::<u64, u64>::new(Duration::from_secs(5)));

    let reader = map.clone();
    let task = tokio::spawn(async move { reader.wait_for_async(&3, Duration::from_secs(5)).await });

    tokio::time::sleep(Duration::from_millis(30)).await;
    map.close();

    assert_eq!(task.await.unwrap(), Err(WaitError::Closed));
}

#[tokio::test]
async fn test_dropped_future_deregisters() {
    let map = DelayMap::<u64, u64>::new(Duration::from_secs(5));

    let outcome = tokio::time::timeout(Duration::from_millis(30), map.get_async(&4)).await;
    assert!(outcome.is_err());

    assert_eq!(map.pending_keys(), 0);
    assert_eq!(map.stats().cancelled_waits, 1);
}

#[tokio::test]
async fn test_async_per_call_timeout() {
    let map = DelayMap::<u64, u64>::new(Duration::from_secs(30));

    let start = Instant::now();
    assert_eq!(map.get_async_timeout(&1, Duration::from_millis(20)).await, None);
    assert!(start.elapsed() < Duration::from_secs(1));
}
