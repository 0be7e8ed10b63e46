use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn instant() -> RetryPolicy {
    RetryPolicy {
        max_retries: 5,
        delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn retries_eventual_consistency_until_success() {
    let counter = AtomicUsize::new(0);
    let calls = &counter;
    let out = with_retries("create pr", instant(), || async move {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        if n < 2 {
            Err(GraftError::EventualConsistency("head not found".into()))
        } else {
            Ok(n)
        }
    })
    .await;
    assert_eq!(out, Ok(2));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let counter = AtomicUsize::new(0);
    let calls = &counter;
    let out: Result<(), _> = with_retries("create pr", instant(), || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(GraftError::EventualConsistency("head not found".into()))
    })
    .await;
    assert!(matches!(out, Err(GraftError::EventualConsistency(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn other_failures_are_not_retried() {
    let counter = AtomicUsize::new(0);
    let calls = &counter;
    let out: Result<(), _> = with_retries("create pr", instant(), || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(GraftError::network("connection refused"))
    })
    .await;
    assert!(matches!(out, Err(GraftError::Network { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
