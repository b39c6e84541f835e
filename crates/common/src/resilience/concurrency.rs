//! Bounded-concurrency fan-out over independent async operations.
//!
//! A counting semaphore caps how many operation bodies run at once; results
//! come back in input order regardless of completion order. Nothing here
//! cancels siblings when one operation fails — started work runs to
//! completion and the first failure (in input order) is what the caller
//! sees.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

/// Run every operation with at most `max_in_flight` active at once,
/// returning per-operation outcomes in input order.
pub async fn gather_bounded_results<T, E, Fut>(
    operations: Vec<Fut>,
    max_in_flight: usize,
) -> Vec<Result<T, E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    let permits = max_in_flight.max(1);
    let semaphore = Arc::new(Semaphore::new(permits));
    debug!(operations = operations.len(), max_in_flight = permits, "bounded gather");

    let bounded = operations.into_iter().map(|operation| {
        let semaphore = semaphore.clone();
        async move {
            // The semaphore is owned by this scope and never closed, so
            // acquisition cannot fail; `ok()` keeps the guard non-panicking.
            let _permit = semaphore.acquire_owned().await.ok();
            operation.await
        }
    });

    join_all(bounded).await
}

/// Like [`gather_bounded_results`], but short-circuits to the first error in
/// input order once every operation has finished.
pub async fn gather_bounded<T, E, Fut>(
    operations: Vec<Fut>,
    max_in_flight: usize,
) -> Result<Vec<T>, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    gather_bounded_results(operations, max_in_flight).await.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn never_exceeds_the_concurrency_bound() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let operations: Vec<_> = (0..5u64)
            .map(|i| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let active = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(active, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<u64, Infallible>(i)
                }
            })
            .collect();

        let values = gather_bounded(operations, 2).await.unwrap();

        assert_eq!(values, vec![0, 1, 2, 3, 4]);
        assert!(peak.load(Ordering::SeqCst) <= 2, "peak {} exceeded bound", peak.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn preserves_input_order_despite_completion_order() {
        // Later operations finish first; output order must still match input.
        let operations: Vec<_> = vec![30u64, 10, 20]
            .into_iter()
            .map(|delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<u64, Infallible>(delay)
            })
            .collect();

        let values = gather_bounded(operations, 3).await.unwrap();
        assert_eq!(values, vec![30, 10, 20]);
    }

    #[tokio::test(start_paused = true)]
    async fn bound_of_one_fully_serializes() {
        let operations: Vec<_> = vec![300u64, 100, 200]
            .into_iter()
            .map(|delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<u64, Infallible>(delay)
            })
            .collect();

        let started = tokio::time::Instant::now();
        let values = gather_bounded(operations, 1).await.unwrap();

        assert_eq!(values, vec![300, 100, 200]);
        assert_eq!(started.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test]
    async fn first_error_in_input_order_wins() {
        let finished = Arc::new(AtomicUsize::new(0));
        let operations: Vec<_> = (0..4usize)
            .map(|i| {
                let finished = finished.clone();
                async move {
                    finished.fetch_add(1, Ordering::SeqCst);
                    if i == 1 || i == 2 {
                        Err(format!("op {i} failed"))
                    } else {
                        Ok(i)
                    }
                }
            })
            .collect();

        let result = gather_bounded(operations, 2).await;
        assert_eq!(result, Err("op 1 failed".to_string()));
        // Siblings were not cancelled; everything ran.
        assert_eq!(finished.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn results_variant_reports_every_outcome() {
        let operations: Vec<_> = (0..3usize)
            .map(|i| async move { if i == 1 { Err("bad") } else { Ok(i) } })
            .collect();

        let results = gather_bounded_results(operations, 2).await;
        assert_eq!(results, vec![Ok(0), Err("bad"), Ok(2)]);
    }
}
