use std::future::Future;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

/// Fixed-size result buffer where each index is written at most once.
pub struct OrderedBuffer<T> {
    slots: Vec<Option<T>>,
}

impl<T> OrderedBuffer<T> {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| None).collect(),
        }
    }

    /// Returns false (and keeps the first value) if the slot is taken or out of range.
    pub fn put(&mut self, index: usize, value: T) -> bool {
        match self.slots.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(value);
                true
            }
            _ => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Values in index order; `None` if any slot is still empty.
    pub fn into_ordered(self) -> Option<Vec<T>> {
        self.slots.into_iter().collect()
    }
}

/// Runs `f` over `items` with at most `max_concurrency` in flight.
///
/// Results come back in input order regardless of completion order. The first
/// error cancels the remaining work.
pub async fn run_ordered<I, T, E, F, Fut>(
    items: Vec<I>,
    max_concurrency: usize,
    f: F,
) -> Result<Vec<T>, E>
where
    F: Fn(usize, I) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let total = items.len();
    let sem = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut futs = FuturesUnordered::new();

    for (index, item) in items.into_iter().enumerate() {
        let sem = sem.clone();
        let fut = f(index, item);
        futs.push(async move {
            // The semaphore is local and never closed.
            let _permit = sem.acquire_owned().await.ok();
            (index, fut.await)
        });
    }

    let mut buffer = OrderedBuffer::new(total);
    while let Some((index, res)) = futs.next().await {
        let value = res?;
        if !buffer.put(index, value) {
            tracing::error!(index, "duplicate result for chunk index; keeping the first");
        }
    }

    Ok(buffer.slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_buffer_is_write_once() {
        let mut buf = OrderedBuffer::new(2);
        assert!(buf.put(1, "b"));
        assert!(!buf.put(1, "x"));
        assert!(!buf.put(5, "y"));
        assert!(!buf.is_complete());
        assert!(buf.put(0, "a"));
        assert_eq!(buf.into_ordered(), Some(vec!["a", "b"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_completion_merges_in_input_order() {
        let delays = vec![40u64, 5, 30, 1, 20];
        let out = run_ordered(delays.clone(), 3, |i, d| async move {
            tokio::time::sleep(Duration::from_millis(d)).await;
            Ok::<_, String>(format!("chunk-{i}"))
        })
        .await
        .unwrap();

        let sequential: Vec<String> = (0..delays.len()).map(|i| format!("chunk-{i}")).collect();
        assert_eq!(out, sequential);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        run_ordered((0..8).collect::<Vec<u32>>(), 2, |_, _| {
            let active = active.clone();
            let peak = peak.clone();
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, String>(())
            }
        })
        .await
        .unwrap();

        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_first_error_is_returned() {
        let err = run_ordered(vec![1, 2, 3], 4, |_, n| async move {
            if n == 2 {
                Err(format!("bad {n}"))
            } else {
                Ok(n)
            }
        })
        .await
        .unwrap_err();
        assert_eq!(err, "bad 2");
    }
}
