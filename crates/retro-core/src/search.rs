use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

/// Delays a search until input has been quiet for `delay`.
///
/// Each `schedule` replaces the pending timer. Once a timer fires its task
/// runs detached, so later input never cancels a request already in flight.
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<AbortHandle>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        });
        self.pending = Some(timer.abort_handle());
    }

    /// Drops the pending timer, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Hands out tickets for station requests; only the newest ticket may apply
/// its result.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    latest: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes every earlier ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_runs_last_search_only() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(500));

        for term in ["j", "ja", "jaz"] {
            let tx = tx.clone();
            debouncer.schedule(async move {
                let _ = tx.send(term);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(debouncer.is_pending());
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(rx.recv().await, Some("jaz"));
        assert!(!debouncer.is_pending());

        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_search() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(500));

        let task_tx = tx.clone();
        debouncer.schedule(async move {
            let _ = task_tx.send(());
        });
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_search_survives_new_input() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(500));

        let slow_tx = tx.clone();
        debouncer.schedule(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let _ = slow_tx.send("first");
        });
        tokio::time::sleep(Duration::from_millis(600)).await;

        let fast_tx = tx.clone();
        debouncer.schedule(async move {
            let _ = fast_tx.send("second");
        });
        drop(tx);

        let mut got = Vec::new();
        while let Some(term) = rx.recv().await {
            got.push(term);
        }
        assert_eq!(got, ["second", "first"]);
    }

    #[test]
    fn test_only_newest_ticket_is_current() {
        let gate = RequestGate::new();
        let first = gate.issue();
        assert!(gate.is_current(&first));

        let second = gate.clone().issue();
        assert!(!gate.is_current(&first));
        assert!(gate.is_current(&second));
    }
}
