//! Debounced input channel.
//!
//! Each [`Debouncer::emit`] cancels the pending emission and schedules a new
//! one after the quiet interval, so downstream sees one value per pause in
//! typing instead of one per keystroke.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Holds at most one pending timer and forwards the value that survives a
/// full quiet interval.
///
/// Must be used from within a tokio runtime. Dropping the debouncer aborts
/// the pending timer.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    rx: mpsc::UnboundedReceiver<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer with the given quiet interval.
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            delay,
            tx,
            rx,
            pending: None,
        }
    }

    /// Quiet interval.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing any pending emission.
    pub fn emit(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver lives as long as the debouncer; a failed send means teardown.
            let _ = tx.send(value);
        }));
    }

    /// Abort the pending emission, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Abort the pending emission and discard settled values not yet taken.
    ///
    /// After closing, [`Debouncer::recv`] returns `None` and later emissions
    /// are dropped.
    pub fn close(&mut self) {
        self.cancel();
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }

    /// Whether an emission is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Wait for the next settled value.
    ///
    /// Pends forever when nothing is scheduled; callers usually race this
    /// against other events.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Take a settled value without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, sleep};

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_last_value_once() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();

        debouncer.emit("a");
        sleep(Duration::from_millis(100)).await;
        debouncer.emit("ab");
        sleep(Duration::from_millis(100)).await;
        debouncer.emit("abc");

        assert_eq!(debouncer.recv().await, Some("abc"));
        assert!(start.elapsed() >= Duration::from_millis(500));

        sleep(Duration::from_secs(1)).await;
        assert_eq!(debouncer.try_recv(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_events_all_emitted() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.emit(1);
        sleep(Duration::from_millis(400)).await;
        debouncer.emit(2);
        sleep(Duration::from_millis(400)).await;

        assert_eq!(debouncer.try_recv(), Some(1));
        assert_eq!(debouncer.try_recv(), Some(2));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_emission() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.emit("draft");
        assert!(debouncer.is_pending());
        debouncer.cancel();
        sleep(Duration::from_secs(1)).await;

        assert_eq!(debouncer.try_recv(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_discards_settled_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.emit("settled");
        sleep(Duration::from_millis(350)).await;
        debouncer.close();

        assert_eq!(debouncer.recv().await, None);
        debouncer.emit("late");
        sleep(Duration::from_secs(1)).await;
        assert_eq!(debouncer.try_recv(), None);
    }
}
