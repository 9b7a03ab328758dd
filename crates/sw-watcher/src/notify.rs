//! The notification seam between detection and delivery.
//!
//! The engine reports changes through the [`ChangeNotifier`] trait and knows
//! nothing about transports. The server crate implements it over a broadcast
//! channel; tests implement it with a counter.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Receives "something changed" signals from the detection engine.
///
/// There is deliberately no payload: clients reload all stylesheets
/// unconditionally, so one coalesced signal per change event is enough.
///
/// # Concurrency
///
/// `notify_changed` may be called concurrently from any number of detector
/// tasks without external synchronization; implementations must not block.
/// Zero connected clients must be a no-op, not an error.
pub trait ChangeNotifier: Send + Sync + 'static {
    /// Delivers one change signal to all connected clients.
    fn notify_changed(&self);
}

/// A notifier that discards every signal.
///
/// Useful for headless runs and as a placeholder in examples.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl ChangeNotifier for NullNotifier {
    #[inline]
    fn notify_changed(&self) {}
}

/// A notifier that counts signals and wakes waiters.
///
/// Intended for tests: detection code signals it like any other notifier,
/// and the test side awaits a target count.
///
/// # Examples
///
/// ```
/// use sw_watcher::{ChangeNotifier, CountingNotifier};
///
/// let notifier = CountingNotifier::new();
/// notifier.notify_changed();
/// notifier.notify_changed();
/// assert_eq!(notifier.count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct CountingNotifier {
    count: AtomicUsize,
    woken: Notify,
}

impl CountingNotifier {
    /// Creates a notifier with a zero count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many signals have been delivered so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Waits until at least `target` signals have been delivered.
    pub async fn wait_for(&self, target: usize) {
        loop {
            // Register interest before checking, so a signal arriving
            // between the check and the await is not lost.
            let woken = self.woken.notified();
            if self.count() >= target {
                return;
            }
            woken.await;
        }
    }
}

impl ChangeNotifier for CountingNotifier {
    fn notify_changed(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.woken.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_null_notifier_is_silent() {
        NullNotifier.notify_changed();
    }

    #[test]
    fn test_counting_notifier_counts() {
        let notifier = CountingNotifier::new();
        assert_eq!(notifier.count(), 0);
        notifier.notify_changed();
        assert_eq!(notifier.count(), 1);
    }

    #[tokio::test]
    async fn test_wait_for_already_reached() {
        let notifier = CountingNotifier::new();
        notifier.notify_changed();
        // Must return immediately when the target is already met.
        notifier.wait_for(1).await;
    }

    #[tokio::test]
    async fn test_wait_for_wakes_on_signal() {
        let notifier = Arc::new(CountingNotifier::new());

        let waiter = {
            let notifier = Arc::clone(&notifier);
            tokio::spawn(async move { notifier.wait_for(1).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        notifier.notify_changed();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .expect("waiter should not panic");
    }
}
