//! Transient "not enough stock" indicator.
//!
//! Shown when an add requests more than the available stock, and auto-cleared
//! after a fixed delay. Retriggering re-arms the pending clear instead of
//! stacking a second timer, so the indicator never flickers off early.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// How long the indicator stays visible after the last trigger.
pub const AUTO_HIDE_DELAY: Duration = Duration::from_millis(3000);

/// Cancellable deferred auto-hide flag.
///
/// Cheap to clone; clones share visibility and the pending clear.
#[derive(Debug, Clone, Default)]
pub struct StockIndicator {
    inner: Arc<IndicatorInner>,
}

#[derive(Debug, Default)]
struct IndicatorInner {
    visible: AtomicBool,
    pending_clear: Mutex<Option<JoinHandle<()>>>,
}

impl StockIndicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner.visible.load(Ordering::SeqCst)
    }

    /// Show the indicator and (re-)arm the auto-hide timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self) {
        self.inner.visible.store(true, Ordering::SeqCst);

        let inner = Arc::clone(&self.inner);
        let clear = tokio::spawn(async move {
            tokio::time::sleep(AUTO_HIDE_DELAY).await;
            inner.visible.store(false, Ordering::SeqCst);
        });

        if let Ok(mut pending) = self.inner.pending_clear.lock() {
            // Re-arm, never stack: the previous timer is cancelled.
            if let Some(previous) = pending.replace(clear) {
                previous.abort();
            }
        }
    }

    /// Hide the indicator immediately and cancel any pending clear.
    pub fn clear(&self) {
        if let Ok(mut pending) = self.inner.pending_clear.lock()
            && let Some(previous) = pending.take()
        {
            previous.abort();
        }
        self.inner.visible.store(false, Ordering::SeqCst);
    }
}

impl Drop for IndicatorInner {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending_clear.lock()
            && let Some(task) = pending.take()
        {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_auto_hide_after_delay() {
        let indicator = StockIndicator::new();
        indicator.trigger();
        assert!(indicator.is_visible());

        tokio::time::sleep(AUTO_HIDE_DELAY + Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        assert!(!indicator.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_rearms_instead_of_stacking() {
        let indicator = StockIndicator::new();
        indicator.trigger();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        indicator.trigger();

        // The first timer would have fired by now; the re-armed one must not
        // have.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        tokio::task::yield_now().await;
        assert!(indicator.is_visible());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        tokio::task::yield_now().await;
        assert!(!indicator.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_clear_cancels_timer() {
        let indicator = StockIndicator::new();
        indicator.trigger();
        indicator.clear();
        assert!(!indicator.is_visible());
    }
}
