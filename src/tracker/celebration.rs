//! Goal celebration with automatic clear

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// One-shot celebration flag
///
/// [`trigger`](Self::trigger) raises the flag and schedules it to drop after
/// the configured duration. Triggering again while active restarts the
/// countdown.
#[derive(Debug)]
pub struct Celebration {
    active: Arc<watch::Sender<bool>>,
    duration: Duration,
    clear_task: Mutex<Option<JoinHandle<()>>>,
    fired: AtomicU64,
}

impl Celebration {
    pub fn new(duration: Duration) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            active: Arc::new(tx),
            duration,
            clear_task: Mutex::new(None),
            fired: AtomicU64::new(0),
        }
    }

    /// Raise the flag and (re)start the clear countdown
    pub fn trigger(&self) {
        self.fired.fetch_add(1, Ordering::SeqCst);
        self.active.send_replace(true);
        tracing::info!("Calorie goal reached");

        let mut slot = self
            .clear_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let active = Arc::clone(&self.active);
                let duration = self.duration;
                *slot = Some(runtime.spawn(async move {
                    tokio::time::sleep(duration).await;
                    active.send_replace(false);
                }));
            }
            Err(_) => {
                tracing::debug!("No runtime available, celebration stays active until cleared");
            }
        }
    }

    /// Drop the flag immediately
    pub fn clear(&self) {
        if let Some(task) = self
            .clear_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
        self.active.send_replace(false);
    }

    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    /// Number of times the celebration has been triggered
    pub fn times_fired(&self) -> u64 {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.active.subscribe()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Drop for Celebration {
    fn drop(&mut self) {
        if let Some(task) = self
            .clear_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_clears_after_duration() {
        let celebration = Celebration::new(Duration::from_millis(3000));
        celebration.trigger();
        assert!(celebration.is_active());

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert!(celebration.is_active());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!celebration.is_active());
        assert_eq!(celebration.times_fired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_restarts_countdown() {
        let celebration = Celebration::new(Duration::from_millis(3000));
        celebration.trigger();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        celebration.trigger();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(celebration.is_active());

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert!(!celebration.is_active());
        assert_eq!(celebration.times_fired(), 2);
    }

    #[test]
    fn test_without_runtime_stays_until_cleared() {
        let celebration = Celebration::new(Duration::from_millis(10));
        celebration.trigger();
        assert!(celebration.is_active());

        celebration.clear();
        assert!(!celebration.is_active());
    }
}
