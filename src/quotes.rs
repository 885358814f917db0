//! Rotating motivational quote

use crate::catalog::Quote;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

/// Default time between rotations
pub const DEFAULT_ROTATION: Duration = Duration::from_secs(15);

/// Cycles through a fixed list of quotes
#[derive(Debug, Clone)]
pub struct QuoteRotator {
    quotes: Arc<Vec<Quote>>,
    index: Arc<watch::Sender<usize>>,
}

impl QuoteRotator {
    pub fn new(quotes: Vec<Quote>) -> Self {
        let (index, _rx) = watch::channel(0);
        Self {
            quotes: Arc::new(quotes),
            index: Arc::new(index),
        }
    }

    /// The quote currently shown, `None` for an empty list
    pub fn current(&self) -> Option<&Quote> {
        self.quotes.get(*self.index.borrow())
    }

    pub fn index(&self) -> usize {
        *self.index.borrow()
    }

    /// Move to the next quote, wrapping at the end
    pub fn advance(&self) -> usize {
        let len = self.quotes.len();
        if len == 0 {
            return 0;
        }
        let mut next = 0;
        self.index.send_modify(|i| {
            *i = (*i + 1) % len;
            next = *i;
        });
        next
    }

    /// Observe index changes
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.index.subscribe()
    }

    /// Advance every `period` on a background task until cancelled
    pub fn spawn(&self, period: Duration) -> RotationHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let rotator = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let index = rotator.advance();
                        tracing::trace!(index, "Rotated quote");
                    }
                }
            }
        });

        RotationHandle {
            cancel,
            handle: Some(handle),
        }
    }
}

/// Running quote rotation; cancelled on drop
#[derive(Debug)]
pub struct RotationHandle {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RotationHandle {
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Quote rotation task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for RotationHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quotes(n: usize) -> Vec<Quote> {
        (0..n)
            .map(|i| Quote {
                text: format!("quote {}", i),
                author: "someone".into(),
            })
            .collect()
    }

    #[test]
    fn test_advance_wraps() {
        let rotator = QuoteRotator::new(quotes(3));
        assert_eq!(rotator.current().unwrap().text, "quote 0");
        assert_eq!(rotator.advance(), 1);
        assert_eq!(rotator.advance(), 2);
        assert_eq!(rotator.advance(), 0);
    }

    #[test]
    fn test_empty_list() {
        let rotator = QuoteRotator::new(Vec::new());
        assert!(rotator.current().is_none());
        assert_eq!(rotator.advance(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_rotates_on_interval() {
        let rotator = QuoteRotator::new(quotes(4));
        let handle = rotator.spawn(DEFAULT_ROTATION);

        tokio::time::sleep(Duration::from_secs(14)).await;
        assert_eq!(rotator.index(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rotator.index(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(rotator.index(), 3);

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(rotator.index(), 3);
    }
}
