//! Shutdown coordination.

use tokio_util::sync::CancellationToken;

/// Coordinator for graceful shutdown.
///
/// Hands out child tokens to long-running tasks such as list watchers.
/// Unlike a broadcast channel, a token obtained after [`Shutdown::trigger`]
/// is already cancelled, so late subscribers still stop.
#[derive(Clone, Debug, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is cancelled when shutdown is triggered.
    pub fn token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until shutdown is triggered.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_cancels_tokens() {
        let shutdown = Shutdown::new();
        let early = shutdown.token();
        assert!(!early.is_cancelled());

        shutdown.clone().trigger();
        assert!(shutdown.is_triggered());
        assert!(early.is_cancelled());
        assert!(shutdown.token().is_cancelled());
        shutdown.wait().await;
    }

    #[test]
    fn test_child_cancel_does_not_propagate() {
        let shutdown = Shutdown::new();
        shutdown.token().cancel();
        assert!(!shutdown.is_triggered());
    }
}
