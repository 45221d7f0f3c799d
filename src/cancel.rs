//! Cooperative cancellation for long batch and tuning runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{DjmirError, Result};

/// Shared flag checked between queries, documents and tuning iterations.
///
/// Clones observe the same flag, so a handle kept by the caller (or a signal
/// handler) can stop a run that owns another clone.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Return `OperationCancelled` naming `stage` if cancellation was requested.
    pub fn check(&self, stage: &str) -> Result<()> {
        if self.is_cancelled() {
            Err(DjmirError::cancelled(stage.to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        assert!(token.check("scoring").is_ok());

        handle.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check("scoring"),
            Err(DjmirError::OperationCancelled(stage)) if stage == "scoring"
        ));
    }
}
