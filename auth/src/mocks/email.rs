//! Mock email provider for testing.

use crate::error::{AuthError, Result};
use crate::providers::templates::token_from_link;
use crate::providers::{EmailProvider, OutgoingEmail};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Mock email provider.
///
/// Captures every delivered message instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct MockEmailProvider {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    failing: Arc<AtomicBool>,
}

impl MockEmailProvider {
    /// Create a new mock email provider that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose deliveries fail with `EmailError`.
    #[must_use]
    pub fn failing() -> Self {
        let provider = Self::default();
        provider.set_failing(true);
        provider
    }

    /// Toggle delivery failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All delivered messages, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent message delivered to `to`.
    #[must_use]
    pub fn last_sent_to(&self, to: &str) -> Option<OutgoingEmail> {
        self.sent().into_iter().rev().find(|mail| mail.to == to)
    }

    /// Token embedded in the most recent message delivered to `to`.
    #[must_use]
    pub fn last_token_for(&self, to: &str) -> Option<String> {
        self.last_sent_to(to)
            .and_then(|mail| token_from_link(&mail.html).map(str::to_string))
    }
}

impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::EmailError("mock relay rejected message".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email);
        Ok(())
    }
}
