//! Email provider trait.

use crate::error::Result;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Email provider.
///
/// This trait abstracts over email delivery (SMTP relay, console output in
/// development, in-memory capture in tests). Rendering is done by
/// [`crate::providers::templates`]; providers only deliver.
pub trait EmailProvider: Send + Sync {
    /// Deliver a message.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if:
    /// - An address cannot be parsed
    /// - The relay is unreachable or rejects the message
    fn send(&self, email: OutgoingEmail) -> impl std::future::Future<Output = Result<()>> + Send;
}
