//! Console email provider for development.

use crate::error::Result;
use crate::providers::templates::token_from_link;
use crate::providers::{EmailProvider, OutgoingEmail};
use crate::utils::token_prefix;
use tracing::info;

/// Console email provider.
///
/// Logs messages instead of sending them. The server falls back to this
/// provider when no SMTP relay is configured.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailProvider;

impl ConsoleEmailProvider {
    /// Create a new console email provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EmailProvider for ConsoleEmailProvider {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let link = email
            .html
            .split("href=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap_or_default();

        info!(
            to = %email.to,
            subject = %email.subject,
            token = %token_from_link(link).map(token_prefix).unwrap_or_default(),
            "📧 Email (Development Mode)"
        );
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║ To: {:<57}║", email.to);
        println!("║ Subject: {:<52}║", email.subject);
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ {link:<61}║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::providers::templates;
    use chrono::Duration;

    #[tokio::test]
    async fn test_console_send_never_fails() {
        let link = templates::verification_link("http://localhost:3000", "abcdef123456");
        let mail = templates::verification_email("a@x.com", &link, Duration::minutes(30));
        ConsoleEmailProvider::new().send(mail).await.unwrap();
    }
}
