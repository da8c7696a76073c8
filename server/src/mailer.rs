//! Mail provider chosen at startup.

use pharmacy_auth::Result;
use pharmacy_auth::providers::{ConsoleEmailProvider, EmailProvider, OutgoingEmail, SmtpEmailProvider};

/// SMTP when a relay is configured, console output otherwise.
#[derive(Clone)]
pub enum Mailer {
    /// Real delivery.
    Smtp(SmtpEmailProvider),
    /// Development fallback.
    Console(ConsoleEmailProvider),
}

impl EmailProvider for Mailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        match self {
            Self::Smtp(smtp) => smtp.send(email).await,
            Self::Console(console) => console.send(email).await,
        }
    }
}
