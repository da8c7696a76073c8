//! SMTP email provider implementation using Lettre.

use crate::error::{AuthError, Result};
use crate::providers::{EmailProvider, OutgoingEmail};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP email provider using Lettre.
///
/// # Configuration
///
/// - `smtp_server`: SMTP server address (e.g., "smtp.gmail.com")
/// - `smtp_port`: SMTP server port (usually 587 for STARTTLS, 465 for TLS)
/// - `smtp_username` / `smtp_password`: relay credentials
/// - `from_email`: Sender email address
/// - `from_name`: Sender display name
///
/// # Examples
///
/// ```ignore
/// use pharmacy_auth::providers::SmtpEmailProvider;
///
/// let provider = SmtpEmailProvider::new(
///     "smtp.gmail.com".to_string(),
///     587,
///     "pharmacy@gmail.com".to_string(),
///     "app_password".to_string(),
///     "pharmacy@gmail.com".to_string(),
///     "Pharmacy".to_string(),
/// );
/// ```
#[derive(Clone)]
pub struct SmtpEmailProvider {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpEmailProvider {
    /// Create a new SMTP email provider.
    #[must_use]
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        Self {
            smtp_server,
            smtp_port,
            credentials: Credentials::new(smtp_username, smtp_password),
            from_email,
            from_name,
        }
    }

    /// Build SMTP transport for sending emails.
    ///
    /// A fresh transport per message avoids holding idle relay connections.
    fn build_transport(&self) -> Result<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| AuthError::EmailError(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    /// Build the "From" header.
    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    fn build_message(&self, email: OutgoingEmail) -> Result<Message> {
        Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| AuthError::EmailError(format!("Invalid from address: {e}")))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| AuthError::EmailError(format!("Invalid to address: {e}")))?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| AuthError::EmailError(format!("Failed to build email: {e}")))
    }
}

impl EmailProvider for SmtpEmailProvider {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let to = email.to.clone();
        let message = self.build_message(email)?;
        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&message)
                .map_err(|e| AuthError::EmailError(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| AuthError::EmailError(format!("Email task failed: {e}")))??;

        tracing::info!(to = %to, "Email sent via SMTP");
        Ok(())
    }
}
