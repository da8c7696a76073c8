//! Rendering of the verification and password reset emails.

use crate::constants::links::{RESET_PASSWORD_PATH, VERIFY_EMAIL_PATH};
use crate::providers::email::OutgoingEmail;
use chrono::Duration;

/// Link embedded in an email verification message.
#[must_use]
pub fn verification_link(base_url: &str, token: &str) -> String {
    format!(
        "{}{VERIFY_EMAIL_PATH}?token={token}",
        base_url.trim_end_matches('/')
    )
}

/// Link embedded in a password reset message.
#[must_use]
pub fn reset_link(base_url: &str, token: &str) -> String {
    format!(
        "{}{RESET_PASSWORD_PATH}?token={token}",
        base_url.trim_end_matches('/')
    )
}

/// Email verification message.
#[must_use]
pub fn verification_email(to: &str, link: &str, valid_for: Duration) -> OutgoingEmail {
    let minutes = valid_for.num_minutes();
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Verify your email</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Verify your email</h2>
        <p>Click the button below to confirm this address and continue your pharmacy registration. This link will expire in {minutes} minutes.</p>
        <p style="margin: 30px 0;">
            <a href="{link}"
               style="display: inline-block; background-color: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">
                Verify Email
            </a>
        </p>
        <p style="color: #666; font-size: 14px;">
            If you didn't request this email, you can safely ignore it.
        </p>
    </div>
</body>
</html>"#
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: "Verify your email address".to_string(),
        html,
    }
}

/// Password reset message.
#[must_use]
pub fn password_reset_email(to: &str, link: &str, valid_for: Duration) -> OutgoingEmail {
    let minutes = valid_for.num_minutes();
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Reset your password</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #dc2626;">Reset your password</h2>
        <p>Someone requested a password reset for your pharmacy account. This link will expire in {minutes} minutes.</p>
        <p style="margin: 30px 0;">
            <a href="{link}"
               style="display: inline-block; background-color: #dc2626; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">
                Reset Password
            </a>
        </p>
        <p style="color: #666; font-size: 14px;">
            If you didn't request a password reset, you can safely ignore this email.
        </p>
    </div>
</body>
</html>"#
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: "Reset your password".to_string(),
        html,
    }
}

/// Extract the `token` query parameter from a link built by this module.
#[must_use]
pub fn token_from_link(link: &str) -> Option<&str> {
    link.split_once("?token=").map(|(_, token)| {
        token
            .split(['"', '&', '<', ' ', '\n'])
            .next()
            .unwrap_or(token)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links() {
        assert_eq!(
            verification_link("https://rx.example.com/", "abc"),
            "https://rx.example.com/auth/verify-email?token=abc"
        );
        assert_eq!(
            reset_link("https://rx.example.com", "abc"),
            "https://rx.example.com/auth/reset-password?token=abc"
        );
    }

    #[test]
    fn test_verification_email_embeds_link_and_validity() {
        let link = verification_link("http://localhost:3000", "tok123");
        let mail = verification_email("a@x.com", &link, Duration::minutes(30));
        assert_eq!(mail.to, "a@x.com");
        assert!(mail.html.contains(&link));
        assert!(mail.html.contains("30 minutes"));
        assert_eq!(token_from_link(&mail.html), Some("tok123"));
    }

    #[test]
    fn test_reset_email() {
        let link = reset_link("http://localhost:3000", "r-9");
        let mail = password_reset_email("a@x.com", &link, Duration::minutes(30));
        assert_eq!(mail.subject, "Reset your password");
        assert_eq!(token_from_link(&mail.html), Some("r-9"));
    }
}
