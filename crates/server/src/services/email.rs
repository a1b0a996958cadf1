//! Transactional email delivery.
//!
//! Uses SMTP via lettre. Arbitrary messages come in through the email
//! dispatch endpoint; order notices are rendered from Askama templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use group_order_core::OrderId;

use crate::config::EmailConfig;

/// HTML template for the order cancellation notice.
#[derive(Template)]
#[template(path = "email/order_cancelled.html")]
struct OrderCancelledHtml<'a> {
    order_id: &'a str,
    reason: Option<&'a str>,
}

/// Plain text template for the order cancellation notice.
#[derive(Template)]
#[template(path = "email/order_cancelled.txt")]
struct OrderCancelledText<'a> {
    order_id: &'a str,
    reason: Option<&'a str>,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The dispatch request itself is malformed.
    #[error("Invalid email request: {0}")]
    InvalidRequest(String),

    /// Neither a text nor an HTML body was supplied.
    #[error("Message has no body")]
    EmptyBody,

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// What the relay said about an accepted message.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    /// `Message-ID` header we assigned.
    pub message_id: String,
    /// SMTP reply code and text from the relay.
    pub response: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// No connection is made until the first message is sent.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid or the sender address does
    /// not parse.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;

        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = if config.smtp_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port)
                .credentials(credentials)
                .build()
        } else {
            // Local mail catchers (Mailpit, MailHog) speak plain SMTP.
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build()
        };

        Ok(Self { mailer, from })
    }

    /// Send a message with a plain text body, an HTML body, or both.
    ///
    /// # Errors
    ///
    /// Returns error if the recipient is invalid, no body is given, or the
    /// relay rejects the message.
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: Option<&str>,
        html_body: Option<&str>,
    ) -> Result<DeliveryReceipt, EmailError> {
        let to_mailbox = to
            .trim()
            .parse::<Mailbox>()
            .map_err(|_| EmailError::InvalidAddress(to.to_string()))?;

        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain());
        let builder = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .message_id(Some(message_id.clone()));

        let email = match (text_body, html_body) {
            (Some(text), Some(html)) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )?,
            (Some(text), None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.to_string())?,
            (None, Some(html)) => builder
                .header(ContentType::TEXT_HTML)
                .body(html.to_string())?,
            (None, None) => return Err(EmailError::EmptyBody),
        };

        let response = self.mailer.send(email).await?;
        let reply = response.message().collect::<Vec<_>>().join(" ");

        tracing::info!(to = %to, subject = %subject, message_id = %message_id, "Email sent successfully");
        Ok(DeliveryReceipt {
            message_id,
            response: format!("{} {reply}", response.code()),
        })
    }

    /// Tell the order contact that their order was cancelled.
    ///
    /// # Errors
    ///
    /// Returns error if a template fails to render or delivery fails.
    pub async fn send_order_cancelled(
        &self,
        to: &str,
        order_id: &OrderId,
        reason: Option<&str>,
    ) -> Result<DeliveryReceipt, EmailError> {
        let (html, text) = render_order_cancelled(order_id, reason)?;
        self.send(to, "Your group order was cancelled", Some(&text), Some(&html))
            .await
    }
}

fn render_order_cancelled(
    order_id: &OrderId,
    reason: Option<&str>,
) -> Result<(String, String), EmailError> {
    let order_id = order_id.as_str();
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    let html = OrderCancelledHtml { order_id, reason }.render()?;
    let text = OrderCancelledText { order_id, reason }.render()?;
    Ok((html, text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn local_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: 1025,
            smtp_username: "orders".to_string(),
            smtp_password: SecretString::from("Vq8#mZ2!rL5@tK9$"),
            smtp_starttls: false,
            from_address: "Group Order <orders@lunch.test>".to_string(),
        }
    }

    #[test]
    fn test_cancellation_notice_includes_reason() {
        let (html, text) =
            render_order_cancelled(&OrderId::new("ord-7"), Some("  Restaurant closed ")).unwrap();

        assert!(html.contains("ord-7"));
        assert!(html.contains("Reason given: Restaurant closed"));
        assert!(text.contains("Reason given: Restaurant closed"));
    }

    #[test]
    fn test_cancellation_notice_without_reason() {
        let (html, text) = render_order_cancelled(&OrderId::new("ord-8"), Some("   ")).unwrap();

        assert!(text.contains("ord-8"));
        assert!(!html.contains("Reason given"));
        assert!(!text.contains("Reason given"));
    }

    #[test]
    fn test_new_rejects_bad_sender() {
        let mut config = local_config();
        config.from_address = "not an address".to_string();

        assert!(matches!(
            EmailService::new(&config),
            Err(EmailError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_send_rejects_bad_recipient_before_connecting() {
        let service = EmailService::new(&local_config()).unwrap();

        let result = service
            .send("nobody", "Hi", Some("text"), None)
            .await;
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_send_requires_a_body() {
        let service = EmailService::new(&local_config()).unwrap();

        let result = service.send("diner@lunch.test", "Hi", None, None).await;
        assert!(matches!(result, Err(EmailError::EmptyBody)));
    }
}
