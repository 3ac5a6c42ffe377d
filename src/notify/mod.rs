//! Notification delivery.
//!
//! `MailTransport` is the seam between message building and the SMTP wire;
//! production uses lettre's async transport, tests substitute recording or
//! failing doubles. `NotificationDispatcher` owns the delivery policy: which
//! messages go out, what happens when configuration is incomplete, and how
//! partial failure is reported.

mod summary;

pub use summary::{
    applicant_confirmation, build_summary, contact_notification, escape_html,
    generate_application_number, staff_notification, MessageContent, SummaryEntry,
};

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpSettings;

/// A fully addressed outbound email with parallel HTML and text bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Mail delivery failure.
#[derive(Debug)]
pub enum MailError {
    /// A recipient or sender address did not parse
    Address(String),
    /// The message could not be assembled
    Message(String),
    /// The SMTP transport refused or failed the send
    Transport(String),
}

impl std::fmt::Display for MailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailError::Address(detail) => write!(f, "invalid mail address: {}", detail),
            MailError::Message(detail) => write!(f, "could not build message: {}", detail),
            MailError::Transport(detail) => write!(f, "mail transport error: {}", detail),
        }
    }
}

impl std::error::Error for MailError {}

/// Send capability, at-least-once best effort with explicit failure.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}

/// SMTP delivery through lettre. Port 465 uses implicit TLS, anything else
/// STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let from: Mailbox = settings
            .user
            .parse()
            .map_err(|e| MailError::Address(format!("{}", e)))?;

        let builder = if settings.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = builder
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .port(settings.port)
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| MailError::Address(format!("{}", e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                message.html.clone(),
            ))
            .map_err(|e| MailError::Message(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| MailError::Transport(e.to_string()))
    }
}

/// Sends submission and contact notifications according to configuration.
///
/// A missing transport disables delivery entirely (logged, not an error); a
/// missing staff recipient skips only the staff copy. Transport failures
/// propagate so the endpoint boundary can convert them to a generic failure
/// response.
pub struct NotificationDispatcher {
    transport: Option<Arc<dyn MailTransport>>,
    staff_recipient: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(transport: Option<Arc<dyn MailTransport>>, staff_recipient: Option<String>) -> Self {
        Self {
            transport,
            staff_recipient,
        }
    }

    /// Send the staff summary and the applicant confirmation for one
    /// submission. Both sends run concurrently and both are awaited before
    /// reporting; either failing fails the dispatch.
    pub async fn dispatch_application(
        &self,
        staff_content: &MessageContent,
        confirmation_content: &MessageContent,
        applicant_email: &str,
    ) -> Result<(), MailError> {
        let Some(transport) = &self.transport else {
            tracing::warn!("Mail transport not configured; skipping notification delivery");
            return Ok(());
        };

        let staff_message = self
            .staff_recipient
            .as_deref()
            .map(|recipient| staff_content.addressed_to(recipient));
        let confirmation_message = confirmation_content.addressed_to(applicant_email);

        let staff_send = async {
            match &staff_message {
                Some(message) => transport.send(message).await,
                None => {
                    tracing::warn!("No staff recipient configured; skipping staff copy");
                    Ok(())
                }
            }
        };
        let confirmation_send = transport.send(&confirmation_message);

        let (staff_result, confirmation_result) = tokio::join!(staff_send, confirmation_send);
        staff_result.and(confirmation_result)
    }

    /// Send a contact-form message to staff. Skipped silently when either the
    /// transport or the staff recipient is unconfigured.
    pub async fn dispatch_contact(&self, content: &MessageContent) -> Result<(), MailError> {
        let (Some(transport), Some(recipient)) = (&self.transport, &self.staff_recipient) else {
            tracing::warn!("Contact notification skipped; mail delivery not fully configured");
            return Ok(());
        };

        transport.send(&content.addressed_to(recipient)).await
    }
}
