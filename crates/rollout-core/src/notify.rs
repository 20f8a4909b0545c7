//! Best-effort delivery of text reports to a human operator.

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};

use crate::config::MailConfig;
use crate::error::DeliveryError;

/// Delivers a pre-rendered text report.
pub trait Notifier {
    fn deliver(&self, report: &str) -> Result<(), DeliveryError>;
}

/// Deliver `report`, logging and swallowing any failure.
///
/// Returns whether delivery succeeded.
pub fn deliver_best_effort(notifier: &dyn Notifier, report: &str) -> bool {
    match notifier.deliver(report) {
        Ok(()) => {
            tracing::info!("Report delivered");
            true
        }
        Err(err) => {
            tracing::error!("Unable to send report: {}", err);
            false
        }
    }
}

/// Subject line for deployment notifications.
pub fn email_subject(app_name: Option<&str>, app_version: Option<&str>) -> String {
    format!(
        "App Deployment: {} {}",
        app_name.unwrap_or_default(),
        app_version.unwrap_or_default()
    )
    .trim_end()
    .to_string()
}

/// Sends reports as plain-text email over SMTP with STARTTLS.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
    subject: String,
}

impl SmtpNotifier {
    pub fn from_mail_config(
        mail: &MailConfig,
        subject: impl Into<String>,
    ) -> Result<Self, DeliveryError> {
        let missing = mail.missing_keys();
        if !missing.is_empty() {
            return Err(DeliveryError::NotConfigured(format!(
                "missing {} in [MAIL_CONFIG]",
                missing.join(", ")
            )));
        }

        // missing_keys() guarantees all three are present
        let sender = mail.sender_email.clone().unwrap_or_default();
        let password = mail.sender_password.clone().unwrap_or_default();
        let recipient = mail.recipient_email.clone().unwrap_or_default();

        let from = parse_mailbox(&sender)?;
        let to = parse_mailbox(&recipient)?;

        let transport = SmtpTransport::starttls_relay(mail.smtp_host())
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(mail.smtp_port())
            .credentials(Credentials::new(sender, password))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            subject: subject.into(),
        })
    }

    /// Build the message that [`Notifier::deliver`] would send.
    pub fn build_message(&self, report: &str) -> Result<Message, DeliveryError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(report.to_string())
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn deliver(&self, report: &str) -> Result<(), DeliveryError> {
        if report.trim().is_empty() {
            return Err(DeliveryError::Build("nothing to send".to_string()));
        }
        let message = self.build_message(report)?;
        self.transport
            .send(&message)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        tracing::debug!("Sent report to {}", self.to);
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::Address(format!("{address}: {e}")))
}
