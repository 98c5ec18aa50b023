//! Mail transport.
//!
//! [`MailTransport`] is the seam between alert dispatch and the wire.
//! [`SmtpMailer`] submits over STARTTLS with authentication; it is built
//! without connection pooling, so every send opens its own connection and
//! closes it when the exchange ends, whether it succeeded or not.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;

/// Upper bound on one SMTP exchange.
pub const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One plain-text alert email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

/// Errors from the mail transport
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address: {message}")]
    Address { message: String },

    #[error("Message build error: {message}")]
    Build { message: String },

    #[error("Authentication error: {message}")]
    Auth { message: String },

    #[error("SMTP error: {message}")]
    Transport { message: String },
}

/// Delivers alert messages to the configured recipient.
#[async_trait]
pub trait MailTransport {
    async fn send(&self, message: &AlertMessage) -> Result<(), MailError>;

    /// Name of this transport for logging/debugging
    fn name(&self) -> &str;
}

/// Authenticated STARTTLS submission via `lettre`.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from = parse_mailbox(&config.from)?;
        let to = parse_mailbox(&config.to)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|err| MailError::Transport {
                message: format!("Invalid SMTP relay {}: {}", config.host, err),
            })?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    fn build_message(&self, message: &AlertMessage) -> Result<Message, MailError> {
        build_message(&self.from, &self.to, message)
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, MailError> {
    raw.parse::<Mailbox>().map_err(|err| MailError::Address {
        message: format!("'{}': {}", raw, err),
    })
}

fn build_message(from: &Mailbox, to: &Mailbox, message: &AlertMessage) -> Result<Message, MailError> {
    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|err| MailError::Build {
            message: err.to_string(),
        })
}

/// Map a failed SMTP exchange to a [`MailError`] by its reply code.
///
/// 530, 534 and 535 are the authentication rejections; anything else,
/// including failures without a reply, is a transport error.
fn send_error(status: Option<u16>, message: String) -> MailError {
    match status {
        Some(530 | 534 | 535) => MailError::Auth { message },
        _ => MailError::Transport { message },
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &AlertMessage) -> Result<(), MailError> {
        let email = self.build_message(message)?;

        self.transport
            .send(email)
            .await
            .map_err(|err| send_error(err.status().map(u16::from), err.to_string()))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{AlertMessage, MailError, MailTransport};

    /// Records every message; optionally fails every send.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<AlertMessage>>,
        fail_with_auth: bool,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_with_auth: true,
            }
        }

        pub fn sent(&self) -> Vec<AlertMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingMailer {
        async fn send(&self, message: &AlertMessage) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(message.clone());
            if self.fail_with_auth {
                return Err(MailError::Auth {
                    message: "535 5.7.8 Username and Password not accepted".to_string(),
                });
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }
}
