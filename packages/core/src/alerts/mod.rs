//! Alert delivery: the mail transport seam and the dispatcher on top of it.

pub mod dispatcher;
pub mod mailer;

pub use dispatcher::AlertDispatcher;
pub use mailer::{AlertMessage, MailError, MailTransport, SmtpMailer};
