//! Outbound mail for inbox notifications, on top of lettre's async SMTP transport.

mod email;
mod error;
mod relay;

pub use email::OutgoingEmail;
pub use error::SmtpError;
pub use relay::{Credentials, SmtpMailer, SmtpRelay, TlsMode};
