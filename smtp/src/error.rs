use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("refusing to send credentials to {host} without TLS")]
    InsecureCredentials { host: String },
    #[error("unknown TLS mode {0:?}, expected one of tls, starttls, none")]
    UnknownTlsMode(String),
}
