use lettre::transport::smtp::authentication;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::str::FromStr;
use std::time::Duration;

use crate::{OutgoingEmail, SmtpError};

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS from the first byte (usually port 465).
    Implicit,
    /// Plain connection upgraded with STARTTLS; the upgrade is mandatory.
    #[default]
    StartTls,
    /// No encryption. Only allowed without credentials.
    None,
}

impl FromStr for TlsMode {
    type Err = SmtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" => Ok(TlsMode::Implicit),
            "starttls" => Ok(TlsMode::StartTls),
            "none" => Ok(TlsMode::None),
            other => Err(SmtpError::UnknownTlsMode(other.to_string())),
        }
    }
}

/// Connection settings for an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpRelay {
    host: String,
    port: u16,
    tls: TlsMode,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl SmtpRelay {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            tls: TlsMode::default(),
            credentials: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the pooled transport. Credentials are only ever paired with
    /// an encrypted connection.
    pub fn build(&self) -> Result<SmtpMailer, SmtpError> {
        let builder = match self.tls {
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)?,
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?,
            TlsMode::None => {
                if self.credentials.is_some() {
                    return Err(SmtpError::InsecureCredentials {
                        host: self.host.clone(),
                    });
                }
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
            }
        };

        let mut builder = builder.port(self.port).timeout(Some(self.timeout));
        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(authentication::Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ));
        }

        tracing::debug!(host = %self.host, port = self.port, tls = ?self.tls, "SMTP transport ready");
        Ok(SmtpMailer {
            transport: builder.build(),
        })
    }
}

/// Sends messages through a pooled async SMTP transport.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SmtpMailer(..)")
    }
}

impl SmtpMailer {
    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), SmtpError> {
        let response = self.transport.send(email.to_message()?).await?;
        tracing::debug!(code = %response.code(), "relay accepted message");
        Ok(())
    }
}
