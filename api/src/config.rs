use folio_smtp::TlsMode;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::crypto::{CryptoError, FieldCipher};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SMTP_HOST: &str = "localhost";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_OWNER_NAME: &str = "Alam";
pub const DEFAULT_ABSTRACT_API_URL: &str = "https://emailvalidation.abstractapi.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("{name} must be a valid port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },
    #[error("SMTP_TLS must be one of tls, starttls, none, got {0:?}")]
    InvalidTlsMode(String),
    #[error("ENCRYPTION_KEY is invalid: {0}")]
    InvalidKey(#[from] CryptoError),
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct Config {
    pub personal_resume_db: DatabaseConfig,
    pub slot_scholars_db: DatabaseConfig,
    pub smtp: SmtpConfig,
    pub cipher: FieldCipher,
    pub abstract_api_key: String,
    pub abstract_api_url: String,
    pub owner_name: String,
    pub assets_dir: PathBuf,
    pub port: u16,
    pub verifier_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("personal_resume_db", &self.personal_resume_db)
            .field("slot_scholars_db", &self.slot_scholars_db)
            .field("smtp", &self.smtp)
            .field("cipher", &self.cipher)
            .field("abstract_api_key", &"<redacted>")
            .field("abstract_api_url", &self.abstract_api_url)
            .field("owner_name", &self.owner_name)
            .field("assets_dir", &self.assets_dir)
            .field("port", &self.port)
            .field("verifier_timeout", &self.verifier_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Every missing required
    /// variable is reported at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut missing = Vec::new();
        let mut require = |key: &'static str| {
            let value = get(key);
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let personal_resume_db = DatabaseConfig {
            uri: require("PERSONAL_RESUME_URI"),
            name: require("PERSONAL_RESUME_DBNAME"),
        };
        let slot_scholars_db = DatabaseConfig {
            uri: require("SLOT_SCHOLARS_URI"),
            name: require("SLOT_SCHOLARS_DBNAME"),
        };
        let smtp_user = require("SMTP_USER");
        let smtp_password = require("SMTP_PASS");
        let encryption_key = require("ENCRYPTION_KEY");
        let abstract_api_key = require("ABSTRACT_API_KEY");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let cipher = FieldCipher::from_hex(&encryption_key)?;

        Ok(Self {
            personal_resume_db,
            slot_scholars_db,
            smtp: SmtpConfig {
                host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: parse_port("SMTP_PORT", get("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
                tls: match get("SMTP_TLS") {
                    None => TlsMode::default(),
                    Some(value) => value
                        .parse()
                        .map_err(|_| ConfigError::InvalidTlsMode(value))?,
                },
                user: smtp_user,
                password: smtp_password,
            },
            cipher,
            abstract_api_key,
            abstract_api_url: get("ABSTRACT_API_URL")
                .unwrap_or_else(|| DEFAULT_ABSTRACT_API_URL.to_string()),
            owner_name: get("OWNER_NAME").unwrap_or_else(|| DEFAULT_OWNER_NAME.to_string()),
            assets_dir: get("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./assets")),
            port: parse_port("PORT", get("PORT"), DEFAULT_PORT)?,
            verifier_timeout: Duration::from_secs(10),
        })
    }
}

fn parse_port(name: &'static str, value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("PERSONAL_RESUME_URI", "postgres://localhost/resume".to_string()),
            ("PERSONAL_RESUME_DBNAME", "resume".to_string()),
            ("SLOT_SCHOLARS_URI", "postgres://localhost/scholars".to_string()),
            ("SLOT_SCHOLARS_DBNAME", "scholars".to_string()),
            ("SMTP_USER", "inbox@example.com".to_string()),
            ("SMTP_PASS", "secret".to_string()),
            ("ENCRYPTION_KEY", KEY.to_string()),
            ("ABSTRACT_API_KEY", "abc123".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.smtp.host, DEFAULT_SMTP_HOST);
        assert_eq!(config.smtp.port, DEFAULT_SMTP_PORT);
        assert_eq!(config.smtp.tls, TlsMode::StartTls);
        assert_eq!(config.owner_name, "Alam");
        assert_eq!(config.abstract_api_url, DEFAULT_ABSTRACT_API_URL);
        assert_eq!(config.personal_resume_db.name, "resume");
        assert_eq!(config.assets_dir, PathBuf::from("./assets"));
    }

    #[test]
    fn test_overrides() {
        let mut env = base_env();
        env.insert("PORT", "8080".to_string());
        env.insert("SMTP_HOST", "mail.example.com".to_string());
        env.insert("SMTP_PORT", "2525".to_string());
        env.insert("OWNER_NAME", "Someone Else".to_string());
        env.insert("SMTP_TLS", "tls".to_string());

        let config = load(&env).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.smtp.host, "mail.example.com");
        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.owner_name, "Someone Else");
        assert_eq!(config.smtp.tls, TlsMode::Implicit);
    }

    #[test]
    fn test_bad_tls_mode() {
        let mut env = base_env();
        env.insert("SMTP_TLS", "ssl".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::InvalidTlsMode(value)) if value == "ssl"
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", load(&base_env()).unwrap());
        assert!(debug.contains("inbox@example.com"));
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("abc123"));
        assert!(!debug.contains(KEY));
    }

    #[test]
    fn test_reports_every_missing_variable() {
        let mut env = base_env();
        env.remove("SLOT_SCHOLARS_URI");
        env.remove("ABSTRACT_API_KEY");
        env.insert("SMTP_PASS", "   ".to_string());

        match load(&env) {
            Err(ConfigError::Missing(missing)) => {
                assert_eq!(missing, vec!["SLOT_SCHOLARS_URI", "SMTP_PASS", "ABSTRACT_API_KEY"])
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bad_key_is_fatal() {
        let mut env = base_env();
        env.insert("ENCRYPTION_KEY", "abcd".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::InvalidKey(CryptoError::InvalidKeyLength(2)))
        ));
    }

    #[test]
    fn test_bad_port() {
        let mut env = base_env();
        env.insert("PORT", "http".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::InvalidPort { name: "PORT", .. })
        ));
    }
}
