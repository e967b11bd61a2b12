pub mod config;
pub mod crypto;
pub mod error;
pub mod json;
pub mod notifier;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;
pub mod verifier;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigError};
pub use crypto::{CryptoError, FieldCipher};
pub use error::{ApiError, SubmitError};
pub use notifier::{Notification, Notifier, SmtpNotifier};
pub use pipeline::{MessageIntake, Submission};
pub use routes::router;
pub use state::AppState;
pub use store::{HealthCheck, ResumeStore, SqlxStore};
pub use verifier::{AbstractApiVerifier, EmailVerifier};
