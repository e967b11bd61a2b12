use std::path::PathBuf;
use std::sync::Arc;

use crate::crypto::FieldCipher;
use crate::pipeline::MessageIntake;
use crate::store::{HealthCheck, ResumeStore};

/// Shared state handed to every handler. Owns the database handles for the
/// lifetime of the router; nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResumeStore>,
    pub intake: Arc<MessageIntake>,
    pub cipher: FieldCipher,
    pub owner_name: String,
    pub port: u16,
    pub assets_dir: PathBuf,
    pub databases: Vec<(&'static str, Arc<dyn HealthCheck>)>,
}
