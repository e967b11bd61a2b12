use chrono::Utc;
use folio_types::{NewMessage, User};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::crypto::FieldCipher;
use crate::error::SubmitError;
use crate::notifier::{Notification, Notifier};
use crate::store::ResumeStore;
use crate::validation;
use crate::verifier::EmailVerifier;

/// Body of `POST /SendNewMessage`. Every field is optional here so the
/// validation chain decides what "missing" means.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Validates contact messages, stores them in the recipient's inbox and
/// notifies the recipient.
pub struct MessageIntake {
    store: Arc<dyn ResumeStore>,
    verifier: Arc<dyn EmailVerifier>,
    notifier: Arc<dyn Notifier>,
    cipher: FieldCipher,
    notifications: TaskTracker,
}

impl MessageIntake {
    pub fn new(
        store: Arc<dyn ResumeStore>,
        verifier: Arc<dyn EmailVerifier>,
        notifier: Arc<dyn Notifier>,
        cipher: FieldCipher,
    ) -> Self {
        Self {
            store,
            verifier,
            notifier,
            cipher,
            notifications: TaskTracker::new(),
        }
    }

    /// Stops accepting notification tasks and waits up to `grace` for the
    /// ones in flight.
    pub async fn shutdown(&self, grace: Duration) {
        self.notifications.close();
        if self.notifications.is_empty() {
            return;
        }

        tracing::info!(pending = self.notifications.len(), "Waiting for notification emails");
        if tokio::time::timeout(grace, self.notifications.wait()).await.is_err() {
            tracing::warn!(
                dropped = self.notifications.len(),
                "Shutdown cut short notification emails still being sent"
            );
        }
    }

    /// Runs the whole pipeline and returns the id of the stored message.
    ///
    /// The notification is sent from a detached task, so its outcome never
    /// affects the result.
    pub async fn submit(&self, submission: &Submission) -> Result<Uuid, SubmitError> {
        let user_id = validation::parse_user_id(submission.user_id.as_deref())?;
        let fields = validation::require_fields(
            submission.name.as_deref(),
            submission.email.as_deref(),
            submission.message.as_deref(),
        )?;
        let name = validation::check_name(fields.name)?;
        validation::check_email_syntax(fields.email)?;
        if !self.verifier.is_deliverable(fields.email).await {
            return Err(SubmitError::Undeliverable);
        }
        let content = validation::check_message(fields.message)?;

        let recipient = match self.store.find_user(user_id).await? {
            Some(user) if user.inbox.is_some() => user,
            _ => return Err(SubmitError::RecipientNotFound),
        };

        let message = NewMessage {
            from_name: name.to_string(),
            from_email: self.cipher.encrypt(fields.email),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let message_id = self.store.insert_message(&message).await?;

        // No rollback past this point: a failed link leaves the message orphaned.
        match self.store.append_to_inbox(user_id, message_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(%message_id, %user_id, "orphaned message: recipient inbox vanished before linking");
                return Err(SubmitError::InboxNotUpdated);
            }
            Err(e) => {
                tracing::error!(%message_id, %user_id, "orphaned message: inbox update failed: {e}");
                return Err(SubmitError::Store(e));
            }
        }
        tracing::info!(%message_id, %user_id, "message stored");

        self.dispatch_notification(&recipient, name, fields.email, content);
        Ok(message_id)
    }

    fn dispatch_notification(&self, recipient: &User, from_name: &str, from_email: &str, content: &str) {
        let Some(to) = contact_address(&self.cipher, recipient) else {
            tracing::warn!(user_id = %recipient.id, "recipient has no usable contact email, skipping notification");
            return;
        };

        let notification = Notification {
            to,
            from_name: from_name.to_string(),
            from_email: from_email.to_string(),
            content: content.to_string(),
        };
        let notifier = Arc::clone(&self.notifier);

        self.notifications.spawn(async move {
            match notifier.notify(&notification).await {
                Ok(()) => tracing::info!("Notification email sent"),
                Err(e) => tracing::error!("Failed to send notification email: {e}"),
            }
        });
    }
}

/// The recipient's contact email in clear text. Rows written before contact
/// emails were encrypted still hold a plain address, which is accepted as is.
pub(crate) fn contact_address(cipher: &FieldCipher, user: &User) -> Option<String> {
    let stored = user.contact.email.as_deref()?;
    match cipher.decrypt(stored) {
        Ok(address) => Some(address),
        Err(_) if validation::check_email_syntax(stored).is_ok() => Some(stored.to_string()),
        Err(e) => {
            tracing::warn!(user_id = %user.id, "contact email cannot be decrypted: {e}");
            None
        }
    }
}
