use async_trait::async_trait;
use folio_types::{Education, Link, NewMessage, Project, Skill, User};
use uuid::Uuid;

mod postgres;

pub use postgres::SqlxStore;

/// Everything the HTTP layer needs from the resume database.
///
/// Persisting a message and linking it to an inbox are two separate calls
/// with no atomicity across them.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn find_users_by_name(&self, name: &str) -> Result<Vec<User>, sqlx::Error>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;

    async fn find_links(&self, ids: &[Uuid]) -> Result<Vec<Link>, sqlx::Error>;

    async fn find_skills(&self, ids: &[Uuid]) -> Result<Vec<Skill>, sqlx::Error>;

    async fn find_projects(&self, ids: &[Uuid]) -> Result<Vec<Project>, sqlx::Error>;

    async fn find_education(&self, id: Uuid) -> Result<Option<Education>, sqlx::Error>;

    /// Returns the id assigned to the new message.
    async fn insert_message(&self, message: &NewMessage) -> Result<Uuid, sqlx::Error>;

    /// Appends `message_id` to the user's inbox. Returns `false` when no user
    /// with an inbox matched.
    async fn append_to_inbox(&self, user_id: Uuid, message_id: Uuid)
    -> Result<bool, sqlx::Error>;
}

/// Readiness probe for a database connection.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), sqlx::Error>;
}
