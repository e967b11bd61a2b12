use async_trait::async_trait;
use folio_types::{Education, Link, NewMessage, Project, Skill, User};
use uuid::Uuid;

use super::{HealthCheck, ResumeStore};

const USER_COLUMNS: &str =
    "id, name, headline, summary, contact, links, skills, projects, education, inbox";

#[derive(Clone)]
pub struct SqlxStore {
    db: sqlx::Pool<sqlx::Postgres>,
}

impl SqlxStore {
    pub fn new(db: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResumeStore for SqlxStore {
    async fn find_users_by_name(&self, name: &str) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name = $1 ORDER BY id"
        ))
        .bind(name)
        .fetch_all(&self.db)
        .await
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    async fn find_links(&self, ids: &[Uuid]) -> Result<Vec<Link>, sqlx::Error> {
        sqlx::query_as::<_, Link>(
            r#"
            SELECT id, name, url, icon
            FROM links
            WHERE id = ANY($1)
            ORDER BY array_position($1, id)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
    }

    async fn find_skills(&self, ids: &[Uuid]) -> Result<Vec<Skill>, sqlx::Error> {
        sqlx::query_as::<_, Skill>(
            r#"
            SELECT id, name, category, level
            FROM skills
            WHERE id = ANY($1)
            ORDER BY array_position($1, id)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
    }

    async fn find_projects(&self, ids: &[Uuid]) -> Result<Vec<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, url, image
            FROM projects
            WHERE id = ANY($1)
            ORDER BY array_position($1, id)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
    }

    async fn find_education(&self, id: Uuid) -> Result<Option<Education>, sqlx::Error> {
        sqlx::query_as::<_, Education>(
            r#"
            SELECT id, institution, degree, field_of_study, start_date, end_date, description
            FROM education
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Uuid, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO messages (from_name, from_email, content, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&message.from_name)
        .bind(&message.from_email)
        .bind(&message.content)
        .bind(message.created_at)
        .fetch_one(&self.db)
        .await
    }

    async fn append_to_inbox(
        &self,
        user_id: Uuid,
        message_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET inbox = array_append(inbox, $2)
            WHERE id = $1 AND inbox IS NOT NULL
            "#,
        )
        .bind(user_id)
        .bind(message_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl HealthCheck for sqlx::Pool<sqlx::Postgres> {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(self).await.map(|_| ())
    }
}
