//! In-memory stand-ins for the database, the verification API and the mail relay.

use async_trait::async_trait;
use folio_smtp::SmtpError;
use folio_types::{Contact, Education, Link, Message, NewMessage, Project, Skill, User};
use std::sync::Mutex;
use std::time::Duration;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::crypto::FieldCipher;
use crate::notifier::{Notification, Notifier};
use crate::store::{HealthCheck, ResumeStore};
use crate::verifier::EmailVerifier;

pub const TEST_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

pub fn test_cipher() -> FieldCipher {
    FieldCipher::from_hex(TEST_KEY).unwrap()
}

/// A user with an empty inbox and, optionally, an encrypted contact email.
pub fn user_with_inbox(name: &str, email: Option<&str>) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        headline: None,
        summary: None,
        contact: Contact {
            email: email.map(|email| test_cipher().encrypt(email)),
            ..Contact::default()
        },
        links: vec![],
        skills: vec![],
        projects: vec![],
        education: vec![],
        inbox: Some(vec![]),
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    messages: Vec<Message>,
    links: Vec<Link>,
    skills: Vec<Skill>,
    projects: Vec<Project>,
    education: Vec<Education>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_reads: AtomicBool,
    fail_inbox_updates: AtomicBool,
}

impl MemoryStore {
    pub fn add_user(&self, user: User) {
        self.tables.lock().unwrap().users.push(user);
    }

    pub fn add_link(&self, link: Link) {
        self.tables.lock().unwrap().links.push(link);
    }

    pub fn add_skill(&self, skill: Skill) {
        self.tables.lock().unwrap().skills.push(skill);
    }

    pub fn add_project(&self, project: Project) {
        self.tables.lock().unwrap().projects.push(project);
    }

    pub fn add_education(&self, education: Education) {
        self.tables.lock().unwrap().education.push(education);
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn message(&self, id: Uuid) -> Option<Message> {
        self.messages().into_iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> Vec<Message> {
        self.tables.lock().unwrap().messages.clone()
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_inbox_updates(&self) {
        self.fail_inbox_updates.store(true, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), sqlx::Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

fn select<T: Clone>(rows: &[T], ids: &[Uuid], id: impl Fn(&T) -> Uuid) -> Vec<T> {
    ids.iter()
        .filter_map(|wanted| rows.iter().find(|row| id(row) == *wanted).cloned())
        .collect()
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn find_users_by_name(&self, name: &str) -> Result<Vec<User>, sqlx::Error> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().filter(|u| u.name == name).cloned().collect())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.check_reads()?;
        Ok(self.user(id))
    }

    async fn find_links(&self, ids: &[Uuid]) -> Result<Vec<Link>, sqlx::Error> {
        self.check_reads()?;
        Ok(select(&self.tables.lock().unwrap().links, ids, |l| l.id))
    }

    async fn find_skills(&self, ids: &[Uuid]) -> Result<Vec<Skill>, sqlx::Error> {
        self.check_reads()?;
        Ok(select(&self.tables.lock().unwrap().skills, ids, |s| s.id))
    }

    async fn find_projects(&self, ids: &[Uuid]) -> Result<Vec<Project>, sqlx::Error> {
        self.check_reads()?;
        Ok(select(&self.tables.lock().unwrap().projects, ids, |p| p.id))
    }

    async fn find_education(&self, id: Uuid) -> Result<Option<Education>, sqlx::Error> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.education.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Uuid, sqlx::Error> {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().messages.push(Message {
            id,
            from_name: message.from_name.clone(),
            from_email: message.from_email.clone(),
            content: message.content.clone(),
            created_at: message.created_at,
        });
        Ok(id)
    }

    async fn append_to_inbox(
        &self,
        user_id: Uuid,
        message_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        if self.fail_inbox_updates.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let mut tables = self.tables.lock().unwrap();
        match tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .and_then(|u| u.inbox.as_mut())
        {
            Some(inbox) => {
                inbox.push(message_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Health probe with a fixed answer.
pub struct StaticProbe(pub bool);

#[async_trait]
impl HealthCheck for StaticProbe {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        if self.0 {
            Ok(())
        } else {
            Err(sqlx::Error::PoolClosed)
        }
    }
}

pub struct StaticVerifier {
    deliverable: bool,
    calls: AtomicUsize,
}

impl StaticVerifier {
    pub fn new(deliverable: bool) -> Self {
        Self {
            deliverable,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailVerifier for StaticVerifier {
    async fn is_deliverable(&self, _email: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.deliverable
    }
}

pub struct RecordingNotifier {
    sent: Option<mpsc::UnboundedSender<Notification>>,
    delay: Duration,
}

impl RecordingNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        Self::with_delay(Duration::ZERO)
    }

    /// Records each notification only after `delay`, like a slow relay.
    pub fn with_delay(delay: Duration) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                sent: Some(tx),
                delay,
            },
            rx,
        )
    }

    /// A notifier whose relay always refuses the message.
    pub fn failing() -> Self {
        Self {
            sent: None,
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), SmtpError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.sent {
            Some(tx) => {
                let _ = tx.send(notification.clone());
                Ok(())
            }
            None => Err(SmtpError::InsecureCredentials {
                host: "relay.invalid".to_string(),
            }),
        }
    }
}

pub fn sample_education() -> Education {
    Education {
        id: Uuid::new_v4(),
        institution: "Trinity College Dublin".to_string(),
        degree: Some("BSc".to_string()),
        field_of_study: Some("Computer Science".to_string()),
        start_date: Some("2015".to_string()),
        end_date: Some("2019".to_string()),
        description: None,
    }
}

pub fn sample_link(name: &str) -> Link {
    Link {
        id: Uuid::new_v4(),
        name: name.to_string(),
        url: Some(format!("https://{}.example.com", name.to_lowercase())),
        icon: None,
    }
}
