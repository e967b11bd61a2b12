use async_trait::async_trait;
use folio_smtp::{OutgoingEmail, SmtpError, SmtpMailer};

const INBOX_DISPLAY_NAME: &str = "Personal Resume Inbox";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub from_name: String,
    pub from_email: String,
    pub content: String,
}

impl Notification {
    pub fn subject(&self) -> String {
        format!("New message from {}", self.from_name)
    }

    pub fn text_body(&self) -> String {
        format!(
            "You have received a new message.\n\nFrom: {} <{}>\n\nMessage:\n{}",
            self.from_name, self.from_email, self.content
        )
    }

    pub fn html_body(&self) -> String {
        format!(
            "<p>You have received a new message.</p>\n\
             <p><strong>From:</strong> {} &lt;{}&gt;</p>\n\
             <p><strong>Message:</strong><br>{}</p>",
            escape_html(&self.from_name),
            escape_html(&self.from_email),
            escape_html(&self.content).replace('\n', "<br>")
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), SmtpError>;
}

/// Sends notifications through an SMTP relay, from the relay account itself.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    mailer: SmtpMailer,
    sender: String,
}

impl SmtpNotifier {
    pub fn new(mailer: SmtpMailer, sender: impl Into<String>) -> Self {
        Self {
            mailer,
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), SmtpError> {
        let email = OutgoingEmail::new(&self.sender, &notification.to, notification.subject())?
            .from_name(INBOX_DISPLAY_NAME)
            .text(notification.text_body())
            .html(notification.html_body());

        self.mailer.send(&email).await
    }
}
