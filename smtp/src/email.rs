use lettre::Message;
use lettre::message::{Mailbox, MultiPart};

use crate::SmtpError;

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingEmail {
    pub fn new(from: &str, to: &str, subject: impl Into<String>) -> Result<Self, SmtpError> {
        Ok(Self {
            from: Mailbox::new(None, from.parse()?),
            to: Mailbox::new(None, to.parse()?),
            subject: subject.into(),
            text: String::new(),
            html: String::new(),
        })
    }

    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from.name = Some(sanitize(&name.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// Builds a multipart/alternative message with the plain text and HTML bodies.
    pub fn to_message(&self) -> Result<Message, SmtpError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(sanitize(&self.subject))
            .multipart(MultiPart::alternative_plain_html(
                self.text.clone(),
                self.html.clone(),
            ))?;
        Ok(message)
    }
}

// Header values must never carry a line break, or the caller could inject headers.
fn sanitize(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
