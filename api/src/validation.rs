use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::error::SubmitError;

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_NAME_PART_LENGTH: usize = 25;
pub const MAX_MESSAGE_LENGTH: usize = 300;

// ASCII word characters only, with single `.` or `-` separators.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?-u:\w)+([.-]?(?-u:\w)+)*@(?-u:\w)+([.-]?(?-u:\w)+)*(\.(?-u:\w){2,})+$")
        .expect("valid regex")
});

/// The three text fields after the presence check.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

pub fn parse_user_id(user_id: Option<&str>) -> Result<Uuid, SubmitError> {
    user_id
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or(SubmitError::InvalidUserId)
}

pub fn require_fields<'a>(
    name: Option<&'a str>,
    email: Option<&'a str>,
    message: Option<&'a str>,
) -> Result<Fields<'a>, SubmitError> {
    match (name, email, message) {
        (Some(name), Some(email), Some(message))
            if !name.is_empty() && !email.is_empty() && !message.is_empty() =>
        {
            Ok(Fields {
                name,
                email,
                message,
            })
        }
        _ => Err(SubmitError::MissingFields),
    }
}

/// Returns the trimmed name if it looks like "first name + surname".
pub fn check_name(name: &str) -> Result<&str, SubmitError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SubmitError::EmptyName);
    }
    if name.chars().any(|c| c.is_ascii_digit()) {
        return Err(SubmitError::NameHasDigits);
    }

    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(SubmitError::NameNeedsSurname);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(SubmitError::NameTooLong);
    }
    if parts
        .iter()
        .any(|part| part.chars().count() > MAX_NAME_PART_LENGTH)
    {
        return Err(SubmitError::NamePartTooLong);
    }

    Ok(name)
}

pub fn check_email_syntax(email: &str) -> Result<(), SubmitError> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(SubmitError::InvalidEmail)
    }
}

/// Returns the trimmed message.
pub fn check_message(message: &str) -> Result<&str, SubmitError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(SubmitError::EmptyMessage);
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(SubmitError::MessageTooLong);
    }
    Ok(message)
}
