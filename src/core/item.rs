//! Item model and request validation.
//!
//! `Item` is what the store persists. `ItemDraft` is what clients send: every
//! field is optional at the JSON level so a missing field is reported as a
//! field violation in [`ErrorMessage`] instead of a deserialization failure.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status written to every item touched by batch processing.
pub const STATUS_PROCESSED: &str = "PROCESSED";

/// Top-level message of every validation failure payload.
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation Failed";

pub const NAME_REQUIRED_MESSAGE: &str = "name cannot be empty";
pub const DESCRIPTION_REQUIRED_MESSAGE: &str = "description cannot be empty";
pub const STATUS_REQUIRED_MESSAGE: &str = "status cannot be empty";
pub const EMAIL_INVALID_MESSAGE: &str = "Invalid email format";

lazy_static::lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,63}$")
            .expect("email pattern is a valid regex");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Assigned by the store on first save, never changed afterwards.
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            status: status.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_processed(&self) -> bool {
        self.status == STATUS_PROCESSED
    }

    pub fn mark_processed(&mut self) {
        self.status = STATUS_PROCESSED.to_string();
    }
}

/// Client payload for create and full update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ItemDraft {
    /// Checks every field and returns all violations at once.
    pub fn validate(self) -> Result<Item, ErrorMessage> {
        let mut errors = ErrorMessage::validation_failed();

        let name = required(self.name, "name", NAME_REQUIRED_MESSAGE, &mut errors);
        let description = required(
            self.description,
            "description",
            DESCRIPTION_REQUIRED_MESSAGE,
            &mut errors,
        );
        let status = required(self.status, "status", STATUS_REQUIRED_MESSAGE, &mut errors);

        if let Some(email) = self.email.as_deref()
            && !is_valid_email(email)
        {
            errors.insert("email", EMAIL_INVALID_MESSAGE);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Item {
            id: None,
            name: name.unwrap_or_default(),
            description: description.unwrap_or_default(),
            status: status.unwrap_or_default(),
            email: self.email,
        })
    }
}

impl From<Item> for ItemDraft {
    fn from(item: Item) -> Self {
        Self {
            name: Some(item.name),
            description: Some(item.description),
            status: Some(item.status),
            email: item.email,
        }
    }
}

fn required(
    value: Option<String>,
    field: &str,
    message: &str,
    errors: &mut ErrorMessage,
) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            errors.insert(field, message);
            None
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validation failure payload: a summary plus one message per invalid field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn validation_failed() -> Self {
        Self::new(VALIDATION_FAILED_MESSAGE)
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.details.insert(field.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn detail(&self, field: &str) -> Option<&str> {
        self.details.get(field).map(String::as_str)
    }
}
