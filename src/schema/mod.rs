//! Relational schema: row types, insert records and their validation.
//!
//! Insert records leave out everything the database fills in (ids and
//! timestamps). [`Database`] owns the tables and enforces the cascading
//! foreign keys.

mod db;
mod timestamp;

pub use db::{Database, SCHEMA_SQL};

use crate::error::{StorageError, StorageResult};
use crate::types::{Language, Role, Theme, UserSettings};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub dark_mode: bool,
    pub language: String,
}

impl User {
    /// Display preferences derived from the stored profile columns.
    pub fn settings(&self) -> UserSettings {
        let mut settings = UserSettings::for_user(&self.id);
        settings.theme = if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        };
        settings.language = Language::from_code(&self.language);
        settings.created_at = self.created_at;
        settings
    }
}

/// A user row to insert. The id comes from the external auth provider.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub dark_mode: Option<bool>,
    #[serde(default)]
    pub language: Option<String>,
}

impl NewUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            photo_url: None,
            dark_mode: None,
            language: None,
        }
    }

    pub fn validate(&self) -> StorageResult<()> {
        require("id", &self.id)?;
        require("name", &self.name)?;
        validate_email(&self.email)?;
        if let Some(language) = &self.language {
            require("language", language)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatConversation {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewChatConversation {
    pub user_id: String,
    pub title: String,
}

impl NewChatConversation {
    pub fn validate(&self) -> StorageResult<()> {
        require("user_id", &self.user_id)?;
        require("title", &self.title)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewChatMessage {
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
}

impl NewChatMessage {
    /// Build from an untyped role string, rejecting anything but user/assistant/system.
    pub fn parse(
        conversation_id: impl Into<String>,
        role: &str,
        content: impl Into<String>,
    ) -> StorageResult<Self> {
        let role = role
            .parse::<Role>()
            .map_err(|reason| StorageError::invalid("role", reason))?;
        Ok(Self {
            conversation_id: conversation_id.into(),
            role,
            content: content.into(),
        })
    }

    pub fn validate(&self) -> StorageResult<()> {
        require("conversation_id", &self.conversation_id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewAnalysisResult {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

impl NewAnalysisResult {
    pub fn validate(&self) -> StorageResult<()> {
        require("user_id", &self.user_id)?;
        require("type", &self.kind)?;
        require_data(&self.data)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewRecommendationSet {
    pub user_id: String,
    pub summary: String,
}

impl NewRecommendationSet {
    pub fn validate(&self) -> StorageResult<()> {
        require("user_id", &self.user_id)?;
        require("summary", &self.summary)
    }
}

/// An item to insert; the owning set id is supplied by the insert call.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewRecommendationItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub confidence: String,
    pub data: Value,
    pub source: String,
}

impl NewRecommendationItem {
    pub fn validate(&self) -> StorageResult<()> {
        require("type", &self.kind)?;
        require("title", &self.title)?;
        require("confidence", &self.confidence)?;
        require("source", &self.source)?;
        require_data(&self.data)
    }
}

fn require(field: &'static str, value: &str) -> StorageResult<()> {
    if value.trim().is_empty() {
        return Err(StorageError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn require_data(data: &Value) -> StorageResult<()> {
    if data.is_null() {
        return Err(StorageError::invalid("data", "must not be null"));
    }
    Ok(())
}

fn validate_email(email: &str) -> StorageResult<()> {
    let valid = match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StorageError::invalid("email", format!("'{email}' is not an email address")))
    }
}
