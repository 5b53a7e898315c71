use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// One suggestion inside a recommendation set, as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub id: String,
    #[serde(default)]
    pub set_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub source: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// A recommendation set together with its items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub items: Vec<RecommendationItem>,
}

/// Parameters for a generate request. The user id is injected from the session.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GenerateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(rename = "analysisId", skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerateParams {
    pub fn with_goal(goal: impl Into<String>) -> Self {
        Self {
            goal: Some(goal.into()),
            ..Self::default()
        }
    }
}

/// The signed-in user as known to the client session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Id,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Id => "id",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Id => "Bahasa Indonesia",
        }
    }

    /// Lenient parse used for stored user preferences; unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "id" => Language::Id,
            _ => Language::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-user display preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub user_id: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub language: Language,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserSettings {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            user_id: user_id.into(),
            theme: Theme::default(),
            language: Language::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self.updated_at = OffsetDateTime::now_utc();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self.updated_at = OffsetDateTime::now_utc();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_default_to_system_theme_and_english() {
        let settings = UserSettings::for_user("u1");
        assert_eq!(settings.theme, Theme::System);
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.created_at, settings.updated_at);
    }

    #[test]
    fn settings_fill_missing_fields_from_defaults() {
        let settings: UserSettings = serde_json::from_value(json!({
            "userId": "u1",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(settings.theme, Theme::System);
        assert_eq!(settings.language, Language::En);
    }

    #[test]
    fn settings_reject_unknown_language() {
        let result = serde_json::from_value::<UserSettings>(json!({
            "userId": "u1",
            "language": "fr",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn generate_params_flatten_extra_fields() {
        let mut params = GenerateParams::with_goal("save more");
        params.extra.insert("horizonMonths".into(), json!(6));
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({"goal": "save more", "horizonMonths": 6}));
    }

    #[test]
    fn recommendation_set_tolerates_missing_optional_fields() {
        let set: RecommendationSet = serde_json::from_value(json!({
            "id": "s1",
            "user_id": "u1",
            "summary": "Trim subscriptions",
            "created_at": "2024-05-01T10:00:00.000Z",
            "items": [{"id": "i1", "type": "tip", "title": "Cancel unused streaming"}]
        }))
        .unwrap();
        assert_eq!(set.items.len(), 1);
        assert_eq!(set.items[0].kind, "tip");
        assert!(set.created_at.is_some());
        assert!(set.items[0].created_at.is_none());
    }
}
