use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde_json::Value;
use uuid::Uuid;

use super::timestamp::{decode, decode_json, encode, now};
use super::{
    AnalysisResult, ChatConversation, ChatMessage, NewAnalysisResult, NewChatConversation,
    NewChatMessage, NewRecommendationItem, NewRecommendationSet, NewUser, User,
};
use crate::error::{StorageError, StorageResult};
use crate::types::{Language, RecommendationItem, RecommendationSet, Role};

pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    photo_url TEXT,
    created_at TEXT NOT NULL,
    dark_mode INTEGER NOT NULL DEFAULT 0,
    language TEXT NOT NULL DEFAULT 'en'
);

CREATE TABLE IF NOT EXISTS chat_conversations (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL REFERENCES chat_conversations(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS analysis_results (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    data TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recommendation_sets (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    summary TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recommendation_items (
    id TEXT PRIMARY KEY,
    set_id TEXT NOT NULL REFERENCES recommendation_sets(id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    confidence TEXT NOT NULL,
    data TEXT NOT NULL,
    source TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conversations_user ON chat_conversations(user_id);
CREATE INDEX IF NOT EXISTS idx_messages_conversation ON chat_messages(conversation_id);
CREATE INDEX IF NOT EXISTS idx_analysis_user ON analysis_results(user_id);
CREATE INDEX IF NOT EXISTS idx_sets_user ON recommendation_sets(user_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_items_set ON recommendation_items(set_id);
";

/// SQLite-backed store for every table in the schema.
///
/// One `Connection` behind `Arc<Mutex<>>`; each operation runs on the Tokio
/// blocking pool through [`with_conn`](Self::with_conn).
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// Open (or create) a file-backed database, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Task(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(&path)?;
        Self::configure_and_init(conn, path)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure_and_init(conn, PathBuf::from(":memory:"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn configure_and_init(conn: Connection, path: PathBuf) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        // cascades depend on this
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;
        tracing::debug!(path = %path.display(), "database ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    async fn with_conn<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StorageError::Task(format!("database lock poisoned: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StorageError::Task(format!("join error: {e}")))?
    }

    // ── users ─────────────────────────────────────────────────────────

    pub async fn insert_user(&self, new: NewUser) -> StorageResult<User> {
        new.validate()?;
        let user = User {
            id: new.id,
            email: new.email.trim().to_string(),
            name: new.name,
            photo_url: new.photo_url,
            created_at: now(),
            dark_mode: new.dark_mode.unwrap_or(false),
            language: new.language.unwrap_or_else(|| Language::En.code().to_string()),
        };
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO users (id, email, name, photo_url, created_at, dark_mode, language)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.id,
                    user.email,
                    user.name,
                    user.photo_url,
                    encode(user.created_at),
                    user.dark_mode,
                    user.language
                ],
            )
            .map_err(unique_violation)?;
            Ok(user)
        })
        .await
    }

    pub async fn get_user(&self, id: &str) -> StorageResult<Option<User>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT id, email, name, photo_url, created_at, dark_mode, language
                     FROM users WHERE id = ?1",
                    params![id],
                    user_from_row,
                )
                .optional()?)
        })
        .await
    }

    pub async fn update_user_preferences(
        &self,
        id: &str,
        dark_mode: bool,
        language: Language,
    ) -> StorageResult<User> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE users SET dark_mode = ?2, language = ?3 WHERE id = ?1",
                params![id, dark_mode, language.code()],
            )?;
            if changed == 0 {
                return Err(StorageError::NotFound(format!("user {id}")));
            }
            Ok(conn.query_row(
                "SELECT id, email, name, photo_url, created_at, dark_mode, language
                 FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )?)
        })
        .await
    }

    /// Delete a user and, through the foreign keys, everything they own.
    pub async fn delete_user(&self, id: &str) -> StorageResult<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", params![id])? > 0))
            .await
    }

    // ── chat ──────────────────────────────────────────────────────────

    pub async fn insert_conversation(
        &self,
        new: NewChatConversation,
    ) -> StorageResult<ChatConversation> {
        new.validate()?;
        let created_at = now();
        let conversation = ChatConversation {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            title: new.title,
            created_at,
            updated_at: created_at,
        };
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO chat_conversations (id, user_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    conversation.id,
                    conversation.user_id,
                    conversation.title,
                    encode(conversation.created_at),
                    encode(conversation.updated_at)
                ],
            )?;
            Ok(conversation)
        })
        .await
    }

    /// Conversations for a user, most recently updated first.
    pub async fn list_conversations(&self, user_id: &str) -> StorageResult<Vec<ChatConversation>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, created_at, updated_at FROM chat_conversations
                 WHERE user_id = ?1 ORDER BY updated_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map(params![user_id], conversation_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn rename_conversation(&self, id: &str, title: &str) -> StorageResult<()> {
        if title.trim().is_empty() {
            return Err(StorageError::invalid("title", "must not be empty"));
        }
        let (id, title) = (id.to_string(), title.to_string());
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE chat_conversations SET title = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, title, encode(now())],
            )?;
            if changed == 0 {
                return Err(StorageError::NotFound(format!("conversation {id}")));
            }
            Ok(())
        })
        .await
    }

    pub async fn delete_conversation(&self, id: &str) -> StorageResult<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            Ok(conn.execute("DELETE FROM chat_conversations WHERE id = ?1", params![id])? > 0)
        })
        .await
    }

    pub async fn insert_message(&self, new: NewChatMessage) -> StorageResult<ChatMessage> {
        new.validate()?;
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            conversation_id: new.conversation_id,
            role: new.role,
            content: new.content,
            created_at: now(),
        };
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO chat_messages (id, conversation_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.id,
                    message.conversation_id,
                    message.role.as_str(),
                    message.content,
                    encode(message.created_at)
                ],
            )?;
            tx.execute(
                "UPDATE chat_conversations SET updated_at = ?2 WHERE id = ?1",
                params![message.conversation_id, encode(message.created_at)],
            )?;
            tx.commit()?;
            Ok(message)
        })
        .await
    }

    /// Messages of a conversation, oldest first.
    pub async fn list_messages(&self, conversation_id: &str) -> StorageResult<Vec<ChatMessage>> {
        let conversation_id = conversation_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, role, content, created_at FROM chat_messages
                 WHERE conversation_id = ?1 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt
                .query_map(params![conversation_id], message_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    // ── analysis ──────────────────────────────────────────────────────

    pub async fn insert_analysis_result(
        &self,
        new: NewAnalysisResult,
    ) -> StorageResult<AnalysisResult> {
        new.validate()?;
        let created_at = now();
        let result = AnalysisResult {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            kind: new.kind,
            data: new.data,
            created_at,
            updated_at: created_at,
        };
        let data = serde_json::to_string(&result.data)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO analysis_results (id, user_id, type, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    result.id,
                    result.user_id,
                    result.kind,
                    data,
                    encode(result.created_at),
                    encode(result.updated_at)
                ],
            )?;
            Ok(result)
        })
        .await
    }

    /// Analysis results for a user, newest first, optionally limited to one type.
    pub async fn list_analysis_results(
        &self,
        user_id: &str,
        kind: Option<&str>,
    ) -> StorageResult<Vec<AnalysisResult>> {
        let user_id = user_id.to_string();
        let kind = kind.map(str::to_string);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, type, data, created_at, updated_at FROM analysis_results
                 WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2)
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map(params![user_id, kind], analysis_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn update_analysis_data(&self, id: &str, data: Value) -> StorageResult<AnalysisResult> {
        if data.is_null() {
            return Err(StorageError::invalid("data", "must not be null"));
        }
        let id = id.to_string();
        let data = serde_json::to_string(&data)?;
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE analysis_results SET data = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, data, encode(now())],
            )?;
            if changed == 0 {
                return Err(StorageError::NotFound(format!("analysis result {id}")));
            }
            Ok(conn.query_row(
                "SELECT id, user_id, type, data, created_at, updated_at
                 FROM analysis_results WHERE id = ?1",
                params![id],
                analysis_from_row,
            )?)
        })
        .await
    }

    // ── recommendations ───────────────────────────────────────────────

    /// Insert a set and its items in one transaction.
    pub async fn insert_recommendation_set(
        &self,
        new: NewRecommendationSet,
        items: Vec<NewRecommendationItem>,
    ) -> StorageResult<RecommendationSet> {
        new.validate()?;
        for item in &items {
            item.validate()?;
        }
        let created_at = now();
        let set_id = Uuid::new_v4().to_string();
        let items = items
            .into_iter()
            .map(|item| RecommendationItem {
                id: Uuid::new_v4().to_string(),
                set_id: set_id.clone(),
                kind: item.kind,
                title: item.title,
                description: item.description,
                confidence: item.confidence,
                data: item.data,
                source: item.source,
                created_at: Some(created_at),
            })
            .collect::<Vec<_>>();
        let set = RecommendationSet {
            id: set_id,
            user_id: new.user_id,
            summary: new.summary,
            created_at: Some(created_at),
            items,
        };

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO recommendation_sets (id, user_id, summary, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![set.id, set.user_id, set.summary, encode(created_at)],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO recommendation_items
                     (id, set_id, type, title, description, confidence, data, source, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )?;
                for item in &set.items {
                    stmt.execute(params![
                        item.id,
                        item.set_id,
                        item.kind,
                        item.title,
                        item.description,
                        item.confidence,
                        serde_json::to_string(&item.data)?,
                        item.source,
                        encode(created_at)
                    ])?;
                }
            }
            tx.commit()?;
            Ok(set)
        })
        .await
    }

    /// Every set owned by `user_id`, newest first, each with its items.
    pub async fn list_recommendation_sets(
        &self,
        user_id: &str,
    ) -> StorageResult<Vec<RecommendationSet>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut sets = {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, summary, created_at FROM recommendation_sets
                     WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
                )?;
                stmt.query_map(params![user_id], set_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            };
            let mut stmt = conn.prepare(
                "SELECT id, set_id, type, title, description, confidence, data, source, created_at
                 FROM recommendation_items WHERE set_id = ?1 ORDER BY rowid ASC",
            )?;
            for set in &mut sets {
                set.items = stmt
                    .query_map(params![set.id], item_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
            }
            Ok(sets)
        })
        .await
    }

    pub async fn delete_recommendation_set(&self, id: &str) -> StorageResult<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            Ok(conn.execute("DELETE FROM recommendation_sets WHERE id = ?1", params![id])? > 0)
        })
        .await
    }
}

fn unique_violation(err: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(_, Some(message)) = &err {
        if message.contains("users.email") {
            return StorageError::invalid("email", "already registered");
        }
        if message.contains("users.id") {
            return StorageError::invalid("id", "already registered");
        }
    }
    StorageError::Sqlite(err)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        photo_url: row.get(3)?,
        created_at: decode(4, &row.get::<_, String>(4)?)?,
        dark_mode: row.get(5)?,
        language: row.get(6)?,
    })
}

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<ChatConversation> {
    Ok(ChatConversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        created_at: decode(3, &row.get::<_, String>(3)?)?,
        updated_at: decode(4, &row.get::<_, String>(4)?)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let role: String = row.get(2)?;
    let role = role.parse::<Role>().map_err(|reason| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, reason.into())
    })?;
    Ok(ChatMessage {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role,
        content: row.get(3)?,
        created_at: decode(4, &row.get::<_, String>(4)?)?,
    })
}

fn analysis_from_row(row: &Row<'_>) -> rusqlite::Result<AnalysisResult> {
    Ok(AnalysisResult {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        data: decode_json(3, &row.get::<_, String>(3)?)?,
        created_at: decode(4, &row.get::<_, String>(4)?)?,
        updated_at: decode(5, &row.get::<_, String>(5)?)?,
    })
}

fn set_from_row(row: &Row<'_>) -> rusqlite::Result<RecommendationSet> {
    Ok(RecommendationSet {
        id: row.get(0)?,
        user_id: row.get(1)?,
        summary: row.get(2)?,
        created_at: Some(decode(3, &row.get::<_, String>(3)?)?),
        items: Vec::new(),
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<RecommendationItem> {
    Ok(RecommendationItem {
        id: row.get(0)?,
        set_id: row.get(1)?,
        kind: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        confidence: row.get(5)?,
        data: decode_json(6, &row.get::<_, String>(6)?)?,
        source: row.get(7)?,
        created_at: Some(decode(8, &row.get::<_, String>(8)?)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_creates_tables() {
        let db = Database::open_in_memory().expect("should open in-memory DB");
        assert_eq!(db.path().to_str().unwrap(), ":memory:");

        let conn = db.conn.lock().unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();

        for table in [
            "analysis_results",
            "chat_conversations",
            "chat_messages",
            "recommendation_items",
            "recommendation_sets",
            "users",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL).expect("re-running schema");
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn.lock().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_validation_error() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(NewUser::new("u1", "ana@example.com", "Ana"))
            .await
            .unwrap();
        let err = db
            .insert_user(NewUser::new("u2", "ana@example.com", "Other Ana"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation { field: "email", .. }));
    }

    #[tokio::test]
    async fn user_defaults_apply_on_insert() {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .insert_user(NewUser::new("u1", "ana@example.com", "Ana"))
            .await
            .unwrap();
        assert!(!user.dark_mode);
        assert_eq!(user.language, "en");
        let stored = db.get_user("u1").await.unwrap().unwrap();
        assert_eq!(stored, user);
    }
}
