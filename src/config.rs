use crate::types::AuthUser;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Bundled defaults for builds that ship without a `.env` (mobile, web).
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    // .env wins on desktop dev; anything it leaves unset comes from the bundle
    let _ = dotenvy::dotenv();
    load_bundled_config();
}

#[cfg(target_arch = "wasm32")]
pub fn load_dotenv() {
    load_bundled_config();
}

fn load_bundled_config() {
    for (key, value) in parse_env_lines(BUNDLED_CONFIG) {
        // Only set if not already set (allow env override)
        if env::var(key).is_err() {
            // SAFETY: called once at startup before any threads are spawned
            unsafe {
                env::set_var(key, value);
            }
        }
    }
}

fn parse_env_lines(source: &str) -> impl Iterator<Item = (&str, &str)> {
    source.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim()))
    })
}

/// Settings shared by the API client, the local database and the session.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub timeout: Duration,
    pub db_path: PathBuf,
    pub session_user: Option<AuthUser>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            db_path: default_db_path(),
            session_user: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base = env::var("FINSIGHT_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let timeout = match env::var("FINSIGHT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e| {
                    anyhow::anyhow!("FINSIGHT_HTTP_TIMEOUT_SECS must be a whole number: {e}")
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let db_path = env::var("FINSIGHT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        let session_user = env::var("FINSIGHT_USER_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .map(|id| AuthUser {
                id,
                email: env::var("FINSIGHT_USER_EMAIL").ok(),
                name: env::var("FINSIGHT_USER_NAME").ok(),
            });

        Ok(Self::default()
            .with_api_base(api_base)
            .with_timeout(timeout)
            .with_db_path(db_path)
            .with_session_user(session_user))
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = normalize_base(&base.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_session_user(mut self, user: Option<AuthUser>) -> Self {
        self.session_user = user;
        self
    }
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

fn default_db_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("finsight").join("finsight.db");
    }
    PathBuf::from("cache").join("finsight.db")
}
