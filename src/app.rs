use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::recommendations::Recommendations;
use crate::schema::Database;
use anyhow::Context;
use once_cell::sync::OnceCell;

static SERVICES: OnceCell<AppServices> = OnceCell::new();

/// Everything the UI needs that outlives a single render.
pub struct AppServices {
    pub recommendations: Recommendations,
    pub db: Option<Database>,
}

impl AppServices {
    pub fn from_config(config: ClientConfig) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config).context("failed to build HTTP client")?;
        let recommendations =
            Recommendations::new(api, QueryCache::new(), config.session_user.clone());

        // the app still works against the API without local persistence
        let db = match Database::open(&config.db_path) {
            Ok(db) => Some(db),
            Err(err) => {
                tracing::warn!(path = %config.db_path.display(), error = %err, "local database unavailable");
                None
            }
        };

        if config.session_user.is_none() {
            tracing::info!("no session user configured; recommendations stay empty");
        }

        Ok(Self { recommendations, db })
    }
}

pub fn install(services: AppServices) -> anyhow::Result<()> {
    SERVICES
        .set(services)
        .map_err(|_| anyhow::anyhow!("app services already installed"))
}

pub fn services() -> Option<&'static AppServices> {
    SERVICES.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuthUser;

    #[test]
    fn services_wire_session_user_into_recommendations() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::default()
            .with_db_path(dir.path().join("nested").join("app.db"))
            .with_session_user(Some(AuthUser::new("u1")));
        let services = AppServices::from_config(config).unwrap();
        assert_eq!(services.recommendations.user().map(|u| u.id.as_str()), Some("u1"));
        assert!(services.db.is_some());
    }
}
