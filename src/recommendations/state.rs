use crate::api::ApiClient;
use crate::cache::{QueryCache, QueryKey};
use crate::error::ApiResult;
use crate::types::{AuthUser, GenerateParams, RecommendationSet};
use std::sync::{Arc, Mutex};

/// Compose the exposed list: the local override wins, then the last fetched
/// data, then nothing.
pub fn merge_views<T: Clone>(local: Option<&[T]>, fetched: Option<&[T]>) -> Vec<T> {
    local.or(fetched).map(<[T]>::to_vec).unwrap_or_default()
}

#[derive(Default)]
struct LocalState {
    overlay: Option<Vec<RecommendationSet>>,
    synced_generation: u64,
    fetches: usize,
    generates: usize,
}

#[derive(Clone, Copy)]
enum Activity {
    Fetch,
    Generate,
}

impl LocalState {
    fn counter(&mut self, activity: Activity) -> &mut usize {
        match activity {
            Activity::Fetch => &mut self.fetches,
            Activity::Generate => &mut self.generates,
        }
    }
}

/// Counts one request as in flight until dropped, including when the future
/// driving the request is cancelled part-way.
struct InFlight {
    state: Arc<Mutex<LocalState>>,
    activity: Activity,
}

impl InFlight {
    fn start(state: &Arc<Mutex<LocalState>>, activity: Activity) -> Self {
        let mut guard = state.lock().expect("recommendations state poisoned");
        *guard.counter(activity) += 1;
        Self {
            state: Arc::clone(state),
            activity,
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            let counter = state.counter(self.activity);
            *counter = counter.saturating_sub(1);
        }
    }
}

/// A user's recommendation sets kept in sync with the server.
///
/// Fetched data lands in the injected [`QueryCache`]; the local overlay follows
/// the cache whenever it sees a newer generation and is also edited directly by
/// generate and delete so the list updates without waiting for a refetch.
#[derive(Clone)]
pub struct Recommendations {
    api: ApiClient,
    cache: QueryCache<Vec<RecommendationSet>>,
    user: Option<AuthUser>,
    state: Arc<Mutex<LocalState>>,
}

impl Recommendations {
    pub fn new(
        api: ApiClient,
        cache: QueryCache<Vec<RecommendationSet>>,
        user: Option<AuthUser>,
    ) -> Self {
        Self {
            api,
            cache,
            user,
            state: Arc::new(Mutex::new(LocalState::default())),
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn cache(&self) -> &QueryCache<Vec<RecommendationSet>> {
        &self.cache
    }

    pub fn query_key(&self) -> Option<QueryKey> {
        self.user
            .as_ref()
            .map(|user| QueryKey::recommendations(&user.id))
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut LocalState) -> R) -> R {
        let mut state = self.state.lock().expect("recommendations state poisoned");
        f(&mut state)
    }

    /// Pull newer cached data into the overlay. Returns whether anything changed.
    pub fn sync_from_cache(&self) -> bool {
        let Some(key) = self.query_key() else {
            return false;
        };
        let Some(snapshot) = self.cache.get(&key) else {
            return false;
        };
        let Some(data) = snapshot.data else {
            return false;
        };
        self.with_state(|state| {
            if snapshot.generation <= state.synced_generation {
                return false;
            }
            state.overlay = Some(data);
            state.synced_generation = snapshot.generation;
            true
        })
    }

    /// The list to show right now.
    pub fn recommendations(&self) -> Vec<RecommendationSet> {
        self.sync_from_cache();
        let fetched = self
            .query_key()
            .and_then(|key| self.cache.get(&key))
            .and_then(|snapshot| snapshot.data);
        self.with_state(|state| merge_views(state.overlay.as_deref(), fetched.as_deref()))
    }

    pub fn is_loading(&self) -> bool {
        self.with_state(|state| state.fetches > 0)
    }

    pub fn is_generating(&self) -> bool {
        self.with_state(|state| state.generates > 0)
    }

    /// Whether the cached collection was invalidated (or never loaded).
    pub fn needs_refetch(&self) -> bool {
        self.query_key()
            .is_some_and(|key| self.cache.is_stale(&key))
    }

    /// Load every set for the session user. Without a user this is an empty,
    /// request-free no-op.
    pub async fn fetch(&self) -> ApiResult<Vec<RecommendationSet>> {
        let Some(user) = self.user.clone() else {
            return Ok(Vec::new());
        };

        let key = QueryKey::recommendations(&user.id);
        let epoch = self.cache.epoch(&key);
        let result = {
            let _in_flight = InFlight::start(&self.state, Activity::Fetch);
            self.api.list_recommendations(&user.id).await
        };

        match result {
            Ok(sets) => {
                tracing::debug!(user_id = %user.id, count = sets.len(), "recommendations fetched");
                // a generate or delete that landed meanwhile keeps its local
                // view and leaves the entry stale for another round
                if self.cache.set_if_current(key, sets.clone(), epoch).is_some() {
                    self.sync_from_cache();
                }
                Ok(sets)
            }
            Err(err) => {
                tracing::error!(user_id = %user.id, error = %err, "error fetching recommendations");
                Err(err)
            }
        }
    }

    /// Fetch only when the cached list was invalidated or never loaded, then
    /// return the list to show. Drives the UI's refetch-on-invalidate loop.
    pub async fn refresh_if_stale(&self) -> ApiResult<Vec<RecommendationSet>> {
        if self.needs_refetch() {
            self.fetch().await?;
        }
        Ok(self.recommendations())
    }

    /// Ask the server for a new set. `Ok(None)` when nobody is signed in.
    pub async fn generate(&self, params: &GenerateParams) -> ApiResult<Option<RecommendationSet>> {
        let Some(user) = self.user.clone() else {
            return Ok(None);
        };

        let result = {
            let _in_flight = InFlight::start(&self.state, Activity::Generate);
            self.api.generate_recommendations(&user.id, params).await
        };

        match result {
            Ok(set) => {
                let current = self.recommendations();
                self.with_state(|state| {
                    let mut next = Vec::with_capacity(current.len() + 1);
                    next.push(set.clone());
                    next.extend(current);
                    state.overlay = Some(next);
                });
                self.cache.invalidate(&QueryKey::recommendations(&user.id));
                tracing::info!(user_id = %user.id, set_id = %set.id, "recommendations generated");
                Ok(Some(set))
            }
            Err(err) => {
                tracing::error!(user_id = %user.id, error = %err, "error generating recommendations");
                Err(err)
            }
        }
    }

    /// Delete a set, reporting why it failed.
    pub async fn try_delete(&self, id: &str) -> ApiResult<()> {
        self.api.delete_recommendation_set(id).await?;

        let current = self.recommendations();
        self.with_state(|state| {
            state.overlay = Some(current.into_iter().filter(|set| set.id != id).collect());
        });
        if let Some(key) = self.query_key() {
            self.cache.invalidate(&key);
        }
        tracing::info!(set_id = %id, "recommendation set deleted");
        Ok(())
    }

    /// Delete a set. Failures are logged and reported as `false`.
    pub async fn delete(&self, id: &str) -> bool {
        match self.try_delete(id).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(set_id = %id, kind = ?err.kind(), error = %err, "error deleting recommendation");
                false
            }
        }
    }
}
