use super::Recommendations;
use crate::error::ApiResult;
use crate::notify::{Notice, Notifier};
use crate::types::{GenerateParams, RecommendationSet};

/// Recommendation actions as the UI calls them: each outcome is paired with
/// the notice the user should see.
#[derive(Clone)]
pub struct RecommendationsHook<N> {
    data: Recommendations,
    notifier: N,
}

impl<N: Notifier> RecommendationsHook<N> {
    pub fn new(data: Recommendations, notifier: N) -> Self {
        Self { data, notifier }
    }

    pub fn data(&self) -> &Recommendations {
        &self.data
    }

    pub fn recommendations(&self) -> Vec<RecommendationSet> {
        self.data.recommendations()
    }

    pub fn loading(&self) -> bool {
        self.data.is_loading()
    }

    pub fn generating(&self) -> bool {
        self.data.is_generating()
    }

    pub async fn fetch(&self) -> ApiResult<Vec<RecommendationSet>> {
        let result = self.data.fetch().await;
        if result.is_err() {
            self.notifier.notify(Notice::fetch_failed());
        }
        result
    }

    /// Refetch if the cached list went stale; the list to show either way.
    pub async fn refresh_if_stale(&self) -> Vec<RecommendationSet> {
        if self.data.refresh_if_stale().await.is_err() {
            self.notifier.notify(Notice::fetch_failed());
        }
        self.data.recommendations()
    }

    pub async fn generate(&self, params: &GenerateParams) -> ApiResult<Option<RecommendationSet>> {
        let result = self.data.generate(params).await;
        match &result {
            Ok(Some(_)) => self.notifier.notify(Notice::generated()),
            Ok(None) => {}
            Err(_) => self.notifier.notify(Notice::generate_failed()),
        }
        result
    }

    pub async fn delete(&self, id: &str) -> bool {
        let deleted = self.data.delete(id).await;
        self.notifier.notify(if deleted {
            Notice::deleted()
        } else {
            Notice::delete_failed()
        });
        deleted
    }
}
