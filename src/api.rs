use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::{GenerateParams, RecommendationSet};
use serde::{Deserialize, Serialize};

pub const FETCH_FAILED: &str = "Failed to fetch recommendations";
pub const GENERATE_FAILED: &str = "Failed to generate recommendations";
pub const DELETE_FAILED: &str = "Failed to delete recommendation set";

/// REST client for the recommendation endpoints.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    #[serde(flatten)]
    params: &'a GenerateParams,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/recommendations/{}", self.base_url, path)
    }

    /// `GET /api/recommendations/{user_id}`
    pub async fn list_recommendations(&self, user_id: &str) -> ApiResult<Vec<RecommendationSet>> {
        let response = self.client.get(self.url(user_id)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, body = %body, "list recommendations rejected");
            return Err(ApiError::Status {
                status,
                message: FETCH_FAILED.to_string(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// `POST /api/recommendations/generate`
    pub async fn generate_recommendations(
        &self,
        user_id: &str,
        params: &GenerateParams,
    ) -> ApiResult<RecommendationSet> {
        let response = self
            .client
            .post(self.url("generate"))
            .json(&GenerateRequest { user_id, params })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                message: server_message(&body).unwrap_or_else(|| GENERATE_FAILED.to_string()),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// `DELETE /api/recommendations/{id}`
    pub async fn delete_recommendation_set(&self, id: &str) -> ApiResult<()> {
        let response = self
            .client
            .delete(self.url(id))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        Err(ApiError::Status {
            status,
            message: DELETE_FAILED.to_string(),
        })
    }
}

/// The `message` field of an error body, when the body is JSON and carries one.
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_requires_json_message_field() {
        assert_eq!(
            server_message(r#"{"message":"quota exceeded"}"#),
            Some("quota exceeded".to_string())
        );
        assert_eq!(server_message(r#"{"error":"nope"}"#), None);
        assert_eq!(server_message("<html>502</html>"), None);
        assert_eq!(server_message(r#"{"message":""}"#), None);
    }

    #[test]
    fn urls_are_built_under_api_prefix() {
        let config = ClientConfig::default().with_api_base("http://host:1/");
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.url("u1"), "http://host:1/api/recommendations/u1");
        assert_eq!(
            client.url("generate"),
            "http://host:1/api/recommendations/generate"
        );
    }
}
