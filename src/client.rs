// HTTP client for a running recommendation server.
//
// Used by `recommender query` to exercise a deployed service the same way the
// storefront does. Non-2xx responses carry a structured body with a reason
// code, which is surfaced in the error message.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::db::models::RecommendedProduct;

/// Error body returned by the server when no recommendations are available.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub reason: String,
}

/// Client for the recommendation REST API.
pub struct RecommendationClient {
    client: reqwest::Client,
    base_url: String,
}

impl RecommendationClient {
    /// Create a new client pointing at the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("recommender/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL for item-based recommendations.
    pub fn product_url(&self, product_id: &str) -> String {
        format!("{}/api/recommendations/products/{product_id}", self.base_url)
    }

    /// URL for user-based recommendations.
    pub fn user_url(&self, user_id: &str) -> String {
        format!("{}/api/recommendations/users/{user_id}", self.base_url)
    }

    /// Products similar to `product_id`.
    pub async fn product_recommendations(
        &self,
        product_id: &str,
        max_results: Option<usize>,
    ) -> Result<Vec<RecommendedProduct>> {
        self.fetch(&self.product_url(product_id), max_results).await
    }

    /// Products for `user_id`, from their purchase history.
    pub async fn user_recommendations(
        &self,
        user_id: &str,
        max_results: Option<usize>,
    ) -> Result<Vec<RecommendedProduct>> {
        self.fetch(&self.user_url(user_id), max_results).await
    }

    async fn fetch(&self, url: &str, max_results: Option<usize>) -> Result<Vec<RecommendedProduct>> {
        let mut request = self.client.get(url);
        if let Some(max) = max_results {
            request = request.query(&[("maxResults", max)]);
        }

        debug!(url, ?max_results, "Requesting recommendations");
        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{}", describe_failure(status.as_u16(), &body));
        }

        response
            .json::<Vec<RecommendedProduct>>()
            .await
            .context("Failed to parse recommendation response")
    }
}

/// Human-readable message for a failed response.
pub fn describe_failure(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => format!("Server returned {status} ({}): {}", err.reason, err.error),
        Err(_) => format!("Server returned {status}: {body}"),
    }
}
