//! News lookup client

use crate::api::NewsSource;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::models::NewsArticle;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// Either a bare article array or an `{ "articles": [...] }` envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum NewsPayload {
    Articles(Vec<NewsArticle>),
    Envelope { articles: Vec<NewsArticle> },
}

/// Client for a news endpoint queried with `?q=<company name>`
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    endpoint: Url,
}

impl NewsApiClient {
    /// Create a client; `None` when no news endpoint is configured
    pub fn from_config(config: &DashboardConfig) -> Result<Option<Self>> {
        let Some(ref endpoint) = config.news_api_url else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Some(Self {
            client,
            endpoint: Url::parse(endpoint)?,
        }))
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn get_news_about(&self, company_name: &str) -> Result<Vec<NewsArticle>> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", company_name);

        tracing::debug!(%url, "news lookup");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(DashboardError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: NewsPayload = response.json().await?;
        Ok(match payload {
            NewsPayload::Articles(articles) | NewsPayload::Envelope { articles } => articles,
        })
    }
}
