use super::{Mention, MentionsApi, NewMention, Summary};
use crate::config::ApiConfig;
use crate::error::ApiError;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct MentionsClient {
    base_url: String,
    client: reqwest::Client,
}

/// FastAPI error body. `detail` is a string for handled errors and a list of
/// `{loc, msg, type}` objects for validation errors.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

impl MentionsClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("mentiontui/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        resource: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| {
                debug!(resource, error = %source, "request failed");
                ApiError::Transport { resource, source }
            })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    resource: &'static str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|source| ApiError::Transport { resource, source })
}

/// Message from an error body, if the server supplied one.
fn detail_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        Value::String(message) if !message.trim().is_empty() => Some(message),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

async fn rejection(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = detail_message(&body).unwrap_or_else(|| format!("HTTP error, status {}", status));
    ApiError::Rejected { status, message }
}

#[async_trait]
impl MentionsApi for MentionsClient {
    async fn list_mentions(&self, limit: usize) -> Result<Vec<Mention>, ApiError> {
        let request = self
            .client
            .get(self.url("/mentions/"))
            .query(&[("limit", limit)]);
        let response = self.send("mentions", request).await?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                resource: "mentions",
                status: response.status().as_u16(),
            });
        }

        decode("mentions", response).await
    }

    async fn summary(&self) -> Result<Summary, ApiError> {
        let request = self.client.get(self.url("/mentions/summary"));
        let response = self.send("summary", request).await?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                resource: "summary",
                status: response.status().as_u16(),
            });
        }

        decode("summary", response).await
    }

    async fn create_mention(&self, mention: &NewMention) -> Result<Mention, ApiError> {
        let request = self.client.post(self.url("/mentions/")).json(mention);
        let response = self.send("new mention", request).await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        decode("new mention", response).await
    }

    async fn get_mention(&self, id: &str) -> Result<Mention, ApiError> {
        let path = format!("/mentions/{}", urlencoding::encode(id));
        let request = self.client.get(self.url(&path));
        let response = self.send("mention", request).await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        decode("mention", response).await
    }
}
