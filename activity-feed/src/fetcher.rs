use crate::types::{
    ActivityApi, FetchConfig, FetchError, RawIssueEvent, RawRepoEvent, RepositoryDescriptor, Result,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

const API_VERSION: &str = "2022-11-28";

/// `ActivityApi` over the REST API. One page per call, no retries.
pub struct RestClient {
    client: Client,
    config: FetchConfig,
    base_url: Url,
    token: Option<String>,
}

impl RestClient {
    pub fn new(config: FetchConfig, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;
        let base_url = Url::parse(&config.api_base_url)?;

        Ok(Self {
            client,
            config,
            base_url,
            token,
        })
    }

    pub fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidRequest(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("per_page", &self.config.per_page.clamp(1, 100).to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> std::result::Result<T, FetchError> {
        let start_time = Instant::now();
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| FetchError::Network(e.to_string()))?;

        debug!("GET {} -> {} in {:?} ({} bytes)", url, status, start_time.elapsed(), body.len());

        if !status.is_success() {
            let error = classify_status(status, &headers, &body);
            warn!("Request to {} failed: {}", url, error);
            return Err(error);
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ActivityApi for RestClient {
    async fn list_repo_events(&self, owner: &str, repo: &str) -> std::result::Result<Vec<RawRepoEvent>, FetchError> {
        let url = self.endpoint(&["repos", owner, repo, "events"])?;
        self.get_json(url).await
    }

    async fn list_events_for_repo(&self, owner: &str, repo: &str) -> std::result::Result<Vec<RawIssueEvent>, FetchError> {
        let url = self.endpoint(&["repos", owner, repo, "issues", "events"])?;
        self.get_json(url).await
    }

    async fn list_for_authenticated_user(&self) -> std::result::Result<Vec<RepositoryDescriptor>, FetchError> {
        let url = self.endpoint(&["user", "repos"])?;
        self.get_json(url).await
    }
}

/// Map a non-success response to a `FetchError`.
pub fn classify_status(status: StatusCode, headers: &HeaderMap, body: &str) -> FetchError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let quota_exhausted = header("x-ratelimit-remaining") == Some("0");
    let reset_at = header("x-ratelimit-reset").and_then(|v| v.parse().ok());

    match status {
        StatusCode::UNAUTHORIZED => FetchError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited { reset_at },
        StatusCode::FORBIDDEN if quota_exhausted => FetchError::RateLimited { reset_at },
        _ => FetchError::Status {
            status: status.as_u16(),
            message,
        },
    }
}
