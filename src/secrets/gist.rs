//! GitHub Gist publishing for encrypted secrets.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::ExternalError;

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Publishing and deleting gists.
#[async_trait]
pub trait GistClient: Send + Sync {
    /// Publish `content` as a secret gist. Returns the raw-content URL.
    async fn create_gist(&self, content: &str) -> Result<String, ExternalError>;

    /// Delete the gist behind a URL returned by [`GistClient::create_gist`].
    async fn delete_gist(&self, gist_url: &str) -> Result<bool, ExternalError>;
}

/// Token-authenticated GitHub REST client.
pub struct GithubGistClient {
    http: reqwest::Client,
    api_url: String,
    headers: HeaderMap,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    html_url: String,
}

impl GithubGistClient {
    /// Client against the public GitHub API.
    pub fn new(token: &str) -> Result<Self, ExternalError> {
        Self::with_api_url(token, GITHUB_API_URL)
    }

    /// Client against another API root (GitHub Enterprise, tests).
    pub fn with_api_url(token: &str, api_url: &str) -> Result<Self, ExternalError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| ExternalError::Gist(format!("Invalid token: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("functions-cli"));

        Ok(Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            headers,
        })
    }
}

/// Gist id from `https://gist.github.com/<user>/<id>[/raw]` or `https://gist.github.com/<id>`.
pub fn gist_id_from_url(gist_url: &str) -> Result<String, ExternalError> {
    let url = url::Url::parse(gist_url)
        .map_err(|e| ExternalError::Gist(format!("Invalid gist URL '{}': {}", gist_url, e)))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let id = match segments.as_slice() {
        [id] => *id,
        [_user, id, ..] => *id,
        _ => "",
    };
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ExternalError::Gist(format!(
            "No gist id in URL '{}'",
            gist_url
        )));
    }
    Ok(id.to_string())
}

#[async_trait]
impl GistClient for GithubGistClient {
    async fn create_gist(&self, content: &str) -> Result<String, ExternalError> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let mut files = serde_json::Map::new();
        files.insert(
            format!("encrypted-functions-request-data-{}.json", stamp),
            serde_json::json!({ "content": content }),
        );
        let body = serde_json::json!({ "public": false, "files": files });

        let res = self
            .http
            .post(format!("{}/gists", self.api_url))
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ExternalError::Gist(format!(
                "Gist creation returned status {}: {}",
                status, text
            )));
        }

        let gist: GistResponse = res.json().await?;
        tracing::debug!(url = %gist.html_url, "Gist created");
        Ok(format!("{}/raw", gist.html_url.trim_end_matches('/')))
    }

    async fn delete_gist(&self, gist_url: &str) -> Result<bool, ExternalError> {
        let id = gist_id_from_url(gist_url)?;
        let res = self
            .http
            .delete(format!("{}/gists/{}", self.api_url, id))
            .headers(self.headers.clone())
            .send()
            .await?;

        match res.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(true),
            status => Err(ExternalError::Gist(format!(
                "Gist deletion returned status {}",
                status
            ))),
        }
    }
}
