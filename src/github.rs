use crate::error::{HIndexError, Result};
use crate::models::{RateLimitState, RepoSource};
use crate::types::{GitHubOrg, GitHubRepo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 100;
const DEFAULT_USER_AGENT: &str = "GitHub H-Index/0.1.0";
const MAX_USERNAME_LEN: usize = 39;

/// Read-only slice of the GitHub REST API the aggregator needs
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// One page of repositories owned by `source`, `PER_PAGE` at a time
    async fn list_repos_page(&self, source: &RepoSource, page: u32) -> Result<Vec<GitHubRepo>>;

    /// Organizations the user belongs to
    async fn list_user_orgs(&self, username: &str) -> Result<Vec<GitHubOrg>>;
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: API_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct GitHubClient {
    client: Client,
    base_url: Url,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;
        let base_url = Url::parse(&config.api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(HIndexError::ApiError(format!(
                "API URL cannot carry a path: {}",
                config.api_url
            )));
        }

        Ok(GitHubClient { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn repos_url(&self, source: &RepoSource, page: u32) -> Url {
        let mut url = match source {
            RepoSource::User(login) => self.endpoint(&["users", login.as_str(), "repos"]),
            RepoSource::Org(login) => self.endpoint(&["orgs", login.as_str(), "repos"]),
        };
        url.query_pairs_mut()
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        url
    }

    async fn make_request(&self, url: Url) -> Result<Response> {
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        let rate_limit = rate_limit_state(response.headers());

        match response.status() {
            status if status.is_success() => {
                if rate_limit.remaining < 10 {
                    warn!(
                        remaining = rate_limit.remaining,
                        reset_time = %rate_limit.reset_time,
                        "GitHub rate limit running low"
                    );
                } else {
                    debug!(remaining = rate_limit.remaining, %url, "GitHub request succeeded");
                }
                Ok(response)
            }
            StatusCode::NOT_FOUND => Err(HIndexError::NotFound(format!("Resource not found: {}", url))),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limit.is_limited => {
                Err(HIndexError::RateLimitExceeded(format!(
                    "API rate limit exceeded. Reset at: {}",
                    rate_limit.reset_time
                )))
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(HIndexError::ApiError(format!(
                    "API request failed with status {}: {}",
                    status, error_text
                )))
            }
        }
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_repos_page(&self, source: &RepoSource, page: u32) -> Result<Vec<GitHubRepo>> {
        let url = self.repos_url(source, page);
        let response = self.make_request(url).await?;
        let body = response.text().await?;
        let repos: Vec<GitHubRepo> = serde_json::from_str(&body)?;
        Ok(repos)
    }

    async fn list_user_orgs(&self, username: &str) -> Result<Vec<GitHubOrg>> {
        let url = self.endpoint(&["users", username, "orgs"]);
        let response = self.make_request(url).await?;
        let body = response.text().await?;
        let orgs: Vec<GitHubOrg> = serde_json::from_str(&body)?;
        Ok(orgs)
    }
}

/// Parse the `X-RateLimit-*` headers of a response
pub fn rate_limit_state(headers: &HeaderMap) -> RateLimitState {
    let header_number = |name: &str| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok())
    };

    let remaining = header_number("X-RateLimit-Remaining");
    let limit = header_number("X-RateLimit-Limit")
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(60);
    let reset_time = header_number("X-RateLimit-Reset")
        .and_then(|timestamp| DateTime::<Utc>::from_timestamp(timestamp, 0))
        .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));

    RateLimitState {
        remaining: remaining
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(limit),
        limit,
        reset_time,
        // a missing header is not an exhausted quota
        is_limited: remaining == Some(0),
    }
}

/// GitHub logins: 1-39 ASCII alphanumerics or hyphens
pub fn validate_username(username: &str) -> Result<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(HIndexError::InvalidUsername("username is empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(HIndexError::InvalidUsername(format!(
            "{} is longer than {} characters",
            username, MAX_USERNAME_LEN
        )));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(HIndexError::InvalidUsername(format!(
            "{} contains characters other than letters, digits and hyphens",
            username
        )));
    }
    Ok(username)
}
