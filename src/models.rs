use crate::hindex::{repositories_h_index, total_stars};
use crate::types::GitHubRepo;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Account whose repository listing is paginated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "login", rename_all = "snake_case")]
pub enum RepoSource {
    User(String),
    Org(String),
}

impl RepoSource {
    pub fn login(&self) -> &str {
        match self {
            RepoSource::User(login) | RepoSource::Org(login) => login,
        }
    }
}

impl fmt::Display for RepoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoSource::User(login) => write!(f, "user {}", login),
            RepoSource::Org(login) => write!(f, "organization {}", login),
        }
    }
}

/// A source whose contribution ended early
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// `None` when the organization listing itself failed
    pub source: Option<RepoSource>,
    pub page: Option<u32>,
    pub message: String,
}

/// Raw output of one aggregation run, in fetch order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub repositories: Vec<GitHubRepo>,
    pub failures: Vec<SourceFailure>,
}

/// Repositories plus derived totals for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub username: String,
    pub h_index: usize,
    pub total_stars: u64,
    /// Sorted by star count, highest first
    #[serde(serialize_with = "serialize_linked_repos")]
    pub repositories: Vec<GitHubRepo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,
}

impl AggregateResult {
    pub fn from_collection(username: &str, collection: Collection) -> Self {
        let Collection { mut repositories, failures } = collection;
        // stable: equal counts keep fetch order
        repositories.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));

        Self {
            username: username.to_string(),
            h_index: repositories_h_index(&repositories),
            total_stars: total_stars(&repositories),
            repositories,
            failures,
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Repository as sent to clients, with its browser link
#[derive(Serialize)]
struct LinkedRepo<'a> {
    #[serde(flatten)]
    repo: &'a GitHubRepo,
    html_url: String,
}

fn serialize_linked_repos<S: Serializer>(
    repositories: &[GitHubRepo],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(repositories.iter().map(|repo| LinkedRepo {
        repo,
        html_url: repo.html_url(),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Idle,
    Loading,
    Loaded,
}

/// Snapshot rendered by the presentation layer.
///
/// Replaced wholesale on every submit and commit, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState {
    pub generation: u64,
    pub username: Option<String>,
    pub status: LookupStatus,
    pub result: AggregateResult,
}

impl RequestState {
    pub fn idle() -> Self {
        Self {
            generation: 0,
            username: None,
            status: LookupStatus::Idle,
            result: AggregateResult::default(),
        }
    }

    pub fn loading(generation: u64, username: &str) -> Self {
        Self {
            generation,
            username: Some(username.to_string()),
            status: LookupStatus::Loading,
            result: AggregateResult {
                username: username.to_string(),
                ..AggregateResult::default()
            },
        }
    }

    pub fn loaded(generation: u64, result: AggregateResult) -> Self {
        Self {
            generation,
            username: Some(result.username.clone()),
            status: LookupStatus::Loaded,
            result,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == LookupStatus::Loading
    }
}

/// Rate limit state reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: chrono::DateTime<chrono::Utc>,
    pub is_limited: bool,
}
