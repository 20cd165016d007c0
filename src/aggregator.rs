use crate::github::{GitHubApi, PER_PAGE};
use crate::models::{AggregateResult, Collection, RepoSource, SourceFailure};
use crate::types::GitHubRepo;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Repositories gathered from one source before it stopped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOutcome {
    pub repositories: Vec<GitHubRepo>,
    pub pages_fetched: u32,
    pub failure: Option<SourceFailure>,
}

/// Collects a user's repositories and those of every organization they
/// belong to.
///
/// Every request is awaited before the next one is issued. A failed page
/// ends only its own source; whatever was collected so far is kept.
#[derive(Clone)]
pub struct Aggregator {
    api: Arc<dyn GitHubApi>,
}

impl Aggregator {
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self { api }
    }

    /// Page through one source until a short page or an error
    pub async fn fetch_source(&self, source: &RepoSource) -> SourceOutcome {
        let mut outcome = SourceOutcome::default();
        let mut page = 1;
        let mut fetch_more = true;

        while fetch_more {
            match self.api.list_repos_page(source, page).await {
                Ok(repos) => {
                    fetch_more = repos.len() == PER_PAGE as usize;
                    debug!(%source, page, count = repos.len(), "Fetched repository page");
                    outcome.repositories.extend(repos);
                    outcome.pages_fetched += 1;
                    page += 1;
                }
                Err(e) => {
                    error!(
                        %source,
                        page,
                        pages_fetched = outcome.pages_fetched,
                        "Fetching repositories failed: {}",
                        e
                    );
                    outcome.failure = Some(SourceFailure {
                        source: Some(source.clone()),
                        page: Some(page),
                        message: e.to_string(),
                    });
                    fetch_more = false;
                }
            }
        }

        debug!(
            login = source.login(),
            pages_fetched = outcome.pages_fetched,
            repositories = outcome.repositories.len(),
            "Source finished"
        );
        outcome
    }

    /// Personal repositories followed by each organization's, in fetch order
    pub async fn collect(&self, username: &str) -> Collection {
        let mut collection = Collection::default();

        let user = RepoSource::User(username.to_string());
        absorb(&mut collection, self.fetch_source(&user).await);

        match self.api.list_user_orgs(username).await {
            Ok(orgs) => {
                debug!(username, count = orgs.len(), "Fetched organizations");
                for org in orgs {
                    let source = RepoSource::Org(org.login);
                    let outcome = self.fetch_source(&source).await;
                    absorb(&mut collection, outcome);
                }
            }
            Err(e) => {
                error!(username, "Fetching organizations failed: {}", e);
                collection.failures.push(SourceFailure {
                    source: None,
                    page: None,
                    message: e.to_string(),
                });
            }
        }

        info!(
            username,
            repositories = collection.repositories.len(),
            failures = collection.failures.len(),
            "Aggregation finished"
        );
        collection
    }

    pub async fn aggregate_repositories(&self, username: &str) -> Vec<GitHubRepo> {
        self.collect(username).await.repositories
    }

    /// Collect and derive the totals shown to the user
    pub async fn lookup(&self, username: &str) -> AggregateResult {
        let collection = self.collect(username).await;
        AggregateResult::from_collection(username, collection)
    }
}

fn absorb(collection: &mut Collection, outcome: SourceOutcome) {
    collection.repositories.extend(outcome.repositories);
    collection.failures.extend(outcome.failure);
}
