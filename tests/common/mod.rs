#![allow(dead_code)]

use async_trait::async_trait;
use github_h_index::aggregator::Aggregator;
use github_h_index::error::{HIndexError, Result};
use github_h_index::github::GitHubApi;
use github_h_index::models::RepoSource;
use github_h_index::types::{GitHubOrg, GitHubRepo, RepoOwner};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scripted response for one page request
#[derive(Debug, Clone)]
pub enum Page {
    Repos(Vec<GitHubRepo>),
    Fail(u16),
}

/// In-memory GitHub that replays scripted pages and records every request.
///
/// Pages past the end of a script come back empty, as do unknown sources.
#[derive(Default)]
pub struct ScriptedGitHub {
    pages: HashMap<RepoSourceKey, Vec<Page>>,
    orgs: HashMap<String, std::result::Result<Vec<String>, u16>>,
    gates: HashMap<String, Arc<Notify>>,
    requests: Mutex<Vec<String>>,
}

type RepoSourceKey = (bool, String);

fn key(source: &RepoSource) -> RepoSourceKey {
    match source {
        RepoSource::User(login) => (false, login.clone()),
        RepoSource::Org(login) => (true, login.clone()),
    }
}

fn path(source: &RepoSource) -> String {
    match source {
        RepoSource::User(login) => format!("users/{}/repos", login),
        RepoSource::Org(login) => format!("orgs/{}/repos", login),
    }
}

impl ScriptedGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, source: RepoSource, pages: Vec<Page>) -> Self {
        self.pages.insert(key(&source), pages);
        self
    }

    pub fn with_orgs(mut self, username: &str, orgs: &[&str]) -> Self {
        let logins = orgs.iter().map(|org| org.to_string()).collect();
        self.orgs.insert(username.to_string(), Ok(logins));
        self
    }

    pub fn with_orgs_failure(mut self, username: &str, status: u16) -> Self {
        self.orgs.insert(username.to_string(), Err(status));
        self
    }

    /// Hold every repository page of the user's own listing until the
    /// gate is notified
    pub fn with_gate(mut self, username: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(username.to_string(), gate);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_matching(&self, prefix: &str) -> usize {
        self.requests().iter().filter(|r| r.starts_with(prefix)).count()
    }

    fn record(&self, request: String) {
        self.requests.lock().unwrap().push(request);
    }
}

#[async_trait]
impl GitHubApi for ScriptedGitHub {
    async fn list_repos_page(&self, source: &RepoSource, page: u32) -> Result<Vec<GitHubRepo>> {
        self.record(format!("{}?page={}", path(source), page));

        if let RepoSource::User(login) = source {
            if let Some(gate) = self.gates.get(login) {
                gate.notified().await;
            }
        }

        let script = self.pages.get(&key(source));
        match script.and_then(|pages| pages.get(page as usize - 1)) {
            Some(Page::Repos(repos)) => Ok(repos.clone()),
            Some(Page::Fail(status)) => Err(HIndexError::ApiError(format!(
                "API request failed with status {}",
                status
            ))),
            None => Ok(Vec::new()),
        }
    }

    async fn list_user_orgs(&self, username: &str) -> Result<Vec<GitHubOrg>> {
        self.record(format!("users/{}/orgs", username));

        match self.orgs.get(username) {
            Some(Ok(logins)) => Ok(logins
                .iter()
                .map(|login| GitHubOrg { login: login.clone() })
                .collect()),
            Some(Err(status)) => Err(HIndexError::ApiError(format!(
                "API request failed with status {}",
                status
            ))),
            None => Ok(Vec::new()),
        }
    }
}

pub fn repo(owner: &str, name: &str, stars: u32) -> GitHubRepo {
    GitHubRepo {
        name: name.to_string(),
        description: Some(format!("{} by {}", name, owner)),
        stargazers_count: stars,
        owner: RepoOwner { login: owner.to_string() },
    }
}

/// Repositories named `{owner}-{i}` with the given star counts
pub fn repos_with_stars(owner: &str, stars: &[u32]) -> Vec<GitHubRepo> {
    stars
        .iter()
        .enumerate()
        .map(|(i, count)| repo(owner, &format!("{}-{}", owner, i), *count))
        .collect()
}

/// A full page of one-star repositories
pub fn full_page(owner: &str, page: u32) -> Vec<GitHubRepo> {
    (0..100)
        .map(|i| repo(owner, &format!("{}-p{}-{}", owner, page, i), 1))
        .collect()
}

pub fn user(login: &str) -> RepoSource {
    RepoSource::User(login.to_string())
}

pub fn org(login: &str) -> RepoSource {
    RepoSource::Org(login.to_string())
}

pub fn aggregator_for(api: &Arc<ScriptedGitHub>) -> Aggregator {
    Aggregator::new(api.clone())
}

/// alice owns three 2-star repos and belongs to acme, which owns [10, 1]
pub fn alice_and_acme() -> ScriptedGitHub {
    ScriptedGitHub::new()
        .with_pages(user("alice"), vec![Page::Repos(repos_with_stars("alice", &[2, 2, 2]))])
        .with_orgs("alice", &["acme"])
        .with_pages(org("acme"), vec![Page::Repos(repos_with_stars("acme", &[10, 1]))])
}
