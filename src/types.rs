use serde::{Deserialize, Serialize};

// GitHub API response structures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub description: Option<String>,
    pub stargazers_count: u32,
    pub owner: RepoOwner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubOrg {
    pub login: String,
}

impl GitHubRepo {
    /// Browser link to the repository
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner.login, self.name)
    }
}
