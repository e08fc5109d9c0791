//! Repository identity and credentials

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid repository '{0}': expected owner/name")]
pub struct InvalidRepo(pub String);

/// Repository the run operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse `owner/name`
    pub fn parse(s: &str) -> Result<Self, InvalidRepo> {
        let (owner, name) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| InvalidRepo(s.to_string()))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(InvalidRepo(s.to_string()));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// API token. Never printed.
#[derive(Clone)]
pub struct GithubToken(String);

impl GithubToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GithubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GithubToken(**********)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_repo() {
        let repo = RepoRef::parse("octo-org/hello-world").unwrap();
        assert_eq!(repo.owner, "octo-org");
        assert_eq!(repo.name, "hello-world");
        assert_eq!(repo.to_string(), "octo-org/hello-world");
    }

    #[test]
    fn reject_bad_repo() {
        for bad in ["", "owner", "/name", "owner/", "a/b/c"] {
            assert!(RepoRef::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn token_is_redacted() {
        let token = GithubToken::new("ghp_secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("ghp_secret"));
        assert_eq!(token.expose(), "ghp_secret");
    }
}
