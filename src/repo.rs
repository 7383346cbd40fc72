use std::process::Command;

use crate::error::{ForkviewError, Result};
use crate::types::RepoId;

/// Remotes consulted first when resolving the current repository.
const PREFERRED_REMOTES: [&str; 3] = ["upstream", "github", "origin"];

impl RepoId {
    /// Parse `OWNER/REPO`, `HOST/OWNER/REPO` or a git remote URL.
    pub fn parse(input: &str) -> Result<RepoId> {
        let input = input.trim();
        if input.contains("://") || input.starts_with("git@") {
            return Self::from_remote_url(input)
                .ok_or_else(|| ForkviewError::InvalidRepo(input.to_string()));
        }

        let parts: Vec<&str> = input.split('/').collect();
        let (owner, name) = match parts.as_slice() {
            [owner, name] => (*owner, *name),
            [_host, owner, name] => (*owner, *name),
            _ => {
                return Err(ForkviewError::InvalidRepo(format!(
                    "expected the \"OWNER/REPO\" format, got {:?}",
                    input
                )))
            }
        };

        repo_id(owner, name).ok_or_else(|| {
            ForkviewError::InvalidRepo(format!(
                "expected the \"OWNER/REPO\" format, got {:?}",
                input
            ))
        })
    }

    /// Owner and name from SSH (`git@host:owner/repo.git`), `ssh://` or HTTPS remotes.
    pub fn from_remote_url(url: &str) -> Option<RepoId> {
        let path = if let Some(rest) = url.strip_prefix("git@") {
            rest.split_once(':')?.1
        } else if url.starts_with("https://")
            || url.starts_with("http://")
            || url.starts_with("ssh://")
            || url.starts_with("git://")
        {
            let without_scheme = url.split("://").nth(1)?;
            without_scheme.split_once('/')?.1
        } else {
            return None;
        };

        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let mut segments = path.split('/');
        let owner = segments.next()?;
        let name = segments.next()?;
        if segments.next().is_some() {
            return None;
        }
        repo_id(owner, name)
    }
}

fn repo_id(owner: &str, name: &str) -> Option<RepoId> {
    let valid = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if valid(owner) && valid(name) {
        Some(RepoId {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    } else {
        None
    }
}

/// Resolve the repository for the current directory.
///
/// Honours `GH_REPO`, then falls back to the git remotes of the working tree.
pub fn detect_current() -> Result<RepoId> {
    if let Ok(repo) = std::env::var("GH_REPO") {
        if !repo.is_empty() {
            return RepoId::parse(&repo);
        }
    }

    let output = Command::new("git")
        .arg("remote")
        .output()
        .map_err(|e| ForkviewError::RepoResolution(format!("failed to run git: {}", e)))?;

    if !output.status.success() {
        return Err(ForkviewError::RepoResolution(
            "not a git repository".to_string(),
        ));
    }

    let remotes: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    for remote in order_remotes(&remotes) {
        if let Some(url) = remote_url(remote) {
            if let Some(repo) = RepoId::from_remote_url(&url) {
                tracing::debug!(remote, %repo, "resolved repository from git remote");
                return Ok(repo);
            }
        }
    }

    Err(ForkviewError::RepoResolution(
        "no git remote points to a GitHub repository".to_string(),
    ))
}

/// Preferred remotes first, the rest in the order git lists them.
fn order_remotes(remotes: &[String]) -> Vec<&str> {
    let mut ordered: Vec<&str> = PREFERRED_REMOTES
        .iter()
        .copied()
        .filter(|p| remotes.iter().any(|r| r == p))
        .collect();
    ordered.extend(
        remotes
            .iter()
            .map(String::as_str)
            .filter(|r| !PREFERRED_REMOTES.contains(r)),
    );
    ordered
}

fn remote_url(remote: &str) -> Option<String> {
    let output = Command::new("git")
        .args(["remote", "get-url", remote])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
