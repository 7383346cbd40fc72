use crate::error::{ForkviewError, Result};
use crate::source::ForkSource;
use crate::types::RepoId;

/// What to do after the one-shot repository lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// The repository has no forks; nothing to browse.
    NoForks,
    Browse { head_ref: String, fork_count: u64 },
}

/// Resolve the default branch and fork count before the TUI starts.
pub async fn prepare(source: &dyn ForkSource, repo: &RepoId) -> Result<Launch> {
    let meta = source.repo_meta(repo).await?;
    tracing::info!(%repo, forks = meta.fork_count, branch = %meta.default_branch, "repository resolved");

    if meta.fork_count == 0 {
        return Ok(Launch::NoForks);
    }

    if meta.default_branch.is_empty() {
        return Err(ForkviewError::Api(format!(
            "repository {} has no default branch",
            repo
        )));
    }

    Ok(Launch::Browse {
        head_ref: format!("{}:{}", repo.owner, meta.default_branch),
        fork_count: meta.fork_count,
    })
}
