use chrono::{DateTime, Utc};
use std::fmt;

/// Fixed number of forks requested per page.
pub const PAGE_SIZE: u32 = 10;

/// A fork of the tracked repository, as shown in one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fork {
    pub full_name: String,
    pub stars: u32,
    pub forks: u32,
    pub updated_at: DateTime<Utc>,
    pub url: String,
    /// Commits on the fork's default branch that upstream does not have.
    pub ahead_by: u32,
    /// Commits on upstream's default branch that the fork does not have.
    pub behind_by: u32,
}

/// Ordering applied to the fork list. Direction is always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    CreatedAt,
    #[default]
    UpdatedAt,
    PushedAt,
    Name,
    Stargazers,
}

impl SortMode {
    /// GraphQL `RepositoryOrderField` value.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            SortMode::CreatedAt => "CREATED_AT",
            SortMode::UpdatedAt => "UPDATED_AT",
            SortMode::PushedAt => "PUSHED_AT",
            SortMode::Name => "NAME",
            SortMode::Stargazers => "STARGAZERS",
        }
    }

    /// Parse a user-supplied sort name.
    ///
    /// Accepts the API identifiers (`STARGAZERS`) and short names (`stars`),
    /// case-insensitively. Anything unrecognised falls back to
    /// [`SortMode::UpdatedAt`], the most-recently-updated ordering.
    pub fn parse_or_default(input: &str) -> SortMode {
        match input.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "created" | "created_at" => SortMode::CreatedAt,
            "updated" | "updated_at" => SortMode::UpdatedAt,
            "pushed" | "pushed_at" => SortMode::PushedAt,
            "name" => SortMode::Name,
            "stars" | "stargazers" => SortMode::Stargazers,
            other => {
                tracing::warn!(sort = other, "unknown sort mode, using UPDATED_AT");
                SortMode::default()
            }
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// `owner/name` of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository facts resolved once before browsing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMeta {
    pub default_branch: String,
    pub fork_count: u64,
}

/// Parameters of one fork page query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkQuery {
    pub owner: String,
    pub name: String,
    /// Upstream ref the forks are compared against, `owner:branch`.
    pub head_ref: String,
    pub sort: SortMode,
    /// Cursor returned with the previous page; `None` for the first page.
    pub after: Option<String>,
}

/// One page of results as returned by a [`crate::source::ForkSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkPage {
    pub forks: Vec<Fork>,
    pub total_count: u64,
    pub end_cursor: Option<String>,
    pub has_next: bool,
}
