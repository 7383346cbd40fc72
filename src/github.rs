use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ForkviewError, Result};
use crate::source::ForkSource;
use crate::types::{Fork, ForkPage, ForkQuery, RepoId, RepoMeta, PAGE_SIZE};

const REPO_META_QUERY: &str = r#"
query DefaultBranch($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    forkCount
    defaultBranchRef { name }
  }
}"#;

const FORKS_QUERY: &str = r#"
query Forks($owner: String!, $name: String!, $first: Int!, $after: String, $field: RepositoryOrderField!, $headRef: String!) {
  repository(owner: $owner, name: $name) {
    forks(first: $first, after: $after, orderBy: {field: $field, direction: DESC}) {
      totalCount
      pageInfo { hasNextPage endCursor }
      nodes {
        nameWithOwner
        stargazerCount
        forkCount
        updatedAt
        url
        defaultBranchRef {
          compare(headRef: $headRef) { aheadBy behindBy }
        }
      }
    }
  }
}"#;

pub struct GitHub {
    client: Octocrab,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub").finish_non_exhaustive()
    }
}

impl From<octocrab::Error> for ForkviewError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            // Non-2xx answer from the API, e.g. 401 Bad credentials
            octocrab::Error::GitHub { source, .. } => ForkviewError::Api(source.message),
            err @ (octocrab::Error::Serde { .. } | octocrab::Error::Json { .. }) => {
                ForkviewError::Api(format!("unexpected response: {}", err))
            }
            err => ForkviewError::Network(err.to_string()),
        }
    }
}

impl GitHub {
    pub fn new(token: String) -> Result<Self> {
        Self::build(token, None)
    }

    fn build(token: String, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| ForkviewError::Auth(e.to_string()))?;
        }
        let client = builder
            .build()
            .map_err(|e| ForkviewError::Auth(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ForkSource for GitHub {
    async fn repo_meta(&self, repo: &RepoId) -> Result<RepoMeta> {
        let payload = json!({
            "query": REPO_META_QUERY,
            "variables": { "owner": repo.owner, "name": repo.name },
        });
        let response: GraphQlResponse<RepositoryData<MetaRepository>> =
            self.client.graphql(&payload).await?;

        let repository = repository(response, repo)?;
        Ok(RepoMeta {
            default_branch: repository
                .default_branch_ref
                .map(|r| r.name)
                .unwrap_or_default(),
            fork_count: repository.fork_count,
        })
    }

    async fn fork_page(&self, query: &ForkQuery) -> Result<ForkPage> {
        let payload = json!({
            "query": FORKS_QUERY,
            "variables": {
                "owner": query.owner,
                "name": query.name,
                "first": PAGE_SIZE,
                "after": query.after,
                "field": query.sort.as_api_str(),
                "headRef": query.head_ref,
            },
        });
        tracing::debug!(
            sort = %query.sort,
            after = ?query.after,
            "fetching fork page"
        );
        let response: GraphQlResponse<RepositoryData<ForksRepository>> =
            self.client.graphql(&payload).await?;

        let repo = RepoId {
            owner: query.owner.clone(),
            name: query.name.clone(),
        };
        Ok(repository(response, &repo)?.forks.into())
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryData<T> {
    repository: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaRepository {
    fork_count: u64,
    default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ForksRepository {
    forks: ForkConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForkConnection {
    total_count: u64,
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<Option<ForkNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForkNode {
    name_with_owner: String,
    stargazer_count: u32,
    fork_count: u32,
    updated_at: DateTime<Utc>,
    url: String,
    default_branch_ref: Option<ForkBranchRef>,
}

#[derive(Debug, Deserialize)]
struct ForkBranchRef {
    compare: Option<Comparison>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Comparison {
    ahead_by: u32,
    behind_by: u32,
}

/// Unwrap `data.repository`, turning GraphQL errors into [`ForkviewError::Api`].
fn repository<T>(response: GraphQlResponse<RepositoryData<T>>, repo: &RepoId) -> Result<T> {
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ForkviewError::Api(messages.join("; ")));
    }

    response
        .data
        .and_then(|d| d.repository)
        .ok_or_else(|| ForkviewError::Api(format!("repository {} not found", repo)))
}

impl From<ForkConnection> for ForkPage {
    fn from(conn: ForkConnection) -> Self {
        let forks = conn
            .nodes
            .into_iter()
            .flatten()
            .map(|node| {
                // compare() measures upstream's head ref against the fork's
                // branch, so upstream's lead is how far the fork is behind.
                let (ahead_by, behind_by) = node
                    .default_branch_ref
                    .and_then(|r| r.compare)
                    .map(|c| (c.behind_by, c.ahead_by))
                    .unwrap_or((0, 0));

                Fork {
                    full_name: node.name_with_owner,
                    stars: node.stargazer_count,
                    forks: node.fork_count,
                    updated_at: node.updated_at,
                    url: node.url,
                    ahead_by,
                    behind_by,
                }
            })
            .collect();

        ForkPage {
            forks,
            total_count: conn.total_count,
            end_cursor: conn.page_info.end_cursor,
            has_next: conn.page_info.has_next_page,
        }
    }
}
