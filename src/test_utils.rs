use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::error::{ForkviewError, Result};
use crate::launcher::Launcher;
use crate::source::ForkSource;
use crate::types::{Fork, ForkPage, ForkQuery, RepoId, RepoMeta, SortMode};

pub fn fork(full_name: &str) -> Fork {
    Fork {
        full_name: full_name.to_string(),
        stars: 1,
        forks: 0,
        updated_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        url: format!("https://github.com/{}", full_name),
        ahead_by: 0,
        behind_by: 0,
    }
}

/// `count` forks named `{prefix}/fork-{i}`.
pub fn page_of(prefix: &str, count: usize, cursor: Option<&str>, has_next: bool) -> ForkPage {
    ForkPage {
        forks: (0..count)
            .map(|i| fork(&format!("{}/fork-{}", prefix, i)))
            .collect(),
        total_count: 20,
        end_cursor: cursor.map(str::to_string),
        has_next,
    }
}

pub fn query(after: Option<&str>) -> ForkQuery {
    ForkQuery {
        owner: "octo".to_string(),
        name: "hello".to_string(),
        head_ref: "octo:main".to_string(),
        sort: SortMode::UpdatedAt,
        after: after.map(str::to_string),
    }
}

pub fn repo() -> RepoId {
    RepoId {
        owner: "octo".to_string(),
        name: "hello".to_string(),
    }
}

/// In-memory [`ForkSource`] answering page requests from a scripted queue.
#[derive(Debug)]
pub struct MockSource {
    fork_count: u64,
    responses: Mutex<VecDeque<Result<ForkPage>>>,
    queries: Mutex<Vec<ForkQuery>>,
}

impl MockSource {
    pub fn new(fork_count: u64) -> Self {
        Self {
            fork_count,
            responses: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn push_page(&self, page: ForkPage) {
        self.responses.lock().unwrap().push_back(Ok(page));
    }

    pub fn fail_next(&self, err: ForkviewError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn page_calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<ForkQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForkSource for MockSource {
    async fn repo_meta(&self, _repo: &RepoId) -> Result<RepoMeta> {
        Ok(RepoMeta {
            default_branch: "main".to_string(),
            fork_count: self.fork_count,
        })
    }

    async fn fork_page(&self, query: &ForkQuery) -> Result<ForkPage> {
        self.queries.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ForkviewError::Api("no scripted response".to_string())))
    }
}

/// [`Launcher`] that records URLs instead of touching the desktop.
#[derive(Debug, Default)]
pub struct MockLauncher {
    fail: bool,
    opened: Mutex<Vec<String>>,
    copied: Mutex<Vec<String>>,
}

impl MockLauncher {
    /// A launcher whose every call fails, like a headless machine.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn copied(&self) -> Vec<String> {
        self.copied.lock().unwrap().clone()
    }
}

impl Launcher for MockLauncher {
    fn open_url(&self, url: &str) -> Result<()> {
        if self.fail {
            return Err(ForkviewError::Browser("no launcher available".to_string()));
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(ForkviewError::Clipboard("no clipboard available".to_string()));
        }
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
