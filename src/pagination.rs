//! Page navigation over a cursor-paginated fork list.
//!
//! [`Pager`] is a plain state machine: it takes a [`PagerEvent`], updates its
//! position and cache, and returns the [`Effect`]s the caller has to run. It
//! never spawns anything itself, so the event loop decides how fetches are
//! executed and feeds their results back as [`PagerEvent::Loaded`].

use crate::cache::PageCache;
use crate::types::{Fork, ForkPage, SortMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A fetch for `target` is outstanding under request id `request`.
    Loading { target: usize, request: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerEvent {
    NextPage,
    PrevPage,
    Sort(SortMode),
    Loaded {
        request: u64,
        page: usize,
        result: ForkPage,
    },
}

/// Work the event loop must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchPlan),
}

/// A page fetch decided by the pager. The caller adds the repository context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub request: u64,
    pub page: usize,
    pub sort: SortMode,
    pub after: Option<String>,
}

#[derive(Debug)]
pub struct Pager {
    phase: Phase,
    page: usize,
    sort: SortMode,
    cache: PageCache,
    /// Cursor returned with the highest page fetched so far.
    cursor: Option<String>,
    last_page: Option<usize>,
    /// `totalCount` from the latest accepted page; kept across sort changes.
    total_count: Option<u64>,
    next_request: u64,
}

impl Pager {
    /// Create a pager and the fetch for page 0 it starts out waiting on.
    pub fn new(sort: SortMode) -> (Self, Vec<Effect>) {
        let mut pager = Self {
            phase: Phase::Idle,
            page: 0,
            sort,
            cache: PageCache::new(),
            cursor: None,
            last_page: None,
            total_count: None,
            next_request: 0,
        };
        let effects = vec![pager.start_fetch(0, None)];
        (pager, effects)
    }

    pub fn handle(&mut self, event: PagerEvent) -> Vec<Effect> {
        match event {
            PagerEvent::Loaded {
                request,
                page,
                result,
            } => self.on_loaded(request, page, result),
            _ if self.is_loading() => {
                tracing::debug!(?event, "ignoring input while a page is loading");
                Vec::new()
            }
            PagerEvent::NextPage => self.next_page(),
            PagerEvent::PrevPage => {
                self.prev_page();
                Vec::new()
            }
            PagerEvent::Sort(mode) => self.resort(mode),
        }
    }

    fn next_page(&mut self) -> Vec<Effect> {
        let target = self.page + 1;

        if self.cache.contains(target) {
            self.page = target;
            return Vec::new();
        }

        if self.last_page == Some(self.page) {
            return Vec::new();
        }

        let Some(cursor) = self.cursor.clone() else {
            tracing::warn!(page = self.page, "no continuation cursor, cannot page forward");
            return Vec::new();
        };

        vec![self.start_fetch(target, Some(cursor))]
    }

    fn prev_page(&mut self) {
        if self.page == 0 {
            return;
        }
        debug_assert!(self.cache.contains(self.page - 1));
        self.page -= 1;
    }

    fn resort(&mut self, mode: SortMode) -> Vec<Effect> {
        self.sort = mode;
        self.cache.clear();
        self.cursor = None;
        self.last_page = None;
        self.page = 0;
        vec![self.start_fetch(0, None)]
    }

    fn on_loaded(&mut self, request: u64, page: usize, result: ForkPage) -> Vec<Effect> {
        match self.phase {
            Phase::Loading {
                target,
                request: pending,
            } if target == page && pending == request => {}
            _ => {
                tracing::debug!(request, page, "discarding stale page result");
                return Vec::new();
            }
        }

        let fetched = result.forks.len();
        self.cache.put(page, result.forks);
        tracing::debug!(
            page,
            forks = fetched,
            has_next = result.has_next,
            cached_pages = self.cache.len(),
            "page loaded"
        );

        self.cursor = result.end_cursor;
        self.total_count = Some(result.total_count);
        if !result.has_next {
            self.last_page = Some(page);
        }
        self.page = page;
        self.phase = Phase::Idle;
        Vec::new()
    }

    fn start_fetch(&mut self, page: usize, after: Option<String>) -> Effect {
        let request = self.next_request;
        self.next_request += 1;
        self.phase = Phase::Loading {
            target: page,
            request,
        };
        Effect::Fetch(FetchPlan {
            request,
            page,
            sort: self.sort,
            after,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn last_page(&self) -> Option<usize> {
        self.last_page
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Forks on the current page. Empty until the first page arrives.
    pub fn current_forks(&self) -> &[Fork] {
        self.cache.get(self.page).unwrap_or(&[])
    }
}
