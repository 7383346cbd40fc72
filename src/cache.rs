use std::collections::HashMap;

use crate::types::Fork;

/// Pages fetched under the active sort mode, keyed by zero-based page index.
///
/// Scoped to a single ordering: the owner must [`clear`](PageCache::clear) it
/// whenever the sort mode changes, since pages from two orderings can't be
/// mixed. Entries are never evicted individually.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: HashMap<usize, Vec<Fork>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page: usize) -> Option<&[Fork]> {
        self.pages.get(&page).map(Vec::as_slice)
    }

    pub fn put(&mut self, page: usize, forks: Vec<Fork>) {
        self.pages.insert(page, forks);
    }

    pub fn contains(&self, page: usize) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
