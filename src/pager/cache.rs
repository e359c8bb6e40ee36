use lru::LruCache;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::trace;

use super::snapshot::Page;

/// Least-recently-used store of decoded pages, keyed by page number.
///
/// A hit promotes the page; inserting past capacity drops the page that was
/// touched longest ago.
#[derive(Debug)]
pub struct PageCache {
    pages: LruCache<u32, Arc<Page>>,
}

impl PageCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            pages: LruCache::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.pages.cap().get()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&mut self, page_number: u32) -> Option<Arc<Page>> {
        self.pages.get(&page_number).cloned()
    }

    pub fn contains(&self, page_number: u32) -> bool {
        self.pages.contains(&page_number)
    }

    /// Returns the evicted page number, if any.
    pub fn insert(&mut self, page: Arc<Page>) -> Option<u32> {
        let number = page.number;
        match self.pages.push(number, page) {
            Some((evicted, _)) if evicted != number => {
                trace!("Evicted page {} for page {}", evicted, number);
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Ordered copy of the cached pages for publishing.
    pub fn to_map(&self) -> BTreeMap<u32, Arc<Page>> {
        self.pages
            .iter()
            .map(|(number, page)| (*number, Arc::clone(page)))
            .collect()
    }
}
