use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::BaseItem;

/// One fetched page. Pages are only ever stored whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: u32,
    pub start_index: usize,
    pub items: Vec<Arc<BaseItem>>,
}

impl Page {
    pub fn new(number: u32, start_index: usize, items: Vec<Arc<BaseItem>>) -> Self {
        Self {
            number,
            start_index,
            items,
        }
    }

    /// Item at absolute list `index`; `None` for slots past a short page.
    pub fn item(&self, index: usize) -> Option<Arc<BaseItem>> {
        index
            .checked_sub(self.start_index)
            .and_then(|offset| self.items.get(offset))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Immutable view of a pager, republished after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct PagerSnapshot {
    /// `None` until the total count probe has completed.
    pub total_count: Option<usize>,
    pub page_size: u32,
    pub pages: BTreeMap<u32, Arc<Page>>,
    /// Bumped on every publish.
    pub version: u64,
}

impl PagerSnapshot {
    pub(crate) fn empty(page_size: u32) -> Self {
        Self {
            total_count: None,
            page_size,
            pages: BTreeMap::new(),
            version: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.total_count.unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn page_number(&self, index: usize) -> u32 {
        (index / self.page_size as usize) as u32
    }

    /// The item at `index` if its page is in this snapshot.
    pub fn get(&self, index: usize) -> Option<Arc<BaseItem>> {
        if index >= self.len() {
            return None;
        }
        self.pages
            .get(&self.page_number(index))
            .and_then(|page| page.item(index))
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        self.pages.contains_key(&self.page_number(index))
    }

    /// Every slot of the list, `None` where nothing is loaded.
    pub fn items(&self) -> impl Iterator<Item = Option<Arc<BaseItem>>> + '_ {
        (0..self.len()).map(|index| self.get(index))
    }
}
