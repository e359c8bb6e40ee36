#![cfg(test)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::backends::JellyfinApiError;
use crate::backends::jellyfin::dto::{BaseItemDto, QueryResult};
use crate::pager::RequestHandler;

pub fn dto(n: usize) -> BaseItemDto {
    BaseItemDto {
        id: format!("item-{}", n),
        name: Some(format!("Item {}", n)),
        item_type: Some("Movie".to_string()),
        ..Default::default()
    }
}

/// In-memory paginated collection that records every request it serves.
pub struct FakeLibrary {
    items: Vec<BaseItemDto>,
    reported_total: Option<u32>,
    latency: Duration,
    failing: AtomicBool,
    probes: AtomicUsize,
    page_starts: Mutex<Vec<u32>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeLibrary {
    pub fn with_items(count: usize) -> Self {
        Self {
            items: (0..count).map(dto).collect(),
            reported_total: None,
            latency: Duration::ZERO,
            failing: AtomicBool::new(false),
            probes: AtomicUsize::new(0),
            page_starts: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Report a total that disagrees with the items actually served.
    pub fn reported_total(mut self, total: u32) -> Self {
        self.reported_total = Some(total);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Start index of every page request, in arrival order.
    pub fn page_fetches(&self) -> Vec<u32> {
        self.page_starts.lock().unwrap().clone()
    }

    pub fn page_fetch_count(&self) -> usize {
        self.page_starts.lock().unwrap().len()
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn query(&self, request: &FakeRequest) -> Result<QueryResult<BaseItemDto>, JellyfinApiError> {
        if request.limit == 0 {
            self.probes.fetch_add(1, Ordering::SeqCst);
        } else {
            self.page_starts.lock().unwrap().push(request.start_index);
        }

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(JellyfinApiError::from_status(503, "unavailable".to_string()));
        }

        let start = (request.start_index as usize).min(self.items.len());
        let end = (start + request.limit as usize).min(self.items.len());
        let total = self
            .reported_total
            .unwrap_or(self.items.len() as u32);

        Ok(QueryResult::new(
            self.items[start..end].to_vec(),
            total,
            request.start_index,
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeRequest {
    pub start_index: u32,
    pub limit: u32,
    pub enable_total_record_count: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FakeHandler;

#[async_trait]
impl RequestHandler<FakeLibrary> for FakeHandler {
    type Request = FakeRequest;

    fn prepare(
        &self,
        request: &Self::Request,
        start_index: u32,
        limit: u32,
        enable_total_record_count: bool,
    ) -> Self::Request {
        let mut request = request.clone();
        request.start_index = start_index;
        request.limit = limit;
        request.enable_total_record_count = enable_total_record_count;
        request
    }

    async fn execute(
        &self,
        client: &FakeLibrary,
        request: Self::Request,
    ) -> Result<QueryResult<BaseItemDto>, JellyfinApiError> {
        client.query(&request).await
    }
}

/// Poll `condition` every few milliseconds until it holds or `max_wait` passes.
pub async fn wait_for<F>(mut condition: F, max_wait: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    while start.elapsed() < max_wait {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
