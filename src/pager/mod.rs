//! Randomly indexable, lazily fetched, page-cached lists over Jellyfin's
//! paginated endpoints.
//!
//! An [`ApiRequestPager`] presents `total_count` slots. Reading a slot whose
//! page is cached returns the item; reading any other slot schedules a fetch
//! for its page and returns `None` straight away. Every completed fetch
//! publishes a fresh [`PagerSnapshot`] so bound views can redraw.
//!
//! At most one fetch per page is ever in flight. Callers that need the
//! value now use [`ApiRequestPager::get_blocking`], which joins the pending
//! fetch instead of starting another one.

mod cache;
mod error;
mod handler;
mod letter;
mod snapshot;


pub use cache::PageCache;
pub use error::PagerError;
pub use handler::{
    EpisodesRequestHandler, GenresRequestHandler, ItemsRequestHandler, NextUpRequestHandler,
    PlaylistItemsRequestHandler, ProgramsRequestHandler, RequestHandler,
    ResumeItemsRequestHandler, SuggestionsRequestHandler,
};
pub use letter::letter_position;
pub use snapshot::{Page, PagerSnapshot};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{OnceCell, Semaphore, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::PagingConfig;
use crate::constants::{DEFAULT_CACHE_PAGES, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_PAGE_SIZE};
use crate::mapper::BaseItemMapper;
use crate::models::BaseItem;

type FetchResult = Result<Arc<Page>, PagerError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

struct PagerState {
    total_count: Option<usize>,
    cache: PageCache,
    in_flight: HashMap<u32, InFlight>,
    next_fetch_id: u64,
    version: u64,
}

struct PagerInner<C, H>
where
    C: Send + Sync + 'static,
    H: RequestHandler<C>,
{
    client: Arc<C>,
    request: H::Request,
    handler: H,
    mapper: BaseItemMapper,
    page_size: u32,
    total_count: OnceCell<usize>,
    state: Mutex<PagerState>,
    fetch_permits: Semaphore,
    snapshots: watch::Sender<PagerSnapshot>,
    scope: CancellationToken,
    runtime: Handle,
}

impl<C, H> PagerInner<C, H>
where
    C: Send + Sync + 'static,
    H: RequestHandler<C>,
{
    fn lock_state(&self) -> MutexGuard<'_, PagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn page_number(&self, index: usize) -> u32 {
        (index / self.page_size as usize) as u32
    }

    /// Builds the next snapshot; call with the state lock held.
    fn next_snapshot(&self, state: &mut PagerState) -> PagerSnapshot {
        state.version += 1;
        PagerSnapshot {
            total_count: state.total_count,
            page_size: self.page_size,
            pages: state.cache.to_map(),
            version: state.version,
        }
    }

    /// Must run after the state lock is released: readers may hold a
    /// snapshot borrow while they call into the pager.
    fn publish(&self, snapshot: PagerSnapshot) {
        self.snapshots.send_if_modified(|current| {
            if snapshot.version > current.version {
                *current = snapshot;
                true
            } else {
                false
            }
        });
    }

    async fn probe_total(&self) -> Result<usize, PagerError> {
        let request = self.handler.prepare(&self.request, 0, 0, true);
        debug!("Probing total count with {:?}", request);

        let result = tokio::select! {
            biased;
            _ = self.scope.cancelled() => return Err(PagerError::Cancelled),
            result = self.handler.execute(&self.client, request) => result.map_err(PagerError::Init)?,
        };

        let total = result.total_record_count as usize;
        info!("Pager initialized with {} items", total);

        let snapshot = {
            let mut state = self.lock_state();
            state.total_count = Some(total);
            self.next_snapshot(&mut state)
        };
        self.publish(snapshot);
        Ok(total)
    }

    /// Joins the in-flight fetch for `page_number` or spawns a new one.
    /// Must be called with the state lock held so check and insert are atomic.
    fn schedule_fetch(self: &Arc<Self>, state: &mut PagerState, page_number: u32) -> SharedFetch {
        if let Some(in_flight) = state.in_flight.get(&page_number) {
            trace!("Page {} already in flight", page_number);
            return in_flight.fetch.clone();
        }

        let id = state.next_fetch_id;
        state.next_fetch_id += 1;

        let inner = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = inner.scope.cancelled() => Err(PagerError::Cancelled),
                result = inner.fetch_page(page_number) => result,
            };
            inner.finish_fetch(page_number, id, &result);
            result
        });

        let fetch = async move {
            match task.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(PagerError::Cancelled),
                Err(e) => Err(PagerError::TaskFailed(e.to_string())),
            }
        }
        .boxed()
        .shared();

        state.in_flight.insert(
            page_number,
            InFlight {
                id,
                fetch: fetch.clone(),
            },
        );
        fetch
    }

    async fn fetch_page(&self, page_number: u32) -> FetchResult {
        let _permit = self
            .fetch_permits
            .acquire()
            .await
            .map_err(|_| PagerError::Cancelled)?;

        // Another fetch may have landed while we waited for the permit
        let cached = self.lock_state().cache.get(page_number);
        if let Some(page) = cached {
            trace!("Page {} cached while waiting, skipping fetch", page_number);
            return Ok(page);
        }

        let start_index = page_number * self.page_size;
        let request = self
            .handler
            .prepare(&self.request, start_index, self.page_size, false);
        debug!(
            "Fetching page {} (start {}, limit {})",
            page_number, start_index, self.page_size
        );

        let result = self
            .handler
            .execute(&self.client, request)
            .await
            .map_err(|source| PagerError::Fetch {
                page: page_number,
                source,
            })?;

        let expected = self.expected_len(start_index as usize);
        if result.items.len() < expected {
            warn!(
                "Page {} returned {} items, expected {}",
                page_number,
                result.items.len(),
                expected
            );
        }

        let items: Vec<Arc<BaseItem>> = result
            .items
            .into_iter()
            .take(self.page_size as usize)
            .map(|dto| Arc::new(self.mapper.map(dto)))
            .collect();
        let page = Arc::new(Page::new(page_number, start_index as usize, items));

        let snapshot = {
            let mut state = self.lock_state();
            state.cache.insert(Arc::clone(&page));
            self.next_snapshot(&mut state)
        };
        self.publish(snapshot);
        Ok(page)
    }

    fn expected_len(&self, start_index: usize) -> usize {
        let page_size = self.page_size as usize;
        self.total_count
            .get()
            .map_or(page_size, |total| total.saturating_sub(start_index).min(page_size))
    }

    fn finish_fetch(&self, page_number: u32, id: u64, result: &FetchResult) {
        {
            let mut state = self.lock_state();
            if state
                .in_flight
                .get(&page_number)
                .is_some_and(|in_flight| in_flight.id == id)
            {
                state.in_flight.remove(&page_number);
            }
        }

        match result {
            Ok(_) | Err(PagerError::Cancelled) => {}
            Err(e) => error!("Page fetch failed: {}", e),
        }
    }
}

/// Paged list over one remote collection.
///
/// Cheap to clone; clones share cache, in-flight fetches and snapshots.
pub struct ApiRequestPager<C, H>
where
    C: Send + Sync + 'static,
    H: RequestHandler<C>,
{
    inner: Arc<PagerInner<C, H>>,
}

impl<C, H> Clone for ApiRequestPager<C, H>
where
    C: Send + Sync + 'static,
    H: RequestHandler<C>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, H> fmt::Debug for ApiRequestPager<C, H>
where
    C: Send + Sync + 'static,
    H: RequestHandler<C>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequestPager")
            .field("request", &self.inner.request)
            .field("page_size", &self.inner.page_size)
            .field("total_count", &self.inner.total_count.get())
            .finish_non_exhaustive()
    }
}

impl<C, H> ApiRequestPager<C, H>
where
    C: Send + Sync + 'static,
    H: RequestHandler<C>,
{
    pub fn builder(client: Arc<C>, request: H::Request, handler: H) -> PagerBuilder<C, H> {
        PagerBuilder::new(client, request, handler)
    }

    /// Fetch the total count. Concurrent callers share one probe request;
    /// after success every call returns the stored count.
    pub async fn init(&self) -> Result<usize, PagerError> {
        self.inner
            .total_count
            .get_or_try_init(|| self.inner.probe_total())
            .await
            .copied()
    }

    /// `init()`, then start loading the page around `position`.
    pub async fn init_at(&self, position: usize) -> Result<usize, PagerError> {
        let total = self.init().await?;
        if position < total {
            self.prefetch(position)?;
        }
        Ok(total)
    }

    /// Total count, `None` before `init()` completed.
    pub fn size(&self) -> Option<usize> {
        self.inner.total_count.get().copied()
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    pub fn request(&self) -> &H::Request {
        &self.inner.request
    }

    fn check_bounds(&self, index: usize) -> Result<usize, PagerError> {
        let size = self.size().ok_or(PagerError::NotInitialized)?;
        if index >= size {
            return Err(PagerError::IndexOutOfBounds { index, size });
        }
        Ok(size)
    }

    /// Non-blocking read. `Ok(None)` means either "still loading" or, when
    /// the page is already cached, "the server had nothing at this slot".
    pub fn get(&self, index: usize) -> Result<Option<Arc<BaseItem>>, PagerError> {
        self.check_bounds(index)?;
        let page_number = self.inner.page_number(index);

        let mut state = self.inner.lock_state();
        if let Some(page) = state.cache.get(page_number) {
            return Ok(page.item(index));
        }
        if !self.inner.scope.is_cancelled() {
            // The spawned task runs to completion whether or not anyone awaits it
            let _ = self.inner.schedule_fetch(&mut state, page_number);
        }
        Ok(None)
    }

    /// Start loading the page holding `index` without reading it.
    pub fn prefetch(&self, index: usize) -> Result<(), PagerError> {
        self.get(index).map(|_| ())
    }

    /// Read `index`, waiting for its page when it is not cached.
    pub async fn get_blocking(&self, index: usize) -> Result<Option<Arc<BaseItem>>, PagerError> {
        self.check_bounds(index)?;
        let page_number = self.inner.page_number(index);

        let fetch = {
            let mut state = self.inner.lock_state();
            if let Some(page) = state.cache.get(page_number) {
                return Ok(page.item(index));
            }
            if self.inner.scope.is_cancelled() {
                return Err(PagerError::Cancelled);
            }
            self.inner.schedule_fetch(&mut state, page_number)
        };

        // Read from the fetched page itself; it may already be evicted again
        let page = fetch.await?;
        Ok(page.item(index))
    }

    /// Position of the first item matching `predicate`, loading pages in
    /// order until one matches. Walks the whole list in the worst case.
    pub async fn index_of_blocking<F>(&self, mut predicate: F) -> Result<Option<usize>, PagerError>
    where
        F: FnMut(&BaseItem) -> bool,
    {
        let total = self.init().await?;
        for index in 0..total {
            if let Some(item) = self.get_blocking(index).await?
                && predicate(item.as_ref())
            {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    pub fn snapshot(&self) -> PagerSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PagerSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Number of pages currently held in the cache.
    pub fn cached_pages(&self) -> usize {
        self.inner.lock_state().cache.len()
    }

    /// Tear down the pager's scope: pending fetches are dropped without
    /// touching the cache and no new fetches start.
    pub fn cancel(&self) {
        debug!("Cancelling pager scope");
        self.inner.scope.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.scope.is_cancelled()
    }
}

pub struct PagerBuilder<C, H>
where
    C: Send + Sync + 'static,
    H: RequestHandler<C>,
{
    client: Arc<C>,
    request: H::Request,
    handler: H,
    page_size: u32,
    cache_pages: usize,
    max_concurrent_fetches: usize,
    mapper: BaseItemMapper,
    scope: Option<CancellationToken>,
    runtime: Option<Handle>,
}

impl<C, H> PagerBuilder<C, H>
where
    C: Send + Sync + 'static,
    H: RequestHandler<C>,
{
    fn new(client: Arc<C>, request: H::Request, handler: H) -> Self {
        Self {
            client,
            request,
            handler,
            page_size: DEFAULT_PAGE_SIZE,
            cache_pages: DEFAULT_CACHE_PAGES,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            mapper: BaseItemMapper::default(),
            scope: None,
            runtime: None,
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn cache_pages(mut self, cache_pages: usize) -> Self {
        self.cache_pages = cache_pages;
        self
    }

    /// 1 (the default) serialises every fetch of this pager.
    pub fn max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max;
        self
    }

    pub fn paging(self, paging: &PagingConfig) -> Self {
        self.page_size(paging.page_size)
            .cache_pages(paging.cache_pages)
            .max_concurrent_fetches(paging.max_concurrent_fetches)
    }

    pub fn use_series_for_primary(mut self, enabled: bool) -> Self {
        self.mapper = BaseItemMapper::new(enabled);
        self
    }

    /// Tie the pager's fetches to an owning scope; cancelling the parent
    /// cancels the pager, not the other way round.
    pub fn scope(mut self, parent: &CancellationToken) -> Self {
        self.scope = Some(parent.child_token());
        self
    }

    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> Result<ApiRequestPager<C, H>, PagerError> {
        if self.page_size == 0 {
            return Err(PagerError::InvalidConfig(
                "page size must be positive".to_string(),
            ));
        }
        let capacity = NonZeroUsize::new(self.cache_pages).ok_or_else(|| {
            PagerError::InvalidConfig("cache must hold at least one page".to_string())
        })?;
        if self.max_concurrent_fetches == 0 {
            return Err(PagerError::InvalidConfig(
                "at least one concurrent fetch is required".to_string(),
            ));
        }
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| PagerError::NoRuntime)?,
        };

        let (snapshots, _) = watch::channel(PagerSnapshot::empty(self.page_size));

        Ok(ApiRequestPager {
            inner: Arc::new(PagerInner {
                client: self.client,
                request: self.request,
                handler: self.handler,
                mapper: self.mapper,
                page_size: self.page_size,
                total_count: OnceCell::new(),
                state: Mutex::new(PagerState {
                    total_count: None,
                    cache: PageCache::new(capacity),
                    in_flight: HashMap::new(),
                    next_fetch_id: 0,
                    version: 0,
                }),
                fetch_permits: Semaphore::new(self.max_concurrent_fetches),
                snapshots,
                scope: self.scope.unwrap_or_default(),
                runtime,
            }),
        })
    }
}
