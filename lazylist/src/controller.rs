use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::envelope::{Page, decode};
use crate::observer::ObserverCoordinator;
use crate::scroll::{PendingRestore, ScrollAnchor, apply_anchor, capture_anchor};
use crate::{
    ElementId, FetchError, Filters, Footer, FooterInputs, IntersectionEntry, ListOptions,
    LoadState, Node, ObserverHost, PageFetcher, PageRequest, RenderSurface, RenderedItem,
    WatchOptions,
};

/// What a controller operation ended up doing.
///
/// Operations never fail from the caller's point of view: failures are recorded in
/// [`LoadState::error`] and reported through the error callback. The outcome is informational.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A guard turned the call into a no-op (already loading, exhausted, a filter change in
    /// flight, nothing to retry, or the controller was destroyed).
    Skipped,
    /// A page landed. `count` is the number of items it contributed.
    Loaded { page: usize, count: usize },
    /// The fetch failed; the error is in the load state.
    Failed,
    /// The fetch completed after a newer operation started; its result was discarded.
    Stale,
    /// A debounced search was replaced by a later one before it fired.
    Superseded,
}

/// The operation a retry re-runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Retry {
    Page,
    Filters,
}

/// A fetch prepared under the lock and run without it.
struct Ticket {
    generation: u64,
    request: PageRequest,
    anchor: Option<ScrollAnchor>,
}

struct Inner<T> {
    items: Vec<T>,
    load: LoadState,
    filters: Filters,
    /// Bumped by every state-changing operation; a completion carrying an older value is
    /// discarded.
    generation: u64,
    retry: Retry,
    surface: Box<dyn RenderSurface>,
    observers: ObserverCoordinator<T>,
    pending_restore: Option<PendingRestore>,
    /// The surface still shows rows from before the last filter change; the next page that
    /// lands replaces them instead of appending.
    stale_rows: bool,
    destroyed: bool,
}

struct Shared<T> {
    options: ListOptions<T>,
    fetcher: Arc<dyn PageFetcher>,
    inner: Mutex<Inner<T>>,
    /// Single-flight flag for filter changes.
    updating: AtomicBool,
    /// Debounce token: only the search whose token is still current when its timer expires
    /// runs.
    search_seq: AtomicU64,
}

/// Releases the filter single-flight flag however the operation ends.
struct UpdateGuard<'a>(&'a AtomicBool);

impl<'a> UpdateGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A paginated, incrementally loaded list.
///
/// The controller owns the item collection and the [`LoadState`]; it drives a
/// [`RenderSurface`] and an [`ObserverHost`] supplied by the UI layer and fetches pages through a
/// [`PageFetcher`]. Adapters feed it UI events:
/// - `on_scroll` / `on_intersection` when the list scrolls or an observed element crosses a
///   threshold
/// - `on_frame` on the paint frame after a page was appended
/// - `on_item_click`, `set_open`, `handle_search` for the corresponding user actions
///
/// The handle is cheap to clone; clones share state.
pub struct ListController<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for ListController<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ListController<T> {
    pub fn new(
        options: ListOptions<T>,
        fetcher: impl PageFetcher + 'static,
        surface: impl RenderSurface + 'static,
        observer_host: impl ObserverHost + 'static,
    ) -> Self {
        Self::from_parts(
            options,
            Arc::new(fetcher),
            Box::new(surface),
            Box::new(observer_host),
        )
    }

    pub fn from_parts(
        options: ListOptions<T>,
        fetcher: Arc<dyn PageFetcher>,
        surface: Box<dyn RenderSurface>,
        observer_host: Box<dyn ObserverHost>,
    ) -> Self {
        let config = &options.config;
        let load_more = config.infinite_scroll.enabled.then_some(WatchOptions {
            threshold: config.infinite_scroll.intersection_threshold,
            root_margin_px: config.infinite_scroll.root_margin_px,
        });
        let visibility = config.tracking.enabled.then_some(WatchOptions {
            threshold: config.tracking.threshold,
            root_margin_px: config.tracking.root_margin_px,
        });
        ldebug!(
            page_size = config.page_size,
            infinite_scroll = config.infinite_scroll.enabled,
            tracking = config.tracking.enabled,
            "ListController::new"
        );
        let inner = Inner {
            items: Vec::new(),
            load: LoadState::default(),
            filters: Filters::default(),
            generation: 0,
            retry: Retry::Page,
            surface,
            observers: ObserverCoordinator::new(observer_host, load_more, visibility),
            pending_restore: None,
            stale_rows: false,
            destroyed: false,
        };
        Self {
            shared: Arc::new(Shared {
                options,
                fetcher,
                inner: Mutex::new(inner),
                updating: AtomicBool::new(false),
                search_seq: AtomicU64::new(0),
            }),
        }
    }

    pub fn options(&self) -> &ListOptions<T> {
        &self.shared.options
    }

    pub fn state(&self) -> LoadState {
        self.shared.inner.lock().load.clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.shared.inner.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.shared.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn filters(&self) -> Filters {
        self.shared.inner.lock().filters.clone()
    }

    /// Identifiers collected during the current open session, in the order they were seen.
    pub fn viewed_ids(&self) -> Vec<String> {
        self.shared.inner.lock().observers.viewed_ids()
    }

    pub fn is_open(&self) -> bool {
        self.shared.inner.lock().observers.is_open()
    }

    /// The element the load-more watcher currently observes.
    pub fn sentinel(&self) -> Option<ElementId> {
        self.shared.inner.lock().observers.sentinel()
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.inner.lock().destroyed
    }

    /// Initial render: mounts the search box, then either renders the seeded items or loads
    /// the first page.
    pub async fn mount(&self) -> LoadOutcome {
        if let Some(outcome) = self.mount_seed() {
            return outcome;
        }
        self.load_more().await
    }

    /// Loads the next page and appends it.
    ///
    /// A no-op while a load is in flight or once every item has been loaded. After a failure
    /// this re-attempts the same page.
    pub async fn load_more(&self) -> LoadOutcome {
        let Some(ticket) = self.begin_page(false) else {
            return LoadOutcome::Skipped;
        };
        self.complete_page(ticket).await
    }

    /// Drops everything loaded so far and loads the first page again.
    pub async fn reload(&self) -> LoadOutcome {
        let Some(ticket) = self.begin_page(true) else {
            return LoadOutcome::Skipped;
        };
        self.complete_page(ticket).await
    }

    /// Replaces the filter set and loads the first page under it, replacing the collection.
    ///
    /// The rendered rows stay on screen until the new page arrives, and stay there if the
    /// fetch fails.
    ///
    /// Single-flight: a call made while another filter change is in flight is dropped and
    /// leaves collection and filters untouched.
    pub async fn apply_filters(&self, filters: Filters) -> LoadOutcome {
        let Some(_guard) = UpdateGuard::acquire(&self.shared.updating) else {
            ltrace!("filter change already in flight; dropping");
            return LoadOutcome::Skipped;
        };
        let Some(ticket) = self.begin_filters(filters) else {
            return LoadOutcome::Skipped;
        };
        match self.fetch(&ticket.request).await {
            Ok(page) => self.finish_filters(&ticket, page),
            Err(err) => self.fail(&ticket, err, Retry::Filters),
        }
    }

    /// Debounced search. Each call restarts the delay; only the last call within the window
    /// applies its query (trimmed; an empty query removes the search filter).
    ///
    /// Must be called from within a Tokio runtime. The handle resolves to
    /// [`LoadOutcome::Superseded`] for calls that were replaced.
    pub fn handle_search(&self, query: impl Into<String>) -> JoinHandle<LoadOutcome> {
        let seq = self.shared.search_seq.fetch_add(1, Ordering::AcqRel) + 1;
        let delay = Duration::from_millis(self.shared.options.config.search.debounce_ms);
        let query = query.into();
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if this.shared.search_seq.load(Ordering::Acquire) != seq {
                return LoadOutcome::Superseded;
            }
            let filters = this.search_filters(&query);
            this.apply_filters(filters).await
        })
    }

    /// Replaces the collection and its rendering without touching the network.
    ///
    /// Any fetch still in flight is discarded when it completes.
    pub fn update_items(&self, items: Vec<T>) {
        let opts = &self.shared.options;
        let mut inner = self.shared.inner.lock();
        if inner.destroyed {
            return;
        }
        inner.generation += 1;
        let total = inner.load.total.max(items.len());
        inner.load = LoadState::loaded(inner.load.page, total, items.len());
        inner.items = items;
        inner.pending_restore = None;
        inner.rebuild(opts);
    }

    /// Re-runs whatever failed last: the same page, or the same filtered first page.
    pub async fn retry(&self) -> LoadOutcome {
        let (retry, filters) = {
            let inner = self.shared.inner.lock();
            if inner.destroyed || inner.load.error.is_none() {
                return LoadOutcome::Skipped;
            }
            (inner.retry, inner.filters.clone())
        };
        match retry {
            Retry::Page => self.load_more().await,
            Retry::Filters => self.apply_filters(filters).await,
        }
    }

    /// Scroll listener: loads the next page when the viewport is within
    /// `infinite_scroll.threshold_px` of the end.
    pub async fn on_scroll(&self) -> LoadOutcome {
        let config = &self.shared.options.config.infinite_scroll;
        let near_end = {
            let inner = self.shared.inner.lock();
            config.enabled
                && !inner.destroyed
                && inner.surface.scroll_metrics().remaining() <= config.threshold_px
        };
        if !near_end {
            return LoadOutcome::Skipped;
        }
        self.load_more().await
    }

    /// Routes intersection reports: visibility accounting first, then a load if the sentinel
    /// crossed its threshold.
    pub async fn on_intersection(&self, entries: &[IntersectionEntry]) -> LoadOutcome {
        let opts = &self.shared.options;
        let load_more = {
            let mut inner = self.shared.inner.lock();
            if inner.destroyed {
                return LoadOutcome::Skipped;
            }
            let Inner {
                observers, items, ..
            } = &mut *inner;
            observers.handle(entries, items, |item, index| (opts.item_id)(item, index))
        };
        if !load_more {
            return LoadOutcome::Skipped;
        }
        self.load_more().await
    }

    /// Paint-frame hook. Re-applies the last scroll restoration if late layout moved the
    /// content extent. Returns `true` when the scroll offset was written.
    pub fn on_frame(&self) -> bool {
        let tolerance = self.shared.options.config.scroll_restore_tolerance_px;
        let mut inner = self.shared.inner.lock();
        match inner.pending_restore.take() {
            Some(pending) => pending.settle(inner.surface.as_mut(), tolerance),
            None => false,
        }
    }

    /// Invokes the click callback for the item at `index`. Returns `false` when there is no
    /// such item or no callback.
    pub fn on_item_click(&self, index: usize) -> bool {
        let Some(on_click) = &self.shared.options.on_item_click else {
            return false;
        };
        let Some(item) = self.shared.inner.lock().items.get(index).cloned() else {
            return false;
        };
        on_click(&item, index);
        true
    }

    /// Marks the hosting surface (e.g. a dropdown) open or closed.
    ///
    /// Opening starts a fresh viewed set. Closing hands the items seen while open to the
    /// items-viewed hook (awaited) and clears the set.
    pub async fn set_open(&self, open: bool) {
        let opts = &self.shared.options;
        let (changed, viewed) = {
            let mut inner = self.shared.inner.lock();
            if inner.destroyed {
                return;
            }
            let changed = inner.observers.is_open() != open;
            (changed, inner.observers.set_open(open))
        };
        if open {
            if let (true, Some(on_open)) = (changed, &opts.on_open) {
                on_open();
            }
            return;
        }
        if !viewed.is_empty() {
            ldebug!(count = viewed.len(), "flushing viewed items");
            if let Some(on_viewed) = &opts.on_items_viewed {
                on_viewed(viewed).await;
            }
        }
        if let (true, Some(on_close)) = (changed, &opts.on_close) {
            on_close();
        }
    }

    /// Hands the current collection to the batch-action hook. Returns `false` without a hook.
    pub async fn batch_action(&self, action: impl Into<String>) -> bool {
        let Some(on_batch) = &self.shared.options.on_batch_action else {
            return false;
        };
        let items = self.items();
        on_batch(action.into(), items).await;
        true
    }

    /// Disconnects every watcher and turns all further operations into no-ops. In-flight
    /// fetches are discarded when they complete.
    pub fn destroy(&self) {
        self.shared.search_seq.fetch_add(1, Ordering::AcqRel);
        let mut inner = self.shared.inner.lock();
        if inner.destroyed {
            return;
        }
        ldebug!("ListController::destroy");
        inner.destroyed = true;
        inner.generation += 1;
        inner.pending_restore = None;
        inner.observers.disconnect();
    }

    fn mount_seed(&self) -> Option<LoadOutcome> {
        let opts = &self.shared.options;
        let mut inner = self.shared.inner.lock();
        if inner.destroyed {
            return Some(LoadOutcome::Skipped);
        }
        if opts.config.search.enabled {
            let placeholder = opts.text(&opts.config.search.placeholder);
            inner.surface.mount_search(&placeholder);
        }
        if opts.initial_items.is_empty() {
            return None;
        }
        let count = opts.initial_items.len();
        let total = opts.initial_total.unwrap_or(count);
        inner.generation += 1;
        inner.items = opts.initial_items.clone();
        inner.load = LoadState::loaded(1, total, count);
        inner.rebuild(opts);
        Some(LoadOutcome::Loaded { page: 1, count })
    }

    fn begin_page(&self, reset: bool) -> Option<Ticket> {
        let opts = &self.shared.options;
        let mut inner = self.shared.inner.lock();
        if inner.destroyed {
            return None;
        }
        if reset {
            inner.items.clear();
            inner.load = LoadState::default();
            inner.pending_restore = None;
            inner.stale_rows = false;
            inner.surface.clear();
            inner.observers.release_elements();
        } else if inner.load.loading || !inner.load.has_more {
            ltrace!(
                loading = inner.load.loading,
                has_more = inner.load.has_more,
                "load_more skipped"
            );
            return None;
        }

        let anchor = capture_anchor(&*inner.surface);
        inner.generation += 1;
        inner.load = inner.load.begin();
        inner.retry = Retry::Page;
        let request = self.request(inner.load.page + 1, &inner.filters);
        ldebug!(page = request.page, generation = inner.generation, "loading page");
        inner.refresh(opts);
        Some(Ticket {
            generation: inner.generation,
            request,
            anchor: Some(anchor),
        })
    }

    fn begin_filters(&self, filters: Filters) -> Option<Ticket> {
        let opts = &self.shared.options;
        let mut inner = self.shared.inner.lock();
        if inner.destroyed {
            return None;
        }
        inner.generation += 1;
        let request = self.request(1, &filters);
        ldebug!(filters = ?filters, generation = inner.generation, "applying filters");
        inner.filters = filters;
        inner.items.clear();
        inner.load = LoadState::restart();
        inner.retry = Retry::Filters;
        inner.pending_restore = None;
        inner.stale_rows = true;
        inner.refresh(opts);
        Some(Ticket {
            generation: inner.generation,
            request,
            anchor: None,
        })
    }

    async fn complete_page(&self, ticket: Ticket) -> LoadOutcome {
        match self.fetch(&ticket.request).await {
            Ok(page) => self.finish_page(&ticket, page),
            Err(err) => self.fail(&ticket, err, Retry::Page),
        }
    }

    async fn fetch(&self, request: &PageRequest) -> Result<Page<T>, FetchError> {
        let opts = &self.shared.options;
        let body = self.shared.fetcher.fetch(request.clone()).await?;
        decode(&body, &opts.extract_items, &opts.extract_total)
    }

    fn finish_page(&self, ticket: &Ticket, page: Page<T>) -> LoadOutcome {
        let opts = &self.shared.options;
        let page_no = ticket.request.page;
        let mut inner = self.shared.inner.lock();
        if inner.generation != ticket.generation {
            ldebug!(page = page_no, "discarding stale page");
            return LoadOutcome::Stale;
        }

        let start = inner.items.len();
        let count = page.items.len();
        inner.items.extend(page.items);
        inner.load = LoadState::loaded(page_no, page.total, inner.items.len());
        let replaced = inner.stale_rows;
        if replaced {
            inner.rebuild(opts);
        } else {
            let Inner {
                surface,
                observers,
                items,
                ..
            } = &mut *inner;
            mount_items(surface.as_mut(), observers, opts, &items[start..], start);
            inner.refresh(opts);
        }
        if let (false, Some(anchor)) = (replaced, ticket.anchor) {
            let pending = apply_anchor(inner.surface.as_mut(), anchor);
            inner.pending_restore = Some(pending);
        }
        ldebug!(
            page = page_no,
            count,
            total = page.total,
            has_more = inner.load.has_more,
            "page loaded"
        );

        let loaded = opts.on_loaded.as_ref().map(|_| inner.items.clone());
        drop(inner);
        if let (Some(on_loaded), Some(items)) = (&opts.on_loaded, loaded) {
            on_loaded(page_no, &items);
        }
        LoadOutcome::Loaded {
            page: page_no,
            count,
        }
    }

    fn finish_filters(&self, ticket: &Ticket, page: Page<T>) -> LoadOutcome {
        let opts = &self.shared.options;
        let mut inner = self.shared.inner.lock();
        if inner.generation != ticket.generation {
            ldebug!("discarding stale filter result");
            return LoadOutcome::Stale;
        }

        let count = page.items.len();
        inner.load = LoadState::loaded(1, page.total, count);
        inner.items = page.items;
        inner.rebuild(opts);

        let loaded = opts.on_loaded.as_ref().map(|_| inner.items.clone());
        let filters = inner.filters.clone();
        drop(inner);
        if let (Some(on_loaded), Some(items)) = (&opts.on_loaded, loaded) {
            on_loaded(1, &items);
        }
        if let Some(on_filters_changed) = &opts.on_filters_changed {
            on_filters_changed(&filters);
        }
        LoadOutcome::Loaded { page: 1, count }
    }

    fn fail(&self, ticket: &Ticket, err: FetchError, retry: Retry) -> LoadOutcome {
        let opts = &self.shared.options;
        let mut inner = self.shared.inner.lock();
        if inner.generation != ticket.generation {
            ldebug!(error = %err, "discarding stale failure");
            return LoadOutcome::Stale;
        }

        lwarn!(page = ticket.request.page, error = %err, "page load failed");
        let mut message = err.to_string();
        if message.trim().is_empty() {
            message = opts.text(&opts.config.texts.error);
        }
        inner.load = inner.load.failed(message);
        inner.retry = retry;
        inner.refresh(opts);
        drop(inner);

        if let Some(on_error) = &opts.on_error {
            on_error(&err);
        }
        LoadOutcome::Failed
    }

    fn request(&self, page: usize, filters: &Filters) -> PageRequest {
        let opts = &self.shared.options;
        PageRequest::build(
            page,
            opts.config.page_size,
            filters,
            opts.config.endpoint.as_deref(),
            opts.url_builder.as_ref(),
        )
    }

    fn search_filters(&self, query: &str) -> Filters {
        let key = &self.shared.options.config.search.filter_key;
        let mut filters = self.filters();
        match query.trim() {
            "" => {
                filters.remove(key);
            }
            q => {
                filters.insert(key.clone(), q);
            }
        }
        filters
    }
}

impl<T: Clone + 'static> Inner<T> {
    /// Recomputes the loading indicator and footer, then re-points the load-more watcher at the
    /// footer's sentinel.
    fn refresh(&mut self, opts: &ListOptions<T>) {
        let texts = &opts.config.texts;
        let indicator = self.load.loading.then(|| {
            Node::element("div")
                .class(&opts.config.classes.loading)
                .attr("role", "status")
                .text_child(opts.text(&texts.loading))
        });
        self.surface.set_loading(indicator.as_ref());

        let empty = texts.empty.as_deref().map(|e| opts.text(e));
        let footer = Footer::compute(FooterInputs {
            item_count: self.items.len(),
            loading: self.load.loading,
            has_more: self.load.has_more,
            error: self.load.error.as_deref(),
            empty: empty.as_deref(),
            load_more: &opts.text(&texts.load_more),
            end: &opts.text(&texts.end),
            retry: &opts.text(&texts.retry),
        });
        let sentinel = self.surface.set_footer(&footer);
        self.observers.attach_sentinel(sentinel);
    }

    /// Full replace: clears the surface (items, footer, status nodes) and renders the whole
    /// collection from scratch.
    fn rebuild(&mut self, opts: &ListOptions<T>) {
        self.stale_rows = false;
        self.surface.clear();
        self.observers.release_elements();
        mount_items(
            self.surface.as_mut(),
            &mut self.observers,
            opts,
            &self.items,
            0,
        );
        self.refresh(opts);
    }
}

/// Renders `items` (which start at absolute index `start`) and mounts them as one batch.
fn mount_items<T: Clone + 'static>(
    surface: &mut dyn RenderSurface,
    observers: &mut ObserverCoordinator<T>,
    opts: &ListOptions<T>,
    items: &[T],
    start: usize,
) {
    if items.is_empty() {
        return;
    }
    let tracking = opts.config.tracking.enabled;
    let clickable = opts.on_item_click.is_some();
    let batch: Vec<RenderedItem> = items
        .iter()
        .enumerate()
        .map(|(offset, item)| {
            let index = start + offset;
            let trackable = tracking && (opts.is_trackable)(item);
            let mut node = (opts.render_item)(item, index)
                .class(&opts.config.classes.item)
                .attr("data-index", index.to_string());
            if trackable {
                node = node.attr("data-trackable", "true");
            }
            RenderedItem {
                index,
                node,
                clickable,
                trackable,
            }
        })
        .collect();

    let tracked: Vec<usize> = batch
        .iter()
        .filter(|r| r.trackable)
        .map(|r| r.index)
        .collect();
    let elements = surface.append_items(batch);
    debug_assert_eq!(elements.len(), items.len(), "append_items must return one id per item");
    observers.track(
        elements
            .into_iter()
            .zip(start..)
            .filter(|(_, index)| tracked.binary_search(index).is_ok()),
    );
}
