use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope::{default_items, default_total};
use crate::{
    FetchError, Filters, ItemsExtractor, ListConfig, Node, TotalExtractor, Translate, UrlBuilder,
};

/// Renders one item. The second argument is the item's absolute index in the collection.
pub type RenderItem<T> = Arc<dyn Fn(&T, usize) -> Node + Send + Sync>;

/// Produces a stable identity for an item (used for visibility accounting).
pub type ItemId<T> = Arc<dyn Fn(&T, usize) -> String + Send + Sync>;

/// Decides whether an item takes part in visibility accounting.
pub type Trackable<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

pub type OnItemClick<T> = Arc<dyn Fn(&T, usize) + Send + Sync>;

/// Fired after a page (or a filtered first page) lands, with the page number and the full
/// accumulated collection.
pub type OnLoaded<T> = Arc<dyn Fn(usize, &[T]) + Send + Sync>;

pub type OnError = Arc<dyn Fn(&FetchError) + Send + Sync>;

pub type OnFiltersChanged = Arc<dyn Fn(&Filters) + Send + Sync>;

/// Receives the items that became visible while the hosting surface was open.
pub type OnItemsViewed<T> = Arc<dyn Fn(Vec<T>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Receives a named batch action together with the current collection.
pub type OnBatchAction<T> = Arc<dyn Fn(String, Vec<T>) -> BoxFuture<'static, ()> + Send + Sync>;

pub type OnToggle = Arc<dyn Fn() + Send + Sync>;

/// Configuration for [`crate::ListController`]: the serializable [`ListConfig`] plus the
/// behavior hooks.
///
/// Closures live in `Arc`s, so cloning options is cheap.
pub struct ListOptions<T> {
    pub config: ListConfig,
    pub render_item: RenderItem<T>,
    pub extract_items: ItemsExtractor<T>,
    pub extract_total: TotalExtractor,
    /// Overrides the default `endpoint?page=&limit=` construction.
    pub url_builder: Option<UrlBuilder>,
    pub item_id: ItemId<T>,
    pub is_trackable: Trackable<T>,
    pub translator: Option<Arc<dyn Translate>>,

    /// Items rendered on mount instead of fetching the first page.
    pub initial_items: Vec<T>,
    /// Total reported alongside `initial_items`. Defaults to their count.
    pub initial_total: Option<usize>,

    pub on_item_click: Option<OnItemClick<T>>,
    pub on_loaded: Option<OnLoaded<T>>,
    pub on_error: Option<OnError>,
    pub on_filters_changed: Option<OnFiltersChanged>,
    pub on_items_viewed: Option<OnItemsViewed<T>>,
    pub on_batch_action: Option<OnBatchAction<T>>,
    pub on_open: Option<OnToggle>,
    pub on_close: Option<OnToggle>,
}

impl<T: Clone> Clone for ListOptions<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            render_item: Arc::clone(&self.render_item),
            extract_items: Arc::clone(&self.extract_items),
            extract_total: Arc::clone(&self.extract_total),
            url_builder: self.url_builder.clone(),
            item_id: Arc::clone(&self.item_id),
            is_trackable: Arc::clone(&self.is_trackable),
            translator: self.translator.clone(),
            initial_items: self.initial_items.clone(),
            initial_total: self.initial_total,
            on_item_click: self.on_item_click.clone(),
            on_loaded: self.on_loaded.clone(),
            on_error: self.on_error.clone(),
            on_filters_changed: self.on_filters_changed.clone(),
            on_items_viewed: self.on_items_viewed.clone(),
            on_batch_action: self.on_batch_action.clone(),
            on_open: self.on_open.clone(),
            on_close: self.on_close.clone(),
        }
    }
}

impl<T: DeserializeOwned + 'static> ListOptions<T> {
    /// Options for items that decode straight from the response's item array.
    pub fn new(render_item: impl Fn(&T, usize) -> Node + Send + Sync + 'static) -> Self {
        Self::new_with_extractor(render_item, default_items::<T>)
    }
}

impl<T: 'static> ListOptions<T> {
    /// Options with a custom item extractor, for items that are not plain JSON records.
    pub fn new_with_extractor(
        render_item: impl Fn(&T, usize) -> Node + Send + Sync + 'static,
        extract_items: impl Fn(&Value) -> Result<Vec<T>, FetchError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            config: ListConfig::default(),
            render_item: Arc::new(render_item),
            extract_items: Arc::new(extract_items),
            extract_total: Arc::new(default_total),
            url_builder: None,
            item_id: Arc::new(|_, index| index.to_string()),
            is_trackable: Arc::new(|_| true),
            translator: None,
            initial_items: Vec::new(),
            initial_total: None,
            on_item_click: None,
            on_loaded: None,
            on_error: None,
            on_filters_changed: None,
            on_items_viewed: None,
            on_batch_action: None,
            on_open: None,
            on_close: None,
        }
    }

    pub fn with_config(mut self, config: ListConfig) -> Self {
        self.config = config;
        self
    }

    /// Applies `f` to the config in place.
    pub fn configure(mut self, f: impl FnOnce(&mut ListConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_url_builder(
        mut self,
        url_builder: impl Fn(usize, &Filters) -> String + Send + Sync + 'static,
    ) -> Self {
        self.url_builder = Some(Arc::new(url_builder));
        self
    }

    pub fn with_extract_items(
        mut self,
        f: impl Fn(&Value) -> Result<Vec<T>, FetchError> + Send + Sync + 'static,
    ) -> Self {
        self.extract_items = Arc::new(f);
        self
    }

    pub fn with_extract_total(mut self, f: impl Fn(&Value) -> usize + Send + Sync + 'static) -> Self {
        self.extract_total = Arc::new(f);
        self
    }

    pub fn with_item_id(mut self, f: impl Fn(&T, usize) -> String + Send + Sync + 'static) -> Self {
        self.item_id = Arc::new(f);
        self
    }

    pub fn with_trackable(mut self, f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.is_trackable = Arc::new(f);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translate>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_initial_items(mut self, items: Vec<T>, total: Option<usize>) -> Self {
        self.initial_items = items;
        self.initial_total = total;
        self
    }

    pub fn with_on_item_click(mut self, f: impl Fn(&T, usize) + Send + Sync + 'static) -> Self {
        self.on_item_click = Some(Arc::new(f));
        self
    }

    pub fn with_on_loaded(mut self, f: impl Fn(usize, &[T]) + Send + Sync + 'static) -> Self {
        self.on_loaded = Some(Arc::new(f));
        self
    }

    pub fn with_on_error(mut self, f: impl Fn(&FetchError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn with_on_filters_changed(mut self, f: impl Fn(&Filters) + Send + Sync + 'static) -> Self {
        self.on_filters_changed = Some(Arc::new(f));
        self
    }

    pub fn with_on_items_viewed(
        mut self,
        f: impl Fn(Vec<T>) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    ) -> Self {
        self.on_items_viewed = Some(Arc::new(f));
        self
    }

    pub fn with_on_batch_action(
        mut self,
        f: impl Fn(String, Vec<T>) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    ) -> Self {
        self.on_batch_action = Some(Arc::new(f));
        self
    }

    pub fn with_on_open(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_open = Some(Arc::new(f));
        self
    }

    pub fn with_on_close(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(f));
        self
    }

    /// Resolves a configured label through the translator, if any.
    pub(crate) fn text(&self, text: &str) -> String {
        match &self.translator {
            Some(t) => t.translate(text, &[]),
            None => text.to_owned(),
        }
    }
}

impl<T> core::fmt::Debug for ListOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListOptions")
            .field("config", &self.config)
            .field("url_builder", &self.url_builder.is_some())
            .field("translator", &self.translator.is_some())
            .field("initial_items", &self.initial_items.len())
            .field("initial_total", &self.initial_total)
            .finish_non_exhaustive()
    }
}
