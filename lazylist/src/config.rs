use serde::{Deserialize, Serialize};

/// The data part of a list's configuration.
///
/// Every field has a default, so a partial JSON document is a valid config:
///
/// ```
/// let config: lazylist::ListConfig =
///     serde_json::from_str(r#"{ "page_size": 25, "search": { "enabled": true } }"#).unwrap();
/// assert_eq!(config.page_size, 25);
/// assert_eq!(config.search.debounce_ms, 300);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: usize,
    /// Base URL for default query-string construction. Ignored when a URL builder is set.
    pub endpoint: Option<String>,
    pub texts: ListTexts,
    pub classes: ListClasses,
    pub search: SearchConfig,
    pub infinite_scroll: InfiniteScrollConfig,
    pub tracking: TrackingConfig,
    /// How far (in px) the content extent may drift after an append before the scroll
    /// position is restored again on the next frame.
    pub scroll_restore_tolerance_px: u64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            endpoint: None,
            texts: ListTexts::default(),
            classes: ListClasses::default(),
            search: SearchConfig::default(),
            infinite_scroll: InfiniteScrollConfig::default(),
            tracking: TrackingConfig::default(),
            scroll_restore_tolerance_px: 5,
        }
    }
}

/// User-facing labels. When a translator is configured these are treated as keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListTexts {
    pub load_more: String,
    pub loading: String,
    /// Used when a failure carries no message of its own.
    pub error: String,
    pub retry: String,
    pub end: String,
    /// Empty-state content. `None` disables the empty footer.
    pub empty: Option<String>,
}

impl Default for ListTexts {
    fn default() -> Self {
        Self {
            load_more: "Load more".to_owned(),
            loading: "Loading...".to_owned(),
            error: "Failed to load items".to_owned(),
            retry: "Retry".to_owned(),
            end: "No more items".to_owned(),
            empty: None,
        }
    }
}

/// Class hooks attached to generated nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListClasses {
    pub item: String,
    pub footer: String,
    pub loading: String,
    pub error: String,
    pub empty: String,
    pub end: String,
    pub trigger: String,
}

impl Default for ListClasses {
    fn default() -> Self {
        Self {
            item: "lazy-list-item".to_owned(),
            footer: "lazy-list-footer".to_owned(),
            loading: "lazy-list-loading".to_owned(),
            error: "lazy-list-error".to_owned(),
            empty: "lazy-list-empty".to_owned(),
            end: "lazy-list-end".to_owned(),
            trigger: "lazy-list-trigger".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Whether a search box is mounted. `handle_search` works either way.
    pub enabled: bool,
    pub placeholder: String,
    pub debounce_ms: u64,
    /// Filter key the trimmed query is stored under.
    pub filter_key: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            placeholder: "Search...".to_owned(),
            debounce_ms: 300,
            filter_key: "search".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfiniteScrollConfig {
    pub enabled: bool,
    /// Remaining distance to the end of the content that triggers a load on scroll.
    pub threshold_px: u64,
    /// Visible ratio of the sentinel that triggers a load.
    pub intersection_threshold: f32,
    /// Pre-emptive margin so loading starts before the sentinel is in view.
    pub root_margin_px: u32,
}

impl Default for InfiniteScrollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_px: 100,
            intersection_threshold: 0.1,
            root_margin_px: 50,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub enabled: bool,
    /// Visible ratio at which an item counts as viewed.
    pub threshold: f32,
    pub root_margin_px: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 0.5,
            root_margin_px: 0,
        }
    }
}
