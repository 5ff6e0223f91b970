//! A headless controller for paginated, incrementally loaded lists.
//!
//! For concrete collaborators (an HTTP fetcher, a translation catalog, relative-time labels),
//! see the `lazylist-adapter` crate.
//!
//! The controller owns the parts with real coordination in them: fetch sequencing and
//! page/total bookkeeping, filter and search driven resets, footer state, scroll-position
//! preservation across appends, and accounting of which items became visible while a hosting
//! surface (a dropdown, a panel) was open.
//!
//! It is UI-agnostic. A UI layer is expected to provide:
//! - a [`RenderSurface`] that mounts item and footer nodes and reports scroll geometry
//! - an [`ObserverHost`] that watches elements and reports intersections back
//! - a [`PageFetcher`] that turns a [`PageRequest`] into a JSON envelope
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod config;
mod controller;
mod envelope;
mod fetch;
mod footer;
mod node;
mod observer;
mod options;
mod request;
mod scroll;
mod state;
mod surface;
mod translate;


pub use config::{
    InfiniteScrollConfig, ListClasses, ListConfig, ListTexts, SearchConfig, TrackingConfig,
};
pub use controller::{ListController, LoadOutcome};
pub use envelope::{
    ITEM_FIELDS, ItemsExtractor, Page, TOTAL_POINTERS, TotalExtractor, default_items,
    default_total,
};
pub use fetch::{FetchError, PageFetcher};
pub use footer::{Footer, FooterInputs};
pub use node::{Element, Node};
pub use observer::{IntersectionEntry, ObserverHost, Watch, WatchOptions};
pub use options::{
    ItemId, ListOptions, OnBatchAction, OnError, OnFiltersChanged, OnItemClick, OnItemsViewed,
    OnLoaded, OnToggle, RenderItem, Trackable,
};
pub use request::{Filters, PageRequest, UrlBuilder, default_url};
pub use scroll::{ScrollAnchor, capture_anchor};
pub use state::{LoadState, Phase};
pub use surface::{ElementId, RenderSurface, RenderedItem, ScrollMetrics};
pub use translate::Translate;
