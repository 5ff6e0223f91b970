//! Concrete collaborators for the `lazylist` crate.
//!
//! `lazylist` only depends on narrow traits. This crate provides ready-made implementations
//! commonly needed when composing a list:
//!
//! - [`HttpFetcher`]: a `reqwest` backed [`lazylist::PageFetcher`] with bearer-token support
//! - [`Translator`]: per-language catalogs implementing [`lazylist::Translate`]
//! - [`RelativeTimeFormatter`]: "5 minutes ago" labels for item timestamps
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod http;
mod i18n;
mod time;

#[cfg(test)]
mod tests;

pub use http::{HttpFetcher, TokenProvider};
pub use i18n::{CatalogError, Translator};
pub use time::{RelativeTime, RelativeTimeFormatter, TimeBucket, parse_timestamp};
