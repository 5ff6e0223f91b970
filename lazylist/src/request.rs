use std::collections::BTreeMap;
use std::sync::Arc;

use url::form_urlencoded;

/// Builds the URL for a page from the current filters.
pub type UrlBuilder = Arc<dyn Fn(usize, &Filters) -> String + Send + Sync>;

/// Named filter values applied to every request.
///
/// Keys are kept ordered so generated query strings are stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One page request as handed to a [`crate::PageFetcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub limit: usize,
    pub filters: Filters,
    /// The resolved URL, when the list was configured with an endpoint or a URL builder.
    pub url: Option<String>,
}

impl PageRequest {
    pub(crate) fn build(
        page: usize,
        limit: usize,
        filters: &Filters,
        endpoint: Option<&str>,
        url_builder: Option<&UrlBuilder>,
    ) -> Self {
        let url = match (url_builder, endpoint) {
            (Some(build), _) => Some(build(page, filters)),
            (None, Some(base)) => Some(default_url(base, page, limit, filters)),
            (None, None) => None,
        };
        Self {
            page,
            limit,
            filters: filters.clone(),
            url,
        }
    }
}

/// `base?page=N&limit=M&<filters>`; empty filter values are left out.
///
/// Works for relative bases too (`/api/logs`), which is why the query is appended textually
/// instead of going through `Url::parse`.
pub fn default_url(base: &str, page: usize, limit: usize, filters: &Filters) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("page", &page.to_string());
    query.append_pair("limit", &limit.to_string());
    for (key, value) in filters.iter().filter(|(_, v)| !v.is_empty()) {
        query.append_pair(key, value);
    }
    let query = query.finish();

    let sep = if !base.contains('?') {
        "?"
    } else if base.ends_with('?') || base.ends_with('&') {
        ""
    } else {
        "&"
    };
    format!("{base}{sep}{query}")
}
