use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::FetchError;

/// Pulls the page's items out of a response envelope.
pub type ItemsExtractor<T> = Arc<dyn Fn(&Value) -> Result<Vec<T>, FetchError> + Send + Sync>;

/// Pulls the total item count out of a response envelope.
pub type TotalExtractor = Arc<dyn Fn(&Value) -> usize + Send + Sync>;

/// Field names searched, in order, for the item array.
pub const ITEM_FIELDS: [&str; 4] = ["items", "data", "notifications", "logs"];

/// JSON pointers searched, in order, for the total count.
pub const TOTAL_POINTERS: [&str; 3] = ["/pagination/total", "/total", "/count"];

/// One decoded page.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Default item extraction: the first array under one of [`ITEM_FIELDS`], decoded
/// element-wise into `T`. A missing array is an empty page; an element that does not decode
/// is an error.
pub fn default_items<T: DeserializeOwned>(body: &Value) -> Result<Vec<T>, FetchError> {
    let Some(array) = ITEM_FIELDS
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_array))
    else {
        return Ok(Vec::new());
    };
    array
        .iter()
        .map(|item| T::deserialize(item).map_err(FetchError::from))
        .collect()
}

/// Default total extraction: the first of [`TOTAL_POINTERS`] holding a non-negative integer
/// (or a numeric string), else `0`.
pub fn default_total(body: &Value) -> usize {
    TOTAL_POINTERS
        .iter()
        .filter_map(|ptr| body.pointer(ptr))
        .find_map(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

pub(crate) fn decode<T>(
    body: &Value,
    items: &ItemsExtractor<T>,
    total: &TotalExtractor,
) -> Result<Page<T>, FetchError> {
    Ok(Page {
        items: items(body)?,
        total: total(body),
    })
}
