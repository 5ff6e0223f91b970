/// Where the controller sits in its load cycle, derived from a [`LoadState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched yet (or just reset).
    Idle,
    Loading,
    /// At least one page loaded and more are available.
    Ready,
    /// Every item the source reported has been loaded.
    Exhausted,
    /// The last attempt failed. Stable until a retry or reset.
    Failed,
}

/// A snapshot of pagination progress.
///
/// The controller never mutates this in place: every transition builds a new value, so a
/// snapshot handed out by [`crate::ListController::state`] is always internally consistent.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    /// The last successfully loaded page (1-based, `0` before the first load).
    pub page: usize,
    /// Total item count reported by the source on the last successful fetch.
    pub total: usize,
}

impl Default for LoadState {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            has_more: true,
            page: 0,
            total: 0,
        }
    }
}

impl LoadState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.page == 0 {
            Phase::Idle
        } else if self.has_more {
            Phase::Ready
        } else {
            Phase::Exhausted
        }
    }

    /// A new attempt: loading, with any previous error cleared.
    pub(crate) fn begin(&self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self.clone()
        }
    }

    /// The state right after a filter change: loading the first page from scratch.
    pub(crate) fn restart() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub(crate) fn loaded(page: usize, total: usize, item_count: usize) -> Self {
        Self {
            loading: false,
            error: None,
            has_more: item_count < total,
            page,
            total,
        }
    }

    pub(crate) fn failed(&self, message: String) -> Self {
        Self {
            loading: false,
            error: Some(message),
            ..self.clone()
        }
    }
}
