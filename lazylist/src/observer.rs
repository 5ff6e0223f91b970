use std::collections::HashMap;

use indexmap::IndexMap;

use crate::ElementId;

/// The purpose an element is observed for. Each purpose is an independent registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Watch {
    /// The sentinel near the end of the list.
    LoadMore,
    /// Trackable items, for "became visible" accounting.
    Visibility,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchOptions {
    /// Visible ratio (0..=1) at which the watcher reports.
    pub threshold: f32,
    pub root_margin_px: u32,
}

/// The platform's intersection machinery.
///
/// The host reports crossings back through [`crate::ListController::on_intersection`].
pub trait ObserverHost: Send {
    fn observe(&mut self, target: ElementId, watch: Watch, options: WatchOptions);
    fn unobserve(&mut self, target: ElementId, watch: Watch);
    /// Drops every registration for `watch`.
    fn disconnect(&mut self, watch: Watch);
}

/// One intersection report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    /// Visible ratio of the target, `0.0` when it left the viewport.
    pub ratio: f32,
}

impl IntersectionEntry {
    fn crosses(&self, threshold: f32) -> bool {
        self.ratio > 0.0 && self.ratio >= threshold
    }
}

/// Owns both intersection registrations and the viewed-item set.
///
/// Invariant: at most one sentinel is observed at a time, and an element is never registered
/// twice for the same purpose.
pub(crate) struct ObserverCoordinator<T> {
    host: Box<dyn ObserverHost>,
    load_more: Option<WatchOptions>,
    visibility: Option<WatchOptions>,
    sentinel: Option<ElementId>,
    tracked: HashMap<ElementId, usize>,
    open: bool,
    viewed: IndexMap<String, T>,
}

impl<T: Clone> ObserverCoordinator<T> {
    /// `None` options disable the respective watcher.
    pub(crate) fn new(
        host: Box<dyn ObserverHost>,
        load_more: Option<WatchOptions>,
        visibility: Option<WatchOptions>,
    ) -> Self {
        Self {
            host,
            load_more,
            visibility,
            sentinel: None,
            tracked: HashMap::new(),
            open: false,
            viewed: IndexMap::new(),
        }
    }

    pub(crate) fn sentinel(&self) -> Option<ElementId> {
        self.sentinel
    }

    /// Points the load-more watcher at the sentinel reported by the last render pass.
    pub(crate) fn attach_sentinel(&mut self, sentinel: Option<ElementId>) {
        if self.sentinel == sentinel {
            return;
        }
        if let Some(prev) = self.sentinel.take() {
            self.host.unobserve(prev, Watch::LoadMore);
        }
        let (Some(target), Some(options)) = (sentinel, self.load_more) else {
            return;
        };
        ltrace!(target = target.0, "observing load-more sentinel");
        self.host.observe(target, Watch::LoadMore, options);
        self.sentinel = Some(target);
    }

    /// Registers freshly mounted trackable items. `elements` pairs each element with its item
    /// index.
    pub(crate) fn track(&mut self, elements: impl IntoIterator<Item = (ElementId, usize)>) {
        let Some(options) = self.visibility else {
            return;
        };
        for (element, index) in elements {
            if self.tracked.insert(element, index).is_none() {
                self.host.observe(element, Watch::Visibility, options);
            }
        }
    }

    /// Forgets every registration tied to rendered elements (the surface was cleared).
    pub(crate) fn release_elements(&mut self) {
        self.attach_sentinel(None);
        if !self.tracked.is_empty() {
            self.host.disconnect(Watch::Visibility);
            self.tracked.clear();
        }
    }

    /// Processes intersection reports. Returns `true` when the sentinel crossed its threshold.
    pub(crate) fn handle(
        &mut self,
        entries: &[IntersectionEntry],
        items: &[T],
        item_id: impl Fn(&T, usize) -> String,
    ) -> bool {
        let mut load_more = false;
        for entry in entries {
            if Some(entry.target) == self.sentinel {
                if let Some(options) = self.load_more {
                    load_more |= entry.crosses(options.threshold);
                }
                continue;
            }
            let (Some(options), Some(&index)) = (self.visibility, self.tracked.get(&entry.target))
            else {
                continue;
            };
            if !self.open || !entry.crosses(options.threshold) {
                continue;
            }
            let Some(item) = items.get(index) else {
                continue;
            };
            let id = item_id(item, index);
            if !self.viewed.contains_key(&id) {
                ltrace!(id = %id, index, "item viewed");
                self.viewed.insert(id, item.clone());
            }
        }
        load_more
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    /// Opening starts a fresh viewed set; closing hands back whatever was collected.
    pub(crate) fn set_open(&mut self, open: bool) -> Vec<T> {
        self.open = open;
        self.viewed.drain(..).map(|(_, item)| item).collect()
    }

    pub(crate) fn viewed_ids(&self) -> Vec<String> {
        self.viewed.keys().cloned().collect()
    }

    /// Tears down both watchers.
    pub(crate) fn disconnect(&mut self) {
        self.host.disconnect(Watch::LoadMore);
        self.host.disconnect(Watch::Visibility);
        self.sentinel = None;
        self.tracked.clear();
        self.viewed.clear();
        self.open = false;
    }
}
