use crate::RenderSurface;

/// A scroll position captured before an append, used to keep the viewport still while
/// content grows below it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollAnchor {
    pub top: u64,
    /// Content extent at capture time.
    pub height: u64,
}

pub fn capture_anchor(surface: &dyn RenderSurface) -> ScrollAnchor {
    let m = surface.scroll_metrics();
    ScrollAnchor {
        top: m.top,
        height: m.height,
    }
}

/// Restores the anchor immediately and returns the follow-up check for the next frame.
pub(crate) fn apply_anchor(surface: &mut dyn RenderSurface, anchor: ScrollAnchor) -> PendingRestore {
    surface.set_scroll_top(anchor.top);
    PendingRestore {
        anchor,
        expected_height: surface.scroll_metrics().height,
    }
}

/// A restoration that still has to survive one frame of late layout (images, fonts).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingRestore {
    anchor: ScrollAnchor,
    expected_height: u64,
}

impl PendingRestore {
    /// Re-applies the anchor when the content extent moved by more than `tolerance_px` since
    /// the append. Returns `true` when the scroll offset was written.
    pub(crate) fn settle(self, surface: &mut dyn RenderSurface, tolerance_px: u64) -> bool {
        let height = surface.scroll_metrics().height;
        if height.abs_diff(self.expected_height) <= tolerance_px {
            return false;
        }
        ldebug!(
            expected = self.expected_height,
            actual = height,
            top = self.anchor.top,
            "layout shifted after append; restoring scroll offset"
        );
        surface.set_scroll_top(self.anchor.top);
        true
    }
}
