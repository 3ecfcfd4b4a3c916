/// Distance from the bottom of the content (in scroll units) that counts as "near bottom".
pub const NEAR_BOTTOM_THRESHOLD: u32 = 200;

/// Scroll units per terminal row.
pub const UNITS_PER_ROW: u32 = 20;

/// Snapshot of a scrollable viewport, in scroll units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPosition {
    pub viewport: u32,
    pub offset: u32,
    pub content: u32,
}

impl ScrollPosition {
    /// Build a position from terminal rows.
    pub fn from_rows(viewport_rows: u32, offset_rows: u32, content_rows: u32) -> Self {
        Self {
            viewport: viewport_rows.saturating_mul(UNITS_PER_ROW),
            offset: offset_rows.saturating_mul(UNITS_PER_ROW),
            content: content_rows.saturating_mul(UNITS_PER_ROW),
        }
    }

    pub fn near_bottom(&self, threshold: u32) -> bool {
        self.viewport.saturating_add(self.offset) >= self.content.saturating_sub(threshold)
    }
}

/// Page cursor for the paginated source. Starts at 0 and only moves forward
/// until reset.
#[derive(Debug, Clone)]
pub struct Pager {
    page: u32,
    threshold: u32,
}

impl Pager {
    pub fn new(threshold: u32) -> Self {
        Self { page: 0, threshold }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Advance by one when `pos` is near the bottom and no cycle is in flight.
    /// Returns whether the cursor moved.
    pub fn on_scroll(&mut self, pos: ScrollPosition, loading: bool) -> bool {
        if loading || !pos.near_bottom(self.threshold) {
            return false;
        }
        self.page = self.page.saturating_add(1);
        true
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(NEAR_BOTTOM_THRESHOLD)
    }
}
