use std::time::{Duration, Instant};

use super::debounce::Debounce;

/// Quiet period before scroll metrics are applied
pub const SCROLL_SETTLE: Duration = Duration::from_millis(50);

/// Rows scrolled before the header condenses
const CONDENSE_OFFSET: usize = 5;

/// Scroll position of a table, in rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    /// Visible rows
    pub client_height: usize,
    /// Total rows
    pub scroll_height: usize,
    /// First visible row
    pub scroll_top: usize,
}

/// Whether the collection header is shown condensed.
///
/// Only content noticeably taller than the viewport condenses it, so
/// short tables never flicker between the two header sizes.
#[derive(Debug, Clone)]
pub struct ScrollState {
    condensed: bool,
    pending: Option<ScrollMetrics>,
    settle: Debounce,
}

impl Default for ScrollState {
    fn default() -> Self {
        ScrollState {
            condensed: false,
            pending: None,
            settle: Debounce::new(SCROLL_SETTLE),
        }
    }
}

impl ScrollState {
    pub fn is_condensed(&self) -> bool {
        self.condensed
    }

    /// Queue new metrics. Metrics whose settle deadline already passed are
    /// applied first.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) {
        self.tick(now);
        self.pending = Some(metrics);
        self.settle.arm(now);
    }

    /// Apply the latest metrics once scrolling has settled.
    /// Returns true when the condensed flag changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.settle.fire(now) {
            return false;
        }
        match self.pending.take() {
            Some(metrics) => self.apply(metrics),
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.settle.cancel();
        self.pending = None;
    }

    pub fn reset(&mut self) {
        self.cancel();
        self.condensed = false;
    }

    fn apply(&mut self, m: ScrollMetrics) -> bool {
        // scroll_height > client_height * 1.25, in integer rows
        if m.scroll_height * 4 <= m.client_height * 5 {
            return false;
        }
        if m.scroll_top > CONDENSE_OFFSET && !self.condensed {
            self.condensed = true;
            true
        } else if m.scroll_top < CONDENSE_OFFSET && self.condensed {
            self.condensed = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn metrics(client: usize, total: usize, top: usize) -> ScrollMetrics {
        ScrollMetrics {
            client_height: client,
            scroll_height: total,
            scroll_top: top,
        }
    }

    #[test]
    fn condenses_after_settle() {
        let t0 = Instant::now();
        let mut s = ScrollState::default();
        s.on_scroll(metrics(20, 100, 10), t0);
        assert!(!s.tick(t0 + 10 * MS));
        assert!(!s.is_condensed());
        assert!(s.tick(t0 + 50 * MS));
        assert!(s.is_condensed());
    }

    #[test]
    fn only_last_metrics_apply() {
        let t0 = Instant::now();
        let mut s = ScrollState::default();
        s.on_scroll(metrics(20, 100, 10), t0);
        s.on_scroll(metrics(20, 100, 0), t0 + 20 * MS);
        assert!(!s.tick(t0 + 60 * MS));
        assert!(!s.is_condensed());
    }

    #[test]
    fn expands_when_back_at_top() {
        let t0 = Instant::now();
        let mut s = ScrollState::default();
        s.on_scroll(metrics(20, 100, 10), t0);
        s.tick(t0 + 50 * MS);
        s.on_scroll(metrics(20, 100, 2), t0 + 100 * MS);
        assert!(s.tick(t0 + 150 * MS));
        assert!(!s.is_condensed());
    }

    #[test]
    fn settled_metrics_apply_before_next_event() {
        let t0 = Instant::now();
        let mut s = ScrollState::default();
        s.on_scroll(metrics(20, 100, 10), t0);
        // No tick between the two events; the first had already settled
        s.on_scroll(metrics(20, 100, 7), t0 + 80 * MS);
        assert!(s.is_condensed());
        assert!(!s.tick(t0 + 130 * MS));
        assert!(s.is_condensed());
    }

    #[test]
    fn short_content_never_condenses() {
        let t0 = Instant::now();
        let mut s = ScrollState::default();
        s.on_scroll(metrics(20, 25, 10), t0);
        s.tick(t0 + 50 * MS);
        assert!(!s.is_condensed());
    }

    #[test]
    fn cancel_discards_pending_metrics() {
        let t0 = Instant::now();
        let mut s = ScrollState::default();
        s.on_scroll(metrics(20, 100, 10), t0);
        s.cancel();
        assert!(!s.tick(t0 + 100 * MS));
        assert!(!s.is_condensed());
    }
}
