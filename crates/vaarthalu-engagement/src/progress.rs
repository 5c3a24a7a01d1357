//! Reading progress bar and milestone events.

use std::{cell::Cell, rc::Rc};

use vaarthalu_core::config::ProgressConfig;

use crate::{host::PageHost, tracker::EventTracker};

/// Scroll geometry sampled on a scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Vertical scroll offset.
    pub scroll_top: f64,

    /// Full scrollable height of the document.
    pub document_height: f64,

    /// Height of the viewport.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            document_height,
            viewport_height,
        }
    }

    /// Scrolled share of the document in `0..=100`.
    ///
    /// `None` when the document fits in the viewport.
    pub fn percent(&self) -> Option<f64> {
        let range = self.document_height - self.viewport_height;
        if !range.is_finite() || range <= 0.0 {
            return None;
        }
        Some((self.scroll_top / range * 100.0).clamp(0.0, 100.0))
    }
}

/// Drives the progress bar and emits `article_<n>_percent_read`.
pub struct ReadingProgress {
    page: Rc<dyn PageHost>,
    tracker: EventTracker,
    milestones: Vec<u8>,
    repeat: bool,
    fired: Cell<usize>,
}

impl ReadingProgress {
    pub fn new(page: Rc<dyn PageHost>, tracker: EventTracker, config: &ProgressConfig) -> Self {
        Self {
            page,
            tracker,
            milestones: config.milestones.clone(),
            repeat: config.repeat_milestones,
            fired: Cell::new(0),
        }
    }

    /// Event name for a milestone.
    pub fn milestone_event(milestone: u8) -> String {
        format!("article_{milestone}_percent_read")
    }

    /// Update the bar and emit any milestones the reader has passed.
    ///
    /// Milestones fire once per page view unless `repeat_milestones` is set.
    /// Pages without a progress bar emit nothing.
    pub fn on_scroll(&self, metrics: ScrollMetrics) -> Option<f64> {
        let progress = metrics.percent()?;
        if !self.page.set_progress(progress) {
            return None;
        }

        let passed = self
            .milestones
            .iter()
            .take_while(|&&m| progress > f64::from(m))
            .count();

        let start = if self.repeat { 0 } else { self.fired.get() };
        for &milestone in self.milestones.iter().take(passed).skip(start) {
            self.tracker.track(&Self::milestone_event(milestone));
        }

        if passed > self.fired.get() {
            self.fired.set(passed);
        }

        Some(progress)
    }
}
