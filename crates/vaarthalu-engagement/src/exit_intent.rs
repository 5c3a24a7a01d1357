//! Exit-intent popup.

use std::{cell::Cell, rc::Rc};

use tracing::debug;
use vaarthalu_core::{FlagStore, config::ExitIntentConfig};

use crate::{
    host::{Overlay, PageHost},
    tracker::EventTracker,
};

/// Shows the exit popup the first time the pointer leaves through the top edge.
pub struct ExitIntent {
    flags: Rc<dyn FlagStore>,
    page: Rc<dyn PageHost>,
    tracker: EventTracker,
    config: ExitIntentConfig,
    pointer_y: Cell<f64>,
}

impl ExitIntent {
    pub fn new(
        flags: Rc<dyn FlagStore>,
        page: Rc<dyn PageHost>,
        tracker: EventTracker,
        config: ExitIntentConfig,
    ) -> Self {
        Self {
            flags,
            page,
            tracker,
            config,
            pointer_y: Cell::new(0.0),
        }
    }

    /// Last observed pointer height.
    pub fn pointer_y(&self) -> f64 {
        self.pointer_y.get()
    }

    pub fn on_pointer_move(&self, client_y: f64) {
        self.pointer_y.set(client_y);
    }

    /// Pointer left an element. `leaving_window` is true when the event has
    /// no related target.
    pub fn on_pointer_out(&self, client_y: f64, leaving_window: bool) -> bool {
        if !leaving_window || client_y >= self.config.threshold_px {
            return false;
        }
        self.show_popup()
    }

    fn show_popup(&self) -> bool {
        if self.flags.is_set(&self.config.flag_key) {
            return false;
        }

        if !self.page.reveal(Overlay::ExitPopup) {
            debug!("exit popup element missing");
            return false;
        }

        self.flags.set(&self.config.flag_key);
        self.tracker.track("exit_intent_popup_shown");
        true
    }
}

#[cfg(test)]
mod tests {
    use vaarthalu_core::{MemoryFlags, MemorySink};

    use super::*;
    use crate::{host::PageInfo, memory::MemoryPage};

    fn detector(page: Rc<MemoryPage>, flags: Rc<MemoryFlags>, sink: Rc<MemorySink>) -> ExitIntent {
        ExitIntent::new(flags, page, EventTracker::new(sink), ExitIntentConfig::default())
    }

    #[test]
    fn test_leaving_through_top_shows_popup_once() {
        let page = Rc::new(MemoryPage::new(PageInfo::default()).with_overlay(Overlay::ExitPopup));
        let flags = Rc::new(MemoryFlags::new());
        let sink = Rc::new(MemorySink::new());
        let exit = detector(page.clone(), flags.clone(), sink.clone());

        assert!(exit.on_pointer_out(10.0, true));
        assert!(page.is_revealed(Overlay::ExitPopup));
        assert!(flags.is_set("exitPopupShown"));
        assert_eq!(sink.count("exit_intent_popup_shown"), 1);

        assert!(!exit.on_pointer_out(5.0, true));
        assert_eq!(sink.count("exit_intent_popup_shown"), 1);
    }

    #[test]
    fn test_ignores_moves_inside_window_or_below_threshold() {
        let page = Rc::new(MemoryPage::new(PageInfo::default()).with_overlay(Overlay::ExitPopup));
        let flags = Rc::new(MemoryFlags::new());
        let exit = detector(page.clone(), flags.clone(), Rc::new(MemorySink::new()));

        assert!(!exit.on_pointer_out(10.0, false));
        assert!(!exit.on_pointer_out(50.0, true));
        assert!(!exit.on_pointer_out(400.0, true));
        assert!(!page.is_revealed(Overlay::ExitPopup));
        assert!(!flags.is_set("exitPopupShown"));
    }

    #[test]
    fn test_flag_from_earlier_visit_suppresses_popup() {
        let page = Rc::new(MemoryPage::new(PageInfo::default()).with_overlay(Overlay::ExitPopup));
        let flags = Rc::new(MemoryFlags::new());
        flags.set("exitPopupShown");
        let exit = detector(page.clone(), flags, Rc::new(MemorySink::new()));

        assert!(!exit.on_pointer_out(0.0, true));
        assert!(!page.is_revealed(Overlay::ExitPopup));
    }

    #[test]
    fn test_pointer_moves_are_tracked() {
        let page = Rc::new(MemoryPage::new(PageInfo::default()));
        let exit = detector(page, Rc::new(MemoryFlags::new()), Rc::new(MemorySink::new()));

        exit.on_pointer_move(120.0);
        exit.on_pointer_move(30.0);
        assert_eq!(exit.pointer_y(), 30.0);
    }
}
