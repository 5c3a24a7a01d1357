//! Toasts and status messages.
//!
//! Toasts are single-instance: showing one removes the previous toast.
//! Status messages stack and each expires on its own timer.

use std::{cell::Cell, rc::Rc};

use vaarthalu_core::{Scheduler, config::NoticesConfig};

use crate::host::NoticeSurface;

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

impl MessageKind {
    /// Class list applied to the message element.
    pub fn class_name(self) -> &'static str {
        match self {
            MessageKind::Success => "message message-success",
            MessageKind::Error => "message message-error",
            MessageKind::Info => "message message-info",
        }
    }

    /// Background colour of the message element.
    pub fn background(self) -> &'static str {
        match self {
            MessageKind::Success => "#28a745",
            MessageKind::Error => "#dc3545",
            MessageKind::Info => "#17a2b8",
        }
    }
}

/// Schedules notices onto a [`NoticeSurface`].
pub struct Notices {
    surface: Rc<dyn NoticeSurface>,
    scheduler: Rc<dyn Scheduler>,
    timing: NoticesConfig,
    next_id: Cell<u64>,
    current_toast: Rc<Cell<Option<u64>>>,
}

impl Notices {
    pub fn new(
        surface: Rc<dyn NoticeSurface>,
        scheduler: Rc<dyn Scheduler>,
        timing: NoticesConfig,
    ) -> Self {
        Self {
            surface,
            scheduler,
            timing,
            next_id: Cell::new(1),
            current_toast: Rc::new(Cell::new(None)),
        }
    }

    /// Id of the toast currently on screen.
    pub fn current_toast(&self) -> Option<u64> {
        self.current_toast.get()
    }

    /// Show a toast, replacing any toast already displayed.
    pub fn show_toast(&self, text: &str) -> u64 {
        if let Some(previous) = self.current_toast.take() {
            self.surface.remove_toast(previous);
        }

        let id = self.allocate_id();
        self.surface.mount_toast(id, text);
        self.current_toast.set(Some(id));

        let surface = Rc::clone(&self.surface);
        self.scheduler.set_timeout(
            self.timing.toast_show_delay(),
            Box::new(move || surface.set_toast_visible(id, true)),
        );

        let surface = Rc::clone(&self.surface);
        let scheduler = Rc::clone(&self.scheduler);
        let current = Rc::clone(&self.current_toast);
        let fade = self.timing.toast_fade();
        self.scheduler.set_timeout(
            self.timing.toast_visible(),
            Box::new(move || {
                surface.set_toast_visible(id, false);
                scheduler.set_timeout(
                    fade,
                    Box::new(move || {
                        surface.remove_toast(id);
                        if current.get() == Some(id) {
                            current.set(None);
                        }
                    }),
                );
            }),
        );

        id
    }

    /// Show a status message that removes itself after a fixed time.
    pub fn show_message(&self, text: &str, kind: MessageKind) -> u64 {
        let id = self.allocate_id();
        self.surface.mount_message(id, text, kind);

        let surface = Rc::clone(&self.surface);
        self.scheduler.set_timeout(
            self.timing.message_visible(),
            Box::new(move || surface.remove_message(id)),
        );

        id
    }

    fn allocate_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use vaarthalu_core::VirtualClock;

    use super::*;
    use crate::{host::PageInfo, memory::MemoryPage};

    fn setup() -> (Rc<MemoryPage>, Rc<VirtualClock>, Notices) {
        let page = Rc::new(MemoryPage::new(PageInfo::default()));
        let clock = Rc::new(VirtualClock::new());
        let notices = Notices::new(page.clone(), clock.clone(), NoticesConfig::default());
        (page, clock, notices)
    }

    #[test]
    fn test_toast_lifecycle() {
        let (page, clock, notices) = setup();

        let id = notices.show_toast("copied");
        assert_eq!(page.toast(id).map(|t| t.visible), Some(false));

        clock.advance(Duration::from_millis(100));
        assert_eq!(page.toast(id).map(|t| t.visible), Some(true));

        clock.advance(Duration::from_millis(2_900));
        assert_eq!(page.toast(id).map(|t| t.visible), Some(false));

        clock.advance(Duration::from_millis(299));
        assert!(page.toast(id).is_some());

        clock.advance(Duration::from_millis(1));
        assert!(page.toast(id).is_none());
        assert_eq!(notices.current_toast(), None);
    }

    #[test]
    fn test_new_toast_replaces_current() {
        let (page, clock, notices) = setup();

        let first = notices.show_toast("one");
        clock.advance(Duration::from_millis(1_000));
        let second = notices.show_toast("two");

        assert!(page.toast(first).is_none());
        assert_eq!(page.toast_count(), 1);
        assert_eq!(notices.current_toast(), Some(second));

        // The first toast's timers fire against a removed id.
        clock.advance(Duration::from_millis(2_400));
        assert_eq!(page.toast_count(), 1);
        assert_eq!(notices.current_toast(), Some(second));
    }

    #[test]
    fn test_messages_stack_and_expire() {
        let (page, clock, notices) = setup();

        notices.show_message("saved", MessageKind::Success);
        clock.advance(Duration::from_millis(1_000));
        notices.show_message("failed", MessageKind::Error);
        assert_eq!(page.messages().len(), 2);

        clock.advance(Duration::from_millis(4_000));
        let remaining = page.messages();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].1, "failed");

        clock.advance(Duration::from_millis(1_000));
        assert!(page.messages().is_empty());
    }

    #[test]
    fn test_message_kind_styles() {
        assert_eq!(MessageKind::Success.class_name(), "message message-success");
        assert_eq!(MessageKind::Error.background(), "#dc3545");
        assert_eq!(MessageKind::Info.background(), "#17a2b8");
    }
}
