//! Push notification prompt.
//!
//! ```text
//! NotSupported
//! Eligible --timer--> Prompted --permission--> Granted | Denied
//! ```
//!
//! A profile whose flag is already set starts in `Prompted`: the prompt
//! was consumed in an earlier visit and is never shown again.

use std::{cell::Cell, rc::Rc, time::Duration};

use tracing::{debug, info, warn};
use vaarthalu_core::{FlagStore, Scheduler, config::PushConfig};

use crate::{
    host::{NotificationPort, Overlay, PageHost, Permission},
    notices::{MessageKind, Notices},
    tracker::EventTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushState {
    NotSupported,
    Eligible,
    Prompted,
    Granted,
    Denied,
}

impl PushState {
    pub fn as_str(self) -> &'static str {
        match self {
            PushState::NotSupported => "not_supported",
            PushState::Eligible => "eligible",
            PushState::Prompted => "prompted",
            PushState::Granted => "granted",
            PushState::Denied => "denied",
        }
    }
}

/// Reveals the push prompt once per profile and handles the permission answer.
pub struct PushPrompter<N> {
    notifications: N,
    flags: Rc<dyn FlagStore>,
    page: Rc<dyn PageHost>,
    notices: Rc<Notices>,
    tracker: EventTracker,
    config: PushConfig,
    enabled_message: String,
    state: Cell<PushState>,
}

impl<N: NotificationPort + 'static> PushPrompter<N> {
    pub fn new(
        notifications: N,
        flags: Rc<dyn FlagStore>,
        page: Rc<dyn PageHost>,
        notices: Rc<Notices>,
        tracker: EventTracker,
        config: PushConfig,
        enabled_message: impl Into<String>,
    ) -> Self {
        let state = if !notifications.supported() {
            PushState::NotSupported
        } else if flags.is_set(&config.flag_key) {
            PushState::Prompted
        } else {
            PushState::Eligible
        };

        Self {
            notifications,
            flags,
            page,
            notices,
            tracker,
            config,
            enabled_message: enabled_message.into(),
            state: Cell::new(state),
        }
    }

    pub fn state(&self) -> PushState {
        self.state.get()
    }

    /// Schedule the prompt if this profile has never seen it.
    ///
    /// Returns the delay that was scheduled.
    pub fn arm(self: &Rc<Self>, scheduler: &dyn Scheduler) -> Option<Duration> {
        if self.state.get() != PushState::Eligible {
            debug!(state = ?self.state.get(), "push prompt not armed");
            return None;
        }

        let delay = self.config.prompt_delay();
        let this = Rc::clone(self);
        scheduler.set_timeout(delay, Box::new(move || {
            this.show_prompt();
        }));
        Some(delay)
    }

    /// Reveal the prompt and remember that it was shown.
    ///
    /// The flag is only written when the prompt element exists.
    pub fn show_prompt(&self) -> bool {
        if self.state.get() != PushState::Eligible {
            return false;
        }

        if !self.page.reveal(Overlay::PushPrompt) {
            debug!("push prompt element missing");
            return false;
        }

        self.flags.set(&self.config.flag_key);
        self.state.set(PushState::Prompted);
        true
    }

    /// Ask for notification permission (user initiated).
    pub async fn request_permission(&self) -> PushState {
        match self.state.get() {
            PushState::Eligible | PushState::Prompted => {}
            other => return other,
        }

        match self.notifications.request_permission().await {
            Permission::Granted => {
                self.state.set(PushState::Granted);
                self.tracker.track("push_notification_enabled");
                self.notices
                    .show_message(&self.enabled_message, MessageKind::Success);

                let key = self.config.vapid_public_key.as_deref();
                if key.is_none() {
                    info!("no VAPID key configured; push subscription skipped");
                } else if let Err(err) = self.notifications.subscribe(key).await {
                    warn!(error = %err, "push subscription failed");
                }
            }
            answer => {
                debug!(?answer, "notification permission not granted");
                self.state.set(PushState::Denied);
            }
        }

        self.state.get()
    }
}

#[cfg(test)]
mod tests {
    use vaarthalu_core::{MemoryFlags, MemorySink, VirtualClock, config::NoticesConfig};

    use super::*;
    use crate::{host::PageInfo, memory::{MemoryNotifications, MemoryPage}};

    struct Fixture {
        page: Rc<MemoryPage>,
        flags: Rc<MemoryFlags>,
        clock: Rc<VirtualClock>,
        sink: Rc<MemorySink>,
        notifications: Rc<MemoryNotifications>,
    }

    impl Fixture {
        fn new(notifications: MemoryNotifications) -> Self {
            Self {
                page: Rc::new(MemoryPage::new(PageInfo::default()).with_overlay(Overlay::PushPrompt)),
                flags: Rc::new(MemoryFlags::new()),
                clock: Rc::new(VirtualClock::new()),
                sink: Rc::new(MemorySink::new()),
                notifications: Rc::new(notifications),
            }
        }

        fn prompter(&self, config: PushConfig) -> Rc<PushPrompter<Rc<MemoryNotifications>>> {
            let notices = Rc::new(Notices::new(
                self.page.clone(),
                self.clock.clone(),
                NoticesConfig::default(),
            ));
            Rc::new(PushPrompter::new(
                self.notifications.clone(),
                self.flags.clone(),
                self.page.clone(),
                notices,
                EventTracker::new(self.sink.clone()),
                config,
                "enabled",
            ))
        }
    }

    #[test]
    fn test_unsupported_browser_never_prompts() {
        let f = Fixture::new(MemoryNotifications::unsupported());
        let prompter = f.prompter(PushConfig::default());

        assert_eq!(prompter.state(), PushState::NotSupported);
        assert_eq!(prompter.arm(f.clock.as_ref()), None);
        f.clock.advance(Duration::from_secs(60));
        assert!(!f.page.is_revealed(Overlay::PushPrompt));
    }

    #[test]
    fn test_prompt_appears_after_delay_and_sets_flag() {
        let f = Fixture::new(MemoryNotifications::answering(Permission::Granted));
        let prompter = f.prompter(PushConfig::default());

        assert_eq!(prompter.arm(f.clock.as_ref()), Some(Duration::from_secs(10)));
        f.clock.advance(Duration::from_millis(9_999));
        assert!(!f.page.is_revealed(Overlay::PushPrompt));

        f.clock.advance(Duration::from_millis(1));
        assert!(f.page.is_revealed(Overlay::PushPrompt));
        assert!(f.flags.is_set("pushPrompted"));
        assert_eq!(prompter.state(), PushState::Prompted);
    }

    #[test]
    fn test_flag_suppresses_prompt_on_next_visit() {
        let f = Fixture::new(MemoryNotifications::answering(Permission::Granted));
        f.flags.set("pushPrompted");

        let prompter = f.prompter(PushConfig::default());
        assert_eq!(prompter.state(), PushState::Prompted);
        assert_eq!(prompter.arm(f.clock.as_ref()), None);

        f.clock.advance(Duration::from_secs(60));
        assert!(!f.page.is_revealed(Overlay::PushPrompt));
    }

    #[test]
    fn test_missing_prompt_element_leaves_flag_unset() {
        let f = Fixture::new(MemoryNotifications::answering(Permission::Granted));
        let page = Rc::new(MemoryPage::new(PageInfo::default()));
        let notices = Rc::new(Notices::new(page.clone(), f.clock.clone(), NoticesConfig::default()));
        let prompter = PushPrompter::new(
            f.notifications.clone(),
            f.flags.clone(),
            page,
            notices,
            EventTracker::new(f.sink.clone()),
            PushConfig::default(),
            "enabled",
        );

        assert!(!prompter.show_prompt());
        assert!(!f.flags.is_set("pushPrompted"));
        assert_eq!(prompter.state(), PushState::Eligible);
    }

    #[tokio::test]
    async fn test_granted_permission_subscribes() {
        let f = Fixture::new(MemoryNotifications::answering(Permission::Granted));
        let config = PushConfig {
            vapid_public_key: Some("BKey".to_string()),
            ..PushConfig::default()
        };
        let prompter = f.prompter(config);
        prompter.show_prompt();

        let state = prompter.request_permission().await;

        assert_eq!(state, PushState::Granted);
        assert_eq!(f.sink.count("push_notification_enabled"), 1);
        assert_eq!(f.notifications.subscriptions(), vec![Some("BKey".to_string())]);
        assert_eq!(f.page.messages()[0].1, "enabled");
    }

    #[tokio::test]
    async fn test_granted_without_key_skips_subscription() {
        let f = Fixture::new(MemoryNotifications::answering(Permission::Granted));
        let prompter = f.prompter(PushConfig::default());

        assert_eq!(prompter.request_permission().await, PushState::Granted);
        assert!(f.notifications.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn test_denied_permission_is_terminal() {
        let f = Fixture::new(MemoryNotifications::answering(Permission::Denied));
        let prompter = f.prompter(PushConfig::default());
        prompter.show_prompt();

        assert_eq!(prompter.request_permission().await, PushState::Denied);
        assert_eq!(prompter.request_permission().await, PushState::Denied);
        assert_eq!(f.notifications.requests(), 1);
        assert_eq!(f.sink.count("push_notification_enabled"), 0);
    }
}
