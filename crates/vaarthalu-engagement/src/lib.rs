//! Vaarthalu Engagement Library
//!
//! Reader engagement features for the news site, written against host
//! ports so they run the same in the browser and in tests.
//!
//! # Features
//!
//! - **Analytics**: page views, shares, outbound links, scroll depth, time on page and video events
//! - **Newsletter**: email validation and subscription
//! - **Push prompt**: delayed, once-per-profile notification prompt
//! - **Exit intent**: popup when the pointer leaves through the top edge
//! - **Reading progress**: progress bar and milestone events
//! - **Ads**: script injection, visibility refresh and click tracking
//! - **Social sharing**: share popups, clipboard copy and toasts
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//!
//! use vaarthalu_core::{Config, MemoryFlags, MemorySink, VirtualClock};
//! use vaarthalu_engagement::{
//!     Engagement, Ports,
//!     host::{PageInfo, Permission},
//!     memory::{MemoryClipboard, MemoryHttp, MemoryNotifications, MemoryPage},
//! };
//!
//! let page = Rc::new(MemoryPage::new(PageInfo::default()));
//! let clock = Rc::new(VirtualClock::new());
//! let engagement = Engagement::start(
//!     &Config::default(),
//!     Ports {
//!         page: page.clone(),
//!         surface: page,
//!         sink: Rc::new(MemorySink::new()),
//!         gtag: None,
//!         flags: Rc::new(MemoryFlags::new()),
//!         clock: clock.clone(),
//!         scheduler: clock,
//!         http: MemoryHttp::responding(200),
//!         clipboard: MemoryClipboard::available(),
//!         notifications: MemoryNotifications::answering(Permission::Granted),
//!     },
//! );
//! engagement.on_pointer_out(10.0, true);
//! ```

pub mod ads;
pub mod behavior;
pub mod exit_intent;
pub mod host;
pub mod memory;
pub mod newsletter;
pub mod notices;
pub mod progress;
pub mod push;
pub mod runtime;
pub mod share;
pub mod site_events;
pub mod tracker;

pub use ads::{AdManager, AdSlot, AdTag, Rect, ScriptTag, Viewport};
pub use behavior::{BehaviorTracker, VideoEvent, VideoInfo};
pub use exit_intent::ExitIntent;
pub use newsletter::{NewsletterSubscriber, SubmitOutcome, validate_email};
pub use notices::{MessageKind, Notices};
pub use progress::{ReadingProgress, ScrollMetrics};
pub use push::{PushPrompter, PushState};
pub use runtime::{Engagement, Ports};
pub use share::{Platform, ShareDispatcher, ShareOutcome, ShareTarget, UnknownPlatform};
pub use site_events::{Click, Link, ShareButton, SiteEvents};
pub use tracker::EventTracker;
