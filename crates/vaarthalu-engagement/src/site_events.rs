//! Tag-manager events derived from page navigation and clicks.

use vaarthalu_core::AnalyticsEvent;

use crate::{ads::AdTag, host::PageInfo, tracker::EventTracker};

/// A `.share-btn` button's data attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareButton {
    pub platform: String,
    pub title: Option<String>,
    pub url: Option<String>,
}

/// An anchor element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// What a click landed in. Every field is resolved by walking up from the
/// click target, so one click can match several of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Click {
    pub share_button: Option<ShareButton>,
    /// `data-platform` of a `.floating-option`.
    pub floating_option: Option<String>,
    /// Inside `.floating-share-btn`.
    pub floating_toggle: bool,
    pub link: Option<Link>,
    pub ad_slot: Option<AdTag>,
}

pub struct SiteEvents {
    tracker: EventTracker,
    page: PageInfo,
}

impl SiteEvents {
    pub fn new(tracker: EventTracker, page: PageInfo) -> Self {
        Self { tracker, page }
    }

    pub fn page_view(&self) {
        self.tracker.emit(
            AnalyticsEvent::new("page_view")
                .with("page_title", &self.page.title)
                .with("page_location", &self.page.href)
                .with("page_path", &self.page.pathname),
        );
    }

    pub fn share_click(&self, platform: &str) {
        self.tracker.emit(
            AnalyticsEvent::new("share")
                .with("content_type", "article")
                .with("item_id", &self.page.pathname)
                .with("method", platform),
        );
    }

    pub fn newsletter_signup(&self) {
        self.tracker
            .emit(AnalyticsEvent::new("newsletter_signup").with("method", "website_form"));
    }

    /// Emit `outbound_click` if the link leaves this host.
    pub fn link_click(&self, link: &Link) -> bool {
        if link.href.contains(&self.page.hostname) {
            return false;
        }

        self.tracker.emit(
            AnalyticsEvent::new("outbound_click")
                .with("outbound_url", &link.href)
                .with("link_text", &link.text),
        );
        true
    }
}
