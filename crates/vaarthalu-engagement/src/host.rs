//! Page-side host ports.
//!
//! The browser binding implements these over `web-sys`; [`crate::memory`]
//! implements them in memory. Every DOM lookup is allowed to miss: hosts
//! report a missing element by returning `false` or an empty list, never
//! by failing.

#![allow(async_fn_in_trait)]

use std::rc::Rc;

use serde_json::Value;
use vaarthalu_core::PortError;

use crate::{
    ads::{AdSlot, ScriptTag, Viewport},
    notices::MessageKind,
};

/// Snapshot of the document's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// `document.title`.
    pub title: String,

    /// Full location, e.g. `https://site/news/a.html`.
    pub href: String,

    /// Location path, e.g. `/news/a.html`.
    pub pathname: String,

    /// Location host name, e.g. `site`.
    pub hostname: String,
}

/// Overlays rendered hidden by the templates and revealed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    PushPrompt,
    ExitPopup,
}

impl Overlay {
    /// CSS selector of the overlay element.
    pub fn selector(self) -> &'static str {
        match self {
            Overlay::PushPrompt => ".push-notification",
            Overlay::ExitPopup => ".exit-popup",
        }
    }
}

/// DOM access used by the components.
pub trait PageHost {
    fn info(&self) -> PageInfo;

    /// Add the `show` class to an overlay. Returns `false` if it is absent.
    fn reveal(&self, overlay: Overlay) -> bool;

    /// Set the reading progress bar width. Returns `false` if there is no bar.
    fn set_progress(&self, percent: f64) -> bool;

    /// Every ad slot with its current bounding box.
    fn ad_slots(&self) -> Vec<AdSlot>;

    fn viewport(&self) -> Viewport;

    /// Append a script element to the document head.
    fn inject_script(&self, script: &ScriptTag);

    /// Empty the email input of the `form`-th `.newsletter-form`, in
    /// document order.
    fn clear_newsletter_input(&self, form: usize);

    /// Flip the floating share menu between shown and hidden.
    fn toggle_floating_share(&self);

    /// Current text of the share counter, if the page has one.
    fn share_count_text(&self) -> Option<String>;

    fn set_share_count(&self, count: u64);

    /// `window.open`. Returns `false` when the popup was blocked.
    fn open_window(&self, url: &str, name: &str, features: &str) -> bool;
}

/// Where toasts and status messages are drawn.
///
/// Ids are unique per notice; operations on an id that no longer exists
/// are ignored.
pub trait NoticeSurface {
    fn mount_toast(&self, id: u64, text: &str);
    fn set_toast_visible(&self, id: u64, visible: bool);
    fn remove_toast(&self, id: u64);
    fn mount_message(&self, id: u64, text: &str, kind: MessageKind);
    fn remove_message(&self, id: u64);
}

/// Outbound HTTP used by the newsletter form.
pub trait HttpClient {
    /// POST `body` as JSON and return the response status.
    async fn post_json(&self, url: &str, body: &Value) -> Result<u16, PortError>;
}

impl<T: HttpClient> HttpClient for Rc<T> {
    async fn post_json(&self, url: &str, body: &Value) -> Result<u16, PortError> {
        (**self).post_json(url, body).await
    }
}

/// System clipboard.
pub trait Clipboard {
    /// Asynchronous clipboard API.
    async fn write_text(&self, text: &str) -> Result<(), PortError>;

    /// Select-and-copy through a temporary text area.
    fn fallback_copy(&self, text: &str) -> Result<(), PortError>;
}

impl<T: Clipboard> Clipboard for Rc<T> {
    async fn write_text(&self, text: &str) -> Result<(), PortError> {
        (**self).write_text(text).await
    }

    fn fallback_copy(&self, text: &str) -> Result<(), PortError> {
        (**self).fallback_copy(text)
    }
}

/// Answer to a notification permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// The prompt was dismissed without a choice.
    Default,
    Granted,
    Denied,
}

impl Permission {
    /// Parse the browser's permission string.
    pub fn from_browser(value: &str) -> Self {
        match value {
            "granted" => Permission::Granted,
            "denied" => Permission::Denied,
            _ => Permission::Default,
        }
    }
}

/// Notification permission and push subscription.
pub trait NotificationPort {
    /// Whether the browser exposes the Notification API.
    fn supported(&self) -> bool;

    async fn request_permission(&self) -> Permission;

    /// Register a push subscription with the service worker.
    async fn subscribe(&self, application_server_key: Option<&str>) -> Result<(), PortError>;
}

impl<T: NotificationPort> NotificationPort for Rc<T> {
    fn supported(&self) -> bool {
        (**self).supported()
    }

    async fn request_permission(&self) -> Permission {
        (**self).request_permission().await
    }

    async fn subscribe(&self, application_server_key: Option<&str>) -> Result<(), PortError> {
        (**self).subscribe(application_server_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_selectors() {
        assert_eq!(Overlay::PushPrompt.selector(), ".push-notification");
        assert_eq!(Overlay::ExitPopup.selector(), ".exit-popup");
    }

    #[test]
    fn test_permission_from_browser() {
        assert_eq!(Permission::from_browser("granted"), Permission::Granted);
        assert_eq!(Permission::from_browser("denied"), Permission::Denied);
        assert_eq!(Permission::from_browser("default"), Permission::Default);
    }
}
