//! In-memory hosts.
//!
//! Used by the tests to exercise components without a browser. Each host
//! records what was asked of it.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashSet},
};

use serde_json::Value;
use vaarthalu_core::PortError;

use crate::{
    ads::{AdSlot, ScriptTag, Viewport},
    host::{
        Clipboard, HttpClient, NoticeSurface, NotificationPort, Overlay, PageHost, PageInfo,
        Permission,
    },
    notices::MessageKind,
};

/// A mounted toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastRecord {
    pub text: String,
    pub visible: bool,
}

/// A `window.open` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedWindow {
    pub url: String,
    pub name: String,
    pub features: String,
}

/// Document stand-in.
#[derive(Debug)]
pub struct MemoryPage {
    info: PageInfo,
    overlays: HashSet<Overlay>,
    has_progress_bar: bool,
    viewport: Viewport,
    ad_slots: Vec<AdSlot>,
    popups_blocked: Cell<bool>,

    revealed: RefCell<HashSet<Overlay>>,
    progress: RefCell<Vec<f64>>,
    scripts: RefCell<Vec<ScriptTag>>,
    inputs_cleared: RefCell<Vec<usize>>,
    floating_share_open: Cell<bool>,
    share_count: RefCell<Option<String>>,
    windows: RefCell<Vec<OpenedWindow>>,
    toasts: RefCell<BTreeMap<u64, ToastRecord>>,
    messages: RefCell<BTreeMap<u64, (String, MessageKind)>>,
}

impl MemoryPage {
    /// A page with no overlays, no progress bar, no ads and a 1280x720 viewport.
    pub fn new(info: PageInfo) -> Self {
        Self {
            info,
            overlays: HashSet::new(),
            has_progress_bar: false,
            viewport: Viewport::new(1_280.0, 720.0),
            ad_slots: Vec::new(),
            popups_blocked: Cell::new(false),
            revealed: RefCell::default(),
            progress: RefCell::default(),
            scripts: RefCell::default(),
            inputs_cleared: RefCell::default(),
            floating_share_open: Cell::new(false),
            share_count: RefCell::new(None),
            windows: RefCell::default(),
            toasts: RefCell::default(),
            messages: RefCell::default(),
        }
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlays.insert(overlay);
        self
    }

    pub fn with_progress_bar(mut self) -> Self {
        self.has_progress_bar = true;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_ad_slot(mut self, slot: AdSlot) -> Self {
        self.ad_slots.push(slot);
        self
    }

    pub fn with_share_count(self, text: &str) -> Self {
        *self.share_count.borrow_mut() = Some(text.to_string());
        self
    }

    /// Make every later `window.open` fail.
    pub fn block_popups(&self) {
        self.popups_blocked.set(true);
    }

    pub fn is_revealed(&self, overlay: Overlay) -> bool {
        self.revealed.borrow().contains(&overlay)
    }

    pub fn progress_updates(&self) -> Vec<f64> {
        self.progress.borrow().clone()
    }

    pub fn scripts(&self) -> Vec<ScriptTag> {
        self.scripts.borrow().clone()
    }

    /// Forms whose input was cleared, in order.
    pub fn inputs_cleared(&self) -> Vec<usize> {
        self.inputs_cleared.borrow().clone()
    }

    pub fn floating_share_open(&self) -> bool {
        self.floating_share_open.get()
    }

    pub fn windows(&self) -> Vec<OpenedWindow> {
        self.windows.borrow().clone()
    }

    pub fn toast(&self, id: u64) -> Option<ToastRecord> {
        self.toasts.borrow().get(&id).cloned()
    }

    /// Toasts currently mounted.
    pub fn toast_count(&self) -> usize {
        self.toasts.borrow().len()
    }

    /// Messages currently mounted, oldest first.
    pub fn messages(&self) -> Vec<(u64, String, MessageKind)> {
        self.messages
            .borrow()
            .iter()
            .map(|(id, (text, kind))| (*id, text.clone(), *kind))
            .collect()
    }
}

impl PageHost for MemoryPage {
    fn info(&self) -> PageInfo {
        self.info.clone()
    }

    fn reveal(&self, overlay: Overlay) -> bool {
        if !self.overlays.contains(&overlay) {
            return false;
        }
        self.revealed.borrow_mut().insert(overlay);
        true
    }

    fn set_progress(&self, percent: f64) -> bool {
        if !self.has_progress_bar {
            return false;
        }
        self.progress.borrow_mut().push(percent);
        true
    }

    fn ad_slots(&self) -> Vec<AdSlot> {
        self.ad_slots.clone()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn inject_script(&self, script: &ScriptTag) {
        self.scripts.borrow_mut().push(script.clone());
    }

    fn clear_newsletter_input(&self, form: usize) {
        self.inputs_cleared.borrow_mut().push(form);
    }

    fn toggle_floating_share(&self) {
        self.floating_share_open.set(!self.floating_share_open.get());
    }

    fn share_count_text(&self) -> Option<String> {
        self.share_count.borrow().clone()
    }

    fn set_share_count(&self, count: u64) {
        let mut text = self.share_count.borrow_mut();
        if text.is_some() {
            *text = Some(count.to_string());
        }
    }

    fn open_window(&self, url: &str, name: &str, features: &str) -> bool {
        if self.popups_blocked.get() {
            return false;
        }
        self.windows.borrow_mut().push(OpenedWindow {
            url: url.to_string(),
            name: name.to_string(),
            features: features.to_string(),
        });
        true
    }
}

impl NoticeSurface for MemoryPage {
    fn mount_toast(&self, id: u64, text: &str) {
        self.toasts.borrow_mut().insert(
            id,
            ToastRecord {
                text: text.to_string(),
                visible: false,
            },
        );
    }

    fn set_toast_visible(&self, id: u64, visible: bool) {
        if let Some(toast) = self.toasts.borrow_mut().get_mut(&id) {
            toast.visible = visible;
        }
    }

    fn remove_toast(&self, id: u64) {
        self.toasts.borrow_mut().remove(&id);
    }

    fn mount_message(&self, id: u64, text: &str, kind: MessageKind) {
        self.messages
            .borrow_mut()
            .insert(id, (text.to_string(), kind));
    }

    fn remove_message(&self, id: u64) {
        self.messages.borrow_mut().remove(&id);
    }
}

/// HTTP client that answers every request the same way.
#[derive(Debug)]
pub struct MemoryHttp {
    answer: Result<u16, PortError>,
    requests: RefCell<Vec<(String, Value)>>,
}

impl MemoryHttp {
    pub fn responding(status: u16) -> Self {
        Self {
            answer: Ok(status),
            requests: RefCell::default(),
        }
    }

    pub fn failing(error: PortError) -> Self {
        Self {
            answer: Err(error),
            requests: RefCell::default(),
        }
    }

    /// Every `(url, body)` posted so far.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.borrow().clone()
    }
}

impl HttpClient for MemoryHttp {
    async fn post_json(&self, url: &str, body: &Value) -> Result<u16, PortError> {
        self.requests
            .borrow_mut()
            .push((url.to_string(), body.clone()));
        self.answer.clone()
    }
}

/// Clipboard whose async API can be switched off.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    api_available: bool,
    copied: RefCell<Vec<String>>,
    fallback: RefCell<Vec<String>>,
}

impl MemoryClipboard {
    pub fn available() -> Self {
        Self {
            api_available: true,
            ..Self::default()
        }
    }

    /// No async clipboard API; only the fallback works.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Text written through the async API.
    pub fn copied(&self) -> Vec<String> {
        self.copied.borrow().clone()
    }

    /// Text copied through the fallback.
    pub fn fallback_copies(&self) -> Vec<String> {
        self.fallback.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PortError> {
        if !self.api_available {
            return Err(PortError::Unsupported("navigator.clipboard".to_string()));
        }
        self.copied.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn fallback_copy(&self, text: &str) -> Result<(), PortError> {
        self.fallback.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Notification API that gives a fixed answer.
#[derive(Debug)]
pub struct MemoryNotifications {
    supported: bool,
    answer: Permission,
    requests: Cell<usize>,
    subscriptions: RefCell<Vec<Option<String>>>,
}

impl MemoryNotifications {
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            answer: Permission::Default,
            requests: Cell::new(0),
            subscriptions: RefCell::default(),
        }
    }

    pub fn answering(answer: Permission) -> Self {
        Self {
            supported: true,
            answer,
            requests: Cell::new(0),
            subscriptions: RefCell::default(),
        }
    }

    /// Number of permission prompts shown.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }

    /// Application server key of each subscription.
    pub fn subscriptions(&self) -> Vec<Option<String>> {
        self.subscriptions.borrow().clone()
    }
}

impl NotificationPort for MemoryNotifications {
    fn supported(&self) -> bool {
        self.supported
    }

    async fn request_permission(&self) -> Permission {
        self.requests.set(self.requests.get() + 1);
        self.answer
    }

    async fn subscribe(&self, application_server_key: Option<&str>) -> Result<(), PortError> {
        self.subscriptions
            .borrow_mut()
            .push(application_server_key.map(str::to_string));
        Ok(())
    }
}
