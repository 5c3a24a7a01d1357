//! Browser implementations of the capability ports.

use gloo_net::http::Request;
use gloo_timers::callback::{Interval, Timeout};
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde_json::Value;
use tracing::{debug, warn};
use vaarthalu_core::{AnalyticsEvent, Clock, EventSink, FlagStore, PortError, Scheduler};
use vaarthalu_engagement::host::{Clipboard, HttpClient, NotificationPort, Permission};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement, Storage, Window};

use crate::convert::{dom_error, js_error_message, timer_millis, to_plain_js};

/// Flags kept in `localStorage` as the string `"true"`.
pub struct LocalStorageFlags {
    storage: Option<Storage>,
}

impl LocalStorageFlags {
    pub fn new(window: &Window) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                warn!(error = %js_error_message(&err), "localStorage unavailable");
                None
            }
        };
        Self { storage }
    }
}

impl FlagStore for LocalStorageFlags {
    fn is_set(&self, key: &str) -> bool {
        self.storage
            .as_ref()
            .and_then(|storage| storage.get_item(key).ok().flatten())
            .is_some_and(|value| value == "true")
    }

    fn set(&self, key: &str) {
        let Some(storage) = &self.storage else { return };
        if let Err(err) = storage.set_item(key, "true") {
            warn!(key, error = %js_error_message(&err), "could not persist flag");
        }
    }
}

/// Pushes events onto the tag manager's `window.dataLayer`.
///
/// The queue is looked up on every push since the tag manager replaces
/// the array's `push` once it loads.
pub struct DataLayerSink {
    window: Window,
    name: String,
}

impl DataLayerSink {
    pub fn new(window: Window, name: impl Into<String>) -> Self {
        Self {
            window,
            name: name.into(),
        }
    }

    fn queue(&self) -> Result<JsValue, JsValue> {
        let key = JsValue::from_str(&self.name);
        let existing = Reflect::get(&self.window, &key)?;
        if !existing.is_undefined() && !existing.is_null() {
            return Ok(existing);
        }

        let queue = JsValue::from(Array::new());
        Reflect::set(&self.window, &key, &queue)?;
        Ok(queue)
    }

    fn push(&self, event: &AnalyticsEvent) -> Result<(), JsValue> {
        let queue = self.queue()?;
        let record = to_plain_js(event)?;
        let push: Function = Reflect::get(&queue, &JsValue::from_str("push"))?.dyn_into()?;
        push.call1(&queue, &record)?;
        Ok(())
    }
}

impl EventSink for DataLayerSink {
    fn record(&self, event: AnalyticsEvent) {
        if let Err(err) = self.push(&event) {
            warn!(event = %event.name, error = %js_error_message(&err), "dataLayer push failed");
        }
    }
}

/// Calls `gtag('event', name, params)` when the page defines `gtag`.
pub struct GtagSink {
    window: Window,
    name: String,
}

impl GtagSink {
    pub fn new(window: Window, name: impl Into<String>) -> Self {
        Self {
            window,
            name: name.into(),
        }
    }
}

impl EventSink for GtagSink {
    fn record(&self, event: AnalyticsEvent) {
        let gtag = Reflect::get(&self.window, &JsValue::from_str(&self.name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok());
        let Some(gtag) = gtag else {
            debug!(event = %event.name, "gtag not present");
            return;
        };

        let result = to_plain_js(&event.params).and_then(|params| {
            gtag.call3(
                &JsValue::NULL,
                &JsValue::from_str("event"),
                &JsValue::from_str(&event.name),
                &params,
            )
        });
        if let Err(err) = result {
            warn!(event = %event.name, error = %js_error_message(&err), "gtag call failed");
        }
    }
}

/// `Date.now()`.
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// `setTimeout` / `setInterval` through gloo timers. Timers live as long
/// as the page.
pub struct GlooScheduler;

impl Scheduler for GlooScheduler {
    fn set_timeout(&self, delay: std::time::Duration, task: Box<dyn FnOnce()>) {
        Timeout::new(timer_millis(delay), task).forget();
    }

    fn set_interval(&self, period: std::time::Duration, mut task: Box<dyn FnMut()>) {
        Interval::new(timer_millis(period), move || task()).forget();
    }
}

/// `fetch` through gloo-net.
pub struct FetchClient;

impl HttpClient for FetchClient {
    async fn post_json(&self, url: &str, body: &Value) -> Result<u16, PortError> {
        let response = Request::post(url)
            .json(body)
            .map_err(|err| PortError::Network(err.to_string()))?
            .send()
            .await
            .map_err(|err| PortError::Network(err.to_string()))?;
        Ok(response.status())
    }
}

pub struct BrowserClipboard {
    window: Window,
}

impl BrowserClipboard {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

fn clipboard_error(value: JsValue) -> PortError {
    PortError::Clipboard(js_error_message(&value))
}

impl Clipboard for BrowserClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PortError> {
        let navigator = self.window.navigator();
        let clipboard =
            Reflect::get(&navigator, &JsValue::from_str("clipboard")).map_err(clipboard_error)?;
        if clipboard.is_undefined() {
            return Err(PortError::Unsupported("navigator.clipboard".to_string()));
        }

        let write: Function = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
            .map_err(clipboard_error)?
            .dyn_into()
            .map_err(|_| PortError::Unsupported("clipboard.writeText".to_string()))?;
        let promise: Promise = write
            .call1(&clipboard, &JsValue::from_str(text))
            .map_err(clipboard_error)?
            .dyn_into()
            .map_err(clipboard_error)?;
        JsFuture::from(promise).await.map_err(clipboard_error)?;
        Ok(())
    }

    fn fallback_copy(&self, text: &str) -> Result<(), PortError> {
        let document = self
            .window
            .document()
            .ok_or_else(|| PortError::Dom("no document".to_string()))?;
        let body = document
            .body()
            .ok_or_else(|| PortError::Dom("no body".to_string()))?;

        let area: HtmlTextAreaElement = document
            .create_element("textarea")
            .map_err(dom_error)?
            .dyn_into()
            .map_err(|el| dom_error(el.into()))?;
        area.set_value(text);
        body.append_child(&area).map_err(dom_error)?;
        area.select();

        let copied = match document.dyn_ref::<HtmlDocument>() {
            Some(html) => html.exec_command("copy").map_err(dom_error),
            None => Err(PortError::Unsupported("execCommand".to_string())),
        };
        body.remove_child(&area).map_err(dom_error)?;

        if !copied? {
            return Err(PortError::Clipboard("copy command was rejected".to_string()));
        }
        Ok(())
    }
}

pub struct BrowserNotifications {
    window: Window,
}

impl BrowserNotifications {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

fn permission_error(value: JsValue) -> PortError {
    PortError::Permission(js_error_message(&value))
}

impl NotificationPort for BrowserNotifications {
    fn supported(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("Notification")).unwrap_or(false)
    }

    async fn request_permission(&self) -> Permission {
        let answer = match web_sys::Notification::request_permission() {
            Ok(promise) => JsFuture::from(promise).await,
            Err(err) => Err(err),
        };

        match answer {
            Ok(value) => Permission::from_browser(&value.as_string().unwrap_or_default()),
            Err(err) => {
                warn!(error = %js_error_message(&err), "permission request failed");
                Permission::Default
            }
        }
    }

    async fn subscribe(&self, application_server_key: Option<&str>) -> Result<(), PortError> {
        let container = self.window.navigator().service_worker();
        let ready = container.ready().map_err(permission_error)?;
        let registration = JsFuture::from(ready).await.map_err(permission_error)?;

        let push_manager = Reflect::get(&registration, &JsValue::from_str("pushManager"))
            .map_err(permission_error)?;
        let subscribe: Function = Reflect::get(&push_manager, &JsValue::from_str("subscribe"))
            .map_err(permission_error)?
            .dyn_into()
            .map_err(|_| PortError::Unsupported("PushManager.subscribe".to_string()))?;

        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("userVisibleOnly"), &JsValue::TRUE)
            .map_err(permission_error)?;
        if let Some(key) = application_server_key {
            Reflect::set(
                &options,
                &JsValue::from_str("applicationServerKey"),
                &JsValue::from_str(key),
            )
            .map_err(permission_error)?;
        }

        let promise: Promise = subscribe
            .call1(&push_manager, &options)
            .map_err(permission_error)?
            .dyn_into()
            .map_err(permission_error)?;
        JsFuture::from(promise).await.map_err(permission_error)?;
        debug!("push subscription registered");
        Ok(())
    }
}
