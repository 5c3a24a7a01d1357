//! Page runtime exports.

mod host;
mod listeners;
mod ports;

use std::{cell::RefCell, rc::Rc};

use js_sys::{Promise, Reflect};
use tracing::{debug, info, warn};
use vaarthalu_core::{AnalyticsEvent, EventSink, config::TrackingConfig};
use vaarthalu_engagement::{Engagement, Ports, ShareOutcome};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise, spawn_local};
use web_sys::Window;

pub use self::{
    host::BrowserPage,
    ports::{
        BrowserClipboard, BrowserClock, BrowserNotifications, DataLayerSink, FetchClient,
        GlooScheduler, GtagSink, LocalStorageFlags,
    },
};
use crate::convert::{config_from_js, js_error_message, params_from_js};

pub type PageEngagement = Engagement<FetchClient, BrowserClipboard, BrowserNotifications>;

thread_local! {
    static ENGAGEMENT: RefCell<Option<Rc<PageEngagement>>> = const { RefCell::new(None) };
}

fn current() -> Result<Rc<PageEngagement>, JsValue> {
    ENGAGEMENT
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("page runtime not started; call startPage first"))
}

/// Start the engagement runtime for this page.
///
/// `config` is an optional configuration object (see `vaarthalu export`).
/// Calling it twice is a no-op.
#[wasm_bindgen(js_name = startPage)]
pub fn start_page(config: JsValue) -> Result<(), JsValue> {
    if ENGAGEMENT.with(|slot| slot.borrow().is_some()) {
        warn!("page runtime already started");
        return Ok(());
    }

    let config = config_from_js(config)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let page = Rc::new(BrowserPage::new(window.clone(), document.clone()));
    let ports = Ports {
        page: page.clone(),
        surface: page,
        sink: Rc::new(DataLayerSink::new(window.clone(), &config.tracking.data_layer)),
        gtag: Some(Rc::new(GtagSink::new(window.clone(), &config.tracking.gtag))),
        flags: Rc::new(LocalStorageFlags::new(&window)),
        clock: Rc::new(BrowserClock),
        scheduler: Rc::new(GlooScheduler),
        http: FetchClient,
        clipboard: BrowserClipboard::new(window.clone()),
        notifications: BrowserNotifications::new(window.clone()),
    };

    // Stored before wiring so a failed attach cannot start a second runtime.
    let engagement = Engagement::start(&config, ports);
    ENGAGEMENT.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&engagement)));

    listeners::attach(&window, &document, &engagement)?;
    register_service_worker(&window, &config.worker.script_url);
    Ok(())
}

/// Ask for notification permission. Resolves to the resulting prompt state.
#[wasm_bindgen(js_name = requestPushPermission)]
pub fn request_push_permission() -> Promise {
    future_to_promise(async move {
        let engagement = current()?;
        let state = engagement.request_push_permission().await;
        Ok(JsValue::from_str(state.as_str()))
    })
}

/// Share a link. Resolves to `true` unless the platform was not recognized.
#[wasm_bindgen(js_name = shareContent)]
pub fn share_content(platform: String, title: String, url: String) -> Promise {
    future_to_promise(async move {
        let engagement = current()?;
        let outcome = engagement.share(&platform, &title, &url).await;
        Ok(JsValue::from_bool(outcome != ShareOutcome::Ignored))
    })
}

/// Push `{event: name, ...params}` onto the event queue. Never throws.
///
/// Before `startPage` the event goes straight to the default `dataLayer`.
#[wasm_bindgen(js_name = trackEvent)]
pub fn track_event(name: &str, params: JsValue) {
    let params = params_from_js(params);
    if let Ok(engagement) = current() {
        engagement.track(name, params);
        return;
    }

    match web_sys::window() {
        Some(window) => DataLayerSink::new(window, TrackingConfig::default().data_layer)
            .record(AnalyticsEvent::with_params(name, params)),
        None => warn!(event = name, "no window; event dropped"),
    }
}

fn register_service_worker(window: &Window, script_url: &str) {
    let navigator = window.navigator();
    if !Reflect::has(&navigator, &JsValue::from_str("serviceWorker")).unwrap_or(false) {
        debug!("service workers not supported");
        return;
    }

    let registration = navigator.service_worker().register(script_url);
    let script_url = script_url.to_string();
    spawn_local(async move {
        match JsFuture::from(registration).await {
            Ok(_) => info!(script = %script_url, "service worker registered"),
            Err(err) => warn!(
                script = %script_url,
                error = %js_error_message(&err),
                "service worker registration failed"
            ),
        }
    });
}
