//! Service worker exports.
//!
//! `js/sw.js` registers the lifecycle listeners synchronously (the browser
//! requires it) and forwards each event here once the module is loaded.

use std::{cell::RefCell, rc::Rc};

use js_sys::{Array, Promise};
use tracing::info;
use vaarthalu_worker::{
    CacheStore, LifecycleEvent, Network, NotificationOptions, OfflineWorker, Reply, Result,
    WorkerError, WorkerScope,
};
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{CacheStorage, Request, Response, ServiceWorkerGlobalScope};

use crate::{
    convert::{config_from_js, js_error_message, to_js_error, to_plain_js},
    page::BrowserClock,
};

/// `caches` of the worker scope.
pub struct CacheApi {
    caches: CacheStorage,
}

impl CacheStore for CacheApi {
    type Request = Request;
    type Response = Response;

    async fn add_all(&self, cache: &str, urls: &[String]) -> Result<()> {
        let fail = |err: JsValue| WorkerError::cache(cache, js_error_message(&err));

        let opened = JsFuture::from(self.caches.open(cache)).await.map_err(fail)?;
        let opened: web_sys::Cache = opened.dyn_into().map_err(fail)?;

        let requests: Array = urls.iter().map(|url| JsValue::from_str(url)).collect();
        JsFuture::from(opened.add_all_with_str_sequence(&requests))
            .await
            .map_err(fail)?;
        Ok(())
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>> {
        let found = JsFuture::from(self.caches.match_with_request(request))
            .await
            .map_err(|err| WorkerError::Lookup(js_error_message(&err)))?;
        if found.is_undefined() {
            return Ok(None);
        }
        found
            .dyn_into()
            .map(Some)
            .map_err(|_| WorkerError::Lookup("cache entry is not a Response".to_string()))
    }
}

/// `fetch` of the worker scope.
pub struct FetchNetwork {
    scope: ServiceWorkerGlobalScope,
}

impl Network for FetchNetwork {
    type Request = Request;
    type Response = Response;

    async fn fetch(&self, request: &Request) -> Result<Response> {
        let network = |err: JsValue| WorkerError::Network(js_error_message(&err));
        JsFuture::from(self.scope.fetch_with_request(request))
            .await
            .map_err(network)?
            .dyn_into()
            .map_err(network)
    }
}

/// Registration and clients of the worker scope.
pub struct ServiceWorkerScope {
    scope: ServiceWorkerGlobalScope,
}

impl WorkerScope for ServiceWorkerScope {
    async fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<()> {
        let fail = |err: JsValue| WorkerError::Notification(js_error_message(&err));

        let options = to_plain_js(options).map_err(fail)?;
        let shown = self
            .scope
            .registration()
            .show_notification_with_options(title, options.unchecked_ref())
            .map_err(fail)?;
        JsFuture::from(shown).await.map_err(fail)?;
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<()> {
        JsFuture::from(self.scope.clients().open_window(url))
            .await
            .map_err(|err| WorkerError::OpenWindow(js_error_message(&err)))?;
        Ok(())
    }
}

pub type BrowserWorker = OfflineWorker<CacheApi, FetchNetwork, ServiceWorkerScope>;

thread_local! {
    static WORKER: RefCell<Option<Rc<BrowserWorker>>> = const { RefCell::new(None) };
}

fn current() -> std::result::Result<Rc<BrowserWorker>, JsValue> {
    WORKER
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("service worker not started"))
}

/// Create the worker. Must run before any lifecycle handler.
#[wasm_bindgen(js_name = startServiceWorker)]
pub fn start_service_worker(config: JsValue) -> std::result::Result<(), JsValue> {
    let config = config_from_js(config)?;
    let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
    let caches = scope.caches()?;

    let worker = OfflineWorker::new(
        CacheApi { caches },
        FetchNetwork {
            scope: scope.clone(),
        },
        ServiceWorkerScope { scope },
        Rc::new(BrowserClock),
        config.worker,
    );
    info!(cache = %worker.config().cache_name, "service worker started");

    WORKER.with(|slot| *slot.borrow_mut() = Some(Rc::new(worker)));
    Ok(())
}

/// Dispatch one event and settle the returned promise with its outcome.
fn dispatch(event: LifecycleEvent<Request>) -> Promise {
    future_to_promise(async move {
        let worker = current()?;
        match worker.handle(event).await.map_err(to_js_error)? {
            Reply::Response(response) => Ok(response.into()),
            Reply::Clicked { opened } => Ok(JsValue::from_bool(opened)),
            Reply::Installed | Reply::Notified(_) => Ok(JsValue::UNDEFINED),
        }
    })
}

#[wasm_bindgen(js_name = handleInstall)]
pub fn handle_install() -> Promise {
    dispatch(LifecycleEvent::Install)
}

/// Resolves to the `Response` for `respondWith`.
#[wasm_bindgen(js_name = handleFetch)]
pub fn handle_fetch(request: Request) -> Promise {
    dispatch(LifecycleEvent::Fetch(request))
}

#[wasm_bindgen(js_name = handlePush)]
pub fn handle_push(payload: Option<String>) -> Promise {
    dispatch(LifecycleEvent::Push(payload))
}

/// The notification itself is closed by the listener before this runs.
#[wasm_bindgen(js_name = handleNotificationClick)]
pub fn handle_notification_click(action: Option<String>) -> Promise {
    dispatch(LifecycleEvent::NotificationClick(
        action.filter(|action| !action.is_empty()),
    ))
}
