//! In-memory worker scope, keyed by request URL.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use crate::{
    error::{Result, WorkerError},
    notification::NotificationOptions,
    ports::{CacheStore, Network, WorkerScope},
};

/// A canned HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticResponse {
    pub status: u16,
    pub body: String,
}

impl StaticResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network serving a fixed route table. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct MemoryNetwork {
    routes: HashMap<String, StaticResponse>,
    offline: Cell<bool>,
    fetched: RefCell<Vec<String>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, url: &str, body: &str) -> Self {
        self.routes.insert(url.to_string(), StaticResponse::ok(body));
        self
    }

    /// Fail every later fetch.
    pub fn go_offline(&self) {
        self.offline.set(true);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.borrow().len()
    }

    /// URLs requested so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl Network for MemoryNetwork {
    type Request = String;
    type Response = StaticResponse;

    async fn fetch(&self, url: &String) -> Result<StaticResponse> {
        self.fetched.borrow_mut().push(url.clone());
        if self.offline.get() {
            return Err(WorkerError::Network(format!("offline: {url}")));
        }
        Ok(self
            .routes
            .get(url)
            .cloned()
            .unwrap_or_else(StaticResponse::not_found))
    }
}

/// Cache store that fills itself through a [`MemoryNetwork`].
#[derive(Debug)]
pub struct MemoryCacheStore {
    network: Rc<MemoryNetwork>,
    caches: RefCell<BTreeMap<String, HashMap<String, StaticResponse>>>,
}

impl MemoryCacheStore {
    pub fn new(network: Rc<MemoryNetwork>) -> Self {
        Self {
            network,
            caches: RefCell::default(),
        }
    }

    /// Names of the caches that exist.
    pub fn cache_names(&self) -> Vec<String> {
        self.caches.borrow().keys().cloned().collect()
    }

    pub fn entry_count(&self, cache: &str) -> usize {
        self.caches.borrow().get(cache).map_or(0, HashMap::len)
    }
}

impl CacheStore for MemoryCacheStore {
    type Request = String;
    type Response = StaticResponse;

    async fn add_all(&self, cache: &str, urls: &[String]) -> Result<()> {
        let mut fetched = HashMap::with_capacity(urls.len());
        for url in urls {
            let response = self
                .network
                .fetch(url)
                .await
                .map_err(|err| WorkerError::cache(cache, err.to_string()))?;
            if !response.is_ok() {
                return Err(WorkerError::cache(
                    cache,
                    format!("bad status {} for {url}", response.status),
                ));
            }
            fetched.insert(url.clone(), response);
        }

        self.caches
            .borrow_mut()
            .entry(cache.to_string())
            .or_default()
            .extend(fetched);
        Ok(())
    }

    async fn lookup(&self, url: &String) -> Result<Option<StaticResponse>> {
        Ok(self
            .caches
            .borrow()
            .values()
            .find_map(|entries| entries.get(url).cloned()))
    }
}

/// Scope that records notifications and opened windows.
#[derive(Debug, Default)]
pub struct RecordingScope {
    notifications: RefCell<Vec<(String, NotificationOptions)>>,
    opened: RefCell<Vec<String>>,
}

impl RecordingScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<(String, NotificationOptions)> {
        self.notifications.borrow().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl WorkerScope for RecordingScope {
    async fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<()> {
        self.notifications
            .borrow_mut()
            .push((title.to_string(), options.clone()));
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}
