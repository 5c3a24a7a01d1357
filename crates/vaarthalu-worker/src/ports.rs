//! Capabilities of the worker's global scope.

#![allow(async_fn_in_trait)]

use std::rc::Rc;

use crate::{error::Result, notification::NotificationOptions};

/// Named response caches (`caches`).
pub trait CacheStore {
    type Request;
    type Response;

    /// Open `cache` and fetch every URL into it. Either every URL is stored
    /// or none is.
    async fn add_all(&self, cache: &str, urls: &[String]) -> Result<()>;

    /// Look a request up across every cache.
    async fn lookup(&self, request: &Self::Request) -> Result<Option<Self::Response>>;
}

/// Network access (`fetch`).
pub trait Network {
    type Request;
    type Response;

    async fn fetch(&self, request: &Self::Request) -> Result<Self::Response>;
}

/// Notification and client window access.
pub trait WorkerScope {
    async fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<()>;

    async fn open_window(&self, url: &str) -> Result<()>;
}

impl<T: CacheStore> CacheStore for Rc<T> {
    type Request = T::Request;
    type Response = T::Response;

    async fn add_all(&self, cache: &str, urls: &[String]) -> Result<()> {
        (**self).add_all(cache, urls).await
    }

    async fn lookup(&self, request: &Self::Request) -> Result<Option<Self::Response>> {
        (**self).lookup(request).await
    }
}

impl<T: Network> Network for Rc<T> {
    type Request = T::Request;
    type Response = T::Response;

    async fn fetch(&self, request: &Self::Request) -> Result<Self::Response> {
        (**self).fetch(request).await
    }
}

impl<T: WorkerScope> WorkerScope for Rc<T> {
    async fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<()> {
        (**self).show_notification(title, options).await
    }

    async fn open_window(&self, url: &str) -> Result<()> {
        (**self).open_window(url).await
    }
}
