//! Vaarthalu Worker Library
//!
//! The site's service worker as a host-independent actor: it precaches a
//! fixed manifest at install, answers fetches cache-first and turns push
//! messages into notifications. It shares nothing with the page except the
//! cache store.

pub mod error;
pub mod memory;
pub mod notification;
pub mod ports;
pub mod worker;

pub use error::{Result, WorkerError};
pub use notification::{
    CLOSE_ACTION, EXPLORE_ACTION, NotificationAction, NotificationData, NotificationOptions,
};
pub use ports::{CacheStore, Network, WorkerScope};
pub use worker::{LifecycleEvent, OfflineWorker, Reply};
