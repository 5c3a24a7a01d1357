//! The offline worker state machine.

use std::rc::Rc;

use tracing::{debug, info, warn};
use vaarthalu_core::{Clock, config::WorkerConfig};

use crate::{
    error::Result,
    notification::{EXPLORE_ACTION, NotificationOptions},
    ports::{CacheStore, Network, WorkerScope},
};

/// Events delivered to the worker by the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent<R> {
    Install,
    Fetch(R),
    /// Push message with its text payload, if any.
    Push(Option<String>),
    /// Notification click with the chosen action, if any.
    NotificationClick(Option<String>),
}

/// What the worker did in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<P> {
    Installed,
    Response(P),
    Notified(NotificationOptions),
    Clicked { opened: bool },
}

/// Cache-first offline worker.
///
/// The cache is filled once at install and never written afterwards.
pub struct OfflineWorker<C, N, S> {
    cache: C,
    network: N,
    scope: S,
    clock: Rc<dyn Clock>,
    config: WorkerConfig,
}

impl<C, N, S> OfflineWorker<C, N, S>
where
    C: CacheStore,
    N: Network<Request = C::Request, Response = C::Response>,
    S: WorkerScope,
{
    pub fn new(cache: C, network: N, scope: S, clock: Rc<dyn Clock>, config: WorkerConfig) -> Self {
        Self {
            cache,
            network,
            scope,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub async fn handle(&self, event: LifecycleEvent<C::Request>) -> Result<Reply<C::Response>> {
        match event {
            LifecycleEvent::Install => self.install().await.map(|()| Reply::Installed),
            LifecycleEvent::Fetch(request) => self.respond(&request).await.map(Reply::Response),
            LifecycleEvent::Push(payload) => {
                self.on_push(payload.as_deref()).await.map(Reply::Notified)
            }
            LifecycleEvent::NotificationClick(action) => self
                .on_notification_click(action.as_deref())
                .await
                .map(|opened| Reply::Clicked { opened }),
        }
    }

    /// Precache the manifest. Any failed entry fails the install.
    pub async fn install(&self) -> Result<()> {
        info!(
            cache = %self.config.cache_name,
            entries = self.config.precache.len(),
            "precaching"
        );
        self.cache
            .add_all(&self.config.cache_name, &self.config.precache)
            .await?;
        info!(cache = %self.config.cache_name, "install complete");
        Ok(())
    }

    /// Serve from cache, else from the network. Misses are not cached.
    pub async fn respond(&self, request: &C::Request) -> Result<C::Response> {
        match self.cache.lookup(request).await {
            Ok(Some(response)) => {
                debug!("cache hit");
                return Ok(response);
            }
            Ok(None) => debug!("cache miss"),
            Err(err) => warn!(error = %err, "cache lookup failed, using network"),
        }
        self.network.fetch(request).await
    }

    /// Show the notification for a push message.
    pub async fn on_push(&self, payload: Option<&str>) -> Result<NotificationOptions> {
        let options = NotificationOptions::for_push(&self.config, payload, self.clock.now_ms());
        self.scope
            .show_notification(&self.config.notification_title, &options)
            .await?;
        debug!(body_len = options.body.len(), "push notification shown");
        Ok(options)
    }

    /// Handle a click on an already-closed notification.
    ///
    /// Returns whether a window was opened.
    pub async fn on_notification_click(&self, action: Option<&str>) -> Result<bool> {
        if action != Some(EXPLORE_ACTION) {
            debug!(?action, "notification dismissed");
            return Ok(false);
        }

        self.scope.open_window(&self.config.explore_url).await?;
        info!(url = %self.config.explore_url, "opened explore page");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use vaarthalu_core::VirtualClock;

    use super::*;
    use crate::{
        error::WorkerError,
        memory::{MemoryCacheStore, MemoryNetwork, RecordingScope, StaticResponse},
    };

    type TestWorker = OfflineWorker<Rc<MemoryCacheStore>, Rc<MemoryNetwork>, Rc<RecordingScope>>;

    struct Fixture {
        network: Rc<MemoryNetwork>,
        scope: Rc<RecordingScope>,
        worker: TestWorker,
    }

    fn fixture(network: MemoryNetwork, precache: &[&str]) -> Fixture {
        let network = Rc::new(network);
        let cache = Rc::new(MemoryCacheStore::new(network.clone()));
        let scope = Rc::new(RecordingScope::new());
        let config = WorkerConfig {
            precache: precache.iter().map(|p| p.to_string()).collect(),
            ..WorkerConfig::default()
        };
        let worker = OfflineWorker::new(
            cache,
            network.clone(),
            scope.clone(),
            Rc::new(VirtualClock::starting_at(1_700_000_000_000.0)),
            config,
        );
        Fixture {
            network,
            scope,
            worker,
        }
    }

    #[tokio::test]
    async fn test_cache_first_after_install() {
        let f = fixture(
            MemoryNetwork::new()
                .with_route("/a.css", "body{}")
                .with_route("/b.js", "run()"),
            &["/a.css"],
        );

        f.worker.install().await.unwrap();
        assert_eq!(f.network.fetch_count(), 1);

        let cached = f.worker.respond(&"/a.css".to_string()).await.unwrap();
        assert_eq!(cached, StaticResponse::ok("body{}"));
        assert_eq!(f.network.fetch_count(), 1);

        let fetched = f.worker.respond(&"/b.js".to_string()).await.unwrap();
        assert_eq!(fetched, StaticResponse::ok("run()"));
        assert_eq!(f.network.fetch_count(), 2);

        // Misses are not written through.
        f.worker.respond(&"/b.js".to_string()).await.unwrap();
        assert_eq!(f.network.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let f = fixture(
            MemoryNetwork::new().with_route("/a.css", "body{}"),
            &["/a.css", "/missing.png"],
        );

        let err = f.worker.install().await.unwrap_err();
        assert!(matches!(err, WorkerError::Cache { .. }));

        f.worker.respond(&"/a.css".to_string()).await.unwrap();
        assert_eq!(f.network.fetched().last().map(String::as_str), Some("/a.css"));
    }

    #[tokio::test]
    async fn test_offline_miss_fails() {
        let f = fixture(MemoryNetwork::new().with_route("/a.css", "body{}"), &["/a.css"]);
        f.worker.install().await.unwrap();
        f.network.go_offline();

        assert!(f.worker.respond(&"/a.css".to_string()).await.is_ok());
        assert!(matches!(
            f.worker.respond(&"/b.js".to_string()).await,
            Err(WorkerError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_push_shows_titled_notification() {
        let f = fixture(MemoryNetwork::new(), &["/"]);

        let options = f.worker.on_push(Some("కొత్త వార్త")).await.unwrap();

        let shown = f.scope.notifications();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0, "తెలుగు వార్తలు");
        assert_eq!(shown[0].1, options);
        assert_eq!(options.body, "కొత్త వార్త");
        assert_eq!(options.data.date_of_arrival, 1_700_000_000_000.0);
    }

    #[tokio::test]
    async fn test_only_explore_opens_window() {
        let f = fixture(MemoryNetwork::new(), &["/"]);

        assert!(f.worker.on_notification_click(Some("explore")).await.unwrap());
        assert!(!f.worker.on_notification_click(Some("close")).await.unwrap());
        assert!(!f.worker.on_notification_click(None).await.unwrap());

        assert_eq!(f.scope.opened(), vec!["/tns2/src/latest-news".to_string()]);
    }

    #[tokio::test]
    async fn test_handle_dispatches_events() {
        let f = fixture(MemoryNetwork::new().with_route("/", "<html>"), &["/"]);

        assert_eq!(
            f.worker.handle(LifecycleEvent::Install).await.unwrap(),
            Reply::Installed
        );
        assert_eq!(
            f.worker
                .handle(LifecycleEvent::Fetch("/".to_string()))
                .await
                .unwrap(),
            Reply::Response(StaticResponse::ok("<html>"))
        );
        assert_eq!(
            f.worker
                .handle(LifecycleEvent::NotificationClick(Some("close".to_string())))
                .await
                .unwrap(),
            Reply::Clicked { opened: false }
        );
        assert!(matches!(
            f.worker.handle(LifecycleEvent::Push(None)).await.unwrap(),
            Reply::Notified(options) if options.body.is_empty()
        ));
    }
}
