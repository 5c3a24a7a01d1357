//! Worker lifecycle against the default site manifest.

use std::rc::Rc;

use vaarthalu_core::{Config, VirtualClock};
use vaarthalu_worker::{
    LifecycleEvent, OfflineWorker, Reply,
    memory::{MemoryCacheStore, MemoryNetwork, RecordingScope, StaticResponse},
};

fn site_network() -> MemoryNetwork {
    MemoryNetwork::new()
        .with_route("/", "<html>")
        .with_route("/tns2/src/css/style.css", "body{}")
        .with_route("/tns2/src/css/marketing.css", ".toast{}")
        .with_route("/tns2/src/js/marketing.js", "init()")
        .with_route("/tns2/src/images/logo.png", "PNG")
        .with_route("/tns2/src/latest-news", "<html>latest")
}

#[tokio::test]
async fn test_default_manifest_serves_offline() {
    let config = Config::default();
    let network = Rc::new(site_network());
    let cache = Rc::new(MemoryCacheStore::new(network.clone()));
    let worker = OfflineWorker::new(
        cache.clone(),
        network.clone(),
        RecordingScope::new(),
        Rc::new(VirtualClock::new()),
        config.worker.clone(),
    );

    worker.handle(LifecycleEvent::Install).await.unwrap();
    assert_eq!(cache.cache_names(), vec!["telugu-news-v1".to_string()]);
    assert_eq!(cache.entry_count("telugu-news-v1"), 5);

    network.go_offline();
    for path in &config.worker.precache {
        let reply = worker
            .handle(LifecycleEvent::Fetch(path.clone()))
            .await
            .unwrap();
        assert!(matches!(reply, Reply::Response(StaticResponse { status: 200, .. })));
    }

    assert!(
        worker
            .handle(LifecycleEvent::Fetch("/tns2/src/latest-news".to_string()))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_push_then_explore() {
    let scope = Rc::new(RecordingScope::new());
    let network = Rc::new(site_network());
    let worker = OfflineWorker::new(
        Rc::new(MemoryCacheStore::new(network.clone())),
        network,
        scope.clone(),
        Rc::new(VirtualClock::new()),
        Config::default().worker,
    );

    worker
        .handle(LifecycleEvent::Push(Some("ముఖ్య వార్త".to_string())))
        .await
        .unwrap();
    worker
        .handle(LifecycleEvent::NotificationClick(Some("explore".to_string())))
        .await
        .unwrap();

    let shown = scope.notifications();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].1.actions.len(), 2);
    assert_eq!(scope.opened(), vec!["/tns2/src/latest-news".to_string()]);
}
