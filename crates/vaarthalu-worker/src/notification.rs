//! Push notification payloads.

use serde::{Deserialize, Serialize};
use vaarthalu_core::config::WorkerConfig;

/// Options passed to `showNotification`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: f64,
    pub primary_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Action id that opens the explore page.
pub const EXPLORE_ACTION: &str = "explore";

/// Action id that only dismisses.
pub const CLOSE_ACTION: &str = "close";

impl NotificationOptions {
    /// Build the options for a push message. A missing payload shows an
    /// empty body.
    pub fn for_push(config: &WorkerConfig, payload: Option<&str>, arrived_ms: f64) -> Self {
        let action = |action: &str, title: &str| NotificationAction {
            action: action.to_string(),
            title: title.to_string(),
            icon: config.action_icon.clone(),
        };

        Self {
            body: payload.unwrap_or_default().to_string(),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData {
                date_of_arrival: arrived_ms,
                primary_key: config.primary_key.clone(),
            },
            actions: vec![action(EXPLORE_ACTION, "Read More"), action(CLOSE_ACTION, "Close")],
        }
    }
}
