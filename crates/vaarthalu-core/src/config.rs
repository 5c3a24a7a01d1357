//! Runtime configuration for the engagement scripts and the offline worker.
//!
//! Every section has defaults matching the production site, so an empty
//! file (or `Config::default()`) describes a working deployment.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for Vaarthalu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity.
    pub site: SiteConfig,

    /// Analytics sink names.
    pub tracking: TrackingConfig,

    /// Newsletter form settings.
    pub newsletter: NewsletterConfig,

    /// Push notification prompt settings.
    pub push: PushConfig,

    /// Exit-intent popup settings.
    pub exit_intent: ExitIntentConfig,

    /// Reading progress settings.
    pub progress: ProgressConfig,

    /// Advertising settings.
    pub ads: AdsConfig,

    /// Social share settings.
    pub share: ShareConfig,

    /// Toast and message timings.
    pub notices: NoticesConfig,

    /// Service worker settings.
    pub worker: WorkerConfig,

    /// Localized user-facing messages.
    pub messages: Messages,
}

/// Site-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com/news").
    pub base_url: String,

    /// Site description for meta tags.
    pub description: Option<String>,

    /// BCP 47 language tag.
    pub language: String,
}

/// Names of the page globals analytics are written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Global array drained by the tag manager.
    pub data_layer: String,

    /// Global tag function, called only when present.
    pub gtag: String,
}

/// Newsletter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterConfig {
    /// Endpoint receiving `POST {"email": ...}`.
    pub endpoint: String,
}

/// Push prompt configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Delay before the prompt is revealed (milliseconds).
    pub prompt_delay_ms: u64,

    /// Local storage key recording that the prompt was shown.
    pub flag_key: String,

    /// Base64url VAPID key used when subscribing to push.
    pub vapid_public_key: Option<String>,
}

/// Exit-intent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitIntentConfig {
    /// Pointer must leave above this many pixels from the top.
    pub threshold_px: f64,

    /// Local storage key recording that the popup was shown.
    pub flag_key: String,
}

/// Reading progress configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Milestone percentages, strictly ascending.
    pub milestones: Vec<u8>,

    /// Re-emit milestones on every qualifying scroll instead of once per view.
    pub repeat_milestones: bool,
}

/// Advertising configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsConfig {
    /// Third-party ad script injected on start.
    pub script_src: String,

    /// Period between visible-slot refresh events (milliseconds).
    pub refresh_interval_ms: u64,
}

/// Social share configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Popup width in pixels.
    pub popup_width: u32,

    /// Popup height in pixels.
    pub popup_height: u32,

    /// Twitter handle credited with `via=`.
    pub twitter_via: String,
}

/// Timings for transient notices (milliseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticesConfig {
    /// Delay between inserting a toast and making it visible.
    pub toast_show_delay_ms: u64,

    /// How long a toast stays visible.
    pub toast_visible_ms: u64,

    /// Fade-out transition before the toast is removed.
    pub toast_fade_ms: u64,

    /// Lifetime of a status message.
    pub message_visible_ms: u64,
}

/// Service worker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Script URL registered from the page.
    pub script_url: String,

    /// Cache name; doubles as the cache version tag.
    pub cache_name: String,

    /// URLs fetched into the cache at install time.
    pub precache: Vec<String>,

    /// Notification title.
    pub notification_title: String,

    /// Notification icon.
    pub icon: String,

    /// Notification badge.
    pub badge: String,

    /// Icon shown next to notification actions.
    pub action_icon: String,

    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,

    /// Page opened by the "explore" action.
    pub explore_url: String,

    /// Opaque key attached to notification data.
    pub primary_key: String,
}

/// Localized messages shown to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub invalid_email: String,
    pub subscribed: String,
    pub retry: String,
    pub push_enabled: String,
    pub link_copied: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "తెలుగు వార్తలు".to_string(),
            base_url: "https://hello-snamy.github.io/tns2".to_string(),
            description: Some("తాజా తెలుగు వార్తలు, బ్రేకింగ్ న్యూస్".to_string()),
            language: "te-IN".to_string(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            data_layer: "dataLayer".to_string(),
            gtag: "gtag".to_string(),
        }
    }
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            endpoint: "/.netlify/functions/newsletter".to_string(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            prompt_delay_ms: 10_000,
            flag_key: "pushPrompted".to_string(),
            vapid_public_key: None,
        }
    }
}

impl Default for ExitIntentConfig {
    fn default() -> Self {
        Self {
            threshold_px: 50.0,
            flag_key: "exitPopupShown".to_string(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            milestones: vec![25, 50, 75, 90],
            repeat_milestones: false,
        }
    }
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            script_src: "https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client=ca-pub-YOUR_PUBLISHER_ID".to_string(),
            refresh_interval_ms: 30_000,
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            popup_width: 600,
            popup_height: 400,
            twitter_via: "TeluguNews".to_string(),
        }
    }
}

impl Default for NoticesConfig {
    fn default() -> Self {
        Self {
            toast_show_delay_ms: 100,
            toast_visible_ms: 3_000,
            toast_fade_ms: 300,
            message_visible_ms: 5_000,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            script_url: "/sw.js".to_string(),
            cache_name: "telugu-news-v1".to_string(),
            precache: vec![
                "/".to_string(),
                "/tns2/src/css/style.css".to_string(),
                "/tns2/src/css/marketing.css".to_string(),
                "/tns2/src/js/marketing.js".to_string(),
                "/tns2/src/images/logo.png".to_string(),
            ],
            notification_title: "తెలుగు వార్తలు".to_string(),
            icon: "/tns2/src/images/icon-192.png".to_string(),
            badge: "/tns2/src/images/badge-72.png".to_string(),
            action_icon: "/tns2/src/images/icon-72.png".to_string(),
            vibrate: vec![100, 50, 100],
            explore_url: "/tns2/src/latest-news".to_string(),
            primary_key: "2".to_string(),
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            invalid_email: "దయచేసి సరైన ఈమెయిల్ చిరునామా నమోదు చేయండి".to_string(),
            subscribed: "వార్తాలేఖకు చందా పూర్తి అయ్యింది! ధన్యవాదాలు.".to_string(),
            retry: "దయచేసి మళ్లీ ప్రయత్నించండి".to_string(),
            push_enabled: "పుష్ నోటిఫికేషన్లు సక్రియం చేయబడ్డాయి".to_string(),
            link_copied: "లింక్ కాపీ అయ్యింది!".to_string(),
        }
    }
}

impl PushConfig {
    pub fn prompt_delay(&self) -> Duration {
        Duration::from_millis(self.prompt_delay_ms)
    }
}

impl AdsConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

impl ShareConfig {
    /// Feature string passed to `window.open`.
    pub fn window_features(&self) -> String {
        format!(
            "width={},height={},menubar=no,toolbar=no,resizable=yes,scrollbars=yes",
            self.popup_width, self.popup_height
        )
    }
}

impl NoticesConfig {
    pub fn toast_show_delay(&self) -> Duration {
        Duration::from_millis(self.toast_show_delay_ms)
    }

    pub fn toast_visible(&self) -> Duration {
        Duration::from_millis(self.toast_visible_ms)
    }

    pub fn toast_fade(&self) -> Duration {
        Duration::from_millis(self.toast_fade_ms)
    }

    pub fn message_visible(&self) -> Duration {
        Duration::from_millis(self.message_visible_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration layering `VAARTHALU__SECTION__KEY` variables over the file.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("VAARTHALU")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration handed over by the page as JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        if self.newsletter.endpoint.is_empty() {
            return Err(CoreError::config("newsletter.endpoint cannot be empty"));
        }

        let mut previous = 0u8;
        for &milestone in &self.progress.milestones {
            if milestone == 0 || milestone >= 100 || milestone <= previous {
                return Err(CoreError::config(
                    "progress.milestones must be strictly ascending between 0 and 100",
                ));
            }
            previous = milestone;
        }

        let timers = [
            ("push.prompt_delay_ms", self.push.prompt_delay_ms),
            ("ads.refresh_interval_ms", self.ads.refresh_interval_ms),
            ("notices.toast_show_delay_ms", self.notices.toast_show_delay_ms),
            ("notices.toast_visible_ms", self.notices.toast_visible_ms),
            ("notices.toast_fade_ms", self.notices.toast_fade_ms),
            ("notices.message_visible_ms", self.notices.message_visible_ms),
        ];
        for (name, value) in timers {
            if value == 0 {
                return Err(CoreError::config(format!("{name} must be greater than zero")));
            }
        }

        if self.worker.cache_name.is_empty() {
            return Err(CoreError::config("worker.cache_name cannot be empty"));
        }

        if self.worker.precache.is_empty() {
            return Err(CoreError::config("worker.precache cannot be empty"));
        }

        if let Some(bad) = self.worker.precache.iter().find(|url| !url.starts_with('/')) {
            return Err(CoreError::config(format!(
                "worker.precache entry must be an absolute path: {bad}"
            )));
        }

        if self.worker.explore_url.is_empty() {
            return Err(CoreError::config("worker.explore_url cannot be empty"));
        }

        Ok(())
    }
}
