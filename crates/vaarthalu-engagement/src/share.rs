//! Social sharing: share URLs, popups, clipboard copy and share counts.

use std::{fmt, rc::Rc, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use vaarthalu_core::{AnalyticsEvent, EventSink, config::ShareConfig};

use crate::{
    host::{Clipboard, PageHost},
    notices::Notices,
};

/// Share destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Twitter,
    Whatsapp,
    Telegram,
    Linkedin,
    /// Copy the link instead of opening a popup.
    Copy,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::Facebook,
        Platform::Twitter,
        Platform::Whatsapp,
        Platform::Telegram,
        Platform::Linkedin,
        Platform::Copy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::Whatsapp => "whatsapp",
            Platform::Telegram => "telegram",
            Platform::Linkedin => "linkedin",
            Platform::Copy => "copy",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown share platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// What to share and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareTarget {
    platform: Platform,
    title: String,
    url: String,
}

impl ShareTarget {
    pub fn new(platform: Platform, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform,
            title: title.into(),
            url: url.into(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Popup window name, `share_<platform>`.
    pub fn window_name(&self) -> String {
        format!("share_{}", self.platform)
    }

    /// Platform share URL. `None` for [`Platform::Copy`].
    pub fn share_url(&self, twitter_via: &str) -> Option<String> {
        let title = encode_component(&self.title);
        let url = encode_component(&self.url);
        let text = format!("{title}%0A%0A{url}");

        let share_url = match self.platform {
            Platform::Facebook => {
                format!("https://www.facebook.com/sharer/sharer.php?u={url}&quote={title}")
            }
            Platform::Twitter => {
                format!("https://twitter.com/intent/tweet?text={text}&via={twitter_via}")
            }
            Platform::Whatsapp => format!("https://api.whatsapp.com/send?text={text}"),
            Platform::Telegram => format!("https://t.me/share/url?url={url}&text={title}"),
            Platform::Linkedin => {
                format!("https://www.linkedin.com/sharing/share-offsite/?url={url}")
            }
            Platform::Copy => return None,
        };
        Some(share_url)
    }
}

/// Result of a share request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// A popup was requested. `opened` is false if the browser blocked it.
    Opened {
        url: String,
        window_name: String,
        opened: bool,
    },
    /// The link was copied; `fallback` tells whether the manual path was used.
    Copied { fallback: bool },
    /// The platform was not recognized.
    Ignored,
}

/// Parse the leading integer of a counter, as `parseInt` would. Anything
/// unparsable counts as zero.
/// Percent-encode like `encodeURIComponent`, which leaves `!'()*` as is.
fn encode_component(text: &str) -> String {
    let mut encoded = urlencoding::encode(text).into_owned();
    for (escape, raw) in [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")] {
        encoded = encoded.replace(escape, raw);
    }
    encoded
}

pub fn parse_share_count(text: &str) -> u64 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

pub struct ShareDispatcher<C> {
    clipboard: C,
    page: Rc<dyn PageHost>,
    notices: Rc<Notices>,
    gtag: Option<Rc<dyn EventSink>>,
    config: ShareConfig,
    copied_message: String,
}

impl<C: Clipboard> ShareDispatcher<C> {
    pub fn new(
        clipboard: C,
        page: Rc<dyn PageHost>,
        notices: Rc<Notices>,
        gtag: Option<Rc<dyn EventSink>>,
        config: ShareConfig,
        copied_message: impl Into<String>,
    ) -> Self {
        Self {
            clipboard,
            page,
            notices,
            gtag,
            config,
            copied_message: copied_message.into(),
        }
    }

    /// Share `url` on `platform`. Unknown platforms are ignored.
    pub async fn share(&self, platform: &str, title: &str, url: &str) -> ShareOutcome {
        match platform.parse::<Platform>() {
            Ok(platform) => self.share_target(&ShareTarget::new(platform, title, url)).await,
            Err(err) => {
                debug!(%err, "ignoring share request");
                ShareOutcome::Ignored
            }
        }
    }

    pub async fn share_target(&self, target: &ShareTarget) -> ShareOutcome {
        let Some(share_url) = target.share_url(&self.config.twitter_via) else {
            let fallback = self.copy_link(target.url()).await;
            self.notices.show_toast(&self.copied_message);
            return ShareOutcome::Copied { fallback };
        };

        let window_name = target.window_name();
        let opened = self
            .page
            .open_window(&share_url, &window_name, &self.config.window_features());
        if !opened {
            warn!(platform = %target.platform(), "share popup was blocked");
        }
        self.track_share(target.platform());

        ShareOutcome::Opened {
            url: share_url,
            window_name,
            opened,
        }
    }

    /// Copy through the clipboard API, falling back to manual selection.
    ///
    /// Returns whether the fallback was used.
    async fn copy_link(&self, url: &str) -> bool {
        match self.clipboard.write_text(url).await {
            Ok(()) => false,
            Err(err) => {
                debug!(error = %err, "clipboard API unavailable, using fallback");
                if let Err(err) = self.clipboard.fallback_copy(url) {
                    warn!(error = %err, "fallback copy failed");
                }
                true
            }
        }
    }

    fn track_share(&self, platform: Platform) {
        if let Some(gtag) = &self.gtag {
            gtag.record(
                AnalyticsEvent::new("share")
                    .with("event_category", "social")
                    .with("event_label", platform.as_str())
                    .with("transport_type", "beacon"),
            );
        }

        if let Some(text) = self.page.share_count_text() {
            self.page
                .set_share_count(parse_share_count(&text).saturating_add(1));
        }
    }
}
