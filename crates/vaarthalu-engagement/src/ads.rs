//! Ad slots: script injection, refresh tracking and click tracking.

use std::{rc::Rc, time::Duration};

use tracing::{debug, info};
use vaarthalu_core::{AnalyticsEvent, Scheduler, config::AdsConfig};

use crate::{host::PageHost, tracker::EventTracker};

/// Bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Whether the box lies entirely inside the viewport.
    pub fn is_within(&self, viewport: Viewport) -> bool {
        self.top >= 0.0
            && self.left >= 0.0
            && self.bottom <= viewport.height
            && self.right <= viewport.width
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// `data-position` / `data-type` of an ad slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdTag {
    pub position: Option<String>,
    pub kind: Option<String>,
}

/// An ad slot element and where it currently sits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdSlot {
    pub tag: AdTag,
    pub rect: Rect,
}

/// A `<script>` element to append to the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    pub is_async: bool,
    pub cross_origin: Option<String>,
}

pub struct AdManager {
    page: Rc<dyn PageHost>,
    tracker: EventTracker,
    script_src: String,
    refresh_interval: Duration,
}

impl AdManager {
    pub fn new(page: Rc<dyn PageHost>, tracker: EventTracker, config: &AdsConfig) -> Self {
        Self {
            page,
            tracker,
            script_src: config.script_src.clone(),
            refresh_interval: config.refresh_interval(),
        }
    }

    /// Inject the ad network script and start the refresh interval.
    pub fn start(self: &Rc<Self>, scheduler: &dyn Scheduler) {
        info!(src = %self.script_src, "loading ad script");
        self.page.inject_script(&ScriptTag {
            src: self.script_src.clone(),
            is_async: true,
            cross_origin: Some("anonymous".to_string()),
        });

        let this = Rc::clone(self);
        scheduler.set_interval(
            self.refresh_interval,
            Box::new(move || {
                this.refresh_visible();
            }),
        );
    }

    /// Emit `ad_refresh` for every slot fully inside the viewport.
    ///
    /// Only tracks; ad content is left to the ad network.
    pub fn refresh_visible(&self) -> usize {
        let viewport = self.page.viewport();
        let mut refreshed = 0;

        for slot in self.page.ad_slots() {
            if slot.rect.is_within(viewport) {
                self.tracker.emit(
                    AnalyticsEvent::new("ad_refresh").with_opt("ad_position", slot.tag.position),
                );
                refreshed += 1;
            }
        }

        debug!(refreshed, "ad refresh tick");
        refreshed
    }

    /// A click landed inside an ad slot.
    pub fn on_click(&self, tag: &AdTag) {
        self.tracker.emit(
            AnalyticsEvent::new("ad_click")
                .with_opt("ad_position", tag.position.as_deref())
                .with_opt("ad_type", tag.kind.as_deref()),
        );
    }
}

#[cfg(test)]
mod tests {
    use vaarthalu_core::{MemorySink, ParamValue, VirtualClock};

    use super::*;
    use crate::{host::PageInfo, memory::MemoryPage};

    fn slot(position: &str, rect: Rect) -> AdSlot {
        AdSlot {
            tag: AdTag {
                position: Some(position.to_string()),
                kind: Some("banner".to_string()),
            },
            rect,
        }
    }

    fn page() -> Rc<MemoryPage> {
        Rc::new(
            MemoryPage::new(PageInfo::default())
                .with_viewport(Viewport::new(1_280.0, 720.0))
                .with_ad_slot(slot("header", Rect::new(0.0, 0.0, 90.0, 728.0)))
                .with_ad_slot(slot("sidebar", Rect::new(200.0, 1_000.0, 800.0, 1_300.0)))
                .with_ad_slot(slot("footer", Rect::new(1_500.0, 0.0, 1_590.0, 728.0))),
        )
    }

    #[test]
    fn test_rect_within_viewport() {
        let viewport = Viewport::new(100.0, 100.0);
        assert!(Rect::new(0.0, 0.0, 100.0, 100.0).is_within(viewport));
        assert!(!Rect::new(-1.0, 0.0, 50.0, 50.0).is_within(viewport));
        assert!(!Rect::new(10.0, 10.0, 101.0, 50.0).is_within(viewport));
    }

    #[test]
    fn test_start_injects_script_and_refreshes_periodically() {
        let page = page();
        let clock = Rc::new(VirtualClock::new());
        let sink = Rc::new(MemorySink::new());
        let ads = Rc::new(AdManager::new(
            page.clone(),
            EventTracker::new(sink.clone()),
            &AdsConfig::default(),
        ));

        ads.start(clock.as_ref());

        let scripts = page.scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].src.starts_with("https://pagead2.googlesyndication.com/"));
        assert!(scripts[0].is_async);
        assert_eq!(scripts[0].cross_origin.as_deref(), Some("anonymous"));

        clock.advance(Duration::from_secs(29));
        assert_eq!(sink.count("ad_refresh"), 0);

        clock.advance(Duration::from_secs(1));
        assert_eq!(sink.count("ad_refresh"), 1);
        let event = sink.last("ad_refresh").unwrap();
        assert_eq!(event.param("ad_position").and_then(ParamValue::as_str), Some("header"));

        clock.advance(Duration::from_secs(60));
        assert_eq!(sink.count("ad_refresh"), 3);
    }

    #[test]
    fn test_click_carries_slot_metadata() {
        let sink = Rc::new(MemorySink::new());
        let ads = AdManager::new(page(), EventTracker::new(sink.clone()), &AdsConfig::default());

        ads.on_click(&AdTag {
            position: Some("sidebar".to_string()),
            kind: None,
        });

        let event = sink.last("ad_click").unwrap();
        assert_eq!(event.param("ad_position").and_then(ParamValue::as_str), Some("sidebar"));
        assert!(event.param("ad_type").is_none());
    }
}
