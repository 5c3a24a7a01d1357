//! Time on page, scroll depth and video engagement.

use std::{cell::Cell, rc::Rc};

use vaarthalu_core::{AnalyticsEvent, Clock};

use crate::{progress::ScrollMetrics, tracker::EventTracker};

/// Media events forwarded from `<video>` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoEvent {
    Play,
    Ended,
}

impl VideoEvent {
    fn event_name(self) -> &'static str {
        match self {
            VideoEvent::Play => "video_play",
            VideoEvent::Ended => "video_complete",
        }
    }
}

/// A video element's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoInfo {
    pub src: String,
    pub title: Option<String>,
}

impl VideoInfo {
    /// Title attribute, or "Untitled" when missing or empty.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => "Untitled",
        }
    }
}

pub struct BehaviorTracker {
    tracker: EventTracker,
    clock: Rc<dyn Clock>,
    page_url: String,
    started_ms: f64,
    max_depth: Cell<u32>,
}

impl BehaviorTracker {
    /// Start the time-on-page stopwatch now.
    pub fn new(tracker: EventTracker, clock: Rc<dyn Clock>, page_url: impl Into<String>) -> Self {
        let started_ms = clock.now_ms();
        Self {
            tracker,
            clock,
            page_url: page_url.into(),
            started_ms,
            max_depth: Cell::new(0),
        }
    }

    /// Deepest scroll percentage recorded so far.
    pub fn max_depth(&self) -> u32 {
        self.max_depth.get()
    }

    /// Emit `scroll_depth` when the rounded depth beats the previous maximum.
    pub fn on_scroll(&self, metrics: ScrollMetrics) -> Option<u32> {
        let depth = metrics.percent()?.round() as u32;
        if depth <= self.max_depth.get() {
            return None;
        }

        self.max_depth.set(depth);
        self.tracker.emit(
            AnalyticsEvent::new("scroll_depth")
                .with("depth_percentage", depth)
                .with("page_url", &self.page_url),
        );
        Some(depth)
    }

    /// Emit `time_on_page` with whole seconds since load.
    pub fn on_unload(&self) -> u64 {
        let elapsed_ms = (self.clock.now_ms() - self.started_ms).max(0.0);
        let seconds = (elapsed_ms / 1000.0).round() as u64;

        self.tracker.emit(
            AnalyticsEvent::new("time_on_page")
                .with("time_spent", seconds)
                .with("page_url", &self.page_url),
        );
        seconds
    }

    pub fn on_video(&self, event: VideoEvent, video: &VideoInfo) {
        self.tracker.emit(
            AnalyticsEvent::new(event.event_name())
                .with("video_src", &video.src)
                .with("video_title", video.display_title()),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use vaarthalu_core::{MemorySink, ParamValue, VirtualClock};

    use super::*;

    fn at(percent: f64) -> ScrollMetrics {
        ScrollMetrics::new(percent * 10.0, 1_100.0, 100.0)
    }

    fn setup() -> (Rc<VirtualClock>, Rc<MemorySink>, BehaviorTracker) {
        let clock = Rc::new(VirtualClock::starting_at(1_700_000_000_000.0));
        let sink = Rc::new(MemorySink::new());
        let behavior = BehaviorTracker::new(
            EventTracker::new(sink.clone()),
            clock.clone(),
            "https://site/news/a",
        );
        (clock, sink, behavior)
    }

    #[test]
    fn test_scroll_depth_is_monotonic() {
        let (_, sink, behavior) = setup();

        for depth in [10.0, 30.0, 20.0, 50.0] {
            behavior.on_scroll(at(depth));
        }

        let depths: Vec<i64> = sink
            .events()
            .iter()
            .filter_map(|e| e.param("depth_percentage").and_then(ParamValue::as_i64))
            .collect();
        assert_eq!(depths, vec![10, 30, 50]);
        assert_eq!(behavior.max_depth(), 50);
    }

    #[test]
    fn test_equal_depth_does_not_repeat() {
        let (_, sink, behavior) = setup();

        assert_eq!(behavior.on_scroll(at(40.0)), Some(40));
        assert_eq!(behavior.on_scroll(at(40.2)), None);
        assert_eq!(sink.count("scroll_depth"), 1);
    }

    #[test]
    fn test_top_of_page_is_not_a_new_depth() {
        let (_, sink, behavior) = setup();

        assert_eq!(behavior.on_scroll(at(0.0)), None);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_time_on_page_rounds_seconds() {
        let (clock, sink, behavior) = setup();

        clock.advance(Duration::from_millis(42_600));
        assert_eq!(behavior.on_unload(), 43);

        let event = sink.last("time_on_page").unwrap();
        assert_eq!(event.param("time_spent").and_then(ParamValue::as_i64), Some(43));
        assert_eq!(
            event.param("page_url").and_then(ParamValue::as_str),
            Some("https://site/news/a")
        );
    }

    #[test]
    fn test_video_events_default_title() {
        let (_, sink, behavior) = setup();
        let untitled = VideoInfo {
            src: "/media/clip.mp4".to_string(),
            title: None,
        };
        let titled = VideoInfo {
            src: "/media/report.mp4".to_string(),
            title: Some("వార్తా నివేదిక".to_string()),
        };

        behavior.on_video(VideoEvent::Play, &untitled);
        behavior.on_video(VideoEvent::Ended, &titled);

        let play = sink.last("video_play").unwrap();
        assert_eq!(play.param("video_title").and_then(ParamValue::as_str), Some("Untitled"));
        let done = sink.last("video_complete").unwrap();
        assert_eq!(done.param("video_title").and_then(ParamValue::as_str), Some("వార్తా నివేదిక"));
        assert_eq!(done.param("video_src").and_then(ParamValue::as_str), Some("/media/report.mp4"));
    }

    #[test]
    fn test_empty_title_counts_as_missing() {
        let video = VideoInfo {
            src: String::new(),
            title: Some(String::new()),
        };
        assert_eq!(video.display_title(), "Untitled");
    }
}
