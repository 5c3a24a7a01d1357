//! Event tracker shared by every component.

use std::rc::Rc;

use tracing::debug;
use vaarthalu_core::{AnalyticsEvent, EventSink, Params};

/// Appends analytics events to the page's event queue.
#[derive(Clone)]
pub struct EventTracker {
    sink: Rc<dyn EventSink>,
}

impl EventTracker {
    pub fn new(sink: Rc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Record `{event: name}`.
    pub fn track(&self, name: &str) {
        self.emit(AnalyticsEvent::new(name));
    }

    /// Record `{event: name, ...params}`. Parameters are not validated.
    pub fn track_with(&self, name: &str, params: Params) {
        self.emit(AnalyticsEvent::with_params(name, params));
    }

    /// Record a pre-built event.
    pub fn emit(&self, event: AnalyticsEvent) {
        debug!(event = %event.name, params = event.params.len(), "tracking event");
        self.sink.record(event);
    }
}

#[cfg(test)]
mod tests {
    use vaarthalu_core::{MemorySink, ParamValue};

    use super::*;

    #[test]
    fn test_track_without_params() {
        let sink = Rc::new(MemorySink::new());
        let tracker = EventTracker::new(sink.clone());

        tracker.track("push_notification_enabled");

        let event = sink.last("push_notification_enabled").unwrap();
        assert!(event.params.is_empty());
    }

    #[test]
    fn test_track_with_params() {
        let sink = Rc::new(MemorySink::new());
        let tracker = EventTracker::new(sink.clone());

        let mut params = Params::new();
        params.insert("method".to_string(), ParamValue::from("website_form"));
        tracker.track_with("newsletter_signup", params);

        let event = sink.last("newsletter_signup").unwrap();
        assert_eq!(event.param("method"), Some(&ParamValue::from("website_form")));
    }
}
