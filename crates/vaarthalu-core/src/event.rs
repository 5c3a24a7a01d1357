//! Analytics events and the sinks they are recorded into.
//!
//! An [`AnalyticsEvent`] serializes to the flat shape tag managers expect:
//! `{"event": name, ...params}`.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use serde::{Deserialize, Serialize};

/// A parameter value. Primitives are typed; arrays and objects (GA4
/// `items`, for instance) are carried through as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// `null`, or `undefined` from JavaScript.
    Null,
    Json(serde_json::Value),
}

impl ParamValue {
    /// Borrow the value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

/// Event parameters, ordered for stable serialization.
pub type Params = BTreeMap<String, ParamValue>;

/// A single analytics record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// Event name.
    #[serde(rename = "event")]
    pub name: String,

    /// Event parameters, flattened next to the name.
    #[serde(flatten)]
    pub params: Params,
}

impl AnalyticsEvent {
    /// Create an event without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
        }
    }

    /// Create an event with the given parameters.
    pub fn with_params(name: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a parameter only when a value is present.
    #[must_use]
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl Into<ParamValue>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Look up a parameter.
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }
}

/// Destination for analytics events.
///
/// Sinks are append-only; an event once recorded is never withdrawn.
pub trait EventSink {
    fn record(&self, event: AnalyticsEvent);
}

impl<T: EventSink + ?Sized> EventSink for Rc<T> {
    fn record(&self, event: AnalyticsEvent) {
        (**self).record(event);
    }
}

/// In-memory sink used by tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<AnalyticsEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded event, in order.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.borrow().clone()
    }

    /// Names of every recorded event, in order.
    pub fn names(&self) -> Vec<String> {
        self.events.borrow().iter().map(|e| e.name.clone()).collect()
    }

    /// Number of events recorded under `name`.
    pub fn count(&self, name: &str) -> usize {
        self.events.borrow().iter().filter(|e| e.name == name).count()
    }

    /// Most recent event recorded under `name`.
    pub fn last(&self, name: &str) -> Option<AnalyticsEvent> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find(|e| e.name == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: AnalyticsEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_event_serializes_flat() {
        let event = AnalyticsEvent::new("share")
            .with("method", "whatsapp")
            .with("depth_percentage", 40u32);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "share");
        assert_eq!(json["method"], "whatsapp");
        assert_eq!(json["depth_percentage"], 40);
    }

    #[test]
    fn test_event_without_params() {
        let event = AnalyticsEvent::new("article_25_percent_read");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"article_25_percent_read"}"#);
    }

    #[test]
    fn test_with_opt_skips_missing_values() {
        let event = AnalyticsEvent::new("ad_click")
            .with_opt("ad_position", Some("sidebar"))
            .with_opt("ad_type", None::<&str>);

        assert_eq!(event.param("ad_position"), Some(&ParamValue::from("sidebar")));
        assert!(event.param("ad_type").is_none());
    }

    #[test]
    fn test_event_round_trips_from_data_layer_shape() {
        let json = r#"{"event":"time_on_page","time_spent":42,"page_url":"https://x/a"}"#;
        let event: AnalyticsEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.name, "time_on_page");
        assert_eq!(event.param("time_spent").and_then(ParamValue::as_i64), Some(42));
    }

    #[test]
    fn test_params_accept_null_and_nested_values() {
        let params: Params = serde_json::from_value(json!({
            "coupon": null,
            "items": [{ "item_id": "a-1", "quantity": 2 }],
            "value": 9.5,
        }))
        .unwrap();

        assert_eq!(params["coupon"], ParamValue::Null);
        assert_eq!(
            params["items"],
            ParamValue::Json(json!([{ "item_id": "a-1", "quantity": 2 }]))
        );

        let event = AnalyticsEvent::with_params("purchase", params);
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "purchase",
                "coupon": null,
                "items": [{ "item_id": "a-1", "quantity": 2 }],
                "value": 9.5,
            })
        );
    }

    #[test]
    fn test_memory_sink_keeps_duplicates_in_order() {
        let sink = MemorySink::new();
        sink.record(AnalyticsEvent::new("a"));
        sink.record(AnalyticsEvent::new("b"));
        sink.record(AnalyticsEvent::new("a"));

        assert_eq!(sink.names(), vec!["a", "b", "a"]);
        assert_eq!(sink.count("a"), 2);
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn test_rc_sink_forwards() {
        let sink = Rc::new(MemorySink::new());
        let shared: Rc<dyn EventSink> = sink.clone();
        shared.record(AnalyticsEvent::new("page_view"));

        assert_eq!(sink.count("page_view"), 1);
    }
}
