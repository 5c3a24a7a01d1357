//! Browser tests for the JavaScript boundary.

use js_sys::{Array, JSON, Reflect};
use vaarthalu_core::ParamValue;
use vaarthalu_web::{
    config_from_js,
    page::{start_page, track_event},
    params_from_js,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_missing_config_uses_defaults() {
    let config = config_from_js(JsValue::UNDEFINED).unwrap();
    assert_eq!(config.worker.cache_name, "telugu-news-v1");

    let config = config_from_js(JsValue::NULL).unwrap();
    assert_eq!(config.push.prompt_delay_ms, 10_000);
}

#[wasm_bindgen_test]
fn test_partial_config_keeps_other_defaults() {
    let value = JSON::parse(r#"{"push": {"prompt_delay_ms": 5000}}"#).unwrap();

    let config = config_from_js(value).unwrap();

    assert_eq!(config.push.prompt_delay_ms, 5_000);
    assert_eq!(config.push.flag_key, "pushPrompted");
    assert_eq!(config.ads.refresh_interval_ms, 30_000);
}

#[wasm_bindgen_test]
fn test_invalid_config_is_rejected() {
    let value = JSON::parse(r#"{"progress": {"milestones": [50, 25]}}"#).unwrap();
    assert!(config_from_js(value).is_err());
}

#[wasm_bindgen_test]
fn test_params_keep_null_and_nested_values() {
    let value = JSON::parse(r#"{"coupon": null, "items": [{"item_id": "a-1"}]}"#).unwrap();

    let params = params_from_js(value);

    assert_eq!(params["coupon"], ParamValue::Null);
    assert!(matches!(params["items"], ParamValue::Json(_)));
}

#[wasm_bindgen_test]
fn test_non_object_params_are_dropped() {
    assert!(params_from_js(JsValue::from_str("not a map")).is_empty());
    assert!(params_from_js(JsValue::UNDEFINED).is_empty());
}

fn data_layer() -> Array {
    let window = web_sys::window().unwrap();
    Reflect::get(&window, &JsValue::from_str("dataLayer"))
        .unwrap()
        .dyn_into()
        .unwrap()
}

fn event_name(entry: &JsValue) -> Option<String> {
    Reflect::get(entry, &JsValue::from_str("event"))
        .ok()
        .and_then(|name| name.as_string())
}

#[wasm_bindgen_test]
fn test_start_page_runs_once_and_tracks_any_params() {
    start_page(JsValue::UNDEFINED).unwrap();
    start_page(JsValue::UNDEFINED).unwrap();

    let page_views = data_layer()
        .iter()
        .filter(|entry| event_name(entry).as_deref() == Some("page_view"))
        .count();
    assert_eq!(page_views, 1);

    let params = JSON::parse(r#"{"coupon": null, "items": [{"item_id": "a-1"}]}"#).unwrap();
    track_event("coupon_applied", params);

    let last = data_layer().pop();
    assert_eq!(event_name(&last).as_deref(), Some("coupon_applied"));
    assert!(Reflect::get(&last, &JsValue::from_str("coupon")).unwrap().is_null());
    assert!(Array::is_array(
        &Reflect::get(&last, &JsValue::from_str("items")).unwrap()
    ));
}
