//! Conversions at the JavaScript boundary.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;
use vaarthalu_core::{Config, Params, PortError};
use wasm_bindgen::{JsCast, JsValue};

/// Best-effort message for a thrown JavaScript value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

pub(crate) fn dom_error(value: JsValue) -> PortError {
    PortError::Dom(js_error_message(&value))
}

pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Timer delay in whole milliseconds, saturating at `u32::MAX`.
pub(crate) fn timer_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// Serialize to plain JavaScript objects (maps become objects).
pub(crate) fn to_plain_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

/// Read a configuration object. `undefined` or `null` selects the defaults.
pub fn config_from_js(value: JsValue) -> Result<Config, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(Config::default());
    }

    let config: Config = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
    config.validate().map_err(to_js_error)?;
    Ok(config)
}

/// Read event parameters. Anything that is not an object yields no
/// parameters rather than an error.
pub fn params_from_js(value: JsValue) -> Params {
    if value.is_undefined() || value.is_null() {
        return Params::new();
    }

    serde_wasm_bindgen::from_value(value).unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unreadable event parameters");
        Params::new()
    })
}
