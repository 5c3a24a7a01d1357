//! Vaarthalu Web Runtime
//!
//! Browser bindings for the engagement features and the offline worker.
//!
//! # Example (JavaScript)
//!
//! Built with `wasm-pack build --target no-modules` so the same bundle
//! loads in the page and in the service worker.
//!
//! ```javascript
//! await wasm_bindgen('/pkg/vaarthalu_web_bg.wasm');
//! wasm_bindgen.startPage(window.VAARTHALU_CONFIG);
//!
//! document.querySelector('.push-allow')
//!     .addEventListener('click', () => wasm_bindgen.requestPushPermission());
//! ```
//!
//! The service worker side is driven by `js/sw.js`, which registers the
//! lifecycle listeners and forwards each event to the exported handlers.

pub mod page;
pub mod worker;

mod convert;

pub use convert::{config_from_js, params_from_js};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
///
/// Installs the panic hook and routes `tracing` output to the console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        // Already initialized by an earlier instance in this context.
        return;
    }
    log::debug!("vaarthalu {} loaded", env!("CARGO_PKG_VERSION"));
}

/// Get the version of the runtime.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
