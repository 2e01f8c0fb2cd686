//! B612 WASM Web Runtime
//!
//! Orchestrates the desert → moon → flower field narrative over an A-Frame
//! scene: gates fired by clicks, VR triggers or fallback timers, world
//! switches, the day/night cycle, the golden-hour sunset, the flyover, and
//! the audio cues that go with them. Rendering and input capture stay with
//! the host framework.

#[cfg(target_arch = "wasm32")]
mod app;
pub mod ambient;
pub mod audio;
pub mod config;
pub mod error;
pub mod gate;
pub mod input;
pub mod narrative;
pub mod scene;
pub mod sequence;
pub mod task;
pub mod timeline;
pub mod timer;
pub mod world;

#[cfg(test)]
mod testing;

pub use config::NarrativeConfig;
pub use error::{Error, Result};
pub use narrative::Experience;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Called when the WASM module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("B612 Web Runtime initialized");
}

/// Create the experience once the document is ready.
///
/// `config_toml` overrides any subset of the defaults.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn create_app(config_toml: Option<String>) -> std::result::Result<app::App, JsValue> {
    let config = match config_toml {
        Some(source) => NarrativeConfig::from_toml_str(&source)
            .map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => NarrativeConfig::default(),
    };
    app::App::new(config)
}
