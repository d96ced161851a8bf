//! Diorama Web - hand-gesture manipulation core
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen entry points that delegate to submodules
//!
//! Per tracker callback: landmarks → gesture classification → gesture
//! controller (1€-filtered targets) → scene store, with the grab-and-hold
//! transfer machine fed from the same frame.

mod bridge;
pub mod gesture;
pub mod scene;
pub mod session;
pub mod transfer;

use wasm_bindgen::prelude::*;

pub use bridge::*;
pub use session::{FrameResult, GestureSession, SessionConfig};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    init_logger(log::LevelFilter::Info);
    log::info!("Diorama gesture core loaded");
}
