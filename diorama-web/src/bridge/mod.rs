//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod error;
mod hand_landmarks;
mod logger;
mod notifications;
mod transfer;

pub use error::BridgeError;
pub use hand_landmarks::{
    // Lifecycle
    configure,
    start_hand_tracking,
    stop_hand_tracking,
    is_tracking,
    // Per-frame
    apply_hand_landmarks,
    render_tick,
    // Scene
    set_camera,
    add_object,
    remove_object,
    select_object,
    clear_selection,
    get_object_transform,
    // Readouts & hooks
    get_active_gesture,
    get_transfer_state,
    set_transfer_mode,
    set_notification_handler,
    set_transfer_hooks,
    // Constants
    MAX_HANDS,
};
pub use logger::{init_logger, set_log_level};
