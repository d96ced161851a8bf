//! Gesture module - landmark geometry, filtering and the gesture controller
//!
//! Re-exports only. All logic in submodules.

mod config;
mod controller;
mod depth;
mod landmarks;
mod mode;
mod one_euro;
mod projector;

pub use config::{
    DepthConfig, FilterConfig, GestureConfig, MAX_SCALE, MIN_SCALE, ROTATE_SPEED, SCALE_GAIN,
};
pub use controller::{GestureController, GestureOutput, GestureState, PinchAnchor};
pub use depth::DepthEstimator;
pub use landmarks::{
    distance, distance_3d, is_fist, is_open_palm, is_pinching, is_pinching_with, is_spiderman,
    HandFrame, Landmark, TrackedHand, HAND_LANDMARK_COUNT, PINCH_THRESHOLD,
    // Indices
    WRIST, THUMB_CMC, THUMB_MCP, THUMB_IP, THUMB_TIP,
    INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP,
    MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP,
    RING_MCP, RING_PIP, RING_DIP, RING_TIP,
    PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP,
};
pub use mode::{GestureMode, HandPose};
pub use one_euro::{LowPassFilter, OneEuroFilter, OneEuroFilter3D};
pub use projector::{to_ndc, Camera, PerspectiveProjector, Projector};

#[cfg(test)]
pub(crate) use landmarks::fixtures;
#[cfg(test)]
pub(crate) use projector::stub as projector_stub;
