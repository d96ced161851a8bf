//! Tunables for gesture recognition and manipulation

use serde::{Deserialize, Serialize};

use super::landmarks::PINCH_THRESHOLD;

/// Lower bound for an object's uniform scale
pub const MIN_SCALE: f32 = 0.2;
/// Upper bound for an object's uniform scale
pub const MAX_SCALE: f32 = 5.0;
/// Extra gain applied to the two-hand distance delta
pub const SCALE_GAIN: f32 = 3.0;
/// Radians of rotation per unit of wrist NDC travel, before sensitivity
pub const ROTATE_SPEED: f32 = 4.0;

/// One Euro Filter parameters for hand position smoothing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_cutoff: f32,
    pub beta: f32,
    pub d_cutoff: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.5,
            d_cutoff: 1.0,
        }
    }
}

/// Mapping from hand spread to normalized depth
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Depth used when the 2D spread equals the metric reference
    pub base_offset: f32,
    pub sensitivity: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            base_offset: 0.5,
            sensitivity: 1.0,
            min_z: 0.1,
            max_z: 0.9,
        }
    }
}

/// Configuration for the gesture controller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Thumb-index distance (normalized) below which a hand is pinching
    pub pinch_threshold: f32,
    pub filter: FilterConfig,
    pub depth: DepthConfig,
    pub scale_sensitivity: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub rotate_sensitivity: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: PINCH_THRESHOLD,
            filter: FilterConfig::default(),
            depth: DepthConfig::default(),
            scale_sensitivity: 1.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            rotate_sensitivity: 1.0,
        }
    }
}

impl GestureConfig {
    pub fn rotate_speed(&self) -> f32 {
        ROTATE_SPEED * self.rotate_sensitivity
    }
}
