//! Monocular depth estimation from hand spread
//!
//! The wrist to middle-MCP distance in metric space is fixed for a given hand.
//! Its 2D projection grows as the hand approaches the camera, so comparing the
//! two gives a usable depth signal without a depth sensor.

use super::config::DepthConfig;
use super::landmarks::{distance, distance_3d, Landmark, MIDDLE_MCP, WRIST};

/// Depth estimator calibrated once against the metric palm length
#[derive(Clone, Debug, Default)]
pub struct DepthEstimator {
    /// Metric wrist to middle-MCP distance captured on first engagement
    reference_distance: Option<f32>,
    config: DepthConfig,
}

impl DepthEstimator {
    pub fn new(config: DepthConfig) -> Self {
        Self {
            reference_distance: None,
            config,
        }
    }

    /// Check if calibration has been done
    pub fn is_calibrated(&self) -> bool {
        self.reference_distance.is_some()
    }

    /// Capture the reference from metric landmarks. Later calls are no-ops.
    ///
    /// Returns false if the world landmarks are too short or degenerate.
    pub fn calibrate(&mut self, world: &[Landmark]) -> bool {
        if self.reference_distance.is_some() {
            return true;
        }
        match Self::measure_reference(world) {
            Some(length) => {
                self.commit(length);
                true
            }
            None => false,
        }
    }

    /// Metric wrist to middle-MCP distance, without storing it
    pub fn measure_reference(world: &[Landmark]) -> Option<f32> {
        if world.len() <= MIDDLE_MCP {
            return None;
        }
        let length = distance_3d(&world[WRIST], &world[MIDDLE_MCP]);
        (length > f32::EPSILON).then_some(length)
    }

    /// Store a measured reference unless one is already set
    pub fn commit(&mut self, reference: f32) {
        if self.reference_distance.is_none() {
            log::info!("Depth reference calibrated: {:.4}", reference);
            self.reference_distance = Some(reference);
        }
    }

    /// Normalized depth coordinate for the current 2D hand spread
    ///
    /// Returns None if not calibrated or the landmarks are insufficient.
    pub fn calculate(&self, landmarks: &[Landmark]) -> Option<f32> {
        self.depth_at(self.reference_distance?, landmarks)
    }

    /// Depth against an explicit reference distance
    pub fn depth_at(&self, reference: f32, landmarks: &[Landmark]) -> Option<f32> {
        if landmarks.len() <= MIDDLE_MCP {
            return None;
        }
        let projected = distance(&landmarks[WRIST], &landmarks[MIDDLE_MCP]);
        let diff = reference - projected;
        let z = self.config.base_offset - diff * self.config.sensitivity;
        // clamp() panics on inverted bounds from a hand-edited config
        Some(z.max(self.config.min_z).min(self.config.max_z))
    }

    pub fn reference_distance(&self) -> Option<f32> {
        self.reference_distance
    }
}
