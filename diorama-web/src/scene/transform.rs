//! Object transforms and the contract between gesture core and scene

use nalgebra::{Point3, Vector2, Vector3};

/// Placement of one scene object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Point3<f32>,
    /// Euler angles in radians (pitch, yaw, roll)
    pub rotation: Vector3<f32>,
    /// Uniform scale
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: Vector3::zeros(),
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Flat `[px, py, pz, rx, ry, rz, s]` layout handed to the renderer
    pub fn to_array(&self) -> [f32; 7] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
            self.scale,
        ]
    }
}

/// Changes proposed for one frame. Absent fields mean "no update".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformUpdate {
    pub position: Option<Point3<f32>>,
    /// (pitch, yaw) increment in radians
    pub rotation_delta: Option<Vector2<f32>>,
    pub scale: Option<f32>,
}

impl TransformUpdate {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation_delta.is_none() && self.scale.is_none()
    }
}

/// Owner of the actual 3D objects
///
/// The gesture core reads the committed transform of the selected object and
/// proposes updates. Interpolation and rendering stay on the adapter's side.
pub trait SceneAdapter {
    fn transform(&self, object_id: &str) -> Option<Transform>;
    fn apply_transform(&mut self, object_id: &str, update: &TransformUpdate);
}
