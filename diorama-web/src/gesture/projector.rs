//! Screen-to-world projection
//!
//! The controller never talks to a rendering engine. It receives a
//! [`Projector`] capability and the current [`Camera`], and asks for NDC
//! points to be lifted back into the scene.

use nalgebra::{Isometry3, Perspective3, Point2, Point3, Vector3};

use super::landmarks::Landmark;

/// Viewing camera as seen by the gesture pipeline
#[derive(Clone, Debug)]
pub struct Camera {
    /// World → camera transform
    view: Isometry3<f32>,
    projection: Perspective3<f32>,
}

impl Camera {
    /// Build a right-handed look-at camera.
    ///
    /// Returns None for a degenerate frustum (non-positive aspect, near plane at
    /// or behind the eye, far not beyond near) or when eye and target coincide.
    pub fn look_at(
        eye: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Option<Self> {
        let valid = aspect > 0.0
            && near > 0.0
            && far > near
            && fov_y > 0.0
            && fov_y < std::f32::consts::PI
            && (target - eye).norm() > f32::EPSILON
            && up.norm() > f32::EPSILON;
        if !valid {
            return None;
        }
        Some(Self {
            view: Isometry3::look_at_rh(&eye, &target, &up),
            projection: Perspective3::new(aspect, fov_y, near, far),
        })
    }

    pub fn view(&self) -> &Isometry3<f32> {
        &self.view
    }

    pub fn projection(&self) -> &Perspective3<f32> {
        &self.projection
    }

    pub fn eye(&self) -> Point3<f32> {
        self.view.inverse_transform_point(&Point3::origin())
    }
}

/// Lifts a normalized device coordinate into world space
pub trait Projector {
    fn unproject(&self, ndc: &Point3<f32>, camera: &Camera) -> Option<Point3<f32>>;
}

/// Default projector built on the camera's own perspective matrix
#[derive(Clone, Copy, Debug, Default)]
pub struct PerspectiveProjector;

impl Projector for PerspectiveProjector {
    fn unproject(&self, ndc: &Point3<f32>, camera: &Camera) -> Option<Point3<f32>> {
        let view_space = camera.projection.unproject_point(ndc);
        let world = camera.view.inverse_transform_point(&view_space);
        world.coords.iter().all(|c| c.is_finite()).then_some(world)
    }
}

/// Image-normalized landmark → NDC, mirrored horizontally for a selfie camera
pub fn to_ndc(landmark: &Landmark) -> Point2<f32> {
    Point2::new((1.0 - landmark.x) * 2.0 - 1.0, -(landmark.y * 2.0 - 1.0))
}


#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Point3<f32>, b: &Point3<f32>) -> bool {
        (a - b).norm() < 1e-3
    }

    #[test]
    fn ndc_mirrors_x_and_flips_y() {
        let centre = to_ndc(&Landmark::new(0.5, 0.5, 0.0));
        assert_eq!(centre, Point2::new(0.0, 0.0));

        let top_left = to_ndc(&Landmark::new(0.0, 0.0, 0.0));
        assert_eq!(top_left, Point2::new(1.0, 1.0));

        let bottom_right = to_ndc(&Landmark::new(1.0, 1.0, 0.0));
        assert_eq!(bottom_right, Point2::new(-1.0, -1.0));
    }

    #[test]
    fn unproject_centre_lies_on_view_axis() {
        let cam = stub::camera();
        let p = PerspectiveProjector
            .unproject(&Point3::new(0.0, 0.0, 0.5), &cam)
            .unwrap();
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!(p.z < 5.0);
    }

    #[test]
    fn unproject_near_plane() {
        let cam = stub::camera();
        let p = PerspectiveProjector
            .unproject(&Point3::new(0.0, 0.0, -1.0), &cam)
            .unwrap();
        assert!(close(&p, &Point3::new(0.0, 0.0, 4.9)));
    }

    #[test]
    fn unproject_round_trips_through_projection() {
        let cam = stub::camera();
        let world = Point3::new(0.4, -0.3, 1.0);
        let ndc = cam.projection().project_point(&cam.view().transform_point(&world));
        let back = PerspectiveProjector.unproject(&ndc, &cam).unwrap();
        assert!(close(&back, &world));
    }

    #[test]
    fn degenerate_camera_rejected() {
        let eye = Point3::new(0.0, 0.0, 5.0);
        assert!(Camera::look_at(eye, Point3::origin(), Vector3::y(), 1.0, 0.0, 0.1, 10.0).is_none());
        assert!(Camera::look_at(eye, Point3::origin(), Vector3::y(), 1.0, 1.0, 1.0, 1.0).is_none());
        assert!(Camera::look_at(eye, eye, Vector3::y(), 1.0, 1.0, 0.1, 10.0).is_none());
    }

    #[test]
    fn eye_recovered_from_view() {
        let cam = stub::camera();
        assert!(close(&cam.eye(), &Point3::new(0.0, 0.0, 5.0)));
    }
}
