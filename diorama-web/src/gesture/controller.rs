//! Gesture controller - hand poses to object transforms
//!
//! One controller per tracking session. Each frame it classifies the active
//! mode, runs exactly that mode's handler and clears the continuity state of
//! the others, so a stale scale or anchor never leaks into the next gesture.
//!
//! Handlers return `None` for "no update this frame": missing landmarks, an
//! unset camera or an unavailable projector are never errors.

use nalgebra::{Point2, Point3, Vector2};

use super::config::{GestureConfig, SCALE_GAIN};
use super::depth::DepthEstimator;
use super::landmarks::{distance, HandFrame, TrackedHand, MIDDLE_MCP, WRIST};
use super::mode::{GestureMode, HandPose};
use super::one_euro::OneEuroFilter3D;
use super::projector::{to_ndc, Camera, PerspectiveProjector, Projector};
use crate::scene::{Transform, TransformUpdate};

/// Hand and object positions captured on the frame a pinch begins
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchAnchor {
    pub hand: Point3<f32>,
    pub object: Point3<f32>,
}

/// Continuity state owned by one controller
#[derive(Debug, Default)]
pub struct GestureState {
    /// Holds the metric wrist to middle-MCP reference once captured
    depth: DepthEstimator,
    last_scale_dist: Option<f32>,
    is_rotating: bool,
    last_rotation_pos: Option<Point2<f32>>,
    target_position: Option<Point3<f32>>,
    target_scale: Option<f32>,
    rotation_x: f32,
    rotation_y: f32,
    filters: OneEuroFilter3D,
    /// Set exactly once per pinch engagement, cleared exactly once on release
    pinch: Option<PinchAnchor>,
    mode: GestureMode,
    /// Suppresses repeated warnings while the camera/projector stays unavailable
    projection_warned: bool,
}

impl GestureState {
    fn new(config: &GestureConfig) -> Self {
        Self {
            depth: DepthEstimator::new(config.depth.clone()),
            filters: OneEuroFilter3D::from_config(&config.filter),
            ..Default::default()
        }
    }
}

/// Result of one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureOutput {
    pub mode: GestureMode,
    pub update: TransformUpdate,
}

/// Stateful per-session gesture engine
pub struct GestureController<P: Projector = PerspectiveProjector> {
    config: GestureConfig,
    projector: P,
    camera: Option<Camera>,
    state: GestureState,
}

impl GestureController<PerspectiveProjector> {
    pub fn new(config: GestureConfig) -> Self {
        Self::with_projector(config, PerspectiveProjector)
    }
}

impl<P: Projector> GestureController<P> {
    pub fn with_projector(config: GestureConfig, projector: P) -> Self {
        let state = GestureState::new(&config);
        Self {
            config,
            projector,
            camera: None,
            state,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Summarise every hand in the frame
    pub fn poses(&self, frame: &HandFrame) -> Vec<HandPose> {
        frame
            .hands
            .iter()
            .map(|h| HandPose::from_landmarks(&h.landmarks, self.config.pinch_threshold))
            .collect()
    }

    /// Run one tracking frame.
    ///
    /// `poses` must be parallel to `frame.hands`; `object` is the committed
    /// transform of the selected object, if any.
    pub fn process(
        &mut self,
        frame: &HandFrame,
        poses: &[HandPose],
        object: Option<&Transform>,
    ) -> GestureOutput {
        let mode = GestureMode::classify(poses);
        if mode.name() != self.state.mode.name() {
            log::debug!("Gesture mode {} -> {}", self.state.mode.name(), mode.name());
        }
        self.state.mode = mode;

        let t = frame.timestamp_ms / 1000.0;
        let mut update = TransformUpdate::default();

        match mode {
            GestureMode::Move { hand } => {
                self.end_scaling();
                self.end_rotation();
                update.position =
                    self.handle_movement(frame.hands.get(hand), object.map(|o| o.position), t);
            }
            GestureMode::Scale { first, second } => {
                self.release_pinch();
                self.end_rotation();
                if let (Some(a), Some(b)) = (frame.hands.get(first), frame.hands.get(second)) {
                    update.scale = self.handle_scaling(a, b, object.map(|o| o.scale));
                }
            }
            GestureMode::Rotate { hand } => {
                self.release_pinch();
                self.end_scaling();
                update.rotation_delta = self.handle_rotation(frame.hands.get(hand));
            }
            GestureMode::None => {
                self.release_pinch();
                self.end_scaling();
                self.end_rotation();
            }
        }

        GestureOutput { mode, update }
    }

    /// Drop every engagement so the next frame starts fresh (e.g. the
    /// selected object changed). Accumulated rotation and depth calibration survive.
    pub fn disengage(&mut self) {
        self.release_pinch();
        self.end_scaling();
        self.end_rotation();
        self.state.mode = GestureMode::None;
    }

    // ========================================================================
    // MOVEMENT
    // ========================================================================

    /// Relative drag: the object moves by the same delta the pinched hand has
    /// moved since the pinch began. `None` hand means the pinch is over.
    pub fn handle_movement(
        &mut self,
        hand: Option<&TrackedHand>,
        object_position: Option<Point3<f32>>,
        t: f64,
    ) -> Option<Point3<f32>> {
        let Some(hand) = hand else {
            self.release_pinch();
            return None;
        };

        let world_point = self.hand_world_position(hand)?;
        let filtered = self.state.filters.filter(t, world_point);

        let anchor = *self.state.pinch.get_or_insert_with(|| {
            log::debug!("Pinch engaged at ({:.3}, {:.3}, {:.3})", filtered.x, filtered.y, filtered.z);
            PinchAnchor {
                hand: filtered,
                object: object_position.unwrap_or(filtered),
            }
        });

        let target = anchor.object + (filtered - anchor.hand);
        self.state.target_scale = None;
        self.state.target_position = Some(target);
        Some(target)
    }

    /// Middle-MCP lifted into the scene. Commits the depth reference only once
    /// the whole computation has succeeded.
    fn hand_world_position(&mut self, hand: &TrackedHand) -> Option<Point3<f32>> {
        let Some(camera) = self.camera.as_ref() else {
            self.warn_projection("camera not set");
            return None;
        };

        let reference = match self.state.depth.reference_distance() {
            Some(r) => r,
            None => {
                let Some(world) = hand.world.as_ref() else {
                    log::debug!("Waiting for world landmarks to calibrate depth");
                    return None;
                };
                DepthEstimator::measure_reference(world)?
            }
        };
        let z = self.state.depth.depth_at(reference, &hand.landmarks)?;
        let ndc = to_ndc(&hand.landmarks[MIDDLE_MCP]);

        let Some(point) = self.projector.unproject(&Point3::new(ndc.x, ndc.y, z), camera) else {
            self.warn_projection("projection unavailable");
            return None;
        };

        self.state.depth.commit(reference);
        self.state.projection_warned = false;
        Some(point)
    }

    fn warn_projection(&mut self, reason: &str) {
        if !self.state.projection_warned {
            log::warn!("Skipping movement update: {}", reason);
            self.state.projection_warned = true;
        }
    }

    fn release_pinch(&mut self) {
        if self.state.pinch.take().is_some() {
            self.state.filters.reset();
            log::debug!("Pinch released");
        }
        self.state.target_position = None;
    }

    // ========================================================================
    // SCALING
    // ========================================================================

    /// Two-hand pinch scaling from the change in middle-MCP separation.
    ///
    /// The first frame only records the distance. Updates are multiplicative
    /// and saturate at the configured bounds.
    pub fn handle_scaling(
        &mut self,
        first: &TrackedHand,
        second: &TrackedHand,
        object_scale: Option<f32>,
    ) -> Option<f32> {
        let dist = distance(&first.landmarks[MIDDLE_MCP], &second.landmarks[MIDDLE_MCP]);
        let last = self.state.last_scale_dist.replace(dist)?;

        let delta = dist - last;
        let factor = 1.0 + delta * self.config.scale_sensitivity * SCALE_GAIN;
        let base = self.state.target_scale.or(object_scale).unwrap_or(1.0);
        let scale = (base * factor)
            .max(self.config.min_scale)
            .min(self.config.max_scale);

        self.state.target_position = None;
        self.state.target_scale = Some(scale);
        Some(scale)
    }

    fn end_scaling(&mut self) {
        self.state.last_scale_dist = None;
        self.state.target_scale = None;
    }

    // ========================================================================
    // ROTATION
    // ========================================================================

    /// Spider-Man rotation: wrist travel in NDC integrates into yaw (horizontal)
    /// and pitch (vertical). Returns the (pitch, yaw) increment for this frame.
    pub fn handle_rotation(&mut self, hand: Option<&TrackedHand>) -> Option<Vector2<f32>> {
        let Some(hand) = hand else {
            self.end_rotation();
            return None;
        };
        let pos = to_ndc(&hand.landmarks[WRIST]);

        if !self.state.is_rotating {
            self.state.is_rotating = true;
            self.state.last_rotation_pos = Some(pos);
            return None;
        }

        let last = self.state.last_rotation_pos.replace(pos)?;
        let speed = self.config.rotate_speed();
        let delta = Vector2::new((pos.y - last.y) * speed, (pos.x - last.x) * speed);

        self.state.rotation_x += delta.x;
        self.state.rotation_y += delta.y;
        Some(delta)
    }

    fn end_rotation(&mut self) {
        self.state.is_rotating = false;
        self.state.last_rotation_pos = None;
    }

    // ========================================================================
    // READOUTS
    // ========================================================================

    pub fn mode(&self) -> GestureMode {
        self.state.mode
    }

    pub fn target_position(&self) -> Option<Point3<f32>> {
        self.state.target_position
    }

    pub fn target_scale(&self) -> Option<f32> {
        self.state.target_scale
    }

    /// Accumulated (pitch, yaw) since the controller was created
    pub fn rotation(&self) -> (f32, f32) {
        (self.state.rotation_x, self.state.rotation_y)
    }

    pub fn is_pinching(&self) -> bool {
        self.state.pinch.is_some()
    }

    pub fn is_rotating(&self) -> bool {
        self.state.is_rotating
    }

    pub fn pinch_anchor(&self) -> Option<PinchAnchor> {
        self.state.pinch
    }

    pub fn world_reference_distance(&self) -> Option<f32> {
        self.state.depth.reference_distance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::fixtures::*;
    use crate::gesture::landmarks::is_pinching;
    use crate::gesture::one_euro::OneEuroFilter3D;
    use crate::gesture::projector::stub::{camera, IdentityProjector, UnavailableProjector};

    fn controller() -> GestureController<IdentityProjector> {
        let mut c = GestureController::with_projector(GestureConfig::default(), IdentityProjector);
        c.set_camera(Some(camera()));
        c
    }

    fn pinching_hand(x: f32, y: f32) -> TrackedHand {
        TrackedHand::new(pinch_at(x, y)).with_world(world())
    }

    fn frame(hands: Vec<TrackedHand>, ms: f64) -> HandFrame {
        HandFrame::new(hands, ms)
    }

    fn run<P: Projector>(c: &mut GestureController<P>, f: &HandFrame, object: Option<&Transform>) -> GestureOutput {
        let poses = c.poses(f);
        c.process(f, &poses, object)
    }

    #[test]
    fn single_pinch_moves_and_nulls_scale() {
        let mut c = controller();
        let hand = pinching_hand(0.40, 0.40);
        assert!(is_pinching(&hand.landmarks));

        let out = run(&mut c, &frame(vec![hand], 0.0), None);
        assert_eq!(out.mode, GestureMode::Move { hand: 0 });
        assert!(out.update.position.is_some());
        assert_eq!(out.update.scale, None);
        assert_eq!(c.target_scale(), None);
        assert!(c.is_pinching());
    }

    #[test]
    fn relative_drag_is_exact() {
        let mut c = controller();
        let cfg = GestureConfig::default();
        let origin = Point3::origin();

        // Mirror the controller's pipeline with an independent filter
        let mut reference = OneEuroFilter3D::from_config(&cfg.filter);
        let mut expected_hand = |hand: &TrackedHand, ms: f64| {
            let mut depth = DepthEstimator::new(cfg.depth.clone());
            depth.calibrate(hand.world.as_ref().unwrap());
            let z = depth.calculate(&hand.landmarks).unwrap();
            let ndc = to_ndc(&hand.landmarks[MIDDLE_MCP]);
            reference.filter(ms / 1000.0, Point3::new(ndc.x, ndc.y, z))
        };

        let h0 = pinching_hand(0.40, 0.40);
        let h1 = pinching_hand(0.46, 0.37);
        let p0 = expected_hand(&h0, 0.0);
        let p1 = expected_hand(&h1, 33.0);

        let first = c.handle_movement(Some(&h0), Some(origin), 0.0).unwrap();
        assert_eq!(first, origin);
        let anchor = c.pinch_anchor().unwrap();
        assert_eq!(anchor.hand, p0);
        assert_eq!(anchor.object, origin);

        let second = c.handle_movement(Some(&h1), Some(origin), 0.033).unwrap();
        assert_eq!(second, Point3::from(p1 - p0));
    }

    #[test]
    fn anchor_falls_back_to_hand_position() {
        let mut c = controller();
        let hand = pinching_hand(0.3, 0.3);
        let target = c.handle_movement(Some(&hand), None, 0.0).unwrap();
        let anchor = c.pinch_anchor().unwrap();
        assert_eq!(anchor.object, anchor.hand);
        assert_eq!(target, anchor.hand);
    }

    #[test]
    fn anchor_captured_once_and_cleared_on_release() {
        let mut c = controller();
        let obj = Transform::at(Point3::new(1.0, 2.0, 3.0));
        run(&mut c, &frame(vec![pinching_hand(0.4, 0.4)], 0.0), Some(&obj));
        let anchor = c.pinch_anchor().unwrap();

        let moved = Transform::at(Point3::new(-5.0, 0.0, 0.0));
        run(&mut c, &frame(vec![pinching_hand(0.42, 0.4)], 33.0), Some(&moved));
        assert_eq!(c.pinch_anchor().unwrap(), anchor);

        let out = run(&mut c, &frame(vec![TrackedHand::new(neutral())], 66.0), Some(&moved));
        assert_eq!(out.mode, GestureMode::None);
        assert!(c.pinch_anchor().is_none());
        assert_eq!(c.target_position(), None);

        run(&mut c, &frame(vec![pinching_hand(0.42, 0.4)], 99.0), Some(&moved));
        assert_eq!(c.pinch_anchor().unwrap().object, moved.position);
    }

    #[test]
    fn missing_camera_leaves_state_untouched() {
        let mut c = GestureController::with_projector(GestureConfig::default(), IdentityProjector);
        assert!(c.camera().is_none());
        let out = run(&mut c, &frame(vec![pinching_hand(0.4, 0.4)], 0.0), None);
        assert_eq!(out.mode, GestureMode::Move { hand: 0 });
        assert_eq!(out.update.position, None);
        assert!(!c.is_pinching());
        assert_eq!(c.world_reference_distance(), None);

        c.set_camera(Some(camera()));
        assert!(c.camera().is_some());
        let out = run(&mut c, &frame(vec![pinching_hand(0.4, 0.4)], 33.0), None);
        assert!(out.update.position.is_some());
        assert!(c.is_pinching());
    }

    #[test]
    fn unavailable_projector_leaves_state_untouched() {
        let mut c = GestureController::with_projector(GestureConfig::default(), UnavailableProjector);
        c.set_camera(Some(camera()));
        let hand = pinching_hand(0.4, 0.4);
        assert_eq!(c.handle_movement(Some(&hand), None, 0.0), None);
        assert!(!c.is_pinching());
        assert_eq!(c.world_reference_distance(), None);
    }

    #[test]
    fn calibration_needs_world_landmarks() {
        let mut c = controller();
        let bare = TrackedHand::new(pinch_at(0.4, 0.4));
        assert_eq!(c.handle_movement(Some(&bare), None, 0.0), None);
        assert!(c.handle_movement(Some(&pinching_hand(0.4, 0.4)), None, 0.0).is_some());
        let reference = c.world_reference_distance().unwrap();
        assert!((reference - 0.09).abs() < 1e-6);

        // After calibration, world landmarks are optional
        assert!(c.handle_movement(Some(&bare), None, 0.05).is_some());
    }

    #[test]
    fn double_pinch_scales_exclusively() {
        let mut c = controller();
        let obj = Transform::default();

        // Start with a single-pinch drag so there is something to clear
        run(&mut c, &frame(vec![pinching_hand(0.3, 0.5)], 0.0), Some(&obj));
        assert!(c.target_position().is_some());

        let f1 = frame(vec![pinching_hand(0.3, 0.5), pinching_hand(0.6, 0.5)], 33.0);
        let out = run(&mut c, &f1, Some(&obj));
        assert_eq!(out.mode, GestureMode::Scale { first: 0, second: 1 });
        assert_eq!(out.update.scale, None);
        assert_eq!(out.update.position, None);
        assert_eq!(out.update.rotation_delta, None);
        assert!(!c.is_pinching());
        assert_eq!(c.target_position(), None);

        let f2 = frame(vec![pinching_hand(0.2, 0.5), pinching_hand(0.7, 0.5)], 66.0);
        let out = run(&mut c, &f2, Some(&obj));
        let scale = out.update.scale.unwrap();
        // separation grew by 0.2 -> 1 + 0.2 * 3
        assert!((scale - 1.6).abs() < 1e-4);
        assert_eq!(out.update.position, None);
        assert_eq!(out.update.rotation_delta, None);
    }

    #[test]
    fn scaling_uses_object_scale_as_base() {
        let mut c = controller();
        let a = pinching_hand(0.3, 0.5);
        let b = pinching_hand(0.5, 0.5);
        assert_eq!(c.handle_scaling(&a, &b, Some(2.0)), None);
        let scale = c.handle_scaling(&a, &b, Some(2.0)).unwrap();
        assert!((scale - 2.0).abs() < 1e-6);
    }

    #[test]
    fn scaling_saturates_at_bounds() {
        let cfg = GestureConfig {
            scale_sensitivity: 5.0,
            ..Default::default()
        };
        let mut c = GestureController::with_projector(cfg, IdentityProjector);
        let (min, max) = (c.config().min_scale, c.config().max_scale);
        let left = pinching_hand(0.05, 0.5);
        let mut spread = 0.05;
        c.handle_scaling(&left, &pinching_hand(spread, 0.5), None);

        let mut scale = 0.0;
        for _ in 0..20 {
            spread += 0.02;
            scale = c.handle_scaling(&left, &pinching_hand(spread, 0.5), None).unwrap();
            assert!(scale <= max);
        }
        assert_eq!(scale, max);

        for _ in 0..7 {
            spread -= 0.05;
            scale = c.handle_scaling(&left, &pinching_hand(spread, 0.5), None).unwrap();
            assert!(scale >= min);
        }
        assert_eq!(scale, min);
    }

    #[test]
    fn scaling_restarts_after_release() {
        let mut c = controller();
        let two = frame(vec![pinching_hand(0.3, 0.5), pinching_hand(0.6, 0.5)], 0.0);
        run(&mut c, &two, None);
        run(&mut c, &frame(vec![], 33.0), None);
        let out = run(&mut c, &two, None);
        assert_eq!(out.update.scale, None);
    }

    #[test]
    fn rotation_anchors_then_accumulates() {
        let mut c = controller();
        let mut hand = TrackedHand::new(spiderman());

        let out = run(&mut c, &frame(vec![hand.clone()], 0.0), None);
        assert_eq!(out.mode, GestureMode::Rotate { hand: 0 });
        assert_eq!(out.update.rotation_delta, None);
        assert!(c.is_rotating());

        // Shift the whole hand right by 0.1 (NDC x -0.2 after mirroring)
        for lm in hand.landmarks.iter_mut() {
            lm.x += 0.1;
        }
        let out = run(&mut c, &frame(vec![hand.clone()], 33.0), None);
        let delta = out.update.rotation_delta.unwrap();
        assert!(delta.x.abs() < 1e-6);
        assert!((delta.y + 0.8).abs() < 1e-5);

        // Holding still holds rotation
        let out = run(&mut c, &frame(vec![hand.clone()], 66.0), None);
        assert_eq!(out.update.rotation_delta, Some(Vector2::zeros()));
        let (pitch, yaw) = c.rotation();
        assert!(pitch.abs() < 1e-6);
        assert!((yaw + 0.8).abs() < 1e-5);
    }

    #[test]
    fn rotation_reanchors_after_loss() {
        let mut c = controller();
        let hand = TrackedHand::new(spiderman());
        run(&mut c, &frame(vec![hand.clone()], 0.0), None);
        run(&mut c, &frame(vec![], 33.0), None);
        assert!(!c.is_rotating());

        let mut far = hand.clone();
        for lm in far.landmarks.iter_mut() {
            lm.y -= 0.3;
        }
        let out = run(&mut c, &frame(vec![far], 66.0), None);
        assert_eq!(out.update.rotation_delta, None);
        assert_eq!(c.rotation(), (0.0, 0.0));
    }

    #[test]
    fn pinch_wins_over_spiderman_on_other_hand() {
        let mut c = controller();
        let f = frame(vec![TrackedHand::new(spiderman()), pinching_hand(0.4, 0.4)], 0.0);
        let out = run(&mut c, &f, None);
        assert_eq!(out.mode, GestureMode::Move { hand: 1 });
        assert_eq!(out.update.rotation_delta, None);
        assert!(!c.is_rotating());
    }

    #[test]
    fn no_hands_clears_targets() {
        let mut c = controller();
        run(&mut c, &frame(vec![pinching_hand(0.4, 0.4)], 0.0), None);
        let out = run(&mut c, &HandFrame::empty(33.0), None);
        assert_eq!(out.mode, GestureMode::None);
        assert!(out.update.is_empty());
        assert_eq!(c.target_position(), None);
        assert_eq!(c.target_scale(), None);
    }

    #[test]
    fn disengage_keeps_rotation_totals() {
        let mut c = controller();
        run(&mut c, &frame(vec![TrackedHand::new(spiderman())], 0.0), None);
        let mut moved = spiderman();
        moved[WRIST].x -= 0.05;
        run(&mut c, &frame(vec![TrackedHand::new(moved)], 33.0), None);
        let totals = c.rotation();
        assert!(totals.1 > 0.0);

        c.disengage();
        assert!(!c.is_rotating());
        assert_eq!(c.mode(), GestureMode::None);
        assert_eq!(c.rotation(), totals);
    }
}
