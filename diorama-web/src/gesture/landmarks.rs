//! Hand landmark geometry
//!
//! Pure predicates over one hand's 21 MediaPipe landmarks. Every comparison is
//! wrist-relative, so classification holds up regardless of hand orientation or
//! distance from the camera.

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Landmarks per tracked hand
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Thumb-tip to index-tip distance (normalized image units) below which a hand
/// counts as pinching. Drives both move and scale, so it is tune-sensitive.
pub const PINCH_THRESHOLD: f32 = 0.05;

/// (tip, proximal joint) per finger: thumb, index, middle, ring, pinky
const FINGERS: [(usize, usize); 5] = [
    (THUMB_TIP, THUMB_IP),
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A single hand landmark.
///
/// Image-normalized landmarks have x/y in [0, 1] and z as relative depth.
/// World landmarks use the same shape in the tracker's metric hand space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One detected hand for the current frame
#[derive(Clone, Debug)]
pub struct TrackedHand {
    pub landmarks: [Landmark; HAND_LANDMARK_COUNT],
    /// Metric landmarks with identical indexing, when the tracker supplies them
    pub world: Option<[Landmark; HAND_LANDMARK_COUNT]>,
}

impl TrackedHand {
    pub fn new(landmarks: [Landmark; HAND_LANDMARK_COUNT]) -> Self {
        Self { landmarks, world: None }
    }

    pub fn with_world(mut self, world: [Landmark; HAND_LANDMARK_COUNT]) -> Self {
        self.world = Some(world);
        self
    }
}

/// Everything the tracker delivered in one inference callback (0-2 hands)
#[derive(Clone, Debug, Default)]
pub struct HandFrame {
    pub hands: Vec<TrackedHand>,
    /// Callback time in milliseconds
    pub timestamp_ms: f64,
}

impl HandFrame {
    pub fn new(hands: Vec<TrackedHand>, timestamp_ms: f64) -> Self {
        Self { hands, timestamp_ms }
    }

    pub fn empty(timestamp_ms: f64) -> Self {
        Self { hands: Vec::new(), timestamp_ms }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Planar distance between two landmarks (z ignored)
pub fn distance(a: &Landmark, b: &Landmark) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Distance in all three axes, used for metric world landmarks
pub fn distance_3d(a: &Landmark, b: &Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Tip farther from the wrist than its proximal joint
fn is_extended(landmarks: &[Landmark], tip: usize, joint: usize) -> bool {
    let wrist = &landmarks[WRIST];
    distance(&landmarks[tip], wrist) > distance(&landmarks[joint], wrist)
}

/// Tip closer to the wrist than its proximal joint
fn is_curled(landmarks: &[Landmark], tip: usize, joint: usize) -> bool {
    let wrist = &landmarks[WRIST];
    distance(&landmarks[tip], wrist) < distance(&landmarks[joint], wrist)
}

// ============================================================================
// GESTURE PREDICATES
// ============================================================================

/// Thumb and index tips closer than [`PINCH_THRESHOLD`]
pub fn is_pinching(landmarks: &[Landmark]) -> bool {
    is_pinching_with(landmarks, PINCH_THRESHOLD)
}

/// Pinch test against a caller-supplied threshold
pub fn is_pinching_with(landmarks: &[Landmark], threshold: f32) -> bool {
    if landmarks.len() <= INDEX_TIP {
        return false;
    }
    distance(&landmarks[THUMB_TIP], &landmarks[INDEX_TIP]) < threshold
}

/// All five fingers extended
pub fn is_open_palm(landmarks: &[Landmark]) -> bool {
    if landmarks.len() < HAND_LANDMARK_COUNT {
        return false;
    }
    FINGERS
        .iter()
        .all(|&(tip, joint)| is_extended(landmarks, tip, joint))
}

/// All five fingers curled
pub fn is_fist(landmarks: &[Landmark]) -> bool {
    if landmarks.len() < HAND_LANDMARK_COUNT {
        return false;
    }
    FINGERS
        .iter()
        .all(|&(tip, joint)| is_curled(landmarks, tip, joint))
}

/// Index and pinky extended, middle and ring curled. Thumb is ignored.
pub fn is_spiderman(landmarks: &[Landmark]) -> bool {
    if landmarks.len() < HAND_LANDMARK_COUNT {
        return false;
    }
    is_extended(landmarks, INDEX_TIP, INDEX_PIP)
        && is_extended(landmarks, PINKY_TIP, PINKY_PIP)
        && is_curled(landmarks, MIDDLE_TIP, MIDDLE_PIP)
        && is_curled(landmarks, RING_TIP, RING_PIP)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn pinch_detected_below_threshold() {
        let mut lm = neutral();
        lm[THUMB_TIP] = Landmark::new(0.40, 0.40, 0.0);
        lm[INDEX_TIP] = Landmark::new(0.41, 0.41, 0.0);
        assert!(is_pinching(&lm));

        lm[INDEX_TIP] = Landmark::new(0.50, 0.40, 0.0);
        assert!(!is_pinching(&lm));
    }

    #[test]
    fn pinch_only_needs_nine_points() {
        let lm = pinch_at(0.3, 0.3);
        assert!(is_pinching(&lm[..9]));
        assert!(!is_pinching(&lm[..8]));
    }

    #[test]
    fn pose_predicates_need_full_hand() {
        let palm = open_palm();
        assert!(is_open_palm(&palm));
        assert!(!is_open_palm(&palm[..20]));
        assert!(!is_fist(&fist()[..20]));
        assert!(!is_spiderman(&spiderman()[..20]));
        assert!(!is_open_palm(&[]));
    }

    #[test]
    fn poses_are_distinct() {
        assert!(is_open_palm(&open_palm()));
        assert!(!is_fist(&open_palm()));
        assert!(!is_spiderman(&open_palm()));

        assert!(is_fist(&fist()));
        assert!(!is_open_palm(&fist()));
        assert!(!is_spiderman(&fist()));

        assert!(is_spiderman(&spiderman()));
        assert!(!is_open_palm(&spiderman()));
        assert!(!is_fist(&spiderman()));

        let n = neutral();
        assert!(!is_open_palm(&n) && !is_fist(&n) && !is_spiderman(&n) && !is_pinching(&n));
    }

    #[test]
    fn spiderman_ignores_thumb() {
        let mut ext = [true, true, false, false, true];
        assert!(is_spiderman(&hand(ext)));
        ext[0] = false;
        assert!(is_spiderman(&hand(ext)));
    }

    #[test]
    fn trailing_points_do_not_change_results() {
        let mut padded = spiderman().to_vec();
        padded.push(Landmark::new(9.0, 9.0, 9.0));
        padded.push(Landmark::new(-3.0, 0.2, 1.0));
        assert!(is_spiderman(&padded));
        assert!(!is_open_palm(&padded));

        padded.swap(21, 22);
        assert!(is_spiderman(&padded));
        assert!(!is_fist(&padded));
    }

    #[test]
    fn unrelated_points_do_not_change_results() {
        // DIP joints and MCPs other than the middle one are never read
        let mut lm = open_palm();
        for idx in [THUMB_CMC, THUMB_MCP, INDEX_MCP, INDEX_DIP, MIDDLE_DIP, RING_MCP, RING_DIP, PINKY_MCP, PINKY_DIP] {
            lm[idx] = Landmark::new(0.0, 0.0, 5.0);
        }
        assert!(is_open_palm(&lm));
    }

    #[test]
    fn distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(3.0, 4.0, 100.0);
        assert!((distance(&a, &b) - 5.0).abs() < 1e-6);
        assert!(distance_3d(&a, &b) > 100.0);
    }
}
