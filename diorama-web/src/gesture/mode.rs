//! Per-frame manipulation mode classification
//!
//! Each hand is summarised once into a [`HandPose`]; the frame's mode is then
//! chosen by fixed priority: two pinches scale, one pinch moves, a Spider-Man
//! pose with no pinch rotates.

use super::landmarks::{is_fist, is_open_palm, is_pinching_with, is_spiderman, Landmark};

/// Predicate results for one hand
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandPose {
    pub pinching: bool,
    pub open_palm: bool,
    pub fist: bool,
    pub spiderman: bool,
}

impl HandPose {
    pub fn from_landmarks(landmarks: &[Landmark], pinch_threshold: f32) -> Self {
        Self {
            pinching: is_pinching_with(landmarks, pinch_threshold),
            open_palm: is_open_palm(landmarks),
            fist: is_fist(landmarks),
            spiderman: is_spiderman(landmarks),
        }
    }
}

/// Mutually exclusive manipulation modes. Hand fields index into the frame's hands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GestureMode {
    #[default]
    None,
    Move { hand: usize },
    Scale { first: usize, second: usize },
    Rotate { hand: usize },
}

impl GestureMode {
    /// Classify a frame from its per-hand poses
    pub fn classify(poses: &[HandPose]) -> Self {
        let mut pinching = poses
            .iter()
            .enumerate()
            .filter(|(_, p)| p.pinching)
            .map(|(i, _)| i);

        match (pinching.next(), pinching.next()) {
            (Some(first), Some(second)) => GestureMode::Scale { first, second },
            (Some(hand), None) => GestureMode::Move { hand },
            _ => poses
                .iter()
                .position(|p| p.spiderman)
                .map_or(GestureMode::None, |hand| GestureMode::Rotate { hand }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GestureMode::None => "NONE",
            GestureMode::Move { .. } => "MOVE",
            GestureMode::Scale { .. } => "SCALE",
            GestureMode::Rotate { .. } => "ROTATE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PINCH: HandPose = HandPose {
        pinching: true,
        open_palm: false,
        fist: false,
        spiderman: false,
    };
    const SPIDER: HandPose = HandPose {
        pinching: false,
        open_palm: false,
        fist: false,
        spiderman: true,
    };
    const IDLE: HandPose = HandPose {
        pinching: false,
        open_palm: true,
        fist: false,
        spiderman: false,
    };

    #[test]
    fn no_hands_is_none() {
        assert_eq!(GestureMode::classify(&[]), GestureMode::None);
        assert_eq!(GestureMode::classify(&[IDLE, IDLE]), GestureMode::None);
    }

    #[test]
    fn two_pinches_scale() {
        assert_eq!(
            GestureMode::classify(&[PINCH, PINCH]),
            GestureMode::Scale { first: 0, second: 1 }
        );
    }

    #[test]
    fn single_pinch_moves_with_that_hand() {
        assert_eq!(GestureMode::classify(&[IDLE, PINCH]), GestureMode::Move { hand: 1 });
    }

    #[test]
    fn pinch_beats_spiderman() {
        assert_eq!(GestureMode::classify(&[SPIDER, PINCH]), GestureMode::Move { hand: 1 });
        let both = HandPose { pinching: true, spiderman: true, ..Default::default() };
        assert_eq!(GestureMode::classify(&[both]), GestureMode::Move { hand: 0 });
    }

    #[test]
    fn spiderman_without_pinch_rotates() {
        assert_eq!(GestureMode::classify(&[IDLE, SPIDER]), GestureMode::Rotate { hand: 1 });
    }

    #[test]
    fn names() {
        assert_eq!(GestureMode::None.name(), "NONE");
        assert_eq!(GestureMode::Scale { first: 0, second: 1 }.name(), "SCALE");
    }
}
