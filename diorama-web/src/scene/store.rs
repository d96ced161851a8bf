//! Interpolating object store read by the render loop
//!
//! The tracking callback commits targets at inference rate; the render loop
//! eases the displayed transform toward them at display rate.

use std::collections::HashMap;

use super::transform::{SceneAdapter, Transform, TransformUpdate};

/// Fraction of the remaining distance covered per repaint
pub const DEFAULT_INTERPOLATION: f32 = 0.2;

#[derive(Clone, Debug)]
struct SceneObject {
    /// What the renderer shows this repaint
    current: Transform,
    /// Latest committed gesture result
    target: Transform,
}

/// Objects manipulated by gestures, keyed by id
#[derive(Debug, Default)]
pub struct Scene {
    objects: HashMap<String, SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an object, snapping both current and target
    pub fn insert(&mut self, object_id: impl Into<String>, transform: Transform) {
        self.objects.insert(
            object_id.into(),
            SceneObject {
                current: transform,
                target: transform,
            },
        );
    }

    pub fn remove(&mut self, object_id: &str) -> bool {
        self.objects.remove(object_id).is_some()
    }

    pub fn contains(&self, object_id: &str) -> bool {
        self.objects.contains_key(object_id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Transform as currently displayed
    pub fn rendered_transform(&self, object_id: &str) -> Option<Transform> {
        self.objects.get(object_id).map(|o| o.current)
    }

    /// Ease every object toward its target; `factor` is clamped to [0, 1]
    pub fn interpolate(&mut self, factor: f32) {
        let t = factor.clamp(0.0, 1.0);
        for object in self.objects.values_mut() {
            let cur = &mut object.current;
            let tgt = &object.target;
            cur.position = cur.position + (tgt.position - cur.position) * t;
            cur.rotation += (tgt.rotation - cur.rotation) * t;
            cur.scale += (tgt.scale - cur.scale) * t;
        }
    }
}

impl SceneAdapter for Scene {
    /// Committed target, so consecutive drags compose without drift
    fn transform(&self, object_id: &str) -> Option<Transform> {
        self.objects.get(object_id).map(|o| o.target)
    }

    fn apply_transform(&mut self, object_id: &str, update: &TransformUpdate) {
        let Some(object) = self.objects.get_mut(object_id) else {
            log::debug!("Transform for unknown object {}", object_id);
            return;
        };
        if let Some(position) = update.position {
            object.target.position = position;
        }
        if let Some(delta) = update.rotation_delta {
            object.target.rotation.x += delta.x;
            object.target.rotation.y += delta.y;
        }
        if let Some(scale) = update.scale {
            object.target.scale = scale;
        }
    }
}
