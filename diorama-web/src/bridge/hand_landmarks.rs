//! Hand tracking bridge
//!
//! JavaScript pushes one flat landmark batch per tracker callback. The
//! session, the scene store and the JS callbacks live in thread-local state
//! (WASM is single-threaded). Notifications raised while that state is
//! borrowed are queued and delivered after the borrow ends.

use std::cell::RefCell;

use js_sys::Function;
use nalgebra::{Point3, Vector3};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::error::BridgeError;
use super::notifications;
use super::transfer::{JsTransferBackend, TransferHooks};
use crate::gesture::{Camera, GestureMode, HandFrame, Landmark, TrackedHand, HAND_LANDMARK_COUNT};
use crate::scene::{Scene, Transform, DEFAULT_INTERPOLATION};
use crate::session::{GestureSession, SessionConfig};
use crate::transfer::{
    run_transfer, Notification, TransferError, TransferMode, TransferOutcome, TransferState,
};

/// The tracker reports at most two hands
pub const MAX_HANDS: usize = 2;

/// Floats per hand in a flat batch (21 landmarks × xyz)
const HAND_STRIDE: usize = HAND_LANDMARK_COUNT * 3;

// ============================================================================
// STATE
// ============================================================================

#[derive(Default)]
struct BridgeState {
    config: SessionConfig,
    session: Option<GestureSession>,
    /// Bumped on every start/stop so late transfer results can be recognised
    generation: u64,
    scene: Scene,
    camera: Option<Camera>,
    selected: Option<String>,
    last_mode: GestureMode,
    handler: Option<Function>,
    hooks: Option<TransferHooks>,
}

thread_local! {
    static BRIDGE: RefCell<BridgeState> = RefCell::new(BridgeState::default());
}

/// Borrow the bridge state, then deliver whatever notifications `f` queued
fn with_state<R>(f: impl FnOnce(&mut BridgeState, &mut Vec<Notification>) -> R) -> R {
    let (result, pending, handler) = BRIDGE.with(|cell| {
        let mut state = cell.borrow_mut();
        let mut pending = Vec::new();
        let result = f(&mut state, &mut pending);
        (result, pending, state.handler.clone())
    });
    notifications::dispatch(handler.as_ref(), pending);
    result
}

// ============================================================================
// PARSING
// ============================================================================

fn read_hand(flat: &[f32], hand: usize) -> Option<[Landmark; HAND_LANDMARK_COUNT]> {
    let chunk = flat.get(hand * HAND_STRIDE..(hand + 1) * HAND_STRIDE)?;
    let mut landmarks = [Landmark::default(); HAND_LANDMARK_COUNT];
    for (lm, xyz) in landmarks.iter_mut().zip(chunk.chunks_exact(3)) {
        *lm = Landmark::new(xyz[0], xyz[1], xyz[2]);
    }
    Some(landmarks)
}

/// Split flat `[x, y, z, ...]` batches into hands. A hand whose data is
/// truncated is dropped; world landmarks are attached only when complete.
pub(crate) fn parse_hand_frame(
    flat: &[f32],
    world: &[f32],
    num_hands: usize,
    timestamp_ms: f64,
) -> HandFrame {
    let hands = (0..num_hands.min(MAX_HANDS))
        .filter_map(|h| {
            let Some(landmarks) = read_hand(flat, h) else {
                log::warn!("Hand {} truncated ({} floats), skipping", h, flat.len());
                return None;
            };
            let hand = TrackedHand::new(landmarks);
            Some(match read_hand(world, h) {
                Some(w) => hand.with_world(w),
                None => hand,
            })
        })
        .collect();
    HandFrame::new(hands, timestamp_ms)
}

fn point3(values: &[f32], what: &'static str) -> Result<Point3<f32>, BridgeError> {
    match values {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(BridgeError::InvalidCamera(what)),
    }
}

// ============================================================================
// LIFECYCLE & CONFIG
// ============================================================================

/// Replace the session configuration (JSON). Applies from the next start.
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let config = SessionConfig::from_json(json).map_err(BridgeError::from)?;
    with_state(|state, _| {
        if state.session.is_some() {
            log::info!("Configuration stored, takes effect on next start");
        }
        state.config = config;
    });
    Ok(())
}

#[wasm_bindgen]
pub fn start_hand_tracking() {
    with_state(|state, pending| {
        if let Some(old) = state.session.take() {
            old.stop(pending);
        }
        let mut session = GestureSession::start(&state.config, pending);
        session.set_camera(state.camera.clone());
        if let Some(id) = state.selected.as_deref() {
            session.select_object(id);
        }
        state.session = Some(session);
        state.generation += 1;
        state.last_mode = GestureMode::None;
    });
}

#[wasm_bindgen]
pub fn stop_hand_tracking() {
    with_state(|state, pending| {
        if let Some(session) = state.session.take() {
            session.stop(pending);
            state.generation += 1;
        }
        state.last_mode = GestureMode::None;
    });
}

#[wasm_bindgen]
pub fn is_tracking() -> bool {
    with_state(|state, _| state.session.is_some())
}

// ============================================================================
// PER-FRAME
// ============================================================================

/// Tracker callback entry point.
///
/// `flat_data` holds `num_hands × 63` image-normalized floats; `world_data`
/// holds the matching metric landmarks or is empty.
#[wasm_bindgen]
pub fn apply_hand_landmarks(flat_data: &[f32], world_data: &[f32], num_hands: usize) {
    let frame = parse_hand_frame(flat_data, world_data, num_hands, js_sys::Date::now());

    let fired = with_state(|state, pending| {
        let session = state.session.as_mut()?;
        let result = session.process_frame(&frame, &mut state.scene, pending);
        state.last_mode = result.gesture.mode;
        let mode = result.transfer?;
        Some((mode, state.generation, state.hooks.clone()))
    });

    if let Some((mode, generation, hooks)) = fired {
        start_transfer(mode, generation, hooks);
    }
}

fn start_transfer(mode: TransferMode, generation: u64, hooks: Option<TransferHooks>) {
    let Some(hooks) = hooks else {
        let err = TransferError::Js("transfer hooks not set".to_string());
        finish_transfer(generation, Err(err));
        return;
    };
    spawn_local(async move {
        let backend = JsTransferBackend::new(hooks);
        let result = run_transfer(&backend, mode).await;
        finish_transfer(generation, result);
    });
}

fn finish_transfer(generation: u64, result: Result<TransferOutcome, TransferError>) {
    let now = js_sys::Date::now();
    with_state(|state, pending| {
        if state.generation != generation {
            log::debug!("Dropping transfer result from a stopped session");
            return;
        }
        if let Some(session) = state.session.as_mut() {
            session.finish_transfer(result, now, pending);
        }
    });
}

/// Advance the render-side interpolation; call once per repaint
#[wasm_bindgen]
pub fn render_tick(factor: Option<f32>) {
    with_state(|state, _| {
        state
            .scene
            .interpolate(factor.unwrap_or(DEFAULT_INTERPOLATION))
    });
}

// ============================================================================
// SCENE & CAMERA
// ============================================================================

#[wasm_bindgen]
pub fn set_camera(
    eye: &[f32],
    target: &[f32],
    up: &[f32],
    fov_y_deg: f32,
    aspect: f32,
    near: f32,
    far: f32,
) -> Result<(), JsValue> {
    let eye = point3(eye, "eye needs 3 components")?;
    let target = point3(target, "target needs 3 components")?;
    let up = point3(up, "up needs 3 components")?;
    let camera = Camera::look_at(
        eye,
        target,
        Vector3::new(up.x, up.y, up.z),
        fov_y_deg.to_radians(),
        aspect,
        near,
        far,
    )
    .ok_or(BridgeError::InvalidCamera("degenerate view or frustum"))?;

    with_state(|state, _| {
        if let Some(session) = state.session.as_mut() {
            session.set_camera(Some(camera.clone()));
        }
        state.camera = Some(camera);
    });
    Ok(())
}

#[wasm_bindgen]
pub fn add_object(object_id: &str, x: f32, y: f32, z: f32, scale: f32) {
    let transform = Transform {
        scale,
        ..Transform::at(Point3::new(x, y, z))
    };
    with_state(|state, _| state.scene.insert(object_id, transform));
}

#[wasm_bindgen]
pub fn remove_object(object_id: &str) -> bool {
    with_state(|state, _| {
        if state.selected.as_deref() == Some(object_id) {
            state.selected = None;
            if let Some(session) = state.session.as_mut() {
                session.clear_selection();
            }
        }
        state.scene.remove(object_id)
    })
}

#[wasm_bindgen]
pub fn select_object(object_id: &str) {
    with_state(|state, _| {
        if !state.scene.contains(object_id) {
            log::warn!("Selecting unknown object {}", object_id);
        }
        if let Some(session) = state.session.as_mut() {
            session.select_object(object_id);
        }
        state.selected = Some(object_id.to_string());
    });
}

#[wasm_bindgen]
pub fn clear_selection() {
    with_state(|state, _| {
        state.selected = None;
        if let Some(session) = state.session.as_mut() {
            session.clear_selection();
        }
    });
}

/// `[px, py, pz, rx, ry, rz, s]` as currently rendered
#[wasm_bindgen]
pub fn get_object_transform(object_id: &str) -> Option<Vec<f32>> {
    with_state(|state, _| {
        state
            .scene
            .rendered_transform(object_id)
            .map(|t| t.to_array().to_vec())
    })
}

// ============================================================================
// READOUTS & HOOKS
// ============================================================================

/// "NONE", "MOVE", "SCALE" or "ROTATE"
#[wasm_bindgen]
pub fn get_active_gesture() -> String {
    with_state(|state, _| state.last_mode.name().to_string())
}

#[wasm_bindgen]
pub fn get_transfer_state() -> String {
    with_state(|state, _| {
        state
            .session
            .as_ref()
            .map_or(TransferState::Idle, |s| s.transfer_state())
            .as_str()
            .to_string()
    })
}

/// "send" or "receive"
#[wasm_bindgen]
pub fn set_transfer_mode(mode: &str) -> Result<(), JsValue> {
    let mode = TransferMode::parse(mode).ok_or_else(|| BridgeError::InvalidMode(mode.to_string()))?;
    with_state(|state, _| {
        if let Some(session) = state.session.as_mut() {
            if !session.set_transfer_mode(mode) {
                return Err(BridgeError::TransferInFlight);
            }
        }
        state.config.transfer.mode = mode;
        Ok(())
    })?;
    Ok(())
}

/// `handler({ category, message, mode })` receives every status event
#[wasm_bindgen]
pub fn set_notification_handler(handler: Option<Function>) {
    with_state(|state, _| state.handler = handler);
}

/// Install `{ exportModel, upload, getLatestFileId, download, importModel }`
#[wasm_bindgen]
pub fn set_transfer_hooks(hooks: JsValue) -> Result<(), JsValue> {
    let hooks = TransferHooks::from_js(&hooks)?;
    with_state(|state, _| state.hooks = Some(hooks));
    Ok(())
}
