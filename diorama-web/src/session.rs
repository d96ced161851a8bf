//! Tracking session - one gesture controller and one grab machine
//!
//! A session lives from "hand tracking on" to "hand tracking off". Stopping
//! drops all filter, anchor and timer state; starting again builds it fresh.

use serde::{Deserialize, Serialize};

use crate::gesture::{
    Camera, GestureConfig, GestureController, GestureOutput, HandFrame, PerspectiveProjector,
    Projector,
};
use crate::scene::SceneAdapter;
use crate::transfer::{
    GrabTransferMachine, Notification, NotificationCategory, NotificationSink, TransferConfig,
    TransferError, TransferMode, TransferOutcome, TransferState,
};

/// Everything a session is built from
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub gesture: GestureConfig,
    pub transfer: TransferConfig,
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Outcome of one tracking callback
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameResult {
    pub gesture: GestureOutput,
    /// Set on the single frame a held grab completes; the caller runs the transfer
    pub transfer: Option<TransferMode>,
}

pub struct GestureSession<P: Projector = PerspectiveProjector> {
    controller: GestureController<P>,
    grab: GrabTransferMachine,
    selected: Option<String>,
    frames: u64,
}

impl GestureSession<PerspectiveProjector> {
    pub fn start(config: &SessionConfig, sink: &mut dyn NotificationSink) -> Self {
        Self::start_with_projector(config, PerspectiveProjector, sink)
    }
}

impl<P: Projector> GestureSession<P> {
    pub fn start_with_projector(
        config: &SessionConfig,
        projector: P,
        sink: &mut dyn NotificationSink,
    ) -> Self {
        log::info!("Hand tracking started ({} mode)", config.transfer.mode.as_str());
        sink.notify(
            Notification::new(NotificationCategory::HandTrackingStart, "Hand tracking started")
                .with_mode(config.transfer.mode),
        );
        Self {
            controller: GestureController::with_projector(config.gesture.clone(), projector),
            grab: GrabTransferMachine::new(&config.transfer),
            selected: None,
            frames: 0,
        }
    }

    /// End the session. Any transfer still in flight reports into nothing.
    pub fn stop(self, sink: &mut dyn NotificationSink) {
        log::info!("Hand tracking stopped after {} frames", self.frames);
        sink.notify(
            Notification::new(NotificationCategory::HandTrackingStop, "Hand tracking stopped")
                .with_mode(self.grab.mode()),
        );
    }

    /// Run one tracking callback: gestures against the selected object, then
    /// the grab machine. Never blocks and never fails.
    pub fn process_frame<S: SceneAdapter + ?Sized>(
        &mut self,
        frame: &HandFrame,
        scene: &mut S,
        sink: &mut dyn NotificationSink,
    ) -> FrameResult {
        self.frames += 1;
        let poses = self.controller.poses(frame);

        let object = self.selected.as_deref().and_then(|id| scene.transform(id));
        let gesture = self.controller.process(frame, &poses, object.as_ref());
        if let (Some(id), Some(_)) = (self.selected.as_deref(), object) {
            if !gesture.update.is_empty() {
                scene.apply_transform(id, &gesture.update);
            }
        }

        let open_palm = poses.iter().any(|p| p.open_palm);
        let grab = poses.iter().any(|p| p.fist);
        let transfer = self.grab.update(open_palm, grab, frame.timestamp_ms, sink);

        FrameResult { gesture, transfer }
    }

    /// Report the async transfer started from a `FrameResult`
    pub fn finish_transfer(
        &mut self,
        result: Result<TransferOutcome, TransferError>,
        now_ms: f64,
        sink: &mut dyn NotificationSink,
    ) {
        self.grab.finish(result, now_ms, sink);
    }

    pub fn select_object(&mut self, object_id: impl Into<String>) {
        let object_id = object_id.into();
        if self.selected.as_deref() != Some(object_id.as_str()) {
            log::debug!("Selected {}", object_id);
            self.controller.disengage();
            self.selected = Some(object_id);
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.controller.disengage();
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.controller.set_camera(camera);
    }

    pub fn set_transfer_mode(&mut self, mode: TransferMode) -> bool {
        self.grab.set_mode(mode)
    }

    pub fn transfer_state(&self) -> TransferState {
        self.grab.state()
    }

    pub fn transfer_mode(&self) -> TransferMode {
        self.grab.mode()
    }

    pub fn controller(&self) -> &GestureController<P> {
        &self.controller
    }

    pub fn grab_machine(&self) -> &GrabTransferMachine {
        &self.grab
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}
