//! Recording controller delegate
//!
//! Keeps the latest state written for each device plus an ordered log of
//! every call, so tests can assert both "what is the state now" and "what
//! was emitted, how many times".

use glam::Mat4;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::delegate::{
    Button, CapabilityFlags, ControllerDelegate, HapticRequest, TargetRayMode,
};

/// Last state written for one button slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ButtonSnapshot {
    pub button: Button,
    pub immersive_index: Option<u8>,
    pub clicked: bool,
    pub touched: bool,
    pub value: f32,
}

/// Latest known state of one device; `None` means never written
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DeviceSnapshot {
    pub enabled: Option<bool>,
    pub transform: Option<Mat4>,
    pub beam_transform: Option<Mat4>,
    pub immersive_beam_transform: Option<Mat4>,
    pub capability_flags: Option<CapabilityFlags>,
    pub left_handed: Option<bool>,
    pub target_ray_mode: Option<TargetRayMode>,
    pub controller_type: Option<String>,
    pub model_visible: Option<bool>,
    pub hand_visible: Option<bool>,
    pub button_count: Option<usize>,
    pub buttons: Vec<ButtonSnapshot>,
    pub axes: Vec<f32>,
    pub touch_position: Option<[f32; 2]>,
    pub touching: bool,
    pub scrolled_delta: Option<[f32; 2]>,
    pub joints: Vec<Mat4>,
    pub haptic_count: Option<usize>,
}

impl DeviceSnapshot {
    /// Most recently written state for a semantic button
    pub fn button(&self, button: Button) -> Option<&ButtonSnapshot> {
        self.buttons.iter().find(|b| b.button == button)
    }

    pub fn button_at(&self, button: Button, immersive_index: Option<u8>) -> Option<&ButtonSnapshot> {
        self.buttons
            .iter()
            .find(|b| b.button == button && b.immersive_index == immersive_index)
    }
}

/// One delegate call, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordedEvent {
    pub index: usize,
    pub kind: &'static str,
}

#[derive(Debug, Default)]
pub struct RecordingDelegate {
    devices: BTreeMap<usize, DeviceSnapshot>,
    events: Vec<RecordedEvent>,
    haptic_requests: BTreeMap<usize, HapticRequest>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(&self, index: usize) -> Option<&DeviceSnapshot> {
        self.devices.get(&index)
    }

    pub fn devices(&self) -> &BTreeMap<usize, DeviceSnapshot> {
        &self.devices
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn count_events(&self, index: usize, kind: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.index == index && e.kind == kind)
            .count()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Pending haptic request returned by `haptic_feedback`
    pub fn set_haptic_request(&mut self, index: usize, request: HapticRequest) {
        self.haptic_requests.insert(index, request);
    }

    /// All device snapshots as JSON
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.devices)
    }

    fn record(&mut self, index: usize, kind: &'static str) -> &mut DeviceSnapshot {
        self.events.push(RecordedEvent { index, kind });
        self.devices.entry(index).or_default()
    }
}

impl ControllerDelegate for RecordingDelegate {
    fn set_enabled(&mut self, index: usize, enabled: bool) {
        self.record(index, "enabled").enabled = Some(enabled);
    }

    fn set_transform(&mut self, index: usize, transform: Mat4) {
        self.record(index, "transform").transform = Some(transform);
    }

    fn set_beam_transform(&mut self, index: usize, transform: Mat4) {
        self.record(index, "beam_transform").beam_transform = Some(transform);
    }

    fn set_immersive_beam_transform(&mut self, index: usize, transform: Mat4) {
        self.record(index, "immersive_beam_transform")
            .immersive_beam_transform = Some(transform);
    }

    fn set_capability_flags(&mut self, index: usize, flags: CapabilityFlags) {
        self.record(index, "capability_flags").capability_flags = Some(flags);
    }

    fn set_left_handed(&mut self, index: usize, left_handed: bool) {
        self.record(index, "left_handed").left_handed = Some(left_handed);
    }

    fn set_target_ray_mode(&mut self, index: usize, mode: TargetRayMode) {
        self.record(index, "target_ray_mode").target_ray_mode = Some(mode);
    }

    fn set_controller_type(&mut self, index: usize, controller_type: &str) {
        self.record(index, "controller_type").controller_type = Some(controller_type.to_string());
    }

    fn set_model_visible(&mut self, index: usize, visible: bool) {
        self.record(index, "model_visible").model_visible = Some(visible);
    }

    fn set_hand_visible(&mut self, index: usize, visible: bool) {
        self.record(index, "hand_visible").hand_visible = Some(visible);
    }

    fn set_button_count(&mut self, index: usize, count: usize) {
        self.record(index, "button_count").button_count = Some(count);
    }

    fn set_button_state(
        &mut self,
        index: usize,
        button: Button,
        immersive_index: Option<u8>,
        clicked: bool,
        touched: bool,
        value: f32,
    ) {
        let snapshot = ButtonSnapshot {
            button,
            immersive_index,
            clicked,
            touched,
            value,
        };
        let device = self.record(index, "button_state");
        match device
            .buttons
            .iter_mut()
            .find(|b| b.button == button && b.immersive_index == immersive_index)
        {
            Some(existing) => *existing = snapshot,
            None => device.buttons.push(snapshot),
        }
    }

    fn set_axes(&mut self, index: usize, axes: &[f32]) {
        self.record(index, "axes").axes = axes.to_vec();
    }

    fn set_touch_position(&mut self, index: usize, x: f32, y: f32) {
        let device = self.record(index, "touch_position");
        device.touch_position = Some([x, y]);
        device.touching = true;
    }

    fn end_touch(&mut self, index: usize) {
        self.record(index, "end_touch").touching = false;
    }

    fn set_scrolled_delta(&mut self, index: usize, x: f32, y: f32) {
        self.record(index, "scrolled_delta").scrolled_delta = Some([x, y]);
    }

    fn set_select_action_start(&mut self, index: usize) {
        self.record(index, "select_start");
    }

    fn set_select_action_stop(&mut self, index: usize) {
        self.record(index, "select_stop");
    }

    fn set_squeeze_action_start(&mut self, index: usize) {
        self.record(index, "squeeze_start");
    }

    fn set_squeeze_action_stop(&mut self, index: usize) {
        self.record(index, "squeeze_stop");
    }

    fn set_hand_joint_locations(&mut self, index: usize, joints: &[Mat4]) {
        self.record(index, "hand_joints").joints = joints.to_vec();
    }

    fn set_haptic_count(&mut self, index: usize, count: usize) {
        self.record(index, "haptic_count").haptic_count = Some(count);
    }

    fn haptic_feedback(&self, index: usize) -> HapticRequest {
        self.haptic_requests.get(&index).copied().unwrap_or_default()
    }
}
