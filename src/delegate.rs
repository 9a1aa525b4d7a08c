//! Consumer-facing controller delegate
//!
//! Every resolved value leaves the crate through [`ControllerDelegate`].
//! Device indices are the caller's; the resolver never interprets them.

use bitflags::bitflags;
use glam::Mat4;
use serde::{Deserialize, Serialize};

/// xr-standard gamepad button slots
pub const IMMERSIVE_BUTTON_TRIGGER: u8 = 0;
pub const IMMERSIVE_BUTTON_SQUEEZE: u8 = 1;
pub const IMMERSIVE_BUTTON_TOUCHPAD: u8 = 2;
pub const IMMERSIVE_BUTTON_THUMBSTICK: u8 = 3;
pub const IMMERSIVE_BUTTON_A: u8 = 4;
pub const IMMERSIVE_BUTTON_B: u8 = 5;
pub const IMMERSIVE_BUTTON_THUMBREST: u8 = 6;

/// xr-standard gamepad axis slots
pub const IMMERSIVE_AXIS_TOUCHPAD_X: usize = 0;
pub const IMMERSIVE_AXIS_TOUCHPAD_Y: usize = 1;
pub const IMMERSIVE_AXIS_THUMBSTICK_X: usize = 2;
pub const IMMERSIVE_AXIS_THUMBSTICK_Y: usize = 3;

/// Semantic button as understood by the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Trigger,
    Squeeze,
    Touchpad,
    App,
    A,
    B,
    X,
    Y,
    Others,
}

/// How the consumer renders the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Regular browsing; poses are lifted to eye height
    #[default]
    Standalone,
    /// Immersive session; select/squeeze notifications are emitted
    Immersive,
}

/// Target ray mode reported to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetRayMode {
    Gaze,
    TrackedPointer,
    Screen,
}

bitflags! {
    /// Pose capabilities of a device for the current frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CapabilityFlags: u16 {
        const ORIENTATION = 1 << 0;
        const POSITION = 1 << 1;
        const POSITION_EMULATED = 1 << 2;
        const GRIP_SPACE_POSITION = 1 << 3;
    }
}

/// Pending haptic request pulled from the consumer each frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HapticRequest {
    /// Frame the pulse was requested on, 0 for "none"
    pub frame_id: u64,
    /// Pulse duration in seconds
    pub duration: f32,
    /// Pulse intensity in [0, 1]
    pub intensity: f32,
}

/// Receiver of resolved per-device controller state
///
/// Mirrors the controller delegate of the host application: the resolver
/// pushes state, and pulls pending haptic requests.
pub trait ControllerDelegate {
    fn set_enabled(&mut self, index: usize, enabled: bool);
    fn set_transform(&mut self, index: usize, transform: Mat4);
    fn set_beam_transform(&mut self, index: usize, transform: Mat4);
    fn set_immersive_beam_transform(&mut self, index: usize, transform: Mat4);
    fn set_capability_flags(&mut self, index: usize, flags: CapabilityFlags);
    fn set_left_handed(&mut self, index: usize, left_handed: bool);
    fn set_target_ray_mode(&mut self, index: usize, mode: TargetRayMode);
    fn set_controller_type(&mut self, index: usize, controller_type: &str);
    fn set_model_visible(&mut self, index: usize, visible: bool);
    fn set_hand_visible(&mut self, index: usize, visible: bool);

    fn set_button_count(&mut self, index: usize, count: usize);
    /// `immersive_index` is `None` for buttons without an xr-standard slot
    fn set_button_state(
        &mut self,
        index: usize,
        button: Button,
        immersive_index: Option<u8>,
        clicked: bool,
        touched: bool,
        value: f32,
    );
    fn set_axes(&mut self, index: usize, axes: &[f32]);
    fn set_touch_position(&mut self, index: usize, x: f32, y: f32);
    fn end_touch(&mut self, index: usize);
    fn set_scrolled_delta(&mut self, index: usize, x: f32, y: f32);

    fn set_select_action_start(&mut self, index: usize);
    fn set_select_action_stop(&mut self, index: usize);
    fn set_squeeze_action_start(&mut self, index: usize);
    fn set_squeeze_action_stop(&mut self, index: usize);

    fn set_hand_joint_locations(&mut self, index: usize, joints: &[Mat4]);

    fn set_haptic_count(&mut self, index: usize, count: usize);
    fn haptic_feedback(&self, index: usize) -> HapticRequest;
}
