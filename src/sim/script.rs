//! Replay scripts for the simulated runtime
//!
//! A script describes the simulated system and then, frame by frame, the
//! action values, poses, tracked hands and haptic requests to feed in.
//!
//! ```yaml
//! system: { name: Oculus Quest2, position_tracking: true }
//! profiles:
//!   left: /interaction_profiles/oculus/touch_controller
//! frames:
//!   - render_mode: immersive
//!     inputs:
//!       - { action: trigger_value, hand: left, value: 0.95 }
//!     poses:
//!       - { action: pointer, hand: left, position: [0.0, 0.0, -0.3] }
//! ```

use anyhow::{Context, Result};
use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::{RecordingDelegate, SimulatedRuntime};
use crate::delegate::{HapticRequest, RenderMode};
use crate::input_source::FrameContext;
use crate::mapping::SystemProperties;
use crate::runtime::{
    AimState, HandJointLocation, HandJoints, Handedness, LocationFlags, Pose, SpaceLocation,
    HAND_JOINT_COUNT,
};
use crate::session::{InputSession, LEFT_DEVICE_INDEX, RIGHT_DEVICE_INDEX};

/// Interaction profile per hand
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HandProfiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
}

/// Value of a button or axis action
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ActionValue {
    Bool(bool),
    Float(f32),
    Vector([f32; 2]),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InputValue {
    /// Registered action name, e.g. `trigger_value` or `axis_thumbstick`
    pub action: String,
    pub hand: Handedness,
    pub value: ActionValue,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PoseValue {
    /// `pointer` or `grip`
    pub action: String,
    pub hand: Handedness,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "default_orientation")]
    pub orientation: Quat,
    /// Position tracked; orientation-only controllers set this to false
    #[serde(default = "default_true")]
    pub tracked: bool,
    /// Pose inactive for this frame
    #[serde(default)]
    pub inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HandValue {
    pub hand: Handedness,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aim: Option<AimState>,
    #[serde(default = "default_joint_radius")]
    pub joint_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HapticValue {
    pub hand: Handedness,
    #[serde(flatten)]
    pub request: HapticRequest,
}

/// Inputs for one frame; anything not mentioned keeps its previous value
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScriptFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_mode: Option<RenderMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<HandProfiles>,
    #[serde(default)]
    pub inputs: Vec<InputValue>,
    #[serde(default)]
    pub poses: Vec<PoseValue>,
    #[serde(default)]
    pub hands: Vec<HandValue>,
    #[serde(default)]
    pub haptics: Vec<HapticValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReplayScript {
    #[serde(default = "default_system")]
    pub system: SystemProperties,
    #[serde(default)]
    pub hand_tracking: bool,
    #[serde(default)]
    pub aim_state: bool,
    #[serde(default)]
    pub profiles: HandProfiles,
    pub frames: Vec<ScriptFrame>,
}

impl ReplayScript {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script: {}", path.display()))?;

        Self::from_yaml(&contents)
            .with_context(|| format!("Failed to load replay script: {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let script: ReplayScript =
            serde_yaml::from_str(yaml).context("Failed to parse replay script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frames.is_empty() {
            anyhow::bail!("Replay script has no frames");
        }
        for (idx, frame) in self.frames.iter().enumerate() {
            for pose in &frame.poses {
                if pose.action != "pointer" && pose.action != "grip" {
                    anyhow::bail!(
                        "Frame {}: pose action '{}' must be 'pointer' or 'grip'",
                        idx,
                        pose.action
                    );
                }
            }
            for hand in &frame.hands {
                if hand.joint_radius < 0.0 {
                    anyhow::bail!("Frame {}: joint_radius cannot be negative", idx);
                }
            }
        }
        Ok(())
    }

    /// Prepare the runtime before the session is created
    pub fn configure_runtime(&self, runtime: &SimulatedRuntime) {
        runtime.set_hand_tracking_support(self.hand_tracking, self.aim_state);
        apply_profiles(runtime, &self.profiles);
    }
}

fn apply_profiles(runtime: &SimulatedRuntime, profiles: &HandProfiles) {
    if let Some(profile) = &profiles.left {
        runtime.set_interaction_profile(Handedness::Left, Some(profile));
    }
    if let Some(profile) = &profiles.right {
        runtime.set_interaction_profile(Handedness::Right, Some(profile));
    }
}

fn device_index(hand: Handedness) -> usize {
    match hand {
        Handedness::Left => LEFT_DEVICE_INDEX,
        Handedness::Right => RIGHT_DEVICE_INDEX,
    }
}

fn hand_joints(value: &HandValue) -> HandJoints {
    let origin = value.aim.map(|a| a.aim_pose.position).unwrap_or(Vec3::ZERO);
    let mut joints = HandJoints {
        is_active: value.active,
        ..HandJoints::default()
    };
    for (i, joint) in joints.joints.iter_mut().enumerate() {
        let offset = Vec3::new(0.0, 0.0, -(i as f32) / HAND_JOINT_COUNT as f32 * 0.15);
        *joint = HandJointLocation {
            pose: Pose::new(Quat::IDENTITY, origin + offset),
            radius: value.joint_radius,
            flags: LocationFlags::TRACKED,
        };
    }
    joints
}

/// Result of one replayed frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame: usize,
    pub render_mode: RenderMode,
    pub devices: serde_json::Value,
}

/// Steps a script through a session, one frame per call
#[derive(Debug)]
pub struct Replay {
    script: ReplayScript,
    next: usize,
    render_mode: RenderMode,
}

impl Replay {
    pub fn new(script: ReplayScript, render_mode: RenderMode) -> Self {
        Self {
            script,
            next: 0,
            render_mode,
        }
    }

    pub fn script(&self) -> &ReplayScript {
        &self.script
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.script.frames.len()
    }

    /// Apply the next frame and run the session; `None` once the script is done
    pub fn step(
        &mut self,
        runtime: &SimulatedRuntime,
        session: &mut InputSession,
        delegate: &mut RecordingDelegate,
    ) -> Result<Option<FrameReport>> {
        let Some(frame) = self.script.frames.get(self.next).cloned() else {
            return Ok(None);
        };
        let frame_number = self.next;
        self.next += 1;

        if let Some(mode) = frame.render_mode {
            self.render_mode = mode;
        }

        for input in &frame.inputs {
            let action = session.registry().handle(&input.action).with_context(|| {
                format!("Frame {}: unknown action '{}'", frame_number, input.action)
            })?;
            match input.value {
                ActionValue::Bool(v) => runtime.set_bool(action, input.hand, v),
                ActionValue::Float(v) => runtime.set_float(action, input.hand, v),
                ActionValue::Vector([x, y]) => runtime.set_vector2(action, input.hand, Vec2::new(x, y)),
            }
        }

        for pose in &frame.poses {
            let action = session.registry().handle(&pose.action).with_context(|| {
                format!("Frame {}: unknown pose action '{}'", frame_number, pose.action)
            })?;
            let location = (!pose.inactive).then(|| SpaceLocation {
                pose: Pose::new(pose.orientation, pose.position),
                flags: if pose.tracked {
                    LocationFlags::TRACKED
                } else {
                    LocationFlags::ORIENTATION_VALID | LocationFlags::ORIENTATION_TRACKED
                },
            });
            runtime.set_pose(action, pose.hand, location);
        }

        for hand in &frame.hands {
            runtime.set_hand_joints(hand.hand, hand_joints(hand));
            runtime.set_aim_state(hand.hand, hand.aim);
        }

        for haptic in &frame.haptics {
            delegate.set_haptic_request(device_index(haptic.hand), haptic.request);
        }

        if let Some(profiles) = &frame.profiles {
            apply_profiles(runtime, profiles);
            session.update_interaction_profiles(runtime, delegate)?;
            info!("Frame {}: interaction profiles updated", frame_number);
        }

        let context = FrameContext {
            time: frame_number as i64 + 1,
            render_mode: self.render_mode,
            ..FrameContext::default()
        };
        session.update(runtime, &context, delegate);
        debug!("Replayed frame {}", frame_number);

        Ok(Some(FrameReport {
            frame: frame_number,
            render_mode: self.render_mode,
            devices: delegate.to_json()?,
        }))
    }
}

fn default_orientation() -> Quat { Quat::IDENTITY }
fn default_true() -> bool { true }
fn default_joint_radius() -> f32 { 0.01 }
fn default_system() -> SystemProperties { SystemProperties::new("Simulated Headset", true) }
