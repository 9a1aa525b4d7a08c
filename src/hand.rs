//! Controller emulation from articulated hand tracking
//!
//! Every frame [`HandEmulator::track`] locates the hand joints and the aim
//! summary and moves the tracking state machine:
//!
//! ```text
//!   NoHand ──joints active──▶ HandTrackedNoAim ──aim valid──▶ HandTrackedWithAim
//!     ▲                              │                               │
//!     └──────── tracking lost ───────┴───────────────────────────────┘
//! ```
//!
//! Only `HandTrackedWithAim` produces output; `HandTrackedNoAim` leaves the
//! device untouched for the frame.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Mat4, Vec3};
use tracing::{debug, info, warn};

use crate::delegate::{
    Button, CapabilityFlags, ControllerDelegate, RenderMode, IMMERSIVE_BUTTON_SQUEEZE,
    IMMERSIVE_BUTTON_THUMBREST, IMMERSIVE_BUTTON_TRIGGER,
};
use crate::error::InputError;
use crate::resolver::DeviceLatches;
use crate::runtime::{
    AimState, AimStatus, HandJoints, HandTrackerHandle, Handedness, LocationFlags, Pose,
    XrRuntime,
};

/// Default pinch strength at which a finger counts as pinching
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandTrackingState {
    #[default]
    NoHand,
    HandTrackedNoAim,
    HandTrackedWithAim,
}

/// Per-frame emulated controller derived from one tracked hand
#[derive(Debug, Clone, PartialEq)]
pub struct HandEmulationState {
    pub index_pinching: bool,
    pub middle_pinching: bool,
    pub ring_pinching: bool,
    /// Runtime reserved the hand for a system gesture
    pub system_gesture: bool,
    pub aim_pose: Pose,
    /// One transform per joint; hidden joints are zero-scaled
    pub joint_transforms: Vec<Mat4>,
}

impl HandEmulationState {
    /// Build the emulation state from a frame's joints and aim summary
    pub fn from_tracking(joints: &HandJoints, aim: &AimState, pinch_threshold: f32) -> Self {
        let pinching = |bit: AimStatus, strength: f32| {
            aim.status.contains(bit) || strength >= pinch_threshold
        };

        Self {
            index_pinching: pinching(AimStatus::INDEX_PINCHING, aim.pinch_strength_index),
            middle_pinching: pinching(AimStatus::MIDDLE_PINCHING, aim.pinch_strength_middle),
            ring_pinching: pinching(AimStatus::RING_PINCHING, aim.pinch_strength_ring),
            system_gesture: aim.status.contains(AimStatus::SYSTEM_GESTURE),
            aim_pose: aim.aim_pose,
            joint_transforms: joint_transforms(joints),
        }
    }
}

/// Joint transforms scaled by radius; joints without a valid position collapse to zero scale
pub fn joint_transforms(joints: &HandJoints) -> Vec<Mat4> {
    joints
        .joints
        .iter()
        .map(|joint| {
            let transform = joint.pose.to_mat4();
            if joint.flags.contains(LocationFlags::POSITION_VALID) {
                transform * Mat4::from_scale(Vec3::splat(joint.radius))
            } else {
                transform * Mat4::from_scale(Vec3::ZERO)
            }
        })
        .collect()
}

/// Fixed rotation about the vertical axis aligning the aim pose with a held controller
pub fn correction_rotation(hand: Handedness) -> Mat4 {
    match hand {
        Handedness::Left => Mat4::from_rotation_y(FRAC_PI_2),
        Handedness::Right => Mat4::from_rotation_y(-FRAC_PI_4),
    }
}

pub struct HandEmulator {
    hand: Handedness,
    tracker: Option<HandTrackerHandle>,
    aim_supported: bool,
    pinch_threshold: f32,
    eye_height: f32,
    state: HandTrackingState,
}

impl HandEmulator {
    /// Create the hand tracker for `hand` if the runtime can track hands
    pub fn create(
        runtime: &dyn XrRuntime,
        hand: Handedness,
        pinch_threshold: f32,
        eye_height: f32,
    ) -> Result<Self, InputError> {
        let tracker = if runtime.supports_hand_tracking() {
            let tracker = runtime
                .create_hand_tracker(hand)
                .map_err(InputError::HandTracker)?;
            info!("Hand tracker created for {} hand", hand.name());
            Some(tracker)
        } else {
            debug!("Hand tracking not supported, {} hand stays controller-only", hand.name());
            None
        };

        Ok(Self {
            hand,
            tracker,
            aim_supported: runtime.supports_aim_state(),
            pinch_threshold,
            eye_height,
            state: HandTrackingState::NoHand,
        })
    }

    pub fn state(&self) -> HandTrackingState {
        self.state
    }

    pub fn has_tracker(&self) -> bool {
        self.tracker.is_some()
    }

    /// Advance the state machine for this frame
    ///
    /// Returns the emulation state only when the hand is tracked with a valid aim.
    pub fn track(&mut self, runtime: &dyn XrRuntime, time: i64) -> Option<HandEmulationState> {
        let (state, emulation) = self.locate(runtime, time);
        if state != self.state {
            debug!("{} hand tracking: {:?} -> {:?}", self.hand.name(), self.state, state);
            self.state = state;
        }
        emulation
    }

    fn locate(
        &self,
        runtime: &dyn XrRuntime,
        time: i64,
    ) -> (HandTrackingState, Option<HandEmulationState>) {
        let Some(tracker) = self.tracker else {
            return (HandTrackingState::NoHand, None);
        };

        let joints = match runtime.locate_hand_joints(tracker, time) {
            Ok(joints) => joints,
            Err(e) => {
                warn!("Failed to locate {} hand joints: {}", self.hand.name(), e);
                return (HandTrackingState::NoHand, None);
            }
        };
        if !joints.is_active {
            return (HandTrackingState::NoHand, None);
        }

        if !self.aim_supported {
            return (HandTrackingState::HandTrackedNoAim, None);
        }

        let aim = match runtime.query_aim_state(tracker) {
            Ok(Some(aim)) if aim.status.contains(AimStatus::VALID) => aim,
            Ok(_) => return (HandTrackingState::HandTrackedNoAim, None),
            Err(e) => {
                debug!("Aim state unavailable for {} hand: {}", self.hand.name(), e);
                return (HandTrackingState::HandTrackedNoAim, None);
            }
        };

        let emulation = HandEmulationState::from_tracking(&joints, &aim, self.pinch_threshold);
        (HandTrackingState::HandTrackedWithAim, Some(emulation))
    }

    /// Write the emulated controller to the delegate
    pub fn emulate(
        &self,
        emulation: &HandEmulationState,
        delegate: &mut dyn ControllerDelegate,
        index: usize,
        render_mode: RenderMode,
        latches: &mut DeviceLatches,
    ) {
        if emulation.system_gesture {
            delegate.set_enabled(index, false);
            return;
        }

        delegate.set_enabled(index, true);

        let mut pointer = emulation.aim_pose.to_mat4();
        if render_mode == RenderMode::Standalone {
            pointer = Mat4::from_translation(Vec3::new(0.0, self.eye_height, 0.0)) * pointer;
        }
        let corrected = pointer * correction_rotation(self.hand);

        delegate.set_transform(index, corrected);
        delegate.set_immersive_beam_transform(index, corrected);
        delegate.set_beam_transform(index, Mat4::IDENTITY);
        delegate.set_capability_flags(
            index,
            CapabilityFlags::ORIENTATION
                | CapabilityFlags::POSITION
                | CapabilityFlags::GRIP_SPACE_POSITION,
        );
        delegate.set_model_visible(index, false);

        let pinch_value = |pinching: bool| if pinching { 1.0 } else { 0.0 };

        let index_pinching = emulation.index_pinching;
        delegate.set_button_state(
            index,
            Button::Trigger,
            Some(IMMERSIVE_BUTTON_TRIGGER),
            index_pinching,
            index_pinching,
            pinch_value(index_pinching),
        );
        latches.update_select(delegate, index, render_mode, index_pinching);

        let middle_pinching = emulation.middle_pinching;
        delegate.set_button_state(
            index,
            Button::Squeeze,
            Some(IMMERSIVE_BUTTON_SQUEEZE),
            middle_pinching,
            middle_pinching,
            pinch_value(middle_pinching),
        );
        latches.update_squeeze(delegate, index, render_mode, middle_pinching);

        let ring_pinching = emulation.ring_pinching;
        delegate.set_button_state(
            index,
            Button::App,
            Some(IMMERSIVE_BUTTON_THUMBREST),
            ring_pinching,
            ring_pinching,
            pinch_value(ring_pinching),
        );

        delegate.set_hand_joint_locations(index, &emulation.joint_transforms);
        delegate.set_hand_visible(index, true);
    }
}
