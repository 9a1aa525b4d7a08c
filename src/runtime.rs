//! XR runtime capabilities consumed by the resolver
//!
//! The resolver never talks to a concrete runtime. Everything it needs
//! (action creation, binding suggestion, state queries, pose location,
//! hand tracking and haptics) goes through [`XrRuntime`].
//!
//! All methods take `&self`. Implementations that need to mutate internal
//! bookkeeping use interior mutability, the same way drivers do.

use bitflags::bitflags;
use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;
use crate::mapping::HandSide;

/// Number of joints reported by a hand tracker (default joint set)
pub const HAND_JOINT_COUNT: usize = 26;

/// Runtime-defined "let the runtime pick" haptic frequency
pub const FREQUENCY_UNSPECIFIED: f32 = 0.0;

/// Opaque action handle issued by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionHandle(pub u64);

/// Opaque hand tracker handle issued by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandTrackerHandle(pub u64);

/// Value type of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Boolean,
    Float,
    Vector2,
    Pose,
    Vibration,
}

/// The hand a single input source represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Top-level user path used as binding prefix
    pub fn user_path(self) -> &'static str {
        match self {
            Handedness::Left => "/user/hand/left",
            Handedness::Right => "/user/hand/right",
        }
    }

    /// Mask form, for matching against catalog hand masks
    pub fn side(self) -> HandSide {
        match self {
            Handedness::Left => HandSide::LEFT,
            Handedness::Right => HandSide::RIGHT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

/// One suggested (physical path -> action) association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedBinding {
    pub action: ActionHandle,
    pub path: String,
}

/// Rigid transform reported by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub orientation: Quat,
    pub position: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        orientation: Quat::IDENTITY,
        position: Vec3::ZERO,
    };

    pub fn new(orientation: Quat, position: Vec3) -> Self {
        Self { orientation, position }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }
}

bitflags! {
    /// Validity of a located space
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LocationFlags: u8 {
        const ORIENTATION_VALID = 1 << 0;
        const POSITION_VALID = 1 << 1;
        const ORIENTATION_TRACKED = 1 << 2;
        const POSITION_TRACKED = 1 << 3;
    }
}

impl LocationFlags {
    /// Fully valid and tracked
    pub const TRACKED: LocationFlags = LocationFlags::all();
}

/// Result of locating a pose action in the base space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpaceLocation {
    pub pose: Pose,
    pub flags: LocationFlags,
}

/// One tracked hand joint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandJointLocation {
    pub pose: Pose,
    pub radius: f32,
    pub flags: LocationFlags,
}

/// All joints of one hand for a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandJoints {
    /// Whether the tracker currently sees the hand
    pub is_active: bool,
    pub joints: [HandJointLocation; HAND_JOINT_COUNT],
}

impl Default for HandJoints {
    fn default() -> Self {
        Self {
            is_active: false,
            joints: [HandJointLocation::default(); HAND_JOINT_COUNT],
        }
    }
}

bitflags! {
    /// Aim-extension status bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AimStatus: u32 {
        const COMPUTED = 1 << 0;
        const VALID = 1 << 1;
        const INDEX_PINCHING = 1 << 2;
        const MIDDLE_PINCHING = 1 << 3;
        const RING_PINCHING = 1 << 4;
        const LITTLE_PINCHING = 1 << 5;
        const SYSTEM_GESTURE = 1 << 6;
        const DOMINANT_HAND = 1 << 7;
        const MENU_PRESSED = 1 << 8;
    }
}

/// Aim-extension summary for a tracked hand
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AimState {
    pub status: AimStatus,
    pub aim_pose: Pose,
    #[serde(default)]
    pub pinch_strength_index: f32,
    #[serde(default)]
    pub pinch_strength_middle: f32,
    #[serde(default)]
    pub pinch_strength_ring: f32,
}

/// Abstract XR runtime
pub trait XrRuntime {
    /// Create a named action, or return an error if the runtime rejects it
    fn create_action(
        &self,
        kind: ActionKind,
        name: &str,
        hands: HandSide,
    ) -> Result<ActionHandle, RuntimeError>;

    /// Suggest a set of bindings for one interaction profile
    fn suggest_bindings(
        &self,
        profile: &str,
        bindings: &[SuggestedBinding],
    ) -> Result<(), RuntimeError>;

    /// Interaction profile currently driving the given hand, `None` if not known yet
    fn current_interaction_profile(&self, hand: Handedness)
        -> Result<Option<String>, RuntimeError>;

    fn query_bool(&self, action: ActionHandle, hand: Handedness) -> Result<bool, RuntimeError>;

    fn query_float(&self, action: ActionHandle, hand: Handedness) -> Result<f32, RuntimeError>;

    fn query_vector2(&self, action: ActionHandle, hand: Handedness)
        -> Result<Vec2, RuntimeError>;

    /// Locate a pose action in the base space at `time`.
    ///
    /// Returns `Ok(None)` when the pose action is not active.
    fn locate_pose(
        &self,
        action: ActionHandle,
        hand: Handedness,
        time: i64,
    ) -> Result<Option<SpaceLocation>, RuntimeError>;

    /// Whether articulated hand tracking is available at all
    fn supports_hand_tracking(&self) -> bool;

    /// Whether the aim extension is available
    fn supports_aim_state(&self) -> bool;

    fn create_hand_tracker(&self, hand: Handedness) -> Result<HandTrackerHandle, RuntimeError>;

    fn locate_hand_joints(
        &self,
        tracker: HandTrackerHandle,
        time: i64,
    ) -> Result<HandJoints, RuntimeError>;

    /// Aim state captured by the last joint location, `None` if unavailable
    fn query_aim_state(&self, tracker: HandTrackerHandle) -> Result<Option<AimState>, RuntimeError>;

    fn apply_haptic_pulse(
        &self,
        action: ActionHandle,
        hand: Handedness,
        duration_nanos: i64,
        frequency: f32,
        amplitude: f32,
    ) -> Result<(), RuntimeError>;

    fn stop_haptic_pulse(&self, action: ActionHandle, hand: Handedness) -> Result<(), RuntimeError>;
}
