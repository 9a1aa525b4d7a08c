//! Device control mappings
//!
//! A [`DeviceMapping`] describes one controller family: which logical buttons
//! and axes it exposes, where they live on the physical device (binding
//! paths), its haptic outputs and its visual models. Mappings are read-only
//! once loaded.
//!
//! Per-kind behavior is table driven: [`ButtonType::info`] returns the
//! semantic button and xr-standard slot for a logical button.

pub mod catalog;
pub mod filter;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::delegate::{
    Button, IMMERSIVE_BUTTON_A, IMMERSIVE_BUTTON_B, IMMERSIVE_BUTTON_SQUEEZE,
    IMMERSIVE_BUTTON_THUMBREST, IMMERSIVE_BUTTON_THUMBSTICK, IMMERSIVE_BUTTON_TOUCHPAD,
    IMMERSIVE_BUTTON_TRIGGER,
};
use crate::runtime::Handedness;

pub use catalog::MappingCatalog;
pub use filter::{filter_mappings, SystemProperties};

/// Logical button, independent of physical layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonType {
    Trigger,
    Squeeze,
    Menu,
    Back,
    Trackpad,
    Thumbstick,
    Thumbrest,
    A,
    B,
    X,
    Y,
}

/// Static per-button behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonInfo {
    pub name: &'static str,
    pub semantic: Button,
    pub immersive: Option<u8>,
}

const BUTTON_TABLE: [ButtonInfo; 11] = [
    ButtonInfo { name: "trigger", semantic: Button::Trigger, immersive: Some(IMMERSIVE_BUTTON_TRIGGER) },
    ButtonInfo { name: "squeeze", semantic: Button::Squeeze, immersive: Some(IMMERSIVE_BUTTON_SQUEEZE) },
    ButtonInfo { name: "menu", semantic: Button::App, immersive: None },
    ButtonInfo { name: "back", semantic: Button::Y, immersive: None },
    ButtonInfo { name: "trackpad", semantic: Button::Touchpad, immersive: Some(IMMERSIVE_BUTTON_TOUCHPAD) },
    ButtonInfo { name: "thumbstick", semantic: Button::Others, immersive: Some(IMMERSIVE_BUTTON_THUMBSTICK) },
    ButtonInfo { name: "thumbrest", semantic: Button::Others, immersive: Some(IMMERSIVE_BUTTON_THUMBREST) },
    ButtonInfo { name: "a", semantic: Button::A, immersive: Some(IMMERSIVE_BUTTON_A) },
    ButtonInfo { name: "b", semantic: Button::B, immersive: Some(IMMERSIVE_BUTTON_B) },
    // X/Y share the A/B slots on the left controller
    ButtonInfo { name: "x", semantic: Button::X, immersive: Some(IMMERSIVE_BUTTON_A) },
    ButtonInfo { name: "y", semantic: Button::Y, immersive: Some(IMMERSIVE_BUTTON_B) },
];

impl ButtonType {
    pub const ALL: [ButtonType; 11] = [
        ButtonType::Trigger,
        ButtonType::Squeeze,
        ButtonType::Menu,
        ButtonType::Back,
        ButtonType::Trackpad,
        ButtonType::Thumbstick,
        ButtonType::Thumbrest,
        ButtonType::A,
        ButtonType::B,
        ButtonType::X,
        ButtonType::Y,
    ];

    pub fn info(self) -> &'static ButtonInfo {
        &BUTTON_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }
}

bitflags! {
    /// Sub-channels a button exposes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ButtonFlags: u8 {
        const CLICK = 1 << 0;
        const TOUCH = 1 << 1;
        const VALUE = 1 << 2;
    }
}

bitflags! {
    /// Hands a catalog entry applies to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct HandSide: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const BOTH = Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl HandSide {
    /// Whether an entry with this mask applies to `hand`
    pub fn applies_to(self, hand: Handedness) -> bool {
        self.intersects(hand.side())
    }
}

/// Analog axis kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisType {
    Trackpad,
    Thumbstick,
    TrackpadForce,
    SqueezeForce,
}

impl AxisType {
    pub fn name(self) -> &'static str {
        match self {
            AxisType::Trackpad => "trackpad",
            AxisType::Thumbstick => "thumbstick",
            AxisType::TrackpadForce => "trackpad_force",
            AxisType::SqueezeForce => "squeeze_force",
        }
    }

    /// Two-dimensional axes are created as vector actions, the rest as scalars
    pub fn is_two_dimensional(self) -> bool {
        matches!(self, AxisType::Trackpad | AxisType::Thumbstick)
    }
}

/// Degrees of freedom a mapping is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dof {
    #[serde(rename = "3dof")]
    ThreeDof,
    #[serde(rename = "6dof")]
    SixDof,
}

/// One physical button of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSpec {
    #[serde(rename = "type")]
    pub button_type: ButtonType,
    pub hand: HandSide,
    pub flags: ButtonFlags,
    /// Component path relative to the hand, e.g. `input/trigger`
    pub path: String,
    /// Semantic button override for devices with unusual layouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<Button>,
}

impl ButtonSpec {
    pub fn new(button_type: ButtonType, hand: HandSide, flags: ButtonFlags, path: &str) -> Self {
        Self {
            button_type,
            hand,
            flags,
            path: path.to_string(),
            semantic: None,
        }
    }

    pub fn with_semantic(mut self, semantic: Button) -> Self {
        self.semantic = Some(semantic);
        self
    }

    /// Semantic button reported to the consumer
    pub fn semantic_button(&self) -> Button {
        self.semantic.unwrap_or(self.button_type.info().semantic)
    }

    /// xr-standard button slot, if any
    pub fn immersive_index(&self) -> Option<u8> {
        self.button_type.info().immersive
    }
}

/// One analog axis of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    pub hand: HandSide,
    pub path: String,
}

impl AxisSpec {
    pub fn new(axis_type: AxisType, hand: HandSide, path: &str) -> Self {
        Self {
            axis_type,
            hand,
            path: path.to_string(),
        }
    }
}

/// One haptic output of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HapticSpec {
    pub hand: HandSide,
    pub path: String,
}

impl HapticSpec {
    pub fn new(hand: HandSide, path: &str) -> Self {
        Self {
            hand,
            path: path.to_string(),
        }
    }
}

/// Control mapping for one controller family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMapping {
    /// Interaction profile path reported by the runtime
    pub profile: String,
    pub dof: Dof,
    /// Only use this mapping on systems with exactly this name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_filter: Option<String>,
    pub controller_type: String,
    #[serde(default)]
    pub buttons: Vec<ButtonSpec>,
    #[serde(default)]
    pub axes: Vec<AxisSpec>,
    #[serde(default)]
    pub haptics: Vec<HapticSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_model: Option<String>,
}

impl DeviceMapping {
    /// Visual model for a hand; a mapping without one does not drive that hand
    pub fn model_for(&self, hand: Handedness) -> Option<&str> {
        match hand {
            Handedness::Left => self.left_model.as_deref(),
            Handedness::Right => self.right_model.as_deref(),
        }
    }

    pub fn buttons_for(&self, hand: Handedness) -> impl Iterator<Item = &ButtonSpec> {
        self.buttons.iter().filter(move |b| b.hand.applies_to(hand))
    }

    pub fn axes_for(&self, hand: Handedness) -> impl Iterator<Item = &AxisSpec> {
        self.axes.iter().filter(move |a| a.hand.applies_to(hand))
    }

    pub fn haptics_for(&self, hand: Handedness) -> impl Iterator<Item = &HapticSpec> {
        self.haptics.iter().filter(move |h| h.hand.applies_to(hand))
    }

    /// Whether `profile` selects this mapping
    pub fn matches_profile(&self, profile: &str) -> bool {
        !profile.is_empty() && self.profile.starts_with(profile)
    }
}
