//! Mapping catalog: built-in controller families plus user-supplied rows
//!
//! The built-in table covers the controllers the resolver ships with. Extra
//! rows can be loaded from YAML (same schema as [`DeviceMapping`]) and are
//! appended after the built-ins, so built-ins win on first match.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use std::path::Path;
use tracing::info;

use super::{
    filter_mappings, AxisSpec, AxisType, ButtonFlags, ButtonSpec, ButtonType, DeviceMapping, Dof,
    HandSide, HapticSpec, SystemProperties,
};
use crate::delegate::Button;

const CLICK: ButtonFlags = ButtonFlags::CLICK;
const TOUCH: ButtonFlags = ButtonFlags::TOUCH;
const VALUE: ButtonFlags = ButtonFlags::VALUE;
const LEFT: HandSide = HandSide::LEFT;
const RIGHT: HandSide = HandSide::RIGHT;
const BOTH: HandSide = HandSide::BOTH;

static BUILTIN_MAPPINGS: Lazy<Vec<DeviceMapping>> = Lazy::new(build_builtin_mappings);

fn button(ty: ButtonType, hand: HandSide, flags: ButtonFlags, path: &str) -> ButtonSpec {
    ButtonSpec::new(ty, hand, flags, path)
}

fn axis(ty: AxisType, hand: HandSide, path: &str) -> AxisSpec {
    AxisSpec::new(ty, hand, path)
}

fn haptic_both() -> Vec<HapticSpec> {
    vec![HapticSpec::new(BOTH, "output/haptic")]
}

fn models(left: &str, right: &str) -> (Option<String>, Option<String>) {
    (Some(left.to_string()), Some(right.to_string()))
}

fn build_builtin_mappings() -> Vec<DeviceMapping> {
    let mut mappings = Vec::new();

    let (left_model, right_model) = models("oculus-touch-left", "oculus-touch-right");
    mappings.push(DeviceMapping {
        profile: "/interaction_profiles/oculus/touch_controller".to_string(),
        dof: Dof::SixDof,
        system_filter: None,
        controller_type: "oculus-touch".to_string(),
        buttons: vec![
            // No click detent on the trigger, the click threshold applies
            button(ButtonType::Trigger, BOTH, TOUCH | VALUE, "input/trigger"),
            button(ButtonType::Squeeze, BOTH, VALUE, "input/squeeze"),
            button(ButtonType::Menu, LEFT, CLICK, "input/menu"),
            button(ButtonType::Thumbstick, BOTH, CLICK | TOUCH, "input/thumbstick"),
            button(ButtonType::Thumbrest, BOTH, TOUCH, "input/thumbrest"),
            button(ButtonType::X, LEFT, CLICK | TOUCH, "input/x"),
            button(ButtonType::Y, LEFT, CLICK | TOUCH, "input/y"),
            button(ButtonType::A, RIGHT, CLICK | TOUCH, "input/a"),
            button(ButtonType::B, RIGHT, CLICK | TOUCH, "input/b"),
        ],
        axes: vec![axis(AxisType::Thumbstick, BOTH, "input/thumbstick")],
        haptics: haptic_both(),
        left_model,
        right_model,
    });

    let (left_model, right_model) = models("valve-index-left", "valve-index-right");
    mappings.push(DeviceMapping {
        profile: "/interaction_profiles/valve/index_controller".to_string(),
        dof: Dof::SixDof,
        system_filter: None,
        controller_type: "valve-index".to_string(),
        buttons: vec![
            button(ButtonType::Trigger, BOTH, CLICK | TOUCH | VALUE, "input/trigger"),
            button(ButtonType::Squeeze, BOTH, VALUE, "input/squeeze"),
            button(ButtonType::Trackpad, BOTH, TOUCH, "input/trackpad"),
            button(ButtonType::Thumbstick, BOTH, CLICK | TOUCH, "input/thumbstick"),
            button(ButtonType::A, BOTH, CLICK | TOUCH, "input/a"),
            button(ButtonType::B, BOTH, CLICK | TOUCH, "input/b"),
        ],
        axes: vec![
            axis(AxisType::Trackpad, BOTH, "input/trackpad"),
            axis(AxisType::Thumbstick, BOTH, "input/thumbstick"),
            axis(AxisType::TrackpadForce, BOTH, "input/trackpad/force"),
            axis(AxisType::SqueezeForce, BOTH, "input/squeeze/force"),
        ],
        haptics: haptic_both(),
        left_model,
        right_model,
    });

    let (left_model, right_model) = models("vive-wand", "vive-wand");
    mappings.push(DeviceMapping {
        profile: "/interaction_profiles/htc/vive_controller".to_string(),
        dof: Dof::SixDof,
        system_filter: None,
        controller_type: "htc-vive".to_string(),
        buttons: vec![
            button(ButtonType::Trigger, BOTH, CLICK | VALUE, "input/trigger"),
            button(ButtonType::Squeeze, BOTH, CLICK, "input/squeeze"),
            button(ButtonType::Menu, BOTH, CLICK, "input/menu"),
            button(ButtonType::Trackpad, BOTH, CLICK | TOUCH, "input/trackpad"),
        ],
        axes: vec![axis(AxisType::Trackpad, BOTH, "input/trackpad")],
        haptics: haptic_both(),
        left_model,
        right_model,
    });

    let (left_model, right_model) = models("vive-focus3-left", "vive-focus3-right");
    mappings.push(DeviceMapping {
        profile: "/interaction_profiles/htc/vive_focus3_controller".to_string(),
        dof: Dof::SixDof,
        system_filter: None,
        controller_type: "htc-vive-focus3".to_string(),
        buttons: vec![
            button(ButtonType::Trigger, BOTH, CLICK | TOUCH | VALUE, "input/trigger"),
            button(ButtonType::Squeeze, BOTH, CLICK | TOUCH | VALUE, "input/squeeze"),
            button(ButtonType::Menu, LEFT, CLICK, "input/menu"),
            button(ButtonType::Thumbstick, BOTH, CLICK | TOUCH, "input/thumbstick"),
            button(ButtonType::Thumbrest, BOTH, TOUCH, "input/thumbrest"),
            button(ButtonType::X, LEFT, CLICK, "input/x"),
            button(ButtonType::Y, LEFT, CLICK, "input/y"),
            button(ButtonType::A, RIGHT, CLICK, "input/a"),
            button(ButtonType::B, RIGHT, CLICK, "input/b"),
        ],
        axes: vec![axis(AxisType::Thumbstick, BOTH, "input/thumbstick")],
        haptics: haptic_both(),
        left_model,
        right_model,
    });

    let (left_model, right_model) = models("pico-neo3-left", "pico-neo3-right");
    mappings.push(DeviceMapping {
        profile: "/interaction_profiles/bytedance/pico_neo3_controller".to_string(),
        dof: Dof::SixDof,
        system_filter: Some("Pico Neo 3".to_string()),
        controller_type: "pico-neo3".to_string(),
        buttons: vec![
            button(ButtonType::Trigger, BOTH, CLICK | TOUCH | VALUE, "input/trigger"),
            button(ButtonType::Squeeze, BOTH, CLICK | VALUE, "input/squeeze"),
            button(ButtonType::Menu, BOTH, CLICK, "input/menu"),
            button(ButtonType::Thumbstick, BOTH, CLICK | TOUCH, "input/thumbstick"),
            button(ButtonType::X, LEFT, CLICK | TOUCH, "input/x"),
            button(ButtonType::Y, LEFT, CLICK | TOUCH, "input/y"),
            button(ButtonType::A, RIGHT, CLICK | TOUCH, "input/a"),
            button(ButtonType::B, RIGHT, CLICK | TOUCH, "input/b"),
        ],
        axes: vec![axis(AxisType::Thumbstick, BOTH, "input/thumbstick")],
        haptics: haptic_both(),
        left_model,
        right_model,
    });

    let (left_model, right_model) = models("pico4-left", "pico4-right");
    mappings.push(DeviceMapping {
        profile: "/interaction_profiles/bytedance/pico4_controller".to_string(),
        dof: Dof::SixDof,
        system_filter: None,
        controller_type: "pico4".to_string(),
        buttons: vec![
            button(ButtonType::Trigger, BOTH, CLICK | TOUCH | VALUE, "input/trigger"),
            button(ButtonType::Squeeze, BOTH, CLICK | VALUE, "input/squeeze"),
            button(ButtonType::Menu, LEFT, CLICK, "input/menu"),
            button(ButtonType::Thumbstick, BOTH, CLICK | TOUCH, "input/thumbstick"),
            button(ButtonType::X, LEFT, CLICK | TOUCH, "input/x"),
            button(ButtonType::Y, LEFT, CLICK | TOUCH, "input/y"),
            button(ButtonType::A, RIGHT, CLICK | TOUCH, "input/a"),
            button(ButtonType::B, RIGHT, CLICK | TOUCH, "input/b"),
        ],
        axes: vec![axis(AxisType::Thumbstick, BOTH, "input/thumbstick")],
        haptics: haptic_both(),
        left_model,
        right_model,
    });

    let (left_model, right_model) = models("huawei-3dof-left", "huawei-3dof-right");
    mappings.push(DeviceMapping {
        profile: "/interaction_profiles/huawei/controller".to_string(),
        dof: Dof::ThreeDof,
        system_filter: None,
        controller_type: "huawei-3dof".to_string(),
        buttons: vec![
            button(ButtonType::Trigger, BOTH, CLICK, "input/trigger"),
            button(ButtonType::Trackpad, BOTH, CLICK | TOUCH, "input/trackpad"),
            button(ButtonType::Back, BOTH, CLICK, "input/back"),
            button(ButtonType::Menu, BOTH, CLICK, "input/home").with_semantic(Button::Others),
        ],
        axes: vec![axis(AxisType::Trackpad, BOTH, "input/trackpad")],
        haptics: vec![],
        left_model,
        right_model,
    });

    let (left_model, right_model) = models("generic-trigger-left", "generic-trigger-right");
    mappings.push(DeviceMapping {
        profile: "/interaction_profiles/khr/simple_controller".to_string(),
        dof: Dof::SixDof,
        system_filter: None,
        controller_type: "khr-simple".to_string(),
        buttons: vec![
            button(ButtonType::Trigger, BOTH, CLICK, "input/select"),
            button(ButtonType::Menu, BOTH, CLICK, "input/menu"),
        ],
        axes: vec![],
        haptics: haptic_both(),
        left_model,
        right_model,
    });

    let (left_model, right_model) = models("generic-hand-left", "generic-hand-right");
    mappings.push(DeviceMapping {
        profile: "/interaction_profiles/ext/hand_interaction_ext".to_string(),
        dof: Dof::SixDof,
        system_filter: None,
        controller_type: "hand-interaction".to_string(),
        buttons: vec![
            button(ButtonType::Trigger, BOTH, VALUE, "input/pinch_ext"),
            button(ButtonType::Squeeze, BOTH, VALUE, "input/grasp_ext"),
        ],
        axes: vec![],
        haptics: vec![],
        left_model,
        right_model,
    });

    mappings
}

/// Ordered collection of device mappings
#[derive(Debug, Clone, Default)]
pub struct MappingCatalog {
    mappings: Vec<DeviceMapping>,
}

impl MappingCatalog {
    /// Catalog with the built-in controller families
    pub fn builtin() -> Self {
        Self {
            mappings: BUILTIN_MAPPINGS.clone(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_mappings(mappings: Vec<DeviceMapping>) -> Self {
        Self { mappings }
    }

    /// Load extra mappings from a YAML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mappings file: {}", path.display()))?;

        Self::load_from_string(&contents)
            .with_context(|| format!("Failed to load mappings from {}", path.display()))
    }

    /// Load mappings from a YAML string (a list of mappings)
    pub fn load_from_string(yaml: &str) -> Result<Self> {
        let mappings: Vec<DeviceMapping> =
            serde_yaml::from_str(yaml).context("Failed to parse mappings YAML")?;

        for (idx, mapping) in mappings.iter().enumerate() {
            validate_mapping(mapping).with_context(|| format!("Invalid mapping #{}", idx))?;
        }

        info!("Loaded {} device mappings", mappings.len());

        Ok(Self { mappings })
    }

    /// Append another catalog's rows after this one's
    pub fn extend(&mut self, other: MappingCatalog) {
        self.mappings.extend(other.mappings);
    }

    pub fn mappings(&self) -> &[DeviceMapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Mappings usable on the given system, in catalog order
    pub fn filter(&self, system: &SystemProperties) -> Vec<DeviceMapping> {
        filter_mappings(&self.mappings, system)
    }

    /// First mapping for an interaction profile
    pub fn find_by_profile(&self, profile: &str) -> Option<&DeviceMapping> {
        self.mappings.iter().find(|m| m.matches_profile(profile))
    }
}

fn validate_mapping(mapping: &DeviceMapping) -> Result<()> {
    if !mapping.profile.starts_with("/interaction_profiles/") {
        anyhow::bail!("Profile '{}' must start with /interaction_profiles/", mapping.profile);
    }
    if mapping.controller_type.is_empty() {
        anyhow::bail!("Mapping '{}' controller_type cannot be empty", mapping.profile);
    }
    for button in &mapping.buttons {
        if button.path.is_empty() {
            anyhow::bail!("Button {:?} in '{}' has an empty path", button.button_type, mapping.profile);
        }
        if button.flags.is_empty() {
            anyhow::bail!("Button {:?} in '{}' declares no sub-channels", button.button_type, mapping.profile);
        }
        if button.hand.is_empty() {
            anyhow::bail!("Button {:?} in '{}' applies to no hand", button.button_type, mapping.profile);
        }
    }
    for axis in &mapping.axes {
        if axis.path.is_empty() {
            anyhow::bail!("Axis {:?} in '{}' has an empty path", axis.axis_type, mapping.profile);
        }
    }
    for haptic in &mapping.haptics {
        if haptic.path.is_empty() {
            anyhow::bail!("Haptic in '{}' has an empty path", mapping.profile);
        }
    }
    Ok(())
}
