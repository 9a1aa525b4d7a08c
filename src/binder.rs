//! Action binding
//!
//! [`SourceActions::bind`] creates (or reuses, through the shared registry)
//! the minimal action set for a list of filtered mappings: one set of
//! sub-channel actions per button type, one action per axis type, plus the
//! grip/pointer pose and haptic actions.
//!
//! [`SourceActions::suggest_bindings`] then records, per interaction
//! profile, which physical path feeds which action for one hand.

use std::collections::BTreeMap;
use tracing::debug;

use crate::action_set::{ActionRegistry, ButtonActions};
use crate::error::InputError;
use crate::mapping::{AxisType, ButtonFlags, ButtonType, DeviceMapping, HandSide};
use crate::runtime::{ActionHandle, ActionKind, Handedness, SuggestedBinding, XrRuntime};

/// Suggested bindings accumulated per interaction profile
pub type SuggestedBindings = BTreeMap<String, Vec<SuggestedBinding>>;

pub const GRIP_POSE_PATH: &str = "input/grip/pose";
pub const AIM_POSE_PATH: &str = "input/aim/pose";

/// Total number of suggested bindings across all profiles
pub fn binding_count(bindings: &SuggestedBindings) -> usize {
    bindings.values().map(Vec::len).sum()
}

/// Actions one input source queries
#[derive(Debug, Clone)]
pub struct SourceActions {
    pub grip: ActionHandle,
    pub pointer: ActionHandle,
    pub haptic: ActionHandle,
    pub buttons: BTreeMap<ButtonType, ButtonActions>,
    pub axes: BTreeMap<AxisType, ActionHandle>,
}

impl SourceActions {
    /// Create or reuse every action referenced by `mappings`
    pub fn bind(
        registry: &mut ActionRegistry,
        runtime: &dyn XrRuntime,
        mappings: &[DeviceMapping],
    ) -> Result<Self, InputError> {
        let grip = registry.get_or_create_action(runtime, ActionKind::Pose, "grip", HandSide::BOTH)?;
        let pointer =
            registry.get_or_create_action(runtime, ActionKind::Pose, "pointer", HandSide::BOTH)?;
        let haptic =
            registry.get_or_create_action(runtime, ActionKind::Vibration, "haptic", HandSide::BOTH)?;

        // Union of sub-channels and hands per button type across all mappings
        let mut button_usage: BTreeMap<ButtonType, (ButtonFlags, HandSide)> = BTreeMap::new();
        let mut axis_usage: BTreeMap<AxisType, HandSide> = BTreeMap::new();
        for mapping in mappings {
            for button in &mapping.buttons {
                let entry = button_usage
                    .entry(button.button_type)
                    .or_insert((ButtonFlags::empty(), HandSide::empty()));
                entry.0 |= button.flags;
                entry.1 |= button.hand;
            }
            for axis in &mapping.axes {
                *axis_usage.entry(axis.axis_type).or_insert(HandSide::empty()) |= axis.hand;
            }
        }

        let mut buttons = BTreeMap::new();
        for (button_type, (flags, hands)) in button_usage {
            let actions = registry.get_or_create_button_actions(runtime, button_type, flags, hands)?;
            buttons.insert(button_type, actions);
        }

        let mut axes = BTreeMap::new();
        for (axis_type, hands) in axis_usage {
            let action = registry.get_or_create_axis_action(runtime, axis_type, hands)?;
            axes.insert(axis_type, action);
        }

        debug!(
            "Bound {} button types and {} axis types over {} mappings",
            buttons.len(),
            axes.len(),
            mappings.len()
        );

        Ok(Self {
            grip,
            pointer,
            haptic,
            buttons,
            axes,
        })
    }

    /// Record the bindings of every mapping for `hand`
    pub fn suggest_bindings(
        &self,
        mappings: &[DeviceMapping],
        hand: Handedness,
        bindings: &mut SuggestedBindings,
    ) -> Result<(), InputError> {
        let user_path = hand.user_path();

        for mapping in mappings {
            let profile = mapping.profile.as_str();

            add_binding(bindings, profile, self.grip, user_path, GRIP_POSE_PATH, None)?;
            add_binding(bindings, profile, self.pointer, user_path, AIM_POSE_PATH, None)?;

            for button in mapping.buttons_for(hand) {
                let Some(actions) = self.buttons.get(&button.button_type) else {
                    continue;
                };
                let channels = [
                    (ButtonFlags::CLICK, actions.click, "click"),
                    (ButtonFlags::TOUCH, actions.touch, "touch"),
                    (ButtonFlags::VALUE, actions.value, "value"),
                ];
                for (flag, action, suffix) in channels {
                    if !button.flags.contains(flag) {
                        continue;
                    }
                    let Some(action) = action else {
                        continue;
                    };
                    add_binding(bindings, profile, action, user_path, &button.path, Some(suffix))?;
                }
            }

            for axis in mapping.axes_for(hand) {
                if let Some(action) = self.axes.get(&axis.axis_type) {
                    add_binding(bindings, profile, *action, user_path, &axis.path, None)?;
                }
            }

            for haptic in mapping.haptics_for(hand) {
                add_binding(bindings, profile, self.haptic, user_path, &haptic.path, None)?;
            }
        }

        Ok(())
    }
}

fn add_binding(
    bindings: &mut SuggestedBindings,
    profile: &str,
    action: ActionHandle,
    user_path: &str,
    component: &str,
    suffix: Option<&str>,
) -> Result<(), InputError> {
    if component.is_empty() {
        return Err(InputError::EmptyBindingPath(format!("{:?}", action)));
    }

    let path = match suffix {
        Some(suffix) => format!("{}/{}/{}", user_path, component, suffix),
        None => format!("{}/{}", user_path, component),
    };

    bindings
        .entry(profile.to_string())
        .or_default()
        .push(SuggestedBinding { action, path });

    Ok(())
}
