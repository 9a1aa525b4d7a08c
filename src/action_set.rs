//! Shared action namespace
//!
//! Left and right input sources of one session resolve their actions through
//! a single [`ActionRegistry`], so a button or axis type maps to exactly one
//! runtime action no matter how many sources reference it. Sub-actions are
//! distinguished per hand at query time, not by separate actions.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::InputError;
use crate::mapping::{AxisType, ButtonFlags, ButtonType, HandSide};
use crate::runtime::{ActionHandle, ActionKind, XrRuntime};

/// Actions backing one logical button; a sub-channel is `None` when no
/// mapping declares it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonActions {
    pub click: Option<ActionHandle>,
    pub touch: Option<ActionHandle>,
    pub value: Option<ActionHandle>,
}

#[derive(Debug, Clone, Copy)]
struct RegisteredAction {
    handle: ActionHandle,
    kind: ActionKind,
    hands: HandSide,
}

/// Name-keyed registry of created actions
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, RegisteredAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the action registered under `name`, creating it on first use
    pub fn get_or_create_action(
        &mut self,
        runtime: &dyn XrRuntime,
        kind: ActionKind,
        name: &str,
        hands: HandSide,
    ) -> Result<ActionHandle, InputError> {
        if let Some(existing) = self.actions.get(name) {
            if existing.kind != kind {
                warn!(
                    "Failed to reuse action '{}': exists as {:?}, requested {:?}",
                    name, existing.kind, kind
                );
                return Err(InputError::ActionKindMismatch {
                    name: name.to_string(),
                    existing: existing.kind,
                    requested: kind,
                });
            }
            if !existing.hands.contains(hands) {
                debug!(
                    "Action '{}' reused for hands {:?} (created for {:?})",
                    name, hands, existing.hands
                );
            }
            return Ok(existing.handle);
        }

        let handle = runtime
            .create_action(kind, name, hands)
            .map_err(|source| InputError::ActionCreation {
                name: name.to_string(),
                source,
            })?;

        debug!("Created {:?} action '{}' -> {:?}", kind, name, handle);
        self.actions
            .insert(name.to_string(), RegisteredAction { handle, kind, hands });

        Ok(handle)
    }

    /// Actions for the sub-channels of `button_type` listed in `flags`
    pub fn get_or_create_button_actions(
        &mut self,
        runtime: &dyn XrRuntime,
        button_type: ButtonType,
        flags: ButtonFlags,
        hands: HandSide,
    ) -> Result<ButtonActions, InputError> {
        let name = button_type.name();
        let mut actions = ButtonActions::default();

        if flags.contains(ButtonFlags::CLICK) {
            actions.click = Some(self.get_or_create_action(
                runtime,
                ActionKind::Boolean,
                &format!("{}_click", name),
                hands,
            )?);
        }
        if flags.contains(ButtonFlags::TOUCH) {
            actions.touch = Some(self.get_or_create_action(
                runtime,
                ActionKind::Boolean,
                &format!("{}_touch", name),
                hands,
            )?);
        }
        if flags.contains(ButtonFlags::VALUE) {
            actions.value = Some(self.get_or_create_action(
                runtime,
                ActionKind::Float,
                &format!("{}_value", name),
                hands,
            )?);
        }

        Ok(actions)
    }

    /// Action for an analog axis; 2-D axes are vector actions, others scalar
    pub fn get_or_create_axis_action(
        &mut self,
        runtime: &dyn XrRuntime,
        axis_type: AxisType,
        hands: HandSide,
    ) -> Result<ActionHandle, InputError> {
        let kind = if axis_type.is_two_dimensional() {
            ActionKind::Vector2
        } else {
            ActionKind::Float
        };
        self.get_or_create_action(runtime, kind, &format!("axis_{}", axis_type.name()), hands)
    }

    pub fn handle(&self, name: &str) -> Option<ActionHandle> {
        self.actions.get(name).map(|a| a.handle)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered action names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}
