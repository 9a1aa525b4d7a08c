//! One tracked input device (a left or right hand)
//!
//! An [`InputSource`] owns everything frame-scoped for its device: the active
//! mapping, the edge latches, the hand emulator and the haptics latch. Actions
//! come from the session-wide registry and are shared with the sibling hand.
//!
//! Per frame, exactly one of two paths writes controller state:
//! - hand emulation, when a hand is tracked with a valid aim;
//! - the mapping path (pose, buttons, axes) otherwise.
//!
//! A hand that is tracked without aim gets no writes at all for that frame.

#[cfg(test)]
mod tests;

use glam::Mat4;
use tracing::{debug, info, warn};

use crate::action_set::ActionRegistry;
use crate::binder::{SourceActions, SuggestedBindings};
use crate::config::ResolverConfig;
use crate::delegate::{CapabilityFlags, ControllerDelegate, RenderMode, TargetRayMode};
use crate::elbow::{ElbowModel, FixedElbowModel};
use crate::error::{InputError, RuntimeError};
use crate::hand::{HandEmulator, HandTrackingState};
use crate::haptics::HapticsSequencer;
use crate::mapping::DeviceMapping;
use crate::resolver::{apply_resolved, DeviceLatches, ResolvedInput, StateResolver};
use crate::runtime::{Handedness, LocationFlags, XrRuntime};

/// Frame inputs supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Predicted display time, in runtime units
    pub time: i64,
    /// Head transform, used by the arm model
    pub head: Mat4,
    /// Vertical offset between the runtime's base space and the app's
    pub offset_y: f32,
    pub render_mode: RenderMode,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            time: 0,
            head: Mat4::IDENTITY,
            offset_y: 0.0,
            render_mode: RenderMode::Standalone,
        }
    }
}

pub struct InputSource {
    hand: Handedness,
    index: usize,
    mappings: Vec<DeviceMapping>,
    actions: SourceActions,
    active: Option<usize>,
    resolver: StateResolver,
    hand_emulator: HandEmulator,
    haptics: HapticsSequencer,
    latches: DeviceLatches,
    elbow: Box<dyn ElbowModel + Send + Sync>,
    eye_height: f32,
}

impl std::fmt::Debug for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSource")
            .field("hand", &self.hand)
            .field("index", &self.index)
            .field("mappings", &self.mappings.len())
            .field("active", &self.active_mapping().map(|m| m.profile.as_str()))
            .field("hand_tracking", &self.hand_emulator.state())
            .finish()
    }
}

impl InputSource {
    /// Bind actions and create the hand tracker for one device
    ///
    /// # Arguments
    /// * `runtime` - Runtime the actions are created on
    /// * `registry` - Action namespace shared with the sibling device
    /// * `mappings` - Mappings already filtered for this system
    /// * `hand` - Which hand this device represents
    /// * `index` - Consumer device index, passed through to the delegate
    /// * `config` - Thresholds and heights
    ///
    /// # Returns
    /// The device, or the first construction failure
    pub fn create(
        runtime: &dyn XrRuntime,
        registry: &mut ActionRegistry,
        mappings: Vec<DeviceMapping>,
        hand: Handedness,
        index: usize,
        config: &ResolverConfig,
    ) -> Result<Self, InputError> {
        let actions = SourceActions::bind(registry, runtime, &mappings)?;
        let hand_emulator =
            HandEmulator::create(runtime, hand, config.pinch_threshold, config.eye_height)?;

        if mappings.is_empty() {
            warn!("No device mappings usable for {} hand, device stays disabled", hand.name());
        }

        Ok(Self {
            hand,
            index,
            mappings,
            actions,
            active: None,
            resolver: StateResolver::new(config.click_threshold),
            hand_emulator,
            haptics: HapticsSequencer::new(config.min_haptic_amplitude),
            latches: DeviceLatches::default(),
            elbow: Box::new(FixedElbowModel::default()),
            eye_height: config.eye_height,
        })
    }

    /// Replace the arm model used for orientation-only controllers
    pub fn with_elbow_model(mut self, elbow: Box<dyn ElbowModel + Send + Sync>) -> Self {
        self.elbow = elbow;
        self
    }

    pub fn hand(&self) -> Handedness {
        self.hand
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn actions(&self) -> &SourceActions {
        &self.actions
    }

    pub fn mappings(&self) -> &[DeviceMapping] {
        &self.mappings
    }

    pub fn active_mapping(&self) -> Option<&DeviceMapping> {
        self.active.and_then(|i| self.mappings.get(i))
    }

    pub fn hand_tracking_state(&self) -> HandTrackingState {
        self.hand_emulator.state()
    }

    /// Add this device's bindings to `bindings`
    pub fn suggest_bindings(&self, bindings: &mut SuggestedBindings) -> Result<(), InputError> {
        self.actions
            .suggest_bindings(&self.mappings, self.hand, bindings)
    }

    /// Visual model of the active mapping for this hand
    pub fn controller_model_name(&self) -> Option<&str> {
        self.active_mapping().and_then(|m| m.model_for(self.hand))
    }

    /// Select the active mapping from the runtime's (or an emulated) profile
    ///
    /// Returns `Ok` without change while the runtime has no profile yet.
    pub fn update_interaction_profile(
        &mut self,
        runtime: &dyn XrRuntime,
        delegate: &mut dyn ControllerDelegate,
        emulate_profile: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let profile = match emulate_profile {
            Some(profile) => profile.to_string(),
            None => match runtime.current_interaction_profile(self.hand)? {
                Some(profile) => profile,
                None => return Ok(()),
            },
        };

        let previous = self.active;
        self.active = self
            .mappings
            .iter()
            .position(|m| m.matches_profile(&profile));

        let Some(mapping) = self.active_mapping() else {
            if previous.is_some() || emulate_profile.is_some() {
                warn!("No mapping for {} hand profile {}", self.hand.name(), profile);
            }
            return Ok(());
        };

        if previous != self.active {
            info!(
                "{} hand using {} ({})",
                self.hand.name(),
                mapping.profile,
                mapping.controller_type
            );
        }

        let haptic_count = mapping.haptics_for(self.hand).count();
        let button_count = mapping.buttons_for(self.hand).count();
        delegate.set_haptic_count(self.index, haptic_count);

        // Emulated devices may never take the button path
        if emulate_profile.is_some() {
            delegate.set_button_count(self.index, button_count);
        }

        Ok(())
    }

    /// Resolve this frame's state into the delegate
    pub fn update(
        &mut self,
        runtime: &dyn XrRuntime,
        frame: &FrameContext,
        delegate: &mut dyn ControllerDelegate,
    ) {
        let drivable = self
            .active_mapping()
            .is_some_and(|m| m.model_for(self.hand).is_some());

        if drivable {
            self.update_device(runtime, frame, delegate);
        } else {
            delegate.set_enabled(self.index, false);
        }

        // Runs on every frame so a pulse in flight still gets its stop
        let request = delegate.haptic_feedback(self.index);
        self.haptics
            .update(runtime, self.actions.haptic, self.hand, &request);
    }

    fn update_device(
        &mut self,
        runtime: &dyn XrRuntime,
        frame: &FrameContext,
        delegate: &mut dyn ControllerDelegate,
    ) {
        match self.hand_emulator.track(runtime, frame.time) {
            Some(emulation) => {
                self.describe(delegate);
                self.hand_emulator.emulate(
                    &emulation,
                    delegate,
                    self.index,
                    frame.render_mode,
                    &mut self.latches,
                );
            }
            None if self.hand_emulator.state() == HandTrackingState::HandTrackedNoAim => {
                debug!("{} hand tracked without aim, skipping frame", self.hand.name());
            }
            None => {
                self.describe(delegate);

                if self.update_pose(runtime, frame, delegate) {
                    let input = self.resolve_input(runtime);
                    apply_resolved(
                        &input,
                        delegate,
                        self.index,
                        frame.render_mode,
                        &mut self.latches,
                    );
                }
            }
        }
    }

    /// Handedness, ray mode and controller type, sent on every driven frame
    fn describe(&self, delegate: &mut dyn ControllerDelegate) {
        delegate.set_left_handed(self.index, self.hand == Handedness::Left);
        delegate.set_target_ray_mode(self.index, TargetRayMode::TrackedPointer);
        if let Some(mapping) = self.active_mapping() {
            delegate.set_controller_type(self.index, &mapping.controller_type);
        }
    }

    /// Resolve buttons and axes of the active mapping without touching the delegate
    pub fn resolve_input(&self, runtime: &dyn XrRuntime) -> ResolvedInput {
        match self.active_mapping() {
            Some(mapping) => self
                .resolver
                .resolve(runtime, &self.actions, mapping, self.hand),
            None => ResolvedInput::default(),
        }
    }

    /// Pointer and grip poses; returns false when the device is disabled this frame
    fn update_pose(
        &self,
        runtime: &dyn XrRuntime,
        frame: &FrameContext,
        delegate: &mut dyn ControllerDelegate,
    ) -> bool {
        let location = match runtime.locate_pose(self.actions.pointer, self.hand, frame.time) {
            Ok(Some(location)) => location,
            Ok(None) => {
                delegate.set_enabled(self.index, false);
                return false;
            }
            Err(e) => {
                warn!("Failed to locate {} pointer pose: {}", self.hand.name(), e);
                delegate.set_enabled(self.index, false);
                return false;
            }
        };
        if !location.flags.contains(LocationFlags::ORIENTATION_VALID) {
            delegate.set_enabled(self.index, false);
            return false;
        }

        let mut pose = location.pose;
        pose.position.y += frame.offset_y;

        delegate.set_enabled(self.index, true);
        delegate.set_model_visible(self.index, true);
        delegate.set_hand_visible(self.index, false);

        let mut flags = CapabilityFlags::ORIENTATION;
        let mut pointer = pose.to_mat4();

        if location.flags.contains(LocationFlags::POSITION_TRACKED) {
            if frame.render_mode == RenderMode::Standalone {
                pointer = Mat4::from_translation(glam::Vec3::new(0.0, self.eye_height, 0.0))
                    * pointer;
            }
            flags |= CapabilityFlags::POSITION;
        } else {
            pointer = self.elbow.transform(self.hand, &frame.head, &pointer);
            flags |= CapabilityFlags::POSITION_EMULATED;
        }

        delegate.set_transform(self.index, pointer);

        match runtime.locate_pose(self.actions.grip, self.hand, frame.time) {
            Ok(Some(grip)) => {
                let mut grip_pose = grip.pose;
                grip_pose.position.y += frame.offset_y;
                let beam = if grip.flags.contains(LocationFlags::POSITION_TRACKED) {
                    grip_pose.to_mat4()
                } else {
                    pointer
                };
                delegate.set_immersive_beam_transform(self.index, beam);
                flags |= CapabilityFlags::GRIP_SPACE_POSITION;
                delegate.set_beam_transform(self.index, Mat4::IDENTITY);
            }
            Ok(None) => delegate.set_immersive_beam_transform(self.index, Mat4::IDENTITY),
            Err(e) => {
                debug!("Failed to locate {} grip pose: {}", self.hand.name(), e);
                delegate.set_immersive_beam_transform(self.index, Mat4::IDENTITY);
            }
        }

        delegate.set_capability_flags(self.index, flags);
        true
    }
}
