//! In-process simulated XR runtime
//!
//! [`SimulatedRuntime`] implements [`XrRuntime`] over plain in-memory state:
//! values are set by tests or a replay script and read back by the resolver.
//! It also records what the resolver asked of it (created actions, suggested
//! bindings, haptic calls) and can be told to fail specific calls.

pub mod delegate;
pub mod script;

use glam::Vec2;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;

use crate::binder::SuggestedBindings;
use crate::error::RuntimeError;
use crate::mapping::HandSide;
use crate::runtime::{
    ActionHandle, ActionKind, AimState, HandJoints, HandTrackerHandle, Handedness,
    SpaceLocation, SuggestedBinding, XrRuntime,
};

pub use delegate::{ButtonSnapshot, DeviceSnapshot, RecordedEvent, RecordingDelegate};
pub use script::{Replay, ReplayScript};

/// Result code used for injected failures
pub const SIMULATED_FAILURE: i32 = -1;

/// A haptic call received by the simulated runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HapticCall {
    Start {
        action: ActionHandle,
        hand: Handedness,
        duration_nanos: i64,
        frequency: f32,
        amplitude: f32,
    },
    Stop {
        action: ActionHandle,
        hand: Handedness,
    },
}

#[derive(Debug, Clone)]
struct SimAction {
    name: String,
    kind: ActionKind,
    hands: HandSide,
}

#[derive(Debug, Default)]
struct SimState {
    next_handle: u64,
    actions: BTreeMap<ActionHandle, SimAction>,
    bindings: SuggestedBindings,
    profiles: HashMap<Handedness, String>,

    bools: HashMap<(ActionHandle, Handedness), bool>,
    floats: HashMap<(ActionHandle, Handedness), f32>,
    vectors: HashMap<(ActionHandle, Handedness), Vec2>,
    poses: HashMap<(ActionHandle, Handedness), SpaceLocation>,

    hand_tracking: bool,
    aim_extension: bool,
    trackers: HashMap<HandTrackerHandle, Handedness>,
    joints: HashMap<Handedness, HandJoints>,
    aim_states: HashMap<Handedness, AimState>,

    haptic_calls: Vec<HapticCall>,

    failing_action_names: HashSet<String>,
    failing_queries: HashSet<ActionHandle>,
    failing_profiles: HashSet<String>,
    fail_tracker_creation: bool,
    fail_haptics: bool,
}

impl SimState {
    fn issue_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn check_query(&self, action: ActionHandle, call: &'static str) -> Result<(), RuntimeError> {
        if !self.actions.contains_key(&action) {
            return Err(RuntimeError::InvalidHandle(action.0, call));
        }
        if self.failing_queries.contains(&action) {
            return Err(RuntimeError::failed(call, SIMULATED_FAILURE));
        }
        Ok(())
    }
}

/// Thread-safe in-memory runtime
#[derive(Debug, Default)]
pub struct SimulatedRuntime {
    state: Mutex<SimState>,
}

impl SimulatedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Inspection ---

    pub fn created_action_count(&self) -> usize {
        self.state.lock().actions.len()
    }

    pub fn action_kind(&self, action: ActionHandle) -> Option<ActionKind> {
        self.state.lock().actions.get(&action).map(|a| a.kind)
    }

    pub fn action_hands(&self, action: ActionHandle) -> Option<HandSide> {
        self.state.lock().actions.get(&action).map(|a| a.hands)
    }

    /// Handle of the action created under `name`
    pub fn action_by_name(&self, name: &str) -> Option<ActionHandle> {
        self.state
            .lock()
            .actions
            .iter()
            .find(|(_, a)| a.name == name)
            .map(|(h, _)| *h)
    }

    /// Bindings submitted so far, per profile
    pub fn suggested_bindings(&self) -> SuggestedBindings {
        self.state.lock().bindings.clone()
    }

    pub fn haptic_calls(&self) -> Vec<HapticCall> {
        self.state.lock().haptic_calls.clone()
    }

    pub fn clear_haptic_calls(&self) {
        self.state.lock().haptic_calls.clear();
    }

    // --- Inputs ---

    pub fn set_interaction_profile(&self, hand: Handedness, profile: Option<&str>) {
        let mut state = self.state.lock();
        match profile {
            Some(p) => state.profiles.insert(hand, p.to_string()),
            None => state.profiles.remove(&hand),
        };
    }

    pub fn set_bool(&self, action: ActionHandle, hand: Handedness, value: bool) {
        self.state.lock().bools.insert((action, hand), value);
    }

    pub fn set_float(&self, action: ActionHandle, hand: Handedness, value: f32) {
        self.state.lock().floats.insert((action, hand), value);
    }

    pub fn set_vector2(&self, action: ActionHandle, hand: Handedness, value: Vec2) {
        self.state.lock().vectors.insert((action, hand), value);
    }

    /// Set a pose action's location; `None` makes the pose inactive
    pub fn set_pose(&self, action: ActionHandle, hand: Handedness, location: Option<SpaceLocation>) {
        let mut state = self.state.lock();
        match location {
            Some(l) => state.poses.insert((action, hand), l),
            None => state.poses.remove(&(action, hand)),
        };
    }

    /// Enable the hand tracking and aim extensions; affects trackers created afterwards
    pub fn set_hand_tracking_support(&self, hand_tracking: bool, aim: bool) {
        let mut state = self.state.lock();
        state.hand_tracking = hand_tracking;
        state.aim_extension = aim;
    }

    pub fn set_hand_joints(&self, hand: Handedness, joints: HandJoints) {
        self.state.lock().joints.insert(hand, joints);
    }

    pub fn set_aim_state(&self, hand: Handedness, aim: Option<AimState>) {
        let mut state = self.state.lock();
        match aim {
            Some(a) => state.aim_states.insert(hand, a),
            None => state.aim_states.remove(&hand),
        };
    }

    // --- Failure injection ---

    pub fn fail_action_creation(&self, name: &str) {
        self.state.lock().failing_action_names.insert(name.to_string());
    }

    pub fn fail_queries(&self, action: ActionHandle) {
        self.state.lock().failing_queries.insert(action);
    }

    pub fn restore_queries(&self, action: ActionHandle) {
        self.state.lock().failing_queries.remove(&action);
    }

    pub fn fail_binding_suggestion(&self, profile: &str) {
        self.state.lock().failing_profiles.insert(profile.to_string());
    }

    pub fn fail_hand_tracker_creation(&self) {
        self.state.lock().fail_tracker_creation = true;
    }

    pub fn fail_haptics(&self, fail: bool) {
        self.state.lock().fail_haptics = fail;
    }
}

impl XrRuntime for SimulatedRuntime {
    fn create_action(
        &self,
        kind: ActionKind,
        name: &str,
        hands: HandSide,
    ) -> Result<ActionHandle, RuntimeError> {
        let mut state = self.state.lock();
        if state.failing_action_names.contains(name) {
            return Err(RuntimeError::failed("create_action", SIMULATED_FAILURE));
        }

        let handle = ActionHandle(state.issue_handle());
        state.actions.insert(
            handle,
            SimAction {
                name: name.to_string(),
                kind,
                hands,
            },
        );
        trace!("Simulated action '{}' -> {:?}", name, handle);
        Ok(handle)
    }

    fn suggest_bindings(
        &self,
        profile: &str,
        bindings: &[SuggestedBinding],
    ) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        if state.failing_profiles.contains(profile) {
            return Err(RuntimeError::failed("suggest_bindings", SIMULATED_FAILURE));
        }
        for binding in bindings {
            if !state.actions.contains_key(&binding.action) {
                return Err(RuntimeError::InvalidHandle(binding.action.0, "suggest_bindings"));
            }
        }
        state
            .bindings
            .insert(profile.to_string(), bindings.to_vec());
        Ok(())
    }

    fn current_interaction_profile(
        &self,
        hand: Handedness,
    ) -> Result<Option<String>, RuntimeError> {
        Ok(self.state.lock().profiles.get(&hand).cloned())
    }

    fn query_bool(&self, action: ActionHandle, hand: Handedness) -> Result<bool, RuntimeError> {
        let state = self.state.lock();
        state.check_query(action, "query_bool")?;
        Ok(state.bools.get(&(action, hand)).copied().unwrap_or(false))
    }

    fn query_float(&self, action: ActionHandle, hand: Handedness) -> Result<f32, RuntimeError> {
        let state = self.state.lock();
        state.check_query(action, "query_float")?;
        Ok(state.floats.get(&(action, hand)).copied().unwrap_or(0.0))
    }

    fn query_vector2(&self, action: ActionHandle, hand: Handedness) -> Result<Vec2, RuntimeError> {
        let state = self.state.lock();
        state.check_query(action, "query_vector2")?;
        Ok(state.vectors.get(&(action, hand)).copied().unwrap_or(Vec2::ZERO))
    }

    fn locate_pose(
        &self,
        action: ActionHandle,
        hand: Handedness,
        _time: i64,
    ) -> Result<Option<SpaceLocation>, RuntimeError> {
        let state = self.state.lock();
        state.check_query(action, "locate_pose")?;
        Ok(state.poses.get(&(action, hand)).copied())
    }

    fn supports_hand_tracking(&self) -> bool {
        self.state.lock().hand_tracking
    }

    fn supports_aim_state(&self) -> bool {
        self.state.lock().aim_extension
    }

    fn create_hand_tracker(&self, hand: Handedness) -> Result<HandTrackerHandle, RuntimeError> {
        let mut state = self.state.lock();
        if !state.hand_tracking {
            return Err(RuntimeError::Unsupported("create_hand_tracker"));
        }
        if state.fail_tracker_creation {
            return Err(RuntimeError::failed("create_hand_tracker", SIMULATED_FAILURE));
        }
        let handle = HandTrackerHandle(state.issue_handle());
        state.trackers.insert(handle, hand);
        Ok(handle)
    }

    fn locate_hand_joints(
        &self,
        tracker: HandTrackerHandle,
        _time: i64,
    ) -> Result<HandJoints, RuntimeError> {
        let state = self.state.lock();
        let hand = state
            .trackers
            .get(&tracker)
            .ok_or(RuntimeError::InvalidHandle(tracker.0, "locate_hand_joints"))?;
        Ok(state.joints.get(hand).cloned().unwrap_or_default())
    }

    fn query_aim_state(&self, tracker: HandTrackerHandle) -> Result<Option<AimState>, RuntimeError> {
        let state = self.state.lock();
        if !state.aim_extension {
            return Err(RuntimeError::Unsupported("query_aim_state"));
        }
        let hand = state
            .trackers
            .get(&tracker)
            .ok_or(RuntimeError::InvalidHandle(tracker.0, "query_aim_state"))?;
        Ok(state.aim_states.get(hand).copied())
    }

    fn apply_haptic_pulse(
        &self,
        action: ActionHandle,
        hand: Handedness,
        duration_nanos: i64,
        frequency: f32,
        amplitude: f32,
    ) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.check_query(action, "apply_haptic_pulse")?;
        state.haptic_calls.push(HapticCall::Start {
            action,
            hand,
            duration_nanos,
            frequency,
            amplitude,
        });
        if state.fail_haptics {
            return Err(RuntimeError::failed("apply_haptic_pulse", SIMULATED_FAILURE));
        }
        Ok(())
    }

    fn stop_haptic_pulse(&self, action: ActionHandle, hand: Handedness) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.check_query(action, "stop_haptic_pulse")?;
        state.haptic_calls.push(HapticCall::Stop { action, hand });
        if state.fail_haptics {
            return Err(RuntimeError::failed("stop_haptic_pulse", SIMULATED_FAILURE));
        }
        Ok(())
    }
}
