//! Per-frame state resolution for the active mapping
//!
//! [`StateResolver::resolve`] only reads from the runtime and returns a
//! [`ResolvedInput`]; [`apply_resolved`] pushes it to the delegate and runs
//! the edge latches. Queries that fail degrade to "absent" and are logged.

pub mod axes;
pub mod button;

use glam::Vec2;
use tracing::warn;

use crate::binder::SourceActions;
use crate::delegate::{Button, ControllerDelegate, RenderMode};
use crate::mapping::{AxisType, ButtonType, DeviceMapping};
use crate::runtime::{Handedness, XrRuntime};

pub use axes::{pack_axes, read_axis, ResolvedAxis, TouchLatch};
pub use button::{fuse_button_state, resolve_button, ResolvedButtonState, DEFAULT_CLICK_THRESHOLD};

/// Buttons that always occupy a slot, present on the device or not
pub const PLACEHOLDER_BUTTONS: [ButtonType; 3] =
    [ButtonType::Squeeze, ButtonType::Trackpad, ButtonType::Thumbstick];

/// A present button with its output addressing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedButton {
    pub button_type: ButtonType,
    pub semantic: Button,
    pub immersive_index: Option<u8>,
    pub state: ResolvedButtonState,
}

/// Everything the mapping path produced for one device this frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedInput {
    /// Present buttons in mapping order
    pub buttons: Vec<ResolvedButton>,
    /// Readable axes in mapping order
    pub axes: Vec<ResolvedAxis>,
    /// Present buttons plus missing placeholders
    pub button_count: usize,
    pub axes_vector: Vec<f32>,
}

impl ResolvedInput {
    pub fn button(&self, button_type: ButtonType) -> Option<&ResolvedButtonState> {
        self.buttons
            .iter()
            .find(|b| b.button_type == button_type)
            .map(|b| &b.state)
    }

    pub fn axis(&self, axis_type: AxisType) -> Option<Vec2> {
        self.axes
            .iter()
            .find(|a| a.axis_type == axis_type)
            .map(|a| a.value)
    }
}

/// Start/stop transition of a level-triggered input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    Stop,
}

/// Remembers last frame's level and reports transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeLatch {
    active: bool,
}

impl EdgeLatch {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn update(&mut self, level: bool) -> Option<Edge> {
        if level == self.active {
            return None;
        }
        self.active = level;
        Some(if level { Edge::Start } else { Edge::Stop })
    }
}

/// Frame-to-frame latches owned by one device
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceLatches {
    pub select: EdgeLatch,
    pub squeeze: EdgeLatch,
    pub touch: TouchLatch,
}

impl DeviceLatches {
    /// Emit select start/stop; only immersive sessions see these
    pub fn update_select(
        &mut self,
        delegate: &mut dyn ControllerDelegate,
        index: usize,
        render_mode: RenderMode,
        pressed: bool,
    ) {
        if render_mode != RenderMode::Immersive {
            return;
        }
        match self.select.update(pressed) {
            Some(Edge::Start) => delegate.set_select_action_start(index),
            Some(Edge::Stop) => delegate.set_select_action_stop(index),
            None => {}
        }
    }

    pub fn update_squeeze(
        &mut self,
        delegate: &mut dyn ControllerDelegate,
        index: usize,
        render_mode: RenderMode,
        pressed: bool,
    ) {
        if render_mode != RenderMode::Immersive {
            return;
        }
        match self.squeeze.update(pressed) {
            Some(Edge::Start) => delegate.set_squeeze_action_start(index),
            Some(Edge::Stop) => delegate.set_squeeze_action_stop(index),
            None => {}
        }
    }
}

/// Reads button and axis state for the active mapping
#[derive(Debug, Clone, Copy)]
pub struct StateResolver {
    click_threshold: f32,
}

impl Default for StateResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_THRESHOLD)
    }
}

impl StateResolver {
    pub fn new(click_threshold: f32) -> Self {
        Self { click_threshold }
    }

    pub fn click_threshold(&self) -> f32 {
        self.click_threshold
    }

    /// Resolve every button and axis of `mapping` that applies to `hand`
    pub fn resolve(
        &self,
        runtime: &dyn XrRuntime,
        actions: &SourceActions,
        mapping: &DeviceMapping,
        hand: Handedness,
    ) -> ResolvedInput {
        let mut input = ResolvedInput::default();
        let mut placeholders = PLACEHOLDER_BUTTONS.to_vec();

        for spec in mapping.buttons_for(hand) {
            let Some(button_actions) = actions.buttons.get(&spec.button_type) else {
                warn!("No actions bound for {} button", spec.button_type.name());
                continue;
            };
            let Some(state) =
                resolve_button(runtime, button_actions, spec, hand, self.click_threshold)
            else {
                continue;
            };

            placeholders.retain(|p| *p != spec.button_type);
            input.buttons.push(ResolvedButton {
                button_type: spec.button_type,
                semantic: spec.semantic_button(),
                immersive_index: spec.immersive_index(),
                state,
            });
        }
        input.button_count = input.buttons.len() + placeholders.len();

        for spec in mapping.axes_for(hand) {
            let Some(action) = actions.axes.get(&spec.axis_type) else {
                continue;
            };
            match read_axis(runtime, *action, spec.axis_type, hand) {
                Ok(value) => input.axes.push(ResolvedAxis {
                    axis_type: spec.axis_type,
                    value,
                }),
                Err(e) => warn!("Can't read {} axis at '{}': {}", hand.name(), spec.path, e),
            }
        }
        input.axes_vector = pack_axes(&input.axes);

        input
    }
}

/// Push resolved state to the delegate
pub fn apply_resolved(
    input: &ResolvedInput,
    delegate: &mut dyn ControllerDelegate,
    index: usize,
    render_mode: RenderMode,
    latches: &mut DeviceLatches,
) {
    let mut trackpad = ResolvedButtonState::default();

    for button in &input.buttons {
        let state = button.state;
        delegate.set_button_state(
            index,
            button.semantic,
            button.immersive_index,
            state.clicked,
            state.touched,
            state.value,
        );

        match button.button_type {
            ButtonType::Trigger => latches.update_select(delegate, index, render_mode, state.clicked),
            ButtonType::Squeeze => latches.update_squeeze(delegate, index, render_mode, state.clicked),
            ButtonType::Trackpad => trackpad = state,
            _ => {}
        }
    }
    delegate.set_button_count(index, input.button_count);

    let touching = trackpad.touched && !trackpad.clicked;
    let mut trackpad_read = false;

    for axis in &input.axes {
        match axis.axis_type {
            AxisType::Trackpad => {
                trackpad_read = true;
                latches.touch.update(delegate, index, touching, axis.value);
            }
            AxisType::Thumbstick => {
                delegate.set_scrolled_delta(index, axis.value.x, axis.value.y);
            }
            _ => {}
        }
    }
    // Without a position only the release can be reported
    if !trackpad_read && !touching {
        latches.touch.update(delegate, index, false, Vec2::ZERO);
    }
    delegate.set_axes(index, &input.axes_vector);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_set::ActionRegistry;
    use crate::mapping::{AxisSpec, ButtonFlags, ButtonSpec, Dof, HandSide};
    use crate::sim::{RecordingDelegate, SimulatedRuntime};

    fn mapping(buttons: Vec<ButtonSpec>, axes: Vec<AxisSpec>) -> DeviceMapping {
        DeviceMapping {
            profile: "/interaction_profiles/test/pad".to_string(),
            dof: Dof::SixDof,
            system_filter: None,
            controller_type: "test-pad".to_string(),
            buttons,
            axes,
            haptics: vec![],
            left_model: Some("pad-left".to_string()),
            right_model: Some("pad-right".to_string()),
        }
    }

    fn bind(runtime: &SimulatedRuntime, mapping: &DeviceMapping) -> SourceActions {
        let mut registry = ActionRegistry::new();
        SourceActions::bind(&mut registry, runtime, std::slice::from_ref(mapping)).unwrap()
    }

    #[test]
    fn test_button_count_with_placeholders() {
        let runtime = SimulatedRuntime::new();
        let m = mapping(
            vec![
                ButtonSpec::new(ButtonType::Trigger, HandSide::BOTH, ButtonFlags::CLICK, "input/trigger"),
                ButtonSpec::new(ButtonType::Trackpad, HandSide::BOTH, ButtonFlags::CLICK, "input/trackpad"),
            ],
            vec![],
        );
        let actions = bind(&runtime, &m);

        let input = StateResolver::default().resolve(&runtime, &actions, &m, Handedness::Right);
        assert_eq!(input.buttons.len(), 2);
        assert_eq!(input.button_count, 4);
    }

    #[test]
    fn test_unreadable_button_is_absent() {
        let runtime = SimulatedRuntime::new();
        let m = mapping(
            vec![
                ButtonSpec::new(ButtonType::Trigger, HandSide::BOTH, ButtonFlags::CLICK, "input/trigger"),
                ButtonSpec::new(ButtonType::A, HandSide::BOTH, ButtonFlags::CLICK, "input/a"),
            ],
            vec![],
        );
        let actions = bind(&runtime, &m);
        runtime.fail_queries(actions.buttons[&ButtonType::A].click.unwrap());

        let input = StateResolver::default().resolve(&runtime, &actions, &m, Handedness::Left);
        assert!(input.button(ButtonType::A).is_none());
        // Trigger + Squeeze/Trackpad/Thumbstick placeholders
        assert_eq!(input.button_count, 4);
    }

    #[test]
    fn test_hand_masks_are_respected() {
        let runtime = SimulatedRuntime::new();
        let m = mapping(
            vec![ButtonSpec::new(ButtonType::X, HandSide::LEFT, ButtonFlags::CLICK, "input/x")],
            vec![AxisSpec::new(AxisType::Thumbstick, HandSide::LEFT, "input/thumbstick")],
        );
        let actions = bind(&runtime, &m);

        let right = StateResolver::default().resolve(&runtime, &actions, &m, Handedness::Right);
        assert!(right.buttons.is_empty());
        assert!(right.axes.is_empty());
        assert_eq!(right.button_count, 3);

        let left = StateResolver::default().resolve(&runtime, &actions, &m, Handedness::Left);
        assert_eq!(left.buttons.len(), 1);
        assert_eq!(left.axes.len(), 1);
    }

    #[test]
    fn test_axes_read_through_runtime() {
        let runtime = SimulatedRuntime::new();
        let m = mapping(
            vec![],
            vec![
                AxisSpec::new(AxisType::Thumbstick, HandSide::BOTH, "input/thumbstick"),
                AxisSpec::new(AxisType::SqueezeForce, HandSide::BOTH, "input/squeeze/force"),
            ],
        );
        let actions = bind(&runtime, &m);
        runtime.set_vector2(actions.axes[&AxisType::Thumbstick], Handedness::Left, Vec2::new(0.5, 1.0));
        runtime.set_float(actions.axes[&AxisType::SqueezeForce], Handedness::Left, 0.4);

        let input = StateResolver::default().resolve(&runtime, &actions, &m, Handedness::Left);
        assert_eq!(input.axes_vector, vec![0.0, 0.0, 0.5, -1.0, 0.4, -0.0]);
        assert_eq!(input.axis(AxisType::Thumbstick), Some(Vec2::new(0.5, 1.0)));
    }

    #[test]
    fn test_touch_released_when_trackpad_axis_unreadable() {
        let runtime = SimulatedRuntime::new();
        let m = mapping(
            vec![ButtonSpec::new(
                ButtonType::Trackpad,
                HandSide::BOTH,
                ButtonFlags::CLICK | ButtonFlags::TOUCH,
                "input/trackpad",
            )],
            vec![AxisSpec::new(AxisType::Trackpad, HandSide::BOTH, "input/trackpad")],
        );
        let actions = bind(&runtime, &m);
        let resolver = StateResolver::default();
        let mut delegate = RecordingDelegate::new();
        let mut latches = DeviceLatches::default();
        let touch = actions.buttons[&ButtonType::Trackpad].touch.unwrap();
        let axis = actions.axes[&AxisType::Trackpad];

        runtime.set_bool(touch, Handedness::Left, true);
        runtime.set_vector2(axis, Handedness::Left, Vec2::new(0.2, 0.4));
        let input = resolver.resolve(&runtime, &actions, &m, Handedness::Left);
        apply_resolved(&input, &mut delegate, 0, RenderMode::Standalone, &mut latches);
        assert!(latches.touch.is_touching());

        // Still touched but unreadable: no position, no release
        runtime.fail_queries(axis);
        let input = resolver.resolve(&runtime, &actions, &m, Handedness::Left);
        apply_resolved(&input, &mut delegate, 0, RenderMode::Standalone, &mut latches);
        assert_eq!(delegate.count_events(0, "end_touch"), 0);

        runtime.set_bool(touch, Handedness::Left, false);
        for _ in 0..2 {
            let input = resolver.resolve(&runtime, &actions, &m, Handedness::Left);
            apply_resolved(&input, &mut delegate, 0, RenderMode::Standalone, &mut latches);
        }

        assert_eq!(delegate.count_events(0, "touch_position"), 1);
        assert_eq!(delegate.count_events(0, "end_touch"), 1);
        assert!(!latches.touch.is_touching());
    }

    #[test]
    fn test_edges_fire_once_per_transition() {
        let mut delegate = RecordingDelegate::new();
        let mut latches = DeviceLatches::default();

        for pressed in [false, false, true, true, false] {
            latches.update_select(&mut delegate, 0, RenderMode::Immersive, pressed);
        }
        assert_eq!(delegate.count_events(0, "select_start"), 1);
        assert_eq!(delegate.count_events(0, "select_stop"), 1);
    }

    #[test]
    fn test_no_edges_in_standalone() {
        let mut delegate = RecordingDelegate::new();
        let mut latches = DeviceLatches::default();

        latches.update_squeeze(&mut delegate, 0, RenderMode::Standalone, true);
        assert_eq!(delegate.count_events(0, "squeeze_start"), 0);
        assert!(!latches.squeeze.is_active());
    }

    proptest::proptest! {
        #[test]
        fn prop_edges_alternate(levels in proptest::collection::vec(proptest::bool::ANY, 0..40)) {
            let mut latch = EdgeLatch::default();
            let mut last = None;
            for level in levels {
                if let Some(edge) = latch.update(level) {
                    proptest::prop_assert_ne!(Some(edge), last);
                    last = Some(edge);
                }
            }
            // The first edge can only be a start
            let mut latch = EdgeLatch::default();
            proptest::prop_assert_ne!(latch.update(false), Some(Edge::Stop));
        }
    }
}
