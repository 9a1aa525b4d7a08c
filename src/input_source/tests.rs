use super::*;
use crate::delegate::Button;
use crate::mapping::{AxisSpec, AxisType, ButtonFlags, ButtonSpec, ButtonType, Dof, HandSide, HapticSpec, MappingCatalog, SystemProperties};
use crate::runtime::{AimState, AimStatus, HandJointLocation, HandJoints, Pose, SpaceLocation};
use crate::sim::{HapticCall, RecordingDelegate, SimulatedRuntime};
use crate::delegate::HapticRequest;
use glam::{Quat, Vec2, Vec3};

const VIVE: &str = "/interaction_profiles/htc/vive_controller";
const TOUCH: &str = "/interaction_profiles/oculus/touch_controller";

fn quest_mappings() -> Vec<DeviceMapping> {
    MappingCatalog::builtin().filter(&SystemProperties::new("Oculus Quest2", true))
}

fn create(runtime: &SimulatedRuntime, mappings: Vec<DeviceMapping>, hand: Handedness) -> InputSource {
    let mut registry = ActionRegistry::new();
    let index = if hand == Handedness::Left { 0 } else { 1 };
    InputSource::create(runtime, &mut registry, mappings, hand, index, &ResolverConfig::default()).unwrap()
}

fn tracked(position: Vec3) -> Option<SpaceLocation> {
    Some(SpaceLocation {
        pose: Pose::new(Quat::IDENTITY, position),
        flags: LocationFlags::TRACKED,
    })
}

fn activate(
    source: &mut InputSource,
    runtime: &SimulatedRuntime,
    delegate: &mut RecordingDelegate,
    profile: &str,
) {
    runtime.set_interaction_profile(source.hand(), Some(profile));
    source.update_interaction_profile(runtime, delegate, None).unwrap();
    runtime.set_pose(source.actions().pointer, source.hand(), tracked(Vec3::new(0.2, 0.0, -0.3)));
}

fn immersive() -> FrameContext {
    FrameContext {
        render_mode: RenderMode::Immersive,
        ..FrameContext::default()
    }
}

#[test]
fn test_disabled_without_profile() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();

    source.update_interaction_profile(&runtime, &mut delegate, None).unwrap();
    assert!(source.active_mapping().is_none());
    assert!(source.controller_model_name().is_none());

    source.update(&runtime, &FrameContext::default(), &mut delegate);
    assert_eq!(delegate.device(0).unwrap().enabled, Some(false));
    assert_eq!(delegate.events().len(), 1);
}

#[test]
fn test_profile_selects_mapping() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Right);
    let mut delegate = RecordingDelegate::new();

    runtime.set_interaction_profile(Handedness::Right, Some(VIVE));
    source.update_interaction_profile(&runtime, &mut delegate, None).unwrap();

    assert_eq!(source.active_mapping().unwrap().controller_type, "htc-vive");
    assert_eq!(source.controller_model_name(), Some("vive-wand"));
    let device = delegate.device(1).unwrap();
    assert_eq!(device.haptic_count, Some(1));
    // Button count is only pushed here for emulated profiles
    assert_eq!(device.button_count, None);
}

#[test]
fn test_emulated_profile_sets_button_count() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();

    source
        .update_interaction_profile(&runtime, &mut delegate, Some("/interaction_profiles/ext/hand_interaction_ext"))
        .unwrap();

    assert_eq!(source.controller_model_name(), Some("generic-hand-left"));
    let device = delegate.device(0).unwrap();
    assert_eq!(device.button_count, Some(2));
    assert_eq!(device.haptic_count, Some(0));
}

#[test]
fn test_profile_query_failure_propagates() {
    struct Failing(SimulatedRuntime);
    // Only the profile query fails; everything else goes to the simulator
    impl XrRuntime for Failing {
        fn create_action(&self, kind: crate::runtime::ActionKind, name: &str, hands: HandSide) -> Result<crate::runtime::ActionHandle, RuntimeError> { self.0.create_action(kind, name, hands) }
        fn suggest_bindings(&self, profile: &str, bindings: &[crate::runtime::SuggestedBinding]) -> Result<(), RuntimeError> { self.0.suggest_bindings(profile, bindings) }
        fn current_interaction_profile(&self, _hand: Handedness) -> Result<Option<String>, RuntimeError> { Err(RuntimeError::failed("current_interaction_profile", -3)) }
        fn query_bool(&self, a: crate::runtime::ActionHandle, h: Handedness) -> Result<bool, RuntimeError> { self.0.query_bool(a, h) }
        fn query_float(&self, a: crate::runtime::ActionHandle, h: Handedness) -> Result<f32, RuntimeError> { self.0.query_float(a, h) }
        fn query_vector2(&self, a: crate::runtime::ActionHandle, h: Handedness) -> Result<Vec2, RuntimeError> { self.0.query_vector2(a, h) }
        fn locate_pose(&self, a: crate::runtime::ActionHandle, h: Handedness, t: i64) -> Result<Option<SpaceLocation>, RuntimeError> { self.0.locate_pose(a, h, t) }
        fn supports_hand_tracking(&self) -> bool { false }
        fn supports_aim_state(&self) -> bool { false }
        fn create_hand_tracker(&self, h: Handedness) -> Result<crate::runtime::HandTrackerHandle, RuntimeError> { self.0.create_hand_tracker(h) }
        fn locate_hand_joints(&self, t: crate::runtime::HandTrackerHandle, time: i64) -> Result<HandJoints, RuntimeError> { self.0.locate_hand_joints(t, time) }
        fn query_aim_state(&self, t: crate::runtime::HandTrackerHandle) -> Result<Option<AimState>, RuntimeError> { self.0.query_aim_state(t) }
        fn apply_haptic_pulse(&self, a: crate::runtime::ActionHandle, h: Handedness, d: i64, f: f32, amp: f32) -> Result<(), RuntimeError> { self.0.apply_haptic_pulse(a, h, d, f, amp) }
        fn stop_haptic_pulse(&self, a: crate::runtime::ActionHandle, h: Handedness) -> Result<(), RuntimeError> { self.0.stop_haptic_pulse(a, h) }
    }

    let runtime = Failing(SimulatedRuntime::new());
    let mut registry = ActionRegistry::new();
    let mut source = InputSource::create(&runtime, &mut registry, quest_mappings(), Handedness::Left, 0, &ResolverConfig::default()).unwrap();
    let mut delegate = RecordingDelegate::new();

    assert!(source.update_interaction_profile(&runtime, &mut delegate, None).is_err());
    assert!(source.active_mapping().is_none());
}

#[test]
fn test_pose_path_standalone() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);
    runtime.set_pose(source.actions().grip, Handedness::Left, tracked(Vec3::new(0.2, -0.05, -0.25)));

    let frame = FrameContext {
        offset_y: 0.1,
        ..FrameContext::default()
    };
    source.update(&runtime, &frame, &mut delegate);

    let device = delegate.device(0).unwrap();
    assert_eq!(device.enabled, Some(true));
    assert_eq!(device.left_handed, Some(true));
    assert_eq!(device.target_ray_mode, Some(TargetRayMode::TrackedPointer));
    assert_eq!(device.controller_type.as_deref(), Some("oculus-touch"));
    assert_eq!(device.model_visible, Some(true));
    assert_eq!(device.hand_visible, Some(false));
    assert_eq!(
        device.capability_flags,
        Some(CapabilityFlags::ORIENTATION | CapabilityFlags::POSITION | CapabilityFlags::GRIP_SPACE_POSITION)
    );

    // offset_y plus eye height on the pointer
    let pointer = device.transform.unwrap().w_axis.truncate();
    assert!((pointer - Vec3::new(0.2, 0.1 + 1.7, -0.3)).length() < 1e-5);

    // Immersive beam is the tracked grip, without eye height
    let grip = device.immersive_beam_transform.unwrap().w_axis.truncate();
    assert!((grip - Vec3::new(0.2, 0.05, -0.25)).length() < 1e-5);
    assert_eq!(device.beam_transform, Some(Mat4::IDENTITY));
}

#[test]
fn test_orientation_only_uses_elbow_model() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Right);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);
    runtime.set_pose(
        source.actions().pointer,
        Handedness::Right,
        Some(SpaceLocation {
            pose: Pose::IDENTITY,
            flags: LocationFlags::ORIENTATION_VALID | LocationFlags::ORIENTATION_TRACKED,
        }),
    );

    let frame = FrameContext {
        head: Mat4::from_translation(Vec3::new(0.0, 1.6, 0.0)),
        ..FrameContext::default()
    };
    source.update(&runtime, &frame, &mut delegate);

    let device = delegate.device(1).unwrap();
    let flags = device.capability_flags.unwrap();
    assert!(flags.contains(CapabilityFlags::POSITION_EMULATED));
    assert!(!flags.contains(CapabilityFlags::POSITION));
    // No grip pose: immersive beam falls back to identity
    assert!(!flags.contains(CapabilityFlags::GRIP_SPACE_POSITION));
    assert_eq!(device.immersive_beam_transform, Some(Mat4::IDENTITY));

    let position = device.transform.unwrap().w_axis.truncate();
    assert!(position.x > 0.0 && position.y < 1.6);
}

#[test]
fn test_failed_pointer_query_disables_for_one_frame() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);

    runtime.fail_queries(source.actions().pointer);
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    assert_eq!(delegate.device(0).unwrap().enabled, Some(false));
    assert_eq!(delegate.count_events(0, "button_state"), 0);

    runtime.restore_queries(source.actions().pointer);
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    assert_eq!(delegate.device(0).unwrap().enabled, Some(true));
}

#[test]
fn test_inactive_or_invalid_pointer_disables() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);

    runtime.set_pose(source.actions().pointer, Handedness::Left, None);
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    assert_eq!(delegate.device(0).unwrap().enabled, Some(false));

    runtime.set_pose(
        source.actions().pointer,
        Handedness::Left,
        Some(SpaceLocation {
            pose: Pose::IDENTITY,
            flags: LocationFlags::POSITION_VALID,
        }),
    );
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    assert_eq!(delegate.device(0).unwrap().enabled, Some(false));
}

#[test]
fn test_buttons_through_update() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Right);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);

    let a = source.actions().buttons[&ButtonType::A];
    let trigger = source.actions().buttons[&ButtonType::Trigger];
    runtime.set_bool(a.click.unwrap(), Handedness::Right, true);
    runtime.set_float(trigger.value.unwrap(), Handedness::Right, 0.95);

    source.update(&runtime, &immersive(), &mut delegate);

    let device = delegate.device(1).unwrap();
    let a_state = device.button(Button::A).unwrap();
    assert!(a_state.clicked && !a_state.touched);
    assert_eq!(a_state.immersive_index, Some(4));
    assert_eq!(a_state.value, 1.0);

    let trigger_state = device.button(Button::Trigger).unwrap();
    assert!(trigger_state.clicked);
    assert_eq!(delegate.count_events(1, "select_start"), 1);

    // Trigger, squeeze, thumbstick, thumbrest, A, B plus the trackpad placeholder
    assert_eq!(device.button_count, Some(7));
    // X/Y are left-only
    assert!(device.button(Button::X).is_none());
}

#[test]
fn test_placeholder_button_count() {
    let runtime = SimulatedRuntime::new();
    let mapping = DeviceMapping {
        profile: "/interaction_profiles/test/remote".to_string(),
        dof: Dof::SixDof,
        system_filter: None,
        controller_type: "test-remote".to_string(),
        buttons: vec![
            ButtonSpec::new(ButtonType::Trigger, HandSide::BOTH, ButtonFlags::CLICK, "input/trigger"),
            ButtonSpec::new(ButtonType::Trackpad, HandSide::BOTH, ButtonFlags::CLICK | ButtonFlags::TOUCH, "input/trackpad"),
        ],
        axes: vec![AxisSpec::new(AxisType::Trackpad, HandSide::BOTH, "input/trackpad")],
        haptics: vec![HapticSpec::new(HandSide::BOTH, "output/haptic")],
        left_model: Some("remote".to_string()),
        right_model: Some("remote".to_string()),
    };
    let mut source = create(&runtime, vec![mapping], Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, "/interaction_profiles/test/remote");

    source.update(&runtime, &FrameContext::default(), &mut delegate);
    assert_eq!(delegate.device(0).unwrap().button_count, Some(4));
}

#[test]
fn test_trackpad_touch_and_release() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, VIVE);

    let pad = source.actions().buttons[&ButtonType::Trackpad];
    let axis = source.actions().axes[&AxisType::Trackpad];
    runtime.set_bool(pad.touch.unwrap(), Handedness::Left, true);
    runtime.set_vector2(axis, Handedness::Left, Vec2::new(0.3, 0.6));

    source.update(&runtime, &FrameContext::default(), &mut delegate);
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    let device = delegate.device(0).unwrap();
    assert_eq!(device.touch_position, Some([0.3, 0.6]));
    assert_eq!(&device.axes[..2], &[0.3, -0.6]);

    // Clicking ends the touch, once
    runtime.set_bool(pad.click.unwrap(), Handedness::Left, true);
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    runtime.set_bool(pad.click.unwrap(), Handedness::Left, false);
    runtime.set_bool(pad.touch.unwrap(), Handedness::Left, false);
    source.update(&runtime, &FrameContext::default(), &mut delegate);

    assert_eq!(delegate.count_events(0, "touch_position"), 2);
    assert_eq!(delegate.count_events(0, "end_touch"), 1);
}

#[test]
fn test_thumbstick_scrolls() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Right);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);

    let stick = source.actions().axes[&AxisType::Thumbstick];
    runtime.set_vector2(stick, Handedness::Right, Vec2::new(-0.5, 0.75));
    source.update(&runtime, &FrameContext::default(), &mut delegate);

    let device = delegate.device(1).unwrap();
    assert_eq!(device.scrolled_delta, Some([-0.5, 0.75]));
    assert_eq!(device.axes, vec![0.0, 0.0, -0.5, -0.75]);
}

#[test]
fn test_missing_model_keeps_device_disabled() {
    let runtime = SimulatedRuntime::new();
    let mut mapping = quest_mappings()[0].clone();
    mapping.left_model = None;
    let profile = mapping.profile.clone();
    let mut source = create(&runtime, vec![mapping], Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, &profile);

    source.update(&runtime, &FrameContext::default(), &mut delegate);
    assert_eq!(delegate.device(0).unwrap().enabled, Some(false));
    assert!(delegate.device(0).unwrap().transform.is_none());
}

#[test]
fn test_haptics_follow_requests() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);

    delegate.set_haptic_request(0, HapticRequest { frame_id: 9, duration: 0.5, intensity: 0.05 });
    for _ in 0..3 {
        source.update(&runtime, &FrameContext::default(), &mut delegate);
    }
    delegate.set_haptic_request(0, HapticRequest::default());
    for _ in 0..3 {
        source.update(&runtime, &FrameContext::default(), &mut delegate);
    }

    let calls = runtime.haptic_calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        HapticCall::Start { hand, duration_nanos, amplitude, .. } => {
            assert_eq!(*hand, Handedness::Left);
            assert_eq!(*duration_nanos, 500_000_000);
            assert_eq!(*amplitude, 0.1);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(calls[1], HapticCall::Stop { .. }));
}

#[test]
fn test_lost_profile_still_stops_pulse() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);

    delegate.set_haptic_request(0, HapticRequest { frame_id: 4, duration: 5.0, intensity: 1.0 });
    source.update(&runtime, &FrameContext::default(), &mut delegate);

    runtime.set_interaction_profile(Handedness::Left, Some("/interaction_profiles/unknown/wand"));
    source.update_interaction_profile(&runtime, &mut delegate, None).unwrap();
    assert!(source.active_mapping().is_none());

    delegate.set_haptic_request(0, HapticRequest::default());
    for _ in 0..3 {
        source.update(&runtime, &FrameContext::default(), &mut delegate);
    }

    assert_eq!(delegate.device(0).unwrap().enabled, Some(false));
    let calls = runtime.haptic_calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], HapticCall::Start { duration_nanos: 5_000_000_000, .. }));
    assert!(matches!(calls[1], HapticCall::Stop { hand: Handedness::Left, .. }));
}

#[test]
fn test_missing_model_still_stops_pulse() {
    let runtime = SimulatedRuntime::new();
    let mut mapping = quest_mappings()[0].clone();
    mapping.right_model = None;
    let profile = mapping.profile.clone();
    let mut source = create(&runtime, vec![mapping], Handedness::Right);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, &profile);

    delegate.set_haptic_request(1, HapticRequest { frame_id: 3, duration: 0.2, intensity: 0.5 });
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    delegate.set_haptic_request(1, HapticRequest::default());
    source.update(&runtime, &FrameContext::default(), &mut delegate);

    let calls = runtime.haptic_calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[1], HapticCall::Stop { .. }));
}

#[test]
fn test_failed_haptics_are_not_retried() {
    let runtime = SimulatedRuntime::new();
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);
    runtime.fail_haptics(true);

    delegate.set_haptic_request(0, HapticRequest { frame_id: 2, duration: 0.1, intensity: 1.0 });
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    source.update(&runtime, &FrameContext::default(), &mut delegate);

    assert_eq!(runtime.haptic_calls().len(), 1);
    assert_eq!(delegate.device(0).unwrap().enabled, Some(true));
}

fn hand_runtime(aim: bool) -> SimulatedRuntime {
    let runtime = SimulatedRuntime::new();
    runtime.set_hand_tracking_support(true, aim);
    runtime
}

fn active_hand() -> HandJoints {
    let mut joints = HandJoints {
        is_active: true,
        ..HandJoints::default()
    };
    for joint in joints.joints.iter_mut() {
        *joint = HandJointLocation {
            pose: Pose::IDENTITY,
            radius: 0.008,
            flags: LocationFlags::TRACKED,
        };
    }
    joints
}

#[test]
fn test_tracked_hand_with_aim_emulates_controller() {
    let runtime = hand_runtime(true);
    let mut source = create(&runtime, quest_mappings(), Handedness::Right);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);

    runtime.set_hand_joints(Handedness::Right, active_hand());
    runtime.set_aim_state(
        Handedness::Right,
        Some(AimState {
            status: AimStatus::VALID | AimStatus::MIDDLE_PINCHING,
            aim_pose: Pose::new(Quat::IDENTITY, Vec3::new(0.0, 0.0, -0.2)),
            ..AimState::default()
        }),
    );

    source.update(&runtime, &immersive(), &mut delegate);

    assert_eq!(source.hand_tracking_state(), HandTrackingState::HandTrackedWithAim);
    let device = delegate.device(1).unwrap();
    assert_eq!(device.hand_visible, Some(true));
    assert_eq!(device.model_visible, Some(false));
    assert!(device.button(Button::Squeeze).unwrap().clicked);
    assert_eq!(delegate.count_events(1, "squeeze_start"), 1);
    // Emulated frames still describe the device
    assert_eq!(device.left_handed, Some(false));
    assert_eq!(device.target_ray_mode, Some(TargetRayMode::TrackedPointer));
    assert_eq!(device.controller_type.as_deref(), Some("oculus-touch"));
    // The mapping path did not run
    assert_eq!(device.button_count, None);
    assert!(device.transform.is_some());
}

#[test]
fn test_tracked_hand_without_aim_writes_nothing() {
    let runtime = hand_runtime(true);
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);

    // One normal frame first
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    let before = delegate.device(0).unwrap().clone();
    let events_before = delegate.events().len();

    runtime.set_hand_joints(Handedness::Left, active_hand());
    runtime.set_aim_state(
        Handedness::Left,
        Some(AimState {
            status: AimStatus::COMPUTED | AimStatus::INDEX_PINCHING,
            ..AimState::default()
        }),
    );
    source.update(&runtime, &FrameContext::default(), &mut delegate);

    assert_eq!(source.hand_tracking_state(), HandTrackingState::HandTrackedNoAim);
    assert_eq!(delegate.events().len(), events_before);
    assert_eq!(delegate.device(0).unwrap(), &before);
}

#[test]
fn test_hand_lost_returns_to_mapping_path() {
    let runtime = hand_runtime(true);
    let mut source = create(&runtime, quest_mappings(), Handedness::Left);
    let mut delegate = RecordingDelegate::new();
    activate(&mut source, &runtime, &mut delegate, TOUCH);

    runtime.set_hand_joints(Handedness::Left, active_hand());
    runtime.set_aim_state(
        Handedness::Left,
        Some(AimState {
            status: AimStatus::VALID,
            ..AimState::default()
        }),
    );
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    assert_eq!(delegate.device(0).unwrap().hand_visible, Some(true));

    runtime.set_hand_joints(Handedness::Left, HandJoints::default());
    source.update(&runtime, &FrameContext::default(), &mut delegate);
    assert_eq!(source.hand_tracking_state(), HandTrackingState::NoHand);
    let device = delegate.device(0).unwrap();
    assert_eq!(device.hand_visible, Some(false));
    assert_eq!(device.model_visible, Some(true));
}
