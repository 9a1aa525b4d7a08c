//! Axis reading and xr-standard packaging

use glam::Vec2;

use crate::delegate::{
    ControllerDelegate, IMMERSIVE_AXIS_THUMBSTICK_X, IMMERSIVE_AXIS_THUMBSTICK_Y,
    IMMERSIVE_AXIS_TOUCHPAD_X, IMMERSIVE_AXIS_TOUCHPAD_Y,
};
use crate::error::RuntimeError;
use crate::mapping::AxisType;
use crate::runtime::{ActionHandle, Handedness, XrRuntime};

/// Fixed slots reserved at the front of the axes vector
pub const FIXED_AXIS_SLOTS: usize = 4;

/// One axis reading, in device convention (up is positive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedAxis {
    pub axis_type: AxisType,
    pub value: Vec2,
}

/// Read an axis action; scalar axes come back as `(v, 0)`
pub fn read_axis(
    runtime: &dyn XrRuntime,
    action: ActionHandle,
    axis_type: AxisType,
    hand: Handedness,
) -> Result<Vec2, RuntimeError> {
    if axis_type.is_two_dimensional() {
        runtime.query_vector2(action, hand)
    } else {
        runtime.query_float(action, hand).map(|v| Vec2::new(v, 0.0))
    }
}

/// Package readings into the consumer's axes vector
///
/// Trackpad and thumbstick land in slots 0-3; other axes are appended as
/// (x, y) pairs in encounter order. Y is inverted on output.
pub fn pack_axes(axes: &[ResolvedAxis]) -> Vec<f32> {
    let mut out = vec![0.0; FIXED_AXIS_SLOTS];

    for axis in axes {
        match axis.axis_type {
            AxisType::Trackpad => {
                out[IMMERSIVE_AXIS_TOUCHPAD_X] = axis.value.x;
                out[IMMERSIVE_AXIS_TOUCHPAD_Y] = -axis.value.y;
            }
            AxisType::Thumbstick => {
                out[IMMERSIVE_AXIS_THUMBSTICK_X] = axis.value.x;
                out[IMMERSIVE_AXIS_THUMBSTICK_Y] = -axis.value.y;
            }
            AxisType::TrackpadForce | AxisType::SqueezeForce => {
                out.push(axis.value.x);
                out.push(-axis.value.y);
            }
        }
    }

    out
}

/// Trackpad touch latch
///
/// While the pad is touched (and not clicked) the position is reported every
/// frame; the frame it stops being touched emits one `end_touch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchLatch {
    touching: bool,
}

impl TouchLatch {
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    pub fn update(
        &mut self,
        delegate: &mut dyn ControllerDelegate,
        index: usize,
        touching: bool,
        position: Vec2,
    ) {
        if touching {
            delegate.set_touch_position(index, position.x, position.y);
            self.touching = true;
        } else if self.touching {
            delegate.end_touch(index);
            self.touching = false;
        }
    }
}
