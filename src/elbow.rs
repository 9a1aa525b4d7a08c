//! Arm model for orientation-only controllers
//!
//! When the runtime cannot track a controller's position, the pointer
//! transform is rebuilt from the head pose and the controller orientation.

use glam::{Mat4, Quat, Vec3};

use crate::runtime::Handedness;

pub trait ElbowModel {
    /// Full transform for a controller that only reports orientation
    fn transform(&self, hand: Handedness, head: &Mat4, pointer: &Mat4) -> Mat4;
}

/// Fixed shoulder/elbow offsets relative to the head, following head yaw only
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedElbowModel {
    /// Head to elbow offset for the right arm; mirrored on X for the left
    pub elbow_offset: Vec3,
    /// Elbow to controller distance along the controller's forward axis
    pub forearm_length: f32,
}

impl Default for FixedElbowModel {
    fn default() -> Self {
        Self {
            elbow_offset: Vec3::new(0.19, -0.6, -0.05),
            forearm_length: 0.4,
        }
    }
}

impl ElbowModel for FixedElbowModel {
    fn transform(&self, hand: Handedness, head: &Mat4, pointer: &Mat4) -> Mat4 {
        let (_, head_rotation, head_position) = head.to_scale_rotation_translation();
        let (_, pointer_rotation, _) = pointer.to_scale_rotation_translation();

        let (yaw, _, _) = head_rotation.to_euler(glam::EulerRot::YXZ);
        let body = Quat::from_rotation_y(yaw);

        let mut offset = self.elbow_offset;
        if hand == Handedness::Left {
            offset.x = -offset.x;
        }

        let elbow = head_position + body * offset;
        let position = elbow + pointer_rotation * Vec3::new(0.0, 0.0, -self.forearm_length);

        Mat4::from_rotation_translation(pointer_rotation, position)
    }
}
