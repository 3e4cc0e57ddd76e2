/// Off-screen orthographic capture camera
use bevy::math::{Affine3A, Mat3, Quat, Vec2, Vec3};

/// Orthographic camera parented to the working copy.
/// Looks down its local -Z axis with +Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureCamera {
    pub local_position: Vec3,
    pub local_rotation: Quat,
    /// Half the vertical extent of the view volume.
    pub orthographic_size: f32,
    parent: Affine3A,
}

impl CaptureCamera {
    pub fn new(parent: Affine3A, orthographic_size: f32) -> Self {
        Self {
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            orthographic_size,
            parent,
        }
    }

    /// Places the camera in parent space, looking along `direction` with `up` as the screen's vertical.
    pub fn look_from(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        self.local_position = position;
        self.local_rotation = look_rotation(direction, up);
    }

    pub fn world_position(&self) -> Vec3 {
        self.parent.transform_point3(self.local_position)
    }

    pub fn world_rotation(&self) -> Quat {
        let (_, parent_rotation, _) = self.parent.to_scale_rotation_translation();
        parent_rotation * self.local_rotation
    }

    pub fn forward(&self) -> Vec3 {
        self.world_rotation() * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.world_rotation() * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.world_rotation() * Vec3::X
    }

    /// Projects a world point into normalised view space.
    /// `xy` spans -1..1 across the view volume, `z` is the distance along the view direction.
    pub fn project(&self, point: Vec3) -> Option<Vec3> {
        if self.orthographic_size <= 0.0 {
            return None;
        }

        let rotation = self.world_rotation();
        let relative = point - self.world_position();
        let screen = Vec2::new(
            relative.dot(rotation * Vec3::X),
            relative.dot(rotation * Vec3::Y),
        ) / self.orthographic_size;

        Some(screen.extend(relative.dot(rotation * Vec3::NEG_Z)))
    }
}

/// Rotation whose -Z axis points along `direction` and whose +Y is as close to `up` as possible.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Quat {
    let back = -direction.normalize_or_zero();
    if back == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let mut right = up.cross(back);
    if right.length_squared() < 1e-12 {
        right = back.any_orthonormal_vector();
    }
    let right = right.normalize();
    let up = back.cross(right);

    Quat::from_mat3(&Mat3::from_cols(right, up, back))
}
