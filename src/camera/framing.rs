//! Camera placement that frames a flat target (the computer screen) head-on.

use glam::{Quat, Vec3};

/// World-space description of the mesh the camera zooms onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTargetDescriptor {
    /// Center of the target in world space.
    pub position: Vec3,
    /// World orientation; local +Z is the facing direction, +Y is up.
    pub orientation: Quat,
    /// Bounding box extent (width, height, depth) in world units.
    pub size: Vec3,
}

/// Where the camera ends up when framing a [`ZoomTargetDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPose {
    /// Camera position.
    pub eye: Vec3,
    /// Look-at point.
    pub look_at: Vec3,
    /// Camera up vector.
    pub up: Vec3,
    /// Distance from the target center along its normal.
    pub distance: f32,
}

impl ZoomTargetDescriptor {
    /// Facing direction of the target.
    pub fn normal(&self) -> Vec3 {
        (self.orientation * Vec3::Z).normalize_or_zero()
    }

    /// Up direction of the target.
    pub fn up(&self) -> Vec3 {
        (self.orientation * Vec3::Y).normalize_or_zero()
    }
}

/// Horizontal half field of view (radians) for a vertical FOV in degrees.
pub fn half_fov_x(fovy_degrees: f32, aspect: f32) -> f32 {
    ((fovy_degrees.to_radians() * 0.5).tan() * aspect).atan()
}

/// Compute the camera pose that fits the target's width and height in
/// frame with `margin` headroom on each axis.
///
/// The look-at point is the target center raised by `look_offset`.
pub fn frame_target(
    target: &ZoomTargetDescriptor,
    fovy_degrees: f32,
    aspect: f32,
    margin: f32,
    look_offset: f32,
) -> ZoomPose {
    let half_fov_y = fovy_degrees.to_radians() * 0.5;
    let half_fov_x = half_fov_x(fovy_degrees, aspect);

    let distance_y = (target.size.y * 0.5) / half_fov_y.tan() * margin;
    let distance_x = (target.size.x * 0.5) / half_fov_x.tan() * margin;
    let distance = distance_y.max(distance_x);

    let normal = target.normal();
    ZoomPose {
        eye: target.position + normal * distance,
        look_at: target.position + Vec3::Y * look_offset,
        up: target.up(),
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ZoomTargetDescriptor {
        ZoomTargetDescriptor {
            position: Vec3::new(-3.0, 1.2, -3.4),
            orientation: Quat::IDENTITY,
            size: Vec3::new(0.4, 0.3, 0.02),
        }
    }

    #[test]
    fn frames_screen_scenario() {
        let pose = frame_target(&screen(), 45.0, 1.6, 1.3, 0.0);

        let half_y = 22.5_f32.to_radians();
        let distance_y = (0.15 / half_y.tan()) * 1.3;
        let half_x = (half_y.tan() * 1.6).atan();
        let distance_x = (0.2 / half_x.tan()) * 1.3;
        let expected = distance_y.max(distance_x);

        assert!((pose.distance - expected).abs() < 1e-5);
        // Height is the limiting axis at this aspect ratio.
        assert!((pose.distance - distance_y).abs() < 1e-5);
        let expected_eye = screen().position + Vec3::Z * expected;
        assert!((pose.eye - expected_eye).length() < 1e-5);
    }

    #[test]
    fn narrow_viewport_is_limited_by_width() {
        let pose = frame_target(&screen(), 45.0, 0.5, 1.3, 0.0);
        let half_x = half_fov_x(45.0, 0.5);
        let distance_x = (0.2 / half_x.tan()) * 1.3;
        assert!((pose.distance - distance_x).abs() < 1e-5);
    }

    #[test]
    fn rotated_target_moves_camera_along_its_normal() {
        let mut target = screen();
        target.orientation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let pose = frame_target(&target, 45.0, 1.6, 1.3, 0.05);
        let offset = (pose.eye - target.position).normalize();
        assert!((offset - Vec3::X).length() < 1e-5);
        assert!((pose.look_at.y - (target.position.y + 0.05)).abs() < 1e-6);
        assert!((pose.up - Vec3::Y).length() < 1e-5);
    }
}
