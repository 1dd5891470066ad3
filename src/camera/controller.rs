use glam::Vec3;

use super::core::Camera;
use super::damping::{nearest_angle, smooth_damp, smooth_damp_vec3};
use super::framing::{frame_target, ZoomPose, ZoomTargetDescriptor};
use super::rig::{CameraRigState, RigLimits, RigMode, RigPose, Spherical};
use crate::input::PointerSample;
use crate::options::CameraOptions;

#[derive(Debug, Clone, Copy, Default)]
struct PoseVelocity {
    target: Vec3,
    azimuth: f32,
    polar: f32,
    radius: f32,
    up: Vec3,
}

/// Pointer-driven camera rig with a damped zoom onto the desk screen.
///
/// Owns the [`CameraRigState`] and the damped current pose. Each
/// [`update`](Self::update) moves the current pose one step toward the
/// rig goal and writes the result into [`camera`](Self::camera).
#[derive(Debug, Clone)]
pub struct CameraController {
    /// Camera the renderer reads.
    pub camera: Camera,
    state: CameraRigState,
    current: RigPose,
    velocity: PoseVelocity,
    smooth_time: f32,
    settle_epsilon: f32,
    zoom_margin: f32,
    zoom_look_offset: f32,
}

impl CameraController {
    /// Create a controller resting at the default pose.
    pub fn new(options: &CameraOptions, aspect: f32) -> Self {
        let state = CameraRigState::new(RigLimits::from_options(options));
        let current = state.goal;
        let camera = Camera {
            eye: current.eye(),
            target: current.target,
            up: current.up,
            aspect,
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        };
        Self {
            camera,
            state,
            current,
            velocity: PoseVelocity::default(),
            smooth_time: options.smooth_time,
            settle_epsilon: options.settle_epsilon,
            zoom_margin: options.zoom_margin,
            zoom_look_offset: options.zoom_look_offset,
        }
    }

    /// Current rig mode.
    pub fn mode(&self) -> RigMode {
        self.state.mode
    }

    /// Current rig state.
    pub fn state(&self) -> &CameraRigState {
        &self.state
    }

    /// Whether the camera is in (or heading to) the zoomed view.
    pub fn is_zoomed(&self) -> bool {
        self.state.is_zoomed()
    }

    /// Record the latest pointer sample.
    pub fn set_pointer(&mut self, pointer: PointerSample) {
        self.state = self.state.with_pointer(pointer);
    }

    /// Pose that frames `target` with the current projection.
    pub fn zoom_pose(&self, target: &ZoomTargetDescriptor) -> ZoomPose {
        frame_target(
            target,
            self.camera.fovy,
            self.camera.aspect,
            self.zoom_margin,
            self.zoom_look_offset,
        )
    }

    /// Toggle the zoomed view. Entering needs a resolved `target`; with
    /// `None` the toggle is ignored unless already zoomed. Returns `true`
    /// when the mode changed.
    pub fn toggle_zoom(
        &mut self,
        target: Option<&ZoomTargetDescriptor>,
    ) -> bool {
        let pose = target.map(|t| self.zoom_pose(t));
        let before = self.state.mode;
        self.state = self.state.toggle_zoom(pose.as_ref());
        if before == self.state.mode {
            if before == RigMode::Idle {
                log::debug!("zoom target unresolved, ignoring toggle");
            }
            return false;
        }
        log::debug!("camera rig {before:?} -> {:?}", self.state.mode);
        true
    }

    /// Return to the constrained view. Returns `true` when the mode changed.
    pub fn exit_zoom(&mut self) -> bool {
        let before = self.state.mode;
        self.state = self.state.exit_zoom();
        before != self.state.mode
    }

    /// Update the projection aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.aspect = width as f32 / height as f32;
        }
    }

    /// Apply changed camera options. Rig mode and pose are kept.
    pub fn apply_options(&mut self, options: &CameraOptions) {
        self.state = self.state.with_limits(RigLimits::from_options(options));
        self.camera.fovy = options.fovy;
        self.camera.znear = options.znear;
        self.camera.zfar = options.zfar;
        self.smooth_time = options.smooth_time;
        self.settle_epsilon = options.settle_epsilon;
        self.zoom_margin = options.zoom_margin;
        self.zoom_look_offset = options.zoom_look_offset;
    }

    /// Advance the rig by `dt` seconds. Returns `true` while the camera is
    /// still moving.
    pub fn update(&mut self, dt: f32) -> bool {
        self.state = self.state.frame_goal();
        let goal = self.state.goal;
        let st = self.smooth_time;
        let v = &mut self.velocity;

        let target =
            smooth_damp_vec3(self.current.target, goal.target, &mut v.target, st, dt);
        let goal_azimuth =
            nearest_angle(self.current.spherical.azimuth, goal.spherical.azimuth);
        let azimuth = smooth_damp(
            self.current.spherical.azimuth,
            goal_azimuth,
            &mut v.azimuth,
            st,
            dt,
        );
        let polar = smooth_damp(
            self.current.spherical.polar,
            goal.spherical.polar,
            &mut v.polar,
            st,
            dt,
        );
        let radius = smooth_damp(
            self.current.spherical.radius,
            goal.spherical.radius,
            &mut v.radius,
            st,
            dt,
        );
        let up = smooth_damp_vec3(self.current.up, goal.up, &mut v.up, st, dt)
            .try_normalize()
            .unwrap_or(goal.up);

        self.current = RigPose {
            target,
            spherical: Spherical {
                azimuth,
                polar,
                radius,
            },
            up,
        };

        let remaining = (self.current.eye() - goal.eye()).length()
            + (self.current.target - goal.target).length();
        let moving = remaining > self.settle_epsilon;
        if !moving && self.state.mode == RigMode::TransitioningToZoom {
            self.state = self.state.settle();
            log::debug!("camera rig settled on zoom target");
        }

        self.camera.eye = self.current.eye();
        self.camera.target = self.current.target;
        self.camera.up = self.current.up;
        moving
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;

    fn screen() -> ZoomTargetDescriptor {
        ZoomTargetDescriptor {
            position: Vec3::new(-3.0, 1.2, -3.4),
            orientation: Quat::IDENTITY,
            size: Vec3::new(0.4, 0.3, 0.02),
        }
    }

    fn run(controller: &mut CameraController, seconds: f32) {
        let steps = (seconds * 60.0) as usize;
        for _ in 0..steps {
            let _ = controller.update(1.0 / 60.0);
        }
    }

    #[test]
    fn starts_at_default_pose() {
        let options = CameraOptions::default();
        let controller = CameraController::new(&options, 1.6);
        assert_eq!(controller.mode(), RigMode::Idle);
        assert_eq!(controller.camera.target, Vec3::from(options.target));
        let radius = (controller.camera.eye - controller.camera.target).length();
        assert!((radius - options.distance).abs() < 1e-4);
    }

    #[test]
    fn pointer_moves_camera_within_bounds() {
        let mut controller = CameraController::new(&CameraOptions::default(), 1.6);
        controller.set_pointer(PointerSample::new(0.0, 0.0));
        run(&mut controller, 3.0);
        let s = Spherical::from_offset(controller.camera.eye - controller.camera.target);
        assert!((s.azimuth + 0.28).abs() < 1e-3);
        assert!((s.polar - 1.72).abs() < 1e-3);
    }

    #[test]
    fn zoom_settles_in_front_of_screen() {
        let mut controller = CameraController::new(&CameraOptions::default(), 1.6);
        assert!(controller.toggle_zoom(Some(&screen())));
        assert_eq!(controller.mode(), RigMode::TransitioningToZoom);
        run(&mut controller, 5.0);
        assert_eq!(controller.mode(), RigMode::Zoomed);
        let pose = controller.zoom_pose(&screen());
        assert!((controller.camera.eye - pose.eye).length() < 1e-2);
        assert!(!controller.update(1.0 / 60.0));
    }

    #[test]
    fn unresolved_target_does_not_zoom() {
        let mut controller = CameraController::new(&CameraOptions::default(), 1.6);
        assert!(!controller.toggle_zoom(None));
        assert_eq!(controller.mode(), RigMode::Idle);
    }

    #[test]
    fn toggle_mid_transition_returns_to_idle() {
        let mut controller = CameraController::new(&CameraOptions::default(), 1.6);
        let _ = controller.toggle_zoom(Some(&screen()));
        run(&mut controller, 0.1);
        assert!(controller.toggle_zoom(Some(&screen())));
        assert_eq!(controller.mode(), RigMode::Idle);
        run(&mut controller, 5.0);
        let default = controller.state().limits.default_pose();
        assert!((controller.camera.eye - default.eye()).length() < 1e-2);
    }

    #[test]
    fn zero_smooth_time_snaps_to_goal() {
        let options = CameraOptions {
            smooth_time: 0.0,
            ..CameraOptions::default()
        };
        let mut controller = CameraController::new(&options, 1.6);
        let _ = controller.toggle_zoom(Some(&screen()));
        let _ = controller.update(1.0 / 60.0);
        assert_eq!(controller.mode(), RigMode::Zoomed);
    }

    #[test]
    fn resize_ignores_zero_height() {
        let mut controller = CameraController::new(&CameraOptions::default(), 1.6);
        controller.resize(800, 0);
        assert!((controller.camera.aspect - 1.6).abs() < 1e-6);
        controller.resize(1000, 500);
        assert!((controller.camera.aspect - 2.0).abs() < 1e-6);
    }
}
