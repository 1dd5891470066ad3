//! Camera rig state and its pure transitions.
//!
//! [`CameraRigState`] holds everything the rig decides on: the mode, the
//! active clamps, the latest pointer sample, and the pose it is heading
//! toward. Every transition is a plain `(state, input) -> state` function
//! so the interpolation and clamp rules are testable without a GPU. The
//! damped motion toward the goal lives in
//! [`CameraController`](super::controller::CameraController).

use glam::Vec3;

use super::framing::ZoomPose;
use crate::input::PointerSample;
use crate::options::CameraOptions;

/// Optional `[min, max]` clamp. `None` on either side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamp {
    /// Lower bound.
    pub min: Option<f32>,
    /// Upper bound.
    pub max: Option<f32>,
}

impl Clamp {
    /// No bounds at all.
    pub const UNBOUNDED: Self = Self {
        min: None,
        max: None,
    };

    /// Bounds spanning `a` and `b` in either order.
    pub fn between(a: f32, b: f32) -> Self {
        Self {
            min: Some(a.min(b)),
            max: Some(a.max(b)),
        }
    }

    /// Clamp `value` into the bounds.
    pub fn apply(&self, value: f32) -> f32 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }

    /// Whether `value` satisfies the bounds.
    pub fn contains(&self, value: f32) -> bool {
        self.min.is_none_or(|min| value >= min)
            && self.max.is_none_or(|max| value <= max)
    }
}

/// Active clamps on the three spherical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigBounds {
    /// Horizontal orbit angle.
    pub azimuth: Clamp,
    /// Vertical orbit angle.
    pub polar: Clamp,
    /// Orbit radius.
    pub distance: Clamp,
}

impl RigBounds {
    /// Every coordinate free.
    pub const UNBOUNDED: Self = Self {
        azimuth: Clamp::UNBOUNDED,
        polar: Clamp::UNBOUNDED,
        distance: Clamp::UNBOUNDED,
    };
}

/// Spherical coordinates of the eye relative to the look-at point.
///
/// Azimuth is measured around +Y from +Z, polar from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    /// Horizontal angle in radians.
    pub azimuth: f32,
    /// Vertical angle in radians, 0 looking straight down.
    pub polar: f32,
    /// Distance from the look-at point.
    pub radius: f32,
}

impl Spherical {
    /// Spherical coordinates of an offset vector.
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self {
                azimuth: 0.0,
                polar: 0.0,
                radius: 0.0,
            };
        }
        Self {
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            radius,
        }
    }

    /// The offset vector these coordinates describe.
    pub fn to_offset(self) -> Vec3 {
        let sin_polar = self.polar.sin();
        Vec3::new(
            sin_polar * self.azimuth.sin(),
            self.polar.cos(),
            sin_polar * self.azimuth.cos(),
        ) * self.radius
    }

    /// Clamp each coordinate into `bounds`.
    pub fn clamped(self, bounds: &RigBounds) -> Self {
        Self {
            azimuth: bounds.azimuth.apply(self.azimuth),
            polar: bounds.polar.apply(self.polar),
            radius: bounds.distance.apply(self.radius),
        }
    }
}

/// A camera pose expressed as look-at point plus spherical offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigPose {
    /// Look-at point.
    pub target: Vec3,
    /// Eye offset from the look-at point.
    pub spherical: Spherical,
    /// Camera up vector.
    pub up: Vec3,
}

impl RigPose {
    /// Eye position in world space.
    pub fn eye(&self) -> Vec3 {
        self.target + self.spherical.to_offset()
    }

    /// Pose that looks from `eye` at `look_at`.
    pub fn look_at(eye: Vec3, look_at: Vec3, up: Vec3) -> Self {
        Self {
            target: look_at,
            spherical: Spherical::from_offset(eye - look_at),
            up,
        }
    }
}

/// Authored rig limits, copied from [`CameraOptions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigLimits {
    /// Default look-at point.
    pub target: Vec3,
    /// Fixed orbit distance.
    pub distance: f32,
    /// Azimuth magnitude at pointer x = 1.
    pub min_azimuth: f32,
    /// Azimuth magnitude at pointer x = 0.
    pub max_azimuth: f32,
    /// Polar angle at pointer y = 1.
    pub min_polar: f32,
    /// Polar angle at pointer y = 0.
    pub max_polar: f32,
}

impl RigLimits {
    /// Limits from camera options.
    pub fn from_options(options: &CameraOptions) -> Self {
        Self {
            target: Vec3::from(options.target),
            distance: options.distance,
            min_azimuth: options.min_azimuth,
            max_azimuth: options.max_azimuth,
            min_polar: options.min_polar,
            max_polar: options.max_polar,
        }
    }

    /// Clamps applied while the rig is constrained.
    ///
    /// The azimuth interval is the one the pointer mapping sweeps, which is
    /// the authored pair negated.
    pub fn constrained_bounds(&self) -> RigBounds {
        RigBounds {
            azimuth: Clamp::between(-self.min_azimuth, -self.max_azimuth),
            polar: Clamp::between(self.min_polar, self.max_polar),
            distance: Clamp::between(self.distance, self.distance),
        }
    }

    /// Pose the rig rests at with the pointer centered.
    pub fn default_pose(&self) -> RigPose {
        let (azimuth, polar) = pointer_goal(self, PointerSample::CENTER);
        RigPose {
            target: self.target,
            spherical: Spherical {
                azimuth,
                polar,
                radius: self.distance,
            },
            up: Vec3::Y,
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Target `(azimuth, polar)` for a pointer sample.
///
/// `azimuth = lerp(-min_azimuth, -max_azimuth, 1 - x)` and
/// `polar = lerp(min_polar, max_polar, 1 - y)`.
pub fn pointer_goal(limits: &RigLimits, pointer: PointerSample) -> (f32, f32) {
    let azimuth =
        lerp(-limits.min_azimuth, -limits.max_azimuth, 1.0 - pointer.x());
    let polar = lerp(limits.min_polar, limits.max_polar, 1.0 - pointer.y());
    (azimuth, polar)
}

/// Rig mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigMode {
    /// Pointer-driven, clamped to the desk cone.
    Idle,
    /// Unclamped, flying toward the framed screen.
    TransitioningToZoom,
    /// Parked in front of the screen.
    Zoomed,
}

/// Everything the rig decides on, updated by pure transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRigState {
    /// Current mode.
    pub mode: RigMode,
    /// Clamps applied to the goal.
    pub bounds: RigBounds,
    /// Latest normalized pointer sample.
    pub pointer: PointerSample,
    /// Pose the damped camera is heading toward.
    pub goal: RigPose,
    /// Authored limits restored when leaving zoom.
    pub limits: RigLimits,
}

impl CameraRigState {
    /// Constrained state resting at the default pose.
    pub fn new(limits: RigLimits) -> Self {
        Self {
            mode: RigMode::Idle,
            bounds: limits.constrained_bounds(),
            pointer: PointerSample::CENTER,
            goal: limits.default_pose(),
            limits,
        }
    }

    /// Whether the camera is in (or heading to) the zoomed view.
    pub fn is_zoomed(&self) -> bool {
        self.mode != RigMode::Idle
    }

    /// Record the latest pointer sample. Only the newest one is kept.
    #[must_use]
    pub fn with_pointer(self, pointer: PointerSample) -> Self {
        Self { pointer, ..self }
    }

    /// Per-frame goal update. In [`RigMode::Idle`] the goal angles follow
    /// the pointer; in the other modes pointer input is ignored.
    #[must_use]
    pub fn frame_goal(self) -> Self {
        if self.mode != RigMode::Idle {
            return self;
        }
        let (azimuth, polar) = pointer_goal(&self.limits, self.pointer);
        let spherical = Spherical {
            azimuth,
            polar,
            radius: self.limits.distance,
        }
        .clamped(&self.bounds);
        Self {
            goal: RigPose {
                target: self.limits.target,
                spherical,
                up: Vec3::Y,
            },
            ..self
        }
    }

    /// Toggle between the constrained view and the zoomed view.
    ///
    /// From [`RigMode::Idle`] the clamps are released and the goal becomes
    /// `zoom`; without a resolved `zoom` pose nothing changes. From either
    /// zoom mode the authored clamps and the default pose are restored.
    /// The newest toggle always wins.
    #[must_use]
    pub fn toggle_zoom(self, zoom: Option<&ZoomPose>) -> Self {
        match self.mode {
            RigMode::Idle => zoom.map_or(self, |pose| Self {
                mode: RigMode::TransitioningToZoom,
                bounds: RigBounds::UNBOUNDED,
                goal: RigPose::look_at(pose.eye, pose.look_at, pose.up),
                ..self
            }),
            RigMode::TransitioningToZoom | RigMode::Zoomed => self.exit_zoom(),
        }
    }

    /// Return to the constrained view. No-op when already idle.
    #[must_use]
    pub fn exit_zoom(self) -> Self {
        if self.mode == RigMode::Idle {
            return self;
        }
        Self {
            mode: RigMode::Idle,
            bounds: self.limits.constrained_bounds(),
            goal: self.limits.default_pose(),
            ..self
        }
    }

    /// Mark an in-flight zoom transition as arrived.
    #[must_use]
    pub fn settle(self) -> Self {
        if self.mode == RigMode::TransitioningToZoom {
            Self {
                mode: RigMode::Zoomed,
                ..self
            }
        } else {
            self
        }
    }

    /// Replace the authored limits. Constrained clamps follow immediately.
    #[must_use]
    pub fn with_limits(self, limits: RigLimits) -> Self {
        let bounds = if self.mode == RigMode::Idle {
            limits.constrained_bounds()
        } else {
            self.bounds
        };
        Self {
            limits,
            bounds,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> RigLimits {
        RigLimits {
            target: Vec3::new(-3.2, 1.4, -3.5),
            distance: 3.0,
            min_azimuth: 0.2,
            max_azimuth: 0.28,
            min_polar: 1.58,
            max_polar: 1.72,
        }
    }

    fn zoom_pose() -> ZoomPose {
        ZoomPose {
            eye: Vec3::new(-3.0, 1.2, -2.9),
            look_at: Vec3::new(-3.0, 1.22, -3.4),
            up: Vec3::Y,
            distance: 0.5,
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn pointer_top_left_reaches_max_bounds() {
        let (az, polar) =
            pointer_goal(&limits(), PointerSample::new(0.0, 0.0));
        assert!(close(az, -0.28));
        assert!(close(polar, 1.72));
    }

    #[test]
    fn pointer_bottom_right_reaches_min_bounds() {
        let (az, polar) =
            pointer_goal(&limits(), PointerSample::new(1.0, 1.0));
        assert!(close(az, -0.2));
        assert!(close(polar, 1.58));
    }

    #[test]
    fn pointer_goal_stays_in_constrained_bounds() {
        let l = limits();
        let bounds = l.constrained_bounds();
        for i in 0..=10 {
            for j in 0..=10 {
                let sample = PointerSample::new(i as f32 / 10.0, j as f32 / 10.0);
                let state = CameraRigState::new(l).with_pointer(sample).frame_goal();
                assert!(bounds.azimuth.contains(state.goal.spherical.azimuth));
                assert!(bounds.polar.contains(state.goal.spherical.polar));
                assert!(close(state.goal.spherical.radius, l.distance));
            }
        }
    }

    #[test]
    fn spherical_round_trip() {
        let s = Spherical {
            azimuth: -0.24,
            polar: 1.65,
            radius: 3.0,
        };
        let back = Spherical::from_offset(s.to_offset());
        assert!(close(back.azimuth, s.azimuth));
        assert!((back.polar - s.polar).abs() < 1e-5);
        assert!((back.radius - s.radius).abs() < 1e-5);
    }

    #[test]
    fn toggle_enters_transition_unclamped() {
        let state = CameraRigState::new(limits()).toggle_zoom(Some(&zoom_pose()));
        assert_eq!(state.mode, RigMode::TransitioningToZoom);
        assert_eq!(state.bounds, RigBounds::UNBOUNDED);
        assert!((state.goal.eye() - zoom_pose().eye).length() < 1e-5);
        assert_eq!(state.goal.target, zoom_pose().look_at);
    }

    #[test]
    fn toggle_without_target_is_noop() {
        let state = CameraRigState::new(limits());
        assert_eq!(state.toggle_zoom(None), state);
    }

    #[test]
    fn double_toggle_restores_bounds_and_default_pose() {
        let initial = CameraRigState::new(limits());
        let state = initial
            .toggle_zoom(Some(&zoom_pose()))
            .toggle_zoom(Some(&zoom_pose()));
        assert_eq!(state.mode, RigMode::Idle);
        assert_eq!(state.bounds, initial.bounds);
        assert_eq!(state.goal, limits().default_pose());
    }

    #[test]
    fn pointer_is_ignored_while_zoomed() {
        let state = CameraRigState::new(limits())
            .toggle_zoom(Some(&zoom_pose()))
            .settle();
        assert_eq!(state.mode, RigMode::Zoomed);
        let moved = state.with_pointer(PointerSample::new(0.0, 1.0)).frame_goal();
        assert_eq!(moved.goal, state.goal);
    }

    #[test]
    fn settle_only_affects_transition() {
        let idle = CameraRigState::new(limits());
        assert_eq!(idle.settle(), idle);
    }

    #[test]
    fn clamp_handles_open_sides() {
        let lower = Clamp {
            min: Some(1.0),
            max: None,
        };
        assert_eq!(lower.apply(0.5), 1.0);
        assert_eq!(lower.apply(100.0), 100.0);
        assert!(Clamp::UNBOUNDED.contains(f32::MAX));
    }
}
