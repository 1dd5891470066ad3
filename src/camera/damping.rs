//! Critically damped smoothing toward a moving goal.
//!
//! Every camera transition is a per-frame step of [`smooth_damp`]; there is
//! no scheduled end time. A new goal simply changes where the next step
//! heads.

use glam::Vec3;

/// Move `current` toward `goal` with a critically damped spring.
///
/// `smooth_time` is roughly the time to reach the goal; `0` snaps. The
/// result never overshoots the goal. `velocity` carries state between
/// frames.
#[must_use]
pub fn smooth_damp(
    current: f32,
    goal: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    if smooth_time <= 0.0 {
        *velocity = 0.0;
        return goal;
    }
    if dt <= 0.0 {
        return current;
    }

    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - goal;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = goal + (change + temp) * exp;

    if (goal - current > 0.0) == (output > goal) {
        output = goal;
        *velocity = 0.0;
    }
    output
}

/// Component-wise [`smooth_damp`] for vectors.
#[must_use]
pub fn smooth_damp_vec3(
    current: Vec3,
    goal: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    Vec3::new(
        smooth_damp(current.x, goal.x, &mut velocity.x, smooth_time, dt),
        smooth_damp(current.y, goal.y, &mut velocity.y, smooth_time, dt),
        smooth_damp(current.z, goal.z, &mut velocity.z, smooth_time, dt),
    )
}

/// Rewrite `goal` so it lies within half a turn of `current`, keeping the
/// damped path on the short way around.
#[must_use]
pub fn nearest_angle(current: f32, goal: f32) -> f32 {
    let tau = std::f32::consts::TAU;
    let delta = (goal - current).rem_euclid(tau);
    if delta > std::f32::consts::PI {
        current + delta - tau
    } else {
        current + delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_smooth_time_snaps() {
        let mut v = 3.0;
        assert_eq!(smooth_damp(0.0, 2.0, &mut v, 0.0, 0.016), 2.0);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn zero_dt_holds_position() {
        let mut v = 0.0;
        assert_eq!(smooth_damp(1.0, 2.0, &mut v, 0.25, 0.0), 1.0);
    }

    #[test]
    fn converges_without_overshoot() {
        let mut v = 0.0;
        let mut x = 0.0;
        for _ in 0..240 {
            x = smooth_damp(x, 1.0, &mut v, 0.25, 1.0 / 60.0);
            assert!(x <= 1.0);
        }
        assert!((x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn moves_partway_in_one_frame() {
        let mut v = 0.0;
        let x = smooth_damp(0.0, 1.0, &mut v, 0.25, 1.0 / 60.0);
        assert!(x > 0.0 && x < 0.5);
        assert!(v > 0.0);
    }

    #[test]
    fn vector_damping_is_componentwise() {
        let mut v = Vec3::ZERO;
        let p = smooth_damp_vec3(
            Vec3::ZERO,
            Vec3::new(1.0, -1.0, 0.0),
            &mut v,
            0.25,
            1.0 / 60.0,
        );
        assert!(p.x > 0.0 && p.y < 0.0 && p.z == 0.0);
        assert!((p.x + p.y).abs() < 1e-6);
    }

    #[test]
    fn nearest_angle_wraps_short_way() {
        let pi = std::f32::consts::PI;
        let g = nearest_angle(-0.9 * pi, 0.9 * pi);
        assert!((g - (-1.1 * pi)).abs() < 1e-5);
        assert!((nearest_angle(0.1, 0.3) - 0.3).abs() < 1e-6);
    }
}
