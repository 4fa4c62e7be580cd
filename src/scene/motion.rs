//! Easing curves and the per-shard motion terms.

use std::f32::consts::FRAC_PI_2;
use std::f64::consts::TAU;

use glam::Vec3;

const DRIFT_SPEED: f64 = 0.06;
const DRIFT_STRENGTH: f32 = 0.55;

pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

pub fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Re-map `x` from `[a1, a2]` to `[b1, b2]` without clamping.
/// A degenerate source range maps everything to `b1`.
pub fn map_linear(x: f32, a1: f32, a2: f32, b1: f32, b2: f32) -> f32 {
    let span = a2 - a1;
    if span.abs() < f32::EPSILON {
        return b1;
    }
    b1 + (x - a1) * (b2 - b1) / span
}

/// `sin(t * rate + offset)`. The time term is wrapped in `f64` before it
/// meets `f32`, so the motion keeps its resolution after days of uptime.
pub fn wave(t: f64, rate: f64, offset: f32) -> f32 {
    ((t * rate).rem_euclid(TAU) as f32 + offset).sin()
}

fn cos_wave(t: f64, rate: f64, offset: f32) -> f32 {
    wave(t, rate, offset + FRAC_PI_2)
}

/// Ambient floating offset around a base position.
pub fn drift_offset(base: Vec3, phase: f32, t: f64) -> Vec3 {
    let x = wave(t, DRIFT_SPEED, base.x * 1.3 + phase) * 0.6 + cos_wave(t, 0.9, base.y * 1.7 - phase) * 0.4;
    let y = wave(t, DRIFT_SPEED * 0.9, base.y * 1.1 + phase) * 0.6
        + cos_wave(t, 0.7, base.z * 1.5 + phase * 0.7) * 0.4;
    let z = wave(t, 0.7, base.z + phase) * 0.6 + cos_wave(t, 0.6, base.x * 0.8 - phase) * 0.4;
    Vec3::new(
        x * DRIFT_STRENGTH,
        y * DRIFT_STRENGTH * 0.8,
        z * DRIFT_STRENGTH * 0.4,
    )
}

/// Interpolation weight toward a ring point. Larger shards lag: `max_delay`
/// is subtracted for the smallest size and nothing for the largest.
pub fn delayed_weight(eased: f32, size: f32, size_min: f32, size_max: f32, max_delay: f32) -> f32 {
    let delay = map_linear(size, size_min, size_max, max_delay, 0.0);
    clamp01(eased - delay)
}

/// Uniform scale wobble shared by every phase.
pub fn breathing_scale(t: f64, phase: f32) -> f32 {
    1.0 + wave(t, 0.6, phase * 0.6) * 0.05
}

/// Radial wobble applied to ring points while released.
pub fn release_breath(t: f64, phase: f32) -> f32 {
    1.0 + wave(t, 0.8, phase) * 0.03
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easings_hit_endpoints() {
        for ease in [ease_in_cubic, ease_out_quad] {
            assert_eq!(ease(0.0), 0.0);
            assert_eq!(ease(1.0), 1.0);
        }
        assert!(ease_in_cubic(0.5) < 0.5);
        assert!(ease_out_quad(0.5) > 0.5);
    }

    #[test]
    fn map_linear_degenerate_range() {
        assert_eq!(map_linear(0.5, 0.3, 0.3, 1.2, 0.5), 1.2);
        assert!((map_linear(0.9, 0.3, 0.9, 1.2, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn small_shards_lead() {
        let small = delayed_weight(0.5, 0.3, 0.3, 0.9, 0.15);
        let large = delayed_weight(0.5, 0.9, 0.3, 0.9, 0.15);
        assert!(small < large);
        assert_eq!(delayed_weight(1.0, 0.9, 0.3, 0.9, 0.15), 1.0);
        assert_eq!(delayed_weight(0.0, 0.3, 0.3, 0.9, 0.15), 0.0);
    }

    #[test]
    fn drift_is_bounded() {
        let base = Vec3::new(1.0, -2.0, 0.3);
        for step in 0..200 {
            let off = drift_offset(base, 1.3, step as f64 * 0.37);
            assert!(off.x.abs() <= DRIFT_STRENGTH + 1e-4);
            assert!(off.y.abs() <= DRIFT_STRENGTH * 0.8 + 1e-4);
            assert!(off.z.abs() <= DRIFT_STRENGTH * 0.4 + 1e-4);
        }
    }

    #[test]
    fn waves_keep_resolution_after_a_week() {
        let week = 7.0 * 24.0 * 3600.0;
        let frame = 1.0 / 60.0;
        let a = wave(week, 0.8, 0.3);
        let b = wave(week + frame, 0.8, 0.3);
        let expected = ((week + frame) * 0.8 + 0.3).sin() - (week * 0.8 + 0.3).sin();
        assert!(((b - a) as f64 - expected).abs() < 1e-4, "{a} -> {b}");
        assert_ne!(a, b);
    }

    #[test]
    fn breathing_stays_near_one() {
        for step in 0..500 {
            let t = step as f64 * 1234.5;
            assert!((breathing_scale(t, 0.4) - 1.0).abs() <= 0.05 + 1e-6);
            assert!((release_breath(t, 0.4) - 1.0).abs() <= 0.03 + 1e-6);
        }
    }
}
