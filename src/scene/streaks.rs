use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use super::motion::wave;
use crate::rng::Rng;

const BASE_OPACITY: f32 = 0.18;
const SHIMMER_OPACITY: f32 = 0.08;
const SWAY_Y: f32 = 0.12;
const SWAY_ROTATION: f32 = 0.05;

/// One soft vertical light slit. Streaks are never edited in place across
/// cycles; the whole batch is replaced, and each streak carries a unique id.
#[derive(Debug, Clone, PartialEq)]
pub struct LightStreak {
    pub id: u64,
    pub base_position: Vec3,
    pub position: Vec3,
    pub scale: Vec2,
    pub base_rotation: f32,
    pub rotation: f32,
    pub phase: f32,
    pub opacity: f32,
}

impl LightStreak {
    fn random(id: u64, index: usize, rng: &mut Rng) -> Self {
        let position = Vec3::new(
            rng.range(-2.8, 2.8),
            rng.range(-1.8, 1.8),
            rng.range(-0.8, -0.2),
        );
        let rotation = rng.range(-PI / 12.0, PI / 12.0);
        Self {
            id,
            base_position: position,
            position,
            scale: Vec2::new(rng.range(0.6, 1.1), rng.range(3.2, 4.8)),
            base_rotation: rotation,
            rotation,
            phase: rng.angle(),
            opacity: if index % 2 == 0 { 0.25 } else { 0.2 },
        }
    }

    /// Idle sway and opacity pulse at absolute time `t`.
    pub fn shimmer(&mut self, t: f64) {
        self.position.y = self.base_position.y + wave(t, 0.25, self.phase) * SWAY_Y;
        self.rotation = self.base_rotation + wave(t, 0.08, self.phase) * SWAY_ROTATION;
        self.opacity = BASE_OPACITY + (wave(t, 0.5, self.phase) * 0.5 + 0.5) * SHIMMER_OPACITY;
    }
}

/// Fresh batch of `count` streaks, ids drawn from `next_id`.
pub fn spawn(count: usize, next_id: &mut u64, rng: &mut Rng) -> Vec<LightStreak> {
    (0..count)
        .map(|i| {
            let id = *next_id;
            *next_id += 1;
            LightStreak::random(id, i, rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_across_batches() {
        let mut rng = Rng::new(1);
        let mut next = 0;
        let a = spawn(6, &mut next, &mut rng);
        let b = spawn(6, &mut next, &mut rng);
        assert!(a.iter().all(|s| b.iter().all(|t| t.id != s.id)));
        assert_eq!(next, 12);
    }

    #[test]
    fn shimmer_stays_in_band() {
        let mut rng = Rng::new(2);
        let mut next = 0;
        let mut streaks = spawn(4, &mut next, &mut rng);
        for step in 0..500 {
            for s in &mut streaks {
                s.shimmer(step as f64 * 0.1);
                assert!(s.opacity >= BASE_OPACITY - 1e-6);
                assert!(s.opacity <= BASE_OPACITY + SHIMMER_OPACITY + 1e-6);
                assert!((s.position.y - s.base_position.y).abs() <= SWAY_Y + 1e-6);
                assert_eq!(s.position.x, s.base_position.x);
            }
        }
    }
}
