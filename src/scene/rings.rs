use std::f32::consts::TAU;

use glam::Vec3;

use crate::rng::Rng;

/// Share of shards that form the outline; the rest fill the band.
pub const OUTLINE_RATIO: f32 = 0.4;
pub const BASE_RADIUS: f32 = 1.10;
const THICKNESS: f32 = 0.18;

/// Split a shard pool into (outline, fill) slot counts that sum to
/// `shard_count`. Pools of two or more get at least one slot on each side;
/// smaller pools go entirely to the outline.
pub fn split_counts(shard_count: usize) -> (usize, usize) {
    if shard_count < 2 {
        return (shard_count, 0);
    }
    let max_outline = shard_count.saturating_sub(1).max(1);
    let outline = ((shard_count as f32 * OUTLINE_RATIO).floor() as usize).clamp(1, max_outline);
    (outline, shard_count - outline)
}

/// Points the shards gather toward: an evenly spaced outline circle and a
/// randomly scattered annulus around it.
#[derive(Debug, Clone)]
pub struct RingTargets {
    pub outline: Vec<Vec3>,
    pub fill: Vec<Vec3>,
    pub radius: f32,
}

impl RingTargets {
    pub fn generate(shard_count: usize, radius_scale: f32, rng: &mut Rng) -> Self {
        let (outline_count, fill_count) = split_counts(shard_count);
        let radius = BASE_RADIUS * radius_scale;

        let outline = (0..outline_count)
            .map(|i| {
                let a = i as f32 / outline_count as f32 * TAU;
                let r = radius + rng.spread(0.04);
                Vec3::new(a.cos() * r, a.sin() * r, rng.spread(0.04))
            })
            .collect();

        let fill = (0..fill_count)
            .map(|_| {
                let a = rng.angle();
                let r = radius + rng.spread(THICKNESS);
                Vec3::new(a.cos() * r, a.sin() * r, rng.spread(0.06))
            })
            .collect();

        Self {
            outline,
            fill,
            radius,
        }
    }

    pub fn len(&self) -> usize {
        self.outline.len() + self.fill.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outline slot for `shard`, by index modulo. An empty ring yields the
    /// center.
    pub fn outline_point(&self, shard: usize) -> Vec3 {
        match self.outline.len() {
            0 => Vec3::ZERO,
            n => self.outline[shard % n],
        }
    }

    /// Fill slot for `shard`; falls back to the outline when there is no band.
    pub fn fill_point(&self, shard: usize) -> Vec3 {
        match self.fill.len() {
            0 => self.outline_point(shard),
            n => self.fill[shard % n],
        }
    }

    /// Where a shard rests once released: the first `outline.len()` shards
    /// keep the outline, the rest the fill band.
    pub fn resting_point(&self, shard: usize) -> Vec3 {
        if shard < self.outline.len() {
            self.outline_point(shard)
        } else {
            self.fill_point(shard)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_always_sum() {
        for n in [2, 3, 10, 359, 360, 361, 4096] {
            let (o, f) = split_counts(n);
            assert_eq!(o + f, n);
            assert!(o >= 1 && f >= 1, "n={n} o={o} f={f}");
        }
        assert_eq!(split_counts(360), (144, 216));
    }

    #[test]
    fn tiny_pools_do_not_panic() {
        assert_eq!(split_counts(0), (0, 0));
        assert_eq!(split_counts(1), (1, 0));

        let mut rng = Rng::new(8);
        let empty = RingTargets::generate(0, 1.0, &mut rng);
        assert!(empty.is_empty());
        assert_eq!(empty.resting_point(3), Vec3::ZERO);

        let single = RingTargets::generate(1, 1.0, &mut rng);
        assert_eq!(single.len(), 1);
        assert_eq!(single.fill_point(0), single.outline[0]);
        assert_eq!(single.resting_point(5), single.outline[0]);
    }

    #[test]
    fn generated_rings_match_pool() {
        let mut rng = Rng::new(3);
        let rings = RingTargets::generate(360, 1.0, &mut rng);
        assert_eq!(rings.outline.len(), 144);
        assert_eq!(rings.fill.len(), 216);
        assert_eq!(rings.len(), 360);
    }

    #[test]
    fn points_sit_near_radius() {
        let mut rng = Rng::new(11);
        let rings = RingTargets::generate(200, 1.02, &mut rng);
        let r = BASE_RADIUS * 1.02;
        for p in &rings.outline {
            assert!((p.truncate().length() - r).abs() <= 0.02 + 1e-4);
        }
        for p in &rings.fill {
            assert!((p.truncate().length() - r).abs() <= THICKNESS / 2.0 + 1e-4);
        }
    }

    #[test]
    fn slots_wrap_by_index() {
        let mut rng = Rng::new(5);
        let rings = RingTargets::generate(10, 1.0, &mut rng);
        assert_eq!(rings.outline_point(0), rings.outline_point(rings.outline.len()));
        assert_eq!(rings.resting_point(0), rings.outline[0]);
        assert_eq!(rings.resting_point(9), rings.fill_point(9));
    }
}
