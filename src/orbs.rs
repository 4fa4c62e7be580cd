//! Ambient orbs behind the hero copy: a scatter of soft colored spans that
//! the page CSS animates, plus the `--mx`/`--my`/`--intensity` custom
//! properties that tilt and brighten them.
//!
//! Only layout and the numbers live here; `wasm::orbs` writes them to the DOM.

use crate::rng::Rng;

/// Orbs are a wide-layout embellishment; narrower viewports get the
/// mobile count.
pub const ORBS_WIDE_BREAKPOINT_PX: f64 = 1100.0;
const MAX_ORBS: usize = 512;

/// Radians per second of the idle sway clock.
const AUTO_SPEED: f64 = 0.096;
const AUTO_AMP_X: f64 = 0.05;
const AUTO_AMP_Y: f64 = 0.035;

/// `--intensity` while reduced motion is on.
pub const STILL_INTENSITY: f64 = 0.75;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrbsConfig {
    pub desktop_count: usize,
    pub mobile_count: usize,
    pub seed: Option<u64>,
}

impl Default for OrbsConfig {
    fn default() -> Self {
        Self {
            desktop_count: 96,
            mobile_count: 8,
            seed: None,
        }
    }
}

impl OrbsConfig {
    /// Read `data-orbs-desktop`, `data-orbs-mobile` and `data-orbs-seed`.
    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let count = |name: &str, fallback: usize| match lookup(name) {
            None => fallback,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) => n.min(MAX_ORBS),
                Err(_) => {
                    console_warn!("[orbs] data-{name}={raw:?} is not a count; using {fallback}");
                    fallback
                }
            },
        };
        config.desktop_count = count("orbs-desktop", config.desktop_count);
        config.mobile_count = count("orbs-mobile", config.mobile_count);
        config.seed = lookup("orbs-seed").and_then(|raw| raw.trim().parse().ok());
        config
    }

    /// How many orbs to show right now. None at all under reduced motion.
    pub fn count_for(&self, viewport_width: f64, reduced_motion: bool) -> usize {
        if reduced_motion {
            0
        } else if viewport_width >= ORBS_WIDE_BREAKPOINT_PX {
            self.desktop_count
        } else {
            self.mobile_count
        }
    }
}

/// One orb, in percent of the layer box plus its CSS animation knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
    pub x: f32,
    pub y: f32,
    pub size_px: u32,
    pub hue: u32,
    pub alpha: f32,
    pub d1_secs: f32,
    pub d2_secs: f32,
    /// Spin direction, 1 or -1.
    pub k: i8,
}

const COOL_HUES: [u32; 3] = [255, 268, 292];
const WARM_HUES: [u32; 4] = [18, 28, 36, 45];
const CENTER: (f32, f32) = (50.0, 48.0);
/// Orbs landing this close to the center are pushed out to `CENTER_RING`.
const CENTER_HOLE: f32 = 12.0;
const CENTER_RING: f32 = 14.0;

impl Orb {
    pub fn random(rng: &mut Rng) -> Self {
        let mut x = rng.range(-6.0, 106.0);
        let mut y = rng.range(-6.0, 106.0);
        if (x - CENTER.0).hypot(y - CENTER.1) < CENTER_HOLE {
            let a = rng.angle();
            x = CENTER.0 + a.cos() * CENTER_RING;
            y = CENTER.1 + a.sin() * CENTER_RING;
        }
        let size_px = rng.range(60.0, 180.0).round() as u32;
        let pool: &[u32] = if rng.rand01() < 0.6 { &COOL_HUES } else { &WARM_HUES };
        let hue = pool[((rng.rand01() * pool.len() as f32) as usize).min(pool.len() - 1)];
        Self {
            x,
            y,
            size_px,
            hue,
            alpha: rng.range(0.04, 0.10),
            d1_secs: rng.range(10.0, 24.0),
            d2_secs: rng.range(16.0, 32.0),
            k: if rng.rand01() < 0.5 { 1 } else { -1 },
        }
    }

    /// Inline `style` carrying the orb's custom properties.
    pub fn style(&self) -> String {
        format!(
            "--x:{:.1}; --y:{:.1}; --sz:{}px; --h:{}; --a:{:.2}; --d1:{:.1}s; --d2:{:.1}s; --k:{}",
            self.x, self.y, self.size_px, self.hue, self.alpha, self.d1_secs, self.d2_secs, self.k
        )
    }
}

pub fn spawn(count: usize, rng: &mut Rng) -> Vec<Orb> {
    (0..count).map(|_| Orb::random(rng)).collect()
}

/// Pointer plus idle sway, driving `--mx` / `--my`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sway {
    clock: f64,
    pointer: (f64, f64),
}

impl Sway {
    /// Pointer position in `[-1, 1]` over the hero box.
    pub fn point_at(&mut self, nx: f64, ny: f64) {
        if nx.is_finite() && ny.is_finite() {
            self.pointer = (nx, ny);
        }
    }

    /// Advance the idle clock. Its speed itself wobbles by 8%.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            let rate = AUTO_SPEED * (1.0 + (self.clock * 0.23).sin() * 0.08);
            self.clock += rate * dt;
        }
    }

    /// `(--mx, --my)`
    pub fn vars(&self) -> (f64, f64) {
        (
            self.pointer.0 + self.clock.sin() * AUTO_AMP_X,
            self.pointer.1 + (self.clock * 0.9).cos() * AUTO_AMP_Y,
        )
    }
}

/// `--intensity` for the hero box at `top`/`height` in a viewport of
/// `viewport_height`: 0.65 off-screen up to 1.10 when centered.
pub fn intensity(top: f64, height: f64, viewport_height: f64) -> f64 {
    let half = viewport_height.max(1.0) / 2.0;
    let offset = (top + height / 2.0 - half).abs();
    let visible = (1.0 - offset / half).clamp(0.0, 1.0);
    0.65 + visible * 0.45
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_depends_on_layout_and_motion() {
        let config = OrbsConfig::default();
        assert_eq!(config.count_for(1440.0, false), 96);
        assert_eq!(config.count_for(1100.0, false), 96);
        assert_eq!(config.count_for(1099.0, false), 8);
        assert_eq!(config.count_for(1440.0, true), 0);
    }

    #[test]
    fn attributes_set_counts() {
        let config = OrbsConfig::from_attributes(|name| match name {
            "orbs-desktop" => Some("40".into()),
            "orbs-mobile" => Some("0".into()),
            "orbs-seed" => Some("7".into()),
            _ => None,
        });
        assert_eq!(config.desktop_count, 40);
        assert_eq!(config.mobile_count, 0);
        assert_eq!(config.seed, Some(7));

        let config = OrbsConfig::from_attributes(|name| (name == "orbs-desktop").then(|| "many".into()));
        assert_eq!(config.desktop_count, 96);
        let config = OrbsConfig::from_attributes(|_| Some("100000".into()));
        assert_eq!(config.desktop_count, MAX_ORBS);
    }

    #[test]
    fn orbs_avoid_the_center_and_stay_in_range() {
        let mut rng = Rng::new(42);
        for orb in spawn(2_000, &mut rng) {
            let r = (orb.x - CENTER.0).hypot(orb.y - CENTER.1);
            assert!(r >= CENTER_HOLE - 1e-3, "{orb:?}");
            assert!((-6.0..=106.0).contains(&orb.x) && (-6.0..=106.0).contains(&orb.y));
            assert!((60..=180).contains(&orb.size_px));
            assert!(COOL_HUES.contains(&orb.hue) || WARM_HUES.contains(&orb.hue));
            assert!((0.04..=0.10).contains(&orb.alpha));
            assert!(orb.k == 1 || orb.k == -1);
        }
    }

    #[test]
    fn style_lists_every_property() {
        let orb = Orb {
            x: 12.34,
            y: -3.0,
            size_px: 90,
            hue: 268,
            alpha: 0.071,
            d1_secs: 12.26,
            d2_secs: 20.0,
            k: -1,
        };
        assert_eq!(
            orb.style(),
            "--x:12.3; --y:-3.0; --sz:90px; --h:268; --a:0.07; --d1:12.3s; --d2:20.0s; --k:-1"
        );
    }

    #[test]
    fn intensity_peaks_when_centered() {
        assert!((intensity(300.0, 200.0, 800.0) - 1.10).abs() < 1e-9);
        assert!((intensity(-2_000.0, 200.0, 800.0) - 0.65).abs() < 1e-9);
        assert!(intensity(0.0, 200.0, 0.0) >= 0.65);
    }

    #[test]
    fn sway_follows_pointer_with_small_idle_motion() {
        let mut sway = Sway::default();
        sway.point_at(0.5, -0.5);
        let (mx, my) = sway.vars();
        assert!((mx - 0.5).abs() < 1e-9);
        assert!((my - (-0.5 + AUTO_AMP_Y)).abs() < 1e-9);

        sway.advance(3.0);
        let (mx, my) = sway.vars();
        assert!((mx - 0.5).abs() <= AUTO_AMP_X + 1e-9);
        assert!((my + 0.5).abs() <= AUTO_AMP_Y + 1e-9);
        assert_ne!(sway.vars(), (0.5, -0.5 + AUTO_AMP_Y));

        sway.point_at(f64::NAN, 0.0);
        assert_eq!(sway.vars(), (mx, my));
    }
}
