//! The hero background simulation.
//!
//! A fixed pool of shards loops through four phases: drift freely, gather
//! into a ring outline, fill the ring band, then hold and breathe while a
//! glyph flashes in the middle. Each completed loop advances the palette,
//! replaces the light streaks and reshuffles the targets.
//!
//! Nothing here touches the browser. [`SceneState::step`] is the whole
//! per-frame update; the WebGL side only reads the results.

mod camera;
mod motion;
mod rings;
mod streaks;

use std::f32::consts::TAU;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::config::{HeroConfig, PhaseTimings, ReducedMotion};
use crate::palette::{self, Rgb, PRESETS};
use crate::rng::Rng;

pub use camera::Camera;
pub use rings::{split_counts, RingTargets};
pub use streaks::LightStreak;

/// Largest parallax tilt in either axis.
pub const MAX_TILT_RAD: f32 = 2.0 * std::f32::consts::PI / 180.0;
/// Per-frame exponential smoothing toward the pointer tilt.
pub const PARALLAX_SMOOTHING: f32 = 0.08;
/// Weight of the new palette when crossfading colors at a loop boundary.
pub const COLOR_CROSSFADE: f32 = 0.85;
/// How long the center glyph stays visible at the start of `Release`.
pub const SYMBOL_WINDOW: f32 = 0.8;
const SYMBOL_PEAK_OPACITY: f32 = 0.9;
const SYMBOL_REST_SCALE: f32 = 0.8;
const RELEASE_HOLD: f32 = 0.65;
const GATHER_MAX_DELAY: f32 = 0.15;
const FILL_MAX_DELAY: f32 = 0.10;
const RING_RADIUS_JITTER: f32 = 0.05;
/// Loops a single `step` replays boundary by boundary. Any older loops in
/// the same step are only counted.
const MAX_REPLAYED_CYCLES: u64 = 8;
/// Base rotation rate (rad/s) per axis before the size scaling.
const SPIN_RATE: Vec3 = Vec3::new(0.08, 0.06, 0.04);

const BASE_BOX: Vec3 = Vec3::new(3.7, 2.3, 0.6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Drift,
    GatherOutline,
    FillRing,
    Release,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::Drift => Phase::GatherOutline,
            Phase::GatherOutline => Phase::FillRing,
            Phase::FillRing => Phase::Release,
            Phase::Release => Phase::Drift,
        }
    }

    pub fn duration(self, timings: &PhaseTimings) -> f64 {
        let secs = match self {
            Phase::Drift => timings.drift,
            Phase::GatherOutline => timings.gather,
            Phase::FillRing => timings.fill,
            Phase::Release => timings.release,
        };
        secs as f64
    }
}

/// Whether time moves the scene at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Animated,
    /// Reduced motion: the initial composition is drawn and kept.
    Still,
}

impl Motion {
    pub fn resolve(prefers_reduced_motion: bool, policy: ReducedMotion) -> Motion {
        match (prefers_reduced_motion, policy) {
            (true, ReducedMotion::Static) => Motion::Still,
            _ => Motion::Animated,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shard {
    pub base_position: Vec3,
    pub base_rotation: Vec3,
    /// Accumulated rotation on top of `base_rotation`.
    pub spin: Vec3,
    /// x/y anisotropic size, z fixed at 1.
    pub base_scale: Vec3,
    pub phase: f32,
}

/// Glyph flashed at the center when the ring is released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbol {
    pub glyph: char,
    pub opacity: f32,
    pub scale: f32,
}

impl Symbol {
    fn hidden(glyph: char) -> Self {
        Self {
            glyph,
            opacity: 0.0,
            scale: SYMBOL_REST_SCALE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneState {
    config: HeroConfig,
    motion: Motion,
    rng: Rng,

    /// Shared triangle every shard instances, slightly irregular.
    mesh: [Vec2; 3],
    shards: Vec<Shard>,
    colors: Vec<Rgb>,
    instances: Vec<Mat4>,
    rings: RingTargets,
    streaks: Vec<LightStreak>,
    next_streak_id: u64,
    symbol: Symbol,

    phase: Phase,
    phase_time: f64,
    /// Seconds since mount. Kept in `f64`; the motion terms wrap it.
    elapsed: f64,
    palette_index: usize,
    cycles: u64,

    tilt: Vec2,
    tilt_target: Vec2,

    instances_dirty: bool,
    colors_dirty: bool,
}

impl SceneState {
    pub fn new(config: HeroConfig, motion: Motion) -> Self {
        let config = config.sanitized();
        let mut rng = config.seed.map(Rng::new).unwrap_or_else(Rng::from_entropy);
        let mesh = shard_mesh(&mut rng);

        let shards: Vec<Shard> = (0..config.shard_count)
            .map(|_| {
                let s = rng.range(config.size_min, config.size_max);
                Shard {
                    base_position: random_base_position(&mut rng),
                    base_rotation: Vec3::new(
                        rng.rand01() * std::f32::consts::PI,
                        rng.rand01() * std::f32::consts::PI,
                        rng.rand01() * std::f32::consts::PI,
                    ),
                    spin: Vec3::ZERO,
                    base_scale: Vec3::new(s, s * rng.range(0.85, 1.15), 1.0),
                    phase: rng.angle(),
                }
            })
            .collect();

        let preset = palette::preset(0);
        let colors = (0..shards.len()).map(|i| preset.shard_color(i)).collect();
        let mut next_streak_id = 0;
        let streaks = streaks::spawn(config.streak_count, &mut next_streak_id, &mut rng);
        let rings = RingTargets::generate(shards.len(), 1.0, &mut rng);
        let instances = shards
            .iter()
            .map(|s| compose(s.base_position, s.base_rotation, s.base_scale))
            .collect();

        Self {
            config,
            motion,
            rng,
            mesh,
            shards,
            colors,
            instances,
            rings,
            streaks,
            next_streak_id,
            symbol: Symbol::hidden(preset.symbol),
            phase: Phase::Drift,
            phase_time: 0.0,
            elapsed: 0.0,
            palette_index: 0,
            cycles: 0,
            tilt: Vec2::ZERO,
            tilt_target: Vec2::ZERO,
            instances_dirty: true,
            colors_dirty: true,
        }
    }

    /// Advance the simulation by `dt` seconds and return the phases entered,
    /// in order. A long `dt` walks through the boundaries it crosses, so one
    /// call can complete several loops. Past `MAX_REPLAYED_CYCLES` loops the
    /// oldest ones are skipped in bulk: they still count toward `cycles` and
    /// the palette, but are not listed in the result.
    pub fn step(&mut self, dt: f32) -> Vec<Phase> {
        let mut entered = Vec::new();
        if self.motion == Motion::Still || !dt.is_finite() || dt <= 0.0 {
            return entered;
        }
        let dt = dt as f64;

        self.elapsed += dt;
        self.phase_time += dt;
        self.tilt += (self.tilt_target - self.tilt) * PARALLAX_SMOOTHING;

        let cycle = self.cycle_secs();
        let whole = (self.phase_time / cycle).floor() as u64;
        let skipped = whole.saturating_sub(MAX_REPLAYED_CYCLES);
        if skipped > 0 {
            self.phase_time -= skipped as f64 * cycle;
            self.cycles += skipped;
            self.palette_index = (self.palette_index + (skipped % PRESETS.len() as u64) as usize) % PRESETS.len();
        }

        loop {
            let duration = self.phase.duration(&self.config.timings);
            if self.phase_time < duration {
                break;
            }
            self.phase_time -= duration;
            if self.phase == Phase::Release {
                self.complete_cycle();
            }
            self.phase = self.phase.next();
            self.enter_phase();
            entered.push(self.phase);
        }

        self.update_symbol();
        for streak in &mut self.streaks {
            streak.shimmer(self.elapsed);
        }
        self.update_shards(dt as f32);
        entered
    }

    fn cycle_secs(&self) -> f64 {
        let timings = &self.config.timings;
        [Phase::Drift, Phase::GatherOutline, Phase::FillRing, Phase::Release]
            .iter()
            .map(|p| p.duration(timings))
            .sum()
    }

    /// Point the parallax at normalized container coordinates in `[-1, 1]`.
    pub fn point_at(&mut self, nx: f32, ny: f32) {
        if !(nx.is_finite() && ny.is_finite()) {
            return;
        }
        self.tilt_target = Vec2::new(-ny.clamp(-1.0, 1.0), nx.clamp(-1.0, 1.0)) * MAX_TILT_RAD;
    }

    pub fn release_pointer(&mut self) {
        self.tilt_target = Vec2::ZERO;
    }

    fn enter_phase(&mut self) {
        if self.phase == Phase::Release {
            self.symbol.opacity = 0.0;
        }
    }

    fn complete_cycle(&mut self) {
        self.cycles += 1;
        self.palette_index = (self.palette_index + 1) % PRESETS.len();
        let preset = palette::preset(self.palette_index);

        for (i, color) in self.colors.iter_mut().enumerate() {
            *color = color.lerp(preset.shard_color(i), COLOR_CROSSFADE);
        }
        self.colors_dirty = true;

        self.streaks = streaks::spawn(self.config.streak_count, &mut self.next_streak_id, &mut self.rng);
        self.symbol = Symbol::hidden(preset.symbol);

        let radius_scale = 1.0 + self.rng.spread(RING_RADIUS_JITTER);
        self.rings = RingTargets::generate(self.shards.len(), radius_scale, &mut self.rng);

        for shard in &mut self.shards {
            shard.base_position = random_base_position(&mut self.rng);
        }
    }

    fn update_symbol(&mut self) {
        if self.phase != Phase::Release {
            return;
        }
        let u = self.phase_time as f32 / SYMBOL_WINDOW;
        if u < 1.0 {
            let fade = (std::f32::consts::PI * motion::clamp01(u)).sin();
            self.symbol.opacity = SYMBOL_PEAK_OPACITY * fade;
            self.symbol.scale = 0.7 + 0.2 * fade;
        } else {
            self.symbol.opacity = 0.0;
        }
    }

    fn update_shards(&mut self, dt: f32) {
        let t = self.elapsed;
        let (size_min, size_max) = (self.config.size_min, self.config.size_max);
        let timings = self.config.timings;
        let phase_time = self.phase_time as f32;

        for (i, shard) in self.shards.iter_mut().enumerate() {
            let size = shard.base_scale.x;
            let drifted = shard.base_position + motion::drift_offset(shard.base_position, shard.phase, t);

            let position = match self.phase {
                Phase::Drift => drifted,
                Phase::GatherOutline => {
                    let u = motion::clamp01(phase_time / timings.gather);
                    let k = motion::delayed_weight(motion::ease_in_cubic(u), size, size_min, size_max, GATHER_MAX_DELAY);
                    drifted.lerp(self.rings.outline_point(i), k)
                }
                Phase::FillRing => {
                    let u = motion::clamp01(phase_time / timings.fill);
                    let k = motion::delayed_weight(motion::ease_out_quad(u), size, size_min, size_max, FILL_MAX_DELAY);
                    drifted.lerp(self.rings.fill_point(i), k)
                }
                Phase::Release => {
                    let p = self.rings.resting_point(i);
                    let breath = motion::release_breath(t, shard.phase);
                    drifted.lerp(Vec3::new(p.x * breath, p.y * breath, p.z), RELEASE_HOLD)
                }
            };

            let spin_scale = motion::map_linear(size, size_min, size_max, 1.2, 0.5);
            shard.spin = (shard.spin + SPIN_RATE * spin_scale * dt).rem_euclid(Vec3::splat(TAU));

            let b = motion::breathing_scale(t, shard.phase);
            let scale = Vec3::new(shard.base_scale.x * b, shard.base_scale.y * b, 1.0);
            self.instances[i] = compose(position, shard.base_rotation + shard.spin, scale);
        }
        self.instances_dirty = true;
    }

    pub fn config(&self) -> &HeroConfig {
        &self.config
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_time(&self) -> f64 {
        self.phase_time
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn palette_index(&self) -> usize {
        self.palette_index
    }

    /// Completed loops since mount.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn shard_mesh(&self) -> &[Vec2; 3] {
        &self.mesh
    }

    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// One model matrix per shard, in shard order.
    pub fn instances(&self) -> &[Mat4] {
        &self.instances
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn rings(&self) -> &RingTargets {
        &self.rings
    }

    pub fn streaks(&self) -> &[LightStreak] {
        &self.streaks
    }

    /// Accent colors for the streak texture of the current palette.
    pub fn streak_colors(&self) -> (Rgb, Rgb) {
        palette::preset(self.palette_index).streak_colors()
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Scene tilt (x, y) in radians, already smoothed.
    pub fn tilt(&self) -> Vec2 {
        self.tilt
    }

    /// Rotation applied to the whole scene graph.
    pub fn scene_rotation(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.tilt.x, self.tilt.y, 0.0)
    }

    pub fn instances_dirty(&self) -> bool {
        self.instances_dirty
    }

    pub fn colors_dirty(&self) -> bool {
        self.colors_dirty
    }

    /// Called by the renderer once the GPU copies are current.
    pub fn mark_uploaded(&mut self) {
        self.instances_dirty = false;
        self.colors_dirty = false;
    }
}

/// Functional form of [`SceneState::step`].
pub fn advance(mut state: SceneState, dt: f32) -> SceneState {
    state.step(dt);
    state
}

fn random_base_position(rng: &mut Rng) -> Vec3 {
    Vec3::new(
        rng.range(-BASE_BOX.x, BASE_BOX.x),
        rng.range(-BASE_BOX.y, BASE_BOX.y),
        rng.range(-BASE_BOX.z, BASE_BOX.z),
    )
}

/// Unit triangle with each corner nudged by up to 10% per axis.
fn shard_mesh(rng: &mut Rng) -> [Vec2; 3] {
    let corner = |i: usize, rng: &mut Rng| {
        let a = i as f32 * std::f32::consts::TAU / 3.0;
        Vec2::new(a.cos() * rng.range(0.9, 1.1), a.sin() * rng.range(0.9, 1.1))
    };
    [corner(0, rng), corner(1, rng), corner(2, rng)]
}

fn compose(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    let rotation = Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
    Mat4::from_scale_rotation_translation(scale, rotation, position)
}
