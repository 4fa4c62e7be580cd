//! Hero tunables. Each has a default; hosts override them with `data-*`
//! attributes on the container, or a JSON blob in `data-hero-config`.

use serde::Deserialize;

/// Viewport width at and above which the layout counts as "wide".
pub const WIDE_BREAKPOINT_PX: f64 = 1024.0;

/// What the hero does when the platform asks for reduced motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReducedMotion {
    /// Render the initial composition once and never advance it.
    #[default]
    Static,
    /// Ignore the preference and animate anyway.
    Animate,
}

impl ReducedMotion {
    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "static" => Some(Self::Static),
            "animate" => Some(Self::Animate),
            _ => None,
        }
    }
}

/// Seconds spent in each phase of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    pub drift: f32,
    pub gather: f32,
    pub fill: f32,
    pub release: f32,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            drift: 2.0,
            gather: 1.2,
            fill: 2.0,
            release: 3.6,
        }
    }
}

impl PhaseTimings {
    pub fn cycle(&self) -> f32 {
        self.drift + self.gather + self.fill + self.release
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroConfig {
    pub shard_count: usize,
    pub streak_count: usize,
    pub size_min: f32,
    pub size_max: f32,
    /// Fixed seed for a reproducible composition; random when absent.
    pub seed: Option<u64>,
    pub reduced_motion: ReducedMotion,
    pub timings: PhaseTimings,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            shard_count: 360,
            streak_count: 6,
            size_min: 0.30,
            size_max: 0.90,
            seed: None,
            reduced_motion: ReducedMotion::Static,
            timings: PhaseTimings::default(),
        }
    }
}

const MIN_SHARDS: usize = 2;
const MAX_SHARDS: usize = 4096;
const MAX_STREAKS: usize = 64;
const MIN_PHASE_SECS: f32 = 0.05;

impl HeroConfig {
    /// Build from host attributes. `lookup("shard-count")` should return the
    /// value of `data-shard-count`, if any. Unparseable values keep their
    /// default and log a warning.
    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup("hero-config") {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                console_warn!("[hero] ignoring data-hero-config: {e}");
                HeroConfig::default()
            }),
            None => HeroConfig::default(),
        };

        if let Some(v) = parse_attr(&lookup, "shard-count") {
            config.shard_count = v;
        }
        if let Some(v) = parse_attr(&lookup, "streak-count") {
            config.streak_count = v;
        }
        if let Some(v) = parse_attr(&lookup, "size-min") {
            config.size_min = v;
        }
        if let Some(v) = parse_attr(&lookup, "size-max") {
            config.size_max = v;
        }
        if let Some(v) = parse_attr(&lookup, "seed") {
            config.seed = Some(v);
        }
        if let Some(raw) = lookup("reduced-motion") {
            match ReducedMotion::parse(&raw) {
                Some(mode) => config.reduced_motion = mode,
                None => console_warn!("[hero] data-reduced-motion={raw:?} is not static|animate"),
            }
        }

        config.sanitized()
    }

    /// Clamp every knob into a range the scene can run with.
    pub fn sanitized(mut self) -> Self {
        let defaults = HeroConfig::default();
        self.shard_count = self.shard_count.clamp(MIN_SHARDS, MAX_SHARDS);
        self.streak_count = self.streak_count.min(MAX_STREAKS);

        if !(self.size_min.is_finite() && self.size_min > 0.0) {
            self.size_min = defaults.size_min;
        }
        if !(self.size_max.is_finite() && self.size_max > 0.0) {
            self.size_max = defaults.size_max;
        }
        if self.size_min > self.size_max {
            std::mem::swap(&mut self.size_min, &mut self.size_max);
        }

        for secs in [
            &mut self.timings.drift,
            &mut self.timings.gather,
            &mut self.timings.fill,
            &mut self.timings.release,
        ] {
            if !secs.is_finite() || *secs < MIN_PHASE_SECS {
                *secs = MIN_PHASE_SECS;
            }
        }
        self
    }
}

fn parse_attr<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            console_warn!("[hero] data-{name}={raw:?} is not a number; using default");
            None
        }
    }
}
