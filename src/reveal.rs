//! Scroll-triggered reveal settings and the decisions that don't need a DOM.
//!
//! Every marketing section used to carry its own copy of this behaviour with
//! slightly different thresholds and easing. One [`RevealConfig`] now holds
//! the knobs that actually varied.

use serde::Deserialize;

use crate::config::WIDE_BREAKPOINT_PX;

/// Which environments get the fade/translate animation.
///
/// The site never settled this: some sections went static on narrow screens
/// too, others only for reduced motion. Hosts choose explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionPolicy {
    /// Animate unless the platform asks for reduced motion.
    #[default]
    ReducedMotionOnly,
    /// Also show everything immediately below the wide breakpoint.
    ReducedMotionOrCompact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealMode {
    /// Reveal on first entry and stop watching.
    #[default]
    Once,
    /// Hide again whenever the element leaves the viewport.
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    #[default]
    Power2Out,
    Power3Out,
    SineInOut,
}

impl Easing {
    pub fn css(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Power2Out => "cubic-bezier(0.215, 0.61, 0.355, 1)",
            Easing::Power3Out => "cubic-bezier(0.165, 0.84, 0.44, 1)",
            Easing::SineInOut => "cubic-bezier(0.445, 0.05, 0.55, 0.95)",
        }
    }
}

/// What the page environment looks like at mount time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEnv {
    pub reduced_motion: bool,
    pub viewport_width: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevealConfig {
    pub selector: String,
    /// Children revealed one after another instead of the block as a whole.
    pub line_selector: String,
    pub glow_selector: String,
    pub threshold: f64,
    pub root_margin: String,
    pub distance_px: f64,
    pub duration_ms: f64,
    pub stagger_ms: f64,
    pub easing: Easing,
    pub mode: RevealMode,
    pub policy: MotionPolicy,
    pub wide_breakpoint_px: f64,
    pub glow_max_opacity: f64,
    /// Elements whose top is already above this fraction of the viewport at
    /// mount are shown without waiting for the observer.
    pub early_show_fraction: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: "[data-reveal]".into(),
            line_selector: "[data-reveal-line]".into(),
            glow_selector: "[data-reveal-glow]".into(),
            threshold: 0.01,
            root_margin: "0px 0px -5% 0px".into(),
            distance_px: 24.0,
            duration_ms: 600.0,
            stagger_ms: 120.0,
            easing: Easing::Power2Out,
            mode: RevealMode::Once,
            policy: MotionPolicy::ReducedMotionOnly,
            wide_breakpoint_px: WIDE_BREAKPOINT_PX,
            glow_max_opacity: 0.5,
            early_show_fraction: 0.9,
        }
    }
}

impl RevealConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_wide(&self, env: MotionEnv) -> bool {
        env.viewport_width >= self.wide_breakpoint_px
    }

    /// Whether elements should animate in, or just be shown.
    pub fn animates(&self, env: MotionEnv) -> bool {
        if env.reduced_motion {
            return false;
        }
        match self.policy {
            MotionPolicy::ReducedMotionOnly => true,
            MotionPolicy::ReducedMotionOrCompact => self.is_wide(env),
        }
    }

    /// The glow only follows scroll in wide layouts with motion allowed.
    pub fn glow_enabled(&self, env: MotionEnv) -> bool {
        self.animates(env) && self.is_wide(env)
    }

    pub fn shows_immediately(&self, top: f64, viewport_height: f64) -> bool {
        top < viewport_height * self.early_show_fraction
    }

    pub fn hidden_transform(&self) -> String {
        format!("translateY({}px)", self.distance_px)
    }

    /// CSS `transition` for the `index`-th line of a block.
    pub fn transition_css(&self, index: usize) -> String {
        let delay = self.stagger_ms * index as f64;
        let ease = self.easing.css();
        format!(
            "opacity {d}ms {ease} {delay}ms, transform {d}ms {ease} {delay}ms",
            d = self.duration_ms
        )
    }

    /// Glow opacity for a section whose top edge sits at `section_top`
    /// (viewport coordinates). Ramps from 0 when the top crosses the middle
    /// of the viewport to the max after another 80% of a viewport.
    pub fn glow_opacity(&self, section_top: f64, viewport_height: f64) -> f64 {
        if viewport_height <= 0.0 {
            return 0.0;
        }
        let travelled = viewport_height / 2.0 - section_top;
        let progress = (travelled / (viewport_height * 0.8)).clamp(0.0, 1.0);
        self.glow_max_opacity * progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: MotionEnv = MotionEnv {
        reduced_motion: false,
        viewport_width: 390.0,
    };
    const DESKTOP: MotionEnv = MotionEnv {
        reduced_motion: false,
        viewport_width: 1440.0,
    };

    #[test]
    fn reduced_motion_always_wins() {
        let config = RevealConfig::default();
        let env = MotionEnv {
            reduced_motion: true,
            ..DESKTOP
        };
        assert!(!config.animates(env));
        assert!(!config.glow_enabled(env));
    }

    #[test]
    fn policy_decides_compact() {
        let mut config = RevealConfig::default();
        assert!(config.animates(PHONE));
        config.policy = MotionPolicy::ReducedMotionOrCompact;
        assert!(!config.animates(PHONE));
        assert!(config.animates(DESKTOP));
    }

    #[test]
    fn glow_needs_wide_layout() {
        let config = RevealConfig::default();
        assert!(!config.glow_enabled(PHONE));
        assert!(config.glow_enabled(DESKTOP));
    }

    #[test]
    fn json_overrides_some_fields() {
        let config = RevealConfig::from_json(
            r#"{"threshold": 0.2, "mode": "toggle", "policy": "reduced-motion-or-compact", "easing": "sine-in-out"}"#,
        )
        .unwrap();
        assert_eq!(config.threshold, 0.2);
        assert_eq!(config.mode, RevealMode::Toggle);
        assert_eq!(config.policy, MotionPolicy::ReducedMotionOrCompact);
        assert_eq!(config.easing, Easing::SineInOut);
        assert_eq!(config.selector, "[data-reveal]");
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(RevealConfig::from_json(r#"{"mode": "sometimes"}"#).is_err());
    }

    #[test]
    fn stagger_delays_lines() {
        let config = RevealConfig::default();
        assert!(config.transition_css(0).contains(" 0ms"));
        assert!(config.transition_css(2).ends_with("240ms"));
        assert_eq!(config.hidden_transform(), "translateY(24px)");
    }

    #[test]
    fn early_show_threshold() {
        let config = RevealConfig::default();
        assert!(config.shows_immediately(100.0, 800.0));
        assert!(!config.shows_immediately(750.0, 800.0));
    }

    #[test]
    fn glow_ramps_with_scroll() {
        let config = RevealConfig::default();
        assert_eq!(config.glow_opacity(600.0, 800.0), 0.0);
        assert_eq!(config.glow_opacity(400.0, 800.0), 0.0);
        assert!((config.glow_opacity(80.0, 800.0) - 0.25).abs() < 1e-9);
        assert_eq!(config.glow_opacity(-1000.0, 800.0), 0.5);
        assert_eq!(config.glow_opacity(0.0, 0.0), 0.0);
    }
}
