//! Auto-advancing panel carousel: index bookkeeping and per-slide styling.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarouselConfig {
    pub interval_ms: u32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self { interval_ms: 3600 }
    }
}

const MIN_INTERVAL_MS: u32 = 250;

impl CarouselConfig {
    /// Read `data-interval-ms`; anything unusable keeps the default.
    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup("interval-ms") {
            match raw.trim().parse::<u32>() {
                Ok(ms) => config.interval_ms = ms.max(MIN_INTERVAL_MS),
                Err(_) => console_warn!("[carousel] data-interval-ms={raw:?} is not a number"),
            }
        }
        config
    }
}

/// How one slide should look for the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideStyle {
    pub active: bool,
    pub opacity: &'static str,
    pub z_index: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Move to the next slide, wrapping. No-op when empty.
    pub fn advance(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    /// Jump to `index`. Out-of-range requests are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.index = index;
        true
    }

    pub fn slide_style(&self, slide: usize) -> SlideStyle {
        let active = slide == self.index;
        SlideStyle {
            active,
            opacity: if active { "1" } else { "0" },
            z_index: if active { "2" } else { "1" },
        }
    }
}

/// Id for a slide that arrived without one. Named containers scope their
/// slides by name; unnamed ones by `mount`, a number unique per mount.
pub fn slide_id(container_id: &str, mount: u32, slide: usize) -> String {
    if container_id.is_empty() {
        format!("carousel-{mount}-slide-{slide}")
    } else {
        format!("{container_id}-slide-{slide}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_wraps() {
        let mut c = Carousel::new(3);
        assert_eq!(c.advance(), 1);
        assert_eq!(c.advance(), 2);
        assert_eq!(c.advance(), 0);
    }

    #[test]
    fn empty_never_moves() {
        let mut c = Carousel::new(0);
        assert_eq!(c.advance(), 0);
        assert!(!c.select(0));
        assert!(c.is_empty());
    }

    #[test]
    fn select_and_style() {
        let mut c = Carousel::new(4);
        assert!(c.select(2));
        assert!(!c.select(4));
        assert_eq!(c.index(), 2);
        let on = c.slide_style(2);
        assert!(on.active);
        assert_eq!((on.opacity, on.z_index), ("1", "2"));
        let off = c.slide_style(0);
        assert_eq!((off.opacity, off.z_index), ("0", "1"));
    }

    #[test]
    fn interval_attribute() {
        let config = CarouselConfig::from_attributes(|name| (name == "interval-ms").then(|| "5000".to_string()));
        assert_eq!(config.interval_ms, 5000);
        let config = CarouselConfig::from_attributes(|_| Some("fast".to_string()));
        assert_eq!(config.interval_ms, 3600);
        let config = CarouselConfig::from_attributes(|_| Some("10".to_string()));
        assert_eq!(config.interval_ms, MIN_INTERVAL_MS);
    }

    #[test]
    fn unnamed_containers_get_distinct_slide_ids() {
        assert_eq!(slide_id("panels", 0, 2), "panels-slide-2");
        assert_eq!(slide_id("", 0, 0), "carousel-0-slide-0");
        assert_ne!(slide_id("", 0, 0), slide_id("", 1, 0));
    }
}
