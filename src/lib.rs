//! Decorative front-end pieces for the portfolio site, compiled to WebAssembly.
//!
//! The simulation core (`scene`, `palette`, `config`, `reveal`, `carousel`,
//! `orbs`) is
//! plain Rust and builds on the host so it can be unit tested. Everything that
//! touches the DOM or WebGL2 lives in `wasm` and only compiles for wasm32.

#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

#[macro_use]
mod log;

pub mod carousel;
pub mod config;
pub mod error;
pub mod orbs;
pub mod palette;
pub mod reveal;
pub mod rng;
pub mod scene;

pub use error::HeroError;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    mod carousel;
    mod dom;
    mod hero;
    mod orbs;
    mod render;
    mod reveal;
    mod stripes;

    pub use carousel::{mount_carousel, CarouselHandle};
    pub use hero::{mount_hero, HeroHandle};
    pub use orbs::{mount_orbs, OrbsHandle};
    pub use reveal::{mount_reveal, RevealHandle};
    pub use stripes::{mount_stripes, StripesHandle};

    /// Components mounted by the `start` scan, released by `teardown_all`.
    enum Mounted {
        Hero(HeroHandle),
        Orbs(OrbsHandle),
        Reveal(RevealHandle),
        Carousel(CarouselHandle),
        Stripes(StripesHandle),
    }

    thread_local! {
        static MOUNTED: RefCell<Vec<Mounted>> = const { RefCell::new(Vec::new()) };
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let mut mounted = Vec::new();
        for el in dom::html_elements(&document.query_selector_all("[data-hero-canvas]")?) {
            mounted.push(Mounted::Hero(mount_hero(el)));
        }
        for el in dom::html_elements(&document.query_selector_all("[data-orbs]")?) {
            mounted.push(Mounted::Orbs(mount_orbs(el)));
        }
        mounted.push(Mounted::Reveal(mount_reveal(None)));
        for el in dom::html_elements(&document.query_selector_all("[data-carousel]")?) {
            mounted.push(Mounted::Carousel(mount_carousel(el)));
        }
        for el in dom::html_elements(&document.query_selector_all("[data-stripes]")?) {
            mounted.push(Mounted::Stripes(mount_stripes(el)));
        }
        console_log!("[bootstrap] mounted {} component(s)", mounted.len());

        MOUNTED.with(|m| m.borrow_mut().extend(mounted));
        Ok(())
    }

    /// Tear down every component mounted by the `start` scan.
    #[wasm_bindgen(js_name = teardownAll)]
    pub fn teardown_all() {
        let mounted = MOUNTED.with(|m| std::mem::take(&mut *m.borrow_mut()));
        for component in mounted {
            match component {
                Mounted::Hero(mut h) => h.destroy(),
                Mounted::Orbs(mut o) => o.destroy(),
                Mounted::Reveal(mut r) => r.destroy(),
                Mounted::Carousel(mut c) => c.destroy(),
                Mounted::Stripes(mut s) => s.destroy(),
            }
        }
    }
}
