//! Scroll reveals driven by `IntersectionObserver`, plus the optional
//! scroll-linked glow.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window};

use super::dom;
use crate::error::HeroError;
use crate::reveal::{MotionEnv, RevealConfig, RevealMode};

/// Class on `<html>` that turns on the hidden initial state in CSS, so
/// content stays visible if this module never loads.
const READY_CLASS: &str = "reveal-ready";
const SHOWN_CLASS: &str = "is-in";

/// The elements that actually fade: the block's lines, or the block itself.
fn parts(block: &HtmlElement, config: &RevealConfig) -> Vec<HtmlElement> {
    let lines = block
        .query_selector_all(&config.line_selector)
        .map(|list| dom::html_elements(&list))
        .unwrap_or_default();
    if lines.is_empty() {
        vec![block.clone()]
    } else {
        lines
    }
}

fn hide(block: &HtmlElement, config: &RevealConfig) -> Result<(), HeroError> {
    block.class_list().remove_1(SHOWN_CLASS)?;
    let transform = config.hidden_transform();
    for part in parts(block, config) {
        dom::set_styles(&part, &[("opacity", "0"), ("transform", transform.as_str())])?;
    }
    Ok(())
}

/// Drop the inline styles `hide` set, handing the block back to the page CSS.
fn release(block: &HtmlElement, config: &RevealConfig) {
    for part in parts(block, config) {
        let style = part.style();
        for name in ["opacity", "transform", "transition"] {
            let _ = style.remove_property(name);
        }
    }
}

fn show(block: &HtmlElement, config: &RevealConfig) -> Result<(), HeroError> {
    block.class_list().add_1(SHOWN_CLASS)?;
    for (i, part) in parts(block, config).iter().enumerate() {
        dom::set_styles(
            part,
            &[
                ("transition", config.transition_css(i).as_str()),
                ("opacity", "1"),
                ("transform", "none"),
            ],
        )?;
    }
    Ok(())
}

/// What every scheduled show needs. `alive` is cleared on teardown so a
/// frame that was already requested does nothing.
#[derive(Clone)]
struct Shared {
    config: Rc<RevealConfig>,
    revealed: Rc<Cell<u32>>,
    alive: Rc<Cell<bool>>,
}

/// Show on the next frame so the hidden styles are committed first and the
/// transition actually runs.
fn show_next_frame(window: &Window, block: HtmlElement, shared: Shared) {
    let callback = Closure::once_into_js(move || {
        let Shared { config, revealed, alive } = shared;
        if !alive.get() {
            return;
        }
        if let Err(e) = show(&block, &config) {
            console_warn!("[reveal] {e}");
        }
        revealed.set(revealed.get() + 1);
    });
    if let Err(e) = window.request_animation_frame(callback.unchecked_ref()) {
        console_warn!("[reveal] could not schedule: {e:?}");
    }
}

struct Glow {
    section: HtmlElement,
    glow: HtmlElement,
}

struct Reveal {
    window: Window,
    config: Rc<RevealConfig>,
    blocks: Vec<HtmlElement>,
    alive: Rc<Cell<bool>>,
    observer: Option<IntersectionObserver>,
    _on_intersect: Option<Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>>,
    on_scroll: Option<Closure<dyn FnMut()>>,
}

impl Reveal {
    fn mount(config: RevealConfig, revealed: Rc<Cell<u32>>) -> Result<Self, HeroError> {
        let window = dom::window()?;
        let document = window.document().ok_or_else(|| HeroError::Dom("no document".into()))?;
        if let Some(root) = document.document_element() {
            root.class_list().add_1(READY_CLASS)?;
        }

        let blocks = dom::html_elements(&document.query_selector_all(&config.selector)?);
        let (viewport_width, viewport_height) = dom::viewport_size(&window);
        let env = MotionEnv {
            reduced_motion: dom::prefers_reduced_motion(&window),
            viewport_width,
        };
        let config = Rc::new(config);
        let shared = Shared {
            config: config.clone(),
            revealed: revealed.clone(),
            alive: Rc::new(Cell::new(true)),
        };

        let mut reveal = Reveal {
            window: window.clone(),
            config: config.clone(),
            blocks: Vec::new(),
            alive: shared.alive.clone(),
            observer: None,
            _on_intersect: None,
            on_scroll: None,
        };

        if !config.animates(env) {
            for block in &blocks {
                show(block, &config)?;
            }
            revealed.set(revealed.get() + blocks.len() as u32);
            return Ok(reveal);
        }

        let on_intersect = {
            let shared = shared.clone();
            let config = config.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let Ok(block) = entry.target().dyn_into::<HtmlElement>() else {
                        continue;
                    };
                    if entry.is_intersecting() {
                        if config.mode == RevealMode::Once {
                            observer.unobserve(&block);
                        }
                        show_next_frame(&window, block, shared.clone());
                    } else if config.mode == RevealMode::Toggle {
                        if let Err(e) = hide(&block, &config) {
                            console_warn!("[reveal] {e}");
                        }
                    }
                }
            }) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>)
        };

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(config.threshold));
        options.set_root_margin(&config.root_margin);
        let observer = IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &options)?;

        for block in &blocks {
            hide(block, &config)?;
            let top = block.get_bounding_client_rect().top();
            if config.shows_immediately(top, viewport_height) {
                show_next_frame(&window, block.clone(), shared.clone());
                if config.mode == RevealMode::Once {
                    continue;
                }
            }
            observer.observe(block);
        }

        if config.glow_enabled(env) {
            reveal.on_scroll = Self::track_glow(&window, &blocks, config.clone())?;
        }
        reveal.blocks = blocks;
        reveal.observer = Some(observer);
        reveal._on_intersect = Some(on_intersect);
        Ok(reveal)
    }

    /// Scroll-linked glow for every block that has one. Blocks without a
    /// glow element are skipped.
    fn track_glow(
        window: &Window,
        blocks: &[HtmlElement],
        config: Rc<RevealConfig>,
    ) -> Result<Option<Closure<dyn FnMut()>>, HeroError> {
        let glows: Vec<Glow> = blocks
            .iter()
            .filter_map(|section| {
                let glow = section.query_selector(&config.glow_selector).ok()??;
                let glow = glow.dyn_into::<HtmlElement>().ok()?;
                Some(Glow {
                    section: section.clone(),
                    glow,
                })
            })
            .collect();
        if glows.is_empty() {
            return Ok(None);
        }

        let update = {
            let window = window.clone();
            move || {
                let (_, viewport_height) = dom::viewport_size(&window);
                for Glow { section, glow } in &glows {
                    let top = section.get_bounding_client_rect().top();
                    let opacity = config.glow_opacity(top, viewport_height);
                    let _ = glow.style().set_property("opacity", &format!("{opacity:.3}"));
                }
            }
        };
        update();

        let on_scroll = Closure::wrap(Box::new(update) as Box<dyn FnMut()>);
        window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;
        Ok(Some(on_scroll))
    }

    fn teardown(self) {
        self.alive.set(false);
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
        if let Some(on_scroll) = &self.on_scroll {
            let _ = self
                .window
                .remove_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
        }

        // blocks still waiting to be shown go back to plain, visible markup
        for block in &self.blocks {
            if !block.class_list().contains(SHOWN_CLASS) {
                release(block, &self.config);
            }
        }
        if let Some(root) = self.window.document().and_then(|d| d.document_element()) {
            let _ = root.class_list().remove_1(READY_CLASS);
        }
    }
}

#[wasm_bindgen]
pub struct RevealHandle {
    reveal: Option<Reveal>,
    revealed: Rc<Cell<u32>>,
}

#[wasm_bindgen]
impl RevealHandle {
    pub fn destroy(&mut self) {
        if let Some(reveal) = self.reveal.take() {
            reveal.teardown();
        }
    }

    /// Blocks shown so far.
    #[wasm_bindgen(js_name = revealedCount)]
    pub fn revealed_count(&self) -> u32 {
        self.revealed.get()
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Wire up reveals for the whole document. `config_json` overrides the
/// defaults; without it `data-reveal-config` on `<html>` is used if present.
#[wasm_bindgen(js_name = mountReveal)]
pub fn mount_reveal(config_json: Option<String>) -> RevealHandle {
    let revealed = Rc::new(Cell::new(0));
    let json = config_json.or_else(|| {
        let document = web_sys::window()?.document()?;
        document
            .document_element()
            .and_then(|root| dom::data_attr(&root, "reveal-config"))
            .or_else(|| document.body().and_then(|body| dom::data_attr(&body, "reveal-config")))
    });
    let config = match json {
        Some(json) => RevealConfig::from_json(&json).unwrap_or_else(|e| {
            console_warn!("[reveal] bad config, using defaults: {e}");
            RevealConfig::default()
        }),
        None => RevealConfig::default(),
    };

    let reveal = match Reveal::mount(config, revealed.clone()) {
        Ok(reveal) => Some(reveal),
        Err(e) => {
            console_warn!("[reveal] {e}; leaving content as is");
            None
        }
    };
    RevealHandle { reveal, revealed }
}
