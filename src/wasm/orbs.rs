//! DOM side of the ambient orbs: spawns the orb spans into the layer, keeps
//! `--mx`/`--my`/`--intensity` on the hero root current and respawns on
//! resize. Under reduced motion the variables are pinned and no orbs or
//! loop exist.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{Element, HtmlElement, MouseEvent, Window};

use super::dom;
use crate::error::HeroError;
use crate::orbs::{self, OrbsConfig, Sway, STILL_INTENSITY};
use crate::rng::Rng;

const ORB_CLASS: &str = "orb orb--tiny";
const VARS: [&str; 3] = ["--mx", "--my", "--intensity"];
/// Variable writes are throttled to about 30 per second.
const WRITE_INTERVAL_MS: f64 = 1000.0 / 30.0;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct State {
    root: HtmlElement,
    layer: Element,
    config: OrbsConfig,
    rng: Rng,
    sway: Sway,
    spawned: Vec<Element>,
    alive: bool,
    last_timestamp: Option<f64>,
    last_write: f64,
    raf_id: Option<i32>,
    resize_raf: Option<i32>,
}

impl State {
    fn write_vars(&self) -> Result<(), HeroError> {
        let (mx, my) = self.sway.vars();
        let style = self.root.style();
        style.set_property("--mx", &format!("{mx:.4}"))?;
        style.set_property("--my", &format!("{my:.4}"))?;
        Ok(())
    }

    fn write_intensity(&self, window: &Window) -> Result<(), HeroError> {
        let rect = self.root.get_bounding_client_rect();
        let (_, viewport_height) = dom::viewport_size(window);
        let value = orbs::intensity(rect.top(), rect.height(), viewport_height);
        self.root.style().set_property("--intensity", &format!("{value:.3}"))?;
        Ok(())
    }

    fn clear_orbs(&mut self) {
        for orb in self.spawned.drain(..) {
            orb.remove();
        }
    }

    /// Drop every orb and spawn the count the current viewport calls for.
    fn respawn(&mut self, window: &Window) -> Result<(), HeroError> {
        self.clear_orbs();
        let (width, _) = dom::viewport_size(window);
        let count = self.config.count_for(width, dom::prefers_reduced_motion(window));
        let document = window.document().ok_or_else(|| HeroError::Dom("no document".into()))?;
        for orb in orbs::spawn(count, &mut self.rng) {
            let span = document.create_element("span")?;
            span.set_class_name(ORB_CLASS);
            span.set_attribute("style", &orb.style())?;
            self.layer.append_child(&span)?;
            self.spawned.push(span);
        }
        Ok(())
    }
}

struct Orbs {
    window: Window,
    state: Rc<RefCell<State>>,
    frame: FrameCallback,
    on_move: Closure<dyn FnMut(MouseEvent)>,
    on_scroll: Closure<dyn FnMut()>,
    on_resize: Closure<dyn FnMut()>,
}

impl Orbs {
    fn mount(root: HtmlElement) -> Result<Self, HeroError> {
        let window = dom::window()?;
        let config = OrbsConfig::from_attributes(|name| dom::data_attr(&root, name));
        let layer = root
            .query_selector("[data-orbs-layer]")?
            .unwrap_or_else(|| root.clone().into());
        let rng = config.seed.map(Rng::new).unwrap_or_else(Rng::from_entropy);

        let state = Rc::new(RefCell::new(State {
            root,
            layer,
            config,
            rng,
            sway: Sway::default(),
            spawned: Vec::new(),
            alive: true,
            last_timestamp: None,
            last_write: f64::NEG_INFINITY,
            raf_id: None,
            resize_raf: None,
        }));

        let on_move = {
            let state = state.clone();
            Closure::wrap(Box::new(move |e: MouseEvent| {
                let Ok(mut s) = state.try_borrow_mut() else {
                    return;
                };
                let rect = s.root.get_bounding_client_rect();
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return;
                }
                let nx = (e.client_x() as f64 - rect.left()) / rect.width() * 2.0 - 1.0;
                let ny = (e.client_y() as f64 - rect.top()) / rect.height() * 2.0 - 1.0;
                s.sway.point_at(nx, ny);
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        let on_scroll = {
            let state = state.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move || {
                if let Ok(s) = state.try_borrow() {
                    let _ = s.write_intensity(&window);
                }
            }) as Box<dyn FnMut()>)
        };

        // respawn once per burst of resize events
        let respawn = {
            let state = state.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move || {
                let Ok(mut s) = state.try_borrow_mut() else {
                    return;
                };
                s.resize_raf = None;
                if s.alive {
                    if let Err(e) = s.respawn(&window) {
                        console_warn!("[orbs] respawn failed: {e}");
                    }
                }
            }) as Box<dyn FnMut()>)
        };
        let on_resize = {
            let state = state.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move || {
                let Ok(mut s) = state.try_borrow_mut() else {
                    return;
                };
                if let Some(id) = s.resize_raf.take() {
                    let _ = window.cancel_animation_frame(id);
                }
                s.resize_raf = window.request_animation_frame(respawn.as_ref().unchecked_ref()).ok();
            }) as Box<dyn FnMut()>)
        };

        let orbs = Orbs {
            window,
            state,
            frame: Rc::new(RefCell::new(None)),
            on_move,
            on_scroll,
            on_resize,
        };
        match orbs.attach() {
            Ok(()) => Ok(orbs),
            Err(e) => {
                orbs.teardown();
                Err(e)
            }
        }
    }

    fn attach(&self) -> Result<(), HeroError> {
        if dom::prefers_reduced_motion(&self.window) {
            let s = self.state.borrow();
            let style = s.root.style();
            style.set_property("--mx", "0")?;
            style.set_property("--my", "0")?;
            style.set_property("--intensity", &STILL_INTENSITY.to_string())?;
            return Ok(());
        }

        self.window
            .add_event_listener_with_callback("pointermove", self.on_move.as_ref().unchecked_ref())?;
        self.window
            .add_event_listener_with_callback("scroll", self.on_scroll.as_ref().unchecked_ref())?;
        self.window
            .add_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref())?;
        {
            let mut s = self.state.borrow_mut();
            s.respawn(&self.window)?;
            s.write_intensity(&self.window)?;
            s.write_vars()?;
        }
        self.start_loop()
    }

    fn start_loop(&self) -> Result<(), HeroError> {
        let state = self.state.clone();
        let frame = self.frame.clone();
        let window = self.window.clone();

        *self.frame.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            let mut s = state.borrow_mut();
            s.raf_id = None;
            if !s.alive {
                return;
            }
            let dt = s.last_timestamp.map_or(0.0, |last| ((timestamp - last) / 1000.0).clamp(0.0, 1.0));
            s.last_timestamp = Some(timestamp);
            s.sway.advance(dt);
            if timestamp - s.last_write >= WRITE_INTERVAL_MS {
                s.last_write = timestamp;
                if let Err(e) = s.write_vars() {
                    console_warn!("[orbs] {e}");
                }
            }
            if let Some(callback) = frame.borrow().as_ref() {
                s.raf_id = window.request_animation_frame(callback.as_ref().unchecked_ref()).ok();
            }
        }) as Box<dyn FnMut(f64)>));

        let id = match self.frame.borrow().as_ref() {
            Some(callback) => self.window.request_animation_frame(callback.as_ref().unchecked_ref())?,
            None => return Err(HeroError::Resource("frame callback")),
        };
        self.state.borrow_mut().raf_id = Some(id);
        Ok(())
    }

    fn teardown(self) {
        let (raf, resize_raf) = {
            let mut s = self.state.borrow_mut();
            s.alive = false;
            (s.raf_id.take(), s.resize_raf.take())
        };
        for id in [raf, resize_raf].into_iter().flatten() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.frame.borrow_mut().take();

        for (event, callback) in [
            ("pointermove", self.on_move.as_ref()),
            ("scroll", self.on_scroll.as_ref()),
            ("resize", self.on_resize.as_ref()),
        ] {
            let _ = self
                .window
                .remove_event_listener_with_callback(event, callback.unchecked_ref());
        }

        let mut s = self.state.borrow_mut();
        s.clear_orbs();
        let style = s.root.style();
        for var in VARS {
            let _ = style.remove_property(var);
        }
    }
}

#[wasm_bindgen]
pub struct OrbsHandle {
    orbs: Option<Orbs>,
}

#[wasm_bindgen]
impl OrbsHandle {
    pub fn destroy(&mut self) {
        if let Some(orbs) = self.orbs.take() {
            orbs.teardown();
        }
    }

    /// Orb spans currently in the layer.
    #[wasm_bindgen(js_name = orbCount)]
    pub fn orb_count(&self) -> u32 {
        self.orbs
            .as_ref()
            .and_then(|o| o.state.try_borrow().ok().map(|s| s.spawned.len() as u32))
            .unwrap_or(0)
    }
}

impl Drop for OrbsHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Mount the orbs layer on a hero root carrying `data-orbs`. Orbs go into
/// its `[data-orbs-layer]` child, or the root itself.
#[wasm_bindgen(js_name = mountOrbs)]
pub fn mount_orbs(root: HtmlElement) -> OrbsHandle {
    let orbs = match Orbs::mount(root) {
        Ok(orbs) => Some(orbs),
        Err(e) => {
            console_warn!("[orbs] {e}");
            None
        }
    };
    OrbsHandle { orbs }
}
