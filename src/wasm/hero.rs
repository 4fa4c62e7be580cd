//! Mount/teardown of the hero background inside a host element.
//!
//! The host keeps ownership of the container; the hero appends exactly one
//! `<canvas>` and removes exactly that on teardown. Any failure while
//! mounting leaves the container as it was and yields an inert handle.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent, ResizeObserver};

use super::dom;
use super::render::Renderer;
use crate::config::HeroConfig;
use crate::error::HeroError;
use crate::scene::{Motion, SceneState};

/// Longest frame gap fed to the simulation, in seconds. A tab that was
/// hidden for an hour should not replay hundreds of loops in one frame.
const MAX_FRAME_DELTA: f64 = 10.0;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Inner {
    scene: SceneState,
    renderer: Renderer,
    /// Cleared on teardown; a callback that still fires sees it and bails.
    alive: bool,
    last_timestamp: Option<f64>,
    raf_id: Option<i32>,
}

impl Inner {
    fn render(&mut self) -> Result<(), HeroError> {
        let Inner { scene, renderer, .. } = self;
        renderer.draw(scene)
    }
}

struct Hero {
    container: HtmlElement,
    /// Receives the mouse listeners; the container itself has
    /// `pointer-events: none`.
    pointer_target: HtmlElement,
    canvas: HtmlCanvasElement,
    inner: Rc<RefCell<Inner>>,
    frame: FrameCallback,
    frames: Rc<Cell<u32>>,
    on_move: Closure<dyn FnMut(MouseEvent)>,
    on_leave: Closure<dyn FnMut(MouseEvent)>,
    _on_resize: Closure<dyn FnMut(js_sys::Array)>,
    resize_observer: ResizeObserver,
}

fn container_size(container: &HtmlElement) -> (f64, f64) {
    (container.client_width() as f64, container.client_height() as f64)
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32, HeroError> {
    Ok(dom::window()?.request_animation_frame(callback.as_ref().unchecked_ref())?)
}

impl Hero {
    fn mount(container: HtmlElement) -> Result<Self, HeroError> {
        let window = dom::window()?;
        let document = window.document().ok_or_else(|| HeroError::Dom("no document".into()))?;

        let config = HeroConfig::from_attributes(|name| dom::data_attr(&container, name));
        let motion = Motion::resolve(dom::prefers_reduced_motion(&window), config.reduced_motion);
        let scene = SceneState::new(config, motion);

        let canvas: HtmlCanvasElement = document
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| HeroError::Resource("canvas"))?;
        canvas.set_attribute("aria-hidden", "true")?;
        dom::set_styles(
            &canvas,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("width", "100%"),
                ("height", "100%"),
                ("pointer-events", "none"),
            ],
        )?;

        let size = container_size(&container);
        let renderer = Renderer::new(canvas.clone(), document, &scene, size, window.device_pixel_ratio())?;
        console_log!(
            "[hero] {} shards, {:?}, {}x{}",
            scene.shard_count(),
            scene.motion(),
            size.0,
            size.1
        );

        let inner = Rc::new(RefCell::new(Inner {
            scene,
            renderer,
            alive: true,
            last_timestamp: None,
            raf_id: None,
        }));

        let pointer_target = container
            .parent_element()
            .and_then(|p| p.dyn_into::<HtmlElement>().ok())
            .unwrap_or_else(|| container.clone());

        let on_move = {
            let inner = inner.clone();
            let container = container.clone();
            Closure::wrap(Box::new(move |e: MouseEvent| {
                let rect = container.get_bounding_client_rect();
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return;
                }
                let nx = (e.client_x() as f64 - rect.left()) / rect.width() * 2.0 - 1.0;
                let ny = (e.client_y() as f64 - rect.top()) / rect.height() * 2.0 - 1.0;
                if let Ok(mut state) = inner.try_borrow_mut() {
                    state.scene.point_at(nx as f32, ny as f32);
                }
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        let on_leave = {
            let inner = inner.clone();
            Closure::wrap(Box::new(move |_: MouseEvent| {
                if let Ok(mut state) = inner.try_borrow_mut() {
                    state.scene.release_pointer();
                }
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        let on_resize = {
            let inner = inner.clone();
            let container = container.clone();
            Closure::wrap(Box::new(move |_entries: js_sys::Array| {
                let Ok(mut state) = inner.try_borrow_mut() else {
                    return;
                };
                if !state.alive {
                    return;
                }
                let (w, h) = container_size(&container);
                state.renderer.resize(w, h);
                // resizing clears the canvas; a still scene has no next frame
                if state.scene.motion() == Motion::Still {
                    if let Err(e) = state.render() {
                        console_warn!("[hero] redraw after resize failed: {e}");
                    }
                }
            }) as Box<dyn FnMut(js_sys::Array)>)
        };
        let resize_observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref())?;

        let hero = Hero {
            container,
            pointer_target,
            canvas,
            inner,
            frame: Rc::new(RefCell::new(None)),
            frames: Rc::new(Cell::new(0)),
            on_move,
            on_leave,
            _on_resize: on_resize,
            resize_observer,
        };

        match hero.attach() {
            Ok(()) => Ok(hero),
            Err(e) => {
                hero.teardown();
                Err(e)
            }
        }
    }

    fn attach(&self) -> Result<(), HeroError> {
        self.pointer_target
            .add_event_listener_with_callback("mousemove", self.on_move.as_ref().unchecked_ref())?;
        self.pointer_target
            .add_event_listener_with_callback("mouseleave", self.on_leave.as_ref().unchecked_ref())?;
        self.resize_observer.observe(&self.container);
        self.container.append_child(&self.canvas)?;

        let still = self.inner.borrow().scene.motion() == Motion::Still;
        if still {
            self.inner.borrow_mut().render()?;
            self.frames.set(1);
            Ok(())
        } else {
            self.start_loop()
        }
    }

    /// Each frame callback schedules its successor, so exactly one is ever
    /// pending.
    fn start_loop(&self) -> Result<(), HeroError> {
        let inner = self.inner.clone();
        let frame = self.frame.clone();
        let frames = self.frames.clone();

        *self.frame.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            let mut state = inner.borrow_mut();
            state.raf_id = None;
            if !state.alive {
                return;
            }

            let dt = state
                .last_timestamp
                .map_or(0.0, |last| ((timestamp - last) / 1000.0).clamp(0.0, MAX_FRAME_DELTA));
            state.last_timestamp = Some(timestamp);
            state.scene.step(dt as f32);

            if let Err(e) = state.render() {
                console_warn!("[hero] render failed, stopping: {e}");
                state.alive = false;
                return;
            }
            frames.set(frames.get() + 1);

            // schedule next
            if let Some(callback) = frame.borrow().as_ref() {
                match request_frame(callback) {
                    Ok(id) => state.raf_id = Some(id),
                    Err(e) => {
                        console_warn!("[hero] could not schedule frame: {e}");
                        state.alive = false;
                    }
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let id = match self.frame.borrow().as_ref() {
            Some(callback) => request_frame(callback)?,
            None => return Err(HeroError::Resource("frame callback")),
        };
        self.inner.borrow_mut().raf_id = Some(id);
        Ok(())
    }

    /// Undo everything `mount` did. Tolerates a partially attached hero.
    fn teardown(self) {
        let pending = {
            let mut state = self.inner.borrow_mut();
            state.alive = false;
            state.raf_id.take()
        };
        if let (Some(id), Ok(window)) = (pending, dom::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        // drops the self-referencing closure and with it the Rc cycle
        self.frame.borrow_mut().take();

        let _ = self
            .pointer_target
            .remove_event_listener_with_callback("mousemove", self.on_move.as_ref().unchecked_ref());
        let _ = self
            .pointer_target
            .remove_event_listener_with_callback("mouseleave", self.on_leave.as_ref().unchecked_ref());
        self.resize_observer.disconnect();

        self.inner.borrow_mut().renderer.dispose();
        if self.canvas.parent_node().is_some() {
            let _ = self.container.remove_child(&self.canvas);
        }
    }
}

/// Handle returned to JS for one mounted hero.
#[wasm_bindgen]
pub struct HeroHandle {
    hero: Option<Hero>,
    frames: Rc<Cell<u32>>,
}

#[wasm_bindgen]
impl HeroHandle {
    /// Stop the loop and remove the canvas. Calling it again does nothing.
    pub fn destroy(&mut self) {
        if let Some(hero) = self.hero.take() {
            hero.teardown();
        }
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.hero.is_some()
    }

    /// Frames rendered so far.
    #[wasm_bindgen(js_name = frameCount)]
    pub fn frame_count(&self) -> u32 {
        self.frames.get()
    }

    #[wasm_bindgen(js_name = paletteIndex)]
    pub fn palette_index(&self) -> Option<u32> {
        let hero = self.hero.as_ref()?;
        let state = hero.inner.try_borrow().ok()?;
        Some(state.scene.palette_index() as u32)
    }
}

impl Drop for HeroHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Mount the hero into `container`. Never throws: if WebGL2 or any other
/// resource is unavailable the container is left untouched and the returned
/// handle is inert.
#[wasm_bindgen(js_name = mountHero)]
pub fn mount_hero(container: HtmlElement) -> HeroHandle {
    match Hero::mount(container) {
        Ok(hero) => HeroHandle {
            frames: hero.frames.clone(),
            hero: Some(hero),
        },
        Err(e) => {
            console_warn!("[hero] {e}; rendering nothing");
            HeroHandle {
                hero: None,
                frames: Rc::new(Cell::new(0)),
            }
        }
    }
}
