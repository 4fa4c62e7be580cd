use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{HtmlElement, Window};

use super::dom;
use crate::carousel::{self, Carousel, CarouselConfig};
use crate::error::HeroError;

thread_local! {
    static MOUNTS: Cell<u32> = const { Cell::new(0) };
}

struct View {
    state: Carousel,
    slides: Vec<HtmlElement>,
    dots: Vec<HtmlElement>,
}

impl View {
    fn apply(&self) {
        for (i, slide) in self.slides.iter().enumerate() {
            let style = self.state.slide_style(i);
            let _ = dom::set_styles(slide, &[("opacity", style.opacity), ("z-index", style.z_index)]);
            let _ = slide.set_attribute("aria-hidden", if style.active { "false" } else { "true" });
        }
        for (i, dot) in self.dots.iter().enumerate() {
            let active = self.state.slide_style(i).active;
            let _ = dot.class_list().toggle_with_force("on", active);
            let _ = dot.set_attribute("aria-selected", if active { "true" } else { "false" });
        }
    }
}

struct Mounted {
    window: Window,
    view: Rc<RefCell<View>>,
    interval_id: Option<i32>,
    _tick: Option<Closure<dyn FnMut()>>,
    dot_clicks: Vec<Closure<dyn FnMut()>>,
    /// Slides whose `id` we set, cleared again on teardown.
    named: Vec<HtmlElement>,
}

impl Mounted {
    fn mount(container: &HtmlElement) -> Result<Self, HeroError> {
        let window = dom::window()?;
        let document = window.document().ok_or_else(|| HeroError::Dom("no document".into()))?;
        let config = CarouselConfig::from_attributes(|name| dom::data_attr(container, name));

        let slides = dom::html_elements(&container.query_selector_all(":scope > [data-slide]")?);
        let mount = MOUNTS.with(|n| {
            let id = n.get();
            n.set(id.wrapping_add(1));
            id
        });
        let mut named = Vec::new();
        for (i, slide) in slides.iter().enumerate() {
            if slide.id().is_empty() {
                slide.set_id(&carousel::slide_id(&container.id(), mount, i));
                named.push(slide.clone());
            }
        }

        // one button per slide, owned by us and removed on teardown
        let mut dots = Vec::new();
        if let Some(holder) = container.query_selector("[data-carousel-dots]")? {
            holder.set_attribute("role", "tablist")?;
            for (i, slide) in slides.iter().enumerate() {
                let dot: HtmlElement = document
                    .create_element("button")?
                    .dyn_into()
                    .map_err(|_| HeroError::Resource("dot button"))?;
                dot.set_attribute("type", "button")?;
                dot.set_attribute("role", "tab")?;
                dot.set_attribute("aria-controls", &slide.id())?;
                dot.set_title(&format!("Slide {}", i + 1));
                holder.append_child(&dot)?;
                dots.push(dot);
            }
        }

        let view = Rc::new(RefCell::new(View {
            state: Carousel::new(slides.len()),
            slides,
            dots,
        }));
        view.borrow().apply();

        let mut mounted = Mounted {
            window: window.clone(),
            view: view.clone(),
            interval_id: None,
            _tick: None,
            dot_clicks: Vec::new(),
            named,
        };

        let dots = view.borrow().dots.clone();
        for (i, dot) in dots.iter().enumerate() {
            let view = view.clone();
            let on_click = Closure::wrap(Box::new(move || {
                let mut v = view.borrow_mut();
                if v.state.select(i) {
                    v.apply();
                }
            }) as Box<dyn FnMut()>);
            dot.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            mounted.dot_clicks.push(on_click);
        }

        if view.borrow().state.len() > 1 {
            let tick = {
                let view = view.clone();
                Closure::wrap(Box::new(move || {
                    let mut v = view.borrow_mut();
                    v.state.advance();
                    v.apply();
                }) as Box<dyn FnMut()>)
            };
            let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                config.interval_ms as i32,
            )?;
            mounted.interval_id = Some(id);
            mounted._tick = Some(tick);
        }
        Ok(mounted)
    }

    fn teardown(self) {
        if let Some(id) = self.interval_id {
            self.window.clear_interval_with_handle(id);
        }
        let view = self.view.borrow();
        for (dot, on_click) in view.dots.iter().zip(&self.dot_clicks) {
            let _ = dot.remove_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
            dot.remove();
        }
        for slide in &self.named {
            let _ = slide.remove_attribute("id");
        }
    }
}

#[wasm_bindgen]
pub struct CarouselHandle {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl CarouselHandle {
    pub fn destroy(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.teardown();
        }
    }

    /// Currently shown slide, if mounted.
    pub fn index(&self) -> Option<u32> {
        let mounted = self.mounted.as_ref()?;
        let view = mounted.view.try_borrow().ok()?;
        Some(view.state.index() as u32)
    }
}

impl Drop for CarouselHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Start a carousel over the `[data-slide]` children of `container`.
#[wasm_bindgen(js_name = mountCarousel)]
pub fn mount_carousel(container: HtmlElement) -> CarouselHandle {
    let mounted = match Mounted::mount(&container) {
        Ok(m) => Some(m),
        Err(e) => {
            console_warn!("[carousel] {e}");
            None
        }
    };
    CarouselHandle { mounted }
}
