//! Animated stripes pause while off screen, and a click toggles the pause
//! by hand (touch screens have no hover to stop them).

use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use super::dom;
use crate::error::HeroError;

const PAUSED_CLASS: &str = "paused";
const DEFAULT_STRIPE_SELECTOR: &str = ".stripe";
const VISIBLE_THRESHOLD: f64 = 0.1;

struct Stripes {
    stripes: Vec<HtmlElement>,
    observer: IntersectionObserver,
    _on_intersect: Closure<dyn FnMut(js_sys::Array)>,
    on_clicks: Vec<Closure<dyn FnMut()>>,
}

impl Stripes {
    fn mount(container: &HtmlElement) -> Result<Self, HeroError> {
        let selector = dom::data_attr(container, "stripe-selector").unwrap_or_else(|| DEFAULT_STRIPE_SELECTOR.into());
        let stripes = dom::html_elements(&container.query_selector_all(&selector)?);

        let on_intersect = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let _ = entry
                    .target()
                    .class_list()
                    .toggle_with_force(PAUSED_CLASS, !entry.is_intersecting());
            }
        }) as Box<dyn FnMut(js_sys::Array)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(VISIBLE_THRESHOLD));
        let observer = IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &options)?;

        let mut mounted = Stripes {
            stripes: Vec::new(),
            observer,
            _on_intersect: on_intersect,
            on_clicks: Vec::new(),
        };
        for stripe in stripes {
            let on_click = {
                let stripe = stripe.clone();
                Closure::wrap(Box::new(move || {
                    let _ = stripe.class_list().toggle(PAUSED_CLASS);
                }) as Box<dyn FnMut()>)
            };
            if let Err(e) = stripe.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref()) {
                mounted.teardown();
                return Err(e.into());
            }
            mounted.observer.observe(&stripe);
            mounted.stripes.push(stripe);
            mounted.on_clicks.push(on_click);
        }
        Ok(mounted)
    }

    fn paused_count(&self) -> u32 {
        self.stripes
            .iter()
            .filter(|s| s.class_list().contains(PAUSED_CLASS))
            .count() as u32
    }

    fn teardown(self) {
        self.observer.disconnect();
        for (stripe, on_click) in self.stripes.iter().zip(&self.on_clicks) {
            let _ = stripe.remove_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
            let _ = stripe.class_list().remove_1(PAUSED_CLASS);
        }
    }
}

#[wasm_bindgen]
pub struct StripesHandle {
    stripes: Option<Stripes>,
}

#[wasm_bindgen]
impl StripesHandle {
    pub fn destroy(&mut self) {
        if let Some(stripes) = self.stripes.take() {
            stripes.teardown();
        }
    }

    #[wasm_bindgen(js_name = pausedCount)]
    pub fn paused_count(&self) -> u32 {
        self.stripes.as_ref().map_or(0, Stripes::paused_count)
    }
}

impl Drop for StripesHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Pause/resume the stripes inside `container` (`.stripe` children, or
/// whatever `data-stripe-selector` names).
#[wasm_bindgen(js_name = mountStripes)]
pub fn mount_stripes(container: HtmlElement) -> StripesHandle {
    let stripes = match Stripes::mount(&container) {
        Ok(s) => Some(s),
        Err(e) => {
            console_warn!("[stripes] {e}");
            None
        }
    };
    StripesHandle { stripes }
}
