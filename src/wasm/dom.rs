use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, NodeList, Window};

use crate::error::HeroError;

pub fn window() -> Result<Window, HeroError> {
    web_sys::window().ok_or_else(|| HeroError::Dom("no window".into()))
}

pub fn html_elements(list: &NodeList) -> Vec<HtmlElement> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

pub fn matches_media(window: &Window, query: &str) -> bool {
    matches!(window.match_media(query), Ok(Some(mq)) if mq.matches())
}

pub fn prefers_reduced_motion(window: &Window) -> bool {
    matches_media(window, "(prefers-reduced-motion: reduce)")
}

pub fn viewport_size(window: &Window) -> (f64, f64) {
    let dim = |v: Result<wasm_bindgen::JsValue, _>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (dim(window.inner_width()), dim(window.inner_height()))
}

/// `data-{name}` on `el`.
pub fn data_attr(el: &Element, name: &str) -> Option<String> {
    el.get_attribute(&format!("data-{name}"))
}

pub fn set_styles(el: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), HeroError> {
    let style = el.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}
