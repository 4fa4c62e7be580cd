#![cfg(target_arch = "wasm32")]

use hero_wasm::wasm::{mount_carousel, mount_hero, mount_orbs, mount_reveal, mount_stripes};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

fn host(html: &str) -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let el: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    el.style().set_property("position", "relative").unwrap();
    el.style().set_property("width", "640px").unwrap();
    el.style().set_property("height", "360px").unwrap();
    el.set_inner_html(html);
    document.body().unwrap().append_child(&el).unwrap();
    el
}

#[wasm_bindgen_test(async)]
async fn teardown_right_after_mount_stops_everything() {
    let container = host("");
    container.set_attribute("data-shard-count", "48").unwrap();

    let mut hero = mount_hero(container.clone());
    hero.destroy();
    let frames = hero.frame_count();

    sleep(250).await;

    assert_eq!(hero.frame_count(), frames);
    assert!(!hero.is_active());
    assert_eq!(container.child_element_count(), 0);

    // idempotent
    hero.destroy();
    container.remove();
}

#[wasm_bindgen_test(async)]
async fn mounted_hero_owns_one_canvas() {
    let container = host("<span>foreground</span>");
    let mut hero = mount_hero(container.clone());

    if hero.is_active() {
        assert_eq!(container.child_element_count(), 2);
        sleep(200).await;
        assert!(hero.frame_count() > 0);
        assert_eq!(hero.palette_index(), Some(0));
    } else {
        // no WebGL2 in this browser: nothing was added
        assert_eq!(container.child_element_count(), 1);
    }

    hero.destroy();
    assert_eq!(container.child_element_count(), 1);
    container.remove();
}

#[wasm_bindgen_test(async)]
async fn carousel_advances_and_dots_select() {
    let container = host(
        r#"<figure data-slide></figure><figure data-slide></figure><figure data-slide></figure>
           <div data-carousel-dots></div>"#,
    );
    container.set_attribute("data-interval-ms", "300").unwrap();
    container.set_id("test-carousel");

    let mut carousel = mount_carousel(container.clone());
    assert_eq!(carousel.index(), Some(0));

    let dots = container.query_selector_all("[data-carousel-dots] button").unwrap();
    assert_eq!(dots.length(), 3);

    sleep(450).await;
    assert_eq!(carousel.index(), Some(1));

    let third: HtmlElement = dots.item(2).unwrap().dyn_into().unwrap();
    third.click();
    assert_eq!(carousel.index(), Some(2));
    assert!(third.class_list().contains("on"));

    carousel.destroy();
    assert_eq!(
        container.query_selector_all("[data-carousel-dots] button").unwrap().length(),
        0
    );
    container.remove();
}

#[wasm_bindgen_test(async)]
async fn visible_blocks_reveal_without_scrolling() {
    let container = host(r#"<div class="reveal-test-block"><p data-reveal-line>a</p><p data-reveal-line>b</p></div>"#);
    let json = r#"{"selector": ".reveal-test-block", "durationMs": 10}"#;

    let mut reveal = mount_reveal(Some(json.to_string()));
    sleep(100).await;

    let block = container.first_element_child().unwrap();
    assert!(block.class_list().contains("is-in"));
    assert_eq!(reveal.revealed_count(), 1);

    reveal.destroy();
    container.remove();
}

#[wasm_bindgen_test]
fn unnamed_carousels_do_not_share_slide_ids() {
    let slides = r#"<figure data-slide></figure><figure data-slide id="kept"></figure>"#;
    let a = host(slides);
    let b = host(slides);

    let mut first = mount_carousel(a.clone());
    let mut second = mount_carousel(b.clone());

    let id_of = |el: &HtmlElement| el.first_element_child().unwrap().id();
    assert!(!id_of(&a).is_empty());
    assert_ne!(id_of(&a), id_of(&b));

    first.destroy();
    second.destroy();
    assert_eq!(id_of(&a), "");
    assert_eq!(id_of(&b), "");
    assert!(a.query_selector("#kept").unwrap().is_some());

    a.remove();
    b.remove();
}

#[wasm_bindgen_test(async)]
async fn destroyed_reveal_leaves_pending_blocks_alone() {
    let container = host(r#"<div class="reveal-destroy-block"><p data-reveal-line>a</p></div>"#);
    let json = r#"{"selector": ".reveal-destroy-block"}"#;

    let mut reveal = mount_reveal(Some(json.to_string()));
    reveal.destroy();
    sleep(100).await;

    let block = container.first_element_child().unwrap();
    let line: HtmlElement = block.first_element_child().unwrap().dyn_into().unwrap();
    assert!(!block.class_list().contains("is-in"));
    assert_eq!(reveal.revealed_count(), 0);
    assert_eq!(line.style().get_property_value("opacity").unwrap(), "");

    container.remove();
}

#[wasm_bindgen_test(async)]
async fn orbs_spawn_for_the_viewport_and_clean_up() {
    let container = host(r#"<div data-orbs-layer></div><h1>copy</h1>"#);
    container.set_attribute("data-orbs-desktop", "5").unwrap();
    container.set_attribute("data-orbs-mobile", "3").unwrap();
    container.set_attribute("data-orbs-seed", "11").unwrap();
    let window = web_sys::window().unwrap();
    let width = window.inner_width().unwrap().as_f64().unwrap();
    let reduced = window
        .match_media("(prefers-reduced-motion: reduce)")
        .unwrap()
        .map_or(false, |m| m.matches());
    let expected = if reduced { 0 } else if width >= 1100.0 { 5 } else { 3 };

    let mut orbs = mount_orbs(container.clone());
    let layer = container.query_selector("[data-orbs-layer]").unwrap().unwrap();
    assert_eq!(orbs.orb_count(), expected);
    assert_eq!(layer.child_element_count(), expected);
    sleep(100).await;
    assert_ne!(container.style().get_property_value("--mx").unwrap(), "");

    orbs.destroy();
    assert_eq!(orbs.orb_count(), 0);
    assert_eq!(layer.child_element_count(), 0);
    assert_eq!(container.style().get_property_value("--mx").unwrap(), "");
    assert_eq!(container.style().get_property_value("--intensity").unwrap(), "");
    container.remove();
}

#[wasm_bindgen_test(async)]
async fn stripe_click_toggles_pause_until_destroyed() {
    let container = host(
        r#"<div class="stripe" style="height:40px"></div><div class="stripe" style="height:40px"></div>"#,
    );
    let mut stripes = mount_stripes(container.clone());
    sleep(100).await;

    let first: HtmlElement = container.query_selector(".stripe").unwrap().unwrap().dyn_into().unwrap();
    let before = first.class_list().contains("paused");
    first.click();
    assert_eq!(first.class_list().contains("paused"), !before);
    first.click();
    assert_eq!(first.class_list().contains("paused"), before);
    first.click();

    stripes.destroy();
    assert_eq!(stripes.paused_count(), 0);
    assert!(container.query_selector(".paused").unwrap().is_none());
    first.click();
    assert!(!first.class_list().contains("paused"));
    container.remove();
}
