use glam::Vec3;
use hero_wasm::scene::{Camera, RingTargets};
use hero_wasm::rng::Rng;

fn to_pixels(ndc: Vec3, res: (f64, f64)) -> (f64, f64) {
    let (w, h) = res;
    ((ndc.x as f64 + 1.0) * 0.5 * w, (ndc.y as f64 + 1.0) * 0.5 * h)
}

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

#[test]
fn ring_stays_round_at_any_aspect() {
    let radius = RingTargets::generate(360, 1.0, &mut Rng::new(1)).radius;

    for res in [(1920.0, 1080.0), (1080.0, 1920.0), (800.0, 800.0), (390.0, 844.0)] {
        let camera = Camera::new(res.0, res.1);
        let vp = camera.view_projection();
        let c = to_pixels(vp.project_point3(Vec3::ZERO), res);
        let px = to_pixels(vp.project_point3(Vec3::new(radius, 0.0, 0.0)), res);
        let py = to_pixels(vp.project_point3(Vec3::new(0.0, radius, 0.0)), res);

        let rx = (px.0 - c.0).abs();
        let ry = (py.1 - c.1).abs();
        assert!(approx_eq(rx / ry, 1.0, 1e-4), "res={res:?} rx={rx} ry={ry}");
    }
}

#[test]
fn vertical_extent_ignores_width() {
    // The fov is vertical, so the ring covers the same share of the height
    // however wide the container gets.
    let share = |res: (f64, f64)| {
        let vp = Camera::new(res.0, res.1).view_projection();
        let top = vp.project_point3(Vec3::new(0.0, 1.1, 0.0));
        top.y as f64
    };
    let narrow = share((600.0, 900.0));
    let wide = share((2400.0, 900.0));
    assert!(approx_eq(narrow, wide, 1e-6), "narrow={narrow} wide={wide}");
}

#[test]
fn resize_keeps_last_good_aspect() {
    let mut camera = Camera::new(1280.0, 720.0);
    let before = camera.view_projection();
    camera.set_viewport(1280.0, 0.0);
    assert_eq!(camera.view_projection(), before);
    camera.set_viewport(720.0, 1280.0);
    assert_ne!(camera.view_projection(), before);
}
