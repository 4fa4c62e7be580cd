//! Whole-loop behaviour of the hero simulation, driven by a fake clock.

use std::collections::HashSet;

use hero_wasm::config::HeroConfig;
use hero_wasm::palette::PRESETS;
use hero_wasm::scene::{advance, Motion, Phase, SceneState};

const FRAME: f32 = 1.0 / 60.0;

fn scene(shards: usize, seed: u64) -> SceneState {
    let config = HeroConfig {
        shard_count: shards,
        seed: Some(seed),
        ..HeroConfig::default()
    };
    SceneState::new(config, Motion::Animated)
}

#[test]
fn one_full_cycle_at_360_shards() {
    let mut state = scene(360, 2024);
    let timings = state.config().timings;
    let first_batch: HashSet<u64> = state.streaks().iter().map(|s| s.id).collect();
    assert_eq!(state.palette_index(), 0);

    let mut t = 0.0;
    let mut entered = Vec::new();
    while t < timings.cycle() + FRAME {
        entered.extend(state.step(FRAME));
        t += FRAME;
    }

    assert_eq!(
        entered,
        vec![Phase::GatherOutline, Phase::FillRing, Phase::Release, Phase::Drift]
    );
    assert_eq!(state.palette_index(), 1);
    assert_eq!(state.shard_count(), 360);
    assert_eq!(state.streaks().len(), first_batch.len());
    assert!(state.streaks().iter().all(|s| !first_batch.contains(&s.id)));
}

#[test]
fn palette_is_cycles_mod_presets() {
    let mut state = scene(64, 7);
    let cycle = state.config().timings.cycle();
    for k in 1..=10u64 {
        state = advance(state, cycle + 1e-3);
        assert_eq!(state.cycles(), k);
        assert_eq!(state.palette_index(), k as usize % PRESETS.len());
    }
}

#[test]
fn injected_huge_delta_keeps_order() {
    let mut state = scene(120, 11);
    let cycle = state.config().timings.cycle();
    let entered = state.step(cycle * 5.0 + 2.5);

    let expected: Vec<Phase> = [Phase::GatherOutline, Phase::FillRing, Phase::Release, Phase::Drift]
        .into_iter()
        .cycle()
        .take(entered.len())
        .collect();
    assert_eq!(entered, expected);
    assert_eq!(state.cycles(), 5);
    assert_eq!(state.phase(), Phase::GatherOutline);
}

#[test]
fn billion_second_step_returns() {
    let mut state = scene(8, 99);
    let entered = state.step(1.0e9);

    assert!(!entered.is_empty());
    assert!(entered.len() <= 36, "{} phases listed", entered.len());
    assert!(state.cycles() > 100_000_000);
    assert_eq!(state.palette_index(), (state.cycles() % PRESETS.len() as u64) as usize);

    // the scene keeps running normally afterwards
    let cycles = state.cycles();
    let cycle = state.config().timings.cycle();
    state.step(cycle + 1e-2);
    assert_eq!(state.cycles(), cycles + 1);
}

#[test]
fn rings_and_pool_hold_over_many_frames() {
    let mut state = scene(361, 3);
    for _ in 0..3_000 {
        state.step(FRAME * 2.0);
        let rings = state.rings();
        assert_eq!(rings.outline.len() + rings.fill.len(), 361);
        assert_eq!(state.instances().len(), 361);
    }
}

#[test]
fn reduced_motion_scene_never_moves() {
    let config = HeroConfig {
        seed: Some(5),
        ..HeroConfig::default()
    };
    let mut state = SceneState::new(config, Motion::Still);
    let shards = state.shards().to_vec();
    let instances = state.instances().to_vec();
    for _ in 0..1_000 {
        state.step(FRAME);
    }
    assert_eq!(state.shards(), &shards[..]);
    assert_eq!(state.instances(), &instances[..]);
    assert_eq!(state.palette_index(), 0);
}

#[test]
fn separate_scenes_do_not_share_palette() {
    let cycle = HeroConfig::default().timings.cycle();
    let a = advance(scene(16, 1), cycle + 0.1);
    let b = scene(16, 1);
    assert_eq!(a.palette_index(), 1);
    assert_eq!(b.palette_index(), 0);
}
