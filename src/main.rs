//! Arena Survivor headless runner
//!
//! Drives a run on a manual clock at 60 Hz with a circle-strafing player and
//! an auto-buying shop, then prints a JSON summary of the run.
//!
//! Usage: `arena-survivor [seed] [seconds] [tuning.json]`

use std::error::Error;

use arena_survivor::Tuning;
use arena_survivor::sim::{GameEvent, GameState, ManualClock, ShopUpgrade, Simulation, TimeSource};
use glam::Vec2;
use serde::Serialize;

const FRAME_SECS: f64 = 1.0 / 60.0;
const REPORT_EVERY_SECS: f64 = 10.0;

/// End-of-run report
#[derive(Debug, Default, Serialize)]
struct RunSummary {
    seed: u64,
    seconds: f64,
    game_over: bool,
    level: u32,
    gold: u32,
    health: f32,
    kills: u32,
    enemies_spawned: u64,
    pods_landed: u32,
    upgrades_bought: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = match args.next() {
        Some(s) => s.parse()?,
        None => 42,
    };
    let seconds: f64 = match args.next() {
        Some(s) => s.parse()?,
        None => 120.0,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(&path)?)?,
        None => Tuning::default(),
    };

    log::info!("Arena Survivor (headless) starting, seed {seed}, {seconds} s");
    let mut sim = Simulation::new(GameState::with_tuning(seed, tuning), ManualClock::default());
    let mut summary = RunSummary {
        seed,
        ..Default::default()
    };
    let mut next_report = REPORT_EVERY_SECS;
    let mut shop = ShopUpgrade::ALL.iter().cycle();
    let mut wanted = shop.next().copied();

    while sim.clock().now_secs() < seconds && !sim.state().is_game_over() {
        let t = sim.clock().now_secs() as f32;
        let movement = Vec2::new((t * 0.5).cos(), (t * 0.5).sin());
        sim.frame(movement);
        sim.clock_mut().advance(FRAME_SECS);

        if let Some(upgrade) = wanted
            && sim.state().progression.gold >= upgrade.cost()
            && sim.purchase_upgrade(upgrade).is_ok()
        {
            wanted = shop.next().copied();
        }

        for event in sim.drain_events() {
            match event {
                GameEvent::EnemyKilled { .. } => summary.kills += 1,
                GameEvent::PodLanded { .. } => summary.pods_landed += 1,
                GameEvent::UpgradePurchased { upgrade, cost } => {
                    summary.upgrades_bought += 1;
                    log::info!("Bought {upgrade:?} for {cost} gold");
                }
                GameEvent::LevelUp { .. } | GameEvent::GameOver { .. } => {}
            }
        }

        if sim.clock().now_secs() >= next_report {
            next_report += REPORT_EVERY_SECS;
            let state = sim.state();
            log::info!(
                "t={:.0}s level {} hp {:.0}/{:.0} gold {} enemies {} projectiles {}",
                sim.clock().now_secs(),
                state.progression.level,
                state.player.health,
                state.player.max_health,
                state.progression.gold,
                state.enemies.len(),
                state.projectiles.len()
            );
        }
    }

    let state = sim.state();
    summary.seconds = state.elapsed;
    summary.game_over = state.is_game_over();
    summary.level = state.progression.level;
    summary.gold = state.progression.gold;
    summary.health = state.player.health;
    summary.enemies_spawned = state.total_enemies_spawned;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
