//! Per-frame simulation pipeline
//!
//! Runs every subsystem once, in a fixed order. Each pass compacts the enemy
//! list before the next one reads it, and the frame stops as soon as the
//! player dies.

use glam::Vec2;

use super::combat::{auto_fire, trigger_earthquake, update_enemies, update_player, update_projectiles};
use super::events::{
    run_scheduler, update_bombs, update_drop_pods, update_explosions, update_hazards, update_pickups,
};
use super::state::{GamePhase, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent, each axis in [-1, 1]
    pub movement: Vec2,
    /// Pause toggle
    pub pause: bool,
    /// Wall-clock seconds used by every cooldown gate
    pub now: f64,
}

/// Negative or non-finite deltas become 0
fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        log::warn!("Clamping invalid frame delta {dt} to 0");
        0.0
    }
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    let dt = sanitize_dt(dt);
    let now = input.now;
    state.elapsed += dt as f64;

    update_player(state, input.movement, dt);
    auto_fire(state, now);
    trigger_earthquake(state, now);

    update_projectiles(state, dt);
    if state.is_game_over() {
        return;
    }
    update_enemies(state, dt, now);
    if state.is_game_over() {
        return;
    }

    update_drop_pods(state, dt);
    update_hazards(state, dt);
    if state.is_game_over() {
        return;
    }
    update_bombs(state, dt);
    if state.is_game_over() {
        return;
    }
    update_explosions(state, dt);
    update_pickups(state, dt);

    run_scheduler(state, now);
}
