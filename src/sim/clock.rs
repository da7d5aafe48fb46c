//! Frame driver: turns a monotonic time source into per-frame ticks
//!
//! Two clocks are in play. `dt` (frame delta, optionally time-scaled) drives
//! motion and damage over time; the raw wall-clock reading is stamped into
//! `TickInput::now` for cooldown gates and is never scaled.

use std::time::Instant;

use glam::Vec2;

use super::enemy::EnemyKind;
use super::progression::{PurchaseError, ShopUpgrade};
use super::state::{GameEvent, GameState};
use super::tick::{TickInput, tick};
use crate::consts::MAX_FRAME_DT;

/// Monotonic seconds
pub trait TimeSource {
    fn now_secs(&self) -> f64;
}

/// Real time since construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Hand-advanced clock for tests and headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { now: start }
    }

    /// Move time forward. Negative or non-finite steps are ignored.
    pub fn advance(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.now += secs;
        }
    }
}

impl TimeSource for ManualClock {
    fn now_secs(&self) -> f64 {
        self.now
    }
}

/// Successive timestamps to a bounded frame delta
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    /// Delta since the previous call (0 on the first frame), clamped to
    /// `[0, MAX_FRAME_DT]`
    pub fn delta(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => now - last,
            None => 0.0,
        };
        if now.is_finite() {
            self.last = Some(now);
        }
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        (dt as f32).min(MAX_FRAME_DT)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Owns a run and drives it from a time source
#[derive(Debug)]
pub struct Simulation<C: TimeSource> {
    state: GameState,
    clock: C,
    frames: FrameClock,
    time_scale: f32,
    pause_requested: bool,
}

impl<C: TimeSource> Simulation<C> {
    pub fn new(state: GameState, clock: C) -> Self {
        Self {
            state,
            clock,
            frames: FrameClock::default(),
            time_scale: 1.0,
            pause_requested: false,
        }
    }

    /// Run one frame with the given movement intent
    pub fn frame(&mut self, movement: Vec2) {
        let now = self.clock.now_secs();
        let dt = (self.frames.delta(now) * self.time_scale).min(MAX_FRAME_DT);
        let input = TickInput {
            movement,
            pause: std::mem::take(&mut self.pause_requested),
            now,
        };
        tick(&mut self.state, &input, dt);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Scale simulated motion. Cooldowns keep following the wall clock, and
    /// the scaled delta is still capped at `MAX_FRAME_DT`.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }

    /// Toggle pause on the next frame
    pub fn toggle_pause(&mut self) {
        self.pause_requested = !self.pause_requested;
    }

    pub fn purchase_upgrade(&mut self, upgrade: ShopUpgrade) -> Result<(), PurchaseError> {
        self.state.purchase_upgrade(upgrade)
    }

    pub fn set_enemy_priority_order(&mut self, order: Vec<EnemyKind>) {
        self.state.set_enemy_priority_order(order);
    }

    pub fn set_priority_targeting_enabled(&mut self, enabled: bool) {
        self.state.set_priority_targeting_enabled(enabled);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Start over; the next frame has zero delta
    pub fn restart(&mut self) {
        self.state.restart();
        self.frames.reset();
        self.pause_requested = false;
    }
}
