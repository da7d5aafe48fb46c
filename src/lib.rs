//! Arena Survivor - a top-down survival arena simulation
//!
//! Core modules:
//! - `sim`: Simulation core (entities, combat, progression, events, clock)
//! - `tuning`: Data-driven spawn and event balance

pub mod sim;
pub mod tuning;

pub use tuning::{EventRule, EventTable, SpawnTuning, Tuning, TuningError};

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the driver will hand to the simulation
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_MOVE_SPEED: f32 = 300.0;
    pub const PLAYER_ATTACK_SPEED: f32 = 1.0;
    pub const PLAYER_PROJECTILE_SPEED: f32 = 500.0;
    pub const PLAYER_DAMAGE: f32 = 10.0;
    pub const PLAYER_PROJECTILE_RADIUS: f32 = 5.0;
    /// Earthquake cooldown before any shop upgrade (seconds). Starts at 5 s
    /// rather than 0 so a freshly bought earthquake does not fire every frame.
    pub const PLAYER_EARTHQUAKE_COOLDOWN: f32 = 5.0;
    pub const MIN_EARTHQUAKE_COOLDOWN: f32 = 0.5;

    /// Player projectiles
    pub const PROJECTILE_LIFETIME: f32 = 8.0;
    /// Angle between neighbouring multishot projectiles (radians)
    pub const MULTISHOT_SPREAD: f32 = 0.3;

    /// Sniper shots
    pub const SNIPER_RANGE: f32 = 800.0;
    pub const SNIPER_COOLDOWN: f32 = 2.5;
    pub const SNIPER_PROJECTILE_SPEED: f32 = 300.0;
    pub const SNIPER_PROJECTILE_RADIUS: f32 = 4.0;
    pub const SNIPER_PROJECTILE_LIFETIME: f32 = 5.0;

    /// Assassin burst
    pub const ASSASSIN_BLAST_RADIUS: f32 = 120.0;
    pub const ASSASSIN_BLAST_FRACTION: f32 = 0.8;

    /// Blackhole pull falloff offset (keeps the pull finite at zero distance)
    pub const BLACKHOLE_PULL_OFFSET: f32 = 20.0;

    /// Drop pods
    pub const POD_IMPACT_DELAY: f32 = 0.25;
    pub const POD_DISPLAY_WINDOW: f32 = 1.2;
    pub const POD_ENEMY_COUNT: usize = 4;

    /// Bombs
    pub const BOMB_RADIUS: f32 = 6.0;
    pub const BOMB_DRAG: f32 = 0.6;
    pub const BOMB_PLAYER_DAMAGE_FRACTION: f32 = 0.6;
    pub const EXPLOSION_DURATION: f32 = 0.6;

    /// Health pickups
    pub const PICKUP_RADIUS: f32 = 10.0;
    pub const PICKUP_DURATION: f32 = 12.0;

    /// Hazards hurt the player at this fraction of their enemy rate
    pub const HAZARD_PLAYER_FRACTION: f32 = 0.5;

    /// Experience curve
    pub const XP_BASE_REQUIREMENT: f32 = 25.0;
    pub const XP_GROWTH: f32 = 1.05;

    /// Slow-zone strength never exceeds this
    pub const MAX_SLOW_ZONE_PERCENT: f32 = 0.95;
}

/// Unit vector pointing along `angle` (radians)
#[inline]
pub fn dir_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Random point `min_distance + [0, spread)` away from `center` in a random direction
pub fn random_offset<R: Rng + ?Sized>(rng: &mut R, center: Vec2, min_distance: f32, spread: f32) -> Vec2 {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    let distance = min_distance + rng.random::<f32>() * spread;
    center + dir_from_angle(angle) * distance
}
