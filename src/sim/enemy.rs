//! Enemy factory
//!
//! Enemy kinds are a closed enum; each kind maps to a stat table of
//! `base + per_level * level` lines, looked up once at spawn time.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Enemy, GameState};
use crate::consts::SNIPER_COOLDOWN;
use crate::{dir_from_angle, random_offset};

/// Enemy type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnemyKind {
    Normal,
    FastSmall,
    ImmuneSlow,
    Tank,
    Assassin,
    Sniper,
    /// Averaged composite of 2-3 base kinds
    #[serde(rename = "random")]
    Hybrid,
    Blackhole,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 8] = [
        EnemyKind::Normal,
        EnemyKind::FastSmall,
        EnemyKind::ImmuneSlow,
        EnemyKind::Tank,
        EnemyKind::Assassin,
        EnemyKind::Sniper,
        EnemyKind::Hybrid,
        EnemyKind::Blackhole,
    ];

    /// Targeting order a new run starts with
    pub const DEFAULT_PRIORITY: [EnemyKind; 8] = [
        EnemyKind::Assassin,
        EnemyKind::Sniper,
        EnemyKind::Tank,
        EnemyKind::Hybrid,
        EnemyKind::Blackhole,
        EnemyKind::Normal,
        EnemyKind::FastSmall,
        EnemyKind::ImmuneSlow,
    ];

    pub fn as_token(&self) -> &'static str {
        match self {
            EnemyKind::Normal => "normal",
            EnemyKind::FastSmall => "fastSmall",
            EnemyKind::ImmuneSlow => "immuneSlow",
            EnemyKind::Tank => "tank",
            EnemyKind::Assassin => "assassin",
            EnemyKind::Sniper => "sniper",
            EnemyKind::Hybrid => "random",
            EnemyKind::Blackhole => "blackhole",
        }
    }

    pub fn from_token(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_token() == s)
    }

    /// Stat table for the fixed (non-hybrid) kinds. `Hybrid` reports the
    /// `Normal` table; hybrids are composed by `hybrid_template`.
    fn stat_table(self) -> StatTable {
        match self {
            EnemyKind::Normal | EnemyKind::Hybrid => StatTable {
                radius: 12.0,
                health: (20.0, 3.0),
                speed: (50.0, 4.0),
                damage: (8.0, 1.0),
                gold: (20.0, 3.0),
                pull: (0.0, 0.0),
                immune_to_slow: false,
            },
            EnemyKind::FastSmall => StatTable {
                radius: 8.0,
                health: (12.0, 2.0),
                speed: (120.0, 6.0),
                damage: (6.0, 1.0),
                gold: (12.0, 2.0),
                pull: (0.0, 0.0),
                immune_to_slow: false,
            },
            EnemyKind::ImmuneSlow => StatTable {
                radius: 14.0,
                health: (30.0, 4.0),
                speed: (55.0, 3.0),
                damage: (10.0, 1.2),
                gold: (25.0, 4.0),
                pull: (0.0, 0.0),
                immune_to_slow: true,
            },
            EnemyKind::Tank => StatTable {
                radius: 22.0,
                health: (80.0, 12.0),
                speed: (18.0, 1.2),
                damage: (20.0, 2.0),
                gold: (60.0, 8.0),
                pull: (0.0, 0.0),
                immune_to_slow: false,
            },
            EnemyKind::Assassin => StatTable {
                radius: 9.0,
                health: (18.0, 3.0),
                speed: (220.0, 10.0),
                damage: (60.0, 8.0),
                gold: (80.0, 12.0),
                pull: (0.0, 0.0),
                immune_to_slow: false,
            },
            EnemyKind::Sniper => StatTable {
                radius: 11.0,
                health: (35.0, 5.0),
                speed: (45.0, 2.0),
                damage: (25.0, 4.0),
                gold: (50.0, 6.0),
                pull: (0.0, 0.0),
                immune_to_slow: false,
            },
            // Stationary, no contact damage, pulls the player instead
            EnemyKind::Blackhole => StatTable {
                radius: 28.0,
                health: (200.0, 40.0),
                speed: (0.0, 0.0),
                damage: (0.0, 0.0),
                gold: (120.0, 20.0),
                pull: (35.0, 3.0),
                immune_to_slow: true,
            },
        }
    }

    /// Concrete stats for this kind at `level`
    pub fn template(self, level: u32) -> StatTemplate {
        self.stat_table().at(level)
    }
}

/// Kinds a hybrid may borrow from
pub const HYBRID_SOURCES: [EnemyKind; 6] = [
    EnemyKind::Normal,
    EnemyKind::FastSmall,
    EnemyKind::ImmuneSlow,
    EnemyKind::Tank,
    EnemyKind::Assassin,
    EnemyKind::Sniper,
];

/// Cumulative spawn weights; anything past the last bound is a sniper
const SPAWN_TABLE: [(EnemyKind, f32); 7] = [
    (EnemyKind::Normal, 0.55),
    (EnemyKind::FastSmall, 0.70),
    (EnemyKind::ImmuneSlow, 0.82),
    (EnemyKind::Tank, 0.90),
    (EnemyKind::Hybrid, 0.95),
    (EnemyKind::Blackhole, 0.97),
    (EnemyKind::Assassin, 0.99),
];

/// Roll shift per level toward the tougher end of the table, and its cap
const LEVEL_BIAS_PER_LEVEL: f32 = 0.005;
const MAX_LEVEL_BIAS: f32 = 0.2;

#[derive(Debug, Clone, Copy)]
struct StatTable {
    radius: f32,
    health: (f32, f32),
    speed: (f32, f32),
    damage: (f32, f32),
    gold: (f32, f32),
    pull: (f32, f32),
    immune_to_slow: bool,
}

impl StatTable {
    fn at(&self, level: u32) -> StatTemplate {
        let l = level as f32;
        let line = |(base, per_level): (f32, f32)| (base + per_level * l).floor();
        StatTemplate {
            radius: self.radius,
            health: line(self.health),
            speed: line(self.speed),
            damage: line(self.damage),
            gold: line(self.gold) as u32,
            pull_strength: line(self.pull),
            immune_to_slow: self.immune_to_slow,
        }
    }
}

/// Resolved enemy stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatTemplate {
    pub radius: f32,
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
    pub gold: u32,
    pub pull_strength: f32,
    pub immune_to_slow: bool,
}

/// Pick a kind for a random spawn at `level`
pub fn roll_enemy_kind<R: Rng + ?Sized>(rng: &mut R, level: u32) -> EnemyKind {
    let bias = (level as f32 * LEVEL_BIAS_PER_LEVEL).min(MAX_LEVEL_BIAS);
    let r = rng.random::<f32>() + bias;
    SPAWN_TABLE
        .iter()
        .find(|(_, bound)| r < *bound)
        .map(|(kind, _)| *kind)
        .unwrap_or(EnemyKind::Sniper)
}

/// Average 2-3 randomly chosen base templates (floored, with per-stat floors)
pub fn hybrid_template<R: Rng + ?Sized>(rng: &mut R, level: u32) -> StatTemplate {
    let picks = rng.random_range(2..=3);
    let mut radius = 0.0;
    let mut health = 0.0;
    let mut speed = 0.0;
    let mut damage = 0.0;
    let mut gold = 0u32;
    let mut immune = false;

    for _ in 0..picks {
        let source = HYBRID_SOURCES[rng.random_range(0..HYBRID_SOURCES.len())];
        let t = source.template(level);
        radius += t.radius;
        health += t.health;
        speed += t.speed;
        damage += t.damage;
        gold += t.gold;
        immune |= t.immune_to_slow;
    }

    let n = picks as f32;
    StatTemplate {
        radius: (radius / n).floor().max(6.0),
        health: (health / n).floor().max(8.0),
        speed: (speed / n).floor().max(12.0),
        damage: (damage / n).floor().max(2.0),
        gold: (gold / picks).max(8),
        pull_strength: 0.0,
        immune_to_slow: immune,
    }
}

/// Build an enemy of `kind` at `pos`. Hybrids draw their composition from `rng`.
pub fn build_enemy<R: Rng + ?Sized>(
    id: u32,
    kind: EnemyKind,
    pos: Vec2,
    level: u32,
    rng: &mut R,
) -> Enemy {
    let t = match kind {
        EnemyKind::Hybrid => hybrid_template(rng, level),
        _ => kind.template(level),
    };
    Enemy {
        id,
        kind,
        pos,
        vel: Vec2::ZERO,
        radius: t.radius,
        health: t.health,
        max_health: t.health,
        speed: t.speed,
        damage: t.damage,
        gold_value: t.gold,
        immune_to_slow: t.immune_to_slow,
        pull_strength: t.pull_strength,
        shoot_cooldown: if kind == EnemyKind::Sniper { SNIPER_COOLDOWN } else { 0.0 },
        last_shot: None,
        despawned: false,
    }
}

impl GameState {
    /// Spawn an enemy of `kind` at a fixed position; returns its id
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let enemy = build_enemy(id, kind, pos, self.progression.level, &mut self.rng);
        self.enemies.push(enemy);
        self.total_enemies_spawned += 1;
        id
    }

    /// Spawn a randomly typed enemy in the spawn band around the player
    pub fn spawn_random_enemy(&mut self) -> u32 {
        let spawn = &self.tuning.spawn;
        let (distance, spread) = (spawn.spawn_distance, spawn.spawn_spread);
        let pos = random_offset(&mut self.rng, self.player.pos, distance, spread);
        let kind = roll_enemy_kind(&mut self.rng, self.progression.level);
        self.spawn_enemy_at(kind, pos)
    }

    /// Spawn `count` enemies of `kind` in a loose ring around `center`
    pub fn spawn_enemy_ring(&mut self, kind: EnemyKind, center: Vec2, count: usize) {
        for k in 0..count {
            let jitter = (self.rng.random::<f32>() - 0.5) * 0.4;
            let angle = std::f32::consts::TAU * (k as f32 / count as f32) + jitter;
            let dist = 20.0 + self.rng.random::<f32>() * 30.0;
            self.spawn_enemy_at(kind, center + dir_from_angle(angle) * dist);
        }
    }

    pub(crate) fn spawn_initial_wave(&mut self) {
        let count = self.tuning.spawn.initial_wave_size;
        for _ in 0..count {
            self.spawn_random_enemy();
        }
        log::debug!("Wave {}: spawned {} enemies", self.wave, count);
    }
}
