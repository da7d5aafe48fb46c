//! Game state and core simulation types
//!
//! Plain data records for every live entity plus the player and progression
//! singletons. Behavior lives in the sibling modules, which all mutate a
//! `GameState` directly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::events::EventTimers;
use super::progression::{LevelUpgrade, ShopUpgrade, xp_requirement};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen by the player; ticks are no-ops
    Paused,
    /// Player health reached zero. Terminal until `restart`.
    GameOver,
}

/// The player unit and its upgradeable combat stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    /// Movement speed (units/s)
    pub speed: f32,
    /// Shots per second
    pub attack_speed: f32,
    /// Derived: `1 / attack_speed`
    pub shoot_cooldown: f32,
    pub projectile_speed: f32,
    pub damage: f32,
    pub projectile_radius: f32,
    /// Extra enemies a projectile may pass through
    pub piercing: u32,
    /// Projectiles per shot
    pub multishot: u32,
    pub slow_zone_radius: f32,
    /// Fraction of speed removed inside the slow zone (0-1)
    pub slow_zone_percent: f32,
    /// Earthquake is inactive while this is 0
    pub earthquake_range: f32,
    pub earthquake_cooldown: f32,
    pub earthquake_strength: f32,
    /// Wall-clock second of the last shot (None = never fired)
    pub last_shot: Option<f64>,
    /// Wall-clock second of the last earthquake
    pub last_earthquake: Option<f64>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            speed: PLAYER_MOVE_SPEED,
            attack_speed: PLAYER_ATTACK_SPEED,
            shoot_cooldown: 1.0 / PLAYER_ATTACK_SPEED,
            projectile_speed: PLAYER_PROJECTILE_SPEED,
            damage: PLAYER_DAMAGE,
            projectile_radius: PLAYER_PROJECTILE_RADIUS,
            piercing: 0,
            multishot: 1,
            slow_zone_radius: 0.0,
            slow_zone_percent: 0.0,
            earthquake_range: 0.0,
            earthquake_cooldown: PLAYER_EARTHQUAKE_COOLDOWN,
            earthquake_strength: 0.0,
            last_shot: None,
            last_earthquake: None,
        }
    }
}

impl Player {
    /// Subtract health, clamped at zero. Returns true if the player is now dead.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if amount > 0.0 {
            self.health = (self.health - amount).max(0.0);
        }
        self.health <= 0.0
    }

    /// Add health, clamped to `max_health`
    pub fn heal(&mut self, amount: f32) {
        if amount > 0.0 {
            self.health = (self.health + amount).min(self.max_health);
        }
    }
}

/// A hostile unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    /// Contact damage (per second for chip damage, single burst for assassins,
    /// per shot for snipers)
    pub damage: f32,
    pub gold_value: u32,
    pub immune_to_slow: bool,
    /// Blackhole only
    pub pull_strength: f32,
    /// Sniper only (seconds between shots, 0 otherwise)
    pub shoot_cooldown: f32,
    pub last_shot: Option<f64>,
    /// Removed without reward (culled or self-destructed)
    #[serde(default)]
    pub despawned: bool,
}

impl Enemy {
    /// Still participating in the simulation
    pub fn is_active(&self) -> bool {
        self.health > 0.0 && !self.despawned
    }

    /// Apply damage, clamped at zero. Returns true only for the hit that kills,
    /// so a kill is never rewarded twice.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if !self.is_active() || amount <= 0.0 {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.health <= 0.0
    }

    pub fn kill_record(&self) -> KillRecord {
        KillRecord {
            kind: self.kind,
            gold: self.gold_value,
            max_health: self.max_health,
            damage: self.damage,
        }
    }
}

/// Stats captured from an enemy at the moment it died
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KillRecord {
    pub kind: EnemyKind,
    pub gold: u32,
    pub max_health: f32,
    pub damage: f32,
}

/// A projectile (player-owned seeks enemies, enemy-owned seeks the player)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Seconds left before expiry
    pub lifetime: f32,
    pub pierce_count: u32,
    pub max_pierce: u32,
    /// Enemy ids already damaged by this projectile
    #[serde(default)]
    pub hit_enemies: Vec<u32>,
    pub enemy_owned: bool,
}

/// Hazard zone flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Fire,
    Gas,
}

/// A damage-over-time zone left by a fireball or gas pod
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub kind: HazardKind,
    pub pos: Vec2,
    pub radius: f32,
    pub damage_per_second: f32,
    /// Gas only (0 for fire)
    pub slow_percent: f32,
    pub timer: f32,
    pub duration: f32,
}

/// Drop pod lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodState {
    Falling,
    Impact,
}

/// What a drop pod materializes on impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPayload {
    /// A ring of enemies of this kind (`Hybrid` composes a new hybrid each time)
    Enemies(EnemyKind),
    Fireball,
    Gas,
    BombPod,
    HealthPod,
}

/// A falling pod
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropPod {
    pub pos: Vec2,
    pub fall_height: f32,
    pub fall_speed: f32,
    pub state: PodState,
    pub payload: PodPayload,
    pub spawned: bool,
    pub impact_timer: f32,
}

/// A thrown bomb in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub pos: Vec2,
    pub vel: Vec2,
    pub flight_time: f32,
    pub radius: f32,
}

/// A decaying explosion record (damage already applied)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub timer: f32,
    pub duration: f32,
}

/// A health pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub amount: f32,
    pub radius: f32,
    pub timer: f32,
    pub duration: f32,
}

/// Level, experience, gold and targeting preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub xp: u32,
    pub xp_required: u32,
    pub gold: u32,
    /// Highest priority first
    pub priority: Vec<EnemyKind>,
    pub priority_enabled: bool,
    /// Added to every new player projectile's lifetime
    pub projectile_lifetime_bonus: f32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            xp_required: xp_requirement(1),
            gold: 0,
            priority: EnemyKind::DEFAULT_PRIORITY.to_vec(),
            priority_enabled: true,
            projectile_lifetime_bonus: 0.0,
        }
    }
}

/// Notifications for the UI layer, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyKilled { kind: EnemyKind, gold: u32, xp: u32 },
    LevelUp { level: u32, upgrade: LevelUpgrade },
    UpgradePurchased { upgrade: ShopUpgrade, cost: u32 },
    PodLanded { payload: PodPayload },
    GameOver { level: u32, gold: u32 },
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed
    pub seed: u64,
    /// Uniform random source for every draw the simulation makes
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub tuning: Tuning,
    pub player: Player,
    pub progression: Progression,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub hazards: Vec<Hazard>,
    pub drop_pods: Vec<DropPod>,
    pub bombs: Vec<Bomb>,
    pub explosions: Vec<Explosion>,
    pub pickups: Vec<Pickup>,
    /// Enemy chosen by auto-aim this frame
    pub current_target: Option<u32>,
    /// Wall-clock gates for continuous spawning and pod events
    pub timers: EventTimers,
    /// Display-only wave counter
    pub wave: u32,
    pub total_enemies_spawned: u64,
    /// Simulated seconds (sum of dt)
    pub elapsed: f64,
    /// Outbox for the UI
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Kills awaiting reward settlement
    #[serde(skip)]
    pub(crate) pending_kills: Vec<KillRecord>,
    next_id: u32,
}

impl GameState {
    /// Create a new run with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new run with a custom balance table
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            tuning,
            player: Player::default(),
            progression: Progression::default(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            hazards: Vec::new(),
            drop_pods: Vec::new(),
            bombs: Vec::new(),
            explosions: Vec::new(),
            pickups: Vec::new(),
            current_target: None,
            timers: EventTimers::default(),
            wave: 1,
            total_enemies_spawned: 0,
            elapsed: 0.0,
            events: Vec::new(),
            pending_kills: Vec::new(),
            next_id: 1,
        };
        log::info!("New run (seed {seed})");
        state.spawn_initial_wave();
        state
    }

    /// Reset every gameplay value to its initial state. Every entity
    /// collection is left empty; enemies arrive through continuous spawning.
    ///
    /// Targeting preferences, tuning and the RNG stream carry over.
    pub fn restart(&mut self) {
        let priority = std::mem::take(&mut self.progression.priority);
        let priority_enabled = self.progression.priority_enabled;

        self.phase = GamePhase::Playing;
        self.player = Player::default();
        self.progression = Progression {
            priority,
            priority_enabled,
            ..Progression::default()
        };
        self.enemies.clear();
        self.projectiles.clear();
        self.hazards.clear();
        self.drop_pods.clear();
        self.bombs.clear();
        self.explosions.clear();
        self.pickups.clear();
        self.current_target = None;
        self.timers = EventTimers::default();
        self.wave = 1;
        self.total_enemies_spawned = 0;
        self.elapsed = 0.0;
        self.events.clear();
        self.pending_kills.clear();

        log::info!("Run restarted");
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take all pending UI notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Damage the player and enter Game Over if this was lethal
    pub fn damage_player(&mut self, amount: f32) {
        if self.player.take_damage(amount) {
            self.enter_game_over();
        }
    }

    pub(crate) fn enter_game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        log::info!(
            "Game over at level {} with {} gold",
            self.progression.level,
            self.progression.gold
        );
        self.events.push(GameEvent::GameOver {
            level: self.progression.level,
            gold: self.progression.gold,
        });
    }

    /// Look up a live enemy by id
    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id && e.is_active())
    }

    /// Replace the targeting priority order (highest first). Duplicates are kept.
    pub fn set_enemy_priority_order(&mut self, order: Vec<EnemyKind>) {
        self.progression.priority = order;
    }

    /// Priority order from type tokens; unknown tokens are dropped
    pub fn set_enemy_priority_tokens(&mut self, tokens: &[&str]) {
        let order = tokens
            .iter()
            .filter_map(|t| {
                let kind = EnemyKind::from_token(t);
                if kind.is_none() {
                    log::warn!("Ignoring unknown enemy type `{t}` in priority list");
                }
                kind
            })
            .collect();
        self.set_enemy_priority_order(order);
    }

    pub fn set_priority_targeting_enabled(&mut self, enabled: bool) {
        self.progression.priority_enabled = enabled;
    }

    /// Drop enemies that died or de-spawned
    pub(crate) fn compact_enemies(&mut self) {
        self.enemies.retain(Enemy::is_active);
    }
}

#[cfg(test)]
pub(crate) fn quiet_state(seed: u64) -> GameState {
    use crate::tuning::SpawnTuning;
    let tuning = Tuning {
        spawn: SpawnTuning {
            initial_wave_size: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    GameState::with_tuning(seed, tuning)
}
