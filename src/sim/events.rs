//! Time-gated events and the short-lived entities they produce
//!
//! Each event category has its own wall-clock gate. When the gate opens, one
//! chance roll is made and the gate resets whether or not the roll succeeded,
//! so spawn rate is bounded by the cooldown. Successful rolls drop a pod that
//! falls, lands, and materializes its payload once.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::within_radius;
use super::combat::damage_enemies_in_radius;
use super::enemy::EnemyKind;
use super::state::{
    Bomb, DropPod, Explosion, GameEvent, GameState, Hazard, HazardKind, Pickup, PodPayload, PodState,
};
use crate::consts::*;
use crate::tuning::{EventRule, EventTable};
use crate::{dir_from_angle, random_offset};

/// Enemy kinds an enemy drop pod may carry
const POD_ENEMY_POOL: [EnemyKind; 7] = [
    EnemyKind::Normal,
    EnemyKind::FastSmall,
    EnemyKind::ImmuneSlow,
    EnemyKind::Tank,
    EnemyKind::Assassin,
    EnemyKind::Sniper,
    EnemyKind::Hybrid,
];

/// Spawn-attempt categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    DropPod,
    BombPod,
    HealthPod,
    Fireball,
    Gas,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::DropPod,
        EventCategory::BombPod,
        EventCategory::HealthPod,
        EventCategory::Fireball,
        EventCategory::Gas,
    ];

    pub fn rule(self, table: &EventTable) -> EventRule {
        match self {
            EventCategory::DropPod => table.drop_pod,
            EventCategory::BombPod => table.bomb_pod,
            EventCategory::HealthPod => table.health_pod,
            EventCategory::Fireball => table.fireball,
            EventCategory::Gas => table.gas,
        }
    }
}

/// Wall-clock second of the last attempt per gate (None = not yet armed)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTimers {
    pub last_spawn: Option<f64>,
    pub drop_pod: Option<f64>,
    pub bomb_pod: Option<f64>,
    pub health_pod: Option<f64>,
    pub fireball: Option<f64>,
    pub gas: Option<f64>,
}

impl EventTimers {
    fn slot(&mut self, category: EventCategory) -> &mut Option<f64> {
        match category {
            EventCategory::DropPod => &mut self.drop_pod,
            EventCategory::BombPod => &mut self.bomb_pod,
            EventCategory::HealthPod => &mut self.health_pod,
            EventCategory::Fireball => &mut self.fireball,
            EventCategory::Gas => &mut self.gas,
        }
    }
}

/// Open the gate if `period` has passed since the last opening.
/// The first observation only arms the gate.
fn gate_open(last: &mut Option<f64>, period: f64, now: f64) -> bool {
    match *last {
        None => {
            *last = Some(now);
            false
        }
        Some(t) if now - t > period => {
            *last = Some(now);
            true
        }
        Some(_) => false,
    }
}

/// Continuous enemy spawning and every event category's spawn attempt
pub fn run_scheduler(state: &mut GameState, now: f64) {
    let interval = state.tuning.spawn.spawn_interval(state.progression.level);
    if gate_open(&mut state.timers.last_spawn, interval, now) {
        state.spawn_random_enemy();
    }

    for category in EventCategory::ALL {
        let rule = category.rule(&state.tuning.events);
        if !gate_open(state.timers.slot(category), rule.cooldown_secs, now) {
            continue;
        }
        if state.rng.random::<f32>() < rule.chance {
            schedule_pod(state, category);
        }
    }
}

/// Drop a pod for `category` somewhere around the player
pub fn schedule_pod(state: &mut GameState, category: EventCategory) {
    let rule = category.rule(&state.tuning.events);
    let payload = match category {
        EventCategory::DropPod => {
            PodPayload::Enemies(POD_ENEMY_POOL[state.rng.random_range(0..POD_ENEMY_POOL.len())])
        }
        EventCategory::BombPod => PodPayload::BombPod,
        EventCategory::HealthPod => PodPayload::HealthPod,
        EventCategory::Fireball => PodPayload::Fireball,
        EventCategory::Gas => PodPayload::Gas,
    };
    let pos = random_offset(&mut state.rng, state.player.pos, rule.min_distance, rule.distance_spread);
    let fall_speed = rule.min_fall_speed + state.rng.random::<f32>() * rule.fall_speed_spread;

    log::debug!("Pod {payload:?} inbound at ({:.0}, {:.0})", pos.x, pos.y);
    state.drop_pods.push(DropPod {
        pos,
        fall_height: rule.fall_height,
        fall_speed,
        state: PodState::Falling,
        payload,
        spawned: false,
        impact_timer: 0.0,
    });
}

/// Falling -> impact -> payload (once) -> removal
pub fn update_drop_pods(state: &mut GameState, dt: f32) {
    for i in 0..state.drop_pods.len() {
        let pod = &mut state.drop_pods[i];
        match pod.state {
            PodState::Falling => {
                pod.fall_height = (pod.fall_height - pod.fall_speed * dt).max(0.0);
                if pod.fall_height <= 0.0 {
                    pod.state = PodState::Impact;
                    pod.impact_timer = 0.0;
                }
            }
            PodState::Impact => {
                pod.impact_timer += dt;
                if !pod.spawned && pod.impact_timer >= POD_IMPACT_DELAY {
                    pod.spawned = true;
                    let (payload, pos) = (pod.payload, pod.pos);
                    materialize_payload(state, payload, pos);
                }
            }
        }
    }
    state
        .drop_pods
        .retain(|p| !(p.state == PodState::Impact && p.impact_timer > POD_DISPLAY_WINDOW));
}

fn materialize_payload(state: &mut GameState, payload: PodPayload, pos: Vec2) {
    let level = state.progression.level as f32;
    match payload {
        PodPayload::Enemies(kind) => state.spawn_enemy_ring(kind, pos, POD_ENEMY_COUNT),
        PodPayload::Fireball => {
            let duration = 5.0 + state.rng.random::<f32>() * 3.0;
            state.hazards.push(Hazard {
                kind: HazardKind::Fire,
                pos,
                radius: 80.0 + level * 6.0,
                damage_per_second: 18.0 + level * 2.0,
                slow_percent: 0.0,
                timer: 0.0,
                duration,
            });
        }
        PodPayload::Gas => {
            let duration = 6.0 + state.rng.random::<f32>() * 4.0;
            state.hazards.push(Hazard {
                kind: HazardKind::Gas,
                pos,
                radius: 100.0 + level * 8.0,
                damage_per_second: 8.0 + level,
                slow_percent: 0.35,
                timer: 0.0,
                duration,
            });
        }
        PodPayload::BombPod => {
            let count = state.rng.random_range(4..=7);
            for _ in 0..count {
                let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
                let speed = 140.0 + state.rng.random::<f32>() * 160.0;
                let flight_time = 0.6 + state.rng.random::<f32>() * 0.9;
                state.bombs.push(Bomb {
                    pos,
                    vel: dir_from_angle(angle) * speed,
                    flight_time,
                    radius: BOMB_RADIUS,
                });
            }
        }
        PodPayload::HealthPod => {
            state.pickups.push(Pickup {
                pos,
                amount: 25.0 + (level * 5.0).floor(),
                radius: PICKUP_RADIUS,
                timer: 0.0,
                duration: PICKUP_DURATION,
            });
        }
    }
    log::debug!("Pod {payload:?} landed");
    state.events.push(GameEvent::PodLanded { payload });
}

/// Damage-over-time zones
pub fn update_hazards(state: &mut GameState, dt: f32) {
    for i in 0..state.hazards.len() {
        let hazard = &mut state.hazards[i];
        hazard.timer += dt;
        let (pos, radius, dps) = (hazard.pos, hazard.radius, hazard.damage_per_second);

        damage_enemies_in_radius(state, pos, radius, dps * dt);
        if within_radius(pos, radius, state.player.pos) {
            state.player.take_damage(dps * HAZARD_PLAYER_FRACTION * dt);
        }
    }
    state.hazards.retain(|h| h.timer < h.duration);

    state.compact_enemies();
    state.settle_kills();
    if state.player.health <= 0.0 {
        state.enter_game_over();
    }
}

/// Fly bombs with drag; explode the ones whose flight time ran out
pub fn update_bombs(state: &mut GameState, dt: f32) {
    let mut landed = Vec::new();
    state.bombs.retain_mut(|bomb| {
        if bomb.flight_time > 0.0 {
            bomb.pos += bomb.vel * dt;
            bomb.vel *= (1.0 - dt * BOMB_DRAG).max(0.0);
            bomb.flight_time -= dt;
            if bomb.flight_time > 0.0 {
                return true;
            }
        }
        landed.push(bomb.pos);
        false
    });

    for pos in landed {
        explode_bomb(state, pos);
    }

    state.compact_enemies();
    state.settle_kills();
    if state.player.health <= 0.0 {
        state.enter_game_over();
    }
}

/// Area damage at `pos` plus a visual explosion record.
/// Kills are recorded but settled by the caller.
pub fn explode_bomb(state: &mut GameState, pos: Vec2) {
    let level = state.progression.level as f32;
    let radius = 60.0 + level * 6.0;
    let damage = 40.0 + level * 6.0;

    damage_enemies_in_radius(state, pos, radius, damage);
    if within_radius(pos, radius, state.player.pos) {
        state.player.take_damage(damage * BOMB_PLAYER_DAMAGE_FRACTION);
    }
    log::debug!("Bomb exploded at ({:.0}, {:.0})", pos.x, pos.y);
    state.explosions.push(Explosion {
        pos,
        radius,
        timer: 0.0,
        duration: EXPLOSION_DURATION,
    });
}

pub fn update_explosions(state: &mut GameState, dt: f32) {
    for explosion in state.explosions.iter_mut() {
        explosion.timer += dt;
    }
    state.explosions.retain(|e| e.timer < e.duration);
}

/// Heal on contact, otherwise expire
pub fn update_pickups(state: &mut GameState, dt: f32) {
    let GameState { pickups, player, .. } = state;
    pickups.retain_mut(|p| {
        p.timer += dt;
        if within_radius(p.pos, p.radius + player.radius, player.pos) {
            player.heal(p.amount);
            return false;
        }
        p.timer < p.duration
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GamePhase, quiet_state};
    use crate::tuning::Tuning;

    fn pod_at(payload: PodPayload, pos: Vec2) -> DropPod {
        DropPod {
            pos,
            fall_height: 10.0,
            fall_speed: 1000.0,
            state: PodState::Falling,
            payload,
            spawned: false,
            impact_timer: 0.0,
        }
    }

    fn only_drop_pods(chance: f32) -> GameState {
        let mut tuning = Tuning::default();
        tuning.spawn.initial_wave_size = 0;
        tuning.spawn.base_rate = 0.0;
        tuning.spawn.rate_per_level = 0.0;
        for rule in [
            &mut tuning.events.bomb_pod,
            &mut tuning.events.health_pod,
            &mut tuning.events.fireball,
            &mut tuning.events.gas,
        ] {
            rule.chance = 0.0;
        }
        tuning.events.drop_pod.chance = chance;
        GameState::with_tuning(4, tuning)
    }

    #[test]
    fn test_scheduler_arms_then_waits_full_cooldown() {
        let mut state = only_drop_pods(1.0);
        run_scheduler(&mut state, 0.0);
        assert!(state.drop_pods.is_empty());
        run_scheduler(&mut state, 9.0);
        assert!(state.drop_pods.is_empty());
        run_scheduler(&mut state, 10.5);
        assert_eq!(state.drop_pods.len(), 1);
        run_scheduler(&mut state, 11.0);
        assert_eq!(state.drop_pods.len(), 1);

        let pod = &state.drop_pods[0];
        assert_eq!(pod.state, PodState::Falling);
        assert_eq!(pod.fall_height, 600.0);
        assert!((700.0..1000.0).contains(&pod.fall_speed));
        let d = pod.pos.distance(state.player.pos);
        assert!((350.0 - 0.01..550.0 + 0.01).contains(&d));
        assert!(matches!(pod.payload, PodPayload::Enemies(k) if k != EnemyKind::Blackhole));
    }

    #[test]
    fn test_failed_roll_still_resets_gate() {
        let mut state = only_drop_pods(0.0);
        run_scheduler(&mut state, 0.0);
        run_scheduler(&mut state, 10.5);
        assert!(state.drop_pods.is_empty());
        assert_eq!(state.timers.drop_pod, Some(10.5));
        run_scheduler(&mut state, 15.0);
        assert_eq!(state.timers.drop_pod, Some(10.5));
    }

    #[test]
    fn test_continuous_spawn_interval() {
        let mut state = quiet_state(8);
        state.tuning.events = EventTable {
            drop_pod: EventRule { chance: 0.0, ..state.tuning.events.drop_pod },
            bomb_pod: EventRule { chance: 0.0, ..state.tuning.events.bomb_pod },
            health_pod: EventRule { chance: 0.0, ..state.tuning.events.health_pod },
            fireball: EventRule { chance: 0.0, ..state.tuning.events.fireball },
            gas: EventRule { chance: 0.0, ..state.tuning.events.gas },
        };
        // Level 1: 0.34 enemies/s
        run_scheduler(&mut state, 0.0);
        assert!(state.enemies.is_empty());
        run_scheduler(&mut state, 2.0);
        assert!(state.enemies.is_empty());
        run_scheduler(&mut state, 3.0);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_enemy_pod_spawns_ring_once() {
        let mut state = quiet_state(1);
        state.drop_pods.push(pod_at(PodPayload::Enemies(EnemyKind::Tank), Vec2::new(300.0, 0.0)));
        update_drop_pods(&mut state, 0.02);
        assert_eq!(state.drop_pods[0].state, PodState::Impact);
        for _ in 0..5 {
            update_drop_pods(&mut state, 0.1);
        }
        assert_eq!(state.enemies.len(), POD_ENEMY_COUNT);
        assert!(state.enemies.iter().all(|e| e.kind == EnemyKind::Tank));
    }

    #[test]
    fn test_hybrid_pod_spawns_hybrids() {
        let mut state = quiet_state(1);
        state.drop_pods.push(pod_at(PodPayload::Enemies(EnemyKind::Hybrid), Vec2::new(300.0, 0.0)));
        update_drop_pods(&mut state, 0.02);
        update_drop_pods(&mut state, 0.3);
        assert_eq!(state.enemies.len(), 4);
        assert!(state.enemies.iter().all(|e| e.kind == EnemyKind::Hybrid));
    }

    #[test]
    fn test_health_pod_spawns_one_pickup() {
        let mut state = quiet_state(1);
        state.drop_pods.push(pod_at(PodPayload::HealthPod, Vec2::new(300.0, 0.0)));

        update_drop_pods(&mut state, 0.02);
        assert_eq!(state.drop_pods[0].fall_height, 0.0);
        update_drop_pods(&mut state, 0.1);
        update_drop_pods(&mut state, 0.1);
        assert!(state.pickups.is_empty());
        update_drop_pods(&mut state, 0.1);
        assert_eq!(state.pickups.len(), 1);
        assert_eq!(state.pickups[0].amount, 30.0);

        while !state.drop_pods.is_empty() {
            update_drop_pods(&mut state, 0.1);
        }
        assert_eq!(state.pickups.len(), 1);
    }

    #[test]
    fn test_bomb_pod_throws_four_to_seven() {
        let mut state = quiet_state(1);
        state.drop_pods.push(pod_at(PodPayload::BombPod, Vec2::new(300.0, 0.0)));
        update_drop_pods(&mut state, 0.02);
        update_drop_pods(&mut state, 0.3);
        assert!((4..=7).contains(&state.bombs.len()));
        assert!(state.bombs.iter().all(|b| (0.6..1.5).contains(&b.flight_time)));
    }

    #[test]
    fn test_gas_pod_makes_slowing_cloud() {
        let mut state = quiet_state(1);
        state.drop_pods.push(pod_at(PodPayload::Gas, Vec2::new(300.0, 0.0)));
        update_drop_pods(&mut state, 0.02);
        update_drop_pods(&mut state, 0.3);
        let gas = &state.hazards[0];
        assert_eq!(gas.kind, HazardKind::Gas);
        assert_eq!(gas.slow_percent, 0.35);
        assert_eq!(gas.radius, 108.0);
        assert!((6.0..10.0).contains(&gas.duration));
    }

    #[test]
    fn test_fire_hazard_burns_enemies_and_player() {
        let mut state = quiet_state(1);
        let id = state.spawn_enemy_at(EnemyKind::Tank, Vec2::new(30.0, 0.0));
        let full = state.enemies[0].health;
        state.hazards.push(Hazard {
            kind: HazardKind::Fire,
            pos: Vec2::ZERO,
            radius: 86.0,
            damage_per_second: 20.0,
            slow_percent: 0.0,
            timer: 0.0,
            duration: 1.0,
        });

        update_hazards(&mut state, 0.5);
        assert_eq!(state.enemy(id).unwrap().health, full - 10.0);
        assert_eq!(state.player.health, 95.0);
        assert_eq!(state.hazards.len(), 1);

        update_hazards(&mut state, 0.5);
        assert!(state.hazards.is_empty());
    }

    #[test]
    fn test_hazard_kill_pays_out() {
        let mut state = quiet_state(1);
        state.spawn_enemy_at(EnemyKind::FastSmall, Vec2::new(500.0, 0.0));
        let gold = state.enemies[0].gold_value;
        state.hazards.push(Hazard {
            kind: HazardKind::Fire,
            pos: Vec2::new(500.0, 0.0),
            radius: 50.0,
            damage_per_second: 1000.0,
            slow_percent: 0.0,
            timer: 0.0,
            duration: 5.0,
        });
        update_hazards(&mut state, 0.1);
        assert!(state.enemies.is_empty());
        assert_eq!(state.progression.gold, gold);
    }

    #[test]
    fn test_hazard_can_end_run() {
        let mut state = quiet_state(1);
        state.player.health = 1.0;
        state.hazards.push(Hazard {
            kind: HazardKind::Gas,
            pos: Vec2::ZERO,
            radius: 50.0,
            damage_per_second: 100.0,
            slow_percent: 0.35,
            timer: 0.0,
            duration: 5.0,
        });
        update_hazards(&mut state, 0.1);
        assert_eq!(state.player.health, 0.0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_bomb_flies_with_drag_then_explodes() {
        let mut state = quiet_state(1);
        let id = state.spawn_enemy_at(EnemyKind::Tank, Vec2::new(510.0, 0.0));
        let full = state.enemies[0].health;
        state.bombs.push(Bomb {
            pos: Vec2::new(500.0, 0.0),
            vel: Vec2::new(100.0, 0.0),
            flight_time: 0.15,
            radius: BOMB_RADIUS,
        });

        update_bombs(&mut state, 0.1);
        assert_eq!(state.bombs.len(), 1);
        assert!((state.bombs[0].pos.x - 510.0).abs() < 1e-3);
        assert!((state.bombs[0].vel.x - 94.0).abs() < 1e-3);

        update_bombs(&mut state, 0.1);
        assert!(state.bombs.is_empty());
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.explosions[0].radius, 66.0);
        // Level 1 bomb: 46 damage
        assert_eq!(state.enemy(id).unwrap().health, full - 46.0);
        // Player is far away
        assert_eq!(state.player.health, 100.0);
    }

    #[test]
    fn test_expired_bomb_explodes_immediately_and_hurts_player() {
        let mut state = quiet_state(1);
        state.bombs.push(Bomb {
            pos: Vec2::new(20.0, 0.0),
            vel: Vec2::ZERO,
            flight_time: 0.0,
            radius: BOMB_RADIUS,
        });
        update_bombs(&mut state, 0.0);
        assert!(state.bombs.is_empty());
        assert!((state.player.health - (100.0 - 46.0 * 0.6)).abs() < 1e-4);
    }

    #[test]
    fn test_explosions_decay() {
        let mut state = quiet_state(1);
        explode_bomb(&mut state, Vec2::new(900.0, 0.0));
        update_explosions(&mut state, 0.5);
        assert_eq!(state.explosions.len(), 1);
        update_explosions(&mut state, 0.2);
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_pickup_heals_on_contact() {
        let mut state = quiet_state(1);
        state.player.health = 50.0;
        state.pickups.push(Pickup {
            pos: Vec2::new(20.0, 0.0),
            amount: 30.0,
            radius: PICKUP_RADIUS,
            timer: 0.0,
            duration: PICKUP_DURATION,
        });
        update_pickups(&mut state, 0.1);
        assert!(state.pickups.is_empty());
        assert_eq!(state.player.health, 80.0);
    }

    #[test]
    fn test_pickup_expires() {
        let mut state = quiet_state(1);
        state.pickups.push(Pickup {
            pos: Vec2::new(400.0, 0.0),
            amount: 30.0,
            radius: PICKUP_RADIUS,
            timer: 0.0,
            duration: 1.0,
        });
        update_pickups(&mut state, 0.6);
        assert_eq!(state.pickups.len(), 1);
        update_pickups(&mut state, 0.6);
        assert!(state.pickups.is_empty());
        assert_eq!(state.player.health, 100.0);
    }
}
