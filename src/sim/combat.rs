//! Combat resolution: firing, earthquake, projectile and enemy passes
//!
//! Kills are recorded into `pending_kills` while a pass runs and rewarded by
//! `settle_kills` once the pass is done. Dead or de-spawned enemies stay in
//! the list (skipped by `is_active`) until the pass compacts it, so removal
//! never skips or double-processes an entity.

use glam::Vec2;

use super::collision::{circles_overlap, direction_to, within_radius};
use super::enemy::EnemyKind;
use super::state::{Enemy, GameState, Hazard, HazardKind, Player, Projectile};
use super::targeting::auto_aim;
use crate::consts::*;
use crate::dir_from_angle;

/// Shot cooldowns are measured on wall-clock seconds, not simulated time
#[inline]
fn cooldown_ready(last: Option<f64>, cooldown: f32, now: f64) -> bool {
    match last {
        Some(last) => now - last >= cooldown as f64,
        None => true,
    }
}

/// Apply movement intent (each axis in [-1, 1]) and integrate the player
pub fn update_player(state: &mut GameState, movement: Vec2, dt: f32) {
    let player = &mut state.player;
    player.vel = movement.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)) * player.speed;
    player.pos += player.vel * dt;
}

/// Aim at this frame's target and shoot if the weapon is ready
pub fn auto_fire(state: &mut GameState, now: f64) {
    let aim = auto_aim(state);
    state.current_target = aim.map(|a| a.target);
    if let Some(aim) = aim {
        fire(state, aim.dir, now);
    }
}

/// Fire a volley along `dir`. Returns false while on cooldown.
pub fn fire(state: &mut GameState, dir: Vec2, now: f64) -> bool {
    let player = &state.player;
    if !cooldown_ready(player.last_shot, player.shoot_cooldown, now) {
        return false;
    }
    state.player.last_shot = Some(now);

    let base_angle = dir.y.atan2(dir.x);
    let count = state.player.multishot.max(1);
    let lifetime = PROJECTILE_LIFETIME + state.progression.projectile_lifetime_bonus;
    for i in 0..count {
        let offset = if count > 1 {
            (i as f32 - (count - 1) as f32 / 2.0) * MULTISHOT_SPREAD
        } else {
            0.0
        };
        let id = state.next_entity_id();
        let player = &state.player;
        state.projectiles.push(Projectile {
            id,
            pos: player.pos,
            vel: dir_from_angle(base_angle + offset) * player.projectile_speed,
            radius: player.projectile_radius,
            damage: player.damage,
            lifetime,
            pierce_count: 0,
            max_pierce: player.piercing,
            hit_enemies: Vec::new(),
            enemy_owned: false,
        });
    }
    true
}

/// Flat damage to every enemy within range, on its own wall-clock cooldown
pub fn trigger_earthquake(state: &mut GameState, now: f64) {
    let player = &state.player;
    if player.earthquake_range <= 0.0 {
        return;
    }
    if !cooldown_ready(player.last_earthquake, player.earthquake_cooldown, now) {
        return;
    }
    let (center, range, strength) = (player.pos, player.earthquake_range, player.earthquake_strength);
    state.player.last_earthquake = Some(now);

    damage_enemies_in_radius(state, center, range, strength);
    state.compact_enemies();
    state.settle_kills();
}

/// Advance projectiles and resolve their hits
pub fn update_projectiles(state: &mut GameState, dt: f32) {
    let GameState {
        projectiles,
        enemies,
        player,
        pending_kills,
        ..
    } = state;

    projectiles.retain_mut(|p| {
        p.pos += p.vel * dt;
        p.lifetime -= dt;
        if p.lifetime <= 0.0 {
            return false;
        }

        if p.enemy_owned {
            if circles_overlap(p.pos, p.radius, player.pos, player.radius) {
                player.take_damage(p.damage);
                return false;
            }
            return true;
        }

        // At most one enemy per projectile per tick
        let hit = enemies.iter_mut().find(|e| {
            e.is_active()
                && !p.hit_enemies.contains(&e.id)
                && circles_overlap(p.pos, p.radius, e.pos, e.radius)
        });
        if let Some(enemy) = hit {
            if enemy.apply_damage(p.damage) {
                pending_kills.push(enemy.kill_record());
            }
            p.hit_enemies.push(enemy.id);
            p.pierce_count += 1;
            if p.pierce_count > p.max_pierce {
                return false;
            }
        }
        true
    });

    state.compact_enemies();
    state.settle_kills();
    if state.player.health <= 0.0 {
        state.enter_game_over();
    }
}

/// Combined movement multiplier from the player's slow zone and gas clouds
pub fn speed_multiplier(player: &Player, hazards: &[Hazard], enemy: &Enemy) -> f32 {
    if enemy.immune_to_slow {
        return 1.0;
    }
    let mut multiplier = 1.0;
    if player.slow_zone_radius > 0.0 && within_radius(player.pos, player.slow_zone_radius, enemy.pos) {
        multiplier *= (1.0 - player.slow_zone_percent).max(0.0);
    }
    // Strongest overlapping cloud
    let gas = hazards
        .iter()
        .filter(|h| h.kind == HazardKind::Gas && within_radius(h.pos, h.radius, enemy.pos))
        .map(|h| h.slow_percent)
        .fold(0.0, f32::max);
    if gas > 0.0 {
        multiplier *= (1.0 - gas).max(0.0);
    }
    multiplier
}

/// Move enemies, apply blackhole pull, sniper fire, culling and contact damage
pub fn update_enemies(state: &mut GameState, dt: f32, now: f64) {
    let max_distance = state.tuning.spawn.max_distance;
    let mut shots: Vec<(Vec2, Vec2, f32)> = Vec::new();

    for i in 0..state.enemies.len() {
        if !state.enemies[i].is_active() {
            continue;
        }
        let player_pos = state.player.pos;

        if state.enemies[i].kind == EnemyKind::Blackhole {
            let enemy = &mut state.enemies[i];
            let to_hole = enemy.pos - player_pos;
            let dist = to_hole.length();
            if dist > 0.0 {
                let pull = enemy.pull_strength / (dist + BLACKHOLE_PULL_OFFSET) * dt;
                state.player.pos += to_hole * pull;
            }
            enemy.vel = Vec2::ZERO;
        } else {
            let multiplier = speed_multiplier(&state.player, &state.hazards, &state.enemies[i]);
            let enemy = &mut state.enemies[i];
            if let Some(dir) = direction_to(enemy.pos, player_pos) {
                enemy.vel = dir * enemy.speed * multiplier;
            }
        }

        let player_pos = state.player.pos;
        let enemy = &mut state.enemies[i];
        enemy.pos += enemy.vel * dt;

        let dist = enemy.pos.distance(player_pos);
        if dist > max_distance {
            enemy.despawned = true;
            continue;
        }

        if enemy.kind == EnemyKind::Sniper
            && dist < SNIPER_RANGE
            && cooldown_ready(enemy.last_shot, enemy.shoot_cooldown, now)
        {
            enemy.last_shot = Some(now);
            if let Some(dir) = direction_to(enemy.pos, player_pos) {
                shots.push((enemy.pos, dir, enemy.damage));
            }
        }

        if !circles_overlap(enemy.pos, enemy.radius, player_pos, state.player.radius) {
            continue;
        }

        if enemy.kind == EnemyKind::Assassin {
            let (origin, damage) = (enemy.pos, enemy.damage);
            enemy.despawned = true;
            state.player.take_damage(damage);

            let blast = (damage * ASSASSIN_BLAST_FRACTION).floor();
            for (k, other) in state.enemies.iter_mut().enumerate() {
                if k != i
                    && other.is_active()
                    && within_radius(origin, ASSASSIN_BLAST_RADIUS, other.pos)
                    && other.apply_damage(blast)
                {
                    state.pending_kills.push(other.kill_record());
                }
            }
        } else {
            let chip = enemy.damage * dt;
            state.player.take_damage(chip);
        }

        if state.player.health <= 0.0 {
            break;
        }
    }

    for (pos, dir, damage) in shots {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos,
            vel: dir * SNIPER_PROJECTILE_SPEED,
            radius: SNIPER_PROJECTILE_RADIUS,
            damage,
            lifetime: SNIPER_PROJECTILE_LIFETIME,
            pierce_count: 0,
            max_pierce: 0,
            hit_enemies: Vec::new(),
            enemy_owned: true,
        });
    }

    state.compact_enemies();
    state.settle_kills();
    if state.player.health <= 0.0 {
        state.enter_game_over();
    }
}

/// Damage every active enemy within `radius` of `center`, recording kills
pub(crate) fn damage_enemies_in_radius(state: &mut GameState, center: Vec2, radius: f32, damage: f32) {
    for enemy in state.enemies.iter_mut() {
        if enemy.is_active() && within_radius(center, radius, enemy.pos) && enemy.apply_damage(damage) {
            state.pending_kills.push(enemy.kill_record());
        }
    }
}
