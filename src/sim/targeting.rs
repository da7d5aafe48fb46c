//! Auto-aim target selection
//!
//! With priority targeting on, the priority list is scanned in order and the
//! nearest enemy of the first kind that has any live candidate wins. When no
//! listed kind is present (or priority is off) the nearest enemy of any kind
//! is chosen.

use glam::Vec2;

use super::collision::direction_to;
use super::enemy::EnemyKind;
use super::state::{Enemy, GameState};

/// Chosen target and the unit direction toward it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aim {
    pub dir: Vec2,
    pub target: u32,
}

/// Pick this frame's target, or None if there is nothing to shoot at
pub fn auto_aim(state: &GameState) -> Option<Aim> {
    let origin = state.player.pos;
    let progression = &state.progression;

    if progression.priority_enabled {
        for kind in &progression.priority {
            if let Some(aim) = nearest(&state.enemies, origin, Some(*kind)).and_then(|e| aim_at(origin, e)) {
                return Some(aim);
            }
        }
    }

    nearest(&state.enemies, origin, None).and_then(|e| aim_at(origin, e))
}

fn nearest(enemies: &[Enemy], origin: Vec2, kind: Option<EnemyKind>) -> Option<&Enemy> {
    enemies
        .iter()
        .filter(|e| e.is_active())
        .filter(|e| kind.is_none_or(|k| e.kind == k))
        .min_by(|a, b| {
            a.pos
                .distance_squared(origin)
                .partial_cmp(&b.pos.distance_squared(origin))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

fn aim_at(origin: Vec2, enemy: &Enemy) -> Option<Aim> {
    direction_to(origin, enemy.pos).map(|dir| Aim {
        dir,
        target: enemy.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::quiet_state;

    #[test]
    fn test_no_enemies_no_aim() {
        let state = quiet_state(1);
        assert_eq!(auto_aim(&state), None);
    }

    #[test]
    fn test_priority_beats_proximity() {
        let mut state = quiet_state(1);
        state.set_enemy_priority_order(vec![EnemyKind::Tank, EnemyKind::Normal]);
        let _near_normal = state.spawn_enemy_at(EnemyKind::Normal, Vec2::new(30.0, 0.0));
        let far_tank = state.spawn_enemy_at(EnemyKind::Tank, Vec2::new(0.0, 400.0));
        let near_tank = state.spawn_enemy_at(EnemyKind::Tank, Vec2::new(0.0, -200.0));

        let aim = auto_aim(&state).unwrap();
        assert_eq!(aim.target, near_tank);
        assert_ne!(aim.target, far_tank);
        assert!((aim.dir - Vec2::new(0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_priority_disabled_picks_nearest() {
        let mut state = quiet_state(1);
        state.set_enemy_priority_order(vec![EnemyKind::Tank]);
        state.set_priority_targeting_enabled(false);
        let near = state.spawn_enemy_at(EnemyKind::Normal, Vec2::new(30.0, 0.0));
        state.spawn_enemy_at(EnemyKind::Tank, Vec2::new(100.0, 0.0));
        assert_eq!(auto_aim(&state).unwrap().target, near);
    }

    #[test]
    fn test_unlisted_kinds_fall_back_to_nearest() {
        let mut state = quiet_state(1);
        state.set_enemy_priority_order(vec![EnemyKind::Blackhole]);
        state.spawn_enemy_at(EnemyKind::Sniper, Vec2::new(-300.0, 0.0));
        let near = state.spawn_enemy_at(EnemyKind::FastSmall, Vec2::new(0.0, 90.0));
        assert_eq!(auto_aim(&state).unwrap().target, near);
    }

    #[test]
    fn test_dead_enemies_are_ignored() {
        let mut state = quiet_state(1);
        let dead = state.spawn_enemy_at(EnemyKind::Normal, Vec2::new(10.0, 0.0));
        let alive = state.spawn_enemy_at(EnemyKind::Normal, Vec2::new(200.0, 0.0));
        state.enemies.iter_mut().find(|e| e.id == dead).unwrap().health = 0.0;
        assert_eq!(auto_aim(&state).unwrap().target, alive);
    }
}
