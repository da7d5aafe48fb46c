//! Experience, level-ups and gold-gated shop upgrades

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enemy::EnemyKind;
use super::state::{GameEvent, GameState, KillRecord, Player};
use crate::consts::*;

/// Experience needed to leave `level`
pub fn xp_requirement(level: u32) -> u32 {
    (XP_BASE_REQUIREMENT * XP_GROWTH.powi(level.saturating_sub(1) as i32)).floor() as u32
}

fn base_xp(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Normal => 5.0,
        EnemyKind::FastSmall => 4.0,
        EnemyKind::ImmuneSlow => 6.0,
        EnemyKind::Tank => 20.0,
        EnemyKind::Assassin => 30.0,
        EnemyKind::Sniper => 18.0,
        EnemyKind::Hybrid => 12.0,
        EnemyKind::Blackhole => 40.0,
    }
}

fn rarity(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Normal => 1.0,
        EnemyKind::FastSmall => 0.8,
        EnemyKind::ImmuneSlow => 1.1,
        EnemyKind::Tank => 2.0,
        EnemyKind::Assassin => 2.5,
        EnemyKind::Sniper => 1.8,
        EnemyKind::Hybrid => 1.3,
        EnemyKind::Blackhole => 3.0,
    }
}

/// Experience for a kill, never less than 1
pub fn enemy_xp(kill: &KillRecord, player_level: u32) -> u32 {
    let hp_factor = (kill.max_health * 0.1).floor().max(0.0);
    let dmg_factor = (kill.damage * 0.5).floor().max(0.0);
    let xp = ((hp_factor + dmg_factor) * rarity(kill.kind) + base_xp(kill.kind)).floor()
        + (player_level as f32 * 0.5).floor();
    (xp as u32).max(1)
}

/// Passive upgrades granted on level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpgrade {
    MaxHealth,
    Damage,
    AttackSpeed,
    ProjectileSpeed,
    ProjectileSize,
    SlowZoneRange,
    SlowZoneStrength,
    Piercing,
    Multishot,
}

impl LevelUpgrade {
    pub const CATALOG: [LevelUpgrade; 9] = [
        LevelUpgrade::MaxHealth,
        LevelUpgrade::Damage,
        LevelUpgrade::AttackSpeed,
        LevelUpgrade::ProjectileSpeed,
        LevelUpgrade::ProjectileSize,
        LevelUpgrade::SlowZoneRange,
        LevelUpgrade::SlowZoneStrength,
        LevelUpgrade::Piercing,
        LevelUpgrade::Multishot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LevelUpgrade::MaxHealth => "Max Health",
            LevelUpgrade::Damage => "Damage",
            LevelUpgrade::AttackSpeed => "Attack Speed",
            LevelUpgrade::ProjectileSpeed => "Projectile Speed",
            LevelUpgrade::ProjectileSize => "Projectile Size",
            LevelUpgrade::SlowZoneRange => "Slow Zone Range",
            LevelUpgrade::SlowZoneStrength => "Slow Zone Strength",
            LevelUpgrade::Piercing => "Piercing",
            LevelUpgrade::Multishot => "Multishot",
        }
    }

    pub fn increment(&self) -> f32 {
        match self {
            LevelUpgrade::MaxHealth => 30.0,
            LevelUpgrade::Damage => 5.0,
            LevelUpgrade::AttackSpeed => 0.25,
            LevelUpgrade::ProjectileSpeed => 50.0,
            LevelUpgrade::ProjectileSize => 2.0,
            LevelUpgrade::SlowZoneRange => 75.0,
            LevelUpgrade::SlowZoneStrength => 0.08,
            LevelUpgrade::Piercing | LevelUpgrade::Multishot => 1.0,
        }
    }

    /// Apply this upgrade's increment to the player
    pub fn apply(&self, player: &mut Player) {
        let inc = self.increment();
        match self {
            LevelUpgrade::MaxHealth => raise_max_health(player, inc),
            LevelUpgrade::Damage => player.damage += inc,
            LevelUpgrade::AttackSpeed => set_attack_speed(player, player.attack_speed + inc),
            LevelUpgrade::ProjectileSpeed => player.projectile_speed += inc,
            LevelUpgrade::ProjectileSize => player.projectile_radius += inc,
            LevelUpgrade::SlowZoneRange => player.slow_zone_radius += inc,
            LevelUpgrade::SlowZoneStrength => {
                player.slow_zone_percent = (player.slow_zone_percent + inc).min(MAX_SLOW_ZONE_PERCENT)
            }
            LevelUpgrade::Piercing => player.piercing += 1,
            LevelUpgrade::Multishot => player.multishot += 1,
        }
    }
}

/// Upgrades bought with gold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopUpgrade {
    AttackSpeed,
    ProjectileSpeed,
    Damage,
    MaxHealth,
    ProjectileSize,
    EarthquakeRange,
    EarthquakeCooldown,
    EarthquakeStrength,
}

impl ShopUpgrade {
    pub const ALL: [ShopUpgrade; 8] = [
        ShopUpgrade::AttackSpeed,
        ShopUpgrade::ProjectileSpeed,
        ShopUpgrade::Damage,
        ShopUpgrade::MaxHealth,
        ShopUpgrade::ProjectileSize,
        ShopUpgrade::EarthquakeRange,
        ShopUpgrade::EarthquakeCooldown,
        ShopUpgrade::EarthquakeStrength,
    ];

    pub fn cost(&self) -> u32 {
        match self {
            ShopUpgrade::AttackSpeed => 50,
            ShopUpgrade::ProjectileSpeed => 50,
            ShopUpgrade::Damage => 60,
            ShopUpgrade::MaxHealth => 80,
            ShopUpgrade::ProjectileSize => 45,
            ShopUpgrade::EarthquakeRange => 70,
            ShopUpgrade::EarthquakeCooldown => 75,
            ShopUpgrade::EarthquakeStrength => 55,
        }
    }

    pub fn delta(&self) -> f32 {
        match self {
            ShopUpgrade::AttackSpeed => 0.1,
            ShopUpgrade::ProjectileSpeed => 50.0,
            ShopUpgrade::Damage => 5.0,
            ShopUpgrade::MaxHealth => 30.0,
            ShopUpgrade::ProjectileSize => 1.0,
            ShopUpgrade::EarthquakeRange => 100.0,
            ShopUpgrade::EarthquakeCooldown => 0.5,
            ShopUpgrade::EarthquakeStrength => 20.0,
        }
    }

    fn apply(&self, player: &mut Player) {
        let delta = self.delta();
        match self {
            ShopUpgrade::AttackSpeed => set_attack_speed(player, player.attack_speed + delta),
            ShopUpgrade::ProjectileSpeed => player.projectile_speed += delta,
            ShopUpgrade::Damage => player.damage += delta,
            ShopUpgrade::MaxHealth => raise_max_health(player, delta),
            ShopUpgrade::ProjectileSize => player.projectile_radius += delta,
            ShopUpgrade::EarthquakeRange => player.earthquake_range += delta,
            ShopUpgrade::EarthquakeCooldown => {
                player.earthquake_cooldown = (player.earthquake_cooldown - delta).max(MIN_EARTHQUAKE_COOLDOWN)
            }
            ShopUpgrade::EarthquakeStrength => player.earthquake_strength += delta,
        }
    }
}

/// Shop purchase failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("not enough gold: need {cost}, have {available}")]
    InsufficientGold { cost: u32, available: u32 },
}

fn set_attack_speed(player: &mut Player, attack_speed: f32) {
    player.attack_speed = attack_speed;
    player.shoot_cooldown = 1.0 / attack_speed;
}

fn raise_max_health(player: &mut Player, amount: f32) {
    player.max_health += amount;
    player.heal(amount);
}

impl GameState {
    /// Add experience; applies one random upgrade per level crossed.
    /// Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        self.progression.xp += amount;
        let mut gained = 0;
        while self.progression.xp >= self.progression.xp_required {
            self.progression.xp -= self.progression.xp_required;
            self.progression.level += 1;
            self.progression.xp_required = xp_requirement(self.progression.level);
            gained += 1;
            self.apply_random_upgrade();
        }
        gained
    }

    /// Draw one upgrade uniformly from the catalog and apply it
    pub fn apply_random_upgrade(&mut self) -> LevelUpgrade {
        let upgrade = LevelUpgrade::CATALOG[self.rng.random_range(0..LevelUpgrade::CATALOG.len())];
        upgrade.apply(&mut self.player);
        log::info!(
            "Level {}: {} +{}",
            self.progression.level,
            upgrade.name(),
            upgrade.increment()
        );
        self.events.push(GameEvent::LevelUp {
            level: self.progression.level,
            upgrade,
        });
        upgrade
    }

    /// Buy a shop upgrade. State is untouched when gold is short.
    pub fn purchase_upgrade(&mut self, upgrade: ShopUpgrade) -> Result<(), PurchaseError> {
        let cost = upgrade.cost();
        let available = self.progression.gold;
        if available < cost {
            log::debug!("Cannot afford {upgrade:?}: {available}/{cost} gold");
            return Err(PurchaseError::InsufficientGold { cost, available });
        }
        self.progression.gold -= cost;
        upgrade.apply(&mut self.player);
        self.events.push(GameEvent::UpgradePurchased { upgrade, cost });
        Ok(())
    }

    /// Pay out gold and experience for every kill recorded this pass
    pub(crate) fn settle_kills(&mut self) {
        let kills = std::mem::take(&mut self.pending_kills);
        for kill in &kills {
            let xp = enemy_xp(kill, self.progression.level);
            self.progression.gold += kill.gold;
            self.events.push(GameEvent::EnemyKilled {
                kind: kill.kind,
                gold: kill.gold,
                xp,
            });
            self.add_experience(xp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::quiet_state;

    fn level_ups(state: &mut GameState) -> usize {
        state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelUp { .. }))
            .count()
    }

    #[test]
    fn test_requirement_grows_geometrically() {
        assert_eq!(xp_requirement(1), 25);
        assert_eq!(xp_requirement(2), 26);
        assert_eq!(xp_requirement(3), 27);
        assert_eq!(xp_requirement(20), 63);
    }

    #[test]
    fn test_below_requirement_no_level() {
        let mut state = quiet_state(1);
        assert_eq!(state.add_experience(24), 0);
        assert_eq!(state.progression.level, 1);
        assert_eq!(state.progression.xp, 24);
        assert_eq!(level_ups(&mut state), 0);
    }

    #[test]
    fn test_two_and_a_half_requirements_cross_two_levels() {
        let mut state = quiet_state(1);
        let required = state.progression.xp_required;
        let gained = state.add_experience(required * 5 / 2);
        assert_eq!(gained, 2);
        assert_eq!(state.progression.level, 3);
        assert_eq!(state.progression.xp_required, xp_requirement(3));
        assert!(state.progression.xp < state.progression.xp_required);
        assert_eq!(level_ups(&mut state), 2);
    }

    #[test]
    fn test_xp_formula() {
        let kill = KillRecord {
            kind: EnemyKind::Tank,
            gold: 68,
            max_health: 92.0,
            damage: 22.0,
        };
        // (9 + 11) * 2.0 + 20 = 60, + floor(3 * 0.5) = 61
        assert_eq!(enemy_xp(&kill, 3), 61);

        let feeble = KillRecord {
            kind: EnemyKind::FastSmall,
            gold: 1,
            max_health: 0.0,
            damage: 0.0,
        };
        assert_eq!(enemy_xp(&feeble, 0), 4);
    }

    #[test]
    fn test_max_health_upgrade_heals() {
        let mut player = Player::default();
        player.health = 50.0;
        LevelUpgrade::MaxHealth.apply(&mut player);
        assert_eq!(player.max_health, 130.0);
        assert_eq!(player.health, 80.0);

        let mut full = Player::default();
        LevelUpgrade::MaxHealth.apply(&mut full);
        assert_eq!(full.health, 130.0);
    }

    #[test]
    fn test_attack_speed_recomputes_cooldown() {
        let mut player = Player::default();
        LevelUpgrade::AttackSpeed.apply(&mut player);
        assert_eq!(player.attack_speed, 1.25);
        assert!((player.shoot_cooldown - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_slow_zone_strength_capped() {
        let mut player = Player::default();
        for _ in 0..20 {
            LevelUpgrade::SlowZoneStrength.apply(&mut player);
        }
        assert_eq!(player.slow_zone_percent, MAX_SLOW_ZONE_PERCENT);
    }

    #[test]
    fn test_purchase_requires_gold() {
        let mut state = quiet_state(1);
        state.progression.gold = 40;
        let err = state.purchase_upgrade(ShopUpgrade::Damage).unwrap_err();
        assert_eq!(err, PurchaseError::InsufficientGold { cost: 60, available: 40 });
        assert_eq!(state.progression.gold, 40);
        assert_eq!(state.player.damage, PLAYER_DAMAGE);

        state.progression.gold = 100;
        state.purchase_upgrade(ShopUpgrade::Damage).unwrap();
        assert_eq!(state.progression.gold, 40);
        assert_eq!(state.player.damage, PLAYER_DAMAGE + 5.0);
    }

    #[test]
    fn test_earthquake_cooldown_floor() {
        let mut state = quiet_state(1);
        state.progression.gold = 10_000;
        for _ in 0..20 {
            state.purchase_upgrade(ShopUpgrade::EarthquakeCooldown).unwrap();
        }
        assert_eq!(state.player.earthquake_cooldown, MIN_EARTHQUAKE_COOLDOWN);
    }

    #[test]
    fn test_settle_pays_gold_and_xp() {
        let mut state = quiet_state(1);
        state.pending_kills.push(KillRecord {
            kind: EnemyKind::Normal,
            gold: 23,
            max_health: 23.0,
            damage: 9.0,
        });
        state.settle_kills();
        assert_eq!(state.progression.gold, 23);
        assert_eq!(state.progression.xp, 11);
        assert!(state.pending_kills.is_empty());
    }
}
