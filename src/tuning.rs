//! Data-driven spawn and event balance
//!
//! Every section is `#[serde(default)]`, so a JSON file only needs the
//! fields it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning load/validation failures
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: String, reason: &'static str },
}

/// Continuous enemy spawning and culling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Minimum distance from the player for random spawns
    pub spawn_distance: f32,
    /// Random extra distance on top of `spawn_distance`
    pub spawn_spread: f32,
    /// Enemies farther than this from the player are de-spawned
    pub max_distance: f32,
    /// Enemies per second at level 0
    pub base_rate: f32,
    /// Extra enemies per second per player level
    pub rate_per_level: f32,
    /// Enemies spawned when a run starts
    pub initial_wave_size: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            spawn_distance: 500.0,
            spawn_spread: 200.0,
            max_distance: 1500.0,
            base_rate: 0.3,
            rate_per_level: 0.04,
            initial_wave_size: 5,
        }
    }
}

impl SpawnTuning {
    /// Seconds between continuous spawns at `level`
    pub fn spawn_interval(&self, level: u32) -> f64 {
        let rate = self.base_rate + level as f32 * self.rate_per_level;
        if rate <= 0.0 {
            f64::INFINITY
        } else {
            1.0 / rate as f64
        }
    }
}

/// One time-gated event category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRule {
    /// Minimum wall-clock seconds between spawn attempts
    pub cooldown_secs: f64,
    /// Probability that an attempt succeeds
    pub chance: f32,
    pub min_distance: f32,
    pub distance_spread: f32,
    pub fall_height: f32,
    pub min_fall_speed: f32,
    pub fall_speed_spread: f32,
}

impl EventRule {
    const fn new(
        cooldown_secs: f64,
        chance: f32,
        min_distance: f32,
        distance_spread: f32,
        fall_height: f32,
        min_fall_speed: f32,
        fall_speed_spread: f32,
    ) -> Self {
        Self {
            cooldown_secs,
            chance,
            min_distance,
            distance_spread,
            fall_height,
            min_fall_speed,
            fall_speed_spread,
        }
    }
}

/// Rules for each event category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTable {
    pub drop_pod: EventRule,
    pub bomb_pod: EventRule,
    pub health_pod: EventRule,
    pub fireball: EventRule,
    pub gas: EventRule,
}

impl Default for EventTable {
    fn default() -> Self {
        Self {
            drop_pod: EventRule::new(10.0, 0.12, 350.0, 200.0, 600.0, 700.0, 300.0),
            bomb_pod: EventRule::new(20.0, 0.08, 300.0, 200.0, 600.0, 700.0, 200.0),
            health_pod: EventRule::new(22.0, 0.08, 300.0, 200.0, 600.0, 700.0, 200.0),
            fireball: EventRule::new(15.0, 0.06, 300.0, 300.0, 700.0, 900.0, 300.0),
            gas: EventRule::new(20.0, 0.05, 300.0, 300.0, 700.0, 650.0, 250.0),
        }
    }
}

/// Complete balance table for a run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub spawn: SpawnTuning,
    pub events: EventTable,
}

impl Tuning {
    /// Parse and validate a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let s = &self.spawn;
        check_non_negative("spawn.spawn_distance", s.spawn_distance)?;
        check_non_negative("spawn.spawn_spread", s.spawn_spread)?;
        check_non_negative("spawn.max_distance", s.max_distance)?;
        check_non_negative("spawn.base_rate", s.base_rate)?;
        check_non_negative("spawn.rate_per_level", s.rate_per_level)?;

        let e = &self.events;
        for (name, rule) in [
            ("drop_pod", &e.drop_pod),
            ("bomb_pod", &e.bomb_pod),
            ("health_pod", &e.health_pod),
            ("fireball", &e.fireball),
            ("gas", &e.gas),
        ] {
            check_non_negative(&format!("events.{name}.cooldown_secs"), rule.cooldown_secs as f32)?;
            check_non_negative(&format!("events.{name}.min_distance"), rule.min_distance)?;
            check_non_negative(&format!("events.{name}.distance_spread"), rule.distance_spread)?;
            check_non_negative(&format!("events.{name}.fall_height"), rule.fall_height)?;
            check_non_negative(&format!("events.{name}.fall_speed_spread"), rule.fall_speed_spread)?;
            if !(rule.min_fall_speed.is_finite() && rule.min_fall_speed > 0.0) {
                return Err(TuningError::Invalid {
                    field: format!("events.{name}.min_fall_speed"),
                    reason: "must be positive",
                });
            }
            if !(0.0..=1.0).contains(&rule.chance) {
                return Err(TuningError::Invalid {
                    field: format!("events.{name}.chance"),
                    reason: "must be within [0, 1]",
                });
            }
        }
        Ok(())
    }
}

fn check_non_negative(field: &str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field: field.to_string(),
            reason: "must be finite and non-negative",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "spawn": { "initial_wave_size": 12 } }"#).unwrap();
        assert_eq!(t.spawn.initial_wave_size, 12);
        assert_eq!(t.spawn.max_distance, 1500.0);
        assert_eq!(t.events, EventTable::default());
    }

    #[test]
    fn test_rejects_bad_chance() {
        let mut t = Tuning::default();
        t.events.gas.chance = 1.5;
        let err = t.validate().unwrap_err();
        assert!(matches!(err, TuningError::Invalid { ref field, .. } if field == "events.gas.chance"));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_spawn_interval() {
        let s = SpawnTuning::default();
        // 0.3 + 10 * 0.04 = 0.7 enemies/s
        assert!((s.spawn_interval(10) - 1.0 / 0.7).abs() < 1e-4);
        let idle = SpawnTuning {
            base_rate: 0.0,
            rate_per_level: 0.0,
            ..Default::default()
        };
        assert!(idle.spawn_interval(3).is_infinite());
    }
}
