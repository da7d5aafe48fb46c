//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - Time comes in through `TickInput`, never read directly
//! - Stable iteration order (insertion order, compacted after each pass)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod combat;
pub mod enemy;
pub mod events;
pub mod progression;
pub mod state;
pub mod targeting;
pub mod tick;

pub use clock::{FrameClock, ManualClock, Simulation, SystemClock, TimeSource};
pub use enemy::{EnemyKind, StatTemplate, build_enemy, roll_enemy_kind};
pub use events::{EventCategory, EventTimers};
pub use progression::{LevelUpgrade, PurchaseError, ShopUpgrade, enemy_xp, xp_requirement};
pub use state::{
    Bomb, DropPod, Enemy, Explosion, GameEvent, GamePhase, GameState, Hazard, HazardKind, KillRecord, Pickup,
    Player, PodPayload, PodState, Progression, Projectile,
};
pub use targeting::{Aim, auto_aim};
pub use tick::{TickInput, tick};
