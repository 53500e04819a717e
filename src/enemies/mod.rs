//! Enemies module - tiered enemies, wave and named spawning, movement.

mod ai;
mod components;
pub mod data;
mod named;
mod plugin;
mod spawning;

pub use ai::advance_enemies;
pub use components::*;
pub use data::{EnemyDefinition, EnemyRegistry};
pub use named::{NamedBalance, NamedPhase, NamedProjectile, NamedSpawnSystem};
pub use plugin::EnemyPlugin;
pub use spawning::{pick_weighted, Side, SpawnBalance, SpawnSystem, TierPhase};
