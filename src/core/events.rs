//! Global events used for cross-system communication.
//!
//! Combat writes hit and kill events; artifacts, pickups, the HUD, and the
//! analytics sink read them. Nothing here ever blocks the frame.

use bevy::prelude::*;

use crate::combat::WeaponCategory;
use crate::enemies::EnemyTier;

/// What hurt the player.
#[derive(Debug, Clone, PartialEq)]
pub enum DamageSource {
    /// Contact with an enemy of this type.
    Contact(String),
    NamedProjectile,
    BossContact,
    BossProjectile,
    BossDash,
    FireZone,
}

impl DamageSource {
    pub fn label(&self) -> &str {
        match self {
            DamageSource::Contact(kind) => kind,
            DamageSource::NamedProjectile => "named_projectile",
            DamageSource::BossContact => "boss_contact",
            DamageSource::BossProjectile => "boss_projectile",
            DamageSource::BossDash => "boss_dash",
            DamageSource::FireZone => "fire_zone",
        }
    }
}

/// Sent for every successful player hit on an enemy.
#[derive(Event, Debug, Clone)]
pub struct EnemyHitEvent {
    pub enemy_id: String,
    pub damage: f32,
    pub is_critical: bool,
    pub category: WeaponCategory,
}

/// Sent once when an enemy dies.
#[derive(Event, Debug, Clone)]
pub struct EnemyKilledEvent {
    pub enemy_id: String,
    pub kind: String,
    pub tier: EnemyTier,
    pub position: Vec2,
    pub xp_value: u32,
    pub drop_potion: bool,
}

/// Sent when damage actually lands on the player.
#[derive(Event, Debug, Clone)]
pub struct PlayerDamagedEvent {
    pub amount: f32,
    pub source: DamageSource,
}

/// Sent when the player levels up.
#[derive(Event, Debug, Clone)]
pub struct LevelUpEvent {
    pub new_level: u32,
}

/// UI action: the player picked an upgrade from the offered list.
#[derive(Event, Debug, Clone)]
pub struct UpgradeChosenEvent {
    pub choice_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct BossAppearedEvent {
    pub boss_id: String,
    pub position: Vec2,
}

#[derive(Event, Debug, Clone)]
pub struct BossDefeatedEvent {
    pub boss_id: String,
    pub position: Vec2,
    pub elapsed: f32,
}

/// End-of-stage numbers shown on the clear screen.
#[derive(Debug, Clone, PartialEq)]
pub struct StageStats {
    pub clear_time: f32,
    pub total_xp: u32,
    pub level: u32,
    pub kills: u32,
}

impl StageStats {
    /// Clear time as `m:ss`.
    pub fn formatted_time(&self) -> String {
        format_clock(self.clear_time)
    }
}

/// Format seconds as `m:ss`.
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u32;
    format!("{}:{:02}", total / 60, total % 60)
}

#[derive(Event, Debug, Clone)]
pub struct StageClearedEvent {
    pub stats: StageStats,
}

/// Final numbers for a run that ended in death.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub score: u32,
    pub time: f32,
    pub enemies_killed: u32,
}

#[derive(Event, Debug, Clone)]
pub struct PlayerDiedEvent {
    pub cause: DamageSource,
    pub result: RunResult,
}

/// Flat telemetry record. Delivery is best effort.
#[derive(Event, Debug, Clone)]
pub struct AnalyticsEvent {
    pub name: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl AnalyticsEvent {
    pub fn new(name: &'static str) -> Self {
        Self { name, params: Vec::new() }
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format_pads_seconds() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(65.9), "1:05");
        assert_eq!(format_clock(600.0), "10:00");
    }
}
