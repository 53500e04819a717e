//! Level-up choices: what can be offered and what picking one does.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::artifacts::{
    artifact_data, create_artifact, ArtifactSystem, Rarity, EVOLUTION_ARTIFACTS, PASSIVE_ARTIFACT_IDS,
};
use crate::combat::{evolve, recipe_for, Loadout, WeaponKind, EVOLUTION_LEVEL};
use crate::player::Player;

pub const CHOICES_PER_LEVEL: usize = 3;

/// Share of max health restored by the heal filler choice.
pub const HEAL_CHOICE_FRACTION: f32 = 0.3;

/// Damage reduction never goes past this.
const MAX_DAMAGE_REDUCTION: f32 = 0.75;
const MAX_REGEN_RATE: f32 = 0.05;
const MAX_XP_MULTIPLIER: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Damage,
    Cooldown,
    Health,
    Speed,
    Pickup,
    CritRate,
    CritDamage,
    DamageReduction,
    /// Health regenerated per second, as a share of max health.
    Breathing,
    XpGain,
}

impl StatKind {
    pub const ALL: [StatKind; 10] = [
        StatKind::Damage,
        StatKind::Cooldown,
        StatKind::Health,
        StatKind::Speed,
        StatKind::Pickup,
        StatKind::CritRate,
        StatKind::CritDamage,
        StatKind::DamageReduction,
        StatKind::Breathing,
        StatKind::XpGain,
    ];

    pub fn id(self) -> &'static str {
        match self {
            StatKind::Damage => "damage",
            StatKind::Cooldown => "cooldown",
            StatKind::Health => "health",
            StatKind::Speed => "speed",
            StatKind::Pickup => "pickup",
            StatKind::CritRate => "crit_rate",
            StatKind::CritDamage => "crit_damage",
            StatKind::DamageReduction => "damage_reduction",
            StatKind::Breathing => "breathing",
            StatKind::XpGain => "xp_gain",
        }
    }

    /// Size of one pick. Health is flat HP; everything else is a fraction.
    pub fn amount(self, rarity: Rarity) -> f32 {
        let [common, rare, epic] = match self {
            StatKind::Damage | StatKind::Cooldown => [0.02, 0.05, 0.1],
            StatKind::Health => [5.0, 15.0, 30.0],
            StatKind::Speed => [0.03, 0.07, 0.15],
            StatKind::Pickup => [0.05, 0.15, 0.3],
            StatKind::CritRate => [0.05, 0.1, 0.2],
            StatKind::CritDamage => [0.2, 0.5, 1.0],
            StatKind::DamageReduction => [0.03, 0.08, 0.15],
            StatKind::Breathing => [0.005, 0.012, 0.025],
            StatKind::XpGain => [0.05, 0.12, 0.25],
        };
        match rarity {
            Rarity::Common => common,
            Rarity::Rare => rare,
            Rarity::Epic | Rarity::Legendary => epic,
        }
    }

    fn describe(self, rarity: Rarity) -> (String, String) {
        let amount = self.amount(rarity);
        let percent = (amount * 100.0).round();
        match self {
            StatKind::Damage => ("Attack Power".into(), format!("All weapons deal {percent}% more damage.")),
            StatKind::Cooldown => ("Quick Hands".into(), format!("Weapon cooldowns are {percent}% shorter.")),
            StatKind::Health => ("Vitality".into(), format!("Max health +{amount}.")),
            StatKind::Speed => ("Swift Steps".into(), format!("Move speed +{percent}%.")),
            StatKind::Pickup => ("Magnetism".into(), format!("Pickup range +{percent}%.")),
            StatKind::CritRate => ("Keen Eye".into(), format!("Critical chance +{percent}%.")),
            StatKind::CritDamage => ("Deadly Strikes".into(), format!("Critical damage +{percent}%.")),
            StatKind::DamageReduction => ("Iron Skin".into(), format!("Incoming damage -{percent}%.")),
            StatKind::Breathing => {
                let per_second = (amount * 1000.0).round() / 10.0;
                ("Breathing".into(), format!("Regenerate {per_second}% of max health per second."))
            }
            StatKind::XpGain => ("Cultivation".into(), format!("XP gained +{percent}%.")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceKind {
    WeaponUnlock(WeaponKind),
    WeaponUpgrade(WeaponKind),
    Stat(StatKind),
    Artifact(&'static str),
    /// Filler when fewer than three real options exist.
    Heal,
}

/// One option on the level-up screen.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelUpChoice {
    pub id: String,
    pub kind: ChoiceKind,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
}

fn unlock_rarity(kind: WeaponKind) -> Rarity {
    match kind {
        WeaponKind::Talisman | WeaponKind::DokkaebiFire => Rarity::Common,
        WeaponKind::FanWind | WeaponKind::Moktak | WeaponKind::JakduBlade | WeaponKind::PurifyingWater => Rarity::Rare,
    }
}

/// Every choice the current run could take right now.
pub fn choice_pool(loadout: &Loadout, artifacts: &ArtifactSystem) -> Vec<LevelUpChoice> {
    let mut pool = Vec::new();

    for kind in WeaponKind::ALL {
        match loadout.get(kind) {
            None => pool.push(LevelUpChoice {
                id: format!("weapon_{}", kind.id()),
                kind: ChoiceKind::WeaponUnlock(kind),
                name: kind.display_name().to_string(),
                description: format!("Unlock {}.", kind.display_name()),
                rarity: unlock_rarity(kind),
            }),
            Some(weapon) if !weapon.is_max_level() => pool.push(LevelUpChoice {
                id: format!("upgrade_{}", kind.id()),
                kind: ChoiceKind::WeaponUpgrade(kind),
                name: format!("{} Lv.{}", kind.display_name(), weapon.level + 1),
                description: format!("Raise {} to level {}.", kind.display_name(), weapon.level + 1),
                rarity: Rarity::Common,
            }),
            Some(_) => {}
        }
    }

    for stat in StatKind::ALL {
        for rarity in [Rarity::Common, Rarity::Rare, Rarity::Epic] {
            let (name, description) = stat.describe(rarity);
            pool.push(LevelUpChoice {
                id: format!("stat_{}_{}", stat.id(), rarity_id(rarity)),
                kind: ChoiceKind::Stat(stat),
                name,
                description,
                rarity,
            });
        }
    }

    if !artifacts.is_full() {
        for id in PASSIVE_ARTIFACT_IDS.iter().copied().filter(|id| !artifacts.has(id)) {
            if let Some(data) = artifact_data(id) {
                pool.push(artifact_choice(id, data.name, data.description, Rarity::Epic));
            }
        }
        // Evolution artifacts only show up once a weapon is ready for them.
        for weapon in loadout.weapons.iter().filter(|w| !w.evolved && w.level >= EVOLUTION_LEVEL) {
            let Some(recipe) = recipe_for(weapon.kind) else {
                continue;
            };
            if artifacts.has(recipe.artifact) {
                continue;
            }
            if let Some(data) = EVOLUTION_ARTIFACTS.iter().find(|a| a.id == recipe.artifact) {
                pool.push(artifact_choice(data.id, data.name, data.description, Rarity::Legendary));
            }
        }
    }

    pool
}

fn artifact_choice(id: &'static str, name: &str, description: &str, rarity: Rarity) -> LevelUpChoice {
    LevelUpChoice {
        id: format!("artifact_{id}"),
        kind: ChoiceKind::Artifact(id),
        name: name.to_string(),
        description: description.to_string(),
        rarity,
    }
}

fn rarity_id(rarity: Rarity) -> &'static str {
    match rarity {
        Rarity::Common => "common",
        Rarity::Rare => "rare",
        Rarity::Epic => "epic",
        Rarity::Legendary => "legendary",
    }
}

/// Shuffle the pool and deal `count` distinct choices, padding with a heal.
pub fn generate_choices(loadout: &Loadout, artifacts: &ArtifactSystem, count: usize, rng: &mut impl Rng) -> Vec<LevelUpChoice> {
    let mut pool = choice_pool(loadout, artifacts);
    pool.shuffle(rng);
    pool.truncate(count);
    if pool.len() < count {
        pool.push(LevelUpChoice {
            id: "heal".to_string(),
            kind: ChoiceKind::Heal,
            name: "Rest".to_string(),
            description: format!("Recover {}% of max health.", (HEAL_CHOICE_FRACTION * 100.0).round()),
            rarity: Rarity::Common,
        });
    }
    pool
}

/// Apply a picked choice. False if it no longer applies (already owned, maxed, slots full).
pub fn apply_choice(choice: &LevelUpChoice, player: &mut Player, loadout: &mut Loadout, artifacts: &mut ArtifactSystem) -> bool {
    match &choice.kind {
        ChoiceKind::WeaponUnlock(kind) => loadout.add(*kind),
        ChoiceKind::WeaponUpgrade(kind) => loadout.upgrade(*kind),
        ChoiceKind::Stat(stat) => {
            apply_stat(*stat, stat.amount(choice.rarity), player);
            true
        }
        ChoiceKind::Artifact(id) => match create_artifact(id) {
            Some(artifact) => artifacts.add(artifact, player),
            None => {
                warn!("Unknown artifact in level-up choice: {}", id);
                false
            }
        },
        ChoiceKind::Heal => {
            player.heal(player.max_health * HEAL_CHOICE_FRACTION);
            true
        }
    }
}

fn apply_stat(stat: StatKind, amount: f32, player: &mut Player) {
    match stat {
        StatKind::Damage => player.damage_multiplier += amount,
        StatKind::Cooldown => player.cooldown_multiplier *= 1.0 - amount,
        StatKind::Health => {
            player.max_health += amount;
            player.health += amount;
        }
        StatKind::Speed => player.speed_multiplier += amount,
        StatKind::Pickup => player.pickup_multiplier += amount,
        StatKind::CritRate => player.add_critical_rate(amount),
        StatKind::CritDamage => player.critical_damage += amount,
        StatKind::DamageReduction => {
            player.damage_reduction = (player.damage_reduction + amount).min(MAX_DAMAGE_REDUCTION);
        }
        StatKind::Breathing => player.regen_rate = (player.regen_rate + amount).min(MAX_REGEN_RATE),
        StatKind::XpGain => player.xp_multiplier = (player.xp_multiplier + amount).min(MAX_XP_MULTIPLIER),
    }
}

/// Choices on screen plus level-ups still waiting their turn.
#[derive(Resource, Debug, Clone, Default)]
pub struct PendingChoices {
    pub choices: Vec<LevelUpChoice>,
    pub queued: u32,
}

impl PendingChoices {
    pub fn is_showing(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&LevelUpChoice> {
        self.choices.iter().find(|c| c.id == id)
    }

    pub fn clear(&mut self) {
        self.choices.clear();
        self.queued = 0;
    }

    /// Take the on-screen choice with `id`, apply it, and evolve any weapon it completes.
    /// `None` if no such choice is showing.
    pub fn select(
        &mut self,
        id: &str,
        player: &mut Player,
        loadout: &mut Loadout,
        artifacts: &mut ArtifactSystem,
    ) -> Option<LevelUpChoice> {
        let Some(index) = self.choices.iter().position(|c| c.id == id) else {
            warn!("Level-up choice {} is not on offer", id);
            return None;
        };
        let choice = self.choices.swap_remove(index);
        self.choices.clear();
        if !apply_choice(&choice, player, loadout, artifacts) {
            warn!("Level-up choice {} no longer applies", choice.id);
        }
        evolve(loadout, &artifacts.ids());
        Some(choice)
    }

    /// Deal the next queued level-up, if any. True when choices are now showing.
    pub fn deal_next(&mut self, loadout: &Loadout, artifacts: &ArtifactSystem, rng: &mut impl Rng) -> bool {
        if self.is_showing() {
            return true;
        }
        if self.queued == 0 {
            return false;
        }
        self.queued -= 1;
        self.choices = generate_choices(loadout, artifacts, CHOICES_PER_LEVEL, rng);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerBalance;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn player() -> Player {
        Player::new(&PlayerBalance::default(), Vec2::ZERO)
    }

    #[test]
    fn deals_three_distinct_choices() {
        let loadout = Loadout::starting();
        let artifacts = ArtifactSystem::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let choices = generate_choices(&loadout, &artifacts, CHOICES_PER_LEVEL, &mut rng);
            assert_eq!(choices.len(), 3);
            let ids: HashSet<_> = choices.iter().map(|c| c.id.clone()).collect();
            assert_eq!(ids.len(), 3);
        }
    }

    #[test]
    fn owned_weapons_are_upgrades_not_unlocks() {
        let pool = choice_pool(&Loadout::starting(), &ArtifactSystem::default());
        assert!(pool.iter().any(|c| c.kind == ChoiceKind::WeaponUpgrade(WeaponKind::Talisman)));
        assert!(!pool.iter().any(|c| c.kind == ChoiceKind::WeaponUnlock(WeaponKind::Talisman)));
        assert!(pool.iter().any(|c| c.kind == ChoiceKind::WeaponUnlock(WeaponKind::Moktak)));
    }

    #[test]
    fn evolution_artifact_offered_only_for_ready_weapon() {
        let mut loadout = Loadout::starting();
        let artifacts = ArtifactSystem::default();
        let has_mirror = |pool: &[LevelUpChoice]| pool.iter().any(|c| c.id == "artifact_fine_line_mirror");

        assert!(!has_mirror(&choice_pool(&loadout, &artifacts)));
        for _ in 1..EVOLUTION_LEVEL {
            loadout.upgrade(WeaponKind::Talisman);
        }
        let pool = choice_pool(&loadout, &artifacts);
        assert!(has_mirror(&pool));
        assert!(pool
            .iter()
            .filter(|c| c.rarity == Rarity::Legendary)
            .all(|c| matches!(c.kind, ChoiceKind::Artifact(_))));
    }

    #[test]
    fn stat_choice_changes_player() {
        let mut player = player();
        let mut loadout = Loadout::starting();
        let mut artifacts = ArtifactSystem::default();
        let pool = choice_pool(&loadout, &artifacts);
        let health = pool.iter().find(|c| c.id == "stat_health_rare").cloned();
        let cooldown = pool.iter().find(|c| c.id == "stat_cooldown_epic").cloned();

        assert!(apply_choice(&health.unwrap(), &mut player, &mut loadout, &mut artifacts));
        assert_eq!(player.max_health, 115.0);
        assert!(apply_choice(&cooldown.unwrap(), &mut player, &mut loadout, &mut artifacts));
        assert!((player.cooldown_multiplier - 0.9).abs() < 1e-6);
    }

    #[test]
    fn breathing_and_cultivation_choices_are_offered_and_capped() {
        let mut player = player();
        let mut loadout = Loadout::starting();
        let mut artifacts = ArtifactSystem::default();
        let pool = choice_pool(&loadout, &artifacts);
        let breathing = pool.iter().find(|c| c.id == "stat_breathing_epic").cloned().unwrap();
        let xp = pool.iter().find(|c| c.id == "stat_xp_gain_rare").cloned().unwrap();

        assert!(apply_choice(&breathing, &mut player, &mut loadout, &mut artifacts));
        assert!((player.regen_rate - 0.025).abs() < 1e-6);
        assert!(apply_choice(&xp, &mut player, &mut loadout, &mut artifacts));
        assert!((player.xp_multiplier - 1.12).abs() < 1e-6);

        for _ in 0..10 {
            apply_choice(&breathing, &mut player, &mut loadout, &mut artifacts);
        }
        assert_eq!(player.regen_rate, MAX_REGEN_RATE);
    }

    #[test]
    fn weapon_and_artifact_choices_apply_once() {
        let mut player = player();
        let mut loadout = Loadout::starting();
        let mut artifacts = ArtifactSystem::default();
        let pool = choice_pool(&loadout, &artifacts);
        let moktak = pool.iter().find(|c| c.id == "weapon_moktak").cloned().unwrap();
        let chuksal = pool.iter().find(|c| c.id == "artifact_chuksal").cloned().unwrap();

        assert!(apply_choice(&moktak, &mut player, &mut loadout, &mut artifacts));
        assert!(!apply_choice(&moktak, &mut player, &mut loadout, &mut artifacts));
        assert!(apply_choice(&chuksal, &mut player, &mut loadout, &mut artifacts));
        assert!(!apply_choice(&chuksal, &mut player, &mut loadout, &mut artifacts));
        assert!(loadout.has(WeaponKind::Moktak));
        assert!(artifacts.has("chuksal"));
    }
}
