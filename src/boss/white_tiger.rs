//! The White Tiger's attack patterns.

use bevy::prelude::*;

use super::components::{BossBalance, BossIntent};
use crate::combat::KnockbackBalance;
use crate::enemies::Enemy;
use crate::world::direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashState {
    #[default]
    Idle,
    /// Standing still behind the warning line.
    Warning,
    Dashing,
    Recovery,
}

/// Pattern timers for one White Tiger. Moves the boss and queues intents; never touches the player.
#[derive(Debug, Clone, Default)]
pub struct WhiteTiger {
    bullet_timer: f32,
    dash_timer: f32,
    stomp_timer: f32,
    fireball_timer: f32,
    /// Time left on a fireball wind-up.
    charge_remaining: Option<f32>,
    dash_state: DashState,
    dash_state_timer: f32,
    dash_direction: Vec2,
    trail_timer: f32,
}

impl WhiteTiger {
    pub fn dash_state(&self) -> DashState {
        self.dash_state
    }

    /// Dash contact damage only applies mid-dash.
    pub fn is_dashing(&self) -> bool {
        self.dash_state == DashState::Dashing
    }

    pub fn is_charging(&self) -> bool {
        self.charge_remaining.is_some()
    }

    pub fn is_enraged(boss: &Enemy, balance: &BossBalance) -> bool {
        boss.health_fraction() <= balance.enrage_threshold
    }

    pub fn update(
        &mut self,
        boss: &mut Enemy,
        target: Vec2,
        delta: f32,
        balance: &BossBalance,
        knockback: &KnockbackBalance,
        intents: &mut Vec<BossIntent>,
    ) {
        if !boss.active || !boss.is_alive() {
            return;
        }
        boss.tick_timers(delta);
        boss.target = Some(target);

        if boss.update_knockback(delta, knockback) {
            return;
        }
        if self.dash_state != DashState::Idle {
            self.update_dash(boss, delta, balance, intents);
            return;
        }

        boss.chase(delta);
        let enraged = Self::is_enraged(boss, balance);

        self.bullet_timer += delta;
        if self.bullet_timer >= balance.bullet_cooldown {
            self.bullet_timer = 0.0;
            let (count, speed) = if enraged {
                (balance.enraged_bullet_count, balance.enraged_bullet_speed)
            } else {
                (balance.bullet_count, balance.bullet_speed)
            };
            intents.push(BossIntent::Barrage {
                origin: boss.position,
                count,
                speed,
            });
        }

        self.dash_timer += delta;
        let dash_cooldown = if enraged { balance.enraged_dash_cooldown } else { balance.dash_cooldown };
        if self.dash_timer >= dash_cooldown {
            self.dash_timer = 0.0;
            self.start_dash(boss.position, target, intents);
        }

        if !enraged {
            return;
        }

        self.stomp_timer += delta;
        if self.stomp_timer >= balance.stomp_cooldown {
            self.stomp_timer = 0.0;
            intents.push(BossIntent::Stomp { center: target });
        }

        match self.charge_remaining {
            Some(remaining) if remaining - delta > 0.0 => {
                self.charge_remaining = Some(remaining - delta);
            }
            Some(_) => {
                self.charge_remaining = None;
                let aim = direction(boss.position, target);
                if aim != Vec2::ZERO {
                    intents.push(BossIntent::Fireball {
                        origin: boss.position,
                        direction: aim,
                    });
                }
            }
            None => {
                self.fireball_timer += delta;
                if self.fireball_timer >= balance.fireball_cooldown {
                    self.fireball_timer = 0.0;
                    self.charge_remaining = Some(balance.charge_duration);
                    intents.push(BossIntent::ChargeStarted);
                }
            }
        }
    }

    fn start_dash(&mut self, from: Vec2, target: Vec2, intents: &mut Vec<BossIntent>) {
        let aim = direction(from, target);
        if aim == Vec2::ZERO {
            return;
        }
        self.dash_direction = aim;
        self.dash_state = DashState::Warning;
        self.dash_state_timer = 0.0;
        intents.push(BossIntent::WarningLine {
            origin: from,
            direction: aim,
        });
    }

    fn update_dash(&mut self, boss: &mut Enemy, delta: f32, balance: &BossBalance, intents: &mut Vec<BossIntent>) {
        self.dash_state_timer += delta;
        match self.dash_state {
            DashState::Idle => {}
            DashState::Warning => {
                if self.dash_state_timer >= balance.dash_warning {
                    self.dash_state = DashState::Dashing;
                    self.dash_state_timer = 0.0;
                    self.trail_timer = 0.0;
                }
            }
            DashState::Dashing => {
                boss.position += self.dash_direction * balance.dash_speed * delta;
                self.trail_timer += delta;
                if self.trail_timer >= balance.trail_interval {
                    self.trail_timer = 0.0;
                    intents.push(BossIntent::LightningTrail {
                        position: boss.position,
                        rotation: self.dash_direction.y.atan2(self.dash_direction.x),
                    });
                }
                if self.dash_state_timer >= balance.dash_duration {
                    self.dash_state = DashState::Recovery;
                    self.dash_state_timer = 0.0;
                }
            }
            DashState::Recovery => {
                if self.dash_state_timer >= balance.dash_recovery {
                    self.dash_state = DashState::Idle;
                    self.dash_state_timer = 0.0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::{EnemyTier, TierStatsTable};

    fn tiger_at(pos: Vec2) -> Enemy {
        Enemy::new("boss_white_tiger", "white_tiger", EnemyTier::Boss, pos, &TierStatsTable::default().boss)
    }

    fn run(tiger: &mut WhiteTiger, boss: &mut Enemy, target: Vec2, seconds: f32, step: f32) -> Vec<BossIntent> {
        let balance = BossBalance::default();
        let knockback = KnockbackBalance::default();
        let mut intents = Vec::new();
        let mut elapsed = 0.0;
        while elapsed < seconds {
            tiger.update(boss, target, step, &balance, &knockback, &mut intents);
            elapsed += step;
        }
        intents
    }

    #[test]
    fn barrage_every_three_seconds() {
        let mut tiger = WhiteTiger::default();
        let mut boss = tiger_at(Vec2::ZERO);
        let intents = run(&mut tiger, &mut boss, Vec2::new(2000.0, 0.0), 3.05, 0.05);
        let barrages: Vec<_> = intents.iter().filter(|i| matches!(i, BossIntent::Barrage { .. })).collect();
        assert_eq!(barrages.len(), 1);
        assert!(matches!(barrages[0], BossIntent::Barrage { count: 8, .. }));
    }

    #[test]
    fn enraged_barrage_is_denser() {
        let mut tiger = WhiteTiger::default();
        let mut boss = tiger_at(Vec2::ZERO);
        boss.health = boss.max_health * 0.4;
        let intents = run(&mut tiger, &mut boss, Vec2::new(2000.0, 0.0), 3.05, 0.05);
        assert!(intents.iter().any(|i| matches!(i, BossIntent::Barrage { count: 12, .. })));
    }

    #[test]
    fn dash_telegraphs_then_charges_along_the_line() {
        let mut tiger = WhiteTiger::default();
        let mut boss = tiger_at(Vec2::ZERO);
        let target = Vec2::new(5000.0, 0.0);
        let intents = run(&mut tiger, &mut boss, target, 6.0, 0.05);
        assert!(intents.iter().any(|i| matches!(i, BossIntent::WarningLine { .. })));
        assert_eq!(tiger.dash_state(), DashState::Warning);

        let before = boss.position.x;
        run(&mut tiger, &mut boss, target, 1.5, 0.05);
        assert!(tiger.is_dashing());
        let intents = run(&mut tiger, &mut boss, target, 0.4, 0.05);
        assert!(boss.position.x - before > 250.0);
        assert!(intents.iter().any(|i| matches!(i, BossIntent::LightningTrail { .. })));
    }

    #[test]
    fn stomp_and_fireball_only_when_enraged() {
        let mut calm = WhiteTiger::default();
        let mut boss = tiger_at(Vec2::ZERO);
        let intents = run(&mut calm, &mut boss, Vec2::new(0.0, 3000.0), 12.0, 0.05);
        assert!(!intents.iter().any(|i| matches!(i, BossIntent::Stomp { .. } | BossIntent::ChargeStarted)));

        let mut enraged = WhiteTiger::default();
        let mut boss = tiger_at(Vec2::ZERO);
        boss.health = boss.max_health * 0.3;
        let intents = run(&mut enraged, &mut boss, Vec2::new(0.0, 3000.0), 25.0, 0.05);
        assert!(intents.iter().any(|i| matches!(i, BossIntent::Stomp { .. })));
        assert!(intents.iter().any(|i| matches!(i, BossIntent::ChargeStarted)));
        assert!(intents.iter().any(|i| matches!(i, BossIntent::Fireball { .. })));
    }

    #[test]
    fn dead_boss_does_nothing() {
        let mut tiger = WhiteTiger::default();
        let mut boss = tiger_at(Vec2::ZERO);
        boss.health = 0.0;
        let intents = run(&mut tiger, &mut boss, Vec2::new(100.0, 0.0), 10.0, 0.1);
        assert!(intents.is_empty());
        assert_eq!(boss.position, Vec2::ZERO);
    }
}
