//! Oxygen, infection and health upkeep.
//!
//! Everything runs on integer tick counters checked against fixed intervals,
//! never wall-clock time.

use engine_core::{ObjectKind, Stage, StationKind};
use glam::Vec2;
use physics::SpatialStore;

use crate::events::{DamageCause, TickOutput};
use crate::stats::{PlayerStats, MAX_INFECTION};

pub const OXYGEN_DRAIN: f32 = 0.02;
pub const SUFFOCATION_DAMAGE: f32 = 5.0;
pub const SUFFOCATION_INTERVAL: u32 = 60;
pub const SUFFOCATION_INFECTION_INTERVAL: u32 = 120;
pub const INFECTION_DAMAGE: f32 = 2.0;
pub const INFECTION_DAMAGE_INTERVAL: u32 = 60;
pub const HAZARD_DAMAGE: f32 = 3.0;
pub const HAZARD_INTERVAL: u32 = 30;
pub const BASE_OXYGEN_REFILL: f32 = 1.0;
pub const CLEANSE_INTERVAL: u32 = 30;
pub const DECON_CLEANSE_INTERVAL: u32 = 6;
pub const HEAL_INTERVAL: u32 = 45;
/// Stations closer than this (centre to centre) boost regeneration.
pub const STATION_RANGE: f32 = 80.0;

/// Oxygen lost per tick outside the base.
pub fn oxygen_drain(oxygen_capacity: u32) -> f32 {
    OXYGEN_DRAIN / (1.0 + 0.5 * oxygen_capacity as f32)
}

/// Count one tick on `counter`; true (and reset) once it reaches `interval`.
fn every(counter: &mut u32, interval: u32) -> bool {
    *counter += 1;
    if *counter >= interval {
        *counter = 0;
        true
    } else {
        false
    }
}

/// Where the player is, as far as vitals care.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Surroundings {
    pub in_hazard: bool,
    pub near_decontamination: bool,
    pub near_med_bay: bool,
}

impl Surroundings {
    pub fn scan(store: &SpatialStore, player_center: Vec2, in_hazard: bool) -> Self {
        let area = engine_core::Rect::from_center(player_center, Vec2::splat(STATION_RANGE * 2.0));
        let mut near = Self {
            in_hazard,
            ..Default::default()
        };
        for obj in store.query_region(&area) {
            if obj.center().distance(player_center) > STATION_RANGE {
                continue;
            }
            match obj.kind {
                ObjectKind::Station(StationKind::DecontaminationUnit) => near.near_decontamination = true,
                ObjectKind::Station(StationKind::MedBay) => near.near_med_bay = true,
                _ => {}
            }
        }
        near
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vitals {
    suffocation_ticks: u32,
    suffocation_infection_ticks: u32,
    infection_damage_ticks: u32,
    hazard_ticks: u32,
    cleanse_ticks: u32,
    heal_ticks: u32,
}

impl Vitals {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn update(
        &mut self,
        stage: Stage,
        stats: &PlayerStats,
        around: &Surroundings,
        out: &mut TickOutput,
    ) {
        if stage.drains_oxygen() {
            self.cleanse_ticks = 0;
            self.heal_ticks = 0;
            if stats.oxygen > 0.0 {
                out.deltas.oxygen -= oxygen_drain(stats.upgrades.oxygen_capacity);
                self.suffocation_ticks = 0;
                self.suffocation_infection_ticks = 0;
            } else {
                if every(&mut self.suffocation_ticks, SUFFOCATION_INTERVAL) {
                    out.hurt(SUFFOCATION_DAMAGE, DamageCause::Suffocation);
                }
                if every(&mut self.suffocation_infection_ticks, SUFFOCATION_INFECTION_INTERVAL) {
                    out.deltas.infection += 1.0;
                }
            }
        } else {
            self.suffocation_ticks = 0;
            self.suffocation_infection_ticks = 0;
            out.deltas.oxygen += BASE_OXYGEN_REFILL.min(stats.max_oxygen - stats.oxygen).max(0.0);

            let cleanse = if around.near_decontamination {
                DECON_CLEANSE_INTERVAL
            } else {
                CLEANSE_INTERVAL
            };
            if stats.infection > 0.0 && every(&mut self.cleanse_ticks, cleanse) {
                out.deltas.infection -= 1.0;
            }

            let heal = if around.near_med_bay {
                HEAL_INTERVAL / 2
            } else {
                HEAL_INTERVAL
            };
            if stats.health < stats.max_health && every(&mut self.heal_ticks, heal) {
                out.deltas.health += 1.0;
            }
        }

        if stats.infection >= MAX_INFECTION {
            if every(&mut self.infection_damage_ticks, INFECTION_DAMAGE_INTERVAL) {
                out.hurt(INFECTION_DAMAGE, DamageCause::Infection);
            }
        } else {
            self.infection_damage_ticks = 0;
        }

        if around.in_hazard {
            if every(&mut self.hazard_ticks, HAZARD_INTERVAL) {
                out.hurt(HAZARD_DAMAGE, DamageCause::Hazard);
            }
        } else {
            self.hazard_ticks = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SimEvent;

    fn hurt_count(out: &TickOutput) -> usize {
        out.count(|e| matches!(e, SimEvent::PlayerHurt { .. }))
    }

    #[test]
    fn zero_oxygen_hurts_exactly_once_in_sixty_ticks() {
        let stats = PlayerStats {
            oxygen: 0.0,
            ..Default::default()
        };
        let mut vitals = Vitals::default();
        let mut hurts = Vec::new();
        for tick in 1..=60 {
            let mut out = TickOutput::default();
            vitals.update(Stage::Mine, &stats, &Surroundings::default(), &mut out);
            if hurt_count(&out) > 0 {
                hurts.push(tick);
            }
        }
        assert_eq!(hurts, vec![60]);
    }

    #[test]
    fn oxygen_capacity_slows_drain() {
        assert_eq!(oxygen_drain(0), 0.02);
        assert!((oxygen_drain(2) - 0.01).abs() < 1e-7);
    }

    #[test]
    fn base_refills_and_cleanses_faster_near_decon() {
        let stats = PlayerStats {
            oxygen: 99.5,
            infection: 50.0,
            ..Default::default()
        };
        let mut vitals = Vitals::default();
        let near = Surroundings {
            near_decontamination: true,
            ..Default::default()
        };
        let mut total = TickOutput::default();
        for _ in 0..30 {
            let mut out = TickOutput::default();
            vitals.update(Stage::Base, &stats, &near, &mut out);
            total.merge(out);
        }
        assert!((total.deltas.oxygen - 0.5 * 30.0).abs() < 1e-4);
        assert_eq!(total.deltas.infection, -5.0);
    }

    #[test]
    fn hazard_counter_resets_on_leaving() {
        let stats = PlayerStats::default();
        let mut vitals = Vitals::default();
        let inside = Surroundings {
            in_hazard: true,
            ..Default::default()
        };
        let mut hurts = 0;
        for tick in 0..59 {
            let around = if tick == 29 { Surroundings::default() } else { inside };
            let mut out = TickOutput::default();
            vitals.update(Stage::Outside, &stats, &around, &mut out);
            hurts += hurt_count(&out);
        }
        // 29 ticks in, one out, 29 in: never reaches 30 in a row.
        assert_eq!(hurts, 0);
    }

    #[test]
    fn full_infection_hurts_anywhere() {
        let stats = PlayerStats {
            infection: MAX_INFECTION,
            ..Default::default()
        };
        let mut vitals = Vitals::default();
        let mut total = TickOutput::default();
        for _ in 0..120 {
            let mut out = TickOutput::default();
            vitals.update(Stage::Base, &stats, &Surroundings::default(), &mut out);
            total.merge(out);
        }
        assert_eq!(hurt_count(&total), 2);
    }

    #[test]
    fn suffocation_adds_infection_every_hundred_twenty_ticks() {
        let stats = PlayerStats {
            oxygen: 0.0,
            ..Default::default()
        };
        let mut vitals = Vitals::default();
        let mut total = TickOutput::default();
        for _ in 0..240 {
            let mut out = TickOutput::default();
            vitals.update(Stage::Mine, &stats, &Surroundings::default(), &mut out);
            total.merge(out);
        }
        assert_eq!(total.deltas.infection, 2.0);
    }

    fn heal_ticks(around: Surroundings) -> Vec<u32> {
        let stats = PlayerStats {
            health: 50.0,
            ..Default::default()
        };
        let mut vitals = Vitals::default();
        let mut healed = Vec::new();
        for tick in 1..=HEAL_INTERVAL {
            let mut out = TickOutput::default();
            vitals.update(Stage::Base, &stats, &around, &mut out);
            if out.deltas.health > 0.0 {
                healed.push(tick);
            }
        }
        healed
    }

    #[test]
    fn heal_interval_halves_near_med_bay() {
        assert_eq!(heal_ticks(Surroundings::default()), vec![45]);
        let near = Surroundings {
            near_med_bay: true,
            ..Default::default()
        };
        assert_eq!(heal_ticks(near), vec![22, 44]);
    }
}
