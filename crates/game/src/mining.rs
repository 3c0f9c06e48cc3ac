//! Mining: reach, radius and damage curves, block damage and resource yields.

use audio::SoundCue;
use engine_core::{ObjectId, ObjectKind, ResourceKind, Upgrades};
use glam::Vec2;
use physics::SpatialStore;
use rand::Rng;

use crate::effects::{Burst, Effects};
use crate::events::{ResourceGrant, TickOutput};

pub const BASE_REACH: f32 = 90.0;
pub const REACH_PER_LEVEL: f32 = 0.25;
pub const BASE_RADIUS: f32 = 12.0;
pub const RADIUS_GROWTH: f32 = 1.2;
pub const BASE_DAMAGE: f32 = 1.0;
pub const DAMAGE_GROWTH: f32 = 1.25;
/// Minimum ticks between clank sounds against unbreakable rock.
pub const CLANK_COOLDOWN: u32 = 12;
/// Minimum ticks between mining hit sounds.
pub const HIT_SOUND_COOLDOWN: u32 = 6;
pub const LIVING_METAL_SCRAP_CHANCE: f64 = 0.3;
pub const INFECTED_METAL_INFECTION: f32 = 3.0;

pub fn reach(upgrades: &Upgrades) -> f32 {
    BASE_REACH * (1.0 + REACH_PER_LEVEL * upgrades.mining_reach as f32)
}

pub fn radius(upgrades: &Upgrades) -> f32 {
    BASE_RADIUS * RADIUS_GROWTH.powi(upgrades.mining_radius as i32)
}

pub fn damage(upgrades: &Upgrades) -> f32 {
    let level = upgrades.mining_speed.max(1);
    BASE_DAMAGE * DAMAGE_GROWTH.powi(level as i32 - 1)
}

/// What breaking a block of `kind` covering `cells` terrain cells yields.
pub fn yield_for<R: Rng>(kind: ResourceKind, cells: u32, rng: &mut R) -> ResourceGrant {
    let (resource, infection) = match kind {
        ResourceKind::LivingMetal => {
            let scrap = rng.gen_bool(LIVING_METAL_SCRAP_CHANCE);
            (scrap.then_some((ResourceKind::Scrap, 1)), 0.0)
        }
        ResourceKind::InfectedMetal => (Some((ResourceKind::RareSlime, 1)), INFECTED_METAL_INFECTION),
        ore => (Some((ore, cells.max(1))), 0.0),
    };
    ResourceGrant {
        block: kind,
        resource,
        infection,
    }
}

/// A block that reached zero health this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrokenBlock {
    pub id: ObjectId,
    pub center: Vec2,
    pub grant: ResourceGrant,
}

/// Everything one mining tick touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Strike {
    pub hit_solid: bool,
    /// Centres and materials of damaged blocks that survived.
    pub damaged: Vec<(Vec2, ResourceKind)>,
    pub broken: Vec<BrokenBlock>,
}

/// Mining state carried between ticks: sound rate limits.
#[derive(Debug, Default)]
pub struct MiningTool {
    clank_cooldown: u32,
    hit_cooldown: u32,
}

impl MiningTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn cool_down(&mut self) {
        self.clank_cooldown = self.clank_cooldown.saturating_sub(1);
        self.hit_cooldown = self.hit_cooldown.saturating_sub(1);
    }

    /// Damage everything within the mining radius of `target`. Nothing
    /// happens when `target` is beyond reach of `origin`.
    pub fn strike<R: Rng>(
        &self,
        store: &mut SpatialStore,
        origin: Vec2,
        target: Vec2,
        upgrades: &Upgrades,
        rng: &mut R,
    ) -> Strike {
        let mut strike = Strike::default();
        if origin.distance(target) > reach(upgrades) {
            return strike;
        }

        let radius = radius(upgrades);
        let damage = damage(upgrades);
        let area = engine_core::Rect::from_center(target, Vec2::splat(radius * 2.0));
        let hits: Vec<ObjectId> = store
            .query_region(&area)
            .into_iter()
            .filter(|o| {
                o.kind.blocks_movement() && o.center().distance(target) <= radius + o.rect.w * 0.5
            })
            .map(|o| o.id)
            .collect();

        for id in hits {
            let Some(obj) = store.get_mut(id) else {
                continue;
            };
            if obj.kind == ObjectKind::Solid {
                strike.hit_solid = true;
                continue;
            }
            let kind = obj.resource_kind.unwrap_or(ResourceKind::LivingMetal);
            let Some(health) = obj.health.as_mut() else {
                continue;
            };
            health.take_damage(damage);
            if !health.is_dead() {
                strike.damaged.push((obj.center(), kind));
                continue;
            }

            if let Some(removed) = store.remove(id) {
                log::debug!("Broke {} block {:?}", kind.name(), id);
                strike.broken.push(BrokenBlock {
                    id,
                    center: removed.center(),
                    grant: yield_for(kind, removed.cell_count(), rng),
                });
            }
        }
        strike
    }

    /// Turn a strike into grants, sounds and particles. Returns the screen
    /// shake it asks for as `(intensity, ticks)`.
    pub fn feedback<R: Rng>(
        &mut self,
        strike: &Strike,
        effects: &mut Effects,
        rng: &mut R,
        out: &mut TickOutput,
    ) -> Option<(f32, u32)> {
        if strike.hit_solid && self.clank_cooldown == 0 {
            out.sound(SoundCue::Clank);
            self.clank_cooldown = CLANK_COOLDOWN;
        }

        if !strike.damaged.is_empty() && self.hit_cooldown == 0 {
            out.sound(SoundCue::MineHit);
            self.hit_cooldown = HIT_SOUND_COOLDOWN;
        }
        for (center, kind) in &strike.damaged {
            effects.burst(rng, *center, Burst::hit(kind.color()));
        }

        let mut shake: Option<(f32, u32)> = None;
        for broken in &strike.broken {
            let block = broken.grant.block;
            let rarity = block.rarity();
            effects.burst(rng, broken.center, Burst::shatter(block.color()));
            if let Some((kind, amount)) = broken.grant.resource {
                effects.text(format!("+{amount} {}", kind.name()), broken.center, rarity_color(kind.rarity()));
            }
            out.sound(if rarity >= 2 {
                SoundCue::RareBreak
            } else {
                SoundCue::BlockBreak
            });
            out.grant(broken.grant);

            let wanted = (1.5 + 2.0 * rarity as f32, 6 + 4 * rarity as u32);
            shake = Some(match shake {
                Some((i, t)) => (i.max(wanted.0), t.max(wanted.1)),
                None => wanted,
            });
        }
        shake
    }
}

/// Floating text colour by rarity tier.
pub fn rarity_color(rarity: u8) -> [f32; 4] {
    match rarity {
        0 => [0.9, 0.9, 0.9, 1.0],
        1 => [0.45, 0.8, 1.0, 1.0],
        2 => [0.85, 0.45, 1.0, 1.0],
        _ => [1.0, 0.8, 0.2, 1.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{Rect, WorldObject, BLOCK_SIZE};
    use rand::{rngs::StdRng, SeedableRng};

    fn scrap_store() -> SpatialStore {
        let mut store = SpatialStore::new();
        store.insert(WorldObject::destructible(
            ObjectId(1),
            Rect::new(100.0, 100.0, BLOCK_SIZE, BLOCK_SIZE),
            ResourceKind::Scrap,
            40.0,
        ));
        store
    }

    #[test]
    fn curves_match_levels() {
        let base = Upgrades::default();
        assert_eq!(reach(&base), 90.0);
        assert_eq!(radius(&base), 12.0);
        assert_eq!(damage(&base), 1.0);
        let up = Upgrades {
            mining_speed: 3,
            mining_radius: 2,
            mining_reach: 4,
            ..Default::default()
        };
        assert_eq!(reach(&up), 180.0);
        assert!((radius(&up) - 17.28).abs() < 1e-4);
        assert!((damage(&up) - 1.5625).abs() < 1e-6);
    }

    #[test]
    fn scrap_breaks_on_fortieth_strike() {
        let mut store = scrap_store();
        let mut rng = StdRng::seed_from_u64(4);
        let tool = MiningTool::new();
        let target = Vec2::new(110.0, 110.0);
        let origin = Vec2::new(60.0, 110.0);
        for strike_no in 1..=40 {
            let strike = tool.strike(&mut store, origin, target, &Upgrades::default(), &mut rng);
            if strike_no < 40 {
                assert!(strike.broken.is_empty(), "broke early at {strike_no}");
            } else {
                assert_eq!(strike.broken.len(), 1);
                assert_eq!(strike.broken[0].grant.resource, Some((ResourceKind::Scrap, 1)));
            }
        }
        assert!(store.is_empty());
    }

    #[test]
    fn out_of_reach_does_nothing() {
        let mut store = scrap_store();
        let mut rng = StdRng::seed_from_u64(5);
        let strike = MiningTool::new().strike(
            &mut store,
            Vec2::new(300.0, 110.0),
            Vec2::new(110.0, 110.0),
            &Upgrades::default(),
            &mut rng,
        );
        assert_eq!(strike, Strike::default());
        let health = store.get(ObjectId(1)).and_then(|o| o.health).map(|h| h.current);
        assert_eq!(health, Some(40.0));
    }

    #[test]
    fn solid_rock_clanks_without_damage() {
        let mut store = SpatialStore::new();
        store.insert(WorldObject::solid(ObjectId(7), Rect::new(100.0, 100.0, 20.0, 20.0)));
        let mut rng = StdRng::seed_from_u64(6);
        let mut tool = MiningTool::new();
        let mut fx = Effects::new();
        let mut clanks = 0;
        for _ in 0..24 {
            let strike = tool.strike(&mut store, Vec2::new(80.0, 110.0), Vec2::new(110.0, 110.0), &Upgrades::default(), &mut rng);
            assert!(strike.hit_solid);
            let mut out = TickOutput::default();
            tool.feedback(&strike, &mut fx, &mut rng, &mut out);
            clanks += out.count(|e| *e == crate::events::SimEvent::Sound(SoundCue::Clank));
            tool.cool_down();
        }
        assert_eq!(clanks, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn yields_by_material() {
        let mut rng = StdRng::seed_from_u64(7);
        let infected = yield_for(ResourceKind::InfectedMetal, 1, &mut rng);
        assert_eq!(infected.resource, Some((ResourceKind::RareSlime, 1)));
        assert_eq!(infected.infection, INFECTED_METAL_INFECTION);
        assert_eq!(yield_for(ResourceKind::Iron, 16, &mut rng).resource, Some((ResourceKind::Iron, 16)));

        let scrap = (0..1000)
            .filter(|_| yield_for(ResourceKind::LivingMetal, 4, &mut rng).resource.is_some())
            .count();
        assert!((200..400).contains(&scrap), "living metal scrap rate {scrap}");
    }
}
