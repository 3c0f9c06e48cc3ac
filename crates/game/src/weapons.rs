//! Weapon kinds and the projectiles they spawn.
//!
//! Projectiles are hecs entities carrying [`Position`], [`Velocity`],
//! [`Lifetime`] and [`Projectile`]. Nothing is hit: no enemies are modelled,
//! so firing is presentation plus a resource cost.

use audio::SoundCue;
use engine_core::{Lifetime, Position, ResourceKind, Velocity};
use glam::Vec2;
use hecs::World;
use rand::Rng;

use crate::effects::{Burst, Effects};
use crate::events::{SimEvent, TickOutput};
use crate::stats::PlayerStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    /// Short swipe in front of the player.
    Melee,
    /// Slow expanding pulse. Burns coal.
    Area,
    /// Fast thin beam. Burns uranium.
    Beam,
}

/// Fixed per-kind weapon numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub cooldown: u32,
    pub speed: f32,
    pub lifetime: u32,
    pub size: f32,
    pub color: [f32; 4],
    pub cost: Option<(ResourceKind, u32)>,
    pub trail: bool,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Melee, WeaponKind::Area, WeaponKind::Beam];

    pub fn stats(self) -> WeaponStats {
        match self {
            WeaponKind::Melee => WeaponStats {
                cooldown: 20,
                speed: 4.0,
                lifetime: 8,
                size: 18.0,
                color: [0.9, 0.9, 1.0, 0.8],
                cost: None,
                trail: false,
            },
            WeaponKind::Area => WeaponStats {
                cooldown: 45,
                speed: 2.5,
                lifetime: 40,
                size: 26.0,
                color: [1.0, 0.55, 0.15, 0.7],
                cost: Some((ResourceKind::Coal, 1)),
                trail: true,
            },
            WeaponKind::Beam => WeaponStats {
                cooldown: 30,
                speed: 12.0,
                lifetime: 30,
                size: 6.0,
                color: [0.4, 1.0, 0.4, 0.9],
                cost: Some((ResourceKind::Uranium, 1)),
                trail: true,
            },
        }
    }

    pub fn cue(self) -> SoundCue {
        match self {
            WeaponKind::Melee => SoundCue::Melee,
            WeaponKind::Area => SoundCue::AreaPulse,
            WeaponKind::Beam => SoundCue::Beam,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Melee => "Melee",
            WeaponKind::Area => "Pulse",
            WeaponKind::Beam => "Beam",
        }
    }
}

/// Projectile component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub kind: WeaponKind,
    pub size: f32,
}

/// Fire cooldown and projectile upkeep.
#[derive(Debug, Default)]
pub struct WeaponSystem {
    cooldown: u32,
}

impl WeaponSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn reset(&mut self) {
        self.cooldown = 0;
    }

    /// Try to fire `kind` from `origin` toward `direction`. Returns whether a
    /// projectile was spawned.
    pub fn try_fire(
        &mut self,
        world: &mut World,
        kind: WeaponKind,
        origin: Vec2,
        direction: Vec2,
        stats: &PlayerStats,
        out: &mut TickOutput,
    ) -> bool {
        if self.cooldown > 0 {
            return false;
        }
        let profile = kind.stats();
        if let Some((resource, amount)) = profile.cost {
            if !stats.can_afford(resource, amount) {
                self.cooldown = profile.cooldown;
                out.push(SimEvent::CannotAfford(resource));
                return false;
            }
            out.deltas.resources[resource] -= amount as i32;
        }

        let dir = direction.try_normalize().unwrap_or(Vec2::X);
        world.spawn((
            Position(origin),
            Velocity::new(dir * profile.speed),
            Lifetime::new(profile.lifetime),
            Projectile {
                kind,
                size: profile.size,
            },
        ));
        self.cooldown = profile.cooldown;
        out.push(SimEvent::WeaponFired(kind));
        out.sound(kind.cue());
        log::debug!("Fired {:?} toward {:?}", kind, dir);
        true
    }

    /// Advance cooldown and every projectile by one tick. Projectiles are
    /// despawned when their lifetime runs out or they leave `[0, world_width]`.
    pub fn update<R: Rng>(
        &mut self,
        world: &mut World,
        world_width: f32,
        effects: &mut Effects,
        rng: &mut R,
    ) {
        self.cooldown = self.cooldown.saturating_sub(1);

        let mut expired = Vec::new();
        let mut trails = Vec::new();
        for (entity, (pos, vel, life, proj)) in
            world.query_mut::<(&mut Position, &Velocity, &mut Lifetime, &mut Projectile)>()
        {
            pos.0 += vel.linear;
            if proj.kind == WeaponKind::Area {
                proj.size += 1.0;
            }
            let profile = proj.kind.stats();
            if profile.trail {
                trails.push((pos.0, profile.color));
            }
            if life.update() || pos.0.x < 0.0 || pos.0.x > world_width {
                expired.push(entity);
            }
        }

        for (at, color) in trails {
            effects.burst(rng, at, Burst::trail(color));
        }
        for entity in expired {
            world.despawn(entity).ok();
        }
    }
}
