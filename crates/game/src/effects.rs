//! Particle and floating text pools. Both count down in ticks and are pruned at zero.

use glam::Vec2;
use rand::Rng;

/// Pool cap; new particles are dropped beyond it.
pub const MAX_PARTICLES: usize = 800;
const PARTICLE_GRAVITY: f32 = 0.15;
const TEXT_RISE: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
    pub color: [f32; 4],
    /// 0 for weightless trail sparks.
    pub weight: f32,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            return 0.0;
        }
        self.life as f32 / self.max_life as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingText {
    pub text: String,
    pub position: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub color: [f32; 4],
}

impl FloatingText {
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            return 0.0;
        }
        self.life as f32 / self.max_life as f32
    }
}

/// Shape of a burst of particles.
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub count: usize,
    pub speed: f32,
    pub life: u32,
    pub size: f32,
    pub color: [f32; 4],
    pub weight: f32,
}

impl Burst {
    /// Chips flying off a block being mined.
    pub fn hit(color: [f32; 4]) -> Self {
        Self {
            count: 3,
            speed: 1.5,
            life: 18,
            size: 2.0,
            color,
            weight: 1.0,
        }
    }

    /// Debris from a broken block.
    pub fn shatter(color: [f32; 4]) -> Self {
        Self {
            count: 14,
            speed: 3.0,
            life: 32,
            size: 3.0,
            color,
            weight: 1.0,
        }
    }

    /// Weightless trail behind a projectile.
    pub fn trail(color: [f32; 4]) -> Self {
        Self {
            count: 1,
            speed: 0.3,
            life: 12,
            size: 2.0,
            color,
            weight: 0.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.texts.clear();
    }

    pub fn burst<R: Rng>(&mut self, rng: &mut R, at: Vec2, burst: Burst) {
        let room = MAX_PARTICLES.saturating_sub(self.particles.len());
        for _ in 0..burst.count.min(room) {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = burst.speed * rng.gen_range(0.4..=1.0);
            self.particles.push(Particle {
                position: at,
                velocity: Vec2::from_angle(angle) * speed,
                life: burst.life,
                max_life: burst.life,
                size: burst.size,
                color: burst.color,
                weight: burst.weight,
            });
        }
    }

    pub fn text(&mut self, text: impl Into<String>, at: Vec2, color: [f32; 4]) {
        self.texts.push(FloatingText {
            text: text.into(),
            position: at,
            life: 60,
            max_life: 60,
            color,
        });
    }

    /// Advance one tick. Particles fall along `gravity_sign`; texts drift
    /// against it.
    pub fn update(&mut self, gravity_sign: f32) {
        for p in &mut self.particles {
            p.velocity.y += PARTICLE_GRAVITY * p.weight * gravity_sign;
            p.position += p.velocity;
            p.life = p.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);

        for t in &mut self.texts {
            t.position.y -= TEXT_RISE * gravity_sign;
            t.life = t.life.saturating_sub(1);
        }
        self.texts.retain(|t| t.life > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn pools_prune_at_zero_life() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut fx = Effects::new();
        fx.burst(&mut rng, Vec2::ZERO, Burst::hit([1.0; 4]));
        fx.text("+1 iron", Vec2::ZERO, [1.0; 4]);
        for _ in 0..17 {
            fx.update(1.0);
        }
        assert_eq!(fx.particles.len(), 3);
        fx.update(1.0);
        assert!(fx.particles.is_empty());
        assert_eq!(fx.texts.len(), 1);
        assert!(fx.texts[0].position.y < 0.0);
    }

    #[test]
    fn burst_respects_pool_cap() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut fx = Effects::new();
        for _ in 0..100 {
            fx.burst(&mut rng, Vec2::ZERO, Burst::shatter([1.0; 4]));
        }
        assert_eq!(fx.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn particles_fall_with_inverted_gravity() {
        let mut fx = Effects::new();
        fx.particles.push(Particle {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            life: 5,
            max_life: 5,
            size: 1.0,
            color: [1.0; 4],
            weight: 1.0,
        });
        fx.update(-1.0);
        assert!(fx.particles[0].position.y < 0.0);
    }
}
