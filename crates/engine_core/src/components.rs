//! Common ECS components used across the engine.

use glam::Vec2;

/// World-space position for short-lived entities (projectiles).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

/// Velocity component for moving entities, in world units per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec2,
}

impl Velocity {
    pub fn new(linear: Vec2) -> Self {
        Self { linear }
    }
}

/// Health component for damageable objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtract `amount`. Unlike vitals, object health may go below zero so the
    /// caller can tell how hard the finishing blow was.
    pub fn take_damage(&mut self, amount: f32) {
        self.current -= amount;
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn percentage(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Lifetime component for temporary entities, counted in ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub remaining: u32,
    pub total: u32,
}

impl Lifetime {
    pub fn new(ticks: u32) -> Self {
        Self {
            remaining: ticks,
            total: ticks,
        }
    }

    /// Count down one tick. Returns true once the lifetime has run out.
    pub fn update(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    /// Fraction of life left in 0..=1.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.remaining as f32 / self.total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_expires_after_exact_ticks() {
        let mut life = Lifetime::new(3);
        assert!(!life.update());
        assert!(!life.update());
        assert!(life.update());
        assert_eq!(life.fraction(), 0.0);
    }

    #[test]
    fn health_dead_at_zero() {
        let mut h = Health::new(2.0);
        h.take_damage(1.0);
        assert!(!h.is_dead());
        h.take_damage(1.0);
        assert!(h.is_dead());
    }
}
