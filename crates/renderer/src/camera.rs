//! Side-view follow camera and screen shake.

use glam::Vec2;
use rand::Rng;

/// Fraction of the remaining distance covered per tick.
pub const FOLLOW_LERP: f32 = 0.1;

/// Follow camera. `position` is the world coordinate of the viewport's top-left.
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub position: Vec2,
    /// Viewport size in world units.
    pub viewport: Vec2,
    /// Size of the current stage.
    pub world: Vec2,
}

impl Camera2D {
    pub fn new(viewport: Vec2, world: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport,
            world,
        }
    }

    /// Update viewport size (call on window resize).
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        self.position = self.clamped(self.position);
    }

    /// Top-left that centres the view on `focus`, before clamping.
    fn target_for(&self, focus: Vec2) -> Vec2 {
        focus - self.viewport * 0.5
    }

    /// Ease toward `focus`, then clamp to the world.
    pub fn follow(&mut self, focus: Vec2) {
        let target = self.target_for(focus);
        self.position += (target - self.position) * FOLLOW_LERP;
        self.position = self.clamped(self.position);
    }

    /// Jump straight to `focus` (stage loads).
    pub fn snap_to(&mut self, focus: Vec2) {
        self.position = self.clamped(self.target_for(focus));
    }

    /// Clamp per axis to `[0, world - viewport]`, or centre the world on an
    /// axis where it is smaller than the viewport.
    pub fn clamped(&self, p: Vec2) -> Vec2 {
        let axis = |p: f32, view: f32, world: f32| {
            if world <= view {
                (world - view) * 0.5
            } else {
                p.clamp(0.0, world - view)
            }
        };
        Vec2::new(
            axis(p.x, self.viewport.x, self.world.x),
            axis(p.y, self.viewport.y, self.world.y),
        )
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.position
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.position
    }
}

/// Random per-tick jitter that dies out after a number of ticks.
#[derive(Debug, Clone, Default)]
pub struct ScreenShake {
    intensity: f32,
    remaining: u32,
    offset: Vec2,
}

impl ScreenShake {
    /// Start or strengthen a shake. Keeps the larger intensity and duration.
    pub fn add(&mut self, intensity: f32, ticks: u32) {
        self.intensity = self.intensity.max(intensity);
        self.remaining = self.remaining.max(ticks);
    }

    /// Advance one tick.
    pub fn update<R: Rng>(&mut self, rng: &mut R) {
        if self.remaining == 0 {
            self.intensity = 0.0;
            self.offset = Vec2::ZERO;
            return;
        }
        self.remaining -= 1;
        let i = self.intensity;
        self.offset = if i > 0.0 {
            Vec2::new(rng.gen_range(-i..=i), rng.gen_range(-i..=i))
        } else {
            Vec2::ZERO
        };
    }

    /// Current draw offset. Only applied when rendering.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn clamps_at_world_edges() {
        let mut cam = Camera2D::new(Vec2::new(960.0, 540.0), Vec2::new(4800.0, 1200.0));
        cam.snap_to(Vec2::new(4790.0, 1190.0));
        assert_eq!(cam.position, Vec2::new(4800.0 - 960.0, 1200.0 - 540.0));
        cam.snap_to(Vec2::new(3.0, 3.0));
        assert_eq!(cam.position, Vec2::ZERO);
    }

    #[test]
    fn small_world_is_centred() {
        let mut cam = Camera2D::new(Vec2::new(1280.0, 720.0), Vec2::new(960.0, 540.0));
        cam.snap_to(Vec2::new(0.0, 0.0));
        assert_eq!(cam.position, Vec2::new(-160.0, -90.0));
    }

    #[test]
    fn follow_moves_a_tenth_of_the_way() {
        let mut cam = Camera2D::new(Vec2::new(100.0, 100.0), Vec2::new(10_000.0, 10_000.0));
        cam.position = Vec2::new(1000.0, 1000.0);
        cam.follow(Vec2::new(1150.0, 1050.0));
        // Target top-left is (1100, 1000).
        assert!((cam.position.x - 1010.0).abs() < 1e-3);
        assert!((cam.position.y - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn shake_stays_in_bounds_and_resets() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut shake = ScreenShake::default();
        shake.add(8.0, 3);
        for _ in 0..3 {
            shake.update(&mut rng);
            let o = shake.offset();
            assert!(o.x.abs() <= 8.0 && o.y.abs() <= 8.0);
        }
        assert!(!shake.is_active());
        shake.update(&mut rng);
        assert_eq!(shake.offset(), Vec2::ZERO);
    }
}
