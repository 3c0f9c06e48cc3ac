//! AABB collision response using the axis of least penetration.

use engine_core::Rect;
use glam::Vec2;

/// What happened while resolving one body against its obstacles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// Landed on a floor-facing surface for the current gravity direction.
    pub grounded: bool,
    /// Pushed out horizontally.
    pub hit_wall: bool,
    /// Pushed out against gravity's opposite side (head bump).
    pub hit_ceiling: bool,
}

/// Push `body` out of every overlapping obstacle.
///
/// For each overlap the shallower axis is resolved: that velocity component
/// is zeroed and the body snaps to the obstacle edge. Obstacles are visited in
/// order of decreasing overlap area so a body walking across the seam of two
/// floor blocks settles on the one it mostly stands on instead of snagging on
/// the other's side. `gravity_sign` is +1 when gravity pulls toward larger y.
pub fn resolve_collisions<'a, I>(
    body: &mut Rect,
    velocity: &mut Vec2,
    obstacles: I,
    gravity_sign: f32,
) -> CollisionOutcome
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut candidates: Vec<(&Rect, f32)> = obstacles
        .into_iter()
        .filter_map(|o| body.overlap(o).map(|d| (o, d.x * d.y)))
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut outcome = CollisionOutcome::default();
    for (obstacle, _) in candidates {
        // Earlier pushes may already have cleared this one.
        let Some(depth) = body.overlap(obstacle) else {
            continue;
        };

        let body_center = body.center();
        let obstacle_center = obstacle.center();

        if depth.x < depth.y {
            if body_center.x < obstacle_center.x {
                body.x = obstacle.left() - body.w;
            } else {
                body.x = obstacle.right();
            }
            velocity.x = 0.0;
            outcome.hit_wall = true;
        } else {
            let body_above = body_center.y < obstacle_center.y;
            if body_above {
                body.y = obstacle.top() - body.h;
            } else {
                body.y = obstacle.bottom();
            }
            velocity.y = 0.0;

            let floor_side = if gravity_sign >= 0.0 { body_above } else { !body_above };
            if floor_side {
                outcome.grounded = true;
            } else {
                outcome.hit_ceiling = true;
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lands_on_floor_with_normal_gravity() {
        let floor = Rect::new(0.0, 100.0, 200.0, 20.0);
        let mut body = Rect::new(50.0, 75.0, 14.0, 26.0);
        let mut vel = Vec2::new(0.0, 3.0);
        let out = resolve_collisions(&mut body, &mut vel, [&floor], 1.0);
        assert!(out.grounded);
        assert_eq!(body.bottom(), 100.0);
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn ceiling_is_floor_when_gravity_inverted() {
        let ceiling = Rect::new(0.0, 0.0, 200.0, 60.0);
        let mut body = Rect::new(50.0, 58.0, 14.0, 26.0);
        let mut vel = Vec2::new(0.0, -3.0);
        let out = resolve_collisions(&mut body, &mut vel, [&ceiling], -1.0);
        assert!(out.grounded);
        assert!(!out.hit_ceiling);
        assert_eq!(body.top(), 60.0);
    }

    #[test]
    fn head_bump_does_not_ground() {
        let ceiling = Rect::new(0.0, 0.0, 200.0, 20.0);
        let mut body = Rect::new(50.0, 18.0, 14.0, 26.0);
        let mut vel = Vec2::new(0.0, -5.0);
        let out = resolve_collisions(&mut body, &mut vel, [&ceiling], 1.0);
        assert!(!out.grounded);
        assert!(out.hit_ceiling);
        assert_eq!(body.top(), 20.0);
    }

    #[test]
    fn wall_stops_horizontal_motion() {
        let wall = Rect::new(100.0, 0.0, 20.0, 200.0);
        let mut body = Rect::new(88.0, 50.0, 14.0, 26.0);
        let mut vel = Vec2::new(2.5, 0.0);
        let out = resolve_collisions(&mut body, &mut vel, [&wall], 1.0);
        assert!(out.hit_wall);
        assert_eq!(body.right(), 100.0);
        assert_eq!(vel.x, 0.0);
    }

    #[test]
    fn walking_over_block_seam_does_not_snag() {
        let a = Rect::new(0.0, 100.0, 20.0, 20.0);
        let b = Rect::new(20.0, 100.0, 20.0, 20.0);
        // Mostly on `a`, just crossing into `b`, sunk by one tick of gravity.
        let mut body = Rect::new(6.2, 74.35, 14.0, 26.0);
        let mut vel = Vec2::new(2.5, 0.35);
        let out = resolve_collisions(&mut body, &mut vel, [&b, &a], 1.0);
        assert!(out.grounded);
        assert!(!out.hit_wall);
        assert_eq!(vel.x, 2.5);
    }
}
