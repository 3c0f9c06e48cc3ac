//! Player controller: walking, jumping, collision, fall recovery, interaction
//! detection and animation frames.
//!
//! Movement modes (grounded, airborne, double-jumped) are implicit in
//! `grounded` and `jump_count`. All speeds are in world units per tick.

use engine_core::{ObjectKind, Rect, Stage, Upgrades, PLAYER_SIZE};
use glam::Vec2;
use input::{Action, InputSnapshot};
use physics::{resolve_collisions, SpatialStore};

use crate::events::Interactable;

pub const WALK_SPEED: f32 = 2.5;
/// Idle velocity multiplier per tick.
pub const FRICTION: f32 = 0.6;
/// Idle speed below which the player stops dead.
pub const STOP_THRESHOLD: f32 = 0.15;
pub const GRAVITY: f32 = 0.35;
pub const TERMINAL_VELOCITY: f32 = 10.0;
pub const JUMP_IMPULSE: f32 = 6.5;
pub const BOOTS_JUMP_IMPULSE: f32 = 8.5;
/// Air jump strength relative to the ground jump.
pub const AIR_JUMP_FACTOR: f32 = 0.75;
/// Distance past the far world edge before the player is rescued.
pub const FALL_MARGIN: f32 = 200.0;
pub const FALL_DAMAGE: f32 = 10.0;
pub const FALL_SHAKE: f32 = 8.0;
/// Grow the player box by this much when looking for interactables.
pub const INTERACT_MARGIN: f32 = 10.0;
/// Obstacles farther than this from the player box are not collided against.
const COLLISION_MARGIN: f32 = 40.0;

pub const WALK_FRAMES: u8 = 4;
pub const FRAME_TICKS: u32 = 6;
pub const AIR_FRAME: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

/// What movement did this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub jumped: bool,
    pub air_jumped: bool,
    pub landed: bool,
    /// Fell past the world edge and was put back at the respawn point.
    pub rescued: bool,
    /// NaN state was discarded.
    pub reset: bool,
}

/// Stage facts the controller needs each tick.
#[derive(Debug, Clone, Copy)]
pub struct StageBounds {
    pub stage: Stage,
    pub world_size: Vec2,
    pub spawn_point: Vec2,
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left of the collision box.
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub grounded: bool,
    /// Jumps taken since last touching the floor.
    pub jump_count: u8,
    pub anim_frame: u8,
    anim_timer: u32,
    pub can_interact_with: Option<Interactable>,
    jump_held: bool,
    interact_held: bool,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            grounded: false,
            jump_count: 0,
            anim_frame: 0,
            anim_timer: 0,
            can_interact_with: None,
            jump_held: false,
            interact_held: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, PLAYER_SIZE.x, PLAYER_SIZE.y)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Put the player at `position` at rest. The latched interaction is kept
    /// so the host hears about the change on the next detection pass.
    pub fn respawn(&mut self, position: Vec2) {
        let latched = self.can_interact_with;
        *self = Self::new(position);
        self.can_interact_with = latched;
    }

    /// Rising edge of `action`: pressed this frame, or newly held (joystick).
    fn edge(input: &InputSnapshot, action: Action, was_held: bool) -> bool {
        input.pressed(action) || (input.held(action) && !was_held)
    }

    /// Walk, jump, fall and collide for one tick.
    pub fn update_movement(
        &mut self,
        input: &InputSnapshot,
        bounds: &StageBounds,
        upgrades: &Upgrades,
        store: &SpatialStore,
    ) -> MoveReport {
        let mut report = MoveReport::default();

        if !self.position.is_finite() || !self.velocity.is_finite() {
            log::warn!("Player state was NaN at {:?}, respawning", self.position);
            self.respawn(bounds.spawn_point);
            report.reset = true;
        }

        let gravity_sign = bounds.stage.gravity_sign();

        // Horizontal
        let axis = input.horizontal();
        if axis != 0.0 {
            self.velocity.x = axis * WALK_SPEED;
            self.facing = if axis < 0.0 { Facing::Left } else { Facing::Right };
        } else {
            self.velocity.x *= FRICTION;
            if self.velocity.x.abs() < STOP_THRESHOLD {
                self.velocity.x = 0.0;
            }
        }

        // Jump
        let jump_edge = Self::edge(input, Action::Jump, self.jump_held);
        self.jump_held = input.held(Action::Jump);
        if jump_edge {
            let impulse = if upgrades.high_jump_boots {
                BOOTS_JUMP_IMPULSE
            } else {
                JUMP_IMPULSE
            };
            if self.grounded {
                self.velocity.y = -gravity_sign * impulse;
                self.jump_count = 1;
                self.grounded = false;
                report.jumped = true;
            } else if upgrades.high_jump_boots && self.jump_count < 2 {
                self.velocity.y = -gravity_sign * impulse * AIR_JUMP_FACTOR;
                self.jump_count = 2;
                report.jumped = true;
                report.air_jumped = true;
            }
        }

        // Gravity
        self.velocity.y += GRAVITY * gravity_sign;
        if self.velocity.y * gravity_sign > TERMINAL_VELOCITY {
            self.velocity.y = TERMINAL_VELOCITY * gravity_sign;
        }

        // Integrate and collide
        let was_grounded = self.grounded;
        let mut body = self.rect().translate(self.velocity);
        let near = body.expand(COLLISION_MARGIN);
        let obstacles: Vec<Rect> = store
            .query_region(&near)
            .into_iter()
            .filter(|o| o.kind.blocks_movement() && o.rect.intersects(&near))
            .map(|o| o.rect)
            .collect();
        let outcome = resolve_collisions(&mut body, &mut self.velocity, &obstacles, gravity_sign);
        self.position = body.position();
        self.grounded = outcome.grounded;
        if self.grounded {
            self.jump_count = 0;
            report.landed = !was_grounded;
        }

        // World bounds
        let max_x = (bounds.world_size.x - PLAYER_SIZE.x).max(0.0);
        self.position.x = self.position.x.clamp(0.0, max_x);
        let fell_out = if gravity_sign > 0.0 {
            self.position.y > bounds.world_size.y + FALL_MARGIN
        } else {
            self.position.y + PLAYER_SIZE.y < -FALL_MARGIN
        };
        if fell_out {
            log::info!("Player fell out of {}, respawning", bounds.stage.name());
            self.respawn(bounds.spawn_point);
            report.rescued = true;
            report.landed = false;
        }

        self.animate();
        report
    }

    fn animate(&mut self) {
        if !self.grounded {
            self.anim_frame = AIR_FRAME;
            self.anim_timer = 0;
        } else if self.velocity.x != 0.0 {
            self.anim_timer += 1;
            if self.anim_frame == 0 || self.anim_frame > WALK_FRAMES {
                self.anim_frame = 1;
            } else if self.anim_timer >= FRAME_TICKS {
                self.anim_timer = 0;
                self.anim_frame = self.anim_frame % WALK_FRAMES + 1;
            }
        } else {
            self.anim_frame = 0;
            self.anim_timer = 0;
        }
    }

    /// Nearest interactable overlapping the grown player box.
    pub fn find_interactable(&self, store: &SpatialStore) -> Option<Interactable> {
        let reach = self.rect().expand(INTERACT_MARGIN);
        let center = self.center();
        store
            .query_region(&reach)
            .into_iter()
            .filter(|o| o.kind.is_interactable() && o.rect.intersects(&reach))
            .min_by(|a, b| {
                a.center()
                    .distance_squared(center)
                    .total_cmp(&b.center().distance_squared(center))
            })
            .map(|o| Interactable { id: o.id, kind: o.kind })
    }

    /// Latch the current interaction target. Returns the new target when it
    /// changed, and the target to use when interact was just pressed.
    pub fn update_interaction(
        &mut self,
        input: &InputSnapshot,
        store: &SpatialStore,
    ) -> (Option<Option<Interactable>>, Option<Interactable>) {
        let found = self.find_interactable(store);
        let changed = (found != self.can_interact_with).then_some(found);
        self.can_interact_with = found;

        let interact_edge = Self::edge(input, Action::Interact, self.interact_held);
        self.interact_held = input.held(Action::Interact);
        let requested = if interact_edge { found } else { None };
        (changed, requested)
    }

    /// Hazard zone overlapping the player box.
    pub fn in_hazard(&self, store: &SpatialStore) -> bool {
        let rect = self.rect();
        store
            .query_region(&rect)
            .into_iter()
            .any(|o| o.kind == ObjectKind::Hazard && o.rect.intersects(&rect))
    }
}
