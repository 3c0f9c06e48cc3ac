//! Rendering: turns simulation state into a [`DrawList`] each frame.
//!
//! Nothing here mutates the simulation. Images are referenced by name and the
//! renderer falls back to the given colour when one is not loaded.

pub mod overlay;

use engine_core::{ObjectKind, ResourceKind, Stage, StationKind, WorldObject};
use glam::Vec2;
use rand::Rng;
use renderer::{DrawCmd, DrawList};

use crate::player::AIR_FRAME;
use crate::simulation::Simulation;
use crate::weapons::WeaponKind;

/// Sprite sheet layout of the "player" image: frames side by side.
const PLAYER_FRAMES: f32 = (AIR_FRAME + 1) as f32;
/// Light radius in the mine.
pub const FOG_INNER: f32 = 140.0;
pub const FOG_OUTER: f32 = 340.0;

fn background(stage: Stage) -> (&'static str, [f32; 4]) {
    match stage {
        Stage::Outside => ("bg_outside", [0.22, 0.16, 0.20, 1.0]),
        Stage::Mine => ("bg_mine", [0.07, 0.06, 0.08, 1.0]),
        Stage::Base => ("bg_base", [0.16, 0.18, 0.21, 1.0]),
    }
}

/// Image for a block material.
pub fn material_image(kind: ResourceKind, variant: u8) -> &'static str {
    match kind {
        ResourceKind::Scrap => "scrap",
        ResourceKind::Wood => "wood",
        ResourceKind::Iron => "iron",
        ResourceKind::Ice => "ice",
        ResourceKind::Coal => "coal",
        ResourceKind::Titanium => "titanium",
        ResourceKind::Uranium => "uranium",
        ResourceKind::RareSlime => "rare_slime",
        ResourceKind::LivingMetal if variant == 1 => "living_metal_alt",
        ResourceKind::LivingMetal => "living_metal",
        ResourceKind::InfectedMetal => "infected_metal",
    }
}

/// Image and fallback colour for an object.
pub fn object_look(obj: &WorldObject, stage: Stage) -> (&'static str, [f32; 4]) {
    match obj.kind {
        ObjectKind::Solid if stage == Stage::Mine => ("bedrock", [0.12, 0.11, 0.13, 1.0]),
        ObjectKind::Solid => ("hull", [0.30, 0.31, 0.34, 1.0]),
        ObjectKind::Destructible => {
            let kind = obj.resource_kind.unwrap_or(ResourceKind::LivingMetal);
            (material_image(kind, obj.variant), kind.color())
        }
        ObjectKind::Hazard => ("hazard", [0.55, 0.85, 0.20, 0.6]),
        ObjectKind::BaseEntrance => ("door_base", [0.35, 0.55, 0.75, 1.0]),
        ObjectKind::MineEntrance => ("mine_shaft", [0.30, 0.22, 0.15, 1.0]),
        ObjectKind::Exit => ("exit_door", [0.45, 0.65, 0.40, 1.0]),
        ObjectKind::Station(station) => match station {
            StationKind::Workbench => ("workbench", [0.55, 0.40, 0.25, 1.0]),
            StationKind::StorageTerminal => ("storage", [0.35, 0.40, 0.50, 1.0]),
            StationKind::UpgradeTerminal => ("upgrade_terminal", [0.30, 0.55, 0.60, 1.0]),
            StationKind::MedBay => ("med_bay", [0.80, 0.80, 0.85, 1.0]),
            StationKind::DecontaminationUnit => ("decon_unit", [0.40, 0.75, 0.55, 1.0]),
        },
    }
}

/// Materials that give off light.
fn ore_glow(kind: ResourceKind) -> Option<[f32; 3]> {
    match kind {
        ResourceKind::Uranium => Some([0.35, 1.0, 0.3]),
        ResourceKind::Ice => Some([0.55, 0.8, 1.0]),
        ResourceKind::RareSlime => Some([0.85, 0.35, 1.0]),
        _ => None,
    }
}

fn with_alpha(mut color: [f32; 4], alpha: f32) -> [f32; 4] {
    color[3] *= alpha.clamp(0.0, 1.0);
    color
}

/// Build the world layer of one frame. `frame_time` (seconds) drives pulsing.
pub fn draw_scene<R: Rng>(sim: &Simulation<R>, list: &mut DrawList, viewport: Vec2, frame_time: f32) {
    list.clear();
    list.view_size = viewport;
    list.view_origin = sim.camera.position + sim.shake.offset();
    let (bg_name, bg_color) = background(sim.stage);
    list.clear_color = bg_color;

    let world = engine_core::Rect::new(0.0, 0.0, sim.world_size.x, sim.world_size.y);
    list.image(bg_name, world, bg_color);

    let visible = list.visible_rect();
    let mut glows = Vec::new();
    for obj in sim.store.query_region(&visible) {
        if !obj.rect.intersects(&visible) {
            continue;
        }
        let (name, fallback) = object_look(obj, sim.stage);
        let cmd = list.image(name, obj.rect, fallback);
        if obj.kind == ObjectKind::Hazard {
            if let DrawCmd::Image { tint, .. } = cmd {
                tint[3] = 0.6 + 0.25 * (frame_time * 4.0).sin();
            }
        }

        if let Some(health) = obj.health {
            let damage = 1.0 - health.percentage();
            if damage > 0.0 {
                let cmd = list.image("crack", obj.rect, [0.0, 0.0, 0.0, 0.5 * damage]);
                if let DrawCmd::Image { tint, .. } = cmd {
                    *tint = [1.0, 1.0, 1.0, damage];
                }
            }
        }
        if let Some(rgb) = obj.resource_kind.and_then(ore_glow) {
            let pulse = 0.35 + 0.1 * (frame_time * 2.0 + obj.rect.x * 0.01).sin();
            glows.push((obj.center(), obj.rect.w.max(obj.rect.h) * 1.2, [rgb[0], rgb[1], rgb[2], pulse]));
        }
    }

    draw_projectiles(sim, list);

    for p in &sim.effects.particles {
        let rect = engine_core::Rect::from_center(p.position, Vec2::splat(p.size));
        list.rect(rect, with_alpha(p.color, p.alpha()));
    }

    draw_player(sim, list);

    if sim.stage == Stage::Mine {
        list.fog(visible, sim.player.center(), FOG_INNER, FOG_OUTER, [0.0, 0.0, 0.0, 0.96]);
    }
    for (center, radius, color) in glows {
        list.glow(center, radius, color);
    }

    for t in &sim.effects.texts {
        let width = renderer::text_width(&t.text, 1.0);
        list.text(
            t.text.clone(),
            t.position - Vec2::new(width * 0.5, 0.0),
            1.0,
            with_alpha(t.color, t.alpha()),
        );
    }

    if let Some(cursor) = sim.cursor {
        let color = if cursor.in_reach {
            [1.0, 1.0, 1.0, 0.7]
        } else {
            [1.0, 0.3, 0.3, 0.5]
        };
        list.ring(cursor.target, cursor.radius, 1.5, color);
    }

    if let Some(pulse) = sim.scan_pulse {
        let alpha = pulse.life.fraction();
        list.ring(sim.player.center(), pulse.radius(), 3.0, [0.5, 1.0, 0.9, 0.6 * alpha]);
    }
}

fn draw_projectiles<R: Rng>(sim: &Simulation<R>, list: &mut DrawList) {
    let mut query = sim
        .projectiles
        .query::<(&engine_core::Position, &crate::weapons::Projectile, &engine_core::Lifetime)>();
    for (_, (pos, proj, life)) in query.iter() {
        let color = with_alpha(proj.kind.stats().color, life.fraction().max(0.2));
        match proj.kind {
            WeaponKind::Area => list.ring(pos.0, proj.size, 3.0, color),
            WeaponKind::Melee | WeaponKind::Beam => {
                list.glow(pos.0, proj.size * 1.5, with_alpha(color, 0.5));
                list.rect(engine_core::Rect::from_center(pos.0, Vec2::splat(proj.size * 0.5)), color);
            }
        }
    }
}

fn draw_player<R: Rng>(sim: &Simulation<R>, list: &mut DrawList) {
    let player = &sim.player;
    let frame = player.anim_frame as f32;
    let cmd = list.image("player", player.rect(), [0.90, 0.75, 0.40, 1.0]);
    if let DrawCmd::Image { uv, flip_x, flip_y, .. } = cmd {
        *uv = [frame / PLAYER_FRAMES, 0.0, (frame + 1.0) / PLAYER_FRAMES, 1.0];
        *flip_x = player.facing == crate::player::Facing::Left;
        *flip_y = sim.stage.gravity_sign() < 0.0;
    }
}
