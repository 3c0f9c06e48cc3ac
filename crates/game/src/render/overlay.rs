//! Overlay rendering: HUD bars, interaction prompt, title, pause and station screens.

use engine_core::{Rect, ResourceKind, Stage};
use glam::Vec2;
use renderer::{text_width, DrawList, GLYPH_PX_H};

use crate::events::Interactable;
use crate::state::{AppPhase, MenuKind, INTERACT_KEY};
use crate::stats::{PlayerStats, MAX_INFECTION};
use crate::weapons::WeaponKind;

const BG: [f32; 4] = [0.0, 0.0, 0.0, 0.55];
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const GRAY: [f32; 4] = [0.7, 0.7, 0.7, 1.0];
const AMBER: [f32; 4] = [1.0, 0.67, 0.0, 1.0];

const BAR_W: f32 = 160.0;
const BAR_H: f32 = 10.0;

/// What the overlay needs from the host for one frame.
#[derive(Debug, Clone, Copy)]
pub struct HudView<'a> {
    pub stats: &'a PlayerStats,
    pub phase: AppPhase,
    pub stage: Stage,
    pub interaction: Option<Interactable>,
    /// Short message such as scan results.
    pub notice: Option<&'a str>,
}

fn centered(list: &mut DrawList, text: &str, y: f32, scale: f32, color: [f32; 4]) {
    let sw = list.view_size.x;
    let x = sw * 0.5 - text_width(text, scale) * 0.5;
    list.overlay_text(text, Vec2::new(x, y), scale, color);
}

fn bar(list: &mut DrawList, y: f32, label: &str, fraction: f32, color: [f32; 4]) {
    let x = 12.0;
    list.overlay_rect(Rect::new(x - 2.0, y - 2.0, BAR_W + 4.0, BAR_H + 4.0), BG);
    list.overlay_rect(Rect::new(x, y, BAR_W * fraction.clamp(0.0, 1.0), BAR_H), color);
    list.overlay_text(label, Vec2::new(x + BAR_W + 8.0, y + 1.0), 1.0, WHITE);
}

/// Build the screen-space overlay on top of an already filled world layer.
pub fn build(list: &mut DrawList, hud: &HudView<'_>) {
    let (sw, sh) = (list.view_size.x, list.view_size.y);

    if hud.phase == AppPhase::Title {
        list.overlay_rect(Rect::new(0.0, 0.0, sw, sh), [0.05, 0.04, 0.06, 1.0]);
        centered(list, "HOLLOWDEEP", sh * 0.35, 4.0, [0.9, 0.88, 0.75, 1.0]);
        centered(list, "Enter to start  /  Escape to quit", sh * 0.55, 1.5, GRAY);
        return;
    }

    let stats = hud.stats;
    bar(list, 12.0, "HP", stats.health / stats.max_health.max(1.0), [0.85, 0.2, 0.2, 1.0]);
    bar(list, 30.0, "O2", stats.oxygen / stats.max_oxygen.max(1.0), [0.3, 0.7, 1.0, 1.0]);
    bar(list, 48.0, "INF", stats.infection / MAX_INFECTION, [0.5, 0.9, 0.2, 1.0]);

    let stage = hud.stage.name();
    list.overlay_text(stage, Vec2::new(sw - text_width(stage, 1.5) - 12.0, 12.0), 1.5, GRAY);
    if let Some(weapon) = stats.equipped_weapon {
        let name = weapon.name();
        list.overlay_text(name, Vec2::new(sw - text_width(name, 1.0) - 12.0, 32.0), 1.0, AMBER);
    }

    match hud.phase {
        AppPhase::Playing => {
            if let Some(target) = hud.interaction {
                let prompt = format!("[{INTERACT_KEY}] {}", target.label());
                let w = text_width(&prompt, 1.5);
                let y = sh - 48.0;
                list.overlay_rect(Rect::new(sw * 0.5 - w * 0.5 - 8.0, y - 6.0, w + 16.0, GLYPH_PX_H * 1.5 + 12.0), BG);
                centered(list, &prompt, y, 1.5, WHITE);
            }
            if let Some(notice) = hud.notice {
                centered(list, notice, 72.0, 1.5, AMBER);
            }
        }
        AppPhase::Paused => {
            list.overlay_rect(Rect::new(0.0, 0.0, sw, sh), [0.08, 0.08, 0.08, 0.85]);
            centered(list, "PAUSED", sh * 0.3, 3.0, [0.9, 0.88, 0.75, 1.0]);
            centered(list, "Escape to resume  /  Q to quit to title", sh * 0.5, 1.5, GRAY);
        }
        AppPhase::Menu(kind) => menu(list, kind, stats),
        AppPhase::Title => {}
    }
}

fn menu(list: &mut DrawList, kind: MenuKind, stats: &PlayerStats) {
    let (sw, sh) = (list.view_size.x, list.view_size.y);
    let panel = Rect::new(sw * 0.2, sh * 0.15, sw * 0.6, sh * 0.7);
    list.overlay_rect(panel, [0.06, 0.07, 0.09, 0.92]);
    centered(list, kind.title(), panel.y + 16.0, 2.5, AMBER);

    let x = panel.x + 24.0;
    let mut y = panel.y + 60.0;
    let line_h = GLYPH_PX_H * 1.5 + 6.0;
    let mut line = |list: &mut DrawList, text: String, color: [f32; 4]| {
        list.overlay_text(text, Vec2::new(x, y), 1.5, color);
        y += line_h;
    };

    match kind {
        MenuKind::Workbench => {
            for (i, weapon) in WeaponKind::ALL.iter().enumerate() {
                let cost = match weapon.stats().cost {
                    Some((res, n)) => format!("{n} {} per shot", res.name()),
                    None => "free".to_string(),
                };
                let marker = if stats.equipped_weapon == Some(*weapon) { ">" } else { " " };
                let color = if marker == ">" { WHITE } else { GRAY };
                line(list, format!("{marker} {}  {}  ({cost})", i + 1, weapon.name()), color);
            }
        }
        MenuKind::Storage => {
            for kind in ResourceKind::ALL {
                let count = stats.resources[kind];
                let color = if count > 0 { WHITE } else { GRAY };
                line(list, format!("{:<14}{count}", kind.name()), color);
            }
        }
        MenuKind::Upgrades => {
            let u = &stats.upgrades;
            let levels = [
                ("Mining speed", u.mining_speed),
                ("Mining radius", u.mining_radius),
                ("Mining reach", u.mining_reach),
                ("Oxygen capacity", u.oxygen_capacity),
                ("Ore scanner", u.ore_scanner),
                ("Base expansion", u.base_expansion),
            ];
            for (name, level) in levels {
                line(list, format!("{name:<18}lv {level}"), WHITE);
            }
            for (name, owned) in [("High jump boots", u.high_jump_boots), ("Decontamination", u.decontamination_unit)] {
                let (state, color) = if owned { ("owned", WHITE) } else { ("-", GRAY) };
                line(list, format!("{name:<18}{state}"), color);
            }
        }
        MenuKind::MedBay => {
            line(list, format!("Health {:.0} / {:.0}", stats.health, stats.max_health), WHITE);
            line(list, "Stand nearby to heal faster".to_string(), GRAY);
        }
        MenuKind::Decontamination => {
            line(list, format!("Infection {:.0} / {MAX_INFECTION:.0}", stats.infection), WHITE);
            line(list, "Stand nearby to cleanse".to_string(), GRAY);
        }
    }

    let hint = "E or Escape to close";
    list.overlay_text(hint, Vec2::new(x, panel.bottom() - 28.0), 1.0, GRAY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{ObjectId, ObjectKind};
    use renderer::DrawCmd;

    fn texts(list: &DrawList) -> Vec<String> {
        list.overlay
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn view(stats: &PlayerStats, phase: AppPhase) -> HudView<'_> {
        HudView {
            stats,
            phase,
            stage: Stage::Mine,
            interaction: None,
            notice: None,
        }
    }

    #[test]
    fn title_hides_hud() {
        let stats = PlayerStats::default();
        let mut list = DrawList::new(Vec2::new(960.0, 540.0));
        build(&mut list, &view(&stats, AppPhase::Title));
        let texts = texts(&list);
        assert!(texts.iter().any(|t| t == "HOLLOWDEEP"));
        assert!(!texts.iter().any(|t| t == "HP"));
        assert!(list.world.is_empty());
    }

    #[test]
    fn prompt_names_key_and_target() {
        let stats = PlayerStats::default();
        let mut list = DrawList::new(Vec2::new(960.0, 540.0));
        let mut hud = view(&stats, AppPhase::Playing);
        hud.interaction = Some(Interactable {
            id: ObjectId(3),
            kind: ObjectKind::Exit,
        });
        build(&mut list, &hud);
        assert!(texts(&list).contains(&"[E] Go outside".to_string()));
    }

    #[test]
    fn health_bar_scales_with_health() {
        let stats = PlayerStats {
            health: 25.0,
            ..Default::default()
        };
        let mut list = DrawList::new(Vec2::new(960.0, 540.0));
        build(&mut list, &view(&stats, AppPhase::Playing));
        let widths: Vec<f32> = list
            .overlay
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Rect { rect, .. } if rect.y == 12.0 => Some(rect.w),
                _ => None,
            })
            .collect();
        assert_eq!(widths, vec![BAR_W * 0.25]);
    }

    #[test]
    fn workbench_marks_equipped_weapon() {
        let stats = PlayerStats {
            equipped_weapon: Some(WeaponKind::Area),
            ..Default::default()
        };
        let mut list = DrawList::new(Vec2::new(960.0, 540.0));
        build(&mut list, &view(&stats, AppPhase::Menu(MenuKind::Workbench)));
        let texts = texts(&list);
        assert!(texts.iter().any(|t| t.starts_with("> 2")));
        assert!(texts.iter().any(|t| t.starts_with("  1")));
    }
}
