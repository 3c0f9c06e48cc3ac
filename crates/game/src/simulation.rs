//! The simulation core: one explicit struct owning the stage, the player and
//! every pool, advanced by [`Simulation::tick`] and drawn by
//! [`Simulation::render`].

use audio::SoundCue;
use engine_core::{Lifetime, ObjectKind, ResourceTable, Stage, PLAYER_SIZE};
use glam::Vec2;
use hecs::World;
use input::{Action, InputSnapshot};
use physics::SpatialStore;
use procgen::{generate_stage, StageParams};
use rand::{rngs::StdRng, Rng, SeedableRng};
use renderer::{Camera2D, DrawList, ScreenShake};

use crate::effects::Effects;
use crate::events::{DamageCause, SimEvent, TickOutput};
use crate::mining::{self, MiningTool};
use crate::player::{Facing, MoveReport, Player, StageBounds, FALL_DAMAGE, FALL_SHAKE};
use crate::stats::{PlayerStats, StatDeltas};
use crate::vitals::{Surroundings, Vitals};
use crate::weapons::WeaponSystem;

pub const SCAN_COOLDOWN: u32 = 180;
pub const SCAN_RANGE: f32 = 400.0;
/// Ticks the scan ring stays on screen.
pub const SCAN_PULSE_TICKS: u32 = 40;
const FALL_SHAKE_TICKS: u32 = 20;

pub fn scan_range(level: u32) -> f32 {
    SCAN_RANGE * (1.0 + 0.5 * level as f32)
}

/// Expanding ring drawn after a scan, out to the range that was scanned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPulse {
    pub life: Lifetime,
    pub range: f32,
}

impl ScanPulse {
    pub fn new(range: f32) -> Self {
        Self {
            life: Lifetime::new(SCAN_PULSE_TICKS),
            range,
        }
    }

    pub fn radius(&self) -> f32 {
        (self.range * (1.0 - self.life.fraction())).max(1.0)
    }
}

/// Where the player is aiming the pick this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningCursor {
    pub target: Vec2,
    pub radius: f32,
    pub in_reach: bool,
}

pub struct Simulation<R: Rng = StdRng> {
    pub(crate) rng: R,
    pub(crate) stage: Stage,
    pub(crate) store: SpatialStore,
    pub(crate) world_size: Vec2,
    pub(crate) spawn_point: Vec2,
    pub(crate) player: Player,
    pub(crate) vitals: Vitals,
    pub(crate) mining: MiningTool,
    pub(crate) weapons: WeaponSystem,
    /// Projectile entities.
    pub(crate) projectiles: World,
    pub(crate) effects: Effects,
    pub(crate) camera: Camera2D,
    pub(crate) shake: ScreenShake,
    pub(crate) cursor: Option<MiningCursor>,
    pub(crate) scan_cooldown: u32,
    pub(crate) scan_pulse: Option<ScanPulse>,
    pub(crate) tick_count: u64,
}

impl Simulation<StdRng> {
    /// Entropy-seeded: every mine is different.
    pub fn new(viewport: Vec2) -> Self {
        Self::with_rng(viewport, StdRng::from_entropy())
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(viewport: Vec2, rng: R) -> Self {
        let stage = Stage::Base;
        let world_size = stage.world_size(0);
        Self {
            rng,
            stage,
            store: SpatialStore::new(),
            world_size,
            spawn_point: Vec2::ZERO,
            player: Player::new(Vec2::ZERO),
            vitals: Vitals::default(),
            mining: MiningTool::new(),
            weapons: WeaponSystem::new(),
            projectiles: World::new(),
            effects: Effects::new(),
            camera: Camera2D::new(viewport, world_size),
            shake: ScreenShake::default(),
            cursor: None,
            scan_cooldown: 0,
            scan_pulse: None,
            tick_count: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn store(&self) -> &SpatialStore {
        &self.store
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    fn bounds(&self) -> StageBounds {
        StageBounds {
            stage: self.stage,
            world_size: self.world_size,
            spawn_point: self.spawn_point,
        }
    }

    /// Clear everything and build `stage` fresh. Entering the base refills
    /// oxygen straight away.
    pub fn load_stage(&mut self, stage: Stage, stats: &PlayerStats) -> TickOutput {
        let mut out = TickOutput::default();
        let params = StageParams {
            ore_scanner_level: stats.upgrades.ore_scanner,
            base_expansion_level: stats.upgrades.base_expansion,
            decontamination_unit: stats.upgrades.decontamination_unit,
        };

        self.store.clear();
        self.projectiles.clear();
        self.effects.clear();
        self.shake.clear();
        self.vitals.reset();
        self.mining.reset();
        self.weapons.reset();
        self.cursor = None;
        self.scan_pulse = None;
        self.stage = stage;

        match generate_stage(stage, &params, &mut self.rng) {
            Ok(layout) => {
                self.world_size = layout.world_size;
                self.spawn_point = layout.spawn_point;
                for obj in layout.objects {
                    self.store.insert(obj);
                }
            }
            Err(e) => {
                log::error!("Failed to generate {}: {}", stage.name(), e);
                self.world_size = stage.world_size(params.base_expansion_level);
                self.spawn_point = self.world_size * 0.5;
            }
        }

        self.player.respawn(self.spawn_point);
        self.camera.world = self.world_size;
        self.camera.snap_to(self.player.center());

        if stage == Stage::Base {
            out.deltas.oxygen = stats.max_oxygen - stats.oxygen;
        }
        out.push(SimEvent::StageLoaded(stage));
        log::info!("Loaded {} ({} objects)", stage.name(), self.store.len());
        out
    }

    /// Advance one fixed step. Inactive ticks (menus, pause) change nothing.
    pub fn tick(&mut self, input: &InputSnapshot, stats: &PlayerStats, active: bool) -> TickOutput {
        let mut out = TickOutput::default();
        if !active {
            return out;
        }

        if stats.health <= 0.0 {
            log::info!("Player died in {}", self.stage.name());
            out.deltas = StatDeltas::restore(stats);
            out.push(SimEvent::PlayerDied);
            out.sound(SoundCue::Death);
            self.player.respawn(self.spawn_point);
            self.vitals.reset();
            return out;
        }

        self.tick_count += 1;
        self.mining.cool_down();
        self.scan_cooldown = self.scan_cooldown.saturating_sub(1);

        let bounds = self.bounds();
        let report = self
            .player
            .update_movement(input, &bounds, &stats.upgrades, &self.store);
        self.movement_feedback(&report, &mut out);

        let in_hazard = self.player.in_hazard(&self.store);
        let around = Surroundings::scan(&self.store, self.player.center(), in_hazard);
        self.vitals.update(self.stage, stats, &around, &mut out);

        let (changed, requested) = self.player.update_interaction(input, &self.store);
        if let Some(target) = changed {
            out.push(SimEvent::InteractionChanged(target));
        }
        if let Some(target) = requested {
            out.push(SimEvent::InteractRequested(target));
        }

        self.update_mining(input, stats, &mut out);
        self.update_attack(input, stats, &mut out);
        self.update_scanner(input, stats, &mut out);

        self.weapons
            .update(&mut self.projectiles, self.world_size.x, &mut self.effects, &mut self.rng);
        self.effects.update(self.stage.gravity_sign());
        if let Some(pulse) = self.scan_pulse.as_mut() {
            if pulse.life.update() {
                self.scan_pulse = None;
            }
        }
        self.camera.follow(self.player.center());
        self.shake.update(&mut self.rng);

        out
    }

    fn movement_feedback(&mut self, report: &MoveReport, out: &mut TickOutput) {
        if report.jumped {
            out.sound(SoundCue::Jump);
        }
        if report.landed {
            out.sound(SoundCue::Land);
        }
        if report.rescued {
            out.hurt(FALL_DAMAGE, DamageCause::Fall);
            self.shake.add(FALL_SHAKE, FALL_SHAKE_TICKS);
            self.camera.snap_to(self.player.center());
        }
    }

    /// World point under the pointer in the frame the player last saw,
    /// which was drawn shaken.
    fn pointer_world(&self, input: &InputSnapshot) -> Vec2 {
        self.camera.screen_to_world(input.pointer) + self.shake.offset()
    }

    /// Pointer or aim stick target for the pick, if any.
    fn mining_target(&self, input: &InputSnapshot, stats: &PlayerStats) -> Option<Vec2> {
        if input.primary_down {
            return Some(self.pointer_world(input));
        }
        if stats.equipped_weapon.is_none() {
            let reach = mining::reach(&stats.upgrades);
            return input.aim().map(|dir| self.player.center() + dir * reach);
        }
        None
    }

    fn update_mining(&mut self, input: &InputSnapshot, stats: &PlayerStats, out: &mut TickOutput) {
        let Some(target) = self.mining_target(input, stats) else {
            self.cursor = None;
            return;
        };
        let origin = self.player.center();
        let upgrades = &stats.upgrades;
        self.cursor = Some(MiningCursor {
            target,
            radius: mining::radius(upgrades),
            in_reach: origin.distance(target) <= mining::reach(upgrades),
        });

        let strike = self
            .mining
            .strike(&mut self.store, origin, target, upgrades, &mut self.rng);
        if let Some((intensity, ticks)) =
            self.mining
                .feedback(&strike, &mut self.effects, &mut self.rng, out)
        {
            self.shake.add(intensity, ticks);
        }
    }

    fn update_attack(&mut self, input: &InputSnapshot, stats: &PlayerStats, out: &mut TickOutput) {
        let Some(kind) = stats.equipped_weapon else {
            return;
        };
        let origin = self.player.center();
        let direction = if input.secondary_down || input.held(Action::Attack) {
            if input.secondary_down {
                self.pointer_world(input) - origin
            } else {
                match self.player.facing {
                    Facing::Left => Vec2::NEG_X,
                    Facing::Right => Vec2::X,
                }
            }
        } else if let Some(aim) = input.aim() {
            aim
        } else {
            return;
        };
        self.weapons
            .try_fire(&mut self.projectiles, kind, origin, direction, stats, out);
    }

    fn update_scanner(&mut self, input: &InputSnapshot, stats: &PlayerStats, out: &mut TickOutput) {
        let level = stats.upgrades.ore_scanner;
        if level == 0 || self.scan_cooldown > 0 || !input.pressed(Action::Scan) {
            return;
        }
        self.scan_cooldown = SCAN_COOLDOWN;

        let center = self.player.center();
        let range = scan_range(level);
        let area = engine_core::Rect::from_center(center, Vec2::splat(range * 2.0));
        let mut found: ResourceTable<u32> = ResourceTable::default();
        for obj in self.store.query_region(&area) {
            if obj.kind != ObjectKind::Destructible || obj.center().distance(center) > range {
                continue;
            }
            if let Some(kind) = obj.resource_kind.filter(|k| k.is_ore()) {
                found[kind] += obj.cell_count();
            }
        }

        let total: u32 = found.iter().map(|(_, n)| *n).sum();
        self.effects.text(
            format!("Scan: {total} ore nearby"),
            center - Vec2::new(0.0, PLAYER_SIZE.y),
            [0.5, 1.0, 0.9, 1.0],
        );
        self.scan_pulse = Some(ScanPulse::new(range));
        out.sound(SoundCue::Scan);
        out.push(SimEvent::ScanCompleted(found));
    }

    /// Fill `list` with the current frame. Reads state only.
    pub fn render(&self, list: &mut DrawList, viewport: Vec2, frame_time: f32) {
        crate::render::draw_scene(self, list, viewport, frame_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{ObjectId, Rect, ResourceKind, WorldObject, BLOCK_SIZE};
    use input::KeyCode;
    use procgen::layout::BASE_FLOOR_Y;

    use crate::weapons::WeaponKind;

    const VIEW: Vec2 = Vec2::new(960.0, 540.0);

    fn sim() -> Simulation<StdRng> {
        Simulation::with_rng(VIEW, StdRng::seed_from_u64(42))
    }

    fn settle(sim: &mut Simulation<StdRng>, stats: &PlayerStats) {
        for _ in 0..5 {
            sim.tick(&InputSnapshot::default(), stats, true);
        }
        assert!(sim.player.grounded);
    }

    fn grants(out: &TickOutput) -> usize {
        out.count(|e| matches!(e, SimEvent::ResourceGrant(_)))
    }

    #[test]
    fn inactive_tick_is_a_no_op() {
        let mut sim = sim();
        let stats = PlayerStats::default();
        sim.load_stage(Stage::Mine, &stats);
        let before = sim.player.position;
        let out = sim.tick(&InputSnapshot::default(), &stats, false);
        assert!(out.events.is_empty());
        assert!(out.deltas.is_empty());
        assert_eq!(sim.player.position, before);
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn scrap_block_breaks_on_fortieth_tick_with_one_grant() {
        let mut sim = sim();
        let stats = PlayerStats::default();
        sim.load_stage(Stage::Base, &stats);
        settle(&mut sim, &stats);

        let block = Rect::new(
            sim.player.position.x + 40.0,
            BASE_FLOOR_Y - BLOCK_SIZE,
            BLOCK_SIZE,
            BLOCK_SIZE,
        );
        sim.store.insert(WorldObject::destructible(ObjectId(9000), block, ResourceKind::Scrap, 40.0));

        let mut total = 0;
        for tick in 1..=40 {
            let pointer = sim.camera.world_to_screen(block.center());
            let input = InputSnapshot::default().with_pointer(pointer, true, false);
            let out = sim.tick(&input, &stats, true);
            total += grants(&out);
            if tick < 40 {
                assert!(sim.store.get(ObjectId(9000)).is_some(), "broke early at tick {tick}");
            } else {
                assert_eq!(grants(&out), 1);
                assert_eq!(out.deltas.resources[ResourceKind::Scrap], 1);
            }
        }
        assert!(sim.store.get(ObjectId(9000)).is_none());
        let visible = sim.store.query_region(&block);
        assert!(visible.iter().all(|o| o.id != ObjectId(9000)));

        // Further mining at the same spot grants nothing more.
        for _ in 0..10 {
            let pointer = sim.camera.world_to_screen(block.center());
            let input = InputSnapshot::default().with_pointer(pointer, true, false);
            total += grants(&sim.tick(&input, &stats, true));
        }
        assert_eq!(total, 1);
    }

    #[test]
    fn zero_oxygen_outside_hurts_once_in_sixty_ticks() {
        let mut sim = sim();
        let stats = PlayerStats {
            oxygen: 0.0,
            ..Default::default()
        };
        sim.load_stage(Stage::Mine, &stats);
        let mut hurt_ticks = Vec::new();
        for tick in 1..=60 {
            let out = sim.tick(&InputSnapshot::default(), &stats, true);
            let suffocated = out.count(|e| {
                matches!(e, SimEvent::PlayerHurt { cause: DamageCause::Suffocation, .. })
            });
            if suffocated > 0 {
                hurt_ticks.push(tick);
            }
        }
        assert_eq!(hurt_ticks, vec![60]);
    }

    #[test]
    fn mine_to_base_resets_position_and_oxygen() {
        let mut sim = sim();
        let mut stats = PlayerStats::default();
        sim.load_stage(Stage::Mine, &stats);
        stats.oxygen = 37.0;
        let out = sim.load_stage(Stage::Base, &stats);
        assert_eq!(sim.player.position, sim.spawn_point());
        stats.apply(&out.deltas);
        assert_eq!(stats.oxygen, 100.0);
        assert!(out.events.contains(&SimEvent::StageLoaded(Stage::Base)));
    }

    #[test]
    fn camera_clamps_at_world_edges() {
        let mut sim = sim();
        let stats = PlayerStats {
            upgrades: engine_core::Upgrades {
                base_expansion: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        sim.load_stage(Stage::Base, &stats);
        let world = sim.world_size();
        assert!(world.x > VIEW.x);

        sim.player.position.x = world.x - 40.0;
        for _ in 0..200 {
            sim.tick(&InputSnapshot::default(), &stats, true);
        }
        assert_eq!(sim.camera.position.x, world.x - VIEW.x);

        sim.player.position.x = 30.0;
        for _ in 0..200 {
            sim.tick(&InputSnapshot::default(), &stats, true);
        }
        assert_eq!(sim.camera.position.x, 0.0);
        assert_eq!(sim.camera.position.y, 0.0);
    }

    #[test]
    fn death_restores_vitals_and_reports_once() {
        let mut sim = sim();
        let stats = PlayerStats {
            health: 0.0,
            oxygen: 3.0,
            ..Default::default()
        };
        sim.load_stage(Stage::Mine, &stats);
        let out = sim.tick(&InputSnapshot::default(), &stats, true);
        assert_eq!(out.count(|e| *e == SimEvent::PlayerDied), 1);
        let mut after = stats.clone();
        after.apply(&out.deltas);
        assert_eq!(after.health, after.max_health);
        assert_eq!(after.oxygen, after.max_oxygen);
    }

    #[test]
    fn mine_spawn_is_standing_in_open_air() {
        let mut sim = sim();
        let stats = PlayerStats::default();
        sim.load_stage(Stage::Mine, &stats);
        let body = sim.player.rect();
        assert!(sim
            .store
            .query_region(&body)
            .iter()
            .all(|o| !o.kind.blocks_movement() || !o.rect.intersects(&body)));
        settle(&mut sim, &stats);
    }

    #[test]
    fn scanner_needs_upgrade_and_cools_down() {
        let mut sim = sim();
        let mut stats = PlayerStats::default();
        sim.load_stage(Stage::Mine, &stats);
        let scan = InputSnapshot::default().with_key_pressed(KeyCode::KeyQ);
        let scanned = |out: &TickOutput| out.count(|e| matches!(e, SimEvent::ScanCompleted(_)));

        assert_eq!(scanned(&sim.tick(&scan, &stats, true)), 0);
        stats.upgrades.ore_scanner = 1;
        assert_eq!(scanned(&sim.tick(&scan, &stats, true)), 1);
        assert_eq!(scanned(&sim.tick(&scan, &stats, true)), 0);
    }

    #[test]
    fn walking_into_exit_reports_interaction() {
        let mut sim = sim();
        let stats = PlayerStats::default();
        sim.load_stage(Stage::Mine, &stats);
        let mut seen = None;
        for _ in 0..120 {
            let input = InputSnapshot::default().with_key_held(KeyCode::KeyA);
            let out = sim.tick(&input, &stats, true);
            for e in out.events {
                if let SimEvent::InteractionChanged(Some(target)) = e {
                    seen = Some(target.kind);
                }
            }
        }
        assert_eq!(seen, Some(ObjectKind::Exit));
    }

    #[test]
    fn aim_stick_mines_at_full_reach_without_weapon() {
        let mut sim = sim();
        let stats = PlayerStats::default();
        sim.load_stage(Stage::Base, &stats);
        settle(&mut sim, &stats);

        let target = sim.player.center() + Vec2::X * mining::reach(&stats.upgrades);
        let block = Rect::from_center(target, Vec2::splat(BLOCK_SIZE));
        sim.store.insert(WorldObject::destructible(ObjectId(9001), block, ResourceKind::Scrap, 40.0));

        let mut stick = input::VirtualJoystick::default();
        stick.active = true;
        stick.current = Vec2::new(input::JOYSTICK_RADIUS, 0.0);
        let mut input = InputSnapshot::default();
        input.joysticks[1] = stick;
        sim.tick(&input, &stats, true);

        let health = sim.store.get(ObjectId(9001)).and_then(|o| o.health);
        assert!(health.is_some_and(|h| h.current < 40.0));
        assert_eq!(sim.cursor.map(|c| c.in_reach), Some(true));
    }

    #[test]
    fn attack_key_fires_once_then_waits_for_cooldown() {
        let mut sim = sim();
        let stats = PlayerStats {
            equipped_weapon: Some(WeaponKind::Melee),
            ..Default::default()
        };
        sim.load_stage(Stage::Base, &stats);
        settle(&mut sim, &stats);
        let fired = |out: &TickOutput| out.count(|e| matches!(e, SimEvent::WeaponFired(_)));
        let attack = InputSnapshot::default().with_key_held(KeyCode::KeyF);

        assert_eq!(fired(&sim.tick(&attack, &stats, true)), 1);
        assert_eq!(sim.projectiles.len(), 1);
        assert!(sim.weapons.cooldown() > 0);

        assert_eq!(fired(&sim.tick(&attack, &stats, true)), 0);
        assert_eq!(sim.projectiles.len(), 1);
    }

    #[test]
    fn scan_pulse_spreads_to_upgraded_range() {
        let mut sim = sim();
        let mut stats = PlayerStats::default();
        stats.upgrades.ore_scanner = 2;
        sim.load_stage(Stage::Mine, &stats);
        let scan = InputSnapshot::default().with_key_pressed(KeyCode::KeyQ);
        sim.tick(&scan, &stats, true);

        let pulse = sim.scan_pulse.expect("scan starts a pulse");
        assert_eq!(pulse.range, scan_range(2));
        for _ in 1..SCAN_PULSE_TICKS - 1 {
            sim.tick(&InputSnapshot::default(), &stats, true);
        }
        let pulse = sim.scan_pulse.expect("pulse still running");
        assert!(pulse.radius() > SCAN_RANGE);
    }

    #[test]
    fn pointer_picks_the_shaken_frame() {
        let mut sim = sim();
        let stats = PlayerStats::default();
        sim.load_stage(Stage::Base, &stats);
        settle(&mut sim, &stats);
        sim.shake.add(8.0, 100);
        sim.tick(&InputSnapshot::default(), &stats, true);
        assert_ne!(sim.shake.offset(), Vec2::ZERO);

        let pointer = Vec2::new(500.0, 300.0);
        let expected = sim.camera.position + sim.shake.offset() + pointer;
        let input = InputSnapshot::default().with_pointer(pointer, true, false);
        sim.tick(&input, &stats, true);
        assert_eq!(sim.cursor.map(|c| c.target), Some(expected));
    }
}
