//! Hollowdeep - side-view survival mining on a derelict world

mod config;
mod effects;
mod events;
mod mining;
mod player;
mod render;
mod session;
mod simulation;
mod state;
mod stats;
mod vitals;
mod weapons;

use anyhow::Result;
use audio::{AudioSystem, SoundCue};
use engine_core::{FixedTicker, FrameSchedule};
use glam::Vec2;
use input::InputState;
use renderer::{DrawList, RenderError, Renderer};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Window, WindowId},
};

use config::GameConfig;
use session::{KeyOutcome, Session};

/// Everything the running game owns.
struct GameState {
    renderer: Renderer,
    /// `None` when no audio device could be opened.
    audio: Option<AudioSystem>,
    input: InputState,
    session: Session,
    ticker: FixedTicker,
    schedule: FrameSchedule,
    draw_list: DrawList,
    config: GameConfig,
    running: bool,
}

impl GameState {
    fn new(window: Arc<Window>, config: GameConfig) -> Result<Self> {
        let mut renderer = Renderer::new_blocking(window, config.vsync)?;
        renderer.load_images(&config.asset_dir.join("images"));

        let audio = match AudioSystem::new() {
            Ok(mut audio) => {
                audio.load_cues(&config.asset_dir);
                audio.set_master_volume(config.master_volume);
                Some(audio)
            }
            Err(e) => {
                log::warn!("Audio disabled: {}", e);
                None
            }
        };

        let (w, h) = renderer.dimensions();
        let viewport = Vec2::new(w as f32, h as f32);
        let mut input = InputState::new();
        input.set_window_width(viewport.x);

        Ok(Self {
            renderer,
            audio,
            input,
            session: Session::new(viewport),
            ticker: FixedTicker::new(config.tick_interval()),
            schedule: FrameSchedule::new(),
            draw_list: DrawList::new(viewport),
            config,
            running: true,
        })
    }

    /// Ask for the next frame unless one is already on its way.
    fn schedule_frame(&mut self) {
        if self.running && self.schedule.arm() {
            self.renderer.window.request_redraw();
        }
    }

    fn play(&mut self, cues: Vec<SoundCue>) {
        let Some(audio) = &mut self.audio else {
            return;
        };
        for cue in cues {
            if let Err(e) = audio.play(cue) {
                log::warn!("Could not play {}: {}", cue.name(), e);
            }
        }
    }

    /// One delivered frame: at most one tick, then a full redraw.
    fn frame(&mut self) {
        self.ticker.update();
        if self.ticker.should_tick() {
            let snapshot = self.input.snapshot();
            let cues = self.session.tick(&snapshot);
            self.input.consume_pressed();
            self.play(cues);
        }
        if let Some(audio) = &mut self.audio {
            audio.cleanup();
        }

        let (w, h) = self.renderer.dimensions();
        let viewport = Vec2::new(w as f32, h as f32);
        self.session
            .sim
            .render(&mut self.draw_list, viewport, self.ticker.elapsed_seconds());
        render::overlay::build(&mut self.draw_list, &self.session.hud());

        match self.renderer.render(&self.draw_list) {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.renderer.resize(self.renderer.size);
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("GPU out of memory");
                self.running = false;
            }
            Err(e) => log::warn!("Render error: {}", e),
        }
    }

    fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.schedule.cancel();
        if let Some(audio) = &mut self.audio {
            audio.stop_all();
        }
        self.config.save();
        log::info!(
            "Shut down after {} frames, {} ticks",
            self.ticker.frame_count(),
            self.ticker.tick_count()
        );
    }

    /// Returns true when the app should exit.
    fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                return true;
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.session.sim.set_viewport(size.width, size.height);
                self.input.set_window_width(size.width as f32);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if state == ElementState::Pressed && !repeat {
                    let mut cues = Vec::new();
                    let outcome = self.session.handle_key(key, &mut cues);
                    self.play(cues);
                    match outcome {
                        KeyOutcome::Exit => {
                            self.shutdown();
                            return true;
                        }
                        KeyOutcome::Consumed => return false,
                        KeyOutcome::PassThrough => {}
                    }
                }
                self.input.process_keyboard(key, state);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.process_cursor_position((position.x, position.y));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.process_mouse_button(button, state);
            }
            WindowEvent::Touch(touch) => {
                self.input
                    .process_touch(touch.id, touch.phase, (touch.location.x, touch.location.y));
            }
            WindowEvent::Focused(false) => self.input.reset(),
            WindowEvent::RedrawRequested => {
                if self.schedule.fire() {
                    self.frame();
                    self.schedule_frame();
                }
            }
            _ => {}
        }
        false
    }
}

/// Application handler for winit.
struct App {
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let config = GameConfig::load();
        let mut window_attrs = Window::default_attributes()
            .with_title("Hollowdeep")
            .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height));
        if config.fullscreen {
            window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match GameState::new(window, config) {
            Ok(mut state) => {
                state.schedule_frame();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Failed to initialize game: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.shutdown();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Hollowdeep");
    log::info!("Controls: A/D move, Space jump, E interact, left mouse mine, right mouse / F attack, Q scan, Esc pause");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
