//! Input handling for keyboard, mouse and touch.
//!
//! Window events feed [`InputState`]; once per tick the host takes an
//! [`InputSnapshot`], a plain value the simulation reads without touching winit
//! state. Touches become two virtual joysticks: the left half of the screen
//! moves, the right half aims and mines.

use glam::Vec2;
use std::collections::HashSet;

/// Drag distance in pixels that maps to a full joystick deflection.
pub const JOYSTICK_RADIUS: f32 = 60.0;
/// Deflection below this is ignored.
pub const JOYSTICK_DEADZONE: f32 = 0.2;
/// Horizontal deflection that counts as walking.
const WALK_THRESHOLD: f32 = 0.3;
/// Upward deflection that counts as jumping.
const JUMP_THRESHOLD: f32 = 0.5;

/// Logical game actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Jump,
    Interact,
    Attack,
    Scan,
    Pause,
}

impl Action {
    /// Keys bound to this action.
    pub fn keys(self) -> &'static [KeyCode] {
        match self {
            Action::Left => &[KeyCode::KeyA, KeyCode::ArrowLeft],
            Action::Right => &[KeyCode::KeyD, KeyCode::ArrowRight],
            Action::Jump => &[KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp],
            Action::Interact => &[KeyCode::KeyE],
            Action::Attack => &[KeyCode::KeyF],
            Action::Scan => &[KeyCode::KeyQ],
            Action::Pause => &[KeyCode::Escape],
        }
    }
}

/// On-screen stick driven by a single touch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VirtualJoystick {
    /// Where the touch started, in window pixels.
    pub origin: Vec2,
    pub current: Vec2,
    pub active: bool,
    touch_id: Option<u64>,
}

impl VirtualJoystick {
    /// Deflection scaled by [`JOYSTICK_RADIUS`] and clamped to unit length.
    pub fn vector(&self) -> Vec2 {
        if !self.active {
            return Vec2::ZERO;
        }
        ((self.current - self.origin) / JOYSTICK_RADIUS).clamp_length_max(1.0)
    }

    /// Direction when deflected past the dead zone.
    pub fn direction(&self) -> Option<Vec2> {
        let v = self.vector();
        (v.length() > JOYSTICK_DEADZONE).then(|| v.normalize())
    }

    fn press(&mut self, id: u64, at: Vec2) {
        self.origin = at;
        self.current = at;
        self.active = true;
        self.touch_id = Some(id);
    }

    fn release(&mut self) {
        *self = Self::default();
    }
}

/// Input as seen by one simulation tick.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pub keys_held: HashSet<KeyCode>,
    /// Keys pressed since the previous tick consumed input.
    pub keys_pressed: HashSet<KeyCode>,
    /// Pointer position in window pixels.
    pub pointer: Vec2,
    pub primary_down: bool,
    pub secondary_down: bool,
    /// 0 moves, 1 aims.
    pub joysticks: [VirtualJoystick; 2],
}

impl InputSnapshot {
    pub fn held(&self, action: Action) -> bool {
        if action.keys().iter().any(|k| self.keys_held.contains(k)) {
            return true;
        }
        let stick = self.joysticks[0].vector();
        match action {
            Action::Left => stick.x < -WALK_THRESHOLD,
            Action::Right => stick.x > WALK_THRESHOLD,
            Action::Jump => stick.y < -JUMP_THRESHOLD,
            _ => false,
        }
    }

    pub fn pressed(&self, action: Action) -> bool {
        action.keys().iter().any(|k| self.keys_pressed.contains(k))
    }

    /// -1, 0 or +1. Both directions held cancel out.
    pub fn horizontal(&self) -> f32 {
        let mut axis = 0.0;
        if self.held(Action::Left) {
            axis -= 1.0;
        }
        if self.held(Action::Right) {
            axis += 1.0;
        }
        axis
    }

    /// Aim direction from the second stick.
    pub fn aim(&self) -> Option<Vec2> {
        self.joysticks[1].direction()
    }

    pub fn with_key_held(mut self, key: KeyCode) -> Self {
        self.keys_held.insert(key);
        self
    }

    pub fn with_key_pressed(mut self, key: KeyCode) -> Self {
        self.keys_held.insert(key);
        self.keys_pressed.insert(key);
        self
    }

    pub fn with_pointer(mut self, pointer: Vec2, primary: bool, secondary: bool) -> Self {
        self.pointer = pointer;
        self.primary_down = primary;
        self.secondary_down = secondary;
        self
    }
}

/// Manages raw input state between ticks.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed since the last consume.
    keys_pressed: HashSet<KeyCode>,

    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,

    /// Mouse position in window coordinates.
    mouse_position: Vec2,

    joysticks: [VirtualJoystick; 2],
    /// Used to decide which stick a new touch belongs to.
    window_width: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_window_width(&mut self, width: f32) {
        self.window_width = width;
    }

    /// Clear edge-triggered state after a tick has read it.
    pub fn consume_pressed(&mut self) {
        self.keys_pressed.clear();
    }

    /// Drop everything held, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        self.keys_held.clear();
        self.keys_pressed.clear();
        self.mouse_held.clear();
        for stick in &mut self.joysticks {
            stick.release();
        }
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process cursor position update.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        self.mouse_position = Vec2::new(position.0 as f32, position.1 as f32);
    }

    /// Process a touch event. The stick is chosen by where the touch starts.
    pub fn process_touch(&mut self, id: u64, phase: TouchPhase, position: (f64, f64)) {
        let at = Vec2::new(position.0 as f32, position.1 as f32);
        match phase {
            TouchPhase::Started => {
                let index = if at.x < self.window_width * 0.5 { 0 } else { 1 };
                let stick = &mut self.joysticks[index];
                if stick.active {
                    log::debug!("Ignoring touch {id}: joystick {index} already held");
                    return;
                }
                stick.press(id, at);
            }
            TouchPhase::Moved => {
                if let Some(stick) = self.stick_for(id) {
                    stick.current = at;
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if let Some(stick) = self.stick_for(id) {
                    stick.release();
                }
            }
        }
    }

    fn stick_for(&mut self, id: u64) -> Option<&mut VirtualJoystick> {
        self.joysticks.iter_mut().find(|s| s.touch_id == Some(id))
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            keys_held: self.keys_held.clone(),
            keys_pressed: self.keys_pressed.clone(),
            pointer: self.mouse_position,
            primary_down: self.mouse_held.contains(&MouseButton::Left),
            secondary_down: self.mouse_held.contains(&MouseButton::Right),
            joysticks: self.joysticks,
        }
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton, TouchPhase};
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_repeat_is_not_a_new_press() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        input.consume_pressed();
        input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        let snap = input.snapshot();
        assert!(snap.held(Action::Jump));
        assert!(!snap.pressed(Action::Jump));
    }

    #[test]
    fn press_survives_until_consumed() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyE, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyE, ElementState::Released);
        assert!(input.snapshot().pressed(Action::Interact));
        input.consume_pressed();
        assert!(!input.snapshot().pressed(Action::Interact));
    }

    #[test]
    fn joystick_vector_is_clamped() {
        let stick = VirtualJoystick {
            origin: Vec2::ZERO,
            current: Vec2::new(300.0, 0.0),
            active: true,
            touch_id: Some(1),
        };
        assert_eq!(stick.vector(), Vec2::new(1.0, 0.0));
        let small = VirtualJoystick {
            current: Vec2::new(30.0, 0.0),
            ..stick
        };
        assert_eq!(small.vector(), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn touches_split_by_screen_half() {
        let mut input = InputState::new();
        input.set_window_width(800.0);
        input.process_touch(1, TouchPhase::Started, (100.0, 300.0));
        input.process_touch(2, TouchPhase::Started, (600.0, 300.0));
        input.process_touch(1, TouchPhase::Moved, (40.0, 300.0));
        let snap = input.snapshot();
        assert!(snap.held(Action::Left));
        assert!(snap.joysticks[1].active);
        assert!(snap.aim().is_none());

        input.process_touch(1, TouchPhase::Ended, (40.0, 300.0));
        assert!(!input.snapshot().joysticks[0].active);
        assert!(input.snapshot().joysticks[1].active);
    }

    #[test]
    fn opposite_directions_cancel() {
        let snap = InputSnapshot::default()
            .with_key_held(KeyCode::KeyA)
            .with_key_held(KeyCode::ArrowRight);
        assert_eq!(snap.horizontal(), 0.0);
    }
}
