//! # Input State
//!
//! Per-frame snapshots of the keyboard and mouse, and their translation into
//! the session's `TickInput`.

use std::collections::HashMap;

use winit::{event::MouseButton, keyboard::KeyCode};

use crate::engine_state::{entities::weapon::WeaponKind, TickInput};

/// Number keys that pick a weapon directly.
const WEAPON_KEYS: [(KeyCode, WeaponKind); 3] = [
    (KeyCode::Digit1, WeaponKind::Pistol),
    (KeyCode::Digit2, WeaponKind::Shotgun),
    (KeyCode::Digit3, WeaponKind::RocketLauncher),
];

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button went down this frame
    Pressed,
    /// Key/button has been down for more than one frame
    Held,
    /// Key/button went up this frame
    Released,
}

impl RawInputState {
    /// Pressed or held.
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Classifies a key from its state last frame and this frame.
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of the processed input states with state transitions.
#[derive(Debug, Default)]
pub struct ProcessedInputState {
    /// State of every tracked key
    pub keyboard_states: HashMap<KeyCode, RawInputState>,
    /// State of every tracked mouse button
    pub mouse_button_states: HashMap<MouseButton, RawInputState>,
    /// Mouse movement accumulated over the frame
    pub mouse_delta: (f64, f64),
    /// Whole wheel steps over the frame, positive away from the user
    pub scroll_steps: i32,
}

impl ProcessedInputState {
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    pub fn get_mouse_button_state(&self, button: MouseButton) -> RawInputState {
        self.mouse_button_states.get(&button).copied().unwrap_or_default()
    }

    fn axis(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.get_key_state(positive).is_active() {
            value += 1.0;
        }
        if self.get_key_state(negative).is_active() {
            value -= 1.0;
        }
        value
    }

    /// Translates the snapshot into what the player asked the session for.
    ///
    /// W/S walk, D/A strafe, Space jumps, left Shift sprints, the left button
    /// fires once per press, 1-3 pick a weapon and the wheel cycles through
    /// them (scrolling up picks the previous one).
    pub fn tick_input(&self) -> TickInput {
        let select = WEAPON_KEYS
            .iter()
            .find(|(key, _)| self.get_key_state(*key).is_just_pressed())
            .map(|(_, kind)| *kind);

        TickInput {
            forward: self.axis(KeyCode::KeyW, KeyCode::KeyS),
            strafe: self.axis(KeyCode::KeyD, KeyCode::KeyA),
            jump: self.get_key_state(KeyCode::Space).is_active(),
            sprint: self.get_key_state(KeyCode::ShiftLeft).is_active(),
            look_delta: (self.mouse_delta.0 as f32, self.mouse_delta.1 as f32),
            fire: self
                .get_mouse_button_state(MouseButton::Left)
                .is_just_pressed(),
            select,
            cycle: -self.scroll_steps,
        }
    }
}

/// Mouse state accumulated between frames.
#[derive(Debug, Default)]
pub struct MouseInput {
    /// Button states at the end of the previous frame
    pub mouse_button_inputs_old: HashMap<MouseButton, bool>,
    /// Button states now
    pub mouse_button_inputs_new: HashMap<MouseButton, bool>,
    /// Buttons that went down at any point this frame, even if already released
    pub clicked: Vec<MouseButton>,
    /// Wheel movement this frame, in lines
    pub mouse_scroll_lines: f32,
    /// Mouse movement this frame (x, y)
    pub mouse_delta: (f64, f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(keys: &[(KeyCode, RawInputState)]) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: keys.iter().copied().collect(),
            ..ProcessedInputState::default()
        }
    }

    #[test]
    fn test_transitions() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert!(!RawInputState::Released.is_active());
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let input = snapshot(&[
            (KeyCode::KeyW, RawInputState::Held),
            (KeyCode::KeyS, RawInputState::Pressed),
            (KeyCode::KeyD, RawInputState::Held),
        ])
        .tick_input();
        assert_eq!(input.forward, 0.0);
        assert_eq!(input.strafe, 1.0);
    }

    #[test]
    fn test_weapon_keys_fire_on_press_only() {
        let pressed = snapshot(&[(KeyCode::Digit3, RawInputState::Pressed)]).tick_input();
        assert_eq!(pressed.select, Some(WeaponKind::RocketLauncher));
        let held = snapshot(&[(KeyCode::Digit3, RawInputState::Held)]).tick_input();
        assert_eq!(held.select, None);
    }

    #[test]
    fn test_mouse_translation() {
        let mut state = ProcessedInputState {
            mouse_delta: (4.0, -2.0),
            scroll_steps: 1,
            ..ProcessedInputState::default()
        };
        state
            .mouse_button_states
            .insert(MouseButton::Left, RawInputState::Pressed);
        let input = state.tick_input();
        assert!(input.fire);
        assert_eq!(input.look_delta, (4.0, -2.0));
        assert_eq!(input.cycle, -1);
    }
}
