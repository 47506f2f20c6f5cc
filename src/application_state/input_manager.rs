//! # Input Manager
//!
//! This module handles input processing for the application, including:
//! - Keyboard and mouse button state tracking across frames
//! - Mouse motion and wheel accumulation
//! - Producing one `ProcessedInputState` per simulation tick

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

const KEY_CODES: [KeyCode; 9] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::Space,
    KeyCode::ShiftLeft,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
];

const MOUSE_BUTTONS: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

/// Pixels of touchpad scrolling that count as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

/// Manages the state of all input devices and processes input events.
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,
    /// Keys that went down at any point this frame
    pub keys_pressed: Vec<KeyCode>,

    /// Current state of mouse inputs
    pub mouse_inputs: MouseInput,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a new InputManager with every tracked key and button released.
    pub fn new() -> Self {
        let released_keys: HashMap<KeyCode, bool> =
            KEY_CODES.iter().map(|key| (*key, false)).collect();
        let released_buttons: HashMap<MouseButton, bool> =
            MOUSE_BUTTONS.iter().map(|button| (*button, false)).collect();

        Self {
            keyboard_inputs_old: released_keys.clone(),
            keyboard_inputs_new: released_keys,
            keys_pressed: Vec::new(),
            mouse_inputs: MouseInput {
                mouse_button_inputs_old: released_buttons.clone(),
                mouse_button_inputs_new: released_buttons,
                ..MouseInput::default()
            },
        }
    }

    /// Records a key going up or down. Untracked keys are ignored.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = pressed;
            if pressed {
                self.keys_pressed.push(key);
            }
        }
    }

    /// Records a mouse button going up or down. Untracked buttons are ignored.
    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if let Some(button_state) = self.mouse_inputs.mouse_button_inputs_new.get_mut(&button) {
            *button_state = pressed;
            if pressed {
                self.mouse_inputs.clicked.push(button);
            }
        }
    }

    /// Processes a window event and updates internal input state.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        repeat: false,
                        ..
                    },
                ..
            } => self.set_key(*key, *state == ElementState::Pressed),
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse_inputs.mouse_scroll_lines += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.set_mouse_button(*button, *state == ElementState::Pressed)
            }
            _ => {}
        }
    }

    /// Adds mouse movement to this frame's delta.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) delta of mouse movement since the last event
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        self.mouse_inputs.mouse_delta.0 += delta.0;
        self.mouse_inputs.mouse_delta.1 += delta.1;
    }

    /// Creates a processed input state from the current raw boolean states.
    ///
    /// A key or button that went down and up again within the same frame still
    /// reports `Pressed`, so quick taps are never lost.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                let state = if !old_state && self.keys_pressed.contains(key) {
                    RawInputState::Pressed
                } else {
                    RawInputState::from_raw_states(old_state, new_state)
                };
                (*key, state)
            })
            .collect();

        let mouse_button_states = self
            .mouse_inputs
            .mouse_button_inputs_new
            .iter()
            .map(|(button, &new_state)| {
                let old_state = self
                    .mouse_inputs
                    .mouse_button_inputs_old
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                let state = if !old_state && self.mouse_inputs.clicked.contains(button) {
                    RawInputState::Pressed
                } else {
                    RawInputState::from_raw_states(old_state, new_state)
                };
                (*button, state)
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_delta: self.mouse_inputs.mouse_delta,
            scroll_steps: self.mouse_inputs.mouse_scroll_lines.trunc() as i32,
        }
    }

    /// Returns the processed input state and prepares for the next frame.
    ///
    /// Partial wheel lines carry over to the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.keyboard_inputs_old = self.keyboard_inputs_new.clone();
        self.mouse_inputs.mouse_button_inputs_old = self.mouse_inputs.mouse_button_inputs_new.clone();
        self.keys_pressed.clear();
        self.mouse_inputs.clicked.clear();
        self.mouse_inputs.mouse_scroll_lines = self.mouse_inputs.mouse_scroll_lines.fract();
        self.mouse_inputs.mouse_delta = (0.0, 0.0);
        processed_input
    }

    /// Releases every key and button and drops pending motion.
    ///
    /// Called when the window loses focus so nothing stays stuck down.
    pub fn reset_inputs(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_then_hold() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyW, true);
        let first = manager.get_and_reset_processed_input();
        assert_eq!(first.get_key_state(KeyCode::KeyW), RawInputState::Pressed);
        let second = manager.get_and_reset_processed_input();
        assert_eq!(second.get_key_state(KeyCode::KeyW), RawInputState::Held);
        assert_eq!(second.tick_input().forward, 1.0);
    }

    #[test]
    fn test_click_within_one_frame_fires_once() {
        let mut manager = InputManager::new();
        manager.set_mouse_button(MouseButton::Left, true);
        manager.set_mouse_button(MouseButton::Left, false);
        assert!(manager.get_and_reset_processed_input().tick_input().fire);
        assert!(!manager.get_and_reset_processed_input().tick_input().fire);
    }

    #[test]
    fn test_mouse_motion_accumulates_and_clears() {
        let mut manager = InputManager::new();
        manager.intake_mouse_motion((3.0, 1.0));
        manager.intake_mouse_motion((2.0, -4.0));
        let processed = manager.get_and_reset_processed_input();
        assert_eq!(processed.mouse_delta, (5.0, -3.0));
        assert_eq!(manager.get_and_reset_processed_input().mouse_delta, (0.0, 0.0));
    }

    #[test]
    fn test_reset_releases_keys() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::ShiftLeft, true);
        manager.get_and_reset_processed_input();
        manager.reset_inputs();
        let processed = manager.get_and_reset_processed_input();
        assert!(!processed.tick_input().sprint);
    }

    #[test]
    fn test_untracked_keys_are_ignored() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyQ, true);
        let processed = manager.get_and_reset_processed_input();
        assert_eq!(processed.get_key_state(KeyCode::KeyQ), RawInputState::NotPressed);
    }
}
