//! Logical player input
//!
//! The simulation never sees devices. Each tick it asks an [`InputQuery`]
//! whether a player's logical action is held, using that player's bindings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Logical actions a player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Kick,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Kick,
    ];
}

/// Key bindings for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerControls {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub kick: String,
}

impl PlayerControls {
    pub fn new(up: &str, down: &str, left: &str, right: &str, kick: &str) -> Self {
        Self {
            up: up.to_string(),
            down: down.to_string(),
            left: left.to_string(),
            right: right.to_string(),
            kick: kick.to_string(),
        }
    }

    /// Default bindings for player slot 0..=3 (wraps for larger slots)
    pub fn preset(slot: usize) -> Self {
        match slot % 4 {
            0 => Self::new("w", "s", "a", "d", " "),
            1 => Self::new("ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "Enter"),
            2 => Self::new("i", "k", "j", "l", ";"),
            _ => Self::new("8", "5", "4", "6", "+"),
        }
    }

    pub fn key_for(&self, action: Action) -> &str {
        match action {
            Action::Up => &self.up,
            Action::Down => &self.down,
            Action::Left => &self.left,
            Action::Right => &self.right,
            Action::Kick => &self.kick,
        }
    }
}

/// "Is this action currently held" capability
pub trait InputQuery {
    fn is_action_held(&self, controls: &PlayerControls, action: Action) -> bool;
}

/// Input where nothing is ever held
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputQuery for NoInput {
    fn is_action_held(&self, _controls: &PlayerControls, _action: Action) -> bool {
        false
    }
}

/// Set of key names currently held down, fed by the platform layer
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    down: HashSet<String>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.down.insert(key.to_string());
    }

    pub fn release(&mut self, key: &str) {
        self.down.remove(key);
    }

    pub fn release_all(&mut self) {
        self.down.clear();
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.down.contains(key)
    }

    /// Press or release the key bound to `action`
    pub fn set_action(&mut self, controls: &PlayerControls, action: Action, held: bool) {
        let key = controls.key_for(action);
        if held {
            self.press(key);
        } else {
            self.release(key);
        }
    }
}

impl InputQuery for HeldKeys {
    fn is_action_held(&self, controls: &PlayerControls, action: Action) -> bool {
        self.is_down(controls.key_for(action))
    }
}
