//! Global undo/redo keyboard shortcuts.

use serde::{Deserialize, Serialize};

/// A key press with its modifier state.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// What currently holds keyboard focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Canvas,
    /// A text field; its own native undo takes precedence.
    TextInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
pub enum Shortcut {
    Undo,
    Redo,
}

impl Shortcut {
    /// Undo is ctrl/cmd+Z; redo is ctrl/cmd+shift+Z or ctrl/cmd+Y.
    pub fn resolve(
        chord: &KeyChord,
        focus: Focus,
    ) -> Option<Shortcut> {
        if focus == Focus::TextInput || !(chord.ctrl || chord.meta) {
            return None;
        }
        match (chord.key.to_ascii_lowercase().as_str(), chord.shift) {
            ("z", false) => Some(Shortcut::Undo),
            ("z", true) | ("y", _) => Some(Shortcut::Redo),
            _ => None,
        }
    }
}
