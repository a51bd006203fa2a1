use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use paradigm_core::Input;
use winit::keyboard::{Key, NamedKey};

/// Key presses collected on the event loop thread and drained by the sequencer.
#[derive(Debug, Clone, Default)]
pub struct SharedKeyboard {
    pressed: Arc<Mutex<VecDeque<String>>>,
}

impl SharedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, key: impl Into<String>) {
        self.lock().push_back(key.into());
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.pressed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Input for SharedKeyboard {
    fn poll_pressed_keys(&mut self) -> Vec<String> {
        self.lock().drain(..).collect()
    }

    fn clear_pending_events(&mut self) {
        self.lock().clear();
    }
}

/// Lower-case key name as used in experiment scripts.
pub fn key_name(key: &Key) -> Option<String> {
    let name = match key {
        Key::Named(named) => match named {
            NamedKey::Space => "space",
            NamedKey::Escape => "escape",
            NamedKey::Enter => "return",
            NamedKey::Tab => "tab",
            NamedKey::Backspace => "backspace",
            NamedKey::ArrowLeft => "left",
            NamedKey::ArrowRight => "right",
            NamedKey::ArrowUp => "up",
            NamedKey::ArrowDown => "down",
            _ => return None,
        },
        Key::Character(s) => return Some(s.to_lowercase()),
        _ => return None,
    };
    Some(name.to_string())
}
