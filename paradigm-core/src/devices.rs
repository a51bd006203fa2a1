use std::path::{Path, PathBuf};
use std::time::Duration;

use paradigm_timing::{CancelToken, Clock};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::surface::Surface;

const KEY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Keyboard-like input. Key names are lower case (`"space"`, `"escape"`, `"left"`, `"a"`).
pub trait Input: Send {
    /// Returns and consumes the keys pressed since the last poll.
    fn poll_pressed_keys(&mut self) -> Vec<String>;
    fn clear_pending_events(&mut self);

    /// Blocks until one of `keys` is pressed. Returns `None` once `cancel` fires.
    fn wait_for_keys(
        &mut self,
        keys: &[String],
        clock: &dyn Clock,
        cancel: &CancelToken,
    ) -> Option<String> {
        self.clear_pending_events();
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            if let Some(hit) = self
                .poll_pressed_keys()
                .into_iter()
                .find(|k| keys.contains(k))
            {
                return Some(hit);
            }
            clock.sleep(KEY_POLL_INTERVAL);
        }
    }
}

/// Raw I/O port access, e.g. a parallel port carrying scanner TTL pulses.
pub trait PortReader: Send {
    fn read_port(&mut self, address: u16) -> std::io::Result<u8>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonEvent {
    pub key: String,
}

pub trait ButtonBox: Send {
    fn poll_events(&mut self) -> std::io::Result<Vec<ButtonEvent>>;
    fn clear_buffer(&mut self) -> std::io::Result<()>;
}

/// A pure tone, a note name or a sound file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSound", into = "RawSound")]
pub enum SoundSource {
    Pitch(f64),
    Note(String),
    File(PathBuf),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawSound {
    Number(f64),
    Text(String),
}

impl From<RawSound> for SoundSource {
    fn from(raw: RawSound) -> Self {
        match raw {
            RawSound::Number(hz) => Self::Pitch(hz),
            RawSound::Text(text) if is_note_name(&text) => Self::Note(text),
            RawSound::Text(text) => Self::File(PathBuf::from(text)),
        }
    }
}

impl From<SoundSource> for RawSound {
    fn from(source: SoundSource) -> Self {
        match source {
            SoundSource::Pitch(hz) => Self::Number(hz),
            SoundSource::Note(note) => Self::Text(note),
            SoundSource::File(path) => Self::Text(path.display().to_string()),
        }
    }
}

/// `A`..`G`, an optional `#` or `b`, an optional octave digit.
fn is_note_name(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(letter) = chars.next() else {
        return false;
    };
    if !('A'..='G').contains(&letter.to_ascii_uppercase()) {
        return false;
    }
    let rest: Vec<char> = chars.collect();
    match rest.as_slice() {
        [] => true,
        ['#' | 'b'] => true,
        [d] | ['#' | 'b', d] => d.is_ascii_digit(),
        _ => false,
    }
}

pub trait Sound: Send {
    fn play(&mut self) -> Result<()>;
    fn duration(&self) -> Duration;
}

pub trait Movie: Send {
    /// Draws the current frame and advances playback.
    fn draw(&mut self, surface: &mut dyn Surface) -> Result<()>;
    fn is_finished(&self) -> bool;
}

pub trait MediaBackend: Send {
    fn open_sound(&mut self, source: &SoundSource, secs: Option<f64>) -> Result<Box<dyn Sound>>;
    /// `size` is normalized, the movie is centred.
    fn open_movie(&mut self, path: &Path, size: (f32, f32)) -> Result<Box<dyn Movie>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use paradigm_timing::ManualClock;
    use std::collections::VecDeque;

    struct Scripted {
        polls: VecDeque<Vec<String>>,
        clears: usize,
    }

    impl Input for Scripted {
        fn poll_pressed_keys(&mut self) -> Vec<String> {
            self.polls.pop_front().unwrap_or_default()
        }

        fn clear_pending_events(&mut self) {
            self.clears += 1;
        }
    }

    #[test]
    fn waits_until_a_listed_key_arrives() {
        let mut input = Scripted {
            polls: VecDeque::from(vec![vec![], vec!["a".into()], vec!["space".into()]]),
            clears: 0,
        };
        let clock = ManualClock::new();
        let hit = input.wait_for_keys(&["space".into()], &clock, &CancelToken::new());
        assert_eq!(hit.as_deref(), Some("space"));
        assert_eq!(input.clears, 1);
        assert_eq!(clock.now(), KEY_POLL_INTERVAL * 2);
    }

    #[test]
    fn cancelled_wait_returns_none() {
        let mut input = Scripted {
            polls: VecDeque::new(),
            clears: 0,
        };
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(
            input.wait_for_keys(&["space".into()], &ManualClock::new(), &cancel),
            None
        );
    }

    #[test]
    fn classifies_note_names() {
        assert!(is_note_name("A"));
        assert!(is_note_name("Bb"));
        assert!(is_note_name("C#4"));
        assert!(!is_note_name("beep.wav"));
        assert!(!is_note_name(""));
    }
}
