use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::action::FollowUp;
use crate::devices::SoundSource;
use crate::surface::{MarkerStyle, Rgba};

/// Inert description of one stimulus, consumed once by the sequencer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StimulusDescriptor {
    Text(TextArgs),
    Audio(AudioArgs),
    Video(VideoArgs),
    VideoRating(VideoRatingArgs),
    Pause(PauseArgs),
    WaitForSignal(WaitForSignalArgs),
    WaitForKey(WaitForKeyArgs),
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash)]
pub enum StimulusKind {
    Text,
    Audio,
    Video,
    VideoRating,
    Pause,
    WaitForSignal,
    WaitForKey,
}

impl fmt::Display for StimulusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::VideoRating => "video_rating",
            Self::Pause => "pause",
            Self::WaitForSignal => "wait_for_signal",
            Self::WaitForKey => "wait_for_key",
        };
        f.write_str(name)
    }
}

impl StimulusDescriptor {
    pub fn kind(&self) -> StimulusKind {
        match self {
            Self::Text(_) => StimulusKind::Text,
            Self::Audio(_) => StimulusKind::Audio,
            Self::Video(_) => StimulusKind::Video,
            Self::VideoRating(_) => StimulusKind::VideoRating,
            Self::Pause(_) => StimulusKind::Pause,
            Self::WaitForSignal(_) => StimulusKind::WaitForSignal,
            Self::WaitForKey(_) => StimulusKind::WaitForKey,
        }
    }

    pub fn needs_media(&self) -> bool {
        matches!(self, Self::Audio(_) | Self::Video(_) | Self::VideoRating(_))
    }

    pub fn text(text: impl Into<String>, duration: f64) -> Self {
        Self::Text(TextArgs::new(text, duration))
    }

    pub fn pause(duration: f64) -> Self {
        Self::Pause(PauseArgs { duration })
    }

    pub fn wait_for_key<K: Into<String>>(
        keys: impl IntoIterator<Item = K>,
        event: impl Into<FollowUp>,
    ) -> Self {
        Self::WaitForKey(WaitForKeyArgs {
            keys: keys.into_iter().map(Into::into).collect(),
            event: event.into(),
        })
    }

    pub fn wait_for_signal(address: Option<u16>, event: impl Into<FollowUp>) -> Self {
        Self::WaitForSignal(WaitForSignalArgs {
            address,
            event: event.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextArgs {
    pub text: String,
    #[serde(default = "default_text_duration")]
    pub duration: f64,
    /// Continuation keys; `None` advances as soon as `duration` has elapsed.
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub pos: (f32, f32),
    #[serde(default = "default_text_height")]
    pub height: f32,
}

impl TextArgs {
    pub fn new(text: impl Into<String>, duration: f64) -> Self {
        Self {
            text: text.into(),
            duration,
            keys: None,
            pos: (0.0, 0.0),
            height: default_text_height(),
        }
    }

    pub fn with_keys<K: Into<String>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioArgs {
    pub value: SoundSource,
    #[serde(default)]
    pub text: Option<String>,
    /// Tone length for pitch and note sources.
    #[serde(default)]
    pub secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoArgs {
    pub movie: PathBuf,
    /// Normalized size; half the window in each dimension when absent.
    #[serde(default)]
    pub movie_dimensions: Option<(f32, f32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRatingArgs {
    pub movie: PathBuf,
    pub destination_path: PathBuf,
    #[serde(default = "default_rating_movie_dimensions")]
    pub movie_dimensions: (f32, f32),
    #[serde(default = "default_tick_marks")]
    pub tick_marks: Vec<i32>,
    #[serde(default = "default_rating_description")]
    pub rating_description: String,
    #[serde(default)]
    pub header_text: Option<String>,
    #[serde(default = "default_header_size")]
    pub header_size: f32,
    #[serde(default = "default_stretch_horizontal")]
    pub stretch_horizontal: f32,
    #[serde(default)]
    pub marker_style: MarkerStyle,
    #[serde(default = "Rgba::white")]
    pub marker_color: Rgba,
    #[serde(default = "default_marker_start")]
    pub marker_start: i32,
    #[serde(default = "default_low")]
    pub low: i32,
    #[serde(default = "default_high")]
    pub high: i32,
    /// Drain the attached button box every frame.
    #[serde(default)]
    pub use_button_box: bool,
}

impl VideoRatingArgs {
    pub fn new(movie: impl Into<PathBuf>, destination_path: impl Into<PathBuf>) -> Self {
        Self {
            movie: movie.into(),
            destination_path: destination_path.into(),
            movie_dimensions: default_rating_movie_dimensions(),
            tick_marks: default_tick_marks(),
            rating_description: default_rating_description(),
            header_text: None,
            header_size: default_header_size(),
            stretch_horizontal: default_stretch_horizontal(),
            marker_style: MarkerStyle::default(),
            marker_color: Rgba::white(),
            marker_start: default_marker_start(),
            low: default_low(),
            high: default_high(),
            use_button_box: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseArgs {
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitForSignalArgs {
    /// TTL input address; the configured `ttl_in` is used when absent.
    #[serde(default)]
    pub address: Option<u16>,
    #[serde(default)]
    pub event: FollowUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitForKeyArgs {
    pub keys: Vec<String>,
    #[serde(default)]
    pub event: FollowUp,
}

fn default_text_duration() -> f64 {
    2.0
}

fn default_text_height() -> f32 {
    0.1
}

fn default_rating_movie_dimensions() -> (f32, f32) {
    (1.0, 1.0)
}

fn default_tick_marks() -> Vec<i32> {
    (1..=9).collect()
}

fn default_rating_description() -> String {
    "Very negative  . . .  Very positive".to_string()
}

fn default_header_size() -> f32 {
    0.15
}

fn default_stretch_horizontal() -> f32 {
    2.7
}

fn default_marker_start() -> i32 {
    5
}

fn default_low() -> i32 {
    1
}

fn default_high() -> i32 {
    9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_descriptors_with_defaults() {
        let json = r#"[
            {"kind": "text", "text": "Hello"},
            {"kind": "wait_for_key", "keys": ["space"], "event": "exit"},
            {"kind": "video_rating", "movie": "clip.mp4", "destination_path": "out.csv"},
            {"kind": "audio", "value": 440},
            {"kind": "audio", "value": "C#"}
        ]"#;
        let parsed: Vec<StimulusDescriptor> = serde_json::from_str(json).unwrap();

        let StimulusDescriptor::Text(text) = &parsed[0] else {
            panic!("expected text, got {:?}", parsed[0]);
        };
        assert_eq!(text.duration, 2.0);
        assert_eq!(text.keys, None);

        assert_eq!(
            parsed[1],
            StimulusDescriptor::wait_for_key(["space"], FollowUp::Exit)
        );

        let StimulusDescriptor::VideoRating(rating) = &parsed[2] else {
            panic!("expected video rating");
        };
        assert_eq!(rating.tick_marks, (1..=9).collect::<Vec<_>>());
        assert_eq!(rating.marker_start, 5);
        assert_eq!(rating.marker_color, Rgba::white());

        assert_eq!(parsed[3].kind(), StimulusKind::Audio);
        let StimulusDescriptor::Audio(audio) = &parsed[4] else {
            panic!("expected audio");
        };
        assert_eq!(audio.value, SoundSource::Note("C#".into()));
    }

    #[test]
    fn rejects_unknown_kinds() {
        let err = serde_json::from_str::<StimulusDescriptor>(r#"{"kind": "hologram"}"#);
        assert!(err.is_err());
    }
}
