use std::fmt;
use std::str::FromStr;

use paradigm_core::{ParadigmError, Rgba};
use tracing::Level;

/// Where the experiment runs.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Development outside the scanner room.
    Dev,
    Mri,
    /// Mock scanner: MRI hardware without a TTL line.
    Sim,
}

impl FromStr for Environment {
    type Err = ParadigmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "mri" => Ok(Self::Mri),
            "sim" => Ok(Self::Sim),
            other => Err(ParadigmError::config(format!(
                "environment {other:?} not supported"
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dev => "dev",
            Self::Mri => "mri",
            Self::Sim => "sim",
        })
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum WindowMode {
    Windowed { width: u32, height: u32 },
    FullScreen,
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Norm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonBoxSettings {
    pub port: u8,
    pub baud_rate: u32,
    pub left_key: String,
    pub right_key: String,
}

/// Scale captions used by the gaze/self/other rating blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingDescriptions {
    pub gaze: String,
    pub own: String,
    pub other: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub env: Environment,
    pub test: bool,
    pub mouse_visible: bool,
    pub logging_level: Level,
    pub window: WindowMode,
    pub background: Rgba,
    pub units: Units,
    pub button_box: Option<ButtonBoxSettings>,
    /// Physiology recorder output port.
    pub biopac_out: Option<u16>,
    /// Scanner TTL input port.
    pub ttl_in: Option<u16>,
    pub n_runs: Option<u32>,
    pub rating_descriptions: Option<RatingDescriptions>,
    /// How long a placeholder movie runs when no decoder is available.
    pub placeholder_movie_secs: f64,
}

/// Builds the settings for `env`: base values, then test or production
/// overrides, then the environment's own values.
pub fn resolve_config(env: Environment, test: bool) -> Settings {
    let mut settings = Settings {
        env,
        test: false,
        mouse_visible: false,
        logging_level: Level::INFO,
        window: WindowMode::Windowed {
            width: 720,
            height: 480,
        },
        background: Rgba::black(),
        units: Units::Norm,
        button_box: None,
        biopac_out: None,
        ttl_in: None,
        n_runs: None,
        rating_descriptions: None,
        placeholder_movie_secs: 5.0,
    };

    if test {
        settings.test = true;
        settings.logging_level = Level::DEBUG;
    } else {
        settings.test = false;
        settings.logging_level = Level::INFO;
    }

    match env {
        Environment::Dev => {
            settings.window = WindowMode::Windowed {
                width: 800,
                height: 600,
            };
            settings.n_runs = Some(1);
            settings.rating_descriptions = Some(RatingDescriptions {
                gaze: spread("Left", "Right"),
                own: spread("Very Negative", "Very Positive"),
                other: spread("Very Negative", "Very Positive"),
            });
        }
        Environment::Mri => {
            settings.window = WindowMode::FullScreen;
            settings.button_box = Some(scanner_button_box());
            settings.biopac_out = Some(0x3010);
            settings.ttl_in = Some(0x3011);
        }
        Environment::Sim => {
            settings.window = WindowMode::FullScreen;
            settings.button_box = Some(scanner_button_box());
            settings.biopac_out = Some(0x3010);
        }
    }

    settings
}

fn scanner_button_box() -> ButtonBoxSettings {
    ButtonBoxSettings {
        port: 1,
        baud_rate: 19200,
        left_key: "2".into(),
        right_key: "1".into(),
    }
}

/// Pushes two labels to the ends of a scale caption.
fn spread(left: &str, right: &str) -> String {
    format!("{left}{}{right}", " ".repeat(40))
}
