use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Shared presentation surface. Positions and sizes are normalized units:
/// both axes span `-1..1`, origin in the centre, y pointing up.
pub trait Surface: Send {
    /// Pixel dimensions of the backing buffer.
    fn size(&self) -> (u32, u32);
    fn draw(&mut self, drawable: &Drawable<'_>) -> Result<()>;
    /// Present what was drawn since the last flip and start a blank frame.
    fn flip(&mut self) -> Result<()>;
    fn close(&mut self);
    fn is_closed(&self) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub enum Drawable<'a> {
    Text(&'a TextItem),
    RatingScale(&'a ScaleView<'a>),
    Image(&'a ImageFrame),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub pos: (f32, f32),
    pub height: f32,
    pub wrap_width: Option<f32>,
    pub color: Rgba,
}

impl TextItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: (0.0, 0.0),
            height: 0.1,
            wrap_width: None,
            color: Rgba::white(),
        }
    }

    pub fn at(mut self, pos: (f32, f32)) -> Self {
        self.pos = pos;
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn wrap(mut self, width: f32) -> Self {
        self.wrap_width = Some(width);
        self
    }
}

/// Snapshot of a rating scale for one frame.
#[derive(Debug, Clone, Copy)]
pub struct ScaleView<'a> {
    pub low: i32,
    pub high: i32,
    pub ticks: &'a [i32],
    pub marker: i32,
    pub marker_style: MarkerStyle,
    pub marker_color: Rgba,
    pub description: &'a str,
    pub pos: (f32, f32),
    pub stretch: f32,
}

/// RGBA8 frame, row major, drawn centred on `pos` scaled to `size`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub pos: (f32, f32),
    pub size: (f32, f32),
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    #[default]
    Triangle,
    Circle,
    Slider,
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub fn white() -> Self {
        Rgba([255, 255, 255, 255])
    }

    pub fn black() -> Self {
        Rgba([0, 0, 0, 255])
    }

    pub fn gray() -> Self {
        Rgba([128, 128, 128, 255])
    }
}

impl FromStr for Rgba {
    type Err = String;

    /// Accepts a handful of color names (case-insensitive) and `#rrggbb` / `#rrggbbaa`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let named = match lower.as_str() {
            "white" => Some([255, 255, 255, 255]),
            "black" => Some([0, 0, 0, 255]),
            "gray" | "grey" => Some([128, 128, 128, 255]),
            "red" => Some([255, 0, 0, 255]),
            "green" => Some([0, 128, 0, 255]),
            "blue" => Some([0, 0, 255, 255]),
            "yellow" => Some([255, 255, 0, 255]),
            _ => None,
        };
        if let Some(rgba) = named {
            return Ok(Rgba(rgba));
        }

        let hex = lower
            .strip_prefix('#')
            .ok_or_else(|| format!("unknown color {s:?}"))?;
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return Err(format!("malformed hex color {s:?}"));
        }
        let mut out = [255u8; 4];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let part = std::str::from_utf8(chunk).map_err(|e| e.to_string())?;
            out[i] = u8::from_str_radix(part, 16).map_err(|e| format!("{s:?}: {e}"))?;
        }
        Ok(Rgba(out))
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}
