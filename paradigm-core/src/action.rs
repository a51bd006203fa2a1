use serde::{Deserialize, Serialize};

/// What a stimulus tells the sequencer after `show()` returns.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
    Cancelled,
}

/// Action run after a wait stimulus is released.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FollowUp {
    Exit,
    #[default]
    Continue,
    Nothing,
    /// Kept verbatim so it can be reported; behaves like `Nothing`.
    Unrecognized(String),
}

impl FollowUp {
    pub fn flow(&self) -> Flow {
        match self {
            Self::Exit => Flow::Exit,
            Self::Continue | Self::Nothing | Self::Unrecognized(_) => Flow::Continue,
        }
    }
}

impl From<String> for FollowUp {
    fn from(value: String) -> Self {
        match value.as_str() {
            "exit" => Self::Exit,
            "continue" => Self::Continue,
            "nothing" => Self::Nothing,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<&str> for FollowUp {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<FollowUp> for String {
    fn from(value: FollowUp) -> Self {
        match value {
            FollowUp::Exit => "exit".into(),
            FollowUp::Continue => "continue".into(),
            FollowUp::Nothing => "nothing".into(),
            FollowUp::Unrecognized(other) => other,
        }
    }
}
