use std::path::PathBuf;

use thiserror::Error;

use crate::state::SequencerState;

#[derive(Debug, Error)]
pub enum ParadigmError {
    /// Unknown environment, malformed descriptor or a missing facility.
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("cannot {operation} while the sequencer is {state}")]
    InvalidState {
        operation: &'static str,
        state: SequencerState,
    },
    #[error("hardware I/O error on {device}: {source}")]
    HardwareIo {
        device: String,
        #[source]
        source: std::io::Error,
    },
    #[error("surface error: {0}")]
    Surface(String),
    #[error("media error: {0}")]
    Media(String),
    #[error("failed to write rating history to {}: {source}", path.display())]
    History {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParadigmError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn port(address: u16, source: std::io::Error) -> Self {
        Self::HardwareIo {
            device: format!("port {address:#06x}"),
            source,
        }
    }

    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::HardwareIo { .. })
    }
}

pub type Result<T> = std::result::Result<T, ParadigmError>;
