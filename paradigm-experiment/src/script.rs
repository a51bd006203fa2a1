use std::fs;
use std::path::Path;

use paradigm_core::{ParadigmError, Result, StimulusDescriptor};
use serde::{Deserialize, Serialize};

/// An experiment as authored on disk: the exit key plus the ordered stimuli.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentScript {
    #[serde(default = "default_escape_key")]
    pub escape_key: Option<String>,
    pub stimuli: Vec<StimulusDescriptor>,
}

fn default_escape_key() -> Option<String> {
    Some("escape".to_string())
}

impl ExperimentScript {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ParadigmError::config(format!("malformed experiment script: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            ParadigmError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}
