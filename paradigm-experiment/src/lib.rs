pub mod config;
pub mod history;
pub mod rating;
pub mod script;
pub mod state;
pub mod stimuli;

pub use config::{
    resolve_config, ButtonBoxSettings, Environment, RatingDescriptions, Settings, Units, WindowMode,
};
pub use history::{write_history, HistoryWrite};
pub use rating::RatingScale;
pub use script::ExperimentScript;
pub use state::{HardwarePolicy, RunSummary, Sequencer};
pub use stimuli::{Stage, Stimulus};
