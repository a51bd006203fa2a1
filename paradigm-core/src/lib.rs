pub mod action;
pub mod devices;
pub mod error;
pub mod rating;
pub mod state;
pub mod stimulus;
pub mod surface;

pub use action::{Flow, FollowUp};
pub use devices::{ButtonBox, ButtonEvent, Input, MediaBackend, Movie, PortReader, Sound, SoundSource};
pub use error::{ParadigmError, Result};
pub use rating::RatingEvent;
pub use state::{SequencerState, StopReason};
pub use stimulus::{
    AudioArgs, PauseArgs, StimulusDescriptor, StimulusKind, TextArgs, VideoArgs, VideoRatingArgs,
    WaitForKeyArgs, WaitForSignalArgs,
};
pub use surface::{Drawable, ImageFrame, MarkerStyle, Rgba, ScaleView, Surface, TextItem};
