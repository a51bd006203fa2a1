pub mod cancel;
pub mod frames;
pub mod timer;

pub use cancel::CancelToken;
pub use frames::{FrameRecorder, FrameStats};
pub use timer::{Clock, HighPrecisionClock, ManualClock};
