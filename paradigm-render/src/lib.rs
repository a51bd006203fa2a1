pub mod sink;
pub mod surface;
pub mod text;

pub use sink::{CaptureSink, Frame, FrameSink, NullSink};
pub use surface::SkiaSurface;
pub use text::{find_system_font, load_font, render_text_pixmap, TextCache};
