use std::time::Duration;

use paradigm_core::{ParadigmError, Result};
use paradigm_render::{Frame, FrameSink};
use paradigm_timing::{Clock, HighPrecisionClock};
use winit::event_loop::EventLoopProxy;

use crate::app::AppEvent;

/// An owned copy of a flipped frame on its way to the window.
#[derive(Debug)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Forwards frames to the event loop, paced to the display refresh interval.
pub struct WindowSink {
    proxy: EventLoopProxy<AppEvent>,
    clock: HighPrecisionClock,
    interval: Duration,
    next_due: Option<Duration>,
}

impl WindowSink {
    pub fn new(proxy: EventLoopProxy<AppEvent>, refresh_hz: f64) -> Self {
        Self {
            proxy,
            clock: HighPrecisionClock::new(),
            interval: Duration::from_secs_f64(1.0 / refresh_hz.max(1.0)),
            next_due: None,
        }
    }
}

impl FrameSink for WindowSink {
    fn present(&mut self, frame: Frame<'_>) -> Result<()> {
        if let Some(due) = self.next_due {
            let now = self.clock.now();
            if due > now {
                self.clock.sleep(due - now);
            }
        }
        self.next_due = Some(self.clock.now() + self.interval);

        self.proxy
            .send_event(AppEvent::Frame(FrameBuffer {
                width: frame.width,
                height: frame.height,
                rgba: frame.rgba.to_vec(),
            }))
            .map_err(|_| ParadigmError::Surface("window event loop has exited".into()))
    }

    fn close(&mut self) {
        let _ = self.proxy.send_event(AppEvent::SurfaceClosed);
    }
}
