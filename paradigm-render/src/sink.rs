use paradigm_core::Result;

/// A finished frame, RGBA8 row major.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub width: u32,
    pub height: u32,
    pub rgba: &'a [u8],
}

/// Where a flipped frame goes: a window, a file, a test buffer.
pub trait FrameSink: Send {
    fn present(&mut self, frame: Frame<'_>) -> Result<()>;
    fn close(&mut self);
}

#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: Frame<'_>) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) {}
}

/// Keeps every presented frame in memory.
#[derive(Debug, Default)]
pub struct CaptureSink {
    pub frames: Vec<Vec<u8>>,
    pub closes: usize,
}

impl FrameSink for CaptureSink {
    fn present(&mut self, frame: Frame<'_>) -> Result<()> {
        self.frames.push(frame.rgba.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}
