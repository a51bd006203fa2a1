#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use paradigm_core::{
    ButtonBox, ButtonEvent, Drawable, ImageFrame, Input, MediaBackend, Movie, PortReader, Result,
    Sound, SoundSource, Surface,
};
use paradigm_experiment::Sequencer;
use paradigm_timing::{CancelToken, Clock, ManualClock};

#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Text(String),
    Scale { marker: i32 },
    Image,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub drawn: Vec<Drawn>,
    pub flips: usize,
    pub closes: usize,
}

impl RecordingSurface {
    pub fn texts(&self) -> Vec<&str> {
        self.drawn
            .iter()
            .filter_map(|d| match d {
                Drawn::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (800, 600)
    }

    fn draw(&mut self, drawable: &Drawable<'_>) -> Result<()> {
        self.drawn.push(match drawable {
            Drawable::Text(item) => Drawn::Text(item.text.clone()),
            Drawable::RatingScale(view) => Drawn::Scale {
                marker: view.marker,
            },
            Drawable::Image(_) => Drawn::Image,
        });
        Ok(())
    }

    fn flip(&mut self) -> Result<()> {
        self.flips += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
    }

    fn is_closed(&self) -> bool {
        self.closes > 0
    }
}

/// Each poll returns the next scripted batch of keys, then nothing.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    pub polls: VecDeque<Vec<String>>,
    pub poll_count: usize,
    pub clears: usize,
    /// Fired once the script has run out.
    pub cancel_when_exhausted: Option<CancelToken>,
}

impl ScriptedInput {
    pub fn new(polls: &[&[&str]]) -> Self {
        Self {
            polls: polls
                .iter()
                .map(|batch| batch.iter().map(|k| k.to_string()).collect())
                .collect(),
            ..Self::default()
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn cancelling(mut self, token: CancelToken) -> Self {
        self.cancel_when_exhausted = Some(token);
        self
    }
}

impl Input for ScriptedInput {
    fn poll_pressed_keys(&mut self) -> Vec<String> {
        self.poll_count += 1;
        match self.polls.pop_front() {
            Some(keys) => keys,
            None => {
                if let Some(token) = &self.cancel_when_exhausted {
                    token.cancel();
                }
                Vec::new()
            }
        }
    }

    fn clear_pending_events(&mut self) {
        self.clears += 1;
    }
}

/// Returns scripted port values, repeating the last one.
pub struct ScriptedPort {
    pub values: VecDeque<io::Result<u8>>,
    pub last: u8,
    pub reads: Arc<AtomicUsize>,
}

impl ScriptedPort {
    pub fn new(values: &[u8]) -> Self {
        Self {
            values: values.iter().map(|v| Ok(*v)).collect(),
            last: values.last().copied().unwrap_or(0),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            values: VecDeque::from(vec![Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "port access denied",
            ))]),
            last: 0,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PortReader for ScriptedPort {
    fn read_port(&mut self, _address: u16) -> io::Result<u8> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.values.pop_front().unwrap_or(Ok(self.last))
    }
}

#[derive(Default)]
pub struct CountingButtonBox {
    pub polls: Arc<AtomicUsize>,
    pub clears: Arc<AtomicUsize>,
}

impl ButtonBox for CountingButtonBox {
    fn poll_events(&mut self) -> io::Result<Vec<ButtonEvent>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![ButtonEvent { key: "2".into() }])
    }

    fn clear_buffer(&mut self) -> io::Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Polls succeed with no events until poll number `fail_on`, which errors.
pub struct FlakyButtonBox {
    pub fail_on: usize,
    pub polls: usize,
}

impl FlakyButtonBox {
    pub fn failing_on(fail_on: usize) -> Self {
        Self { fail_on, polls: 0 }
    }
}

impl ButtonBox for FlakyButtonBox {
    fn poll_events(&mut self) -> io::Result<Vec<ButtonEvent>> {
        self.polls += 1;
        if self.polls == self.fail_on {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "button box disconnected"));
        }
        Ok(Vec::new())
    }

    fn clear_buffer(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Virtual clock that fires `token` once `at` has passed.
pub struct CancellingClock {
    inner: ManualClock,
    at: Duration,
    token: CancelToken,
}

impl CancellingClock {
    pub fn new(at: Duration, token: CancelToken) -> Self {
        Self {
            inner: ManualClock::new(),
            at,
            token,
        }
    }
}

impl Clock for CancellingClock {
    fn now(&self) -> Duration {
        self.inner.now()
    }

    fn sleep(&self, d: Duration) {
        self.inner.advance(d);
        if self.inner.now() >= self.at {
            self.token.cancel();
        }
    }
}

/// Movies last `frames` draws, each advancing the shared clock by `frame_time`.
pub struct FakeMedia {
    pub frames: usize,
    pub frame_time: Duration,
    pub sound_secs: f64,
    pub clock: Arc<ManualClock>,
    pub opened: Arc<Mutex<Vec<PathBuf>>>,
    pub played: Arc<AtomicUsize>,
}

impl FakeMedia {
    pub fn new(clock: Arc<ManualClock>, frames: usize) -> Self {
        Self {
            frames,
            frame_time: Duration::from_millis(500),
            sound_secs: 0.75,
            clock,
            opened: Arc::default(),
            played: Arc::default(),
        }
    }
}

impl MediaBackend for FakeMedia {
    fn open_sound(&mut self, source: &SoundSource, secs: Option<f64>) -> Result<Box<dyn Sound>> {
        let secs = match source {
            SoundSource::File(_) => self.sound_secs,
            _ => secs.unwrap_or(self.sound_secs),
        };
        Ok(Box::new(FakeSound {
            secs,
            played: self.played.clone(),
        }))
    }

    fn open_movie(&mut self, path: &Path, size: (f32, f32)) -> Result<Box<dyn Movie>> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(Box::new(FakeMovie {
            remaining: self.frames,
            frame_time: self.frame_time,
            clock: self.clock.clone(),
            frame: ImageFrame {
                width: 1,
                height: 1,
                rgba: vec![0, 0, 0, 255],
                pos: (0.0, 0.0),
                size,
            },
        }))
    }
}

struct FakeSound {
    secs: f64,
    played: Arc<AtomicUsize>,
}

impl Sound for FakeSound {
    fn play(&mut self) -> Result<()> {
        self.played.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.secs)
    }
}

struct FakeMovie {
    remaining: usize,
    frame_time: Duration,
    clock: Arc<ManualClock>,
    frame: ImageFrame,
}

impl Movie for FakeMovie {
    fn draw(&mut self, surface: &mut dyn Surface) -> Result<()> {
        surface.draw(&Drawable::Image(&self.frame))?;
        self.remaining = self.remaining.saturating_sub(1);
        self.clock.advance(self.frame_time);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}

pub type TestSequencer = Sequencer<RecordingSurface, ScriptedInput, Arc<ManualClock>>;

pub fn sequencer(input: ScriptedInput) -> (TestSequencer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let seq = Sequencer::new(RecordingSurface::default(), input, clock.clone());
    (seq, clock)
}

pub fn secs(clock: &ManualClock) -> f64 {
    clock.now().as_secs_f64()
}
