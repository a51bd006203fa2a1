use std::time::Duration;

use paradigm_core::{
    AudioArgs, ButtonBox, Drawable, Flow, FollowUp, Input, MediaBackend, Movie, ParadigmError,
    PauseArgs, PortReader, Result, StimulusDescriptor, Surface, TextArgs, TextItem, VideoArgs,
    VideoRatingArgs, WaitForKeyArgs, WaitForSignalArgs,
};
use paradigm_timing::{CancelToken, Clock};
use tracing::{debug, error, info, warn};

use crate::history::write_history;
use crate::rating::RatingScale;

const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Everything a stimulus may touch while it is shown. Borrowed for one `show()` only.
pub struct Stage<'a> {
    pub surface: &'a mut dyn Surface,
    pub input: &'a mut dyn Input,
    pub clock: &'a dyn Clock,
    pub cancel: &'a CancelToken,
    pub ports: Option<&'a mut dyn PortReader>,
    pub button_box: Option<&'a mut dyn ButtonBox>,
    pub media: Option<&'a mut dyn MediaBackend>,
}

impl<'a> Stage<'a> {
    fn media(&mut self) -> Result<&mut (dyn MediaBackend + 'a)> {
        match self.media.as_mut() {
            Some(media) => Ok(&mut **media),
            None => Err(ParadigmError::config("no media backend attached")),
        }
    }
}

/// What the stage can offer, for validating descriptors before a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Facilities {
    pub ports: bool,
    pub button_box: bool,
    pub media: bool,
    pub ttl_address: Option<u16>,
}

/// A stimulus ready to be shown exactly once.
#[derive(Debug, Clone)]
pub enum Stimulus {
    Text(Text),
    Audio(Audio),
    Video(Video),
    VideoRating(VideoRating),
    Pause(Pause),
    WaitForSignal(WaitForSignal),
    WaitForKey(WaitForKey),
}

impl Stimulus {
    /// Rejects descriptors that could not be shown with the given facilities.
    pub fn check(desc: &StimulusDescriptor, facilities: &Facilities) -> Result<()> {
        let kind = desc.kind();
        let fail = |msg: &str| Err(ParadigmError::config(format!("{kind}: {msg}")));

        if desc.needs_media() && !facilities.media {
            return fail("no media backend attached");
        }
        match desc {
            StimulusDescriptor::Text(args) => {
                if !is_duration(args.duration) {
                    return fail("duration must be a non-negative number of seconds");
                }
                if !(args.height > 0.0) {
                    return fail("height must be positive");
                }
            }
            StimulusDescriptor::Audio(args) => {
                if let Some(secs) = args.secs {
                    if !(secs.is_finite() && secs > 0.0) {
                        return fail("secs must be positive");
                    }
                }
            }
            StimulusDescriptor::Video(args) => {
                if let Some((w, h)) = args.movie_dimensions {
                    if !(w > 0.0 && h > 0.0) {
                        return fail("movie dimensions must be positive");
                    }
                }
            }
            StimulusDescriptor::VideoRating(args) => {
                if args.low >= args.high {
                    return fail("low must be below high");
                }
                if args.destination_path.as_os_str().is_empty() {
                    return fail("destination path is empty");
                }
                if args.use_button_box && !facilities.button_box {
                    return fail("button box requested but none attached");
                }
            }
            StimulusDescriptor::Pause(args) => {
                if !is_duration(args.duration) {
                    return fail("duration must be a non-negative number of seconds");
                }
            }
            StimulusDescriptor::WaitForSignal(args) => {
                if !facilities.ports {
                    return fail("no port reader attached");
                }
                if args.address.or(facilities.ttl_address).is_none() {
                    return fail("no TTL address given or configured");
                }
            }
            StimulusDescriptor::WaitForKey(args) => {
                if args.keys.is_empty() {
                    return fail("at least one key is required");
                }
            }
        }
        Ok(())
    }

    pub fn instantiate(desc: StimulusDescriptor, ttl_address: Option<u16>) -> Result<Self> {
        Ok(match desc {
            StimulusDescriptor::Text(args) => Self::Text(Text { args }),
            StimulusDescriptor::Audio(args) => Self::Audio(Audio { args }),
            StimulusDescriptor::Video(args) => Self::Video(Video { args }),
            StimulusDescriptor::VideoRating(args) => Self::VideoRating(VideoRating { args }),
            StimulusDescriptor::Pause(args) => Self::Pause(Pause { args }),
            StimulusDescriptor::WaitForSignal(WaitForSignalArgs { address, event }) => {
                let address = address.or(ttl_address).ok_or_else(|| {
                    ParadigmError::config("wait_for_signal: no TTL address given or configured")
                })?;
                Self::WaitForSignal(WaitForSignal { address, event })
            }
            StimulusDescriptor::WaitForKey(args) => Self::WaitForKey(WaitForKey { args }),
        })
    }

    pub fn show(self, stage: &mut Stage<'_>) -> Result<Flow> {
        match self {
            Self::Text(s) => s.show(stage),
            Self::Audio(s) => s.show(stage),
            Self::Video(s) => s.show(stage),
            Self::VideoRating(s) => s.show(stage),
            Self::Pause(s) => s.show(stage),
            Self::WaitForSignal(s) => s.show(stage),
            Self::WaitForKey(s) => s.show(stage),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Text {
    args: TextArgs,
}

impl Text {
    /// Shows the text for `duration`, then waits for a continuation key if any were given.
    pub fn show(self, stage: &mut Stage<'_>) -> Result<Flow> {
        let TextArgs {
            text,
            duration,
            keys,
            pos,
            height,
        } = self.args;
        let item = TextItem::new(text).at(pos).height(height);
        stage.surface.draw(&Drawable::Text(&item))?;
        stage.surface.flip()?;
        if !sleep_unless_cancelled(stage, seconds(duration)) {
            return Ok(Flow::Cancelled);
        }

        if let Some(keys) = keys.filter(|k| !k.is_empty()) {
            if stage
                .input
                .wait_for_keys(&keys, stage.clock, stage.cancel)
                .is_none()
            {
                return Ok(Flow::Cancelled);
            }
        }
        stage.surface.flip()?;
        Ok(Flow::Continue)
    }
}

#[derive(Debug, Clone)]
pub struct Audio {
    args: AudioArgs,
}

impl Audio {
    pub fn show(self, stage: &mut Stage<'_>) -> Result<Flow> {
        if let Some(caption) = &self.args.text {
            stage.surface.draw(&Drawable::Text(&TextItem::new(caption.as_str())))?;
        }
        stage.surface.flip()?;

        let mut sound = stage.media()?.open_sound(&self.args.value, self.args.secs)?;
        sound.play()?;
        if !sleep_unless_cancelled(stage, sound.duration()) {
            return Ok(Flow::Cancelled);
        }
        Ok(Flow::Continue)
    }
}

#[derive(Debug, Clone)]
pub struct Video {
    args: VideoArgs,
}

impl Video {
    /// Half the window in each dimension.
    const DEFAULT_SIZE: (f32, f32) = (1.0, 1.0);

    pub fn show(self, stage: &mut Stage<'_>) -> Result<Flow> {
        let size = self.args.movie_dimensions.unwrap_or(Self::DEFAULT_SIZE);
        let mut movie = stage.media()?.open_movie(&self.args.movie, size)?;

        while !movie.is_finished() {
            if stage.cancel.is_cancelled() {
                return Ok(Flow::Cancelled);
            }
            movie.draw(&mut *stage.surface)?;
            stage.surface.flip()?;
        }
        stage.surface.flip()?;
        Ok(Flow::Continue)
    }
}

#[derive(Debug, Clone)]
pub struct VideoRating {
    args: VideoRatingArgs,
}

impl VideoRating {
    const HEADER_POS: (f32, f32) = (0.0, 0.7);

    /// Plays the movie under a live rating scale, then saves the rating history.
    pub fn show(self, stage: &mut Stage<'_>) -> Result<Flow> {
        let args = self.args;
        let mut movie = stage.media()?.open_movie(&args.movie, args.movie_dimensions)?;
        let mut scale = RatingScale::from_args(&args);
        scale.reset();
        let header = args.header_text.as_ref().map(|text| {
            TextItem::new(text.as_str())
                .at(Self::HEADER_POS)
                .height(args.header_size)
                .wrap(2.0)
        });

        let started = stage.clock.now();
        let mut drained = 0usize;
        let outcome = loop {
            if movie.is_finished() {
                break Ok(Flow::Continue);
            }
            if stage.cancel.is_cancelled() {
                break Ok(Flow::Cancelled);
            }
            // Button box presses are read and dropped; they do not move the marker.
            if args.use_button_box {
                if let Some(bb) = stage.button_box.as_mut() {
                    let drain = bb
                        .poll_events()
                        .and_then(|events| bb.clear_buffer().map(|()| events.len()));
                    match drain {
                        Ok(n) => drained += n,
                        Err(e) => break Err(button_box_error(e)),
                    }
                }
            }
            let keys = stage.input.poll_pressed_keys();
            scale.handle_keys(&keys, stage.clock.elapsed(started).as_secs_f64());

            if let Err(e) = Self::draw_frame(stage, movie.as_mut(), &scale, header.as_ref()) {
                break Err(e);
            }
        };

        if drained > 0 {
            debug!(drained, "button box events drained without affecting the rating scale");
        }
        // Ratings collected so far are saved even when the presentation failed.
        if let Err(e) = write_history(&args.destination_path, scale.history()) {
            error!("{e}");
        }
        outcome
    }

    fn draw_frame(
        stage: &mut Stage<'_>,
        movie: &mut dyn Movie,
        scale: &RatingScale,
        header: Option<&TextItem>,
    ) -> Result<()> {
        movie.draw(&mut *stage.surface)?;
        stage.surface.draw(&Drawable::RatingScale(&scale.view()))?;
        if let Some(header) = header {
            stage.surface.draw(&Drawable::Text(header))?;
        }
        stage.surface.flip()
    }
}

#[derive(Debug, Clone)]
pub struct Pause {
    args: PauseArgs,
}

impl Pause {
    pub fn show(self, stage: &mut Stage<'_>) -> Result<Flow> {
        if !sleep_unless_cancelled(stage, seconds(self.args.duration)) {
            return Ok(Flow::Cancelled);
        }
        Ok(Flow::Continue)
    }
}

/// Blocks until the TTL input changes from the value first read.
#[derive(Debug, Clone)]
pub struct WaitForSignal {
    address: u16,
    event: FollowUp,
}

impl WaitForSignal {
    pub fn show(self, stage: &mut Stage<'_>) -> Result<Flow> {
        let address = self.address;
        let Some(ports) = stage.ports.as_mut() else {
            return Err(ParadigmError::config("wait_for_signal: no port reader attached"));
        };
        stage.input.clear_pending_events();

        let initial = ports
            .read_port(address)
            .map_err(|e| ParadigmError::port(address, e))?;
        debug!(address, initial, "waiting for TTL pulse");
        loop {
            if stage.cancel.is_cancelled() {
                return Ok(Flow::Cancelled);
            }
            let current = ports
                .read_port(address)
                .map_err(|e| ParadigmError::port(address, e))?;
            if current != initial {
                debug!(current, "TTL pulse received");
                break;
            }
            std::hint::spin_loop();
        }
        Ok(run_follow_up(&self.event))
    }
}

#[derive(Debug, Clone)]
pub struct WaitForKey {
    args: WaitForKeyArgs,
}

impl WaitForKey {
    pub fn show(self, stage: &mut Stage<'_>) -> Result<Flow> {
        match stage
            .input
            .wait_for_keys(&self.args.keys, stage.clock, stage.cancel)
        {
            Some(key) => {
                debug!(key = %key, "key received");
                Ok(run_follow_up(&self.args.event))
            }
            None => Ok(Flow::Cancelled),
        }
    }
}

/// Sleeps until `total` has passed on the stage clock, waking every slice to
/// check for cancellation. Returns `false` when cancelled.
fn sleep_unless_cancelled(stage: &Stage<'_>, total: Duration) -> bool {
    let deadline = stage.clock.now() + total;
    loop {
        if stage.cancel.is_cancelled() {
            return false;
        }
        let now = stage.clock.now();
        if now >= deadline {
            return true;
        }
        stage.clock.sleep((deadline - now).min(SLEEP_SLICE));
    }
}

fn run_follow_up(event: &FollowUp) -> Flow {
    match event {
        FollowUp::Exit => info!("exit requested by stimulus"),
        FollowUp::Continue | FollowUp::Nothing => {}
        FollowUp::Unrecognized(name) => warn!(event = %name, "event not recognized, doing nothing"),
    }
    event.flow()
}

fn button_box_error(source: std::io::Error) -> ParadigmError {
    ParadigmError::HardwareIo {
        device: "button box".into(),
        source,
    }
}

fn is_duration(secs: f64) -> bool {
    secs.is_finite() && secs >= 0.0
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
