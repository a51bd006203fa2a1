use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use paradigm_core::{
    Drawable, ImageFrame, MediaBackend, Movie, ParadigmError, Result, Sound, SoundSource,
    Surface, TextItem,
};
use paradigm_timing::Clock;
use tracing::{debug, info};

const DEFAULT_TONE_SECS: f64 = 0.5;
const PLACEHOLDER_SHADE: u8 = 40;

/// Stands in for audio and video decoding: sounds are silent but keep their
/// duration, movies show a flat frame with the file name for a fixed time.
pub struct PlaceholderMedia {
    clock: Arc<dyn Clock>,
    movie_secs: f64,
}

impl PlaceholderMedia {
    pub fn new(clock: Arc<dyn Clock>, movie_secs: f64) -> Self {
        Self { clock, movie_secs }
    }
}

impl MediaBackend for PlaceholderMedia {
    fn open_sound(&mut self, source: &SoundSource, secs: Option<f64>) -> Result<Box<dyn Sound>> {
        if let SoundSource::File(path) = source {
            if !path.is_file() {
                return Err(ParadigmError::Media(format!(
                    "sound file {} not found",
                    path.display()
                )));
            }
        }
        let secs = secs.unwrap_or(DEFAULT_TONE_SECS);
        Ok(Box::new(SilentSound {
            source: source.clone(),
            duration: Duration::from_secs_f64(secs.max(0.0)),
        }))
    }

    fn open_movie(&mut self, path: &Path, size: (f32, f32)) -> Result<Box<dyn Movie>> {
        if !path.is_file() {
            return Err(ParadigmError::Media(format!(
                "movie {} not found",
                path.display()
            )));
        }
        debug!(movie = %path.display(), secs = self.movie_secs, "opening placeholder movie");
        let shade = [PLACEHOLDER_SHADE, PLACEHOLDER_SHADE, PLACEHOLDER_SHADE, 255];
        Ok(Box::new(PlaceholderMovie {
            path: path.to_path_buf(),
            clock: Arc::clone(&self.clock),
            length: Duration::from_secs_f64(self.movie_secs.max(0.0)),
            started: None,
            frame: ImageFrame {
                width: 1,
                height: 1,
                rgba: shade.to_vec(),
                pos: (0.0, 0.0),
                size,
            },
            caption: TextItem::new(path.display().to_string())
                .height(0.06)
                .wrap(size.0),
        }))
    }
}

struct SilentSound {
    source: SoundSource,
    duration: Duration,
}

impl Sound for SilentSound {
    fn play(&mut self) -> Result<()> {
        info!(source = ?self.source, secs = self.duration.as_secs_f64(), "playing sound (placeholder)");
        Ok(())
    }

    fn duration(&self) -> Duration {
        self.duration
    }
}

struct PlaceholderMovie {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    length: Duration,
    started: Option<Duration>,
    frame: ImageFrame,
    caption: TextItem,
}

impl Movie for PlaceholderMovie {
    fn draw(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if self.started.is_none() {
            self.started = Some(self.clock.now());
            info!(movie = %self.path.display(), "playing movie (placeholder)");
        }
        surface.draw(&Drawable::Image(&self.frame))?;
        surface.draw(&Drawable::Text(&self.caption))
    }

    fn is_finished(&self) -> bool {
        self.started
            .is_some_and(|start| self.clock.elapsed(start) >= self.length)
    }
}
