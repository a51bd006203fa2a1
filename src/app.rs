use std::sync::Arc;
use std::thread::{self, JoinHandle};

use ab_glyph::FontArc;
use anyhow::{anyhow, Context, Result};
use paradigm_core::StimulusKind;
use paradigm_experiment::{ExperimentScript, RunSummary, Sequencer, Settings, WindowMode};
use paradigm_render::SkiaSurface;
use paradigm_timing::{CancelToken, HighPrecisionClock};
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Fullscreen, Window, WindowId},
};

use crate::hardware::DevPort;
use crate::keyboard::{key_name, SharedKeyboard};
use crate::media::PlaceholderMedia;
use crate::sink::{FrameBuffer, WindowSink};

const FALLBACK_REFRESH_HZ: f64 = 60.0;

type AppSequencer = Sequencer<SkiaSurface<WindowSink>, SharedKeyboard, Arc<HighPrecisionClock>>;

/// Messages from the sequencer thread to the event loop.
pub enum AppEvent {
    Frame(FrameBuffer),
    SurfaceClosed,
    Finished(paradigm_core::Result<RunSummary>),
}

pub struct App {
    settings: Settings,
    script: Option<ExperimentScript>,
    font: Option<FontArc>,
    proxy: Option<EventLoopProxy<AppEvent>>,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    keyboard: SharedKeyboard,
    cancel: CancelToken,
    worker: Option<JoinHandle<()>>,
    outcome: Option<paradigm_core::Result<RunSummary>>,
    failure: Option<anyhow::Error>,
    refresh_rate: Option<f64>,
    should_exit: bool,
}

impl App {
    pub fn new(settings: Settings, script: ExperimentScript, font: Option<FontArc>) -> Self {
        Self {
            settings,
            script: Some(script),
            font,
            proxy: None,
            window: None,
            pixels: None,
            keyboard: SharedKeyboard::new(),
            cancel: CancelToken::new(),
            worker: None,
            outcome: None,
            failure: None,
            refresh_rate: None,
            should_exit: false,
        }
    }

    pub fn run(mut self) -> Result<Option<RunSummary>> {
        let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
        self.proxy = Some(event_loop.create_proxy());
        info!(
            env = %self.settings.env,
            test = self.settings.test,
            platform = std::env::consts::OS,
            "starting experiment"
        );

        let result = event_loop.run_app(&mut self);

        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("sequencer thread panicked");
            }
        }
        result?;
        if let Some(failure) = self.failure.take() {
            return Err(failure);
        }
        match self.outcome.take() {
            Some(Ok(summary)) => Ok(Some(summary)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available"))?;

        self.refresh_rate = primary_monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let mut window_attributes = Window::default_attributes()
            .with_title("Paradigm")
            .with_resizable(false);
        window_attributes = match self.settings.window {
            WindowMode::Windowed { width, height } => {
                window_attributes.with_inner_size(PhysicalSize::new(width, height))
            }
            WindowMode::FullScreen => window_attributes
                .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor)))),
        };

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            refresh_hz = self.refresh_rate,
            "display configured"
        );

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface_texture)?);

        window.set_cursor_visible(self.settings.mouse_visible);
        self.window = Some(window);

        self.start_sequence(size.width, size.height)
    }

    fn build_sequencer(&mut self, width: u32, height: u32) -> Result<AppSequencer> {
        let script = self
            .script
            .take()
            .ok_or_else(|| anyhow!("the experiment has already been started"))?;
        let proxy = self
            .proxy
            .clone()
            .ok_or_else(|| anyhow!("event loop proxy missing"))?;

        let sink = WindowSink::new(proxy, self.refresh_rate.unwrap_or(FALLBACK_REFRESH_HZ));
        let surface = SkiaSurface::new(
            width,
            height,
            self.settings.background,
            self.font.clone(),
            sink,
        )
        .context("creating the presentation surface")?;

        let clock = Arc::new(HighPrecisionClock::new());
        let media = PlaceholderMedia::new(clock.clone(), self.settings.placeholder_movie_secs);
        let mut sequencer = Sequencer::new(surface, self.keyboard.clone(), clock)
            .with_cancel_token(self.cancel.clone())
            .with_media(Box::new(media));

        if let Some(key) = script.escape_key {
            sequencer = sequencer.with_exit_key(key);
        }
        if let Some(address) = self.settings.ttl_in {
            sequencer = sequencer.with_ttl_address(address);
        }
        let waits_for_signal = script
            .stimuli
            .iter()
            .any(|s| s.kind() == StimulusKind::WaitForSignal);
        if waits_for_signal {
            match DevPort::open() {
                Ok(port) => sequencer = sequencer.with_port_reader(Box::new(port)),
                Err(e) => warn!("cannot open the I/O port device: {e}"),
            }
        }
        if let Some(bb) = &self.settings.button_box {
            warn!(
                port = bb.port,
                baud = bb.baud_rate,
                "no button box driver available, keyboard input only"
            );
        }

        sequencer.extend(script.stimuli)?;
        Ok(sequencer)
    }

    fn start_sequence(&mut self, width: u32, height: u32) -> Result<()> {
        let mut sequencer = self.build_sequencer(width, height)?;
        let proxy = self
            .proxy
            .clone()
            .ok_or_else(|| anyhow!("event loop proxy missing"))?;

        let worker = thread::Builder::new()
            .name("sequencer".into())
            .spawn(move || {
                let result = sequencer.run();
                let _ = proxy.send_event(AppEvent::Finished(result));
            })
            .context("spawning the sequencer thread")?;
        self.worker = Some(worker);
        Ok(())
    }

    fn present(&mut self, frame: FrameBuffer) {
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };
        let target = pixels.frame_mut();
        if target.len() != frame.rgba.len() {
            warn!(
                width = frame.width,
                height = frame.height,
                "dropping frame with mismatched size"
            );
            return;
        }
        target.copy_from_slice(&frame.rgba);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn render(&mut self) {
        if let Some(pixels) = &self.pixels {
            if let Err(e) = pixels.render() {
                error!("failed to render frame: {e}");
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!("failed to resize surface: {e}");
            }
        }
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!("failed to start the experiment: {e:#}");
                self.failure = Some(e);
                self.cleanup_and_exit(event_loop);
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Frame(frame) => self.present(frame),
            AppEvent::SurfaceClosed => debug!("presentation surface closed"),
            AppEvent::Finished(result) => {
                match &result {
                    Ok(summary) => info!(
                        presented = summary.presented,
                        reason = ?summary.reason,
                        "experiment completed"
                    ),
                    Err(e) => error!("experiment failed: {e}"),
                }
                self.outcome = Some(result);
                self.cleanup_and_exit(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("window closed, cancelling");
                self.cancel.cancel();
                if self.worker.is_none() {
                    self.cleanup_and_exit(event_loop);
                }
            }
            WindowEvent::RedrawRequested => self.render(),
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                if let Some(name) = key_name(&event.logical_key) {
                    debug!(key = %name, "key pressed");
                    self.keyboard.push(name);
                }
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
