use std::collections::VecDeque;

use paradigm_core::{
    ButtonBox, Flow, Input, MediaBackend, ParadigmError, PortReader, Result, SequencerState,
    StimulusDescriptor, StopReason, Surface,
};
use paradigm_timing::{CancelToken, Clock};
use tracing::{debug, info, warn};

use crate::stimuli::{Facilities, Stage, Stimulus};

/// What to do when a port or button box read fails mid-run.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum HardwarePolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Log the failure and move on to the next stimulus.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub presented: usize,
    pub remaining: usize,
    pub reason: StopReason,
}

/// Presents queued stimuli one at a time on a surface it owns.
pub struct Sequencer<S, I, C>
where
    S: Surface,
    I: Input,
    C: Clock,
{
    state: SequencerState,
    queue: VecDeque<StimulusDescriptor>,
    exit_key: Option<String>,
    surface: S,
    input: I,
    clock: C,
    cancel: CancelToken,
    ports: Option<Box<dyn PortReader>>,
    button_box: Option<Box<dyn ButtonBox>>,
    media: Option<Box<dyn MediaBackend>>,
    ttl_address: Option<u16>,
    hardware_policy: HardwarePolicy,
    presented: usize,
    closed: bool,
}

impl<S, I, C> Sequencer<S, I, C>
where
    S: Surface,
    I: Input,
    C: Clock,
{
    pub fn new(surface: S, input: I, clock: C) -> Self {
        Self {
            state: SequencerState::default(),
            queue: VecDeque::new(),
            exit_key: None,
            surface,
            input,
            clock,
            cancel: CancelToken::new(),
            ports: None,
            button_box: None,
            media: None,
            ttl_address: None,
            hardware_policy: HardwarePolicy::default(),
            presented: 0,
            closed: false,
        }
    }

    pub fn with_exit_key(mut self, key: impl Into<String>) -> Self {
        self.exit_key = Some(key.into());
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_port_reader(mut self, ports: Box<dyn PortReader>) -> Self {
        self.ports = Some(ports);
        self
    }

    /// Address used by signal waits that do not name one.
    pub fn with_ttl_address(mut self, address: u16) -> Self {
        self.ttl_address = Some(address);
        self
    }

    pub fn with_button_box(mut self, button_box: Box<dyn ButtonBox>) -> Self {
        self.button_box = Some(button_box);
        self
    }

    pub fn with_media(mut self, media: Box<dyn MediaBackend>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_hardware_policy(mut self, policy: HardwarePolicy) -> Self {
        self.hardware_policy = policy;
        self
    }

    /// Appends to the back of the queue. Only allowed before `run`.
    pub fn enqueue(&mut self, descriptor: StimulusDescriptor) -> Result<()> {
        if !self.state.accepts_stimuli() {
            return Err(ParadigmError::InvalidState {
                operation: "enqueue",
                state: self.state,
            });
        }
        self.queue.push_back(descriptor);
        Ok(())
    }

    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = StimulusDescriptor>) -> Result<()> {
        for descriptor in descriptors {
            self.enqueue(descriptor)?;
        }
        Ok(())
    }

    /// Runs the queue to the end, the exit key, an exit action or cancellation,
    /// then closes the surface once.
    pub fn run(&mut self) -> Result<RunSummary> {
        if self.state != SequencerState::Ready {
            return Err(ParadigmError::InvalidState {
                operation: "run",
                state: self.state,
            });
        }
        if let Err(e) = self.validate() {
            self.terminate();
            return Err(e);
        }
        self.advance();
        info!(stimuli = self.queue.len(), "sequence started");

        let reason = match self.present_all() {
            Ok(reason) => reason,
            Err(e) => {
                self.terminate();
                return Err(e);
            }
        };

        self.advance();
        let summary = RunSummary {
            presented: self.presented,
            remaining: self.queue.len(),
            reason,
        };
        info!(
            presented = summary.presented,
            remaining = summary.remaining,
            reason = ?summary.reason,
            "sequence finished"
        );
        self.terminate();
        Ok(summary)
    }

    fn present_all(&mut self) -> Result<StopReason> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(StopReason::Cancelled);
            }
            if self.exit_key_pressed() {
                info!("exit key pressed");
                return Ok(StopReason::ExitKey);
            }
            let Some(descriptor) = self.queue.pop_front() else {
                return Ok(StopReason::Exhausted);
            };

            let index = self.presented;
            let kind = descriptor.kind();
            debug!(index, %kind, "presenting stimulus");
            let stimulus = Stimulus::instantiate(descriptor, self.ttl_address)?;

            let mut stage = Stage {
                surface: &mut self.surface,
                input: &mut self.input,
                clock: &self.clock,
                cancel: &self.cancel,
                ports: self.ports.as_deref_mut().map(|p| p as &mut dyn PortReader),
                button_box: self
                    .button_box
                    .as_deref_mut()
                    .map(|b| b as &mut dyn ButtonBox),
                media: self.media.as_deref_mut().map(|m| m as &mut dyn MediaBackend),
            };
            let outcome = stimulus.show(&mut stage);
            self.presented += 1;

            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(StopReason::ExitAction),
                Ok(Flow::Cancelled) => return Ok(StopReason::Cancelled),
                Err(e) if e.is_hardware() && self.hardware_policy == HardwarePolicy::Skip => {
                    warn!(index, %kind, "skipping stimulus after hardware error: {e}");
                }
                Err(e) => return Err(e),
            }

            if self.queue.is_empty() {
                return Ok(StopReason::Exhausted);
            }
        }
    }

    fn exit_key_pressed(&mut self) -> bool {
        let Some(exit_key) = &self.exit_key else {
            return false;
        };
        self.input
            .poll_pressed_keys()
            .iter()
            .any(|k| k == exit_key)
    }

    fn validate(&self) -> Result<()> {
        let facilities = Facilities {
            ports: self.ports.is_some(),
            button_box: self.button_box.is_some(),
            media: self.media.is_some(),
            ttl_address: self.ttl_address,
        };
        for (index, descriptor) in self.queue.iter().enumerate() {
            Stimulus::check(descriptor, &facilities).map_err(|e| match e {
                ParadigmError::Configuration(msg) => {
                    ParadigmError::config(format!("stimulus {index}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next() {
            self.state = next;
        }
    }

    /// Closes the surface at most once and ends in `Terminated`.
    fn terminate(&mut self) {
        if !self.closed {
            self.surface.close();
            self.closed = true;
        }
        self.state = SequencerState::Terminated;
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn presented(&self) -> usize {
        self.presented
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}
