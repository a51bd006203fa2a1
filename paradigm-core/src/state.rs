use std::fmt;

/// Lifecycle of a sequencer run.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SequencerState {
    #[default]
    Ready,
    Running,
    Done,
    Terminated,
}

impl SequencerState {
    pub fn next(&self) -> Option<Self> {
        use SequencerState::*;
        Some(match self {
            Ready => Running,
            Running => Done,
            Done => Terminated,
            Terminated => return None,
        })
    }

    pub fn accepts_stimuli(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Done | Self::Terminated)
    }
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Done => "done",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Why a run stopped consuming the queue.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    ExitKey,
    ExitAction,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_lifecycle_in_order() {
        let mut state = SequencerState::default();
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            seen.push(next);
            state = next;
        }
        assert_eq!(
            seen,
            vec![
                SequencerState::Ready,
                SequencerState::Running,
                SequencerState::Done,
                SequencerState::Terminated
            ]
        );
        assert!(state.is_finished());
        assert!(!state.accepts_stimuli());
    }
}
