//! Progress events emitted while a task list runs.

use tokio::sync::mpsc;

/// State transition or output of a single step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepState {
    /// Step action started
    Running,
    /// One line of output produced by the step
    Output(String),
    /// Skip predicate fired; carries the reason
    Skipped(String),
    /// Step finished successfully
    Succeeded,
    /// Step failed; carries the error message
    Failed(String),
}

/// A progress report for one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Step title
    pub title: String,
    /// Nesting level, 0 for top-level steps
    pub depth: usize,
    /// What happened
    pub state: StepState,
}

impl ProgressEvent {
    /// Create an event
    pub fn new(title: impl Into<String>, depth: usize, state: StepState) -> Self {
        Self {
            title: title.into(),
            depth,
            state,
        }
    }

    /// Whether this event closes the step (skipped, succeeded or failed)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            StepState::Skipped(_) | StepState::Succeeded | StepState::Failed(_)
        )
    }
}

/// Sending half of the progress stream.
///
/// Sending never fails a run: once the receiver is gone events are dropped.
#[derive(Debug, Clone, Default)]
pub struct ProgressSender {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSender {
    /// Create a sender together with the stream the caller consumes
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sender that discards everything
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emit an event
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx
            && tx.send(event).is_err()
        {
            log::trace!("Progress receiver dropped, discarding event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_reach_receiver_in_order() {
        let (sender, mut rx) = ProgressSender::channel();
        sender.emit(ProgressEvent::new("Git", 0, StepState::Running));
        sender.emit(ProgressEvent::new("Git", 0, StepState::Succeeded));

        assert_eq!(rx.try_recv().expect("first").state, StepState::Running);
        let last = rx.try_recv().expect("second");
        assert!(last.is_terminal());
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (sender, rx) = ProgressSender::channel();
        drop(rx);
        sender.emit(ProgressEvent::new("Git", 0, StepState::Running));
        ProgressSender::disabled().emit(ProgressEvent::new("Git", 0, StepState::Running));
    }
}
