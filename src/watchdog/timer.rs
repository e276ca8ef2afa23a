use tokio::time::Instant;

/// Fire-once deadline that can be cancelled or rescheduled.
///
/// Holds at most one pending deadline; scheduling replaces it. The owner
/// waits on `deadline()` from its event loop, so rescheduling and
/// cancellation never race with a firing timer.
#[derive(Debug, Default)]
pub struct DeadlineTimer {
    deadline: Option<Instant>,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// Schedule the timer, replacing any pending deadline
    pub fn schedule(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    /// Cancel the pending deadline; returns true if one was pending
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it has elapsed by `now`
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if at <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
