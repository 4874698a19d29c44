use std::time::{Duration, Instant};

/// How long the rising-text animation plays before the star is committed.
pub const RELEASE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReleaseError {
    #[error("nothing to release")]
    Empty,

    #[error("a release is already in flight")]
    InFlight,
}

#[derive(Debug, Clone)]
struct PendingRelease {
    text: String,
    started: Instant,
}

/// Holds at most one release between the user pressing release and the
/// star being committed. A second release while one is pending is rejected.
#[derive(Debug, Clone)]
pub struct ReleaseController {
    pending: Option<PendingRelease>,
    delay: Duration,
}

impl Default for ReleaseController {
    fn default() -> Self {
        Self::new(RELEASE_DELAY)
    }
}

impl ReleaseController {
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: None,
            delay,
        }
    }

    pub fn is_releasing(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_text(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.text.as_str())
    }

    /// Whether `text` could be released right now.
    pub fn can_release(&self, text: &str) -> bool {
        !text.trim().is_empty() && !self.is_releasing()
    }

    pub fn begin(&mut self, text: &str, now: Instant) -> Result<(), ReleaseError> {
        if text.trim().is_empty() {
            return Err(ReleaseError::Empty);
        }
        if self.pending.is_some() {
            return Err(ReleaseError::InFlight);
        }
        self.pending = Some(PendingRelease {
            text: text.to_string(),
            started: now,
        });
        Ok(())
    }

    /// Animation progress of the pending release in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> Option<f32> {
        let pending = self.pending.as_ref()?;
        if self.delay.is_zero() {
            return Some(1.0);
        }
        let elapsed = now.saturating_duration_since(pending.started);
        Some((elapsed.as_secs_f32() / self.delay.as_secs_f32()).min(1.0))
    }

    /// Hands back the released text once the delay has passed. The text is
    /// dropped from the controller at that point.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.started) >= self.delay);
        if !due {
            return None;
        }
        self.pending.take().map(|p| p.text)
    }
}
