/// How far the scripted log has escalated. Only ever moves forward until a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Phase {
    #[default]
    Stable,
    Instable,
    Untrusted,
}

/// Where the close interceptor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseState {
    /// No close request seen yet.
    Open,
    /// At least one request refused.
    Blocked,
    /// Final state persisted; the window may go away.
    Closing,
}

/// Answer to a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Allow,
    Deny,
}

/// Generation counter for scheduled tasks. Tasks from an older epoch are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// The notepad's script state.
#[derive(Debug, Clone, Default)]
pub struct LogState {
    pub(crate) buffer: String,
    pub(crate) phase: Phase,
    pub(crate) manipulation_triggered: bool,
    pub(crate) close_attempts: u32,
}

impl LogState {
    pub(crate) fn with_buffer(buffer: String) -> Self {
        Self {
            buffer,
            ..Self::default()
        }
    }

    /// Last text seen in, or written to, the host.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn manipulation_triggered(&self) -> bool {
        self.manipulation_triggered
    }

    pub fn close_attempts(&self) -> u32 {
        self.close_attempts
    }

    pub(crate) fn reset_script(&mut self) {
        self.phase = Phase::Stable;
        self.manipulation_triggered = false;
    }
}
