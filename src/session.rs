//! # Session Control Module
//!
//! Two-stage interrupt handling as an explicit state value instead of
//! ambient signal listeners: the first interrupt arms a confirm-exit
//! window, a second interrupt inside that window terminates the process,
//! and the window auto-disarms once it expires. The clock is passed in so
//! the behavior is exercised with simulated events.

use std::time::{Duration, Instant};

/// Default confirm-exit window
pub const EXIT_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

/// What the caller should do after an interrupt event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// First interrupt (or the previous window expired): warn and keep going
    Armed,
    /// Second interrupt inside the window: terminate
    Exit,
}

/// Explicit confirm-exit state owned by the top-level session controller
#[derive(Debug)]
pub struct ExitConfirmation {
    window: Duration,
    armed_until: Option<Instant>,
}

impl ExitConfirmation {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_until: None,
        }
    }

    /// Handle one interrupt event at time `now`
    pub fn on_interrupt(&mut self, now: Instant) -> InterruptAction {
        match self.armed_until {
            Some(deadline) if now < deadline => InterruptAction::Exit,
            _ => {
                self.armed_until = Some(now + self.window);
                InterruptAction::Armed
            }
        }
    }

    /// Whether the confirm window is live at time `now`
    pub fn is_armed(&self, now: Instant) -> bool {
        self.armed_until.map(|deadline| now < deadline).unwrap_or(false)
    }
}

impl Default for ExitConfirmation {
    fn default() -> Self {
        Self::new(EXIT_CONFIRM_WINDOW)
    }
}
