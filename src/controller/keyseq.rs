use std::time::{Duration, Instant};

use super::debounce::Debounce;

/// Key codes for Meta, Shift, `A`: opens the automation modal.
pub const AUTOMATION_SEQUENCE: [u16; 3] = [91, 16, 65];

/// Quiet period after the last keypress before the buffer is cleared
pub const KEY_BUFFER_RESET: Duration = Duration::from_millis(1000);

/// Watches keypresses for an exact key-code sequence.
///
/// The whole buffer must equal the target: one extra key before or
/// after breaks the match until the buffer resets.
#[derive(Debug, Clone)]
pub struct KeySequenceDetector {
    target: Vec<u16>,
    buffer: Vec<u16>,
    reset: Debounce,
}

impl Default for KeySequenceDetector {
    fn default() -> Self {
        KeySequenceDetector::new(&AUTOMATION_SEQUENCE, KEY_BUFFER_RESET)
    }
}

impl KeySequenceDetector {
    pub fn new(target: &[u16], reset_after: Duration) -> Self {
        KeySequenceDetector {
            target: target.to_vec(),
            buffer: Vec::new(),
            reset: Debounce::new(reset_after),
        }
    }

    /// Record a keypress. Returns true when the buffer now equals the target.
    /// A reset that came due before `now` is applied first.
    pub fn press(&mut self, code: u16, now: Instant) -> bool {
        self.tick(now);
        self.buffer.push(code);
        self.reset.arm(now);
        self.buffer == self.target
    }

    /// Clear the buffer if the reset deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.reset.fire(now) {
            self.buffer.clear();
        }
    }

    /// Drop the buffer and any pending reset.
    pub fn cancel(&mut self) {
        self.reset.cancel();
        self.buffer.clear();
    }

    pub fn buffer(&self) -> &[u16] {
        &self.buffer
    }

    pub fn reset_deadline(&self) -> Option<Instant> {
        self.reset.deadline()
    }
}
