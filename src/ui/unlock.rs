use crossterm::event::KeyCode;

use crate::utils::{MAX_PIN_ATTEMPTS, PIN_LENGTH};

// ============================================================================
// PIN PROMPT STATE
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
pub enum PromptEvent {
    Pending,
    Submit(String),
    Cancel,
}

/// Startup PIN prompt. Holds the digits typed so far and the number of
/// failed attempts.
#[derive(Debug, Default)]
pub struct PinPrompt {
    pub buffer: String,
    pub failures: u32,
}

impl PinPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, code: KeyCode) -> PromptEvent {
        match code {
            KeyCode::Esc => PromptEvent::Cancel,
            KeyCode::Enter => PromptEvent::Submit(std::mem::take(&mut self.buffer)),
            KeyCode::Backspace => {
                self.buffer.pop();
                PromptEvent::Pending
            }
            KeyCode::Char(c) if c.is_ascii_digit() && self.buffer.len() < PIN_LENGTH => {
                self.buffer.push(c);
                PromptEvent::Pending
            }
            _ => PromptEvent::Pending,
        }
    }

    /// Record a wrong PIN. Returns true once no attempts are left.
    pub fn record_failure(&mut self) -> bool {
        self.failures += 1;
        self.failures >= MAX_PIN_ATTEMPTS
    }

    pub fn attempts_left(&self) -> u32 {
        MAX_PIN_ATTEMPTS.saturating_sub(self.failures)
    }

    pub fn masked(&self) -> String {
        "*".repeat(self.buffer.len())
    }
}
