//! Input gate: keeps anything but `()[]{}` away from the engine.

use crate::automaton::is_bracket;
use crate::error::GateError;

/// Validates raw text before it is simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputGate {
    trim: bool,
}

impl Default for InputGate {
    fn default() -> Self {
        Self { trim: true }
    }
}

impl InputGate {
    /// `trim` strips surrounding whitespace before checking.
    pub fn new(trim: bool) -> Self {
        Self { trim }
    }

    /// Return the string to simulate, or why it was refused.
    ///
    /// Positions in [`GateError::IllegalCharacter`] are character indices
    /// into the (trimmed) input.
    pub fn sanitize(&self, raw: &str) -> Result<String, GateError> {
        let candidate = if self.trim { raw.trim() } else { raw };
        if candidate.is_empty() {
            return Err(GateError::Empty);
        }
        if let Some((position, found)) = candidate.chars().enumerate().find(|(_, c)| !is_bracket(*c)) {
            return Err(GateError::IllegalCharacter { found, position });
        }
        Ok(candidate.to_string())
    }

    /// Keystroke filter for an editable field: the candidate replaces the
    /// current value only when it is empty or made entirely of brackets.
    pub fn filter_keystroke<'a>(&self, current: &'a str, candidate: &'a str) -> &'a str {
        if candidate.chars().all(is_bracket) {
            candidate
        } else {
            current
        }
    }
}
