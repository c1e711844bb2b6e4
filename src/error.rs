//! Typed errors for bracket-pda.
//!
//! Automaton outcomes are never errors: a rejected input is a normal
//! [`Trace`](crate::Trace) ending in a `Reject` step. The types here cover
//! the operations around the engine that can actually fail.

use crate::automaton::{Action, RejectReason, State};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for bracket-pda operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Error while replaying or checking a trace.
    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    /// Error while exporting or importing a trace.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Raw input refused by the input gate.
    #[error("Input error: {0}")]
    Gate(#[from] GateError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Builder(#[from] BuilderError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error found while replaying a recorded trace or checking its invariants.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReplayError {
    /// The trace contains no steps at all.
    #[error("Trace has no steps")]
    EmptyTrace,

    /// Step 0 is not the initialization step over `[Z]` at cursor 0.
    #[error("Step 0 must initialize the automaton with [Z] at position 0, got: {found}")]
    BadInitialStep { found: String },

    /// A step's stack does not have the bottom marker at its base.
    #[error("Step {step}: stack {stack} is missing the bottom marker")]
    MissingMarker { step: usize, stack: String },

    /// The cursor moved backwards.
    #[error("Step {step}: position {position} is before previous position {previous}")]
    CursorRegression {
        step: usize,
        position: usize,
        previous: usize,
    },

    /// A step carries a different input string than step 0.
    #[error("Step {step}: input {found:?} differs from trace input {expected:?}")]
    InputChanged {
        step: usize,
        expected: String,
        found: String,
    },

    /// A step's position lies past the end of the input.
    #[error("Step {step}: position {position} is past the end of the input ({len} characters)")]
    PositionOutOfRange {
        step: usize,
        position: usize,
        len: usize,
    },

    /// The character a step claims to read is not the input character at its position.
    #[error("Step {step}: reads {found:?} at position {position}, but the input has {expected:?} there")]
    ReadMismatch {
        step: usize,
        position: usize,
        expected: Option<char>,
        found: char,
    },

    /// A step reads a character that an earlier step already consumed.
    #[error("Step {step}: position {position} was already consumed")]
    PositionRepeated { step: usize, position: usize },

    /// A bracket between two reading steps has no step of its own.
    #[error("Step {step}: bracket {found:?} at position {position} was skipped")]
    SkippedBracket {
        step: usize,
        position: usize,
        found: char,
    },

    /// A `complete` step before the whole input was consumed.
    #[error("Step {step}: completes at position {position}, but the input has {len} characters")]
    IncompleteInput {
        step: usize,
        position: usize,
        len: usize,
    },

    /// The transition is not possible from the previous step's stack.
    #[error("Step {step}: {reason}")]
    IllegalTransition { step: usize, reason: String },

    /// The stack does not follow from the previous stack and the transition.
    #[error("Step {step}: stack {found} does not follow from the transition, expected {expected}")]
    StackMismatch {
        step: usize,
        expected: String,
        found: String,
    },

    /// A terminal step is followed by further steps.
    #[error("Step {step} is terminal ({state}) but {remaining} more step(s) follow")]
    StepsAfterTerminal {
        step: usize,
        state: String,
        remaining: usize,
    },

    /// The last step is not terminal.
    #[error("Trace ends at step {step} in non-terminal state {state}")]
    Unterminated { step: usize, state: String },

    /// Recorded and re-simulated traces have different lengths.
    #[error("Trace for input {input:?} has {recorded} step(s), simulation produced {simulated}")]
    LengthMismatch {
        input: String,
        recorded: usize,
        simulated: usize,
    },

    /// A recorded step differs from the re-simulated one.
    #[error("Step mismatch for input {input:?} at step {step}:\n{diff}")]
    StepMismatch {
        input: String,
        step: usize,
        diff: String,
    },
}

/// Error during NDJSON export or import.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// Trace file not found.
    #[error("Trace file not found: {0}")]
    TraceFileNotFound(PathBuf),

    /// Trace source contains no steps.
    #[error("Trace is empty: {0}")]
    EmptyTrace(String),

    /// Invalid JSON in trace file.
    #[error("Invalid JSON on line {line}: {reason}")]
    InvalidJson { line: usize, reason: String },

    /// A record's index does not match its line order.
    #[error("Line {line}: expected step index {expected}, found {found}")]
    OutOfOrder {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A record cannot be turned back into a step.
    #[error("Line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    /// IO error during export.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A wire record that cannot be turned into a stack symbol or step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RecordError {
    /// Character is neither the marker nor an opening bracket.
    #[error("'{0}' is not a stack symbol")]
    NotAStackSymbol(char),

    /// A bracket field is missing or holds the wrong kind of bracket.
    #[error("{action} step needs {expected} in '{field}', got {found:?}")]
    BadBracket {
        action: Action,
        field: &'static str,
        expected: &'static str,
        found: Option<char>,
    },

    /// The recorded state is not the one the transition leads to.
    #[error("state {state} does not match {action} transition")]
    StateMismatch { state: State, action: Action },

    /// A reject reason on an action that cannot reject with it.
    #[error("reject reason {reason} is not valid for a {action} step")]
    ReasonNotAllowed { reason: RejectReason, action: Action },
}

/// Raw input refused by the [`InputGate`](crate::session::InputGate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GateError {
    /// Nothing left to simulate after trimming.
    #[error("Input is empty")]
    Empty,

    /// A character outside the bracket alphabet.
    #[error("Illegal character {found:?} at position {position}; only ()[]{{}} are allowed")]
    IllegalCharacter { found: char, position: usize },

    /// Rerun requested for a history slot that does not exist.
    #[error("No history entry at index {index} (history has {len})")]
    NoSuchEntry { index: usize, len: usize },
}

/// Error returned by configuration builders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BuilderError {
    /// A required field was not set.
    #[error("{builder}: missing required field '{field}'")]
    MissingRequiredField {
        builder: &'static str,
        field: &'static str,
    },

    /// A field was set to a value outside its valid range.
    #[error("{builder}: invalid value for '{field}': {reason}")]
    InvalidValue {
        builder: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// Result type alias using bracket-pda's Error.
pub type PdaResult<T> = std::result::Result<T, Error>;
