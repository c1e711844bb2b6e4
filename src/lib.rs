//! bracket-pda: a deterministic pushdown automaton for balanced brackets
//! that records every transition it makes.
//!
//! The automaton reads a string over `()[]{}`, pushing openers and popping
//! them on matching closers, with a bottom marker `Z` that is never popped.
//! [`simulate`] returns a [`Trace`]: one immutable [`SimulationStep`] per
//! transition, each carrying its own copy of the stack.
//!
//! Rejection is data, not an error. A run ends in `Reject` with a
//! [`RejectReason`]:
//!
//! - `mismatch`: a closer whose opener is not on top of the stack
//! - `emptyStack`: a closer with only the marker on the stack
//! - `nonEmptyStack`: input exhausted with unmatched openers left
//!
//! Around the engine the crate provides:
//!
//! 1. **Sessions** ([`session`]): input gate, bounded run history and
//!    step-by-step playback, optionally timer-driven (`autoplay` feature).
//! 2. **Replay** (`replay` feature): check a trace's invariants and
//!    re-simulate it, reporting divergence as a unified diff.
//! 3. **NDJSON** (`ndjson` feature): write traces one step per line and
//!    load them back.
//!
//! # Quick Start
//!
//! ```
//! use bracket_pda::{simulate, Action, RejectReason, State};
//!
//! let trace = simulate("([{}])");
//! assert!(trace.is_accepted());
//! assert_eq!(trace[0].action(), Action::Initialize);
//!
//! let trace = simulate("(]");
//! let last = trace.terminal().unwrap();
//! assert_eq!(last.state(), State::Reject);
//! assert_eq!(last.reject_reason(), Some(RejectReason::Mismatch));
//! assert_eq!(last.position(), 1);
//! ```

mod builder;

pub mod automaton;
#[cfg(feature = "ndjson")]
pub mod emitter;
pub mod engine;
pub mod error;
#[cfg(feature = "replay")]
pub mod replay;
pub mod session;
pub mod trace;

// Re-export core types for convenience
pub use automaton::{Action, Bracket, RejectReason, Stack, StackSymbol, State};
#[cfg(feature = "ndjson")]
pub use emitter::{parse_ndjson, read_ndjson, write_ndjson, TraceEmitter};
pub use engine::{simulate, simulate_all};
pub use error::{
    BuilderError, Error, ExportError, GateError, PdaResult, RecordError, ReplayError,
};
#[cfg(feature = "replay")]
pub use replay::{check_trace, replay_trace, replay_traces};
pub use session::{History, HistoryEntry, InputGate, Playback, Session, SessionConfig};
pub use trace::{Rejection, SimulationStep, StepRecord, Trace, Transition};
