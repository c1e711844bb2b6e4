//! Trace replay and invariant checking.
//!
//! Traces that come from outside the engine (an NDJSON file, another
//! process) can be checked for structural soundness with [`check_trace`]
//! and compared against a fresh simulation with [`replay_trace`].

use crate::automaton::{is_bracket, Stack};
use crate::engine::simulate;
use crate::error::ReplayError;
use crate::trace::{Rejection, SimulationStep, Trace, Transition};
use similar::{ChangeTag, TextDiff};
use tracing::{debug, info};

/// Check that `trace` is shaped like something the engine could produce.
///
/// Verifies:
/// 1. Step 0 is `Initialize` over `[Z]` at position 0
/// 2. Every stack has the bottom marker at its base
/// 3. Every step carries the same input
/// 4. Positions never decrease and never pass the input length
/// 5. Each reading step reads the input character at its position, and no
///    bracket is passed over without a step
/// 6. Each stack follows from the previous one and the transition, so the
///    height never exceeds one plus the openers read so far
/// 7. `complete` steps sit at the input length
/// 8. Exactly one terminal step, and it is the last
pub fn check_trace(trace: &Trace) -> Result<(), ReplayError> {
    let first = trace.get(0).ok_or(ReplayError::EmptyTrace)?;
    if first.transition() != Transition::Initialize
        || !first.stack().is_marker_only()
        || first.position() != 0
    {
        return Err(ReplayError::BadInitialStep {
            found: format!(
                "{} at position {} with stack {}",
                first.action(),
                first.position(),
                first.stack()
            ),
        });
    }

    let chars: Vec<char> = first.input().chars().collect();
    let mut previous = 0;
    let mut unread = 0;
    for (idx, step) in trace.iter().enumerate() {
        if !step.stack().has_marker_at_bottom() {
            return Err(ReplayError::MissingMarker {
                step: idx,
                stack: step.stack().to_string(),
            });
        }

        if !step.shares_input(first) {
            return Err(ReplayError::InputChanged {
                step: idx,
                expected: first.input().to_string(),
                found: step.input().to_string(),
            });
        }

        if step.position() < previous {
            return Err(ReplayError::CursorRegression {
                step: idx,
                position: step.position(),
                previous,
            });
        }
        previous = step.position();

        if step.position() > chars.len() {
            return Err(ReplayError::PositionOutOfRange {
                step: idx,
                position: step.position(),
                len: chars.len(),
            });
        }

        if idx > 0 {
            unread = check_consumed(idx, step, &chars, unread)?;
            let prior = trace[idx - 1].stack();
            let expected = successor_stack(idx, prior, step.transition())?;
            if &expected != step.stack() {
                return Err(ReplayError::StackMismatch {
                    step: idx,
                    expected: expected.to_string(),
                    found: step.stack().to_string(),
                });
            }
        }

        if step.is_terminal() && idx + 1 < trace.len() {
            return Err(ReplayError::StepsAfterTerminal {
                step: idx,
                state: step.state().to_string(),
                remaining: trace.len() - idx - 1,
            });
        }
    }

    // Non-empty: step 0 was checked above.
    let last = &trace[trace.len() - 1];
    if !last.is_terminal() {
        return Err(ReplayError::Unterminated {
            step: trace.len() - 1,
            state: last.state().to_string(),
        });
    }

    Ok(())
}

/// Check what `step` consumes from `chars`, given that everything before
/// `unread` is already consumed. Returns the new `unread` index.
fn check_consumed(
    idx: usize,
    step: &SimulationStep,
    chars: &[char],
    unread: usize,
) -> Result<usize, ReplayError> {
    let position = step.position();
    let end = match step.read() {
        Some(found) => {
            if chars.get(position) != Some(&found) {
                return Err(ReplayError::ReadMismatch {
                    step: idx,
                    position,
                    expected: chars.get(position).copied(),
                    found,
                });
            }
            if position < unread {
                return Err(ReplayError::PositionRepeated {
                    step: idx,
                    position,
                });
            }
            position
        }
        None => {
            if position != chars.len() {
                return Err(ReplayError::IncompleteInput {
                    step: idx,
                    position,
                    len: chars.len(),
                });
            }
            chars.len()
        }
    };

    if let Some((skipped, &found)) = chars
        .iter()
        .enumerate()
        .take(end)
        .skip(unread)
        .find(|&(_, &c)| is_bracket(c))
    {
        return Err(ReplayError::SkippedBracket {
            step: idx,
            position: skipped,
            found,
        });
    }

    Ok(end + 1)
}

/// The stack `transition` leaves behind when taken from `prior`.
fn successor_stack(
    idx: usize,
    prior: &Stack,
    transition: Transition,
) -> Result<Stack, ReplayError> {
    let illegal = |reason: String| ReplayError::IllegalTransition { step: idx, reason };
    let top = || {
        prior
            .top_bracket()
            .map_or_else(|| "only the marker".to_string(), |b| format!("'{}'", b.open()))
    };

    let mut next = prior.clone();
    match transition {
        Transition::Initialize => {
            return Err(illegal("initialize can only be step 0".to_string()));
        }
        Transition::Push { read } => next.push(read),
        Transition::Pop { read, popped } => {
            if read != popped {
                return Err(illegal(format!(
                    "'{}' cannot pop '{}'",
                    read.close(),
                    popped.open()
                )));
            }
            if prior.top_bracket() != Some(popped) {
                return Err(illegal(format!(
                    "pops '{}' but the stack top is {}",
                    popped.open(),
                    top()
                )));
            }
            next.pop_bracket();
        }
        Transition::Reject(Rejection::Mismatch { read, top: claimed }) => {
            if read == claimed {
                return Err(illegal(format!(
                    "'{}' matches '{}' and cannot be a mismatch",
                    read.close(),
                    claimed.open()
                )));
            }
            if prior.top_bracket() != Some(claimed) {
                return Err(illegal(format!(
                    "mismatch names top '{}' but the stack top is {}",
                    claimed.open(),
                    top()
                )));
            }
        }
        Transition::Reject(Rejection::EmptyStack { .. }) => {
            if !prior.is_marker_only() {
                return Err(illegal(format!("emptyStack rejection with stack {prior}")));
            }
        }
        Transition::Reject(Rejection::NonEmptyStack) => {
            if prior.is_marker_only() {
                return Err(illegal(
                    "nonEmptyStack rejection with only the marker left".to_string(),
                ));
            }
        }
        Transition::Accept => {
            if !prior.is_marker_only() {
                return Err(illegal(format!("accept with stack {prior}")));
            }
        }
    }
    Ok(next)
}

/// Re-simulate the input of `recorded` and compare step by step.
///
/// The first diverging step is reported with a unified diff of both
/// versions. Steps are compared before lengths, so a truncated or extended
/// trace reports the length only when every shared step agrees.
pub fn replay_trace(recorded: &Trace) -> Result<(), ReplayError> {
    if recorded.is_empty() {
        return Err(ReplayError::EmptyTrace);
    }

    let input = recorded.input();
    let simulated = simulate(input);
    debug!(input, recorded = recorded.len(), simulated = simulated.len(), "Replaying trace");

    for (idx, (expected, actual)) in recorded.iter().zip(simulated.iter()).enumerate() {
        if expected != actual {
            let diff = unified_diff(&format!("{expected:#?}"), &format!("{actual:#?}"));
            return Err(ReplayError::StepMismatch {
                input: input.to_string(),
                step: idx,
                diff: format!("--- recorded\n+++ simulated\n{diff}"),
            });
        }
    }

    if recorded.len() != simulated.len() {
        return Err(ReplayError::LengthMismatch {
            input: input.to_string(),
            recorded: recorded.len(),
            simulated: simulated.len(),
        });
    }

    Ok(())
}

/// Replay multiple traces, stopping at the first failure.
pub fn replay_traces(traces: &[Trace]) -> Result<(), ReplayError> {
    info!(trace_count = traces.len(), "Replaying traces");

    for (idx, trace) in traces.iter().enumerate() {
        replay_trace(trace)?;
        debug!(trace = idx, "Trace replay successful");
    }

    info!(trace_count = traces.len(), "All traces replayed successfully");
    Ok(())
}

/// Produce a unified diff between two debug-formatted strings.
pub(crate) fn unified_diff(left: &str, right: &str) -> String {
    let diff = TextDiff::from_lines(left, right);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        output.push_str(sign);
        output.push_str(change.value());
        if !change.value().ends_with('\n') {
            output.push('\n');
        }
    }

    output
}
