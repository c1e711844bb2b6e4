//! The trace-generating simulator.
//!
//! `simulate` runs the bracket-matching pushdown automaton over an input and
//! returns every step it takes. Rejections are terminal steps in the trace,
//! never errors.

use crate::automaton::{Stack, Token};
use crate::trace::{Rejection, SimulationStep, Trace, Transition};
use std::sync::Arc;
use tracing::{debug, trace};

/// Simulate the automaton on `input` and return its full trace.
///
/// Step 0 always initializes the stack to `[Z]` at position 0. Each opening
/// bracket emits a push, each matching closing bracket a pop. The trace ends
/// at the first `Reject`, or with a `complete` step once input runs out.
///
/// Characters outside `()[]{}` are skipped: they emit no step and do not
/// affect the automaton, although they still count toward positions. Use
/// [`InputGate`](crate::session::InputGate) to refuse them up front.
///
/// Positions are 0-based character indices, not byte offsets.
pub fn simulate(input: &str) -> Trace {
    let shared: Arc<str> = Arc::from(input);
    let mut stack = Stack::initialized();
    let mut steps = Vec::with_capacity(input.len() + 2);

    steps.push(SimulationStep::new(
        Transition::Initialize,
        stack.clone(),
        Arc::clone(&shared),
        0,
    ));

    let mut length = 0;
    for (position, c) in input.chars().enumerate() {
        length = position + 1;

        let transition = match Token::classify(c) {
            Some(Token::Open(bracket)) => {
                stack.push(bracket);
                Transition::Push { read: bracket }
            }
            Some(Token::Close(read)) => match stack.top_bracket() {
                None => Transition::Reject(Rejection::EmptyStack { read }),
                Some(top) if top == read => {
                    stack.pop_bracket();
                    Transition::Pop { read, popped: top }
                }
                // Stack is left untouched so the offending top stays visible.
                Some(top) => Transition::Reject(Rejection::Mismatch { read, top }),
            },
            None => {
                trace!(position, character = %c.escape_debug(), "Skipping non-bracket character");
                continue;
            }
        };

        trace!(position, character = %c, action = %transition.action(), stack = %stack, "Transition");
        steps.push(SimulationStep::new(
            transition,
            stack.clone(),
            Arc::clone(&shared),
            position,
        ));

        if transition.state().is_terminal() {
            debug!(input, position, reason = ?transition.reject_reason(), "Input rejected");
            return Trace::from_steps(steps);
        }
    }

    let transition = if stack.is_marker_only() {
        Transition::Accept
    } else {
        Transition::Reject(Rejection::NonEmptyStack)
    };
    debug!(
        input,
        steps = steps.len() + 1,
        outcome = %transition.state(),
        "Simulation complete"
    );
    steps.push(SimulationStep::new(transition, stack, shared, length));

    Trace::from_steps(steps)
}

/// Simulate each input independently, preserving order.
#[cfg(not(feature = "parallel"))]
pub fn simulate_all<S: AsRef<str>>(inputs: &[S]) -> Vec<Trace> {
    inputs.iter().map(|s| simulate(s.as_ref())).collect()
}

/// Simulate each input independently, preserving order.
///
/// Runs on the rayon global pool; traces share no state, so the result is
/// identical to the sequential version.
#[cfg(feature = "parallel")]
pub fn simulate_all<S: AsRef<str> + Sync>(inputs: &[S]) -> Vec<Trace> {
    use rayon::prelude::*;

    debug!(count = inputs.len(), "Simulating batch in parallel");
    inputs.par_iter().map(|s| simulate(s.as_ref())).collect()
}
