//! Simulation steps and the trace that collects them.

use crate::automaton::{Action, Bracket, RejectReason, Stack, StackSymbol, State, Token};
use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The transition that produced a step, keyed by action.
///
/// Each variant carries only what is meaningful for it: a push has no
/// previous stack top, and only `Reject` has a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Step 0: the marker is pushed.
    Initialize,
    /// An opener was read and pushed.
    Push { read: Bracket },
    /// A closer was read and its opener popped.
    Pop { read: Bracket, popped: Bracket },
    /// The automaton entered `Reject`.
    Reject(Rejection),
    /// Input consumed with only the marker left.
    Accept,
}

/// Terminal rejection detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Closer `read` with `top` still on the stack.
    Mismatch { read: Bracket, top: Bracket },
    /// Closer `read` with only the marker on the stack.
    EmptyStack { read: Bracket },
    /// End of input with openers left.
    NonEmptyStack,
}

impl Rejection {
    pub const fn reason(self) -> RejectReason {
        match self {
            Rejection::Mismatch { .. } => RejectReason::Mismatch,
            Rejection::EmptyStack { .. } => RejectReason::EmptyStack,
            Rejection::NonEmptyStack => RejectReason::NonEmptyStack,
        }
    }
}

impl Transition {
    pub const fn state(self) -> State {
        match self {
            Transition::Initialize => State::Initial,
            Transition::Push { .. } | Transition::Pop { .. } => State::Processing,
            Transition::Reject(_) => State::Reject,
            Transition::Accept => State::Accept,
        }
    }

    /// Underflow and mismatch are failed pops; end-of-input outcomes complete.
    pub const fn action(self) -> Action {
        match self {
            Transition::Initialize => Action::Initialize,
            Transition::Push { .. } => Action::Push,
            Transition::Pop { .. }
            | Transition::Reject(Rejection::Mismatch { .. })
            | Transition::Reject(Rejection::EmptyStack { .. }) => Action::Pop,
            Transition::Reject(Rejection::NonEmptyStack) | Transition::Accept => Action::Complete,
        }
    }

    pub const fn read(self) -> Option<char> {
        match self {
            Transition::Push { read } => Some(read.open()),
            Transition::Pop { read, .. }
            | Transition::Reject(Rejection::Mismatch { read, .. })
            | Transition::Reject(Rejection::EmptyStack { read }) => Some(read.close()),
            _ => None,
        }
    }

    pub const fn previous_top(self) -> Option<StackSymbol> {
        match self {
            Transition::Pop { popped: b, .. }
            | Transition::Reject(Rejection::Mismatch { top: b, .. }) => Some(StackSymbol::Open(b)),
            _ => None,
        }
    }

    pub const fn reject_reason(self) -> Option<RejectReason> {
        match self {
            Transition::Reject(r) => Some(r.reason()),
            _ => None,
        }
    }
}

/// One immutable snapshot of the automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StepRecord", try_from = "StepRecord")]
pub struct SimulationStep {
    transition: Transition,
    stack: Stack,
    input: Arc<str>,
    position: usize,
}

impl SimulationStep {
    pub(crate) fn new(transition: Transition, stack: Stack, input: Arc<str>, position: usize) -> Self {
        Self {
            transition,
            stack,
            input,
            position,
        }
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    pub fn state(&self) -> State {
        self.transition.state()
    }

    pub fn action(&self) -> Action {
        self.transition.action()
    }

    /// Stack contents after this step. For a mismatch this is the stack
    /// before the failed pop, with the offending top still visible.
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// The full input string of the run.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// 0-based character index of the character consumed by this step, or
    /// the input length for `complete` steps.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read(&self) -> Option<char> {
        self.transition.read()
    }

    pub fn previous_top(&self) -> Option<StackSymbol> {
        self.transition.previous_top()
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        self.transition.reject_reason()
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    #[cfg_attr(not(feature = "replay"), allow(dead_code))]
    pub(crate) fn shares_input(&self, other: &SimulationStep) -> bool {
        self.input == other.input
    }
}

impl fmt::Display for SimulationStep {
    /// One-line explanation of the transition.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transition {
            Transition::Initialize => write!(
                f,
                "Starting in the initial state q0. Pushing the bottom stack marker '{}'.",
                StackSymbol::MARKER
            ),
            Transition::Push { read } => write!(
                f,
                "Read opening bracket '{}'. Pushing it onto the stack.",
                read.open()
            ),
            Transition::Pop { read, popped } => write!(
                f,
                "Read closing bracket '{}'. It matches the opening bracket '{}' on top of the stack. Popping the stack.",
                read.close(),
                popped.open()
            ),
            Transition::Reject(Rejection::Mismatch { read, top }) => write!(
                f,
                "Encountered closing bracket '{}' that doesn't match the top of the stack '{}'. String rejected.",
                read.close(),
                top.open()
            ),
            Transition::Reject(Rejection::EmptyStack { read }) => write!(
                f,
                "Encountered closing bracket '{}' but the stack is empty. String rejected.",
                read.close()
            ),
            Transition::Reject(Rejection::NonEmptyStack) => f.write_str(
                "All input characters have been processed, but the stack still contains unmatched opening brackets. String rejected.",
            ),
            Transition::Accept => f.write_str(
                "All input characters have been processed. The stack is empty except for the bottom marker, so the string is accepted.",
            ),
        }
    }
}

/// Flat wire form of a step, used for JSON and NDJSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub state: State,
    pub action: Action,
    pub stack: String,
    pub input: String,
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_top: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<RejectReason>,
}

impl From<SimulationStep> for StepRecord {
    fn from(step: SimulationStep) -> Self {
        StepRecord {
            state: step.state(),
            action: step.action(),
            stack: step.stack.to_string(),
            input: step.input.to_string(),
            position: step.position,
            read: step.read(),
            previous_top: step.previous_top().map(char::from),
            reject_reason: step.reject_reason(),
        }
    }
}

impl TryFrom<StepRecord> for SimulationStep {
    type Error = RecordError;

    fn try_from(record: StepRecord) -> Result<Self, Self::Error> {
        let transition = record.transition()?;
        if transition.state() != record.state {
            return Err(RecordError::StateMismatch {
                state: record.state,
                action: record.action,
            });
        }
        let stack: Stack = record.stack.parse()?;
        Ok(SimulationStep::new(
            transition,
            stack,
            Arc::from(record.input),
            record.position,
        ))
    }
}

impl StepRecord {
    fn bracket(
        &self,
        field: &'static str,
        value: Option<char>,
        want_open: bool,
    ) -> Result<Bracket, RecordError> {
        match (value.and_then(Token::classify), want_open) {
            (Some(Token::Open(b)), true) | (Some(Token::Close(b)), false) => Ok(b),
            _ => Err(RecordError::BadBracket {
                action: self.action,
                field,
                expected: if want_open {
                    "an opening bracket"
                } else {
                    "a closing bracket"
                },
                found: value,
            }),
        }
    }

    fn transition(&self) -> Result<Transition, RecordError> {
        let closer = || self.bracket("read", self.read, false);
        let previous = || self.bracket("previousTop", self.previous_top, true);

        let transition = match (self.action, self.reject_reason) {
            (Action::Initialize, None) => Transition::Initialize,
            (Action::Push, None) => Transition::Push {
                read: self.bracket("read", self.read, true)?,
            },
            (Action::Pop, None) => Transition::Pop {
                read: closer()?,
                popped: previous()?,
            },
            (Action::Pop, Some(RejectReason::Mismatch)) => {
                Transition::Reject(Rejection::Mismatch {
                    read: closer()?,
                    top: previous()?,
                })
            }
            (Action::Pop, Some(RejectReason::EmptyStack)) => {
                Transition::Reject(Rejection::EmptyStack { read: closer()? })
            }
            (Action::Complete, Some(RejectReason::NonEmptyStack)) => {
                Transition::Reject(Rejection::NonEmptyStack)
            }
            (Action::Complete, None) => Transition::Accept,
            (action, Some(reason)) => {
                return Err(RecordError::ReasonNotAllowed { reason, action });
            }
        };
        Ok(transition)
    }
}

/// The ordered steps of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    steps: Vec<SimulationStep>,
}

impl Trace {
    pub(crate) fn from_steps(steps: Vec<SimulationStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[SimulationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SimulationStep> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationStep> {
        self.steps.iter()
    }

    /// The input the trace was produced from.
    pub fn input(&self) -> &str {
        self.steps.first().map_or("", SimulationStep::input)
    }

    /// The last step, which is terminal for any trace the engine produced.
    pub fn terminal(&self) -> Option<&SimulationStep> {
        self.steps.last()
    }

    /// Final state of the run.
    pub fn outcome(&self) -> Option<State> {
        self.terminal().map(SimulationStep::state)
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome() == Some(State::Accept)
    }

    pub fn into_steps(self) -> Vec<SimulationStep> {
        self.steps
    }
}

impl std::ops::Index<usize> for Trace {
    type Output = SimulationStep;

    fn index(&self, index: usize) -> &SimulationStep {
        &self.steps[index]
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a SimulationStep;
    type IntoIter = std::slice::Iter<'a, SimulationStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl IntoIterator for Trace {
    type Item = SimulationStep;
    type IntoIter = std::vec::IntoIter<SimulationStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(transition: Transition, stack: &str, position: usize) -> SimulationStep {
        SimulationStep::new(transition, stack.parse().unwrap(), Arc::from("(]"), position)
    }

    #[test]
    fn transition_projections() {
        let mismatch = Transition::Reject(Rejection::Mismatch {
            read: Bracket::Square,
            top: Bracket::Round,
        });
        assert_eq!(mismatch.state(), State::Reject);
        assert_eq!(mismatch.action(), Action::Pop);
        assert_eq!(mismatch.read(), Some(']'));
        assert_eq!(mismatch.previous_top(), Some(StackSymbol::Open(Bracket::Round)));
        assert_eq!(mismatch.reject_reason(), Some(RejectReason::Mismatch));

        let push = Transition::Push { read: Bracket::Curly };
        assert_eq!(push.read(), Some('{'));
        assert_eq!(push.previous_top(), None);
        assert_eq!(push.reject_reason(), None);

        assert_eq!(Transition::Reject(Rejection::NonEmptyStack).action(), Action::Complete);
        assert_eq!(Transition::Accept.action(), Action::Complete);
    }

    #[test]
    fn record_omits_absent_fields() {
        let json = serde_json::to_value(step(Transition::Initialize, "Z", 0)).unwrap();
        assert_eq!(json["state"], "initial");
        assert_eq!(json["action"], "initialize");
        assert_eq!(json["stack"], "Z");
        assert!(json.get("read").is_none());
        assert!(json.get("rejectReason").is_none());
    }

    #[test]
    fn record_restores_mismatch() {
        let original = step(
            Transition::Reject(Rejection::Mismatch {
                read: Bracket::Square,
                top: Bracket::Round,
            }),
            "Z(",
            1,
        );
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains(r#""rejectReason":"mismatch""#));
        assert!(json.contains(r#""previousTop":"(""#));
        let restored: SimulationStep = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn record_rejects_inconsistent_state() {
        let record = StepRecord {
            state: State::Accept,
            action: Action::Push,
            stack: "Z(".into(),
            input: "(".into(),
            position: 0,
            read: Some('('),
            previous_top: None,
            reject_reason: None,
        };
        assert_eq!(
            SimulationStep::try_from(record),
            Err(RecordError::StateMismatch {
                state: State::Accept,
                action: Action::Push,
            })
        );
    }

    #[test]
    fn record_rejects_reason_on_push() {
        let record = StepRecord {
            state: State::Reject,
            action: Action::Push,
            stack: "Z".into(),
            input: "(".into(),
            position: 0,
            read: Some('('),
            previous_top: None,
            reject_reason: Some(RejectReason::Mismatch),
        };
        let err = SimulationStep::try_from(record).unwrap_err();
        assert!(
            matches!(
                err,
                RecordError::ReasonNotAllowed {
                    reason: RejectReason::Mismatch,
                    action: Action::Push,
                }
            ),
            "{err:?}"
        );
        assert!(err.to_string().contains("not valid for a push step"), "{err}");
    }

    #[test]
    fn record_names_the_bad_bracket_field() {
        let record = StepRecord {
            state: State::Processing,
            action: Action::Pop,
            stack: "Z".into(),
            input: "()".into(),
            position: 1,
            read: Some(')'),
            previous_top: Some(']'),
            reject_reason: None,
        };
        let err = SimulationStep::try_from(record).unwrap_err();
        assert_eq!(
            err,
            RecordError::BadBracket {
                action: Action::Pop,
                field: "previousTop",
                expected: "an opening bracket",
                found: Some(']'),
            }
        );
        assert_eq!(
            err.to_string(),
            "pop step needs an opening bracket in 'previousTop', got Some(']')"
        );
    }

    #[test]
    fn record_rejects_unknown_stack_symbol() {
        let record = StepRecord {
            state: State::Processing,
            action: Action::Push,
            stack: "Z(x".into(),
            input: "(".into(),
            position: 0,
            read: Some('('),
            previous_top: None,
            reject_reason: None,
        };
        assert_eq!(
            SimulationStep::try_from(record),
            Err(RecordError::NotAStackSymbol('x'))
        );
    }
}
