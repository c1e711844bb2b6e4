//! Alphabet, states and stack of the bracket-matching pushdown automaton.

use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three bracket pairs the automaton understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bracket {
    /// `(` and `)`
    Round,
    /// `[` and `]`
    Square,
    /// `{` and `}`
    Curly,
}

impl Bracket {
    pub const ALL: [Bracket; 3] = [Bracket::Round, Bracket::Square, Bracket::Curly];

    pub const fn open(self) -> char {
        match self {
            Bracket::Round => '(',
            Bracket::Square => '[',
            Bracket::Curly => '{',
        }
    }

    pub const fn close(self) -> char {
        match self {
            Bracket::Round => ')',
            Bracket::Square => ']',
            Bracket::Curly => '}',
        }
    }
}

/// Classification of one input character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Open(Bracket),
    Close(Bracket),
}

impl Token {
    /// Classify `c`, or `None` if it is outside the bracket alphabet.
    pub fn classify(c: char) -> Option<Token> {
        Bracket::ALL.into_iter().find_map(|b| {
            if c == b.open() {
                Some(Token::Open(b))
            } else if c == b.close() {
                Some(Token::Close(b))
            } else {
                None
            }
        })
    }
}

/// Whether `c` is one of `()[]{}`.
pub fn is_bracket(c: char) -> bool {
    Token::classify(c).is_some()
}

/// A symbol on the automaton stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum StackSymbol {
    /// The bottom marker `Z`, pushed once at initialization.
    Bottom,
    /// An unmatched opening bracket.
    Open(Bracket),
}

impl StackSymbol {
    pub const MARKER: char = 'Z';

    pub const fn as_char(self) -> char {
        match self {
            StackSymbol::Bottom => Self::MARKER,
            StackSymbol::Open(b) => b.open(),
        }
    }
}

impl From<StackSymbol> for char {
    fn from(symbol: StackSymbol) -> char {
        symbol.as_char()
    }
}

impl TryFrom<char> for StackSymbol {
    type Error = RecordError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        if c == Self::MARKER {
            return Ok(StackSymbol::Bottom);
        }
        match Token::classify(c) {
            Some(Token::Open(b)) => Ok(StackSymbol::Open(b)),
            _ => Err(RecordError::NotAStackSymbol(c)),
        }
    }
}

impl fmt::Display for StackSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Automaton control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Initial,
    Processing,
    Accept,
    Reject,
}

impl State {
    /// `Accept` and `Reject` have no outgoing transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, State::Accept | State::Reject)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Initial => "initial",
            State::Processing => "processing",
            State::Accept => "accept",
            State::Reject => "reject",
        };
        f.pad(name)
    }
}

/// What triggered a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Initialize,
    Push,
    Pop,
    Complete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Initialize => "initialize",
            Action::Push => "push",
            Action::Pop => "pop",
            Action::Complete => "complete",
        };
        f.pad(name)
    }
}

/// Why a run ended in `Reject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    /// Closing bracket whose opener is not on top of the stack.
    Mismatch,
    /// Closing bracket with only the marker on the stack.
    EmptyStack,
    /// Input consumed with unmatched openers left.
    NonEmptyStack,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RejectReason::Mismatch => "mismatch",
            RejectReason::EmptyStack => "emptyStack",
            RejectReason::NonEmptyStack => "nonEmptyStack",
        };
        f.pad(name)
    }
}

/// Automaton stack, bottom first.
///
/// The engine mutates one working `Stack` and stores clones of it in the
/// trace, so a snapshot never changes after it was taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack(Vec<StackSymbol>);

impl Stack {
    /// A stack holding only the bottom marker.
    pub fn initialized() -> Self {
        Stack(vec![StackSymbol::Bottom])
    }

    pub fn height(&self) -> usize {
        self.0.len()
    }

    pub fn top(&self) -> Option<StackSymbol> {
        self.0.last().copied()
    }

    /// The opener on top, if anything above the marker is present.
    pub fn top_bracket(&self) -> Option<Bracket> {
        match self.top() {
            Some(StackSymbol::Open(b)) => Some(b),
            _ => None,
        }
    }

    /// True when only the bottom marker remains.
    pub fn is_marker_only(&self) -> bool {
        self.0 == [StackSymbol::Bottom]
    }

    /// True when the bottom marker sits at the base and nowhere else.
    pub fn has_marker_at_bottom(&self) -> bool {
        matches!(self.0.first(), Some(StackSymbol::Bottom))
            && !self.0[1..].contains(&StackSymbol::Bottom)
    }

    pub fn symbols(&self) -> &[StackSymbol] {
        &self.0
    }

    pub(crate) fn push(&mut self, bracket: Bracket) {
        self.0.push(StackSymbol::Open(bracket));
    }

    /// Pop the top opener. The marker is never popped.
    pub(crate) fn pop_bracket(&mut self) -> Option<Bracket> {
        let top = self.top_bracket()?;
        self.0.pop();
        Some(top)
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Stack {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(StackSymbol::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(Stack)
    }
}

impl From<Vec<StackSymbol>> for Stack {
    fn from(symbols: Vec<StackSymbol>) -> Self {
        Stack(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_alphabet() {
        assert_eq!(Token::classify('('), Some(Token::Open(Bracket::Round)));
        assert_eq!(Token::classify(']'), Some(Token::Close(Bracket::Square)));
        assert_eq!(Token::classify('{'), Some(Token::Open(Bracket::Curly)));
        assert_eq!(Token::classify('a'), None);
        assert_eq!(Token::classify('Z'), None);
    }

    #[test]
    fn pop_never_removes_marker() {
        let mut stack = Stack::initialized();
        assert_eq!(stack.pop_bracket(), None);
        assert!(stack.is_marker_only());

        stack.push(Bracket::Curly);
        assert_eq!(stack.pop_bracket(), Some(Bracket::Curly));
        assert_eq!(stack.pop_bracket(), None);
        assert_eq!(stack.height(), 1);
    }

    #[test]
    fn stack_display_and_parse() {
        let mut stack = Stack::initialized();
        stack.push(Bracket::Round);
        stack.push(Bracket::Square);
        assert_eq!(stack.to_string(), "Z([");
        assert_eq!("Z([".parse::<Stack>().unwrap(), stack);
        assert_eq!(
            "Z(]".parse::<Stack>(),
            Err(RecordError::NotAStackSymbol(']'))
        );
    }

    #[test]
    fn marker_at_bottom_check() {
        assert!(Stack::initialized().has_marker_at_bottom());
        assert!(!"(".parse::<Stack>().unwrap().has_marker_at_bottom());
        assert!(!"Z(Z".parse::<Stack>().unwrap().has_marker_at_bottom());
        assert!(!Stack::from(Vec::new()).has_marker_at_bottom());
    }

    #[test]
    fn reject_reason_wire_names() {
        assert_eq!(
            serde_json::to_string(&RejectReason::EmptyStack).unwrap(),
            r#""emptyStack""#
        );
        assert_eq!(
            serde_json::to_string(&RejectReason::NonEmptyStack).unwrap(),
            r#""nonEmptyStack""#
        );
        assert_eq!(serde_json::to_string(&Action::Initialize).unwrap(), r#""initialize""#);
    }
}
