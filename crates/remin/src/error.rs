use thiserror::Error;

use crate::automaton::StateId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegexError {
    #[error("Unbalanced ')' at position {position}")]
    Unbalanced { position: usize },
    #[error("{count} group(s) opened but never closed")]
    UnclosedGroup { count: usize },
    #[error("Symbol '{symbol}' at position {position} is not in the alphabet")]
    ForeignSymbol { symbol: char, position: usize },
    #[error("'{symbol}' is reserved and cannot be an alphabet symbol")]
    ReservedSymbol { symbol: char },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Operator '{operator}' at postfix position {position} is missing an operand")]
    MissingOperand { operator: char, position: usize },
    #[error("{0} fragments left after construction, expected exactly one")]
    DanglingFragments(usize),
    #[error("Grouping token '{token}' at postfix position {position}")]
    UnexpectedGrouping { token: char, position: usize },
}

// invariant violations, never expected on automata produced by this crate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("{state} has more than one transition on '{symbol}'")]
    Nondeterministic { state: StateId, symbol: char },
    #[error("{state} has an epsilon transition")]
    EpsilonTransition { state: StateId },
    #[error("Complete automaton has no transition from {state} on '{symbol}'")]
    MissingTransition { state: StateId, symbol: char },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Malformed automaton record: {0}")]
    Encoding(String),
    #[error("Record references state {0}, which is not listed")]
    InvalidState(u32),
    #[error("State {0} is listed more than once")]
    DuplicateState(u32),
    #[error("Symbol '{0}' is used but missing from the record alphabet")]
    InvalidSymbol(char),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Regex(#[from] RegexError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}
