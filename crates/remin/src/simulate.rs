//! Running input through a DFA, and bounded checks built on top of that.

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::automaton::{Automaton, StateId};
use crate::error::AutomatonError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    /// Input consumed, final state is not accepting.
    Rejected,
    UnknownSymbol {
        position: usize,
        symbol: char,
    },
    /// Partial DFA with no move out of `state` on `symbol`.
    NoTransition {
        position: usize,
        state: StateId,
        symbol: char,
    },
    NoInitialState,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Accepted => write!(f, "accepted"),
            Outcome::Rejected => write!(f, "rejected: input ends in a non-accepting state"),
            Outcome::UnknownSymbol { position, symbol } => {
                write!(f, "rejected: '{}' at position {} is not in the alphabet", symbol, position)
            }
            Outcome::NoTransition { position, state, symbol } => write!(
                f,
                "rejected: no transition from {} on '{}' at position {}",
                state, symbol, position
            ),
            Outcome::NoInitialState => write!(f, "rejected: automaton has no initial state"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub position: usize,
    pub symbol: char,
    pub from: StateId,
    pub to: StateId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub outcome: Outcome,
    /// Every visited state, starting with the initial one.
    pub path: Vec<StateId>,
    pub steps: Vec<Step>,
}

impl Run {
    pub fn accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }

    pub fn final_state(&self) -> Option<StateId> {
        self.path.last().copied()
    }
}

/// Feeds `input` through `dfa` one character at a time. Rejections are
/// reported in the outcome; only a malformed automaton is an error.
pub fn run(dfa: &Automaton, input: &str) -> Result<Run, AutomatonError> {
    dfa.check_deterministic()?;

    let Some(mut state) = dfa.initial() else {
        return Ok(Run {
            outcome: Outcome::NoInitialState,
            path: Vec::new(),
            steps: Vec::new(),
        });
    };

    let mut path = vec![state];
    let mut steps = Vec::new();

    for (position, symbol) in input.chars().enumerate() {
        if !dfa.alphabet().contains(&symbol) {
            let outcome = Outcome::UnknownSymbol { position, symbol };
            return Ok(Run { outcome, path, steps });
        }

        let Some(next) = dfa.next_state(state, symbol)? else {
            let outcome = Outcome::NoTransition { position, state, symbol };
            return Ok(Run { outcome, path, steps });
        };

        steps.push(Step {
            position,
            symbol,
            from: state,
            to: next,
        });
        path.push(next);
        state = next;
    }

    let outcome = if dfa.is_accepting(state) {
        Outcome::Accepted
    } else {
        Outcome::Rejected
    };
    Ok(Run { outcome, path, steps })
}

pub fn accepts(dfa: &Automaton, input: &str) -> Result<bool, AutomatonError> {
    Ok(run(dfa, input)?.accepted())
}

/// Every word over `alphabet` of length at most `max_len`: shortest first,
/// lexicographic within one length, starting with the empty word.
pub fn words(alphabet: &BTreeSet<char>, max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];

    for _ in 0..max_len {
        frontier = frontier
            .iter()
            .flat_map(|word| {
                alphabet.iter().map(move |c| {
                    let mut longer = word.clone();
                    longer.push(*c);
                    longer
                })
            })
            .collect();
        all.extend(frontier.iter().cloned());
    }

    all
}

/// First word (in [`words`] order, over both alphabets) of length at most
/// `max_len` on which the two DFAs disagree, if any.
pub fn equivalent_up_to(a: &Automaton, b: &Automaton, max_len: usize) -> Result<Option<String>, AutomatonError> {
    let alphabet: BTreeSet<char> = a.alphabet().union(b.alphabet()).copied().collect();
    for word in words(&alphabet, max_len) {
        if accepts(a, &word)? != accepts(b, &word)? {
            return Ok(Some(word));
        }
    }
    Ok(None)
}
