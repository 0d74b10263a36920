use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub const EPSILON_CHAR: char = 'ε';

// label of a transition. epsilon sorts before every character, so iterating
// symbols in order visits epsilon moves first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Epsilon,
    Char(char),
}

impl Symbol {
    pub fn as_char(self) -> Option<char> {
        match self {
            Symbol::Epsilon => None,
            Symbol::Char(c) => Some(c),
        }
    }

    pub fn is_epsilon(self) -> bool {
        self == Symbol::Epsilon
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol::Char(c)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "{}", EPSILON_CHAR),
            Symbol::Char(c) => write!(f, "{}", c),
        }
    }
}
