mod automaton;
mod error;
mod export;
mod minimize;
mod observer;
mod pipeline;
mod regex;
mod simulate;
mod subset;
mod symbol;
mod thompson;


pub use automaton::{Automaton, State, StateId, Transition};
pub use error::{AutomatonError, BuildError, Error, RecordError, RegexError};
pub use export::{AutomatonRecord, StateNode};
pub use minimize::{minimize, minimize_with, rebuild, refine, remove_dead_states, renumber, GroupId, Partition, Strategy};
pub use observer::{NoopObserver, PipelineObserver, TracingObserver};
pub use pipeline::{compile, compile_with, CompileOptions, Compilation};
pub use regex::{insert_concatenation, postfix_string, shunting_yard, to_postfix, tokenize, validate, Alphabet, Token, RESERVED};
pub use simulate::{accepts, equivalent_up_to, run, words, Outcome, Run, Step};
pub use subset::{complete, determinize, determinize_with, epsilon_closure, move_on};
pub use symbol::{Symbol, EPSILON_CHAR};
pub use thompson::build_nfa;
