//! Hooks for following the pipeline as it runs.
//!
//! Algorithms report what they did through a [`PipelineObserver`] and never
//! print or log on their own. Every hook has an empty default, so observers
//! only implement what they care about.

use tracing::{debug, trace};

use crate::automaton::{Automaton, StateId};
use crate::minimize::GroupId;
use crate::regex::{postfix_string, Token};

pub trait PipelineObserver {
    fn postfix(&mut self, _tokens: &[Token]) {}

    fn nfa_built(&mut self, _nfa: &Automaton) {}

    /// A DFA state was minted for a new subset of NFA states.
    fn subset_state(&mut self, _state: StateId, _subset: &[StateId]) {}

    /// Fires for the subset DFA, after completion if that was requested.
    fn dfa_built(&mut self, _dfa: &Automaton) {}

    /// `group` was replaced by `parts` because its states disagree on `symbol`.
    fn split(&mut self, _group: GroupId, _symbol: char, _parts: &[GroupId]) {}

    fn minimized(&mut self, _dfa: &Automaton) {}
}

pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Forwards every event to `tracing`: stage results at debug level, per-step
/// detail at trace level.
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn postfix(&mut self, tokens: &[Token]) {
        debug!(postfix = %postfix_string(tokens), "reordered to postfix");
    }

    fn nfa_built(&mut self, nfa: &Automaton) {
        debug!(
            states = nfa.len(),
            transitions = nfa.transitions().len(),
            "built nfa"
        );
    }

    fn subset_state(&mut self, state: StateId, subset: &[StateId]) {
        trace!("new dfa state {}: {:?}", state, subset);
    }

    fn dfa_built(&mut self, dfa: &Automaton) {
        debug!(
            states = dfa.len(),
            transitions = dfa.transitions().len(),
            "built dfa"
        );
    }

    fn split(&mut self, group: GroupId, symbol: char, parts: &[GroupId]) {
        trace!("splitting {} on '{}' into {:?}", group, symbol, parts);
    }

    fn minimized(&mut self, dfa: &Automaton) {
        debug!(
            states = dfa.len(),
            accepting = dfa.accepting().len(),
            "minimized dfa"
        );
    }
}
