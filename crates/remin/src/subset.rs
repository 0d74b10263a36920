// NFA -> DFA by subset construction, plus completion with a trap state

use std::collections::{HashMap, VecDeque};

use bit_set::BitSet;

use crate::automaton::{Automaton, StateId};
use crate::error::AutomatonError;
use crate::observer::{NoopObserver, PipelineObserver};
use crate::symbol::Symbol;

// sets are always sized to the whole nfa so equal sets hash equally
fn empty_set(nfa: &Automaton) -> BitSet {
    BitSet::with_capacity(nfa.len())
}

fn members(set: &BitSet) -> Vec<StateId> {
    set.iter().map(StateId::from_index).collect()
}

/// Grows `set` until no epsilon move leads outside of it.
pub fn epsilon_closure(nfa: &Automaton, set: &BitSet) -> BitSet {
    let mut closure = set.clone();
    let mut worklist: Vec<usize> = set.iter().collect();

    while let Some(i) = worklist.pop() {
        for next in nfa.targets(StateId::from_index(i), Symbol::Epsilon) {
            if closure.insert(next.index()) {
                worklist.push(next.index());
            }
        }
    }

    closure
}

/// States reachable from `set` by exactly one move on `symbol`.
pub fn move_on(nfa: &Automaton, set: &BitSet, symbol: char) -> BitSet {
    let mut result = empty_set(nfa);
    for i in set.iter() {
        for next in nfa.targets(StateId::from_index(i), Symbol::Char(symbol)) {
            result.insert(next.index());
        }
    }
    result
}

pub fn determinize(nfa: &Automaton) -> Automaton {
    determinize_with(nfa, &mut NoopObserver)
}

/// DFA states are minted in breadth-first discovery order, symbols are tried
/// in ascending order. States with no move on a symbol get no transition, so
/// the result is partial; see [`complete`]. An NFA without an initial state
/// yields the empty-language automaton.
pub fn determinize_with(nfa: &Automaton, observer: &mut dyn PipelineObserver) -> Automaton {
    let Some(initial) = nfa.initial() else {
        return Automaton::empty_language(nfa.alphabet());
    };

    let mut dfa = Automaton::new();
    for c in nfa.alphabet() {
        dfa.add_symbol(*c);
    }

    let accepting: BitSet = nfa.accepting().iter().map(|s| s.index()).collect();

    let mut seed = empty_set(nfa);
    seed.insert(initial.index());
    let seed = epsilon_closure(nfa, &seed);

    // configuration -> dfa state
    let mut subsets: HashMap<BitSet, StateId> = HashMap::new();
    let mut work_queue: VecDeque<BitSet> = VecDeque::new();

    let start = dfa.add_state(!seed.is_disjoint(&accepting));
    dfa.set_initial(start);
    observer.subset_state(start, &members(&seed));
    subsets.insert(seed.clone(), start);
    work_queue.push_back(seed);

    while let Some(current) = work_queue.pop_front() {
        let from = subsets[&current];

        for c in nfa.alphabet().iter().copied() {
            let moved = move_on(nfa, &current, c);
            if moved.is_empty() {
                continue;
            }

            let target = epsilon_closure(nfa, &moved);
            let to = match subsets.get(&target) {
                Some(existing) => *existing,
                None => {
                    let state = dfa.add_state(!target.is_disjoint(&accepting));
                    observer.subset_state(state, &members(&target));
                    subsets.insert(target.clone(), state);
                    work_queue.push_back(target);
                    state
                }
            };

            dfa.add_transition(from, Symbol::Char(c), to);
        }
    }

    dfa
}

/// Makes the transition function total. If any (state, symbol) pair has no
/// move, one non-accepting trap state is added, every missing move goes to it
/// and it loops to itself on every symbol. Always returns a fresh automaton,
/// unchanged if nothing was missing.
pub fn complete(dfa: &Automaton) -> Result<Automaton, AutomatonError> {
    dfa.check_deterministic()?;

    let missing: Vec<(StateId, char)> = dfa.missing_transitions().collect();
    let mut completed = dfa.clone();
    if missing.is_empty() {
        return Ok(completed);
    }

    let trap = completed.add_state(false);
    for (state, c) in missing {
        completed.add_transition(state, Symbol::Char(c), trap);
    }
    for c in dfa.alphabet().iter().copied() {
        completed.add_transition(trap, Symbol::Char(c), trap);
    }

    Ok(completed)
}
