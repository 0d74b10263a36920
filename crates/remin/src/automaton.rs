use std::collections::{BTreeSet, HashMap};

use remin_util::make_type_idx;

use crate::error::AutomatonError;
use crate::symbol::Symbol;

make_type_idx!(StateId, State, "q");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    id: StateId,
    accepting: bool,
}

impl State {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition {
    pub origin: StateId,
    pub symbol: Symbol,
    pub destination: StateId,
}

/// A finite automaton over `char` symbols, used for every stage of the
/// pipeline: NFAs (possibly with epsilon moves) as well as partial and
/// complete DFAs.
///
/// State ids are dense, starting at 0, in creation order. Transitions keep
/// insertion order and are indexed by `(origin, symbol)` as they are added;
/// adding the same triple twice is a no-op. The alphabet only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Automaton {
    states: Vec<State>,
    alphabet: BTreeSet<char>,
    transitions: Vec<Transition>,
    index: HashMap<(StateId, Symbol), Vec<StateId>>,
    initial: Option<StateId>,
    accepting: BTreeSet<StateId>,
}

impl Automaton {
    pub fn new() -> Automaton {
        Automaton::default()
    }

    /// A single non-accepting initial state without transitions, keeping the
    /// given alphabet. This is how "accepts nothing" is represented.
    pub fn empty_language<'a>(alphabet: impl IntoIterator<Item = &'a char>) -> Automaton {
        let mut automaton = Automaton::new();
        automaton.alphabet.extend(alphabet);
        let state = automaton.add_state(false);
        automaton.set_initial(state);
        automaton
    }

    pub fn add_state(&mut self, accepting: bool) -> StateId {
        let id = StateId::from_index(self.states.len());
        StateId::from_push(&mut self.states, State { id, accepting: false });
        if accepting {
            self.set_accepting(id);
        }
        id
    }

    // the only write path for acceptance, keeps the flag and the set in sync
    pub fn set_accepting(&mut self, state: StateId) {
        assert!(self.contains(state), "{} is not a state of this automaton", state);
        self.states[state].accepting = true;
        self.accepting.insert(state);
    }

    pub fn set_initial(&mut self, state: StateId) {
        assert!(self.contains(state), "{} is not a state of this automaton", state);
        self.initial = Some(state);
    }

    pub fn add_symbol(&mut self, symbol: char) {
        self.alphabet.insert(symbol);
    }

    /// Returns false if the exact same transition already existed.
    ///
    /// # Panics
    /// If either endpoint is not a state of this automaton.
    pub fn add_transition(&mut self, origin: StateId, symbol: Symbol, destination: StateId) -> bool {
        assert!(self.contains(origin), "{} is not a state of this automaton", origin);
        assert!(self.contains(destination), "{} is not a state of this automaton", destination);

        let targets = self.index.entry((origin, symbol)).or_default();
        if targets.contains(&destination) {
            return false;
        }
        targets.push(destination);

        if let Symbol::Char(c) = symbol {
            self.alphabet.insert(c);
        }
        self.transitions.push(Transition { origin, symbol, destination });
        true
    }

    /// Copies every state and transition of `other` into `self`, after the
    /// states already present. Returns the mapping from `other`'s ids to the
    /// new ones. Initial state and acceptance of `other` are not carried over
    /// except through the accepting flags of the copied states.
    pub fn absorb(&mut self, other: &Automaton) -> impl Fn(StateId) -> StateId {
        let offset = self.states.len() as u32;
        let shift = move |id: StateId| StateId::new(id.raw() + offset);

        for state in &other.states {
            self.add_state(state.accepting);
        }
        for t in &other.transitions {
            self.add_transition(shift(t.origin), t.symbol, shift(t.destination));
        }
        self.alphabet.extend(other.alphabet.iter().copied());

        shift
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, state: StateId) -> bool {
        state.index() < self.states.len()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len()).map(StateId::from_index)
    }

    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn initial(&self) -> Option<StateId> {
        self.initial
    }

    pub fn accepting(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    pub fn targets(&self, state: StateId, symbol: Symbol) -> &[StateId] {
        self.index
            .get(&(state, symbol))
            .map(|targets| targets.as_slice())
            .unwrap_or(&[])
    }

    /// Deterministic lookup; fails if the automaton is not deterministic for
    /// this particular (state, symbol) pair.
    pub fn next_state(&self, state: StateId, symbol: char) -> Result<Option<StateId>, AutomatonError> {
        match self.targets(state, Symbol::Char(symbol)) {
            [] => Ok(None),
            [next] => Ok(Some(*next)),
            _ => Err(AutomatonError::Nondeterministic { state, symbol }),
        }
    }

    /// First violation of determinism: an epsilon move, or two moves on the
    /// same symbol out of one state.
    pub fn check_deterministic(&self) -> Result<(), AutomatonError> {
        for t in &self.transitions {
            match t.symbol {
                Symbol::Epsilon => {
                    return Err(AutomatonError::EpsilonTransition { state: t.origin });
                }
                Symbol::Char(symbol) => {
                    if self.targets(t.origin, t.symbol).len() > 1 {
                        return Err(AutomatonError::Nondeterministic {
                            state: t.origin,
                            symbol,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn is_deterministic(&self) -> bool {
        self.check_deterministic().is_ok()
    }

    /// Deterministic, and every state has a move on every alphabet symbol.
    pub fn check_complete(&self) -> Result<(), AutomatonError> {
        self.check_deterministic()?;
        match self.missing_transitions().next() {
            Some((state, symbol)) => Err(AutomatonError::MissingTransition { state, symbol }),
            None => Ok(()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.check_complete().is_ok()
    }

    /// (state, symbol) pairs without any outgoing transition, in state then
    /// symbol order.
    pub fn missing_transitions(&self) -> impl Iterator<Item = (StateId, char)> + '_ {
        self.state_ids().flat_map(move |state| {
            self.alphabet
                .iter()
                .copied()
                .filter(move |c| self.targets(state, Symbol::Char(*c)).is_empty())
                .map(move |c| (state, c))
        })
    }
}
