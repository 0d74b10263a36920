//! Structural export of automata: a plain serde record with a binary
//! encoding, and a petgraph view for Graphviz output.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use petgraph::dot::Dot;
use petgraph::graph::NodeIndex;
use petgraph::Graph;
use serde::{Deserialize, Serialize};
use serde_binary::binary_stream::Endian;

use crate::automaton::{Automaton, StateId};
use crate::error::RecordError;
use crate::symbol::Symbol;

/// Everything needed to rebuild an automaton. State ids are the raw ids of
/// the exported automaton; `alphabet` and `accepting` are sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonRecord {
    pub states: Vec<u32>,
    pub alphabet: Vec<char>,
    pub initial: Option<u32>,
    pub accepting: Vec<u32>,
    pub transitions: Vec<(u32, Symbol, u32)>,
}

impl AutomatonRecord {
    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        serde_binary::to_vec(self, Endian::Little).map_err(|e| RecordError::Encoding(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<AutomatonRecord, RecordError> {
        serde_binary::from_vec(bytes.to_vec(), Endian::Little).map_err(|e| RecordError::Encoding(e.to_string()))
    }
}

impl Automaton {
    pub fn to_record(&self) -> AutomatonRecord {
        AutomatonRecord {
            states: self.state_ids().map(StateId::raw).collect(),
            alphabet: self.alphabet().iter().copied().collect(),
            initial: self.initial().map(StateId::raw),
            accepting: self.accepting().iter().map(|s| s.raw()).collect(),
            transitions: self
                .transitions()
                .iter()
                .map(|t| (t.origin.raw(), t.symbol, t.destination.raw()))
                .collect(),
        }
    }

    /// Rebuilds an automaton from a record. Listed states get dense ids in
    /// the order they are listed, so a record produced by [`to_record`]
    /// round-trips exactly. The record is fully checked before anything is
    /// built.
    ///
    /// [`to_record`]: Automaton::to_record
    pub fn from_record(record: &AutomatonRecord) -> Result<Automaton, RecordError> {
        let mut dense: HashMap<u32, StateId> = HashMap::with_capacity(record.states.len());
        for (i, raw) in record.states.iter().copied().enumerate() {
            if dense.insert(raw, StateId::from_index(i)).is_some() {
                return Err(RecordError::DuplicateState(raw));
            }
        }
        let lookup = |raw: u32| dense.get(&raw).copied().ok_or(RecordError::InvalidState(raw));

        let alphabet: BTreeSet<char> = record.alphabet.iter().copied().collect();
        let initial = record.initial.map(lookup).transpose()?;
        let accepting = record
            .accepting
            .iter()
            .map(|raw| lookup(*raw))
            .collect::<Result<Vec<StateId>, RecordError>>()?;
        let mut transitions = Vec::with_capacity(record.transitions.len());
        for (origin, symbol, destination) in record.transitions.iter().copied() {
            if let Symbol::Char(c) = symbol {
                if !alphabet.contains(&c) {
                    return Err(RecordError::InvalidSymbol(c));
                }
            }
            transitions.push((lookup(origin)?, symbol, lookup(destination)?));
        }

        let mut automaton = Automaton::new();
        for c in alphabet {
            automaton.add_symbol(c);
        }
        for _ in &record.states {
            automaton.add_state(false);
        }
        for state in accepting {
            automaton.set_accepting(state);
        }
        if let Some(state) = initial {
            automaton.set_initial(state);
        }
        for (origin, symbol, destination) in transitions {
            automaton.add_transition(origin, symbol, destination);
        }

        Ok(automaton)
    }

    /// Node `i` of the graph is state `i`; one edge per transition.
    pub fn to_graph(&self) -> Graph<StateNode, Symbol> {
        let mut graph = Graph::with_capacity(self.len(), self.transitions().len());
        for state in self.state_ids() {
            graph.add_node(StateNode {
                id: state,
                accepting: self.is_accepting(state),
                initial: self.initial() == Some(state),
            });
        }
        for t in self.transitions() {
            graph.add_edge(
                NodeIndex::new(t.origin.index()),
                NodeIndex::new(t.destination.index()),
                t.symbol,
            );
        }
        graph
    }

    /// Graphviz source: accepting states are double circles, the initial
    /// state is drawn bold.
    pub fn to_dot(&self) -> String {
        let graph = self.to_graph();
        let dot = Dot::with_attr_getters(&graph, &[], &|_, _| String::new(), &|_, (_, node)| {
            let shape = if node.accepting { "doublecircle" } else { "circle" };
            if node.initial {
                format!("shape = {} style = bold ", shape)
            } else {
                format!("shape = {} ", shape)
            }
        });
        format!("{}", dot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateNode {
    pub id: StateId,
    pub accepting: bool,
    pub initial: bool,
}

impl Display for StateNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
