//! DFA minimization.
//!
//! `minimize` runs four steps, each usable on its own:
//! 1. [`refine`] computes the coarsest partition of states that agrees with
//!    acceptance and with the transition function,
//! 2. [`rebuild`] collapses every group into one state,
//! 3. [`remove_dead_states`] drops states that cannot reach acceptance,
//! 4. [`renumber`] assigns ids in breadth-first order from the initial state.
//!
//! Missing transitions are treated as going to an implicit dead state, so
//! partial DFAs are minimized without completing them first.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::iter;

use bit_set::BitSet;
use remin_util::make_type_idx;

use crate::automaton::{Automaton, StateId};
use crate::error::AutomatonError;
use crate::observer::{NoopObserver, PipelineObserver};
use crate::symbol::Symbol;

type Group = Option<BTreeSet<StateId>>;

make_type_idx!(GroupId, Group, "g");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Split the first group that disagrees on some symbol, then rescan
    /// every group from the start.
    #[default]
    Rescan,
    /// Hopcroft-style worklist of (splitter group, symbol) pairs.
    Worklist,
}

/// Groups live in an arena. A split tombstones the old group and appends
/// the parts, so a `GroupId` never changes meaning once handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<Group>,
    group_of: Vec<GroupId>,
}

impl Partition {
    // accepting states first, empty groups omitted
    fn initial(dfa: &Automaton) -> Partition {
        let mut partition = Partition {
            groups: Vec::new(),
            group_of: vec![GroupId::new(0); dfa.len()],
        };

        let (accepting, rejecting): (BTreeSet<StateId>, BTreeSet<StateId>) =
            dfa.state_ids().partition(|s| dfa.is_accepting(*s));
        for members in [accepting, rejecting] {
            if !members.is_empty() {
                partition.push(members);
            }
        }

        partition
    }

    fn push(&mut self, members: BTreeSet<StateId>) -> GroupId {
        let id = GroupId::from_index(self.groups.len());
        for state in &members {
            self.group_of[state.index()] = id;
        }
        GroupId::from_push(&mut self.groups, Some(members))
    }

    fn split(&mut self, group: GroupId, parts: Vec<BTreeSet<StateId>>) -> Vec<GroupId> {
        self.groups[group] = None;
        parts.into_iter().map(|part| self.push(part)).collect()
    }

    pub fn group_of(&self, state: StateId) -> GroupId {
        self.group_of[state.index()]
    }

    /// None for tombstoned groups.
    pub fn group(&self, id: GroupId) -> Option<&BTreeSet<StateId>> {
        self.groups.get(id.index()).and_then(|group| group.as_ref())
    }

    pub fn live_groups(&self) -> impl Iterator<Item = (GroupId, &BTreeSet<StateId>)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(i, group)| group.as_ref().map(|members| (GroupId::from_index(i), members)))
    }

    fn live_ids(&self) -> Vec<GroupId> {
        self.live_groups().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.live_groups().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn target_group(dfa: &Automaton, partition: &Partition, state: StateId, symbol: char) -> Option<GroupId> {
    dfa.targets(state, Symbol::Char(symbol))
        .first()
        .map(|next| partition.group_of(*next))
}

fn refine_rescan(dfa: &Automaton, partition: &mut Partition, observer: &mut dyn PipelineObserver) {
    'scan: loop {
        for id in partition.live_ids() {
            let Some(members) = partition.group(id).cloned() else {
                continue;
            };

            for c in dfa.alphabet().iter().copied() {
                // None collects the states without a move on c
                let mut buckets: BTreeMap<Option<GroupId>, BTreeSet<StateId>> = BTreeMap::new();
                for state in &members {
                    buckets
                        .entry(target_group(dfa, partition, *state, c))
                        .or_default()
                        .insert(*state);
                }

                if buckets.len() > 1 {
                    let parts = partition.split(id, buckets.into_values().collect());
                    observer.split(id, c, &parts);
                    continue 'scan;
                }
            }
        }
        break;
    }
}

fn refine_worklist(dfa: &Automaton, partition: &mut Partition, observer: &mut dyn PipelineObserver) {
    let mut predecessors: HashMap<(StateId, char), Vec<StateId>> = HashMap::new();
    for t in dfa.transitions() {
        if let Symbol::Char(c) = t.symbol {
            predecessors.entry((t.destination, c)).or_default().push(t.origin);
        }
    }

    let mut worklist: VecDeque<(GroupId, char)> = partition
        .live_ids()
        .into_iter()
        .flat_map(|id| dfa.alphabet().iter().map(move |c| (id, *c)))
        .collect();

    while let Some((splitter, c)) = worklist.pop_front() {
        let Some(targets) = partition.group(splitter) else {
            continue;
        };
        let sources: BTreeSet<StateId> = targets
            .iter()
            .filter_map(|target| predecessors.get(&(*target, c)))
            .flatten()
            .copied()
            .collect();
        if sources.is_empty() {
            continue;
        }

        for id in partition.live_ids() {
            let Some(members) = partition.group(id) else {
                continue;
            };
            let (inside, outside): (BTreeSet<StateId>, BTreeSet<StateId>) =
                members.iter().copied().partition(|s| sources.contains(s));
            if inside.is_empty() || outside.is_empty() {
                continue;
            }

            let parts = partition.split(id, vec![inside, outside]);
            observer.split(id, c, &parts);
            // both halves are new groups and have to act as splitters
            for part in parts {
                worklist.extend(dfa.alphabet().iter().map(|symbol| (part, *symbol)));
            }
        }
    }
}

/// Coarsest partition of the states of `dfa` that separates accepting from
/// non-accepting states and is stable under every symbol.
pub fn refine(
    dfa: &Automaton,
    strategy: Strategy,
    observer: &mut dyn PipelineObserver,
) -> Result<Partition, AutomatonError> {
    dfa.check_deterministic()?;

    let mut partition = Partition::initial(dfa);
    match strategy {
        Strategy::Rescan => refine_rescan(dfa, &mut partition, observer),
        Strategy::Worklist => refine_worklist(dfa, &mut partition, observer),
    }

    Ok(partition)
}

/// One state per group, ordered by the smallest original state in the group.
/// Transitions are mapped through the groups and deduplicated.
pub fn rebuild(dfa: &Automaton, partition: &Partition) -> Automaton {
    let mut merged = Automaton::new();
    for c in dfa.alphabet() {
        merged.add_symbol(*c);
    }

    let mut groups: Vec<(GroupId, &BTreeSet<StateId>)> = partition.live_groups().collect();
    groups.sort_by_key(|(_, members)| members.first().copied());

    let mut image: HashMap<GroupId, StateId> = HashMap::with_capacity(groups.len());
    for (id, members) in groups {
        let accepting = members.iter().any(|s| dfa.is_accepting(*s));
        image.insert(id, merged.add_state(accepting));
    }
    let image_of = |state: StateId| image[&partition.group_of(state)];

    if let Some(initial) = dfa.initial() {
        merged.set_initial(image_of(initial));
    }
    for t in dfa.transitions() {
        merged.add_transition(image_of(t.origin), t.symbol, image_of(t.destination));
    }

    merged
}

/// Keeps the states from which some accepting state is reachable. If the
/// initial state is not among them, the result accepts nothing.
pub fn remove_dead_states(dfa: &Automaton) -> Automaton {
    let Some(initial) = dfa.initial() else {
        return Automaton::empty_language(dfa.alphabet());
    };

    let mut live: BitSet = dfa.accepting().iter().map(|s| s.index()).collect();
    let mut changed = true;
    while changed {
        changed = false;
        for t in dfa.transitions() {
            if live.contains(t.destination.index()) && !live.contains(t.origin.index()) {
                live.insert(t.origin.index());
                changed = true;
            }
        }
    }

    if !live.contains(initial.index()) {
        return Automaton::empty_language(dfa.alphabet());
    }

    let mut pruned = Automaton::new();
    for c in dfa.alphabet() {
        pruned.add_symbol(*c);
    }

    let mut image: Vec<Option<StateId>> = vec![None; dfa.len()];
    for state in dfa.state_ids().filter(|s| live.contains(s.index())) {
        image[state.index()] = Some(pruned.add_state(dfa.is_accepting(state)));
    }
    if let Some(start) = image[initial.index()] {
        pruned.set_initial(start);
    }

    // moves into removed states are dropped, not redirected
    for t in dfa.transitions() {
        if let (Some(origin), Some(destination)) = (image[t.origin.index()], image[t.destination.index()]) {
            pruned.add_transition(origin, t.symbol, destination);
        }
    }

    pruned
}

/// Breadth-first numbering from the initial state, following symbols in
/// ascending order. States unreachable from the initial state keep their
/// relative order after the reachable ones. Transitions are emitted in
/// (state, symbol) order, so renumbering a renumbered automaton is a no-op.
pub fn renumber(dfa: &Automaton) -> Automaton {
    let symbols: Vec<Symbol> = iter::once(Symbol::Epsilon)
        .chain(dfa.alphabet().iter().map(|c| Symbol::Char(*c)))
        .collect();

    let mut order: Vec<StateId> = Vec::with_capacity(dfa.len());
    let mut seen = vec![false; dfa.len()];

    if let Some(initial) = dfa.initial() {
        let mut queue = VecDeque::from([initial]);
        seen[initial.index()] = true;
        while let Some(state) = queue.pop_front() {
            order.push(state);
            for symbol in &symbols {
                for next in dfa.targets(state, *symbol) {
                    if !seen[next.index()] {
                        seen[next.index()] = true;
                        queue.push_back(*next);
                    }
                }
            }
        }
    }
    order.extend(dfa.state_ids().filter(|s| !seen[s.index()]));

    let mut renumbered = Automaton::new();
    for c in dfa.alphabet() {
        renumbered.add_symbol(*c);
    }

    let mut image = vec![StateId::new(0); dfa.len()];
    for old in &order {
        image[old.index()] = renumbered.add_state(dfa.is_accepting(*old));
    }
    if let Some(initial) = dfa.initial() {
        renumbered.set_initial(image[initial.index()]);
    }
    for old in &order {
        for symbol in &symbols {
            for next in dfa.targets(*old, *symbol) {
                renumbered.add_transition(image[old.index()], *symbol, image[next.index()]);
            }
        }
    }

    renumbered
}

pub fn minimize(dfa: &Automaton) -> Result<Automaton, AutomatonError> {
    minimize_with(dfa, Strategy::default(), &mut NoopObserver)
}

/// Minimal, dead-state free, canonically numbered equivalent of `dfa`. A DFA
/// without an initial state minimizes to the empty-language automaton.
pub fn minimize_with(
    dfa: &Automaton,
    strategy: Strategy,
    observer: &mut dyn PipelineObserver,
) -> Result<Automaton, AutomatonError> {
    dfa.check_deterministic()?;
    if dfa.initial().is_none() {
        return Ok(Automaton::empty_language(dfa.alphabet()));
    }

    let partition = refine(dfa, strategy, observer)?;
    let merged = rebuild(dfa, &partition);
    let live = remove_dead_states(&merged);
    Ok(renumber(&live))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(raw: u32) -> StateId {
        StateId::new(raw)
    }

    fn dfa(len: usize, initial: u32, accepting: &[u32], moves: &[(u32, char, u32)]) -> Automaton {
        let mut dfa = Automaton::new();
        for _ in 0..len {
            dfa.add_state(false);
        }
        dfa.set_initial(q(initial));
        for s in accepting {
            dfa.set_accepting(q(*s));
        }
        for (from, c, to) in moves {
            dfa.add_transition(q(*from), Symbol::Char(*c), q(*to));
        }
        dfa
    }

    // 1 and 2 are interchangeable, so are 3 and 4
    fn redundant() -> Automaton {
        dfa(5, 0, &[3, 4], &[(0, 'a', 1), (0, 'b', 2), (1, 'b', 3), (2, 'b', 4)])
    }

    fn triples(dfa: &Automaton) -> Vec<(u32, char, u32)> {
        dfa.transitions()
            .iter()
            .map(|t| (t.origin.raw(), t.symbol.as_char().unwrap_or('ε'), t.destination.raw()))
            .collect()
    }

    #[derive(Default)]
    struct Splits(Vec<(GroupId, char, Vec<GroupId>)>);

    impl PipelineObserver for Splits {
        fn split(&mut self, group: GroupId, symbol: char, parts: &[GroupId]) {
            self.0.push((group, symbol, parts.to_vec()));
        }
    }

    #[test]
    fn initial_partition_separates_acceptance() {
        let partition = Partition::initial(&redundant());
        assert_eq!(partition.len(), 2);
        assert_eq!(partition.group_of(q(3)), partition.group_of(q(4)));
        assert_ne!(partition.group_of(q(0)), partition.group_of(q(3)));
    }

    #[test]
    fn split_tombstones_the_old_group() {
        let mut splits = Splits::default();
        let partition = refine(&redundant(), Strategy::Rescan, &mut splits).expect("deterministic");

        assert_eq!(partition.len(), 3);
        let (first, _, parts) = &splits.0[0];
        assert!(partition.group(*first).is_none());
        assert!(parts.iter().all(|p| p.index() >= 2));
        assert_eq!(partition.group_of(q(1)), partition.group_of(q(2)));
        assert_ne!(partition.group_of(q(0)), partition.group_of(q(1)));
    }

    #[test]
    fn strategies_agree_on_the_partition_size() {
        let rescan = refine(&redundant(), Strategy::Rescan, &mut NoopObserver).expect("deterministic");
        let worklist = refine(&redundant(), Strategy::Worklist, &mut NoopObserver).expect("deterministic");
        assert_eq!(rescan.len(), worklist.len());
        assert_eq!(worklist.group_of(q(1)), worklist.group_of(q(2)));
        assert_eq!(worklist.group_of(q(3)), worklist.group_of(q(4)));
    }

    #[test]
    fn missing_moves_distinguish_states() {
        // 1 can read 'a' and 2 cannot, even though both accept
        let partial = dfa(3, 0, &[1, 2], &[(0, 'a', 1), (0, 'b', 2), (1, 'a', 1)]);
        for strategy in [Strategy::Rescan, Strategy::Worklist] {
            let partition = refine(&partial, strategy, &mut NoopObserver).expect("deterministic");
            assert_eq!(partition.len(), 3);
        }
    }

    #[test]
    fn minimize_merges_equivalent_states() {
        let minimal = minimize(&redundant()).expect("deterministic");
        assert_eq!(minimal.len(), 3);
        assert_eq!(minimal.initial(), Some(q(0)));
        assert_eq!(triples(&minimal), vec![(0, 'a', 1), (0, 'b', 1), (1, 'b', 2)]);
        assert_eq!(minimal.accepting().iter().copied().collect::<Vec<_>>(), vec![q(2)]);
    }

    #[test]
    fn rebuild_deduplicates_transitions() {
        let partition = refine(&redundant(), Strategy::Rescan, &mut NoopObserver).expect("deterministic");
        let merged = rebuild(&redundant(), &partition);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.transitions().len(), 3);
    }

    #[test]
    fn dead_states_are_removed_without_redirecting() {
        // 2 is a trap, 3 is unreachable but live
        let fa = dfa(4, 0, &[1], &[(0, 'a', 1), (0, 'b', 2), (2, 'a', 2), (2, 'b', 2), (3, 'a', 1)]);
        let pruned = remove_dead_states(&fa);
        assert_eq!(pruned.len(), 3);
        assert_eq!(triples(&pruned), vec![(0, 'a', 1), (2, 'a', 1)]);
        assert_eq!(pruned.alphabet().len(), 2);
    }

    #[test]
    fn dead_initial_state_gives_empty_language() {
        let fa = dfa(2, 0, &[], &[(0, 'a', 1), (1, 'a', 0)]);
        let pruned = remove_dead_states(&fa);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned.initial(), Some(q(0)));
        assert!(pruned.accepting().is_empty());
        assert!(pruned.transitions().is_empty());
    }

    #[test]
    fn renumbering_is_breadth_first_by_symbol() {
        let fa = dfa(4, 3, &[0], &[(3, 'b', 1), (3, 'a', 2), (2, 'a', 0), (1, 'a', 0)]);
        let renumbered = renumber(&fa);
        assert_eq!(renumbered.initial(), Some(q(0)));
        assert_eq!(
            triples(&renumbered),
            vec![(0, 'a', 1), (0, 'b', 2), (1, 'a', 3), (2, 'a', 3)]
        );
        assert!(renumbered.is_accepting(q(3)));
        assert_eq!(renumber(&renumbered), renumbered);
    }

    #[test]
    fn unreachable_states_are_appended() {
        let fa = dfa(3, 1, &[1], &[(0, 'a', 1)]);
        let renumbered = renumber(&fa);
        assert_eq!(triples(&renumbered), vec![(1, 'a', 0)]);
        assert!(renumbered.is_accepting(q(0)));
    }

    #[test]
    fn minimize_is_idempotent() {
        let once = minimize(&redundant()).expect("deterministic");
        let twice = minimize(&once).expect("deterministic");
        assert_eq!(once, twice);
    }

    #[test]
    fn nondeterministic_input_is_rejected() {
        let mut fa = redundant();
        fa.add_transition(q(0), Symbol::Char('a'), q(2));
        assert_eq!(
            minimize(&fa),
            Err(AutomatonError::Nondeterministic { state: q(0), symbol: 'a' })
        );
    }

    #[test]
    fn missing_initial_state_minimizes_to_empty_language() {
        let minimal = minimize(&Automaton::new()).expect("empty automaton is deterministic");
        assert_eq!(minimal.len(), 1);
        assert!(minimal.accepting().is_empty());
    }
}
