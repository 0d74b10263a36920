//! Thompson's construction: postfix tokens to an epsilon-NFA.
//!
//! Every fragment owns a private automaton with exactly one start and one end
//! state. Combining fragments copies them into a fresh automaton at fixed
//! offsets, so the result has a single accepting state and no id collisions.

use crate::automaton::{Automaton, StateId};
use crate::error::BuildError;
use crate::regex::Token;
use crate::symbol::Symbol;

#[derive(Debug, Clone)]
struct Fragment {
    nfa: Automaton,
    start: StateId,
    end: StateId,
}

impl Fragment {
    // start -symbol-> end
    fn symbol(symbol: Symbol) -> Fragment {
        let mut nfa = Automaton::new();
        let start = nfa.add_state(false);
        let end = nfa.add_state(false);
        nfa.add_transition(start, symbol, end);
        Fragment { nfa, start, end }
    }

    // right is shifted past left's states
    fn concat(left: Fragment, right: Fragment) -> Fragment {
        let mut nfa = left.nfa;
        let shift = nfa.absorb(&right.nfa);
        nfa.add_transition(left.end, Symbol::Epsilon, shift(right.start));
        Fragment {
            nfa,
            start: left.start,
            end: shift(right.end),
        }
    }

    // fresh start at 0, left at 1.., right after left, fresh end last
    fn union(left: Fragment, right: Fragment) -> Fragment {
        let mut nfa = Automaton::new();
        let start = nfa.add_state(false);
        let shift_left = nfa.absorb(&left.nfa);
        let shift_right = nfa.absorb(&right.nfa);
        let end = nfa.add_state(false);

        nfa.add_transition(start, Symbol::Epsilon, shift_left(left.start));
        nfa.add_transition(start, Symbol::Epsilon, shift_right(right.start));
        nfa.add_transition(shift_left(left.end), Symbol::Epsilon, end);
        nfa.add_transition(shift_right(right.end), Symbol::Epsilon, end);

        Fragment { nfa, start, end }
    }

    // fresh start at 0, fresh end at 1, inner from 2
    fn star(inner: Fragment) -> Fragment {
        let mut nfa = Automaton::new();
        let start = nfa.add_state(false);
        let end = nfa.add_state(false);
        let shift = nfa.absorb(&inner.nfa);
        let (inner_start, inner_end) = (shift(inner.start), shift(inner.end));

        nfa.add_transition(start, Symbol::Epsilon, end);
        nfa.add_transition(start, Symbol::Epsilon, inner_start);
        nfa.add_transition(inner_end, Symbol::Epsilon, end);
        nfa.add_transition(inner_end, Symbol::Epsilon, inner_start);

        Fragment { nfa, start, end }
    }

    // fresh end at 0, inner from 1; no skip edge, inner start is reused
    fn plus(inner: Fragment) -> Fragment {
        let mut nfa = Automaton::new();
        let end = nfa.add_state(false);
        let shift = nfa.absorb(&inner.nfa);
        let (inner_start, inner_end) = (shift(inner.start), shift(inner.end));

        nfa.add_transition(inner_end, Symbol::Epsilon, end);
        nfa.add_transition(inner_end, Symbol::Epsilon, inner_start);

        Fragment {
            nfa,
            start: inner_start,
            end,
        }
    }
}

fn pop_operand(
    stack: &mut Vec<Fragment>,
    operator: Token,
    position: usize,
) -> Result<Fragment, BuildError> {
    stack.pop().ok_or(BuildError::MissingOperand {
        operator: operator.as_char(),
        position,
    })
}

/// Builds the NFA for a postfix token sequence. The empty sequence gives an
/// automaton without states, which accepts nothing.
pub fn build_nfa(postfix: &[Token]) -> Result<Automaton, BuildError> {
    let mut stack: Vec<Fragment> = Vec::new();

    for (position, token) in postfix.iter().copied().enumerate() {
        let fragment = match token {
            Token::Operand(c) => Fragment::symbol(Symbol::Char(c)),
            Token::Epsilon => Fragment::symbol(Symbol::Epsilon),
            Token::Concat | Token::Union => {
                // top of the stack is the right operand
                let right = pop_operand(&mut stack, token, position)?;
                let left = pop_operand(&mut stack, token, position)?;
                if token == Token::Concat {
                    Fragment::concat(left, right)
                } else {
                    Fragment::union(left, right)
                }
            }
            Token::Star => Fragment::star(pop_operand(&mut stack, token, position)?),
            Token::Plus => Fragment::plus(pop_operand(&mut stack, token, position)?),
            Token::LeftParen | Token::RightParen => {
                return Err(BuildError::UnexpectedGrouping {
                    token: token.as_char(),
                    position,
                });
            }
        };
        stack.push(fragment);
    }

    match stack.len() {
        0 => Ok(Automaton::new()),
        1 => {
            let Fragment { mut nfa, start, end } = stack.remove(0);
            nfa.set_initial(start);
            nfa.set_accepting(end);
            Ok(nfa)
        }
        n => Err(BuildError::DanglingFragments(n)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::regex::to_postfix;

    fn nfa(regex: &str) -> Automaton {
        build_nfa(&to_postfix(regex)).expect("failed to build nfa")
    }

    fn eps(nfa: &Automaton, from: u32) -> Vec<StateId> {
        let mut targets = nfa.targets(StateId::new(from), Symbol::Epsilon).to_vec();
        targets.sort();
        targets
    }

    fn ids(raw: &[u32]) -> Vec<StateId> {
        raw.iter().copied().map(StateId::new).collect()
    }

    #[test]
    fn single_symbol() {
        let nfa = nfa("a");
        assert_eq!(nfa.len(), 2);
        assert_eq!(nfa.initial(), Some(StateId::new(0)));
        assert_eq!(nfa.accepting().iter().copied().collect::<Vec<_>>(), ids(&[1]));
        assert_eq!(nfa.targets(StateId::new(0), Symbol::Char('a')), &[StateId::new(1)]);
    }

    #[test]
    fn concatenation_links_left_end_to_right_start() {
        let nfa = nfa("ab");
        assert_eq!(nfa.len(), 4);
        assert_eq!(eps(&nfa, 1), ids(&[2]));
        assert_eq!(nfa.targets(StateId::new(2), Symbol::Char('b')), &[StateId::new(3)]);
        assert_eq!(nfa.initial(), Some(StateId::new(0)));
        assert!(nfa.is_accepting(StateId::new(3)));
    }

    #[test]
    fn union_layout() {
        // 0 = start, 1-2 = a, 3-4 = b, 5 = end
        let nfa = nfa("a|b");
        assert_eq!(nfa.len(), 6);
        assert_eq!(eps(&nfa, 0), ids(&[1, 3]));
        assert_eq!(eps(&nfa, 2), ids(&[5]));
        assert_eq!(eps(&nfa, 4), ids(&[5]));
        assert_eq!(nfa.initial(), Some(StateId::new(0)));
        assert!(nfa.is_accepting(StateId::new(5)));
    }

    #[test]
    fn star_layout() {
        // 0 = start, 1 = end, 2-3 = a
        let nfa = nfa("a*");
        assert_eq!(nfa.len(), 4);
        assert_eq!(eps(&nfa, 0), ids(&[1, 2]));
        assert_eq!(eps(&nfa, 3), ids(&[1, 2]));
        assert_eq!(nfa.targets(StateId::new(2), Symbol::Char('a')), &[StateId::new(3)]);
        assert!(nfa.is_accepting(StateId::new(1)));
    }

    #[test]
    fn plus_has_no_skip_edge() {
        // 0 = end, 1-2 = a, start reused
        let nfa = nfa("a+");
        assert_eq!(nfa.len(), 3);
        assert_eq!(nfa.initial(), Some(StateId::new(1)));
        assert_eq!(eps(&nfa, 2), ids(&[0, 1]));
        assert!(eps(&nfa, 1).is_empty());
        assert!(nfa.is_accepting(StateId::new(0)));
    }

    #[test]
    fn nested_fragments_do_not_collide() {
        let nfa = nfa("((a|b)*c+|(de)*)+f");
        let triples: HashSet<_> = nfa.transitions().iter().collect();
        assert_eq!(triples.len(), nfa.transitions().len());
        for t in nfa.transitions() {
            assert!(nfa.contains(t.origin) && nfa.contains(t.destination));
        }
        // every symbol edge comes from its own operand fragment
        let symbol_edges = nfa.transitions().iter().filter(|t| !t.symbol.is_epsilon()).count();
        assert_eq!(symbol_edges, 6);
        let origins: HashSet<_> = nfa
            .transitions()
            .iter()
            .filter(|t| !t.symbol.is_epsilon())
            .map(|t| t.origin)
            .collect();
        assert_eq!(origins.len(), 6);
        assert_eq!(nfa.accepting().len(), 1);
    }

    #[test]
    fn empty_postfix_builds_empty_automaton() {
        let nfa = build_nfa(&[]).expect("empty postfix is valid");
        assert!(nfa.is_empty());
        assert_eq!(nfa.initial(), None);
    }

    #[test]
    fn epsilon_operand() {
        let nfa = nfa("ε");
        assert!(nfa.alphabet().is_empty());
        assert_eq!(eps(&nfa, 0), ids(&[1]));
    }

    #[test]
    fn malformed_postfix() {
        assert_eq!(
            build_nfa(&to_postfix("*a")),
            Err(BuildError::MissingOperand { operator: '*', position: 0 })
        );
        assert_eq!(
            build_nfa(&to_postfix("a|")),
            Err(BuildError::MissingOperand { operator: '|', position: 1 })
        );
        assert_eq!(
            build_nfa(&[Token::Operand('a'), Token::Operand('b')]),
            Err(BuildError::DanglingFragments(2))
        );
        assert_eq!(
            build_nfa(&[Token::LeftParen]),
            Err(BuildError::UnexpectedGrouping { token: '(', position: 0 })
        );
    }
}
