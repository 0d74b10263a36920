use tracing::debug;

use crate::automaton::Automaton;
use crate::error::Error;
use crate::minimize::{minimize_with, Strategy};
use crate::observer::{NoopObserver, PipelineObserver};
use crate::regex::{postfix_string, to_postfix, validate, Alphabet, Token};
use crate::subset::{complete, determinize_with};
use crate::thompson::build_nfa;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub alphabet: Alphabet,
    /// Run the regex validator before reordering.
    pub validate: bool,
    /// Add a trap state so the DFAs have a move for every symbol.
    pub complete: bool,
    pub strategy: Strategy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            alphabet: Alphabet::Any,
            validate: true,
            complete: false,
            strategy: Strategy::Rescan,
        }
    }
}

/// Every intermediate artifact of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub postfix: Vec<Token>,
    pub nfa: Automaton,
    pub dfa: Automaton,
    pub minimal: Automaton,
}

impl Compilation {
    pub fn postfix_string(&self) -> String {
        postfix_string(&self.postfix)
    }

    /// How many states minimization saved over the subset DFA.
    pub fn states_removed(&self) -> usize {
        self.dfa.len().saturating_sub(self.minimal.len())
    }
}

/// Regex to minimal DFA with default options.
pub fn compile(regex: &str) -> Result<Automaton, Error> {
    let compilation = compile_with(regex, &CompileOptions::default(), &mut NoopObserver)?;
    Ok(compilation.minimal)
}

pub fn compile_with(
    regex: &str,
    options: &CompileOptions,
    observer: &mut dyn PipelineObserver,
) -> Result<Compilation, Error> {
    if options.validate {
        validate(regex, &options.alphabet)?;
    }

    let postfix = to_postfix(regex);
    debug!(regex, postfix = %postfix_string(&postfix), "reordered");
    observer.postfix(&postfix);

    let nfa = build_nfa(&postfix)?;
    debug!(states = nfa.len(), "thompson construction done");
    observer.nfa_built(&nfa);

    let mut dfa = determinize_with(&nfa, observer);
    if options.complete {
        dfa = complete(&dfa)?;
        dfa.check_complete()?;
    }
    debug!(states = dfa.len(), complete = options.complete, "subset construction done");
    observer.dfa_built(&dfa);

    let mut minimal = minimize_with(&dfa, options.strategy, observer)?;
    // minimization drops the trap again
    if options.complete {
        minimal = complete(&minimal)?;
    }
    debug!(states = minimal.len(), "minimization done");
    observer.minimized(&minimal);

    Ok(Compilation {
        postfix,
        nfa,
        dfa,
        minimal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegexError;
    use crate::simulate::accepts;

    #[test]
    fn compile_accepts_the_language() {
        let dfa = compile("a(b|c)*").expect("valid regex");
        assert_eq!(accepts(&dfa, "abcb"), Ok(true));
        assert_eq!(accepts(&dfa, "b"), Ok(false));
    }

    #[test]
    fn validation_runs_first() {
        assert!(matches!(
            compile("(a|b"),
            Err(Error::Regex(RegexError::UnclosedGroup { count: 1 }))
        ));
    }

    #[test]
    fn skipping_validation_surfaces_build_errors() {
        let options = CompileOptions {
            validate: false,
            ..CompileOptions::default()
        };
        assert!(matches!(
            compile_with("a|", &options, &mut NoopObserver),
            Err(Error::Build(_))
        ));
    }

    #[test]
    fn restricted_alphabet() {
        let options = CompileOptions {
            alphabet: Alphabet::only(['a', 'b']).expect("valid alphabet"),
            ..CompileOptions::default()
        };
        assert!(compile_with("ab*", &options, &mut NoopObserver).is_ok());
        assert!(matches!(
            compile_with("abc", &options, &mut NoopObserver),
            Err(Error::Regex(RegexError::ForeignSymbol { symbol: 'c', position: 2 }))
        ));
    }

    #[test]
    fn completion_applies_to_both_dfas() {
        let options = CompileOptions {
            complete: true,
            ..CompileOptions::default()
        };
        let compilation = compile_with("ab", &options, &mut NoopObserver).expect("valid regex");
        assert!(compilation.dfa.is_complete());
        assert!(compilation.minimal.is_complete());
        // start, after a, after ab, trap
        assert_eq!(compilation.minimal.len(), 4);
    }

    #[test]
    fn summary() {
        let compilation = compile_with("(a|b)*abb", &CompileOptions::default(), &mut NoopObserver)
            .expect("valid regex");
        assert_eq!(compilation.postfix_string(), "ab|*a.b.b.");
        assert_eq!(compilation.dfa.len(), 5);
        assert_eq!(compilation.minimal.len(), 4);
        assert_eq!(compilation.states_removed(), 1);
    }
}
