// minimal regex syntax, compiled through postfix form
// <regex>  ::= <term> { '|' <term> }
// <term>   ::= <factor> { ['.'] <factor> }     (concatenation, '.' optional)
// <factor> ::= <base> { '*' | '+' }
// <base>   ::= <char> | 'ε' | '(' <regex> ')'
//
// 'ε' stands for the empty string. every other non-reserved char is an operand.

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::error::RegexError;
use crate::symbol::EPSILON_CHAR;

pub const RESERVED: [char; 6] = ['|', '.', '*', '+', '(', ')'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Operand(char),
    Epsilon,
    Union,
    Concat,
    Star,
    Plus,
    LeftParen,
    RightParen,
}

impl Token {
    fn from_char(c: char) -> Token {
        match c {
            '|' => Token::Union,
            '.' => Token::Concat,
            '*' => Token::Star,
            '+' => Token::Plus,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            EPSILON_CHAR => Token::Epsilon,
            c => Token::Operand(c),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Token::Operand(c) => c,
            Token::Epsilon => EPSILON_CHAR,
            Token::Union => '|',
            Token::Concat => '.',
            Token::Star => '*',
            Token::Plus => '+',
            Token::LeftParen => '(',
            Token::RightParen => ')',
        }
    }

    // None for operands and grouping
    fn precedence(self) -> Option<u8> {
        match self {
            Token::Union => Some(1),
            Token::Concat => Some(2),
            Token::Star | Token::Plus => Some(3),
            _ => None,
        }
    }

    fn is_operand(self) -> bool {
        matches!(self, Token::Operand(_) | Token::Epsilon)
    }

    fn ends_expr(self) -> bool {
        self.is_operand() || matches!(self, Token::Star | Token::Plus | Token::RightParen)
    }

    fn begins_expr(self) -> bool {
        self.is_operand() || self == Token::LeftParen
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Which characters may appear as operands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Alphabet {
    /// Any character that is not reserved.
    #[default]
    Any,
    Only(BTreeSet<char>),
}

impl Alphabet {
    pub fn only(symbols: impl IntoIterator<Item = char>) -> Result<Alphabet, RegexError> {
        let symbols: BTreeSet<char> = symbols.into_iter().collect();
        if let Some(symbol) = symbols
            .iter()
            .copied()
            .find(|c| RESERVED.contains(c) || *c == EPSILON_CHAR)
        {
            return Err(RegexError::ReservedSymbol { symbol });
        }
        Ok(Alphabet::Only(symbols))
    }

    pub fn admits(&self, symbol: char) -> bool {
        match self {
            Alphabet::Any => !RESERVED.contains(&symbol) && symbol != EPSILON_CHAR,
            Alphabet::Only(symbols) => symbols.contains(&symbol),
        }
    }
}

pub fn tokenize(regex: &str) -> Vec<Token> {
    regex.chars().map(Token::from_char).collect()
}

/// Syntactic pre-check: grouping is balanced and every operand belongs to the
/// alphabet. Operator arity is not checked here, it fails during construction.
pub fn validate(regex: &str, alphabet: &Alphabet) -> Result<(), RegexError> {
    let mut depth: usize = 0;
    for (position, token) in tokenize(regex).into_iter().enumerate() {
        match token {
            Token::LeftParen => depth += 1,
            Token::RightParen => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(RegexError::Unbalanced { position })?;
            }
            Token::Operand(symbol) if !alphabet.admits(symbol) => {
                return Err(RegexError::ForeignSymbol { symbol, position });
            }
            _ => (),
        }
    }

    if depth > 0 {
        Err(RegexError::UnclosedGroup { count: depth })
    } else {
        Ok(())
    }
}

/// Makes concatenation explicit: `ab` -> `a.b`, `(a|b)*c` -> `(a|b)*.c`
pub fn insert_concatenation(tokens: &[Token]) -> Vec<Token> {
    let mut result: Vec<Token> = Vec::with_capacity(tokens.len() * 2);
    for (i, token) in tokens.iter().copied().enumerate() {
        result.push(token);
        if let Some(next) = tokens.get(i + 1) {
            if token.ends_expr() && next.begins_expr() {
                result.push(Token::Concat);
            }
        }
    }
    result
}

/// Dijkstra's shunting-yard over explicit-concatenation tokens. Unbalanced
/// grouping is tolerated: a stray ')' drains the stack, a stray '(' is
/// dropped at the end.
pub fn shunting_yard(tokens: &[Token]) -> Vec<Token> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens.iter().copied() {
        match token {
            Token::Operand(_) | Token::Epsilon => output.push(token),
            Token::LeftParen => operators.push(token),
            Token::RightParen => {
                while let Some(top) = operators.pop() {
                    if top == Token::LeftParen {
                        break;
                    }
                    output.push(top);
                }
            }
            _ => {
                let precedence = token.precedence().unwrap_or(0);
                // ties pop: every operator is left associative
                while let Some(top_precedence) = operators.last().and_then(|top| top.precedence()) {
                    if top_precedence < precedence {
                        break;
                    }
                    output.extend(operators.pop());
                }
                operators.push(token);
            }
        }
    }

    while let Some(top) = operators.pop() {
        if top != Token::LeftParen {
            output.push(top);
        }
    }

    output
}

pub fn to_postfix(regex: &str) -> Vec<Token> {
    let tokens = tokenize(regex);
    let explicit = insert_concatenation(&tokens);
    shunting_yard(&explicit)
}

pub fn postfix_string(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.as_char()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix(regex: &str) -> String {
        postfix_string(&to_postfix(regex))
    }

    #[test]
    fn concatenation_is_made_explicit() {
        let explicit = insert_concatenation(&tokenize("(a|b)*c"));
        assert_eq!(postfix_string(&explicit), "(a|b)*.c");
        assert_eq!(postfix_string(&insert_concatenation(&tokenize("a+b"))), "a+.b");
        assert_eq!(postfix_string(&insert_concatenation(&tokenize("a|b"))), "a|b");
    }

    #[test]
    fn postfix_ordering() {
        assert_eq!(postfix("a"), "a");
        assert_eq!(postfix("ab"), "ab.");
        assert_eq!(postfix("a|b"), "ab|");
        assert_eq!(postfix("a*"), "a*");
        assert_eq!(postfix("a+"), "a+");
        assert_eq!(postfix("(a|b)*"), "ab|*");
        assert_eq!(postfix("(a|b)*abb(a|b)*"), "ab|*a.b.b.ab|*.");
        assert_eq!(postfix("a(b|c)*d"), "abc|*.d.");
    }

    #[test]
    fn same_precedence_groups_left_to_right() {
        assert_eq!(postfix("abc"), "ab.c.");
        assert_eq!(postfix("a|b|c"), "ab|c|");
        assert_eq!(postfix("a|bc"), "abc.|");
    }

    #[test]
    fn explicit_dot_is_concatenation() {
        assert_eq!(postfix("a.b"), postfix("ab"));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(to_postfix("").is_empty());
    }

    #[test]
    fn unbalanced_grouping_is_tolerated() {
        assert_eq!(postfix("a)b"), "ab.");
        assert_eq!(postfix("(ab"), "ab.");
    }

    #[test]
    fn epsilon_is_an_operand() {
        assert_eq!(postfix("aε|b"), "aε.b|");
    }

    #[test]
    fn validation() {
        assert_eq!(validate("(a|b)*a", &Alphabet::Any), Ok(()));
        assert_eq!(validate("", &Alphabet::Any), Ok(()));
        assert_eq!(validate("a)(", &Alphabet::Any), Err(RegexError::Unbalanced { position: 1 }));
        assert_eq!(validate("((a)", &Alphabet::Any), Err(RegexError::UnclosedGroup { count: 1 }));

        let ab = Alphabet::only(['a', 'b']).expect("valid alphabet");
        assert_eq!(validate("ab*ε", &ab), Ok(()));
        assert_eq!(
            validate("abc", &ab),
            Err(RegexError::ForeignSymbol { symbol: 'c', position: 2 })
        );
    }

    #[test]
    fn reserved_symbols_cannot_be_operands() {
        assert_eq!(Alphabet::only(['a', '*']), Err(RegexError::ReservedSymbol { symbol: '*' }));
        assert!(!Alphabet::Any.admits('|'));
        assert!(Alphabet::Any.admits('0'));
    }
}
