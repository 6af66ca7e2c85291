//! Boolean query language: `+` (OR), `*` (AND), `!` (NOT) and parentheses.
//!
//! Precedence from loosest to tightest is `+`, `*`, `!`; both binary operators are
//! left-associative, so `a + b * !c` reads as `a + (b * (!c))`. Any run of characters
//! other than whitespace, operators and parentheses is a word.

use crate::config::{MAX_QUERY_DEPTH, MAX_QUERY_TOKENS};
use crate::error::QueryError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "word {w:?}"),
            Token::And => write!(f, "'*'"),
            Token::Or => write!(f, "'+'"),
            Token::Not => write!(f, "'!'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
        }
    }
}

/// Parsed query. Words are kept as typed; normalization happens at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Group(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(w) => write!(f, "{w}"),
            Expr::And(l, r) => write!(f, "({l} * {r})"),
            Expr::Or(l, r) => write!(f, "({l} + {r})"),
            Expr::Not(inner) => write!(f, "!{inner}"),
            Expr::Group(inner) => write!(f, "{inner}"),
        }
    }
}

impl Expr {
    pub fn term(word: &str) -> Self {
        Expr::Term(word.to_string())
    }

    pub fn and(l: Expr, r: Expr) -> Self {
        Expr::And(Box::new(l), Box::new(r))
    }

    pub fn or(l: Expr, r: Expr) -> Self {
        Expr::Or(Box::new(l), Box::new(r))
    }

    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn group(inner: Expr) -> Self {
        Expr::Group(Box::new(inner))
    }

    /// Words of the expression with whether they sit under an odd number of `!`.
    pub fn terms(&self) -> Vec<(&str, bool)> {
        let mut out = Vec::new();
        self.collect_terms(false, &mut out);
        out
    }

    fn collect_terms<'a>(&'a self, negated: bool, out: &mut Vec<(&'a str, bool)>) {
        match self {
            Expr::Term(w) => out.push((w.as_str(), negated)),
            Expr::Not(inner) => inner.collect_terms(!negated, out),
            Expr::Group(inner) => inner.collect_terms(negated, out),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_terms(negated, out);
                r.collect_terms(negated, out);
            }
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '+' | '*' | '!' | '(' | ')')
}

/// Split a query into tokens paired with their character offset.
pub fn tokenize_query(input: &str) -> Vec<(Token, usize)> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().enumerate().peekable();
    while let Some((pos, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '+' => Token::Or,
            '*' => Token::And,
            '!' => Token::Not,
            '(' => Token::LParen,
            ')' => Token::RParen,
            _ => {
                let mut word = String::from(ch);
                while let Some(&(_, c)) = chars.peek() {
                    if is_delimiter(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                Token::Word(word)
            }
        };
        tokens.push((token, pos));
    }
    tokens
}

/// Parse a boolean query into an [`Expr`].
pub fn parse(input: &str) -> Result<Expr, QueryError> {
    let tokens = tokenize_query(input);
    if tokens.is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    if tokens.len() > MAX_QUERY_TOKENS {
        return Err(QueryError::TooLong { tokens: tokens.len(), max: MAX_QUERY_TOKENS });
    }
    let mut parser = Parser { tokens, pos: 0, open_parens: 0, nesting: 0, query: input };
    let expr = parser.parse_or()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some((Token::RParen, position)) => {
            Err(QueryError::UnbalancedParen { position: *position, query: input.to_string() })
        }
        Some((token, position)) => Err(QueryError::UnexpectedToken {
            token: token.to_string(),
            position: *position,
            query: input.to_string(),
        }),
    }
}

struct Parser<'q> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    /// Open parentheses not yet closed.
    open_parens: usize,
    /// Current `(` plus `!` nesting, capped at `MAX_QUERY_DEPTH`.
    nesting: usize,
    query: &'q str,
}

impl<'q> Parser<'q> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn enter(&mut self, position: usize) -> Result<(), QueryError> {
        self.nesting += 1;
        if self.nesting > MAX_QUERY_DEPTH {
            return Err(QueryError::TooDeep { max: MAX_QUERY_DEPTH, position, query: self.query.to_string() });
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_and()?;
        while let Some(Token::Or) = self.peek() {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_not()?;
        while let Some(Token::And) = self.peek() {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::and(left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, QueryError> {
        if let Some((Token::Not, position)) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            self.enter(position)?;
            let inner = self.parse_not()?;
            self.nesting -= 1;
            return Ok(Expr::not(inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, QueryError> {
        match self.advance() {
            Some((Token::Word(w), _)) => Ok(Expr::Term(w)),
            Some((Token::LParen, open)) => {
                self.open_parens += 1;
                self.enter(open)?;
                let inner = self.parse_or()?;
                match self.advance() {
                    Some((Token::RParen, _)) => {
                        self.open_parens -= 1;
                        self.nesting -= 1;
                        Ok(Expr::group(inner))
                    }
                    Some((token, position)) => Err(QueryError::UnexpectedToken {
                        token: token.to_string(),
                        position,
                        query: self.query.to_string(),
                    }),
                    None => Err(QueryError::UnbalancedParen { position: open, query: self.query.to_string() }),
                }
            }
            Some((Token::RParen, position)) if self.open_parens == 0 => {
                Err(QueryError::UnbalancedParen { position, query: self.query.to_string() })
            }
            Some((token @ (Token::And | Token::Or), position)) => Err(QueryError::MissingOperand {
                operator: if token == Token::And { '*' } else { '+' },
                position,
                query: self.query.to_string(),
            }),
            Some((token, position)) => Err(QueryError::UnexpectedToken {
                token: token.to_string(),
                position,
                query: self.query.to_string(),
            }),
            None => Err(self.missing_operand()),
        }
    }

    /// Input ended where an operand was expected; blame the operator before it.
    fn missing_operand(&self) -> QueryError {
        let query = self.query.to_string();
        match self.tokens.last() {
            Some((Token::And, p)) => QueryError::MissingOperand { operator: '*', position: *p, query },
            Some((Token::Or, p)) => QueryError::MissingOperand { operator: '+', position: *p, query },
            Some((Token::Not, p)) => QueryError::MissingOperand { operator: '!', position: *p, query },
            // only a trailing '(' leaves nothing to parse otherwise
            Some((_, p)) => QueryError::UnbalancedParen { position: *p, query },
            None => QueryError::EmptyQuery,
        }
    }
}
