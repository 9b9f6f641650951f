//! SPDX License Expression Parser
//!
//! Parses compound SPDX expressions like:
//!   `MIT OR Apache-2.0`
//!   `GPL-2.0-only WITH Classpath-exception-2.0`
//!   `(MIT AND BSD-2-Clause) OR Apache-2.0`
//!
//! Resolution aggregates per atomic license, so the important operation here
//! is [`SpdxExpression::decompose`].

use crate::{ResolverError, ResolverResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Marker used by curations to state that a finding is not a license at all
pub const NONE: &str = "NONE";

/// A parsed SPDX license expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpdxExpression {
    /// Simple license identifier (e.g., "MIT")
    Simple(String),
    /// License with exception (e.g., "GPL-2.0 WITH Classpath-exception-2.0")
    WithException {
        license: String,
        exception: String,
    },
    /// Conjunction: both must be satisfied (e.g., "MIT AND BSD-2-Clause")
    And(Box<SpdxExpression>, Box<SpdxExpression>),
    /// Disjunction: either may be chosen (e.g., "MIT OR Apache-2.0")
    Or(Box<SpdxExpression>, Box<SpdxExpression>),
}

impl SpdxExpression {
    /// Parse an SPDX expression string
    pub fn parse(input: &str) -> ResolverResult<Self> {
        let tokens = tokenize(input);
        let (expr, rest) = parse_or(&tokens).map_err(|e| {
            ResolverError::Expression(format!("'{}': {}", input, e))
        })?;
        if !rest.is_empty() {
            return Err(ResolverError::Expression(format!(
                "'{}': unexpected tokens after expression: {:?}",
                input, rest
            )));
        }
        Ok(expr)
    }

    /// Shorthand for a single license identifier
    pub fn simple(id: impl Into<String>) -> Self {
        SpdxExpression::Simple(id.into())
    }

    /// Whether this expression is a single license (optionally with exception)
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            SpdxExpression::Simple(_) | SpdxExpression::WithException { .. }
        )
    }

    /// The `NONE` marker
    pub fn is_none(&self) -> bool {
        matches!(self, SpdxExpression::Simple(id) if id.eq_ignore_ascii_case(NONE))
    }

    /// Split the expression into its distinct atomic licenses.
    ///
    /// `WITH` expressions stay intact: `GPL-2.0-only WITH Classpath-exception-2.0`
    /// is one atomic unit. Operators are dropped, so `MIT OR MIT AND ISC`
    /// decomposes to `{ISC, MIT}`.
    pub fn decompose(&self) -> BTreeSet<SpdxExpression> {
        let mut out = BTreeSet::new();
        self.collect_atomic(&mut out);
        out
    }

    fn collect_atomic(&self, out: &mut BTreeSet<SpdxExpression>) {
        match self {
            SpdxExpression::Simple(_) | SpdxExpression::WithException { .. } => {
                out.insert(self.clone());
            }
            SpdxExpression::And(a, b) | SpdxExpression::Or(a, b) => {
                a.collect_atomic(out);
                b.collect_atomic(out);
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_atomic() {
            write!(f, "{}", self)
        } else {
            write!(f, "({})", self)
        }
    }
}

impl fmt::Display for SpdxExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpdxExpression::Simple(id) => write!(f, "{}", id),
            SpdxExpression::WithException { license, exception } => {
                write!(f, "{} WITH {}", license, exception)
            }
            SpdxExpression::And(a, b) => {
                a.fmt_operand(f)?;
                write!(f, " AND ")?;
                b.fmt_operand(f)
            }
            SpdxExpression::Or(a, b) => {
                a.fmt_operand(f)?;
                write!(f, " OR ")?;
                b.fmt_operand(f)
            }
        }
    }
}

impl FromStr for SpdxExpression {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SpdxExpression {
    type Error = ResolverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SpdxExpression> for String {
    fn from(expr: SpdxExpression) -> Self {
        expr.to_string()
    }
}

// ─── Tokenizer ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    And,
    Or,
    With,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                match word.to_uppercase().as_str() {
                    "AND" => tokens.push(Token::And),
                    "OR" => tokens.push(Token::Or),
                    "WITH" => tokens.push(Token::With),
                    _ => tokens.push(Token::Identifier(word)),
                }
            }
        }
    }

    tokens
}

// ─── Recursive Descent Parser ──────────────────────────────────────
// Precedence: WITH > AND > OR (WITH binds tightest)

type ParseResult<'a> = Result<(SpdxExpression, &'a [Token]), String>;

fn parse_or(tokens: &[Token]) -> ParseResult<'_> {
    let (mut left, mut rest) = parse_and(tokens)?;

    while rest.first() == Some(&Token::Or) {
        let (right, r) = parse_and(&rest[1..])?;
        left = SpdxExpression::Or(Box::new(left), Box::new(right));
        rest = r;
    }

    Ok((left, rest))
}

fn parse_and(tokens: &[Token]) -> ParseResult<'_> {
    let (mut left, mut rest) = parse_with(tokens)?;

    while rest.first() == Some(&Token::And) {
        let (right, r) = parse_with(&rest[1..])?;
        left = SpdxExpression::And(Box::new(left), Box::new(right));
        rest = r;
    }

    Ok((left, rest))
}

fn parse_with(tokens: &[Token]) -> ParseResult<'_> {
    let (base, rest) = parse_primary(tokens)?;

    if rest.first() == Some(&Token::With) {
        if let (Some(Token::Identifier(exception)), SpdxExpression::Simple(license)) =
            (rest.get(1), &base)
        {
            return Ok((
                SpdxExpression::WithException {
                    license: license.clone(),
                    exception: exception.clone(),
                },
                &rest[2..],
            ));
        }
        return Err("WITH must join a simple license identifier and an exception".to_string());
    }

    Ok((base, rest))
}

fn parse_primary(tokens: &[Token]) -> ParseResult<'_> {
    match tokens.first() {
        None => Err("Unexpected end of expression".to_string()),
        Some(Token::LParen) => {
            let (expr, rest) = parse_or(&tokens[1..])?;
            if rest.first() != Some(&Token::RParen) {
                return Err("Missing closing parenthesis".to_string());
            }
            Ok((expr, &rest[1..]))
        }
        Some(Token::Identifier(id)) => Ok((SpdxExpression::Simple(id.clone()), &tokens[1..])),
        Some(other) => Err(format!("Unexpected token: {:?}", other)),
    }
}
