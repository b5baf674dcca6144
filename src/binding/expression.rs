// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Boolean condition evaluator.
//!
//! Conditions reach this module after template substitution, so they only
//! contain literals and operators. The grammar, lowest precedence first:
//!
//! ```text
//! or         := and ("||" and)*
//! and        := equality ("&&" equality)*
//! equality   := comparison (("==" | "!=" | "===" | "!==") comparison)*
//! comparison := additive (("<" | "<=" | ">" | ">=") additive)*
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/" | "%") unary)*
//! unary      := ("!" | "-" | "+") unary | primary
//! primary    := number | true | false | null | undefined | NaN | "(" or ")"
//! ```
//!
//! Operators follow loose browser semantics: booleans compare as 0/1, `null`
//! only loosely equals `undefined`, and `&&`/`||` yield one of their operands.
//! Anything else (identifiers, strings, templates left unsubstituted) is a
//! parse error, as is input longer than [`MAX_LENGTH`] characters or nesting
//! of unary operators and parentheses deeper than [`MAX_DEPTH`].

use crate::binding::coercion::format_number;
use crate::errors::ExpressionError;
use std::fmt;

pub const MAX_LENGTH: usize = 4096;
pub const MAX_DEPTH: usize = 64;

/// Evaluate `expression` and return its truthiness.
pub fn evaluate(expression: &str) -> Result<bool, ExpressionError> {
    let length = expression.chars().count();
    if length > MAX_LENGTH {
        return Err(ExpressionError::TooLong {
            length,
            limit: MAX_LENGTH,
        });
    }

    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut parser = Parser {
        tokens,
        position: 0,
        depth: 0,
    };
    let value = parser.or()?;
    match parser.peek() {
        Some(token) => Err(ExpressionError::UnexpectedToken(token.to_string())),
        None => Ok(value.is_truthy()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Literal(Operand),
    LeftParen,
    RightParen,
    Not,
    And,
    Or,
    LooseEq,
    LooseNotEq,
    StrictEq,
    StrictNotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Token::Number(n) => return f.write_str(&format_number(*n)),
            Token::Literal(operand) => return write!(f, "{operand}"),
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::Not => "!",
            Token::And => "&&",
            Token::Or => "||",
            Token::LooseEq => "==",
            Token::LooseNotEq => "!=",
            Token::StrictEq => "===",
            Token::StrictNotEq => "!==",
            Token::Less => "<",
            Token::LessEq => "<=",
            Token::Greater => ">",
            Token::GreaterEq => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
        };
        f.write_str(symbol)
    }
}

/// Runtime value of a sub-expression.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    Number(f64),
    Bool(bool),
    Null,
    Undefined,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(n) => f.write_str(&format_number(*n)),
            Operand::Bool(b) => write!(f, "{b}"),
            Operand::Null => f.write_str("null"),
            Operand::Undefined => f.write_str("undefined"),
        }
    }
}

impl Operand {
    fn to_number(self) -> f64 {
        match self {
            Operand::Number(n) => n,
            Operand::Bool(b) => f64::from(u8::from(b)),
            Operand::Null => 0.0,
            Operand::Undefined => f64::NAN,
        }
    }

    fn is_truthy(self) -> bool {
        match self {
            Operand::Number(n) => n != 0.0 && !n.is_nan(),
            Operand::Bool(b) => b,
            Operand::Null | Operand::Undefined => false,
        }
    }

    fn is_nullish(self) -> bool {
        matches!(self, Operand::Null | Operand::Undefined)
    }

    fn loose_eq(self, other: Operand) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Operand::Bool(a), Operand::Bool(b)) => a == b,
            (a, b) => a.to_number() == b.to_number(),
        }
    }

    fn strict_eq(self, other: Operand) -> bool {
        match (self, other) {
            (Operand::Number(a), Operand::Number(b)) => a == b,
            (Operand::Bool(a), Operand::Bool(b)) => a == b,
            (Operand::Null, Operand::Null) | (Operand::Undefined, Operand::Undefined) => true,
            _ => false,
        }
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, ExpressionError> {
    let chars: Vec<char> = expression.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                i += 1;
                if i < chars.len() && matches!(chars[i], '+' | '-') {
                    i += 1;
                }
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| ExpressionError::InvalidNumber(text.clone()))?;
            tokens.push(Token::Number(value));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let literal = match word.as_str() {
                "true" => Operand::Bool(true),
                "false" => Operand::Bool(false),
                "null" => Operand::Null,
                "undefined" => Operand::Undefined,
                "NaN" => Operand::Number(f64::NAN),
                "Infinity" => Operand::Number(f64::INFINITY),
                _ => return Err(ExpressionError::UnexpectedToken(word)),
            };
            tokens.push(Token::Literal(literal));
            continue;
        }

        let next = |offset: usize| chars.get(i + offset).copied();
        let (token, width) = match (c, next(1), next(2)) {
            ('=', Some('='), Some('=')) => (Token::StrictEq, 3),
            ('!', Some('='), Some('=')) => (Token::StrictNotEq, 3),
            ('=', Some('='), _) => (Token::LooseEq, 2),
            ('!', Some('='), _) => (Token::LooseNotEq, 2),
            ('<', Some('='), _) => (Token::LessEq, 2),
            ('>', Some('='), _) => (Token::GreaterEq, 2),
            ('&', Some('&'), _) => (Token::And, 2),
            ('|', Some('|'), _) => (Token::Or, 2),
            ('!', _, _) => (Token::Not, 1),
            ('<', _, _) => (Token::Less, 1),
            ('>', _, _) => (Token::Greater, 1),
            ('(', _, _) => (Token::LeftParen, 1),
            (')', _, _) => (Token::RightParen, 1),
            ('+', _, _) => (Token::Plus, 1),
            ('-', _, _) => (Token::Minus, 1),
            ('*', _, _) => (Token::Star, 1),
            ('/', _, _) => (Token::Slash, 1),
            ('%', _, _) => (Token::Percent, 1),
            (character, _, _) => {
                return Err(ExpressionError::UnexpectedCharacter {
                    character,
                    position: i,
                })
            }
        };
        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Operand, ExpressionError>,
    ) -> Result<Operand, ExpressionError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExpressionError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Consume the next token if `accept` maps it to an operator.
    fn operator<T>(&mut self, accept: impl Fn(Token) -> Option<T>) -> Option<T> {
        let op = self.peek().and_then(accept)?;
        self.position += 1;
        Some(op)
    }

    fn or(&mut self) -> Result<Operand, ExpressionError> {
        let mut left = self.and()?;
        while self.operator(|t| (t == Token::Or).then_some(())).is_some() {
            let right = self.and()?;
            left = if left.is_truthy() { left } else { right };
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Operand, ExpressionError> {
        let mut left = self.equality()?;
        while self.operator(|t| (t == Token::And).then_some(())).is_some() {
            let right = self.equality()?;
            left = if left.is_truthy() { right } else { left };
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Operand, ExpressionError> {
        let mut left = self.comparison()?;
        while let Some(op) = self.operator(|t| {
            matches!(
                t,
                Token::LooseEq | Token::LooseNotEq | Token::StrictEq | Token::StrictNotEq
            )
            .then_some(t)
        }) {
            let right = self.comparison()?;
            let result = match op {
                Token::LooseEq => left.loose_eq(right),
                Token::LooseNotEq => !left.loose_eq(right),
                Token::StrictEq => left.strict_eq(right),
                _ => !left.strict_eq(right),
            };
            left = Operand::Bool(result);
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Operand, ExpressionError> {
        let mut left = self.additive()?;
        while let Some(op) = self.operator(|t| {
            matches!(t, Token::Less | Token::LessEq | Token::Greater | Token::GreaterEq)
                .then_some(t)
        }) {
            let right = self.additive()?;
            let (a, b) = (left.to_number(), right.to_number());
            let result = match op {
                Token::Less => a < b,
                Token::LessEq => a <= b,
                Token::Greater => a > b,
                _ => a >= b,
            };
            left = Operand::Bool(result);
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Operand, ExpressionError> {
        let mut left = self.term()?;
        while let Some(op) =
            self.operator(|t| matches!(t, Token::Plus | Token::Minus).then_some(t))
        {
            let right = self.term()?;
            let (a, b) = (left.to_number(), right.to_number());
            left = Operand::Number(if op == Token::Plus { a + b } else { a - b });
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Operand, ExpressionError> {
        let mut left = self.unary()?;
        while let Some(op) = self
            .operator(|t| matches!(t, Token::Star | Token::Slash | Token::Percent).then_some(t))
        {
            let right = self.unary()?;
            let (a, b) = (left.to_number(), right.to_number());
            left = Operand::Number(match op {
                Token::Star => a * b,
                Token::Slash => a / b,
                _ => a % b,
            });
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Operand, ExpressionError> {
        match self.peek() {
            Some(Token::Not) => {
                self.position += 1;
                Ok(Operand::Bool(!self.nested(Self::unary)?.is_truthy()))
            }
            Some(Token::Minus) => {
                self.position += 1;
                Ok(Operand::Number(-self.nested(Self::unary)?.to_number()))
            }
            Some(Token::Plus) => {
                self.position += 1;
                Ok(Operand::Number(self.nested(Self::unary)?.to_number()))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Operand, ExpressionError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Operand::Number(n)),
            Some(Token::Literal(operand)) => Ok(operand),
            Some(Token::LeftParen) => {
                let value = self.nested(Self::or)?;
                match self.next() {
                    Some(Token::RightParen) => Ok(value),
                    Some(token) => Err(ExpressionError::UnexpectedToken(token.to_string())),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            Some(token) => Err(ExpressionError::UnexpectedToken(token.to_string())),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons() {
        assert_eq!(evaluate("100 > 50"), Ok(true));
        assert_eq!(evaluate("10 > 50"), Ok(false));
        assert_eq!(evaluate("3 <= 3"), Ok(true));
        assert_eq!(evaluate("2.5 >= 2.51"), Ok(false));
        assert_eq!(evaluate("-5 < 0"), Ok(true));
    }

    #[test]
    fn test_nesting_limit() {
        let nots = format!("{}1", "!".repeat(MAX_DEPTH));
        assert_eq!(evaluate(&nots), Ok(true));
        let too_many_nots = format!("{}1", "!".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&too_many_nots), Err(ExpressionError::TooDeep(MAX_DEPTH)));

        let parens = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(evaluate(&parens), Ok(true));
        let deep_parens = format!("{}1{}", "(".repeat(2_000), ")".repeat(2_000));
        assert_eq!(evaluate(&deep_parens), Err(ExpressionError::TooDeep(MAX_DEPTH)));

        let mixed = "-(".repeat(MAX_DEPTH) + "1" + &")".repeat(MAX_DEPTH);
        assert_eq!(evaluate(&mixed), Err(ExpressionError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_length_limit() {
        let long = format!("{}1", "!".repeat(100_000));
        assert_eq!(
            evaluate(&long),
            Err(ExpressionError::TooLong {
                length: 100_001,
                limit: MAX_LENGTH
            })
        );

        let wide = vec!["1"; 2_000].join(" + ");
        assert!(wide.len() > MAX_LENGTH);
        assert!(matches!(evaluate(&wide), Err(ExpressionError::TooLong { .. })));
    }

    #[test]
    fn test_injected_code_is_rejected() {
        assert!(evaluate("process.exit() > 0").is_err());
        assert!(evaluate("constructor.constructor('return 1')()").is_err());
        assert!(evaluate("1; require('fs')").is_err());
        assert!(evaluate("this.x = 1").is_err());
    }

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("1 + 2 * 3 == 7"), Ok(true));
        assert_eq!(evaluate("(1 + 2) * 3 == 9"), Ok(true));
        assert_eq!(evaluate("10 % 4 === 2"), Ok(true));
        assert_eq!(evaluate("1 > 2 || 3 > 2 && 4 > 3"), Ok(true));
        assert_eq!(evaluate("!(1 > 2) && !0"), Ok(true));
    }

    #[test]
    fn test_loose_and_strict_equality() {
        assert_eq!(evaluate("true == 1"), Ok(true));
        assert_eq!(evaluate("true === 1"), Ok(false));
        assert_eq!(evaluate("null == undefined"), Ok(true));
        assert_eq!(evaluate("null === undefined"), Ok(false));
        assert_eq!(evaluate("null == 0"), Ok(false));
        assert_eq!(evaluate("NaN == NaN"), Ok(false));
        assert_eq!(evaluate("1 !== 2"), Ok(true));
    }

    #[test]
    fn test_truthiness_of_bare_values() {
        assert_eq!(evaluate("42"), Ok(true));
        assert_eq!(evaluate("0"), Ok(false));
        assert_eq!(evaluate("undefined"), Ok(false));
        assert_eq!(evaluate("undefined > 5"), Ok(false));
        assert_eq!(evaluate("0 || 7"), Ok(true));
        assert_eq!(evaluate("1 / 0 > 1e300"), Ok(true));
    }

    #[test]
    fn test_rejects_anything_but_literals_and_operators() {
        assert_eq!(
            evaluate("alice > 5"),
            Err(ExpressionError::UnexpectedToken("alice".to_string()))
        );
        assert_eq!(
            evaluate("'a' == 'a'"),
            Err(ExpressionError::UnexpectedCharacter {
                character: '\'',
                position: 0
            })
        );
        assert_eq!(
            evaluate("{{attributes.count}} > 1"),
            Err(ExpressionError::UnexpectedCharacter {
                character: '{',
                position: 0
            })
        );
        assert!(evaluate("x = 1").is_err());
    }

    #[test]
    fn test_malformed_expressions() {
        assert_eq!(evaluate("   "), Err(ExpressionError::Empty));
        assert_eq!(evaluate("1 >"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(evaluate("(1 > 0"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(
            evaluate("1 2"),
            Err(ExpressionError::UnexpectedToken("2".to_string()))
        );
        assert_eq!(
            evaluate("1.2.3 > 0"),
            Err(ExpressionError::InvalidNumber("1.2.3".to_string()))
        );
    }
}
