// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failures while tokenizing, parsing or evaluating a binding condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("Unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("Expression is empty")]
    Empty,

    #[error("Expression is {length} characters long, limit is {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("Expression nests deeper than {0} levels")]
    TooDeep(usize),
}
