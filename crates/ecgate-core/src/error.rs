//! Error types for ecgate-core

use thiserror::Error;

/// Error raised while parsing or evaluating a condition expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Syntax error at {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("{0} is not defined")]
    Undefined(String),

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("{receiver}.{name} is not a function")]
    NotAFunction { receiver: String, name: String },

    #[error("Wrong number of arguments to {name}: expected {expected}, got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,
}

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A designer-authored condition failed to parse or evaluate.
    ///
    /// This is fatal for the action being resolved.
    #[error("{plugin}: error while running condition script: {expression} ({source})")]
    Script {
        plugin: String,
        expression: String,
        #[source]
        source: ExprError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// The literal expression text that failed, if this is a script error
    pub fn expression(&self) -> Option<&str> {
        match self {
            Error::Script { expression, .. } => Some(expression),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
