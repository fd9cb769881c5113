//! Engine error types.

use crate::value::ValueType;
use thiserror::Error;

/// Errors raised while parsing, checking or evaluating scripts and while
/// operating on data frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Undefined operation {operation} on {operand}")]
    UnsupportedOperation { operation: String, operand: String },

    #[error("Incompatible types in {operation}: {left} and {right}")]
    IncompatibleTypes {
        operation: String,
        left: String,
        right: String,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid number of parameters in a call to '{function}'. {usage}")]
    InvalidArgumentCount { function: String, usage: String },

    #[error("Invalid parameter type in a call to '{function}': expected {expected}, got {actual}")]
    InvalidArgumentType {
        function: String,
        expected: ValueType,
        actual: ValueType,
    },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    #[error("Index {index} is out of bounds for size {size}")]
    IndexOutOfBounds { index: i64, size: usize },

    #[error("Cannot convert '{input}' in '{function}': {reason}")]
    Conversion {
        function: String,
        input: String,
        reason: String,
    },

    #[error("{description}: {expression}")]
    TypeInference {
        description: String,
        expression: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

impl EngineError {
    pub fn unsupported(operation: impl Into<String>, operand: impl Into<String>) -> Self {
        EngineError::UnsupportedOperation {
            operation: operation.into(),
            operand: operand.into(),
        }
    }

    pub fn incompatible(
        operation: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        EngineError::IncompatibleTypes {
            operation: operation.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        EngineError::Configuration(message.into())
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        EngineError::Evaluation(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        EngineError::Parse(message.into())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::unsupported("+", "true");
        assert_eq!(err.to_string(), "Undefined operation + on true");

        let err = EngineError::InvalidArgumentCount {
            function: "substr".to_string(),
            usage: "Usage: substr(string, beginIndex[, endIndex])".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid number of parameters in a call to 'substr'. Usage: substr(string, beginIndex[, endIndex])"
        );

        let err = EngineError::InvalidArgumentType {
            function: "toLong".to_string(),
            expected: ValueType::String,
            actual: ValueType::Long,
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameter type in a call to 'toLong': expected STRING, got LONG"
        );

        let err = EngineError::configuration("Unknown column 'Waldo'");
        assert_eq!(err.to_string(), "Configuration error: Unknown column 'Waldo'");

        assert_eq!(EngineError::DivisionByZero.to_string(), "Division by zero");
    }
}
