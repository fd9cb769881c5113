//! Operator definitions for expressions.

use crate::value::ValueType;
use std::fmt;

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }

    /// Wrapping long arithmetic; `None` only for division by zero
    pub fn apply_long(&self, left: i64, right: i64) -> Option<i64> {
        match self {
            ArithmeticOp::Add => Some(left.wrapping_add(right)),
            ArithmeticOp::Subtract => Some(left.wrapping_sub(right)),
            ArithmeticOp::Multiply => Some(left.wrapping_mul(right)),
            ArithmeticOp::Divide if right == 0 => None,
            ArithmeticOp::Divide => Some(left.wrapping_div(right)),
        }
    }

    pub fn apply_double(&self, left: f64, right: f64) -> f64 {
        match self {
            ArithmeticOp::Add => left + right,
            ArithmeticOp::Subtract => left - right,
            ArithmeticOp::Multiply => left * right,
            ArithmeticOp::Divide => left / right,
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }

    /// True for `==` and `!=`, which are also defined on unordered values
    pub fn is_equality(&self) -> bool {
        matches!(self, ComparisonOp::Eq | ComparisonOp::Ne)
    }

    /// Interpret the result of a three-way comparison
    pub fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            ComparisonOp::Eq => ordering == Equal,
            ComparisonOp::Ne => ordering != Equal,
            ComparisonOp::Lt => ordering == Less,
            ComparisonOp::Le => ordering != Greater,
            ComparisonOp::Gt => ordering == Greater,
            ComparisonOp::Ge => ordering != Less,
        }
    }
}

/// Boolean connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    And,
    Or,
    Xor,
}

impl BooleanOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOp::And => "and",
            BooleanOp::Or => "or",
            BooleanOp::Xor => "xor",
        }
    }
}

/// Membership operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainsOp {
    In,
    NotIn,
}

impl ContainsOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainsOp::In => "in",
            ContainsOp::NotIn => "not in",
        }
    }
}

/// Binary operators, grouped by family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Arithmetic(ArithmeticOp),
    Comparison(ComparisonOp),
    Boolean(BooleanOp),
    Contains(ContainsOp),
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Arithmetic(op) => op.as_str(),
            BinaryOp::Comparison(op) => op.as_str(),
            BinaryOp::Boolean(op) => op.as_str(),
            BinaryOp::Contains(op) => op.as_str(),
        }
    }

    /// Get the result type of this operator given operand types, or `VOID`
    /// if the operand types are incompatible
    pub fn output_type(&self, left: ValueType, right: ValueType) -> ValueType {
        match self {
            BinaryOp::Arithmetic(op) => {
                if left.is_number() && right.is_number() {
                    join_types(left, right)
                } else if *op == ArithmeticOp::Add && left.is_string() && right.is_string() {
                    ValueType::String
                } else {
                    ValueType::Void
                }
            }
            BinaryOp::Boolean(_) => {
                if left.is_boolean() && right.is_boolean() {
                    ValueType::Boolean
                } else {
                    ValueType::Void
                }
            }
            BinaryOp::Contains(_) => {
                if right.is_vector() || (left.is_string() && right.is_string()) {
                    ValueType::Boolean
                } else {
                    ValueType::Void
                }
            }
            BinaryOp::Comparison(_) => {
                if (left.is_number() && right.is_number()) || left == right {
                    ValueType::Boolean
                } else {
                    ValueType::Void
                }
            }
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type two values join to: equal types are kept, mixed numbers promote
/// to `DOUBLE` if either side is a double, everything else is `VOID`
pub fn join_types(left: ValueType, right: ValueType) -> ValueType {
    if left == right {
        return left;
    }

    if left.is_number() && right.is_number() {
        if left.is_double() || right.is_double() {
            ValueType::Double
        } else {
            ValueType::Long
        }
    } else {
        ValueType::Void
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Minus,
    Not,
    IsEmpty,
    IsNotEmpty,
}

impl UnaryOp {
    /// Get the output type of this operator given the operand type, or `VOID`
    /// if the operand type is not supported
    pub fn output_type(&self, operand: ValueType) -> ValueType {
        match self {
            UnaryOp::Minus if operand.is_number() => operand,
            UnaryOp::Not if operand.is_boolean() => ValueType::Boolean,
            UnaryOp::IsEmpty | UnaryOp::IsNotEmpty
                if operand.is_string() || operand.is_vector() =>
            {
                ValueType::Boolean
            }
            _ => ValueType::Void,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Not => "not",
            UnaryOp::IsEmpty => "is empty",
            UnaryOp::IsNotEmpty => "is not empty",
        }
    }

    /// Postfix operators are printed after their operand
    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOp::IsEmpty | UnaryOp::IsNotEmpty)
    }
}
