//! Expression language core.
//!
//! This module provides:
//! - Expression AST representation
//! - A visitor framework with pretty printing, type inference and
//!   evaluation passes
//! - Evaluation contexts and the named data set contract

pub mod context;
pub mod eval;
pub mod expr;
pub mod operator;
pub mod pretty_print;
pub mod type_inference;
pub mod visitor;

pub use context::{CallContext, DataSet, EvalContext, SimpleEvalContext};
pub use eval::{evaluate, Evaluator};
pub use expr::{normalize_name, Expression, FunctionScript, Script};
pub use operator::{
    join_types, ArithmeticOp, BinaryOp, BooleanOp, ComparisonOp, ContainsOp, UnaryOp,
};
pub use pretty_print::{expr_to_string, PrettyPrinter};
pub use type_inference::TypeInference;
pub use visitor::ExpressionVisitor;
