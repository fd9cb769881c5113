//! Double dispatch over the expression variants.
//!
//! A pass implements [`ExpressionVisitor`] and drives its own traversal;
//! [`Expression::accept`] only routes a node to the matching `visit_*`
//! method. Pretty printing, type inference and evaluation are all visitors.

use crate::expression::expr::{Expression, FunctionScript, Script};
use crate::expression::operator::{BinaryOp, UnaryOp};
use crate::value::Value;

pub trait ExpressionVisitor<'e> {
    type Output;

    fn visit_const(&mut self, value: &'e Value) -> Self::Output;

    fn visit_var(&mut self, name: &'e str) -> Self::Output;

    fn visit_unary(&mut self, op: UnaryOp, operand: &'e Expression) -> Self::Output;

    fn visit_binary(
        &mut self,
        op: BinaryOp,
        left: &'e Expression,
        right: &'e Expression,
    ) -> Self::Output;

    fn visit_function_call(&mut self, name: &'e str, args: &'e [Expression]) -> Self::Output;

    fn visit_if_else(
        &mut self,
        condition: &'e Expression,
        if_branch: &'e Expression,
        else_branch: Option<&'e Expression>,
    ) -> Self::Output;

    fn visit_assign(&mut self, name: &'e str, value: &'e Expression) -> Self::Output;

    fn visit_alias(&mut self, alias: &'e str, expression: &'e Expression) -> Self::Output;

    fn visit_vector(&mut self, elements: &'e [Expression]) -> Self::Output;

    fn visit_index(&mut self, vector: &'e Expression, index: &'e Expression) -> Self::Output;

    fn visit_property_path(&mut self, entity: &'e str, path: &'e [String]) -> Self::Output;

    fn visit_projection(
        &mut self,
        elements: &'e [Expression],
        filter: Option<&'e Expression>,
    ) -> Self::Output;

    fn visit_script(&mut self, script: &'e Script) -> Self::Output;

    fn visit_sequence(&mut self, statements: &'e [Expression]) -> Self::Output;

    fn visit_function_script(&mut self, function: &'e FunctionScript) -> Self::Output;
}

impl Expression {
    /// Dispatch this node to the matching visit method
    pub fn accept<'e, V: ExpressionVisitor<'e>>(&'e self, visitor: &mut V) -> V::Output {
        match self {
            Expression::Const(value) => visitor.visit_const(value),
            Expression::Var(name) => visitor.visit_var(name),
            Expression::Unary { op, operand } => visitor.visit_unary(*op, operand),
            Expression::Binary { op, left, right } => visitor.visit_binary(*op, left, right),
            Expression::FunctionCall { name, args } => visitor.visit_function_call(name, args),
            Expression::IfElse {
                condition,
                if_branch,
                else_branch,
            } => visitor.visit_if_else(condition, if_branch, else_branch.as_deref()),
            Expression::Assign { name, value } => visitor.visit_assign(name, value),
            Expression::Alias { alias, expression } => visitor.visit_alias(alias, expression),
            Expression::Vector(elements) => visitor.visit_vector(elements),
            Expression::Index { vector, index } => visitor.visit_index(vector, index),
            Expression::PropertyPath { entity, path } => visitor.visit_property_path(entity, path),
            Expression::Projection { elements, filter } => {
                visitor.visit_projection(elements, filter.as_deref())
            }
            Expression::Script(script) => visitor.visit_script(script),
            Expression::Sequence(statements) => visitor.visit_sequence(statements),
        }
    }
}

impl FunctionScript {
    pub fn accept<'e, V: ExpressionVisitor<'e>>(&'e self, visitor: &mut V) -> V::Output {
        visitor.visit_function_script(self)
    }
}

impl Script {
    pub fn accept<'e, V: ExpressionVisitor<'e>>(&'e self, visitor: &mut V) -> V::Output {
        visitor.visit_script(self)
    }
}
