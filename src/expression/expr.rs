//! Expression AST definitions.
//!
//! Every node owns its operands. A [`Script`] additionally owns the user
//! functions it declares, keyed by normalized (lowercase) name.

use crate::expression::operator::{
    ArithmeticOp, BinaryOp, BooleanOp, ComparisonOp, ContainsOp, UnaryOp,
};
use crate::value::Value;
use std::collections::BTreeMap;

/// Normalize a function name for lookup
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant value
    Const(Value),

    /// Variable reference
    Var(String),

    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Call of a built-in or user-defined function
    FunctionCall { name: String, args: Vec<Expression> },

    /// `if condition then ... else ... endif`
    IfElse {
        condition: Box<Expression>,
        if_branch: Box<Expression>,
        else_branch: Option<Box<Expression>>,
    },

    /// `name = value`
    Assign { name: String, value: Box<Expression> },

    /// `alias : expression`, used to name projection columns
    Alias {
        alias: String,
        expression: Box<Expression>,
    },

    /// `(a, b, c)`
    Vector(Vec<Expression>),

    /// `vector[index]`
    Index {
        vector: Box<Expression>,
        index: Box<Expression>,
    },

    /// `Entity.path.to.field`
    PropertyPath { entity: String, path: Vec<String> },

    /// `project { elements } where filter`
    Projection {
        elements: Vec<Expression>,
        filter: Option<Box<Expression>>,
    },

    /// A complete program with its function definitions
    Script(Script),

    /// A sequence of statements, such as an if/else branch
    Sequence(Vec<Expression>),
}

/// A parsed program: top-level statements plus named user functions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub functions: BTreeMap<String, FunctionScript>,
    pub statements: Vec<Expression>,
}

impl Script {
    pub fn new(statements: Vec<Expression>) -> Self {
        Self {
            functions: BTreeMap::new(),
            statements,
        }
    }

    /// Add a function definition, replacing one with the same normalized name
    pub fn add_function(&mut self, function: FunctionScript) {
        self.functions
            .insert(normalize_name(&function.name), function);
    }

    pub fn function(&self, name: &str) -> Option<&FunctionScript> {
        self.functions.get(&normalize_name(name))
    }

    pub fn into_expression(self) -> Expression {
        Expression::Script(self)
    }
}

/// A user-defined function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionScript {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Vec<Expression>,
}

impl FunctionScript {
    pub fn new(name: impl Into<String>, parameters: Vec<String>, body: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            parameters,
            body,
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl Expression {
    /// Create a constant expression
    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Const(value.into())
    }

    /// Create a variable reference
    pub fn var(name: impl Into<String>) -> Self {
        Expression::Var(name.into())
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn arithmetic(op: ArithmeticOp, left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Arithmetic(op), left, right)
    }

    pub fn comparison(op: ComparisonOp, left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Comparison(op), left, right)
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Boolean(BooleanOp::And), left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Boolean(BooleanOp::Or), left, right)
    }

    pub fn contains(op: ContainsOp, left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Contains(op), left, right)
    }

    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
        }
    }

    pub fn if_else(condition: Expression, if_branch: Expression, else_branch: Option<Expression>) -> Self {
        Expression::IfElse {
            condition: Box::new(condition),
            if_branch: Box::new(if_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn assign(name: impl Into<String>, value: Expression) -> Self {
        Expression::Assign {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn alias(alias: impl Into<String>, expression: Expression) -> Self {
        Expression::Alias {
            alias: alias.into(),
            expression: Box::new(expression),
        }
    }

    pub fn index(vector: Expression, index: Expression) -> Self {
        Expression::Index {
            vector: Box::new(vector),
            index: Box::new(index),
        }
    }

    pub fn property_path(entity: impl Into<String>, path: Vec<String>) -> Self {
        Expression::PropertyPath {
            entity: entity.into(),
            path,
        }
    }

    /// The entity of the first property path found in this expression tree,
    /// in evaluation order
    pub fn first_entity(&self) -> Option<&str> {
        match self {
            Expression::PropertyPath { entity, .. } => Some(entity),
            Expression::Const(_) | Expression::Var(_) => None,
            Expression::Unary { operand, .. } => operand.first_entity(),
            Expression::Binary { left, right, .. } => {
                left.first_entity().or_else(|| right.first_entity())
            }
            Expression::Index { vector, index } => {
                vector.first_entity().or_else(|| index.first_entity())
            }
            Expression::Assign { value, .. } => value.first_entity(),
            Expression::Alias { expression, .. } => expression.first_entity(),
            Expression::IfElse {
                condition,
                if_branch,
                else_branch,
            } => condition
                .first_entity()
                .or_else(|| if_branch.first_entity())
                .or_else(|| else_branch.as_ref().and_then(|e| e.first_entity())),
            Expression::FunctionCall { args: items, .. }
            | Expression::Vector(items)
            | Expression::Sequence(items) => items.iter().find_map(Expression::first_entity),
            Expression::Projection { elements, filter } => elements
                .iter()
                .find_map(Expression::first_entity)
                .or_else(|| filter.as_ref().and_then(|f| f.first_entity())),
            Expression::Script(script) => {
                script.statements.iter().find_map(Expression::first_entity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_builders() {
        let expr = Expression::arithmetic(
            ArithmeticOp::Add,
            Expression::var("Bar"),
            Expression::constant(2i64),
        );
        assert!(matches!(
            expr,
            Expression::Binary {
                op: BinaryOp::Arithmetic(ArithmeticOp::Add),
                ..
            }
        ));

        let expr = Expression::if_else(
            Expression::constant(true),
            Expression::Sequence(vec![Expression::constant(1i64)]),
            None,
        );
        assert!(matches!(expr, Expression::IfElse { else_branch: None, .. }));
    }

    #[test]
    fn test_script_functions_are_case_normalized() {
        let mut script = Script::default();
        script.add_function(FunctionScript::new("Twice", vec!["x".to_string()], vec![]));
        assert!(script.function("twice").is_some());
        assert!(script.function("TWICE").is_some());

        script.add_function(FunctionScript::new(
            "TWICE",
            vec!["y".to_string()],
            vec![],
        ));
        assert_eq!(script.functions.len(), 1);
        assert_eq!(script.function("twice").unwrap().parameters, vec!["y"]);
    }

    #[test]
    fn test_first_entity() {
        let expr = Expression::and(
            Expression::var("x"),
            Expression::comparison(
                ComparisonOp::Gt,
                Expression::property_path("Person", vec!["age".to_string()]),
                Expression::constant(20i64),
            ),
        );
        assert_eq!(expr.first_entity(), Some("Person"));
        assert_eq!(Expression::var("x").first_entity(), None);
    }
}
