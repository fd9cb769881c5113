//! Expression evaluation.

use crate::dataframe::DataFrame;
use crate::error::{EngineError, Result};
use crate::expression::context::{CallContext, EvalContext};
use crate::expression::expr::{normalize_name, Expression, FunctionScript, Script};
use crate::expression::operator::{BinaryOp, BooleanOp, ComparisonOp, ContainsOp, UnaryOp};
use crate::expression::pretty_print::expr_to_string;
use crate::expression::type_inference::TypeInference;
use crate::expression::visitor::ExpressionVisitor;
use crate::report;
use crate::value::{Value, ValueType};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Evaluate an expression against a context
pub fn evaluate(expr: &Expression, context: &mut dyn EvalContext) -> Result<Value> {
    Evaluator::new(context).evaluate(expr)
}

/// Evaluator for expressions
pub struct Evaluator<'e, 'c> {
    context: &'c mut dyn EvalContext,
    functions: Option<&'e BTreeMap<String, FunctionScript>>,
    /// Current row of the data set a projection is scanning
    projection_row: Option<usize>,
}

impl<'e, 'c> Evaluator<'e, 'c> {
    pub fn new(context: &'c mut dyn EvalContext) -> Self {
        Self {
            context,
            functions: None,
            projection_row: None,
        }
    }

    /// Make the functions of a script callable from evaluated expressions
    pub fn with_functions(mut self, functions: &'e BTreeMap<String, FunctionScript>) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn evaluate(&mut self, expr: &'e Expression) -> Result<Value> {
        expr.accept(self)
    }

    fn evaluate_statements(&mut self, statements: &'e [Expression]) -> Result<Value> {
        let mut result = Value::Void;
        for statement in statements {
            result = statement.accept(self)?;
        }
        Ok(result)
    }

    fn operands(&mut self, left: &'e Expression, right: &'e Expression) -> Result<(Value, Value)> {
        Ok((left.accept(self)?, right.accept(self)?))
    }

    fn evaluate_boolean(&mut self, op: BooleanOp, left: &'e Expression, right: &'e Expression) -> Result<Value> {
        let left = left.accept(self)?;
        let short_circuit = match (op, &left) {
            (_, Value::Void) => Some(Value::Void),
            (BooleanOp::And, Value::Boolean(false)) => Some(Value::Boolean(false)),
            (BooleanOp::Or, Value::Boolean(true)) => Some(Value::Boolean(true)),
            (_, Value::Boolean(_)) => None,
            _ => return report::fail(EngineError::unsupported(op.as_str(), left.as_string_literal())),
        };
        if let Some(result) = short_circuit {
            return Ok(result);
        }

        let right = right.accept(self)?;
        match (&left, &right) {
            (_, Value::Void) => Ok(Value::Void),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(match op {
                BooleanOp::And => *a && *b,
                BooleanOp::Or => *a || *b,
                BooleanOp::Xor => a ^ b,
            })),
            _ => report::fail(EngineError::unsupported(op.as_str(), right.as_string_literal())),
        }
    }

    fn evaluate_contains(&self, op: ContainsOp, left: Value, right: Value) -> Result<Value> {
        let found = match (&left, &right) {
            (_, Value::Void) => return Ok(Value::Void),
            (_, Value::Vector(elements)) => elements.iter().any(|element| {
                matches!(
                    left.apply_comparison(element, ComparisonOp::Eq),
                    Ok(Value::Boolean(true))
                )
            }),
            (Value::Void, Value::String(_)) => return Ok(Value::Void),
            (Value::String(needle), Value::String(haystack)) => haystack.contains(needle.as_str()),
            _ => return report::fail(EngineError::unsupported(op.as_str(), right.as_string_literal())),
        };

        Ok(Value::Boolean(match op {
            ContainsOp::In => found,
            ContainsOp::NotIn => !found,
        }))
    }

    fn call_user_function(&mut self, function: &'e FunctionScript, arguments: Vec<Value>) -> Result<Value> {
        if function.parameters.len() != arguments.len() {
            return report::fail(EngineError::InvalidArgumentCount {
                function: function.name.clone(),
                usage: format!("Usage: {}({})", function.name, function.parameters.join(", ")),
            });
        }

        log::trace!("calling user function {}", function.name);

        let mut call = CallContext::new(&*self.context);
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            call.set_variable(parameter, argument);
        }

        let mut nested = Evaluator {
            context: &mut call,
            functions: self.functions,
            projection_row: None,
        };
        function.accept(&mut nested)
    }

    /// Promote a long branch result to double when the other branch is
    /// typed double, so the value matches the if-else's joined type
    fn widen_to_branch(&self, value: Value, other: Option<&'e Expression>) -> Value {
        let Some(other) = other else {
            return value;
        };
        let n = match value {
            Value::Long(n) => n,
            _ => return value,
        };
        let mut inference = TypeInference::new(&*self.context);
        if let Some(functions) = self.functions {
            inference = inference.with_functions(functions);
        }
        match inference.infer_expression_type(other) {
            ValueType::Double => Value::Double(n as f64),
            _ => Value::Long(n),
        }
    }

    /// Column name for a projected element
    fn column_name(element: &Expression) -> String {
        match element {
            Expression::Alias { alias, .. } => alias.clone(),
            _ => expr_to_string(element),
        }
    }
}

impl<'e> ExpressionVisitor<'e> for Evaluator<'e, '_> {
    type Output = Result<Value>;

    fn visit_const(&mut self, value: &'e Value) -> Result<Value> {
        Ok(value.clone())
    }

    fn visit_var(&mut self, name: &'e str) -> Result<Value> {
        self.context.get_variable(name).map_err(report::report)
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &'e Expression) -> Result<Value> {
        let value = operand.accept(self)?;
        match (op, &value) {
            (UnaryOp::Minus | UnaryOp::Not, Value::Void) => Ok(Value::Void),
            (UnaryOp::Minus, Value::Long(n)) => Ok(Value::Long(n.wrapping_neg())),
            (UnaryOp::Minus, Value::Double(d)) => Ok(Value::Double(-d)),
            (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
            (UnaryOp::IsEmpty | UnaryOp::IsNotEmpty, _) => {
                let empty = match &value {
                    Value::Void => true,
                    Value::String(s) => s.is_empty(),
                    Value::Vector(elements) => elements.is_empty(),
                    _ => {
                        return report::fail(EngineError::unsupported(
                            op.as_str(),
                            value.as_string_literal(),
                        ))
                    }
                };
                Ok(Value::Boolean(empty == (op == UnaryOp::IsEmpty)))
            }
            _ => report::fail(EngineError::unsupported(op.as_str(), value.as_string_literal())),
        }
    }

    fn visit_binary(&mut self, op: BinaryOp, left: &'e Expression, right: &'e Expression) -> Result<Value> {
        match op {
            BinaryOp::Boolean(op) => self.evaluate_boolean(op, left, right),
            BinaryOp::Arithmetic(op) => {
                let (left, right) = self.operands(left, right)?;
                left.apply(&right, op).map_err(report::report)
            }
            BinaryOp::Comparison(op) => {
                let (left, right) = self.operands(left, right)?;
                left.apply_comparison(&right, op).map_err(report::report)
            }
            BinaryOp::Contains(op) => {
                let (left, right) = self.operands(left, right)?;
                self.evaluate_contains(op, left, right)
            }
        }
    }

    fn visit_function_call(&mut self, name: &'e str, args: &'e [Expression]) -> Result<Value> {
        let arguments = args
            .iter()
            .map(|arg| arg.accept(self))
            .collect::<Result<Vec<Value>>>()?;
        let normalized = normalize_name(name);

        if let Some(function) = self.functions.and_then(|functions| functions.get(&normalized)) {
            return self.call_user_function(function, arguments);
        }

        let registry = self.context.registry();
        match registry.get(&normalized) {
            Some(descriptor) => descriptor.evaluate(arguments, &*self.context),
            None => report::fail(EngineError::UnknownFunction(name.to_string())),
        }
    }

    fn visit_if_else(
        &mut self,
        condition: &'e Expression,
        if_branch: &'e Expression,
        else_branch: Option<&'e Expression>,
    ) -> Result<Value> {
        match condition.accept(self)? {
            Value::Boolean(true) => {
                let value = if_branch.accept(self)?;
                Ok(self.widen_to_branch(value, else_branch))
            }
            Value::Boolean(false) => match else_branch {
                Some(else_branch) => {
                    let value = else_branch.accept(self)?;
                    Ok(self.widen_to_branch(value, Some(if_branch)))
                }
                None => Ok(Value::Void),
            },
            other => report::fail(EngineError::TypeMismatch {
                expected: ValueType::Boolean,
                actual: other.value_type(),
            }),
        }
    }

    fn visit_assign(&mut self, name: &'e str, value: &'e Expression) -> Result<Value> {
        let value = value.accept(self)?;
        self.context.set_variable(name, value.clone());
        Ok(value)
    }

    fn visit_alias(&mut self, _alias: &'e str, expression: &'e Expression) -> Result<Value> {
        expression.accept(self)
    }

    fn visit_vector(&mut self, elements: &'e [Expression]) -> Result<Value> {
        let values = elements
            .iter()
            .map(|element| element.accept(self))
            .collect::<Result<Vec<Value>>>()?;
        Ok(Value::Vector(values))
    }

    fn visit_index(&mut self, vector: &'e Expression, index: &'e Expression) -> Result<Value> {
        let vector = vector.accept(self)?;
        let index = index.accept(self)?;

        let elements = vector.as_vector().map_err(report::report)?;
        let position = index.as_long().map_err(report::report)?;
        if position < 0 || position as usize >= elements.len() {
            return report::fail(EngineError::IndexOutOfBounds {
                index: position,
                size: elements.len(),
            });
        }
        Ok(elements[position as usize].clone())
    }

    fn visit_property_path(&mut self, entity: &'e str, path: &'e [String]) -> Result<Value> {
        let Some(data_set) = self.context.get_data_set(entity) else {
            return report::fail(EngineError::evaluation(format!("Unknown data set '{}'", entity)));
        };
        let Some(row) = self.projection_row else {
            return report::fail(EngineError::evaluation(format!(
                "Property path '{}.{}' outside of a projection",
                entity,
                path.join(".")
            )));
        };
        data_set.field_value(row, &path.join("."))
    }

    fn visit_projection(&mut self, elements: &'e [Expression], filter: Option<&'e Expression>) -> Result<Value> {
        let entity = elements
            .iter()
            .find_map(Expression::first_entity)
            .or_else(|| filter.and_then(Expression::first_entity));
        let Some(entity) = entity else {
            return report::fail(EngineError::evaluation("Projection does not reference a data set"));
        };
        let Some(data_set) = self.context.get_data_set(entity) else {
            return report::fail(EngineError::evaluation(format!("Unknown data set '{}'", entity)));
        };

        let mut column_types: Vec<ValueType> = {
            let mut inference = TypeInference::new(&*self.context);
            if let Some(functions) = self.functions {
                inference = inference.with_functions(functions);
            }
            elements
                .iter()
                .map(|element| inference.infer_expression_type(element))
                .collect()
        };

        let saved_row = self.projection_row;
        let mut rows = Vec::new();
        for row in 0..data_set.row_count() {
            self.projection_row = Some(row);

            if let Some(filter) = filter {
                if filter.accept(self)? != Value::Boolean(true) {
                    continue;
                }
            }

            let values = elements
                .iter()
                .map(|element| element.accept(self))
                .collect::<Result<Vec<Value>>>()?;
            rows.push(values);
        }
        self.projection_row = saved_row;

        // fall back to the observed values where inference has no answer
        for (column, value_type) in column_types.iter_mut().enumerate() {
            if value_type.is_void() {
                *value_type = rows
                    .iter()
                    .map(|row| row[column].value_type())
                    .find(|t| !t.is_void())
                    .unwrap_or(ValueType::String);
            }
        }

        let mut frame = DataFrame::with_registry(entity, self.context.registry());
        for (element, value_type) in elements.iter().zip(&column_types) {
            frame.add_column(&Self::column_name(element), *value_type)?;
        }
        for values in rows {
            frame.add_row(values)?;
        }

        log::debug!("projected {} row(s) from {}", frame.row_count(), entity);
        Ok(Value::DataFrame(Arc::new(frame)))
    }

    fn visit_script(&mut self, script: &'e Script) -> Result<Value> {
        self.functions = Some(&script.functions);
        self.evaluate_statements(&script.statements)
    }

    fn visit_sequence(&mut self, statements: &'e [Expression]) -> Result<Value> {
        self.evaluate_statements(statements)
    }

    fn visit_function_script(&mut self, function: &'e FunctionScript) -> Result<Value> {
        self.evaluate_statements(&function.body)
    }
}
