//! Static type inference.
//!
//! Derives the value type of every subexpression without evaluating it.
//! Errors do not stop the pass; they accumulate as (description, expression)
//! pairs and the first one is what callers usually surface.

use crate::error::EngineError;
use crate::expression::context::EvalContext;
use crate::expression::expr::{normalize_name, Expression, FunctionScript, Script};
use crate::expression::operator::{join_types, BinaryOp, UnaryOp};
use crate::expression::pretty_print::expr_to_string;
use crate::expression::visitor::ExpressionVisitor;
use crate::value::{Value, ValueType};
use std::collections::{BTreeMap, HashMap};

pub const ERR_IF_ELSE_INCOMPATIBLE: &str = "Incompatible types in branches of if-else";
pub const ERR_TYPES_IN_EXPRESSION: &str = "Incompatible operand types in expression";
pub const ERR_UNDEFINED_VARIABLE: &str = "Undefined variable";
pub const ERR_CONDITION_NOT_BOOLEAN: &str = "Condition type is not boolean";
pub const ERR_UNKNOWN_FUNCTION: &str = "Unknown function";
pub const ERR_ARGUMENT_COUNT: &str = "Invalid number of parameters";
pub const ERR_ARGUMENT_TYPES: &str = "Invalid parameter types";
pub const ERR_RECURSIVE_CALL: &str = "Recursive function calls are not supported";
pub const ERR_UNKNOWN_DATA_SET: &str = "Unknown data set";
pub const ERR_UNKNOWN_PROPERTY: &str = "Unknown property";

pub struct TypeInference<'e, 'c> {
    context: &'c dyn EvalContext,
    variable_types: HashMap<String, ValueType>,
    functions: Option<&'e BTreeMap<String, FunctionScript>>,
    /// Inside a function body only parameters and locals are visible
    isolated: bool,
    call_stack: Vec<String>,
    errors: Vec<(String, String)>,
    last_expression_type: ValueType,
}

impl<'e, 'c> TypeInference<'e, 'c> {
    pub fn new(context: &'c dyn EvalContext) -> Self {
        Self {
            context,
            variable_types: HashMap::new(),
            functions: None,
            isolated: false,
            call_stack: Vec::new(),
            errors: Vec::new(),
            last_expression_type: ValueType::Void,
        }
    }

    /// Make the functions of a script callable from expressions checked by
    /// this pass
    pub fn with_functions(mut self, functions: &'e BTreeMap<String, FunctionScript>) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Predeclare a variable's type
    pub fn store_variable_type(&mut self, name: &str, value_type: ValueType) {
        self.variable_types.insert(name.to_string(), value_type);
    }

    pub fn infer_expression_type(&mut self, expr: &'e Expression) -> ValueType {
        self.last_expression_type = expr.accept(self);
        self.last_expression_type
    }

    pub fn last_expression_type(&self) -> ValueType {
        self.last_expression_type
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    pub fn error_description(&self) -> Option<&str> {
        self.errors.first().map(|(description, _)| description.as_str())
    }

    pub fn error_expression_string(&self) -> Option<&str> {
        self.errors.first().map(|(_, expression)| expression.as_str())
    }

    /// The first recorded error as an engine error
    pub fn first_error(&self) -> Option<EngineError> {
        self.errors
            .first()
            .map(|(description, expression)| EngineError::TypeInference {
                description: description.clone(),
                expression: expression.clone(),
            })
    }

    fn record_error(&mut self, description: &str, expression: String) {
        log::debug!("type inference: {}: {}", description, expression);
        self.errors.push((description.to_string(), expression));
    }

    fn infer_statements(&mut self, statements: &'e [Expression]) -> ValueType {
        statements
            .iter()
            .fold(ValueType::Void, |_, statement| statement.accept(self))
    }

    fn call_text(name: &str, args: &[Expression]) -> String {
        expr_to_string(&Expression::call(name, args.to_vec()))
    }

    fn infer_user_call(
        &mut self,
        function: &'e FunctionScript,
        name: &str,
        args: &'e [Expression],
        arg_types: &[ValueType],
    ) -> ValueType {
        let normalized = function.normalized_name();
        if function.parameters.len() != args.len() {
            self.record_error(ERR_ARGUMENT_COUNT, Self::call_text(name, args));
            return ValueType::Void;
        }
        if self.call_stack.contains(&normalized) {
            self.record_error(ERR_RECURSIVE_CALL, Self::call_text(name, args));
            return ValueType::Void;
        }

        let mut nested = TypeInference {
            context: self.context,
            variable_types: HashMap::new(),
            functions: self.functions,
            isolated: true,
            call_stack: self.call_stack.clone(),
            errors: Vec::new(),
            last_expression_type: ValueType::Void,
        };
        nested.call_stack.push(normalized);
        for (parameter, arg_type) in function.parameters.iter().zip(arg_types) {
            nested.store_variable_type(parameter, *arg_type);
        }

        let result = function.accept(&mut nested);
        self.errors.append(&mut nested.errors);
        result
    }
}

impl<'e> ExpressionVisitor<'e> for TypeInference<'e, '_> {
    type Output = ValueType;

    fn visit_const(&mut self, value: &'e Value) -> ValueType {
        value.value_type()
    }

    fn visit_var(&mut self, name: &'e str) -> ValueType {
        if let Some(value_type) = self.variable_types.get(name) {
            return *value_type;
        }

        if !self.isolated {
            if let Some(value_type) = self.context.variable_type(name) {
                self.variable_types.insert(name.to_string(), value_type);
                return value_type;
            }
        }

        self.record_error(ERR_UNDEFINED_VARIABLE, name.to_string());
        ValueType::Void
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &'e Expression) -> ValueType {
        let operand_type = operand.accept(self);
        let result = op.output_type(operand_type);
        if result.is_void() {
            let text = expr_to_string(&Expression::unary(op, operand.clone()));
            self.record_error(ERR_TYPES_IN_EXPRESSION, text);
        }
        result
    }

    fn visit_binary(&mut self, op: BinaryOp, left: &'e Expression, right: &'e Expression) -> ValueType {
        let left_type = left.accept(self);
        let right_type = right.accept(self);
        let result = op.output_type(left_type, right_type);
        if result.is_void() {
            let text = expr_to_string(&Expression::binary(op, left.clone(), right.clone()));
            self.record_error(ERR_TYPES_IN_EXPRESSION, text);
        }
        result
    }

    fn visit_function_call(&mut self, name: &'e str, args: &'e [Expression]) -> ValueType {
        let arg_types: Vec<ValueType> = args.iter().map(|arg| arg.accept(self)).collect();
        let normalized = normalize_name(name);

        if let Some(function) = self.functions.and_then(|functions| functions.get(&normalized)) {
            return self.infer_user_call(function, name, args, &arg_types);
        }

        let registry = self.context.registry();
        let Some(descriptor) = registry.get(&normalized) else {
            self.record_error(ERR_UNKNOWN_FUNCTION, Self::call_text(name, args));
            return ValueType::Void;
        };

        if !descriptor.is_variadic() && descriptor.parameters().len() != args.len() {
            self.record_error(ERR_ARGUMENT_COUNT, Self::call_text(name, args));
            return ValueType::Void;
        }

        match descriptor.return_type(&arg_types) {
            Some(value_type) => value_type,
            None => {
                self.record_error(ERR_ARGUMENT_TYPES, Self::call_text(name, args));
                ValueType::Void
            }
        }
    }

    fn visit_if_else(
        &mut self,
        condition: &'e Expression,
        if_branch: &'e Expression,
        else_branch: Option<&'e Expression>,
    ) -> ValueType {
        if !condition.accept(self).is_boolean() {
            let text = expr_to_string(&Expression::if_else(
                condition.clone(),
                if_branch.clone(),
                else_branch.cloned(),
            ));
            self.record_error(ERR_CONDITION_NOT_BOOLEAN, text);
        }

        let if_type = if_branch.accept(self);
        let Some(else_branch) = else_branch else {
            return if_type;
        };
        let else_type = else_branch.accept(self);

        let joined = join_types(if_type, else_type);
        if joined.is_void() && !(if_type.is_void() && else_type.is_void()) {
            let text = expr_to_string(&Expression::if_else(
                condition.clone(),
                if_branch.clone(),
                Some(else_branch.clone()),
            ));
            self.record_error(ERR_IF_ELSE_INCOMPATIBLE, text);
        }
        joined
    }

    fn visit_assign(&mut self, name: &'e str, value: &'e Expression) -> ValueType {
        let value_type = value.accept(self);
        self.store_variable_type(name, value_type);
        value_type
    }

    fn visit_alias(&mut self, _alias: &'e str, expression: &'e Expression) -> ValueType {
        expression.accept(self)
    }

    fn visit_vector(&mut self, elements: &'e [Expression]) -> ValueType {
        for element in elements {
            element.accept(self);
        }
        ValueType::Vector
    }

    fn visit_index(&mut self, vector: &'e Expression, index: &'e Expression) -> ValueType {
        // element types are not tracked, so an index has no static type
        vector.accept(self);
        index.accept(self);
        ValueType::Void
    }

    fn visit_property_path(&mut self, entity: &'e str, path: &'e [String]) -> ValueType {
        let text = || expr_to_string(&Expression::property_path(entity, path.to_vec()));

        let Some(data_set) = self.context.get_data_set(entity) else {
            self.record_error(ERR_UNKNOWN_DATA_SET, text());
            return ValueType::Void;
        };

        match data_set.field_type(&path.join(".")) {
            Some(value_type) => value_type,
            None => {
                self.record_error(ERR_UNKNOWN_PROPERTY, text());
                ValueType::Void
            }
        }
    }

    fn visit_projection(&mut self, _elements: &'e [Expression], _filter: Option<&'e Expression>) -> ValueType {
        ValueType::DataFrame
    }

    fn visit_script(&mut self, script: &'e Script) -> ValueType {
        self.functions = Some(&script.functions);
        self.infer_statements(&script.statements)
    }

    fn visit_sequence(&mut self, statements: &'e [Expression]) -> ValueType {
        self.infer_statements(statements)
    }

    fn visit_function_script(&mut self, function: &'e FunctionScript) -> ValueType {
        self.infer_statements(&function.body)
    }
}
