//! Evaluation contexts.
//!
//! A context binds variable names to values and gives access to named
//! external data sets, the function registry and the output printer.

use crate::error::{EngineError, Result};
use crate::function::FunctionRegistry;
use crate::printer::{self, Printer};
use crate::value::{Value, ValueType};
use std::collections::HashMap;
use std::sync::Arc;

/// A named external data set that property paths and projections resolve
/// against
pub trait DataSet: Send + Sync {
    fn name(&self) -> &str;

    /// Type of the field at `property_path`, if the data set has it
    fn field_type(&self, property_path: &str) -> Option<ValueType>;

    fn row_count(&self) -> usize;

    /// Value of the field at `property_path` in row `row`
    fn field_value(&self, row: usize, property_path: &str) -> Result<Value>;
}

/// The runtime environment a script executes against
pub trait EvalContext {
    fn has_variable(&self, name: &str) -> bool;

    fn get_variable(&self, name: &str) -> Result<Value>;

    fn set_variable(&mut self, name: &str, value: Value);

    /// Type of a live variable binding
    fn variable_type(&self, name: &str) -> Option<ValueType> {
        if self.has_variable(name) {
            self.get_variable(name).ok().map(|v| v.value_type())
        } else {
            None
        }
    }

    fn get_data_set(&self, _name: &str) -> Option<Arc<dyn DataSet>> {
        None
    }

    fn registry(&self) -> Arc<FunctionRegistry>;

    fn printer(&self) -> Arc<dyn Printer>;
}

/// A plain map-backed context
pub struct SimpleEvalContext {
    variables: HashMap<String, Value>,
    data_sets: HashMap<String, Arc<dyn DataSet>>,
    registry: Arc<FunctionRegistry>,
    printer: Arc<dyn Printer>,
}

impl SimpleEvalContext {
    pub fn new() -> Self {
        Self::with_registry(FunctionRegistry::shared_default())
    }

    pub fn with_registry(registry: Arc<FunctionRegistry>) -> Self {
        Self {
            variables: HashMap::new(),
            data_sets: HashMap::new(),
            registry,
            printer: printer::printer(),
        }
    }

    pub fn with_printer(mut self, printer: Arc<dyn Printer>) -> Self {
        self.printer = printer;
        self
    }

    /// Register a data set under its own name
    pub fn add_data_set(&mut self, data_set: Arc<dyn DataSet>) -> &mut Self {
        self.data_sets.insert(data_set.name().to_string(), data_set);
        self
    }

    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }
}

impl Default for SimpleEvalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalContext for SimpleEvalContext {
    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    fn get_variable(&self, name: &str) -> Result<Value> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UndefinedVariable(name.to_string()))
    }

    fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    fn get_data_set(&self, name: &str) -> Option<Arc<dyn DataSet>> {
        self.data_sets.get(name).cloned()
    }

    fn registry(&self) -> Arc<FunctionRegistry> {
        self.registry.clone()
    }

    fn printer(&self) -> Arc<dyn Printer> {
        self.printer.clone()
    }
}

/// Context for one function call: parameters and local assignments are
/// private to the call, everything else comes from the caller's context
pub struct CallContext<'p> {
    parent: &'p dyn EvalContext,
    variables: HashMap<String, Value>,
}

impl<'p> CallContext<'p> {
    pub fn new(parent: &'p dyn EvalContext) -> Self {
        Self {
            parent,
            variables: HashMap::new(),
        }
    }
}

impl EvalContext for CallContext<'_> {
    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    fn get_variable(&self, name: &str) -> Result<Value> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UndefinedVariable(name.to_string()))
    }

    fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    fn get_data_set(&self, name: &str) -> Option<Arc<dyn DataSet>> {
        self.parent.get_data_set(name)
    }

    fn registry(&self) -> Arc<FunctionRegistry> {
        self.parent.registry()
    }

    fn printer(&self) -> Arc<dyn Printer> {
        self.parent.printer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_last_write_wins() -> Result<()> {
        let mut context = SimpleEvalContext::new();
        assert!(!context.has_variable("x"));
        assert!(matches!(
            context.get_variable("x"),
            Err(EngineError::UndefinedVariable(_))
        ));

        context.set_variable("x", Value::Long(1));
        context.set_variable("x", Value::from("one"));

        assert_eq!(context.get_variable("x")?, Value::from("one"));
        assert_eq!(context.variable_type("x"), Some(ValueType::String));
        assert_eq!(context.variable_names(), vec!["x"]);
        Ok(())
    }

    #[test]
    fn test_call_context_hides_caller_variables() {
        let mut caller = SimpleEvalContext::new();
        caller.set_variable("outer", Value::Long(1));

        let mut call = CallContext::new(&caller);
        call.set_variable("param", Value::Long(2));

        assert!(call.has_variable("param"));
        assert!(!call.has_variable("outer"));
        assert!(Arc::ptr_eq(&call.registry(), &caller.registry()));
    }
}
