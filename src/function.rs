//! Built-in function registry.
//!
//! A [`FunctionRegistry`] maps normalized function names to
//! [`FunctionDescriptor`]s. Contexts hold a shared handle to a registry; the
//! default set is built once and shared as an immutable snapshot.

pub mod builtin;

use crate::error::{EngineError, Result};
use crate::expression::context::{CallContext, EvalContext};
use crate::expression::normalize_name;
use crate::report;
use crate::value::{Value, ValueType};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Computes a call's result type from its argument types; `None` marks an
/// ill-typed call
pub type ReturnTypeRule = Arc<dyn Fn(&[ValueType]) -> Option<ValueType> + Send + Sync>;

/// Body of a function with declared parameters, which reads its arguments as
/// variables of the call context
pub type NamedBody = Arc<dyn Fn(&FunctionDescriptor, &dyn EvalContext) -> Result<Value> + Send + Sync>;

/// Body of a variadic function, which receives the raw argument list
pub type VariadicBody =
    Arc<dyn Fn(&FunctionDescriptor, &[Value], &dyn EvalContext) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
pub enum FunctionBody {
    Named(NamedBody),
    Variadic(VariadicBody),
}

/// A named intrinsic function
#[derive(Clone)]
pub struct FunctionDescriptor {
    name: String,
    normalized_name: String,
    parameters: Vec<String>,
    return_type: ReturnTypeRule,
    body: FunctionBody,
    usage: Option<String>,
}

impl FunctionDescriptor {
    /// A function whose arguments are bound to `parameters` by position
    pub fn named<F>(name: &str, parameters: &[&str], body: F) -> Self
    where
        F: Fn(&FunctionDescriptor, &dyn EvalContext) -> Result<Value> + Send + Sync + 'static,
    {
        Self::build(
            name,
            parameters.iter().map(|p| p.to_string()).collect(),
            FunctionBody::Named(Arc::new(body)),
        )
    }

    /// A function that validates its own argument list
    pub fn variadic<F>(name: &str, body: F) -> Self
    where
        F: Fn(&FunctionDescriptor, &[Value], &dyn EvalContext) -> Result<Value>
            + Send
            + Sync
            + 'static,
    {
        Self::build(name, Vec::new(), FunctionBody::Variadic(Arc::new(body)))
    }

    fn build(name: &str, parameters: Vec<String>, body: FunctionBody) -> Self {
        Self {
            name: name.to_string(),
            normalized_name: normalize_name(name),
            parameters,
            return_type: Arc::new(|_| Some(ValueType::Void)),
            body,
            usage: None,
        }
    }

    /// Use a fixed result type
    pub fn returns(self, value_type: ValueType) -> Self {
        self.with_return_rule(move |_| Some(value_type))
    }

    pub fn with_return_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&[ValueType]) -> Option<ValueType> + Send + Sync + 'static,
    {
        self.return_type = Arc::new(rule);
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.body, FunctionBody::Variadic(_))
    }

    pub fn usage_string(&self) -> String {
        match &self.usage {
            Some(usage) => usage.clone(),
            None => format!("Usage: {}({})", self.name, self.parameters.join(", ")),
        }
    }

    pub fn return_type(&self, argument_types: &[ValueType]) -> Option<ValueType> {
        (self.return_type)(argument_types)
    }

    /// Invoke the function with already evaluated arguments
    pub fn evaluate(&self, arguments: Vec<Value>, context: &dyn EvalContext) -> Result<Value> {
        log::trace!("calling {} with {} argument(s)", self.name, arguments.len());

        let result = match &self.body {
            FunctionBody::Variadic(body) => body(self, &arguments, context),
            FunctionBody::Named(body) => {
                self.assert_parameter_count(self.parameters.len(), arguments.len())?;

                let mut call = CallContext::new(context);
                for (parameter, argument) in self.parameters.iter().zip(arguments) {
                    call.set_variable(parameter, argument);
                }
                body(self, &call)
            }
        };

        result.map_err(report::report)
    }

    /// Fails with this function's usage string unless the counts match
    pub fn assert_parameter_count(&self, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(self.invalid_argument_count())
        }
    }

    pub fn assert_parameter_type(&self, expected: ValueType, actual: ValueType) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(EngineError::InvalidArgumentType {
                function: self.name.clone(),
                expected,
                actual,
            })
        }
    }

    pub fn invalid_argument_count(&self) -> EngineError {
        EngineError::InvalidArgumentCount {
            function: self.name.clone(),
            usage: self.usage_string(),
        }
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("variadic", &self.is_variadic())
            .finish()
    }
}

/// Catalog of intrinsic functions keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<FunctionDescriptor>>,
}

impl FunctionRegistry {
    /// A registry with no functions at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.reset_function_list();
        registry
    }

    /// The default registry, built on first use and shared afterwards
    pub fn shared_default() -> Arc<FunctionRegistry> {
        static DEFAULT: OnceLock<Arc<FunctionRegistry>> = OnceLock::new();
        DEFAULT
            .get_or_init(|| Arc::new(FunctionRegistry::with_defaults()))
            .clone()
    }

    /// Restore exactly the default function set, dropping any custom entries
    pub fn reset_function_list(&mut self) {
        self.functions.clear();
        builtin::register_defaults(self);
    }

    /// Register a function, replacing any with the same normalized name
    pub fn add_function(&mut self, descriptor: FunctionDescriptor) -> &mut Self {
        self.functions
            .insert(descriptor.normalized_name.clone(), Arc::new(descriptor));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(&normalize_name(name)).map(|d| d.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&normalize_name(name))
    }

    /// Declared names of all registered functions, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.values().map(|d| d.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::context::SimpleEvalContext;

    fn twice() -> FunctionDescriptor {
        FunctionDescriptor::named("Twice", &["x"], |_, ctx| {
            Ok(Value::Long(ctx.get_variable("x")?.as_long()? * 2))
        })
        .returns(ValueType::Long)
    }

    #[test]
    fn test_add_and_lookup_is_case_insensitive() {
        let mut registry = FunctionRegistry::with_defaults();
        let default_count = registry.len();

        registry.add_function(twice());
        assert!(registry.contains("twice"));
        assert!(registry.contains("TWICE"));
        assert_eq!(registry.len(), default_count + 1);

        registry.add_function(twice());
        assert_eq!(registry.len(), default_count + 1);

        registry.reset_function_list();
        assert!(!registry.contains("twice"));
        assert_eq!(registry.len(), default_count);
        assert!(registry.contains("startsWith"));
    }

    #[test]
    fn test_named_function_binds_parameters() -> Result<()> {
        let context = SimpleEvalContext::new();
        let result = twice().evaluate(vec![Value::Long(21)], &context)?;
        assert_eq!(result, Value::Long(42));
        Ok(())
    }

    #[test]
    fn test_named_function_rejects_wrong_arity() {
        let context = SimpleEvalContext::new();
        let err = twice()
            .evaluate(vec![Value::Long(1), Value::Long(2)], &context)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid number of parameters in a call to 'Twice'. Usage: Twice(x)"
        );
    }

    #[test]
    fn test_shared_default_is_shared() {
        let a = FunctionRegistry::shared_default();
        let b = FunctionRegistry::shared_default();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.contains("println"));
    }
}
