//! Per-row evaluation context over a data frame.

use crate::dataframe::DataFrame;
use crate::error::{EngineError, Result};
use crate::expression::EvalContext;
use crate::function::FunctionRegistry;
use crate::printer::{self, Printer};
use crate::value::{Value, ValueType};
use std::collections::HashMap;
use std::sync::Arc;

/// Exposes the columns of one physical row as variables.
///
/// Computed columns are evaluated on access. A computed column being
/// declared is not part of the frame yet, so checking its expression against
/// [`RowContext::schema`] only sees the columns declared before it.
pub struct RowContext<'f> {
    frame: &'f DataFrame,
    row: usize,
    locals: HashMap<String, Value>,
}

impl<'f> RowContext<'f> {
    pub fn new(frame: &'f DataFrame, row: usize) -> Self {
        Self {
            frame,
            row,
            locals: HashMap::new(),
        }
    }

    /// A context for checking expressions against the frame's schema
    pub fn schema(frame: &'f DataFrame) -> Self {
        Self::new(frame, 0)
    }

    fn visible_column(&self, name: &str) -> Option<usize> {
        self.frame.column_index(name)
    }
}

impl EvalContext for RowContext<'_> {
    fn has_variable(&self, name: &str) -> bool {
        self.locals.contains_key(name) || self.visible_column(name).is_some()
    }

    fn get_variable(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.locals.get(name) {
            return Ok(value.clone());
        }
        match self.visible_column(name) {
            Some(column) => self.frame.value_at_physical(column, self.row),
            None => Err(EngineError::UndefinedVariable(name.to_string())),
        }
    }

    fn set_variable(&mut self, name: &str, value: Value) {
        self.locals.insert(name.to_string(), value);
    }

    fn variable_type(&self, name: &str) -> Option<ValueType> {
        if let Some(value) = self.locals.get(name) {
            return Some(value.value_type());
        }
        self.visible_column(name)
            .map(|column| self.frame.columns()[column].value_type())
    }

    fn registry(&self) -> Arc<FunctionRegistry> {
        self.frame.registry()
    }

    fn printer(&self) -> Arc<dyn Printer> {
        printer::printer()
    }
}
