//! Columnar data frames.
//!
//! A [`DataFrame`] holds named, typed columns of equal length. Stored
//! columns keep their cells; computed columns derive a value per row from an
//! expression over the columns declared before them. Sorting only changes
//! the logical row order, so [`DataFrame::unsort`] can always restore
//! insertion order.

pub mod column;
pub mod filter;
pub mod row_context;
pub mod sort;

pub use column::{Column, ColumnData, ColumnKind};
pub use row_context::RowContext;

use crate::error::{EngineError, Result};
use crate::expression::type_inference::TypeInference;
use crate::expression::{evaluate, DataSet, Expression};
use crate::function::FunctionRegistry;
use crate::report;
use crate::syntax;
use crate::value::{Value, ValueType};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Arc;

/// Build a row of values for [`DataFrame::add_row`]
///
/// ```
/// use framescript::{row, DataFrame};
///
/// let mut frame = DataFrame::new("People");
/// frame.add_string_column("Name")?.add_long_column("Age")?;
/// frame.add_row(row!["Alice", 42])?;
/// # Ok::<(), framescript::EngineError>(())
/// ```
#[macro_export]
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::value::Value::from($value)),*]
    };
}

#[derive(Debug, Clone)]
pub struct DataFrame {
    name: String,
    columns: Vec<Column>,
    column_index: HashMap<String, usize>,
    row_count: usize,
    /// Logical order as physical row indices; `None` is insertion order
    row_order: Option<Vec<usize>>,
    registry: Arc<FunctionRegistry>,
}

impl DataFrame {
    pub fn new(name: &str) -> Self {
        Self::with_registry(name, FunctionRegistry::shared_default())
    }

    /// A frame whose computed columns and queries use `registry`
    pub fn with_registry(name: &str, registry: Arc<FunctionRegistry>) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            column_index: HashMap::new(),
            row_count: 0,
            row_order: None,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|index| &self.columns[index])
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    pub fn column_type(&self, name: &str) -> Option<ValueType> {
        self.column(name).map(Column::value_type)
    }

    pub fn registry(&self) -> Arc<FunctionRegistry> {
        self.registry.clone()
    }

    pub fn is_sorted(&self) -> bool {
        self.row_order.is_some()
    }

    fn push_column(&mut self, column: Column) -> Result<&mut Self> {
        if self.has_column(column.name()) {
            return report::fail(EngineError::configuration(format!(
                "Column '{}' already exists in data frame '{}'",
                column.name(),
                self.name
            )));
        }
        self.column_index
            .insert(column.name().to_string(), self.columns.len());
        self.columns.push(column);
        Ok(self)
    }

    /// Add a stored column; all stored columns must be declared before the
    /// first row is added
    pub fn add_column(&mut self, name: &str, value_type: ValueType) -> Result<&mut Self> {
        if self.row_count > 0 {
            return report::fail(EngineError::configuration(format!(
                "Cannot add column '{}' to data frame '{}' which already has rows",
                name, self.name
            )));
        }
        let column = Column::stored(name, value_type).map_err(report::report)?;
        self.push_column(column)
    }

    pub fn add_boolean_column(&mut self, name: &str) -> Result<&mut Self> {
        self.add_column(name, ValueType::Boolean)
    }

    pub fn add_long_column(&mut self, name: &str) -> Result<&mut Self> {
        self.add_column(name, ValueType::Long)
    }

    pub fn add_double_column(&mut self, name: &str) -> Result<&mut Self> {
        self.add_column(name, ValueType::Double)
    }

    pub fn add_string_column(&mut self, name: &str) -> Result<&mut Self> {
        self.add_column(name, ValueType::String)
    }

    pub fn add_date_column(&mut self, name: &str) -> Result<&mut Self> {
        self.add_column(name, ValueType::Date)
    }

    pub fn add_date_time_column(&mut self, name: &str) -> Result<&mut Self> {
        self.add_column(name, ValueType::DateTime)
    }

    /// Add a column computed from `source`, an expression over the columns
    /// declared so far
    pub fn add_computed_column(&mut self, name: &str, source: &str) -> Result<&mut Self> {
        let expression = syntax::parse_expression(source)?;
        let value_type = self.check_expression(&expression)?;
        if value_type.is_void() {
            return report::fail(EngineError::configuration(format!(
                "Cannot determine the type of computed column '{}' from '{}'",
                name, source
            )));
        }

        log::debug!(
            "{}: computed column {} = {} ({})",
            self.name,
            name,
            source,
            value_type
        );
        self.push_column(Column::computed(name, source, expression, value_type))
    }

    /// Infer the type of an expression over this frame's columns
    pub(crate) fn check_expression(&self, expression: &Expression) -> Result<ValueType> {
        let context = RowContext::schema(self);
        let mut inference = TypeInference::new(&context);
        let value_type = inference.infer_expression_type(expression);
        match inference.first_error() {
            Some(error) => report::fail(error),
            None => Ok(value_type),
        }
    }

    /// Append a row; `values` holds one value per stored column, in column
    /// order, and void marks a null cell
    pub fn add_row(&mut self, values: Vec<Value>) -> Result<&mut Self> {
        let stored = self.columns.iter().filter(|c| !c.is_computed()).count();
        if values.len() != stored {
            return report::fail(EngineError::configuration(format!(
                "Row has {} values but data frame '{}' has {} stored columns",
                values.len(),
                self.name,
                stored
            )));
        }

        let stored_columns = self.columns.iter().filter_map(|column| match column.kind() {
            ColumnKind::Stored(data) => Some((column, data)),
            ColumnKind::Computed { .. } => None,
        });
        for ((column, data), value) in stored_columns.zip(&values) {
            if !data.accepts(value) {
                return report::fail(EngineError::configuration(format!(
                    "Value {} does not fit column '{}' of type {}",
                    value.as_string_literal(),
                    column.name(),
                    data.value_type()
                )));
            }
        }

        let mut values = values.into_iter();
        for column in &mut self.columns {
            if let ColumnKind::Stored(data) = column.kind_mut() {
                if let Some(value) = values.next() {
                    data.push(value).map_err(report::report)?;
                }
            }
        }

        if let Some(order) = &mut self.row_order {
            order.push(self.row_count);
        }
        self.row_count += 1;
        Ok(self)
    }

    /// Physical index of the row at logical position `row`
    pub(crate) fn physical_row(&self, row: usize) -> Result<usize> {
        if row >= self.row_count {
            return report::fail(EngineError::IndexOutOfBounds {
                index: row as i64,
                size: self.row_count,
            });
        }
        Ok(match &self.row_order {
            Some(order) => order[row],
            None => row,
        })
    }

    /// Value of column `column` at physical row `row`
    pub(crate) fn value_at_physical(&self, column: usize, row: usize) -> Result<Value> {
        match self.columns[column].kind() {
            ColumnKind::Stored(data) => Ok(data.get(row)),
            ColumnKind::Computed { expression, .. } => {
                let mut context = RowContext::new(self, row);
                evaluate(expression, &mut context)
            }
        }
    }

    /// Stored cell values of a physical row, in column order
    pub(crate) fn stored_values(&self, row: usize) -> Vec<Value> {
        self.columns
            .iter()
            .filter_map(|column| match column.kind() {
                ColumnKind::Stored(data) => Some(data.get(row)),
                ColumnKind::Computed { .. } => None,
            })
            .collect()
    }

    /// A frame with the same columns and no rows
    pub(crate) fn empty_copy(&self) -> DataFrame {
        DataFrame {
            name: self.name.clone(),
            columns: self.columns.iter().map(Column::empty_copy).collect(),
            column_index: self.column_index.clone(),
            row_count: 0,
            row_order: None,
            registry: self.registry.clone(),
        }
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        match self.column_index(name) {
            Some(index) => Ok(index),
            None => report::fail(EngineError::configuration(format!(
                "Column '{}' does not exist in data frame '{}'",
                name, self.name
            ))),
        }
    }

    /// Value of `column` at logical row `row`
    pub fn get_value(&self, column: &str, row: usize) -> Result<Value> {
        let column = self.require_column(column)?;
        self.value_at_physical(column, self.physical_row(row)?)
    }

    /// Value at logical row `row` of the column at `column` index
    pub fn get_value_at(&self, row: usize, column: usize) -> Result<Value> {
        if column >= self.columns.len() {
            return report::fail(EngineError::IndexOutOfBounds {
                index: column as i64,
                size: self.columns.len(),
            });
        }
        self.value_at_physical(column, self.physical_row(row)?)
    }

    pub fn is_null(&self, column: &str, row: usize) -> Result<bool> {
        Ok(self.get_value(column, row)?.is_void())
    }

    fn get_typed<T>(&self, column: &str, row: usize, extract: fn(&Value) -> Result<T>) -> Result<T> {
        extract(&self.get_value(column, row)?).map_err(report::report)
    }

    pub fn get_boolean(&self, column: &str, row: usize) -> Result<bool> {
        self.get_typed(column, row, Value::as_bool)
    }

    pub fn get_long(&self, column: &str, row: usize) -> Result<i64> {
        self.get_typed(column, row, Value::as_long)
    }

    pub fn get_double(&self, column: &str, row: usize) -> Result<f64> {
        self.get_typed(column, row, Value::as_double)
    }

    pub fn get_string(&self, column: &str, row: usize) -> Result<String> {
        self.get_typed(column, row, |value| value.as_str().map(str::to_string))
    }

    pub fn get_date(&self, column: &str, row: usize) -> Result<NaiveDate> {
        self.get_typed(column, row, Value::as_date)
    }

    pub fn get_date_time(&self, column: &str, row: usize) -> Result<NaiveDateTime> {
        self.get_typed(column, row, Value::as_date_time)
    }
}

impl DataSet for DataFrame {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_type(&self, property_path: &str) -> Option<ValueType> {
        self.column_type(property_path)
    }

    fn row_count(&self) -> usize {
        self.row_count
    }

    fn field_value(&self, row: usize, property_path: &str) -> Result<Value> {
        self.get_value(property_path, row)
    }
}
