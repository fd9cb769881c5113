//! Column storage.

use crate::error::{EngineError, Result};
use crate::expression::Expression;
use crate::value::{Value, ValueType};
use chrono::{NaiveDate, NaiveDateTime};

/// Dense, nullable cell storage of one primitive type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Boolean(Vec<Option<bool>>),
    Long(Vec<Option<i64>>),
    Double(Vec<Option<f64>>),
    String(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
    DateTime(Vec<Option<NaiveDateTime>>),
}

impl ColumnData {
    /// Empty storage for `value_type`; only primitive types can be stored
    pub fn new(value_type: ValueType) -> Result<Self> {
        match value_type {
            ValueType::Boolean => Ok(ColumnData::Boolean(Vec::new())),
            ValueType::Long => Ok(ColumnData::Long(Vec::new())),
            ValueType::Double => Ok(ColumnData::Double(Vec::new())),
            ValueType::String => Ok(ColumnData::String(Vec::new())),
            ValueType::Date => Ok(ColumnData::Date(Vec::new())),
            ValueType::DateTime => Ok(ColumnData::DateTime(Vec::new())),
            other => Err(EngineError::configuration(format!(
                "Columns of type {} are not supported",
                other
            ))),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ColumnData::Boolean(_) => ValueType::Boolean,
            ColumnData::Long(_) => ValueType::Long,
            ColumnData::Double(_) => ValueType::Double,
            ColumnData::String(_) => ValueType::String,
            ColumnData::Date(_) => ValueType::Date,
            ColumnData::DateTime(_) => ValueType::DateTime,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Boolean(cells) => cells.len(),
            ColumnData::Long(cells) => cells.len(),
            ColumnData::Double(cells) => cells.len(),
            ColumnData::String(cells) => cells.len(),
            ColumnData::Date(cells) => cells.len(),
            ColumnData::DateTime(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell value; a null cell reads as void
    pub fn get(&self, row: usize) -> Value {
        fn cell<T: Clone + Into<Value>>(cells: &[Option<T>], row: usize) -> Value {
            cells.get(row).cloned().flatten().map_or(Value::Void, Into::into)
        }

        match self {
            ColumnData::Boolean(cells) => cell(cells, row),
            ColumnData::Long(cells) => cell(cells, row),
            ColumnData::Double(cells) => cell(cells, row),
            ColumnData::String(cells) => cell(cells, row),
            ColumnData::Date(cells) => cell(cells, row),
            ColumnData::DateTime(cells) => cell(cells, row),
        }
    }

    /// Whether `value` can be appended to this column
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Void)
                | (ColumnData::Boolean(_), Value::Boolean(_))
                | (ColumnData::Long(_), Value::Long(_))
                | (ColumnData::Double(_), Value::Double(_) | Value::Long(_))
                | (ColumnData::String(_), Value::String(_))
                | (ColumnData::Date(_), Value::Date(_))
                | (ColumnData::DateTime(_), Value::DateTime(_))
        )
    }

    /// Append a cell; longs widen into double columns and void is a null
    pub fn push(&mut self, value: Value) -> Result<()> {
        match (self, value) {
            (ColumnData::Boolean(cells), Value::Void) => cells.push(None),
            (ColumnData::Long(cells), Value::Void) => cells.push(None),
            (ColumnData::Double(cells), Value::Void) => cells.push(None),
            (ColumnData::String(cells), Value::Void) => cells.push(None),
            (ColumnData::Date(cells), Value::Void) => cells.push(None),
            (ColumnData::DateTime(cells), Value::Void) => cells.push(None),
            (ColumnData::Boolean(cells), Value::Boolean(b)) => cells.push(Some(b)),
            (ColumnData::Long(cells), Value::Long(n)) => cells.push(Some(n)),
            (ColumnData::Double(cells), Value::Double(d)) => cells.push(Some(d)),
            (ColumnData::Double(cells), Value::Long(n)) => cells.push(Some(n as f64)),
            (ColumnData::String(cells), Value::String(s)) => cells.push(Some(s)),
            (ColumnData::Date(cells), Value::Date(d)) => cells.push(Some(d)),
            (ColumnData::DateTime(cells), Value::DateTime(dt)) => cells.push(Some(dt)),
            (data, value) => {
                return Err(EngineError::TypeMismatch {
                    expected: data.value_type(),
                    actual: value.value_type(),
                })
            }
        }
        Ok(())
    }
}

/// How a column gets its values
#[derive(Debug, Clone)]
pub enum ColumnKind {
    Stored(ColumnData),
    /// Derived per row from an expression over earlier columns
    Computed {
        source: String,
        expression: Expression,
        value_type: ValueType,
    },
}

#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: ColumnKind,
}

impl Column {
    pub fn stored(name: &str, value_type: ValueType) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            kind: ColumnKind::Stored(ColumnData::new(value_type)?),
        })
    }

    pub fn computed(name: &str, source: &str, expression: Expression, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Computed {
                source: source.to_string(),
                expression,
                value_type,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut ColumnKind {
        &mut self.kind
    }

    pub fn value_type(&self) -> ValueType {
        match &self.kind {
            ColumnKind::Stored(data) => data.value_type(),
            ColumnKind::Computed { value_type, .. } => *value_type,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.kind, ColumnKind::Computed { .. })
    }

    /// Source text of a computed column's expression
    pub fn expression_source(&self) -> Option<&str> {
        match &self.kind {
            ColumnKind::Computed { source, .. } => Some(source),
            ColumnKind::Stored(_) => None,
        }
    }

    /// A column with the same name and definition but no stored cells
    pub fn empty_copy(&self) -> Self {
        let kind = match &self.kind {
            ColumnKind::Stored(data) => ColumnKind::Stored(match data {
                ColumnData::Boolean(_) => ColumnData::Boolean(Vec::new()),
                ColumnData::Long(_) => ColumnData::Long(Vec::new()),
                ColumnData::Double(_) => ColumnData::Double(Vec::new()),
                ColumnData::String(_) => ColumnData::String(Vec::new()),
                ColumnData::Date(_) => ColumnData::Date(Vec::new()),
                ColumnData::DateTime(_) => ColumnData::DateTime(Vec::new()),
            }),
            computed => computed.clone(),
        };
        Self {
            name: self.name.clone(),
            kind,
        }
    }
}
