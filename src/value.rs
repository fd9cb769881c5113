//! Runtime values and their types.
//!
//! A [`Value`] is immutable once constructed. Type predicates are derived
//! from [`Value::value_type`] alone, and every operation a value does not
//! support fails with [`EngineError::UnsupportedOperation`] naming the
//! operation and the value's literal text.

use crate::dataframe::DataFrame;
use crate::error::{EngineError, Result};
use crate::expression::{ArithmeticOp, ComparisonOp};
use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Types of runtime values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Void,
    Boolean,
    Long,
    Double,
    String,
    Date,
    DateTime,
    Vector,
    DataFrame,
}

impl ValueType {
    pub fn is_void(&self) -> bool {
        *self == ValueType::Void
    }

    pub fn is_boolean(&self) -> bool {
        *self == ValueType::Boolean
    }

    pub fn is_long(&self) -> bool {
        *self == ValueType::Long
    }

    pub fn is_double(&self) -> bool {
        *self == ValueType::Double
    }

    pub fn is_number(&self) -> bool {
        self.is_long() || self.is_double()
    }

    pub fn is_string(&self) -> bool {
        *self == ValueType::String
    }

    pub fn is_date(&self) -> bool {
        *self == ValueType::Date
    }

    pub fn is_date_time(&self) -> bool {
        *self == ValueType::DateTime
    }

    pub fn is_vector(&self) -> bool {
        *self == ValueType::Vector
    }

    pub fn is_data_frame(&self) -> bool {
        *self == ValueType::DataFrame
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Void => "VOID",
            ValueType::Boolean => "BOOLEAN",
            ValueType::Long => "LONG",
            ValueType::Double => "DOUBLE",
            ValueType::String => "STRING",
            ValueType::Date => "DATE",
            ValueType::DateTime => "DATE_TIME",
            ValueType::Vector => "VECTOR",
            ValueType::DataFrame => "DATA_FRAME",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Void,
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Vector(Vec<Value>),
    DataFrame(Arc<DataFrame>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Void => ValueType::Void,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Long(_) => ValueType::Long,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Date(_) => ValueType::Date,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Vector(_) => ValueType::Vector,
            Value::DataFrame(_) => ValueType::DataFrame,
        }
    }

    pub fn is_void(&self) -> bool {
        self.value_type().is_void()
    }

    pub fn is_boolean(&self) -> bool {
        self.value_type().is_boolean()
    }

    pub fn is_long(&self) -> bool {
        self.value_type().is_long()
    }

    pub fn is_double(&self) -> bool {
        self.value_type().is_double()
    }

    pub fn is_number(&self) -> bool {
        self.value_type().is_number()
    }

    pub fn is_string(&self) -> bool {
        self.value_type().is_string()
    }

    pub fn is_vector(&self) -> bool {
        self.value_type().is_vector()
    }

    pub fn is_data_frame(&self) -> bool {
        self.value_type().is_data_frame()
    }

    /// Source-like representation: strings are quoted, vectors are
    /// parenthesised lists of their elements' literals
    pub fn as_string_literal(&self) -> String {
        match self {
            Value::Void => "VOID".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Long(n) => n.to_string(),
            Value::Double(d) => format_double(*d),
            Value::String(s) => format!("\"{}\"", s),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => format_date_time(dt),
            Value::Vector(elements) => {
                let items: Vec<String> = elements.iter().map(Value::as_string_literal).collect();
                format!("({})", items.join(", "))
            }
            Value::DataFrame(frame) => format!("DataFrame({})", frame.name()),
        }
    }

    /// Plain string form, as printed by `print` and returned by `toString`
    pub fn string_value(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            _ => self.as_string_literal(),
        }
    }

    /// Apply an arithmetic operator with `self` as the left operand.
    ///
    /// Numbers promote to double if either side is a double, strings support
    /// concatenation, and void propagates.
    pub fn apply(&self, other: &Value, op: ArithmeticOp) -> Result<Value> {
        match (self, other) {
            (Value::Void, _) | (_, Value::Void) => Ok(Value::Void),
            (Value::Long(a), Value::Long(b)) => op
                .apply_long(*a, *b)
                .map(Value::Long)
                .ok_or(EngineError::DivisionByZero),
            (Value::Long(_) | Value::Double(_), Value::Long(_) | Value::Double(_)) => {
                Ok(Value::Double(op.apply_double(self.as_double()?, other.as_double()?)))
            }
            (Value::String(a), Value::String(b)) if op == ArithmeticOp::Add => {
                Ok(Value::String(format!("{}{}", a, b)))
            }
            (Value::Long(_) | Value::Double(_), _) => Err(EngineError::incompatible(
                op.as_str(),
                self.as_string_literal(),
                other.as_string_literal(),
            )),
            (Value::String(_), Value::Long(_) | Value::Double(_) | Value::String(_))
                if op == ArithmeticOp::Add =>
            {
                Err(EngineError::incompatible(
                    op.as_str(),
                    self.as_string_literal(),
                    other.as_string_literal(),
                ))
            }
            _ => Err(EngineError::unsupported(op.as_str(), self.as_string_literal())),
        }
    }

    /// Apply a comparison operator with `self` as the left operand, producing
    /// a boolean value.
    ///
    /// Void is equal only to void and is never ordered against anything, so
    /// comparisons with void produce `false` (or `true` for `!=`).
    pub fn apply_comparison(&self, other: &Value, op: ComparisonOp) -> Result<Value> {
        if self.is_void() || other.is_void() {
            let both_void = self.is_void() && other.is_void();
            return Ok(Value::Boolean(match op {
                ComparisonOp::Eq => both_void,
                ComparisonOp::Ne => !both_void,
                _ => false,
            }));
        }

        match (self, other) {
            (Value::Vector(_), Value::Vector(_)) if op.is_equality() => {
                let equal = self == other;
                Ok(Value::Boolean(if op == ComparisonOp::Eq { equal } else { !equal }))
            }
            (Value::Vector(_) | Value::DataFrame(_), _) => {
                Err(EngineError::unsupported(op.as_str(), self.as_string_literal()))
            }
            _ => {
                let ordering = self.ordered_against(other, op.as_str())?;
                Ok(Value::Boolean(op.holds(ordering)))
            }
        }
    }

    /// Natural ordering used for sorting: numbers compare numerically across
    /// long/double, same-typed scalars compare by value, void sorts first,
    /// and any other pairing is incomparable
    pub fn compare_to(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Void, Value::Void) => Ok(Ordering::Equal),
            (Value::Void, _) => Ok(Ordering::Less),
            (_, Value::Void) => Ok(Ordering::Greater),
            _ => self.ordered_against(other, "compare"),
        }
    }

    fn ordered_against(&self, other: &Value, operation: &str) -> Result<Ordering> {
        match (self, other) {
            (Value::Long(a), Value::Long(b)) => Ok(a.cmp(b)),
            (Value::Long(_) | Value::Double(_), Value::Long(_) | Value::Double(_)) => {
                Ok(self.as_double()?.total_cmp(&other.as_double()?))
            }
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Ok(a.cmp(b)),
            _ => Err(EngineError::incompatible(
                operation,
                self.as_string_literal(),
                other.as_string_literal(),
            )),
        }
    }

    fn type_mismatch(&self, expected: ValueType) -> EngineError {
        EngineError::TypeMismatch {
            expected,
            actual: self.value_type(),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(self.type_mismatch(ValueType::Boolean)),
        }
    }

    pub fn as_long(&self) -> Result<i64> {
        match self {
            Value::Long(n) => Ok(*n),
            _ => Err(self.type_mismatch(ValueType::Long)),
        }
    }

    /// Numeric value as a double; longs are widened
    pub fn as_double(&self) -> Result<f64> {
        match self {
            Value::Double(d) => Ok(*d),
            Value::Long(n) => Ok(*n as f64),
            _ => Err(self.type_mismatch(ValueType::Double)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.type_mismatch(ValueType::String)),
        }
    }

    pub fn as_date(&self) -> Result<NaiveDate> {
        match self {
            Value::Date(d) => Ok(*d),
            _ => Err(self.type_mismatch(ValueType::Date)),
        }
    }

    pub fn as_date_time(&self) -> Result<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Ok(*dt),
            _ => Err(self.type_mismatch(ValueType::DateTime)),
        }
    }

    pub fn as_vector(&self) -> Result<&[Value]> {
        match self {
            Value::Vector(elements) => Ok(elements),
            _ => Err(self.type_mismatch(ValueType::Vector)),
        }
    }

    pub fn as_data_frame(&self) -> Result<&Arc<DataFrame>> {
        match self {
            Value::DataFrame(frame) => Ok(frame),
            _ => Err(self.type_mismatch(ValueType::DataFrame)),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::DataFrame(a), Value::DataFrame(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value())
    }
}

fn format_double(d: f64) -> String {
    if d.is_finite() && d.fract() == 0.0 && d.abs() < 1e15 {
        format!("{:.1}", d)
    } else {
        d.to_string()
    }
}

fn format_date_time(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Long(n as i64)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(elements: Vec<Value>) -> Self {
        Value::Vector(elements)
    }
}

impl From<DataFrame> for Value {
    fn from(frame: DataFrame) -> Self {
        Value::DataFrame(Arc::new(frame))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Void)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_predicates() {
        assert!(Value::Void.is_void());
        assert!(Value::Long(1).is_number());
        assert!(Value::Double(1.0).is_number());
        assert!(!Value::String("1".to_string()).is_number());
        assert!(Value::Vector(vec![]).is_vector());
        assert_eq!(Value::from(None::<i64>), Value::Void);
        assert_eq!(Value::from(Some(5i64)), Value::Long(5));
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(Value::Long(42).as_string_literal(), "42");
        assert_eq!(Value::Double(15.0).as_string_literal(), "15.0");
        assert_eq!(Value::Double(2.5).as_string_literal(), "2.5");
        assert_eq!(Value::from("abc").as_string_literal(), "\"abc\"");
        assert_eq!(Value::from("abc").string_value(), "abc");
        assert_eq!(Value::Void.string_value(), "VOID");

        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(Value::Date(date).string_value(), "2021-03-04");
        let date_time = date.and_hms_opt(10, 11, 12).unwrap();
        assert_eq!(Value::DateTime(date_time).string_value(), "2021-03-04T10:11:12");

        let vector = Value::Vector(vec![Value::Long(1), Value::from("x")]);
        assert_eq!(vector.as_string_literal(), "(1, \"x\")");
    }

    #[test]
    fn test_arithmetic_promotion() -> Result<()> {
        assert_eq!(
            Value::Long(7).apply(&Value::Long(2), ArithmeticOp::Divide)?,
            Value::Long(3)
        );
        assert_eq!(
            Value::Long(7).apply(&Value::Double(2.0), ArithmeticOp::Divide)?,
            Value::Double(3.5)
        );
        assert_eq!(
            Value::Double(1.5).apply(&Value::Long(2), ArithmeticOp::Multiply)?,
            Value::Double(3.0)
        );
        assert_eq!(
            Value::from("ab").apply(&Value::from("cd"), ArithmeticOp::Add)?,
            Value::from("abcd")
        );
        assert_eq!(
            Value::Void.apply(&Value::Long(1), ArithmeticOp::Add)?,
            Value::Void
        );
        Ok(())
    }

    #[test]
    fn test_arithmetic_failures() {
        assert_eq!(
            Value::Long(1).apply(&Value::Long(0), ArithmeticOp::Divide),
            Err(EngineError::DivisionByZero)
        );
        assert!(matches!(
            Value::Long(1).apply(&Value::from("a"), ArithmeticOp::Add),
            Err(EngineError::IncompatibleTypes { .. })
        ));
        assert_eq!(
            Value::Boolean(true).apply(&Value::Boolean(false), ArithmeticOp::Add),
            Err(EngineError::unsupported("+", "true"))
        );
        assert_eq!(
            Value::from("a").apply(&Value::from("b"), ArithmeticOp::Subtract),
            Err(EngineError::unsupported("-", "\"a\""))
        );
    }

    #[test]
    fn test_comparison() -> Result<()> {
        assert_eq!(
            Value::Long(2).apply_comparison(&Value::Double(2.0), ComparisonOp::Eq)?,
            Value::Boolean(true)
        );
        assert_eq!(
            Value::Long(2).apply_comparison(&Value::Double(2.5), ComparisonOp::Lt)?,
            Value::Boolean(true)
        );
        assert_eq!(
            Value::from("abc").apply_comparison(&Value::from("abd"), ComparisonOp::Ge)?,
            Value::Boolean(false)
        );
        assert_eq!(
            Value::Void.apply_comparison(&Value::from("abc"), ComparisonOp::Eq)?,
            Value::Boolean(false)
        );
        assert_eq!(
            Value::Void.apply_comparison(&Value::from("abc"), ComparisonOp::Ne)?,
            Value::Boolean(true)
        );
        assert!(matches!(
            Value::from("1").apply_comparison(&Value::Long(1), ComparisonOp::Eq),
            Err(EngineError::IncompatibleTypes { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_compare_to() -> Result<()> {
        assert_eq!(Value::Long(3).compare_to(&Value::Double(2.5))?, Ordering::Greater);
        assert_eq!(Value::Void.compare_to(&Value::Long(1))?, Ordering::Less);
        assert_eq!(Value::Void.compare_to(&Value::Void)?, Ordering::Equal);
        assert_eq!(
            Value::from("Bob").compare_to(&Value::from("Abigail"))?,
            Ordering::Greater
        );
        assert!(Value::from("Bob").compare_to(&Value::Long(1)).is_err());
        Ok(())
    }

    #[test]
    fn test_typed_accessors() {
        assert_eq!(Value::Long(3).as_double(), Ok(3.0));
        assert_eq!(
            Value::from("x").as_long(),
            Err(EngineError::TypeMismatch {
                expected: ValueType::Long,
                actual: ValueType::String
            })
        );
        assert_eq!(Value::Boolean(true).as_bool(), Ok(true));
    }
}
