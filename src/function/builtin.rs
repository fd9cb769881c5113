//! The default function set.

use crate::error::{EngineError, Result};
use crate::expression::context::EvalContext;
use crate::function::{FunctionDescriptor, FunctionRegistry};
use crate::value::{Value, ValueType};
use chrono::{NaiveDate, NaiveDateTime};

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub fn register_defaults(registry: &mut FunctionRegistry) {
    registry
        .add_function(FunctionDescriptor::variadic("print", |_, args, ctx| {
            let printer = ctx.printer();
            for arg in args {
                printer.print(&arg.string_value());
            }
            Ok(Value::Void)
        }))
        .add_function(FunctionDescriptor::variadic("println", |_, args, ctx| {
            let printer = ctx.printer();
            for arg in args {
                printer.print(&arg.string_value());
            }
            printer.newline();
            Ok(Value::Void)
        }))
        .add_function(
            FunctionDescriptor::named("startsWith", &["string", "prefix"], |_, ctx| {
                string_test(ctx, "prefix", |s, prefix| s.starts_with(prefix))
            })
            .with_return_rule(|types| all_strings(types).then_some(ValueType::Boolean)),
        )
        .add_function(
            FunctionDescriptor::named("contains", &["string", "substring"], |_, ctx| {
                string_test(ctx, "substring", |s, substring| s.contains(substring))
            })
            .with_return_rule(|types| all_strings(types).then_some(ValueType::Boolean)),
        )
        .add_function(
            FunctionDescriptor::named("toUpper", &["string"], |_, ctx| {
                map_string(ctx, str::to_uppercase)
            })
            .with_return_rule(|types| all_strings(types).then_some(ValueType::String)),
        )
        .add_function(
            FunctionDescriptor::named("trim", &["string"], |_, ctx| {
                map_string(ctx, |s| s.trim().to_string())
            })
            .with_return_rule(|types| all_strings(types).then_some(ValueType::String)),
        )
        .add_function(
            FunctionDescriptor::variadic("substr", substr)
                .with_return_rule(|types| match types {
                    [s, begin] | [s, begin, _] if !s.is_string() || !begin.is_long() => None,
                    [_, _] => Some(ValueType::String),
                    [_, _, end] if end.is_long() => Some(ValueType::String),
                    _ => None,
                })
                .with_usage("Usage: substr(string, beginIndex[, endIndex])"),
        )
        .add_function(
            FunctionDescriptor::named("abs", &["number"], abs).with_return_rule(|types| {
                match types {
                    [t] if t.is_number() => Some(*t),
                    _ => None,
                }
            }),
        )
        .add_function(
            FunctionDescriptor::named("toString", &["value"], |_, ctx| {
                Ok(Value::String(ctx.get_variable("value")?.string_value()))
            })
            .returns(ValueType::String),
        )
        .add_function(
            FunctionDescriptor::variadic("toDate", to_date)
                .with_return_rule(|types| match types {
                    [s] if s.is_string() => Some(ValueType::Date),
                    [_, _, _] if all_longs(types) => Some(ValueType::Date),
                    _ => None,
                })
                .with_usage("Usage: toDate(\"yyyy-mm-dd\") or toDate(yyyy, mm, dd)"),
        )
        .add_function(
            FunctionDescriptor::variadic("toDateTime", to_date_time)
                .with_return_rule(|types| match types.len() {
                    1 if types[0].is_string() => Some(ValueType::DateTime),
                    5..=7 if all_longs(types) => Some(ValueType::DateTime),
                    _ => None,
                })
                .with_usage(
                    "Usage: toDateTime(\"yyyy-mm-ddThh:mm[:ss[.nnnn]]\") or toDateTime(yyyy, mm, dd, hh, mm[, ss[, nnnn]])",
                ),
        )
        .add_function(
            FunctionDescriptor::named("toLong", &["string"], |fd, ctx| {
                let text = string_parameter(fd, ctx)?;
                text.trim()
                    .parse::<i64>()
                    .map(Value::Long)
                    .map_err(|e| conversion(fd, &text, e))
            })
            .with_return_rule(|types| all_strings(types).then_some(ValueType::Long)),
        )
        .add_function(
            FunctionDescriptor::named("toDouble", &["string"], |fd, ctx| {
                let text = string_parameter(fd, ctx)?;
                text.trim()
                    .parse::<f64>()
                    .map(Value::Double)
                    .map_err(|e| conversion(fd, &text, e))
            })
            .with_return_rule(|types| all_strings(types).then_some(ValueType::Double)),
        )
        .add_function(
            FunctionDescriptor::named(
                "withinDays",
                &["date1", "date2", "numberOfDays"],
                |_, ctx| {
                    let date1 = ctx.get_variable("date1")?.as_date()?;
                    let date2 = ctx.get_variable("date2")?.as_date()?;
                    let days = ctx.get_variable("numberOfDays")?.as_long()?;
                    Ok(Value::Boolean((date2 - date1).num_days().abs() <= days))
                },
            )
            .with_return_rule(|types| match types {
                [ValueType::Date, ValueType::Date, ValueType::Long] => Some(ValueType::Boolean),
                _ => None,
            }),
        );
}

fn all_strings(types: &[ValueType]) -> bool {
    types.iter().all(ValueType::is_string)
}

fn all_longs(types: &[ValueType]) -> bool {
    types.iter().all(ValueType::is_long)
}

fn conversion(fd: &FunctionDescriptor, input: &str, reason: impl ToString) -> EngineError {
    EngineError::Conversion {
        function: fd.name().to_string(),
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// The `string` parameter, which must hold a string value
fn string_parameter(fd: &FunctionDescriptor, ctx: &dyn EvalContext) -> Result<String> {
    let value = ctx.get_variable("string")?;
    fd.assert_parameter_type(ValueType::String, value.value_type())?;
    Ok(value.string_value())
}

fn string_test(
    ctx: &dyn EvalContext,
    other: &str,
    test: impl Fn(&str, &str) -> bool,
) -> Result<Value> {
    let value = ctx.get_variable("string")?;
    let other = ctx.get_variable(other)?;
    if value.is_void() || other.is_void() {
        return Ok(Value::Void);
    }
    Ok(Value::Boolean(test(value.as_str()?, other.as_str()?)))
}

fn map_string(ctx: &dyn EvalContext, f: impl Fn(&str) -> String) -> Result<Value> {
    match ctx.get_variable("string")? {
        Value::Void => Ok(Value::Void),
        value => Ok(Value::String(f(value.as_str()?))),
    }
}

fn substr(fd: &FunctionDescriptor, args: &[Value], _: &dyn EvalContext) -> Result<Value> {
    if args.len() != 2 && args.len() != 3 {
        return Err(fd.invalid_argument_count());
    }
    if args[0].is_void() {
        return Ok(Value::Void);
    }

    let chars: Vec<char> = args[0].as_str()?.chars().collect();
    let begin = args[1].as_long()?;
    let end = match args.get(2) {
        Some(end) => end.as_long()?,
        None => chars.len() as i64,
    };

    for index in [begin, end] {
        if index < 0 || index as usize > chars.len() {
            return Err(EngineError::IndexOutOfBounds {
                index,
                size: chars.len(),
            });
        }
    }
    if begin > end {
        return Err(conversion(
            fd,
            &args[0].string_value(),
            format!("begin index {} is after end index {}", begin, end),
        ));
    }

    Ok(Value::String(
        chars[begin as usize..end as usize].iter().collect(),
    ))
}

fn abs(fd: &FunctionDescriptor, ctx: &dyn EvalContext) -> Result<Value> {
    match ctx.get_variable("number")? {
        Value::Void => Ok(Value::Void),
        Value::Long(n) => Ok(Value::Long(n.wrapping_abs())),
        Value::Double(d) => Ok(Value::Double(d.abs())),
        other => Err(EngineError::InvalidArgumentType {
            function: fd.name().to_string(),
            expected: ValueType::Double,
            actual: other.value_type(),
        }),
    }
}

/// Narrow a numeric date/time component
fn component(fd: &FunctionDescriptor, value: &Value) -> Result<u32> {
    let n = value.as_long()?;
    u32::try_from(n).map_err(|e| conversion(fd, &n.to_string(), e))
}

fn to_date(fd: &FunctionDescriptor, args: &[Value], _: &dyn EvalContext) -> Result<Value> {
    match args {
        [text] => {
            let text = text.string_value();
            NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| conversion(fd, &text, e))
        }
        [year, month, day] => {
            let year = year.as_long()?;
            let month = component(fd, month)?;
            let day = component(fd, day)?;
            i32::try_from(year)
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
                .map(Value::Date)
                .ok_or_else(|| {
                    conversion(fd, &format!("{}-{}-{}", year, month, day), "invalid date")
                })
        }
        _ => Err(fd.invalid_argument_count()),
    }
}

fn to_date_time(fd: &FunctionDescriptor, args: &[Value], _: &dyn EvalContext) -> Result<Value> {
    match args.len() {
        1 => {
            let text = args[0].string_value();
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
                .map(Value::DateTime)
                .ok_or_else(|| conversion(fd, &text, "not an ISO date-time"))
        }
        5..=7 => {
            let year = args[0].as_long()?;
            let parts = args[1..]
                .iter()
                .map(|arg| component(fd, arg))
                .collect::<Result<Vec<u32>>>()?;
            let second = parts.get(4).copied().unwrap_or(0);
            let nanos = parts.get(5).copied().unwrap_or(0);

            i32::try_from(year)
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, parts[0], parts[1]))
                .and_then(|date| date.and_hms_nano_opt(parts[2], parts[3], second, nanos))
                .map(Value::DateTime)
                .ok_or_else(|| {
                    let input: Vec<String> = args.iter().map(Value::as_string_literal).collect();
                    conversion(fd, &input.join(", "), "invalid date-time")
                })
        }
        _ => Err(fd.invalid_argument_count()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::context::SimpleEvalContext;
    use crate::printer::CapturingPrinter;
    use std::sync::Arc;

    fn call(name: &str, args: Vec<Value>) -> Result<Value> {
        let registry = FunctionRegistry::with_defaults();
        let context = SimpleEvalContext::new();
        registry
            .get(name)
            .ok_or_else(|| EngineError::UnknownFunction(name.to_string()))?
            .evaluate(args, &context)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_print_writes_to_context_printer() -> Result<()> {
        let capture = Arc::new(CapturingPrinter::new());
        let context = SimpleEvalContext::new().with_printer(capture.clone());
        let registry = FunctionRegistry::with_defaults();

        registry
            .get("print")
            .unwrap()
            .evaluate(vec![Value::from("a"), Value::Long(1)], &context)?;
        registry
            .get("println")
            .unwrap()
            .evaluate(vec![Value::from("b"), Value::Double(2.5)], &context)?;

        assert_eq!(capture.contents(), "a1b2.5\n");
        Ok(())
    }

    #[test]
    fn test_string_functions() -> Result<()> {
        assert_eq!(
            call("startsWith", vec!["Abigail".into(), "Ab".into()])?,
            Value::Boolean(true)
        );
        assert_eq!(
            call("contains", vec!["Abigail".into(), "gai".into()])?,
            Value::Boolean(true)
        );
        assert_eq!(call("toUpper", vec!["abc".into()])?, Value::from("ABC"));
        assert_eq!(call("trim", vec!["  abc ".into()])?, Value::from("abc"));
        assert_eq!(call("toUpper", vec![Value::Void])?, Value::Void);
        Ok(())
    }

    #[test]
    fn test_substr() -> Result<()> {
        assert_eq!(
            call("substr", vec!["abcdef".into(), Value::Long(2)])?,
            Value::from("cdef")
        );
        assert_eq!(
            call("substr", vec!["abcdef".into(), Value::Long(1), Value::Long(3)])?,
            Value::from("bc")
        );
        assert_eq!(call("substr", vec![Value::Void, Value::Long(1)])?, Value::Void);

        let err = call("substr", vec!["abcdef".into()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid number of parameters in a call to 'substr'. Usage: substr(string, beginIndex[, endIndex])"
        );

        assert!(matches!(
            call("substr", vec!["abc".into(), Value::Long(5)]),
            Err(EngineError::IndexOutOfBounds { index: 5, size: 3 })
        ));
        assert_eq!(
            call("substr", vec!["abcdef".into(), Value::Long(4), Value::Long(2)]),
            Err(EngineError::Conversion {
                function: "substr".to_string(),
                input: "abcdef".to_string(),
                reason: "begin index 4 is after end index 2".to_string(),
            })
        );
        Ok(())
    }

    #[test]
    fn test_abs_preserves_type() -> Result<()> {
        assert_eq!(call("abs", vec![Value::Long(-5)])?, Value::Long(5));
        assert_eq!(call("abs", vec![Value::Double(-5.0)])?, Value::Double(5.0));
        assert_eq!(call("abs", vec![Value::Void])?, Value::Void);
        assert!(matches!(
            call("abs", vec!["x".into()]),
            Err(EngineError::InvalidArgumentType { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_conversions() -> Result<()> {
        assert_eq!(call("toString", vec![Value::Long(12)])?, Value::from("12"));
        assert_eq!(call("toLong", vec!["42".into()])?, Value::Long(42));
        assert_eq!(call("toDouble", vec!["4.5".into()])?, Value::Double(4.5));
        assert!(matches!(
            call("toLong", vec![Value::Long(42)]),
            Err(EngineError::InvalidArgumentType { .. })
        ));
        assert!(matches!(
            call("toLong", vec!["forty two".into()]),
            Err(EngineError::Conversion { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_dates() -> Result<()> {
        assert_eq!(
            call("toDate", vec!["2021-03-15".into()])?,
            Value::Date(date(2021, 3, 15))
        );
        assert_eq!(
            call("toDate", vec![Value::Long(2021), Value::Long(3), Value::Long(15)])?,
            Value::Date(date(2021, 3, 15))
        );
        assert!(matches!(
            call("toDate", vec![Value::Long(2021), Value::Long(3)]),
            Err(EngineError::InvalidArgumentCount { .. })
        ));

        let expected = date(2021, 3, 15).and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(
            call("toDateTime", vec!["2021-03-15T10:30".into()])?,
            Value::DateTime(expected)
        );
        assert_eq!(
            call(
                "toDateTime",
                vec![2021.into(), 3.into(), 15.into(), 10.into(), 30.into()]
            )?,
            Value::DateTime(expected)
        );
        assert!(matches!(
            call("toDateTime", vec![2021.into(), 3.into(), 15.into()]),
            Err(EngineError::InvalidArgumentCount { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_within_days() -> Result<()> {
        let args = |a: NaiveDate, b: NaiveDate, n: i64| vec![a.into(), b.into(), Value::Long(n)];

        assert_eq!(
            call("withinDays", args(date(2021, 1, 1), date(2021, 1, 4), 3))?,
            Value::Boolean(true)
        );
        assert_eq!(
            call("withinDays", args(date(2021, 1, 4), date(2021, 1, 1), 2))?,
            Value::Boolean(false)
        );
        assert_eq!(
            call("withinDays", args(date(2021, 1, 1), date(2021, 3, 1), 10))?,
            Value::Boolean(false)
        );
        Ok(())
    }

    #[test]
    fn test_return_type_rules() {
        let registry = FunctionRegistry::with_defaults();
        let abs = registry.get("abs").unwrap();
        assert_eq!(abs.return_type(&[ValueType::Long]), Some(ValueType::Long));
        assert_eq!(abs.return_type(&[ValueType::Double]), Some(ValueType::Double));
        assert_eq!(abs.return_type(&[ValueType::String]), None);

        let substr = registry.get("substr").unwrap();
        assert_eq!(
            substr.return_type(&[ValueType::String, ValueType::Long]),
            Some(ValueType::String)
        );
        assert_eq!(substr.return_type(&[ValueType::String]), None);

        let println = registry.get("println").unwrap();
        assert_eq!(println.return_type(&[ValueType::Long]), Some(ValueType::Void));
    }
}
