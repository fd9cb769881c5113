mod common;

use common::column;
use framescript::printer::CapturingPrinter;
use framescript::script::run_script_file_unchecked;
use framescript::{
    row, run_script, run_script_file, DataFrame, EngineError, EvalContext, Result, SimpleEvalContext,
    Value,
};
use std::io::Write;
use std::sync::Arc;

fn people() -> Result<DataFrame> {
    let mut frame = DataFrame::new("People");
    frame
        .add_string_column("Name")?
        .add_long_column("Age")?
        .add_row(row!["Alice", 34])?
        .add_row(row!["Bob", 15])?
        .add_row(row!["Carol", 52])?;
    Ok(frame)
}

#[test]
fn test_functions_and_printing() -> Result<()> {
    let capture = Arc::new(CapturingPrinter::new());
    let mut context = SimpleEvalContext::new().with_printer(capture.clone());

    let source = r#"
        // greet everyone politely
        function greet(name) { "Hello, " + name }
        FUNCTION shout(text) { toUpper(text) + "!" }

        first = "alice"
        println(greet(first))
        print(Shout("bob"), " ", abs(-3))
        IF first is not empty THEN result = 1 ELSE result = 2 ENDIF
        result
    "#;
    let value = run_script(source, &mut context)?;

    assert_eq!(value, Value::Long(1));
    assert_eq!(capture.contents(), "Hello, alice\nBOB! 3");
    Ok(())
}

#[test]
fn test_projection_over_registered_frame() -> Result<()> {
    let mut context = SimpleEvalContext::new();
    context.add_data_set(Arc::new(people()?));

    let value = run_script(
        "adults = project { Name: People.Name, Next: People.Age + 1 } where People.Age >= 18; adults",
        &mut context,
    )?;

    let frame = value.as_data_frame()?;
    assert_eq!(frame.name(), "People");
    assert_eq!(frame.column_names(), vec!["Name", "Next"]);
    assert_eq!(column(frame, "Name")?, row!["Alice", "Carol"]);
    assert_eq!(column(frame, "Next")?, row![35, 53]);
    Ok(())
}

#[test]
fn test_static_errors_are_reported_before_running() {
    let capture = Arc::new(CapturingPrinter::new());
    let mut context = SimpleEvalContext::new().with_printer(capture.clone());

    let err = run_script("println(\"never\"); x = unknownFunction(1)", &mut context).unwrap_err();
    assert!(matches!(err, EngineError::TypeInference { .. }));
    assert_eq!(capture.contents(), "");

    let err = run_script("function f(n) { f(n) } f(1)", &mut context).unwrap_err();
    assert!(matches!(err, EngineError::TypeInference { .. }));

    let err = run_script("x = (1 + ", &mut context).unwrap_err();
    assert!(matches!(err, EngineError::Parse(_)));
}

#[test]
fn test_runtime_errors() {
    let mut context = SimpleEvalContext::new();
    assert_eq!(
        run_script("x = 10; x / 0", &mut context),
        Err(EngineError::DivisionByZero)
    );
    assert!(matches!(
        run_script("toLong(\"twelve\")", &mut context),
        Err(EngineError::Conversion { .. })
    ));
    assert!(matches!(
        run_script("(1, 2)[5]", &mut context),
        Err(EngineError::IndexOutOfBounds { index: 5, size: 2 })
    ));
}

#[test]
fn test_long_division_overflow_wraps() -> Result<()> {
    let mut context = SimpleEvalContext::new();
    let value = run_script("x = 0 - 9223372036854775807 - 1; x / (0 - 1)", &mut context)?;
    assert_eq!(value, Value::Long(i64::MIN));
    Ok(())
}

#[test]
fn test_mixed_number_branches_yield_double() -> Result<()> {
    let mut context = SimpleEvalContext::new();
    let value = run_script("n = 3; if n > 1 then n else 0.5 endif", &mut context)?;
    assert_eq!(value, Value::Double(3.0));

    let value = run_script("if n > 5 then 0.5 else n * 2 endif", &mut context)?;
    assert_eq!(value, Value::Double(6.0));
    Ok(())
}

#[test]
fn test_run_script_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "start = toDate(\"2024-01-10\")")?;
    writeln!(file, "withinDays(start, toDate(2024, 1, 3), 7)")?;

    let mut context = SimpleEvalContext::new();
    let value = run_script_file(file.path(), &mut context)?;
    assert_eq!(value, Value::Boolean(true));
    assert!(context.has_variable("start"));

    let mut unchecked = SimpleEvalContext::new();
    let value = run_script_file_unchecked(file.path(), &mut unchecked)?;
    assert_eq!(value, Value::Boolean(true));

    let missing = file.path().with_extension("missing");
    assert!(run_script_file(&missing, &mut context).is_err());
    Ok(())
}
