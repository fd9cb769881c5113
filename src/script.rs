//! Script runner.

use crate::error::Result;
use crate::expression::type_inference::TypeInference;
use crate::expression::{evaluate, EvalContext, Expression};
use crate::report;
use crate::syntax;
use crate::value::Value;
use anyhow::Context;
use std::path::Path;

/// Parse, type-check and evaluate `source`, returning the value of its last
/// statement
pub fn run_script(source: &str, context: &mut dyn EvalContext) -> Result<Value> {
    let program = parse_program(source)?;
    check_program(&program, &*context)?;
    evaluate(&program, context)
}

/// Parse and evaluate `source` without static checking
pub fn run_script_unchecked(source: &str, context: &mut dyn EvalContext) -> Result<Value> {
    let program = parse_program(source)?;
    evaluate(&program, context)
}

/// Run the script stored at `path`
pub fn run_script_file(path: &Path, context: &mut dyn EvalContext) -> anyhow::Result<Value> {
    run_file(path, context, run_script)
}

/// Run the script stored at `path` without static checking
pub fn run_script_file_unchecked(path: &Path, context: &mut dyn EvalContext) -> anyhow::Result<Value> {
    run_file(path, context, run_script_unchecked)
}

fn run_file(
    path: &Path,
    context: &mut dyn EvalContext,
    run: fn(&str, &mut dyn EvalContext) -> Result<Value>,
) -> anyhow::Result<Value> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let value = run(&source, context)
        .with_context(|| format!("Failed to run script {}", path.display()))?;
    Ok(value)
}

fn parse_program(source: &str) -> Result<Expression> {
    Ok(syntax::parse_script(source)?.into_expression())
}

fn check_program(program: &Expression, context: &dyn EvalContext) -> Result<()> {
    let mut inference = TypeInference::new(context);
    let value_type = inference.infer_expression_type(program);
    match inference.first_error() {
        Some(error) => report::fail(error),
        None => {
            log::debug!("script checked, result type {}", value_type);
            Ok(())
        }
    }
}
