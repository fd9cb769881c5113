//! framescript - run scripts of the framescript expression language

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use framescript::expression::SimpleEvalContext;
use framescript::script::{
    run_script, run_script_file, run_script_file_unchecked, run_script_unchecked,
};
use framescript::Value;
use std::path::PathBuf;

/// framescript - evaluate a script and print its result
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Script file to run
    script: Option<PathBuf>,

    /// Inline script source
    #[arg(short, long, conflicts_with = "script")]
    expr: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Skip static type inference
    #[arg(long)]
    no_check: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut context = SimpleEvalContext::new();
    let value = match (&args.expr, &args.script) {
        (Some(source), _) => {
            log::debug!("running inline script");
            let run = if args.no_check { run_script_unchecked } else { run_script };
            run(source, &mut context).context("Failed to run inline script")?
        }
        (None, Some(path)) => {
            log::debug!("running {}", path.display());
            let run = if args.no_check { run_script_file_unchecked } else { run_script_file };
            run(path, &mut context)?
        }
        (None, None) => bail!("Either a script path or --expr is required"),
    };

    if !value.is_void() {
        print_result(&value);
    }
    Ok(())
}

fn print_result(value: &Value) {
    match value {
        Value::DataFrame(frame) => {
            println!("{}", frame.column_names().join("\t"));
            for row in 0..frame.row_count() {
                let cells: Vec<String> = (0..frame.column_count())
                    .map(|column| {
                        frame
                            .get_value_at(row, column)
                            .map(|cell| cell.string_value())
                            .unwrap_or_default()
                    })
                    .collect();
                println!("{}", cells.join("\t"));
            }
        }
        other => println!("{}", other.string_value()),
    }
}
