//! Error reporting.
//!
//! Every evaluation failure is written to the error printer before it is
//! returned, so it stays observable even when a caller drops the payload.

use crate::error::{EngineError, Result};
use crate::printer;

/// Reports `error` and returns it for propagation.
pub fn report(error: EngineError) -> EngineError {
    log::error!("{}", error);
    printer::err_printer().println(&format!("ERROR: {}", error));
    error
}

/// Reports `error` and fails with it.
pub fn fail<T>(error: EngineError) -> Result<T> {
    Err(report(error))
}

/// Fails with `error` if `condition` holds.
pub fn fail_if<F>(condition: bool, error: F) -> Result<()>
where
    F: FnOnce() -> EngineError,
{
    if condition {
        fail(error())
    } else {
        Ok(())
    }
}
