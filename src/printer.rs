//! Output sinks for script output and diagnostics.
//!
//! The `print`/`println` built-ins write through the printer held by the
//! evaluation context, which defaults to the process-wide printer. Error
//! reporting always goes to the process-wide error printer.

use parking_lot::{Mutex, RwLock};
use std::io::Write;
use std::sync::{Arc, OnceLock};

/// A sink for text output
pub trait Printer: Send + Sync {
    fn print(&self, text: &str);

    fn newline(&self);

    fn println(&self, text: &str) {
        self.print(text);
        self.newline();
    }
}

/// Writes to standard output
#[derive(Debug, Default)]
pub struct StdoutPrinter;

impl Printer for StdoutPrinter {
    fn print(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn newline(&self) {
        self.print("\n");
    }
}

/// Writes to standard error
#[derive(Debug, Default)]
pub struct StderrPrinter;

impl Printer for StderrPrinter {
    fn print(&self, text: &str) {
        let _ = std::io::stderr().lock().write_all(text.as_bytes());
    }

    fn newline(&self) {
        self.print("\n");
    }
}

/// Collects everything printed into a string buffer
#[derive(Debug, Default)]
pub struct CapturingPrinter {
    buffer: Mutex<String>,
}

impl CapturingPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Printer for CapturingPrinter {
    fn print(&self, text: &str) {
        self.buffer.lock().push_str(text);
    }

    fn newline(&self) {
        self.buffer.lock().push('\n');
    }
}

struct Sinks {
    out: Arc<dyn Printer>,
    err: Arc<dyn Printer>,
}

impl Sinks {
    fn defaults() -> Self {
        Self {
            out: Arc::new(StdoutPrinter),
            err: Arc::new(StderrPrinter),
        }
    }
}

fn sinks() -> &'static RwLock<Sinks> {
    static SINKS: OnceLock<RwLock<Sinks>> = OnceLock::new();
    SINKS.get_or_init(|| RwLock::new(Sinks::defaults()))
}

/// The process-wide output printer
pub fn printer() -> Arc<dyn Printer> {
    sinks().read().out.clone()
}

/// The process-wide error printer
pub fn err_printer() -> Arc<dyn Printer> {
    sinks().read().err.clone()
}

pub fn set_printer(printer: Arc<dyn Printer>) {
    sinks().write().out = printer;
}

pub fn set_err_printer(printer: Arc<dyn Printer>) {
    sinks().write().err = printer;
}

/// Restores the stdout/stderr printers. Idempotent.
pub fn initialize() {
    *sinks().write() = Sinks::defaults();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capturing_printer() {
        let printer = CapturingPrinter::new();
        printer.print("Hello");
        printer.print(", ");
        printer.println("world");
        printer.print("!");

        assert_eq!(printer.contents(), "Hello, world\n!");

        printer.clear();
        assert_eq!(printer.contents(), "");
    }
}
