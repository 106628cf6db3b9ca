//! Build logger interface.
//!
//! Adapters and the prerender reporter never print directly. They receive a
//! [`Logger`] and report through one of its six channels. Three sinks ship
//! with the crate:
//!
//! - [`ConsoleLogger`]: colored terminal output, `minor`/`info` gated on verbosity
//! - [`TracingLogger`]: forwards every channel to `tracing` events
//! - [`MemoryLogger`]: records messages for inspection (tests, JSON output)

use colored::Colorize;
use std::sync::Mutex;

/// The channel a message was logged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Plain message.
    Log,
    /// Successful step.
    Success,
    /// Failure.
    Error,
    /// Recoverable problem.
    Warn,
    /// Low-importance detail.
    Minor,
    /// Informational, verbose only.
    Info,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Log => "log",
            LogLevel::Success => "success",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Minor => "minor",
            LogLevel::Info => "info",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logger handed to adapters and build steps.
pub trait Logger: Send + Sync {
    /// Logs a plain message.
    fn log(&self, msg: &str);
    /// Logs a successful step.
    fn success(&self, msg: &str);
    /// Logs an error.
    fn error(&self, msg: &str);
    /// Logs a warning.
    fn warn(&self, msg: &str);
    /// Logs a low-importance detail.
    fn minor(&self, msg: &str);
    /// Logs an informational message.
    fn info(&self, msg: &str);

    /// Dispatches on a [`LogLevel`].
    fn at(&self, level: LogLevel, msg: &str) {
        match level {
            LogLevel::Log => self.log(msg),
            LogLevel::Success => self.success(msg),
            LogLevel::Error => self.error(msg),
            LogLevel::Warn => self.warn(msg),
            LogLevel::Minor => self.minor(msg),
            LogLevel::Info => self.info(msg),
        }
    }
}

/// Indents every line of `msg` by two spaces.
fn indent(msg: &str) -> String {
    msg.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Colored terminal logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger {
    verbose: bool,
}

impl ConsoleLogger {
    /// Creates a console logger. `minor` and `info` are dropped unless `verbose`.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Returns true if `minor` and `info` messages are printed.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("{}", indent(msg));
    }

    fn success(&self, msg: &str) {
        println!("{}", indent(&format!("✔ {}", msg)).green());
    }

    fn error(&self, msg: &str) {
        eprintln!("{}", indent(msg).red().bold());
    }

    fn warn(&self, msg: &str) {
        println!("{}", indent(msg).yellow().bold());
    }

    fn minor(&self, msg: &str) {
        if self.verbose {
            println!("{}", indent(msg).dimmed());
        }
    }

    fn info(&self, msg: &str) {
        if self.verbose {
            self.log(msg);
        }
    }
}

/// Logger that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, msg: &str) {
        tracing::info!(target: "kitbuild", "{}", msg);
    }

    fn success(&self, msg: &str) {
        tracing::info!(target: "kitbuild", outcome = "success", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "kitbuild", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "kitbuild", "{}", msg);
    }

    fn minor(&self, msg: &str) {
        tracing::debug!(target: "kitbuild", "{}", msg);
    }

    fn info(&self, msg: &str) {
        tracing::info!(target: "kitbuild", "{}", msg);
    }
}

/// Logger that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    /// Creates an empty memory logger.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: LogLevel, msg: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push((level, msg.to_string()));
    }

    /// Returns a snapshot of all recorded messages.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns the messages recorded at `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, msg: &str) {
        self.push(LogLevel::Log, msg);
    }

    fn success(&self, msg: &str) {
        self.push(LogLevel::Success, msg);
    }

    fn error(&self, msg: &str) {
        self.push(LogLevel::Error, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(LogLevel::Warn, msg);
    }

    fn minor(&self, msg: &str) {
        self.push(LogLevel::Minor, msg);
    }

    fn info(&self, msg: &str) {
        self.push(LogLevel::Info, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_multiline() {
        assert_eq!(indent("a\nb"), "  a\n  b");
        assert_eq!(indent("single"), "  single");
    }

    #[test]
    fn test_memory_logger_records_levels() {
        let logger = MemoryLogger::new();
        logger.warn("careful");
        logger.success("done");
        logger.at(LogLevel::Minor, "detail");

        assert_eq!(logger.messages(LogLevel::Warn), vec!["careful".to_string()]);
        assert_eq!(logger.messages(LogLevel::Minor), vec!["detail".to_string()]);
        assert_eq!(logger.entries().len(), 3);
        assert_eq!(logger.entries()[1].0, LogLevel::Success);
    }

    #[test]
    fn test_console_logger_verbosity() {
        assert!(!ConsoleLogger::default().is_verbose());
        assert!(ConsoleLogger::new(true).is_verbose());
    }

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::Minor.to_string(), "minor");
        assert_eq!(LogLevel::Success.as_str(), "success");
    }
}
