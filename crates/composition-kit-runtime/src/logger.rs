//! Injected logging.
//!
//! Components receive a [`Logger`] at construction instead of writing through
//! the global `log` macros, so that an embedding application decides where
//! (and whether) engine diagnostics go. The default logger drops everything.

use std::fmt;
use std::rc::Rc;

use log::{Level, Log, Metadata, Record};

const DEFAULT_TARGET: &str = "composition_kit";

/// Cloneable handle to a [`log::Log`] sink with a fixed target.
#[derive(Clone)]
pub struct Logger {
    sink: Rc<dyn Log>,
    target: &'static str,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::noop()
    }
}

impl Logger {
    /// Wraps an arbitrary sink.
    pub fn new(sink: Rc<dyn Log>) -> Self {
        Self {
            sink,
            target: DEFAULT_TARGET,
        }
    }

    /// A logger that discards every record.
    pub fn noop() -> Self {
        Self::new(Rc::new(NopLog))
    }

    /// A logger that forwards to the backend installed with `log::set_logger`.
    pub fn global() -> Self {
        Self::new(Rc::new(GlobalLog))
    }

    /// Returns a copy of this logger that tags records with `target`.
    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.sink.enabled(
            &Metadata::builder()
                .level(level)
                .target(self.target)
                .build(),
        )
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .args(args)
                .level(level)
                .target(self.target)
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, args);
    }

    pub fn flush(&self) {
        self.sink.flush();
    }
}

struct NopLog;

impl Log for NopLog {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _record: &Record<'_>) {}

    fn flush(&self) {}
}

struct GlobalLog;

impl Log for GlobalLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        lines: Mutex<Vec<(Level, String, String)>>,
    }

    impl Log for Capture {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.level() <= Level::Info
        }

        fn log(&self, record: &Record<'_>) {
            self.lines.lock().unwrap().push((
                record.level(),
                record.target().to_string(),
                record.args().to_string(),
            ));
        }

        fn flush(&self) {}
    }

    #[test]
    fn records_reach_the_injected_sink() {
        let capture = Rc::new(Capture::default());
        let logger = Logger::new(capture.clone()).with_target("list");

        logger.warn(format_args!("pool entry {} replaced", 7));
        logger.debug(format_args!("filtered out"));

        let lines = capture.lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::Warn);
        assert_eq!(lines[0].1, "list");
        assert_eq!(lines[0].2, "pool entry 7 replaced");
    }

    #[test]
    fn noop_logger_is_never_enabled() {
        let logger = Logger::noop();
        assert!(!logger.enabled(Level::Error));
        logger.error(format_args!("ignored"));
    }
}
