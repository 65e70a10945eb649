use std::rc::Rc;
use std::sync::Mutex;

use composition_kit_runtime::Logger;
use log::{Level, Log, Metadata, Record};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// `log::Log` sink that keeps every record for assertions.
#[derive(Default)]
pub struct CapturingLog {
    records: Mutex<Vec<CapturedRecord>>,
}

impl CapturingLog {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Injectable logger writing into this sink.
    pub fn logger(self: &Rc<Self>) -> Logger {
        Logger::new(self.clone())
    }

    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, level: Level) -> usize {
        self.records()
            .iter()
            .filter(|record| record.level == level)
            .count()
    }

    /// True if a record at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records()
            .iter()
            .any(|record| record.level == level && record.message.contains(needle))
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Log for CapturingLog {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push(CapturedRecord {
                level: record.level(),
                target: record.target().to_string(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_records_from_the_injected_logger() {
        let log = CapturingLog::new();
        let logger = log.logger();
        logger.warn(format_args!("pool entry replaced"));
        logger.trace(format_args!("swept 2"));

        assert!(log.contains(Level::Warn, "replaced"));
        assert_eq!(log.count(Level::Trace), 1);
        assert_eq!(log.records()[0].target, "composition_kit");
        log.clear();
        assert!(log.records().is_empty());
    }
}
