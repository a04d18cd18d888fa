use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of the logger itself without any
/// file I/O, and for unit tests that don't care about persistence.
#[derive(Clone, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn append(&self, _record: &LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
