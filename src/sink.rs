use crate::record::LogRecord;

/// Error returned when a sink fails to persist a record.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("log file write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Synchronous destination for [`LogRecord`]s produced by the logger.
///
/// Implementations are responsible for persisting records to a concrete
/// target (a daily file, stdout, nothing at all for tests). The logger
/// calls `append` inline from the severity entry points and treats an
/// error as an internal failure to be rerouted, never propagated to the
/// calling code.
pub trait LogSink: Send + Sync {
    /// Persist a single record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was accepted by the target. A sink with no
    ///   active destination (e.g. the log file could not be created) also
    ///   returns `Ok(())` and drops the record.
    /// - `Err(..)` if the target failed mid-write.
    fn append(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Flush any buffered records, if the sink implements buffering.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
