use std::sync::{Arc, Mutex, OnceLock};

use crate::config;
use crate::file_sink::{FileSink, FileSinkConfig};
use crate::record::{LogRecord, LogRequest, Payload, Severity};
use crate::sink::LogSink;

/// Runtime knobs for a [`Logger`] instance. Defaults come from [`config`].
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    /// `chrono` format string for record timestamps.
    pub record_date_format: String,
    /// Echo every record to stdout as pretty-printed JSON.
    pub echo_stdout: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            record_date_format: config::RECORD_DATE_FORMAT.to_string(),
            echo_stdout: config::ECHO_STDOUT,
        }
    }
}

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// The shared process-wide logger, constructed on first access with a
/// [`FileSink`] opened for today's file under the default directory.
///
/// Every call returns the same instance: one history, one active file.
/// Hosts that want an explicitly wired instance instead should construct
/// one with [`Logger::new`] and pass it around themselves.
pub fn get_logger() -> &'static Logger {
    GLOBAL.get_or_init(|| {
        let sink = FileSink::open_daily(&FileSinkConfig::default());
        Logger::new(Arc::new(sink), LoggerConfig::default())
    })
}

/// Process-wide logger: owns the in-memory history and the active sink,
/// and exposes one entry point per severity.
///
/// Every entry point runs format → history append → echo → sink append to
/// completion before returning, and never lets an internal failure reach
/// the caller: format and sink failures are rerouted into a single
/// EXCEPTION entry, and a failure while logging that entry is dropped.
pub struct Logger {
    history: Mutex<Vec<LogRecord>>,
    sink: Arc<dyn LogSink>,
    config: LoggerConfig,
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>, config: LoggerConfig) -> Self {
        Logger {
            history: Mutex::new(Vec::new()),
            sink,
            config,
        }
    }

    /// Log an INFO record.
    ///
    /// `message` and `params` accept plain strings and structured
    /// `serde_json` values; pass `()` (or `None`) for absent inputs.
    pub fn info(
        &self,
        message: impl Into<Payload>,
        params: impl Into<Payload>,
        file: Option<&str>,
        method: Option<&str>,
    ) {
        self.submit(LogRequest::from_fields(
            Severity::Info,
            message,
            params,
            file,
            method,
        ));
    }

    /// Log a WARNING record.
    pub fn warning(
        &self,
        message: impl Into<Payload>,
        params: impl Into<Payload>,
        file: Option<&str>,
        method: Option<&str>,
    ) {
        self.submit(LogRequest::from_fields(
            Severity::Warning,
            message,
            params,
            file,
            method,
        ));
    }

    /// Log an ERROR record.
    pub fn error(
        &self,
        message: impl Into<Payload>,
        params: impl Into<Payload>,
        file: Option<&str>,
        method: Option<&str>,
    ) {
        self.submit(LogRequest::from_fields(
            Severity::Error,
            message,
            params,
            file,
            method,
        ));
    }

    /// Log an EXCEPTION record.
    ///
    /// Accepts any [`LogRequest`] — typically built with
    /// [`LogRequest::from_error`] or [`LogRequest::from_fields`] — and
    /// forces its severity to EXCEPTION.
    pub fn exception(&self, request: LogRequest) {
        let mut request = request;
        request.severity = Severity::Exception;
        self.submit(request);
    }

    /// Full history of records logged through this instance, in insertion
    /// order. The history is append-only and never trimmed.
    pub fn get_log(&self) -> Vec<LogRecord> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    fn submit(&self, request: LogRequest) {
        self.submit_at_depth(request, 0);
    }

    /// One pass of the pipeline. Internal failures at depth 0 reroute into
    /// a single EXCEPTION entry at depth 1; failures at depth 1 are
    /// swallowed so rerouting can never loop.
    fn submit_at_depth(&self, request: LogRequest, depth: u8) {
        let record = match LogRecord::from_request(request, &self.config.record_date_format) {
            Ok(record) => record,
            Err(err) => {
                self.reroute(format!("log record formatting failed: {}", err), depth);
                return;
            }
        };

        if let Ok(mut history) = self.history.lock() {
            history.push(record.clone());
        }

        if self.config.echo_stdout {
            if let Ok(json) = serde_json::to_string_pretty(&record) {
                println!("{}", json);
            }
        }

        if let Err(err) = self.sink.append(&record) {
            self.reroute(format!("log file append failed: {}", err), depth);
        }
    }

    fn reroute(&self, message: String, depth: u8) {
        if depth > 0 {
            return;
        }

        self.submit_at_depth(
            LogRequest::from_fields(
                Severity::Exception,
                message,
                (),
                None,
                Some("Logger::submit"),
            ),
            depth + 1,
        );
    }
}
