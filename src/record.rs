use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::panic::PanicHookInfo;

use crate::config;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Exception,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Exception => "EXCEPTION",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced when a structured payload cannot be serialized.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("structured payload could not be serialized to JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A message or params input before normalization.
///
/// Callers may hand the logger a plain string, a structured value, or
/// nothing at all; all three converge on one canonical string form via
/// `normalize`. An empty string counts as absent.
#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    Text(String),
    Structured(Value),
}

impl Payload {
    /// Canonical string form: text passes through unchanged, structured
    /// values render as pretty-printed JSON, absent input becomes `default`.
    fn normalize(self, default: &str) -> Result<String, FormatError> {
        match self {
            Payload::Empty => Ok(default.to_string()),
            Payload::Text(text) if text.is_empty() => Ok(default.to_string()),
            Payload::Text(text) => Ok(text),
            Payload::Structured(value) => Ok(serde_json::to_string_pretty(&value)?),
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Structured(value)
    }
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Payload::Empty
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Payload::Empty)
    }
}

/// A log call before normalization: severity plus the raw inputs.
///
/// The severity entry points build these via [`LogRequest::from_fields`];
/// the convenience constructors [`LogRequest::from_error`] and
/// [`LogRequest::from_panic`] extract the same fields from native error
/// values. All constructors converge on the same formatting path.
#[derive(Debug)]
pub struct LogRequest {
    pub severity: Severity,
    pub message: Payload,
    pub params: Payload,
    pub source_file: Option<String>,
    pub source_method: Option<String>,
}

impl LogRequest {
    pub fn from_fields(
        severity: Severity,
        message: impl Into<Payload>,
        params: impl Into<Payload>,
        file: Option<&str>,
        method: Option<&str>,
    ) -> Self {
        LogRequest {
            severity,
            message: message.into(),
            params: params.into(),
            source_file: file.map(str::to_string),
            source_method: method.map(str::to_string),
        }
    }

    /// Build an EXCEPTION request from a native error value.
    ///
    /// The message is the error's `Display` output; the params are the
    /// rendered source chain, outermost cause first.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut cause = error.source();
        while let Some(current) = cause {
            chain.push(Value::String(current.to_string()));
            cause = current.source();
        }

        let params = if chain.is_empty() {
            Payload::Empty
        } else {
            Payload::Structured(Value::Array(chain))
        };

        LogRequest {
            severity: Severity::Exception,
            message: Payload::Text(error.to_string()),
            params,
            source_file: None,
            source_method: None,
        }
    }

    /// Build an EXCEPTION request from a panic, with the panic location
    /// rendered into the file field.
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let message = if let Some(text) = info.payload().downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = info.payload().downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };

        let source_file = info
            .location()
            .map(|location| format!("[Line: {}] {}", location.line(), location.file()));

        LogRequest {
            severity: Severity::Exception,
            message: Payload::Text(message),
            params: Payload::Empty,
            source_file,
            source_method: None,
        }
    }
}

/// A single normalized log record, immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub severity: Severity,
    pub source_file: Option<String>,
    pub source_method: Option<String>,
    pub message: String,
    pub params: String,
}

impl LogRecord {
    /// Normalize a request into a record. The timestamp is rendered here,
    /// in UTC, so it reflects the moment of the log call.
    pub fn from_request(request: LogRequest, date_format: &str) -> Result<Self, FormatError> {
        Ok(LogRecord {
            timestamp: Utc::now().format(date_format).to_string(),
            severity: request.severity,
            source_file: request.source_file,
            source_method: request.source_method,
            message: request.message.normalize(config::NO_MESSAGE)?,
            params: request.params.normalize(config::NO_PARAMS)?,
        })
    }

    /// True when the caller actually supplied params, i.e. the field holds
    /// something other than the placeholder.
    pub fn has_params(&self) -> bool {
        self.params != config::NO_PARAMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(message: Payload, params: Payload) -> LogRequest {
        LogRequest {
            severity: Severity::Info,
            message,
            params,
            source_file: None,
            source_method: None,
        }
    }

    #[test]
    fn plain_text_passes_through() {
        let record =
            LogRecord::from_request(request("hello".into(), Payload::Empty), "%Y/%m/%d").unwrap();
        assert_eq!(record.message, "hello");
    }

    #[test]
    fn absent_inputs_become_placeholders_independently() {
        let record =
            LogRecord::from_request(request(Payload::Empty, "args".into()), "%Y/%m/%d").unwrap();
        assert_eq!(record.message, config::NO_MESSAGE);
        assert_eq!(record.params, "args");

        let record =
            LogRecord::from_request(request("hi".into(), Payload::Empty), "%Y/%m/%d").unwrap();
        assert_eq!(record.message, "hi");
        assert_eq!(record.params, config::NO_PARAMS);
        assert!(!record.has_params());
    }

    #[test]
    fn empty_string_counts_as_absent() {
        let record = LogRecord::from_request(request("".into(), "".into()), "%Y/%m/%d").unwrap();
        assert_eq!(record.message, config::NO_MESSAGE);
        assert_eq!(record.params, config::NO_PARAMS);
    }

    #[test]
    fn structured_input_serializes_to_equivalent_json() {
        let value = json!({"k": "v", "n": 7});
        let record =
            LogRecord::from_request(request(value.clone().into(), Payload::Empty), "%Y/%m/%d")
                .unwrap();

        let parsed: Value = serde_json::from_str(&record.message).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn option_conversions_map_none_to_empty() {
        let none: Option<&str> = None;
        assert!(matches!(Payload::from(none), Payload::Empty));
        assert!(matches!(Payload::from(Some("x")), Payload::Text(_)));
    }

    #[test]
    fn severity_labels() {
        assert_eq!(Severity::Info.as_str(), "INFO");
        assert_eq!(Severity::Warning.as_str(), "WARNING");
        assert_eq!(Severity::Error.as_str(), "ERROR");
        assert_eq!(Severity::Exception.to_string(), "EXCEPTION");
    }

    #[test]
    fn from_error_captures_message_and_source_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged");
        let outer = std::io::Error::new(std::io::ErrorKind::Other, inner);

        let request = LogRequest::from_error(&outer);
        assert_eq!(request.severity, Severity::Exception);
        assert!(matches!(&request.message, Payload::Text(text) if text.contains("disk unplugged")));
        assert!(matches!(&request.params, Payload::Structured(Value::Array(chain))
            if chain.len() == 1));
    }
}
