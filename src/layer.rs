use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::logger::Logger;
use crate::record::Payload;

/// `tracing_subscriber` layer that redirects diagnostics raised anywhere in
/// the process into the logger's severity entry points: WARN events become
/// WARNING records, ERROR events become ERROR records.
///
/// The event's level label is rendered into the message, its call site into
/// the file field, and its remaining fields into structured params. Events
/// below WARN are counted but not captured.
pub struct InterceptLayer {
    logger: &'static Logger,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events captured and routed into the logger.
    pub captured_events: Arc<AtomicU64>,
}

impl InterceptLayer {
    pub fn new(logger: &'static Logger) -> Self {
        InterceptLayer {
            logger,
            total_events: Arc::new(AtomicU64::new(0)),
            captured_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Human-readable label for an event's level, rendered into the message of
/// every captured record. Unrecognized levels render as an empty label.
fn level_label(level: &Level) -> &'static str {
    if *level == Level::ERROR {
        "ERROR"
    } else if *level == Level::WARN {
        "WARN"
    } else if *level == Level::INFO {
        "INFO"
    } else if *level == Level::DEBUG {
        "DEBUG"
    } else if *level == Level::TRACE {
        "TRACE"
    } else {
        ""
    }
}

impl<S> Layer<S> for InterceptLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let level = *event.metadata().level();
        if level > Level::WARN {
            return;
        }
        self.captured_events.fetch_add(1, Ordering::Relaxed);

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let meta = event.metadata();
        let rendered = format!(
            "[{}] {}",
            level_label(&level),
            message.unwrap_or_else(|| meta.target().to_string())
        );
        let source_file = meta.file().map(|file| match meta.line() {
            Some(line) => format!("[Line: {}] {}", line, file),
            None => file.to_string(),
        });
        let params = if fields.is_empty() {
            Payload::Empty
        } else {
            Payload::Structured(Value::Object(fields.into_iter().collect()))
        };

        if level == Level::WARN {
            self.logger.warning(
                rendered,
                params,
                source_file.as_deref(),
                Some(meta.target()),
            );
        } else {
            self.logger.error(
                rendered,
                params,
                source_file.as_deref(),
                Some(meta.target()),
            );
        }
    }
}

use tracing::field::{Field, Visit};

pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{Logger, LoggerConfig};
    use crate::noop_sink::NoopSink;
    use crate::record::Severity;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn leaked_logger() -> &'static Logger {
        Box::leak(Box::new(Logger::new(
            std::sync::Arc::new(NoopSink),
            LoggerConfig {
                echo_stdout: false,
                ..LoggerConfig::default()
            },
        )))
    }

    #[test]
    fn warn_and_error_events_are_routed_into_the_logger() {
        let logger = leaked_logger();
        let layer = InterceptLayer::new(logger);
        let total = Arc::clone(&layer.total_events);
        let captured = Arc::clone(&layer.captured_events);

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("below the capture threshold");
            tracing::warn!(attempts = 3u64, "retrying connection");
            tracing::error!(user_id = 42u64, "authentication failed");
        });

        assert_eq!(total.load(Ordering::Relaxed), 3);
        assert_eq!(captured.load(Ordering::Relaxed), 2);

        let history = logger.get_log();
        assert_eq!(history.len(), 2);

        assert_eq!(history[0].severity, Severity::Warning);
        assert_eq!(history[0].message, "[WARN] retrying connection");
        let params: Value = serde_json::from_str(&history[0].params).unwrap();
        assert_eq!(params, json!({"attempts": 3}));

        assert_eq!(history[1].severity, Severity::Error);
        assert_eq!(history[1].message, "[ERROR] authentication failed");
        assert!(history[1]
            .source_file
            .as_deref()
            .is_some_and(|file| file.starts_with("[Line: ")));
    }

    #[test]
    fn event_without_fields_has_placeholder_params() {
        let logger = leaked_logger();
        let layer = InterceptLayer::new(logger);

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("bare event");
        });

        let history = logger.get_log();
        assert_eq!(history.len(), 1);
        assert!(!history[0].has_params());
    }

    #[test]
    fn level_labels_match_tracing_levels() {
        assert_eq!(level_label(&Level::ERROR), "ERROR");
        assert_eq!(level_label(&Level::WARN), "WARN");
        assert_eq!(level_label(&Level::INFO), "INFO");
        assert_eq!(level_label(&Level::DEBUG), "DEBUG");
        assert_eq!(level_label(&Level::TRACE), "TRACE");
    }
}
