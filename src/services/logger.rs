use std::fmt;
use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::{Context, Layer};

use crate::configuration::logs::{ConfigFallback, LogFormat, LogMode};
use crate::error::LoggingError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// The built logger handle.
///
/// Owns the assembled subscriber and the background writer guards for both
/// sinks; dropping the handle flushes whatever is still buffered. The
/// dispatch is the full-featured core, [`Logger::init`] installs it as the
/// process global default so the `tracing` macros become the convenience
/// surface over the same core.
pub struct Logger {
    dispatch: Dispatch,
    fallbacks: Vec<ConfigFallback>,
    _guards: [WorkerGuard; 2],
}

impl Logger {
    pub(crate) fn new(
        dispatch: Dispatch,
        guards: [WorkerGuard; 2],
        fallbacks: Vec<ConfigFallback>,
    ) -> Self {
        Self {
            dispatch,
            fallbacks,
            _guards: guards,
        }
    }

    pub fn dispatch(&self) -> Dispatch {
        self.dispatch.clone()
    }

    /// Configuration strings that were replaced by their defaults.
    pub fn fallbacks(&self) -> &[ConfigFallback] {
        &self.fallbacks
    }

    /// Installs this logger as the process global default. The handle must
    /// be kept alive for the lifetime of the application so the sink
    /// workers keep draining.
    pub fn init(&self) -> Result<(), LoggingError> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())?;
        Ok(())
    }
}

/// One log destination: encodes matching records and hands them to the
/// non-blocking rotating writer.
pub(crate) struct SinkLayer {
    encoder: Arc<RecordEncoder>,
    writer: NonBlocking,
}

impl SinkLayer {
    pub(crate) fn new(encoder: Arc<RecordEncoder>, writer: NonBlocking) -> Self {
        Self { encoder, writer }
    }
}

impl<S: Subscriber> Layer<S> for SinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let line = self.encoder.encode(event);
        // write failures are not surfaced
        let _ = self.writer.clone().write_all(line.as_bytes());
    }
}

/// Turns an event into one output line according to the configured format
/// and verbosity mode, attaching the constant service metadata fields.
pub(crate) struct RecordEncoder {
    format: LogFormat,
    mode: LogMode,
    service_name: Option<String>,
    environment: Option<String>,
}

impl RecordEncoder {
    pub(crate) fn new(
        format: LogFormat,
        mode: LogMode,
        service_name: Option<String>,
        environment: Option<String>,
    ) -> Self {
        Self {
            format,
            mode,
            service_name,
            environment,
        }
    }

    pub(crate) fn encode(&self, event: &Event<'_>) -> String {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let fields = self.constant_fields(visitor.fields);
        match self.format {
            LogFormat::Json => self.encode_json(event, visitor.message, fields),
            LogFormat::Console => self.encode_console(event, visitor.message, fields),
        }
    }

    fn constant_fields(&self, mut fields: Map<String, Value>) -> Map<String, Value> {
        if let Some(service_name) = &self.service_name {
            fields.insert(
                "serviceName".to_string(),
                Value::String(service_name.clone()),
            );
        }
        if let Some(environment) = &self.environment {
            fields.insert("env".to_string(), Value::String(environment.clone()));
        }
        fields
    }

    fn encode_json(&self, event: &Event<'_>, message: String, fields: Map<String, Value>) -> String {
        let mut record = Map::new();
        if self.mode == LogMode::Detail {
            let metadata = event.metadata();
            record.insert(
                "ts".to_string(),
                Value::String(Local::now().format(TIMESTAMP_FORMAT).to_string()),
            );
            record.insert(
                "level".to_string(),
                Value::String(metadata.level().to_string()),
            );
            if let Some(caller) = caller(event) {
                record.insert("file".to_string(), Value::String(caller));
            }
        }
        record.insert("msg".to_string(), Value::String(message));
        record.extend(fields);
        let mut line = Value::Object(record).to_string();
        line.push('\n');
        line
    }

    fn encode_console(
        &self,
        event: &Event<'_>,
        message: String,
        fields: Map<String, Value>,
    ) -> String {
        let mut line = String::new();
        if self.mode == LogMode::Detail {
            let metadata = event.metadata();
            line.push_str(&Local::now().format(TIMESTAMP_FORMAT).to_string());
            line.push('\t');
            line.push_str(&metadata.level().to_string());
            line.push('\t');
            if let Some(caller) = caller(event) {
                line.push_str(&caller);
                line.push('\t');
            }
        }
        line.push_str(&message);
        if !fields.is_empty() {
            line.push('\t');
            line.push_str(&Value::Object(fields).to_string());
        }
        line.push('\n');
        line
    }
}

fn caller(event: &Event<'_>) -> Option<String> {
    let metadata = event.metadata();
    match (metadata.file(), metadata.line()) {
        (Some(file), Some(line)) => Some(format!("{file}:{line}")),
        (Some(file), None) => Some(file.to_string()),
        _ => None,
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Map<String, Value>,
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.insert(
                field.name().to_string(),
                Value::String(format!("{value:?}")),
            );
        }
    }
}
