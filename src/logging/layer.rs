//! Bridge from `tracing` events into a [`Logger`]
//!
//! Lets code that already uses `tracing::info!` and friends write through the
//! same sinks as direct `Logger` calls.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

use super::logger::Logger;
use super::record::{render_error_chain, LogLevel, LogRecord};

/// A `tracing_subscriber` layer writing events to a shared logger
///
/// Level filtering happens in `on_event`, so layers stacked next to this one
/// still see every event the logger itself would skip.
pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = LogLevel::from(*event.metadata().level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let record = LogRecord::new(level, visitor.message());
        let record = match visitor.error {
            Some(detail) => record.with_detail(detail),
            None => record,
        };
        self.logger.log(&record);
    }
}

/// Collects the message, an `error` field, and remaining fields of an event
#[derive(Default)]
struct EventVisitor {
    message: String,
    error: Option<String>,
    fields: Vec<String>,
}

impl EventVisitor {
    fn message(&self) -> String {
        if self.fields.is_empty() {
            return self.message.clone();
        }
        let fields = self.fields.join(" ");
        if self.message.is_empty() {
            fields
        } else {
            format!("{} {}", self.message, fields)
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "error" => self.error = Some(value.to_string()),
            name => self.fields.push(format!("{}={}", name, value)),
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        match field.name() {
            "error" => self.error = Some(render_error_chain(value)),
            name => self.fields.push(format!("{}={}", name, value)),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "error" => self.error = Some(format!("{:?}", value)),
            name => self.fields.push(format!("{}={:?}", name, value)),
        }
    }
}

/// Install a [`LoggerLayer`] as the global `tracing` subscriber
///
/// `RUST_LOG` can narrow which targets are forwarded; the logger's own
/// levels still apply on top of it.
pub fn init_tracing(logger: Arc<Logger>) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(LoggerLayer::new(logger))
        .try_init()
}
