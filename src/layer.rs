//! A [`tracing_subscriber::Layer`] that feeds `tracing` events into a [`Logger`].
//!
//! ```rust
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let logger = fieldlog::Logger::disabled();
//! let subscriber = tracing_subscriber::registry().with(fieldlog::FacadeLayer::new(logger));
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::info!(user = "bob", "signed in");
//! });
//! ```

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::caller::CallSite;
use crate::{Entry, FieldValue, Fields, LogLevel, Logger};

/// Forwards every `tracing` event to a [`Logger`].
///
/// TRACE and DEBUG map to debug, ERROR to error. The logger's own
/// threshold still applies, and events never interrupt control flow.
/// Events from this crate, from the HTTP stack the remote hook ships
/// through, and from the threads doing that shipping are dropped:
/// turning them into entries would make every shipment schedule another.
#[derive(Debug, Clone)]
pub struct FacadeLayer {
    logger: Logger,
}

impl FacadeLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

/// Crates whose events are raised while shipping entries.
const SHIPPING_TARGETS: [&str; 10] = [
    "fieldlog",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
    "tokio_rustls",
    "tokio",
    "want",
    "mio",
];

/// Threads that only ever run the remote transport. The second one is
/// spawned by `reqwest::blocking` to drive its runtime.
const SHIPPING_THREADS: [&str; 2] = [
    crate::remote::WORKER_THREAD,
    "reqwest-internal-sync-runtime",
];

fn is_internal(target: &str) -> bool {
    SHIPPING_TARGETS.iter().any(|crate_name| {
        target
            .strip_prefix(crate_name)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

fn on_shipping_thread() -> bool {
    std::thread::current()
        .name()
        .is_some_and(|name| SHIPPING_THREADS.contains(&name))
}

impl<S: Subscriber> Layer<S> for FacadeLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_internal(metadata.target()) || on_shipping_thread() {
            return;
        }
        let level = LogLevel::from(metadata.level());
        if !self.logger.is_enabled(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let site = CallSite::from_parts(metadata.file(), metadata.line());
        let entry = Entry::new(level, visitor.message.unwrap_or_default(), visitor.fields)
            .with_call_site(&site);
        self.logger.process(&entry);
    }
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Fields,
}

impl EventVisitor {
    fn put(&mut self, field: &Field, value: FieldValue) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name(), value);
        }
    }
}

impl Visit for EventVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, FieldValue::String(format!("{value:?}")));
    }
}
