//! # Fieldlog
//!
//! A leveled logging facade with structured fields.
//!
//! ## Features
//!
//! - Six levels, from `panic` to `debug`, gated by one threshold
//! - Per-entry structured fields plus the caller's `file:line`
//! - Text or JSON lines on stderr or appended to a file
//! - Optional forwarding to a hosted log-aggregation service
//! - A `tracing` layer that routes `tracing` events through the same logger
//!
//! ## Example
//!
//! ```rust
//! use fieldlog::{fields, Logger};
//!
//! let logger = Logger::try_new("", "")?;
//! logger
//!     .info_mode()
//!     .info_with_fields("payment failed", fields! { "req" => "", "status" => 502 });
//!
//! if let Err(interrupt) = logger.fatal("cannot continue") {
//!     // a real program would call `interrupt.raise()` here
//!     assert_eq!(interrupt.message(), "cannot continue");
//! }
//! # Ok::<(), fieldlog::Error>(())
//! ```

pub mod builder;
pub mod caller;
pub mod config;
pub mod entry;
pub mod error;
pub mod fields;
pub mod formatter;
pub mod global;
pub mod hook;
pub mod layer;
pub mod level;
pub mod logger;
pub mod remote;
pub mod writer;

pub use builder::LogBuilder;
pub use config::{LogConfig, LogFormat, RemoteConfig};
pub use entry::Entry;
pub use error::{Error, Interrupt, Result};
pub use fields::{FieldValue, Fields};
pub use formatter::{Formatter, JsonFormatter, TextFormatter};
pub use hook::Hook;
pub use layer::FacadeLayer;
pub use level::LogLevel;
pub use logger::Logger;
#[cfg(feature = "remote")]
pub use remote::HttpTransport;
pub use remote::{RemoteHook, Transport};
pub use writer::{Output, SharedBuffer};

/// Start building a logger.
pub fn builder() -> LogBuilder {
    LogBuilder::new()
}
