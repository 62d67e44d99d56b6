use thiserror::Error as ThisError;

/// Errors that can occur in the logging library
#[derive(ThisError, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Initialization failed.
    #[error("Initialization error: {0}")]
    Init(String),
    /// An entry could not be serialized.
    #[error("Format error: {0}")]
    Format(#[from] serde_json::Error),
    /// A timestamp could not be rendered.
    #[error("Time error: {0}")]
    Time(#[from] time::error::Format),
    /// Shipping entries to the remote service failed.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Control-flow interruption requested by a fatal or panic entry.
///
/// The entry has already been written when this is returned. Whoever
/// receives it decides when to act on it, usually by propagating it to
/// `main` and calling [`Interrupt::raise`].
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[must_use = "a fatal or panic entry asks the caller to stop"]
pub enum Interrupt {
    /// The process should exit.
    #[error("fatal: {0}")]
    Fatal(String),
    /// The current thread should unwind.
    #[error("panic: {0}")]
    Panic(String),
}

impl Interrupt {
    /// The message of the entry that raised the interruption.
    pub fn message(&self) -> &str {
        match self {
            Interrupt::Fatal(msg) | Interrupt::Panic(msg) => msg,
        }
    }

    /// Exit status used for a fatal interruption.
    pub const FATAL_EXIT_CODE: i32 = 1;

    /// Act on the interruption: exit the process for `Fatal`, unwind for `Panic`.
    pub fn raise(self) -> ! {
        match self {
            Interrupt::Fatal(_) => std::process::exit(Self::FATAL_EXIT_CODE),
            Interrupt::Panic(msg) => std::panic::panic_any(msg),
        }
    }
}
