//! The leveled logging facade.
//!
//! A [`Logger`] is a cheap-to-clone handle. Its level register, formatter
//! slot, output and hook list are all internally synchronised, so one
//! handle can be shared by every thread and reconfigured at any time.

use std::fmt::Display;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::caller::CallSite;
use crate::formatter::{Formatter, TextFormatter};
use crate::remote::RemoteHook;
use crate::writer::Output;
use crate::{Entry, Error, Fields, Hook, Interrupt, LogConfig, LogLevel, Result};

struct Inner {
    level: AtomicU8,
    formatter: RwLock<Box<dyn Formatter>>,
    output: Option<Output>,
    hooks: RwLock<Vec<Arc<dyn Hook>>>,
    remote: RwLock<Option<Arc<RemoteHook>>>,
}

/// Handle to a configured logger.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    /// Create a logger, optionally forwarding to the remote service and
    /// appending to `log_file`. Empty arguments disable either feature.
    ///
    /// If the logger cannot be set up, a fatal entry describing the
    /// failure is written to stderr and the process exits. Use
    /// [`Logger::try_new`] to handle the error instead.
    pub fn new(remote_token: &str, log_file: impl AsRef<Path>) -> Self {
        match Self::try_new(remote_token, log_file) {
            Ok(logger) => logger,
            Err(e) => fatal_init(e),
        }
    }

    /// Fallible form of [`Logger::new`].
    pub fn try_new(remote_token: &str, log_file: impl AsRef<Path>) -> Result<Self> {
        let mut config = LogConfig::new().with_remote_token(remote_token);
        let log_file = log_file.as_ref();
        if !log_file.as_os_str().is_empty() {
            config = config.with_file(log_file);
        }
        Self::from_config(&config)
    }

    pub fn from_config(config: &LogConfig) -> Result<Self> {
        let output = match &config.file {
            Some(path) if !path.as_os_str().is_empty() => Output::file(path).map_err(|e| {
                Error::Init(format!("failed to open log file {}: {e}", path.display()))
            })?,
            _ => Output::stderr(),
        };

        let logger = Self::assemble(Some(output), config.format.formatter());
        logger.set_log_level(config.level);

        if !config.remote_token.is_empty() {
            #[cfg(feature = "remote")]
            logger.attach_remote(Arc::new(RemoteHook::http(
                &config.remote_token,
                &config.remote,
            )?));
            #[cfg(not(feature = "remote"))]
            return Err(Error::Init(
                "remote forwarding requires the `remote` feature".to_string(),
            ));
        }

        tracing::debug!(
            target: "fieldlog",
            level = %config.level,
            file = ?config.file,
            remote = !config.remote_token.is_empty(),
            "logger initialized"
        );
        Ok(logger)
    }

    /// A logger writing text lines at info level to `output`.
    pub fn with_output(output: Output) -> Self {
        Self::assemble(Some(output), Box::new(TextFormatter::new()))
    }

    /// A logger that writes nothing.
    ///
    /// Level gating still applies, so fatal and panic entries still
    /// return an [`Interrupt`].
    pub fn disabled() -> Self {
        Self::assemble(None, Box::new(TextFormatter::new()))
    }

    fn assemble(output: Option<Output>, formatter: Box<dyn Formatter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                level: AtomicU8::new(LogLevel::Info as u8),
                formatter: RwLock::new(formatter),
                output,
                hooks: RwLock::new(Vec::new()),
                remote: RwLock::new(None),
            }),
        }
    }

    /// Set the threshold. Any level may follow any other.
    pub fn set_log_level(&self, level: LogLevel) {
        self.inner.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_u8(self.inner.level.load(Ordering::Relaxed))
    }

    /// Whether an entry at `level` would be emitted.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.log_level().permits(level)
    }

    pub fn debug_mode(&self) -> &Self {
        self.set_log_level(LogLevel::Debug);
        self
    }

    pub fn info_mode(&self) -> &Self {
        self.set_log_level(LogLevel::Info);
        self
    }

    pub fn error_mode(&self) -> &Self {
        self.set_log_level(LogLevel::Error);
        self
    }

    pub fn fatal_mode(&self) -> &Self {
        self.set_log_level(LogLevel::Fatal);
        self
    }

    /// Replace the active formatter.
    pub fn set_log_formatter(&self, formatter: impl Formatter + 'static) {
        *self
            .inner
            .formatter
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Box::new(formatter);
    }

    pub fn add_hook(&self, hook: Arc<dyn Hook>) {
        self.inner
            .hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hook);
    }

    /// Register `hook` as this logger's remote forwarder.
    pub fn attach_remote(&self, hook: Arc<RemoteHook>) {
        self.add_hook(hook.clone());
        *self
            .inner
            .remote
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Ship everything the remote hook has buffered and wait for it.
    ///
    /// Meant for shutdown paths, e.g. before raising an [`Interrupt`].
    pub fn sync_remote(&self) -> Result<()> {
        let remote = self
            .inner
            .remote
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match remote {
            Some(hook) => hook.sync(),
            None => Ok(()),
        }
    }

    /// Ask every hook to flush. Does not wait.
    pub fn flush_hooks(&self) {
        for hook in self.hooks() {
            hook.flush();
        }
    }

    #[track_caller]
    pub fn debug(&self, msg: impl Display) {
        self.emit(LogLevel::Debug, msg, Fields::new());
    }

    #[track_caller]
    pub fn debug_with_fields(&self, msg: impl Display, fields: Fields) {
        self.emit(LogLevel::Debug, msg, fields);
    }

    #[track_caller]
    pub fn info(&self, msg: impl Display) {
        self.emit(LogLevel::Info, msg, Fields::new());
    }

    #[track_caller]
    pub fn info_with_fields(&self, msg: impl Display, fields: Fields) {
        self.emit(LogLevel::Info, msg, fields);
    }

    #[track_caller]
    pub fn warn(&self, msg: impl Display) {
        self.emit(LogLevel::Warn, msg, Fields::new());
    }

    #[track_caller]
    pub fn warn_with_fields(&self, msg: impl Display, fields: Fields) {
        self.emit(LogLevel::Warn, msg, fields);
    }

    #[track_caller]
    pub fn error(&self, msg: impl Display) {
        self.emit(LogLevel::Error, msg, Fields::new());
    }

    #[track_caller]
    pub fn error_with_fields(&self, msg: impl Display, fields: Fields) {
        self.emit(LogLevel::Error, msg, fields);
    }

    /// Log at fatal level.
    ///
    /// Returns `Err(Interrupt::Fatal)` once the entry is written; the
    /// caller is expected to stop, typically via [`Interrupt::raise`].
    /// Returns `Ok(())` when the threshold suppresses the entry.
    #[track_caller]
    pub fn fatal(&self, msg: impl Display) -> std::result::Result<(), Interrupt> {
        self.emit(LogLevel::Fatal, msg, Fields::new())
            .map_or(Ok(()), |entry| Err(Interrupt::Fatal(entry.message)))
    }

    #[track_caller]
    pub fn fatal_with_fields(
        &self,
        msg: impl Display,
        fields: Fields,
    ) -> std::result::Result<(), Interrupt> {
        self.emit(LogLevel::Fatal, msg, fields)
            .map_or(Ok(()), |entry| Err(Interrupt::Fatal(entry.message)))
    }

    /// Log at panic level. Like [`Logger::fatal`], but asks for an unwind.
    #[track_caller]
    pub fn panic(&self, msg: impl Display) -> std::result::Result<(), Interrupt> {
        self.emit(LogLevel::Panic, msg, Fields::new())
            .map_or(Ok(()), |entry| Err(Interrupt::Panic(entry.message)))
    }

    #[track_caller]
    pub fn panic_with_fields(
        &self,
        msg: impl Display,
        fields: Fields,
    ) -> std::result::Result<(), Interrupt> {
        self.emit(LogLevel::Panic, msg, fields)
            .map_or(Ok(()), |entry| Err(Interrupt::Panic(entry.message)))
    }

    #[track_caller]
    fn emit(&self, level: LogLevel, msg: impl Display, fields: Fields) -> Option<Entry> {
        if !self.is_enabled(level) {
            return None;
        }
        let entry = Entry::new(level, msg.to_string(), fields).with_call_site(&CallSite::caller());
        self.process(&entry);
        Some(entry)
    }

    /// Hand a fully built entry to the hooks and the output.
    ///
    /// Fatal and panic entries skip the hook flush so the emitting
    /// thread never waits on the network before stopping.
    pub(crate) fn process(&self, entry: &Entry) {
        let hooks = self.hooks();
        for hook in hooks.iter().filter(|h| h.accepts(entry.level)) {
            if let Err(e) = hook.fire(entry) {
                tracing::warn!(target: "fieldlog::hook", error = %e, "failed to fire hook");
            }
        }

        self.write(entry);

        if !matches!(entry.level, LogLevel::Fatal | LogLevel::Panic) {
            for hook in &hooks {
                hook.flush();
            }
        }
    }

    fn write(&self, entry: &Entry) {
        let Some(output) = &self.inner.output else {
            return;
        };
        let line = self
            .inner
            .formatter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .format(entry);
        let result = match line {
            Ok(line) => output.write_line(&line).map_err(Error::from),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(target: "fieldlog", error = %e, "failed to write log entry");
        }
    }

    fn hooks(&self) -> Vec<Arc<dyn Hook>> {
        self.inner
            .hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::disabled()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.log_level())
            .field("output", &self.inner.output)
            .finish_non_exhaustive()
    }
}

fn fatal_init(error: Error) -> ! {
    let logger = Logger::with_output(Output::stderr());
    let fields = crate::fields! { "error" => error.to_string() };
    match logger.fatal_with_fields("Failed to initialize logger", fields) {
        Err(interrupt) => interrupt.raise(),
        Ok(()) => std::process::exit(Interrupt::FATAL_EXIT_CODE),
    }
}
