use crate::{Entry, LogLevel, Result};

/// A secondary sink that sees every emitted entry at one of its levels.
///
/// Hooks run synchronously on the emitting thread, so `fire` should only
/// buffer. Anything slow belongs in `flush`, which the logger calls after
/// each non-fatal, non-panic emission and never waits on.
pub trait Hook: Send + Sync {
    /// Levels this hook accepts.
    fn levels(&self) -> &[LogLevel];

    fn fire(&self, entry: &Entry) -> Result<()>;

    fn flush(&self) {}

    fn accepts(&self, level: LogLevel) -> bool {
        self.levels().contains(&level)
    }
}
