//! Shipping entries to a hosted log-aggregation service.
//!
//! [`RemoteHook`] buffers each accepted entry as one JSON object and a
//! background worker posts the buffer as newline-delimited JSON to the
//! bulk endpoint, `<endpoint><token>/tag/<tags>/`. The worker drains on
//! explicit flushes, when the buffer fills up, and on a fixed interval.

use std::mem;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;

use crate::config::RemoteConfig;
use crate::{Entry, Error, Hook, LogLevel, Result};

/// Levels forwarded to the remote service. Panic entries never are.
pub const REMOTE_LEVELS: [LogLevel; 5] = [
    LogLevel::Debug,
    LogLevel::Info,
    LogLevel::Warn,
    LogLevel::Error,
    LogLevel::Fatal,
];

/// Name of the background thread that ships entries.
pub(crate) const WORKER_THREAD: &str = "fieldlog-remote";

/// Delivers one batch body to the service.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, url: &str, body: String) -> Result<()>;
}

/// HTTPS transport backed by a blocking `reqwest` client.
///
/// The client is built on first use, inside the worker thread.
#[cfg(feature = "remote")]
#[derive(Debug, Default)]
pub struct HttpTransport {
    client: once_cell::sync::OnceCell<reqwest::blocking::Client>,
    timeout: Option<Duration>,
}

#[cfg(feature = "remote")]
impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(feature = "remote")]
impl Transport for HttpTransport {
    fn send(&self, url: &str, body: String) -> Result<()> {
        let client = self
            .client
            .get_or_try_init(|| {
                let mut builder = reqwest::blocking::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()
            })
            .map_err(|e| Error::Transport(e.to_string()))?;

        let response = client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!(
                "remote log service returned status {status}"
            )));
        }
        Ok(())
    }
}

enum Command {
    Flush,
}

struct Shared {
    url: String,
    transport: Box<dyn Transport>,
    buffer: Mutex<Vec<String>>,
}

impl Shared {
    fn take_pending(&self) -> Vec<String> {
        mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn ship(&self) -> Result<()> {
        let pending = self.take_pending();
        if pending.is_empty() {
            return Ok(());
        }
        tracing::trace!(target: "fieldlog::remote", entries = pending.len(), "shipping log entries");
        let body = pending.join("\n");
        // The transport's own diagnostics must not become entries to ship.
        tracing::dispatcher::with_default(&tracing::Dispatch::none(), || {
            self.transport.send(&self.url, body)
        })
    }

    fn ship_logged(&self) {
        if let Err(e) = self.ship() {
            tracing::warn!(target: "fieldlog::remote", error = %e, "failed to ship log entries");
        }
    }
}

/// Buffering hook that forwards entries to a hosted log service.
pub struct RemoteHook {
    shared: Arc<Shared>,
    commands: Sender<Command>,
    buffer_size: usize,
}

impl RemoteHook {
    /// Create a hook posting through `transport`.
    ///
    /// Spawns the background worker; it exits once the hook is dropped,
    /// after a final drain.
    pub fn new(token: &str, config: &RemoteConfig, transport: impl Transport) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Config("remote token must not be empty".to_string()));
        }
        let shared = Arc::new(Shared {
            url: bulk_url(&config.endpoint, token, &config.tags),
            transport: Box::new(transport),
            buffer: Mutex::new(Vec::new()),
        });

        let (commands, receiver) = mpsc::channel();
        let interval = Duration::from_secs(config.flush_interval_secs.max(1));
        let worker_shared = Arc::clone(&shared);
        std::thread::Builder::new()
            .name(WORKER_THREAD.to_string())
            .spawn(move || {
                loop {
                    match receiver.recv_timeout(interval) {
                        Ok(Command::Flush) | Err(RecvTimeoutError::Timeout) => {
                            worker_shared.ship_logged();
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            worker_shared.ship_logged();
                            break;
                        }
                    }
                }
                tracing::debug!(target: "fieldlog::remote", "remote worker stopped");
            })?;

        Ok(Self {
            shared,
            commands,
            buffer_size: config.buffer_size.max(1),
        })
    }

    /// Create a hook posting over HTTPS.
    #[cfg(feature = "remote")]
    pub fn http(token: &str, config: &RemoteConfig) -> Result<Self> {
        let mut transport = HttpTransport::new();
        if let Some(timeout) = config.timeout() {
            transport = transport.with_timeout(timeout);
        }
        Self::new(token, config, transport)
    }

    /// The bulk URL entries are posted to.
    pub fn url(&self) -> &str {
        &self.shared.url
    }

    /// Number of entries waiting to be shipped.
    pub fn pending(&self) -> usize {
        self.shared
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Ship everything pending on the calling thread and report the outcome.
    pub fn sync(&self) -> Result<()> {
        self.shared.ship()
    }

    fn request_flush(&self) {
        // The worker only goes away with the hook itself.
        let _ = self.commands.send(Command::Flush);
    }
}

impl Hook for RemoteHook {
    fn levels(&self) -> &[LogLevel] {
        &REMOTE_LEVELS
    }

    fn fire(&self, entry: &Entry) -> Result<()> {
        let record = render(entry)?;
        let full = {
            let mut buffer = self
                .shared
                .buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            buffer.push(record);
            buffer.len() >= self.buffer_size
        };
        if full {
            self.request_flush();
        }
        Ok(())
    }

    fn flush(&self) {
        self.request_flush();
    }
}

impl std::fmt::Debug for RemoteHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteHook")
            .field("url", &self.shared.url)
            .field("buffer_size", &self.buffer_size)
            .finish_non_exhaustive()
    }
}

fn bulk_url(endpoint: &str, token: &str, tags: &[String]) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if tags.is_empty() {
        format!("{endpoint}/{token}/")
    } else {
        format!("{endpoint}/{token}/tag/{}/", tags.join(","))
    }
}

const RESERVED_KEYS: [&str; 3] = ["timestamp", "level", "message"];

fn render(entry: &Entry) -> Result<String> {
    let mut record = Map::with_capacity(entry.fields.len() + 3);
    for (key, value) in entry.fields.iter() {
        let key = if RESERVED_KEYS.contains(&key) {
            format!("fields.{key}")
        } else {
            key.to_string()
        };
        record.insert(key, serde_json::to_value(value)?);
    }
    record.insert(
        "timestamp".into(),
        Value::String(entry.time.format(&Rfc3339)?),
    );
    record.insert("level".into(), Value::String(entry.level.as_str().into()));
    record.insert("message".into(), Value::String(entry.message.clone()));
    Ok(serde_json::to_string(&Value::Object(record))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fields;
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct MemoryTransport {
        sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl MemoryTransport {
        fn batches(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }

        fn wait_for(&self, count: usize) -> Vec<(String, String)> {
            let deadline = Instant::now() + Duration::from_secs(5);
            while Instant::now() < deadline {
                let batches = self.batches();
                if batches.len() >= count {
                    return batches;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            self.batches()
        }
    }

    impl Transport for MemoryTransport {
        fn send(&self, url: &str, body: String) -> Result<()> {
            self.sent.lock().unwrap().push((url.to_string(), body));
            Ok(())
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn send(&self, _url: &str, _body: String) -> Result<()> {
            Err(Error::Transport("connection refused".to_string()))
        }
    }

    fn config() -> RemoteConfig {
        RemoteConfig {
            flush_interval_secs: 3600,
            ..RemoteConfig::default()
        }
    }

    fn entry(message: &str) -> Entry {
        Entry::new(LogLevel::Info, message, Fields::new().with("file", "x.rs:3"))
    }

    #[test]
    fn test_bulk_url() {
        let tags = vec!["rust".to_string(), "fieldlog".to_string()];
        assert_eq!(
            bulk_url("https://logs-01.loggly.com/bulk/", "tok", &tags),
            "https://logs-01.loggly.com/bulk/tok/tag/rust,fieldlog/"
        );
        assert_eq!(bulk_url("http://h/bulk", "tok", &[]), "http://h/bulk/tok/");
    }

    #[test]
    fn test_render_keeps_colliding_fields() {
        let fields = crate::fields! { "message" => "user data", "level" => 3, "order" => 9 };
        let record: Value =
            serde_json::from_str(&render(&Entry::new(LogLevel::Warn, "real", fields)).unwrap())
                .unwrap();
        assert_eq!(record["message"], "real");
        assert_eq!(record["level"], "warning");
        assert_eq!(record["fields.message"], "user data");
        assert_eq!(record["fields.level"], 3);
        assert_eq!(record["order"], 9);
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = RemoteHook::new("", &config(), MemoryTransport::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_levels_exclude_panic() {
        let hook = RemoteHook::new("tok", &config(), MemoryTransport::default()).unwrap();
        assert!(hook.accepts(LogLevel::Fatal));
        assert!(hook.accepts(LogLevel::Debug));
        assert!(!hook.accepts(LogLevel::Panic));
    }

    #[test]
    fn test_sync_ships_newline_delimited_batch() {
        let transport = MemoryTransport::default();
        let hook = RemoteHook::new("tok", &config(), transport.clone()).unwrap();
        hook.fire(&entry("one")).unwrap();
        hook.fire(&entry("two")).unwrap();
        assert_eq!(hook.pending(), 2);

        hook.sync().unwrap();
        assert_eq!(hook.pending(), 0);

        let batches = transport.batches();
        assert_eq!(batches.len(), 1);
        let (url, body) = &batches[0];
        assert!(url.ends_with("/tok/tag/rust,fieldlog/"), "{url}");
        let records: Vec<Value> = body
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["message"], "one");
        assert_eq!(records[1]["level"], "info");
        assert_eq!(records[1]["file"], "x.rs:3");
        assert!(records[0]["timestamp"].is_string());
    }

    #[test]
    fn test_sync_with_nothing_pending_sends_nothing() {
        let transport = MemoryTransport::default();
        let hook = RemoteHook::new("tok", &config(), transport.clone()).unwrap();
        hook.sync().unwrap();
        assert!(transport.batches().is_empty());
    }

    #[test]
    fn test_flush_ships_in_background() {
        let transport = MemoryTransport::default();
        let hook = RemoteHook::new("tok", &config(), transport.clone()).unwrap();
        hook.fire(&entry("async")).unwrap();
        hook.flush();
        let batches = transport.wait_for(1);
        assert_eq!(batches.len(), 1);
        assert!(batches[0].1.contains("async"));
    }

    #[test]
    fn test_full_buffer_triggers_flush() {
        let transport = MemoryTransport::default();
        let cfg = RemoteConfig {
            buffer_size: 2,
            ..config()
        };
        let hook = RemoteHook::new("tok", &cfg, transport.clone()).unwrap();
        hook.fire(&entry("a")).unwrap();
        hook.fire(&entry("b")).unwrap();
        let batches = transport.wait_for(1);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].1.lines().count(), 2);
    }

    #[test]
    fn test_drop_drains_pending() {
        let transport = MemoryTransport::default();
        let hook = RemoteHook::new("tok", &config(), transport.clone()).unwrap();
        hook.fire(&entry("last words")).unwrap();
        drop(hook);
        let batches = transport.wait_for(1);
        assert_eq!(batches.len(), 1);
        assert!(batches[0].1.contains("last words"));
    }

    #[test]
    fn test_transport_failure_is_reported_by_sync_only() {
        let hook = RemoteHook::new("tok", &config(), FailingTransport).unwrap();
        hook.fire(&entry("lost")).unwrap();
        assert!(matches!(hook.sync(), Err(Error::Transport(_))));
        hook.fire(&entry("lost again")).unwrap();
        hook.flush();
    }
}
