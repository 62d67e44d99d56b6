//! Line formatters for entries.
//!
//! Both built-in formatters produce exactly one `\n`-terminated line per
//! entry so the output stays greppable and append-only. Fields that
//! collide with `time`, `level` or `msg` are written as `fields.<key>`
//! so they can never pass for the entry's own keys.

use std::borrow::Cow;

use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;

use crate::{Entry, Result};

/// Turns an entry into the bytes written to the output.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &Entry) -> Result<Vec<u8>>;
}

/// `key=value` text lines: `time`, `level` and `msg` first, then fields in key order.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    pub disable_timestamp: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.disable_timestamp = !enabled;
        self
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &Entry) -> Result<Vec<u8>> {
        let mut line = String::with_capacity(128);
        if !self.disable_timestamp {
            append_pair(&mut line, "time", &entry.time.format(&Rfc3339)?);
        }
        append_pair(&mut line, "level", entry.level.as_str());
        append_pair(&mut line, "msg", &entry.message);
        for (key, value) in entry.fields.iter() {
            append_pair(&mut line, &field_key(key), &value.to_string());
        }
        line.push('\n');
        Ok(line.into_bytes())
    }
}

fn append_pair(line: &mut String, key: &str, value: &str) {
    if !line.is_empty() {
        line.push(' ');
    }
    if needs_quoting(key) {
        line.push_str(&format!("{key:?}"));
    } else {
        line.push_str(key);
    }
    line.push('=');
    if needs_quoting(value) {
        line.push_str(&format!("{value:?}"));
    } else {
        line.push_str(value);
    }
}

const RESERVED_KEYS: [&str; 3] = ["time", "level", "msg"];

fn field_key(key: &str) -> Cow<'_, str> {
    if RESERVED_KEYS.contains(&key) {
        Cow::Owned(format!("fields.{key}"))
    } else {
        Cow::Borrowed(key)
    }
}

fn needs_quoting(value: &str) -> bool {
    !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
}

/// One JSON object per line.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pub disable_timestamp: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.disable_timestamp = !enabled;
        self
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &Entry) -> Result<Vec<u8>> {
        let mut object = Map::with_capacity(entry.fields.len() + 3);
        for (key, value) in entry.fields.iter() {
            object.insert(field_key(key).into_owned(), serde_json::to_value(value)?);
        }
        if !self.disable_timestamp {
            object.insert("time".into(), Value::String(entry.time.format(&Rfc3339)?));
        }
        object.insert("level".into(), Value::String(entry.level.as_str().into()));
        object.insert("msg".into(), Value::String(entry.message.clone()));

        let mut bytes = serde_json::to_vec(&Value::Object(object))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
