use time::OffsetDateTime;

use crate::caller::CallSite;
use crate::{FieldValue, Fields, LogLevel};

/// Reserved field holding the `<basename>:<line>` of the call site.
pub const FILE_KEY: &str = "file";

/// One log entry, built per emission and dropped once every sink has seen it.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub time: OffsetDateTime,
    pub level: LogLevel,
    pub message: String,
    pub fields: Fields,
}

impl Entry {
    pub fn new(level: LogLevel, message: impl Into<String>, fields: Fields) -> Self {
        Self {
            time: OffsetDateTime::now_utc(),
            level,
            message: message.into(),
            fields,
        }
    }

    /// Attach the call site under [`FILE_KEY`], overriding any caller value.
    pub fn with_call_site(mut self, site: &CallSite) -> Self {
        self.fields.insert(FILE_KEY, site.to_string());
        self
    }

    /// The injected call site, if any.
    pub fn file(&self) -> Option<&str> {
        match self.fields.get(FILE_KEY) {
            Some(FieldValue::String(s)) => Some(s),
            _ => None,
        }
    }
}
