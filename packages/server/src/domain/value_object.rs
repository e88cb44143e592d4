//! Value objects of the broadcast domain.

use std::fmt;

use uuid::Uuid;

/// Identity of one accepted connection.
///
/// Two handles are the same connection if and only if their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Generates fresh connection ids.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        // v4 UUIDs carry version bits, so they are never nil
        ConnectionId(Uuid::new_v4())
    }
}

/// One operator line, sent verbatim as a text frame.
///
/// Any UTF-8 string is accepted, including the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage(String);

impl OutboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Build a message from a raw input line, dropping the line terminator only.
    pub fn from_line(line: &str) -> Self {
        let text = line
            .strip_suffix('\n')
            .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
            .unwrap_or(line);
        Self(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
