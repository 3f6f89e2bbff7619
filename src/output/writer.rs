//! Message sinks

use crate::engine::Message;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use std::io::{self, Stdout, Write};

/// Destination for Singer messages
pub trait MessageSink {
    /// Write one message
    fn write(&mut self, message: &Message) -> Result<()>;

    /// Flush buffered output
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes each message as one line of JSON
#[derive(Debug)]
pub struct JsonLinesWriter<W: Write> {
    out: W,
    written: usize,
}

impl JsonLinesWriter<Stdout> {
    /// Write to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesWriter<W> {
    /// Wrap a writer
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Number of messages written
    pub fn written(&self) -> usize {
        self.written
    }

    /// Recover the inner writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MessageSink for JsonLinesWriter<W> {
    fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)
            .map_err(|e| Error::output(format!("Failed to serialize message: {e}")))?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps every message in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Messages in write order
    pub messages: Vec<Message>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records written for one stream, in order
    pub fn records_for(&self, stream: &str) -> Vec<&JsonObject> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Record {
                    stream: s, record, ..
                } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Schema written for one stream
    pub fn schema_for(&self, stream: &str) -> Option<&JsonValue> {
        self.messages.iter().find_map(|m| match m {
            Message::Schema {
                stream: s, schema, ..
            } if s == stream => Some(schema),
            _ => None,
        })
    }

    /// Names of the streams that received a schema, in order
    pub fn streams(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.is_schema())
            .map(Message::stream)
            .collect()
    }
}

impl MessageSink for MemorySink {
    fn write(&mut self, message: &Message) -> Result<()> {
        self.messages.push(message.clone());
        Ok(())
    }
}
