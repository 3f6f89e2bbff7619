//! Output module
//!
//! Writes Singer messages as JSON lines.
//!
//! # Overview
//!
//! - `MessageSink` - Destination for messages produced by a sync
//! - `JsonLinesWriter` - One JSON document per line, stdout by default
//! - `MemorySink` - Collects messages in memory

mod writer;

pub use writer::{JsonLinesWriter, MemorySink, MessageSink};
