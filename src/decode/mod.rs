//! Response decoder module
//!
//! Every list endpoint answers with a JSON envelope whose `data` array holds
//! the records. The decoder parses the body once and pulls records out of it
//! with a JSONPath expression, keeping the raw envelope around so the
//! paginator can inspect it.

mod decoders;
mod types;

pub use decoders::{JsonDecoder, DEFAULT_RECORDS_PATH};
pub use types::RecordDecoder;

#[cfg(test)]
mod tests;
