// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-planetscale
//!
//! A Singer tap for the PlanetScale management API.
//!
//! Every stream's record schema comes from the published OpenAPI document;
//! records are read by walking page-numbered, parent/child nested REST
//! resources with an authenticated client.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_planetscale::{output::JsonLinesWriter, Tap, TapConfig};
//!
//! #[tokio::main]
//! async fn main() -> tap_planetscale::Result<()> {
//!     let tap = Tap::new(TapConfig::new("service-token-id", "service-token"))?;
//!
//!     tap.check().await?;
//!     let catalog = tap.catalog(false).await?;
//!
//!     let mut out = JsonLinesWriter::stdout();
//!     tap.sync(Some(vec!["branches".into()]), &mut out).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             Tap                                 │
//! │  check()    catalog() → Catalog    sync(selection) → SyncStats  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Schema  │   HTTP    │   Paginate    │  Streams  │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ OpenAPI  │ API key   │ Page number   │ Registry  │ SCHEMA      │
//! │ $ref     │ Retry     │ next_page     │ Context   │ RECORD      │
//! │ Memo     │ Rate Limit│ Empty page    │ Hooks     │ JSON lines  │
//! │ Validate │ Backoff   │               │           │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication implementations
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Response decoders
pub mod decode;

/// Singer message output
pub mod output;

/// Main execution engine
pub mod engine;

/// Configuration and catalog types
pub mod config;

/// Path template rendering
pub mod template;

/// Command-line interface
pub mod cli;

/// OpenAPI schema resolution and record validation
pub mod schema;

/// Stream definitions and the PlanetScale registry
pub mod streams;

/// The tap entry point
pub mod tap;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{Catalog, TapConfig};
pub use error::{Error, Result};
pub use tap::Tap;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
