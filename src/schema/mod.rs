//! Schema resolution module
//!
//! Record schemas come from the published OpenAPI (Swagger 2.0) document
//! rather than from inspecting responses.
//!
//! # Features
//!
//! - **Document Source**: Loads the document once from a URL or a local file
//! - **Key Resolution**: Maps `(path, method, status)` to the list-item schema
//! - **Reference Inlining**: Local `#/definitions/...` references are expanded
//! - **Memoization**: Each key is resolved at most once per source
//! - **Record Validation**: Records are checked against their schema and
//!   discrepancies are reported, with known ones waived

mod provider;
mod source;
mod types;
mod validation;

pub use provider::SchemaProvider;
pub use source::{OpenApiSource, TypeOverride};
pub use types::{Discrepancy, DiscrepancyKind, SchemaKey, SchemaWaivers};
pub use validation::RecordValidator;
