//! Stream definitions
//!
//! Each stream is a declarative [`StreamDefinition`]: where its records live,
//! where its schema lives in the OpenAPI document, which stream it hangs off
//! and the optional hooks that shape its records and its children's context.
//! The fixed catalog of PlanetScale resources lives in [`registry`].

pub mod registry;
mod types;

pub use registry::{find, registry, BACKUPS_SPEC_PATH};
pub use types::{ChildContextFn, PostProcessFn, StreamDefinition};
