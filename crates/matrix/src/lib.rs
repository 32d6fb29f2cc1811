//! # Catalog CI Matrix
//!
//! Turns catalog components plus the files changed by a workflow run into a
//! per-component CI configuration matrix.
//!
//! ## Pipeline
//!
//! ```text
//! Catalog entities ──> repository filter (source location, kind Component)
//!     │
//!     ├──> Attribution (changed file ⊂ component path)
//!     │      └─> changed components
//!     │
//!     ├──> Run-tests policy (force / event / ci-sec-changed-only)
//!     │
//!     └──> Toolchain probes (Cargo.toml, go.mod, package.json, slither)
//!            └─> ComponentMatrix
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use catalog_ci_matrix::{build_component_matrix, LocalProbe, MatrixRequest};
//!
//! fn main() -> std::io::Result<()> {
//!     let probe = LocalProbe::current_dir()?;
//!     let request = MatrixRequest {
//!         repo_url: "https://github.com/org/repo",
//!         event_name: Some("pull_request"),
//!         force_all: false,
//!     };
//!     let outcome = build_component_matrix(&[], &[], request, &probe);
//!     println!("{} components", outcome.matrix.len());
//!     Ok(())
//! }
//! ```

mod attribution;
mod builder;
mod error;
mod policy;
mod probe;
mod stats;

pub use attribution::{
    attribute_changes, attribute_entity, inspect_entities, path_contains, Attribution,
    AttributionReport,
};
pub use builder::{
    build_component_matrix, component_config, find_root, has_in_root, has_manifest_upward,
    parse_go_version, slither_args, MatrixOutcome, MatrixRequest, DEFAULT_GO_VERSION,
    DEFAULT_SLITHER_ARGS,
};
pub use error::{MatrixError, Result};
pub use policy::{run_tests_policy, PolicyDecision, PolicyReason, CHANGED_ONLY_TAG, PULL_REQUEST_EVENT};
pub use probe::{FileProbe, LocalProbe, MemoryProbe};
pub use stats::MatrixStats;
