//! # Catalog CI Runner
//!
//! Wires the catalog, the code host and the metrics backend into the two
//! workflow runs:
//!
//! ```text
//! RunConfig (env) ──> CatalogSource ──> entities
//!     │                                    │
//!     ├─ ChangeProvider ─> changed files ──┴─> build_component_matrix ─> step output
//!     │
//!     └─ entities ─> MultisigsCollector ─> SeriesGenerator ─> MetricsSink (4 batches, concurrent)
//! ```
//!
//! Network clients live behind the traits in [`sources`]; this crate ships a
//! file-backed catalog and leaves the rest to the embedding binary.

mod changes;
mod config;
mod error;
mod run;
pub mod sources;

pub use changes::{fetch_changed_files, EventContext, PUSH_EVENT};
pub use config::{is_truthy, RunConfig, DEFAULT_SERVER_URL};
pub use error::{Result, RunnerError};
pub use run::{
    append_output, format_output, generate_component_matrix, publish_multisig_metrics, unix_now,
    BatchOutcome, PublishReport, MATRIX_OUTPUT,
};
pub use sources::{
    CatalogQuery, CatalogSource, ChangeProvider, JsonFileCatalog, MetricsSink, RawFileChange,
    RepositoryRef, SubmitReceipt,
};
