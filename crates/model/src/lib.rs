//! # Catalog CI Model
//!
//! Shared data shapes for catalog-driven CI: catalog entities, the accessors
//! the rest of the workspace relies on, entity references and changed files.
//!
//! ```text
//! catalog JSON ──> Entity
//!                   ├─ source location  ─> relative path / directory
//!                   ├─ annotations      ─> security tier
//!                   ├─ spec.owner       ─> EntityRef (kind:namespace/name)
//!                   └─ tags / namespace ─> stub, ci-sec-* flags
//! ```

mod changes;
mod entity;
mod error;
mod reference;

pub use changes::{ChangeType, ChangedFile};
pub use entity::{
    entities_from_json, Entity, EntityMetadata, CI_SEC_DISABLE_TAG, NO_SECURITY_TIER,
    SECURITY_TIER_ANNOTATION, SOURCE_LOCATION_ANNOTATION, STUB_NAMESPACE,
};
pub use error::{ModelError, Result};
pub use reference::{owner_reference, EntityRef, DEFAULT_NAMESPACE};
