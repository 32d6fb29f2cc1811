//! # Catalog CI Multisig
//!
//! Classifies catalog entities into multisig wallets, signers and access
//! keys, then turns those groups into gauge series for the metrics sink.
//!
//! ```text
//! Entities ──> MultisigsCollector
//!                ├─ multisigs()               ─> backstage.multisigs.version
//!                ├─ signers()                 ─> backstage.signers(.inactive)
//!                ├─ access_keys()             ─> backstage.access-keys
//!                ├─ access_keys_per_signer()  ─┐
//!                ├─ access_keys_per_contract() ├> aggregate_series
//!                └─ deprecated / unknown / multisig / unresolved
//! ```

mod collector;
mod metrics;
mod types;

pub use collector::{
    MultisigsCollector, ACCESS_KEY_TYPE, DEPRECATED, MULTISIG_SPEC_KEY, SIGNER_TYPE,
};
pub use metrics::{
    host_from_catalog_url, is_inactive, SeriesGenerator, ACCESS_KEYS_METRIC, ACCESS_KEY_BATCH,
    AGGREGATE_BATCH, CONTRACT_ACCESS_KEYS_METRIC, DEPRECATED_ACCESS_KEYS_METRIC,
    INACTIVE_AFTER_SECS, INACTIVE_SIGNERS_METRIC, MULTISIG_ACCESS_KEYS_METRIC, MULTISIG_BATCH,
    MULTISIG_VERSION_METRIC, SIGNERS_METRIC, SIGNER_ACCESS_KEYS_METRIC, SIGNER_BATCH,
    UNKNOWN_ACCESS_KEYS_METRIC, UNRESOLVED_METRIC,
};
pub use types::{
    parse_timestamp, parse_version, AccessKey, Multisig, Signer, SignerKeys, UnresolvedCounts,
    UNKNOWN, USER_KIND,
};
