//! Seams to the outside world: where entities come from, where changed files
//! come from and where metric batches go.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use catalog_ci_model::{entities_from_json, Entity};
use catalog_ci_protocol::MetricBatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub backstage_url: String,
    /// Repository holding exported entity definitions, when the catalog is
    /// mirrored there instead of served live.
    pub entities_repo: Option<String>,
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_entities(&self, query: &CatalogQuery) -> anyhow::Result<Vec<Entity>>;
}

/// Catalog export on disk (`{"items": [...]}` or a bare array).
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn fetch_entities(&self, query: &CatalogQuery) -> anyhow::Result<Vec<Entity>> {
        log::debug!(
            "Reading catalog export {} for {}",
            self.path.display(),
            query.backstage_url
        );
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(entities_from_json(&raw)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    /// Parse `owner/repo`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (owner, repo) = raw.trim().trim_matches('/').split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

/// File entry as reported by the code host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFileChange {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub patch: Option<String>,
}

#[async_trait]
pub trait ChangeProvider: Send + Sync {
    async fn compare_commits(
        &self,
        repo: &RepositoryRef,
        base: &str,
        head: &str,
    ) -> anyhow::Result<Vec<RawFileChange>>;

    async fn pull_request_files(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> anyhow::Result<Vec<RawFileChange>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub batch: String,
    pub accepted: usize,
}

#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn submit(&self, batch: &MetricBatch) -> anyhow::Result<SubmitReceipt>;
}
