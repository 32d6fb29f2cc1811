//! The two end-to-end runs: component matrix generation and multisig metric
//! publication.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use catalog_ci_matrix::{build_component_matrix, FileProbe, MatrixOutcome, MatrixRequest};
use catalog_ci_model::Entity;
use catalog_ci_multisig::{MultisigsCollector, SeriesGenerator};
use catalog_ci_protocol::{ComponentMatrix, MetricBatch};

use crate::changes::{fetch_changed_files, EventContext};
use crate::config::RunConfig;
use crate::error::{Result, RunnerError};
use crate::sources::{
    CatalogQuery, CatalogSource, ChangeProvider, MetricsSink, RepositoryRef, SubmitReceipt,
};

pub const MATRIX_OUTPUT: &str = "matrix";

pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

async fn load_entities(config: &RunConfig, catalog: &dyn CatalogSource) -> Result<Vec<Entity>> {
    let query = CatalogQuery {
        backstage_url: config.require_backstage_url()?.to_string(),
        entities_repo: config.entities_repo.clone(),
    };
    let entities = catalog
        .fetch_entities(&query)
        .await
        .map_err(RunnerError::Catalog)?;
    log::info!("Fetched {} catalog entities", entities.len());
    Ok(entities)
}

async fn event_context(config: &RunConfig) -> Result<EventContext> {
    let repository = config.repository.as_deref().and_then(RepositoryRef::parse);
    match config.event_path.as_deref() {
        Some(path) => {
            EventContext::from_event_file(config.event_name.as_deref(), repository, path).await
        }
        None => Ok(EventContext {
            event_name: config.event_name.clone(),
            repository,
            ..EventContext::default()
        }),
    }
}

pub async fn generate_component_matrix(
    config: &RunConfig,
    catalog: &dyn CatalogSource,
    changes: &dyn ChangeProvider,
    probe: &dyn FileProbe,
) -> Result<MatrixOutcome> {
    let entities = load_entities(config, catalog).await?;
    let repo_url = config
        .repository_url()
        .ok_or(RunnerError::MissingConfig("GITHUB_REPOSITORY"))?;

    let event = event_context(config).await?;
    let changed_files = fetch_changed_files(changes, &event).await?;

    let request = MatrixRequest {
        repo_url: &repo_url,
        event_name: config.event_name.as_deref(),
        force_all: config.force_all_checks,
    };
    let outcome = build_component_matrix(&entities, &changed_files, request, probe);
    log::info!(
        "Matrix ready: {} components, {} changed, {} scheduled",
        outcome.stats.components,
        outcome.stats.changed,
        outcome.stats.scheduled
    );
    Ok(outcome)
}

/// `name=value` line for the step outputs file.
pub fn format_output(name: &str, matrix: &ComponentMatrix) -> Result<String> {
    Ok(format!("{name}={}\n", serde_json::to_string(matrix)?))
}

pub async fn append_output(path: &Path, name: &str, matrix: &ComponentMatrix) -> Result<()> {
    let line = format_output(name, matrix)?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub name: String,
    pub points: usize,
    pub result: std::result::Result<SubmitReceipt, RunnerError>,
}

#[derive(Debug, Default)]
pub struct PublishReport {
    pub batches: Vec<BatchOutcome>,
}

impl PublishReport {
    pub fn succeeded(&self) -> Vec<&str> {
        self.batches
            .iter()
            .filter(|b| b.result.is_ok())
            .map(|b| b.name.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<&str> {
        self.batches
            .iter()
            .filter(|b| b.result.is_err())
            .map(|b| b.name.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.batches.iter().all(|b| b.result.is_ok())
    }
}

async fn submit(sink: &dyn MetricsSink, batch: MetricBatch) -> BatchOutcome {
    match serde_json::to_string(&batch) {
        Ok(body) => log::debug!("Data to upload: {body}"),
        Err(err) => log::debug!("Data to upload: <unserializable batch {}: {err}>", batch.name),
    }
    let result = sink.submit(&batch).await.map_err(|err| {
        log::error!("Submitting {} failed: {err:#}", batch.name);
        RunnerError::Sink(format!("{}: {err:#}", batch.name))
    });
    if let Ok(receipt) = &result {
        log::info!("Submitted {}: {} points accepted", receipt.batch, receipt.accepted);
    }
    BatchOutcome {
        name: batch.name,
        points: batch.series.len(),
        result,
    }
}

/// Classify the catalog and submit every batch concurrently. A failing
/// batch is logged and reported; the others still go out.
pub async fn publish_multisig_metrics(
    config: &RunConfig,
    catalog: &dyn CatalogSource,
    sink: &dyn MetricsSink,
    now: i64,
) -> Result<PublishReport> {
    let backstage_url = config.require_backstage_url()?.to_string();
    let entities = load_entities(config, catalog).await?;

    let collector = MultisigsCollector::new(&entities);
    let generator = SeriesGenerator::new(&collector, &backstage_url, now);
    let [multisigs, signers, access_keys, aggregates] = generator.batches();
    let (a, b, c, d) = tokio::join!(
        submit(sink, multisigs),
        submit(sink, signers),
        submit(sink, access_keys),
        submit(sink, aggregates),
    );
    let report = PublishReport {
        batches: vec![a, b, c, d],
    };
    log::info!(
        "Metrics submitted: {} ok, {} failed",
        report.succeeded().len(),
        report.failed().len()
    );
    Ok(report)
}
