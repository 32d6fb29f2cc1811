use std::path::Path;

use serde_json::Value;

use catalog_ci_model::{ChangeType, ChangedFile};

use crate::error::{Result, RunnerError};
use crate::sources::{ChangeProvider, RawFileChange, RepositoryRef};

pub const PUSH_EVENT: &str = "push";

/// What triggered the workflow run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventContext {
    pub event_name: Option<String>,
    pub repository: Option<RepositoryRef>,
    /// Commit range of a push.
    pub before: Option<String>,
    pub after: Option<String>,
    pub pull_request: Option<u64>,
}

impl EventContext {
    /// Context from a webhook payload (`before`/`after` for pushes,
    /// `pull_request.number` for pull requests).
    pub fn from_payload(
        event_name: Option<&str>,
        repository: Option<RepositoryRef>,
        payload: &Value,
    ) -> Self {
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            event_name: event_name.map(str::to_string),
            repository,
            before: text("before"),
            after: text("after"),
            pull_request: payload
                .get("pull_request")
                .and_then(|pr| pr.get("number"))
                .and_then(Value::as_u64),
        }
    }

    pub async fn from_event_file(
        event_name: Option<&str>,
        repository: Option<RepositoryRef>,
        path: &Path,
    ) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let payload: Value = serde_json::from_str(&raw)?;
        Ok(Self::from_payload(event_name, repository, &payload))
    }
}

fn to_changed_file(raw: RawFileChange) -> ChangedFile {
    ChangedFile {
        change_type: ChangeType::from_status(&raw.status),
        file: raw.filename,
        patch: raw.patch,
    }
}

/// Files touched by the triggering event. Events that carry no usable range
/// or pull request resolve to an empty list.
pub async fn fetch_changed_files(
    provider: &dyn ChangeProvider,
    event: &EventContext,
) -> Result<Vec<ChangedFile>> {
    let Some(event_name) = event.event_name.as_deref() else {
        return Ok(Vec::new());
    };

    let raw = if event_name == PUSH_EVENT {
        let (Some(before), Some(after), Some(repo)) =
            (&event.before, &event.after, &event.repository)
        else {
            return Ok(Vec::new());
        };
        provider
            .compare_commits(repo, before, after)
            .await
            .map_err(RunnerError::Changes)?
    } else {
        let (Some(number), Some(repo)) = (event.pull_request, &event.repository) else {
            return Ok(Vec::new());
        };
        provider
            .pull_request_files(repo, number)
            .await
            .map_err(RunnerError::Changes)?
    };

    let files: Vec<ChangedFile> = raw.into_iter().map(to_changed_file).collect();
    for file in &files {
        log::debug!("changed: {} ({:?})", file.file, file.change_type);
    }
    Ok(files)
}
