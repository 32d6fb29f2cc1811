//! Decides whether CI checks run for a component.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. the workflow forces all checks;
//! 2. the triggering event is not a pull request;
//! 3. the component opted into changed-only runs via `ci-sec-changed-only`;
//! 4. otherwise checks run.

use std::fmt;

use catalog_ci_model::Entity;

pub const PULL_REQUEST_EVENT: &str = "pull_request";
pub const CHANGED_ONLY_TAG: &str = "ci-sec-changed-only";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyReason {
    ForcedByWorkflow,
    NotPullRequest,
    ChangedOnlyTag,
    DefaultRunAll,
}

impl fmt::Display for PolicyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ForcedByWorkflow => "forced by workflow config (force_all_checks)",
            Self::NotPullRequest => "not a pull request",
            Self::ChangedOnlyTag => "changed only, via ci-sec-changed-only tag",
            Self::DefaultRunAll => "runs by default, no ci-sec-changed-only tag",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    pub run: bool,
    pub reason: PolicyReason,
}

pub fn run_tests_policy(
    entity: &Entity,
    changed: bool,
    event_name: Option<&str>,
    force_all: bool,
) -> PolicyDecision {
    let (run, reason) = if force_all {
        (true, PolicyReason::ForcedByWorkflow)
    } else if event_name != Some(PULL_REQUEST_EVENT) {
        (true, PolicyReason::NotPullRequest)
    } else if entity.has_tag(CHANGED_ONLY_TAG) {
        (changed, PolicyReason::ChangedOnlyTag)
    } else {
        (true, PolicyReason::DefaultRunAll)
    };
    log::info!(
        "{}: CI run={run} ({reason}; changed: {changed})",
        entity.name()
    );
    PolicyDecision { run, reason }
}
