use std::path::PathBuf;

use crate::error::{Result, RunnerError};

pub const DEFAULT_SERVER_URL: &str = "https://github.com";

const BACKSTAGE_URL_KEYS: &[&str] = &["INPUT_BACKSTAGE_URL", "BACKSTAGE_URL"];
const ENTITIES_REPO_KEY: &str = "INPUT_BACKSTAGE_ENTITIES_REPO";
const FORCE_ALL_CHECKS_KEY: &str = "INPUT_FORCE_ALL_CHECKS";
const SERVER_URL_KEY: &str = "GITHUB_SERVER_URL";
const REPOSITORY_KEY: &str = "GITHUB_REPOSITORY";
const EVENT_NAME_KEY: &str = "GITHUB_EVENT_NAME";
const EVENT_PATH_KEY: &str = "GITHUB_EVENT_PATH";
const OUTPUT_PATH_KEY: &str = "GITHUB_OUTPUT";

/// Settings for one workflow run, read from the Actions environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub backstage_url: Option<String>,
    pub entities_repo: Option<String>,
    pub force_all_checks: bool,
    pub server_url: String,
    /// `owner/repo`
    pub repository: Option<String>,
    pub event_name: Option<String>,
    /// Webhook payload of the triggering event.
    pub event_path: Option<PathBuf>,
    /// Step outputs file the matrix is appended to.
    pub output_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            backstage_url: BACKSTAGE_URL_KEYS.iter().find_map(|&key| get(key)),
            entities_repo: get(ENTITIES_REPO_KEY),
            force_all_checks: get(FORCE_ALL_CHECKS_KEY).as_deref().is_some_and(is_truthy),
            server_url: get(SERVER_URL_KEY)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            repository: get(REPOSITORY_KEY),
            event_name: get(EVENT_NAME_KEY),
            event_path: get(EVENT_PATH_KEY).map(PathBuf::from),
            output_path: get(OUTPUT_PATH_KEY).map(PathBuf::from),
        }
    }

    pub fn require_backstage_url(&self) -> Result<&str> {
        self.backstage_url
            .as_deref()
            .ok_or(RunnerError::MissingConfig("BACKSTAGE_URL"))
    }

    /// `<server>/<owner>/<repo>` of the repository under test.
    pub fn repository_url(&self) -> Option<String> {
        self.repository
            .as_deref()
            .map(|repo| format!("{}/{}", self.server_url, repo.trim_matches('/')))
    }
}

/// Workflow inputs arrive as strings; anything but an explicit "off" value
/// turns the flag on.
pub fn is_truthy(raw: &str) -> bool {
    let value = raw.trim();
    !value.is_empty()
        && !["0", "false", "no", "off"]
            .iter()
            .any(|off| value.eq_ignore_ascii_case(off))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> RunConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RunConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]);
        assert_eq!(cfg.server_url, DEFAULT_SERVER_URL);
        assert!(!cfg.force_all_checks);
        assert_eq!(cfg.repository_url(), None);
        assert!(matches!(
            cfg.require_backstage_url(),
            Err(RunnerError::MissingConfig("BACKSTAGE_URL"))
        ));
    }

    #[test]
    fn reads_action_inputs() {
        let cfg = config(&[
            ("BACKSTAGE_URL", "https://fallback"),
            ("INPUT_BACKSTAGE_URL", "https://bot@catalog.example"),
            ("INPUT_FORCE_ALL_CHECKS", "true"),
            ("GITHUB_SERVER_URL", "https://git.example/"),
            ("GITHUB_REPOSITORY", "org/repo"),
            ("GITHUB_EVENT_NAME", "pull_request"),
        ]);
        assert_eq!(cfg.require_backstage_url().unwrap(), "https://bot@catalog.example");
        assert!(cfg.force_all_checks);
        assert_eq!(cfg.repository_url().as_deref(), Some("https://git.example/org/repo"));
        assert_eq!(cfg.event_name.as_deref(), Some("pull_request"));
    }

    #[test]
    fn truthy_flags() {
        for on in ["true", "1", "yes", "TRUE", "anything"] {
            assert!(is_truthy(on), "{on}");
        }
        for off in ["", "  ", "0", "false", "False", "no", "off"] {
            assert!(!is_truthy(off), "{off}");
        }
    }
}
