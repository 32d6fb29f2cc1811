use serde::{Deserialize, Serialize};

use catalog_ci_protocol::ComponentConfig;

/// Statistics about a matrix generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixStats {
    /// Component entities found in the repository
    pub components: usize,

    /// Components attributed at least one changed file
    pub changed: usize,

    /// Components whose checks are scheduled to run
    pub scheduled: usize,

    /// Changed files considered
    pub changed_files: usize,

    /// Languages detected, keyed by toolchain
    pub languages: std::collections::BTreeMap<String, usize>,

    /// Components left out of the matrix, with the reason
    pub skipped: Vec<String>,
}

impl MatrixStats {
    pub fn new(changed_files: usize) -> Self {
        Self {
            components: 0,
            changed: 0,
            scheduled: 0,
            changed_files,
            languages: std::collections::BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    pub fn add_component(&mut self, config: &ComponentConfig) {
        self.components += 1;
        if config.changed {
            self.changed += 1;
        }
        if config.run_tests {
            self.scheduled += 1;
        }
        for (language, present) in [
            ("solidity", config.is_solidity),
            ("rust", config.is_rust),
            ("go", config.is_go),
        ] {
            if present {
                *self.languages.entry(language.to_string()).or_insert(0) += 1;
            }
        }
    }

    pub fn add_skipped(&mut self, reason: String) {
        self.components += 1;
        self.skipped.push(reason);
    }
}

impl Default for MatrixStats {
    fn default() -> Self {
        Self::new(0)
    }
}
