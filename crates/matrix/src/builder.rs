//! Per-component CI configuration: toolchain detection, manifest lookups and
//! the final matrix.

use std::io;

use once_cell::sync::Lazy;
use regex::Regex;

use catalog_ci_model::{ChangedFile, Entity};
use catalog_ci_protocol::paths::{
    ancestors, display_repo_path, explicit_relative_location, join_repo_path,
};
use catalog_ci_protocol::{ComponentConfig, ComponentMatrix};

use crate::attribution::{attribute_changes, inspect_entities};
use crate::error::Result;
use crate::policy::run_tests_policy;
use crate::probe::FileProbe;
use crate::stats::MatrixStats;

pub const DEFAULT_GO_VERSION: &str = "1.18";

/// Slither settings for components without their own `slither.config.json`.
pub const DEFAULT_SLITHER_ARGS: &str = "--filter-paths \"node_modules|testing|test|lib\" --exclude timestamp,solc-version,naming-convention,assembly-usage";

const SOLIDITY_TAGS: &[&str] = &["ethereum", "aurora"];
const RUST_TAG: &str = "near";
const COMPONENT_KIND: &str = "Component";

const CARGO_MANIFEST: &str = "Cargo.toml";
const GO_MANIFEST: &str = "go.mod";
const NODE_MANIFEST: &str = "package.json";
const SLITHER_CONFIG: &str = "slither.config.json";

static GO_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^go\s+(\S+)").expect("go directive regex is valid"));

/// First directory, walking up from `dir`, that contains `root_file`.
/// Falls back to the repository root (`.`) when nothing is found.
pub fn find_root(probe: &dyn FileProbe, dir: &str, root_file: &str) -> String {
    log::info!("searching {root_file} for {}", display_repo_path(dir));
    for candidate in ancestors(dir) {
        let test_file = join_repo_path(&candidate, root_file);
        log::debug!("checking: {test_file}");
        if probe.exists(&test_file) {
            let root = display_repo_path(&candidate);
            log::info!("Found {root_file} root for {}: {root}", display_repo_path(dir));
            return root;
        }
    }
    log::info!(
        "Unable to find {root_file} for {}, using the default",
        display_repo_path(dir)
    );
    display_repo_path("")
}

/// Whether `file` sits directly in `dir`.
pub fn has_in_root(probe: &dyn FileProbe, dir: &str, file: &str) -> bool {
    let test_file = join_repo_path(dir, file);
    if probe.exists(&test_file) {
        log::info!("Found {test_file}");
        true
    } else {
        log::info!("Unable to find {file} in {}", display_repo_path(dir));
        false
    }
}

/// Whether `file` exists in `dir` or any of its parents, root included.
pub fn has_manifest_upward(probe: &dyn FileProbe, dir: &str, file: &str) -> bool {
    ancestors(dir)
        .iter()
        .any(|candidate| probe.exists(&join_repo_path(candidate, file)))
}

/// Version from the `go <version>` directive of a `go.mod` file, or
/// [`DEFAULT_GO_VERSION`] when the file or directive is missing. Any other
/// read failure is returned.
pub fn parse_go_version(probe: &dyn FileProbe, mod_file: &str) -> Result<String> {
    let version = match probe.read_to_string(mod_file) {
        Ok(contents) => go_directive(&contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(err.into()),
    };
    Ok(version.unwrap_or_else(|| {
        log::warn!("unable to detect go version from {mod_file}, using {DEFAULT_GO_VERSION}");
        DEFAULT_GO_VERSION.to_string()
    }))
}

fn go_directive(contents: &str) -> Option<String> {
    GO_DIRECTIVE
        .captures(contents)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Slither runs from the repository root with the component as target, so
/// a component-local config has to be passed explicitly.
pub fn slither_args(probe: &dyn FileProbe, dir: &str) -> String {
    if has_in_root(probe, dir, SLITHER_CONFIG) {
        format!(
            "--config-file {}/{SLITHER_CONFIG}",
            explicit_relative_location(dir)
        )
    } else {
        DEFAULT_SLITHER_ARGS.to_string()
    }
}

pub fn component_config(
    probe: &dyn FileProbe,
    entity: &Entity,
    changed: bool,
    run_tests: bool,
) -> Result<ComponentConfig> {
    let dir = entity.source_location_directory()?;
    let path = display_repo_path(&dir);

    let is_solidity = entity.has_any_tag(SOLIDITY_TAGS);
    let is_rust = entity.has_tag(RUST_TAG) || has_manifest_upward(probe, &dir, CARGO_MANIFEST);
    let is_go = has_manifest_upward(probe, &dir, GO_MANIFEST);

    let go_root = find_root(probe, &dir, GO_MANIFEST);
    let go_version = parse_go_version(probe, &join_repo_path(&go_root, GO_MANIFEST))?;

    Ok(ComponentConfig {
        name: entity.name().to_string(),
        tags: entity.metadata.tags.clone(),
        path,
        changed,
        run_tests,
        security_tier: entity.security_tier(),
        allow_tests_to_fail: entity.allow_tests_to_fail(),
        node_root: find_root(probe, &dir, NODE_MANIFEST),
        go_version,
        is_solidity,
        is_rust,
        is_go,
        run_slither: is_solidity && run_tests,
        slither_args: slither_args(probe, &dir),
        run_clippy: is_rust && run_tests,
        run_go_static_checks: is_go && run_tests,
    })
}

/// Inputs describing the triggering workflow run.
#[derive(Debug, Clone, Copy)]
pub struct MatrixRequest<'a> {
    /// `<server>/<owner>/<repo>`, without trailing slash.
    pub repo_url: &'a str,
    pub event_name: Option<&'a str>,
    pub force_all: bool,
}

#[derive(Debug, Clone)]
pub struct MatrixOutcome {
    pub matrix: ComponentMatrix,
    pub stats: MatrixStats,
}

/// Repository components, attribution, policy and per-component
/// configuration, composed into the matrix.
pub fn build_component_matrix(
    entities: &[Entity],
    changed_files: &[ChangedFile],
    request: MatrixRequest<'_>,
    probe: &dyn FileProbe,
) -> MatrixOutcome {
    let components: Vec<Entity> = entities
        .iter()
        .filter(|e| e.belongs_to_repository(request.repo_url))
        .filter(|e| e.is_kind(COMPONENT_KIND))
        .cloned()
        .collect();
    inspect_entities(
        "Component entities in this repo",
        &components.iter().collect::<Vec<_>>(),
    );

    log::info!("Changed files count: {}", changed_files.len());
    let report = attribute_changes(changed_files, &components);
    inspect_entities("Changed components", &report.changed_entities());

    log::info!("Generating component matrix...");
    let mut stats = MatrixStats::new(changed_files.len());
    let mut include = Vec::with_capacity(components.len());
    for (index, entity) in components.iter().enumerate() {
        let changed = report.is_changed(index);
        let decision = run_tests_policy(entity, changed, request.event_name, request.force_all);
        match component_config(probe, entity, changed, decision.run) {
            Ok(config) => {
                stats.add_component(&config);
                include.push(config);
            }
            Err(err) => {
                log::warn!("Skipping component {}: {err}", entity.name());
                stats.add_skipped(format!("{}: {err}", entity.name()));
            }
        }
    }

    MatrixOutcome {
        matrix: ComponentMatrix { include },
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatrixError;
    use crate::probe::MemoryProbe;
    use catalog_ci_model::{SECURITY_TIER_ANNOTATION, SOURCE_LOCATION_ANNOTATION};
    use pretty_assertions::assert_eq;

    fn component(name: &str, rel: &str, tags: &[&str]) -> Entity {
        let mut entity = Entity::new("Component", name);
        entity.metadata.tags = tags.iter().map(|t| t.to_string()).collect();
        entity.metadata.annotations.insert(
            SOURCE_LOCATION_ANNOTATION.to_string(),
            format!("url:https://github.com/org/repo/tree/main/{rel}"),
        );
        entity
    }

    #[test]
    fn go_version_from_directive() {
        let probe = MemoryProbe::new().with_file("go.mod", "module example.com/x\n\ngo 1.21\n");
        assert_eq!(parse_go_version(&probe, "go.mod").unwrap(), "1.21");
    }

    #[test]
    fn go_version_defaults_when_missing() {
        let probe = MemoryProbe::new().with_file("go.mod", "module example.com/x\n");
        assert_eq!(parse_go_version(&probe, "go.mod").unwrap(), DEFAULT_GO_VERSION);
        assert_eq!(parse_go_version(&MemoryProbe::new(), "go.mod").unwrap(), "1.18");
    }

    /// Checkout whose `go.mod` exists but cannot be read.
    struct UnreadableGoMod(MemoryProbe);

    impl FileProbe for UnreadableGoMod {
        fn exists(&self, rel_path: &str) -> bool {
            self.0.exists(rel_path)
        }

        fn read_to_string(&self, rel_path: &str) -> io::Result<String> {
            if rel_path.ends_with(GO_MANIFEST) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "go.mod"));
            }
            self.0.read_to_string(rel_path)
        }
    }

    #[test]
    fn unreadable_go_mod_is_an_error_not_a_default() {
        let checkout = UnreadableGoMod(MemoryProbe::new().with_file("svc/go.mod", "go 1.21\n"));
        let err = parse_go_version(&checkout, "svc/go.mod").unwrap_err();
        assert!(matches!(
            err,
            MatrixError::IoError(ref e) if e.kind() == io::ErrorKind::PermissionDenied
        ));

        let entities = vec![component("svc", "svc/", &[])];
        let request = MatrixRequest {
            repo_url: "https://github.com/org/repo",
            event_name: Some("push"),
            force_all: false,
        };
        let outcome = build_component_matrix(&entities, &[], request, &checkout);
        assert!(outcome.matrix.include.is_empty());
        assert_eq!(outcome.stats.skipped.len(), 1);
        assert!(outcome.stats.skipped[0].starts_with("svc: IO error"));
    }

    #[test]
    fn go_directive_must_start_the_line() {
        assert_eq!(go_directive("// go 1.99\ngo 1.20\n"), Some("1.20".to_string()));
        assert_eq!(go_directive("toolchain go1.22\n"), None);
    }

    #[test]
    fn find_root_walks_upward_and_defaults_to_repo_root() {
        let probe = MemoryProbe::new().with_file("frontend/package.json", "{}");
        assert_eq!(find_root(&probe, "frontend/apps/web", NODE_MANIFEST), "frontend");
        assert_eq!(find_root(&probe, "backend/api", NODE_MANIFEST), ".");
        assert_eq!(find_root(&probe, "", NODE_MANIFEST), ".");
    }

    #[test]
    fn slither_args_prefer_component_config() {
        let probe = MemoryProbe::new().with_file("contracts/slither.config.json", "{}");
        assert_eq!(
            slither_args(&probe, "contracts"),
            "--config-file ./contracts/slither.config.json"
        );
        assert_eq!(slither_args(&probe, "other"), DEFAULT_SLITHER_ARGS);
    }

    #[test]
    fn config_detects_toolchains() {
        let probe = MemoryProbe::new()
            .with_file("engine/Cargo.toml", "[package]\n")
            .with_file("go.mod", "go 1.22\n");
        let mut entity = component("engine", "engine/src/", &["ethereum"]);
        entity
            .metadata
            .annotations
            .insert(SECURITY_TIER_ANNOTATION.to_string(), "1".to_string());

        let config = component_config(&probe, &entity, true, true).unwrap();
        assert_eq!(config.path, "engine/src");
        assert!(config.is_solidity);
        assert!(config.is_rust);
        assert!(config.is_go);
        assert!(config.run_slither && config.run_clippy && config.run_go_static_checks);
        assert_eq!(config.go_version, "1.22");
        assert_eq!(config.security_tier, 1);
        assert!(!config.allow_tests_to_fail);
        assert_eq!(config.node_root, ".");

        let idle = component_config(&probe, &entity, false, false).unwrap();
        assert!(!idle.run_slither && !idle.run_clippy && !idle.run_go_static_checks);
    }

    #[test]
    fn root_component_uses_dot_path() {
        let entity = component("monorepo", "", &["near"]);
        let config = component_config(&MemoryProbe::new(), &entity, false, true).unwrap();
        assert_eq!(config.path, ".");
        assert!(config.is_rust);
        assert!(!config.is_go);
        assert!(config.allow_tests_to_fail);
        assert_eq!(config.slither_args, DEFAULT_SLITHER_ARGS);
    }

    #[test]
    fn matrix_filters_repository_components() {
        let mut api = component("api", "services/api/", &[]);
        api.kind = "API".to_string();
        let mut foreign = component("foreign", "services/x/", &[]);
        foreign.metadata.annotations.insert(
            SOURCE_LOCATION_ANNOTATION.to_string(),
            "url:https://github.com/org/other/tree/main/services/x/".to_string(),
        );
        let entities = vec![
            component("a", "services/a/", &["ci-sec-changed-only"]),
            component("b", "services/b/", &["ci-sec-changed-only"]),
            api,
            foreign,
        ];
        let changes = vec![ChangedFile::edited("services/a/main.go")];
        let request = MatrixRequest {
            repo_url: "https://github.com/org/repo",
            event_name: Some("pull_request"),
            force_all: false,
        };

        let outcome = build_component_matrix(&entities, &changes, request, &MemoryProbe::new());
        let names: Vec<&str> = outcome.matrix.include.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(outcome.matrix.get("a").unwrap().run_tests);
        assert!(!outcome.matrix.get("b").unwrap().run_tests);
        assert_eq!(outcome.stats.components, 2);
        assert_eq!(outcome.stats.changed, 1);
        assert_eq!(outcome.stats.scheduled, 1);
    }
}
