//! Maps changed files onto the catalog entities whose sources contain them.

use catalog_ci_model::{ChangedFile, Entity};

/// Attribution outcome for a single entity.
#[derive(Debug, Clone)]
pub struct Attribution<'a> {
    pub entity: &'a Entity,
    /// Prefix the changed files were matched against; `None` when the entity
    /// has no usable source location.
    pub source_path: Option<String>,
    pub matched_files: Vec<&'a str>,
}

impl Attribution<'_> {
    pub fn is_changed(&self) -> bool {
        !self.matched_files.is_empty()
    }
}

/// Per-entity attribution, in the order the entities were given.
#[derive(Debug, Clone, Default)]
pub struct AttributionReport<'a> {
    entries: Vec<Attribution<'a>>,
    changed_files: usize,
}

impl<'a> AttributionReport<'a> {
    pub fn entries(&self) -> &[Attribution<'a>] {
        &self.entries
    }

    pub fn changed_files(&self) -> usize {
        self.changed_files
    }

    /// Whether the entity at `index` (input order) was attributed a change.
    pub fn is_changed(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(Attribution::is_changed)
    }

    pub fn changed_entities(&self) -> Vec<&'a Entity> {
        self.entries
            .iter()
            .filter(|a| a.is_changed())
            .map(|a| a.entity)
            .collect()
    }

    pub fn changed_names(&self) -> Vec<&'a str> {
        self.changed_entities().into_iter().map(Entity::name).collect()
    }

    /// Entities skipped because their source location could not be resolved.
    pub fn unresolved(&self) -> Vec<&'a Entity> {
        self.entries
            .iter()
            .filter(|a| a.source_path.is_none())
            .map(|a| a.entity)
            .collect()
    }
}

/// Plain string-prefix match of a changed file against an entity path.
/// An empty path (repository root) matches every file.
pub fn path_contains(source_path: &str, file: &str) -> bool {
    file.starts_with(source_path)
}

pub fn attribute_entity<'a>(entity: &'a Entity, changed_files: &'a [ChangedFile]) -> Attribution<'a> {
    let source_path = match entity.source_location_relative_path() {
        Ok(path) => Some(path),
        Err(err) => {
            log::debug!("Skipping attribution for {}: {err}", entity.name());
            None
        }
    };
    let matched_files = source_path
        .as_deref()
        .map(|prefix| {
            changed_files
                .iter()
                .filter(|change| path_contains(prefix, &change.file))
                .map(|change| change.file.as_str())
                .collect()
        })
        .unwrap_or_default();
    Attribution {
        entity,
        source_path,
        matched_files,
    }
}

pub fn attribute_changes<'a>(
    changed_files: &'a [ChangedFile],
    entities: &'a [Entity],
) -> AttributionReport<'a> {
    let entries = entities
        .iter()
        .map(|entity| attribute_entity(entity, changed_files))
        .collect();
    AttributionReport {
        entries,
        changed_files: changed_files.len(),
    }
}

/// Log an inventory of entities and their source paths.
pub fn inspect_entities(message: &str, entities: &[&Entity]) {
    log::info!("{message} ({}):", entities.len());
    for entity in entities {
        match entity.source_location_relative_path() {
            Ok(path) => log::info!(" - {} at \"{path}\"", entity.name()),
            Err(_) => log::info!(" - {} (no source location)", entity.name()),
        }
    }
}
