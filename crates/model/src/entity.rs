use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::reference::{owner_reference, EntityRef, DEFAULT_NAMESPACE};

pub const SOURCE_LOCATION_ANNOTATION: &str = "backstage.io/source-location";
pub const SECURITY_TIER_ANNOTATION: &str = "aurora.dev/security-tier";

/// Namespace (and tag) used by the catalog for placeholder entities.
pub const STUB_NAMESPACE: &str = "stub";

/// Tag that lets a component tolerate failing checks regardless of tier.
pub const CI_SEC_DISABLE_TAG: &str = "ci-sec-disable";

/// Number of leading `/`-separated segments in a source location that
/// belong to the repository URL: `url:https:`, ``, host, org, repo,
/// `tree|blob`, ref.
const SOURCE_LOCATION_PREFIX_SEGMENTS: usize = 7;

/// Sentinel tier for entities without an assigned security tier.
pub const NO_SECURITY_TIER: i64 = -1;

/// Catalog record as returned by the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub kind: String,

    pub metadata: EntityMetadata,

    /// Kind-specific payload; only a handful of fields are interpreted.
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub spec: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, String>,
}

fn null_as_empty_map<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Entity {
    pub fn new(kind: &str, name: &str) -> Self {
        Self {
            api_version: None,
            kind: kind.to_string(),
            metadata: EntityMetadata {
                name: name.to_string(),
                ..EntityMetadata::default()
            },
            spec: Map::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        self.metadata
            .namespace
            .as_deref()
            .unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.metadata.tags.iter().any(|t| t == tag)
    }

    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        tags.iter().any(|tag| self.has_tag(tag))
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    pub fn spec_str(&self, key: &str) -> Option<&str> {
        self.spec.get(key).and_then(Value::as_str)
    }

    pub fn spec_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.spec.get(key).and_then(Value::as_object)
    }

    /// `spec.type`, e.g. `contract`, `access-key`.
    pub fn spec_type(&self) -> Option<&str> {
        self.spec_str("type")
    }

    /// Reference to this entity itself.
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(&self.kind, self.namespace(), self.name())
    }

    /// Placeholder entities live in the `stub` namespace or carry the `stub` tag.
    pub fn is_stub(&self) -> bool {
        self.namespace() == STUB_NAMESPACE || self.has_tag(STUB_NAMESPACE)
    }

    pub fn owner_reference(&self) -> Result<EntityRef> {
        owner_reference(&self.spec)
    }

    /// Raw source-location annotation, `url:` prefix included.
    pub fn source_location_url(&self) -> Option<&str> {
        self.annotation(SOURCE_LOCATION_ANNOTATION)
    }

    /// Whether the entity's sources live in the repository at `repo_url`.
    pub fn belongs_to_repository(&self, repo_url: &str) -> bool {
        let prefix = format!("url:{}/", repo_url.trim_end_matches('/'));
        self.source_location_url()
            .is_some_and(|loc| loc.starts_with(&prefix))
    }

    /// Path inside the repository, with the repository URL and ref stripped.
    ///
    /// `url:https://github.com/org/repo/tree/main/services/a/` yields
    /// `services/a/`; the repository root yields an empty string.
    pub fn source_location_relative_path(&self) -> Result<String> {
        let segments = self.source_location_segments()?;
        Ok(segments[SOURCE_LOCATION_PREFIX_SEGMENTS..].join("/"))
    }

    /// Like [`Entity::source_location_relative_path`] but without the last
    /// segment, i.e. the containing directory.
    pub fn source_location_directory(&self) -> Result<String> {
        let segments = self.source_location_segments()?;
        let end = segments.len().saturating_sub(1).max(SOURCE_LOCATION_PREFIX_SEGMENTS);
        Ok(segments[SOURCE_LOCATION_PREFIX_SEGMENTS..end].join("/"))
    }

    fn source_location_segments(&self) -> Result<Vec<&str>> {
        let loc = self
            .source_location_url()
            .ok_or_else(|| ModelError::SourceLocation {
                entity: self.name().to_string(),
                reason: format!("missing {SOURCE_LOCATION_ANNOTATION} annotation"),
            })?;
        let segments: Vec<&str> = loc.split('/').collect();
        if segments.len() < SOURCE_LOCATION_PREFIX_SEGMENTS {
            return Err(ModelError::SourceLocation {
                entity: self.name().to_string(),
                reason: format!(
                    "{loc:?} has {} segments, expected at least {SOURCE_LOCATION_PREFIX_SEGMENTS}",
                    segments.len()
                ),
            });
        }
        Ok(segments)
    }

    /// Security tier from annotations, [`NO_SECURITY_TIER`] when absent or
    /// not a number.
    pub fn security_tier(&self) -> i64 {
        self.annotation(SECURITY_TIER_ANNOTATION)
            .and_then(parse_leading_int)
            .unwrap_or(NO_SECURITY_TIER)
    }

    pub fn allow_tests_to_fail(&self) -> bool {
        self.security_tier() < 0 || self.has_tag(CI_SEC_DISABLE_TAG)
    }
}

/// Integer prefix of `raw` (`"2"`, `" 3 "`, `"-1x"`), `None` without digits.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

/// Decode a catalog export: either `{"items": [...]}` or a bare array.
pub fn entities_from_json(raw: &str) -> Result<Vec<Entity>> {
    let value: Value = serde_json::from_str(raw)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ModelError::InvalidEntity(
                    "catalog payload has no `items` array".to_string(),
                ))
            }
        },
        other => {
            return Err(ModelError::InvalidEntity(format!(
                "unexpected catalog payload: {other}"
            )))
        }
    };
    let entities = items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<Entity>, _>>()?;
    log::debug!("Decoded {} catalog entities", entities.len());
    Ok(entities)
}
