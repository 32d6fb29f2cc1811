use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::{Map, Value};

use crate::error::{ModelError, Result};

pub const DEFAULT_NAMESPACE: &str = "default";

/// Parsed `kind:namespace/name` reference.
///
/// The kind is lower-cased at parse time so references compare the same way
/// the catalog compares them. A reference without a `/` lives in the
/// `default` namespace. Equality and ordering look at kind, namespace and
/// name only; the text after `:` is kept as written for [`EntityRef::target`].
#[derive(Debug, Clone)]
pub struct EntityRef {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    target: String,
}

impl EntityRef {
    pub fn new(kind: &str, namespace: &str, name: &str) -> Self {
        Self {
            kind: kind.to_ascii_lowercase(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            target: format!("{namespace}/{name}"),
        }
    }

    /// Parse a colon-delimited reference. Exactly one `:` is required.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 2 {
            return Err(ModelError::OwnerReference(format!(
                "expected `kind:namespace/name`, got {raw:?}"
            )));
        }
        let kind = parts[0].trim();
        let target = parts[1].trim();
        let (namespace, name) = target
            .split_once('/')
            .unwrap_or((DEFAULT_NAMESPACE, target));
        if kind.is_empty() || namespace.is_empty() || name.is_empty() {
            return Err(ModelError::OwnerReference(format!(
                "empty segment in reference {raw:?}"
            )));
        }
        Ok(Self {
            target: target.to_string(),
            ..Self::new(kind, namespace, name)
        })
    }

    /// The text after `:` as it was written, so `system:treasury` yields
    /// `treasury` rather than `default/treasury`.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
    }

    fn key(&self) -> (&str, &str, &str) {
        (&self.kind, &self.namespace, &self.name)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for EntityRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.kind, self.namespace, self.name)
    }
}

/// Read `spec.owner` and parse it as a reference.
pub fn owner_reference(spec: &Map<String, Value>) -> Result<EntityRef> {
    let raw = spec
        .get("owner")
        .and_then(Value::as_str)
        .ok_or_else(|| ModelError::OwnerReference("spec.owner is missing".to_string()))?;
    EntityRef::parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_full_reference() {
        let owner = EntityRef::parse("User:default/alice").unwrap();
        assert_eq!(owner, EntityRef::new("user", "default", "alice"));
        assert_eq!(owner.target(), "default/alice");
        assert_eq!(owner.to_string(), "user:default/alice");
    }

    #[test]
    fn missing_namespace_defaults() {
        let owner = EntityRef::parse("group:core-team").unwrap();
        assert_eq!(owner.namespace, "default");
        assert_eq!(owner.name, "core-team");
    }

    #[test]
    fn target_keeps_the_text_as_written() {
        let short = EntityRef::parse("system: treasury").unwrap();
        assert_eq!(short.target(), "treasury");
        assert_eq!(short, EntityRef::new("system", "default", "treasury"));

        let full = EntityRef::parse("system:default/treasury").unwrap();
        assert_eq!(full.target(), "default/treasury");
        assert_eq!(short, full);
        assert_eq!(short.cmp(&full), std::cmp::Ordering::Equal);

        let mut seen = std::collections::HashSet::new();
        seen.insert(short);
        assert!(!seen.insert(full));
    }

    #[test]
    fn rejects_missing_or_repeated_delimiter() {
        assert!(EntityRef::parse("default/alice").is_err());
        assert!(EntityRef::parse("user:default:alice").is_err());
        assert!(EntityRef::parse("user:").is_err());
    }

    #[test]
    fn owner_reference_requires_owner_field() {
        let spec = json!({ "type": "access-key" });
        let err = owner_reference(spec.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::OwnerReference(_)));

        let spec = json!({ "owner": "contract:default/token" });
        let owner = owner_reference(spec.as_object().unwrap()).unwrap();
        assert!(owner.is_kind("Contract"));
        assert_eq!(owner.name, "token");
    }
}
