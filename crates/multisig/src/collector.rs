//! Partitions a flat catalog snapshot into multisigs, signers and access keys.
//!
//! The collector only borrows the entity list. Every query walks it again, so
//! repeated calls on the same snapshot return the same groups.

use std::collections::BTreeMap;

use catalog_ci_model::{Entity, EntityRef, STUB_NAMESPACE};

use crate::types::{AccessKey, Multisig, Signer, SignerKeys, UnresolvedCounts};

pub const MULTISIG_SPEC_KEY: &str = "multisig";
pub const SIGNER_TYPE: &str = "signer-address";
pub const ACCESS_KEY_TYPE: &str = "access-key";
pub const DEPRECATED: &str = "deprecated";

pub struct MultisigsCollector<'a> {
    entities: &'a [Entity],
}

impl<'a> MultisigsCollector<'a> {
    pub fn new(entities: &'a [Entity]) -> Self {
        Self { entities }
    }

    pub fn entities(&self) -> &'a [Entity] {
        self.entities
    }

    pub fn multisigs(&self) -> Vec<Multisig<'a>> {
        self.entities
            .iter()
            .filter_map(|entity| {
                entity
                    .spec_object(MULTISIG_SPEC_KEY)
                    .map(|multisig| Multisig::from_entity(entity, multisig))
            })
            .collect()
    }

    pub fn signers(&self) -> Vec<Signer<'a>> {
        self.entities
            .iter()
            .filter(|entity| entity.spec_type() == Some(SIGNER_TYPE))
            .map(Signer::from_entity)
            .collect()
    }

    pub fn access_keys(&self) -> Vec<AccessKey<'a>> {
        self.entities
            .iter()
            .filter(|entity| entity.spec_type() == Some(ACCESS_KEY_TYPE))
            .map(|entity| {
                let owner = match entity.owner_reference() {
                    Ok(owner) => Some(owner),
                    Err(err) => {
                        log::debug!("access key {} has no usable owner: {err}", entity.name());
                        None
                    }
                };
                let resolved_owner = owner.as_ref().and_then(|owner| self.resolve(owner));
                AccessKey {
                    entity,
                    owner,
                    resolved_owner,
                }
            })
            .collect()
    }

    /// Catalog entity a reference points at. The reference kind may name
    /// either the entity kind or its `spec.type` (`contract:default/token`
    /// resolves to a `Component` of type `contract`).
    pub fn resolve(&self, reference: &EntityRef) -> Option<&'a Entity> {
        self.entities.iter().find(|entity| {
            entity.namespace() == reference.namespace
                && entity.name() == reference.name
                && (entity.is_kind(&reference.kind)
                    || entity
                        .spec_type()
                        .is_some_and(|t| t.eq_ignore_ascii_case(&reference.kind)))
        })
    }

    pub fn multisig_access_keys(&self) -> Vec<AccessKey<'a>> {
        self.access_keys()
            .into_iter()
            .filter(|key| {
                key.resolved_owner
                    .is_some_and(|owner| owner.spec_object(MULTISIG_SPEC_KEY).is_some())
            })
            .collect()
    }

    pub fn deprecated_access_keys(&self) -> Vec<AccessKey<'a>> {
        self.access_keys()
            .into_iter()
            .filter(|key| {
                key.entity.has_tag(DEPRECATED) || key.entity.spec_str("lifecycle") == Some(DEPRECATED)
            })
            .collect()
    }

    /// Keys whose owner is missing, malformed, a stub or not in the catalog.
    pub fn unknown_access_keys(&self) -> Vec<AccessKey<'a>> {
        self.access_keys()
            .into_iter()
            .filter(|key| {
                key.entity.namespace() == STUB_NAMESPACE
                    || match &key.owner {
                        None => true,
                        Some(owner) => {
                            owner.namespace == STUB_NAMESPACE || key.resolved_owner.is_none()
                        }
                    }
            })
            .collect()
    }

    pub fn user_access_keys(&self) -> Vec<AccessKey<'a>> {
        self.access_keys()
            .into_iter()
            .filter(AccessKey::is_user_owned)
            .collect()
    }

    /// Signer reference to the signer and the keys held by the signer's owner.
    pub fn access_keys_per_signer(&self) -> BTreeMap<EntityRef, SignerKeys<'a>> {
        let mut by_owner: BTreeMap<EntityRef, Vec<AccessKey<'a>>> = BTreeMap::new();
        for key in self.access_keys() {
            if let Some(owner) = key.owner.clone() {
                by_owner.entry(owner).or_default().push(key);
            }
        }

        self.signers()
            .into_iter()
            .map(|signer| {
                let keys = signer
                    .owner
                    .as_ref()
                    .and_then(|owner| by_owner.get(owner))
                    .cloned()
                    .unwrap_or_default();
                (signer.entity.entity_ref(), SignerKeys { signer, keys })
            })
            .collect()
    }

    /// Owner name to keys, for keys not owned by a user.
    pub fn access_keys_per_contract(&self) -> BTreeMap<String, Vec<AccessKey<'a>>> {
        let mut by_contract: BTreeMap<String, Vec<AccessKey<'a>>> = BTreeMap::new();
        for key in self.access_keys() {
            let Some(owner) = key.owner.as_ref() else {
                continue;
            };
            if owner.is_kind(crate::types::USER_KIND) {
                continue;
            }
            by_contract.entry(owner.name.clone()).or_default().push(key);
        }
        by_contract
    }

    pub fn unresolved(&self) -> UnresolvedCounts {
        UnresolvedCounts {
            multisigs: self.multisigs().iter().filter(|m| m.is_degraded()).count(),
            signers: self.signers().iter().filter(|s| s.owner.is_none()).count(),
            access_keys: self.access_keys().iter().filter(|k| k.owner.is_none()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entity(kind: &str, name: &str, spec: serde_json::Value) -> Entity {
        let mut entity = Entity::new(kind, name);
        if let serde_json::Value::Object(map) = spec {
            entity.spec = map;
        }
        entity
    }

    fn key(name: &str, owner: &str) -> Entity {
        entity(
            "Resource",
            name,
            json!({ "type": ACCESS_KEY_TYPE, "owner": owner }),
        )
    }

    fn names(keys: &[AccessKey<'_>]) -> Vec<String> {
        keys.iter().map(|k| k.entity.name().to_string()).collect()
    }

    fn catalog() -> Vec<Entity> {
        let mut stub_key = key("stub-key", "user:default/ghost");
        stub_key.metadata.namespace = Some(STUB_NAMESPACE.to_string());
        let mut deprecated = key("old-key", "user:default/alice");
        deprecated.metadata.tags.push(DEPRECATED.to_string());

        vec![
            entity("User", "alice", json!({})),
            entity("Component", "token", json!({ "type": "contract" })),
            entity(
                "API",
                "treasury-safe",
                json!({
                    "owner": "group:default/finance",
                    "system": "system:default/treasury",
                    "address": "0xsafe",
                    "multisig": { "version": "1.3.0", "fetchDate": "2024-01-01T00:00:00Z" }
                }),
            ),
            entity(
                "Resource",
                "alice-ledger",
                json!({ "type": SIGNER_TYPE, "owner": "user:default/alice", "address": "0xa1" }),
            ),
            key("alice-key", "user:default/alice"),
            key("token-admin", "contract:default/token"),
            key("safe-module", "api:default/treasury-safe"),
            key("orphan", "user:default/bob"),
            key("broken", "not-a-reference"),
            entity(
                "Resource",
                "lifecycle-key",
                json!({ "type": ACCESS_KEY_TYPE, "owner": "contract:default/token", "lifecycle": "deprecated" }),
            ),
            stub_key,
            deprecated,
        ]
    }

    #[test]
    fn partitions_groups() {
        let entities = catalog();
        let collector = MultisigsCollector::new(&entities);

        let multisigs = collector.multisigs();
        assert_eq!(multisigs.len(), 1);
        assert_eq!(multisigs[0].version, Some(1.3));
        assert_eq!(multisigs[0].fetch_date, Some(1_704_067_200));
        assert_eq!(multisigs[0].system.as_ref().map(|s| s.name.as_str()), Some("treasury"));

        assert_eq!(collector.signers().len(), 1);
        assert_eq!(collector.access_keys().len(), 8);
        assert_eq!(names(&collector.multisig_access_keys()), vec!["safe-module"]);
        assert_eq!(
            names(&collector.deprecated_access_keys()),
            vec!["lifecycle-key", "old-key"]
        );
        assert_eq!(
            names(&collector.unknown_access_keys()),
            vec!["orphan", "broken", "stub-key"]
        );
    }

    #[test]
    fn user_and_contract_keys_are_grouped_apart() {
        let entities = catalog();
        let collector = MultisigsCollector::new(&entities);

        let user_keys = collector.user_access_keys();
        assert!(names(&user_keys).contains(&"alice-key".to_string()));
        assert!(user_keys.iter().all(|k| k.owner_kind() == "user"));

        let per_contract = collector.access_keys_per_contract();
        assert_eq!(
            names(&per_contract["token"]),
            vec!["token-admin", "lifecycle-key"]
        );
        assert!(!per_contract.contains_key("alice"));
        assert!(per_contract.contains_key("treasury-safe"));
    }

    #[test]
    fn signers_join_keys_through_their_owner() {
        let entities = catalog();
        let collector = MultisigsCollector::new(&entities);

        let per_signer = collector.access_keys_per_signer();
        let signer_ref = EntityRef::new("resource", "default", "alice-ledger");
        let entry = &per_signer[&signer_ref];
        assert_eq!(entry.signer.owner_name(), "alice");
        assert_eq!(names(&entry.keys), vec!["alice-key", "old-key"]);
    }

    #[test]
    fn queries_are_repeatable() {
        let entities = catalog();
        let collector = MultisigsCollector::new(&entities);
        assert_eq!(
            names(&collector.unknown_access_keys()),
            names(&collector.unknown_access_keys())
        );
        assert_eq!(collector.unresolved(), collector.unresolved());
    }

    #[test]
    fn degraded_entities_are_counted() {
        let mut entities = catalog();
        entities.push(entity(
            "API",
            "legacy-safe",
            json!({ "multisig": { "version": "unknown" } }),
        ));
        entities.push(entity("Resource", "loose-signer", json!({ "type": SIGNER_TYPE })));
        let counts = MultisigsCollector::new(&entities).unresolved();
        assert_eq!(
            counts,
            UnresolvedCounts {
                multisigs: 1,
                signers: 1,
                access_keys: 1,
            }
        );
    }
}
