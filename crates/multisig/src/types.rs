use serde::Serialize;
use serde_json::{Map, Value};

use catalog_ci_model::{Entity, EntityRef};

pub const UNKNOWN: &str = "unknown";
pub const USER_KIND: &str = "user";

/// Multisig wallet, parsed from an entity carrying a `spec.multisig` object.
#[derive(Debug, Clone)]
pub struct Multisig<'a> {
    pub entity: &'a Entity,
    pub address: Option<&'a str>,
    pub network: Option<&'a str>,
    pub network_type: Option<&'a str>,
    pub system: Option<EntityRef>,
    pub owner: Option<EntityRef>,
    /// `None` when the version is missing or not numeric.
    pub version: Option<f64>,
    /// Unix seconds of the last on-chain fetch.
    pub fetch_date: Option<i64>,
}

impl<'a> Multisig<'a> {
    pub fn from_entity(entity: &'a Entity, multisig: &'a Map<String, Value>) -> Self {
        Self {
            entity,
            address: entity.spec_str("address"),
            network: entity.spec_str("network"),
            network_type: entity.spec_str("networkType"),
            system: entity.spec_str("system").and_then(|raw| EntityRef::parse(raw).ok()),
            owner: entity.owner_reference().ok(),
            version: multisig.get("version").and_then(parse_version),
            fetch_date: multisig.get("fetchDate").and_then(parse_timestamp),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.owner.is_none() || self.version.is_none() || self.fetch_date.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Signer<'a> {
    pub entity: &'a Entity,
    pub address: Option<&'a str>,
    pub network: Option<&'a str>,
    pub network_type: Option<&'a str>,
    /// `None` when `spec.owner` is missing or malformed.
    pub owner: Option<EntityRef>,
    /// Unix seconds of the last signature, `None` if it never signed.
    pub last_signed: Option<i64>,
}

impl<'a> Signer<'a> {
    pub fn from_entity(entity: &'a Entity) -> Self {
        Self {
            entity,
            address: entity.spec_str("address"),
            network: entity.spec_str("network"),
            network_type: entity.spec_str("networkType"),
            owner: entity.owner_reference().ok(),
            last_signed: entity.spec.get("lastSigned").and_then(parse_timestamp),
        }
    }

    pub fn is_stub(&self) -> bool {
        self.entity.is_stub()
    }

    pub fn owner_name(&self) -> &str {
        self.owner.as_ref().map_or(UNKNOWN, |owner| owner.name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AccessKey<'a> {
    pub entity: &'a Entity,
    /// `None` when `spec.owner` is missing or malformed.
    pub owner: Option<EntityRef>,
    /// Entity the owner reference points at, if it is in the catalog.
    pub resolved_owner: Option<&'a Entity>,
}

impl AccessKey<'_> {
    pub fn owner_kind(&self) -> &str {
        self.owner.as_ref().map_or(UNKNOWN, |owner| owner.kind.as_str())
    }

    pub fn owner_name(&self) -> &str {
        self.owner.as_ref().map_or(UNKNOWN, |owner| owner.name.as_str())
    }

    pub fn is_user_owned(&self) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.is_kind(USER_KIND))
    }
}

/// A signer and the access keys held by its owner.
#[derive(Debug, Clone)]
pub struct SignerKeys<'a> {
    pub signer: Signer<'a>,
    pub keys: Vec<AccessKey<'a>>,
}

/// Entities that were classified but lost information on the way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnresolvedCounts {
    pub multisigs: usize,
    pub signers: usize,
    pub access_keys: usize,
}

impl UnresolvedCounts {
    pub fn groups(&self) -> [(&'static str, usize); 3] {
        [
            ("multisigs", self.multisigs),
            ("signers", self.signers),
            ("access-keys", self.access_keys),
        ]
    }
}

/// Numeric prefix of a version, `1.3.0` reads as `1.3`.
pub fn parse_version(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }
}

fn parse_leading_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + c.len_utf8();
    }
    let candidate = trimmed[..end].trim_end_matches('.');
    candidate.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// RFC 3339 string or integer seconds.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let s = s.trim();
            chrono::DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.timestamp())
                .ok()
                .or_else(|| s.parse::<i64>().ok())
        }
        _ => None,
    }
}
