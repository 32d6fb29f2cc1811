use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod paths;

/// One `include` row of the CI matrix: everything a workflow needs to decide
/// which checks to run for a component and where.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    pub name: String,
    pub tags: Vec<String>,
    /// Source directory relative to the repository root, `.` for the root.
    pub path: String,
    pub changed: bool,
    pub run_tests: bool,
    pub security_tier: i64,
    pub allow_tests_to_fail: bool,
    pub node_root: String,
    pub go_version: String,
    pub is_solidity: bool,
    pub is_rust: bool,
    pub is_go: bool,
    pub run_slither: bool,
    pub slither_args: String,
    pub run_clippy: bool,
    pub run_go_static_checks: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, JsonSchema)]
pub struct ComponentMatrix {
    pub include: Vec<ComponentConfig>,
}

impl ComponentMatrix {
    pub fn len(&self) -> usize {
        self.include.len()
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ComponentConfig> {
        self.include.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Count,
    Rate,
    #[default]
    Gauge,
}

/// Dimension attached to a series point, e.g. `{type: "owner", name: "alice"}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct MetricTag {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl MetricTag {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeriesPoint {
    pub metric_name: String,
    #[serde(rename = "type", default)]
    pub metric_type: MetricType,
    /// Seconds since the unix epoch.
    pub timestamp: i64,
    pub value: f64,
    pub tags: Vec<MetricTag>,
}

impl MetricSeriesPoint {
    pub fn gauge(metric_name: &str, timestamp: i64, value: f64, tags: Vec<MetricTag>) -> Self {
        Self {
            metric_name: metric_name.to_string(),
            metric_type: MetricType::Gauge,
            timestamp,
            value,
            tags,
        }
    }

    pub fn tag(&self, kind: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.name.as_str())
    }
}

/// Independently submitted group of points.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct MetricBatch {
    pub name: String,
    pub series: Vec<MetricSeriesPoint>,
}

impl MetricBatch {
    pub fn new(name: impl Into<String>, series: Vec<MetricSeriesPoint>) -> Self {
        Self {
            name: name.into(),
            series,
        }
    }
}

pub fn component_matrix_schema() -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(schemars::schema_for!(ComponentMatrix))
}

pub fn metric_batch_schema() -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(schemars::schema_for!(MetricBatch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn matrix_uses_workflow_field_names() {
        let matrix = ComponentMatrix {
            include: vec![ComponentConfig {
                name: "bridge".to_string(),
                tags: vec!["near".to_string()],
                path: ".".to_string(),
                changed: true,
                run_tests: true,
                security_tier: -1,
                allow_tests_to_fail: true,
                node_root: ".".to_string(),
                go_version: "1.18".to_string(),
                is_solidity: false,
                is_rust: true,
                is_go: false,
                run_slither: false,
                slither_args: String::new(),
                run_clippy: true,
                run_go_static_checks: false,
            }],
        };
        let json = serde_json::to_value(&matrix).unwrap();
        let row = &json["include"][0];
        assert_eq!(row["runClippy"], true);
        assert_eq!(row["allowTestsToFail"], true);
        assert_eq!(row["goVersion"], "1.18");
        assert_eq!(matrix.get("bridge").map(|c| c.is_rust), Some(true));
    }

    #[test]
    fn metric_points_serialize_tags_as_type_name_pairs() {
        let point = MetricSeriesPoint::gauge(
            "backstage.signers",
            1_700_000_000,
            1.0,
            vec![MetricTag::new("host", "backstage.example.com")],
        );
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["metricName"], "backstage.signers");
        assert_eq!(json["type"], "gauge");
        assert_eq!(json["tags"][0]["type"], "host");
        assert_eq!(point.tag("host"), Some("backstage.example.com"));
    }

    #[test]
    fn schemas_describe_public_shapes() {
        let matrix = component_matrix_schema().unwrap().to_string();
        assert!(matrix.contains("runSlither"));
        let batch = metric_batch_schema().unwrap().to_string();
        assert!(batch.contains("metricName"));
    }
}
