//! `Chart.yaml` schema: the handful of fields chartbump reads.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value as Yaml;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Helm chart manifest. Unknown keys (dependencies, maintainers, ...) are ignored.
pub struct ChartManifest {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub version: String,
    #[serde(
        default,
        deserialize_with = "opt_scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_version: Option<String>,
}

/// Render a YAML scalar as text so `version: 1.0.0`, `version: "1.0.0"` and
/// `appVersion: 2` all read back as strings.
pub(crate) fn scalar_to_string(v: Yaml) -> Result<Option<String>, String> {
    match v {
        Yaml::Null => Ok(None),
        Yaml::String(s) => Ok(Some(s)),
        Yaml::Number(n) => Ok(Some(n.to_string())),
        Yaml::Bool(b) => Ok(Some(b.to_string())),
        Yaml::Tagged(t) => scalar_to_string(t.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err("expected a scalar value".to_string()),
    }
}

fn scalar_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(opt_scalar_text(d)?.unwrap_or_default())
}

fn opt_scalar_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Yaml::deserialize(d)?;
    scalar_to_string(v).map_err(serde::de::Error::custom)
}
