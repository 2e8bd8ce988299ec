use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::OrgChartError;

pub const UNKNOWN_NAME: &str = "Unknown";

/// One flat row as supplied by the host data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    #[serde(default, deserialize_with = "identifier")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "identifier")]
    pub manager_id: Option<String>,
    #[serde(default = "unknown_name", deserialize_with = "display_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Back-reference to the host's own object. Never interpreted here.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub external_ref: Value,
}

impl EmployeeRecord {
    pub fn new(id: Option<&str>, manager_id: Option<&str>, name: &str) -> Self {
        Self {
            id: id.map(str::to_string),
            manager_id: manager_id.map(str::to_string),
            name: if name.is_empty() { unknown_name() } else { name.to_string() },
            title: None,
            profile_image: None,
            department: None,
            email: None,
            phone: None,
            external_ref: Value::Null,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    pub fn with_external_ref(mut self, external_ref: Value) -> Self {
        self.external_ref = external_ref;
        self
    }

    /// Copy with both identifiers in canonical form.
    pub fn normalized(&self) -> Self {
        Self {
            id: normalize_identifier(self.id.as_deref()),
            manager_id: normalize_identifier(self.manager_id.as_deref()),
            ..self.clone()
        }
    }

    /// True when the record is eligible to be the root: no manager, or its own manager.
    pub fn is_root_candidate(&self) -> bool {
        let manager = normalize_identifier(self.manager_id.as_deref());
        match manager {
            None => true,
            Some(manager) => normalize_identifier(self.id.as_deref()).as_deref() == Some(manager.as_str()),
        }
    }
}

/// Canonical identifier form. Hosts leak `"null"` and `"undefined"` as literal strings.
pub fn normalize_identifier(raw: Option<&str>) -> Option<String> {
    match raw {
        None | Some("") | Some("null") | Some("undefined") => None,
        Some(id) => Some(id.to_string()),
    }
}

fn unknown_name() -> String {
    UNKNOWN_NAME.to_string()
}

fn identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        // integral floats print without a fraction, so `1.0` links to `1`
        Value::Number(n) => Ok(Some(match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        })),
        other => Err(serde::de::Error::custom(format!(
            "identifier must be a string or number, got {}",
            other
        ))),
    }
}

fn display_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name.filter(|n| !n.is_empty()).unwrap_or_else(unknown_name))
}

pub fn parse_records(content: &str) -> Result<Vec<EmployeeRecord>, OrgChartError> {
    Ok(serde_json::from_str(content)?)
}

/// Reads a JSON array of employee records from disk.
pub fn load_records(path: &Path) -> Result<Vec<EmployeeRecord>, OrgChartError> {
    if !path.is_file() {
        return Err(OrgChartError::NotAFile(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_records(&content)
}
