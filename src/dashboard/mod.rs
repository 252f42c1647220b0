//! Dashboard model and its mapping between state and the API.
//!
//! Every API structure here derives `Serialize`/`Deserialize` for the wire
//! format and implements [`StateMapping`] for the state shape. Building
//! (state to API) and flattening (API to state) therefore live next to the
//! type they convert.

pub mod common;
pub mod content;
pub mod graphs;
pub mod monitors;
pub mod query;
pub mod rules;
pub mod schema;
pub mod widget;

pub use widget::{GroupDefinition, Widget, WidgetDefinition, WidgetLayout};

use crate::error::ProviderError;
use crate::state::{StateMapping, StateReader, StateWriter};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Resource type name of the dashboard.
pub const DASHBOARD_RESOURCE: &str = "datadog_dashboard";

/// Deserialize an explicit `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// How widgets are arranged on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    /// Widgets flow in order; the dashboard is a timeboard.
    #[default]
    Ordered,
    /// Widgets are positioned freely; the dashboard is a screenboard.
    Free,
}

impl LayoutType {
    /// All accepted layout names.
    pub const NAMES: &'static [&'static str] = &["ordered", "free"];

    /// The layout name used in state and the API.
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutType::Ordered => "ordered",
            LayoutType::Free => "free",
        }
    }

    /// The dashboard type used by dashboard list items.
    pub fn dashboard_list_type(self) -> &'static str {
        match self {
            LayoutType::Ordered => "custom_timeboard",
            LayoutType::Free => "custom_screenboard",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordered" => Ok(LayoutType::Ordered),
            "free" => Ok(LayoutType::Free),
            other => Err(ProviderError::Validation(format!(
                "invalid layout_type '{}', expected one of: {}",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

/// A dashboard template variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateVariable {
    /// Variable name.
    pub name: String,
    /// Tag prefix offered in the dropdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Value selected on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl StateMapping for TemplateVariable {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            name: reader.required_string("name")?,
            prefix: reader.string("prefix"),
            default: reader.string("default"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let prefix = self.prefix.clone().filter(|p| !p.is_empty());
        Ok(StateWriter::new()
            .set_string("name", &self.name)
            .string("prefix", &prefix)
            .string("default", &self.default)
            .build())
    }
}

/// Value assumed by one variable under a preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateVariablePresetValue {
    /// Variable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variable value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl StateMapping for TemplateVariablePresetValue {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            name: reader.string("name"),
            value: reader.string("value"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .string("name", &self.name)
            .string("value", &self.value)
            .build())
    }
}

/// A named set of template variable values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateVariablePreset {
    /// Preset name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variable values.
    #[serde(deserialize_with = "null_as_default")]
    pub template_variables: Vec<TemplateVariablePresetValue>,
}

impl StateMapping for TemplateVariablePreset {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            name: reader.string("name"),
            template_variables: reader.parse_blocks("template_variable")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let values = self
            .template_variables
            .iter()
            .map(StateMapping::to_state)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StateWriter::new()
            .string("name", &self.name)
            .value("template_variable", Value::Array(values))
            .build())
    }
}

/// A dashboard as sent to and returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dashboard {
    /// Dashboard ID, assigned by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Dashboard title.
    pub title: String,
    /// Dashboard description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Widget arrangement.
    pub layout_type: LayoutType,
    /// Restrict editing to the author and administrators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read_only: Option<bool>,
    /// Handles notified of changes.
    #[serde(deserialize_with = "null_as_default")]
    pub notify_list: Vec<String>,
    /// Template variables.
    #[serde(deserialize_with = "null_as_default")]
    pub template_variables: Vec<TemplateVariable>,
    /// Template variable presets.
    #[serde(deserialize_with = "null_as_default")]
    pub template_variable_presets: Vec<TemplateVariablePreset>,
    /// Dashboard URL path, assigned by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Widgets.
    #[serde(deserialize_with = "null_as_default")]
    pub widgets: Vec<Widget>,
}

impl StateMapping for Dashboard {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        let layout_type = reader.required_string("layout_type")?.parse()?;

        Ok(Self {
            id: reader.string("id"),
            title: reader.required_string("title")?,
            description: reader.string("description"),
            layout_type,
            is_read_only: reader.bool("is_read_only"),
            notify_list: reader.strings("notify_list"),
            template_variables: reader.parse_blocks("template_variable")?,
            template_variable_presets: reader.parse_blocks("template_variable_preset")?,
            url: None,
            widgets: reader.parse_blocks("widget")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("title", &self.title)
            .set_string("layout_type", self.layout_type.as_str())
            .string("description", &self.description)
            .bool("is_read_only", self.is_read_only)
            .string("url", &self.url)
            .blocks("widget", &self.widgets)?
            .blocks("template_variable", &self.template_variables)?
            .blocks("template_variable_preset", &self.template_variable_presets)?
            .strings("notify_list", &self.notify_list)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ordered_state() -> Value {
        json!({
            "title": "Ops",
            "description": "Created by the provider",
            "layout_type": "ordered",
            "is_read_only": true,
            "notify_list": ["ops@example.com"],
            "template_variable": [
                {"name": "var_1", "prefix": "host", "default": "aws"},
                {"name": "var_2", "prefix": ""}
            ],
            "template_variable_preset": [{
                "name": "preset_1",
                "template_variable": [{"name": "var_1", "value": "host.dc"}]
            }],
            "widget": [{"note_definition": [{"content": "hello"}]}]
        })
    }

    #[test]
    fn test_dashboard_builds_api_body() {
        let state = ordered_state();
        let dashboard = Dashboard::from_state(&StateReader::new(&state)).unwrap();
        let body = serde_json::to_value(&dashboard).unwrap();

        assert_eq!(body["layout_type"], json!("ordered"));
        assert_eq!(body["is_read_only"], json!(true));
        assert_eq!(body["notify_list"], json!(["ops@example.com"]));
        assert_eq!(body["template_variables"][1], json!({"name": "var_2"}));
        assert_eq!(
            body["template_variable_presets"][0]["template_variables"][0],
            json!({"name": "var_1", "value": "host.dc"})
        );
        assert_eq!(body["widgets"][0]["definition"]["type"], json!("note"));
        assert!(body.get("id").is_none());
        assert!(body.get("url").is_none());
    }

    #[test]
    fn test_dashboard_loads_api_response() {
        let response = json!({
            "id": "abc-def-ghi",
            "title": "Ops",
            "description": null,
            "layout_type": "free",
            "is_read_only": false,
            "notify_list": null,
            "template_variables": [{"name": "env", "prefix": "", "default": "prod"}],
            "template_variable_presets": null,
            "url": "/dashboard/abc-def-ghi/ops",
            "widgets": [{
                "id": 1,
                "definition": {"type": "free_text", "text": "Title", "font_size": "auto"},
                "layout": {"x": 0, "y": 0, "width": 24, "height": 6}
            }]
        });
        let dashboard: Dashboard = serde_json::from_value(response).unwrap();
        assert_eq!(dashboard.layout_type, LayoutType::Free);

        assert_eq!(
            dashboard.to_state().unwrap(),
            json!({
                "title": "Ops",
                "layout_type": "free",
                "is_read_only": false,
                "url": "/dashboard/abc-def-ghi/ops",
                "widget": [{
                    "free_text_definition": [{"text": "Title", "font_size": "auto"}],
                    "layout": {"x": "0", "y": "0", "width": "24", "height": "6"}
                }],
                "template_variable": [{"name": "env", "default": "prod"}]
            })
        );
    }

    #[test]
    fn test_layout_type_parsing() {
        assert_eq!("free".parse::<LayoutType>().unwrap(), LayoutType::Free);
        assert_eq!(
            LayoutType::Ordered.dashboard_list_type(),
            "custom_timeboard"
        );
        assert_eq!(LayoutType::Free.dashboard_list_type(), "custom_screenboard");

        let err = "grid".parse::<LayoutType>().unwrap_err();
        assert!(err.message().contains("invalid layout_type 'grid'"));
    }

    #[test]
    fn test_missing_title_fails_to_build() {
        let mut state = ordered_state();
        state["title"] = json!("");
        let err = Dashboard::from_state(&StateReader::new(&state)).unwrap_err();
        assert_eq!(err.message(), "missing required attribute 'title'");
    }
}
