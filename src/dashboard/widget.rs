//! Widgets and the definition dispatch.
//!
//! In state a widget carries exactly one `<kind>_definition` block; in the
//! API the definition is a single object tagged by its `type` field.

use super::content::{FreeTextDefinition, IframeDefinition, ImageDefinition, NoteDefinition};
use super::graphs::{
    ChangeDefinition, DistributionDefinition, HeatmapDefinition, HostmapDefinition,
    QueryTableDefinition, QueryValueDefinition, ScatterplotDefinition, TimeseriesDefinition,
    ToplistDefinition,
};
use super::monitors::{
    AlertGraphDefinition, AlertValueDefinition, CheckStatusDefinition, EventStreamDefinition,
    EventTimelineDefinition, LogStreamDefinition, ManageStatusDefinition, ServiceMapDefinition,
    SloDefinition, TraceServiceDefinition,
};
use crate::error::ProviderError;
use crate::state::{StateMapping, StateReader, StateWriter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// State block name of the group definition.
pub const GROUP_DEFINITION_KEY: &str = "group_definition";

/// State block names of every widget definition, group first.
pub const DEFINITION_KEYS: &[&str] = &[
    GROUP_DEFINITION_KEY,
    "alert_graph_definition",
    "alert_value_definition",
    "change_definition",
    "check_status_definition",
    "distribution_definition",
    "event_stream_definition",
    "event_timeline_definition",
    "free_text_definition",
    "heatmap_definition",
    "hostmap_definition",
    "iframe_definition",
    "image_definition",
    "log_stream_definition",
    "manage_status_definition",
    "note_definition",
    "query_value_definition",
    "query_table_definition",
    "scatterplot_definition",
    "servicemap_definition",
    "service_level_objective_definition",
    "timeseries_definition",
    "toplist_definition",
    "trace_service_definition",
];

/// Definition block names set on a widget block.
pub fn definitions_set(reader: &StateReader<'_>) -> Vec<&'static str> {
    DEFINITION_KEYS
        .iter()
        .copied()
        .filter(|key| reader.is_set(key))
        .collect()
}

/// A widget definition, tagged by its API `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetDefinition {
    /// Group of widgets.
    Group(GroupDefinition),
    /// Monitor graph.
    AlertGraph(AlertGraphDefinition),
    /// Monitor value.
    AlertValue(AlertValueDefinition),
    /// Change graph.
    Change(ChangeDefinition),
    /// Service check status.
    CheckStatus(CheckStatusDefinition),
    /// Distribution graph.
    Distribution(DistributionDefinition),
    /// Event stream.
    EventStream(EventStreamDefinition),
    /// Event timeline.
    EventTimeline(EventTimelineDefinition),
    /// Free text.
    FreeText(FreeTextDefinition),
    /// Heat map.
    Heatmap(HeatmapDefinition),
    /// Host map.
    Hostmap(HostmapDefinition),
    /// Embedded page.
    Iframe(IframeDefinition),
    /// Embedded image.
    Image(ImageDefinition),
    /// Log stream.
    LogStream(LogStreamDefinition),
    /// Monitor summary.
    ManageStatus(ManageStatusDefinition),
    /// Markdown note.
    Note(NoteDefinition),
    /// Query value.
    QueryValue(QueryValueDefinition),
    /// Query table.
    QueryTable(QueryTableDefinition),
    /// Scatter plot.
    Scatterplot(ScatterplotDefinition),
    /// Service map.
    #[serde(rename = "servicemap")]
    ServiceMap(ServiceMapDefinition),
    /// Service level objective.
    #[serde(rename = "slo")]
    Slo(SloDefinition),
    /// Timeseries graph.
    Timeseries(TimeseriesDefinition),
    /// Toplist.
    Toplist(ToplistDefinition),
    /// APM service summary.
    TraceService(TraceServiceDefinition),
    /// A type this provider does not model.
    #[serde(other)]
    Unsupported,
}

impl WidgetDefinition {
    /// Build a definition from the state block named `key`.
    pub fn read(key: &str, reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        let definition = match key {
            GROUP_DEFINITION_KEY => Self::Group(GroupDefinition::from_state(reader)?),
            "alert_graph_definition" => Self::AlertGraph(StateMapping::from_state(reader)?),
            "alert_value_definition" => Self::AlertValue(StateMapping::from_state(reader)?),
            "change_definition" => Self::Change(StateMapping::from_state(reader)?),
            "check_status_definition" => Self::CheckStatus(StateMapping::from_state(reader)?),
            "distribution_definition" => Self::Distribution(StateMapping::from_state(reader)?),
            "event_stream_definition" => Self::EventStream(StateMapping::from_state(reader)?),
            "event_timeline_definition" => Self::EventTimeline(StateMapping::from_state(reader)?),
            "free_text_definition" => Self::FreeText(StateMapping::from_state(reader)?),
            "heatmap_definition" => Self::Heatmap(StateMapping::from_state(reader)?),
            "hostmap_definition" => Self::Hostmap(StateMapping::from_state(reader)?),
            "iframe_definition" => Self::Iframe(StateMapping::from_state(reader)?),
            "image_definition" => Self::Image(StateMapping::from_state(reader)?),
            "log_stream_definition" => Self::LogStream(StateMapping::from_state(reader)?),
            "manage_status_definition" => Self::ManageStatus(StateMapping::from_state(reader)?),
            "note_definition" => Self::Note(StateMapping::from_state(reader)?),
            "query_value_definition" => Self::QueryValue(StateMapping::from_state(reader)?),
            "query_table_definition" => Self::QueryTable(StateMapping::from_state(reader)?),
            "scatterplot_definition" => Self::Scatterplot(StateMapping::from_state(reader)?),
            "servicemap_definition" => Self::ServiceMap(StateMapping::from_state(reader)?),
            "service_level_objective_definition" => Self::Slo(StateMapping::from_state(reader)?),
            "timeseries_definition" => Self::Timeseries(StateMapping::from_state(reader)?),
            "toplist_definition" => Self::Toplist(StateMapping::from_state(reader)?),
            "trace_service_definition" => Self::TraceService(StateMapping::from_state(reader)?),
            other => {
                return Err(ProviderError::Validation(format!(
                    "unknown widget definition '{}'",
                    other
                )))
            }
        };
        Ok(definition)
    }

    /// The state block name and flattened content of this definition.
    pub fn to_state_entry(&self) -> Result<(&'static str, Value), ProviderError> {
        let entry = match self {
            Self::Group(d) => (GROUP_DEFINITION_KEY, d.to_state()?),
            Self::AlertGraph(d) => ("alert_graph_definition", d.to_state()?),
            Self::AlertValue(d) => ("alert_value_definition", d.to_state()?),
            Self::Change(d) => ("change_definition", d.to_state()?),
            Self::CheckStatus(d) => ("check_status_definition", d.to_state()?),
            Self::Distribution(d) => ("distribution_definition", d.to_state()?),
            Self::EventStream(d) => ("event_stream_definition", d.to_state()?),
            Self::EventTimeline(d) => ("event_timeline_definition", d.to_state()?),
            Self::FreeText(d) => ("free_text_definition", d.to_state()?),
            Self::Heatmap(d) => ("heatmap_definition", d.to_state()?),
            Self::Hostmap(d) => ("hostmap_definition", d.to_state()?),
            Self::Iframe(d) => ("iframe_definition", d.to_state()?),
            Self::Image(d) => ("image_definition", d.to_state()?),
            Self::LogStream(d) => ("log_stream_definition", d.to_state()?),
            Self::ManageStatus(d) => ("manage_status_definition", d.to_state()?),
            Self::Note(d) => ("note_definition", d.to_state()?),
            Self::QueryValue(d) => ("query_value_definition", d.to_state()?),
            Self::QueryTable(d) => ("query_table_definition", d.to_state()?),
            Self::Scatterplot(d) => ("scatterplot_definition", d.to_state()?),
            Self::ServiceMap(d) => ("servicemap_definition", d.to_state()?),
            Self::Slo(d) => ("service_level_objective_definition", d.to_state()?),
            Self::Timeseries(d) => ("timeseries_definition", d.to_state()?),
            Self::Toplist(d) => ("toplist_definition", d.to_state()?),
            Self::TraceService(d) => ("trace_service_definition", d.to_state()?),
            Self::Unsupported => {
                return Err(ProviderError::Sdk("unsupported widget type".to_string()))
            }
        };
        Ok(entry)
    }

    /// Returns true for group definitions.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

/// Position and size of a widget on a free layout dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetLayout {
    /// Horizontal position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    /// Vertical position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    /// Width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    /// Height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
}

// Layout is a map of strings in state; values that do not parse are skipped.
impl StateMapping for WidgetLayout {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            x: reader.int("x"),
            y: reader.int("y"),
            width: reader.int("width"),
            height: reader.int("height"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .int_string("x", self.x)
            .int_string("y", self.y)
            .int_string("height", self.height)
            .int_string("width", self.width)
            .build())
    }
}

/// One dashboard widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// What the widget shows.
    pub definition: WidgetDefinition,
    /// Where the widget sits on a free layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<WidgetLayout>,
}

impl StateMapping for Widget {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        let keys = definitions_set(reader);
        let key = match keys.as_slice() {
            [] => {
                return Err(ProviderError::Validation(
                    "failed to find valid definition in widget configuration".to_string(),
                ))
            }
            [key] => *key,
            _ => {
                return Err(reader.invalid(
                    keys[1],
                    format!("only one widget definition is allowed, found {}", keys.join(", ")),
                ))
            }
        };
        let block = reader.block(key).ok_or_else(|| {
            ProviderError::Validation(
                "failed to find valid definition in widget configuration".to_string(),
            )
        })?;

        Ok(Self {
            definition: WidgetDefinition::read(key, &block)?,
            layout: reader.parse_map("layout")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let (key, definition) = self.definition.to_state_entry()?;
        StateWriter::new()
            .value(key, Value::Array(vec![definition]))
            .map("layout", &self.layout)
            .map(StateWriter::build)
    }
}

/// A titled group of non-group widgets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDefinition {
    /// Always `ordered`.
    pub layout_type: String,
    /// Group title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Member widgets.
    pub widgets: Vec<Widget>,
}

impl StateMapping for GroupDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        let widgets = reader
            .blocks("widget")
            .iter()
            .map(|block| {
                let widget = Widget::from_state(block)?;
                if widget.definition.is_group() {
                    return Err(block.invalid(
                        GROUP_DEFINITION_KEY,
                        "group widgets cannot be nested",
                    ));
                }
                Ok(widget)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            layout_type: reader.required_string("layout_type")?,
            title: reader.string("title"),
            widgets,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("layout_type", &self.layout_type)
            .string("title", &self.title)
            .blocks("widget", &self.widgets)?
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_widget_without_definition_fails() {
        let state = json!({"layout": {"x": "1"}});
        let err = Widget::from_state(&StateReader::new(&state)).unwrap_err();
        assert_eq!(
            err.message(),
            "failed to find valid definition in widget configuration"
        );
    }

    #[test]
    fn test_widget_with_two_definitions_fails() {
        let state = json!({
            "note_definition": [{"content": "a"}],
            "free_text_definition": [{"text": "b"}]
        });
        let err = Widget::from_state(&StateReader::new(&state)).unwrap_err();
        assert!(err.message().contains("only one widget definition"));
    }

    #[test]
    fn test_widget_builds_tagged_definition_and_layout() {
        let state = json!({
            "note_definition": [{"content": "hello", "background_color": "yellow"}],
            "layout": {"x": "5", "y": "10", "width": "20", "height": "nope"}
        });
        let widget = Widget::from_state(&StateReader::new(&state)).unwrap();
        let api = serde_json::to_value(&widget).unwrap();

        assert_eq!(
            api,
            json!({
                "definition": {"type": "note", "content": "hello", "background_color": "yellow"},
                "layout": {"x": 5, "y": 10, "width": 20}
            })
        );
    }

    #[test]
    fn test_widget_loads_from_api() {
        let api = json!({
            "id": 123,
            "definition": {"type": "slo", "view_type": "detail", "slo_id": "abc",
                "view_mode": "overall", "time_windows": ["7d", "30d"]},
            "layout": {"x": 0, "y": 2, "width": 40, "height": 15}
        });
        let widget: Widget = serde_json::from_value(api).unwrap();
        let state = widget.to_state().unwrap();

        assert_eq!(
            state["service_level_objective_definition"][0]["time_windows"],
            json!(["7d", "30d"])
        );
        assert_eq!(
            state["layout"],
            json!({"x": "0", "y": "2", "width": "40", "height": "15"})
        );
    }

    #[test]
    fn test_unknown_api_type_fails_to_flatten() {
        let api = json!({"definition": {"type": "sunburst", "requests": []}});
        let widget: Widget = serde_json::from_value(api).unwrap();
        assert_eq!(widget.definition, WidgetDefinition::Unsupported);

        let err = widget.to_state().unwrap_err();
        assert_eq!(err.message(), "unsupported widget type");
    }

    #[test]
    fn test_group_rejects_nested_groups() {
        let state = json!({
            "group_definition": [{
                "layout_type": "ordered",
                "widget": [{"group_definition": [{"layout_type": "ordered", "widget": []}]}]
            }]
        });
        let err = Widget::from_state(&StateReader::new(&state)).unwrap_err();
        assert!(err.message().contains("cannot be nested"));
        assert!(err
            .message()
            .starts_with("group_definition.0.widget.0.group_definition"));
    }

    #[test]
    fn test_group_round_trips_members() {
        let state = json!({
            "group_definition": [{
                "layout_type": "ordered",
                "title": "Group",
                "widget": [
                    {"note_definition": [{"content": "inside"}]},
                    {"alert_graph_definition": [{"alert_id": "1", "viz_type": "toplist"}]}
                ]
            }]
        });
        let widget = Widget::from_state(&StateReader::new(&state)).unwrap();
        let api = serde_json::to_value(&widget).unwrap();
        assert_eq!(api["definition"]["type"], json!("group"));
        assert_eq!(api["definition"]["widgets"][1]["definition"]["type"], json!("alert_graph"));

        let loaded: Widget = serde_json::from_value(api).unwrap();
        assert_eq!(loaded.to_state().unwrap(), state);
    }
}
