//! Widgets that surface monitors, checks, events, logs, SLOs and APM
//! services rather than plotting request queries.

use super::common::{CustomLink, WidgetTime, WidgetTitle};
use crate::error::ProviderError;
use crate::state::{StateMapping, StateReader, StateWriter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of monitors shown by a manage status widget.
pub const MANAGE_STATUS_DEFAULT_COUNT: i64 = 50;

/// Graph of a monitor's query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertGraphDefinition {
    /// Monitor ID.
    pub alert_id: String,
    /// `timeseries` or `toplist`.
    pub viz_type: String,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
}

impl StateMapping for AlertGraphDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            alert_id: reader.required_string("alert_id")?,
            viz_type: reader.required_string("viz_type")?,
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .set_string("alert_id", &self.alert_id)
            .set_string("viz_type", &self.viz_type);
        Ok(self.title.write(writer).map("time", &self.time)?.build())
    }
}

/// Current value of a monitor's query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertValueDefinition {
    /// Monitor ID.
    pub alert_id: String,
    /// Decimal places.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<i64>,
    /// Unit shown next to the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Value alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
}

impl StateMapping for AlertValueDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            alert_id: reader.required_string("alert_id")?,
            precision: reader.nonzero_int("precision"),
            unit: reader.string("unit"),
            text_align: reader.string("text_align"),
            title: WidgetTitle::read(reader),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .set_string("alert_id", &self.alert_id)
            .int("precision", self.precision)
            .string("unit", &self.unit)
            .string("text_align", &self.text_align);
        Ok(self.title.write(writer).build())
    }
}

/// Status of a service check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckStatusDefinition {
    /// Check name.
    pub check: String,
    /// `check` or `cluster`.
    pub grouping: String,
    /// Group reported by a single check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Tags to group by.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    /// Tags to filter by.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
}

impl StateMapping for CheckStatusDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            check: reader.required_string("check")?,
            grouping: reader.required_string("grouping")?,
            group: reader.string("group"),
            group_by: reader.strings("group_by"),
            tags: reader.strings("tags"),
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .set_string("check", &self.check)
            .set_string("grouping", &self.grouping)
            .string("group", &self.group)
            .strings("group_by", &self.group_by)
            .strings("tags", &self.tags);
        Ok(self.title.write(writer).map("time", &self.time)?.build())
    }
}

/// Stream of events matching a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventStreamDefinition {
    /// Event query.
    pub query: String,
    /// `s` or `l`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_size: Option<String>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
    /// Tag matching mode for the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_execution: Option<String>,
}

impl StateMapping for EventStreamDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: reader.required_string("query")?,
            event_size: reader.string("event_size"),
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
            tags_execution: reader.string("tags_execution"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .set_string("query", &self.query)
            .string("event_size", &self.event_size);
        Ok(self
            .title
            .write(writer)
            .map("time", &self.time)?
            .string("tags_execution", &self.tags_execution)
            .build())
    }
}

/// Timeline of events matching a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTimelineDefinition {
    /// Event query.
    pub query: String,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
    /// Tag matching mode for the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_execution: Option<String>,
}

impl StateMapping for EventTimelineDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: reader.required_string("query")?,
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
            tags_execution: reader.string("tags_execution"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new().set_string("query", &self.query);
        Ok(self
            .title
            .write(writer)
            .map("time", &self.time)?
            .string("tags_execution", &self.tags_execution)
            .build())
    }
}

/// Sort column of a log stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetFieldSort {
    /// Column to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// `asc` or `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

impl StateMapping for WidgetFieldSort {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            column: reader.string("column"),
            order: reader.string("order"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .string("column", &self.column)
            .string("order", &self.order)
            .build())
    }
}

/// Stream of log lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogStreamDefinition {
    /// Log indexes to read.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<String>,
    /// Deprecated index selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logset: Option<String>,
    /// Log query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Columns to show.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    /// Show the date column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_date_column: Option<bool>,
    /// Show the message column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_message_column: Option<bool>,
    /// `inline`, `expanded-md` or `expanded-lg`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_display: Option<String>,
    /// Sort order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<WidgetFieldSort>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
}

impl StateMapping for LogStreamDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            indexes: reader.strings("indexes"),
            logset: reader.string("logset"),
            query: reader.string("query"),
            columns: reader.strings("columns"),
            show_date_column: reader.bool("show_date_column"),
            show_message_column: reader.bool("show_message_column"),
            message_display: reader.string("message_display"),
            sort: reader
                .parse_block::<WidgetFieldSort>("sort")?
                .filter(|s| s.column.is_some() || s.order.is_some()),
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .strings("indexes", &self.indexes)
            .string("logset", &self.logset)
            .string("query", &self.query)
            .strings("columns", &self.columns)
            .bool("show_date_column", self.show_date_column)
            .bool("show_message_column", self.show_message_column)
            .string("message_display", &self.message_display)
            .block("sort", &self.sort)?;
        Ok(self.title.write(writer).map("time", &self.time)?.build())
    }
}

/// Summary of monitors matching a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManageStatusDefinition {
    /// Monitor query.
    pub query: String,
    /// `monitors`, `groups` or `combined`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_type: Option<String>,
    /// Sort order, e.g. `status,asc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Number of monitors shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    /// Offset of the first monitor shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// `counts`, `countsAndList` or `list`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_format: Option<String>,
    /// `background` or `text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_preference: Option<String>,
    /// Hide empty status counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_zero_counts: Option<bool>,
    /// Show when each monitor last triggered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_last_triggered: Option<bool>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
}

impl StateMapping for ManageStatusDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: reader.required_string("query")?,
            summary_type: reader.string("summary_type"),
            sort: reader.string("sort"),
            count: reader.int("count"),
            start: reader.int("start"),
            display_format: reader.string("display_format"),
            color_preference: reader.string("color_preference"),
            hide_zero_counts: reader.bool("hide_zero_counts"),
            show_last_triggered: reader.bool("show_last_triggered"),
            title: WidgetTitle::read(reader),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .set_string("query", &self.query)
            .string("summary_type", &self.summary_type)
            .string("sort", &self.sort)
            .int("count", self.count)
            .int("start", self.start)
            .string("display_format", &self.display_format)
            .string("color_preference", &self.color_preference)
            .bool("hide_zero_counts", self.hide_zero_counts)
            .bool("show_last_triggered", self.show_last_triggered);
        Ok(self.title.write(writer).build())
    }
}

/// Map of a service's upstream and downstream dependencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceMapDefinition {
    /// Service name.
    pub service: String,
    /// Environment and primary tag filters.
    pub filters: Vec<String>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Context menu links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_links: Vec<CustomLink>,
}

impl StateMapping for ServiceMapDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        let filters = reader.strings("filters");
        if filters.is_empty() {
            return Err(reader.invalid("filters", "at least one filter is required"));
        }
        Ok(Self {
            service: reader.required_string("service")?,
            filters,
            title: WidgetTitle::read(reader),
            custom_links: reader.parse_blocks("custom_link")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .set_string("service", &self.service)
            .value("filters", Value::from(self.filters.clone()));
        Ok(self
            .title
            .write(writer)
            .blocks("custom_link", &self.custom_links)?
            .build())
    }
}

/// Status of a service level objective.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SloDefinition {
    /// Always `detail`.
    pub view_type: String,
    /// SLO ID.
    pub slo_id: String,
    /// Show the remaining error budget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_error_budget: Option<bool>,
    /// `overall`, `component` or `both`.
    pub view_mode: String,
    /// Time windows, e.g. `7d`, `30d`.
    pub time_windows: Vec<String>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
}

impl StateMapping for SloDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        let time_windows = reader.strings("time_windows");
        if time_windows.is_empty() {
            return Err(reader.invalid("time_windows", "at least one time window is required"));
        }
        Ok(Self {
            view_type: reader.required_string("view_type")?,
            slo_id: reader.required_string("slo_id")?,
            show_error_budget: reader.bool("show_error_budget"),
            view_mode: reader.required_string("view_mode")?,
            time_windows,
            title: WidgetTitle::read(reader),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .set_string("view_type", &self.view_type)
            .set_string("slo_id", &self.slo_id)
            .bool("show_error_budget", self.show_error_budget)
            .set_string("view_mode", &self.view_mode)
            .value("time_windows", Value::from(self.time_windows.clone()));
        Ok(self.title.write(writer).build())
    }
}

/// Summary of an APM service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceServiceDefinition {
    /// APM environment.
    pub env: String,
    /// Service name.
    pub service: String,
    /// Operation name.
    pub span_name: String,
    /// Show the hits graph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_hits: Option<bool>,
    /// Show the errors graph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_errors: Option<bool>,
    /// Show the latency graph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_latency: Option<bool>,
    /// Show the latency breakdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_breakdown: Option<bool>,
    /// Show the latency distribution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_distribution: Option<bool>,
    /// Show the resource list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_resource_list: Option<bool>,
    /// `small`, `medium` or `large`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_format: Option<String>,
    /// `one_column`, `two_column` or `three_column`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_format: Option<String>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
}

impl StateMapping for TraceServiceDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            env: reader.required_string("env")?,
            service: reader.required_string("service")?,
            span_name: reader.required_string("span_name")?,
            show_hits: reader.bool("show_hits"),
            show_errors: reader.bool("show_errors"),
            show_latency: reader.bool("show_latency"),
            show_breakdown: reader.bool("show_breakdown"),
            show_distribution: reader.bool("show_distribution"),
            show_resource_list: reader.bool("show_resource_list"),
            size_format: reader.string("size_format"),
            display_format: reader.string("display_format"),
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .set_string("env", &self.env)
            .set_string("service", &self.service)
            .set_string("span_name", &self.span_name)
            .bool("show_hits", self.show_hits)
            .bool("show_errors", self.show_errors)
            .bool("show_latency", self.show_latency)
            .bool("show_breakdown", self.show_breakdown)
            .bool("show_distribution", self.show_distribution)
            .bool("show_resource_list", self.show_resource_list)
            .string("size_format", &self.size_format)
            .string("display_format", &self.display_format);
        Ok(self.title.write(writer).map("time", &self.time)?.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::WidgetDefinition;
    use serde_json::json;

    #[test]
    fn test_manage_status_sends_count_and_start_when_present() {
        let state = json!({
            "query": "env:prod",
            "summary_type": "monitors",
            "sort": "status,asc",
            "count": 50,
            "start": 0,
            "hide_zero_counts": true
        });
        let definition = ManageStatusDefinition::from_state(&StateReader::new(&state)).unwrap();
        let api = serde_json::to_value(&definition).unwrap();

        assert_eq!(api["count"], json!(50));
        assert_eq!(api["start"], json!(0));
        assert_eq!(api["sort"], json!("status,asc"));
        assert_eq!(definition.to_state().unwrap(), state);
    }

    #[test]
    fn test_log_stream_sort_is_a_single_block() {
        let state = json!({
            "indexes": ["main"],
            "query": "status:error",
            "columns": ["host", "service"],
            "message_display": "expanded-md",
            "sort": [{"column": "time", "order": "desc"}],
            "time": {"live_span": "4h"}
        });
        let definition = LogStreamDefinition::from_state(&StateReader::new(&state)).unwrap();
        let api = serde_json::to_value(&definition).unwrap();

        assert_eq!(api["sort"], json!({"column": "time", "order": "desc"}));
        assert!(api.get("logset").is_none());
        assert_eq!(definition.to_state().unwrap(), state);
    }

    #[test]
    fn test_empty_log_stream_sort_is_dropped() {
        let state = json!({"indexes": ["main"], "sort": [{"column": ""}]});
        let definition = LogStreamDefinition::from_state(&StateReader::new(&state)).unwrap();
        assert!(definition.sort.is_none());
    }

    #[test]
    fn test_slo_requires_time_windows() {
        let state = json!({
            "view_type": "detail",
            "slo_id": "56789",
            "view_mode": "overall",
            "time_windows": []
        });
        let reader = StateReader::new(&state);
        let err = SloDefinition::from_state(&reader).unwrap_err();
        assert!(err.message().contains("time_windows"));
    }

    #[test]
    fn test_servicemap_loads_filters() {
        let api = json!({
            "type": "servicemap",
            "service": "master-db",
            "filters": ["env:prod", "datacenter:us1.prod.dog"],
            "title": "env: prod"
        });
        let definition: ServiceMapDefinition = serde_json::from_value(api).unwrap();
        assert_eq!(
            definition.to_state().unwrap(),
            json!({
                "service": "master-db",
                "filters": ["env:prod", "datacenter:us1.prod.dog"],
                "title": "env: prod"
            })
        );
    }

    #[test]
    fn test_alert_value_precision_zero_is_unset() {
        let state = json!({"alert_id": "895605", "precision": 0, "unit": "b"});
        let definition = AlertValueDefinition::from_state(&StateReader::new(&state)).unwrap();
        assert_eq!(definition.precision, None);
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({"alert_id": "895605", "unit": "b"})
        );
    }

    /// Read `state` as the widget block `key`, check the API type tag and
    /// return the API body alongside the state written back.
    fn round_trip(key: &str, state: &Value, type_tag: &str) -> (Value, Value) {
        let definition = WidgetDefinition::read(key, &StateReader::new(state)).unwrap();
        let api = serde_json::to_value(&definition).unwrap();
        assert_eq!(api["type"], json!(type_tag));
        let (entry, written) = definition.to_state_entry().unwrap();
        assert_eq!(entry, key);
        (api, written)
    }

    #[test]
    fn test_check_status_round_trip() {
        let state = json!({
            "check": "aws.ecs.agent_connected",
            "grouping": "cluster",
            "group_by": ["account", "cluster"],
            "tags": ["account:demo", "cluster:awseb-ruthebdog-env-8-dn3m6u3gvk"],
            "title": "Agent status",
            "title_align": "left",
            "time": {"live_span": "1h"}
        });
        let (api, written) = round_trip("check_status_definition", &state, "check_status");

        assert_eq!(api["grouping"], json!("cluster"));
        assert_eq!(api["group_by"], json!(["account", "cluster"]));
        assert_eq!(api["time"], json!({"live_span": "1h"}));
        assert!(api.get("group").is_none());
        assert_eq!(written, state);
    }

    #[test]
    fn test_event_stream_round_trip() {
        let state = json!({
            "query": "*",
            "event_size": "l",
            "title": "Deploys",
            "title_size": "16",
            "time": {"live_span": "4h"},
            "tags_execution": "and"
        });
        let (api, written) = round_trip("event_stream_definition", &state, "event_stream");

        assert_eq!(api["event_size"], json!("l"));
        assert_eq!(api["title_size"], json!("16"));
        assert_eq!(api["tags_execution"], json!("and"));
        assert_eq!(written, state);
    }

    #[test]
    fn test_event_timeline_round_trip() {
        let state = json!({
            "query": "sources:deploy",
            "title": "Timeline",
            "time": {"live_span": "1d"},
            "tags_execution": "or"
        });
        let (api, written) = round_trip("event_timeline_definition", &state, "event_timeline");

        assert_eq!(api["query"], json!("sources:deploy"));
        assert!(api.get("event_size").is_none());
        assert_eq!(written, state);
    }

    #[test]
    fn test_trace_service_round_trip() {
        let state = json!({
            "env": "datad0g.com",
            "service": "alerting-cassandra",
            "span_name": "cassandra.query",
            "show_hits": true,
            "show_errors": true,
            "show_latency": false,
            "show_breakdown": true,
            "show_distribution": true,
            "show_resource_list": false,
            "size_format": "large",
            "display_format": "three_column",
            "title": "alerting-cassandra #env:datad0g.com",
            "time": {"live_span": "30m"}
        });
        let (api, written) = round_trip("trace_service_definition", &state, "trace_service");

        assert_eq!(api["span_name"], json!("cassandra.query"));
        assert_eq!(api["show_latency"], json!(false));
        assert_eq!(api["display_format"], json!("three_column"));
        assert_eq!(written, state);
    }
}
