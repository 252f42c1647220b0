//! Graph widgets: definitions driven by metric or event queries.

use super::common::{
    ConditionalFormat, CustomLink, RequestStyle, WidgetAxis, WidgetEvent, WidgetMarker,
    WidgetStyle, WidgetTime, WidgetTitle,
};
use super::query::{QueryKind, RequestQuery};
use crate::error::ProviderError;
use crate::state::{StateMapping, StateReader, StateWriter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Requests
// ============================================================================

/// Request of a change widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeRequest {
    /// The query.
    #[serde(flatten)]
    pub query: Option<RequestQuery>,
    /// `absolute` or `relative`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_type: Option<String>,
    /// Period to compare against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_to: Option<String>,
    /// Whether an increase is good.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increase_good: Option<bool>,
    /// `change`, `name`, `present` or `past`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// `asc` or `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_dir: Option<String>,
    /// Show the present value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_present: Option<bool>,
}

impl StateMapping for ChangeRequest {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: RequestQuery::read(reader, QueryKind::STANDARD)?,
            change_type: reader.string("change_type"),
            compare_to: reader.string("compare_to"),
            increase_good: reader.bool("increase_good"),
            order_by: reader.string("order_by"),
            order_dir: reader.string("order_dir"),
            show_present: reader.bool("show_present"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(RequestQuery::write(&self.query, StateWriter::new())?
            .string("change_type", &self.change_type)
            .string("compare_to", &self.compare_to)
            .bool("increase_good", self.increase_good)
            .string("order_by", &self.order_by)
            .string("order_dir", &self.order_dir)
            .bool("show_present", self.show_present)
            .build())
    }
}

/// Request with an optional palette, used by distribution and heatmap widgets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyledRequest {
    /// The query.
    #[serde(flatten)]
    pub query: Option<RequestQuery>,
    /// Request style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<WidgetStyle>,
}

impl StateMapping for StyledRequest {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: RequestQuery::read(reader, QueryKind::STANDARD)?,
            style: reader.parse_block("style")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(RequestQuery::write(&self.query, StateWriter::new())?
            .block("style", &self.style)?
            .build())
    }
}

/// Request of a query value widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryValueRequest {
    /// The query.
    #[serde(flatten)]
    pub query: Option<RequestQuery>,
    /// Coloring rules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditional_formats: Vec<ConditionalFormat>,
    /// `avg`, `last`, `max`, `min` or `sum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregator: Option<String>,
}

impl StateMapping for QueryValueRequest {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: RequestQuery::read(reader, QueryKind::STANDARD)?,
            conditional_formats: reader.parse_blocks("conditional_formats")?,
            aggregator: reader.string("aggregator"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(RequestQuery::write(&self.query, StateWriter::new())?
            .blocks("conditional_formats", &self.conditional_formats)?
            .string("aggregator", &self.aggregator)
            .build())
    }
}

/// Request of a query table widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRequest {
    /// The query.
    #[serde(flatten)]
    pub query: Option<RequestQuery>,
    /// Coloring rules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditional_formats: Vec<ConditionalFormat>,
    /// Column alias.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Time aggregator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregator: Option<String>,
    /// Number of rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// `asc` or `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Display mode per cell, `number` or `bar`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cell_display_mode: Vec<String>,
}

impl StateMapping for TableRequest {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: RequestQuery::read(reader, QueryKind::TABLE)?,
            conditional_formats: reader.parse_blocks("conditional_formats")?,
            alias: reader.string("alias"),
            aggregator: reader.string("aggregator"),
            limit: reader.nonzero_int("limit"),
            order: reader.string("order"),
            cell_display_mode: reader.strings("cell_display_mode"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(RequestQuery::write(&self.query, StateWriter::new())?
            .blocks("conditional_formats", &self.conditional_formats)?
            .string("alias", &self.alias)
            .string("aggregator", &self.aggregator)
            .int("limit", self.limit)
            .string("order", &self.order)
            .strings("cell_display_mode", &self.cell_display_mode)
            .build())
    }
}

/// One axis request of a scatterplot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterplotRequest {
    /// The query.
    #[serde(flatten)]
    pub query: Option<RequestQuery>,
    /// Aggregator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregator: Option<String>,
}

impl StateMapping for ScatterplotRequest {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: RequestQuery::read(reader, QueryKind::STANDARD)?,
            aggregator: reader.string("aggregator"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(RequestQuery::write(&self.query, StateWriter::new())?
            .string("aggregator", &self.aggregator)
            .build())
    }
}

/// The x and y requests of a scatterplot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterplotRequests {
    /// Horizontal axis request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<ScatterplotRequest>,
    /// Vertical axis request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<ScatterplotRequest>,
}

impl StateMapping for ScatterplotRequests {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            x: reader.parse_block("x")?,
            y: reader.parse_block("y")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .block("x", &self.x)?
            .block("y", &self.y)?
            .build())
    }
}

/// Expression alias of a timeseries request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeseriesMetadata {
    /// Expression name.
    pub expression: String,
    /// Alias shown in the legend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_name: Option<String>,
}

impl StateMapping for TimeseriesMetadata {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            expression: reader.required_string("expression")?,
            alias_name: reader.string("alias_name"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("expression", &self.expression)
            .string("alias_name", &self.alias_name)
            .build())
    }
}

/// Request of a timeseries widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeseriesRequest {
    /// The query.
    #[serde(flatten)]
    pub query: Option<RequestQuery>,
    /// Line style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<RequestStyle>,
    /// Expression aliases.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<TimeseriesMetadata>,
    /// `area`, `bars` or `line`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    /// Plot against the right axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_right_yaxis: Option<bool>,
}

impl StateMapping for TimeseriesRequest {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: RequestQuery::read(reader, QueryKind::TIMESERIES)?,
            style: reader.parse_block("style")?,
            metadata: reader.parse_blocks("metadata")?,
            display_type: reader.string("display_type"),
            on_right_yaxis: reader.bool("on_right_yaxis"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(RequestQuery::write(&self.query, StateWriter::new())?
            .block("style", &self.style)?
            .blocks("metadata", &self.metadata)?
            .string("display_type", &self.display_type)
            .bool("on_right_yaxis", self.on_right_yaxis)
            .build())
    }
}

/// Request of a toplist widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToplistRequest {
    /// The query.
    #[serde(flatten)]
    pub query: Option<RequestQuery>,
    /// Coloring rules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditional_formats: Vec<ConditionalFormat>,
    /// Request style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<WidgetStyle>,
}

impl StateMapping for ToplistRequest {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: RequestQuery::read(reader, QueryKind::STANDARD)?,
            conditional_formats: reader.parse_blocks("conditional_formats")?,
            style: reader.parse_block("style")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(RequestQuery::write(&self.query, StateWriter::new())?
            .blocks("conditional_formats", &self.conditional_formats)?
            .block("style", &self.style)?
            .build())
    }
}

/// Fill or size request of a host map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostmapRequest {
    /// The query.
    #[serde(flatten)]
    pub query: Option<RequestQuery>,
}

impl StateMapping for HostmapRequest {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            query: RequestQuery::read(reader, QueryKind::STANDARD)?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(RequestQuery::write(&self.query, StateWriter::new())?.build())
    }
}

/// The fill and size requests of a host map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostmapRequests {
    /// Query coloring the hexagons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<HostmapRequest>,
    /// Query sizing the hexagons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<HostmapRequest>,
}

impl StateMapping for HostmapRequests {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            fill: reader.parse_block("fill")?,
            size: reader.parse_block("size")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .block("fill", &self.fill)?
            .block("size", &self.size)?
            .build())
    }
}

/// Host map coloring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostmapStyle {
    /// Color palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<String>,
    /// Reverse the palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette_flip: Option<bool>,
    /// Lower bound of the fill scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_min: Option<String>,
    /// Upper bound of the fill scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_max: Option<String>,
}

impl StateMapping for HostmapStyle {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            palette: reader.string("palette"),
            palette_flip: reader.bool("palette_flip"),
            fill_min: reader.string("fill_min"),
            fill_max: reader.string("fill_max"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .string("palette", &self.palette)
            .bool("palette_flip", self.palette_flip)
            .string("fill_min", &self.fill_min)
            .string("fill_max", &self.fill_max)
            .build())
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// Change widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeDefinition {
    /// Requests.
    pub requests: Vec<ChangeRequest>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
    /// Context menu links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_links: Vec<CustomLink>,
}

impl StateMapping for ChangeDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            requests: reader.parse_blocks("request")?,
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
            custom_links: reader.parse_blocks("custom_link")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new().blocks("request", &self.requests)?;
        Ok(self
            .title
            .write(writer)
            .map("time", &self.time)?
            .blocks("custom_link", &self.custom_links)?
            .build())
    }
}

/// Distribution widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionDefinition {
    /// Requests.
    pub requests: Vec<StyledRequest>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Legend size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_size: Option<String>,
    /// Show the legend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_legend: Option<bool>,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
}

impl StateMapping for DistributionDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            requests: reader.parse_blocks("request")?,
            title: WidgetTitle::read(reader),
            legend_size: reader.string("legend_size"),
            show_legend: reader.bool("show_legend"),
            time: reader.parse_map("time")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new().blocks("request", &self.requests)?;
        Ok(self
            .title
            .write(writer)
            .string("legend_size", &self.legend_size)
            .bool("show_legend", self.show_legend)
            .map("time", &self.time)?
            .build())
    }
}

/// Heat map widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapDefinition {
    /// Requests.
    pub requests: Vec<StyledRequest>,
    /// Y axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<WidgetAxis>,
    /// Event overlays.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<WidgetEvent>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Show the legend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_legend: Option<bool>,
    /// Legend size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_size: Option<String>,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
    /// Context menu links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_links: Vec<CustomLink>,
}

impl StateMapping for HeatmapDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            requests: reader.parse_blocks("request")?,
            yaxis: reader.parse_block("yaxis")?,
            events: reader.parse_blocks("event")?,
            title: WidgetTitle::read(reader),
            show_legend: reader.bool("show_legend"),
            legend_size: reader.string("legend_size"),
            time: reader.parse_map("time")?,
            custom_links: reader.parse_blocks("custom_link")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .blocks("request", &self.requests)?
            .block("yaxis", &self.yaxis)?
            .blocks("event", &self.events)?;
        Ok(self
            .title
            .write(writer)
            .bool("show_legend", self.show_legend)
            .string("legend_size", &self.legend_size)
            .map("time", &self.time)?
            .blocks("custom_link", &self.custom_links)?
            .build())
    }
}

/// Host map widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostmapDefinition {
    /// Fill and size requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<HostmapRequests>,
    /// `host` or `container`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Show hosts without metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_metric_hosts: Option<bool>,
    /// Show hosts without groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_group_hosts: Option<bool>,
    /// Tags to group by.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<String>,
    /// Tags to filter by.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    /// Coloring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<HostmapStyle>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Context menu links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_links: Vec<CustomLink>,
}

impl StateMapping for HostmapDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            requests: reader.parse_block("request")?,
            node_type: reader.string("node_type"),
            no_metric_hosts: reader.bool("no_metric_hosts"),
            no_group_hosts: reader.bool("no_group_hosts"),
            group: reader.strings("group"),
            scope: reader.strings("scope"),
            style: reader.parse_block("style")?,
            title: WidgetTitle::read(reader),
            custom_links: reader.parse_blocks("custom_link")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .block("request", &self.requests)?
            .string("node_type", &self.node_type)
            .bool("no_metric_hosts", self.no_metric_hosts)
            .bool("no_group_hosts", self.no_group_hosts)
            .strings("group", &self.group)
            .strings("scope", &self.scope)
            .block("style", &self.style)?;
        Ok(self
            .title
            .write(writer)
            .blocks("custom_link", &self.custom_links)?
            .build())
    }
}

/// Query value widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryValueDefinition {
    /// Requests.
    pub requests: Vec<QueryValueRequest>,
    /// Scale the value automatically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<bool>,
    /// Unit shown next to the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_unit: Option<String>,
    /// Decimal places.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<i64>,
    /// Value alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
    /// Context menu links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_links: Vec<CustomLink>,
}

impl StateMapping for QueryValueDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            requests: reader.parse_blocks("request")?,
            autoscale: reader.bool("autoscale"),
            custom_unit: reader.string("custom_unit"),
            precision: reader.nonzero_int("precision"),
            text_align: reader.string("text_align"),
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
            custom_links: reader.parse_blocks("custom_link")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .blocks("request", &self.requests)?
            .bool("autoscale", self.autoscale)
            .string("custom_unit", &self.custom_unit)
            .int("precision", self.precision)
            .string("text_align", &self.text_align);
        Ok(self
            .title
            .write(writer)
            .map("time", &self.time)?
            .blocks("custom_link", &self.custom_links)?
            .build())
    }
}

/// Query table widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryTableDefinition {
    /// Requests.
    pub requests: Vec<TableRequest>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
    /// Context menu links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_links: Vec<CustomLink>,
    /// `always`, `never` or `auto`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_search_bar: Option<String>,
}

impl StateMapping for QueryTableDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            requests: reader.parse_blocks("request")?,
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
            custom_links: reader.parse_blocks("custom_link")?,
            has_search_bar: reader.string("has_search_bar"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new().blocks("request", &self.requests)?;
        Ok(self
            .title
            .write(writer)
            .map("time", &self.time)?
            .blocks("custom_link", &self.custom_links)?
            .string("has_search_bar", &self.has_search_bar)
            .build())
    }
}

/// Scatter plot widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterplotDefinition {
    /// X and y requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<ScatterplotRequests>,
    /// X axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<WidgetAxis>,
    /// Y axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<WidgetAxis>,
    /// Tags used to color points.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub color_by_groups: Vec<String>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
    /// Context menu links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_links: Vec<CustomLink>,
}

impl StateMapping for ScatterplotDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            requests: reader.parse_block("request")?,
            xaxis: reader.parse_block("xaxis")?,
            yaxis: reader.parse_block("yaxis")?,
            color_by_groups: reader.strings("color_by_groups"),
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
            custom_links: reader.parse_blocks("custom_link")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .block("request", &self.requests)?
            .block("xaxis", &self.xaxis)?
            .block("yaxis", &self.yaxis)?
            .strings("color_by_groups", &self.color_by_groups);
        Ok(self
            .title
            .write(writer)
            .map("time", &self.time)?
            .blocks("custom_link", &self.custom_links)?
            .build())
    }
}

/// Timeseries widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeseriesDefinition {
    /// Requests.
    pub requests: Vec<TimeseriesRequest>,
    /// Marker lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<WidgetMarker>,
    /// Event overlays.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<WidgetEvent>,
    /// Left y axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<WidgetAxis>,
    /// Right y axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_yaxis: Option<WidgetAxis>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Show the legend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_legend: Option<bool>,
    /// Legend size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_size: Option<String>,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
    /// Context menu links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_links: Vec<CustomLink>,
}

impl StateMapping for TimeseriesDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            requests: reader.parse_blocks("request")?,
            markers: reader.parse_blocks("marker")?,
            events: reader.parse_blocks("event")?,
            yaxis: reader.parse_block("yaxis")?,
            right_yaxis: reader.parse_block("right_yaxis")?,
            title: WidgetTitle::read(reader),
            show_legend: reader.bool("show_legend"),
            legend_size: reader.string("legend_size"),
            time: reader.parse_map("time")?,
            custom_links: reader.parse_blocks("custom_link")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new()
            .blocks("request", &self.requests)?
            .blocks("marker", &self.markers)?
            .blocks("event", &self.events)?
            .block("yaxis", &self.yaxis)?
            .block("right_yaxis", &self.right_yaxis)?;
        Ok(self
            .title
            .write(writer)
            .bool("show_legend", self.show_legend)
            .string("legend_size", &self.legend_size)
            .map("time", &self.time)?
            .blocks("custom_link", &self.custom_links)?
            .build())
    }
}

/// Toplist widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToplistDefinition {
    /// Requests.
    pub requests: Vec<ToplistRequest>,
    /// Title settings.
    #[serde(flatten)]
    pub title: WidgetTitle,
    /// Time frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<WidgetTime>,
    /// Context menu links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_links: Vec<CustomLink>,
}

impl StateMapping for ToplistDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            requests: reader.parse_blocks("request")?,
            title: WidgetTitle::read(reader),
            time: reader.parse_map("time")?,
            custom_links: reader.parse_blocks("custom_link")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let writer = StateWriter::new().blocks("request", &self.requests)?;
        Ok(self
            .title
            .write(writer)
            .map("time", &self.time)?
            .blocks("custom_link", &self.custom_links)?
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::WidgetDefinition;
    use serde_json::json;

    #[test]
    fn test_timeseries_definition_builds_api_shape() {
        let state = json!({
            "request": [{
                "q": "avg:system.cpu.user{app:web}",
                "display_type": "line",
                "style": [{"palette": "warm", "line_type": "dashed", "line_width": "thin"}],
                "metadata": [{"expression": "avg:system.cpu.user{app:web}", "alias_name": "cpu"}]
            }],
            "marker": [{"value": "y = 4", "display_type": "error dashed", "label": "high"}],
            "event": [{"q": "sources:deploy", "tags_execution": "and"}],
            "yaxis": [{"scale": "log", "include_zero": false}],
            "title": "CPU",
            "show_legend": true,
            "legend_size": "2",
            "time": {"live_span": "1h"}
        });
        let definition = TimeseriesDefinition::from_state(&StateReader::new(&state)).unwrap();
        let api = serde_json::to_value(&definition).unwrap();

        assert_eq!(api["requests"][0]["q"], json!("avg:system.cpu.user{app:web}"));
        assert_eq!(api["requests"][0]["style"]["line_type"], json!("dashed"));
        assert_eq!(api["requests"][0]["metadata"][0]["alias_name"], json!("cpu"));
        assert_eq!(api["markers"][0]["label"], json!("high"));
        assert_eq!(api["events"][0]["q"], json!("sources:deploy"));
        assert_eq!(api["yaxis"], json!({"scale": "log", "include_zero": false}));
        assert_eq!(api["title"], json!("CPU"));
        assert_eq!(api["time"], json!({"live_span": "1h"}));
        assert!(api.get("right_yaxis").is_none());
        assert!(api.get("custom_links").is_none());

        assert_eq!(definition.to_state().unwrap(), state);
    }

    #[test]
    fn test_timeseries_request_accepts_network_query() {
        let api = json!({
            "requests": [{"network_query": {"index": "netflow", "compute": {"aggregation": "sum", "facet": "bytes"}}}]
        });
        let definition: TimeseriesDefinition = serde_json::from_value(api).unwrap();
        let state = definition.to_state().unwrap();
        assert_eq!(
            state["request"][0]["network_query"],
            json!([{"index": "netflow", "compute": {"aggregation": "sum", "facet": "bytes"}}])
        );
    }

    #[test]
    fn test_hostmap_requests_nest_fill_and_size() {
        let state = json!({
            "request": [{
                "fill": [{"q": "avg:system.load.1{*} by {host}"}],
                "size": [{"process_query": [{"metric": "process.stat.cpu.total_pct", "filter_by": ["nginx"]}]}]
            }],
            "node_type": "host",
            "group": ["region"],
            "style": [{"palette": "green_to_orange", "palette_flip": true}]
        });
        let definition = HostmapDefinition::from_state(&StateReader::new(&state)).unwrap();
        let api = serde_json::to_value(&definition).unwrap();

        assert_eq!(
            api["requests"]["fill"],
            json!({"q": "avg:system.load.1{*} by {host}"})
        );
        assert_eq!(
            api["requests"]["size"]["process_query"]["filter_by"],
            json!(["nginx"])
        );
        assert_eq!(api["style"]["palette_flip"], json!(true));
        assert_eq!(definition.to_state().unwrap(), state);
    }

    #[test]
    fn test_scatterplot_requests_use_x_and_y() {
        let api = json!({
            "requests": {
                "x": {"q": "avg:system.cpu.user{*} by {host}", "aggregator": "avg"},
                "y": {"q": "avg:system.mem.used{*} by {host}", "aggregator": "max"}
            },
            "color_by_groups": ["service"],
            "title_align": "center"
        });
        let definition: ScatterplotDefinition = serde_json::from_value(api).unwrap();
        let state = definition.to_state().unwrap();

        assert_eq!(
            state["request"][0]["y"],
            json!([{"q": "avg:system.mem.used{*} by {host}", "aggregator": "max"}])
        );
        assert_eq!(state["color_by_groups"], json!(["service"]));
        assert_eq!(state["title_align"], json!("center"));
    }

    #[test]
    fn test_query_table_request_with_apm_stats_query() {
        let state = json!({
            "request": [{
                "apm_stats_query": [{
                    "service": "web",
                    "name": "rack.request",
                    "env": "prod",
                    "primary_tag": "datacenter:us1",
                    "row_type": "resource",
                    "columns": [{"name": "hits", "order": "desc"}]
                }],
                "limit": 0,
                "cell_display_mode": ["number", "bar"]
            }],
            "has_search_bar": "auto"
        });
        let definition = QueryTableDefinition::from_state(&StateReader::new(&state)).unwrap();
        let api = serde_json::to_value(&definition).unwrap();

        assert_eq!(api["requests"][0]["apm_stats_query"]["row_type"], json!("resource"));
        assert!(api["requests"][0].get("limit").is_none());
        assert_eq!(api["requests"][0]["cell_display_mode"], json!(["number", "bar"]));
        assert_eq!(api["has_search_bar"], json!("auto"));
    }

    #[test]
    fn test_query_value_precision_zero_is_unset() {
        let state = json!({
            "request": [{"q": "sum:requests{*}", "aggregator": "sum",
                "conditional_formats": [{"comparator": ">", "value": 10, "palette": "white_on_red"}]}],
            "precision": 0,
            "autoscale": true,
            "custom_unit": "req"
        });
        let definition = QueryValueDefinition::from_state(&StateReader::new(&state)).unwrap();
        assert_eq!(definition.precision, None);

        let api = serde_json::to_value(&definition).unwrap();
        assert_eq!(api["requests"][0]["conditional_formats"][0]["value"], json!(10.0));
        assert_eq!(api["autoscale"], json!(true));
    }

    #[test]
    fn test_change_request_options() {
        let state = json!({
            "request": [{
                "q": "sum:requests{*}",
                "change_type": "relative",
                "compare_to": "week_before",
                "increase_good": false,
                "order_by": "change",
                "order_dir": "desc",
                "show_present": true
            }],
            "custom_link": [{"label": "runbook", "link": "https://example.com/runbook"}]
        });
        let definition = ChangeDefinition::from_state(&StateReader::new(&state)).unwrap();
        let api = serde_json::to_value(&definition).unwrap();

        assert_eq!(api["requests"][0]["compare_to"], json!("week_before"));
        assert_eq!(api["requests"][0]["increase_good"], json!(false));
        assert_eq!(api["custom_links"][0]["label"], json!("runbook"));
        assert_eq!(definition.to_state().unwrap(), state);
    }

    fn round_trip(key: &str, state: &Value, type_tag: &str) -> (Value, Value) {
        let definition = WidgetDefinition::read(key, &StateReader::new(state)).unwrap();
        let api = serde_json::to_value(&definition).unwrap();
        assert_eq!(api["type"], json!(type_tag));
        let (entry, written) = definition.to_state_entry().unwrap();
        assert_eq!(entry, key);
        (api, written)
    }

    #[test]
    fn test_distribution_round_trip() {
        let state = json!({
            "request": [{
                "q": "avg:system.load.1{env:staging} by {account}",
                "style": [{"palette": "warm"}]
            }],
            "title": "Load",
            "legend_size": "2",
            "show_legend": false,
            "time": {"live_span": "1h"}
        });
        let (api, written) = round_trip("distribution_definition", &state, "distribution");

        assert_eq!(api["requests"][0]["q"], json!("avg:system.load.1{env:staging} by {account}"));
        assert_eq!(api["requests"][0]["style"], json!({"palette": "warm"}));
        assert_eq!(api["show_legend"], json!(false));
        assert_eq!(written, state);
    }

    #[test]
    fn test_heatmap_round_trip() {
        let state = json!({
            "request": [{"q": "avg:system.load.1{env:staging} by {account}", "style": [{"palette": "blue"}]}],
            "yaxis": [{"min": "1", "max": "2", "include_zero": true, "scale": "sqrt"}],
            "event": [{"q": "sources:test tags:1", "tags_execution": "and"}],
            "title": "Heat",
            "show_legend": true,
            "legend_size": "2",
            "time": {"live_span": "1mo"},
            "custom_link": [{"label": "Runbook", "link": "https://example.com/runbook"}]
        });
        let (api, written) = round_trip("heatmap_definition", &state, "heatmap");

        assert_eq!(api["requests"][0]["style"], json!({"palette": "blue"}));
        assert_eq!(
            api["yaxis"],
            json!({"min": "1", "max": "2", "include_zero": true, "scale": "sqrt"})
        );
        assert_eq!(api["events"][0]["q"], json!("sources:test tags:1"));
        assert_eq!(api["custom_links"][0]["label"], json!("Runbook"));
        assert_eq!(written, state);
    }

    #[test]
    fn test_toplist_round_trip() {
        let state = json!({
            "request": [{
                "q": "avg:system.cpu.user{app:general} by {env}",
                "conditional_formats": [
                    {"comparator": "<", "value": 2.5, "palette": "white_on_green"},
                    {"comparator": ">", "value": 2.5, "palette": "white_on_red"}
                ],
                "style": [{"palette": "dog_classic"}]
            }],
            "title": "Top CPU",
            "time": {"live_span": "1w"}
        });
        let (api, written) = round_trip("toplist_definition", &state, "toplist");

        assert_eq!(api["requests"][0]["conditional_formats"][1]["palette"], json!("white_on_red"));
        assert_eq!(api["requests"][0]["conditional_formats"][0]["value"], json!(2.5));
        assert_eq!(api["requests"][0]["style"], json!({"palette": "dog_classic"}));
        assert!(api.get("custom_links").is_none());
        assert_eq!(written, state);
    }
}
