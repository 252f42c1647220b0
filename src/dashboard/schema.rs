//! Schema of the `datadog_dashboard` resource.

use super::query::QueryKind;
use super::widget::{DEFINITION_KEYS, GROUP_DEFINITION_KEY};
use super::LayoutType;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Block, NestedBlock, Schema};
use serde_json::json;

const TEXT_ALIGN: &[&str] = &["center", "left", "right"];
const SORT_ORDER: &[&str] = &["asc", "desc"];
const COMPARATORS: &[&str] = &[">", ">=", "<", "<="];
const AGGREGATORS: &[&str] = &["avg", "last", "max", "min", "sum"];
const CELL_DISPLAY_MODES: &[&str] = &["number", "bar"];

/// Palettes accepted by conditional formats.
pub const CONDITIONAL_FORMAT_PALETTES: &[&str] = &[
    "blue",
    "custom_bg",
    "custom_image",
    "custom_text",
    "gray_on_white",
    "grey",
    "green",
    "orange",
    "red",
    "red_on_white",
    "white_on_gray",
    "white_on_green",
    "green_on_white",
    "white_on_red",
    "white_on_yellow",
    "yellow_on_white",
    "black_on_light_yellow",
    "black_on_light_green",
    "black_on_light_red",
];

/// Sort orders accepted by manage status widgets.
pub const MANAGE_STATUS_SORTS: &[&str] = &[
    "name",
    "group",
    "status",
    "tags",
    "triggered",
    "group,asc",
    "group,desc",
    "name,asc",
    "name,desc",
    "status,asc",
    "status,desc",
    "tags,asc",
    "tags,desc",
    "triggered,asc",
    "triggered,desc",
];

/// Build the full resource schema.
pub fn dashboard_schema() -> Schema {
    Schema::v0()
        .with_description("Provides a Datadog dashboard resource.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "title",
            Attribute::required_string().with_description("The title of the dashboard."),
        )
        .with_attribute(
            "layout_type",
            Attribute::required_string()
                .with_description("The layout type of the dashboard.")
                .with_one_of(LayoutType::NAMES)
                .with_force_new(),
        )
        .with_attribute(
            "description",
            Attribute::optional_string().with_description("The description of the dashboard."),
        )
        .with_attribute(
            "is_read_only",
            Attribute::optional_bool()
                .with_description("Whether this dashboard is read-only.")
                .with_default(json!(false)),
        )
        .with_attribute(
            "url",
            Attribute::new(
                AttributeType::String,
                AttributeFlags::optional_computed(),
            )
            .with_description("The URL of the dashboard."),
        )
        .with_attribute(
            "notify_list",
            Attribute::optional_list(AttributeType::String)
                .with_description("Handles of users to notify when changes are made."),
        )
        .with_attribute(
            "dashboard_lists",
            Attribute::new(
                AttributeType::set(AttributeType::Int64),
                AttributeFlags::optional(),
            )
            .with_description("IDs of the dashboard lists to add the dashboard to."),
        )
        .with_attribute(
            "dashboard_lists_removed",
            Attribute::new(
                AttributeType::set(AttributeType::Int64),
                AttributeFlags::computed(),
            )
            .with_description("IDs of the dashboard lists the dashboard was removed from."),
        )
        .with_block(
            "widget",
            NestedBlock::list(widget_block(true)).with_min_items(1),
        )
        .with_block("template_variable", NestedBlock::list(template_variable_block()))
        .with_block(
            "template_variable_preset",
            NestedBlock::list(template_variable_preset_block()),
        )
}

fn template_variable_block() -> Block {
    Block::new()
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The name of the variable."),
        )
        .with_attribute(
            "prefix",
            Attribute::optional_string()
                .with_description("Only tags with this prefix appear in the variable dropdown."),
        )
        .with_attribute(
            "default",
            Attribute::optional_string().with_description("The default value on dashboard load."),
        )
}

fn template_variable_preset_block() -> Block {
    let value = Block::new()
        .with_attribute("name", Attribute::required_string())
        .with_attribute("value", Attribute::required_string());
    Block::new()
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The name of the preset."),
        )
        .with_block(
            "template_variable",
            NestedBlock::list(value).with_min_items(1),
        )
}

/// Widget block. Group members use `allow_group = false`.
fn widget_block(allow_group: bool) -> Block {
    let mut block = Block::new().with_attribute(
        "layout",
        Attribute::optional_map(AttributeType::String)
            .with_description("Position and size of the widget on a free layout dashboard."),
    );
    for key in DEFINITION_KEYS {
        if *key == GROUP_DEFINITION_KEY {
            if allow_group {
                block = block.with_block(*key, NestedBlock::list_max_one(group_definition()));
            }
            continue;
        }
        block = block.with_block(*key, NestedBlock::list_max_one(definition_block(key)));
    }
    block
}

fn group_definition() -> Block {
    Block::new()
        .with_attribute(
            "layout_type",
            Attribute::required_string().with_one_of(&["ordered"]),
        )
        .with_attribute("title", Attribute::optional_string())
        .with_block(
            "widget",
            NestedBlock::list(widget_block(false)).with_min_items(1),
        )
}

fn definition_block(key: &str) -> Block {
    match key {
        "alert_graph_definition" => with_title(Block::new())
            .with_attribute("alert_id", Attribute::required_string())
            .with_attribute(
                "viz_type",
                Attribute::required_string().with_one_of(&["timeseries", "toplist"]),
            )
            .with_attribute("time", time_attribute()),
        "alert_value_definition" => with_title(Block::new())
            .with_attribute("alert_id", Attribute::required_string())
            .with_attribute("precision", Attribute::optional_int64())
            .with_attribute("unit", Attribute::optional_string())
            .with_attribute("text_align", text_align()),
        "change_definition" => with_graph_extras(with_title(Block::new()))
            .with_block("request", NestedBlock::list(change_request())),
        "check_status_definition" => with_title(Block::new())
            .with_attribute("check", Attribute::required_string())
            .with_attribute(
                "grouping",
                Attribute::required_string().with_one_of(&["check", "cluster"]),
            )
            .with_attribute("group", Attribute::optional_string())
            .with_attribute("group_by", Attribute::optional_list(AttributeType::String))
            .with_attribute("tags", Attribute::optional_list(AttributeType::String))
            .with_attribute("time", time_attribute()),
        "distribution_definition" => with_legend(with_title(Block::new()))
            .with_attribute("time", time_attribute())
            .with_block("request", NestedBlock::list(styled_request())),
        "event_stream_definition" => with_title(Block::new())
            .with_attribute("query", Attribute::required_string())
            .with_attribute(
                "event_size",
                Attribute::optional_string().with_one_of(&["s", "l"]),
            )
            .with_attribute("time", time_attribute())
            .with_attribute("tags_execution", Attribute::optional_string()),
        "event_timeline_definition" => with_title(Block::new())
            .with_attribute("query", Attribute::required_string())
            .with_attribute("time", time_attribute())
            .with_attribute("tags_execution", Attribute::optional_string()),
        "free_text_definition" => Block::new()
            .with_attribute("text", Attribute::required_string())
            .with_attribute("color", Attribute::optional_string())
            .with_attribute("font_size", Attribute::optional_string())
            .with_attribute("text_align", text_align()),
        "heatmap_definition" => with_graph_extras(with_legend(with_title(Block::new())))
            .with_block("request", NestedBlock::list(styled_request()))
            .with_block("yaxis", NestedBlock::list_max_one(axis_block()))
            .with_block("event", NestedBlock::list(event_block())),
        "hostmap_definition" => with_title(Block::new())
            .with_block("request", NestedBlock::list_max_one(hostmap_requests()))
            .with_attribute(
                "node_type",
                Attribute::optional_string().with_one_of(&["host", "container"]),
            )
            .with_attribute("no_metric_hosts", Attribute::optional_bool())
            .with_attribute("no_group_hosts", Attribute::optional_bool())
            .with_attribute("group", Attribute::optional_list(AttributeType::String))
            .with_attribute("scope", Attribute::optional_list(AttributeType::String))
            .with_block("style", NestedBlock::list_max_one(hostmap_style()))
            .with_block("custom_link", NestedBlock::list(custom_link_block())),
        "iframe_definition" => Block::new().with_attribute("url", Attribute::required_string()),
        "image_definition" => Block::new()
            .with_attribute("url", Attribute::required_string())
            .with_attribute(
                "sizing",
                Attribute::optional_string().with_one_of(&["zoom", "fit", "center"]),
            )
            .with_attribute(
                "margin",
                Attribute::optional_string().with_one_of(&["small", "large"]),
            ),
        "log_stream_definition" => with_title(Block::new())
            .with_attribute("indexes", Attribute::optional_list(AttributeType::String))
            .with_attribute(
                "logset",
                Attribute::optional_string().with_deprecation("Use `indexes` instead."),
            )
            .with_attribute("query", Attribute::optional_string())
            .with_attribute("columns", Attribute::optional_list(AttributeType::String))
            .with_attribute("show_date_column", Attribute::optional_bool())
            .with_attribute("show_message_column", Attribute::optional_bool())
            .with_attribute(
                "message_display",
                Attribute::optional_string().with_one_of(&[
                    "inline",
                    "expanded-md",
                    "expanded-lg",
                ]),
            )
            .with_attribute("time", time_attribute())
            .with_block(
                "sort",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute("column", Attribute::required_string())
                        .with_attribute("order", Attribute::required_string().with_one_of(SORT_ORDER)),
                ),
            ),
        "manage_status_definition" => with_title(Block::new())
            .with_attribute("query", Attribute::required_string())
            .with_attribute(
                "summary_type",
                Attribute::optional_string().with_one_of(&["monitors", "groups", "combined"]),
            )
            .with_attribute(
                "sort",
                Attribute::optional_string().with_one_of(MANAGE_STATUS_SORTS),
            )
            .with_attribute(
                "count",
                Attribute::optional_int64()
                    .with_default(json!(super::monitors::MANAGE_STATUS_DEFAULT_COUNT))
                    .with_deprecation("This parameter has no effect."),
            )
            .with_attribute(
                "start",
                Attribute::optional_int64().with_deprecation("This parameter has no effect."),
            )
            .with_attribute(
                "display_format",
                Attribute::optional_string().with_one_of(&["counts", "countsAndList", "list"]),
            )
            .with_attribute(
                "color_preference",
                Attribute::optional_string().with_one_of(&["background", "text"]),
            )
            .with_attribute("hide_zero_counts", Attribute::optional_bool())
            .with_attribute("show_last_triggered", Attribute::optional_bool()),
        "note_definition" => Block::new()
            .with_attribute("content", Attribute::required_string().with_not_empty())
            .with_attribute("background_color", Attribute::optional_string())
            .with_attribute("font_size", Attribute::optional_string())
            .with_attribute("text_align", text_align())
            .with_attribute("show_tick", Attribute::optional_bool())
            .with_attribute("tick_pos", Attribute::optional_string())
            .with_attribute(
                "tick_edge",
                Attribute::optional_string().with_one_of(&["bottom", "left", "right", "top"]),
            ),
        "query_value_definition" => with_graph_extras(with_title(Block::new()))
            .with_attribute("autoscale", Attribute::optional_bool())
            .with_attribute("custom_unit", Attribute::optional_string())
            .with_attribute("precision", Attribute::optional_int64())
            .with_attribute("text_align", text_align())
            .with_block("request", NestedBlock::list(query_value_request())),
        "query_table_definition" => with_graph_extras(with_title(Block::new()))
            .with_attribute(
                "has_search_bar",
                Attribute::optional_string().with_one_of(&["always", "never", "auto"]),
            )
            .with_block("request", NestedBlock::list(table_request())),
        "scatterplot_definition" => with_graph_extras(with_title(Block::new()))
            .with_block("request", NestedBlock::list_max_one(scatterplot_requests()))
            .with_block("xaxis", NestedBlock::list_max_one(axis_block()))
            .with_block("yaxis", NestedBlock::list_max_one(axis_block()))
            .with_attribute(
                "color_by_groups",
                Attribute::optional_list(AttributeType::String),
            ),
        "servicemap_definition" => with_title(Block::new())
            .with_attribute("service", Attribute::required_string())
            .with_attribute(
                "filters",
                Attribute::required_list(AttributeType::String).with_not_empty(),
            )
            .with_block("custom_link", NestedBlock::list(custom_link_block())),
        "service_level_objective_definition" => with_title(Block::new())
            .with_attribute("view_type", Attribute::required_string())
            .with_attribute("slo_id", Attribute::required_string())
            .with_attribute("show_error_budget", Attribute::optional_bool())
            .with_attribute(
                "view_mode",
                Attribute::required_string().with_one_of(&["overall", "component", "both"]),
            )
            .with_attribute(
                "time_windows",
                Attribute::required_list(AttributeType::String).with_one_of(&[
                    "7d",
                    "30d",
                    "90d",
                    "week_to_date",
                    "previous_week",
                    "month_to_date",
                    "previous_month",
                    "global_time",
                ]),
            ),
        "timeseries_definition" => with_graph_extras(with_legend(with_title(Block::new())))
            .with_block("request", NestedBlock::list(timeseries_request()))
            .with_block("marker", NestedBlock::list(marker_block()))
            .with_block("event", NestedBlock::list(event_block()))
            .with_block("yaxis", NestedBlock::list_max_one(axis_block()))
            .with_block("right_yaxis", NestedBlock::list_max_one(axis_block())),
        "toplist_definition" => with_graph_extras(with_title(Block::new()))
            .with_block("request", NestedBlock::list(toplist_request())),
        "trace_service_definition" => with_title(Block::new())
            .with_attribute("env", Attribute::required_string())
            .with_attribute("service", Attribute::required_string())
            .with_attribute("span_name", Attribute::required_string())
            .with_attribute("show_hits", Attribute::optional_bool())
            .with_attribute("show_errors", Attribute::optional_bool())
            .with_attribute("show_latency", Attribute::optional_bool())
            .with_attribute("show_breakdown", Attribute::optional_bool())
            .with_attribute("show_distribution", Attribute::optional_bool())
            .with_attribute("show_resource_list", Attribute::optional_bool())
            .with_attribute(
                "size_format",
                Attribute::optional_string().with_one_of(&["small", "medium", "large"]),
            )
            .with_attribute(
                "display_format",
                Attribute::optional_string().with_one_of(&[
                    "one_column",
                    "two_column",
                    "three_column",
                ]),
            )
            .with_attribute("time", time_attribute()),
        _ => Block::new(),
    }
}

// ============================================================================
// Shared pieces
// ============================================================================

fn text_align() -> Attribute {
    Attribute::optional_string().with_one_of(TEXT_ALIGN)
}

fn time_attribute() -> Attribute {
    Attribute::optional_map(AttributeType::String)
        .with_description("Time frame of the widget, e.g. `live_span = \"1h\"`.")
}

fn with_title(block: Block) -> Block {
    block
        .with_attribute("title", Attribute::optional_string())
        .with_attribute("title_size", Attribute::optional_string())
        .with_attribute("title_align", text_align())
}

fn with_legend(block: Block) -> Block {
    block
        .with_attribute("show_legend", Attribute::optional_bool())
        .with_attribute("legend_size", Attribute::optional_string())
}

/// Time frame and custom links carried by most graph widgets.
fn with_graph_extras(block: Block) -> Block {
    block
        .with_attribute("time", time_attribute())
        .with_block("custom_link", NestedBlock::list(custom_link_block()))
}

fn custom_link_block() -> Block {
    Block::new()
        .with_attribute("label", Attribute::required_string())
        .with_attribute("link", Attribute::required_string())
}

fn event_block() -> Block {
    Block::new()
        .with_attribute("q", Attribute::required_string())
        .with_attribute("tags_execution", Attribute::optional_string())
}

fn marker_block() -> Block {
    Block::new()
        .with_attribute("value", Attribute::required_string())
        .with_attribute("display_type", Attribute::optional_string())
        .with_attribute("label", Attribute::optional_string())
}

fn axis_block() -> Block {
    Block::new()
        .with_attribute("label", Attribute::optional_string())
        .with_attribute("scale", Attribute::optional_string())
        .with_attribute("min", Attribute::optional_string())
        .with_attribute("max", Attribute::optional_string())
        .with_attribute("include_zero", Attribute::optional_bool())
}

fn conditional_format_block() -> Block {
    Block::new()
        .with_attribute(
            "comparator",
            Attribute::required_string().with_one_of(COMPARATORS),
        )
        .with_attribute("value", Attribute::required_float64())
        .with_attribute(
            "palette",
            Attribute::required_string().with_one_of(CONDITIONAL_FORMAT_PALETTES),
        )
        .with_attribute("custom_bg_color", Attribute::optional_string())
        .with_attribute("custom_fg_color", Attribute::optional_string())
        .with_attribute("image_url", Attribute::optional_string())
        .with_attribute("hide_value", Attribute::optional_bool())
        .with_attribute("timeframe", Attribute::optional_string())
        .with_attribute("metric", Attribute::optional_string())
}

fn widget_style_block() -> Block {
    Block::new().with_attribute("palette", Attribute::optional_string())
}

fn request_style_block() -> Block {
    widget_style_block()
        .with_attribute(
            "line_type",
            Attribute::optional_string().with_one_of(&["dashed", "dotted", "solid"]),
        )
        .with_attribute(
            "line_width",
            Attribute::optional_string().with_one_of(&["normal", "thick", "thin"]),
        )
}

fn hostmap_style() -> Block {
    widget_style_block()
        .with_attribute("palette_flip", Attribute::optional_bool())
        .with_attribute("fill_min", Attribute::optional_string())
        .with_attribute("fill_max", Attribute::optional_string())
}

// ============================================================================
// Requests and queries
// ============================================================================

/// Add the `q` attribute and one block per query kind.
fn with_queries(mut block: Block, kinds: &[QueryKind]) -> Block {
    for kind in kinds {
        block = match kind {
            QueryKind::Metric => block.with_attribute(kind.key(), Attribute::optional_string()),
            QueryKind::Process => {
                block.with_block(kind.key(), NestedBlock::list_max_one(process_query_block()))
            }
            QueryKind::ApmStats => {
                block.with_block(kind.key(), NestedBlock::list_max_one(apm_stats_query_block()))
            }
            _ => block.with_block(kind.key(), NestedBlock::list_max_one(log_query_block())),
        };
    }
    block
}

fn log_query_block() -> Block {
    let multi_compute = Block::new()
        .with_attribute("aggregation", Attribute::required_string())
        .with_attribute("facet", Attribute::optional_string())
        .with_attribute("interval", Attribute::optional_int64());
    let group_by = Block::new()
        .with_attribute("facet", Attribute::optional_string())
        .with_attribute("limit", Attribute::optional_int64())
        .with_attribute("sort", Attribute::optional_map(AttributeType::String));

    Block::new()
        .with_attribute("index", Attribute::required_string())
        .with_attribute("compute", Attribute::optional_map(AttributeType::String))
        .with_attribute("search", Attribute::optional_map(AttributeType::String))
        .with_block("multi_compute", NestedBlock::list(multi_compute))
        .with_block("group_by", NestedBlock::list(group_by))
}

fn process_query_block() -> Block {
    Block::new()
        .with_attribute("metric", Attribute::required_string())
        .with_attribute("search_by", Attribute::optional_string())
        .with_attribute("filter_by", Attribute::optional_list(AttributeType::String))
        .with_attribute("limit", Attribute::optional_int64())
}

fn apm_stats_query_block() -> Block {
    let column = Block::new()
        .with_attribute("name", Attribute::required_string())
        .with_attribute("alias", Attribute::optional_string())
        .with_attribute("order", Attribute::optional_string().with_one_of(SORT_ORDER))
        .with_attribute(
            "cell_display_mode",
            Attribute::optional_string().with_one_of(CELL_DISPLAY_MODES),
        );
    Block::new()
        .with_attribute("service", Attribute::required_string())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("env", Attribute::required_string())
        .with_attribute("primary_tag", Attribute::required_string())
        .with_attribute(
            "row_type",
            Attribute::required_string().with_one_of(&["service", "resource", "span"]),
        )
        .with_attribute("resource", Attribute::optional_string())
        .with_block("columns", NestedBlock::list(column))
}

fn change_request() -> Block {
    with_queries(Block::new(), QueryKind::STANDARD)
        .with_attribute(
            "change_type",
            Attribute::optional_string().with_one_of(&["absolute", "relative"]),
        )
        .with_attribute(
            "compare_to",
            Attribute::optional_string().with_one_of(&[
                "hour_before",
                "day_before",
                "week_before",
                "month_before",
            ]),
        )
        .with_attribute("increase_good", Attribute::optional_bool())
        .with_attribute(
            "order_by",
            Attribute::optional_string().with_one_of(&["change", "name", "present", "past"]),
        )
        .with_attribute("order_dir", Attribute::optional_string().with_one_of(SORT_ORDER))
        .with_attribute("show_present", Attribute::optional_bool())
}

fn styled_request() -> Block {
    with_queries(Block::new(), QueryKind::STANDARD)
        .with_block("style", NestedBlock::list_max_one(widget_style_block()))
}

fn query_value_request() -> Block {
    with_queries(Block::new(), QueryKind::STANDARD)
        .with_block("conditional_formats", NestedBlock::list(conditional_format_block()))
        .with_attribute(
            "aggregator",
            Attribute::optional_string().with_one_of(AGGREGATORS),
        )
}

fn table_request() -> Block {
    with_queries(Block::new(), QueryKind::TABLE)
        .with_block("conditional_formats", NestedBlock::list(conditional_format_block()))
        .with_attribute("alias", Attribute::optional_string())
        .with_attribute(
            "aggregator",
            Attribute::optional_string().with_one_of(AGGREGATORS),
        )
        .with_attribute("limit", Attribute::optional_int64())
        .with_attribute("order", Attribute::optional_string().with_one_of(SORT_ORDER))
        .with_attribute(
            "cell_display_mode",
            Attribute::optional_list(AttributeType::String).with_one_of(CELL_DISPLAY_MODES),
        )
}

fn scatterplot_requests() -> Block {
    let axis_request = with_queries(Block::new(), QueryKind::STANDARD).with_attribute(
        "aggregator",
        Attribute::optional_string().with_one_of(AGGREGATORS),
    );
    Block::new()
        .with_block("x", NestedBlock::list_max_one(axis_request.clone()))
        .with_block("y", NestedBlock::list_max_one(axis_request))
}

fn hostmap_requests() -> Block {
    let request = with_queries(Block::new(), QueryKind::STANDARD);
    Block::new()
        .with_block("fill", NestedBlock::list_max_one(request.clone()))
        .with_block("size", NestedBlock::list_max_one(request))
}

fn timeseries_request() -> Block {
    let metadata = Block::new()
        .with_attribute("expression", Attribute::required_string())
        .with_attribute("alias_name", Attribute::optional_string());
    with_queries(Block::new(), QueryKind::TIMESERIES)
        .with_block("style", NestedBlock::list_max_one(request_style_block()))
        .with_block("metadata", NestedBlock::list(metadata))
        .with_attribute(
            "display_type",
            Attribute::optional_string().with_one_of(&["area", "bars", "line"]),
        )
        .with_attribute("on_right_yaxis", Attribute::optional_bool())
}

fn toplist_request() -> Block {
    with_queries(Block::new(), QueryKind::STANDARD)
        .with_block("conditional_formats", NestedBlock::list(conditional_format_block()))
        .with_block("style", NestedBlock::list_max_one(widget_style_block()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    fn widget_of(schema: &Schema) -> &Block {
        &schema.block.blocks["widget"].block
    }

    #[test]
    fn test_every_definition_has_a_block() {
        let schema = dashboard_schema();
        let widget = widget_of(&schema);
        for key in DEFINITION_KEYS {
            assert!(widget.blocks.contains_key(*key), "missing {}", key);
            assert_eq!(widget.blocks[*key].max_items, 1);
        }
    }

    #[test]
    fn test_group_members_cannot_be_groups() {
        let schema = dashboard_schema();
        let group = &widget_of(&schema).blocks[GROUP_DEFINITION_KEY].block;
        let member = &group.blocks["widget"].block;
        assert!(!member.blocks.contains_key(GROUP_DEFINITION_KEY));
        assert!(member.blocks.contains_key("note_definition"));
    }

    #[test]
    fn test_layout_type_forces_replacement() {
        let schema = dashboard_schema();
        let layout = &schema.block.attributes["layout_type"];
        assert!(layout.force_new);
        assert_eq!(
            schema.block.attributes["is_read_only"].default,
            Some(json!(false))
        );
    }

    #[test]
    fn test_request_query_blocks_follow_widget_kind() {
        let schema = dashboard_schema();
        let widget = widget_of(&schema);
        let request = |def: &str| widget.blocks[def].block.blocks["request"].block.clone();

        assert!(request("timeseries_definition").blocks.contains_key("network_query"));
        assert!(!request("toplist_definition").blocks.contains_key("network_query"));
        assert!(request("query_table_definition").blocks.contains_key("apm_stats_query"));
        assert!(request("toplist_definition").attributes.contains_key("q"));
    }

    #[test]
    fn test_schema_validates_a_dashboard() {
        let schema = dashboard_schema();
        let config = json!({
            "title": "Ops",
            "layout_type": "ordered",
            "widget": [{
                "timeseries_definition": [{
                    "request": [{
                        "q": "avg:system.cpu.user{*}",
                        "display_type": "line",
                        "style": [{"line_type": "dashed"}]
                    }],
                    "title_align": "left",
                    "time": {"live_span": "1h"}
                }]
            }, {
                "note_definition": [{"content": "hello", "tick_edge": "left"}]
            }]
        });
        let diagnostics = validate(&schema, &config);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_schema_rejects_bad_enumerations() {
        let schema = dashboard_schema();
        let config = json!({
            "title": "Ops",
            "layout_type": "ordered",
            "widget": [{
                "query_value_definition": [{
                    "request": [{
                        "q": "sum:requests{*}",
                        "conditional_formats": [{"comparator": "==", "value": 1, "palette": "pink"}]
                    }]
                }]
            }]
        });
        let diagnostics = validate(&schema, &config);
        let paths: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.clone())
            .collect();
        assert!(paths.contains(
            &"widget.0.query_value_definition.0.request.0.conditional_formats.0.comparator"
                .to_string()
        ));
        assert!(paths.contains(
            &"widget.0.query_value_definition.0.request.0.conditional_formats.0.palette"
                .to_string()
        ));
    }

    #[test]
    fn test_note_content_must_not_be_empty() {
        let schema = dashboard_schema();
        let config = json!({
            "title": "Ops",
            "layout_type": "free",
            "widget": [{"note_definition": [{"content": ""}]}]
        });
        let diagnostics = validate(&schema, &config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("widget.0.note_definition.0.content")
        );
    }
}
