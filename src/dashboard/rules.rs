//! Dashboard rules that the attribute schema cannot express.

use super::query::{queries_set, QueryKind};
use super::widget::{definitions_set, GROUP_DEFINITION_KEY};
use crate::schema::Diagnostic;
use crate::state::StateReader;
use serde_json::Value;

/// Accepted `legend_size` values.
pub const LEGEND_SIZES: &[&str] = &["0", "2", "4", "8", "16", "auto"];

/// Check a dashboard configuration against the widget rules.
///
/// Returns one error diagnostic per violation; an empty list means the
/// configuration is valid.
pub fn validate_dashboard(config: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let root = StateReader::new(config);
    for widget in root.blocks("widget") {
        check_widget(&widget, true, &mut diagnostics);
    }
    diagnostics
}

fn check_widget(widget: &StateReader<'_>, allow_group: bool, diagnostics: &mut Vec<Diagnostic>) {
    let keys = definitions_set(widget);
    match keys.len() {
        0 => {
            diagnostics.push(
                Diagnostic::error("failed to find valid definition in widget configuration")
                    .with_attribute(widget.path()),
            );
            return;
        }
        1 => {}
        _ => {
            diagnostics.push(
                Diagnostic::error("a widget must set exactly one definition")
                    .with_detail(format!("found {}", keys.join(", ")))
                    .with_attribute(widget.path()),
            );
        }
    }

    for key in keys {
        let Some(definition) = widget.block(key) else {
            continue;
        };
        if key == GROUP_DEFINITION_KEY {
            if !allow_group {
                diagnostics.push(
                    Diagnostic::error("group widgets cannot be nested")
                        .with_attribute(definition.path()),
                );
                continue;
            }
            for member in definition.blocks("widget") {
                check_widget(&member, false, diagnostics);
            }
            continue;
        }
        check_definition(key, &definition, diagnostics);
    }
}

fn check_definition(key: &str, definition: &StateReader<'_>, diagnostics: &mut Vec<Diagnostic>) {
    match key {
        "timeseries_definition" => {
            check_requests(definition.blocks("request"), QueryKind::TIMESERIES, diagnostics)
        }
        "query_table_definition" => {
            check_requests(definition.blocks("request"), QueryKind::TABLE, diagnostics)
        }
        "hostmap_definition" | "scatterplot_definition" => {
            // The request block holds one sub-request per role.
            let roles: &[&str] = if key == "hostmap_definition" {
                &["fill", "size"]
            } else {
                &["x", "y"]
            };
            for request in definition.blocks("request") {
                for role in roles {
                    check_requests(request.blocks(role), QueryKind::STANDARD, diagnostics);
                }
            }
        }
        _ => check_requests(definition.blocks("request"), QueryKind::STANDARD, diagnostics),
    }

    if let Some(size) = definition.string("legend_size") {
        if !LEGEND_SIZES.contains(&size.as_str()) {
            diagnostics.push(
                Diagnostic::error(format!(
                    "\"legend_size\" contains an invalid value \"{}\". Valid values are `0`, `2`, `4`, `8`, `16`, or `auto`",
                    size
                ))
                .with_attribute(format!("{}.legend_size", definition.path())),
            );
        }
    }
}

fn check_requests(
    requests: Vec<StateReader<'_>>,
    kinds: &[QueryKind],
    diagnostics: &mut Vec<Diagnostic>,
) {
    for request in requests {
        let set = queries_set(&request, kinds);
        if set.len() > 1 {
            diagnostics.push(
                Diagnostic::error("only one query per request is allowed")
                    .with_detail(format!("found {}", set.join(", ")))
                    .with_attribute(request.path()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_dashboard_has_no_diagnostics() {
        let config = json!({
            "widget": [
                {"timeseries_definition": [{"request": [{"q": "avg:cpu{*}"}], "legend_size": "auto"}]},
                {"group_definition": [{"layout_type": "ordered", "widget": [
                    {"note_definition": [{"content": "x"}]}
                ]}]}
            ]
        });
        assert!(validate_dashboard(&config).is_empty());
    }

    #[test]
    fn test_widget_without_definition() {
        let config = json!({"widget": [{"layout": {"x": "1"}}]});
        let diagnostics = validate_dashboard(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].summary,
            "failed to find valid definition in widget configuration"
        );
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("widget.0"));
    }

    #[test]
    fn test_widget_with_two_definitions() {
        let config = json!({"widget": [{
            "note_definition": [{"content": "x"}],
            "iframe_definition": [{"url": "https://example.com"}]
        }]});
        let diagnostics = validate_dashboard(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "a widget must set exactly one definition");
    }

    #[test]
    fn test_nested_group_is_rejected() {
        let config = json!({"widget": [{"group_definition": [{
            "layout_type": "ordered",
            "widget": [{"group_definition": [{"layout_type": "ordered", "widget": []}]}]
        }]}]});
        let diagnostics = validate_dashboard(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("widget.0.group_definition.0.widget.0.group_definition.0")
        );
    }

    #[test]
    fn test_request_with_two_queries() {
        let config = json!({"widget": [{"toplist_definition": [{"request": [{
            "q": "avg:cpu{*}",
            "log_query": [{"index": "main"}]
        }]}]}]});
        let diagnostics = validate_dashboard(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("widget.0.toplist_definition.0.request.0")
        );
        assert_eq!(diagnostics[0].detail.as_deref(), Some("found q, log_query"));
    }

    #[test]
    fn test_scatterplot_axis_requests_are_checked() {
        let config = json!({"widget": [{"scatterplot_definition": [{"request": [{
            "x": [{"q": "avg:cpu{*}", "process_query": [{"metric": "cpu"}]}],
            "y": [{"q": "avg:mem{*}"}]
        }]}]}]});
        let diagnostics = validate_dashboard(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("widget.0.scatterplot_definition.0.request.0.x.0")
        );
    }

    #[test]
    fn test_legend_size_message() {
        let config = json!({"widget": [{"timeseries_definition": [{
            "request": [{"q": "avg:cpu{*}"}],
            "legend_size": "3"
        }]}]});
        let diagnostics = validate_dashboard(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].summary,
            "\"legend_size\" contains an invalid value \"3\". Valid values are `0`, `2`, `4`, `8`, `16`, or `auto`"
        );
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("widget.0.timeseries_definition.0.legend_size")
        );
    }
}
