//! Sub-structures shared by several widget definitions.

use crate::error::ProviderError;
use crate::state::{StateMapping, StateReader, StateWriter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title settings carried by most widget definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetTitle {
    /// Title text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Title font size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_size: Option<String>,
    /// Title alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_align: Option<String>,
}

impl WidgetTitle {
    /// Read the title fields from a definition block.
    pub fn read(reader: &StateReader<'_>) -> Self {
        Self {
            title: reader.string("title"),
            title_size: reader.string("title_size"),
            title_align: reader.string("title_align"),
        }
    }

    /// Write the title fields into a definition block.
    pub fn write(&self, writer: StateWriter) -> StateWriter {
        writer
            .string("title", &self.title)
            .string("title_size", &self.title_size)
            .string("title_align", &self.title_align)
    }
}

/// Time frame of a widget, e.g. `{"live_span": "1h"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetTime {
    /// Relative time span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_span: Option<String>,
}

impl StateMapping for WidgetTime {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            live_span: reader.string("live_span"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new().string("live_span", &self.live_span).build())
    }
}

/// A link shown in the widget's context menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomLink {
    /// Link label.
    pub label: String,
    /// Link URL.
    pub link: String,
}

impl StateMapping for CustomLink {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            label: reader.required_string("label")?,
            link: reader.required_string("link")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("label", &self.label)
            .set_string("link", &self.link)
            .build())
    }
}

/// An event overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetEvent {
    /// Event query.
    pub q: String,
    /// Tag matching mode for the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_execution: Option<String>,
}

impl StateMapping for WidgetEvent {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            q: reader.required_string("q")?,
            tags_execution: reader.string("tags_execution"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("q", &self.q)
            .string("tags_execution", &self.tags_execution)
            .build())
    }
}

/// A horizontal marker line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetMarker {
    /// Value or range, e.g. `y = 15` or `10 < y < 20`.
    pub value: String,
    /// Marker style, e.g. `error dashed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    /// Marker label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl StateMapping for WidgetMarker {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            value: reader.required_string("value")?,
            display_type: reader.string("display_type"),
            label: reader.string("label"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("value", &self.value)
            .string("display_type", &self.display_type)
            .string("label", &self.label)
            .build())
    }
}

/// Axis settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetAxis {
    /// Axis label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// One of `linear`, `log`, `pow`, `sqrt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    /// Always include zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_zero: Option<bool>,
}

impl StateMapping for WidgetAxis {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            label: reader.string("label"),
            scale: reader.string("scale"),
            min: reader.string("min"),
            max: reader.string("max"),
            include_zero: reader.bool("include_zero"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .string("label", &self.label)
            .string("scale", &self.scale)
            .string("min", &self.min)
            .string("max", &self.max)
            .bool("include_zero", self.include_zero)
            .build())
    }
}

/// Rule coloring a value depending on a threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionalFormat {
    /// One of `>`, `>=`, `<`, `<=`.
    pub comparator: String,
    /// Threshold.
    pub value: f64,
    /// Color palette applied when the rule matches.
    pub palette: String,
    /// Background color for the `custom_bg` palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_bg_color: Option<String>,
    /// Foreground color for the `custom_text` palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fg_color: Option<String>,
    /// Image shown for the `custom_image` palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Hide the value when the rule matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_value: Option<bool>,
    /// Time frame the rule applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    /// Metric the rule applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
}

impl StateMapping for ConditionalFormat {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            comparator: reader.required_string("comparator")?,
            value: reader.required_float("value")?,
            palette: reader.required_string("palette")?,
            custom_bg_color: reader.string("custom_bg_color"),
            custom_fg_color: reader.string("custom_fg_color"),
            image_url: reader.string("image_url"),
            hide_value: reader.bool("hide_value"),
            timeframe: reader.string("timeframe"),
            metric: reader.string("metric"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("comparator", &self.comparator)
            .float("value", Some(self.value))
            .set_string("palette", &self.palette)
            .string("custom_bg_color", &self.custom_bg_color)
            .string("custom_fg_color", &self.custom_fg_color)
            .string("image_url", &self.image_url)
            .bool("hide_value", self.hide_value)
            .string("timeframe", &self.timeframe)
            .string("metric", &self.metric)
            .build())
    }
}

/// Request style holding only a palette.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetStyle {
    /// Color palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<String>,
}

impl StateMapping for WidgetStyle {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            palette: reader.string("palette"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new().string("palette", &self.palette).build())
    }
}

/// Request style for line-based graphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestStyle {
    /// Color palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<String>,
    /// One of `dashed`, `dotted`, `solid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_type: Option<String>,
    /// One of `normal`, `thick`, `thin`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<String>,
}

impl StateMapping for RequestStyle {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            palette: reader.string("palette"),
            line_type: reader.string("line_type"),
            line_width: reader.string("line_width"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .string("palette", &self.palette)
            .string("line_type", &self.line_type)
            .string("line_width", &self.line_width)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conditional_format_requires_comparator_value_palette() {
        let state = json!({"comparator": ">", "palette": "white_on_red"});
        let err = ConditionalFormat::from_state(&StateReader::new(&state)).unwrap_err();
        assert!(err.message().contains("'value'"));

        let state = json!({
            "comparator": "<=",
            "value": 100,
            "palette": "custom_bg",
            "custom_bg_color": "#ff0000",
            "hide_value": false,
            "timeframe": ""
        });
        let format = ConditionalFormat::from_state(&StateReader::new(&state)).unwrap();
        assert_eq!(format.value, 100.0);
        assert_eq!(format.hide_value, Some(false));
        assert_eq!(format.timeframe, None);

        let api = serde_json::to_value(&format).unwrap();
        assert_eq!(
            api,
            json!({
                "comparator": "<=",
                "value": 100.0,
                "palette": "custom_bg",
                "custom_bg_color": "#ff0000",
                "hide_value": false
            })
        );
    }

    #[test]
    fn test_title_skips_empty_strings() {
        let state = json!({"title": "CPU", "title_size": "", "title_align": "left"});
        let title = WidgetTitle::read(&StateReader::new(&state));
        assert_eq!(title.title_size, None);

        let written = title.write(StateWriter::new()).build();
        assert_eq!(written, json!({"title": "CPU", "title_align": "left"}));
    }

    #[test]
    fn test_axis_flattens_only_returned_fields() {
        let axis: WidgetAxis =
            serde_json::from_value(json!({"scale": "log", "include_zero": true})).unwrap();
        assert_eq!(
            axis.to_state().unwrap(),
            json!({"scale": "log", "include_zero": true})
        );
    }
}
