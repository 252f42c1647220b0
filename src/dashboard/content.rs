//! Static content widgets.

use crate::error::ProviderError;
use crate::state::{StateMapping, StateReader, StateWriter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free text, typically a heading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeTextDefinition {
    /// Text to display.
    pub text: String,
    /// Text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Font size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    /// Text alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
}

impl StateMapping for FreeTextDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            text: reader.required_string("text")?,
            color: reader.string("color"),
            font_size: reader.string("font_size"),
            text_align: reader.string("text_align"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("text", &self.text)
            .string("color", &self.color)
            .string("font_size", &self.font_size)
            .string("text_align", &self.text_align)
            .build())
    }
}

/// Embedded web page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IframeDefinition {
    /// Page URL.
    pub url: String,
}

impl StateMapping for IframeDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            url: reader.required_string("url")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new().set_string("url", &self.url).build())
    }
}

/// Embedded image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageDefinition {
    /// Image URL.
    pub url: String,
    /// `zoom`, `fit` or `center`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizing: Option<String>,
    /// `small` or `large`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
}

impl StateMapping for ImageDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            url: reader.required_string("url")?,
            sizing: reader.string("sizing"),
            margin: reader.string("margin"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("url", &self.url)
            .string("sizing", &self.sizing)
            .string("margin", &self.margin)
            .build())
    }
}

/// Markdown note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteDefinition {
    /// Markdown content.
    pub content: String,
    /// Background color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Font size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    /// Text alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    /// Show a tick pointing out of the note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_tick: Option<bool>,
    /// Tick position, e.g. `50%`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_pos: Option<String>,
    /// `bottom`, `left`, `right` or `top`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_edge: Option<String>,
}

impl StateMapping for NoteDefinition {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            content: reader.required_string("content")?,
            background_color: reader.string("background_color"),
            font_size: reader.string("font_size"),
            text_align: reader.string("text_align"),
            show_tick: reader.bool("show_tick"),
            tick_pos: reader.string("tick_pos"),
            tick_edge: reader.string("tick_edge"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("content", &self.content)
            .string("background_color", &self.background_color)
            .string("font_size", &self.font_size)
            .string("text_align", &self.text_align)
            .bool("show_tick", self.show_tick)
            .string("tick_pos", &self.tick_pos)
            .string("tick_edge", &self.tick_edge)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::WidgetDefinition;
    use serde_json::json;

    #[test]
    fn test_note_requires_content() {
        let state = json!({"content": "", "background_color": "pink"});
        let err = NoteDefinition::from_state(&StateReader::new(&state)).unwrap_err();
        assert_eq!(err.message(), "missing required attribute 'content'");
    }

    #[test]
    fn test_note_keeps_show_tick_false() {
        let state = json!({"content": "note text", "show_tick": false, "tick_edge": "left"});
        let note = NoteDefinition::from_state(&StateReader::new(&state)).unwrap();
        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            json!({"content": "note text", "show_tick": false, "tick_edge": "left"})
        );
    }

    #[test]
    fn test_image_optional_fields_are_skipped() {
        let image: ImageDefinition =
            serde_json::from_value(json!({"type": "image", "url": "https://example.com/a.png"}))
                .unwrap();
        assert_eq!(
            image.to_state().unwrap(),
            json!({"url": "https://example.com/a.png"})
        );
    }

    #[test]
    fn test_iframe_round_trip() {
        let state = json!({"url": "https://en.wikipedia.org/wiki/Datadog"});
        let definition =
            WidgetDefinition::read("iframe_definition", &StateReader::new(&state)).unwrap();
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({"type": "iframe", "url": "https://en.wikipedia.org/wiki/Datadog"})
        );
        assert_eq!(
            definition.to_state_entry().unwrap(),
            ("iframe_definition", state)
        );
    }
}
