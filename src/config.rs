//! Layout configuration.
//!
//! Every section deserializes with `#[serde(default)]`, so a partial JSON
//! document only overrides the knobs it names.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::errors::{InputError, SourceContext};
use crate::render::palette;
use crate::types::{Length, NumericError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub object: ObjectConfig,
    pub receptacle: ReceptacleConfig,
    pub placeholder: PlaceholderConfig,
    pub room: RoomConfig,
    pub scene: SceneConfig,
    pub arrow: ArrowConfig,
    pub legend: LegendConfig,
    pub palette: PaletteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    pub width: Length,
    pub height: Length,
    pub rounding_size: Length,
    /// Distance from the object's center to the top of its label
    pub text_margin: Length,
    pub textwrap_width: usize,
    pub text_size: f64,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            width: defaults::OBJECT_WIDTH,
            height: defaults::OBJECT_HEIGHT,
            rounding_size: defaults::OBJECT_ROUNDING,
            text_margin: defaults::OBJECT_TEXT_MARGIN,
            textwrap_width: defaults::OBJECT_TEXTWRAP_WIDTH,
            text_size: defaults::OBJECT_TEXT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceptacleConfig {
    pub target_height: Length,
    pub horizontal_margin: Length,
    pub placeholder_margin: Length,
    /// Icon width used when no icon can be loaded
    pub fallback_width: Length,
    pub rounding_size: Length,
}

impl Default for ReceptacleConfig {
    fn default() -> Self {
        Self {
            target_height: defaults::RECEPTACLE_TARGET_HEIGHT,
            horizontal_margin: defaults::RECEPTACLE_HORIZONTAL_MARGIN,
            placeholder_margin: defaults::RECEPTACLE_PLACEHOLDER_MARGIN,
            fallback_width: defaults::RECEPTACLE_FALLBACK_WIDTH,
            rounding_size: defaults::RECEPTACLE_ROUNDING,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub width: Length,
    pub height: Length,
    pub rounding_size: Length,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            width: defaults::PLACEHOLDER_WIDTH,
            height: defaults::PLACEHOLDER_HEIGHT,
            rounding_size: defaults::PLACEHOLDER_ROUNDING,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub min_width: Length,
    pub min_width_per_object: f64,
    pub left_pad: Length,
    pub right_pad: Length,
    pub top_pad: Length,
    pub bottom_pad: Length,
    pub horizontal_margin: Length,
    pub vertical_margin: Length,
    pub full_height: Length,
    pub half_height: Length,
    pub receptacle_horizontal_margin_fraction: f64,
    pub object_horizontal_margin_fraction: f64,
    /// Fraction of `full_height` above the bottom pad where loose objects sit
    pub objects_height: f64,
    pub placeholder_height_if_full: f64,
    pub placeholder_height_if_half: f64,
    pub border_width: Length,
    pub box_alpha: f64,
    pub max_chars_per_line: usize,
    pub text_size: f64,
    pub color: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_width: defaults::ROOM_MIN_WIDTH,
            min_width_per_object: defaults::ROOM_MIN_WIDTH_PER_OBJECT,
            left_pad: defaults::ROOM_LEFT_PAD,
            right_pad: defaults::ROOM_RIGHT_PAD,
            top_pad: defaults::ROOM_TOP_PAD,
            bottom_pad: defaults::ROOM_BOTTOM_PAD,
            horizontal_margin: defaults::ROOM_HORIZONTAL_MARGIN,
            vertical_margin: defaults::ROOM_VERTICAL_MARGIN,
            full_height: defaults::ROOM_FULL_HEIGHT,
            half_height: defaults::ROOM_HALF_HEIGHT,
            receptacle_horizontal_margin_fraction: defaults::ROOM_RECEPTACLE_MARGIN_FRACTION,
            object_horizontal_margin_fraction: defaults::ROOM_OBJECT_MARGIN_FRACTION,
            objects_height: defaults::ROOM_OBJECTS_HEIGHT,
            placeholder_height_if_full: defaults::ROOM_PLACEHOLDER_HEIGHT_IF_FULL,
            placeholder_height_if_half: defaults::ROOM_PLACEHOLDER_HEIGHT_IF_HALF,
            border_width: defaults::ROOM_BORDER_WIDTH,
            box_alpha: defaults::ROOM_BOX_ALPHA,
            max_chars_per_line: defaults::ROOM_MAX_CHARS_PER_LINE,
            text_size: defaults::ROOM_TEXT_SIZE,
            color: defaults::ROOM_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// `None` selects unconstrained row packing (first row defines the width)
    pub target_width: Option<Length>,
    /// Fail on propositions that reference entities absent from every room
    pub strict: bool,
    pub background: String,
    pub max_chars_per_line: usize,
    pub instruction_text_size: f64,
    /// Space between the top of the scene and the instruction banner
    pub instruction_gap: Length,
    pub divider_offset: Length,
    pub level_gap: Length,
    pub divider_linewidth: f64,
    /// Horizontal space kept on both sides of the next-to legend
    pub legend_gap: Length,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            target_width: Some(defaults::SCENE_TARGET_WIDTH),
            strict: false,
            background: defaults::SCENE_BACKGROUND.to_string(),
            max_chars_per_line: defaults::SCENE_MAX_CHARS_PER_LINE,
            instruction_text_size: defaults::SCENE_INSTRUCTION_TEXT_SIZE,
            instruction_gap: defaults::SCENE_INSTRUCTION_GAP,
            divider_offset: defaults::SCENE_DIVIDER_OFFSET,
            level_gap: defaults::SCENE_LEVEL_GAP,
            divider_linewidth: defaults::SCENE_DIVIDER_LINEWIDTH,
            legend_gap: defaults::SCENE_LEGEND_GAP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    pub linewidth: f64,
    pub head_length: Length,
    pub head_width: Length,
    /// Fraction of the head length cut back into the base (0 = plain triangle)
    pub overhang: f64,
    pub dash: Vec<f64>,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            linewidth: defaults::ARROW_LINEWIDTH,
            head_length: defaults::ARROW_HEAD_LENGTH,
            head_width: defaults::ARROW_HEAD_WIDTH,
            overhang: defaults::ARROW_OVERHANG,
            dash: defaults::ARROW_DASH.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    pub width: Length,
    /// Nominal height used to center the legend against the scene
    pub height: Length,
    pub top_pad: Length,
    pub bottom_pad: Length,
    pub horizontal_margin: Length,
    pub linewidth: f64,
    pub endpoint_radius: Length,
    pub text_size: f64,
    pub panel: String,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            width: defaults::LEGEND_WIDTH,
            height: defaults::LEGEND_HEIGHT,
            top_pad: defaults::LEGEND_TOP_PAD,
            bottom_pad: defaults::LEGEND_BOTTOM_PAD,
            horizontal_margin: defaults::LEGEND_HORIZONTAL_MARGIN,
            linewidth: defaults::LEGEND_LINEWIDTH,
            endpoint_radius: defaults::LEGEND_ENDPOINT_RADIUS,
            text_size: defaults::LEGEND_TEXT_SIZE,
            panel: defaults::LEGEND_PANEL.to_string(),
        }
    }
}

/// Which placeholders a receptacle category can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceptacleProperties {
    pub is_on_top: bool,
    pub is_inside: bool,
    /// Top and inside are the same surface; a top placeholder is drawn at the center
    pub is_same: bool,
}

impl Default for ReceptacleProperties {
    fn default() -> Self {
        Self {
            is_on_top: true,
            is_inside: true,
            is_same: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// category -> fill colour
    pub category_colors: IndexMap<String, String>,
    /// object id prefix -> category
    pub object_categories: IndexMap<String, String>,
    /// receptacle id prefix -> tint colour
    pub receptacle_colors: IndexMap<String, String>,
    /// receptacle id prefix -> placeholder properties
    pub receptacle_properties: IndexMap<String, ReceptacleProperties>,
    pub arrow_colors: Vec<String>,
    pub default_fill: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            category_colors: palette::builtin_category_colors(),
            object_categories: palette::builtin_object_categories(),
            receptacle_colors: palette::builtin_receptacle_colors(),
            receptacle_properties: palette::builtin_receptacle_properties(),
            arrow_colors: defaults::ARROW_COLORS.iter().map(|c| c.to_string()).collect(),
            default_fill: defaults::DEFAULT_FILL.to_string(),
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config and merge it over the defaults.
    pub fn from_json_str(name: &str, text: &str) -> Result<Self, InputError> {
        let ctx = SourceContext::new(name, text);
        let config: Config = ctx.parse_json()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&path.display().to_string(), &text)
    }

    /// Reject non-finite or negative sizes and a non-positive target width.
    pub fn validate(&self) -> Result<(), InputError> {
        let lengths = [
            ("object.width", self.object.width),
            ("object.height", self.object.height),
            ("object.rounding_size", self.object.rounding_size),
            ("object.text_margin", self.object.text_margin),
            ("receptacle.target_height", self.receptacle.target_height),
            ("receptacle.horizontal_margin", self.receptacle.horizontal_margin),
            ("receptacle.placeholder_margin", self.receptacle.placeholder_margin),
            ("receptacle.fallback_width", self.receptacle.fallback_width),
            ("receptacle.rounding_size", self.receptacle.rounding_size),
            ("placeholder.width", self.placeholder.width),
            ("placeholder.height", self.placeholder.height),
            ("placeholder.rounding_size", self.placeholder.rounding_size),
            ("room.min_width", self.room.min_width),
            ("room.left_pad", self.room.left_pad),
            ("room.right_pad", self.room.right_pad),
            ("room.top_pad", self.room.top_pad),
            ("room.bottom_pad", self.room.bottom_pad),
            ("room.horizontal_margin", self.room.horizontal_margin),
            ("room.vertical_margin", self.room.vertical_margin),
            ("room.full_height", self.room.full_height),
            ("room.half_height", self.room.half_height),
            ("room.border_width", self.room.border_width),
            ("scene.instruction_gap", self.scene.instruction_gap),
            ("scene.divider_offset", self.scene.divider_offset),
            ("scene.level_gap", self.scene.level_gap),
            ("scene.legend_gap", self.scene.legend_gap),
            ("arrow.head_length", self.arrow.head_length),
            ("arrow.head_width", self.arrow.head_width),
            ("legend.width", self.legend.width),
            ("legend.height", self.legend.height),
            ("legend.endpoint_radius", self.legend.endpoint_radius),
        ];
        for (field, value) in lengths {
            check(field, value.raw())?;
        }

        let scalars = [
            ("object.text_size", self.object.text_size),
            ("room.min_width_per_object", self.room.min_width_per_object),
            ("room.receptacle_horizontal_margin_fraction", self.room.receptacle_horizontal_margin_fraction),
            ("room.object_horizontal_margin_fraction", self.room.object_horizontal_margin_fraction),
            ("room.objects_height", self.room.objects_height),
            ("room.box_alpha", self.room.box_alpha),
            ("room.text_size", self.room.text_size),
            ("scene.instruction_text_size", self.scene.instruction_text_size),
            ("scene.divider_linewidth", self.scene.divider_linewidth),
            ("arrow.linewidth", self.arrow.linewidth),
            ("arrow.overhang", self.arrow.overhang),
            ("legend.linewidth", self.legend.linewidth),
            ("legend.text_size", self.legend.text_size),
        ];
        for (field, value) in scalars {
            check(field, value)?;
        }

        if let Some(target) = self.scene.target_width {
            check("scene.target_width", target.raw())?;
            if target.raw() == 0.0 {
                return Err(InputError::InvalidConfig {
                    field: "scene.target_width".to_string(),
                    reason: NumericError::Zero,
                });
            }
        }

        let pal = &self.palette;
        let colours = pal
            .receptacle_colors
            .iter()
            .map(|(k, v)| (format!("palette.receptacle_colors.{k}"), v))
            .chain(pal.category_colors.iter().map(|(k, v)| (format!("palette.category_colors.{k}"), v)))
            .chain(pal.arrow_colors.iter().enumerate().map(|(i, v)| (format!("palette.arrow_colors[{i}]"), v)))
            .chain([("palette.default_fill".to_string(), &pal.default_fill)]);
        for (field, value) in colours {
            if palette::Rgb::parse(value).is_none() {
                return Err(InputError::InvalidColor {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

fn check(field: &str, value: f64) -> Result<(), InputError> {
    Length::try_non_negative(value)
        .map(|_| ())
        .map_err(|reason| InputError::InvalidConfig {
            field: field.to_string(),
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = Config::from_json_str(
            "<test>",
            r#"{ "room": { "min_width": 250 }, "scene": { "target_width": null } }"#,
        )
        .unwrap();
        assert_eq!(cfg.room.min_width, Length(250.0));
        assert_eq!(cfg.room.left_pad, defaults::ROOM_LEFT_PAD);
        assert_eq!(cfg.scene.target_width, None);
        assert_eq!(cfg.arrow.dash, vec![5.0, 10.0]);
    }

    #[test]
    fn rejects_negative_sizes() {
        let err = Config::from_json_str("<test>", r#"{ "object": { "width": -3 } }"#).unwrap_err();
        match err {
            InputError::InvalidConfig { field, reason } => {
                assert_eq!(field, "object.width");
                assert_eq!(reason, NumericError::Negative);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_target_width() {
        let err = Config::from_json_str("<test>", r#"{ "scene": { "target_width": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            InputError::InvalidConfig { reason: NumericError::Zero, .. }
        ));
    }

    #[test]
    fn malformed_json_is_an_input_error() {
        let err = Config::from_json_str("<test>", r#"{ "room": { "min_width": } }"#).unwrap_err();
        assert!(matches!(err, InputError::Json { .. }));
    }

    #[test]
    fn rejects_unreadable_colours() {
        let err = Config::from_json_str(
            "<test>",
            r##"{ "palette": { "receptacle_colors": { "table": "#aébcd" } } }"##,
        )
        .unwrap_err();
        match err {
            InputError::InvalidColor { field, value } => {
                assert_eq!(field, "palette.receptacle_colors.table");
                assert_eq!(value, "#aébcd");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Config::from_json_str("<test>", r##"{ "palette": { "arrow_colors": ["#fff", "teal"] } }"##).unwrap_err();
        assert!(matches!(err, InputError::InvalidColor { field, .. } if field == "palette.arrow_colors[1]"));
    }

    #[test]
    fn default_palette_has_nine_arrow_colors() {
        let cfg = Config::default();
        assert_eq!(cfg.palette.arrow_colors.len(), 9);
        assert!(cfg.validate().is_ok());
    }
}
