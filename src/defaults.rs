//! Default sizes and settings (diagram units, roughly one unit per icon pixel)

use crate::types::Length;

// Objects
pub const OBJECT_WIDTH: Length = Length(40.0);
pub const OBJECT_HEIGHT: Length = Length(40.0);
pub const OBJECT_ROUNDING: Length = Length(8.0);
pub const OBJECT_TEXT_MARGIN: Length = Length(45.0);
pub const OBJECT_TEXTWRAP_WIDTH: usize = 10;
pub const OBJECT_TEXT_SIZE: f64 = 12.0;

// Receptacles
pub const RECEPTACLE_TARGET_HEIGHT: Length = Length(80.0);
pub const RECEPTACLE_HORIZONTAL_MARGIN: Length = Length(10.0);
pub const RECEPTACLE_PLACEHOLDER_MARGIN: Length = Length(5.0);
pub const RECEPTACLE_FALLBACK_WIDTH: Length = Length(80.0);
pub const RECEPTACLE_ROUNDING: Length = Length(6.0);

// Placeholder marker
pub const PLACEHOLDER_WIDTH: Length = Length(40.0);
pub const PLACEHOLDER_HEIGHT: Length = Length(40.0);
pub const PLACEHOLDER_ROUNDING: Length = Length(4.0);

// Rooms
pub const ROOM_MIN_WIDTH: Length = Length(200.0);
pub const ROOM_MIN_WIDTH_PER_OBJECT: f64 = 1.5;
pub const ROOM_LEFT_PAD: Length = Length(20.0);
pub const ROOM_RIGHT_PAD: Length = Length(20.0);
pub const ROOM_TOP_PAD: Length = Length(20.0);
pub const ROOM_BOTTOM_PAD: Length = Length(40.0);
pub const ROOM_HORIZONTAL_MARGIN: Length = Length(5.0);
pub const ROOM_VERTICAL_MARGIN: Length = Length(5.0);
pub const ROOM_FULL_HEIGHT: Length = Length(300.0);
pub const ROOM_HALF_HEIGHT: Length = Length(150.0);
pub const ROOM_RECEPTACLE_MARGIN_FRACTION: f64 = 0.05;
pub const ROOM_OBJECT_MARGIN_FRACTION: f64 = 0.05;
pub const ROOM_OBJECTS_HEIGHT: f64 = 0.6;
pub const ROOM_PLACEHOLDER_HEIGHT_IF_FULL: f64 = 0.5;
pub const ROOM_PLACEHOLDER_HEIGHT_IF_HALF: f64 = 0.5;
pub const ROOM_BORDER_WIDTH: Length = Length(4.0);
pub const ROOM_BOX_ALPHA: f64 = 0.5;
pub const ROOM_MAX_CHARS_PER_LINE: usize = 13;
pub const ROOM_TEXT_SIZE: f64 = 18.0;
pub const ROOM_COLOR: &str = "#5A6F8E";

// Scene
pub const SCENE_TARGET_WIDTH: Length = Length(2000.0);
pub const SCENE_BACKGROUND: &str = "#3E4C60";
pub const SCENE_MAX_CHARS_PER_LINE: usize = 80;
pub const SCENE_INSTRUCTION_TEXT_SIZE: f64 = 30.0;
pub const SCENE_INSTRUCTION_GAP: Length = Length(20.0);
pub const SCENE_DIVIDER_OFFSET: Length = Length(20.0);
pub const SCENE_LEVEL_GAP: Length = Length(40.0);
pub const SCENE_DIVIDER_LINEWIDTH: f64 = 4.0;
pub const SCENE_LEGEND_GAP: Length = Length(300.0);

// Arrows
pub const ARROW_LINEWIDTH: f64 = 3.0;
pub const ARROW_HEAD_LENGTH: Length = Length(15.0);
pub const ARROW_HEAD_WIDTH: Length = Length(12.0);
pub const ARROW_OVERHANG: f64 = 0.0;
pub const ARROW_DASH: [f64; 2] = [5.0, 10.0];

// Next-to legend
pub const LEGEND_WIDTH: Length = Length(300.0);
pub const LEGEND_HEIGHT: Length = Length(400.0);
pub const LEGEND_TOP_PAD: Length = Length(40.0);
pub const LEGEND_BOTTOM_PAD: Length = Length(20.0);
pub const LEGEND_HORIZONTAL_MARGIN: Length = Length(20.0);
pub const LEGEND_LINEWIDTH: f64 = 3.0;
pub const LEGEND_ENDPOINT_RADIUS: Length = Length(6.0);
pub const LEGEND_TEXT_SIZE: f64 = 18.0;
pub const LEGEND_PANEL: &str = "#2D3541";

// Palette
pub const DEFAULT_FILL: &str = "#B0B0B0";
pub const ARROW_COLORS: [&str; 9] = [
    "#FFFFFF", // white
    "#FF7F50", // coral
    "#FFD700", // gold
    "#00FFFF", // cyan
    "#98FF98", // mint green
    "#E6E6FA", // lavender
    "#FA8072", // salmon
    "#FFDAB9", // peach
    "#FFC0CB", // pink
];

/// Icon used when a receptacle has no entry in the icon map
pub const FALLBACK_RECEPTACLE_ICON: &str = "receptacles/chair@2x.png";
