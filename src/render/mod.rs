//! Drawing backend for scene diagrams
//!
//! This module is organized into submodules:
//! - `geometry`: curved arrow math (control point, tangent, arrowhead)
//! - `palette`: category colours, receptacle tints and properties, arrow colours
//! - `svg`: the SVG [`Canvas`] implementation
//! - `text`: label wrapping
//!
//! Layout code only talks to the [`Canvas`] trait. Coordinates are diagram
//! units with the Y axis pointing up; the backend flips when serializing.

pub mod geometry;
pub mod palette;
pub mod svg;
pub mod text;

pub use svg::{Element, Shape, SvgCanvas};

use crate::types::{Bounds, Length, Pt};

/// Text line advance as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Paint order. Lower layers are drawn first; ties keep insertion order.
pub mod layer {
    /// Room boxes and the legend panel
    pub const BACKGROUND: i32 = -1;
    pub const CONTENT: i32 = 0;
    pub const PLACEHOLDER: i32 = 1;
    pub const LABEL: i32 = 2;
    pub const ARROW: i32 = 3;
    /// Legend endpoints and caption
    pub const OVERLAY: i32 = 4;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    /// Dash pattern in multiples of `width`
    pub dash: Option<Vec<f64>>,
}

impl Stroke {
    pub fn solid(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            dash: None,
        }
    }

    pub fn dashed(color: impl Into<String>, width: f64, dash: &[f64]) -> Self {
        Self {
            color: color.into(),
            width,
            dash: (!dash.is_empty()).then(|| dash.to_vec()),
        }
    }

    pub fn is_dashed(&self) -> bool {
        self.dash.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub color: String,
    pub opacity: f64,
}

impl Fill {
    pub fn solid(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Which edge of the text block sits on the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    /// Text hangs below the point
    Top,
    /// Text sits above the point
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub anchor: TextAnchor,
    pub baseline: Baseline,
    pub color: String,
}

impl TextStyle {
    pub fn centered(size: f64, baseline: Baseline) -> Self {
        Self {
            size,
            anchor: TextAnchor::Middle,
            baseline,
            color: "#FFFFFF".to_string(),
        }
    }
}

/// Drawing capability the layout engine renders into.
///
/// Implementations are single-threaded scratch surfaces; nothing here is
/// meant to be shared between concurrent layout passes.
pub trait Canvas {
    fn rect(&mut self, bounds: Bounds, radius: Length, fill: Option<&Fill>, stroke: Option<&Stroke>, layer: i32);

    fn image(&mut self, bounds: Bounds, href: &str, layer: i32);

    fn text(&mut self, at: Pt, lines: &[String], style: &TextStyle, layer: i32);

    fn quad_curve(&mut self, from: Pt, ctrl: Pt, to: Pt, stroke: &Stroke, layer: i32);

    fn polygon(&mut self, points: &[Pt], fill: &Fill, layer: i32);

    fn line(&mut self, from: Pt, to: Pt, stroke: &Stroke, layer: i32);

    fn circle(&mut self, center: Pt, radius: Length, fill: &Fill, layer: i32);
}
