//! SVG canvas: records drawing calls, then serializes them layer by layer.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::{Baseline, Canvas, Fill, LINE_HEIGHT, Stroke, TextAnchor, TextStyle};
use crate::errors::RenderError;
use crate::types::{Bounds, Length, Pt, Scaler};

const FONT_FAMILY: &str = "Inter, Helvetica, Arial, sans-serif";

/// One recorded drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        bounds: Bounds,
        radius: Length,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    Image {
        bounds: Bounds,
        href: String,
    },
    Text {
        at: Pt,
        lines: Vec<String>,
        style: TextStyle,
    },
    Curve {
        from: Pt,
        ctrl: Pt,
        to: Pt,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Pt>,
        fill: Fill,
    },
    Line {
        from: Pt,
        to: Pt,
        stroke: Stroke,
    },
    Circle {
        center: Pt,
        radius: Length,
        fill: Fill,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub layer: i32,
    pub shape: Shape,
}

#[derive(Debug, Default)]
pub struct SvgCanvas {
    elements: Vec<Element>,
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    fn push(&mut self, layer: i32, shape: Shape) {
        self.elements.push(Element { layer, shape });
    }

    /// Serialize with `view` mapped onto the SVG viewport.
    ///
    /// `scale` converts diagram units to output pixels.
    pub fn to_svg(&self, view: Bounds, background: Option<&str>, scale: f64) -> Result<String, RenderError> {
        let scaler = Scaler::try_new(scale).map_err(|_| RenderError::InvalidScale { value: scale })?;
        if view.is_empty() || !view.is_finite() || view.width().raw() <= 0.0 || view.height().raw() <= 0.0 {
            return Err(RenderError::InvalidBounds);
        }

        let frame = Frame { view, scaler };
        let width = fmt_num(scaler.px(view.width()));
        let height = fmt_num(scaler.px(view.height()));
        let view_box = format!("0 0 {width} {height}");

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let mut root = BytesStart::new("svg");
        root.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
        root.push_attribute(("width", width.as_str()));
        root.push_attribute(("height", height.as_str()));
        root.push_attribute(("viewBox", view_box.as_str()));
        root.push_attribute(("font-family", FONT_FAMILY));
        root.push_attribute(("font-weight", "bold"));
        writer.write_event(Event::Start(root)).map_err(xml_error)?;

        if let Some(color) = background {
            let mut bg = BytesStart::new("rect");
            bg.push_attribute(("x", "0"));
            bg.push_attribute(("y", "0"));
            bg.push_attribute(("width", width.as_str()));
            bg.push_attribute(("height", height.as_str()));
            bg.push_attribute(("fill", color));
            writer.write_event(Event::Empty(bg)).map_err(xml_error)?;
        }

        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        ordered.sort_by_key(|el| el.layer);
        for el in ordered {
            write_shape(&mut writer, &frame, &el.shape)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("svg")))
            .map_err(xml_error)?;
        String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
    }
}

impl Canvas for SvgCanvas {
    fn rect(&mut self, bounds: Bounds, radius: Length, fill: Option<&Fill>, stroke: Option<&Stroke>, layer: i32) {
        self.push(
            layer,
            Shape::Rect {
                bounds,
                radius,
                fill: fill.cloned(),
                stroke: stroke.cloned(),
            },
        );
    }

    fn image(&mut self, bounds: Bounds, href: &str, layer: i32) {
        self.push(
            layer,
            Shape::Image {
                bounds,
                href: href.to_string(),
            },
        );
    }

    fn text(&mut self, at: Pt, lines: &[String], style: &TextStyle, layer: i32) {
        self.push(
            layer,
            Shape::Text {
                at,
                lines: lines.to_vec(),
                style: style.clone(),
            },
        );
    }

    fn quad_curve(&mut self, from: Pt, ctrl: Pt, to: Pt, stroke: &Stroke, layer: i32) {
        self.push(
            layer,
            Shape::Curve {
                from,
                ctrl,
                to,
                stroke: stroke.clone(),
            },
        );
    }

    fn polygon(&mut self, points: &[Pt], fill: &Fill, layer: i32) {
        self.push(
            layer,
            Shape::Polygon {
                points: points.to_vec(),
                fill: fill.clone(),
            },
        );
    }

    fn line(&mut self, from: Pt, to: Pt, stroke: &Stroke, layer: i32) {
        self.push(
            layer,
            Shape::Line {
                from,
                to,
                stroke: stroke.clone(),
            },
        );
    }

    fn circle(&mut self, center: Pt, radius: Length, fill: &Fill, layer: i32) {
        self.push(
            layer,
            Shape::Circle {
                center,
                radius,
                fill: fill.clone(),
            },
        );
    }
}

/// Maps diagram coordinates (Y up) to SVG pixels (Y down).
struct Frame {
    view: Bounds,
    scaler: Scaler,
}

impl Frame {
    fn x(&self, x: Length) -> f64 {
        self.scaler.px(x - self.view.min.x)
    }

    fn y(&self, y: Length) -> f64 {
        self.scaler.px(self.view.max.y - y)
    }

    fn len(&self, l: Length) -> f64 {
        self.scaler.px(l)
    }

    fn xy(&self, p: Pt) -> (String, String) {
        (fmt_num(self.x(p.x)), fmt_num(self.y(p.y)))
    }
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn xml_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Xml {
        message: err.to_string(),
    }
}

fn push_fill(elem: &mut BytesStart<'_>, fill: Option<&Fill>) {
    match fill {
        Some(f) => {
            elem.push_attribute(("fill", f.color.as_str()));
            if f.opacity < 1.0 {
                elem.push_attribute(("fill-opacity", fmt_num(f.opacity).as_str()));
            }
        }
        None => elem.push_attribute(("fill", "none")),
    }
}

fn push_stroke(elem: &mut BytesStart<'_>, frame: &Frame, stroke: Option<&Stroke>) {
    let Some(s) = stroke else { return };
    let width = s.width * frame.scaler.factor;
    elem.push_attribute(("stroke", s.color.as_str()));
    elem.push_attribute(("stroke-width", fmt_num(width).as_str()));
    if let Some(dash) = &s.dash {
        let pattern = dash
            .iter()
            .map(|d| fmt_num(d * width))
            .collect::<Vec<_>>()
            .join(" ");
        elem.push_attribute(("stroke-dasharray", pattern.as_str()));
    }
}

fn write_shape(writer: &mut XmlWriter, frame: &Frame, shape: &Shape) -> Result<(), RenderError> {
    match shape {
        Shape::Rect { bounds, radius, fill, stroke } => {
            let mut elem = BytesStart::new("rect");
            let (x, y) = frame.xy(Pt::new(bounds.min.x, bounds.max.y));
            elem.push_attribute(("x", x.as_str()));
            elem.push_attribute(("y", y.as_str()));
            elem.push_attribute(("width", fmt_num(frame.len(bounds.width())).as_str()));
            elem.push_attribute(("height", fmt_num(frame.len(bounds.height())).as_str()));
            if radius.raw() > 0.0 {
                let r = fmt_num(frame.len(*radius));
                elem.push_attribute(("rx", r.as_str()));
                elem.push_attribute(("ry", r.as_str()));
            }
            push_fill(&mut elem, fill.as_ref());
            push_stroke(&mut elem, frame, stroke.as_ref());
            writer.write_event(Event::Empty(elem)).map_err(xml_error)
        }
        Shape::Image { bounds, href } => {
            let mut elem = BytesStart::new("image");
            let (x, y) = frame.xy(Pt::new(bounds.min.x, bounds.max.y));
            elem.push_attribute(("x", x.as_str()));
            elem.push_attribute(("y", y.as_str()));
            elem.push_attribute(("width", fmt_num(frame.len(bounds.width())).as_str()));
            elem.push_attribute(("height", fmt_num(frame.len(bounds.height())).as_str()));
            elem.push_attribute(("preserveAspectRatio", "none"));
            elem.push_attribute(("href", href.as_str()));
            writer.write_event(Event::Empty(elem)).map_err(xml_error)
        }
        Shape::Text { at, lines, style } => write_text(writer, frame, *at, lines, style),
        Shape::Curve { from, ctrl, to, stroke } => {
            let (x0, y0) = frame.xy(*from);
            let (cx, cy) = frame.xy(*ctrl);
            let (x1, y1) = frame.xy(*to);
            let d = format!("M{x0},{y0} Q{cx},{cy} {x1},{y1}");
            let mut elem = BytesStart::new("path");
            elem.push_attribute(("d", d.as_str()));
            elem.push_attribute(("fill", "none"));
            push_stroke(&mut elem, frame, Some(stroke));
            writer.write_event(Event::Empty(elem)).map_err(xml_error)
        }
        Shape::Polygon { points, fill } => {
            let pts = points
                .iter()
                .map(|p| {
                    let (x, y) = frame.xy(*p);
                    format!("{x},{y}")
                })
                .collect::<Vec<_>>()
                .join(" ");
            let mut elem = BytesStart::new("polygon");
            elem.push_attribute(("points", pts.as_str()));
            push_fill(&mut elem, Some(fill));
            writer.write_event(Event::Empty(elem)).map_err(xml_error)
        }
        Shape::Line { from, to, stroke } => {
            let (x1, y1) = frame.xy(*from);
            let (x2, y2) = frame.xy(*to);
            let mut elem = BytesStart::new("line");
            elem.push_attribute(("x1", x1.as_str()));
            elem.push_attribute(("y1", y1.as_str()));
            elem.push_attribute(("x2", x2.as_str()));
            elem.push_attribute(("y2", y2.as_str()));
            push_stroke(&mut elem, frame, Some(stroke));
            writer.write_event(Event::Empty(elem)).map_err(xml_error)
        }
        Shape::Circle { center, radius, fill } => {
            let (cx, cy) = frame.xy(*center);
            let mut elem = BytesStart::new("circle");
            elem.push_attribute(("cx", cx.as_str()));
            elem.push_attribute(("cy", cy.as_str()));
            elem.push_attribute(("r", fmt_num(frame.len(*radius)).as_str()));
            push_fill(&mut elem, Some(fill));
            writer.write_event(Event::Empty(elem)).map_err(xml_error)
        }
    }
}

fn write_text(writer: &mut XmlWriter, frame: &Frame, at: Pt, lines: &[String], style: &TextStyle) -> Result<(), RenderError> {
    let size = style.size * frame.scaler.factor;
    let line_height = size * LINE_HEIGHT;
    let x = fmt_num(frame.x(at.x));
    // Bottom-anchored blocks grow upward: the first line starts higher.
    let first_y = match style.baseline {
        Baseline::Top => frame.y(at.y),
        Baseline::Bottom => frame.y(at.y) - line_height * lines.len().saturating_sub(1) as f64,
    };
    let anchor = match style.anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    };
    let baseline = match style.baseline {
        Baseline::Top => "hanging",
        Baseline::Bottom => "text-after-edge",
    };

    let mut elem = BytesStart::new("text");
    elem.push_attribute(("x", x.as_str()));
    elem.push_attribute(("y", fmt_num(first_y).as_str()));
    elem.push_attribute(("font-size", fmt_num(size).as_str()));
    elem.push_attribute(("text-anchor", anchor));
    elem.push_attribute(("dominant-baseline", baseline));
    elem.push_attribute(("fill", style.color.as_str()));
    writer.write_event(Event::Start(elem)).map_err(xml_error)?;

    for (i, line) in lines.iter().enumerate() {
        let mut span = BytesStart::new("tspan");
        span.push_attribute(("x", x.as_str()));
        span.push_attribute(("dy", if i == 0 { "0".to_string() } else { fmt_num(line_height) }.as_str()));
        writer.write_event(Event::Start(span)).map_err(xml_error)?;
        writer
            .write_event(Event::Text(BytesText::new(line)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("tspan")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("text")))
        .map_err(xml_error)
}

/// Format a coordinate with at most three decimals, trailing zeros trimmed.
pub(crate) fn fmt_num(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
