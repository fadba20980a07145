//! Receptacle entity: tinted furniture icon with top and center placeholders.

use crate::config::{Config, PlaceholderConfig, ReceptacleProperties};
use crate::icons::Icon;
use crate::render::{Canvas, Fill, layer, palette};
use crate::types::{Bounds, Length, Offset, Pt, Size};

use super::{Anchors, Entity};

const PLACEHOLDER_FILL: &str = "#000000";

#[derive(Debug, Clone)]
pub struct Receptacle {
    id: String,
    icon: Option<Icon>,
    /// Box colour when there is no icon
    fill: String,
    /// Drawn image size (icon, or fallback box)
    image: Size<Length>,
    visible_height: Length,
    margin: Length,
    properties: ReceptacleProperties,
    pub plot_top_placeholder: bool,
    pub plot_center_placeholder: bool,
}

impl Receptacle {
    pub fn new(id: &str, config: &Config, icon: Option<Icon>) -> Self {
        let (image, visible_height) = match &icon {
            Some(icon) => (Size::new(icon.width, icon.height), icon.visible_height),
            None => {
                let h = config.receptacle.target_height;
                (Size::new(config.receptacle.fallback_width, h), h)
            }
        };
        let fill = palette::receptacle_tint(&config.palette, id)
            .map(|c| c.to_hex())
            .unwrap_or_else(|| config.palette.default_fill.clone());
        Self {
            id: id.to_string(),
            icon,
            fill,
            image,
            visible_height,
            margin: config.receptacle.horizontal_margin,
            properties: palette::receptacle_properties(&config.palette, id),
            plot_top_placeholder: false,
            plot_center_placeholder: false,
        }
    }

    pub fn properties(&self) -> ReceptacleProperties {
        self.properties
    }

    /// Anchors for a receptacle placed at `origin`, without drawing.
    pub fn anchors_at(&self, config: &Config, origin: Pt) -> Anchors {
        let x = origin.x + self.width() / 2.0;
        Anchors {
            center: Pt::new(x, origin.y + self.visible_height / 2.0),
            top: Pt::new(
                x,
                origin.y + self.visible_height + config.receptacle.placeholder_margin,
            ),
        }
    }

    /// Which placeholders end up drawn. A top placeholder on an `is_same`
    /// receptacle moves to the center.
    fn drawn_placeholders(&self) -> (bool, bool) {
        let mut top = self.plot_top_placeholder;
        let mut center = self.plot_center_placeholder;
        if top && self.properties.is_same {
            top = false;
            center = true;
        }
        (top && self.properties.is_on_top, center && self.properties.is_inside)
    }
}

impl Entity for Receptacle {
    fn id(&self) -> &str {
        &self.id
    }

    /// Icon width plus the horizontal margin on both sides.
    fn width(&self) -> Length {
        self.image.w + self.margin * 2.0
    }

    fn height(&self) -> Length {
        self.image.h
    }

    fn plot(&self, canvas: &mut dyn Canvas, config: &Config, origin: Pt) -> Anchors {
        let bounds = Bounds::from_origin(origin + Offset::new(self.margin, Length::ZERO), self.image);
        match &self.icon {
            Some(icon) => canvas.image(bounds, &icon.href, layer::CONTENT),
            None => canvas.rect(
                bounds,
                config.receptacle.rounding_size,
                Some(&Fill::solid(&self.fill)),
                None,
                layer::CONTENT,
            ),
        }

        let anchors = self.anchors_at(config, origin);
        let (top, center) = self.drawn_placeholders();
        if top {
            draw_placeholder(canvas, &config.placeholder, anchors.top);
        }
        if center {
            draw_placeholder(canvas, &config.placeholder, anchors.center);
        }
        anchors
    }
}

/// Black rounded marker centered on `center`.
pub fn draw_placeholder(canvas: &mut dyn Canvas, config: &PlaceholderConfig, center: Pt) {
    let origin = center - Offset::new(config.width / 2.0, config.height / 2.0);
    canvas.rect(
        Bounds::from_origin(origin, Size::new(config.width, config.height)),
        config.rounding_size,
        Some(&Fill::solid(PLACEHOLDER_FILL)),
        None,
        layer::PLACEHOLDER,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Shape, SvgCanvas};
    use crate::types::pt;

    fn icon(w: f64, h: f64, visible: f64) -> Icon {
        Icon {
            href: "data:image/png;base64,".into(),
            width: Length(w),
            height: Length(h),
            visible_height: Length(visible),
        }
    }

    fn placeholder_count(canvas: &SvgCanvas) -> usize {
        canvas
            .elements()
            .iter()
            .filter(|el| el.layer == layer::PLACEHOLDER && matches!(el.shape, Shape::Rect { .. }))
            .count()
    }

    #[test]
    fn width_includes_margins_and_anchors_follow_visible_height() {
        let config = Config::default();
        let table = Receptacle::new("table_0", &config, Some(icon(100.0, 80.0, 60.0)));
        assert_eq!(table.width(), Length(120.0));

        let a = table.anchors_at(&config, pt(0.0, 10.0));
        assert_eq!(a.center, pt(60.0, 40.0));
        assert_eq!(a.top, pt(60.0, 10.0 + 60.0 + config.receptacle.placeholder_margin.raw()));
    }

    #[test]
    fn fallback_box_when_no_icon() {
        let config = Config::default();
        let r = Receptacle::new("table_0", &config, None);
        assert_eq!(r.height(), config.receptacle.target_height);
        let mut canvas = SvgCanvas::new();
        r.plot(&mut canvas, &config, pt(0.0, 0.0));
        assert!(matches!(canvas.elements()[0].shape, Shape::Rect { .. }));
    }

    #[test]
    fn placeholders_follow_flags_and_properties() {
        let config = Config::default();
        let mut table = Receptacle::new("table_0", &config, Some(icon(80.0, 80.0, 80.0)));
        let mut canvas = SvgCanvas::new();
        table.plot(&mut canvas, &config, pt(0.0, 0.0));
        assert_eq!(placeholder_count(&canvas), 0);

        table.plot_top_placeholder = true;
        let mut canvas = SvgCanvas::new();
        table.plot(&mut canvas, &config, pt(0.0, 0.0));
        assert_eq!(placeholder_count(&canvas), 1);
    }

    #[test]
    fn is_same_moves_top_placeholder_to_center() {
        let config = Config::default();
        assert!(palette::receptacle_properties(&config.palette, "shelves_2").is_same);
        let mut shelves = Receptacle::new("shelves_2", &config, Some(icon(80.0, 80.0, 80.0)));
        shelves.plot_top_placeholder = true;

        let mut canvas = SvgCanvas::new();
        let anchors = shelves.plot(&mut canvas, &config, pt(0.0, 0.0));
        let centers: Vec<Pt> = canvas
            .elements()
            .iter()
            .filter(|el| el.layer == layer::PLACEHOLDER)
            .filter_map(|el| match &el.shape {
                Shape::Rect { bounds, .. } => Some(bounds.center()),
                _ => None,
            })
            .collect();
        assert_eq!(centers, vec![anchors.center]);
    }
}
