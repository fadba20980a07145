//! Object entity: an icon or a category-coloured rounded box with a label.

use crate::config::Config;
use crate::icons::Icon;
use crate::render::{Baseline, Canvas, Fill, TextStyle, layer, palette, text};
use crate::types::{Bounds, Length, Offset, Pt, Size};

use super::{Anchors, Entity};

#[derive(Debug, Clone)]
pub struct Object {
    id: String,
    icon: Option<Icon>,
    fill: String,
    size: Size<Length>,
    /// Set while rendering a level that has this object on the floor
    pub on_floor: bool,
}

impl Object {
    /// With an icon the object takes the icon's native size, otherwise the
    /// configured box size.
    pub fn new(id: &str, config: &Config, icon: Option<Icon>) -> Self {
        let size = match &icon {
            Some(icon) => Size::new(icon.width, icon.height),
            None => Size::new(config.object.width, config.object.height),
        };
        let fill = match icon {
            Some(_) => config.palette.default_fill.clone(),
            None => palette::object_fill(&config.palette, id),
        };
        Self {
            id: id.to_string(),
            icon,
            fill,
            size,
            on_floor: false,
        }
    }

    /// Where the label is attached for an object placed at `origin`.
    pub fn label_anchor(&self, config: &Config, origin: Pt) -> Pt {
        self.center_at(origin) + Offset::new(Length::ZERO, config.object.text_margin)
    }

    fn center_at(&self, origin: Pt) -> Pt {
        origin + Offset::new(self.size.w / 2.0, self.size.h / 2.0)
    }
}

impl Entity for Object {
    fn id(&self) -> &str {
        &self.id
    }

    fn width(&self) -> Length {
        self.size.w
    }

    fn height(&self) -> Length {
        self.size.h
    }

    fn plot(&self, canvas: &mut dyn Canvas, config: &Config, origin: Pt) -> Anchors {
        let bounds = Bounds::from_origin(origin, self.size);
        match &self.icon {
            Some(icon) => canvas.image(bounds, &icon.href, layer::CONTENT),
            None => canvas.rect(
                bounds,
                config.object.rounding_size,
                Some(&Fill::solid(&self.fill)),
                None,
                layer::CONTENT,
            ),
        }

        let label_at = self.label_anchor(config, origin);
        let lines = text::wrap(&self.id, config.object.textwrap_width);
        canvas.text(
            label_at,
            &lines,
            &TextStyle::centered(config.object.text_size, Baseline::Top),
            layer::LABEL,
        );

        Anchors {
            center: self.center_at(origin),
            top: label_at,
        }
    }
}
