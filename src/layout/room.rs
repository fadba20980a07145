//! Room sizing and placement of receptacles and objects.

use indexmap::IndexMap;

use crate::config::Config;
use crate::log::{debug, warn};
use crate::render::{Baseline, Canvas, Fill, Stroke, TextStyle, layer, text};
use crate::types::{Bounds, Length, Offset, Pt, Size};

use super::receptacle::draw_placeholder;
use super::{Anchors, Entity, Object, Receptacle};

const BORDER_COLOR: &str = "#FFFFFF";

#[derive(Debug, Clone)]
pub struct Room {
    id: String,
    receptacles: Vec<Receptacle>,
    objects: Vec<Object>,
    /// object id -> receptacle id, only pairs that both live in this room
    object_to_receptacle: IndexMap<String, String>,
    use_full_height: bool,
    pub in_proposition: bool,
    pub plot_placeholder: bool,
}

/// Size of a room before any target-width padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomSize {
    /// Content box width (pads included, margins excluded)
    pub room_width: Length,
    pub width: Length,
    pub room_height: Length,
    pub height: Length,
}

/// Geometry of one placed room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    /// Outer box, margins included
    pub bounds: Bounds,
    pub room_width: Length,
    pub width: Length,
    pub room_height: Length,
    pub height: Length,
    pub center: Pt,
    /// Gap between receptacles; negative when they do not fit
    pub receptacle_spacing: Length,
    /// Index-aligned with [`Room::receptacles`]
    pub receptacles: Vec<Anchors>,
    /// Index-aligned with [`Room::objects`]
    pub objects: Vec<Anchors>,
}

impl Room {
    pub fn new(
        id: impl Into<String>,
        receptacles: Vec<Receptacle>,
        objects: Vec<Object>,
        object_to_receptacle: &IndexMap<String, String>,
    ) -> Self {
        let id = id.into();
        let mut mapping = IndexMap::new();
        for obj in &objects {
            let Some(target) = object_to_receptacle.get(obj.id()) else {
                continue;
            };
            if receptacles.iter().any(|r| r.id() == target) {
                mapping.insert(obj.id().to_string(), target.clone());
            } else {
                warn!(room = %id, object = %obj.id(), receptacle = %target,
                    "receptacle is not in the object's room, placing the object on the floor");
            }
        }
        let use_full_height = !objects.is_empty();
        Self {
            id,
            receptacles,
            objects,
            object_to_receptacle: mapping,
            use_full_height,
            in_proposition: false,
            plot_placeholder: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn receptacles(&self) -> &[Receptacle] {
        &self.receptacles
    }

    pub fn receptacles_mut(&mut self) -> &mut [Receptacle] {
        &mut self.receptacles
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [Object] {
        &mut self.objects
    }

    pub fn has_objects(&self) -> bool {
        !self.objects.is_empty()
    }

    pub fn use_full_height(&self) -> bool {
        self.use_full_height
    }

    /// A room holding objects always uses the full height.
    pub fn set_full_height(&mut self, full: bool) {
        self.use_full_height = full || self.has_objects();
    }

    pub fn find_object(&self, id: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    pub fn find_receptacle(&self, id: &str) -> Option<usize> {
        self.receptacles.iter().position(|r| r.id() == id)
    }

    fn is_mapped(&self, obj: &Object) -> bool {
        self.object_to_receptacle.contains_key(obj.id())
    }

    /// Width of the content before pads: the minimum width, grown by the
    /// objects laid out on the floor and by the receptacle row.
    fn content_width<'o>(&self, config: &Config, objects: impl Iterator<Item = &'o Object>) -> Length {
        let mut min_width = config.room.min_width;
        if self.has_objects() {
            let objects_width: Length = objects.map(Entity::width).sum();
            min_width = min_width.max(objects_width * config.room.min_width_per_object);
        }
        let receptacles: Length = self.receptacles.iter().map(Entity::width).sum();
        min_width.max(receptacles)
    }

    fn room_height(&self, config: &Config) -> Length {
        let body = if self.use_full_height {
            config.room.full_height
        } else {
            config.room.half_height
        };
        body + config.room.bottom_pad + config.room.top_pad
    }

    /// Fresh size from the current children and height flag. Every object
    /// counts towards the width here, mapped or not.
    pub fn compute_size(&self, config: &Config) -> RoomSize {
        let room_width = self.content_width(config, self.objects.iter()) + config.room.left_pad + config.room.right_pad;
        let room_height = self.room_height(config);
        RoomSize {
            room_width,
            width: room_width + config.room.horizontal_margin * 2.0,
            room_height,
            height: room_height + config.room.vertical_margin * 2.0,
        }
    }

    /// Place the room with its outer bottom-left corner at `position`.
    ///
    /// With a `target_width` the content box is padded symmetrically so the
    /// outer width reaches it; rooms already wider are left as they are.
    pub fn plot(&self, canvas: &mut dyn Canvas, config: &Config, position: Pt, target_width: Option<Length>) -> RoomLayout {
        let rc = &config.room;
        let origin = position + Offset::new(rc.horizontal_margin, rc.vertical_margin);

        let loose = self.objects.iter().filter(|o| !self.is_mapped(o));
        let mut room_width = self.content_width(config, loose) + rc.left_pad + rc.right_pad;
        if let Some(target) = target_width {
            let extra = ((target - room_width - rc.horizontal_margin * 2.0) / 2.0).max(Length::ZERO);
            room_width += extra * 2.0;
        }
        let room_height = self.room_height(config);

        // receptacle row
        let (spacing, mut x) = even_spacing(
            room_width,
            rc.receptacle_horizontal_margin_fraction,
            self.receptacles.iter().map(Entity::width),
        );
        x += origin.x;
        let row_y = origin.y + rc.bottom_pad;
        let mut receptacles = Vec::with_capacity(self.receptacles.len());
        for receptacle in &self.receptacles {
            receptacles.push(receptacle.plot(canvas, config, Pt::new(x, row_y)));
            x += receptacle.width() + spacing;
        }

        let lines = text::wrap(&self.id, rc.max_chars_per_line);
        let label_at = Pt::new(
            origin.x + room_width / 2.0,
            origin.y + rc.bottom_pad / 4.0 / lines.len().max(1) as f64,
        );
        canvas.text(label_at, &lines, &TextStyle::centered(rc.text_size, Baseline::Bottom), layer::LABEL);

        let objects = self.plot_objects(canvas, config, origin, room_width, &receptacles);

        let center_lift = if self.use_full_height {
            rc.full_height * rc.placeholder_height_if_full
        } else {
            rc.half_height * rc.placeholder_height_if_half
        };
        let center = Pt::new(origin.x + room_width / 2.0, origin.y + rc.bottom_pad + center_lift);

        let fill = Fill::solid(&rc.color).with_opacity(rc.box_alpha);
        if self.in_proposition {
            let border = rc.border_width;
            let inset = Bounds::from_origin(
                origin + Offset::new(border, border),
                Size::new(room_width - border * 2.0, room_height - border * 2.0),
            );
            let stroke = Stroke::solid(BORDER_COLOR, border.raw());
            canvas.rect(inset, Length::ZERO, Some(&fill), Some(&stroke), layer::BACKGROUND);
        } else {
            let content = Bounds::from_origin(origin, Size::new(room_width, room_height));
            canvas.rect(content, Length::ZERO, Some(&fill), None, layer::BACKGROUND);
        }

        if self.plot_placeholder {
            draw_placeholder(canvas, &config.placeholder, center);
        }

        let width = room_width + rc.horizontal_margin * 2.0;
        let height = room_height + rc.vertical_margin * 2.0;
        debug!(room = %self.id, width = width.raw(), height = height.raw(), spacing = spacing.raw(), "room placed");
        RoomLayout {
            bounds: Bounds::from_origin(position, Size::new(width, height)),
            room_width,
            width,
            room_height,
            height,
            center,
            receptacle_spacing: spacing,
            receptacles,
            objects,
        }
    }

    /// Loose objects get their own evenly spaced row; mapped objects stack
    /// upward from their receptacle's top placeholder, in insertion order.
    fn plot_objects(
        &self,
        canvas: &mut dyn Canvas,
        config: &Config,
        origin: Pt,
        room_width: Length,
        receptacles: &[Anchors],
    ) -> Vec<Anchors> {
        let rc = &config.room;
        let (spacing, mut x) = even_spacing(
            room_width,
            rc.object_horizontal_margin_fraction,
            self.objects.iter().filter(|o| !self.is_mapped(o)).map(Entity::width),
        );
        x += origin.x;
        let row_y = origin.y + rc.bottom_pad + rc.full_height * rc.objects_height;

        // top-center stacking cursor per receptacle
        let mut cursors: Vec<Pt> = receptacles.iter().map(|a| a.top).collect();

        let mut anchors = Vec::with_capacity(self.objects.len());
        for obj in &self.objects {
            let slot = self
                .object_to_receptacle
                .get(obj.id())
                .and_then(|target| self.find_receptacle(target));
            match slot {
                Some(idx) => {
                    let cursor = cursors[idx];
                    let at = Pt::new(cursor.x - obj.width() / 2.0, cursor.y);
                    let placed = obj.plot(canvas, config, at);
                    cursors[idx] = Pt::new(cursor.x, placed.top.y + obj.height());
                    anchors.push(placed);
                }
                None => {
                    anchors.push(obj.plot(canvas, config, Pt::new(x, row_y)));
                    x += obj.width() + spacing;
                }
            }
        }
        anchors
    }
}

/// Gap between `widths` spread evenly across `room_width` after keeping a
/// `fraction` of it free on both sides, and the offset of the first item.
fn even_spacing(room_width: Length, fraction: f64, widths: impl Iterator<Item = Length>) -> (Length, Length) {
    let (total, count) = widths.fold((Length::ZERO, 0usize), |(sum, n), w| (sum + w, n + 1));
    let side = room_width * fraction;
    let spacing = (room_width - side * 2.0 - total) / (count + 1) as f64;
    (spacing, spacing + side)
}
