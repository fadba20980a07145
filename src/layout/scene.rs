//! Scene: room ordering, row layout, proposition arrows and temporal levels.

use std::cmp::Reverse;

use crate::config::Config;
use crate::errors::SceneError;
use crate::log::{debug, info};
use crate::model::{NextToArgs, Proposition, RawConstraint, SceneSpec, plan_levels};
use crate::render::geometry::curved_arrow;
use crate::render::{Baseline, Canvas, Fill, LINE_HEIGHT, Stroke, TextStyle, layer, palette, text};
use crate::types::{Bounds, Length, Pt};

use super::packing::{pack_rows, redistribute};
use super::{Anchors, Entity, EntityFactory, NextToLegend, Room, RoomLayout, RoomSize};

const DIVIDER_COLOR: &str = "#FFFFFF";

/// Rooms in display order. The order is fixed once, at construction.
#[derive(Debug, Clone)]
pub struct Scene {
    rooms: Vec<Room>,
    instruction: String,
}

/// Result of one row-packing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsLayout {
    pub width: Length,
    pub height_lower: Length,
    pub height_upper: Length,
    /// Index-aligned with [`Scene::rooms`]
    pub rooms: Vec<Option<RoomLayout>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnArrow {
    pub from: Pt,
    pub to: Pt,
    pub color: String,
    pub dashed: bool,
    /// False when the arrow was degenerate and only the curve was drawn
    pub has_head: bool,
}

/// One diagram for one set of propositions.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub rows: RowsLayout,
    pub arrows: Vec<DrawnArrow>,
    /// Wrapped instruction lines, empty when not shown
    pub instruction: Vec<String>,
    /// Legend panel, if any next-to relation was drawn
    pub legend: Option<Bounds>,
    pub x_min: Length,
    pub x_max: Length,
}

/// Everything the caller needs to frame and post-process a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    /// Area to show: all levels, legend and instruction banner
    pub view: Bounds,
    pub width: Length,
    pub height_lower: Length,
    pub height_upper: Length,
    pub instruction_lines: usize,
    pub levels: Vec<LevelLayout>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Top,
    Center,
}

/// Names a set of propositions refers to.
#[derive(Default)]
struct Mentions<'p> {
    objects: Vec<&'p str>,
    on_floor: Vec<&'p str>,
    receptacles: Vec<(Slot, &'p str)>,
    rooms: Vec<&'p str>,
    next_to: Vec<&'p NextToArgs>,
}

impl<'p> Mentions<'p> {
    fn collect(props: &[&'p Proposition]) -> Self {
        let mut m = Self::default();
        for &prop in props {
            match prop {
                Proposition::IsOnTop(a) | Proposition::IsInside(a) => {
                    let slot = if matches!(prop, Proposition::IsOnTop(_)) {
                        Slot::Top
                    } else {
                        Slot::Center
                    };
                    m.objects.extend(a.object_names.iter().map(String::as_str));
                    m.receptacles.extend(a.receptacle_names.iter().map(|r| (slot, r.as_str())));
                }
                Proposition::IsInRoom(a) => {
                    m.objects.extend(a.object_names.iter().map(String::as_str));
                    m.rooms.extend(a.room_names.iter().map(String::as_str));
                }
                Proposition::IsOnFloor(a) => m.on_floor.extend(a.object_names.iter().map(String::as_str)),
                Proposition::IsNextTo(a) => m.next_to.push(a),
            }
        }
        m
    }
}

fn keywords(instruction: &str) -> Vec<String> {
    instruction
        .split_whitespace()
        .map(|w| w.to_lowercase().trim_matches('.').to_string())
        .collect()
}

/// Number of (entity, instruction word) pairs where the entity's category
/// phrase occurs inside the word. Room, receptacle and object ids all count.
pub fn relevance_score(room: &Room, keywords: &[String]) -> usize {
    let hits = |id: &str| {
        let phrase = palette::category_key(id).replace('_', " ");
        keywords.iter().filter(|k| k.contains(phrase.as_str())).count()
    };
    hits(room.id())
        + room.receptacles().iter().map(|r| hits(r.id())).sum::<usize>()
        + room.objects().iter().map(|o| hits(o.id())).sum::<usize>()
}

/// Stable sort by descending relevance. An empty instruction keeps the order.
pub fn sort_rooms(rooms: Vec<Room>, instruction: &str) -> Vec<Room> {
    if instruction.is_empty() {
        return rooms;
    }
    let keywords = keywords(instruction);
    let mut scored: Vec<(usize, Room)> = rooms
        .into_iter()
        .map(|room| (relevance_score(&room, &keywords), room))
        .collect();
    for (score, room) in &scored {
        debug!(room = %room.id(), score, "room relevance");
    }
    scored.sort_by_key(|(score, _)| Reverse(*score));
    scored.into_iter().map(|(_, room)| room).collect()
}

impl Scene {
    pub fn new(rooms: Vec<Room>, instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        Self {
            rooms: sort_rooms(rooms, &instruction),
            instruction,
        }
    }

    pub fn from_spec(spec: &SceneSpec, factory: &EntityFactory<'_>) -> Self {
        let rooms = spec
            .rooms
            .iter()
            .map(|r| {
                Room::new(
                    r.id.clone(),
                    r.receptacles.iter().map(|id| factory.receptacle(id)).collect(),
                    r.objects.iter().map(|id| factory.object(id)).collect(),
                    &spec.object_to_receptacle,
                )
            })
            .collect();
        Self::new(rooms, spec.instruction.clone())
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    fn widths(&self, config: &Config, indices: &[usize]) -> Vec<Length> {
        indices.iter().map(|&i| self.rooms[i].compute_size(config).width).collect()
    }

    /// Place every room in rows stacked downward from `height_offset`.
    ///
    /// Without a target width the mentioned rooms form the first row and
    /// set the canvas width; the others are wrapped under it. With a target
    /// width, mentioned rooms (`all_mentioned` when given) go first, every
    /// row is wrapped against the target and its widths are scaled up to it.
    /// Apart from an unconstrained first row, each row uses the full height
    /// exactly when one of its rooms has objects.
    pub fn layout_rows(
        &mut self,
        canvas: &mut dyn Canvas,
        config: &Config,
        mentioned: &[String],
        all_mentioned: Option<&[String]>,
        height_offset: Length,
    ) -> RowsLayout {
        let target = config.scene.target_width;
        let front = match target {
            Some(_) => all_mentioned.unwrap_or(mentioned),
            None => mentioned,
        };
        let (first, rest): (Vec<usize>, Vec<usize>) =
            (0..self.rooms.len()).partition(|&i| front.iter().any(|m| m == self.rooms[i].id()));

        // (room indices, whether the row's height flag is forced)
        let mut rows: Vec<(Vec<usize>, bool)> = Vec::new();
        match target {
            None => {
                let canvas_width = if first.is_empty() {
                    self.widths(config, &rest).into_iter().fold(Length::ZERO, Length::max)
                } else {
                    self.widths(config, &first).into_iter().sum()
                };
                let rest_widths = self.widths(config, &rest);
                if !first.is_empty() {
                    rows.push((first, false));
                }
                // every wrapped row gets its height flag forced, the last one included
                rows.extend(
                    pack_rows(&rest_widths, canvas_width)
                        .into_iter()
                        .map(|r| (rest[r].to_vec(), true)),
                );
            }
            Some(target) => {
                let order: Vec<usize> = first.into_iter().chain(rest).collect();
                let widths = self.widths(config, &order);
                rows.extend(
                    pack_rows(&widths, target)
                        .into_iter()
                        .map(|r| (order[r].to_vec(), true)),
                );
            }
        }

        let mut placed = vec![None; self.rooms.len()];
        let mut y = height_offset;
        let mut width = Length::ZERO;
        for (row, forced) in &rows {
            if *forced {
                let full = row.iter().any(|&i| self.rooms[i].has_objects());
                for &i in row {
                    self.rooms[i].set_full_height(full);
                }
            }
            let sizes: Vec<RoomSize> = row.iter().map(|&i| self.rooms[i].compute_size(config)).collect();
            let row_height = sizes.iter().map(|s| s.height).fold(Length::ZERO, Length::max);
            y -= row_height;

            let targets: Vec<Option<Length>> = match target {
                Some(t) => {
                    let natural: Vec<Length> = sizes.iter().map(|s| s.width).collect();
                    let scaled = redistribute(&natural, t);
                    debug!(?natural, ?scaled, "row widths redistributed");
                    scaled.into_iter().map(Some).collect()
                }
                None => vec![None; row.len()],
            };

            let mut x = Length::ZERO;
            for (&i, room_target) in row.iter().zip(targets) {
                let layout = self.rooms[i].plot(canvas, config, Pt::new(x, y), room_target);
                x += layout.width;
                placed[i] = Some(layout);
            }
            debug!(rooms = row.len(), width = x.raw(), height = row_height.raw(), "row placed");
            width = width.max(x);
        }

        RowsLayout {
            width,
            height_lower: y,
            height_upper: height_offset,
            rooms: placed,
        }
    }

    /// Rooms referenced by any proposition, directly or through the
    /// objects and receptacles they contain.
    fn all_mentioned_rooms(&self, props: &[&Proposition]) -> Vec<String> {
        let m = Mentions::collect(props);
        let mut rooms: Vec<String> = m.rooms.iter().map(|r| r.to_string()).collect();
        for room in &self.rooms {
            let hit = m.objects.iter().chain(&m.on_floor).any(|o| room.find_object(o).is_some())
                || m.receptacles.iter().any(|(_, r)| room.find_receptacle(r).is_some());
            if hit && !rooms.iter().any(|r| r == room.id()) {
                rooms.push(room.id().to_string());
            }
        }
        rooms.sort();
        rooms
    }

    fn check_entities(&self, props: &[&Proposition], strict: bool) -> Result<(), SceneError> {
        let has_object = |name: &str| self.rooms.iter().any(|r| r.find_object(name).is_some());
        let has_receptacle = |name: &str| self.rooms.iter().any(|r| r.find_receptacle(name).is_some());
        let has_room = |name: &str| self.rooms.iter().any(|r| r.id() == name);

        for &prop in props {
            let mut missing: Vec<(&'static str, &str)> = prop
                .object_names()
                .iter()
                .filter(|o| !has_object(o))
                .map(|o| ("object", o.as_str()))
                .collect();
            match prop {
                Proposition::IsOnTop(a) | Proposition::IsInside(a) => missing.extend(
                    a.receptacle_names
                        .iter()
                        .filter(|r| !has_receptacle(r))
                        .map(|r| ("receptacle", r.as_str())),
                ),
                Proposition::IsInRoom(a) => missing.extend(
                    a.room_names
                        .iter()
                        .filter(|r| !has_room(r))
                        .map(|r| ("room", r.as_str())),
                ),
                Proposition::IsOnFloor(_) | Proposition::IsNextTo(_) => {}
            }
            for (kind, name) in missing {
                if strict {
                    return Err(SceneError::MissingEntity {
                        kind,
                        name: name.to_string(),
                    });
                }
                debug!(proposition = prop.function_name(), kind, name, "not in any room, skipped");
            }
        }
        Ok(())
    }

    fn object_anchors(&self, rows: &RowsLayout, name: &str) -> Vec<Anchors> {
        self.rooms
            .iter()
            .enumerate()
            .filter_map(|(ri, room)| {
                let oi = room.find_object(name)?;
                rows.rooms.get(ri)?.as_ref()?.objects.get(oi).copied()
            })
            .collect()
    }

    fn receptacle_anchors(&self, rows: &RowsLayout, name: &str) -> Vec<Anchors> {
        self.rooms
            .iter()
            .enumerate()
            .filter_map(|(ri, room)| {
                let idx = room.find_receptacle(name)?;
                rows.rooms.get(ri)?.as_ref()?.receptacles.get(idx).copied()
            })
            .collect()
    }

    fn room_centers(&self, rows: &RowsLayout, name: &str) -> Vec<Pt> {
        self.rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| room.id() == name)
            .filter_map(|(ri, _)| rows.rooms.get(ri)?.as_ref().map(|l| l.center))
            .collect()
    }

    /// Draw one diagram for `props`: highlight the rooms they mention,
    /// enable placeholders, lay out the rows, then draw arrows, the
    /// instruction and the next-to legend.
    #[allow(clippy::too_many_arguments)]
    pub fn plot_for_propositions(
        &mut self,
        canvas: &mut dyn Canvas,
        config: &Config,
        props: &[&Proposition],
        factory: &EntityFactory<'_>,
        show_instruction: bool,
        height_offset: Length,
        all_mentioned: Option<&[String]>,
    ) -> Result<LevelLayout, SceneError> {
        self.check_entities(props, config.scene.strict)?;
        let m = Mentions::collect(props);
        let mut mentioned: Vec<String> = m.rooms.iter().map(|r| r.to_string()).collect();

        for room in &mut self.rooms {
            let named = mentioned.iter().any(|r| r == room.id());
            room.plot_placeholder = named;
            for r in room.receptacles_mut() {
                r.plot_top_placeholder = false;
                r.plot_center_placeholder = false;
            }
            for o in room.objects_mut() {
                o.on_floor = false;
            }
        }

        for room in &mut self.rooms {
            let mut hit = false;
            for name in &m.on_floor {
                if let Some(i) = room.find_object(name) {
                    room.objects_mut()[i].on_floor = true;
                    hit = true;
                }
            }
            hit |= m.objects.iter().any(|o| room.find_object(o).is_some());
            for (slot, name) in &m.receptacles {
                if let Some(i) = room.find_receptacle(name) {
                    hit = true;
                    let r = &mut room.receptacles_mut()[i];
                    match slot {
                        Slot::Top => r.plot_top_placeholder = true,
                        Slot::Center => r.plot_center_placeholder = true,
                    }
                }
            }
            if hit && !mentioned.iter().any(|r| r == room.id()) {
                mentioned.push(room.id().to_string());
            }
        }
        for room in &mut self.rooms {
            let named = mentioned.iter().any(|r| r == room.id());
            room.in_proposition = named;
        }
        info!(rooms = ?mentioned, "mentioned rooms");

        let rows = self.layout_rows(canvas, config, &mentioned, all_mentioned, height_offset);

        let mut arrows = Vec::new();
        let mut color_index = 0;
        for &prop in props {
            if !prop.uses_color() {
                continue;
            }
            let color = palette::arrow_color(&config.palette, color_index).to_string();
            color_index += 1;
            let dashed = prop.is_ambiguous();

            let mut pairs: Vec<(Pt, Pt)> = Vec::new();
            match prop {
                Proposition::IsOnTop(a) | Proposition::IsInside(a) => {
                    let on_top = matches!(prop, Proposition::IsOnTop(_));
                    for obj in &a.object_names {
                        for from in self.object_anchors(&rows, obj) {
                            for recep in &a.receptacle_names {
                                for to in self.receptacle_anchors(&rows, recep) {
                                    let target = if on_top { to.top } else { to.center };
                                    pairs.push((from.center, target));
                                }
                            }
                        }
                    }
                }
                Proposition::IsInRoom(a) => {
                    let targets: Vec<Pt> = a.room_names.iter().flat_map(|r| self.room_centers(&rows, r)).collect();
                    for obj in &a.object_names {
                        for from in self.object_anchors(&rows, obj) {
                            pairs.extend(targets.iter().map(|&to| (from.center, to)));
                        }
                    }
                }
                Proposition::IsOnFloor(_) | Proposition::IsNextTo(_) => {}
            }
            for (from, to) in pairs {
                arrows.push(draw_arrow(canvas, config, from, to, &color, dashed));
            }
        }

        let instruction = if show_instruction && !self.instruction.is_empty() {
            let lines = text::wrap(&self.instruction, config.scene.max_chars_per_line);
            canvas.text(
                Pt::new(rows.width / 2.0, rows.height_upper + config.scene.instruction_gap),
                &lines,
                &TextStyle::centered(config.scene.instruction_text_size, Baseline::Bottom),
                layer::LABEL,
            );
            lines
        } else {
            Vec::new()
        };

        let mut x_min = Length::ZERO;
        let mut x_max = rows.width;
        let mut legend_box = None;
        if let Some(legend) = NextToLegend::build(&m.next_to, factory)? {
            let y = (rows.height_lower + rows.height_upper) / 2.0 - config.legend.height / 2.0;
            legend_box = Some(legend.plot(canvas, config, Pt::new(rows.width, y)));
            let gap = config.scene.legend_gap;
            x_min = -gap;
            x_max = rows.width + gap + legend.width(config) + gap;
        }

        Ok(LevelLayout {
            rows,
            arrows,
            instruction,
            legend: legend_box,
            x_min,
            x_max,
        })
    }

    /// Render the whole scene.
    ///
    /// The constraints must include a terminal-satisfaction constraint. A
    /// temporal constraint splits the propositions into levels drawn one
    /// under the other, separated by divider lines; only the first level
    /// carries the instruction.
    #[allow(clippy::too_many_arguments)]
    pub fn plot(
        &mut self,
        canvas: &mut dyn Canvas,
        config: &Config,
        propositions: &[Proposition],
        constraints: &[RawConstraint],
        factory: &EntityFactory<'_>,
        hide_instruction: bool,
    ) -> Result<SceneLayout, SceneError> {
        if self.rooms.is_empty() {
            return Err(SceneError::EmptyScene);
        }
        let levels = plan_levels(constraints, propositions.len())?;
        let all: Vec<&Proposition> = propositions.iter().collect();

        let mut out = Vec::new();
        let mut dividers = Vec::new();
        let (height_lower, height_upper) = match levels {
            Some(levels) => {
                let all_mentioned = self.all_mentioned_rooms(&all);
                let mut min_lower = Length::ZERO;
                let mut max_upper = Length::ZERO;
                for (idx, level) in levels.iter().enumerate() {
                    let props: Vec<&Proposition> = level.iter().filter_map(|&i| propositions.get(i)).collect();
                    let show = idx == 0 && !hide_instruction;
                    let layout =
                        self.plot_for_propositions(canvas, config, &props, factory, show, min_lower, Some(&all_mentioned))?;
                    dividers.push(layout.rows.height_lower - config.scene.divider_offset);
                    max_upper = max_upper.max(layout.rows.height_upper);
                    min_lower = min_lower.min(layout.rows.height_lower - config.scene.level_gap);
                    out.push(layout);
                }
                (min_lower, max_upper)
            }
            None => {
                let layout = self.plot_for_propositions(canvas, config, &all, factory, !hide_instruction, Length::ZERO, None)?;
                let extent = (layout.rows.height_lower, layout.rows.height_upper);
                out.push(layout);
                extent
            }
        };

        let mut view = Bounds::new();
        view.expand_point(Pt::new(Length::ZERO, height_lower));
        view.expand_point(Pt::new(Length::ZERO, height_upper));
        for level in &out {
            view.expand_point(Pt::new(level.x_min, level.rows.height_lower));
            view.expand_point(Pt::new(level.x_max, level.rows.height_upper));
            if let Some(panel) = &level.legend {
                view.expand_box(panel);
            }
            if !level.instruction.is_empty() {
                let banner = config.scene.instruction_text_size * LINE_HEIGHT * level.instruction.len() as f64;
                let top = level.rows.height_upper + config.scene.instruction_gap + Length(banner);
                view.expand_point(Pt::new(Length::ZERO, top));
            }
        }

        let divider = Stroke::solid(DIVIDER_COLOR, config.scene.divider_linewidth);
        for y in dividers {
            canvas.line(Pt::new(view.min.x, y), Pt::new(view.max.x, y), &divider, layer::CONTENT);
        }

        let width = out.iter().map(|l| l.rows.width).fold(Length::ZERO, Length::max);
        let instruction_lines = out.iter().map(|l| l.instruction.len().max(1)).max().unwrap_or(1);
        info!(levels = out.len(), width = width.raw(), "scene laid out");

        Ok(SceneLayout {
            view,
            width,
            height_lower,
            height_upper,
            instruction_lines,
            levels: out,
        })
    }
}

fn draw_arrow(canvas: &mut dyn Canvas, config: &Config, from: Pt, to: Pt, color: &str, dashed: bool) -> DrawnArrow {
    let ac = &config.arrow;
    let arrow = curved_arrow(from, to, ac.head_length, ac.head_width, ac.overhang);
    let stroke = if dashed {
        Stroke::dashed(color, ac.linewidth, &ac.dash)
    } else {
        Stroke::solid(color, ac.linewidth)
    };
    canvas.quad_curve(arrow.from, arrow.ctrl, arrow.to, &stroke, layer::ARROW);
    if let Some(head) = &arrow.head {
        canvas.polygon(head, &Fill::solid(color), layer::ARROW);
    }
    DrawnArrow {
        from,
        to,
        color: color.to_string(),
        dashed: stroke.is_dashed(),
        has_head: arrow.head.is_some(),
    }
}
