//! "Next to" legend: entities of all next-to relations split into two
//! columns with a connecting line per related pair.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::config::Config;
use crate::errors::SceneError;
use crate::model::{NamedEntity, NextToArgs};
use crate::render::{Baseline, Canvas, Fill, Stroke, TextStyle, layer};
use crate::types::{Bounds, Length, Pt, Size};

use super::{Anchors, Entity, EntityFactory, EntityKind};

const INK: &str = "#FFFFFF";
const DOTTED: [f64; 2] = [1.0, 1.65];
const CAPTION: &str = "next to";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone)]
struct Edge {
    a: usize,
    b: usize,
    dotted: bool,
}

#[derive(Debug, Clone)]
pub struct NextToLegend {
    /// Node entities in first-seen order
    nodes: Vec<EntityKind>,
    sides: Vec<Side>,
    edges: Vec<Edge>,
}

impl NextToLegend {
    /// Build the relation graph and two-colour it. Returns `None` when there
    /// is nothing to draw.
    pub fn build(relations: &[&NextToArgs], factory: &EntityFactory<'_>) -> Result<Option<Self>, SceneError> {
        let mut index: IndexMap<String, NamedEntity> = IndexMap::new();
        // unordered pair -> dotted, last relation wins
        let mut styles: IndexMap<(usize, usize), bool> = IndexMap::new();

        for rel in relations {
            for a in &rel.entities_a {
                index.entry(a.name.clone()).or_insert_with(|| a.clone());
            }
            let dotted = rel.number < rel.entities_a.len() || rel.number < rel.entities_b.len();
            for b in &rel.entities_b {
                let entry = index.entry(b.name.clone());
                let bi = entry.index();
                entry.or_insert_with(|| b.clone());
                for a in &rel.entities_a {
                    let Some(ai) = index.get_index_of(&a.name) else { continue };
                    styles.insert((ai.min(bi), ai.max(bi)), dotted);
                }
            }
        }
        if styles.is_empty() {
            return Ok(None);
        }

        let names: Vec<&str> = index.keys().map(String::as_str).collect();
        let edges: Vec<Edge> = styles.into_iter().map(|((a, b), dotted)| Edge { a, b, dotted }).collect();
        let sides = two_color(&names, &edges)?;
        let nodes = index.values().map(|e| factory.entity(e)).collect();
        Ok(Some(Self { nodes, sides, edges }))
    }

    fn column_len(&self, side: Side) -> usize {
        self.sides.iter().filter(|&&s| s == side).count()
    }

    /// Vertical room given to the taller column.
    fn column_height(&self, config: &Config) -> Length {
        let slots = |n: usize| (n + 1) * 2 + n;
        let left = self.column_len(Side::Left);
        let right = self.column_len(Side::Right);
        config.object.height * slots(left).max(slots(right)) as f64
    }

    pub fn width(&self, config: &Config) -> Length {
        config.legend.width
    }

    pub fn height(&self, config: &Config) -> Length {
        self.column_height(config) + config.legend.top_pad + config.legend.bottom_pad
    }

    /// Draw with the panel's bottom edge at `position.y`; the panel starts
    /// one horizontal margin right of `position.x`. Returns the panel box.
    pub fn plot(&self, canvas: &mut dyn Canvas, config: &Config, position: Pt) -> Bounds {
        let lc = &config.legend;
        let mx_height = self.column_height(config);
        let left_x = position.x + lc.horizontal_margin;

        let panel = Bounds::from_origin(Pt::new(left_x, position.y), Size::new(lc.width, self.height(config)));
        canvas.rect(panel, Length::ZERO, Some(&Fill::solid(&lc.panel)), None, layer::BACKGROUND);

        let rows = self.column_len(Side::Left).max(self.column_len(Side::Right)).max(1);
        let spacing = mx_height / rows as f64;
        let top_y = position.y + mx_height - config.object.height * 2.0 + lc.bottom_pad;

        let mut cursor = [top_y, top_y];
        let mut anchors: Vec<Anchors> = Vec::with_capacity(self.nodes.len());
        for (node, side) in self.nodes.iter().zip(&self.sides) {
            let (col, mid) = match side {
                Side::Left => (0, left_x + lc.width / 4.0),
                Side::Right => (1, left_x + lc.width * 0.75),
            };
            let origin = Pt::new(mid - node.width() / 2.0, cursor[col] - node.height() / 2.0);
            anchors.push(node.plot(canvas, config, origin));
            cursor[col] -= spacing;
        }

        let dot = Fill::solid(INK);
        for edge in &self.edges {
            let (a, b) = (anchors[edge.a].center, anchors[edge.b].center);
            let stroke = if edge.dotted {
                Stroke::dashed(INK, lc.linewidth, &DOTTED)
            } else {
                Stroke::solid(INK, lc.linewidth)
            };
            canvas.line(a, b, &stroke, layer::ARROW);
            canvas.circle(a, lc.endpoint_radius, &dot, layer::OVERLAY);
            canvas.circle(b, lc.endpoint_radius, &dot, layer::OVERLAY);
        }

        canvas.text(
            Pt::new(left_x + lc.width / 2.0, position.y + mx_height + lc.bottom_pad),
            &[CAPTION.to_string()],
            &TextStyle::centered(lc.text_size, Baseline::Top),
            layer::OVERLAY,
        );
        panel
    }

    /// Entity ids per column, top to bottom.
    pub fn columns(&self) -> (Vec<&str>, Vec<&str>) {
        let pick = |side: Side| {
            self.nodes
                .iter()
                .zip(&self.sides)
                .filter(|(_, s)| **s == side)
                .map(|(n, _)| n.id())
                .collect()
        };
        (pick(Side::Left), pick(Side::Right))
    }
}

/// BFS two-colouring, one component at a time in node order. The first
/// node of every component goes left.
fn two_color(names: &[&str], edges: &[Edge]) -> Result<Vec<Side>, SceneError> {
    let mut adjacency = vec![Vec::new(); names.len()];
    for e in edges {
        adjacency[e.a].push(e.b);
        adjacency[e.b].push(e.a);
    }

    let mut sides: Vec<Option<Side>> = vec![None; names.len()];
    for start in 0..names.len() {
        if sides[start].is_some() {
            continue;
        }
        sides[start] = Some(Side::Left);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            let here = sides[node].unwrap_or(Side::Left);
            let there = match here {
                Side::Left => Side::Right,
                Side::Right => Side::Left,
            };
            for &next in &adjacency[node] {
                match sides[next] {
                    None => {
                        sides[next] = Some(there);
                        queue.push_back(next);
                    }
                    Some(s) if s == here => {
                        return Err(SceneError::NonBipartiteNextTo {
                            entity: names[next].to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
    }
    Ok(sides.into_iter().map(|s| s.unwrap_or(Side::Left)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::NoIcons;
    use crate::model::EntityType;
    use crate::render::{Shape, SvgCanvas};
    use crate::types::pt;

    fn named(name: &str, kind: EntityType) -> NamedEntity {
        NamedEntity {
            name: name.to_string(),
            kind,
        }
    }

    fn rel(a: &[&str], b: &[&str], number: usize) -> NextToArgs {
        NextToArgs {
            entities_a: a.iter().map(|n| named(n, EntityType::Object)).collect(),
            entities_b: b.iter().map(|n| named(n, EntityType::Receptacle)).collect(),
            number,
        }
    }

    fn build(config: &Config, rels: &[NextToArgs]) -> Result<Option<NextToLegend>, SceneError> {
        let empty = IndexMap::new();
        let factory = EntityFactory::new(config, &NoIcons, &empty, &empty);
        let refs: Vec<&NextToArgs> = rels.iter().collect();
        NextToLegend::build(&refs, &factory)
    }

    #[test]
    fn splits_into_two_columns() {
        let config = Config::default();
        let legend = build(&config, &[rel(&["cup_0"], &["table_1"], 1), rel(&["plate_2"], &["table_1"], 1)])
            .unwrap()
            .unwrap();
        let (left, right) = legend.columns();
        assert_eq!(left, vec!["cup_0", "plate_2"]);
        assert_eq!(right, vec!["table_1"]);
    }

    #[test]
    fn odd_cycle_is_rejected() {
        let config = Config::default();
        let rels = [
            rel(&["a_0"], &["b_0"], 1),
            rel(&["b_0"], &["c_0"], 1),
            rel(&["c_0"], &["a_0"], 1),
        ];
        assert!(matches!(build(&config, &rels), Err(SceneError::NonBipartiteNextTo { .. })));
    }

    #[test]
    fn no_relations_no_legend() {
        let config = Config::default();
        assert!(build(&config, &[rel(&[], &["table_1"], 1)]).unwrap().is_none());
    }

    #[test]
    fn dotted_when_number_is_short_and_caption_drawn_once() {
        let config = Config::default();
        let legend = build(&config, &[rel(&["cup_0", "cup_1"], &["table_1"], 1)]).unwrap().unwrap();
        let mut canvas = SvgCanvas::new();
        legend.plot(&mut canvas, &config, pt(0.0, 0.0));

        let lines: Vec<bool> = canvas
            .elements()
            .iter()
            .filter_map(|el| match &el.shape {
                Shape::Line { stroke, .. } => Some(stroke.is_dashed()),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec![true, true]);

        let captions = canvas
            .elements()
            .iter()
            .filter(|el| matches!(&el.shape, Shape::Text { lines, .. } if lines.first().map(String::as_str) == Some(CAPTION)))
            .count();
        assert_eq!(captions, 1);
    }

    #[test]
    fn height_follows_the_taller_column() {
        let config = Config::default();
        let legend = build(&config, &[rel(&["cup_0", "cup_1"], &["table_1"], 2)]).unwrap().unwrap();
        // left column has 2 nodes: (2 + 1) * 2 + 2 = 8 object heights
        let expected = config.object.height * 8.0 + config.legend.top_pad + config.legend.bottom_pad;
        assert_eq!(legend.height(&config), expected);
    }
}
