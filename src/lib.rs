//! Household scene diagrams.
//!
//! A scene is a set of rooms holding receptacles (furniture) and objects,
//! plus a list of propositions describing a task goal. Rooms are packed
//! into rows, mentioned rooms are highlighted, placeholders mark the
//! target slots and curved arrows connect each object to its target.
//!
//! ```no_run
//! use roomplot::{Config, FsIconSource, SceneSpec};
//!
//! let spec = SceneSpec::from_path("scene.json")?;
//! let out = roomplot::render_scene(&spec, &Config::default(), &FsIconSource::new("icons"), false)?;
//! std::fs::write("scene.svg", out.svg).map_err(|e| miette::miette!("{e}"))?;
//! # Ok::<(), miette::Report>(())
//! ```

pub mod config;
pub mod defaults;
pub mod errors;
pub mod icons;
pub mod layout;
pub mod log;
pub mod model;
pub mod render;
pub mod types;

use indexmap::IndexMap;

use crate::layout::{Entity, EntityFactory, Room};
use crate::render::SvgCanvas;
use crate::types::{Bounds, Pt, Size, pt};

pub use config::Config;
pub use errors::{InputError, RenderError, SceneError};
pub use icons::{FsIconSource, IconSource, NoIcons};
pub use layout::{Scene, SceneLayout};
pub use model::{Episode, RunDocument, RunEpisode, SceneSpec};

/// A rendered scene and the layout facts needed to post-process it.
#[derive(Debug, Clone)]
pub struct SceneRender {
    pub svg: String,
    /// View size in diagram units
    pub width: f64,
    pub height: f64,
    /// Bottom of the lowest room row (negative, rows grow downward from 0)
    pub height_lower: f64,
    pub height_upper: f64,
    pub instruction_lines: usize,
    pub layout: SceneLayout,
}

/// Lay out and render a whole scene to SVG.
pub fn render_scene(
    spec: &SceneSpec,
    config: &Config,
    icons: &dyn IconSource,
    hide_instruction: bool,
) -> Result<SceneRender, miette::Report> {
    config.validate()?;
    let propositions = model::proposition::decode_all(&spec.propositions)?;
    let factory = EntityFactory::new(config, icons, &spec.receptacle_icons, &spec.object_icons);
    let mut scene = Scene::from_spec(spec, &factory);

    let mut canvas = SvgCanvas::new();
    let layout = scene.plot(&mut canvas, config, &propositions, &spec.constraints, &factory, hide_instruction)?;
    let svg = canvas.to_svg(layout.view, Some(&config.scene.background), 1.0)?;

    Ok(SceneRender {
        svg,
        width: layout.view.width().raw(),
        height: layout.view.height().raw(),
        height_lower: layout.height_lower.raw(),
        height_upper: layout.height_upper.raw(),
        instruction_lines: layout.instruction_lines,
        layout,
    })
}

/// Render one room of `spec` on its own, framed by its outer box.
pub fn render_room(
    spec: &SceneSpec,
    room_id: &str,
    config: &Config,
    icons: &dyn IconSource,
) -> Result<String, miette::Report> {
    config.validate()?;
    let room_spec = spec.room(room_id).ok_or_else(|| SceneError::UnknownRoom {
        name: room_id.to_string(),
    })?;
    let factory = EntityFactory::new(config, icons, &spec.receptacle_icons, &spec.object_icons);
    let room = Room::new(
        room_spec.id.clone(),
        room_spec.receptacles.iter().map(|id| factory.receptacle(id)).collect(),
        room_spec.objects.iter().map(|id| factory.object(id)).collect(),
        &spec.object_to_receptacle,
    );

    let mut canvas = SvgCanvas::new();
    let layout = room.plot(&mut canvas, config, pt(0.0, 0.0), None);
    Ok(canvas.to_svg(layout.bounds, Some(&config.scene.background), 1.0)?)
}

/// Render a single object, framed by its own box.
pub fn render_object(
    id: &str,
    config: &Config,
    icons: &dyn IconSource,
    object_icons: &IndexMap<String, String>,
) -> Result<String, miette::Report> {
    let empty = IndexMap::new();
    let factory = EntityFactory::new(config, icons, &empty, object_icons);
    preview(&factory.object(id), config)
}

/// Render a single receptacle, optionally with both placeholders enabled.
pub fn render_receptacle(
    id: &str,
    config: &Config,
    icons: &dyn IconSource,
    receptacle_icons: &IndexMap<String, String>,
    show_placeholders: bool,
) -> Result<String, miette::Report> {
    let empty = IndexMap::new();
    let factory = EntityFactory::new(config, icons, receptacle_icons, &empty);
    let mut receptacle = factory.receptacle(id);
    receptacle.plot_top_placeholder = show_placeholders;
    receptacle.plot_center_placeholder = show_placeholders;
    preview(&receptacle, config)
}

fn preview(entity: &dyn Entity, config: &Config) -> Result<String, miette::Report> {
    config.validate()?;
    let origin = Pt::default();
    let mut canvas = SvgCanvas::new();
    entity.plot(&mut canvas, config, origin);
    let view = Bounds::from_origin(origin, Size::new(entity.width(), entity.height()));
    Ok(canvas.to_svg(view, Some(&config.scene.background), 1.0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawProposition, RoomSpec};

    fn spec() -> SceneSpec {
        SceneSpec::from_json_str(
            "<test>",
            r#"{
                "instruction": "Put the apple on the table.",
                "rooms": [
                    { "id": "kitchen_0", "receptacles": ["table_0", "fridge_0"], "objects": ["apple_0"] },
                    { "id": "bedroom_0", "receptacles": ["bed_0"], "objects": [] }
                ],
                "propositions": [
                    { "function_name": "is_on_top",
                      "args": { "object_names": ["apple_0"], "receptacle_names": ["table_0"], "number": 1 } }
                ],
                "constraints": [
                    { "type": "TerminalSatisfactionConstraint", "args": { "proposition_indices": [0] } }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn renders_a_scene() {
        let out = render_scene(&spec(), &Config::default(), &NoIcons, false).unwrap();
        assert!(out.svg.starts_with("<svg"));
        assert!(out.width > 0.0 && out.height > 0.0);
        assert_eq!(out.instruction_lines, 1);
        assert_eq!(out.layout.levels[0].arrows.len(), 1);
    }

    #[test]
    fn unknown_room_preview_fails() {
        let err = render_room(&spec(), "garage_0", &Config::default(), &NoIcons).unwrap_err();
        assert!(err.to_string().contains("garage_0"));
    }

    #[test]
    fn entity_previews_render() {
        let config = Config::default();
        let empty = IndexMap::new();
        assert!(render_object("apple_0", &config, &NoIcons, &empty).unwrap().contains("<rect"));
        assert!(render_receptacle("table_0", &config, &NoIcons, &empty, true).unwrap().contains("<rect"));
    }

    #[test]
    fn scene_without_rooms_is_an_error() {
        let spec = SceneSpec {
            rooms: Vec::<RoomSpec>::new(),
            propositions: Vec::<RawProposition>::new(),
            ..spec()
        };
        assert!(render_scene(&spec, &Config::default(), &NoIcons, false).is_err());
    }
}
