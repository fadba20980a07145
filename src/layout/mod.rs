//! Layout engine.
//!
//! Entities (objects, receptacles) and rooms are plain records. Every
//! layout pass computes fresh geometry and returns it as a value; nothing
//! placed is cached on the entity between passes.
//!
//! Submodules:
//! - `object`, `receptacle`: leaf entities
//! - `room`: room sizing and placement of its children
//! - `packing`: row fitting and width redistribution
//! - `scene`: room ordering, proposition resolution, levels
//! - `legend`: the two-column "next to" diagram

pub mod legend;
pub mod object;
pub mod packing;
pub mod receptacle;
pub mod room;
pub mod scene;

use enum_dispatch::enum_dispatch;
use indexmap::IndexMap;

use crate::config::Config;
use crate::defaults;
use crate::icons::IconSource;
use crate::model::{EntityType, NamedEntity};
use crate::render::Canvas;
use crate::render::palette;
use crate::types::{Length, Pt};

pub use legend::NextToLegend;
pub use object::Object;
pub use receptacle::Receptacle;
pub use room::{Room, RoomLayout, RoomSize};
pub use scene::{Scene, SceneLayout};

/// Arrow endpoints produced by placing an entity.
///
/// For an object, `center` is the box center and `top` is where its label
/// hangs from. For a receptacle, they are the center and top placeholder
/// positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchors {
    pub center: Pt,
    pub top: Pt,
}

/// Anything that can be placed inside a room or the legend.
#[enum_dispatch]
pub trait Entity {
    fn id(&self) -> &str;

    fn width(&self) -> Length;

    fn height(&self) -> Length;

    /// Draw with the bottom-left corner at `origin` and report the anchors.
    fn plot(&self, canvas: &mut dyn Canvas, config: &Config, origin: Pt) -> Anchors;
}

#[enum_dispatch(Entity)]
#[derive(Debug, Clone)]
pub enum EntityKind {
    Object,
    Receptacle,
}

/// Builds entities with their icons resolved.
pub struct EntityFactory<'a> {
    config: &'a Config,
    icons: &'a dyn IconSource,
    receptacle_icons: &'a IndexMap<String, String>,
    object_icons: &'a IndexMap<String, String>,
}

impl<'a> EntityFactory<'a> {
    pub fn new(
        config: &'a Config,
        icons: &'a dyn IconSource,
        receptacle_icons: &'a IndexMap<String, String>,
        object_icons: &'a IndexMap<String, String>,
    ) -> Self {
        Self {
            config,
            icons,
            receptacle_icons,
            object_icons,
        }
    }

    pub fn object(&self, id: &str) -> Object {
        let icon = self
            .object_icons
            .get(id)
            .and_then(|path| self.icons.load(path, None, None));
        Object::new(id, self.config, icon)
    }

    /// Icon lookup order: explicit mapping, the category icon, then the
    /// generic chair. With none of them available the receptacle is a box.
    pub fn receptacle(&self, id: &str) -> Receptacle {
        let tint = palette::receptacle_tint(&self.config.palette, id);
        let target = Some(self.config.receptacle.target_height);
        let category = format!("receptacles/{}@2x.png", palette::category_key(id));
        let candidates = self
            .receptacle_icons
            .get(id)
            .map(String::as_str)
            .into_iter()
            .chain([category.as_str(), defaults::FALLBACK_RECEPTACLE_ICON]);
        let icon = candidates
            .into_iter()
            .find_map(|path| self.icons.load(path, target, tint));
        Receptacle::new(id, self.config, icon)
    }

    pub fn entity(&self, named: &NamedEntity) -> EntityKind {
        match named.kind {
            EntityType::Object => self.object(&named.name).into(),
            EntityType::Receptacle => self.receptacle(&named.name).into(),
        }
    }
}
