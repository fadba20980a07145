//! Colour lookups: object categories, receptacle tints, arrow cycling.

use indexmap::IndexMap;

use crate::config::{PaletteConfig, ReceptacleProperties};
use crate::log::warn;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    /// Parse `#RRGGBB` or `#RGB`.
    pub fn parse(s: &str) -> Option<Rgb> {
        let hex = s.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).ok();
        match hex.len() {
            6 => Some(Rgb {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Rgb { r: short(0)?, g: short(1)?, b: short(2)? })
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Screen blend: `1 - (1 - a)(1 - b)` per channel.
    pub fn screen(self, other: Rgb) -> Rgb {
        fn ch(a: u8, b: u8) -> u8 {
            let (a, b) = (a as u16, b as u16);
            (255 - ((255 - a) * (255 - b) + 127) / 255) as u8
        }
        Rgb {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
        }
    }
}

/// Category key of an entity id: every `_`-separated token but the last
/// (`"coffee_table_3"` -> `"coffee_table"`).
pub fn category_key(id: &str) -> &str {
    match id.rfind('_') {
        Some(idx) => &id[..idx],
        None => "",
    }
}

/// Fill colour of an object box. Unmapped categories fall back to the
/// palette's default fill.
pub fn object_fill(palette: &PaletteConfig, object_id: &str) -> String {
    let key = category_key(object_id);
    let color = palette
        .object_categories
        .get(key)
        .and_then(|category| palette.category_colors.get(category));
    match color {
        Some(c) => c.clone(),
        None => {
            warn!(object = %object_id, category = %key, "unmapped object category, using default fill");
            palette.default_fill.clone()
        }
    }
}

/// Tint applied to a receptacle icon, if its category has one.
pub fn receptacle_tint(palette: &PaletteConfig, receptacle_id: &str) -> Option<Rgb> {
    let key = category_key(receptacle_id);
    match palette.receptacle_colors.get(key).and_then(|c| Rgb::parse(c)) {
        Some(rgb) => Some(rgb),
        None => {
            warn!(receptacle = %receptacle_id, category = %key, "unmapped receptacle category, icon left untinted");
            None
        }
    }
}

pub fn receptacle_properties(palette: &PaletteConfig, receptacle_id: &str) -> ReceptacleProperties {
    palette
        .receptacle_properties
        .get(category_key(receptacle_id))
        .copied()
        .unwrap_or_default()
}

/// Colour for the `index`-th arrow-drawing proposition, cycling through the palette.
pub fn arrow_color(palette: &PaletteConfig, index: usize) -> &str {
    if palette.arrow_colors.is_empty() {
        return "#FFFFFF";
    }
    &palette.arrow_colors[index % palette.arrow_colors.len()]
}

fn table(entries: &[(&str, &str)]) -> IndexMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn builtin_category_colors() -> IndexMap<String, String> {
    table(&[
        ("food", "#E76F51"),
        ("kitchenware", "#F4A261"),
        ("electronics", "#2A9D8F"),
        ("decor", "#E9C46A"),
        ("stationery", "#8AB17D"),
        ("clothing", "#B56576"),
        ("toy", "#6D597A"),
        ("tool", "#8D99AE"),
        ("container", "#A3C4F3"),
        ("cleaning", "#90BE6D"),
    ])
}

pub fn builtin_object_categories() -> IndexMap<String, String> {
    table(&[
        ("apple", "food"),
        ("banana", "food"),
        ("bread", "food"),
        ("orange", "food"),
        ("cup", "kitchenware"),
        ("mug", "kitchenware"),
        ("plate", "kitchenware"),
        ("bowl", "kitchenware"),
        ("kettle", "kitchenware"),
        ("laptop", "electronics"),
        ("phone", "electronics"),
        ("remote", "electronics"),
        ("vase", "decor"),
        ("candle", "decor"),
        ("book", "stationery"),
        ("pen", "stationery"),
        ("shoe", "clothing"),
        ("hat", "clothing"),
        ("toy_airplane", "toy"),
        ("stuffed_toy", "toy"),
        ("hammer", "tool"),
        ("box", "container"),
        ("basket", "container"),
        ("sponge", "cleaning"),
        ("spray_bottle", "cleaning"),
    ])
}

pub fn builtin_receptacle_colors() -> IndexMap<String, String> {
    table(&[
        ("table", "#4F6D7A"),
        ("chair", "#56A3A6"),
        ("couch", "#84B082"),
        ("bed", "#D4A5A5"),
        ("fridge", "#9DB4C0"),
        ("cabinet", "#C2A878"),
        ("counter", "#A17C6B"),
        ("shelves", "#7C9885"),
        ("sink", "#8FB8DE"),
        ("stool", "#B5838D"),
        ("drawer", "#C9ADA7"),
        ("bench", "#6B9080"),
    ])
}

pub fn builtin_receptacle_properties() -> IndexMap<String, ReceptacleProperties> {
    let surface = ReceptacleProperties { is_on_top: true, is_inside: false, is_same: false };
    let container = ReceptacleProperties { is_on_top: true, is_inside: true, is_same: false };
    let open = ReceptacleProperties { is_on_top: true, is_inside: true, is_same: true };
    [
        ("table", surface),
        ("chair", surface),
        ("couch", surface),
        ("bed", surface),
        ("counter", surface),
        ("stool", surface),
        ("bench", surface),
        ("fridge", container),
        ("cabinet", container),
        ("drawer", container),
        ("shelves", open),
        ("sink", open),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_key_drops_trailing_index() {
        assert_eq!(category_key("coffee_table_3"), "coffee_table");
        assert_eq!(category_key("apple_0"), "apple");
        assert_eq!(category_key("apple"), "");
    }

    #[test]
    fn parse_hex_forms() {
        assert_eq!(Rgb::parse("#FF7F50"), Some(Rgb { r: 255, g: 127, b: 80 }));
        assert_eq!(Rgb::parse("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("red"), None);
        assert_eq!(Rgb::parse("#12345"), None);
        assert_eq!(Rgb::parse("#+1F"), None);
    }

    #[test]
    fn non_ascii_colour_is_rejected() {
        assert_eq!(Rgb::parse("#aébcd"), None);
        assert_eq!(Rgb::parse("#éé"), None);
        let mut palette = PaletteConfig::default();
        palette.receptacle_colors.insert("table".into(), "#aébcd".into());
        assert_eq!(receptacle_tint(&palette, "table_0"), None);
    }

    #[test]
    fn screen_with_black_is_identity() {
        let c = Rgb { r: 10, g: 120, b: 200 };
        assert_eq!(c.screen(Rgb { r: 0, g: 0, b: 0 }), c);
        assert_eq!(c.screen(Rgb::WHITE), Rgb::WHITE);
    }

    #[test]
    fn unmapped_object_gets_default_fill() {
        let palette = PaletteConfig::default();
        assert_eq!(object_fill(&palette, "apple_0"), "#E76F51");
        assert_eq!(object_fill(&palette, "gizmo_4"), palette.default_fill);
    }

    #[test]
    fn arrow_colors_cycle() {
        let palette = PaletteConfig::default();
        assert_eq!(arrow_color(&palette, 0), "#FFFFFF");
        assert_eq!(arrow_color(&palette, 9), "#FFFFFF");
        assert_eq!(arrow_color(&palette, 10), "#FF7F50");
    }

    #[test]
    fn shelves_redirect_top_to_center() {
        let palette = PaletteConfig::default();
        assert!(receptacle_properties(&palette, "shelves_2").is_same);
        assert!(!receptacle_properties(&palette, "table_0").is_inside);
        assert_eq!(receptacle_properties(&palette, "mystery_1"), ReceptacleProperties::default());
    }
}
