//! Icon loading: size detection, rescaling, tinting and data-URI embedding.

use std::io::Cursor;
use std::path::PathBuf;

use base64::Engine as _;
use image::{ImageFormat, RgbaImage};

use crate::log::{debug, warn};
use crate::render::palette::Rgb;
use crate::types::Length;

/// A ready-to-draw icon.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    /// `data:` URI (or plain path) usable as an SVG image href
    pub href: String,
    pub width: Length,
    pub height: Length,
    /// Height from the image bottom to its first non-transparent row
    pub visible_height: Length,
}

/// Where icons come from. Missing icons are not errors: entities fall back
/// to plain boxes.
pub trait IconSource {
    /// Load `path`, optionally rescaled to `target_height` and screen-tinted.
    fn load(&self, path: &str, target_height: Option<Length>, tint: Option<Rgb>) -> Option<Icon>;
}

/// Never finds anything; every entity is drawn as a box.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconSource for NoIcons {
    fn load(&self, _path: &str, _target_height: Option<Length>, _tint: Option<Rgb>) -> Option<Icon> {
        None
    }
}

/// Reads PNG icons relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsIconSource {
    root: PathBuf,
}

impl FsIconSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl IconSource for FsIconSource {
    fn load(&self, path: &str, target_height: Option<Length>, tint: Option<Rgb>) -> Option<Icon> {
        let full = self.root.join(path);
        if !full.exists() {
            debug!(path = %full.display(), "icon not found");
            return None;
        }
        let img = match image::open(&full) {
            Ok(img) => img.to_rgba8(),
            Err(err) => {
                warn!(path = %full.display(), error = %err, "cannot decode icon");
                return None;
            }
        };
        prepare(img, target_height, tint)
    }
}

/// Rescale, tint and encode a decoded icon.
pub fn prepare(img: RgbaImage, target_height: Option<Length>, tint: Option<Rgb>) -> Option<Icon> {
    let mut img = match target_height {
        Some(target) => resize_to_height(&img, target)?,
        None => img,
    };
    if let Some(color) = tint {
        screen_tint(&mut img, color);
    }
    let visible = visible_height(&img);

    let mut png = Vec::new();
    if let Err(err) = img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
        warn!(error = %err, "cannot encode icon");
        return None;
    }
    let href = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&png)
    );

    Some(Icon {
        href,
        width: Length(img.width() as f64),
        height: Length(img.height() as f64),
        visible_height: Length(visible as f64),
    })
}

/// Scale so the height matches `target`, truncating both sides to whole pixels.
fn resize_to_height(img: &RgbaImage, target: Length) -> Option<RgbaImage> {
    if img.height() == 0 {
        return None;
    }
    let factor = target.raw() / img.height() as f64;
    let width = (img.width() as f64 * factor) as u32;
    let height = (img.height() as f64 * factor) as u32;
    if width == 0 || height == 0 {
        return None;
    }
    Some(image::imageops::resize(
        img,
        width,
        height,
        image::imageops::FilterType::CatmullRom,
    ))
}

/// Screen-blend `color` into every pixel, keeping the alpha channel.
pub fn screen_tint(img: &mut RgbaImage, color: Rgb) {
    for px in img.pixels_mut() {
        let blended = color.screen(Rgb { r: px[0], g: px[1], b: px[2] });
        px[0] = blended.r;
        px[1] = blended.g;
        px[2] = blended.b;
    }
}

/// Rows from the bottom up to (and including) the first row with any
/// non-zero alpha. Fully transparent images count as their full height.
pub fn visible_height(img: &RgbaImage) -> u32 {
    let height = img.height();
    for y in 0..height {
        if (0..img.width()).any(|x| img.get_pixel(x, y)[3] != 0) {
            return height - y;
        }
    }
    height
}
