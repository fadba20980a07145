//! PNG export through resvg.

use miette::{IntoDiagnostic, miette};

/// Rasterize `svg` scaled to `target_width` pixels.
pub fn svg_to_png(svg: &str, target_width: u32) -> miette::Result<Vec<u8>> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options).into_diagnostic()?;

    let size = tree.size();
    let scale = target_width as f32 / size.width();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or_else(|| miette!("cannot allocate a {width}x{height} image"))?;
    let transform = tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap.encode_png().into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_has_requested_width() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20" viewBox="0 0 40 20"><rect width="40" height="20" fill="#333"/></svg>"##;
        let png = svg_to_png(svg, 80).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        // IHDR width, big endian
        assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 80);
    }
}
