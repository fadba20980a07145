//! Every scene document under `tests/fixtures` must render to well-formed
//! SVG with a finite, non-empty view box.

use datatest_stable::Utf8Path;
use quick_xml::Reader;
use quick_xml::events::Event;
use roomplot::{Config, NoIcons, SceneSpec, render_scene};

fn view_box(svg: &str) -> datatest_stable::Result<Vec<f64>> {
    let mut reader = Reader::from_str(svg);
    let mut view_box = None;
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(el) => {
                if el.name().as_ref() == b"svg" {
                    for attr in el.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"viewBox" {
                            view_box = Some(String::from_utf8(attr.value.to_vec())?);
                        }
                    }
                }
                depth += 1;
            }
            Event::End(_) => depth -= 1,
            Event::Eof => break,
            _ => {}
        }
    }
    if depth != 0 {
        return Err(format!("{depth} unclosed elements").into());
    }
    let view_box = view_box.ok_or("missing viewBox")?;
    Ok(view_box
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()?)
}

fn render_fixture(path: &Utf8Path) -> datatest_stable::Result<()> {
    let spec = SceneSpec::from_path(path)?;
    let out = render_scene(&spec, &Config::default(), &NoIcons, false).map_err(|e| format!("{e:?}"))?;

    let vb = view_box(&out.svg)?;
    assert_eq!(vb.len(), 4, "{path}: viewBox {vb:?}");
    assert!(vb.iter().all(|v| v.is_finite()), "{path}: viewBox {vb:?}");
    assert!(vb[2] > 0.0 && vb[3] > 0.0, "{path}: viewBox {vb:?}");
    assert!(out.height_lower < out.height_upper, "{path}");
    Ok(())
}

datatest_stable::harness! {
    { test = render_fixture, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"), pattern = r"\.json$" },
}
