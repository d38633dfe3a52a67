//! Text labels rasterized through an SVG overlay.

use std::{fmt::Write as _, sync::Arc};

use anyhow::Context;

use crate::{
    assets::fonts::make_font_resolver,
    foundation::{
        core::{Canvas, escape_markup},
        error::{VizError, VizResult},
    },
    render::scene::{TextAnchor, TextLabel},
};

pub const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

/// `<text>` element for one label, vertically centered on its position.
pub fn text_element(label: &TextLabel) -> String {
    let anchor = match label.anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    };
    let mut s = format!(
        r#"<text x="{:.2}" y="{:.2}" font-family="{FONT_FAMILY}" font-size="{}" text-anchor="{anchor}" dominant-baseline="central" fill="{}""#,
        label.pos.x,
        label.pos.y,
        label.size_px,
        label.color.with_alpha(255).to_hex(),
    );
    if label.bold {
        s.push_str(r#" font-weight="bold""#);
    }
    if label.color.a != 255 {
        let _ = write!(s, r#" fill-opacity="{:.3}""#, f32::from(label.color.a) / 255.0);
    }
    s.push('>');
    s.push_str(&escape_markup(&label.text));
    s.push_str("</text>");
    s
}

/// Standalone SVG document holding every label on a transparent canvas.
pub fn labels_svg(labels: &[TextLabel], canvas: Canvas) -> String {
    let mut s = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = canvas.width,
        h = canvas.height
    );
    for label in labels {
        s.push_str(&text_element(label));
    }
    s.push_str("</svg>");
    s
}

/// Rasterize `labels` into a premultiplied RGBA8 buffer the size of `canvas`.
pub fn rasterize_labels(
    labels: &[TextLabel],
    canvas: Canvas,
    fontdb: &Arc<usvg::fontdb::Database>,
) -> VizResult<Vec<u8>> {
    let svg = labels_svg(labels, canvas);
    let opts = usvg::Options {
        fontdb: fontdb.clone(),
        font_resolver: make_font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(svg.as_bytes(), &opts).context("parse label overlay svg")?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| VizError::render("failed to allocate text overlay"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg_text.rs"]
mod tests;
