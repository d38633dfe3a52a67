//! Font discovery for the map and panel labels.
//!
//! Labels ask for a sans-serif family. Whatever the asset root ships under its font directory is
//! loaded on top of the system fonts, so a bundled face wins over an unpredictable system pick.

use std::{path::Path, sync::Arc};

use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

/// Named families tried, in order, after the ones a label names.
const FALLBACK_NAMES: [&str; 2] = ["DejaVu Sans", "Arial"];

/// System fonts plus any font files found directly in `font_dir`.
pub fn build_fontdb(font_dir: Option<&Path>) -> Arc<Database> {
    let mut db = Database::new();
    db.load_system_fonts();
    if let Some(dir) = font_dir {
        let bundled = load_bundled(&mut db, dir);
        if bundled > 0 {
            tracing::debug!(dir = %dir.display(), bundled, "bundled fonts loaded");
        }
    }
    if db.is_empty() {
        tracing::warn!("no fonts available; labels will be blank");
    }
    Arc::new(db)
}

fn is_font_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FONT_EXTENSIONS.iter().any(|f| e.eq_ignore_ascii_case(f)))
}

fn load_bundled(db: &mut Database, dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| is_font_file(p))
        .filter(|p| match db.load_font_file(p) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(path = %p.display(), error = %err, "font file unreadable");
                false
            }
        })
        .count()
}

fn family_of(family: &usvg::FontFamily) -> Family<'_> {
    match family {
        usvg::FontFamily::Serif => Family::Serif,
        usvg::FontFamily::SansSerif => Family::SansSerif,
        usvg::FontFamily::Cursive => Family::Cursive,
        usvg::FontFamily::Fantasy => Family::Fantasy,
        usvg::FontFamily::Monospace => Family::Monospace,
        usvg::FontFamily::Named(name) => Family::Name(name.as_str()),
    }
}

/// Font resolver for label SVGs: requested families, then [`FALLBACK_NAMES`] and the generic
/// families, then any face at all.
pub fn make_font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<Family<'_>> = font.families().iter().map(family_of).collect();
            families.extend(FALLBACK_NAMES.map(Family::Name));
            families.push(Family::SansSerif);
            families.push(Family::Serif);
            let style = match font.style() {
                usvg::FontStyle::Normal => Style::Normal,
                usvg::FontStyle::Italic => Style::Italic,
                usvg::FontStyle::Oblique => Style::Oblique,
            };
            let query = Query {
                families: &families,
                weight: Weight(font.weight()),
                stretch: Stretch::Normal,
                style,
            };
            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
