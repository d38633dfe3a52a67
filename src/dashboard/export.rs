use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{
    assets::store::{AssetStore, ImageKey},
    config::VizConfig,
    dashboard::{
        map_svg::{map_svg, plot_layer},
        page::{PageContext, PageKind, frame_file, render_page},
    },
    data::{observation::Service, table::ObservationTable},
    foundation::error::{VizError, VizResult},
    render::panel::PanelView,
    sequence::session::{DashboardSession, RefreshInterval},
    stats::aggregate::FrameStats,
};

/// Asset URLs, relative to the export root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetLinks {
    links: BTreeMap<ImageKey, String>,
}

impl AssetLinks {
    pub fn get(&self, key: &ImageKey) -> Option<String> {
        let key = match key {
            ImageKey::PanelLogo(s) => ImageKey::Badge(*s),
            other => other.clone(),
        };
        self.links.get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Bytes escaped in one URL path segment. Unreserved characters stay readable.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Relative URL for `dir/<file_name>`.
pub fn asset_href(dir: &str, file_name: &str) -> String {
    format!("{dir}/{}", utf8_percent_encode(file_name, PATH_SEGMENT))
}

/// Copy every image the pages may reference into `<out>/assets/`.
///
/// Files keep their names on disk; the links percent-encode them, so plate numbers with spaces,
/// `#`, `?` or `%` still resolve.
pub fn copy_assets(assets: &AssetStore, out_dir: &Path) -> VizResult<AssetLinks> {
    let mut targets: Vec<(ImageKey, &str, String)> = Vec::new();
    if let Some(name) = assets
        .source_path(&ImageKey::Background)
        .and_then(Path::file_name)
    {
        targets.push((
            ImageKey::Background,
            "assets",
            name.to_string_lossy().into_owned(),
        ));
    }
    for service in Service::CONCRETE {
        targets.push((
            ImageKey::Badge(service),
            "assets/logos",
            format!("{}.png", service.asset_stem()),
        ));
    }
    for plate in assets.plate_numbers() {
        targets.push((
            ImageKey::Plate(plate.to_owned()),
            "assets/plates",
            format!("{plate}.png"),
        ));
    }

    let mut links = BTreeMap::new();
    for (key, dir, file_name) in targets {
        let Some(src) = assets.source_path(&key) else {
            continue;
        };
        let dst_dir = out_dir.join(dir);
        std::fs::create_dir_all(&dst_dir)
            .with_context(|| format!("create '{}'", dst_dir.display()))?;
        let dst = dst_dir.join(&file_name);
        std::fs::copy(src, &dst)
            .with_context(|| format!("copy '{}' to '{}'", src.display(), dst.display()))?;
        links.insert(key, asset_href(dir, &file_name));
    }
    Ok(AssetLinks { links })
}

/// Result of a dashboard export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub out_dir: PathBuf,
    pub pages: usize,
    pub assets: usize,
}

/// Builds pages for any position of one table.
pub struct DashboardBuilder<'a> {
    table: &'a ObservationTable,
    assets: &'a AssetStore,
    config: &'a VizConfig,
    timestamps: Vec<chrono::NaiveDateTime>,
    links: AssetLinks,
    interval: RefreshInterval,
}

impl<'a> DashboardBuilder<'a> {
    pub fn new(
        table: &'a ObservationTable,
        assets: &'a AssetStore,
        config: &'a VizConfig,
        links: AssetLinks,
        interval: RefreshInterval,
    ) -> VizResult<Self> {
        let timestamps = table.timestamps();
        if timestamps.is_empty() {
            return Err(VizError::load("no timestamps found in data"));
        }
        Ok(Self {
            table,
            assets,
            config,
            timestamps,
            links,
            interval,
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn page(&self, kind: PageKind, position: usize) -> VizResult<String> {
        let ts = *self.timestamps.get(position).ok_or_else(|| {
            VizError::validation(format!(
                "position {position} out of range (0..{})",
                self.timestamps.len()
            ))
        })?;
        let frame = self.table.frame(ts);
        let stats = FrameStats::compute(&frame, self.config.capacity);
        let panel = PanelView::new(&stats, self.assets, self.config);

        let prefix = kind.root_prefix();
        let (plot, layer) = plot_layer(&frame, self.assets, self.config);
        let svg = map_svg(plot, &layer, self.config, |key| {
            self.links.get(key).map(|h| format!("{prefix}{h}"))
        });

        let asset_href = |key: &ImageKey| self.links.get(key);
        Ok(render_page(&PageContext {
            kind,
            position,
            total: self.timestamps.len(),
            timestamps: &self.timestamps,
            stats: &stats,
            panel: &panel,
            map_svg: &svg,
            interval: self.interval,
            config: self.config,
            asset_href: &asset_href,
        }))
    }
}

/// Write `index.html` plus a manual and an auto-refresh page per position.
#[tracing::instrument(skip(table, assets, config), fields(out = %out_dir.display()))]
pub fn export_dashboard(
    table: &ObservationTable,
    assets: &AssetStore,
    config: &VizConfig,
    out_dir: &Path,
    interval: RefreshInterval,
) -> VizResult<ExportSummary> {
    for sub in ["manual", "auto"] {
        let dir = out_dir.join(sub);
        std::fs::create_dir_all(&dir).with_context(|| format!("create '{}'", dir.display()))?;
    }
    let links = copy_assets(assets, out_dir)?;
    let asset_count = links.len();
    let builder = DashboardBuilder::new(table, assets, config, links, interval)?;

    write_page(&out_dir.join("index.html"), &builder.page(PageKind::Index, 0)?)?;
    let mut pages = 1;
    for position in 0..builder.len() {
        let name = frame_file(position);
        write_page(
            &out_dir.join("manual").join(&name),
            &builder.page(PageKind::Manual, position)?,
        )?;
        write_page(
            &out_dir.join("auto").join(&name),
            &builder.page(PageKind::Auto, position)?,
        )?;
        pages += 2;
    }

    tracing::info!(pages, assets = asset_count, "dashboard exported");
    Ok(ExportSummary {
        out_dir: out_dir.to_path_buf(),
        pages,
        assets: asset_count,
    })
}

/// Rewrite `<out>/live.html` on every tick of `session`. Returns the number of ticks run.
#[tracing::instrument(skip(table, assets, config, session), fields(out = %out_dir.display()))]
pub fn run_live(
    table: &ObservationTable,
    assets: &AssetStore,
    config: &VizConfig,
    out_dir: &Path,
    session: &mut DashboardSession,
    ticks: Option<usize>,
) -> VizResult<usize> {
    let links = copy_assets(assets, out_dir)?;
    let builder = DashboardBuilder::new(table, assets, config, links, session.interval())?;
    if builder.len() != session.len() {
        return Err(VizError::validation(format!(
            "session covers {} positions but the table has {}",
            session.len(),
            builder.len()
        )));
    }
    let path = out_dir.join("live.html");
    tracing::info!(path = %path.display(), interval = %session.interval(), "live dashboard running");
    session.run_auto_advance(ticks, |position| write_live_page(&builder, &path, position))
}

pub fn write_live_page(
    builder: &DashboardBuilder<'_>,
    path: &Path,
    position: usize,
) -> VizResult<()> {
    write_page(path, &builder.page(PageKind::Live, position)?)
}

fn write_page(path: &Path, html: &str) -> VizResult<()> {
    std::fs::write(path, html).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/dashboard/export.rs"]
mod tests;
