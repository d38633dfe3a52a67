use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    assets::{PreparedImage, decode, fonts},
    config::VizConfig,
    data::{observation::Service, table::ObservationTable},
    foundation::error::VizResult,
};

/// Logo size used in the statistics panel rows.
pub const PANEL_LOGO_PX: u32 = 28;

/// Canvas size used when no background map loads.
pub const FALLBACK_MAP_SIZE: (u32, u32) = (1280, 960);

/// Lookup key for any image a scene can reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKey {
    Background,
    Plate(String),
    Badge(Service),
    PanelLogo(Service),
}

#[derive(Clone, Debug)]
struct Loaded {
    source: PathBuf,
    image: PreparedImage,
}

#[derive(Clone, Debug)]
struct Logo {
    source: PathBuf,
    badge: PreparedImage,
    panel: PreparedImage,
}

/// Every external image a run needs, decoded up front.
///
/// Renderers only read from the store; a plate or logo that failed here simply isn't present and
/// the renderer falls back to a marker. Without a map the frame is drawn on a blank
/// [`FALLBACK_MAP_SIZE`] canvas.
#[derive(Clone, Debug)]
pub struct AssetStore {
    root: PathBuf,
    background: Option<Loaded>,
    logos: BTreeMap<Service, Logo>,
    plates: BTreeMap<String, Loaded>,
    missing_plates: BTreeSet<String>,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl AssetStore {
    /// Load the background map, service logos and every plate referenced by `table`.
    ///
    /// Nothing here is fatal: missing or unreadable images degrade with a warning.
    #[tracing::instrument(skip_all, fields(root = %root.display()))]
    pub fn prepare(root: &Path, table: &ObservationTable, config: &VizConfig) -> VizResult<Self> {
        let background = load_background(root, &config.assets.map_candidates);
        match &background {
            Some(bg) => tracing::info!(
                path = %bg.source.display(),
                width = bg.image.width,
                height = bg.image.height,
                "background map loaded"
            ),
            None => tracing::warn!(
                tried = %config.assets.map_candidates.join(", "),
                width = FALLBACK_MAP_SIZE.0,
                height = FALLBACK_MAP_SIZE.1,
                "no background map found; drawing on a blank canvas"
            ),
        }

        let logo_dir = root.join(&config.assets.logo_dir);
        let mut logos = BTreeMap::new();
        for service in Service::CONCRETE {
            let path = logo_dir.join(format!("{}.png", service.asset_stem()));
            if !path.is_file() {
                tracing::warn!(%service, path = %path.display(), "service logo missing");
                continue;
            }
            match decode::load_rgba(&path) {
                Ok(rgba) => {
                    logos.insert(
                        service,
                        Logo {
                            badge: decode::prepare(decode::thumbnail(
                                &rgba,
                                config.style.badge.size_px.max(1),
                            )),
                            panel: decode::prepare(decode::thumbnail(&rgba, PANEL_LOGO_PX)),
                            source: path,
                        },
                    );
                }
                Err(err) => {
                    tracing::warn!(%service, path = %path.display(), error = %err, "service logo unreadable");
                }
            }
        }

        let plate_dir = root.join(&config.assets.plate_dir);
        let mut plates = BTreeMap::new();
        let mut missing_plates = BTreeSet::new();
        for plate in table.plate_numbers() {
            let Some(path) = plate_path(&plate_dir, plate) else {
                tracing::warn!(plate, "plate number is not a valid file name");
                missing_plates.insert(plate.to_owned());
                continue;
            };
            if !path.is_file() {
                tracing::debug!(plate, path = %path.display(), "plate image missing");
                missing_plates.insert(plate.to_owned());
                continue;
            }
            match decode::load_rgba(&path) {
                Ok(rgba) => {
                    let resized = decode::resize_to_width(&rgba, config.style.plate.width_px);
                    plates.insert(
                        plate.to_owned(),
                        Loaded {
                            source: path,
                            image: decode::prepare(resized),
                        },
                    );
                }
                Err(err) => {
                    tracing::warn!(plate, error = %err, "plate image unreadable");
                    missing_plates.insert(plate.to_owned());
                }
            }
        }
        if !missing_plates.is_empty() {
            tracing::warn!(
                missing = missing_plates.len(),
                loaded = plates.len(),
                "some plates will be drawn as markers"
            );
        }

        let font_dir = config.assets.font_dir.as_ref().map(|d| root.join(d));
        let fontdb = fonts::build_fontdb(font_dir.as_deref());

        Ok(Self {
            root: root.to_path_buf(),
            background,
            logos,
            plates,
            missing_plates,
            fontdb,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn background(&self) -> Option<&PreparedImage> {
        self.background.as_ref().map(|b| &b.image)
    }

    /// Background map size in pixels, or [`FALLBACK_MAP_SIZE`] without a map.
    pub fn map_size(&self) -> (u32, u32) {
        self.background()
            .map_or(FALLBACK_MAP_SIZE, |img| (img.width, img.height))
    }

    pub fn plate(&self, plate_number: &str) -> Option<&PreparedImage> {
        self.plates.get(plate_number.trim()).map(|p| &p.image)
    }

    pub fn badge(&self, service: Service) -> Option<&PreparedImage> {
        self.logos.get(&service).map(|l| &l.badge)
    }

    pub fn panel_logo(&self, service: Service) -> Option<&PreparedImage> {
        self.logos.get(&service).map(|l| &l.panel)
    }

    pub fn image(&self, key: &ImageKey) -> Option<&PreparedImage> {
        match key {
            ImageKey::Background => self.background(),
            ImageKey::Plate(p) => self.plate(p),
            ImageKey::Badge(s) => self.badge(*s),
            ImageKey::PanelLogo(s) => self.panel_logo(*s),
        }
    }

    /// File the image was decoded from.
    pub fn source_path(&self, key: &ImageKey) -> Option<&Path> {
        match key {
            ImageKey::Background => self.background.as_ref().map(|b| b.source.as_path()),
            ImageKey::Plate(p) => self.plates.get(p.trim()).map(|l| l.source.as_path()),
            ImageKey::Badge(s) | ImageKey::PanelLogo(s) => {
                self.logos.get(s).map(|l| l.source.as_path())
            }
        }
    }

    pub fn missing_plates(&self) -> &BTreeSet<String> {
        &self.missing_plates
    }

    /// Plate numbers with a loaded image.
    pub fn plate_numbers(&self) -> impl Iterator<Item = &str> + '_ {
        self.plates.keys().map(String::as_str)
    }

    pub fn fontdb(&self) -> &Arc<usvg::fontdb::Database> {
        &self.fontdb
    }
}

fn load_background(root: &Path, candidates: &[String]) -> Option<Loaded> {
    for name in candidates {
        let path = root.join(name);
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "map candidate not found");
            continue;
        }
        match decode::load_rgba(&path) {
            Ok(rgba) => {
                return Some(Loaded {
                    image: decode::prepare(rgba),
                    source: path,
                });
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "map candidate unreadable");
            }
        }
    }
    None
}

/// `plates/<plate>.png`, or `None` when the plate number would escape the directory.
fn plate_path(dir: &Path, plate: &str) -> Option<PathBuf> {
    if plate.is_empty()
        || plate.contains(['/', '\\'])
        || plate == "."
        || plate == ".."
        || plate.contains('\0')
    {
        return None;
    }
    Some(dir.join(format!("{plate}.png")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
