use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use pickupzone::{
    AssetStore, CoordinateReport, DashboardSession, DataFormat, FrameRenderer, FrameStats, ObservationTable,
    Preset, RefreshInterval, Service, VizConfig,
};

#[derive(Parser, Debug)]
#[command(name = "pickupzone", version, about = "Parking and pickup-zone occupancy visualization")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a preview PNG and a looping GIF of every timestamp.
    Render(RenderArgs),
    /// Render a single position as a PNG.
    Frame(FrameArgs),
    /// Export the HTML dashboard, or keep a live page updated.
    Dashboard(DashboardArgs),
    /// Print coordinate diagnostics for the data against the background map.
    Diagnose(DiagnoseArgs),
    /// Print per-timestamp statistics.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Observation spreadsheet: CSV, or an Excel/ODS workbook (first sheet).
    #[arg(long)]
    data: PathBuf,

    /// Asset root holding the map, `logos/`, `plates/` and `fonts/`. Defaults to the data file's
    /// directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Cosmetic preset.
    #[arg(long)]
    preset: Option<Preset>,

    /// JSON config merged over the preset.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl InputArgs {
    fn config(&self) -> anyhow::Result<VizConfig> {
        let preset = self.preset.unwrap_or_default();
        let config = match &self.config {
            Some(path) => VizConfig::from_json_path(path, preset)?,
            None => preset.config(),
        };
        config.validate()?;
        Ok(config)
    }

    fn asset_root(&self) -> PathBuf {
        self.assets.clone().unwrap_or_else(|| {
            self.data
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf()
        })
    }

    fn load(&self) -> anyhow::Result<(VizConfig, ObservationTable)> {
        let config = self.config()?;
        let table = pickupzone::load_normalized(&self.data, &config)?;
        Ok((config, table))
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory.
    #[arg(long, default_value = "output")]
    out: PathBuf,

    /// Skip `preview.png`.
    #[arg(long)]
    no_preview: bool,

    /// Skip `animation.gif`.
    #[arg(long)]
    no_animation: bool,

    /// Save the normalized table back over the data file. Workbook input is saved next to it as
    /// `<name>.normalized.csv`.
    #[arg(long)]
    write_back: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Position in the sorted timestamps (0-based).
    #[arg(long)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory.
    #[arg(long, default_value = "output/dashboard")]
    out: PathBuf,

    /// Auto-refresh interval in seconds (0.5 to 5.0, 0.5 steps). Defaults to the config value.
    #[arg(long)]
    interval: Option<f64>,

    /// Keep rewriting `live.html`, advancing one position per interval.
    #[arg(long)]
    live: bool,

    /// Stop live mode after this many advances.
    #[arg(long, requires = "live")]
    ticks: Option<usize>,
}

#[derive(Args, Debug)]
struct DiagnoseArgs {
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Print one JSON object per timestamp.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Dashboard(args) => cmd_dashboard(args),
        Command::Diagnose(args) => cmd_diagnose(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn write_back_path(data: &Path) -> PathBuf {
    match DataFormat::of(data) {
        DataFormat::Csv => data.to_path_buf(),
        DataFormat::Workbook => data.with_extension("normalized.csv"),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (config, table) = args.input.load()?;
    if args.write_back {
        let target = write_back_path(&args.input.data);
        pickupzone::write_table(&table, &target)?;
        eprintln!("wrote {}", target.display());
    }
    if args.no_preview && args.no_animation {
        return Ok(());
    }

    let assets = AssetStore::prepare(&args.input.asset_root(), &table, &config)?;
    let mut renderer = FrameRenderer::new(&table, &assets, &config)?;

    if !args.no_preview {
        let path = args.out.join("preview.png");
        pickupzone::render_preview(&mut renderer, &path)?;
        eprintln!("wrote {}", path.display());
    }
    if !args.no_animation {
        let path = args.out.join("animation.gif");
        let frames = pickupzone::render_animation(&mut renderer, &path)?;
        eprintln!("wrote {} ({frames} frames)", path.display());
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (config, table) = args.input.load()?;
    let assets = AssetStore::prepare(&args.input.asset_root(), &table, &config)?;
    let mut renderer = FrameRenderer::new(&table, &assets, &config)?;

    let frame = renderer.render_position(args.index)?;
    pickupzone::encode::write_png(&frame, &args.out, config.style.page_background)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_dashboard(args: DashboardArgs) -> anyhow::Result<()> {
    let (config, table) = args.input.load()?;
    let interval = match args.interval {
        Some(s) => RefreshInterval::new(s)?,
        None => config.refresh_interval()?,
    };
    let assets = AssetStore::prepare(&args.input.asset_root(), &table, &config)?;
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    if args.live {
        let mut session = DashboardSession::new(table.timestamps().len(), interval)?;
        eprintln!(
            "serving {} (every {interval}); press Ctrl-C to stop",
            args.out.join("live.html").display()
        );
        pickupzone::run_live(&table, &assets, &config, &args.out, &mut session, args.ticks)?;
        return Ok(());
    }

    let summary = pickupzone::export_dashboard(&table, &assets, &config, &args.out, interval)?;
    eprintln!(
        "wrote {} pages to {}",
        summary.pages,
        summary.out_dir.join("index.html").display()
    );
    Ok(())
}

fn cmd_diagnose(args: DiagnoseArgs) -> anyhow::Result<()> {
    let (config, table) = args.input.load()?;
    let root = args.input.asset_root();
    let assets = AssetStore::prepare(&root, &table, &config)?;
    let image_size = assets.background().map(|map| (map.width, map.height));
    if image_size.is_none() {
        tracing::warn!("map unavailable; skipping bounds checks");
    }
    let report = CoordinateReport::build(&table, image_size, config.vertical_offset, config.capacity)?;
    println!("{report}");
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    let (config, table) = args.input.load()?;
    let series = FrameStats::series(&table, config.capacity);

    if args.json {
        for stats in &series {
            println!("{}", serde_json::to_string(stats)?);
        }
        return Ok(());
    }

    println!(
        "{:<19}  {:>8}  {:>6}  {:>6}  {:>5}  {:>5}  {:>5}  {:>5}",
        "timestamp", "occupied", "vacant", "rate", "uber", "lyft", "waymo", "taxi"
    );
    for s in &series {
        let c = |service: Service| s.per_service.get(service);
        println!(
            "{:<19}  {:>8}  {:>6}  {:>5.1}%  {:>5}  {:>5}  {:>5}  {:>5}",
            s.timestamp.format("%Y-%m-%d %H:%M:%S"),
            s.occupied_count,
            s.vacant_count,
            s.occupancy_rate,
            c(Service::Uber),
            c(Service::Lyft),
            c(Service::Waymo),
            c(Service::Taxi)
        );
    }
    Ok(())
}
