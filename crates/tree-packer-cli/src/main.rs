use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use serde::Deserialize;
use tracing::{error, info, warn};
use tree_packer_core::config::{PackerConfig, PixelFormat, SortOrder};
use tree_packer_core::prelude::*;
use tree_packer_core::{to_json_array, to_json_hash};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "tree-packer",
    about = "Pack images into a single texture canvas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack a folder of images into one canvas
    Pack(PackArgs),
    /// Slice a tile sheet into fixed-size tiles and repack them
    Slice(SliceArgs),
    /// Random allocation stream: prints allocations, occupancy and time
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct CanvasArgs {
    /// Canvas width
    #[arg(long, default_value_t = 1024, help_heading = "Canvas")]
    width: u32,
    /// Canvas height
    #[arg(long, default_value_t = 1024, help_heading = "Canvas")]
    height: u32,
    /// Pixel format: rgba8|rgb8|la8|l8
    #[arg(long, default_value = "rgba8", help_heading = "Canvas")]
    format: String,
    /// Submission order: area_desc|max_side_desc|height_desc|width_desc|name_asc|none
    #[arg(long, default_value = "area_desc", help_heading = "Canvas")]
    sort_order: String,
    /// YAML config file path (overrides canvas options)
    #[arg(long, help_heading = "Canvas")]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
struct OutputArgs {
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Canvas base name (files will be name.png/.json)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// Metadata format: json-array | json (alias) | json-hash
    #[arg(long, default_value = "json-array", help_heading = "Export")]
    metadata: String,
    /// Layout-only: compute placements and export metadata (no PNG)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    layout_only: bool,
    /// Export canvas stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Log and skip sprites that do not fit instead of failing
    #[arg(long, default_value_t = false, help_heading = "Export")]
    skip_full: bool,
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    #[command(flatten)]
    canvas: CanvasArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
struct SliceArgs {
    /// Tile sheet image
    #[arg(help_heading = "Input/Output")]
    sheet: PathBuf,
    /// Edge length of one square tile in pixels
    #[arg(long, help_heading = "Input/Output")]
    tile_size: u32,
    #[command(flatten)]
    canvas: CanvasArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Number of random rectangles
    #[arg(long, default_value_t = 1000)]
    count: usize,
    /// Smallest side length
    #[arg(long, default_value_t = 8)]
    min_size: u32,
    /// Largest side length
    #[arg(long, default_value_t = 64)]
    max_size: u32,
    /// Canvas edge length
    #[arg(long, default_value_t = 2048)]
    size: u32,
    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Call can_fit before every insert
    #[arg(long, default_value_t = false)]
    query_first: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let show_progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Pack(args) => run_pack(args, show_progress),
        Commands::Slice(args) => run_slice(args),
        Commands::Bench(b) => run_bench(b),
    }
}

/// One sprite waiting to be placed: key, size and pixel payload.
struct Sprite {
    key: String,
    w: u32,
    h: u32,
    pixels: Vec<u8>,
}

fn run_pack(args: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(&args.canvas)?;
    if args.output.print_config {
        return print_config(&cfg, &args.output.print_config_format);
    }

    let paths = gather_paths(&args.input, &args.include, &args.exclude)?;
    let images = load_images_with_progress(&args.input, &paths, show_progress)?;
    info!(count = images.len(), "loaded input images");

    let sprites = images
        .into_iter()
        .map(|(key, img)| Sprite {
            key,
            w: img.width(),
            h: img.height(),
            pixels: image_bytes(&img, cfg.format),
        })
        .collect();
    pack_and_write(&cfg, sprites, &args.output)
}

fn run_slice(args: &SliceArgs) -> anyhow::Result<()> {
    let cfg = build_config(&args.canvas)?;
    if args.output.print_config {
        return print_config(&cfg, &args.output.print_config_format);
    }

    let sheet = load_image(&args.sheet)?;
    let tiles = TileSheet::from_image(&sheet, args.tile_size, cfg.format)
        .with_context(|| format!("slice {}", args.sheet.display()))?;
    info!(
        tiles = tiles.total(),
        columns = tiles.columns(),
        rows = tiles.rows(),
        "sliced sheet"
    );

    let stem = args
        .sheet
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tile");
    let sprites = tiles
        .iter()
        .map(|(id, pix)| Sprite {
            key: format!("{}_{:04}", stem, id),
            w: tiles.tile_size(),
            h: tiles.tile_size(),
            pixels: pix.to_vec(),
        })
        .collect();
    pack_and_write(&cfg, sprites, &args.output)
}

fn pack_and_write(cfg: &PackerConfig, mut sprites: Vec<Sprite>, out: &OutputArgs) -> anyhow::Result<()> {
    fs::create_dir_all(&out.out_dir)
        .with_context(|| format!("create out_dir {}", out.out_dir.display()))?;

    let mut order: Vec<(String, u32, u32)> =
        sprites.iter().map(|s| (s.key.clone(), s.w, s.h)).collect();
    cfg.sort_order.sort(&mut order);
    let rank: std::collections::HashMap<String, usize> = order
        .into_iter()
        .enumerate()
        .map(|(i, (k, _, _))| (k, i))
        .collect();
    sprites.sort_by_key(|s| rank.get(&s.key).copied().unwrap_or(usize::MAX));

    let (placements, packer, texture) = if out.layout_only {
        let mut pack = SpritePack::from_config(cfg, LayoutOnly::new(cfg))?;
        let placements = place_sprites(&mut pack, &sprites, out)?;
        let (packer, _) = pack.into_parts();
        (placements, packer, None)
    } else {
        let texture = StagingTexture::from_config(cfg)?.bound();
        let mut pack = SpritePack::from_config(cfg, texture)?;
        let placements = place_sprites(&mut pack, &sprites, out)?;
        let (packer, texture) = pack.into_parts();
        (placements, packer, Some(texture))
    };

    let stats = packer.stats();
    info!(
        allocations = stats.allocations,
        used_area = stats.used_area,
        canvas_area = stats.canvas_area,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );

    if let Some(mut texture) = texture {
        if let Some(dirty) = texture.update() {
            info!(?dirty, "texture updated");
        }
        let png_path = out.out_dir.join(format!("{}.png", out.name));
        texture
            .to_image()?
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, "wrote canvas");
    }

    let (width, height) = packer.canvas_size();
    let layout = Layout {
        width,
        height,
        placements,
        meta: Meta::new(cfg.format.name(), (width, height)),
    };
    let json_value = match out.metadata.as_str() {
        // Accept "json" as an alias of "json-array"
        "json-array" | "json" => to_json_array(&layout),
        "json-hash" => to_json_hash(&layout),
        other => anyhow::bail!("unknown metadata format: {}", other),
    };
    let json_path = out.out_dir.join(format!("{}.json", out.name));
    fs::write(&json_path, serde_json::to_string_pretty(&json_value)?)
        .with_context(|| format!("write {}", json_path.display()))?;
    info!(?json_path, frames = layout.placements.len(), "layout written");

    if let Some(stats_path) = &out.export_stats {
        fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
            .with_context(|| format!("write {}", stats_path.display()))?;
        info!(?stats_path, "stats exported");
    }
    Ok(())
}

/// Commit target for `--layout-only`: reserves regions, holds no pixels.
struct LayoutOnly {
    size: (u32, u32),
    bytes_per_pixel: usize,
}

impl LayoutOnly {
    fn new(cfg: &PackerConfig) -> Self {
        Self {
            size: (cfg.canvas_width, cfg.canvas_height),
            bytes_per_pixel: cfg.format.bytes_per_pixel(),
        }
    }
}

impl CommitTarget for LayoutOnly {
    fn is_bound(&self) -> bool {
        true
    }

    fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    fn dimensions(&self) -> (u32, u32) {
        self.size
    }

    fn commit(&mut self, _region: Region, _pixels: &[u8]) -> tree_packer_core::Result<()> {
        Ok(())
    }
}

fn place_sprites<T: CommitTarget>(
    pack: &mut SpritePack<T>,
    sprites: &[Sprite],
    out: &OutputArgs,
) -> anyhow::Result<Vec<Placement>> {
    let mut placements = Vec::with_capacity(sprites.len());
    for s in sprites {
        let payload = if out.layout_only {
            None
        } else {
            Some(s.pixels.as_slice())
        };
        match pack.add(s.w, s.h, payload) {
            Ok(region) => placements.push(Placement {
                key: s.key.clone(),
                region,
            }),
            Err(e @ TreePackerError::CanvasFull { .. }) if out.skip_full => {
                warn!(key = %s.key, error = %e, "skip sprite");
            }
            Err(e) => return Err(e).with_context(|| format!("pack {}", s.key)),
        }
    }
    Ok(placements)
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    use rand::{Rng, SeedableRng};
    if b.min_size == 0 || b.min_size > b.max_size {
        anyhow::bail!("invalid size range {}..={}", b.min_size, b.max_size);
    }
    let mut rng = rand::rngs::StdRng::seed_from_u64(b.seed);
    let sizes: Vec<(u32, u32)> = (0..b.count)
        .map(|_| {
            (
                rng.gen_range(b.min_size..=b.max_size),
                rng.gen_range(b.min_size..=b.max_size),
            )
        })
        .collect();

    let mut packer = TreePacker::new(b.size, b.size);
    let start = Instant::now();
    let mut rejected = 0usize;
    for &(w, h) in &sizes {
        if b.query_first && !packer.can_fit(w, h) {
            rejected += 1;
            continue;
        }
        if packer.insert(w, h).is_err() {
            rejected += 1;
        }
    }
    let dur = start.elapsed();
    let stats = packer.stats();
    println!(
        "allocations={} rejected={} occupancy={:.2}% nodes={} depth={} time={}",
        stats.allocations,
        rejected,
        stats.occupancy * 100.0,
        stats.node_count,
        stats.depth,
        bench_fmt_dur(dur)
    );
    Ok(())
}

fn bench_fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn build_config(c: &CanvasArgs) -> anyhow::Result<PackerConfig> {
    let cli_cfg = PackerConfig {
        canvas_width: c.width,
        canvas_height: c.height,
        format: parse_format(&c.format)?,
        sort_order: parse_sort_order(&c.sort_order)?,
    };
    // Config file sets canvas options en bloc
    let cfg = if let Some(path) = &c.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        y.into_packer_config(cli_cfg)
    } else {
        cli_cfg
    };
    cfg.validate()?;
    Ok(cfg)
}

fn print_config(cfg: &PackerConfig, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

/// Sprite key: path relative to the input root, forward slashes.
fn sprite_key(root: &Path, p: &Path) -> String {
    let rel = p.strip_prefix(root).ok().filter(|r| !r.as_os_str().is_empty());
    rel.unwrap_or(p).to_string_lossy().replace('\\', "/")
}

fn load_images_with_progress(
    root: &Path,
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<(String, DynamicImage)>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => list.push((sprite_key(root, p), img)),
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    canvas_width: Option<u32>,
    canvas_height: Option<u32>,
    /// Shorthand for a square canvas; width/height win when both are given.
    canvas_size: Option<u32>,
    format: Option<String>,
    sort_order: Option<String>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> PackerConfig {
        if let Some(v) = self.canvas_size {
            cfg.canvas_width = v;
            cfg.canvas_height = v;
        }
        if let Some(v) = self.canvas_width {
            cfg.canvas_width = v;
        }
        if let Some(v) = self.canvas_height {
            cfg.canvas_height = v;
        }
        if let Some(v) = self.format {
            cfg.format = v.parse().unwrap_or(cfg.format);
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = v.parse().unwrap_or(cfg.sort_order);
        }
        cfg
    }
}

fn parse_format(s: &str) -> anyhow::Result<PixelFormat> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown pixel format: {}", s))
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}
