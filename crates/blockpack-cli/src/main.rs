use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use blockpack_core::{Arrangement, Block, Container, Element, PackerConfig};
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use walkdir::WalkDir;

mod preview;

#[derive(Parser, Debug)]
#[command(
    name = "blockpack",
    about = "Pack element trees into compact, width-bounded layouts",
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
    /// Pack scenes and export layout metadata (and optional previews)
    Pack(PackArgs),
    /// Layout-only export: metadata files, never previews
    Layout(PackArgs),
    /// Simple timing bench (packs once, prints time + fit)
    Bench(BenchArgs),
    /// Generate a random scene file for experiments
    Gen(GenArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input scene file or directory (.json, .yaml, .yml)
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// YAML config file path (overrides layout options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Max layout width (takes precedence over --viewport-width)
    #[arg(long, help_heading = "Layout")]
    max_width: Option<f64>,
    /// Viewport width; the limit is the scene's max_content_width percent of it
    #[arg(long, help_heading = "Layout")]
    viewport_width: Option<f64>,
    /// Sort top-level blocks widest-first (defaults to the scene's own flag)
    #[arg(long, action = ArgAction::Set, help_heading = "Layout")]
    sort: Option<bool>,
    /// Resolve sibling groups in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,

    // Export
    /// Metadata format: json-tree | json (alias) | json-flat | scene | template
    #[arg(long, default_value = "json-tree", help_heading = "Export")]
    metadata: String,
    /// Built-in template: css | html
    #[arg(long, help_heading = "Export")]
    engine: Option<String>,
    /// External template file (handlebars), used when --metadata template
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Render a PNG preview of each layout
    #[arg(long, default_value_t = false, help_heading = "Export")]
    preview: bool,
    /// Preview pixels per layout unit
    #[arg(long, default_value_t = 1.0, help_heading = "Export")]
    preview_scale: f64,
    /// Export layout stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Input scene file or directory
    input: PathBuf,
    /// Max layout width
    #[arg(long, default_value_t = 1024.0)]
    max_width: f64,
    /// Repetitions per scene
    #[arg(long, default_value_t = 100)]
    iterations: u32,
}

#[derive(Parser, Debug, Clone)]
struct GenArgs {
    /// Output scene file (.json or .yaml)
    #[arg(short, long, default_value = "scene.json")]
    output: PathBuf,
    /// Number of top-level elements
    #[arg(long, default_value_t = 40)]
    count: usize,
    /// Probability that an element becomes a group
    #[arg(long, default_value_t = 0.15)]
    group_ratio: f64,
    /// Smallest content size
    #[arg(long, default_value_t = 16.0)]
    min_size: f64,
    /// Largest content size
    #[arg(long, default_value_t = 240.0)]
    max_size: f64,
    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

/// Layout settings after merging CLI flags and the YAML config file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Settings {
    max_width: Option<f64>,
    viewport_width: Option<f64>,
    sort: Option<bool>,
    parallel: bool,
}

impl Settings {
    fn config_for(&self, container: &Container) -> PackerConfig {
        let mut cfg = match (self.max_width, self.viewport_width) {
            (Some(w), _) => PackerConfig {
                max_width: w,
                sort: container.sort,
                ..Default::default()
            },
            (None, Some(vw)) => container.config_for_viewport(vw),
            (None, None) => PackerConfig {
                sort: container.sort,
                ..Default::default()
            },
        };
        if let Some(sort) = self.sort {
            cfg.sort = sort;
        }
        cfg.parallel = self.parallel;
        cfg
    }
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    max_width: Option<f64>,
    viewport_width: Option<f64>,
    sort: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_settings(self, mut s: Settings) -> Settings {
        if let Some(v) = self.max_width {
            s.max_width = Some(v);
        }
        if let Some(v) = self.viewport_width {
            s.viewport_width = Some(v);
        }
        if let Some(v) = self.sort {
            s.sort = Some(v);
        }
        if let Some(v) = self.parallel {
            s.parallel = v;
        }
        s
    }
}

/// A scene file holds either a full container or a bare block list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SceneFile {
    Container(Container),
    Blocks(Vec<Block>),
}

impl SceneFile {
    fn into_container(self, fallback_id: &str) -> Container {
        match self {
            SceneFile::Container(mut c) => {
                if c.id.is_empty() {
                    c.id = fallback_id.to_string();
                }
                c
            }
            SceneFile::Blocks(blocks) => Container::new(
                fallback_id,
                blocks.into_iter().map(Element::from).collect(),
            ),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => {
            let mut a = args.clone();
            a.preview = false;
            run_pack(&a, false)
        }
        Commands::Bench(b) => run_bench(b),
        Commands::Gen(g) => run_gen(g),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut settings = Settings {
        max_width: cli.max_width,
        viewport_width: cli.viewport_width,
        sort: cli.sort,
        parallel: cli.parallel,
    };
    // Config file sets layout options en bloc
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        settings = y.into_settings(settings);
    }

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&settings)?),
            _ => println!("{}", serde_json::to_string_pretty(&settings)?),
        }
        return Ok(());
    }

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no scene files found under {}", cli.input.display());
    }
    info!(count = paths.len(), "found scene files");

    let bar = progress_bar(paths.len(), show_progress && paths.len() > 1)?;
    let mut summaries = Vec::with_capacity(paths.len());
    for p in &paths {
        if let Some(b) = &bar {
            b.set_message(p.display().to_string());
        }
        let name = scene_name(p);
        let mut container = load_scene(p, &name)?;
        let cfg = settings.config_for(&container);

        let arrangement = match container.layout(&cfg) {
            Ok(Some(a)) => a,
            Ok(None) => {
                warn!(?p, "scene has no visible elements; skipped");
                continue;
            }
            Err(e) if e.is_oversize() => {
                error!(?p, error = %e, "layout does not fit");
                return Err(e).with_context(|| format!("layout {}", p.display()));
            }
            Err(e) => return Err(e).with_context(|| format!("layout {}", p.display())),
        };

        let stats = arrangement.stats();
        info!(
            scene = %name,
            max_width = cfg.max_width,
            w = stats.width,
            h = stats.height,
            blocks = stats.num_blocks,
            fit = format!("{:.2}%", stats.fit * 100.0),
            "stats"
        );

        if !cli.dry_run {
            write_metadata(cli, &name, &container, &arrangement)?;
            if cli.preview {
                let png_path = cli.out_dir.join(format!("{}.png", name));
                let img = preview::render(&arrangement, cli.preview_scale)?;
                img.save(&png_path)
                    .with_context(|| format!("write {}", png_path.display()))?;
                info!(?png_path, "preview written");
            }
        }

        summaries.push(serde_json::json!({
            "scene": name,
            "max_width": cfg.max_width,
            "stats": stats,
        }));
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }

    if let Some(stats_path) = &cli.export_stats {
        let value = serde_json::Value::Array(summaries);
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn write_metadata(
    cli: &PackArgs,
    name: &str,
    container: &Container,
    arrangement: &Arrangement,
) -> anyhow::Result<()> {
    let (out_path, contents) = match cli.metadata.as_str() {
        // Accept "json" as an alias of "json-tree"
        "json-tree" | "json" => {
            let value = blockpack_core::to_json_tree(arrangement);
            (
                cli.out_dir.join(format!("{}.json", name)),
                serde_json::to_string_pretty(&value)?,
            )
        }
        "json-flat" => {
            let value = blockpack_core::to_json_flat(arrangement);
            (
                cli.out_dir.join(format!("{}.json", name)),
                serde_json::to_string_pretty(&value)?,
            )
        }
        "scene" => (
            cli.out_dir.join(format!("{}.scene.json", name)),
            serde_json::to_string_pretty(container)?,
        ),
        "template" => {
            let ctx = build_template_context(container, arrangement);
            let tpl_owned_from_file: Option<String> = match &cli.template {
                Some(path) => Some(
                    fs::read_to_string(path)
                        .with_context(|| format!("read template {}", path.display()))?,
                ),
                None => None,
            };
            let engine = cli.engine.as_deref().map(str::to_ascii_lowercase);
            let (tpl_ref, ext): (&str, &str) = match (engine.as_deref(), &tpl_owned_from_file) {
                (Some("css"), _) => (include_str!("templates/css.hbs"), "css"),
                (Some("html"), _) => (include_str!("templates/html.hbs"), "html"),
                (Some(other), _) => anyhow::bail!("unknown engine template: {}", other),
                (None, Some(s)) => (s.as_str(), "txt"),
                // default to css if not specified
                (None, None) => (include_str!("templates/css.hbs"), "css"),
            };

            let mut reg = Handlebars::new();
            reg.set_strict_mode(true);
            reg.register_template_string("tpl", tpl_ref)?;
            (
                cli.out_dir.join(format!("{}.{}", name, ext)),
                reg.render("tpl", &ctx)?,
            )
        }
        other => anyhow::bail!("unknown metadata format: {}", other),
    };
    fs::write(&out_path, contents).with_context(|| format!("write {}", out_path.display()))?;
    info!(?out_path, "layout written");
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    use std::time::Instant;
    let paths = gather_paths(&b.input, &[], &[])?;
    let cfg = PackerConfig::builder().max_width(b.max_width).build();
    let iterations = b.iterations.max(1);
    for p in &paths {
        let name = scene_name(p);
        let container = load_scene(p, &name)?;
        let blocks = blockpack_core::elements_to_blocks(&container.children);
        if blocks.is_empty() {
            continue;
        }
        let start = Instant::now();
        let mut fit = 0.0;
        for _ in 0..iterations {
            fit = blockpack_core::pack_with_config(&blocks, &cfg)
                .with_context(|| format!("pack {}", p.display()))?
                .root
                .fit;
        }
        let dur = start.elapsed() / iterations;
        println!(
            "{} blocks={} fit={:.2}% time={}",
            name,
            blocks.len(),
            fit * 100.0,
            bench_fmt_dur(dur)
        );
    }
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

fn run_gen(g: &GenArgs) -> anyhow::Result<()> {
    use rand::{Rng, SeedableRng, rngs::StdRng};
    if !(g.min_size > 0.0 && g.max_size >= g.min_size) {
        anyhow::bail!("invalid size range {}..={}", g.min_size, g.max_size);
    }
    let mut rng = match g.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let ratio = g.group_ratio.clamp(0.0, 1.0);

    fn gen_elements(
        rng: &mut StdRng,
        count: usize,
        prefix: &str,
        depth: usize,
        g: &GenArgs,
        ratio: f64,
    ) -> Vec<Element> {
        (0..count)
            .map(|i| {
                let id = format!("{}{}", prefix, i);
                if depth < 2 && rng.gen_bool(ratio) {
                    let n = rng.gen_range(2..=6);
                    let children = gen_elements(rng, n, &format!("{}_", id), depth + 1, g, ratio);
                    Element::group(id, rng.gen_bool(0.5), children)
                } else {
                    let w = rng.gen_range(g.min_size..=g.max_size).round();
                    let h = rng.gen_range(g.min_size..=g.max_size).round();
                    Element::content(id, w, h)
                }
            })
            .collect()
    }

    let mut container = Container::new("scene", gen_elements(&mut rng, g.count, "e", 0, g, ratio));
    container.sort = true;
    let text = match g.output.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::to_string(&container)?,
        _ => serde_json::to_string_pretty(&container)?,
    };
    fs::write(&g.output, text).with_context(|| format!("write {}", g.output.display()))?;
    info!(output = ?g.output, count = g.count, "scene generated");
    Ok(())
}

fn scene_name(p: &Path) -> String {
    p.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("scene")
        .to_string()
}

fn load_scene(p: &Path, name: &str) -> anyhow::Result<Container> {
    let text = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let scene: SceneFile = match ext_lower(p).as_deref() {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&text).with_context(|| format!("parse {}", p.display()))?
        }
        _ => serde_json::from_str(&text).with_context(|| format!("parse {}", p.display()))?,
    };
    Ok(scene.into_container(name))
}

fn ext_lower(p: &Path) -> Option<String> {
    p.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
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
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_scene(p) {
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

fn is_scene(p: &Path) -> bool {
    matches!(ext_lower(p).as_deref(), Some("json" | "yaml" | "yml"))
        && !p.to_string_lossy().ends_with(".scene.json")
}

fn progress_bar(len: usize, enabled: bool) -> anyhow::Result<Option<indicatif::ProgressBar>> {
    use indicatif::{ProgressBar, ProgressStyle};
    if !enabled {
        return Ok(None);
    }
    let b = ProgressBar::new(len as u64);
    b.set_style(ProgressStyle::with_template(
        "{spinner:.green} packing {pos}/{len} [{elapsed_precise}] {wide_msg}",
    )?);
    Ok(Some(b))
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

#[derive(Serialize)]
struct TemplateBlock {
    id: String,
    /// Position relative to the enclosing group.
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    abs_x: f64,
    abs_y: f64,
    depth: usize,
    group: bool,
}

#[derive(Serialize)]
struct TemplateContainer {
    id: String,
    w: f64,
    h: f64,
}

#[derive(Serialize)]
struct TemplateContext {
    container: TemplateContainer,
    root: serde_json::Value,
    blocks: Vec<TemplateBlock>,
    meta: serde_json::Value,
}

fn build_template_context(container: &Container, arrangement: &Arrangement) -> TemplateContext {
    let blocks = arrangement
        .flatten()
        .into_iter()
        .map(|fb| TemplateBlock {
            id: fb.id,
            x: fb.local.x,
            y: fb.local.y,
            w: fb.local.w,
            h: fb.local.h,
            abs_x: fb.frame.x,
            abs_y: fb.frame.y,
            depth: fb.depth,
            group: fb.group,
        })
        .collect();
    let root = &arrangement.root;
    TemplateContext {
        container: TemplateContainer {
            id: container.id.clone(),
            w: root.w,
            h: root.h,
        },
        root: serde_json::json!({"w": root.w, "h": root.h, "fit": root.fit}),
        blocks,
        meta: serde_json::json!({
            "app": "blockpack",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    }
}
