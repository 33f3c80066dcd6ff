use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "letterer", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Letter dialogue onto one panel image.
    Panel(PanelArgs),
    /// Join finished panels into a strip image.
    Strip(StripArgs),
    /// Print the classified regions of a panel as JSON.
    Detect(DetectArgs),
}

#[derive(Parser, Debug)]
struct PanelArgs {
    /// Input panel image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path (format from extension).
    #[arg(long)]
    out: PathBuf,

    /// Element kind.
    #[arg(long, value_enum, default_value_t = KindChoice::Speech)]
    kind: KindChoice,

    /// Anchor zone, e.g. `top-left`, `center`, `bottom-right`.
    #[arg(long, default_value = "center")]
    anchor: String,

    /// Text to letter. Ignored when `--requests` is given.
    #[arg(long, default_value = "")]
    text: String,

    /// Speaker name drawn above speech/thought text.
    #[arg(long)]
    speaker: Option<String>,

    /// Maximum character count before the text is cut.
    #[arg(long)]
    max_chars: Option<usize>,

    /// JSON array of element requests to letter in order.
    #[arg(long)]
    requests: Option<PathBuf>,

    /// Font file. Defaults to an installed sans-serif face.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct StripArgs {
    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Panels per row. Defaults to the config value.
    #[arg(long)]
    columns: Option<u32>,

    /// Config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Panel images in reading order.
    #[arg(required = true)]
    panels: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct DetectArgs {
    /// Input panel image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindChoice {
    Speech,
    Thought,
    Narration,
}

impl From<KindChoice> for letterer::ElementKind {
    fn from(k: KindChoice) -> Self {
        match k {
            KindChoice::Speech => letterer::ElementKind::Speech,
            KindChoice::Thought => letterer::ElementKind::Thought,
            KindChoice::Narration => letterer::ElementKind::Narration,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Panel(args) => cmd_panel(args),
        Command::Strip(args) => cmd_strip(args),
        Command::Detect(args) => cmd_detect(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<letterer::LettererConfig> {
    match path {
        Some(p) => Ok(letterer::LettererConfig::from_json_path(p)?),
        None => Ok(letterer::LettererConfig::default()),
    }
}

fn read_raster(path: &Path) -> anyhow::Result<letterer::Raster> {
    let img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(letterer::Raster::from_dynamic(&img)?)
}

fn write_raster(raster: &letterer::Raster, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    raster
        .to_dynamic()?
        .save(path)
        .with_context(|| format!("write image '{}'", path.display()))?;
    Ok(())
}

fn load_font(path: Option<&Path>) -> anyhow::Result<letterer::FontAsset> {
    match path {
        Some(p) => Ok(letterer::FontAsset::from_path(p)?),
        None => letterer::FontAsset::from_system()
            .context("no --font given and no system sans-serif font found"),
    }
}

fn read_requests(args: &PanelArgs) -> anyhow::Result<Vec<letterer::ElementRequest>> {
    if let Some(path) = &args.requests {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read requests '{}'", path.display()))?;
        let requests: Vec<letterer::ElementRequest> =
            serde_json::from_str(&s).with_context(|| "parse requests JSON")?;
        return Ok(requests);
    }

    let anchor: letterer::Anchor = args.anchor.parse()?;
    let mut req = letterer::ElementRequest::new(args.kind.into(), anchor, args.text.clone());
    if let Some(n) = args.max_chars {
        req = req.with_max_chars(n);
    }
    if let Some(s) = &args.speaker {
        req = req.with_speaker(s.clone());
    }
    Ok(vec![req])
}

fn cmd_panel(args: PanelArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let font = load_font(args.font.as_deref())?;
    let requests = read_requests(&args)?;
    let image = read_raster(&args.in_path)?;

    let engine = letterer::Letterer::new(config, font)?;
    let rendered = engine.render_elements(&image, &requests)?;
    write_raster(&rendered.image, &args.out)?;

    for (i, o) in rendered.outcomes.iter().enumerate() {
        let flags = match (o.degraded, o.fit.truncated) {
            (true, true) => " (degraded, truncated)",
            (true, false) => " (degraded)",
            (false, true) => " (truncated)",
            (false, false) => "",
        };
        eprintln!(
            "element {i}: {} at {:?} size {}px, {} line(s){flags}",
            o.request.kind.as_str(),
            o.interior,
            o.fit.font_size,
            o.fit.lines.len()
        );
    }
    Ok(())
}

fn cmd_strip(args: StripArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let columns = args.columns.unwrap_or(config.strip.columns);
    let panels = args
        .panels
        .iter()
        .map(|p| read_raster(p))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let strip = letterer::assemble_strip(&panels, columns, &config.strip)?;
    write_raster(&strip, &args.out)
}

fn cmd_detect(args: DetectArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let image = read_raster(&args.in_path)?;
    let engine = letterer::Letterer::new(config, letterer::MonospaceTypesetter::default())?;
    let regions = engine.detect(&image);
    println!(
        "{}",
        serde_json::to_string_pretty(&regions).with_context(|| "serialize regions")?
    );
    Ok(())
}
