use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fieldcast", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one record as a PNG.
    Frame(FrameArgs),
    /// Render every record into a directory of PNGs (`001.png`, `002.png`, ...).
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Project JSON (columns, records, fieldPositions, fieldStyles).
    #[arg(long)]
    project: PathBuf,

    /// Background image (PNG, JPEG, ...).
    #[arg(long)]
    background: PathBuf,

    /// Font file to register; repeatable. The first family registered is the fallback.
    #[arg(long = "font", required = true)]
    fonts: Vec<PathBuf>,

    /// Output width; defaults to the background's width.
    #[arg(long)]
    width: Option<u32>,

    /// Output height; defaults to the background's height.
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Record index (0-based).
    #[arg(long, default_value_t = 0)]
    record: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct BatchArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Render records in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads when parallel.
    #[arg(long)]
    threads: Option<usize>,
}

struct Loaded {
    project: fieldcast::Project,
    background: Arc<fieldcast::BackgroundImage>,
    fonts: fieldcast::FontBook,
    surface: fieldcast::Surface,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn load(args: &CommonArgs) -> anyhow::Result<Loaded> {
    let json = std::fs::read_to_string(&args.project)
        .with_context(|| format!("read project '{}'", args.project.display()))?;
    let project = fieldcast::Project::from_json(&json)
        .with_context(|| format!("parse project '{}'", args.project.display()))?;

    let bytes = std::fs::read(&args.background)
        .with_context(|| format!("read background '{}'", args.background.display()))?;
    let background = fieldcast::decode_background(&bytes)?;

    let mut fonts = fieldcast::FontBook::new();
    for path in &args.fonts {
        let families = register_font(&mut fonts, path)?;
        if fonts.library().fallback_family().is_none() {
            fonts.set_fallback_family(families.into_iter().next());
        }
    }

    let surface = fieldcast::Surface::new(
        args.width.unwrap_or(background.width),
        args.height.unwrap_or(background.height),
    );
    Ok(Loaded {
        project,
        background: Arc::new(background),
        fonts,
        surface,
    })
}

fn register_font(fonts: &mut fieldcast::FontBook, path: &Path) -> anyhow::Result<Vec<String>> {
    let bytes = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
    let families = fonts
        .register_font(bytes)
        .with_context(|| format!("register font '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), ?families, "font registered");
    Ok(families)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut loaded = load(&args.common)?;
    let record = loaded
        .project
        .records
        .get(args.record)
        .with_context(|| {
            format!(
                "record {} out of range ({} records)",
                args.record,
                loaded.project.records.len()
            )
        })?;

    let frame = fieldcast::render_record(
        &loaded.background,
        loaded.surface,
        &loaded.project.template,
        record,
        &mut loaded.fonts,
    )?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .to_rgba_image()?
        .save(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let mut loaded = load(&args.common)?;
    let records = std::mem::take(&mut loaded.project.records);
    let total = records.len();
    let job = fieldcast::BatchJob::new(
        loaded.project.template.snapshot(),
        records,
        loaded.surface,
        Arc::new(fieldcast::SharedBackground(loaded.background)),
    );
    let opts = fieldcast::BatchOpts {
        parallel: args.parallel,
        threads: args.threads,
        ..fieldcast::BatchOpts::default()
    };

    let mut sink = fieldcast::PngDirSink::new(&args.out_dir, total)?;
    let report = fieldcast::run_batch(
        &job,
        &mut loaded.fonts,
        &opts,
        &fieldcast::CancelToken::new(),
        &mut sink,
    )?;

    for (index, status) in report.statuses.iter().enumerate() {
        if let fieldcast::RecordStatus::Failed(msg) = status {
            eprintln!("record {}: {msg}", index + 1);
        }
    }
    eprintln!(
        "wrote {} of {} records to {}",
        report.rendered(),
        report.requested,
        args.out_dir.display()
    );
    Ok(())
}
