use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use snapframe::{
    AutoPlacement, CaptionClientOpts, CaptionResponse, CaptionService, DEFAULT_PREVIEW_SIZE,
    EditorSession, ExportOpts, ExportRenderer, HealthResponse, HttpCaptionClient, ImageSource,
    InMemoryStore, JsonFileStore, MediaStore, SnapError, SnapResult, SurfaceOpts, Viewport,
    generate_filter_previews, ingest, library_sticker, list_filters,
};

#[derive(Parser, Debug)]
#[command(name = "snapframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the filter catalog.
    Filters,
    /// Write one thumbnail PNG per filter.
    Previews(PreviewsArgs),
    /// Load an image, filter and decorate it, export a PNG at 2x.
    Compose(ComposeArgs),
    /// Caption an image with the caption service.
    Caption(CaptionArgs),
    /// Probe the caption service.
    Health,
}

#[derive(Parser, Debug)]
struct PreviewsArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Thumbnail edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_SIZE)]
    size: u32,

    /// Output directory (one `<filter>.png` per catalog entry).
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Filter id (see `snapframe filters`).
    #[arg(long)]
    filter: Option<String>,

    /// On-screen viewport as `WIDTHxHEIGHT`.
    #[arg(long, default_value = "800x600", value_parser = parse_viewport)]
    viewport: Viewport,

    /// Decoration suggestion (repeatable).
    #[arg(long = "emoji")]
    emojis: Vec<String>,

    /// Library sticker id or sticker image path (repeatable).
    #[arg(long = "sticker")]
    stickers: Vec<String>,

    /// Text overlay (repeatable).
    #[arg(long = "text")]
    texts: Vec<String>,

    /// Font (TTF/OTF) preferred over system fonts for emoji and text overlays.
    #[arg(long)]
    font: Option<PathBuf>,

    /// JSON media store; records persist across runs.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Ask the caption service for a caption and suggestions.
    #[arg(long, default_value_t = false)]
    caption: bool,

    /// Re-run auto-placement even if the record was decorated before.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// JSON options file (`surface`, `export`, `caption` sections).
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CaptionArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Extra context passed to the service.
    #[arg(long)]
    context: Option<String>,

    /// JSON media store to ingest the image into.
    #[arg(long)]
    store: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CliOpts {
    surface: SurfaceOpts,
    export: ExportOpts,
    caption: Option<CaptionClientOpts>,
}

impl CliOpts {
    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read options '{}'", path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse options '{}'", path.display()))
    }

    fn caption_opts(&self) -> CaptionClientOpts {
        self.caption.clone().unwrap_or_else(CaptionClientOpts::from_env)
    }
}

/// Caption collaborator chosen at startup: the HTTP service or none at all.
enum Captions {
    Http(HttpCaptionClient),
    Offline,
}

impl CaptionService for Captions {
    fn generate_caption(
        &self,
        source: &ImageSource,
        context: Option<&str>,
    ) -> SnapResult<CaptionResponse> {
        match self {
            Self::Http(c) => c.generate_caption(source, context),
            Self::Offline => Err(SnapError::collaborator("caption service disabled")),
        }
    }

    fn health(&self) -> SnapResult<HealthResponse> {
        match self {
            Self::Http(c) => c.health(),
            Self::Offline => Err(SnapError::collaborator("caption service disabled")),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Filters => cmd_filters(),
        Command::Previews(args) => cmd_previews(args),
        Command::Compose(args) => cmd_compose(args),
        Command::Caption(args) => cmd_caption(args),
        Command::Health => cmd_health(),
    }
}

fn parse_viewport(s: &str) -> Result<Viewport, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got \"{s}\""))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    let vp = Viewport::new(w, h);
    if vp.is_degenerate() {
        return Err("viewport must be non-zero".to_string());
    }
    Ok(vp)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_filters() -> anyhow::Result<()> {
    for f in list_filters() {
        println!("{:<10} {:<10} {}", f.id, f.name, f.description);
    }
    Ok(())
}

fn cmd_previews(args: PreviewsArgs) -> anyhow::Result<()> {
    let source = ImageSource::from_path(&args.in_path)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for preview in generate_filter_previews(&source, args.size) {
        let path = args.out_dir.join(format!("{}.png", preview.filter_id));
        std::fs::write(&path, preview.thumbnail.to_png()?)
            .with_context(|| format!("write png '{}'", path.display()))?;
        if preview.placeholder {
            eprintln!("{}: placeholder (preview failed)", preview.filter_id);
        }
    }
    eprintln!("wrote {}", args.out_dir.display());
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let opts = CliOpts::load(args.opts.as_deref())?;
    match args.store.clone() {
        Some(path) => compose_with(JsonFileStore::open(path)?, args, opts),
        None => compose_with(InMemoryStore::new(), args, opts),
    }
}

fn compose_with<S: MediaStore>(store: S, args: ComposeArgs, opts: CliOpts) -> anyhow::Result<()> {
    let captions = if args.caption {
        Captions::Http(HttpCaptionClient::new(&opts.caption_opts()))
    } else {
        Captions::Offline
    };
    let mut renderer = ExportRenderer::new(opts.export);
    if let Some(font) = &args.font {
        let bytes =
            std::fs::read(font).with_context(|| format!("read font '{}'", font.display()))?;
        renderer = renderer.with_font(bytes)?;
    }
    let mut session = EditorSession::new(args.viewport, opts.surface, store, captions, renderer);

    let source = ImageSource::from_path(&args.in_path)?;
    let ingested = session.open_source(&source, now_ms())?;
    if args.caption
        && let Some(err) = &ingested.caption_error
    {
        eprintln!("caption failed: {err}");
    }
    if !args.emojis.is_empty() {
        session.add_suggestions(&args.emojis)?;
    }
    if let Some(filter) = &args.filter {
        session.select_filter(filter)?;
    }

    match session.auto_decorate(args.force, Instant::now())? {
        AutoPlacement::Placed(n) => eprintln!("placed {n} decorations"),
        AutoPlacement::AlreadyPlaced => eprintln!("decorations already placed (use --force)"),
        AutoPlacement::NoCandidates => eprintln!("no decoration candidates"),
        AutoPlacement::Deferred | AutoPlacement::GaveUp => {
            eprintln!("image too small on screen for decorations")
        }
    }

    for sticker in &args.stickers {
        if library_sticker(sticker).is_some() {
            session.add_library_sticker(sticker)?;
        } else {
            let path = Path::new(sticker);
            let bytes = std::fs::read(path)
                .with_context(|| format!("unknown sticker id or unreadable file '{sticker}'"))?;
            let name = path
                .file_name()
                .map_or_else(|| sticker.clone(), |n| n.to_string_lossy().into_owned());
            session.add_sticker_bytes(&name, &bytes)?;
        }
    }
    for text in &args.texts {
        session.add_text(text, 40.0, [255, 255, 255, 255])?;
    }
    session.surface_mut().deselect();

    let png = session.export_png()?;
    ensure_parent(&args.out)?;
    std::fs::write(&args.out, png).with_context(|| format!("write png '{}'", args.out.display()))?;
    session.close();

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_caption(args: CaptionArgs) -> anyhow::Result<()> {
    let client = HttpCaptionClient::new(&CaptionClientOpts::from_env());
    let source = ImageSource::from_path(&args.in_path)?;
    match args.store {
        Some(path) => {
            let mut store = JsonFileStore::open(path)?;
            let ingested = ingest(
                &source,
                &client,
                &mut store,
                args.context.as_deref(),
                now_ms(),
            )?;
            if let Some(err) = &ingested.caption_error {
                anyhow::bail!("caption failed: {err}");
            }
            println!("{}", serde_json::to_string_pretty(&ingested.record)?);
        }
        None => {
            let resp = client.generate_caption(&source, args.context.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
    }
    Ok(())
}

fn cmd_health() -> anyhow::Result<()> {
    let client = HttpCaptionClient::new(&CaptionClientOpts::from_env());
    let health = client.health()?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}
