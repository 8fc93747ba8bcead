use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scoremark_core::{
    resolve_color_with, DocumentHandle, FixedRenderer, OverlayConfig, OverlayEngine, OverlayEvent,
    Palette, SurfaceBounds,
};
use scoremark_storage::{MarkupStorage, PieceMarkup};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub mod logging;

/// Letter-size page surface used when replaying without a real renderer
const REPLAY_SURFACE_WIDTH: f32 = 612.0;
const REPLAY_SURFACE_HEIGHT: f32 = 792.0;

#[derive(Debug, Parser)]
#[command(name = "scoremark")]
#[command(about = "Score highlight and annotation CLI")]
pub struct Cli {
    /// Directory holding stored piece markup
    #[arg(long, global = true, env = "SCOREMARK_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply a JSON-lines event script to a piece and save the result.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        #[arg(long)]
        piece: String,
        /// Page count of the score; defaults to the stored count, then 1
        #[arg(long)]
        pages: Option<u32>,
    },
    /// Print per-page markup counts for a piece.
    Info {
        #[arg(long)]
        piece: String,
    },
    /// List stored pieces.
    List,
    /// Print the tag palette with resolved overlay colors.
    Palette,
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    piece: String,
    page_count: u32,
    page: u32,
    events: usize,
    updates: usize,
    highlights: usize,
    annotations: usize,
    path: String,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    piece: String,
    page_count: Option<u32>,
    highlights: usize,
    annotations: usize,
    pages: Vec<PageOutput>,
}

#[derive(Debug, Serialize)]
struct PageOutput {
    page: u32,
    highlights: usize,
    annotations: usize,
}

#[derive(Debug, Serialize)]
struct TagOutput {
    id: String,
    label: String,
    base: String,
    fill: String,
    border: String,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    logging::init(cli.verbose);

    match cli.command {
        Commands::Replay { script, piece, pages } => {
            let storage = open_storage(cli.data_dir.as_deref())?;
            run_replay(&storage, &piece, &script, pages)
        }
        Commands::Info { piece } => {
            let storage = open_storage(cli.data_dir.as_deref())?;
            run_info(&storage, &piece)
        }
        Commands::List => {
            let storage = open_storage(cli.data_dir.as_deref())?;
            print_json(&storage.list_pieces()?)
        }
        Commands::Palette => run_palette(),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_storage(data_dir: Option<&Path>) -> Result<MarkupStorage> {
    match data_dir {
        Some(dir) => Ok(MarkupStorage::with_root(dir)),
        None => MarkupStorage::from_default_project().context("failed to locate data directory"),
    }
}

fn run_replay(
    storage: &MarkupStorage,
    piece: &str,
    script: &Path,
    pages: Option<u32>,
) -> Result<()> {
    let contents = fs::read_to_string(script)
        .with_context(|| format!("failed to read script {}", script.display()))?;

    let stored = storage.load_piece(piece).context("failed to load piece markup")?;
    let page_count = pages.or(stored.page_count).unwrap_or(1);
    if page_count == 0 {
        anyhow::bail!("--pages must be >= 1");
    }

    let config = OverlayConfig::from_env().context("invalid overlay configuration")?;
    let mut engine = OverlayEngine::try_new(Palette::default(), config)?;
    let mut renderer = FixedRenderer::new(
        page_count,
        SurfaceBounds::new(0.0, 0.0, REPLAY_SURFACE_WIDTH, REPLAY_SURFACE_HEIGHT),
    );

    engine.hydrate(stored.markup);
    engine.load_with(&mut renderer, DocumentHandle::new(1)).context("failed to open score")?;

    let mut events = 0;
    let mut updates = 0;
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event: OverlayEvent = serde_json::from_str(line)
            .with_context(|| format!("invalid event on line {}", index + 1))?;
        events += 1;
        if let Some(update) = engine.apply(event) {
            tracing::debug!(reason = ?update.reason, page = update.page, "markup updated");
            updates += 1;
        }
        if !engine.is_interactive() {
            engine.render_with(&mut renderer)?;
        }
    }

    if engine.unmount().is_some() {
        updates += 1;
    }

    let saved = PieceMarkup { page_count: Some(engine.page_count()), markup: engine.markup().clone() };
    let path = storage.save_piece(piece, &saved).context("failed to save piece markup")?;
    tracing::info!(piece, events, updates, "replay finished");

    print_json(&ReplayOutput {
        piece: piece.to_string(),
        page_count: engine.page_count(),
        page: engine.page(),
        events,
        updates,
        highlights: saved.markup.highlight_count(),
        annotations: saved.markup.annotation_count(),
        path: path.display().to_string(),
    })
}

fn run_info(storage: &MarkupStorage, piece: &str) -> Result<()> {
    let stored = storage.load_piece(piece).context("failed to load piece markup")?;
    let markup = &stored.markup;

    let pages = markup
        .pages()
        .into_iter()
        .map(|page| PageOutput {
            page,
            highlights: markup.highlights(page).len(),
            annotations: markup.annotations(page).len(),
        })
        .collect();

    print_json(&InfoOutput {
        piece: piece.to_string(),
        page_count: stored.page_count,
        highlights: markup.highlight_count(),
        annotations: markup.annotation_count(),
        pages,
    })
}

fn run_palette() -> Result<()> {
    let config = OverlayConfig::from_env().context("invalid overlay configuration")?;
    let tags: Vec<TagOutput> = Palette::default()
        .tags()
        .iter()
        .map(|tag| {
            let colors = resolve_color_with(tag.base, config.fill_opacity, config.border_opacity);
            TagOutput {
                id: tag.id.clone(),
                label: tag.label.clone(),
                base: tag.base.to_hex(),
                fill: colors.fill,
                border: colors.border,
            }
        })
        .collect();

    print_json(&tags)
}

fn print_json<T: Serialize>(payload: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(payload)?;
    println!("{json}");
    Ok(())
}
