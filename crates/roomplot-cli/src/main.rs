//! `roomplot`: render scene diagrams, single rooms or single entities.

mod raster;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use miette::{IntoDiagnostic, miette};
use roomplot::{Config, Episode, FsIconSource, IconSource, NoIcons, RunDocument, SceneSpec};

#[derive(Parser)]
#[command(name = "roomplot")]
#[command(about = "Render household scene diagrams", long_about = None)]
struct Cli {
    /// JSON config overrides, merged over the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory icon paths are resolved against
    #[arg(long, global = true)]
    icons: Option<PathBuf>,

    /// Output file; a `.png` extension rasterizes the diagram
    #[arg(short, long, global = true, default_value = "out.svg")]
    output: PathBuf,

    /// Pixel width of PNG output
    #[arg(long, global = true, default_value_t = 2000)]
    png_width: u32,

    #[command(subcommand)]
    command: Command,
}

/// Where the scene comes from: a scene document, or an episode and run pair.
#[derive(Args)]
struct SceneSource {
    /// Scene document
    #[arg(long, conflicts_with_all = ["episode", "run"])]
    scene: Option<PathBuf>,

    /// Episode document
    #[arg(long, requires_all = ["run", "episode_id"])]
    episode: Option<PathBuf>,

    /// Run document holding the episode's propositions and constraints
    #[arg(long, requires = "episode")]
    run: Option<PathBuf>,

    /// Episode to pick from the run document
    #[arg(long)]
    episode_id: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Render a full scene with its propositions
    Scene {
        #[command(flatten)]
        source: SceneSource,

        /// Do not draw the instruction banner
        #[arg(long)]
        hide_instruction: bool,
    },
    /// Render a single room
    Room {
        #[command(flatten)]
        source: SceneSource,

        /// Room id, e.g. `kitchen_0`
        room: String,
    },
    /// Render a single object
    Object {
        id: String,

        /// Icon path, relative to --icons
        #[arg(long)]
        icon: Option<String>,
    },
    /// Render a single receptacle
    Receptacle {
        id: String,

        /// Icon path, relative to --icons
        #[arg(long)]
        icon: Option<String>,

        /// Draw both placeholders
        #[arg(long)]
        placeholders: bool,
    },
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    let icons: Box<dyn IconSource> = match &cli.icons {
        Some(root) => Box::new(FsIconSource::new(root)),
        None => Box::new(NoIcons),
    };

    let svg = match cli.command {
        Command::Scene {
            source,
            hide_instruction,
        } => {
            let spec = load_spec(&source)?;
            let out = roomplot::render_scene(&spec, &config, icons.as_ref(), hide_instruction)?;
            tracing::info!(
                width = out.width,
                height = out.height,
                instruction_lines = out.instruction_lines,
                "scene rendered"
            );
            out.svg
        }
        Command::Room { source, room } => {
            let spec = load_spec(&source)?;
            roomplot::render_room(&spec, &room, &config, icons.as_ref())?
        }
        Command::Object { id, icon } => {
            roomplot::render_object(&id, &config, icons.as_ref(), &icon_map(&id, icon))?
        }
        Command::Receptacle {
            id,
            icon,
            placeholders,
        } => roomplot::render_receptacle(&id, &config, icons.as_ref(), &icon_map(&id, icon), placeholders)?,
    };

    write_output(&cli.output, &svg, cli.png_width)
}

fn load_spec(source: &SceneSource) -> miette::Result<SceneSpec> {
    match (&source.scene, &source.episode, &source.run) {
        (Some(scene), _, _) => Ok(SceneSpec::from_path(scene)?),
        (None, Some(episode), Some(run)) => {
            let episode_id = source
                .episode_id
                .as_deref()
                .ok_or_else(|| miette!("--episode needs --episode-id"))?;
            let episode = Episode::from_path(episode)?;
            let runs = RunDocument::from_path(run)?;
            Ok(SceneSpec::from_episode(&episode, runs.episode(episode_id)?)?)
        }
        _ => Err(miette!("give either --scene, or --episode with --run and --episode-id")),
    }
}

fn icon_map(id: &str, icon: Option<String>) -> IndexMap<String, String> {
    icon.into_iter().map(|path| (id.to_string(), path)).collect()
}

fn write_output(path: &Path, svg: &str, png_width: u32) -> miette::Result<()> {
    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        let png = raster::svg_to_png(svg, png_width)?;
        std::fs::write(path, png).into_diagnostic()?;
    } else {
        std::fs::write(path, svg).into_diagnostic()?;
    }
    tracing::info!(path = %path.display(), "written");
    Ok(())
}
