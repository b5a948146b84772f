//! mdview - a markdown/text viewer with a synchronized in-place editor.
//!
//! # Usage
//!
//! ```bash
//! mdview README.md
//! mdview --no-watch --debounce-ms 200 notes.md
//! mdview render README.md > readme.html
//! ```

use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use mdview::app::App;
use mdview::config::{
    ConfigFlags, RendererMode, Settings, ThemeMode, clear_config_flags, global_config_path,
    load_layered, local_override_path, parse_flag_tokens, save_config_flags,
};
use mdview::coordinator::Coordinator;
use mdview::render::{NativeRenderer, ProcessRenderer, RenderClient, RenderRequest, Renderer};
use mdview::session::{DocumentSession, resolve_file_path};
use mdview::watcher::FileChangeWatcher;
use mdview::{highlight, perf};

/// Quiet window after the last file event before a change is reported.
const WATCH_QUIET_MS: u64 = 100;

/// A markdown/text viewer with a synchronized in-place editor
#[derive(Parser, Debug)]
#[command(name = "mdview", version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// File to view (markdown, text, html or source code)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Do not reload when the file changes on disk
    #[arg(long)]
    no_watch: bool,

    /// Quiet period before the editor preview re-renders
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Rendering backend
    #[arg(long, value_enum)]
    renderer: Option<RendererMode>,

    /// Converter program for the process renderer
    #[arg(long, value_name = "PATH")]
    converter: Option<PathBuf>,

    /// Terminal background the colors should suit
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Enable performance logging
    #[arg(long)]
    perf: bool,

    /// Write render and event debug lines to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert content to an HTML fragment on stdout
    Render(RenderArgs),
    /// Print the CSS for highlighted code blocks
    Stylesheet {
        #[arg(long, value_enum, default_value = "auto")]
        theme: ThemeMode,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// File to render; its extension picks the format
    #[arg(value_name = "FILE", required_unless_present = "stdin")]
    file: Option<PathBuf>,

    /// Read markdown (or code/text with the flags below) from stdin
    #[arg(long, conflicts_with = "file")]
    stdin: bool,

    /// Treat stdin as source code
    #[arg(long, requires = "stdin", conflicts_with = "text")]
    code: bool,

    /// Treat stdin as plain text
    #[arg(long, requires = "stdin")]
    text: bool,

    /// Path used to pick the language for --code
    #[arg(long, value_name = "PATH", requires = "code")]
    path: Option<PathBuf>,
}

fn run_render(args: RenderArgs) -> Result<()> {
    let request = if args.stdin {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        if args.code {
            RenderRequest::Code {
                content,
                source_path: args.path,
            }
        } else if args.text {
            RenderRequest::Text(content)
        } else {
            RenderRequest::Markdown(content)
        }
    } else {
        let file = args.file.context("render needs FILE or --stdin")?;
        RenderRequest::File(file)
    };

    let html = NativeRenderer::new().render(&request)?;
    let mut out = std::io::stdout().lock();
    out.write_all(html.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn run_stylesheet(theme: ThemeMode) -> Result<()> {
    let css = highlight::stylesheet(theme.background()).context("Failed to build stylesheet")?;
    print!("{css}");
    Ok(())
}

fn make_renderer(settings: &Settings) -> Result<Arc<dyn Renderer>> {
    Ok(match settings.renderer {
        RendererMode::Native => Arc::new(NativeRenderer::new()),
        RendererMode::Process => match &settings.converter {
            Some(program) => Arc::new(ProcessRenderer::new(program, Vec::new())),
            None => Arc::new(
                ProcessRenderer::current_exe().context("Cannot locate mdview for rendering")?,
            ),
        },
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Render(args)) => return run_render(args),
        Some(Command::Stylesheet { theme }) => return run_stylesheet(theme),
        None => {}
    }

    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        load_layered(&global_path, &local_path)?
    };
    let settings = Settings::from_flags(&file_flags.union(&cli_flags));
    tracing::debug!(?settings, "effective settings");

    perf::set_enabled(settings.perf);
    let render_debug_log_path = settings
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("MDVIEW_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = ?render_debug_log_path,
            %err,
            "failed to initialize render debug log"
        );
    }

    let session = DocumentSession::init(resolve_file_path(cli.file.as_deref()));
    let watch_target = session
        .file_path()
        .filter(|path| settings.watch && path.exists())
        .map(std::path::Path::to_path_buf);

    let client = RenderClient::threaded(make_renderer(&settings)?);
    let mut coordinator = Coordinator::new(session, client, settings.debounce_ms);
    if let Some(path) = watch_target {
        match FileChangeWatcher::new(&path, WATCH_QUIET_MS) {
            Ok(watcher) => coordinator = coordinator.with_watcher(watcher),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "file watching unavailable");
            }
        }
    }

    let app = App::new(coordinator)
        .with_background(settings.theme.background())
        .with_config_paths(
            Some(global_path),
            local_path.exists().then_some(local_path),
        );

    app.run().context("Application error")
}
