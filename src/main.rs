use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use tableofcomments::config::{self, Config, TomlSettings};
use tableofcomments::host::{Editor, Preselected, TextBuffer};
use tableofcomments::types::detect_lang;
use tableofcomments::{
    format, outline, rpc, scan, Args, CommandTable, Context, Direction, SyncOutcome,
    TableOfComments, TocError,
};

#[derive(Parser)]
#[command(name = "toc", version, about = "Comment-title outlines: list, sync and jump between marked comment titles")]
struct Cli {
    /// Settings file layered over the built-in and project settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override one setting, e.g. `--set toc_level=2`. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    overrides: Vec<String>,

    /// Debug logging on stderr (`TOC_LOG` takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the titles of a file.
    List {
        file: PathBuf,
        /// JSON output with 0-based lines.
        #[arg(long)]
        json: bool,
    },
    /// Rewrite the file's outline block from its titles.
    Sync {
        file: PathBuf,
        /// Write nothing; exit 1 when the outline block is stale.
        #[arg(long)]
        check: bool,
    },
    /// Sync, list the titles, and optionally jump to one.
    Outline {
        file: PathBuf,
        /// Entry to jump to (1-based); prints its location.
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Print the location of the next title above or below a line.
    Jump {
        file: PathBuf,
        /// Cursor line (1-based).
        #[arg(long)]
        line: usize,
        /// Cursor column (1-based).
        #[arg(long, default_value_t = 1)]
        col: usize,
        #[arg(long, conflicts_with = "down", required_unless_present = "down")]
        up: bool,
        #[arg(long)]
        down: bool,
    },
    /// JSON-RPC over stdio for editor integrations.
    Serve,
    /// Print shell completions.
    Completions { shell: Shell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("TOC_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, TocError> {
    match &cli.cmd {
        Cmd::List { file, json } => {
            let settings = load_settings(cli, Some(file.as_path()))?;
            let cfg = Config::resolve(&settings);
            let buf = open(file, &cfg)?;
            let titles = scan::scan(buf.text(), &buf, &cfg)?;
            if *json {
                let out = serde_json::to_string_pretty(&titles).map_err(|e| TocError::InvalidArgument {
                    message: e.to_string(),
                })?;
                println!("{out}");
            } else {
                print!("{}", format::title_list(&titles));
            }
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Sync { file, check } => {
            let settings = load_settings(cli, Some(file.as_path()))?;
            let cfg = Config::resolve(&settings);
            let mut buf = open(file, &cfg)?;
            let state = outline::sync(&mut buf, &cfg)?;
            match state {
                SyncOutcome::Rewritten { .. } if *check => {
                    println!("# {} (outline stale)", file.display());
                    Ok(ExitCode::from(1))
                }
                SyncOutcome::Rewritten { .. } => {
                    println!("{}", format::sync_summary(file, &state));
                    save(file, buf)?;
                    Ok(ExitCode::SUCCESS)
                }
                SyncOutcome::NoBlock | SyncOutcome::Unchanged | SyncOutcome::Skipped => {
                    println!("{}", format::sync_summary(file, &state));
                    Ok(ExitCode::SUCCESS)
                }
            }
        }
        Cmd::Outline { file, pick } => {
            let settings = load_settings(cli, Some(file.as_path()))?;
            let cfg = Config::resolve(&settings);
            let mut buf = open(file, &cfg)?;
            let mut panel = Preselected(pick.and_then(|p| p.checked_sub(1)));
            let outcome = {
                let mut ctx = Context {
                    editor: &mut buf,
                    panel: &mut panel,
                    settings: &settings,
                };
                CommandTable::with_builtins()
                    .run(TableOfComments::NAME, &mut ctx, &Args::outline())
                    .unwrap_or_default()
            };
            print!("{}", format::title_list(&outcome.listed));
            let landed = outcome.jumped.as_ref().and(buf.cursor());
            if buf.edits() > 0 {
                save(file, buf)?;
            }
            if let Some((line, col)) = landed {
                println!("{}", format::location(file, line, col));
            }
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Jump {
            file,
            line,
            col,
            up,
            ..
        } => {
            let settings = load_settings(cli, Some(file.as_path()))?;
            let cfg = Config::resolve(&settings);
            let mut buf = open(file, &cfg)?;
            buf.set_cursor(line.saturating_sub(1), col.saturating_sub(1));
            let direction = if *up { Direction::Up } else { Direction::Down };
            let outcome = {
                let mut panel = Preselected(None);
                let mut ctx = Context {
                    editor: &mut buf,
                    panel: &mut panel,
                    settings: &settings,
                };
                CommandTable::with_builtins()
                    .run(TableOfComments::NAME, &mut ctx, &Args::moving(direction))
                    .unwrap_or_default()
            };
            match outcome.jumped.as_ref().and(buf.cursor()) {
                Some((line, col)) => {
                    println!("{}", format::location(file, line, col));
                    Ok(ExitCode::SUCCESS)
                }
                None => Ok(ExitCode::from(1)),
            }
        }
        Cmd::Serve => {
            let settings = load_settings(cli, None)?;
            rpc::run(settings).map_err(|e| TocError::io("<stdio>", e))?;
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "toc", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Built-in defaults, then the nearest project file, then `--config`, then `--set`.
fn load_settings(cli: &Cli, document: Option<&Path>) -> Result<TomlSettings, TocError> {
    let mut settings = TomlSettings::defaults();

    let dir = match document.and_then(Path::parent) {
        Some(p) if !p.as_os_str().is_empty() => Some(p.to_path_buf()),
        _ => std::env::current_dir().ok(),
    };
    if let Some(local) = dir.as_deref().and_then(config::find_local_settings) {
        tracing::debug!(path = %local.display(), "project settings");
        settings = settings.layer(TomlSettings::load(&local)?);
    }
    if let Some(path) = &cli.config {
        settings = settings.layer(TomlSettings::load(path)?);
    }
    for assignment in &cli.overrides {
        settings.set(assignment)?;
    }
    Ok(settings)
}

fn open(path: &Path, cfg: &Config) -> Result<TextBuffer, TocError> {
    let text = fs::read_to_string(path).map_err(|e| TocError::io(path, e))?;
    Ok(TextBuffer::new(text, detect_lang(path), cfg.syntax_scopes))
}

fn save(path: &Path, buf: TextBuffer) -> Result<(), TocError> {
    fs::write(path, buf.into_text()).map_err(|e| TocError::io(path, e))
}
