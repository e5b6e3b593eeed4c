//! cursor-usage: CLI for exploring Cursor usage exports
//!
//! This tool is not affiliated with or endorsed by Anysphere, Inc. (Cursor).
//! It reads CSV files you exported or pulled with your own session.

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use cursor_usage::recent::RecentFiles;
use cursor_usage::session::SessionStore;

mod commands;

use commands::stats::StatsFormat;
use commands::utils::ViewOptions;

#[derive(Parser)]
#[command(name = "cursor-usage")]
#[command(about = "Explore Cursor usage exports and other CSV tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a CSV file as a filtered, sorted table
    View {
        /// CSV file (defaults to the most recently opened file)
        path: Option<PathBuf>,

        #[command(flatten)]
        view: ViewOptions,

        /// Show at most this many rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show cost totals and the per-model breakdown
    Stats {
        /// CSV file (defaults to the most recently opened file)
        path: Option<PathBuf>,

        #[command(flatten)]
        view: ViewOptions,

        /// Output format
        #[arg(long, value_enum, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },

    /// Write the filtered, sorted rows and displayed columns as CSV
    Export {
        /// CSV file to read
        path: PathBuf,

        #[command(flatten)]
        view: ViewOptions,

        /// Output file (prints to stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the distinct values of a column
    Values {
        /// Column name
        column: String,

        /// CSV file (defaults to the most recently opened file)
        path: Option<PathBuf>,

        /// Only list values containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },

    /// Show recently opened files
    Recent {
        /// Forget all recent files
        #[arg(long)]
        clear: bool,
    },

    /// Store the dashboard session cookie used by `pull`
    Login {
        /// Cookie value, or WorkosCursorSessionToken=<value> (prompts if omitted)
        cookie: Option<String>,
    },

    /// Forget the stored session cookie
    Logout,

    /// Show whether a session cookie is stored
    Status,

    /// Download the usage export from the Cursor dashboard
    Pull {
        /// Destination file (defaults to the data directory)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Use this cookie instead of the stored session
        #[arg(long)]
        cookie: Option<String>,

        /// Export URL (also CURSOR_USAGE_EXPORT_URL)
        #[arg(long)]
        url: Option<String>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::View { path, view, limit } => {
            let recent = RecentFiles::open_default()?;
            let output = commands::view::execute(path, &view, limit, &recent)?;
            println!("{}", output);
        }

        Commands::Stats { path, view, format } => {
            let recent = RecentFiles::open_default()?;
            let output = commands::stats::execute(path, &view, format, &recent)?;
            println!("{}", output);
        }

        Commands::Export { path, view, output } => {
            let recent = RecentFiles::open_default()?;
            let count = commands::export::execute(path, &view, output.as_deref(), &recent)?;
            if let Some(out) = output {
                println!("{} {} rows to {}", "Exported:".green(), count, out.display());
            }
        }

        Commands::Values {
            column,
            path,
            search,
        } => {
            let recent = RecentFiles::open_default()?;
            let output = commands::values::execute(path, &column, search.as_deref(), &recent)?;
            println!("{}", output);
        }

        Commands::Recent { clear } => {
            let recent = RecentFiles::open_default()?;
            if clear {
                commands::recent::clear(&recent)?;
                println!("{}", "Recent files cleared.".green());
            } else {
                println!("{}", commands::recent::list(&recent)?);
            }
        }

        Commands::Login { cookie } => {
            commands::login::execute(cookie, &SessionStore::open_default()?)?;
        }

        Commands::Logout => {
            commands::login::logout(&SessionStore::open_default()?)?;
        }

        Commands::Status => {
            println!("{}", commands::login::status(&SessionStore::open_default()?)?);
        }

        Commands::Pull {
            output,
            cookie,
            url,
            timeout,
        } => {
            let options = commands::pull::PullOptions {
                output,
                cookie,
                url,
                timeout,
            };
            let summary = commands::pull::execute(
                &options,
                &SessionStore::open_default()?,
                &RecentFiles::open_default()?,
            )?;
            println!(
                "{} {}",
                "Pulled:".green(),
                commands::pull::format_summary(&summary)
            );
        }
    }

    Ok(())
}
