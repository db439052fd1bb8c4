use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fit_query::cli::{commands, OutputFormat};
use fit_query::error::format_user_error;
use fit_query::storage::{self, FilterCriteria};
use fit_query::{config, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fit-query")]
#[command(author, version, about = "Import FIT activity files and query them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Database file path (defaults to ~/.fit-query/fit-query.db)
    #[arg(long, global = true, env = "FIT_QUERY_DB")]
    db: Option<PathBuf>,

    /// Log every SQL statement to stderr
    #[arg(long, global = true)]
    show_sql: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import activity files from a directory (recursively)
    Import {
        /// Directory containing .fit files
        workout_dir: PathBuf,
    },
    /// Query imported activities
    Query {
        /// Start date (YYYY-MM-DD), inclusive
        #[arg(long)]
        since: Option<String>,
        /// End date (YYYY-MM-DD), inclusive of the whole day
        #[arg(long)]
        until: Option<String>,
        /// Sport (e.g. running, cycling)
        #[arg(long)]
        sport: Option<String>,
        /// Calendar year
        #[arg(long)]
        year: Option<i32>,
        /// Calendar month (1-12)
        #[arg(long)]
        month: Option<u32>,
        /// Number of activities to show (0 for all)
        #[arg(short, long, default_value = "20")]
        limit: u32,
        /// Show oldest first
        #[arg(short, long)]
        reverse: bool,
        /// Do not append the summary row
        #[arg(long)]
        no_summary: bool,
    },
}

fn init_tracing(show_sql: bool) {
    let default_filter = if show_sql {
        "fit_query=warn,fit_query::storage=debug"
    } else {
        "fit_query=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let db_path = config::resolve_db_path(cli.db)?;
    let store = storage::open_store(&db_path)?;

    match cli.command {
        Commands::Import { workout_dir } => commands::import_files(&store, &workout_dir),
        Commands::Query {
            since,
            until,
            sport,
            year,
            month,
            limit,
            reverse,
            no_summary,
        } => {
            let criteria = FilterCriteria {
                since: since.as_deref().map(commands::parse_date).transpose()?,
                until: until.as_deref().map(commands::parse_date).transpose()?,
                sport,
                year,
                month,
                limit: (limit > 0).then_some(limit),
                reverse,
                summary: !no_summary,
            };
            commands::query(&store, &criteria, cli.format)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.show_sql);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", format_user_error(&e));
        std::process::exit(1);
    }
}
