use anyhow::Result;
use clap::{Parser, Subcommand};
use std::env;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// Hornet logic solver.
///
/// Loads Horn-clause programs and answers queries against them, with host
/// procedures available to programs through the foreign call gateway.
///
/// EXAMPLES:
///     hornet run family.pl -q "parent(X, bob)."     Answer a query
///     hornet run family.pl -q "parent(X, Y)." -n 3  First three answers
///     hornet check family.pl                        Check a program loads
///     hornet repl family.pl                         Interactive queries
///
/// ENVIRONMENT VARIABLES:
///     HORNET_LOG          Log filter (e.g. 'debug', 'hornet_runtime=trace')
///     HORNET_MODE         Execution mode: 'in-process' or 'worker'
///     HORNET_GC           Enable solver garbage collection
///     HORNET_NETWORK      Network access for host procedures: 'allow' or 'deny'
///     HORNET_JSON         Set to '1' for JSON output by default
///     HORNET_NO_HISTORY   Set to '1' to disable REPL history
#[derive(Parser)]
#[command(name = "hornet")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose logging (overridden by HORNET_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a query against a program file
    ///
    /// EXAMPLES:
    ///     hornet run main.pl -q "p(X)."               All answers
    ///     hornet run main.pl -q "p(X)." --limit 1     First answer only
    ///     hornet run main.pl -q "p(X)." --mode worker Solve on a worker thread
    ///     hornet run main.pl -q "p(X)." --json        Answers as JSON
    #[command(visible_alias = "r")]
    Run {
        /// Path to the program file
        file: String,
        /// Query to answer, ending with '.'
        #[arg(long, short = 'q')]
        query: String,
        /// Stop after this many answers
        #[arg(long, short = 'n')]
        limit: Option<usize>,
        /// Execution mode: 'in-process' or 'worker'
        #[arg(long)]
        mode: Option<String>,
        /// Enable solver garbage collection
        #[arg(long)]
        gc: bool,
        /// Allow host procedures to reach the network
        #[arg(long)]
        allow_network: bool,
        /// Output answers in JSON format
        #[arg(long, env = "HORNET_JSON")]
        json: bool,
    },

    /// Check that a program file loads
    #[command(visible_alias = "c")]
    Check {
        /// Path to the program file
        file: String,
        /// Output the result in JSON format
        #[arg(long, env = "HORNET_JSON")]
        json: bool,
    },

    /// Start an interactive query loop
    ///
    /// REPL COMMANDS:
    ///     :help, :h      Show help
    ///     :quit, :q      Exit REPL
    ///     :load <file>   Replace the loaded program
    Repl {
        /// Program to load at startup
        file: Option<String>,
        /// Disable history persistence
        #[arg(long, env = "HORNET_NO_HISTORY")]
        no_history: bool,
    },
}

/// Install the log subscriber; logs go to stderr so stdout stays parseable
fn init_tracing(verbose: bool) {
    let filter = match env::var("HORNET_LOG") {
        Ok(spec) => EnvFilter::new(spec),
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            file,
            query,
            limit,
            mode,
            gc,
            allow_network,
            json,
        } => {
            commands::run::run(commands::run::RunArgs {
                file,
                query,
                limit,
                json,
                overrides: config::Overrides {
                    mode,
                    gc,
                    allow_network,
                },
            })?;
        }
        Commands::Check { file, json } => {
            commands::check::run(&file, json)?;
        }
        Commands::Repl { file, no_history } => {
            let history = config::HistoryConfig::from_env();
            let dir = match &file {
                Some(path) => config::config_dir_for(std::path::Path::new(path))?,
                None => env::current_dir()?,
            };
            let settings = config::RunSettings::load(&dir, &config::Overrides::default())?;
            commands::repl::run(
                file.as_deref(),
                no_history || history.no_history,
                &settings,
                &history,
            )?;
        }
    }

    Ok(())
}
