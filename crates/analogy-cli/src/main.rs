//! analogy CLI — terminal front end for reviewing and taking analogy forms.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use analogy_core::Lang;

mod commands;
mod input;
mod screen;

#[derive(Parser)]
#[command(
    name = "analogy",
    version,
    about = "Verbal-analogy item review and response capture"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the interactive commands.
#[derive(Args, Debug, Clone)]
struct SessionArgs {
    /// Bank file path or http(s) URL (overrides config)
    #[arg(long)]
    bank: Option<String>,

    /// Output directory for exports
    #[arg(long)]
    output: Option<PathBuf>,

    /// Starting language: tr or en
    #[arg(long)]
    lang: Option<Lang>,

    /// Show dev info from the start
    #[arg(long)]
    dev: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the bank and print its summary
    Info {
        /// Bank file path or http(s) URL
        #[arg(long)]
        bank: Option<String>,
    },

    /// Check a bank for problems
    Validate {
        /// Bank file path or http(s) URL
        #[arg(long)]
        bank: Option<String>,
    },

    /// Walk the whole bank in order and record localization edits
    Review {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Take a randomized form with one answer required per item
    Take {
        #[command(flatten)]
        session: SessionArgs,

        /// ROTATION items to sample
        #[arg(long)]
        rotation: Option<usize>,

        /// Delay before moving on after an answer (0 disables)
        #[arg(long)]
        auto_advance_ms: Option<u64>,

        /// Seed for a reproducible form
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Score an exported attempt file
    Score {
        /// Attempt JSON written by `review` or `take`
        #[arg(long)]
        attempt: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Also write an HTML review page here
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Create a starter config and sample bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("analogy=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config;

    let result = match cli.command {
        Commands::Info { bank } => commands::info::execute(bank, config_path).await,
        Commands::Validate { bank } => commands::validate::execute(bank, config_path).await,
        Commands::Review { session } => {
            let options = commands::session::SessionOptions::review(
                session.bank,
                session.output,
                session.lang,
                session.dev,
            );
            commands::session::execute(options, config_path).await
        }
        Commands::Take {
            session,
            rotation,
            auto_advance_ms,
            seed,
        } => {
            let options = commands::session::SessionOptions::take(
                session.bank,
                session.output,
                session.lang,
                session.dev,
                rotation,
                auto_advance_ms,
                seed,
            );
            commands::session::execute(options, config_path).await
        }
        Commands::Score {
            attempt,
            format,
            html,
        } => commands::score::execute(attempt, format, html),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
