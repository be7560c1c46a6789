//! CLI parser and command dispatch.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "callsight")]
#[command(about = "Call center insight ingestion and reporting system")]
#[command(version)]
pub struct Cli {
    /// Database file (overrides the CALLSIGHT_DB environment variable)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema
    Init,

    /// Run the REST API server
    Serve {
        /// Bind address: port, host, or host:port
        #[arg(short, long, default_value = "127.0.0.1:8002")]
        bind: String,
    },

    /// Import artifact files into the database
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Conversation transcripts (.txt) into the call table
    Conversations {
        /// Root directory of date-bucketed transcript files
        dir: PathBuf,
    },

    /// Base analysis results (*_analysis.json)
    BaseResults {
        /// Root directory of date-bucketed analysis artifacts
        dir: PathBuf,
    },

    /// Issue analysis results (*_analysis.json)
    IssueResults {
        /// Root directory of date-bucketed analysis artifacts
        dir: PathBuf,
    },

    /// Organization metadata fill-in pass (*_analysis.json)
    OrgMetadata {
        /// Root directory of date-bucketed analysis artifacts
        dir: PathBuf,
    },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.db.as_ref());

    match cli.command {
        Commands::Init => commands::cmd_init(&settings).await,
        Commands::Serve { bind } => commands::cmd_serve(&settings, &bind).await,
        Commands::Import { command } => match command {
            ImportCommands::Conversations { dir } => {
                commands::cmd_import_conversations(&settings, &dir).await
            }
            ImportCommands::BaseResults { dir } => {
                commands::cmd_import_base_results(&settings, &dir).await
            }
            ImportCommands::IssueResults { dir } => {
                commands::cmd_import_issue_results(&settings, &dir).await
            }
            ImportCommands::OrgMetadata { dir } => {
                commands::cmd_import_org_metadata(&settings, &dir).await
            }
        },
    }
}
