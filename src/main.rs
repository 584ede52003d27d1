use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use custos::commands::{
    cmd_apply, cmd_delete, cmd_init, cmd_ls, cmd_reconcile, cmd_watch,
};

#[derive(Parser)]
#[command(name = "custos")]
#[command(about = "Declarative GitHub issue reconciler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the initial configuration for a repository
    Init {
        /// Repository owner (user or organization)
        owner: String,

        /// Repository name
        repo: String,
    },

    /// Create or update a desired issue record
    Apply {
        /// Record name (identity key in the store)
        name: String,

        /// Issue title (defaults to the record name, immutable once set)
        #[arg(short, long)]
        title: Option<String>,

        /// Issue body text
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Mark a record for deletion; the remote issue is closed on the next pass
    Delete {
        /// Record name
        name: String,
    },

    /// List records with their last observed remote state
    Ls,

    /// Run one reconcile pass
    Reconcile {
        /// Record name (reconciles everything when omitted)
        name: Option<String>,
    },

    /// Watch the record directory and reconcile on change
    Watch {
        /// Full resync interval in seconds
        #[arg(long, default_value = "300")]
        resync: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("custos=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { owner, repo } => cmd_init(&owner, &repo),
        Commands::Apply {
            name,
            title,
            description,
        } => cmd_apply(&name, title.as_deref(), &description),
        Commands::Delete { name } => cmd_delete(&name),
        Commands::Ls => cmd_ls().await,
        Commands::Reconcile { name } => cmd_reconcile(name.as_deref()).await,
        Commands::Watch { resync } => cmd_watch(resync).await,
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
