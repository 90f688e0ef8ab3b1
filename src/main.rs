use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use swapfx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for swapfx::AppCommand {
    fn from(cmd: Commands) -> swapfx::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => {
                swapfx::AppCommand::Convert { amount, from, to }
            }
            Commands::Rates { base } => swapfx::AppCommand::Rates { base },
            Commands::List { search } => swapfx::AppCommand::List { search },
            Commands::Exchange {
                amount,
                from,
                to,
                swap,
            } => swapfx::AppCommand::Exchange {
                amount,
                from,
                to,
                swap,
            },
            Commands::Session => swapfx::AppCommand::Session,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount right away
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    /// Show every rate for one currency
    Rates {
        #[arg(default_value = "USD")]
        base: String,
    },
    /// List selectable currencies
    List {
        /// Case-insensitive filter on the currency code
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Run one exchange through the form, with simulated latency
    Exchange {
        amount: String,
        #[arg(short, long)]
        from: Option<String>,
        #[arg(short, long)]
        to: Option<String>,
        /// Swap the currencies before exchanging
        #[arg(short, long)]
        swap: bool,
    },
    /// Drive the swap form interactively from stdin
    Session,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => swapfx::cli::setup::setup(),
        Some(cmd) => swapfx::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
