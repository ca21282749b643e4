use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use cfund::cli::tier::TierAction;
use cfund::core::log::init_logging;

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

impl From<Commands> for cfund::AppCommand {
    fn from(cmd: Commands) -> cfund::AppCommand {
        match cmd {
            Commands::Price => cfund::AppCommand::Price,
            Commands::Campaigns => cfund::AppCommand::Campaigns,
            Commands::Show { campaign } => cfund::AppCommand::Show { campaign },
            Commands::AddTier {
                campaign,
                name,
                amount,
                dry_run,
            } => cfund::AppCommand::Tier {
                campaign,
                action: TierAction::Add { name, amount },
                dry_run,
            },
            Commands::RemoveTier {
                campaign,
                index,
                dry_run,
            } => cfund::AppCommand::Tier {
                campaign,
                action: TierAction::Remove { index },
                dry_run,
            },
            Commands::Fund {
                campaign,
                index,
                dry_run,
            } => cfund::AppCommand::Tier {
                campaign,
                action: TierAction::Fund { index },
                dry_run,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the current ETH price from the configured feed
    Price,
    /// List all campaigns of the factory with their funding progress
    Campaigns,
    /// Show a campaign with its tiers
    Show {
        /// Campaign contract address
        campaign: String,
    },
    /// Add a tier priced in fiat (owner only)
    AddTier {
        /// Campaign contract address
        campaign: String,
        /// Tier name
        #[arg(long)]
        name: String,
        /// Tier price in the feed currency, e.g. 25.50
        #[arg(long)]
        amount: String,
        /// Print the transaction instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove a tier by index (owner only)
    RemoveTier {
        /// Campaign contract address
        campaign: String,
        #[arg(long)]
        index: usize,
        /// Print the transaction instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Back a tier, sending exactly its amount
    Fund {
        /// Campaign contract address
        campaign: String,
        #[arg(long)]
        index: usize,
        /// Print the transaction instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => cfund::cli::setup::setup_at_path(path),
            None => cfund::cli::setup::setup(),
        },
        Some(cmd) => cfund::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
