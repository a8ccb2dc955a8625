use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fintrack::cli::{AddArgs, BudgetsCommand, GoalsCommand, RangeArgs, RatesCommand};
use fintrack::core::log::init_logging;

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

impl From<Commands> for fintrack::AppCommand {
    fn from(cmd: Commands) -> fintrack::AppCommand {
        match cmd {
            Commands::Add(args) => fintrack::AppCommand::Add(args),
            Commands::List(range) => fintrack::AppCommand::List(range),
            Commands::Remove { id } => fintrack::AppCommand::Remove { id },
            Commands::Summary { range, currency } => {
                fintrack::AppCommand::Summary { range, currency }
            }
            Commands::Convert { amount, from, to } => {
                fintrack::AppCommand::Convert { amount, from, to }
            }
            Commands::Rates { command } => fintrack::AppCommand::Rates(command),
            Commands::Base { code } => fintrack::AppCommand::Base { code },
            Commands::Goals { command } => fintrack::AppCommand::Goals(command),
            Commands::Budgets { command } => fintrack::AppCommand::Budgets(command),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record a transaction
    Add(AddArgs),
    /// List transactions
    List(RangeArgs),
    /// Delete a transaction by id
    Remove { id: String },
    /// Show income, expense and savings totals
    Summary {
        #[command(flatten)]
        range: RangeArgs,
        /// Only show native totals for this currency
        #[arg(long)]
        currency: Option<String>,
    },
    /// Convert an amount between currencies
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    /// Manage exchange rates
    Rates {
        #[command(subcommand)]
        command: RatesCommand,
    },
    /// Change the base currency and restate stored transactions
    Base { code: String },
    /// Manage savings goals
    Goals {
        #[command(subcommand)]
        command: GoalsCommand,
    },
    /// Manage monthly budgets
    Budgets {
        #[command(subcommand)]
        command: BudgetsCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fintrack::cli::setup::setup_at_path(path),
            None => fintrack::cli::setup::setup(),
        },
        Some(cmd) => fintrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
