use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use craft_price_index::domain::Lookup;
use craft_price_index::util::persistence::{load_policy_from, load_saved_policy};
use craft_price_index::workflow::{PriceIndexWorkflow, Workspace};

#[derive(Parser)]
#[command(
    name = "craft_price_index",
    version,
    about = "Mines crafting recipes from game rule data and resolves crafted-item prices."
)]
struct Cli {
    /// Working directory for datasets and tables.
    #[arg(long, global = true, default_value = ".")]
    workspace: PathBuf,

    /// Pricing policy file (JSON). Falls back to the saved user policy,
    /// then to the built-in defaults.
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mine the recipe set out of the spell dataset.
    Extract {
        /// Use a local dataset file instead of downloading the release blob.
        #[arg(long)]
        spell_csv: Option<PathBuf>,
    },
    /// Build the base price table from the item dump and the recipe set.
    BuildTable,
    /// Resolve prices in the seeded table and export the final table.
    Resolve {
        /// Override the policy's relaxation pass cap.
        #[arg(long)]
        max_passes: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut policy = match &cli.policy {
        Some(path) => load_policy_from(path)?,
        None => load_saved_policy().unwrap_or_default(),
    };
    if let Command::Resolve {
        max_passes: Some(cap),
    } = &cli.command
    {
        policy.max_passes = *cap;
    }

    let workflow = PriceIndexWorkflow::new(
        Workspace::new(&cli.workspace),
        policy,
        Lookup::default(),
    );

    match cli.command {
        Command::Extract { spell_csv } => {
            let count = workflow.extract_recipes(spell_csv.as_deref()).await?;
            println!("extracted {count} recipes");
        }
        Command::BuildTable => {
            let table = workflow.build_base_table()?;
            println!(
                "wrote base table with {} rows to {}",
                table.len(),
                workflow.workspace().base_table().display()
            );
        }
        Command::Resolve { .. } => {
            let outcome = workflow.resolve()?;
            println!(
                "resolved {} rows in {} passes; {} still unresolved",
                outcome.resolved, outcome.passes, outcome.unresolved
            );
        }
    }
    Ok(())
}
