//! Porkbun solver CLI
//!
//! Runs a single Present or CleanUp call for a challenge request document.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ChallengeAction, ChallengeCommand, SolverArgs};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "PORKBUN_SOLVER_LOG_LEVEL",
        global = true
    )]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "PORKBUN_SOLVER_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(flatten)]
    solver: SolverArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the challenge TXT record if it is not there yet
    Present(ChallengeCommand),
    /// Remove the challenge TXT record if it is there
    Cleanup(ChallengeCommand),
    /// Print the solver name
    Name,
}

fn init_tracing(log_level: &str, log_format: &str) -> anyhow::Result<()> {
    // If RUST_LOG is set, use it as-is; otherwise our crates at the requested
    // level and HTTP internals at warn
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()?
    } else {
        tracing_subscriber::EnvFilter::new(format!(
            "porkbun_solver={level},\
             porkbun_solver_cli={level},\
             hyper=warn,\
             reqwest=warn,\
             rustls=warn",
            level = log_level
        ))
    };

    let fmt_layer = match log_format {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, &cli.log_format)?;

    match cli.command {
        Commands::Present(cmd) => cmd.execute(cli.solver.settings(), ChallengeAction::Present),
        Commands::Cleanup(cmd) => cmd.execute(cli.solver.settings(), ChallengeAction::CleanUp),
        Commands::Name => {
            println!("{}", porkbun_solver::SOLVER_NAME);
            Ok(())
        }
    }
}
