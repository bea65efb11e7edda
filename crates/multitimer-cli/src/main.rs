use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "multitimer-cli", version, about = "Multitimer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stored timer sequence management
    Sequence {
        #[command(subcommand)]
        action: commands::sequence::SequenceAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run the stored sequence in the foreground
    Run {
        /// Start over from the first timer after the last one expires
        #[arg(long)]
        restart_on_loop: bool,
        /// Override the tick interval in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("MULTITIMER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sequence { action } => commands::sequence::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Run {
            restart_on_loop,
            tick_ms,
        } => commands::run::run(restart_on_loop, tick_ms),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
