use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use habitual_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "habitual", version, about = "Habitual habit tracker CLI")]
struct Cli {
    /// Owner key (defaults to owner.default_owner from config)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Record a completion, optionally with a value
    Complete {
        /// Habit key
        key: String,
        /// Value for countable or limit habits
        #[arg(long, allow_negative_numbers = true)]
        value: Option<i64>,
        /// Date the completion belongs to (defaults to now)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Check or uncheck a binary habit for today
    Toggle {
        /// Habit key
        key: String,
    },
    /// Current streak of one habit
    Streak {
        /// Habit key
        key: String,
    },
    /// Tracked habits due today
    Today,
    /// Streaks for every habit
    Report {
        /// Include untracked habits
        #[arg(long)]
        all: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_tracing(verbose: u8, configured: Option<&str>) {
    let level = match verbose {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(level),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Config { action } => {
            init_tracing(cli.verbose, None);
            commands::config::run(action)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "habitual", &mut std::io::stdout());
            Ok(())
        }
        command => {
            let config = Config::load()?;
            init_tracing(cli.verbose, Some(&config.log.level));
            let ctx = Context::new(config, cli.owner, cli.today)?;
            tracing::debug!(owner = %ctx.owner, today = %ctx.today(), "context ready");

            match command {
                Commands::Habit { action } => commands::habit::run(action, &ctx),
                Commands::Complete { key, value, on } => {
                    commands::complete::record(&ctx, &key, value, on)
                }
                Commands::Toggle { key } => commands::complete::toggle(&ctx, &key),
                Commands::Streak { key } => commands::streak::streak(&ctx, &key),
                Commands::Today => commands::streak::today(&ctx),
                Commands::Report { all } => commands::streak::report(&ctx, all),
                Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
