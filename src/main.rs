use std::{cell::Cell, time::Duration};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use lastospot::{
    EXIT_ABORTED, EXIT_COMPLETED,
    cli::{self, Stage, SyncOptions, SyncOutcome},
    config::{self, Config},
    error, info,
    spotify::auth::AuthOptions,
    success, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Clear an existing playlist without asking
    #[clap(long, short = 'y')]
    yes: bool,

    /// Print the request line received by the redirect listener
    #[clap(long)]
    log_requests: bool,

    /// Seconds to wait for the authorization redirect
    #[clap(long, default_value_t = 300)]
    timeout: u64,

    /// Pause between two track searches in milliseconds
    #[clap(long, default_value_t = 200)]
    search_delay_ms: u64,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Command::Completions(opt)) = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        warning!("Cannot load .env file. Err: {}", e);
    }
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    let options = SyncOptions {
        assume_yes: cli.yes,
        auth: AuthOptions {
            timeout: Duration::from_secs(cli.timeout),
            log_requests: cli.log_requests,
        },
        search_delay: Duration::from_millis(cli.search_delay_ms),
    };

    let stage = Cell::new(Stage::Authorizing);
    // dropping the unfinished sync closes the redirect listener
    let outcome = tokio::select! {
        outcome = cli::sync(&config, &options, &stage) => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(outcome) = outcome else {
        println!();
        if stage.get() == Stage::WritingPlaylist {
            warning!("Interrupted while writing the playlist; it may be only partially updated.");
        }
        info!("Exiting...");
        std::process::exit(EXIT_ABORTED);
    };

    match outcome {
        Ok(SyncOutcome::Completed { report, .. }) => {
            success!("Done. {} and added in rank order.", report);
            std::process::exit(EXIT_COMPLETED);
        }
        Ok(SyncOutcome::Declined) => {
            info!("Exiting...");
            std::process::exit(EXIT_ABORTED);
        }
        Err(e) => error!("{}", e),
    }
}
