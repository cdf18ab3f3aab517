//! lastospot library
//!
//! Syncs a Last.fm user's top tracks of the last month into a Spotify
//! playlist. The run is a straight pipeline: authorize against Spotify with a
//! one-shot local redirect catcher, fetch the Last.fm chart, resolve every
//! track through Spotify search and rewrite the managed playlist in rank
//! order.
//!
//! # Modules
//!
//! - `api` - HTTP handler of the local redirect catcher
//! - `cli` - the end-to-end sync run and its narration
//! - `config` - environment configuration and fixed constants
//! - `lastfm` - Last.fm chart retrieval
//! - `management` - track resolution and playlist reconciliation
//! - `server` - the one-shot redirect catcher
//! - `spotify` - Spotify Web API calls
//! - `types` - data structures and wire types
//!
//! # Example
//!
//! ```
//! use lastospot::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> lastospot::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     // Run cli::sync with the config...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod lastfm;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;

/// Exit status after the operator declined clearing or interrupted the run.
pub const EXIT_ABORTED: i32 = 0;

/// Exit status for missing configuration, denied authorization and failures.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status of a run that wrote the playlist.
pub const EXIT_COMPLETED: i32 = 9;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Example
///
/// ```
/// use lastospot::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Narrates a stage boundary with a blue bullet.
///
/// ```
/// info!("Getting tracks from previous month...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Reports a completed step with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a fatal error with a red exclamation mark and exits with
/// [`EXIT_FAILURE`].
///
/// Only for the binary's top level; library code returns errors instead.
///
/// ```
/// error!("Missing env parameter: {}", names);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit($crate::EXIT_FAILURE);
  })
}

/// Highlights a recoverable issue or a notice with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
