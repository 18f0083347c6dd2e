//! Monthly Liked Songs for Spotify
//!
//! Logs in with the OAuth authorization-code flow, reads the liked songs of
//! the last months and keeps one playlist per month (`October '22`,
//! `November '22`, ...) filled with the songs liked in that month. Playlists
//! are created when missing; existing ones only ever get tracks added.
//!
//! # Modules
//!
//! - `api` - HTTP endpoint of the local callback server
//! - `cli` - Command implementations
//! - `config` - Environment and constants
//! - `error` - Error type shared by the crate
//! - `management` - Token cache, fetching and playlist reconciliation
//! - `pagination` - Offset pagination helpers
//! - `server` - Local HTTP server for the OAuth callback
//! - `spotify` - Spotify Web API client and login flow
//! - `types` - Data structures
//! - `utils` - Timestamp parsing and monthly grouping

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod pagination;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{AppError, Result};

/// Prints an informational message with a blue bullet point.
///
/// ```
/// info!("Found {} liked songs", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only `main` uses it; everything below returns [`AppError`] instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
