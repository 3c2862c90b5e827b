//! DJ Set Builder Web Library
//!
//! This library implements a small web application for curating a DJ set
//! playlist against the Spotify Web API. A user browses a playlist, marks seed
//! tracks, requests recommendations constrained by audio-attribute ranges, and
//! mutates the playlist through the remote service. All recommendation logic
//! lives on the remote side; this crate owns the session/auth state machine,
//! the API gateway, and the tabulation of raw payloads into ordered tables.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints: OAuth callback, health, and the HTML panels
//! - `config` - Configuration management and environment variables
//! - `controller` - Per-session view state and user-intent dispatch
//! - `error` - Classified error taxonomy for all remote interaction
//! - `filters` - Audio-attribute range filters for recommendation requests
//! - `server` - HTTP server hosting the panels and the OAuth callback
//! - `session` - Sign-in state machine and token lifecycle
//! - `spotify` - Spotify Web API client implementation
//! - `table` - Track record extraction and table building
//! - `types` - Data structures and type definitions

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod filters;
pub mod server;
pub mod session;
pub mod spotify;
pub mod table;
pub mod types;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern for plumbing code that does not
/// need the classified [`error::ApiError`] taxonomy, using a boxed dynamic
/// error trait object with Send + Sync bounds for async contexts.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Used for unrecoverable startup errors only: missing configuration, an
/// unparseable listen address, a failed HTTP client build. Request handling
/// never goes through this macro; request-level failures are reported to the
/// caller as [`error::ApiError`] values instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program
/// termination.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
