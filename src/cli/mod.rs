//! # CLI Module
//!
//! User-facing commands. Each returns an [`crate::error::Result`]; turning an
//! error into a message and a non-zero exit code is left to `main`.
//!
//! - [`sync`] - log in if needed, then create or complete one playlist per
//!   month of liked songs and print a summary table
//! - [`auth`] - force a fresh browser login and store the new token
//!
//! ```bash
//! monthlify                 # same as `monthlify sync`
//! monthlify sync --dry-run  # show what would change
//! monthlify auth            # log in again
//! ```

mod auth;
mod sync;

pub use auth::auth;
pub use sync::sync;
