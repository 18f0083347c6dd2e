//! # API Module
//!
//! HTTP endpoints of the local OAuth callback server.
//!
//! - [`callback`] - receives Spotify's redirect after the user granted
//!   access, checks the `state` value, exchanges the authorization code for a
//!   token, stores it and signals the waiting login flow.
//!
//! Responses are plain text:
//!
//! | Outcome                    | Status |
//! |----------------------------|--------|
//! | Login completed            | 200    |
//! | Code missing or exchange failed | 403 |
//! | `state` mismatch           | 404    |
//! | Token could not be stored  | 500    |

mod callback;

pub use callback::{CallbackContext, CallbackParams, LOGIN_COMPLETED, callback};
