use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::{AppError, Result};

/// Cached OAuth credential, stored as pretty-printed JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expiry: DateTime<Utc>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry < now
    }
}

/// Body returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: i64,
}

impl TokenResponse {
    /// Converts the response into a [`Token`] expiring `expires_in` seconds
    /// after `obtained_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Auth`] when `expires_in` does not give a
    /// representable expiry.
    pub fn into_token(self, obtained_at: DateTime<Utc>) -> Result<Token> {
        let expiry = Duration::try_seconds(self.expires_in)
            .and_then(|lifetime| obtained_at.checked_add_signed(lifetime))
            .ok_or_else(|| AppError::Auth(format!("invalid expires_in: {}", self.expires_in)))?;

        Ok(Token {
            access_token: self.access_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
            token_type: self.token_type.unwrap_or_else(default_token_type),
            expiry,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner: PlaylistOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A track from the user's library together with the moment it was liked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub added_at: String,
    pub track: Track,
}

impl SavedTrack {
    pub fn id(&self) -> &str {
        &self.track.id
    }
}

/// Liked tracks of one calendar month, named after the playlist they belong in.
#[derive(Debug, Clone)]
pub struct MonthBucket {
    pub name: String,
    pub tracks: Vec<SavedTrack>,
}

/// Buckets keyed by `(year, month)`, so iteration runs oldest month first.
pub type MonthlyBuckets = BTreeMap<(i32, u32), MonthBucket>;

/// Playlist entry. Local files and unavailable items have no track or no id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<PlaylistItemTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemTrack {
    #[serde(default)]
    pub id: Option<String>,
}

impl PlaylistItem {
    pub fn track_id(&self) -> Option<&str> {
        self.track.as_ref().and_then(|t| t.id.as_deref())
    }
}

/// Offset-paginated response envelope used by the Web API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One page as seen by the paginated fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> From<Paging<T>> for Page<T> {
    fn from(paging: Paging<T>) -> Self {
        Page {
            items: paging.items,
            has_more: paging.next.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksResponse {
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct SyncTableRow {
    pub playlist: String,
    pub status: String,
    pub liked: usize,
    pub added: usize,
}
