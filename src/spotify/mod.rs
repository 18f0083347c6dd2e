//! # Spotify Integration Module
//!
//! Everything that talks to Spotify lives here:
//!
//! - [`auth`] - OAuth 2.0 authorization-code flow with a one-shot local
//!   callback server and the code-for-token exchange
//! - [`client`] - a thin `reqwest` client for the Web API endpoints this tool
//!   needs
//!
//! The rest of the crate only sees the [`SpotifyApi`] trait, so the sync logic
//! can run against an in-memory fake in tests.
//!
//! ## API Coverage
//!
//! - `GET /me` - current user
//! - `GET /users/{user_id}/playlists` - user's playlists (offset pagination)
//! - `POST /users/{user_id}/playlists` - create playlist
//! - `GET /playlists/{playlist_id}/tracks` - playlist items (offset pagination)
//! - `POST /playlists/{playlist_id}/tracks` - add tracks
//! - `GET /me/tracks` - liked tracks, newest first (offset pagination)
//! - `POST /api/token` - authorization code exchange

pub mod auth;
pub mod client;

pub use auth::{OAuthFlow, PendingLogin, TokenExchange};
pub use client::SpotifyClient;

use crate::{
    error::Result,
    types::{Page, Playlist, PlaylistItem, SavedTrack, User},
};

/// The subset of the Spotify Web API used by the sync.
///
/// Paginated calls take an `offset`/`limit` pair and report through
/// [`Page::has_more`] whether another page exists.
#[allow(async_fn_in_trait)]
pub trait SpotifyApi {
    /// Profile of the user the token belongs to.
    async fn current_user(&self) -> Result<User>;

    /// One page of the playlists `user_id` owns or follows, in Spotify's
    /// order.
    async fn user_playlists(
        &self,
        user_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Playlist>>;

    /// Creates an empty playlist owned by `user_id`.
    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<Playlist>;

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<PlaylistItem>>;

    /// Appends tracks to the end of a playlist. Callers keep `track_ids` at
    /// or below [`client::MAX_TRACKS_PER_ADD`].
    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;

    /// One page of the user's liked songs, newest first.
    async fn saved_tracks(&self, offset: u32, limit: u32) -> Result<Page<SavedTrack>>;
}
