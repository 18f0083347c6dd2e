use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config,
    error::{AppError, Result},
    spotify::SpotifyApi,
    types::{
        AddTracksRequest, AddTracksResponse, CreatePlaylistRequest, Page, Paging, Playlist,
        PlaylistItem, SavedTrack, Token, User,
    },
};

/// Spotify rejects add-items requests with more than 100 URIs.
pub const MAX_TRACKS_PER_ADD: usize = 100;

/// Web API client bound to one access token.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: Token,
}

impl SpotifyClient {
    /// Creates a client for the public Web API.
    ///
    /// # Arguments
    ///
    /// * `token` - Credential sent as bearer token with every request
    ///
    /// # Example
    ///
    /// ```
    /// let token = OAuthFlow::new(&config).obtain_credential(&store).await?;
    /// let client = SpotifyClient::new(token);
    /// let me = client.current_user().await?;
    /// ```
    pub fn new(token: Token) -> Self {
        Self::with_api_url(token, config::SPOTIFY_API_URL)
    }

    /// Creates a client against another API base URL. A trailing `/` is
    /// ignored.
    pub fn with_api_url(token: Token, api_url: impl Into<String>) -> Self {
        SpotifyClient {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(&self.token.access_token)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Turns a non-success response into [`AppError::Api`], keeping Spotify's
/// error message when the body carries one.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            json["error"]["message"]
                .as_str()
                .or_else(|| json["error_description"].as_str())
                .or_else(|| json["error"].as_str())
                .map(str::to_string)
        })
        .unwrap_or(body);

    Err(AppError::Api {
        status: status.as_u16(),
        message,
    })
}

impl SpotifyApi for SpotifyClient {
    async fn current_user(&self) -> Result<User> {
        self.send(self.http.get(self.url("/me"))).await
    }

    async fn user_playlists(
        &self,
        user_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Playlist>> {
        let request = self
            .http
            .get(self.url(&format!("/users/{}/playlists", user_id)))
            .query(&[("offset", offset), ("limit", limit)]);
        let paging: Paging<Playlist> = self.send(request).await?;
        Ok(paging.into())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<Playlist> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public,
        };
        let request = self
            .http
            .post(self.url(&format!("/users/{}/playlists", user_id)))
            .json(&body);
        self.send(request).await
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<PlaylistItem>> {
        let request = self
            .http
            .get(self.url(&format!("/playlists/{}/tracks", playlist_id)))
            .query(&[
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("fields", "items(track(id)),next,total".to_string()),
            ]);
        let paging: Paging<PlaylistItem> = self.send(request).await?;
        Ok(paging.into())
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        let body = AddTracksRequest {
            uris: track_ids
                .iter()
                .map(|id| format!("spotify:track:{}", id))
                .collect(),
        };
        let request = self
            .http
            .post(self.url(&format!("/playlists/{}/tracks", playlist_id)))
            .json(&body);
        let response: AddTracksResponse = self.send(request).await?;
        tracing::debug!(
            playlist_id,
            snapshot_id = %response.snapshot_id,
            count = track_ids.len(),
            "added tracks"
        );
        Ok(())
    }

    async fn saved_tracks(&self, offset: u32, limit: u32) -> Result<Page<SavedTrack>> {
        let request = self
            .http
            .get(self.url("/me/tracks"))
            .query(&[("offset", offset), ("limit", limit)]);
        let paging: Paging<SavedTrack> = self.send(request).await?;
        Ok(paging.into())
    }
}
