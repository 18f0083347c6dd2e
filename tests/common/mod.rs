#![allow(dead_code)]

use std::sync::Mutex;

use monthlify::{
    error::{AppError, Result},
    spotify::SpotifyApi,
    types::{
        Page, Playlist, PlaylistItem, PlaylistItemTrack, PlaylistOwner, SavedTrack, Track, User,
    },
};

pub const USER_ID: &str = "listener";

// Helper function to create a liked track
pub fn saved(id: &str, added_at: &str) -> SavedTrack {
    SavedTrack {
        added_at: added_at.to_string(),
        track: Track {
            id: id.to_string(),
            name: format!("Song {}", id),
        },
    }
}

// Helper function to build an `added_at` timestamp at midnight UTC
pub fn ts(year: i32, month: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}T00:00:00Z", year, month, day)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddCall {
    pub playlist_id: String,
    pub track_ids: Vec<String>,
}

#[derive(Default)]
struct FakeState {
    playlists: Vec<(Playlist, Vec<String>)>,
    liked: Vec<SavedTrack>,
    created: Vec<String>,
    adds: Vec<AddCall>,
    saved_tracks_calls: usize,
    fail_create: bool,
}

/// In-memory Spotify account.
#[derive(Default)]
pub struct FakeSpotify {
    state: Mutex<FakeState>,
}

fn page_of<T: Clone>(all: &[T], offset: u32, limit: u32) -> Page<T> {
    let start = (offset as usize).min(all.len());
    let end = (start + limit as usize).min(all.len());
    Page {
        items: all[start..end].to_vec(),
        has_more: end < all.len(),
    }
}

impl FakeSpotify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_liked(self, liked: Vec<SavedTrack>) -> Self {
        self.state.lock().unwrap().liked = liked;
        self
    }

    pub fn with_playlist(self, id: &str, name: &str, track_ids: &[&str]) -> Self {
        self.state.lock().unwrap().playlists.push((
            Playlist {
                id: id.to_string(),
                name: name.to_string(),
                owner: PlaylistOwner {
                    id: USER_ID.to_string(),
                },
            },
            track_ids.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn failing_create(self) -> Self {
        self.state.lock().unwrap().fail_create = true;
        self
    }

    pub fn playlists(&self) -> Vec<Playlist> {
        let state = self.state.lock().unwrap();
        state.playlists.iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn playlist_names(&self) -> Vec<String> {
        self.playlists().into_iter().map(|p| p.name).collect()
    }

    pub fn tracks_of(&self, playlist_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .playlists
            .iter()
            .find(|(p, _)| p.id == playlist_id)
            .map(|(_, tracks)| tracks.clone())
            .unwrap_or_default()
    }

    pub fn tracks_named(&self, name: &str) -> Vec<String> {
        let id = self
            .playlists()
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
            .unwrap_or_default();
        self.tracks_of(&id)
    }

    pub fn created(&self) -> Vec<String> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn adds(&self) -> Vec<AddCall> {
        self.state.lock().unwrap().adds.clone()
    }

    pub fn saved_tracks_calls(&self) -> usize {
        self.state.lock().unwrap().saved_tracks_calls
    }
}

impl SpotifyApi for FakeSpotify {
    async fn current_user(&self) -> Result<User> {
        Ok(User {
            id: USER_ID.to_string(),
            display_name: Some("Test Listener".to_string()),
        })
    }

    async fn user_playlists(
        &self,
        _user_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Playlist>> {
        let playlists = self.playlists();
        Ok(page_of(&playlists, offset, limit))
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        _description: &str,
        _public: bool,
    ) -> Result<Playlist> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(AppError::Api {
                status: 403,
                message: "Insufficient client scope".to_string(),
            });
        }

        let playlist = Playlist {
            id: format!("created-{}", state.created.len() + 1),
            name: name.to_string(),
            owner: PlaylistOwner {
                id: user_id.to_string(),
            },
        };
        state.created.push(name.to_string());
        state.playlists.push((playlist.clone(), Vec::new()));
        Ok(playlist)
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<PlaylistItem>> {
        let state = self.state.lock().unwrap();
        let Some((_, tracks)) = state.playlists.iter().find(|(p, _)| p.id == playlist_id) else {
            return Err(AppError::Api {
                status: 404,
                message: "Not found.".to_string(),
            });
        };

        let items: Vec<PlaylistItem> = tracks
            .iter()
            .map(|id| PlaylistItem {
                track: Some(PlaylistItemTrack {
                    id: Some(id.clone()),
                }),
            })
            .collect();
        Ok(page_of(&items, offset, limit))
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.adds.push(AddCall {
            playlist_id: playlist_id.to_string(),
            track_ids: track_ids.to_vec(),
        });
        match state.playlists.iter_mut().find(|(p, _)| p.id == playlist_id) {
            Some((_, tracks)) => {
                tracks.extend(track_ids.iter().cloned());
                Ok(())
            }
            None => Err(AppError::Api {
                status: 404,
                message: "Not found.".to_string(),
            }),
        }
    }

    async fn saved_tracks(&self, offset: u32, limit: u32) -> Result<Page<SavedTrack>> {
        let mut state = self.state.lock().unwrap();
        state.saved_tracks_calls += 1;
        Ok(page_of(&state.liked, offset, limit))
    }
}
