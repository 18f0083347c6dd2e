use std::{collections::HashSet, time::Duration};

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config,
    error::Result,
    pagination::{fetch_all, fetch_until},
    spotify::SpotifyApi,
    types::{Playlist, SavedTrack},
    utils,
};

/// All playlists of `user_id`, read in pages of
/// [`config::PLAYLISTS_PAGE_SIZE`].
pub async fn fetch_user_playlists<A: SpotifyApi>(
    api: &A,
    user_id: &str,
) -> Result<Vec<Playlist>> {
    fetch_all(config::PLAYLISTS_PAGE_SIZE, move |offset, limit| {
        api.user_playlists(user_id, offset, limit)
    })
    .await
}

/// Ids of every track currently in the playlist. Items without an id (local
/// files, removed tracks) are skipped.
pub async fn fetch_playlist_track_ids<A: SpotifyApi>(
    api: &A,
    playlist_id: &str,
) -> Result<HashSet<String>> {
    let items = fetch_all(config::PLAYLIST_TRACKS_PAGE_SIZE, move |offset, limit| {
        api.playlist_tracks(playlist_id, offset, limit)
    })
    .await?;

    Ok(items
        .iter()
        .filter_map(|item| item.track_id())
        .map(str::to_string)
        .collect())
}

/// Fetches liked tracks newest first and stops after the page whose last
/// track was saved before `now - lookback_months`.
///
/// Relies on Spotify returning the library in descending `added_at` order;
/// the tracks of the final page are kept even when some of them are older
/// than the cutoff.
///
/// # Arguments
///
/// * `api` - Spotify API to read the library from
/// * `now` - Reference time of the run
/// * `lookback_months` - Size of the window in calendar months
///
/// # Errors
///
/// Any page error is returned, as is [`AppError::TimestampParse`] for a last
/// track whose `added_at` is not in the expected layout.
///
/// [`AppError::TimestampParse`]: crate::AppError::TimestampParse
pub async fn fetch_liked_tracks<A: SpotifyApi>(
    api: &A,
    now: DateTime<Utc>,
    lookback_months: u32,
) -> Result<Vec<SavedTrack>> {
    let cutoff = utils::lookback_cutoff(now, lookback_months);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching liked songs. This may take a while...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let mut previous_last: Option<DateTime<Utc>> = None;
    let result = fetch_until(
        config::LIKED_TRACKS_PAGE_SIZE,
        move |offset, limit| api.saved_tracks(offset, limit),
        |tracks: &[SavedTrack]| {
            let Some(last) = tracks.last() else {
                return Ok(false);
            };
            let last_saved = utils::parse_saved_at(&last.added_at)?;
            if previous_last.is_some_and(|previous| last_saved > previous) {
                tracing::debug!(
                    added_at = %last.added_at,
                    "liked tracks are not in newest-first order"
                );
            }
            previous_last = Some(last_saved);
            pb.set_message(format!("Fetched {} liked songs...", tracks.len()));

            Ok(last_saved < cutoff)
        },
    )
    .await;

    pb.finish_and_clear();
    let tracks = result?;
    tracing::debug!(count = tracks.len(), %cutoff, "fetched liked tracks");
    Ok(tracks)
}
