use std::collections::HashSet;

use crate::{
    error::Result,
    info,
    management::library::fetch_playlist_track_ids,
    spotify::{SpotifyApi, client::MAX_TRACKS_PER_ADD},
    success,
    types::{MonthlyBuckets, Playlist, SavedTrack},
    warning,
};

/// What the sync did (or, in a dry run, would do) for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan {
    pub playlist_name: String,
    /// `None` only in a dry run for a playlist that does not exist yet.
    pub playlist_id: Option<String>,
    pub created: bool,
    pub liked: usize,
    /// Tracks of the bucket missing from the playlist, in bucket order.
    pub missing: Vec<String>,
}

/// First playlist whose name equals `name` exactly.
///
/// Spotify allows duplicate names; the first one in fetch order wins and the
/// others are reported.
pub fn find_playlist<'a>(playlists: &'a [Playlist], name: &str) -> Option<&'a Playlist> {
    let mut matches = playlists.iter().filter(|p| p.name == name);
    let first = matches.next()?;
    let others = matches.count();
    if others > 0 {
        warning!(
            "Found {} playlists named {:?}, using the first one ({})",
            others + 1,
            name,
            first.id
        );
    }
    Some(first)
}

/// Track ids of `tracks` not contained in `present`, each at most once.
pub fn missing_track_ids(tracks: &[SavedTrack], present: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .map(SavedTrack::id)
        .filter(|id| !present.contains(*id) && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Makes each monthly playlist contain its bucket's tracks.
///
/// Playlists are found by exact name or created (public, empty description)
/// for `user_id`. Only missing tracks are added; nothing is ever removed, so
/// running it again without remote changes writes nothing. With `dry_run`
/// nothing is created or added.
///
/// # Arguments
///
/// * `api` - Spotify API used for reads and writes
/// * `user_id` - Owner of newly created playlists
/// * `playlists` - The user's playlists as fetched before the run
/// * `buckets` - Liked tracks grouped per month, see [`crate::utils::bucketize`]
/// * `dry_run` - Plan only, without writing
///
/// # Errors
///
/// The first failing call stops the run. Playlists created and tracks added
/// before it stay in place; a later run picks up from there.
pub async fn reconcile<A: SpotifyApi>(
    api: &A,
    user_id: &str,
    playlists: &[Playlist],
    buckets: &MonthlyBuckets,
    dry_run: bool,
) -> Result<Vec<ReconcilePlan>> {
    let mut plans = Vec::with_capacity(buckets.len());

    for bucket in buckets.values() {
        let existing = find_playlist(playlists, &bucket.name);

        let (playlist_id, created) = match existing {
            Some(playlist) => (Some(playlist.id.clone()), false),
            None if dry_run => (None, true),
            None => {
                let playlist = api
                    .create_playlist(user_id, &bucket.name, "", true)
                    .await?;
                success!("Created playlist {}", bucket.name);
                (Some(playlist.id), true)
            }
        };

        let present = match &playlist_id {
            Some(id) => fetch_playlist_track_ids(api, id).await?,
            None => HashSet::new(),
        };
        let missing = missing_track_ids(&bucket.tracks, &present);

        if let Some(id) = &playlist_id {
            if !missing.is_empty() && !dry_run {
                for chunk in missing.chunks(MAX_TRACKS_PER_ADD) {
                    api.add_tracks(id, chunk).await?;
                }
                info!("Added {} tracks to {}", missing.len(), bucket.name);
            }
        }

        tracing::debug!(
            playlist = %bucket.name,
            created,
            liked = bucket.tracks.len(),
            missing = missing.len(),
            "reconciled"
        );

        plans.push(ReconcilePlan {
            playlist_name: bucket.name.clone(),
            playlist_id,
            created,
            liked: bucket.tracks.len(),
            missing,
        });
    }

    Ok(plans)
}
