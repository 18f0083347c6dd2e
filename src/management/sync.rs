use chrono::{DateTime, Utc};

use crate::{
    config,
    error::Result,
    info,
    management::{
        library::{fetch_liked_tracks, fetch_user_playlists},
        reconcile::{ReconcilePlan, reconcile},
    },
    spotify::SpotifyApi,
    utils,
};

/// One full run: current user, their playlists, liked tracks within the
/// lookback window, grouped per month and reconciled.
///
/// # Example
///
/// ```
/// let client = SpotifyClient::new(token);
/// let plans = sync_monthly_playlists(&client, Utc::now(), false).await?;
/// for plan in plans {
///     println!("{}: {} added", plan.playlist_name, plan.missing.len());
/// }
/// ```
pub async fn sync_monthly_playlists<A: SpotifyApi>(
    api: &A,
    now: DateTime<Utc>,
    dry_run: bool,
) -> Result<Vec<ReconcilePlan>> {
    let user = api.current_user().await?;
    info!(
        "You are logged in as {}",
        user.display_name.as_deref().unwrap_or(&user.id)
    );

    let playlists = fetch_user_playlists(api, &user.id).await?;
    tracing::debug!(count = playlists.len(), "fetched playlists");

    let liked = fetch_liked_tracks(api, now, config::LOOKBACK_MONTHS).await?;
    info!("Looking at {} liked songs", liked.len());

    let buckets = utils::bucketize(&liked)?;
    reconcile(api, &user.id, &playlists, &buckets, dry_run).await
}
