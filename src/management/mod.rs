mod auth;
mod library;
mod reconcile;
mod sync;

pub use auth::TokenStore;
pub use library::fetch_liked_tracks;
pub use library::fetch_playlist_track_ids;
pub use library::fetch_user_playlists;
pub use reconcile::ReconcilePlan;
pub use reconcile::find_playlist;
pub use reconcile::missing_track_ids;
pub use reconcile::reconcile;
pub use sync::sync_monthly_playlists;
