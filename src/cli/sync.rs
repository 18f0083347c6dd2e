use chrono::Utc;
use tabled::Table;

use crate::{
    config::Config,
    error::Result,
    info,
    management::{ReconcilePlan, TokenStore, sync_monthly_playlists},
    spotify::{OAuthFlow, SpotifyClient},
    success,
    types::SyncTableRow,
};

/// Runs the monthly playlist sync and prints a summary table.
///
/// Logs in first when there is no valid cached token. With `dry_run` the
/// table shows what would change and nothing is written.
pub async fn sync(dry_run: bool) -> Result<()> {
    let config = Config::from_env()?;
    let store = TokenStore::default();
    let token = OAuthFlow::new(&config).obtain_credential(&store).await?;

    let client = SpotifyClient::new(token);
    let plans = sync_monthly_playlists(&client, Utc::now(), dry_run).await?;

    if plans.is_empty() {
        info!("No liked songs in the lookback window.");
        return Ok(());
    }

    println!("{}", Table::new(table_rows(&plans, dry_run)));

    if dry_run {
        info!("Dry run, nothing was changed.");
    } else {
        success!("Done.");
    }
    Ok(())
}

fn table_rows(plans: &[ReconcilePlan], dry_run: bool) -> Vec<SyncTableRow> {
    plans
        .iter()
        .map(|plan| SyncTableRow {
            playlist: plan.playlist_name.clone(),
            status: match (plan.created, dry_run) {
                (true, true) => "would create",
                (true, false) => "created",
                (false, _) if plan.missing.is_empty() => "up to date",
                (false, true) => "would update",
                (false, false) => "updated",
            }
            .to_string(),
            liked: plan.liked,
            added: plan.missing.len(),
        })
        .collect()
}
