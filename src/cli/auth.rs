use crate::{
    config::Config,
    error::Result,
    management::TokenStore,
    spotify::OAuthFlow,
};

/// Runs the browser login regardless of any cached token.
pub async fn auth() -> Result<()> {
    let config = Config::from_env()?;
    OAuthFlow::new(&config)
        .complete_login(&TokenStore::default())
        .await?;
    Ok(())
}
