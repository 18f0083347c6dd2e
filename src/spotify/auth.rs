use std::{net::SocketAddr, sync::Arc};

use chrono::Utc;
use reqwest::{Client, Url};
use tokio::{
    net::TcpListener,
    sync::{Mutex, oneshot},
    task::JoinHandle,
};

use crate::{
    api::CallbackContext,
    config::{self, Config},
    error::{AppError, Result},
    info,
    management::TokenStore,
    server::start_api_server,
    spotify::client::check_status,
    success,
    types::{Token, TokenResponse},
};

/// Exchanges authorization codes at the token endpoint using the client
/// credentials.
#[derive(Debug, Clone)]
pub struct TokenExchange {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl TokenExchange {
    pub fn new(
        config: &Config,
        token_url: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        TokenExchange {
            http: Client::new(),
            token_url: token_url.into(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Trades a one-time authorization code for a [`Token`].
    ///
    /// The client credentials go in a basic auth header and the redirect URI
    /// must be the one used for the authorization request. The expiry is
    /// computed from `expires_in` relative to now.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code received on `/callback`
    ///
    /// # Errors
    ///
    /// - [`AppError::Http`] when the token endpoint cannot be reached
    /// - [`AppError::Auth`] when it rejects the code or answers with an
    ///   unusable `expires_in`
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let response = check_status(response)
            .await
            .map_err(|e| AppError::Auth(format!("token exchange rejected: {}", e)))?;
        let body: TokenResponse = response.json().await?;

        body.into_token(Utc::now())
    }
}

/// OAuth 2.0 authorization-code flow against Spotify.
///
/// Owns everything the login needs: client credentials, redirect URI, scopes,
/// the anti-CSRF `state` and the address of the local callback server. No
/// part of it is process-global, so several flows can coexist (tests bind
/// to port 0).
#[derive(Debug, Clone)]
pub struct OAuthFlow {
    exchange: TokenExchange,
    client_id: String,
    auth_url: String,
    redirect_uri: String,
    scopes: Vec<String>,
    state: String,
    bind_address: String,
}

impl OAuthFlow {
    /// Creates a flow against the Spotify accounts service with the fixed
    /// redirect URI, scopes and state from [`config`].
    pub fn new(config: &Config) -> Self {
        OAuthFlow {
            exchange: TokenExchange::new(config, config::SPOTIFY_TOKEN_URL, config::REDIRECT_URI),
            client_id: config.client_id.clone(),
            auth_url: config::SPOTIFY_AUTH_URL.to_string(),
            redirect_uri: config::REDIRECT_URI.to_string(),
            scopes: config::SPOTIFY_SCOPES.iter().map(|s| s.to_string()).collect(),
            state: config::OAUTH_STATE.to_string(),
            bind_address: config::SERVER_ADDRESS.to_string(),
        }
    }

    pub fn with_endpoints(
        mut self,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.auth_url = auth_url.into();
        self.exchange.token_url = token_url.into();
        self
    }

    pub fn with_bind_address(mut self, bind_address: impl Into<String>) -> Self {
        self.bind_address = bind_address.into();
        self
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Authorization URL the user has to visit to grant access.
    pub fn authorize_url(&self) -> Result<String> {
        let scope = self.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", self.state.as_str()),
            ],
        )
        .map_err(|e| AppError::Config(format!("invalid authorization URL: {}", e)))?;

        Ok(url.to_string())
    }

    /// Requests the authorization URL once before the browser is involved.
    ///
    /// The accounts service answers an unknown client id or a redirect URI
    /// that is not registered with a 4xx page, which the user would otherwise
    /// only see in the browser.
    ///
    /// # Errors
    ///
    /// - [`AppError::Http`] when the accounts service cannot be reached
    /// - [`AppError::Auth`] for a status of 400 or above
    pub async fn verify_authorize_url(&self) -> Result<()> {
        let url = self.authorize_url()?;
        let response = self.exchange.http.get(&url).send().await?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            return Err(AppError::Auth(format!(
                "authorization URL returned status {}",
                status.as_u16()
            )));
        }

        Ok(())
    }

    /// Returns the cached credential when it is still valid, otherwise runs
    /// the interactive login.
    ///
    /// # Arguments
    ///
    /// * `store` - Credential cache, read first and written by a new login
    ///
    /// # Errors
    ///
    /// A cache file that exists but cannot be read or parsed is an error and
    /// does not fall back to a login. Login failures are passed through from
    /// [`OAuthFlow::complete_login`].
    pub async fn obtain_credential(&self, store: &TokenStore) -> Result<Token> {
        match store.load().await? {
            Some(token) if !token.is_expired(Utc::now()) => {
                info!("Using token from {}", store.path().display());
                Ok(token)
            }
            Some(_) => {
                info!("Token is expired. Logging in...");
                self.complete_login(store).await
            }
            None => {
                info!("No token configured. Logging in...");
                self.complete_login(store).await
            }
        }
    }

    /// Runs the interactive login.
    ///
    /// 1. Starts the callback server
    /// 2. Checks the authorization URL with [`OAuthFlow::verify_authorize_url`]
    /// 3. Prints the URL and opens it in the browser
    /// 4. Waits until the callback has exchanged and stored the token
    ///
    /// There is no timeout; the call waits for as long as the browser
    /// interaction takes.
    ///
    /// # Errors
    ///
    /// - [`AppError::Io`] when the callback address cannot be bound
    /// - [`AppError::Browser`] when no browser can be launched
    /// - [`AppError::StateMismatch`] or [`AppError::Auth`] when the callback
    ///   reports a failed login
    pub async fn complete_login(&self, store: &TokenStore) -> Result<Token> {
        let pending = self.listen(store.clone()).await?;

        self.verify_authorize_url().await?;
        let auth_url = self.authorize_url()?;
        info!("Opening the Spotify login page in your browser:\n{}", auth_url);
        webbrowser::open(&auth_url).map_err(|e| AppError::Browser(e.to_string()))?;

        let token = pending.wait().await?;
        success!("Authentication successful!");
        Ok(token)
    }

    /// Binds the callback server and returns a handle to await its single
    /// meaningful request.
    ///
    /// The server runs until [`PendingLogin::wait`] has the outcome, or until
    /// the [`PendingLogin`] is dropped.
    pub async fn listen(&self, store: TokenStore) -> Result<PendingLogin> {
        let listener = TcpListener::bind(&self.bind_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::debug!(%local_addr, "callback server listening");

        let (sender, receiver) = oneshot::channel();
        let context = Arc::new(CallbackContext {
            exchange: self.exchange.clone(),
            store,
            expected_state: self.state.clone(),
            done: Mutex::new(Some(sender)),
        });

        let (shutdown, shutdown_signal) = oneshot::channel::<()>();
        let server = tokio::spawn(start_api_server(listener, context, async move {
            let _ = shutdown_signal.await;
        }));

        Ok(PendingLogin {
            local_addr,
            receiver,
            shutdown,
            server,
        })
    }
}

/// A login whose callback has not fired yet.
pub struct PendingLogin {
    local_addr: SocketAddr,
    receiver: oneshot::Receiver<Result<Token>>,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<()>,
}

impl PendingLogin {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits for the callback outcome, then stops the callback server.
    ///
    /// The handler signals before its response is written, so this waits
    /// (at most [`config::CALLBACK_DRAIN_TIMEOUT`]) for the server to drain.
    /// A failed login therefore still shows its 403 or 404 page in the
    /// browser before the process exits.
    pub async fn wait(self) -> Result<Token> {
        let outcome = self.receiver.await;

        let _ = self.shutdown.send(());
        if tokio::time::timeout(config::CALLBACK_DRAIN_TIMEOUT, self.server)
            .await
            .is_err()
        {
            tracing::debug!("callback server did not drain in time");
        }

        outcome.map_err(|_| {
            AppError::Auth("callback server stopped before the login completed".to_string())
        })?
    }
}
