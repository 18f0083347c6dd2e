use std::sync::Arc;

use axum::{Extension, extract::Query, http::StatusCode};
use serde::Deserialize;
use tokio::sync::{Mutex, oneshot};

use crate::{
    error::{AppError, Result},
    management::TokenStore,
    spotify::TokenExchange,
    types::Token,
    warning,
};

pub const LOGIN_COMPLETED: &str = "Login completed. You can close this tab now.";

/// Shared state of the callback route. `done` is consumed by the first
/// request that carries the expected outcome.
pub struct CallbackContext {
    pub exchange: TokenExchange,
    pub store: TokenStore,
    pub expected_state: String,
    pub done: Mutex<Option<oneshot::Sender<Result<Token>>>>,
}

impl CallbackContext {
    // The outcome is sent before the handler's response is written;
    // `PendingLogin::wait` drains the server so the response still goes out.
    async fn finish(&self, outcome: Result<Token>) {
        if let Some(sender) = self.done.lock().await.take() {
            // The receiver may already be gone when the flow was abandoned.
            let _ = sender.send(outcome);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Handles the OAuth redirect on `/callback`.
///
/// Only the first request hands its outcome to the waiting login; later
/// requests get the same responses without signalling again.
///
/// # Arguments
///
/// * `params` - `code`, `state` and `error` from the query string
/// * `context` - Expected state, code exchange and token store of the flow
///
/// # Responses
///
/// - `404 page not found` when `state` is not the expected value
/// - `403 Couldn't get token` when there is no code or the exchange fails
/// - `500 Couldn't store token` when the token cannot be written
/// - `200` with [`LOGIN_COMPLETED`] otherwise
pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(context): Extension<Arc<CallbackContext>>,
) -> (StatusCode, &'static str) {
    let received = params.state.unwrap_or_default();
    if received != context.expected_state {
        warning!("State mismatch: {} != {}", received, context.expected_state);
        context
            .finish(Err(AppError::StateMismatch {
                received,
                expected: context.expected_state.clone(),
            }))
            .await;
        return (StatusCode::NOT_FOUND, "404 page not found");
    }

    let Some(code) = params.code else {
        let reason = params
            .error
            .unwrap_or_else(|| "missing authorization code".to_string());
        warning!("Authorization was not granted: {}", reason);
        context.finish(Err(AppError::Auth(reason))).await;
        return (StatusCode::FORBIDDEN, "Couldn't get token");
    };

    let token = match context.exchange.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            context.finish(Err(e)).await;
            return (StatusCode::FORBIDDEN, "Couldn't get token");
        }
    };

    if let Err(e) = context.store.save(&token).await {
        warning!("Failed to save token: {}", e);
        context.finish(Err(e)).await;
        return (StatusCode::INTERNAL_SERVER_ERROR, "Couldn't store token");
    }

    context.finish(Ok(token)).await;
    (StatusCode::OK, LOGIN_COMPLETED)
}
