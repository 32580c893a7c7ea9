//! Axum routes: a static landing page and the webhook receiver.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::telegram::Notifier;
use crate::{events, signature};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let notifier = Notifier::new(&config.bot_token, &config.telegram_api_base);
        Self {
            config: Arc::new(config),
            notifier,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/github", post(github_webhook))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn github_webhook(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    if let Some(secret) = state.config.webhook_secret.as_deref() {
        let header = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !signature::is_valid(secret, header, &body) {
            warn!("rejected delivery with a bad or missing signature");
            return (StatusCode::UNAUTHORIZED, "Invalid payload".to_string());
        }
    }

    let Some(event_type) = headers
        .get("x-github-event")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            "Missing X-GitHub-Event header".to_string(),
        );
    };

    let Some(chat_id) = params.get("chat_id").filter(|v| !v.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            "Missing chat_id query parameter".to_string(),
        );
    };

    let payload = String::from_utf8_lossy(&body);
    let message = match events::render(event_type, &payload) {
        Ok(message) => message,
        Err(err) => {
            error!(event_type, %err, "failed to parse webhook payload");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error parsing webhook".to_string(),
            );
        }
    };

    if message.is_empty() {
        info!(event_type, "nothing to notify for this delivery");
        return (StatusCode::OK, "OK".to_string());
    }

    match state.notifier.send(chat_id, &message).await {
        Ok(()) => {
            info!(event_type, %chat_id, "notification delivered");
            (StatusCode::OK, message.text)
        }
        Err(err) => {
            let scrubbed = state.notifier.redact(&err.to_string());
            error!(event_type, %chat_id, error = %scrubbed, "failed to deliver notification");
            (StatusCode::INTERNAL_SERVER_ERROR, scrubbed)
        }
    }
}
