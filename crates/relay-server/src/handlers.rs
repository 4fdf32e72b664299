//! HTTP request handlers.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use relay_alerts::WebhookPayload;
use relay_notify::Notifier;
use relay_suppress::SuppressionRecord;
use tracing::{debug, info, warn};

use crate::dispatcher::{DispatchReport, MessageOrigin};
use crate::error::{RelayError, RelayResult};
use crate::interaction::{Interaction, InteractionKind, InteractionResponse, parse_custom_id};
use crate::state::AppState;

/// Handle GET /health - liveness probe.
pub async fn health() -> &'static str {
    "UP"
}

/// Handle POST /telegram - relay a webhook batch to Telegram.
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> RelayResult<Json<DispatchReport>> {
    relay(&state, state.telegram(), &body).await
}

/// Handle POST /discord - relay a webhook batch to Discord.
pub async fn discord_webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> RelayResult<Json<DispatchReport>> {
    relay(&state, state.discord(), &body).await
}

async fn relay(
    state: &AppState,
    notifier: &dyn Notifier,
    body: &[u8],
) -> RelayResult<Json<DispatchReport>> {
    let payload = WebhookPayload::from_slice(body).inspect_err(|e| {
        warn!(provider = notifier.name(), error = %e, "rejected webhook body");
    })?;

    debug!(
        provider = notifier.name(),
        alerts = payload.alerts.len(),
        receiver = payload.receiver.as_deref().unwrap_or_default(),
        "received webhook"
    );

    let report = state.dispatcher().dispatch(notifier, &payload.alerts).await?;
    info!(
        provider = notifier.name(),
        sent = report.messages_sent,
        suppressed = report.suppressed,
        ignored = report.ignored,
        "webhook relayed"
    );
    Ok(Json(report))
}

/// Handle POST /discord/interactions - signed component callbacks.
///
/// The signature is checked against the raw body before anything is decoded.
pub async fn discord_interaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> RelayResult<Json<InteractionResponse>> {
    state
        .verifier()
        .verify_request(&headers, &body, Utc::now())
        .inspect_err(|e| warn!(error = %e, "rejected interaction"))?;

    let interaction = Interaction::from_slice(&body)?;

    match interaction.kind() {
        InteractionKind::Ping => {
            debug!("answering interaction ping");
            Ok(Json(InteractionResponse::pong()))
        }
        InteractionKind::MessageComponent => {
            let key = parse_custom_id(interaction.custom_id()?)?;
            let notifier = state.discord();
            let origin = interaction
                .origin(notifier.channel_id())
                .map(|(channel_id, message_id)| MessageOrigin {
                    channel_id,
                    message_id,
                });

            let ack = state
                .dispatcher()
                .acknowledge(notifier, key, interaction.actor(), origin)
                .await?;
            Ok(Json(InteractionResponse::ephemeral(ack.confirmation)))
        }
        InteractionKind::Other(kind) => Err(RelayError::InvalidRequest(format!(
            "unsupported interaction type: {kind}"
        ))),
    }
}

/// Handle GET /suppressions - active acknowledgments, sorted by key.
pub async fn list_suppressions(
    State(state): State<Arc<AppState>>,
) -> RelayResult<Json<Vec<SuppressionRecord>>> {
    let records = state.dispatcher().store().list_active(Utc::now())?;
    Ok(Json(records))
}
