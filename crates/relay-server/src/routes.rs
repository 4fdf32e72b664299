//! Route configuration for the relay API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    discord_interaction, discord_webhook, health, list_suppressions, telegram_webhook,
};
use crate::state::AppState;

/// Create the relay router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Webhook entry points, one per provider
        .route("/telegram", post(telegram_webhook))
        .route("/discord", post(discord_webhook))
        // Signed component callbacks
        .route("/discord/interactions", post(discord_interaction))
        .route("/suppressions", get(list_suppressions))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ed25519_dalek::SigningKey;
    use http_body_util::BodyExt;
    use relay_notify::{DiscordConfig, DiscordNotifier, TelegramConfig, TelegramNotifier};
    use relay_suppress::MemorySuppressionStore;
    use tower::ServiceExt;

    use crate::dispatcher::AlertDispatcher;
    use crate::verify::InteractionVerifier;

    // Nothing listens here; these tests never reach a provider.
    const DEAD_API: &str = "http://127.0.0.1:9";

    fn make_test_state() -> Arc<AppState> {
        let telegram =
            TelegramNotifier::new(TelegramConfig::new("123:abc", "-100").with_api_base(DEAD_API))
                .unwrap();
        let discord =
            DiscordNotifier::new(DiscordConfig::new("token", "998877").with_api_base(DEAD_API))
                .unwrap();
        let verifier =
            InteractionVerifier::new(SigningKey::from_bytes(&[5u8; 32]).verifying_key());

        Arc::new(AppState::new(
            AlertDispatcher::new(Arc::new(MemorySuppressionStore::new()), chrono::Duration::hours(72)),
            Arc::new(telegram),
            Arc::new(discord),
            verifier,
        ))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(make_test_state());

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"UP");
    }

    #[tokio::test]
    async fn test_malformed_webhook_is_bad_request() {
        for uri in ["/telegram", "/discord"] {
            let app = create_router(make_test_state());
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap();

            let response = app.oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body_json(response).await["error"], "invalid_request");
        }
    }

    #[tokio::test]
    async fn test_empty_alert_list_is_bad_request() {
        let app = create_router(make_test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/telegram")
            .body(Body::from(r#"{"alerts": []}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsigned_interaction_is_unauthorized() {
        let app = create_router(make_test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/discord/interactions")
            .body(Body::from(r#"{"type": 1}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_suppressions_starts_empty() {
        let app = create_router(make_test_state());

        let request = Request::builder().uri("/suppressions").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = create_router(make_test_state());

        let request = Request::builder().uri("/api/status").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_webhook_rejects_get() {
        let app = create_router(make_test_state());

        let request = Request::builder().uri("/telegram").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
