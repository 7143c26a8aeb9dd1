use axum::http::HeaderValue;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{error::AppError, state::AppState};

pub mod health;
pub mod outreach;

/// Organization scope for every API route. The upstream gateway resolves the
/// organization and forwards it in a header; a request without it is
/// malformed.
#[derive(Debug, Clone)]
pub struct OrganizationId(pub String);

pub const ORGANIZATION_HEADER: &str = "x-organization-id";

#[async_trait]
impl<S> FromRequestParts<S> for OrganizationId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ORGANIZATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::bad_request("missing organization id"))?;
        Ok(OrganizationId(value.to_string()))
    }
}

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
    };

    let outreach_routes = Router::new()
        .route("/sms", post(outreach::send_sms))
        .route("/instances", get(outreach::list_instances))
        .route(
            "/messages/:contact_id",
            get(outreach::messages_for_contact),
        );

    let contact_log_routes = Router::new()
        .route("/", get(outreach::list_contact_logs))
        .route("/:contact_id", get(outreach::contact_logs_for_contact));

    let broadcast_log_routes = Router::new()
        .route("/", get(outreach::list_broadcast_logs))
        .route("/:group_id", get(outreach::broadcast_logs_for_group));

    Router::new()
        .nest("/api/outreach", outreach_routes)
        .nest("/api/contact-logs", contact_log_routes)
        .nest("/api/broadcast-logs", broadcast_log_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
}
