use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult, DispatchError};
use crate::models::{
    BroadcastLog, Channel, ContactLog, DeliveryAttempt, DispatchTarget, OutreachInstance,
};
use crate::state::AppState;

use super::OrganizationId;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsRequest {
    pub target_type: String,
    pub initiator_email: String,
    pub target_id: String,
    pub message: String,
}

pub async fn send_sms(
    State(state): State<AppState>,
    OrganizationId(organization_id): OrganizationId,
    Json(payload): Json<SendSmsRequest>,
) -> AppResult<(StatusCode, Json<OutreachInstance>)> {
    if payload.initiator_email.trim().is_empty() {
        return Err(AppError::bad_request("initiatorEmail must not be empty"));
    }
    if payload.message.is_empty() {
        return Err(AppError::bad_request("message must not be empty"));
    }

    let target_id: Uuid = payload
        .target_id
        .parse()
        .map_err(|_| AppError::bad_request("targetId must be a valid id"))?;

    // Upstream validation constrains targetType to these two values; the
    // final arm stays a typed error so a bypass cannot crash the dispatcher.
    let target = match payload.target_type.as_str() {
        "contact" => DispatchTarget::Contact(target_id),
        "group" => DispatchTarget::Group(target_id),
        other => return Err(DispatchError::InvalidTarget(other.to_string()).into()),
    };

    let instance = state
        .dispatcher
        .dispatch(
            &organization_id,
            &payload.initiator_email,
            Channel::Sms,
            target,
            &payload.message,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(instance)))
}

pub async fn list_instances(
    State(state): State<AppState>,
    OrganizationId(organization_id): OrganizationId,
) -> AppResult<Json<Vec<OutreachInstance>>> {
    let instances = state.audit.list_instances(&organization_id).await?;
    Ok(Json(instances))
}

pub async fn messages_for_contact(
    State(state): State<AppState>,
    OrganizationId(organization_id): OrganizationId,
    Path(contact_id): Path<Uuid>,
) -> AppResult<Json<Vec<DeliveryAttempt>>> {
    let attempts = state
        .audit
        .attempts_for_contact(&organization_id, contact_id)
        .await?;
    Ok(Json(attempts))
}

pub async fn list_contact_logs(
    State(state): State<AppState>,
    OrganizationId(organization_id): OrganizationId,
) -> AppResult<Json<Vec<ContactLog>>> {
    let logs = state.audit.list_contact_logs(&organization_id).await?;
    Ok(Json(logs))
}

pub async fn contact_logs_for_contact(
    State(state): State<AppState>,
    OrganizationId(organization_id): OrganizationId,
    Path(contact_id): Path<Uuid>,
) -> AppResult<Json<Vec<ContactLog>>> {
    let logs = state
        .audit
        .contact_logs_for_contact(&organization_id, contact_id)
        .await?;
    Ok(Json(logs))
}

pub async fn list_broadcast_logs(
    State(state): State<AppState>,
    OrganizationId(organization_id): OrganizationId,
) -> AppResult<Json<Vec<BroadcastLog>>> {
    let logs = state.audit.list_broadcast_logs(&organization_id).await?;
    Ok(Json(logs))
}

pub async fn broadcast_logs_for_group(
    State(state): State<AppState>,
    OrganizationId(organization_id): OrganizationId,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<Vec<BroadcastLog>>> {
    let logs = state
        .audit
        .broadcast_logs_for_group(&organization_id, group_id)
        .await?;
    Ok(Json(logs))
}
