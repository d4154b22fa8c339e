use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use ledgersync_common::error::LedgerError;
use ledgersync_common::request::SyncRequest;

use crate::error::ApiError;
use crate::extractors::{CompanyId, UserId};
use crate::sync::responses::{SyncAcceptedResponse, SyncStatusData, SyncStatusResponse};
use crate::AppState;

pub async fn request_full_sync(
    State(state): State<AppState>,
    CompanyId(company_id): CompanyId,
    UserId(user_id): UserId,
) -> Result<(StatusCode, Json<SyncAcceptedResponse>), ApiError> {
    let request = SyncRequest::new(&company_id, &user_id);
    request.validate()?;

    let envelope = state.queue.enqueue(&request.to_json()?).await?;
    tracing::info!(
        %company_id,
        message_id = %envelope.id,
        "full sync requested"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SyncAcceptedResponse {
            message_id: envelope.id,
            requested_at: request.requested_at,
        }),
    ))
}

pub async fn get_sync_status(
    State(state): State<AppState>,
    CompanyId(company_id): CompanyId,
) -> Result<Json<SyncStatusResponse>, ApiError> {
    let company = state
        .status_repo
        .get_coarse_status(&company_id)
        .await?
        .ok_or_else(|| {
            LedgerError::NotFound(format!("no sync has run for company {company_id}"))
        })?;

    let entities = state.status_repo.list_entity_states(&company_id).await?;
    Ok(Json(SyncStatusResponse {
        data: SyncStatusData { company, entities },
    }))
}
