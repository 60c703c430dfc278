//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{ParticipantId, Role, RoomId},
    infrastructure::dto::http::{
        CreateRoomRequest, HealthDto, JoinRoomRequest, JoinedDto, RoomCreatedDto, RoomDetailDto,
    },
    ui::state::AppState,
    usecase::LeaveRoomError,
};

use super::{error::ApiError, websocket_path};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        rooms: state.registry.len().await,
    })
}

/// Create a room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomCreatedDto>), ApiError> {
    let cards = request.cards.map(|cards| cards.into_items());
    let rows = request
        .rows
        .map(|rows| rows.into_items())
        .unwrap_or_default();

    let room = state
        .create_room_usecase
        .execute(cards, rows, request.map_to_fibonacci)
        .await
        .inspect_err(|e| tracing::warn!("Rejected room configuration: {}", e))?;

    // Domain Model から DTO への変換
    let config = room.lock().await.config().clone();
    let created = RoomCreatedDto::new(
        room.id.to_string(),
        &config,
        room.created_at,
        room.expires_at(),
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let room_id = RoomId::try_from(room_id).map_err(|_| ApiError::room_not_found())?;
    let detail = state.get_room_detail_usecase.execute(&room_id).await?;

    // Domain Model から DTO への変換
    Ok(Json(RoomDetailDto::new(
        detail.snapshot,
        detail.created_at,
        detail.expires_at,
    )))
}

/// Join a room
///
/// The returned participant id is the credential for the WebSocket connection.
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<(StatusCode, Json<JoinedDto>), ApiError> {
    let room_id = RoomId::try_from(room_id).map_err(|_| ApiError::room_not_found())?;
    let role = request
        .role
        .as_deref()
        .map(Role::from_token)
        .unwrap_or(Role::Participant);

    let participant_id = state
        .join_room_usecase
        .execute(&room_id, request.name, role, request.qa)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(JoinedDto {
            websocket_path: websocket_path(room_id.as_str(), participant_id.as_str()),
            room_id: room_id.into_string(),
            participant_id: participant_id.into_string(),
        }),
    ))
}

/// Leave a room explicitly
pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    Path((room_id, participant_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let room_id = RoomId::try_from(room_id).map_err(|_| ApiError::room_not_found())?;
    let participant_id = ParticipantId::try_from(participant_id)
        .map_err(|_| ApiError::from(LeaveRoomError::NotAMember))?;

    state
        .leave_room_usecase
        .execute(&room_id, &participant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
