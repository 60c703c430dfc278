//! Mapping from use case errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::RoomConfigError,
    infrastructure::dto::http::ErrorResponseDto,
    usecase::{ConnectError, CreateRoomError, GetRoomDetailError, JoinRoomError, LeaveRoomError},
};

/// Error response with a JSON `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponseDto,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponseDto {
                error: message.into(),
                invalid_cards: Vec::new(),
            },
        }
    }

    pub fn room_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "room not found")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CreateRoomError> for ApiError {
    fn from(error: CreateRoomError) -> Self {
        let CreateRoomError::InvalidConfig(config_error) = error;
        let message = config_error.to_string();
        match config_error {
            RoomConfigError::InvalidCards(invalid_cards) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: ErrorResponseDto {
                    error: message,
                    invalid_cards,
                },
            },
            RoomConfigError::NoCards => Self::new(StatusCode::UNPROCESSABLE_ENTITY, message),
        }
    }
}

impl From<JoinRoomError> for ApiError {
    fn from(error: JoinRoomError) -> Self {
        match error {
            JoinRoomError::RoomNotFound => Self::room_not_found(),
        }
    }
}

impl From<GetRoomDetailError> for ApiError {
    fn from(error: GetRoomDetailError) -> Self {
        match error {
            GetRoomDetailError::RoomNotFound => Self::room_not_found(),
        }
    }
}

impl From<LeaveRoomError> for ApiError {
    fn from(error: LeaveRoomError) -> Self {
        match error {
            LeaveRoomError::RoomNotFound => Self::room_not_found(),
            LeaveRoomError::NotAMember => Self::new(StatusCode::NOT_FOUND, error.to_string()),
        }
    }
}

impl From<ConnectError> for ApiError {
    fn from(error: ConnectError) -> Self {
        match error {
            ConnectError::RoomNotFound => Self::room_not_found(),
            ConnectError::NotAMember => Self::new(StatusCode::FORBIDDEN, error.to_string()),
        }
    }
}
