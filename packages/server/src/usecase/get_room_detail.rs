//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::domain::{RoomId, RoomRegistry, RoomSnapshot, Timestamp};

use super::error::GetRoomDetailError;

/// ルーム詳細
#[derive(Debug, Clone)]
pub struct RoomDetail {
    pub snapshot: RoomSnapshot,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<RoomDetail, GetRoomDetailError> {
        let room = self
            .registry
            .get(room_id)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)?;
        Ok(RoomDetail {
            snapshot: room.snapshot(None).await,
            created_at: room.created_at,
            expires_at: room.expires_at(),
        })
    }
}
