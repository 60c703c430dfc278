//! UseCase: ルーム退出（明示的な退出）

use std::sync::Arc;

use crate::domain::{ParticipantId, RoomId, RoomRegistry};

use super::error::LeaveRoomError;

/// ルーム退出のユースケース
///
/// 参加者を閉じて削除し、残りの参加者に通知する。退出した参加者の接続は
/// メールボックスが閉じられることで終了する。
pub struct LeaveRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl LeaveRoomUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<(), LeaveRoomError> {
        let room = self
            .registry
            .get(room_id)
            .await
            .ok_or(LeaveRoomError::RoomNotFound)?;
        if !room.remove_participant(participant_id).await {
            return Err(LeaveRoomError::NotAMember);
        }
        room.broadcast().await;
        Ok(())
    }
}
