//! UseCase: ライブ更新の適用
//!
//! 接続中の参加者から届いたコマンド列をルームに適用し、全員に通知する。
//! 検証に失敗したコマンド列は一切適用せず、通知もしない。

use std::sync::Arc;

use crate::domain::{ParticipantId, RoomCommand, RoomId, RoomRegistry};

use super::error::ApplyUpdateError;

/// ライブ更新のユースケース
pub struct ApplyUpdateUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl ApplyUpdateUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// コマンド列を適用する
    ///
    /// ルームが失効していれば `RoomNotFound` を返す（呼び出し側は接続を終了する）。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        commands: &[RoomCommand],
    ) -> Result<(), ApplyUpdateError> {
        let room = self
            .registry
            .get(room_id)
            .await
            .ok_or(ApplyUpdateError::RoomNotFound)?;
        room.apply(participant_id, commands).await?;
        room.broadcast().await;
        Ok(())
    }
}
