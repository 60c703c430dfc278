//! UseCase: 参加者切断処理
//!
//! 接続が終わった参加者を非アクティブにし、残りの参加者に通知する。
//! 参加者の登録自体は残るため、同じ参加者 ID で再接続できる。

use crate::domain::{ParticipantId, RoomHandle};

/// 参加者切断のユースケース
#[derive(Debug, Default)]
pub struct DisconnectParticipantUseCase;

impl DisconnectParticipantUseCase {
    pub fn new() -> Self {
        Self
    }

    /// 切断を実行する
    ///
    /// `epoch` が最新の接続のものでなければ（既に別の接続に置き換わっていれば）
    /// 何もせず `false` を返す。
    pub async fn execute(
        &self,
        room: &RoomHandle,
        participant_id: &ParticipantId,
        epoch: u64,
    ) -> bool {
        if !room.disconnect(participant_id, epoch).await {
            return false;
        }
        tracing::info!(
            "Participant '{}' disconnected from room '{}'",
            participant_id,
            room.id
        );
        room.broadcast().await;
        true
    }
}
