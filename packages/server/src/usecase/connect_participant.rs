//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::authorize() / execute() メソッド
//! - 接続の可否判定と、接続後の全員への通知
//!
//! ### なぜこのテストが必要か
//! - ルーム ID と参加者 ID はアクセス権を兼ねるため、メンバー以外の接続を拒否する必要がある
//! - 接続した参加者が他の参加者の画面に反映されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済みの参加者の接続
//! - 異常系：存在しないルーム、メンバーではない参加者

use std::sync::Arc;

use crate::domain::{Attachment, ParticipantId, RoomError, RoomHandle, RoomId, RoomRegistry};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl ConnectParticipantUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 接続してよいかを判定する（WebSocket のアップグレード前に呼ぶ）
    pub async fn authorize(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<Arc<RoomHandle>, ConnectError> {
        let room = self
            .registry
            .get(room_id)
            .await
            .ok_or(ConnectError::RoomNotFound)?;
        if !room.is_member(participant_id).await {
            return Err(ConnectError::NotAMember);
        }
        Ok(room)
    }

    /// 接続を紐付けて全員に通知する
    ///
    /// 同じ参加者の既存の接続は置き換えられ、古い接続のメールボックスは閉じられる。
    pub async fn execute(
        &self,
        room: &RoomHandle,
        participant_id: &ParticipantId,
    ) -> Result<Attachment, ConnectError> {
        let attachment = room
            .connect(participant_id)
            .await
            .map_err(|e| match e {
                RoomError::NotAMember(_) => ConnectError::NotAMember,
                _ => ConnectError::RoomNotFound,
            })?;
        tracing::info!(
            "Participant '{}' connected to room '{}'",
            participant_id,
            room.id
        );
        room.broadcast().await;
        Ok(attachment)
    }
}
