//! UseCase: ルーム参加

use std::sync::Arc;

use crate::domain::{ParticipantId, Role, RoomId, RoomRegistry};

use super::error::JoinRoomError;

/// ルーム参加のユースケース
///
/// 参加者を登録するだけで、接続（WebSocket）はまだ紐付けない。
pub struct JoinRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl JoinRoomUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(
        &self,
        room_id: &RoomId,
        name: String,
        role: Role,
        is_qa: bool,
    ) -> Result<ParticipantId, JoinRoomError> {
        let room = self
            .registry
            .get(room_id)
            .await
            .ok_or(JoinRoomError::RoomNotFound)?;
        let participant_id = room.join(name, role, is_qa).await;
        room.broadcast().await;
        Ok(participant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RoomConfig, RoomIdFactory},
        infrastructure::InMemoryRoomRegistry,
    };
    use yoriai_shared::time::FixedClock;

    fn create_registry() -> Arc<InMemoryRoomRegistry> {
        Arc::new(InMemoryRoomRegistry::new(
            Arc::new(FixedClock::new(0)),
            Default::default(),
        ))
    }

    #[tokio::test]
    async fn test_join_registers_inactive_participant() {
        // テスト項目: 参加者は未接続の状態で登録される
        // given (前提条件):
        let registry = create_registry();
        let room = registry.create(RoomConfig::default()).await;
        let usecase = JoinRoomUseCase::new(registry.clone());

        // when (操作):
        let id = usecase
            .execute(&room.id, "alice".to_string(), Role::Watcher, true)
            .await
            .unwrap();

        // then (期待する結果):
        let guard = room.lock().await;
        let participant = guard.participant(&id).expect("registered");
        assert_eq!(participant.name, "alice");
        assert_eq!(participant.role(), Role::Watcher);
        assert!(participant.is_qa());
        assert!(!participant.is_active());
    }

    #[tokio::test]
    async fn test_join_unknown_room() {
        // テスト項目: 存在しないルームには参加できない
        // given (前提条件):
        let usecase = JoinRoomUseCase::new(create_registry());

        // when (操作):
        let result = usecase
            .execute(
                &RoomIdFactory::generate(),
                "alice".to_string(),
                Role::Participant,
                false,
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::RoomNotFound));
    }
}
