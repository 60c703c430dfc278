//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    domain::RoomRegistry,
    usecase::{
        ApplyUpdateUseCase, ConnectParticipantUseCase, CreateRoomUseCase,
        DisconnectParticipantUseCase, GetRoomDetailUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// RoomRegistry（ルームの保管庫）
    pub registry: Arc<dyn RoomRegistry>,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: CreateRoomUseCase,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: JoinRoomUseCase,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    pub leave_room_usecase: LeaveRoomUseCase,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: GetRoomDetailUseCase,
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: ConnectParticipantUseCase,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: DisconnectParticipantUseCase,
    /// ApplyUpdateUseCase（ライブ更新のユースケース）
    pub apply_update_usecase: ApplyUpdateUseCase,
}

impl AppState {
    /// 全てのユースケースを同じ保管庫で組み立てる
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self {
            create_room_usecase: CreateRoomUseCase::new(registry.clone()),
            join_room_usecase: JoinRoomUseCase::new(registry.clone()),
            leave_room_usecase: LeaveRoomUseCase::new(registry.clone()),
            get_room_detail_usecase: GetRoomDetailUseCase::new(registry.clone()),
            connect_participant_usecase: ConnectParticipantUseCase::new(registry.clone()),
            disconnect_participant_usecase: DisconnectParticipantUseCase::new(),
            apply_update_usecase: ApplyUpdateUseCase::new(registry.clone()),
            registry,
        }
    }
}
