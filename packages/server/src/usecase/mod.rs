//! UseCase layer.
//!
//! HTTP / WebSocket のハンドラから呼ばれるアプリケーションの操作。
//! ドメイン層のインターフェース（RoomRegistry）にのみ依存する。

mod apply_update;
mod connect_participant;
mod create_room;
mod disconnect_participant;
mod error;
mod get_room_detail;
mod join_room;
mod leave_room;

pub use apply_update::ApplyUpdateUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{
    ApplyUpdateError, ConnectError, CreateRoomError, GetRoomDetailError, JoinRoomError,
    LeaveRoomError,
};
pub use get_room_detail::{GetRoomDetailUseCase, RoomDetail};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
