//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RoomConfigError, RoomError};

/// ルーム作成のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreateRoomError {
    #[error(transparent)]
    InvalidConfig(#[from] RoomConfigError),
}

/// ルーム参加のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinRoomError {
    #[error("room not found")]
    RoomNotFound,
}

/// 接続のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("room not found")]
    RoomNotFound,

    #[error("not a member of this room")]
    NotAMember,
}

/// 退出のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaveRoomError {
    #[error("room not found")]
    RoomNotFound,

    #[error("not a member of this room")]
    NotAMember,
}

/// ライブ更新の適用エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyUpdateError {
    #[error("room not found")]
    RoomNotFound,

    #[error(transparent)]
    Rejected(#[from] RoomError),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GetRoomDetailError {
    #[error("room not found")]
    RoomNotFound,
}
