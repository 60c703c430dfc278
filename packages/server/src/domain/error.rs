//! Domain errors.

use thiserror::Error;

/// 値オブジェクトの検証エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("invalid id '{0}': expected a UUID")]
    InvalidId(String),
}

/// ルーム設定の検証エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomConfigError {
    #[error("at least one card is required")]
    NoCards,

    /// Every label that failed to parse as a finite, non-negative number.
    #[error("invalid card values: {}", .0.join(", "))]
    InvalidCards(Vec<String>),
}

/// ルーム操作のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("participant '{0}' is not a member of this room")]
    NotAMember(String),

    #[error("card '{0}' is not one of this room's cards")]
    UnknownCard(String),

    #[error("row '{0}' is not one of this room's rows")]
    UnknownRow(String),

    #[error("room is closed")]
    Closed,
}
