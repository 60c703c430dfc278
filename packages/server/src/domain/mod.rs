//! Domain layer.
//!
//! ルーム、参加者、集計、通知のモデルと、保管庫のインターフェース。
//! 外部のフレームワーク（axum など）には依存しない。

pub mod aggregation;
pub mod command;
pub mod distribution;
pub mod entity;
pub mod error;
pub mod handle;
pub mod mailbox;
pub mod registry;
pub mod value_object;

pub use aggregation::{RowResult, SUMMARY_ROW};
pub use command::RoomCommand;
pub use distribution::Distribution;
pub use entity::{Participant, ParticipantView, Room, RoomConfig, RoomSnapshot};
pub use error::{RoomConfigError, RoomError, ValueObjectError};
pub use handle::{Attachment, BroadcastReport, RoomHandle};
pub use mailbox::{DEFAULT_DELIVERY_TIMEOUT, Delivery, MailboxReceiver, MailboxSender};
pub use registry::RoomRegistry;
pub use value_object::{
    ParticipantId, ParticipantIdFactory, Role, RoomId, RoomIdFactory, Timestamp,
};
