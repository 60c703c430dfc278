//! Value Object 定義
//!
//! ルームと参加者の識別子、タイムスタンプ、ロールを表す値オブジェクト。
//! 識別子はアクセス権を兼ねるため、推測不可能な UUID v4 (122 bit の乱数) を使う。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Room の識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    /// 文字列から RoomId を作成（UUID 形式でなければエラー）
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        parse_uuid(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// RoomId の生成器
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> RoomId {
        RoomId(Uuid::new_v4().to_string())
    }
}

/// 参加者の識別子
///
/// 参加時に払い出され、再接続をまたいで同じ値が使われる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// 文字列から ParticipantId を作成（UUID 形式でなければエラー）
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        parse_uuid(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ParticipantId の生成器
pub struct ParticipantIdFactory;

impl ParticipantIdFactory {
    pub fn generate() -> ParticipantId {
        ParticipantId(Uuid::new_v4().to_string())
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, ValueObjectError> {
    Uuid::parse_str(value).map_err(|_| ValueObjectError::InvalidId(value.to_string()))
}

/// Unix タイムスタンプ（ミリ秒, UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 参加者のロール
///
/// `Participant` だけが集計に寄与する。`Watcher` は観戦のみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Participant,
    Watcher,
}

impl Role {
    /// 入力トークンからロールを決定する。未知の値は `Participant` として扱う。
    pub fn from_token(token: &str) -> Self {
        match token {
            "Watcher" => Self::Watcher,
            _ => Self::Participant,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "Participant",
            Self::Watcher => "Watcher",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Participant => Self::Watcher,
            Self::Watcher => Self::Participant,
        }
    }

    /// 集計に寄与するロールかどうか
    pub fn contributes(&self) -> bool {
        matches!(self, Self::Participant)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
