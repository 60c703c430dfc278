//! UseCase: ルーム作成

use std::sync::Arc;

use crate::domain::{RoomConfig, RoomHandle, RoomRegistry};

use super::error::CreateRoomError;

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl CreateRoomUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 設定を検証してルームを作成する。不正な設定ではルームを確保しない。
    ///
    /// `cards` が `None` の場合は既定のカードを使う。
    pub async fn execute(
        &self,
        cards: Option<Vec<String>>,
        rows: Vec<String>,
        map_to_fibonacci: bool,
    ) -> Result<Arc<RoomHandle>, CreateRoomError> {
        let config = match cards {
            Some(cards) => RoomConfig::new(cards, rows, map_to_fibonacci)?,
            None => {
                let defaults = RoomConfig::default().cards().to_vec();
                RoomConfig::new(defaults, rows, map_to_fibonacci)?
            }
        };
        Ok(self.registry.create(config).await)
    }
}
