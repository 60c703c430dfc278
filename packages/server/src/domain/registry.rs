//! RoomRegistry trait 定義
//!
//! ルームの保管と有効期限の管理のインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{entity::RoomConfig, handle::RoomHandle, value_object::RoomId};

/// ルームの保管庫
///
/// ## ロックの規則
///
/// - 保管庫自身のロックを保持したままルームのロックを待たない
/// - 失効したルームは保管庫から取り除いてロックを解放した後に閉じる
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// 新しい ID でルームを作成して保管する
    async fn create(&self, config: RoomConfig) -> Arc<RoomHandle>;

    /// 有効なルームを取得する。失効していれば取り除いて閉じ、`None` を返す。
    async fn get(&self, id: &RoomId) -> Option<Arc<RoomHandle>>;

    /// 保管中のルーム数
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 失効した全てのルームを取り除いて閉じ、その数を返す
    async fn sweep(&self) -> usize;

    /// 全てのルームを閉じて取り除く
    async fn shutdown(&self);
}
