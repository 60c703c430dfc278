//! InMemory RoomRegistry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! HashMap をインメモリの保管庫として使用します。プロセスを再起動すると
//! 全てのルームは失われます。

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;
use yoriai_shared::time::Clock;

use crate::domain::{
    DEFAULT_DELIVERY_TIMEOUT, RoomConfig, RoomHandle, RoomId, RoomIdFactory, RoomRegistry,
    Timestamp,
};

/// ルームの既定の有効期間（24 時間）
pub const DEFAULT_ROOM_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// 保管庫の設定（プロセス単位で決まり、リクエストごとには変えない）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// 作成からルームが失効するまでの時間
    pub room_ttl: Duration,
    /// ブロードキャスト時、1 つのメールボックスへの配送を待つ時間
    pub delivery_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            room_ttl: DEFAULT_ROOM_TTL,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }
}

/// インメモリ RoomRegistry 実装
pub struct InMemoryRoomRegistry {
    rooms: Mutex<HashMap<RoomId, Arc<RoomHandle>>>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    pub fn new(clock: Arc<dyn Clock>, config: RegistryConfig) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.config.room_ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn create(&self, config: RoomConfig) -> Arc<RoomHandle> {
        let now = self.now();
        let expires_at = Timestamp::new(now.value().saturating_add(self.ttl_millis()));
        let id = RoomIdFactory::generate();
        let handle = Arc::new(RoomHandle::new(
            id.clone(),
            config,
            now,
            expires_at,
            self.config.delivery_timeout,
        ));

        self.rooms.lock().await.insert(id.clone(), handle.clone());
        tracing::info!("Room '{}' created", id);
        handle
    }

    async fn get(&self, id: &RoomId) -> Option<Arc<RoomHandle>> {
        let now = self.now();
        let expired = {
            let mut rooms = self.rooms.lock().await;
            let handle = rooms.get(id)?;
            if !handle.is_expired(now) {
                return Some(handle.clone());
            }
            rooms.remove(id)?
        };

        tracing::info!("Room '{}' expired", id);
        expired.close().await;
        None
    }

    async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    async fn sweep(&self) -> usize {
        let now = self.now();
        let expired: Vec<Arc<RoomHandle>> = {
            let mut rooms = self.rooms.lock().await;
            let ids: Vec<RoomId> = rooms
                .iter()
                .filter(|(_, handle)| handle.is_expired(now))
                .map(|(id, _)| id.clone())
                .collect();
            ids.iter().filter_map(|id| rooms.remove(id)).collect()
        };

        for handle in &expired {
            tracing::info!("Room '{}' expired", handle.id);
            handle.close().await;
        }
        expired.len()
    }

    async fn shutdown(&self) {
        let rooms: Vec<Arc<RoomHandle>> = {
            let mut rooms = self.rooms.lock().await;
            rooms.drain().map(|(_, handle)| handle).collect()
        };

        tracing::info!("Closing {} room(s)", rooms.len());
        for handle in rooms {
            handle.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use mockall::mock;
    use std::sync::atomic::{AtomicI64, Ordering};

    mock! {
        pub TestClock {}

        impl Clock for TestClock {
            fn now_millis(&self) -> i64;
        }
    }

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ルームの作成・取得
    // - 失効したルームの取得時の除去と、sweep による一括除去
    // - shutdown による全ルームの終了
    //
    // 【なぜこのテストが必要か】
    // - 失効したルームが二度と取得できないこと（除去が永続的であること）
    // - 失効したルームの接続が確実に終了すること
    //
    // 【どのようなシナリオをテストするか】
    // 1. 期限内の取得
    // 2. 期限ちょうど / 期限後の取得
    // 3. sweep で失効したルームだけが除去される
    // ========================================

    /// 時刻を外から進められるモックの時計を使う保管庫
    fn create_registry(ttl: Duration) -> (InMemoryRoomRegistry, Arc<AtomicI64>) {
        let now = Arc::new(AtomicI64::new(0));
        let source = now.clone();
        let mut clock = MockTestClock::new();
        clock
            .expect_now_millis()
            .returning(move || source.load(Ordering::SeqCst));

        let registry = InMemoryRoomRegistry::new(
            Arc::new(clock),
            RegistryConfig {
                room_ttl: ttl,
                ..RegistryConfig::default()
            },
        );
        (registry, now)
    }

    #[tokio::test]
    async fn test_create_and_get_room() {
        // テスト項目: 作成したルームを ID で取得できる
        // given (前提条件):
        let (registry, _now) = create_registry(DEFAULT_ROOM_TTL);

        // when (操作):
        let created = registry.create(RoomConfig::default()).await;
        let fetched = registry.get(&created.id).await;

        // then (期待する結果):
        assert!(fetched.is_some_and(|handle| Arc::ptr_eq(&handle, &created)));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_room_returns_none() {
        // テスト項目: 存在しない ID では取得できない
        // given (前提条件):
        let (registry, _now) = create_registry(DEFAULT_ROOM_TTL);

        // when (操作):
        let fetched = registry.get(&RoomIdFactory::generate()).await;

        // then (期待する結果):
        assert!(fetched.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_room_is_valid_until_deadline() {
        // テスト項目: 有効期限ちょうどの時刻ではまだ取得できる
        // given (前提条件):
        let (registry, now) = create_registry(Duration::from_millis(1_000));
        let created = registry.create(RoomConfig::default()).await;

        // when (操作):
        now.store(1_000, Ordering::SeqCst);
        let fetched = registry.get(&created.id).await;

        // then (期待する結果):
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn test_expired_room_is_evicted_on_get() {
        // テスト項目: 期限後の取得で除去・終了され、以後も取得できない
        // given (前提条件):
        let (registry, now) = create_registry(Duration::from_millis(1_000));
        let created = registry.create(RoomConfig::default()).await;
        let alice = created
            .join("alice".to_string(), Role::Participant, false)
            .await;
        let attachment = created.connect(&alice).await.unwrap();

        // when (操作):
        now.store(1_001, Ordering::SeqCst);
        let fetched = registry.get(&created.id).await;

        // then (期待する結果):
        assert!(fetched.is_none());
        assert!(created.is_closed());
        assert!(attachment.cancel.is_cancelled());
        assert_eq!(registry.len().await, 0);
        now.store(0, Ordering::SeqCst);
        assert!(registry.get(&created.id).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_rooms() {
        // テスト項目: sweep は失効したルームだけを除去して終了する
        // given (前提条件):
        let (registry, now) = create_registry(Duration::from_millis(1_000));
        let old = registry.create(RoomConfig::default()).await;
        now.store(500, Ordering::SeqCst);
        let young = registry.create(RoomConfig::default()).await;

        // when (操作):
        now.store(1_200, Ordering::SeqCst);
        let swept = registry.sweep().await;

        // then (期待する結果):
        assert_eq!(swept, 1);
        assert!(old.is_closed());
        assert!(!young.is_closed());
        assert!(registry.get(&young.id).await.is_some());
        assert!(registry.get(&old.id).await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_closes_every_room() {
        // テスト項目: shutdown で全てのルームが終了し、保管庫が空になる
        // given (前提条件):
        let (registry, _now) = create_registry(DEFAULT_ROOM_TTL);
        let first = registry.create(RoomConfig::default()).await;
        let second = registry.create(RoomConfig::default()).await;

        // when (操作):
        registry.shutdown().await;

        // then (期待する結果):
        assert!(first.is_closed());
        assert!(second.is_closed());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_room_ids_are_distinct() {
        // テスト項目: 作成のたびに異なる ID が割り当てられる
        // given (前提条件):
        let (registry, _now) = create_registry(DEFAULT_ROOM_TTL);

        // when (操作):
        let first = registry.create(RoomConfig::default()).await;
        let second = registry.create(RoomConfig::default()).await;

        // then (期待する結果):
        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, Timestamp::new(0));
    }
}
