//! 共有されるルームのハンドル
//!
//! [`Room`] を 1 つの `tokio::sync::Mutex` で保護し、有効期限、ブロードキャスト、
//! ルーム単位のキャンセルスコープを管理する。
//!
//! ## ロックの規則
//!
//! - ルームのロックを保持したままネットワーク I/O やメールボックスへの送信を行わない
//! - ブロードキャストは送信先をロック内でコピーし、ロック解放後に並行して配送する
//! - 有効期限はアトミック変数で持つため、期限チェックにルームのロックは不要

use std::{
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};

use futures_util::future::join_all;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use super::{
    command::RoomCommand,
    entity::{Room, RoomConfig, RoomSnapshot},
    error::RoomError,
    mailbox::{Delivery, MailboxReceiver},
    value_object::{ParticipantId, Role, RoomId, Timestamp},
};

/// 接続 1 本分の紐付け情報
#[derive(Debug)]
pub struct Attachment {
    pub participant_id: ParticipantId,
    pub mailbox: MailboxReceiver,
    /// 切断時に [`RoomHandle::disconnect`] へ渡す
    pub epoch: u64,
    /// ルームのキャンセルスコープから派生したトークン
    pub cancel: CancellationToken,
}

/// 1 回のブロードキャストの配送結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub timed_out: usize,
    pub closed: usize,
}

/// ルームと、その排他制御・通知・寿命管理
#[derive(Debug)]
pub struct RoomHandle {
    pub id: RoomId,
    pub created_at: Timestamp,
    expires_at: AtomicI64,
    delivery_timeout: Duration,
    room: Mutex<Room>,
    cancel: CancellationToken,
}

impl RoomHandle {
    pub fn new(
        id: RoomId,
        config: RoomConfig,
        created_at: Timestamp,
        expires_at: Timestamp,
        delivery_timeout: Duration,
    ) -> Self {
        Self {
            room: Mutex::new(Room::new(id.clone(), config, created_at)),
            id,
            created_at,
            expires_at: AtomicI64::new(expires_at.value()),
            delivery_timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn expires_at(&self) -> Timestamp {
        Timestamp::new(self.expires_at.load(Ordering::Acquire))
    }

    /// `now` が有効期限を過ぎているか（期限ちょうどはまだ有効）
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.value() > self.expires_at.load(Ordering::Acquire)
    }

    /// ルームのロックを取得する
    pub async fn lock(&self) -> MutexGuard<'_, Room> {
        self.room.lock().await
    }

    /// 参加者を登録し、その ID を返す（通知はしない）
    pub async fn join(&self, name: String, role: Role, is_qa: bool) -> ParticipantId {
        let mut room = self.room.lock().await;
        let id = room.join(name, role, is_qa).id.clone();
        tracing::info!("Participant '{}' joined room '{}' as {}", id, self.id, role);
        id
    }

    /// 参加者を削除する。存在しなければ `false`。
    pub async fn remove_participant(&self, id: &ParticipantId) -> bool {
        let removed = self.room.lock().await.remove_participant(id);
        if removed {
            tracing::info!("Participant '{}' left room '{}'", id, self.id);
        }
        removed
    }

    pub async fn is_member(&self, id: &ParticipantId) -> bool {
        self.room.lock().await.participant(id).is_some()
    }

    /// 接続を紐付ける（通知はしない）
    pub async fn connect(&self, id: &ParticipantId) -> Result<Attachment, RoomError> {
        if self.cancel.is_cancelled() {
            return Err(RoomError::Closed);
        }
        let (mailbox, epoch) = self.room.lock().await.connect(id)?;
        Ok(Attachment {
            participant_id: id.clone(),
            mailbox,
            epoch,
            cancel: self.derive_cancellable(),
        })
    }

    /// 接続を切り離す（通知はしない）
    pub async fn disconnect(&self, id: &ParticipantId, epoch: u64) -> bool {
        self.room.lock().await.disconnect(id, epoch)
    }

    /// コマンド列を適用する（通知はしない）
    pub async fn apply(
        &self,
        id: &ParticipantId,
        commands: &[RoomCommand],
    ) -> Result<(), RoomError> {
        self.room.lock().await.apply(id, commands)?;
        if commands.contains(&RoomCommand::Reset) {
            tracing::info!("Room '{}' was reset by '{}'", self.id, id);
        }
        Ok(())
    }

    /// 閲覧者 1 人分の描画用スナップショット
    pub async fn snapshot(&self, viewer: Option<&ParticipantId>) -> RoomSnapshot {
        self.room.lock().await.snapshot(viewer)
    }

    /// 全参加者のメールボックスに変更を通知する
    ///
    /// 送信先はロック内でコピーし、配送はロック解放後に並行して行う。各配送は
    /// 成功するかタイムアウトするまで待ち、全て終わってから返る。
    pub async fn broadcast(&self) -> BroadcastReport {
        let targets = self.room.lock().await.mailboxes();

        let deliveries = join_all(
            targets
                .iter()
                .map(|(_, mailbox)| mailbox.notify(self.delivery_timeout)),
        )
        .await;

        let mut report = BroadcastReport::default();
        for ((participant_id, _), delivery) in targets.iter().zip(deliveries) {
            match delivery {
                Delivery::Delivered => report.delivered += 1,
                Delivery::TimedOut => {
                    tracing::debug!(
                        "Notification to '{}' in room '{}' timed out",
                        participant_id,
                        self.id
                    );
                    report.timed_out += 1;
                }
                Delivery::Closed => report.closed += 1,
            }
        }

        tracing::debug!(
            "Broadcast in room '{}': delivered={}, timed_out={}, closed={}",
            self.id,
            report.delivered,
            report.timed_out,
            report.closed
        );
        report
    }

    /// ルームのキャンセルスコープから子トークンを派生する
    pub fn derive_cancellable(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 派生した全てのキャンセルスコープをキャンセルし、全参加者を閉じる
    ///
    /// メールボックスが閉じた時点で `is_closed` は必ず `true` を返す。
    pub async fn close(&self) {
        self.cancel.cancel();
        self.room.lock().await.close_participants();
        tracing::info!("Room '{}' closed", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{mailbox::DEFAULT_DELIVERY_TIMEOUT, value_object::RoomIdFactory};
    use std::time::Instant;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - broadcast の配送（成功・タイムアウト・並行性）
    // - 接続・切断と epoch
    // - close によるキャンセルの伝播とメールボックスの解放
    // - 有効期限のチェック
    //
    // 【なぜこのテストが必要か】
    // - 受信しないクライアントがいても他の参加者への通知が遅延しないこと
    // - ルーム終了時に全ての接続が確実に終了すること
    // ========================================

    fn create_handle() -> RoomHandle {
        RoomHandle::new(
            RoomIdFactory::generate(),
            RoomConfig::default(),
            Timestamp::new(0),
            Timestamp::new(1_000),
            DEFAULT_DELIVERY_TIMEOUT,
        )
    }

    #[tokio::test]
    async fn test_broadcast_delivers_to_listening_participant() {
        // テスト項目: 接続中の参加者に通知が届く
        // given (前提条件):
        let handle = create_handle();
        let alice = handle.join("alice".to_string(), Role::Participant, false).await;
        let mut attachment = handle.connect(&alice).await.unwrap();

        // when (操作):
        let report = handle.broadcast().await;

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(attachment.mailbox.recv().await, Some(()));
    }

    #[tokio::test]
    async fn test_broadcast_to_stalled_listener_times_out() {
        // テスト項目: 受信しない参加者への 2 回目の通知はタイムアウトで破棄される
        // given (前提条件):
        let handle = create_handle();
        let alice = handle.join("alice".to_string(), Role::Participant, false).await;
        let _attachment = handle.connect(&alice).await.unwrap();
        handle.broadcast().await;

        // when (操作):
        let started = Instant::now();
        let report = handle.broadcast().await;
        let elapsed = started.elapsed();

        // then (期待する結果):
        assert_eq!(report.timed_out, 1);
        assert!(elapsed >= Duration::from_millis(90), "elapsed: {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(1), "elapsed: {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_broadcast_delivers_concurrently() {
        // テスト項目: 受信しない参加者が複数いても配送は並行して行われる
        // given (前提条件):
        let handle = create_handle();
        let mut attachments = Vec::new();
        for i in 0..10 {
            let id = handle
                .join(format!("p{}", i), Role::Participant, false)
                .await;
            attachments.push(handle.connect(&id).await.unwrap());
        }
        handle.broadcast().await;

        // when (操作):
        let started = Instant::now();
        let report = handle.broadcast().await;

        // then (期待する結果):
        assert_eq!(report.timed_out, 10);
        assert!(started.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_stale_connection_cannot_detach_newer_one() {
        // テスト項目: 古い接続の切断は新しい接続の状態を変更しない
        // given (前提条件):
        let handle = create_handle();
        let alice = handle.join("alice".to_string(), Role::Participant, false).await;
        let first = handle.connect(&alice).await.unwrap();
        let second = handle.connect(&alice).await.unwrap();

        // when (操作):
        let detached = handle.disconnect(&alice, first.epoch).await;

        // then (期待する結果):
        assert!(!detached);
        let room = handle.lock().await;
        assert!(room.participant(&alice).unwrap().is_active());
        drop(room);
        assert!(handle.disconnect(&alice, second.epoch).await);
    }

    #[tokio::test]
    async fn test_superseded_connection_mailbox_is_closed() {
        // テスト項目: 同じ参加者の再接続で古い接続のメールボックスが閉じられる
        // given (前提条件):
        let handle = create_handle();
        let alice = handle.join("alice".to_string(), Role::Participant, false).await;
        let mut first = handle.connect(&alice).await.unwrap();

        // when (操作):
        let _second = handle.connect(&alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.mailbox.recv().await, None);
    }

    #[tokio::test]
    async fn test_close_cancels_derived_scopes_and_mailboxes() {
        // テスト項目: close で派生トークンがキャンセルされ、メールボックスが閉じられる
        // given (前提条件):
        let handle = create_handle();
        let alice = handle.join("alice".to_string(), Role::Participant, false).await;
        let mut attachment = handle.connect(&alice).await.unwrap();

        // when (操作):
        handle.close().await;

        // then (期待する結果):
        assert!(attachment.cancel.is_cancelled());
        assert!(handle.is_closed());
        assert_eq!(attachment.mailbox.recv().await, None);
        assert_eq!(handle.connect(&alice).await.err(), Some(RoomError::Closed));
    }

    #[test]
    fn test_expiry_boundary() {
        // テスト項目: 期限ちょうどは有効、期限後は失効。参照しても期限は変わらない
        // given (前提条件):
        let handle = create_handle();

        // when (操作):
        let at_deadline = handle.is_expired(Timestamp::new(1_000));
        let after_deadline = handle.is_expired(Timestamp::new(1_001));

        // then (期待する結果):
        assert!(!at_deadline);
        assert!(after_deadline);
        assert_eq!(handle.expires_at(), Timestamp::new(1_000));
    }
}
