//! Participant エンティティ
//!
//! ルームに参加している（または過去に参加した）個人。
//! 選択中のカード、ロール、接続状態、通知用メールボックスを保持する。

use std::collections::BTreeMap;

use crate::domain::{
    mailbox::{MailboxReceiver, MailboxSender, mailbox},
    value_object::{ParticipantId, Role},
};

/// 参加者
#[derive(Debug)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    role: Role,
    is_qa: bool,
    active: bool,
    /// row → card label
    selections: BTreeMap<String, String>,
    /// `None` once the participant has been closed
    mailbox: Option<MailboxSender>,
    /// Receiver not yet claimed by a connection
    inbox: Option<MailboxReceiver>,
    /// Incremented on every attach, so a stale connection cannot detach a newer one
    epoch: u64,
}

/// 描画用にコピーされた参加者の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub name: String,
    pub role: Role,
    pub is_qa: bool,
    pub active: bool,
    pub ready: bool,
    pub selections: BTreeMap<String, String>,
}

impl Participant {
    /// 新しい参加者を作成（未接続、メールボックスは新規作成）
    pub fn new(id: ParticipantId, name: String, role: Role, is_qa: bool) -> Self {
        let (tx, rx) = mailbox();
        Self {
            id,
            name,
            role,
            is_qa,
            active: false,
            selections: BTreeMap::new(),
            mailbox: Some(tx),
            inbox: Some(rx),
            epoch: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_qa(&self) -> bool {
        self.is_qa
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_closed(&self) -> bool {
        self.mailbox.is_none()
    }

    /// 集計に寄与する状態かどうか（接続中かつ Participant ロール）
    pub fn contributes(&self) -> bool {
        self.active && self.role.contributes()
    }

    pub fn selection(&self, row: &str) -> Option<&str> {
        self.selections.get(row).map(String::as_str)
    }

    pub fn selections(&self) -> &BTreeMap<String, String> {
        &self.selections
    }

    /// カードを選択する。空文字列は選択解除を意味する。
    ///
    /// カードがルームの設定に含まれるかどうかはここでは検証しない。
    pub fn select(&mut self, row: &str, card: &str) {
        if card.is_empty() {
            self.deselect(row);
            return;
        }
        self.selections.insert(row.to_string(), card.to_string());
    }

    pub fn deselect(&mut self, row: &str) {
        self.selections.remove(row);
    }

    pub fn clear_selections(&mut self) {
        self.selections.clear();
    }

    /// Participant ↔ Watcher を切り替える。Watcher になる時は選択を全て解除する。
    pub fn toggle_role(&mut self) {
        self.role = self.role.toggled();
        if !self.role.contributes() {
            self.clear_selections();
        }
    }

    pub fn toggle_secondary(&mut self) {
        self.is_qa = !self.is_qa;
    }

    /// 全ての row について選択済みかどうか
    pub fn is_ready(&self, rows: &[String]) -> bool {
        rows.iter().all(|row| self.selection(row).is_some())
    }

    /// 接続を紐付ける
    ///
    /// 未受領のメールボックスがあればそれを渡し、既に他の接続が受領済みなら
    /// 新しいメールボックスに差し替える（古い接続の受信側は閉じられる）。
    /// 閉じられた参加者には `None` を返す。
    pub fn attach(&mut self) -> Option<(MailboxReceiver, u64)> {
        if self.is_closed() {
            return None;
        }

        let receiver = match self.inbox.take() {
            Some(mut receiver) => {
                receiver.drain();
                receiver
            }
            None => {
                let (tx, rx) = mailbox();
                self.mailbox = Some(tx);
                rx
            }
        };

        self.epoch += 1;
        self.active = true;
        Some((receiver, self.epoch))
    }

    /// 接続を切り離す。`epoch` が最新の接続のものでなければ何もしない。
    pub fn detach(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.active = false;
        true
    }

    pub fn mailbox(&self) -> Option<&MailboxSender> {
        self.mailbox.as_ref()
    }

    /// 非アクティブにし、メールボックスを解放する（冪等）
    pub fn close(&mut self) {
        self.active = false;
        self.mailbox = None;
        self.inbox = None;
    }

    pub fn view(&self, rows: &[String]) -> ParticipantView {
        ParticipantView {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role,
            is_qa: self.is_qa,
            active: self.active,
            ready: self.is_ready(rows),
            selections: self.selections.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{mailbox::Delivery, value_object::ParticipantIdFactory};
    use std::time::Duration;

    fn create_participant(role: Role) -> Participant {
        Participant::new(
            ParticipantIdFactory::generate(),
            "alice".to_string(),
            role,
            false,
        )
    }

    fn rows(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_new_participant_is_inactive_without_selections() {
        // テスト項目: 作成直後の参加者は未接続で、選択を持たない
        // given (前提条件):

        // when (操作):
        let participant = create_participant(Role::Participant);

        // then (期待する結果):
        assert!(!participant.is_active());
        assert!(!participant.is_closed());
        assert!(participant.selections().is_empty());
    }

    #[test]
    fn test_select_with_empty_card_clears_selection() {
        // テスト項目: 空文字列のカード選択は選択解除として扱われる
        // given (前提条件):
        let mut participant = create_participant(Role::Participant);
        participant.select("", "5");

        // when (操作):
        participant.select("", "");

        // then (期待する結果):
        assert_eq!(participant.selection(""), None);
    }

    #[test]
    fn test_deselect_removes_only_given_row() {
        // テスト項目: 選択解除は指定した row だけに作用する
        // given (前提条件):
        let mut participant = create_participant(Role::Participant);
        participant.select("Complexity", "3");
        participant.select("Risk", "5");

        // when (操作):
        participant.deselect("Risk");

        // then (期待する結果):
        assert_eq!(participant.selection("Complexity"), Some("3"));
        assert_eq!(participant.selection("Risk"), None);
    }

    #[test]
    fn test_toggle_role_to_watcher_clears_selections() {
        // テスト項目: Watcher への切り替えで選択が全て解除される
        // given (前提条件):
        let mut participant = create_participant(Role::Participant);
        participant.select("", "8");

        // when (操作):
        participant.toggle_role();

        // then (期待する結果):
        assert_eq!(participant.role(), Role::Watcher);
        assert!(participant.selections().is_empty());
    }

    #[test]
    fn test_toggle_role_back_to_participant_keeps_state() {
        // テスト項目: Participant へ戻る切り替えでは選択は変化しない
        // given (前提条件):
        let mut participant = create_participant(Role::Watcher);

        // when (操作):
        participant.toggle_role();
        participant.select("", "2");

        // then (期待する結果):
        assert_eq!(participant.role(), Role::Participant);
        assert_eq!(participant.selection(""), Some("2"));
    }

    #[test]
    fn test_toggle_secondary_flips_flag() {
        // テスト項目: QA フラグの切り替え
        // given (前提条件):
        let mut participant = create_participant(Role::Participant);

        // when (操作):
        participant.toggle_secondary();

        // then (期待する結果):
        assert!(participant.is_qa());
    }

    #[test]
    fn test_is_ready_requires_every_row() {
        // テスト項目: 全ての row を選択した時だけ ready になる
        // given (前提条件):
        let rows = rows(&["Complexity", "Risk"]);
        let mut participant = create_participant(Role::Participant);
        participant.select("Complexity", "3");

        // when (操作):
        let before = participant.is_ready(&rows);
        participant.select("Risk", "1");
        let after = participant.is_ready(&rows);

        // then (期待する結果):
        assert!(!before);
        assert!(after);
    }

    #[test]
    fn test_attach_marks_active_and_increments_epoch() {
        // テスト項目: 接続の紐付けでアクティブになり、epoch が進む
        // given (前提条件):
        let mut participant = create_participant(Role::Participant);

        // when (操作):
        let (_rx1, first) = participant.attach().unwrap();
        let (_rx2, second) = participant.attach().unwrap();

        // then (期待する結果):
        assert!(participant.is_active());
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_detach_with_stale_epoch_is_ignored() {
        // テスト項目: 古い接続の切断では新しい接続のアクティブ状態は変わらない
        // given (前提条件):
        let mut participant = create_participant(Role::Participant);
        let (_old_rx, old_epoch) = participant.attach().unwrap();
        let (_new_rx, new_epoch) = participant.attach().unwrap();

        // when (操作):
        let stale = participant.detach(old_epoch);

        // then (期待する結果):
        assert!(!stale);
        assert!(participant.is_active());
        assert!(participant.detach(new_epoch));
        assert!(!participant.is_active());
    }

    #[tokio::test]
    async fn test_reattach_closes_previous_receiver() {
        // テスト項目: 再接続すると以前の接続の受信側は閉じられる
        // given (前提条件):
        let mut participant = create_participant(Role::Participant);
        let (mut old_rx, _) = participant.attach().unwrap();

        // when (操作):
        let (_new_rx, _) = participant.attach().unwrap();

        // then (期待する結果):
        assert_eq!(old_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_releases_mailbox() {
        // テスト項目: close は冪等で、メールボックスを解放する
        // given (前提条件):
        let mut participant = create_participant(Role::Participant);
        let (mut rx, _) = participant.attach().unwrap();
        let sender = participant.mailbox().cloned().unwrap();

        // when (操作):
        participant.close();
        participant.close();
        drop(sender);

        // then (期待する結果):
        assert!(!participant.is_active());
        assert!(participant.is_closed());
        assert!(participant.attach().is_none());
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_attach_discards_notifications_sent_before_connect() {
        // テスト項目: 接続前に溜まった通知は接続時に破棄される
        // given (前提条件):
        let mut participant = create_participant(Role::Participant);
        let sender = participant.mailbox().cloned().unwrap();
        assert_eq!(
            sender.notify(Duration::from_millis(10)).await,
            Delivery::Delivered
        );

        // when (操作):
        let (_rx, _) = participant.attach().unwrap();

        // then (期待する結果):
        assert_eq!(
            sender.notify(Duration::from_millis(10)).await,
            Delivery::Delivered
        );
    }
}
