//! Room エンティティ
//!
//! 見積もりセッション 1 つ分の状態。参加者、カード・row の設定、結果の公開
//! フラグ、直近の集計結果を持つ。
//!
//! このエンティティ自体は同期的な純粋ロジックで、排他制御と通知は
//! [`RoomHandle`](crate::domain::handle::RoomHandle) が担う。

use std::collections::{HashMap, HashSet};

use crate::domain::{
    aggregation::{RowResult, SUMMARY_ROW},
    command::RoomCommand,
    distribution::{format_trimmed, parse_card_value},
    entity::participant::{Participant, ParticipantView},
    error::{RoomConfigError, RoomError},
    mailbox::{MailboxReceiver, MailboxSender},
    value_object::{ParticipantId, ParticipantIdFactory, RoomId, Role, Timestamp},
};

/// カード指定が無い場合のデフォルト
pub const DEFAULT_CARDS: [&str; 6] = ["1", "2", "3", "5", "8", "13"];

/// ルームの設定（作成後は変更されない）
#[derive(Debug, Clone, PartialEq)]
pub struct RoomConfig {
    cards: Vec<String>,
    rows: Vec<String>,
    map_to_fibonacci: bool,
}

impl RoomConfig {
    /// 設定を検証して作成する
    ///
    /// - カードは前後の空白を除去し、空の項目と重複を取り除く
    /// - 有限かつ 0 以上の数値として解釈できないカードがあれば、その全てを
    ///   エラーとして返す
    /// - row が 1 つも無ければ無名の row を 1 つ持つ
    pub fn new(
        cards: Vec<String>,
        rows: Vec<String>,
        map_to_fibonacci: bool,
    ) -> Result<Self, RoomConfigError> {
        let cards = normalize_labels(cards);
        if cards.is_empty() {
            return Err(RoomConfigError::NoCards);
        }

        let invalid: Vec<String> = cards
            .iter()
            .filter(|card| !parse_card_value(card).is_some_and(|value| value >= 0.0))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            return Err(RoomConfigError::InvalidCards(invalid));
        }

        let mut rows = normalize_labels(rows);
        if rows.is_empty() {
            rows.push(String::new());
        }

        Ok(Self {
            cards,
            rows,
            map_to_fibonacci,
        })
    }

    /// カンマ区切りの入力を項目に分割する
    pub fn split_list(input: &str) -> Vec<String> {
        input.split(',').map(str::to_string).collect()
    }

    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn map_to_fibonacci(&self) -> bool {
        self.map_to_fibonacci
    }

    pub fn has_card(&self, card: &str) -> bool {
        self.cards.iter().any(|c| c == card)
    }

    pub fn has_row(&self, row: &str) -> bool {
        self.rows.iter().any(|r| r == row)
    }

    pub fn is_multi_row(&self) -> bool {
        self.rows.len() > 1
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            cards: DEFAULT_CARDS.iter().map(|c| c.to_string()).collect(),
            rows: vec![String::new()],
            map_to_fibonacci: true,
        }
    }
}

fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

/// 1 人の閲覧者に向けて描画するためのルーム状態のコピー
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub config: RoomConfig,
    pub showing: bool,
    /// 公開ボタンを出すかどうか
    pub all_selected: bool,
    pub participants: Vec<ParticipantView>,
    /// 未公開なら `None`
    pub results: Option<Vec<RowResult>>,
    pub viewer: Option<ParticipantView>,
}

/// ルーム
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    config: RoomConfig,
    showing: bool,
    participants: HashMap<ParticipantId, Participant>,
    /// 直近の完全な集計結果。全員が揃っていない間はこれを返す。
    last_results: Option<Vec<RowResult>>,
}

impl Room {
    pub fn new(id: RoomId, config: RoomConfig, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            config,
            showing: false,
            participants: HashMap::new(),
            last_results: None,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    pub fn set_showing(&mut self, showing: bool) {
        self.showing = showing;
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// 新しい参加者を登録する（接続はまだされていない）
    pub fn join(&mut self, name: String, role: Role, is_qa: bool) -> &Participant {
        let id = ParticipantIdFactory::generate();
        let participant = Participant::new(id.clone(), name, role, is_qa);
        self.participants.entry(id).or_insert(participant)
    }

    /// 参加者を閉じて削除する。存在しなければ何もしない。
    pub fn remove_participant(&mut self, id: &ParticipantId) -> bool {
        match self.participants.remove(id) {
            Some(mut participant) => {
                participant.close();
                true
            }
            None => false,
        }
    }

    /// 参加者に接続を紐付け、通知の受信側と接続の epoch を返す
    pub fn connect(&mut self, id: &ParticipantId) -> Result<(MailboxReceiver, u64), RoomError> {
        self.participants
            .get_mut(id)
            .and_then(Participant::attach)
            .ok_or_else(|| RoomError::NotAMember(id.to_string()))
    }

    /// 接続を切り離す。別の接続に置き換わっていれば何もしない。
    pub fn disconnect(&mut self, id: &ParticipantId, epoch: u64) -> bool {
        self.participants
            .get_mut(id)
            .is_some_and(|participant| participant.detach(epoch))
    }

    /// 全員（ロールや接続状態に関わらず）が全ての row を選択済みか
    pub fn all_selected(&self) -> bool {
        self.config.rows().iter().all(|row| {
            self.participants
                .values()
                .all(|participant| participant.selection(row).is_some())
        })
    }

    /// 集計結果を返す
    ///
    /// - 未公開なら `None`
    /// - 接続中の Participant の誰かが未選択の row があれば、直近の結果をそのまま返す
    /// - row が複数あれば、各参加者の合計値による "Summary" 行を先頭に追加する
    pub fn aggregate(&mut self) -> Option<Vec<RowResult>> {
        if !self.showing {
            return None;
        }

        let rows = self.config.rows();
        let contributors: Vec<&Participant> = self
            .participants
            .values()
            .filter(|participant| participant.contributes())
            .collect();

        let mut results = Vec::with_capacity(rows.len() + 1);
        for row in rows {
            let mut result = RowResult::new(row.as_str());
            for participant in &contributors {
                let Some(card) = participant.selection(row) else {
                    return self.last_results.clone();
                };
                result.add(card, participant.is_qa());
            }
            results.push(result);
        }

        if self.config.is_multi_row() {
            let mut summary = RowResult::new(SUMMARY_ROW);
            for participant in &contributors {
                let total: f64 = rows
                    .iter()
                    .filter_map(|row| participant.selection(row))
                    .map(|card| parse_card_value(card).unwrap_or(0.0))
                    .sum();
                summary.add(&format_trimmed(total), participant.is_qa());
            }
            results.insert(0, summary);
        }

        self.last_results = Some(results.clone());
        Some(results)
    }

    /// 表示順に並べた参加者一覧
    ///
    /// 接続中 → ロール（Participant が先）→ 名前 → ID の順。入力が同じなら
    /// 何度呼んでも同じ順序になる。
    pub fn ordered_participants(&self) -> Vec<ParticipantView> {
        let rows = self.config.rows();
        let mut views: Vec<ParticipantView> = self
            .participants
            .values()
            .map(|participant| participant.view(rows))
            .collect();

        views.sort_by(|a, b| {
            b.active
                .cmp(&a.active)
                .then_with(|| a.role.cmp(&b.role))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        views
    }

    /// 結果を隠し、キャッシュと全員の選択をクリアする
    pub fn reset(&mut self) {
        self.showing = false;
        self.last_results = None;
        for participant in self.participants.values_mut() {
            participant.clear_selections();
        }
    }

    /// 参加者からのコマンド列を検証し、全て有効な場合だけ適用する
    ///
    /// `Reset` を含む場合はそれ以外のコマンドを無視する。それ以外の場合、
    /// `Reveal` が含まれていなければ結果は非公開に戻る。
    pub fn apply(&mut self, id: &ParticipantId, commands: &[RoomCommand]) -> Result<(), RoomError> {
        if !self.participants.contains_key(id) {
            return Err(RoomError::NotAMember(id.to_string()));
        }
        for command in commands {
            self.validate(command)?;
        }

        if commands.contains(&RoomCommand::Reset) {
            self.reset();
            return Ok(());
        }

        let participant = self
            .participants
            .get_mut(id)
            .ok_or_else(|| RoomError::NotAMember(id.to_string()))?;
        for command in commands {
            match command {
                RoomCommand::Select { dimension, card } => participant.select(dimension, card),
                RoomCommand::Deselect { dimension } => participant.deselect(dimension),
                RoomCommand::ToggleRole => participant.toggle_role(),
                RoomCommand::ToggleSecondary => participant.toggle_secondary(),
                RoomCommand::Reveal | RoomCommand::Reset => {}
            }
        }

        self.set_showing(commands.contains(&RoomCommand::Reveal));
        Ok(())
    }

    fn validate(&self, command: &RoomCommand) -> Result<(), RoomError> {
        match command {
            RoomCommand::Select { dimension, card } => {
                if !self.config.has_row(dimension) {
                    return Err(RoomError::UnknownRow(dimension.clone()));
                }
                if !card.is_empty() && !self.config.has_card(card) {
                    return Err(RoomError::UnknownCard(card.clone()));
                }
                Ok(())
            }
            RoomCommand::Deselect { dimension } => {
                if !self.config.has_row(dimension) {
                    return Err(RoomError::UnknownRow(dimension.clone()));
                }
                Ok(())
            }
            RoomCommand::ToggleRole
            | RoomCommand::ToggleSecondary
            | RoomCommand::Reveal
            | RoomCommand::Reset => Ok(()),
        }
    }

    /// 通知対象のメールボックス一覧（閉じられた参加者は含まない）
    pub fn mailboxes(&self) -> Vec<(ParticipantId, MailboxSender)> {
        self.participants
            .values()
            .filter_map(|participant| {
                participant
                    .mailbox()
                    .map(|mailbox| (participant.id.clone(), mailbox.clone()))
            })
            .collect()
    }

    /// 全ての参加者を閉じる
    pub fn close_participants(&mut self) {
        for participant in self.participants.values_mut() {
            participant.close();
        }
    }

    /// 描画用の状態をコピーする
    pub fn snapshot(&mut self, viewer: Option<&ParticipantId>) -> RoomSnapshot {
        let results = self.aggregate();
        let rows = self.config.rows();
        RoomSnapshot {
            room_id: self.id.clone(),
            config: self.config.clone(),
            showing: self.showing,
            all_selected: self.all_selected(),
            participants: self.ordered_participants(),
            results,
            viewer: viewer
                .and_then(|id| self.participants.get(id))
                .map(|participant| participant.view(rows)),
        }
    }
}
