//! Conversion logic between DTOs and domain entities.

use yoriai_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    Distribution, ParticipantView, RoomCommand, RoomConfig, RoomSnapshot, RowResult, Timestamp,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl From<dto::LiveUpdateMessage> for Vec<RoomCommand> {
    /// `reset` がある場合は他の項目を無視する
    fn from(message: dto::LiveUpdateMessage) -> Self {
        if message.reset {
            return vec![RoomCommand::Reset];
        }

        let mut commands = Vec::new();
        let dimension = message.row;
        match message.card {
            Some(card) if !card.is_empty() && !message.undo => {
                commands.push(RoomCommand::Select { dimension, card })
            }
            Some(_) => commands.push(RoomCommand::Deselect { dimension }),
            None if message.undo => commands.push(RoomCommand::Deselect { dimension }),
            None => {}
        }
        if message.toggle_qa {
            commands.push(RoomCommand::ToggleSecondary);
        }
        if message.toggle_role {
            commands.push(RoomCommand::ToggleRole);
        }
        if message.reveal {
            commands.push(RoomCommand::Reveal);
        }
        commands
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<RoomSnapshot> for dto::RoomStateDto {
    fn from(snapshot: RoomSnapshot) -> Self {
        let RoomSnapshot {
            room_id,
            config,
            showing,
            all_selected,
            participants,
            results,
            viewer,
        } = snapshot;

        let viewer_id = viewer.as_ref().map(|v| v.id.clone());
        let state_of = |view: &ParticipantView| {
            let is_you = viewer_id.as_ref() == Some(&view.id);
            participant_state(view, is_you, showing || is_you)
        };

        Self {
            room_id: room_id.into_string(),
            participants: participants.iter().map(state_of).collect(),
            you: viewer.as_ref().map(state_of),
            results: results.map(|rows| {
                rows.iter()
                    .map(|row| row_result(row, config.map_to_fibonacci()))
                    .collect()
            }),
            cards: config.cards().to_vec(),
            rows: config.rows().to_vec(),
            map_to_fibonacci: config.map_to_fibonacci(),
            showing,
            can_reveal: all_selected,
        }
    }
}

fn participant_state(
    view: &ParticipantView,
    is_you: bool,
    show_cards: bool,
) -> dto::ParticipantStateDto {
    dto::ParticipantStateDto {
        name: view.name.clone(),
        role: view.role.as_str().to_string(),
        qa: view.is_qa,
        active: view.active,
        ready: view.ready,
        is_you,
        selections: if show_cards {
            view.selections.clone()
        } else {
            Default::default()
        },
    }
}

fn row_result(row: &RowResult, map_to_fibonacci: bool) -> dto::RowResultDto {
    dto::RowResultDto {
        name: row.name().to_string(),
        overall: distribution(row.overall(), map_to_fibonacci),
        primary: distribution(row.primary(), map_to_fibonacci),
        secondary: distribution(row.secondary(), map_to_fibonacci),
    }
}

fn distribution(distribution: &Distribution, map_to_fibonacci: bool) -> dto::DistributionDto {
    dto::DistributionDto {
        count: distribution.count(),
        average: distribution.any().then(|| distribution.formatted_average()),
        histogram: distribution.histogram(),
        fibonacci_range: if map_to_fibonacci {
            distribution.fibonacci_range()
        } else {
            None
        },
    }
}

impl From<&ParticipantView> for http::ParticipantDetailDto {
    fn from(view: &ParticipantView) -> Self {
        Self {
            name: view.name.clone(),
            role: view.role.as_str().to_string(),
            qa: view.is_qa,
            active: view.active,
            ready: view.ready,
        }
    }
}

impl http::RoomCreatedDto {
    pub fn new(
        room_id: String,
        config: &RoomConfig,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            room_id,
            cards: config.cards().to_vec(),
            rows: config.rows().to_vec(),
            map_to_fibonacci: config.map_to_fibonacci(),
            created_at: timestamp_to_rfc3339(created_at.value()),
            expires_at: timestamp_to_rfc3339(expires_at.value()),
        }
    }
}

impl http::RoomDetailDto {
    pub fn new(snapshot: RoomSnapshot, created_at: Timestamp, expires_at: Timestamp) -> Self {
        Self {
            id: snapshot.room_id.into_string(),
            cards: snapshot.config.cards().to_vec(),
            rows: snapshot.config.rows().to_vec(),
            map_to_fibonacci: snapshot.config.map_to_fibonacci(),
            showing: snapshot.showing,
            participants: snapshot.participants.iter().map(Into::into).collect(),
            created_at: timestamp_to_rfc3339(created_at.value()),
            expires_at: timestamp_to_rfc3339(expires_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Room, RoomIdFactory, Role};

    fn commands_of(json: &str) -> Vec<RoomCommand> {
        let message: dto::LiveUpdateMessage = serde_json::from_str(json).unwrap();
        message.into()
    }

    #[test]
    fn test_card_becomes_select() {
        // テスト項目: カードの指定は Select コマンドになる
        // given (前提条件):
        let json = r#"{"card": "5", "row": "Risk"}"#;

        // when (操作):
        let commands = commands_of(json);

        // then (期待する結果):
        assert_eq!(
            commands,
            vec![RoomCommand::Select {
                dimension: "Risk".to_string(),
                card: "5".to_string(),
            }]
        );
    }

    #[test]
    fn test_undo_becomes_deselect() {
        // テスト項目: undo 付きのカード指定は Deselect コマンドになる
        // given (前提条件):
        let json = r#"{"card": "5", "undo": true}"#;

        // when (操作):
        let commands = commands_of(json);

        // then (期待する結果):
        assert_eq!(
            commands,
            vec![RoomCommand::Deselect {
                dimension: String::new(),
            }]
        );
    }

    #[test]
    fn test_reset_short_circuits_frame() {
        // テスト項目: reset を含むフレームは他の項目を無視する
        // given (前提条件):
        let json = r#"{"card": "5", "reveal": true, "reset": true}"#;

        // when (操作):
        let commands = commands_of(json);

        // then (期待する結果):
        assert_eq!(commands, vec![RoomCommand::Reset]);
    }

    #[test]
    fn test_toggles_and_reveal_are_kept_in_order() {
        // テスト項目: トグルと公開の指定がそれぞれコマンドになる
        // given (前提条件):
        let json = r#"{"toggle_role": true, "toggle_qa": true, "reveal": true}"#;

        // when (操作):
        let commands = commands_of(json);

        // then (期待する結果):
        assert_eq!(
            commands,
            vec![
                RoomCommand::ToggleSecondary,
                RoomCommand::ToggleRole,
                RoomCommand::Reveal,
            ]
        );
    }

    #[test]
    fn test_room_state_hides_other_cards_until_revealed() {
        // テスト項目: 未公開の間は他の参加者のカードが隠され、自分のカードは見える
        // given (前提条件):
        let mut room = Room::new(
            RoomIdFactory::generate(),
            RoomConfig::default(),
            Timestamp::new(0),
        );
        let alice = room.join("alice".to_string(), Role::Participant, false).id.clone();
        let bob = room.join("bob".to_string(), Role::Participant, false).id.clone();
        for (id, card) in [(&alice, "3"), (&bob, "5")] {
            room.apply(
                id,
                &[RoomCommand::Select {
                    dimension: String::new(),
                    card: card.to_string(),
                }],
            )
            .unwrap();
        }

        // when (操作):
        let state = dto::RoomStateDto::from(room.snapshot(Some(&alice)));

        // then (期待する結果):
        assert!(state.can_reveal);
        assert!(state.results.is_none());
        let you = state.you.expect("viewer");
        assert!(you.is_you);
        assert_eq!(you.selections.get(""), Some(&"3".to_string()));
        let other = state
            .participants
            .iter()
            .find(|p| p.name == "bob")
            .expect("bob");
        assert!(!other.is_you);
        assert!(other.selections.is_empty());
    }

    #[test]
    fn test_room_state_reports_fibonacci_range_when_revealed() {
        // テスト項目: 公開後は結果に平均値とフィボナッチ範囲が含まれる
        // given (前提条件):
        let mut room = Room::new(
            RoomIdFactory::generate(),
            RoomConfig::default(),
            Timestamp::new(0),
        );
        let alice = room.join("alice".to_string(), Role::Participant, false).id.clone();
        room.connect(&alice).unwrap();
        room.apply(
            &alice,
            &[
                RoomCommand::Select {
                    dimension: String::new(),
                    card: "3".to_string(),
                },
                RoomCommand::Reveal,
            ],
        )
        .unwrap();

        // when (操作):
        let state = dto::RoomStateDto::from(room.snapshot(None));

        // then (期待する結果):
        let results = state.results.expect("revealed");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].overall.average.as_deref(), Some("3"));
        assert_eq!(results[0].overall.fibonacci_range.as_deref(), Some("3 - 5"));
        assert_eq!(results[0].secondary.average, None);
        assert_eq!(results[0].secondary.count, 0);
    }
}
