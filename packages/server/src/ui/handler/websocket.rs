//! WebSocket connection handlers.
//!
//! 1 本の接続につき 2 つのタスクを動かす。
//!
//! - reader: クライアントからのフレームを読み、ライブ更新として適用する
//! - updater: メールボックスに通知が届くたびにルームの状態を送る
//!
//! どちらかが終わると接続のキャンセルスコープをキャンセルし、もう一方を終了させる。

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{Attachment, MailboxReceiver, ParticipantId, RoomCommand, RoomHandle, RoomId},
    infrastructure::dto::websocket::{LiveUpdateMessage, RoomStateDto, ServerMessage},
    ui::state::AppState,
    usecase::{ApplyUpdateError, ConnectError},
};

use super::error::ApiError;

/// reader が先に終わった時、updater が未送信の通知を送り切るまで待つ時間
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

const FORCED_CLOSE_MESSAGE: &str = "Your connection has been forcibly closed";

const ROOM_GONE_MESSAGE: &str = "Room not found";

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path((room_id, participant_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let room_id = RoomId::try_from(room_id).map_err(|_| ApiError::room_not_found())?;
    let participant_id = ParticipantId::try_from(participant_id)
        .map_err(|_| ApiError::from(ConnectError::NotAMember))?;

    let room = state
        .connect_participant_usecase
        .authorize(&room_id, &participant_id)
        .await
        .inspect_err(|e| {
            tracing::warn!(
                "Rejected connection of '{}' to room '{}': {}",
                participant_id,
                room_id,
                e
            )
        })?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room, participant_id)))
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    room: Arc<RoomHandle>,
    participant_id: ParticipantId,
) {
    let (mut sender, receiver) = socket.split();

    let Attachment {
        mailbox,
        epoch,
        cancel,
        ..
    } = match state
        .connect_participant_usecase
        .execute(&room, &participant_id)
        .await
    {
        Ok(attachment) => attachment,
        Err(e) => {
            tracing::warn!("Failed to attach '{}': {}", participant_id, e);
            let notice = ServerMessage::error(e.to_string(), Some("/".to_string()));
            let _ = send_message(&mut sender, &notice).await;
            return;
        }
    };

    let (notice_tx, notice_rx) = mpsc::unbounded_channel();

    let mut update_task = tokio::spawn(update_loop(
        sender,
        room.clone(),
        participant_id.clone(),
        mailbox,
        notice_rx,
        cancel.clone(),
    ));
    let mut reader_task = tokio::spawn(reader_loop(
        receiver,
        state.clone(),
        room.id.clone(),
        participant_id.clone(),
        notice_tx,
        cancel.clone(),
    ));

    tokio::select! {
        _ = &mut reader_task => {
            cancel.cancel();
            if tokio::time::timeout(FLUSH_TIMEOUT, &mut update_task).await.is_err() {
                update_task.abort();
            }
        }
        _ = &mut update_task => {
            cancel.cancel();
            reader_task.abort();
        }
    }

    state
        .disconnect_participant_usecase
        .execute(&room, &participant_id, epoch)
        .await;
}

/// クライアントからのフレームを読み、ライブ更新として適用する
///
/// 接続だけに返すエラーは `notices` 経由で updater に渡す。
async fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    room_id: RoomId,
    participant_id: ParticipantId,
    notices: mpsc::UnboundedSender<ServerMessage>,
    cancel: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = receiver.next() => frame,
        };
        let message = match frame {
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                tracing::debug!("WebSocket error from '{}': {}", participant_id, e);
                break;
            }
            None => break,
        };

        match message {
            Message::Text(text) => {
                let update = match serde_json::from_str::<LiveUpdateMessage>(&text) {
                    Ok(update) => update,
                    Err(e) => {
                        tracing::warn!("Malformed update from '{}': {}", participant_id, e);
                        let _ = notices.send(ServerMessage::error(
                            "An error occurred while reading the update",
                            None,
                        ));
                        continue;
                    }
                };

                let commands: Vec<RoomCommand> = update.into();
                match state
                    .apply_update_usecase
                    .execute(&room_id, &participant_id, &commands)
                    .await
                {
                    Ok(()) => {}
                    Err(ApplyUpdateError::RoomNotFound) => {
                        let _ = notices.send(room_gone());
                        break;
                    }
                    Err(ApplyUpdateError::Rejected(e)) => {
                        tracing::warn!("Rejected update from '{}': {}", participant_id, e);
                        let _ = notices.send(ServerMessage::error(e.to_string(), None));
                    }
                }
            }
            Message::Close(_) => {
                tracing::debug!("Participant '{}' requested close", participant_id);
                break;
            }
            _ => {}
        }
    }
}

/// 最初に現在の状態を送り、以後は通知のたびに状態を送る
///
/// リダイレクト付きのエラーは接続を終える通知で、1 本の接続につき 1 回だけ送る。
async fn update_loop(
    mut sender: SplitSink<WebSocket, Message>,
    room: Arc<RoomHandle>,
    participant_id: ParticipantId,
    mut mailbox: MailboxReceiver,
    mut notices: mpsc::UnboundedReceiver<ServerMessage>,
    cancel: CancellationToken,
) {
    if push_state(&mut sender, &room, &participant_id).await.is_err() {
        return;
    }

    let mut notices_open = true;
    loop {
        tokio::select! {
            biased;
            notice = notices.recv(), if notices_open => match notice {
                Some(notice) => {
                    let terminal = notice.is_terminal();
                    if send_message(&mut sender, &notice).await.is_err() || terminal {
                        break;
                    }
                }
                None => notices_open = false,
            },
            update = mailbox.recv() => match update {
                Some(()) => {
                    if push_state(&mut sender, &room, &participant_id).await.is_err() {
                        break;
                    }
                }
                None => {
                    let _ = send_message(&mut sender, &closing_notice(&room)).await;
                    break;
                }
            },
            _ = cancel.cancelled() => {
                if room.is_closed() {
                    let _ = send_message(&mut sender, &room_gone()).await;
                }
                break;
            }
        }
    }

    let _ = sender.close().await;
}

/// メールボックスが閉じられた接続に送る最後の通知
///
/// ルーム自体が閉じられていればトップページへ、参加者の削除や再接続による
/// 切り離しであればルームのページへ誘導する。
fn closing_notice(room: &RoomHandle) -> ServerMessage {
    if room.is_closed() {
        room_gone()
    } else {
        ServerMessage::error(FORCED_CLOSE_MESSAGE, Some(format!("/rooms/{}", room.id)))
    }
}

fn room_gone() -> ServerMessage {
    ServerMessage::error(ROOM_GONE_MESSAGE, Some("/".to_string()))
}

async fn push_state(
    sender: &mut SplitSink<WebSocket, Message>,
    room: &RoomHandle,
    participant_id: &ParticipantId,
) -> Result<(), axum::Error> {
    let snapshot = room.snapshot(Some(participant_id)).await;
    let message = ServerMessage::RoomState(RoomStateDto::from(snapshot));
    send_message(sender, &message).await
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await
}
