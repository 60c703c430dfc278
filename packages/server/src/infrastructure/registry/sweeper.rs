//! 失効したルームを定期的に除去するバックグラウンドタスク

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::domain::RoomRegistry;

/// 既定の sweep 間隔（60 秒）
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// `every` ごとに [`RoomRegistry::sweep`] を呼ぶタスクを起動する
///
/// `shutdown` がキャンセルされると終了する。
pub fn spawn_sweeper(
    registry: Arc<dyn RoomRegistry>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 最初の tick は即座に完了する
        interval.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let swept = registry.sweep().await;
                    if swept > 0 {
                        tracing::info!("Swept {} expired room(s)", swept);
                    }
                }
            }
        }
        tracing::debug!("Room sweeper stopped");
    })
}
