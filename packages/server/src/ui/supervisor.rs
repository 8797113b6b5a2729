//! Timeout Supervisor
//!
//! 二つの周期タスクを動かします。
//!
//! - 期限切れの掃除: `sweep_interval` ごとに、受諾期限を過ぎた `pending` のリクエストを
//!   `MatchingCoordinator::expire_overdue` で期限切れにする（ユーザー操作と同じ CAS 経路）
//! - 保持期間の掃除: `retention_sweep_interval` ごとに、保持期間を過ぎた通知と
//!   終了したリクエストを削除する

use std::sync::Arc;

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

use crate::usecase::{MatchingConfig, MatchingCoordinator, NotificationDispatcher};

pub struct TimeoutSupervisor {
    coordinator: Arc<MatchingCoordinator>,
    dispatcher: Arc<NotificationDispatcher>,
    config: MatchingConfig,
}

/// 起動中の周期タスク。drop すると停止する
pub struct SupervisorHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl SupervisorHandle {
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for SupervisorHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl TimeoutSupervisor {
    pub fn new(
        coordinator: Arc<MatchingCoordinator>,
        dispatcher: Arc<NotificationDispatcher>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            coordinator,
            dispatcher,
            config,
        }
    }

    /// 期限を過ぎたリクエストを一度だけ掃除する
    pub async fn sweep_expired(&self) -> usize {
        let expired = self.coordinator.expire_overdue().await;
        if !expired.is_empty() {
            tracing::info!("Expired {} ride requests", expired.len());
        }
        expired.len()
    }

    /// 保持期間を過ぎた通知を一度だけ削除する
    pub async fn sweep_notifications(&self) -> usize {
        self.dispatcher
            .purge_older_than(self.config.notification_retention)
            .await
    }

    /// 終了してから保持期間を過ぎたリクエストを一度だけ削除する
    pub async fn sweep_finished_rides(&self) -> usize {
        self.coordinator.purge_finished().await
    }

    /// 周期タスクを起動する
    pub fn spawn(self) -> SupervisorHandle {
        let supervisor = Arc::new(self);
        tracing::info!(
            "Timeout supervisor started (timeout {:?}, sweep every {:?})",
            supervisor.config.request_timeout,
            supervisor.config.sweep_interval
        );

        let expiry = {
            let supervisor = supervisor.clone();
            tokio::spawn(async move {
                let mut ticker = interval(supervisor.config.sweep_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    supervisor.sweep_expired().await;
                }
            })
        };

        let retention = tokio::spawn(async move {
            let mut ticker = interval(supervisor.config.retention_sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                supervisor.sweep_notifications().await;
                supervisor.sweep_finished_rides().await;
            }
        });

        SupervisorHandle {
            tasks: vec![expiry, retention],
        }
    }
}
