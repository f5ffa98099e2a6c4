use crate::core::activity::ActivitySuppressor;
use crate::domain::ports::RefreshSink;
use crate::utils::error::Result;
use std::time::Duration;
use tokio::sync::watch;

/// 定期刷新看板；拖曳或確認進行中時跳過
pub struct LiveRefresher<S: RefreshSink> {
    sink: S,
    suppressor: ActivitySuppressor,
    interval: Duration,
}

impl<S: RefreshSink> LiveRefresher<S> {
    pub fn new(sink: S, suppressor: ActivitySuppressor, interval: Duration) -> Self {
        Self {
            sink,
            suppressor,
            interval,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 回傳這次是否真的刷新了
    pub async fn tick(&self) -> Result<bool> {
        if self.suppressor.is_suppressed() {
            tracing::debug!(
                "⏸️ Refresh skipped, {} interactive operation(s) in progress",
                self.suppressor.count()
            );
            return Ok(false);
        }
        self.sink.refresh().await?;
        Ok(true)
    }

    /// 持續刷新直到 shutdown 收到 true 或發送端關閉。刷新失敗只記錄，不中斷。
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        tracing::warn!("⚠️ Background refresh failed: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Live refresher stopped");
                        break;
                    }
                }
            }
        }
    }
}
