use serde::Serialize;
use std::time::Duration;
use tokio::sync::oneshot;

/// 確認對話框的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Accepted,
    Rejected,
    /// handle 在回答前就被丟棄
    Abandoned,
    TimedOut,
}

impl Confirmation {
    pub fn is_accepted(self) -> bool {
        matches!(self, Confirmation::Accepted)
    }
}

/// 交給確認對話框的一端，只能回答一次
#[derive(Debug)]
pub struct ConfirmationHandle {
    tx: oneshot::Sender<bool>,
}

impl ConfirmationHandle {
    /// 回傳 false 表示等待端已經不在了
    pub fn resolve(self, accepted: bool) -> bool {
        self.tx.send(accepted).is_ok()
    }

    pub fn accept(self) -> bool {
        self.resolve(true)
    }

    pub fn reject(self) -> bool {
        self.resolve(false)
    }
}

/// 等待外部確認的一端
#[derive(Debug)]
pub struct ConfirmationGate {
    rx: oneshot::Receiver<bool>,
}

impl ConfirmationGate {
    pub fn open() -> (ConfirmationHandle, ConfirmationGate) {
        let (tx, rx) = oneshot::channel();
        (ConfirmationHandle { tx }, ConfirmationGate { rx })
    }

    /// 等到對話框回答為止；`timeout` 為 `None` 時不設期限
    pub async fn wait(self, timeout: Option<Duration>) -> Confirmation {
        let decision = match timeout {
            Some(limit) => match tokio::time::timeout(limit, self.rx).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::warn!("⏰ Confirmation not resolved within {:?}", limit);
                    return Confirmation::TimedOut;
                }
            },
            None => self.rx.await,
        };

        match decision {
            Ok(true) => Confirmation::Accepted,
            Ok(false) => Confirmation::Rejected,
            Err(_) => Confirmation::Abandoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolved_before_wait() {
        let (handle, gate) = ConfirmationGate::open();
        assert!(handle.accept());
        assert_eq!(gate.wait(None).await, Confirmation::Accepted);
    }

    #[tokio::test]
    async fn test_resolved_later() {
        let (handle, gate) = ConfirmationGate::open();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.reject();
        });
        assert_eq!(gate.wait(Some(Duration::from_secs(5))).await, Confirmation::Rejected);
    }

    #[tokio::test]
    async fn test_dropped_handle_is_abandoned() {
        let (handle, gate) = ConfirmationGate::open();
        drop(handle);
        assert_eq!(gate.wait(None).await, Confirmation::Abandoned);
    }

    #[tokio::test]
    async fn test_times_out() {
        let (_handle, gate) = ConfirmationGate::open();
        let result = gate.wait(Some(Duration::from_millis(10))).await;
        assert_eq!(result, Confirmation::TimedOut);
        assert!(!result.is_accepted());
    }

    #[tokio::test]
    async fn test_resolve_after_gate_dropped() {
        let (handle, gate) = ConfirmationGate::open();
        drop(gate);
        assert!(!handle.accept());
    }
}
