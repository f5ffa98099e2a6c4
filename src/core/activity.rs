use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// 「有互動操作進行中」計數器。
///
/// 背景更新在計數不為 0 時暫停。拖曳期間持有 [`ActivityGuard`]，
/// guard 被 drop 時恰好遞減一次。
#[derive(Debug, Clone, Default)]
pub struct ActivitySuppressor {
    count: Arc<AtomicUsize>,
}

static GLOBAL: OnceLock<ActivitySuppressor> = OnceLock::new();

impl ActivitySuppressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整個程序共用的計數器
    pub fn global() -> &'static ActivitySuppressor {
        GLOBAL.get_or_init(ActivitySuppressor::new)
    }

    pub fn increment(&self) {
        let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!("Activity count incremented to {}", count);
    }

    /// 計數停在 0，不會下溢
    pub fn decrement(&self) {
        let previous = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| c.checked_sub(1));
        match previous {
            Ok(c) => tracing::trace!("Activity count decremented to {}", c - 1),
            Err(_) => tracing::warn!("⚠️ Unpaired activity decrement ignored"),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn is_suppressed(&self) -> bool {
        self.count() > 0
    }

    pub fn guard(&self) -> ActivityGuard {
        self.increment();
        ActivityGuard {
            suppressor: self.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ActivityGuard {
    suppressor: ActivitySuppressor,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.suppressor.decrement();
    }
}
