use crate::core::activity::{ActivityGuard, ActivitySuppressor};
use crate::core::confirmation::{Confirmation, ConfirmationGate, ConfirmationHandle};
use crate::core::drop_zone::{can_accept, DropZoneRegistry};
use crate::core::scroll::compute_scroll;
use crate::domain::model::{lock_board, Bounds, CardId, ContainerId, DragSession, SharedBoard};
use crate::domain::ports::Viewport;
use crate::utils::error::{BoardError, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// 拖曳開始時收到卡片的 issue
pub type DragStartCallback = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

/// 跨欄位放置時收到 issue 與確認用的 handle；可以在這裡開啟確認對話框
pub type AcceptCallback = Arc<dyn Fn(&serde_json::Value, ConfirmationHandle) + Send + Sync>;

pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct DragSettings {
    /// `None` 表示一直等到對話框回答
    pub confirmation_timeout: Option<Duration>,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            confirmation_timeout: Some(DEFAULT_CONFIRMATION_TIMEOUT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Dragging,
    PendingConfirmation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    /// 放開時不在任何有效的欄位上
    NoTarget,
    /// 目標就是卡片目前所在的欄位
    SameContainer { container: ContainerId },
    Committed { target: ContainerId },
    Declined {
        target: ContainerId,
        confirmation: Confirmation,
    },
}

struct ActiveDrag {
    session: DragSession,
    _activity: ActivityGuard,
}

/// 等待確認期間的狀態；future 被丟棄時也會回到 Idle
struct PendingPhase<'a> {
    phase: &'a watch::Sender<DragPhase>,
}

impl<'a> PendingPhase<'a> {
    fn enter(phase: &'a watch::Sender<DragPhase>) -> Self {
        phase.send_replace(DragPhase::PendingConfirmation);
        Self { phase }
    }
}

impl Drop for PendingPhase<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(DragPhase::Idle);
    }
}

pub struct DragController<V: Viewport> {
    board: SharedBoard,
    viewport: V,
    zones: DropZoneRegistry,
    draggables: HashMap<CardId, DragStartCallback>,
    suppressor: ActivitySuppressor,
    settings: DragSettings,
    phase: watch::Sender<DragPhase>,
    active: Option<ActiveDrag>,
}

impl<V: Viewport> DragController<V> {
    pub fn new(board: SharedBoard, viewport: V, suppressor: ActivitySuppressor) -> Self {
        let (phase, _) = watch::channel(DragPhase::Idle);
        Self {
            board,
            viewport,
            zones: DropZoneRegistry::new(),
            draggables: HashMap::new(),
            suppressor,
            settings: DragSettings::default(),
            phase,
            active: None,
        }
    }

    pub fn with_settings(mut self, settings: DragSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn suppressor(&self) -> &ActivitySuppressor {
        &self.suppressor
    }

    pub fn phase(&self) -> DragPhase {
        *self.phase.borrow()
    }

    /// 訂閱階段變化。`release` 等待確認時持有 `&mut self`，
    /// 只有透過這個 receiver 才看得到 `PendingConfirmation`。
    pub fn watch_phase(&self) -> watch::Receiver<DragPhase> {
        self.phase.subscribe()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    pub fn register_drop_zone(
        &mut self,
        container: impl Into<ContainerId>,
        on_accept: Option<AcceptCallback>,
    ) -> bool {
        self.zones.register(container, on_accept)
    }

    /// 沒有回呼的卡片不可拖曳
    pub fn register_draggable(
        &mut self,
        card: impl Into<CardId>,
        on_drag_start: Option<DragStartCallback>,
    ) -> bool {
        let card = card.into();
        match on_drag_start {
            Some(callback) => {
                self.draggables.insert(card, callback);
                true
            }
            None => {
                self.draggables.remove(&card);
                false
            }
        }
    }

    /// Idle -> Dragging。`card_left` 是卡片目前的左緣，helper 以同樣寬度複製出來。
    pub fn start_drag(&mut self, card: &str, card_left: f64) -> Result<()> {
        if let Some(active) = &self.active {
            return Err(BoardError::DragInProgress {
                card: active.session.card.clone(),
            });
        }
        let on_start = self
            .draggables
            .get(card)
            .cloned()
            .ok_or_else(|| BoardError::NotDraggable {
                card: card.to_string(),
            })?;

        let (issue, origin, width) = {
            let mut board = lock_board(&self.board)?;
            let found = board.card(card).ok_or_else(|| BoardError::UnknownCard {
                card: card.to_string(),
            })?;
            let info = (found.issue.clone(), found.container.clone(), found.width);
            board.set_dragging(card, true);
            info
        };

        let session = DragSession {
            card: card.to_string(),
            issue: issue.clone(),
            origin,
            helper: Bounds::new(card_left, width),
            content_width: self.viewport.content_width(),
            dropped_target: None,
            started_at: Utc::now(),
        };
        tracing::info!(
            "🖐️ Drag started: card {} from {} (content width {})",
            session.card,
            session.origin,
            session.content_width
        );

        self.active = Some(ActiveDrag {
            session,
            _activity: self.suppressor.guard(),
        });
        self.phase.send_replace(DragPhase::Dragging);

        on_start(&issue);
        Ok(())
    }

    /// 指標移動：helper 移到 `helper_left`，必要時捲動容器。回傳套用後的捲動位移。
    pub fn drag_move(&mut self, helper_left: f64) -> Result<f64> {
        let active = self.active.as_mut().ok_or(BoardError::NoActiveDrag)?;
        active.session.helper.left = helper_left;

        let current = self.viewport.scroll_offset();
        let offset = compute_scroll(
            self.viewport.bounds(),
            active.session.helper,
            current,
            active.session.content_width,
        );
        if offset != current {
            tracing::debug!("Auto-scroll {} -> {}", current, offset);
            self.viewport.set_scroll_offset(offset);
        }
        Ok(offset)
    }

    /// 放開點位於 `target` 上。只有已註冊、目前可放置、且不是原欄位的容器才會被記錄。
    pub fn drop_on(&mut self, target: &str) -> Result<bool> {
        let active = self.active.as_mut().ok_or(BoardError::NoActiveDrag)?;

        // 先清掉舊的目標，失敗時也不會留下上一次的放開點
        active.session.dropped_target = None;
        let valid = if self.zones.is_registered(target) {
            let board = lock_board(&self.board)?;
            let container = board
                .container(target)
                .ok_or_else(|| BoardError::UnknownContainer {
                    container: target.to_string(),
                })?;
            container.droppable
                && target != active.session.origin
                && can_accept(&board, &active.session.card, target)
        } else {
            false
        };

        if valid {
            tracing::debug!("Drop target recorded: {}", target);
        } else {
            tracing::debug!("Ignoring drop on {}", target);
        }
        active.session.dropped_target = valid.then(|| target.to_string());
        Ok(valid)
    }

    /// 結束拖曳。跨欄位放置時會呼叫目標的接受回呼並等待確認。
    /// 不論結果為何，活動計數都只遞減一次，控制器回到 Idle。
    pub async fn release(&mut self) -> Result<DropOutcome> {
        let ActiveDrag { session, _activity } =
            self.active.take().ok_or(BoardError::NoActiveDrag)?;
        self.phase.send_replace(DragPhase::Idle);

        let current_owner = lock_board(&self.board)?
            .card(&session.card)
            .map(|c| c.container.clone());

        let target = match session.dropped_target.clone() {
            Some(target) if target != session.origin && current_owner.as_ref() != Some(&target) => {
                target
            }
            Some(target) => {
                clear_dragging(&self.board, &session.card)?;
                tracing::info!("↩️ Card {} released on its own column {}", session.card, target);
                return Ok(DropOutcome::SameContainer { container: target });
            }
            None => {
                clear_dragging(&self.board, &session.card)?;
                tracing::info!("↩️ Card {} released without a drop target", session.card);
                return Ok(DropOutcome::NoTarget);
            }
        };

        let Some(on_accept) = self.zones.on_accept(&target) else {
            clear_dragging(&self.board, &session.card)?;
            tracing::warn!("⚠️ Drop zone {} was unregistered before release", target);
            return Ok(DropOutcome::NoTarget);
        };

        let (handle, gate) = ConfirmationGate::open();
        tracing::info!("📥 Card {} dropped on {}; awaiting confirmation", session.card, target);
        on_accept(&session.issue, handle);

        let confirmation = {
            let _pending = PendingPhase::enter(&self.phase);
            gate.wait(self.settings.confirmation_timeout).await
        };

        clear_dragging(&self.board, &session.card)?;
        let elapsed = Utc::now() - session.started_at;
        if confirmation.is_accepted() {
            tracing::info!(
                "✅ Move of card {} to {} confirmed after {}ms",
                session.card,
                target,
                elapsed.num_milliseconds()
            );
            Ok(DropOutcome::Committed { target })
        } else {
            tracing::info!(
                "❌ Move of card {} to {} not confirmed ({:?})",
                session.card,
                target,
                confirmation
            );
            Ok(DropOutcome::Declined {
                target,
                confirmation,
            })
        }
    }
}

fn clear_dragging(board: &SharedBoard, card: &str) -> Result<()> {
    lock_board(board)?.set_dragging(card, false);
    Ok(())
}
