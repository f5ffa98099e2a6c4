use crate::adapters::viewport::MemoryViewport;
use crate::config::toml_config::{ConfirmDecision, ScenarioConfig, ScenarioStep};
use crate::core::activity::ActivitySuppressor;
use crate::core::confirmation::ConfirmationHandle;
use crate::core::controller::{AcceptCallback, DragController, DragStartCallback, DropOutcome};
use crate::core::refresh::LiveRefresher;
use crate::domain::model::{lock_board, Board, Bounds, CardId, SharedBoard};
use crate::domain::ports::{RefreshSink, Viewport};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// 單一步驟的結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepResult {
    Started { card: String },
    Scrolled { offset: f64 },
    DropEvaluated { column: String, recorded: bool },
    Released { outcome: DropOutcome },
    DroppableSet { column: String, droppable: bool },
    Refused { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: ScenarioStep,
    pub result: StepResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnLayout {
    pub id: String,
    pub droppable: bool,
    pub cards: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub board: String,
    pub generated_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
    pub columns: Vec<ColumnLayout>,
    pub scroll_offset: f64,
    pub activity_count: usize,
    /// 拖曳開始回呼收到的 issue
    pub drag_starts: Vec<serde_json::Value>,
    /// 接受回呼 (確認對話框) 收到的 issue
    pub confirmation_requests: Vec<serde_json::Value>,
    pub refreshes: usize,
}

/// 重播時代替外部的確認邏輯：依步驟設定回答，接受時把卡片移過去
#[derive(Clone, Default)]
struct SimulatedDialog {
    decision: Arc<Mutex<ConfirmDecision>>,
    dragged: Arc<Mutex<Option<CardId>>>,
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
    // 保留未回答的 handle，讓等待端逾時而不是立刻得到 Abandoned
    parked: Arc<Mutex<Vec<ConfirmationHandle>>>,
}

impl SimulatedDialog {
    /// 放開前記下這次要回答什麼，以及控制器實際拖曳中的卡片
    fn prepare(&self, decision: ConfirmDecision, dragged: Option<CardId>) {
        if let Ok(mut current) = self.decision.lock() {
            *current = decision;
        }
        if let Ok(mut current) = self.dragged.lock() {
            *current = dragged;
        }
    }

    /// 放開結束後，等待端已經不在，留著的 handle 沒有用處
    fn finish(&self) {
        if let Ok(mut dragged) = self.dragged.lock() {
            dragged.take();
        }
        let dropped = take_all(&self.parked).len();
        if dropped > 0 {
            tracing::debug!("Dropped {} unanswered confirmation(s)", dropped);
        }
    }

    fn callback_for(&self, board: SharedBoard, column: String) -> AcceptCallback {
        let dialog = self.clone();
        Arc::new(move |issue: &serde_json::Value, handle: ConfirmationHandle| {
            if let Ok(mut requests) = dialog.requests.lock() {
                requests.push(issue.clone());
            }
            let decision = dialog.decision.lock().map(|d| *d).unwrap_or_default();
            match decision {
                ConfirmDecision::Accept => {
                    let card = dialog.dragged.lock().ok().and_then(|c| c.clone());
                    let committed = card.is_some_and(|card| {
                        lock_board(&board)
                            .and_then(|mut b| b.transfer_card(&card, &column))
                            .map_err(|e| tracing::warn!("⚠️ Could not commit move: {}", e))
                            .is_ok()
                    });
                    handle.resolve(committed);
                }
                ConfirmDecision::Reject => {
                    handle.reject();
                }
                ConfirmDecision::Never => {
                    if let Ok(mut parked) = dialog.parked.lock() {
                        parked.push(handle);
                    }
                }
            }
        })
    }
}

#[derive(Clone, Default)]
struct CountingRefreshSink {
    refreshes: Arc<AtomicUsize>,
}

#[async_trait]
impl RefreshSink for CountingRefreshSink {
    async fn refresh(&self) -> Result<()> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("🔄 Board refreshed ({})", n);
        Ok(())
    }
}

pub struct ScenarioRunner {
    config: ScenarioConfig,
    suppressor: ActivitySuppressor,
}

impl ScenarioRunner {
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            suppressor: ActivitySuppressor::new(),
        }
    }

    pub fn with_suppressor(mut self, suppressor: ActivitySuppressor) -> Self {
        self.suppressor = suppressor;
        self
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn build_board(&self) -> Result<Board> {
        let mut board = Board::new();
        for column in &self.config.columns {
            board.add_container(column.id.clone(), column.droppable)?;
            for card in &column.cards {
                board.add_card(&column.id, card.id.clone(), card.issue.clone(), card.width)?;
            }
        }
        Ok(board)
    }

    /// 建立控制器，依設定註冊每個欄位的接受回呼與每張卡片的拖曳開始回呼
    fn build_controller(
        &self,
        board: SharedBoard,
        dialog: &SimulatedDialog,
        drag_starts: &Arc<Mutex<Vec<serde_json::Value>>>,
    ) -> DragController<MemoryViewport> {
        let viewport_config = &self.config.viewport;
        let viewport = MemoryViewport::new(
            Bounds::new(viewport_config.left, viewport_config.width),
            viewport_config.content_width,
        )
        .with_scroll_offset(viewport_config.scroll_offset);

        let mut controller = DragController::new(board.clone(), viewport, self.suppressor.clone())
            .with_settings(self.config.drag_settings());

        for column in &self.config.columns {
            let on_accept = column
                .accepts_drops
                .then(|| dialog.callback_for(board.clone(), column.id.clone()));
            controller.register_drop_zone(column.id.clone(), on_accept);

            for card in &column.cards {
                let on_start = card.draggable.then(|| {
                    let starts = drag_starts.clone();
                    let callback: DragStartCallback = Arc::new(move |issue: &serde_json::Value| {
                        if let Ok(mut starts) = starts.lock() {
                            starts.push(issue.clone());
                        }
                    });
                    callback
                });
                controller.register_draggable(card.id.clone(), on_start);
            }
        }
        controller
    }

    pub async fn run(&self) -> Result<ReplayReport> {
        let board = self.build_board()?.into_shared();
        let dialog = SimulatedDialog::default();
        let drag_starts = Arc::new(Mutex::new(Vec::new()));
        let mut controller = self.build_controller(board.clone(), &dialog, &drag_starts);

        let sink = CountingRefreshSink::default();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let replay = async {
            let steps = self.play_steps(&mut controller, &dialog).await;
            let _ = shutdown_tx.send(true);
            steps
        };

        let steps = match self.config.refresh_interval() {
            Some(interval) => {
                let refresher = LiveRefresher::new(sink.clone(), self.suppressor.clone(), interval);
                let (steps, ()) = tokio::join!(replay, refresher.run(shutdown_rx));
                steps
            }
            None => replay.await,
        }?;

        let columns = lock_board(&board)?
            .containers()
            .iter()
            .map(|c| ColumnLayout {
                id: c.id.clone(),
                droppable: c.droppable,
                cards: c.cards.clone(),
            })
            .collect();

        let report = ReplayReport {
            board: self.config.board.name.clone(),
            generated_at: Utc::now(),
            steps,
            columns,
            scroll_offset: controller.viewport().scroll_offset(),
            activity_count: self.suppressor.count(),
            drag_starts: take_all(&drag_starts),
            confirmation_requests: take_all(&dialog.requests),
            refreshes: sink.refreshes.load(Ordering::SeqCst),
        };
        tracing::info!(
            "🏁 Replayed {} step(s) on board '{}'",
            report.steps.len(),
            report.board
        );
        Ok(report)
    }

    async fn play_steps(
        &self,
        controller: &mut DragController<MemoryViewport>,
        dialog: &SimulatedDialog,
    ) -> Result<Vec<StepReport>> {
        let mut reports = Vec::with_capacity(self.config.steps.len());

        for (index, step) in self.config.steps.iter().enumerate() {
            tracing::debug!("▶️ Step {}: {:?}", index, step);
            let result = match step {
                ScenarioStep::Start { card, left } => controller
                    .start_drag(card, *left)
                    .map(|()| StepResult::Started { card: card.clone() }),
                ScenarioStep::Move { helper_left } => controller
                    .drag_move(*helper_left)
                    .map(|offset| StepResult::Scrolled { offset }),
                ScenarioStep::DropOn { column } => {
                    controller.drop_on(column).map(|recorded| StepResult::DropEvaluated {
                        column: column.clone(),
                        recorded,
                    })
                }
                ScenarioStep::Release { confirm } => {
                    dialog.prepare(*confirm, controller.session().map(|s| s.card.clone()));
                    let released = controller
                        .release()
                        .await
                        .map(|outcome| StepResult::Released { outcome });
                    dialog.finish();
                    released
                }
                ScenarioStep::SetDroppable { column, droppable } => lock_board(controller.board())
                    .and_then(|mut board| board.set_droppable(column, *droppable))
                    .map(|()| StepResult::DroppableSet {
                        column: column.clone(),
                        droppable: *droppable,
                    }),
            };

            let result = result.unwrap_or_else(|e| {
                tracing::warn!("⚠️ Step {} refused: {}", index, e);
                StepResult::Refused {
                    error: e.to_string(),
                }
            });
            reports.push(StepReport {
                index,
                step: step.clone(),
                result,
            });
        }

        Ok(reports)
    }
}

fn take_all<T>(items: &Mutex<Vec<T>>) -> Vec<T> {
    items
        .lock()
        .map(|mut items| std::mem::take(&mut *items))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"
[board]
name = "triage"

[drag]
confirmation_timeout_ms = 20

[viewport]
width = 500.0
content_width = 500.0

[[columns]]
id = "todo"

[[columns.cards]]
id = "c1"

[[columns]]
id = "done"
"#;

    const UNANSWERED_TWICE: &str = r#"
[[steps]]
action = "start"
card = "c1"

[[steps]]
action = "drop_on"
column = "done"

[[steps]]
action = "release"
confirm = "never"

[[steps]]
action = "start"
card = "c1"

[[steps]]
action = "drop_on"
column = "done"

[[steps]]
action = "release"
confirm = "never"
"#;

    fn runner(steps: &str) -> ScenarioRunner {
        let config = ScenarioConfig::from_toml_str(&format!("{}\n{}", BOARD, steps)).unwrap();
        ScenarioRunner::new(config)
    }

    #[tokio::test]
    async fn test_unanswered_handles_are_dropped_after_release() {
        let runner = runner(UNANSWERED_TWICE);
        let board = runner.build_board().unwrap().into_shared();
        let dialog = SimulatedDialog::default();
        let drag_starts = Arc::new(Mutex::new(Vec::new()));
        let mut controller = runner.build_controller(board, &dialog, &drag_starts);

        let reports = runner.play_steps(&mut controller, &dialog).await.unwrap();

        assert!(matches!(
            reports[5].result,
            StepResult::Released {
                outcome: DropOutcome::Declined { .. }
            }
        ));
        assert_eq!(dialog.requests.lock().unwrap().len(), 2);
        assert!(dialog.parked.lock().unwrap().is_empty());
        assert!(dialog.dragged.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_droppable_on_unavailable_board_is_refused() {
        let runner = runner(
            r#"
[[steps]]
action = "set_droppable"
column = "done"
droppable = false
"#,
        );
        let board = runner.build_board().unwrap().into_shared();
        let dialog = SimulatedDialog::default();
        let drag_starts = Arc::new(Mutex::new(Vec::new()));
        let mut controller = runner.build_controller(board.clone(), &dialog, &drag_starts);

        // 持有鎖時 panic，讓看板的鎖進入 poisoned 狀態
        let poisoner = board.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("board render failed");
        })
        .join();
        assert!(board.is_poisoned());

        let reports = runner.play_steps(&mut controller, &dialog).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].result, StepResult::Refused { .. }));
    }
}
