use crate::utils::error::{BoardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub type CardId = String;
pub type ContainerId = String;

/// 水平方向的邊界 (viewport 座標)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub width: f64,
}

impl Bounds {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn shifted(&self, dx: f64) -> Self {
        Self {
            left: self.left + dx,
            width: self.width,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// 卡片承載的 issue，核心不解析內容
    pub issue: serde_json::Value,
    pub container: ContainerId,
    pub width: f64,
    #[serde(default)]
    pub dragging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub cards: Vec<CardId>,
    /// 由渲染層設定，核心只讀取
    pub droppable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    containers: Vec<Container>,
    cards: HashMap<CardId, Card>,
}

pub type SharedBoard = Arc<Mutex<Board>>;

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedBoard {
        Arc::new(Mutex::new(self))
    }

    pub fn add_container(&mut self, id: impl Into<ContainerId>, droppable: bool) -> Result<()> {
        let id = id.into();
        if self.container(&id).is_some() {
            return Err(BoardError::ValidationError {
                message: format!("Container {} already exists", id),
            });
        }
        self.containers.push(Container {
            id,
            cards: Vec::new(),
            droppable,
        });
        Ok(())
    }

    pub fn add_card(
        &mut self,
        container: &str,
        id: impl Into<CardId>,
        issue: serde_json::Value,
        width: f64,
    ) -> Result<()> {
        let id = id.into();
        if self.cards.contains_key(&id) {
            return Err(BoardError::ValidationError {
                message: format!("Card {} already exists", id),
            });
        }
        let owner = self.container_mut(container)?;
        owner.cards.push(id.clone());
        self.cards.insert(
            id.clone(),
            Card {
                id,
                issue,
                container: container.to_string(),
                width,
                dragging: false,
            },
        );
        Ok(())
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    fn container_mut(&mut self, id: &str) -> Result<&mut Container> {
        self.containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| BoardError::UnknownContainer {
                container: id.to_string(),
            })
    }

    pub fn owns(&self, container: &str, card: &str) -> bool {
        self.card(card).is_some_and(|c| c.container == container)
    }

    pub fn set_droppable(&mut self, container: &str, droppable: bool) -> Result<()> {
        self.container_mut(container)?.droppable = droppable;
        Ok(())
    }

    pub(crate) fn set_dragging(&mut self, card: &str, dragging: bool) {
        if let Some(card) = self.cards.get_mut(card) {
            card.dragging = dragging;
        }
    }

    /// 將卡片移到另一個欄位；兩邊的列表與卡片的反向參照一起更新
    pub fn transfer_card(&mut self, card: &str, to: &str) -> Result<()> {
        let from = self
            .card(card)
            .map(|c| c.container.clone())
            .ok_or_else(|| BoardError::UnknownCard {
                card: card.to_string(),
            })?;
        if from == to {
            return Ok(());
        }
        // 先確認目標存在，避免只完成一半的移動
        self.container_mut(to)?;

        self.container_mut(&from)?.cards.retain(|c| c != card);
        self.container_mut(to)?.cards.push(card.to_string());
        if let Some(c) = self.cards.get_mut(card) {
            c.container = to.to_string();
        }
        Ok(())
    }
}

/// 取得看板鎖；鎖被污染時回傳錯誤而非 panic
pub fn lock_board(board: &SharedBoard) -> Result<MutexGuard<'_, Board>> {
    board.lock().map_err(|_| BoardError::BoardUnavailable)
}

/// 一次拖曳的暫存狀態
#[derive(Debug, Clone)]
pub struct DragSession {
    pub card: CardId,
    pub issue: serde_json::Value,
    pub origin: ContainerId,
    pub helper: Bounds,
    /// 拖曳開始時擷取一次
    pub content_width: f64,
    pub dropped_target: Option<ContainerId>,
    pub started_at: DateTime<Utc>,
}
