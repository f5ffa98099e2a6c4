use crate::core::controller::AcceptCallback;
use crate::domain::model::{Board, ContainerId};
use std::collections::HashMap;

/// 可放置的欄位，以及每個欄位的接受回呼
#[derive(Default)]
pub struct DropZoneRegistry {
    zones: HashMap<ContainerId, AcceptCallback>,
}

impl DropZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 沒有回呼的欄位不會成為放置區
    pub fn register(&mut self, container: impl Into<ContainerId>, on_accept: Option<AcceptCallback>) -> bool {
        let container = container.into();
        match on_accept {
            Some(callback) => {
                tracing::debug!("Registered drop zone {}", container);
                self.zones.insert(container, callback);
                true
            }
            None => {
                tracing::debug!("Container {} has no accept callback; not droppable", container);
                self.zones.remove(&container);
                false
            }
        }
    }

    pub fn is_registered(&self, container: &str) -> bool {
        self.zones.contains_key(container)
    }

    pub fn on_accept(&self, container: &str) -> Option<AcceptCallback> {
        self.zones.get(container).cloned()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// 卡片是看板上的卡片，且不屬於目標欄位時才可放置。每次放置都重新判斷。
pub fn can_accept(board: &Board, card: &str, target: &str) -> bool {
    board.card(card).is_some_and(|c| c.container != target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::confirmation::ConfirmationHandle;
    use serde_json::json;
    use std::sync::Arc;

    fn board() -> Board {
        let mut board = Board::new();
        for column in ["todo", "doing", "done"] {
            board.add_container(column, true).unwrap();
        }
        board.add_card("todo", "a", json!(1), 100.0).unwrap();
        board.add_card("doing", "b", json!(2), 100.0).unwrap();
        board
    }

    #[test]
    fn test_never_accepts_own_cards() {
        let board = board();
        for container in board.containers() {
            for card in &container.cards {
                assert!(!can_accept(&board, card, &container.id));
            }
        }
    }

    #[test]
    fn test_accepts_cards_from_other_containers() {
        let board = board();
        assert!(can_accept(&board, "a", "doing"));
        assert!(can_accept(&board, "a", "done"));
        assert!(can_accept(&board, "b", "todo"));
    }

    #[test]
    fn test_rejects_unknown_cards() {
        assert!(!can_accept(&board(), "ghost", "todo"));
    }

    #[test]
    fn test_is_reevaluated_after_ownership_changes() {
        let mut board = board();
        assert!(can_accept(&board, "a", "done"));
        board.transfer_card("a", "done").unwrap();
        assert!(!can_accept(&board, "a", "done"));
        assert!(can_accept(&board, "a", "todo"));
    }

    #[test]
    fn test_registration_requires_callback() {
        let mut registry = DropZoneRegistry::new();
        let callback: AcceptCallback =
            Arc::new(|_: &serde_json::Value, _: ConfirmationHandle| {});

        assert!(registry.register("todo", Some(callback)));
        assert!(!registry.register("done", None));
        assert!(registry.is_registered("todo"));
        assert!(!registry.is_registered("done"));

        assert!(!registry.register("todo", None));
        assert!(registry.is_empty());
    }
}
