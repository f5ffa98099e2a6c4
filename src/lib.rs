pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::viewport::MemoryViewport;
pub use crate::app::{ReplayReport, ScenarioRunner};
pub use crate::config::toml_config::ScenarioConfig;
pub use crate::core::activity::{ActivityGuard, ActivitySuppressor};
pub use crate::core::confirmation::{Confirmation, ConfirmationGate, ConfirmationHandle};
pub use crate::core::controller::{DragController, DragPhase, DragSettings, DropOutcome};
pub use crate::core::drop_zone::{can_accept, DropZoneRegistry};
pub use crate::core::refresh::LiveRefresher;
pub use crate::core::scroll::compute_scroll;
pub use crate::domain::model::{Board, Bounds, SharedBoard};
pub use crate::utils::error::{BoardError, Result};
