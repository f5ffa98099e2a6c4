pub mod activity;
pub mod confirmation;
pub mod controller;
pub mod drop_zone;
pub mod refresh;
pub mod scroll;

pub use crate::domain::model::{Board, Bounds, Card, Container, DragSession, SharedBoard};
pub use crate::domain::ports::{RefreshSink, Viewport};
pub use crate::utils::error::Result;
