use crate::domain::model::Bounds;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 可水平捲動的欄位容器
pub trait Viewport: Send + Sync {
    fn bounds(&self) -> Bounds;
    fn scroll_offset(&self) -> f64;
    fn set_scroll_offset(&mut self, offset: f64);
    /// 可捲動內容的總寬度 (scrollWidth)
    fn content_width(&self) -> f64;
}

/// 背景更新 (例如 websocket 的即時刷新)
#[async_trait]
pub trait RefreshSink: Send + Sync {
    async fn refresh(&self) -> Result<()>;
}
