use crate::domain::model::Bounds;
use crate::domain::ports::Viewport;

/// 記憶體中的捲動容器
#[derive(Debug, Clone)]
pub struct MemoryViewport {
    bounds: Bounds,
    content_width: f64,
    scroll_offset: f64,
}

impl MemoryViewport {
    pub fn new(bounds: Bounds, content_width: f64) -> Self {
        Self {
            bounds,
            content_width,
            scroll_offset: 0.0,
        }
    }

    pub fn with_scroll_offset(mut self, offset: f64) -> Self {
        self.scroll_offset = offset;
        self
    }

    pub fn set_content_width(&mut self, width: f64) {
        self.content_width = width;
    }
}

impl Viewport for MemoryViewport {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    fn content_width(&self) -> f64 {
        self.content_width
    }
}
