//! 内存画布
//!
//! 只记录绘制指令，用于预览和断言布局。

use crate::error::RenderError;
use crate::infrastructure::canvas::{PageSink, A4_HEIGHT, A4_WIDTH};
use crate::infrastructure::font_metrics::Font;

/// 一条绘制指令
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        size: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// 内存画布
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    width: f32,
    height: f32,
    font: (Font, f32),
    pages: Vec<Vec<DrawOp>>,
    closed: bool,
}

impl RecordingCanvas {
    pub fn a4() -> Self {
        Self::new(A4_WIDTH, A4_HEIGHT)
    }

    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            font: (Font::Regular, 10.0),
            pages: vec![Vec::new()],
            closed: false,
        }
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 所有文本指令，带所在页码（从 0 开始）
    pub fn texts(&self) -> Vec<(usize, &DrawOp)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(page, ops)| {
                ops.iter()
                    .filter(|op| matches!(op, DrawOp::Text { .. }))
                    .map(move |op| (page, op))
            })
            .collect()
    }

    /// 所有文本内容，按绘制顺序
    pub fn text_lines(&self) -> Vec<String> {
        self.texts()
            .into_iter()
            .filter_map(|(_, op)| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                DrawOp::Rect { .. } => None,
            })
            .collect()
    }

    fn current_page(&mut self) -> &mut Vec<DrawOp> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

impl PageSink for RecordingCanvas {
    fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn set_font(&mut self, font: Font, size: f32) {
        self.font = (font, size);
    }

    fn font(&self) -> (Font, f32) {
        self.font
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) {
        let (font, size) = self.font;
        self.current_page().push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font,
            size,
        });
    }

    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.current_page().push(DrawOp::Rect {
            x,
            y,
            width,
            height,
        });
    }

    fn show_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn close(&mut self) -> Result<(), RenderError> {
        if self.closed {
            return Err(RenderError::CanvasClosed);
        }
        self.closed = true;
        Ok(())
    }
}
