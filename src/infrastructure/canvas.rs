//! 页面画布能力
//!
//! 渲染器只通过这个 trait 绘制，不关心输出是 PDF 文件还是内存记录。

use crate::error::RenderError;
use crate::infrastructure::font_metrics::Font;

/// A4 页面尺寸（磅）
pub const A4_WIDTH: f32 = 595.2756;
pub const A4_HEIGHT: f32 = 841.8898;

/// 页面绘制接收端
///
/// 坐标原点在页面左下角。绘制只追加，不能回退到已结束的页面。
pub trait PageSink {
    /// 页面尺寸（宽, 高）
    fn page_size(&self) -> (f32, f32);

    /// 选择后续文本使用的字体
    fn set_font(&mut self, font: Font, size: f32);

    /// 当前字体
    fn font(&self) -> (Font, f32);

    /// 以 (x, y) 为基线起点绘制文本
    fn draw_text(&mut self, x: f32, y: f32, text: &str);

    /// 以 (x, y) 为左下角绘制矩形边框
    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// 结束当前页，后续绘制落在新页面上
    fn show_page(&mut self);

    /// 结束绘制并输出，只能调用一次
    fn close(&mut self) -> Result<(), RenderError>;

    /// 以 x 为中心绘制文本
    fn draw_centred_text(&mut self, x: f32, y: f32, text: &str) {
        let (font, size) = self.font();
        let width = font.text_width(text, size);
        self.draw_text(x - width / 2.0, y, text);
    }

    /// 以 x 为右端绘制文本
    fn draw_right_text(&mut self, x: f32, y: f32, text: &str) {
        let (font, size) = self.font();
        let width = font.text_width(text, size);
        self.draw_text(x - width, y, text);
    }
}
