//! 试卷渲染服务 - 业务能力层
//!
//! 只负责"把一套已选好的试卷画到画布上"，不关心选题和文件名。
//!
//! 版式（A4，单位为磅，原点在左下角）：
//! - 顶部三个框：O.P.Code、规程、H.T.No.（带 10 个准考证号格子）
//! - 居中的学校名称、副标题、考试名称、科目名称
//! - 考试时间 / 满分，答题说明
//! - 每个单元：单元框，主题，居中的 OR，备选题
//!
//! 剩余空间不够再画一行时换页，后续内容从新页顶部继续。

use tracing::debug;

use crate::config::Config;
use crate::error::RenderError;
use crate::infrastructure::canvas::PageSink;
use crate::infrastructure::font_metrics::Font;
use crate::models::{PaperDocument, QuestionSlot, SubjectMeta, UnitSection};
use crate::services::text_wrap::wrap_text;

/// 左右页边距
pub const MARGIN_X: f32 = 40.0;
/// 首页起始位置距页顶
const FIRST_PAGE_TOP: f32 = 40.0;
/// 换页后起始位置距页顶
const CONTINUED_PAGE_TOP: f32 = 50.0;
/// 内容不得低于此高度
pub const BOTTOM_LIMIT: f32 = 46.0;
/// 题目正文行高
pub const LINE_HEIGHT: f32 = 14.0;
/// OR 前留白
const OR_PADDING_BEFORE: f32 = 10.0;
/// OR 行所需空间
const OR_BLOCK_HEIGHT: f32 = 34.0;
/// OR 后留白
const OR_PADDING_AFTER: f32 = 25.0;
/// 每道题后的留白
const QUESTION_GAP: f32 = 40.0;
/// 每个单元后的留白
const UNIT_GAP: f32 = 20.0;
/// 单元框占用的高度
const UNIT_HEADER_HEIGHT: f32 = 25.0;

const BODY_FONT: (Font, f32) = (Font::Regular, 10.0);
const EMPTY_QUESTION_TEXT: &str = "No question text available.";

/// 试卷抬头的固定文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderText {
    pub institution_name: String,
    pub institution_subtitle: String,
    pub exam_title: String,
}

impl HeaderText {
    pub fn from_config(config: &Config) -> Self {
        Self {
            institution_name: config.institution_name.clone(),
            institution_subtitle: config.institution_subtitle.clone(),
            exam_title: config.exam_title.clone(),
        }
    }

    pub fn with_exam_title(mut self, exam_title: Option<&str>) -> Self {
        if let Some(title) = exam_title.filter(|t| !t.trim().is_empty()) {
            self.exam_title = title.to_string();
        }
        self
    }
}

impl Default for HeaderText {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 纵向游标
///
/// 剩余空间 = 当前 y − 底部界限。剩余空间恰好等于所需高度时不换页，
/// 严格小于时换页。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    y: f32,
    page_height: f32,
    page_breaks: usize,
}

impl PageCursor {
    pub fn new(y: f32, page_height: f32) -> Self {
        Self {
            y,
            page_height,
            page_breaks: 0,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_breaks(&self) -> usize {
        self.page_breaks
    }

    pub fn remaining(&self) -> f32 {
        self.y - BOTTOM_LIMIT
    }

    pub fn needs_break(&self, needed: f32) -> bool {
        self.remaining() < needed
    }

    /// 空间不足时换页，返回是否换了页
    pub fn ensure_space(&mut self, needed: f32, sink: &mut dyn PageSink) -> bool {
        if !self.needs_break(needed) {
            return false;
        }
        sink.show_page();
        self.y = self.page_height - CONTINUED_PAGE_TOP;
        self.page_breaks += 1;
        true
    }

    pub fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }
}

/// 试卷渲染服务
pub struct PaperRenderer {
    header: HeaderText,
}

impl PaperRenderer {
    pub fn new(header: HeaderText) -> Self {
        Self { header }
    }

    /// 画完整套试卷并关闭画布
    pub fn render(
        &self,
        paper: &PaperDocument,
        subject: &SubjectMeta,
        sink: &mut dyn PageSink,
    ) -> Result<(), RenderError> {
        let (_, page_height) = sink.page_size();
        let mut cursor = PageCursor::new(page_height - FIRST_PAGE_TOP, page_height);

        self.draw_header(subject, &mut cursor, sink);
        for section in &paper.sections {
            draw_section(section, &mut cursor, sink);
        }

        debug!(
            "{} 渲染完成: {} 个单元, 换页 {} 次",
            paper.label,
            paper.sections.len(),
            cursor.page_breaks()
        );
        sink.close()
    }

    fn draw_header(&self, subject: &SubjectMeta, cursor: &mut PageCursor, sink: &mut dyn PageSink) {
        let (width, _) = sink.page_size();
        let centre = width / 2.0;
        let y = cursor.y();

        sink.draw_rect(MARGIN_X, y - 30.0, 140.0, 25.0);
        sink.draw_rect(MARGIN_X + 150.0, y - 30.0, 80.0, 25.0);
        sink.draw_rect(MARGIN_X + 240.0, y - 30.0, 280.0, 25.0);

        sink.set_font(Font::Bold, 10.0);
        sink.draw_text(
            MARGIN_X + 5.0,
            y - 18.0,
            &format!("O.P.Code: {}", subject.display_code()),
        );
        sink.draw_text(MARGIN_X + 165.0, y - 18.0, subject.display_regulation());
        sink.draw_text(MARGIN_X + 250.0, y - 18.0, "H.T.No.");

        for cell in 0..10 {
            sink.draw_rect(MARGIN_X + 320.0 + cell as f32 * 20.0, y - 30.0, 20.0, 25.0);
        }
        cursor.advance(45.0);

        sink.set_font(Font::Bold, 11.0);
        sink.draw_centred_text(centre, cursor.y(), &self.header.institution_name);
        cursor.advance(15.0);
        sink.set_font(Font::Regular, 9.0);
        sink.draw_centred_text(centre, cursor.y(), &self.header.institution_subtitle);
        cursor.advance(20.0);

        sink.set_font(Font::Bold, 10.0);
        sink.draw_centred_text(centre, cursor.y(), &self.header.exam_title);
        cursor.advance(15.0);
        sink.draw_centred_text(centre, cursor.y(), &subject.display_name());
        cursor.advance(20.0);

        sink.draw_text(MARGIN_X, cursor.y(), "Time: 3 Hours");
        sink.draw_right_text(width - MARGIN_X, cursor.y(), "Max. Marks: 60");
        cursor.advance(15.0);

        sink.set_font(Font::Regular, 9.0);
        sink.draw_centred_text(centre, cursor.y(), "(Answer all Five Units 5 x 12 = 60 Marks)");
        cursor.advance(25.0);
    }
}

fn draw_section(section: &UnitSection, cursor: &mut PageCursor, sink: &mut dyn PageSink) {
    let (width, _) = sink.page_size();

    cursor.ensure_space(UNIT_HEADER_HEIGHT, sink);
    let y = cursor.y();
    sink.set_font(Font::Bold, 10.0);
    sink.draw_rect(MARGIN_X + 220.0, y - 15.0, 80.0, 18.0);
    sink.draw_centred_text(MARGIN_X + 260.0, y - 10.0, &format!("UNIT-{}", section.position));
    cursor.advance(UNIT_HEADER_HEIGHT);

    draw_question(&section.primary, cursor, sink);

    cursor.advance(OR_PADDING_BEFORE);
    cursor.ensure_space(OR_BLOCK_HEIGHT, sink);
    sink.set_font(Font::Bold, 10.0);
    sink.draw_centred_text(width / 2.0, cursor.y(), "OR");
    cursor.advance(OR_PADDING_AFTER);

    draw_question(&section.alternative, cursor, sink);
    cursor.advance(UNIT_GAP);
}

/// 卷面上的题目文字：`<题号>. <正文> [12 Marks]`
pub fn question_line(slot: &QuestionSlot) -> String {
    let text = if slot.text.trim().is_empty() {
        EMPTY_QUESTION_TEXT
    } else {
        slot.text.as_str()
    };
    format!("{}. {} [{} Marks]", slot.serial, text, slot.marks)
}

fn draw_question(slot: &QuestionSlot, cursor: &mut PageCursor, sink: &mut dyn PageSink) {
    let (width, _) = sink.page_size();
    let (font, size) = BODY_FONT;
    sink.set_font(font, size);

    for line in wrap_text(&question_line(slot), font, size, width - 2.0 * MARGIN_X) {
        cursor.ensure_space(LINE_HEIGHT, sink);
        sink.draw_text(MARGIN_X, cursor.y(), &line);
        cursor.advance(LINE_HEIGHT);
    }
    cursor.advance(QUESTION_GAP);
}
