//! PDF 画布 - 基础设施层
//!
//! 持有一份试卷文件的全部页面，只暴露"画文字、画框、换页、输出"的能力

use std::io::Write;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::RenderError;
use crate::infrastructure::canvas::{PageSink, A4_HEIGHT, A4_WIDTH};
use crate::infrastructure::font_metrics::Font;

/// PDF 画布
///
/// 职责：
/// - 累积每一页的绘制指令
/// - close 时一次性生成整份文档并原子地写到目标路径
/// - 不认识题目 / 试卷
pub struct PdfCanvas {
    output_path: PathBuf,
    /// 用于错误信息的标签，例如 `Set A`
    label: String,
    width: f32,
    height: f32,
    font: (Font, f32),
    finished_pages: Vec<Vec<Operation>>,
    current_page: Vec<Operation>,
    closed: bool,
}

impl PdfCanvas {
    /// 创建 A4 画布
    pub fn a4(output_path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            output_path: output_path.into(),
            label: label.into(),
            width: A4_WIDTH,
            height: A4_HEIGHT,
            font: (Font::Regular, 10.0),
            finished_pages: Vec::new(),
            current_page: Vec::new(),
            closed: false,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn pdf_error(&self, source: lopdf::Error) -> RenderError {
        RenderError::Pdf {
            variant: self.label.clone(),
            source: source.into(),
        }
    }

    fn write_error(&self, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> RenderError {
        RenderError::WriteFailed {
            path: self.output_path.clone(),
            source: source.into(),
        }
    }

    /// 生成整份文档
    fn build_document(&self, pages: Vec<Vec<Operation>>) -> Result<Document, RenderError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary(Font::Regular));
        let bold_id = doc.add_object(font_dictionary(Font::Bold));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Regular.resource_name() => regular_id,
                Font::Bold.resource_name() => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations };
            let encoded = content.encode().map_err(|e| self.pdf_error(e))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(self.width),
                Object::Real(self.height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        Ok(doc)
    }

    /// 先写临时文件再改名，读者不会看到写了一半的试卷
    fn write_atomically(&self, doc: &mut Document) -> Result<(), RenderError> {
        let parent = match self.output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| self.write_error(e))?;

        let mut temp = NamedTempFile::new_in(&parent).map_err(|e| self.write_error(e))?;
        doc.save_to(&mut temp).map_err(|e| self.write_error(e))?;
        temp.flush().map_err(|e| self.write_error(e))?;
        temp.persist(&self.output_path).map_err(|e| self.write_error(e))?;
        Ok(())
    }
}

fn font_dictionary(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// 标准字体只支持单字节编码，超出 Latin-1 的字符以 `?` 代替
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

impl PageSink for PdfCanvas {
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
        self.current_page.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![font.resource_name().into(), Object::Real(size)],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_text(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.current_page.extend([
            Operation::new("w", vec![Object::Real(1.0)]),
            Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(y),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ),
            Operation::new("S", vec![]),
        ]);
    }

    fn show_page(&mut self) {
        let page = std::mem::take(&mut self.current_page);
        self.finished_pages.push(page);
    }

    fn close(&mut self) -> Result<(), RenderError> {
        if self.closed {
            return Err(RenderError::CanvasClosed);
        }
        self.closed = true;

        let mut pages = std::mem::take(&mut self.finished_pages);
        if !self.current_page.is_empty() || pages.is_empty() {
            pages.push(std::mem::take(&mut self.current_page));
        }

        debug!("{} 共 {} 页，写入 {}", self.label, pages.len(), self.output_path.display());
        let mut doc = self.build_document(pages)?;
        self.write_atomically(&mut doc)
    }
}
