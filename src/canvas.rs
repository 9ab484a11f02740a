use crate::error::{Result, TableExportError};
use crate::font::{FontVariant, StandardFont};
use crate::pdf::{self, PdfOptions};
use crate::types::{Color, Point, Pt, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(pub(crate) usize);

impl PageId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub(crate) usize);

impl FontHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub x: Pt,
    pub y: Pt,
    pub size: Pt,
    pub font: FontHandle,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectStyle {
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub start: Point,
    pub end: Point,
    pub thickness: Pt,
    pub color: Color,
}

/// Drawing surface the table layout renders through. Coordinates are PDF user
/// space: origin at the bottom-left corner, `y` growing upward.
pub trait DocumentCanvas {
    /// Appends a page. `None` uses the canvas' default page size.
    fn add_page(&mut self, size: Option<Size>) -> Result<PageId>;

    fn page_size(&self, page: PageId) -> Result<Size>;

    fn embed_font(&mut self, variant: FontVariant) -> Result<FontHandle>;

    fn measure_width(&self, font: FontHandle, text: &str, size: Pt) -> Result<Pt>;

    fn draw_text(&mut self, page: PageId, text: &str, style: TextStyle) -> Result<()>;

    fn draw_rectangle(&mut self, page: PageId, style: RectStyle) -> Result<()>;

    fn draw_line(&mut self, page: PageId, style: LineStyle) -> Result<()>;

    fn serialize(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Text {
        x: Pt,
        y: Pt,
        size: Pt,
        font: StandardFont,
        color: Color,
        text: String,
    },
    FillRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        color: Color,
    },
    Line {
        start: Point,
        end: Point,
        thickness: Pt,
        color: Color,
    },
}

#[derive(Debug, Clone)]
pub struct Page {
    pub size: Size,
    pub commands: Vec<Command>,
}

impl Page {
    fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn to_pdf(&self, options: &PdfOptions) -> Result<Vec<u8>> {
        Ok(pdf::document_to_pdf(self, options)?)
    }
}

/// Recording canvas backed by the standard Helvetica faces. Drawing calls are
/// kept as [`Command`]s per page until [`Canvas::finish`] or
/// [`DocumentCanvas::serialize`].
pub struct Canvas {
    default_page_size: Size,
    pages: Vec<Page>,
    fonts: Vec<StandardFont>,
    pdf_options: PdfOptions,
}

impl Canvas {
    pub fn new(default_page_size: Size) -> Self {
        Self::with_options(default_page_size, PdfOptions::default())
    }

    pub fn with_options(default_page_size: Size, pdf_options: PdfOptions) -> Self {
        Self {
            default_page_size,
            pages: Vec::new(),
            fonts: Vec::new(),
            pdf_options,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn finish(self) -> Document {
        Document { pages: self.pages }
    }

    fn page_mut(&mut self, page: PageId) -> Result<&mut Page> {
        self.pages
            .get_mut(page.0)
            .ok_or(TableExportError::UnknownPage(page.0))
    }

    fn font(&self, font: FontHandle) -> Result<StandardFont> {
        self.fonts
            .get(font.0)
            .copied()
            .ok_or(TableExportError::UnknownFont(font.0))
    }
}

impl DocumentCanvas for Canvas {
    fn add_page(&mut self, size: Option<Size>) -> Result<PageId> {
        let size = size.unwrap_or(self.default_page_size);
        self.pages.push(Page::new(size));
        Ok(PageId(self.pages.len() - 1))
    }

    fn page_size(&self, page: PageId) -> Result<Size> {
        self.pages
            .get(page.0)
            .map(|p| p.size)
            .ok_or(TableExportError::UnknownPage(page.0))
    }

    fn embed_font(&mut self, variant: FontVariant) -> Result<FontHandle> {
        let font = StandardFont::for_variant(variant);
        if let Some(index) = self.fonts.iter().position(|f| *f == font) {
            return Ok(FontHandle(index));
        }
        self.fonts.push(font);
        Ok(FontHandle(self.fonts.len() - 1))
    }

    fn measure_width(&self, font: FontHandle, text: &str, size: Pt) -> Result<Pt> {
        Ok(self.font(font)?.measure_text_width(size, text))
    }

    fn draw_text(&mut self, page: PageId, text: &str, style: TextStyle) -> Result<()> {
        let font = self.font(style.font)?;
        self.page_mut(page)?.commands.push(Command::Text {
            x: style.x,
            y: style.y,
            size: style.size,
            font,
            color: style.color,
            text: text.to_string(),
        });
        Ok(())
    }

    fn draw_rectangle(&mut self, page: PageId, style: RectStyle) -> Result<()> {
        self.page_mut(page)?.commands.push(Command::FillRect {
            x: style.x,
            y: style.y,
            width: style.width,
            height: style.height,
            color: style.color,
        });
        Ok(())
    }

    fn draw_line(&mut self, page: PageId, style: LineStyle) -> Result<()> {
        self.page_mut(page)?.commands.push(Command::Line {
            start: style.start,
            end: style.end,
            thickness: style.thickness,
            color: style.color,
        });
        Ok(())
    }

    fn serialize(self) -> Result<Vec<u8>> {
        let options = self.pdf_options.clone();
        self.finish().to_pdf(&options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_font_reuses_handles() {
        let mut canvas = Canvas::new(Size::a4());
        let a = canvas.embed_font(FontVariant::Regular).expect("regular");
        let b = canvas.embed_font(FontVariant::Bold).expect("bold");
        let c = canvas.embed_font(FontVariant::Regular).expect("regular again");
        assert_eq!(a, c);
        assert_ne!(a, b);
    }

    #[test]
    fn drawing_on_missing_page_fails() {
        let mut canvas = Canvas::new(Size::a4());
        let err = canvas
            .draw_rectangle(
                PageId(2),
                RectStyle {
                    x: Pt::ZERO,
                    y: Pt::ZERO,
                    width: Pt::from_i32(10),
                    height: Pt::from_i32(10),
                    color: Color::BLACK,
                },
            )
            .unwrap_err();
        assert!(matches!(err, TableExportError::UnknownPage(2)));
    }

    #[test]
    fn unknown_font_handle_is_rejected() {
        let canvas = Canvas::new(Size::a4());
        let err = canvas
            .measure_width(FontHandle(7), "x", Pt::from_i32(10))
            .unwrap_err();
        assert!(matches!(err, TableExportError::UnknownFont(7)));
    }

    #[test]
    fn pages_keep_their_own_size() {
        let mut canvas = Canvas::new(Size::a4());
        let first = canvas.add_page(None).expect("page");
        let second = canvas.add_page(Some(Size::letter())).expect("page");
        assert_eq!(canvas.page_size(first).expect("size"), Size::a4());
        assert_eq!(canvas.page_size(second).expect("size"), Size::letter());
        assert_eq!(canvas.page_count(), 2);
    }

    #[test]
    fn text_commands_are_recorded_in_order() {
        let mut canvas = Canvas::new(Size::a4());
        let page = canvas.add_page(None).expect("page");
        let font = canvas.embed_font(FontVariant::Regular).expect("font");
        for text in ["one", "two"] {
            canvas
                .draw_text(
                    page,
                    text,
                    TextStyle {
                        x: Pt::from_i32(36),
                        y: Pt::from_i32(700),
                        size: Pt::from_i32(10),
                        font,
                        color: Color::BLACK,
                    },
                )
                .expect("draw");
        }
        let document = canvas.finish();
        let texts: Vec<&str> = document.pages[0].texts().collect();
        assert_eq!(texts, vec!["one", "two"]);
    }
}
