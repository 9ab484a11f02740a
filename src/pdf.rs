use crate::canvas::{Command, Document, Page};
use crate::font::{StandardFont, winansi_byte};
use crate::types::{Color, Pt, format_milli};
use std::collections::BTreeMap;
use std::io::{self, Write};

const PDF_CATALOG_ID: usize = 1;
const PDF_PAGES_ID: usize = 2;
const PDF_RESOURCES_ID: usize = 3;

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub document_title: Option<String>,
    pub producer: String,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            document_title: None,
            producer: "tablepdf".to_string(),
        }
    }
}

pub fn document_to_pdf(document: &Document, options: &PdfOptions) -> io::Result<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    document_to_writer(document, options, &mut bytes)?;
    Ok(bytes)
}

pub fn document_to_writer<W: Write>(
    document: &Document,
    options: &PdfOptions,
    writer: &mut W,
) -> io::Result<usize> {
    let fonts = collect_fonts(document);
    let mut pdf_stream = PdfStreamWriter::new(writer, fonts, options.clone())?;
    for page in &document.pages {
        pdf_stream.add_page(page)?;
    }
    let total = pdf_stream.finish()?;
    if pdf_stream.replaced_chars > 0 {
        log::warn!(
            "{} character(s) outside WinAnsi were written as '?'",
            pdf_stream.replaced_chars
        );
    }
    Ok(total)
}

struct FontResource {
    resource: String,
    object_id: usize,
}

struct PdfStreamWriter<'a, W: Write> {
    writer: &'a mut W,
    offset: usize,
    offsets: Vec<usize>, // index by object id; 0 is the free object.
    next_id: usize,
    options: PdfOptions,
    fonts: BTreeMap<StandardFont, FontResource>,
    page_ids: Vec<usize>,
    replaced_chars: usize,
}

impl<'a, W: Write> PdfStreamWriter<'a, W> {
    fn new(writer: &'a mut W, used_fonts: Vec<StandardFont>, options: PdfOptions) -> io::Result<Self> {
        let mut offset: usize = 0;
        write_bytes(writer, b"%PDF-1.7\n", &mut offset)?;
        write_bytes(writer, b"%\xE2\xE3\xCF\xD3\n", &mut offset)?;

        let mut next_id = PDF_RESOURCES_ID + 1;
        let mut fonts = BTreeMap::new();
        for (index, font) in used_fonts.into_iter().enumerate() {
            fonts.insert(
                font,
                FontResource {
                    resource: format!("F{}", index + 1),
                    object_id: next_id,
                },
            );
            next_id += 1;
        }

        Ok(Self {
            writer,
            offset,
            offsets: vec![0; next_id],
            next_id,
            options,
            fonts,
            page_ids: Vec::new(),
            replaced_chars: 0,
        })
    }

    fn alloc_ids(&mut self, count: usize) -> usize {
        let start = self.next_id;
        self.next_id += count;
        self.offsets.resize(self.next_id, 0);
        start
    }

    fn write_object(&mut self, obj_id: usize, body: &str) -> io::Result<()> {
        write_pdf_object(self.writer, &mut self.offset, &mut self.offsets, obj_id, body)
    }

    fn add_page(&mut self, page: &Page) -> io::Result<()> {
        let start = self.alloc_ids(2);
        let content_id = start;
        let page_id = start + 1;

        let content = self.render_page(page);
        self.write_object(content_id, &stream_object(&content))?;
        let page_obj = format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources {} 0 R /Contents {} 0 R >>",
            PDF_PAGES_ID,
            fmt_pt(page.size.width),
            fmt_pt(page.size.height),
            PDF_RESOURCES_ID,
            content_id
        );
        self.write_object(page_id, &page_obj)?;
        self.page_ids.push(page_id);
        Ok(())
    }

    fn render_page(&mut self, page: &Page) -> String {
        let mut out = String::new();
        let mut fill: Option<Color> = None;
        let mut stroke: Option<Color> = None;
        let mut line_width: Option<Pt> = None;

        for cmd in &page.commands {
            match cmd {
                Command::Text {
                    x,
                    y,
                    size,
                    font,
                    color,
                    text,
                } => {
                    if fill != Some(*color) {
                        out.push_str(&color_to_pdf_fill(*color));
                        fill = Some(*color);
                    }
                    let resource = self
                        .fonts
                        .get(font)
                        .map(|f| f.resource.as_str())
                        .unwrap_or("F1");
                    let encoded = encode_winansi_pdf_string(text);
                    self.replaced_chars += encoded.replaced;
                    out.push_str("BT\n");
                    out.push_str(&format!("/{} {} Tf\n", resource, fmt_pt(*size)));
                    out.push_str(&format!("{} {} Td\n", fmt_pt(*x), fmt_pt(*y)));
                    out.push_str(&format!("({}) Tj\n", encoded.text));
                    out.push_str("ET\n");
                }
                Command::FillRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    if fill != Some(*color) {
                        out.push_str(&color_to_pdf_fill(*color));
                        fill = Some(*color);
                    }
                    out.push_str(&format!(
                        "{} {} {} {} re\nf\n",
                        fmt_pt(*x),
                        fmt_pt(*y),
                        fmt_pt(*width),
                        fmt_pt(*height)
                    ));
                }
                Command::Line {
                    start,
                    end,
                    thickness,
                    color,
                } => {
                    if stroke != Some(*color) {
                        out.push_str(&color_to_pdf_stroke(*color));
                        stroke = Some(*color);
                    }
                    if line_width != Some(*thickness) {
                        out.push_str(&format!("{} w\n", fmt_pt(*thickness)));
                        line_width = Some(*thickness);
                    }
                    out.push_str(&format!(
                        "{} {} m\n{} {} l\nS\n",
                        fmt_pt(start.x),
                        fmt_pt(start.y),
                        fmt_pt(end.x),
                        fmt_pt(end.y)
                    ));
                }
            }
        }
        out
    }

    fn finish(&mut self) -> io::Result<usize> {
        let font_objects: Vec<(usize, String)> = self
            .fonts
            .iter()
            .map(|(font, res)| (res.object_id, font_object(*font)))
            .collect();
        for (id, body) in font_objects {
            self.write_object(id, &body)?;
        }

        let font_entries: Vec<(String, usize)> = self
            .fonts
            .values()
            .map(|res| (res.resource.clone(), res.object_id))
            .collect();
        let resources = if font_entries.is_empty() {
            "<< /ProcSet [/PDF /Text] >>".to_string()
        } else {
            format!(
                "<< /ProcSet [/PDF /Text] /Font {} >>",
                font_resources(&font_entries)
            )
        };
        self.write_object(PDF_RESOURCES_ID, &resources)?;

        let kids = self
            .page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        let pages = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            self.page_ids.len()
        );
        self.write_object(PDF_PAGES_ID, &pages)?;

        let catalog = format!("<< /Type /Catalog /Pages {} 0 R >>", PDF_PAGES_ID);
        self.write_object(PDF_CATALOG_ID, &catalog)?;

        let info_id = self.alloc_ids(1);
        let info = info_object(
            self.options.document_title.as_deref(),
            &self.options.producer,
        );
        self.write_object(info_id, &info)?;

        let xref_start = self.offset;
        let mut xref = format!("xref\n0 {}\n", self.next_id);
        xref.push_str("0000000000 65535 f \n");
        for offset in self.offsets.iter().skip(1) {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        write_str(self.writer, &xref, &mut self.offset)?;

        let trailer = format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.next_id, PDF_CATALOG_ID, info_id, xref_start
        );
        write_str(self.writer, &trailer, &mut self.offset)?;
        self.writer.flush()?;
        Ok(self.offset)
    }
}

fn collect_fonts(document: &Document) -> Vec<StandardFont> {
    let mut fonts: Vec<StandardFont> = Vec::new();
    for page in &document.pages {
        for cmd in &page.commands {
            if let Command::Text { font, .. } = cmd {
                if !fonts.contains(font) {
                    fonts.push(*font);
                }
            }
        }
    }
    fonts
}

fn font_object(font: StandardFont) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        font.base_font_name()
    )
}

fn font_resources(fonts: &[(String, usize)]) -> String {
    let mut entries = Vec::new();
    for (resource, font_id) in fonts {
        entries.push(format!("/{} {} 0 R", resource, font_id));
    }
    format!("<< {} >>", entries.join(" "))
}

fn stream_object(content: &str) -> String {
    let length = content.len();
    format!("<< /Length {} >>\nstream\n{}\nendstream", length, content)
}

fn info_object(title: Option<&str>, producer: &str) -> String {
    let mut entries: Vec<String> = Vec::new();
    if let Some(title) = title {
        entries.push(format!(
            "/Title ({})",
            encode_winansi_pdf_string(title).text
        ));
    }
    entries.push(format!(
        "/Producer ({})",
        encode_winansi_pdf_string(producer).text
    ));
    format!("<< {} >>", entries.join(" "))
}

fn write_pdf_object<W: Write>(
    writer: &mut W,
    offset: &mut usize,
    offsets: &mut [usize],
    obj_id: usize,
    body: &str,
) -> io::Result<()> {
    if let Some(slot) = offsets.get_mut(obj_id) {
        *slot = *offset;
    }
    write_str(writer, &format!("{} 0 obj\n", obj_id), offset)?;
    write_bytes(writer, body.as_bytes(), offset)?;
    write_bytes(writer, b"\nendobj\n", offset)?;
    Ok(())
}

fn write_bytes<W: Write>(writer: &mut W, data: &[u8], offset: &mut usize) -> io::Result<()> {
    writer.write_all(data)?;
    *offset += data.len();
    Ok(())
}

fn write_str<W: Write>(writer: &mut W, data: &str, offset: &mut usize) -> io::Result<()> {
    write_bytes(writer, data.as_bytes(), offset)
}

struct WinAnsiEncoded {
    text: String,
    replaced: usize,
}

// Produces the body of a PDF literal string. Bytes outside printable ASCII are
// octal-escaped so the content stream stays 7-bit.
fn encode_winansi_pdf_string(input: &str) -> WinAnsiEncoded {
    let mut out = String::with_capacity(input.len());
    let mut replaced = 0usize;
    for ch in input.chars() {
        let byte = match winansi_byte(ch) {
            Some(byte) => byte,
            None => {
                replaced += 1;
                b'?'
            }
        };
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b if b >= 0x7f => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }
    WinAnsiEncoded {
        text: out,
        replaced,
    }
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn fmt_unit(value: f32) -> String {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    format_milli((value as f64 * 1000.0).round() as i64)
}

fn color_to_pdf_fill(color: Color) -> String {
    format!(
        "{} {} {} rg\n",
        fmt_unit(color.r),
        fmt_unit(color.g),
        fmt_unit(color.b)
    )
}

fn color_to_pdf_stroke(color: Color) -> String {
    format!(
        "{} {} {} RG\n",
        fmt_unit(color.r),
        fmt_unit(color.g),
        fmt_unit(color.b)
    )
}
