use crate::error::Result;
use crate::row::RowRecord;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

pub const PDF_MIME: &str = "application/pdf";
pub const CSV_MIME: &str = "text/csv;charset=utf-8";
pub const JSON_MIME: &str = "application/json";

/// A finished export, ready to hand to a [`crate::Delivery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub fn new(name: impl Into<String>, mime: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn sha256_hex(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            let _ = write!(&mut out, "{b:02x}");
        }
        out
    }
}

/// Appends `.pdf` unless the name already ends with it.
pub fn pdf_file_name(name: &str) -> String {
    if name.ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{name}.pdf")
    }
}

/// Comma separated values with a header line of `headers`. Lines are joined
/// with `\n` and there is no trailing newline.
pub fn export_csv(rows: &[RowRecord], headers: &[&str], name: &str) -> ExportedFile {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in rows {
        let fields: Vec<String> = headers
            .iter()
            .map(|key| csv_field(&row.display(key)))
            .collect();
        lines.push(fields.join(","));
    }
    ExportedFile::new(name, CSV_MIME, lines.join("\n").into_bytes())
}

fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Pretty JSON array of the rows, keys in insertion order.
pub fn export_json(rows: &[RowRecord], name: &str) -> Result<ExportedFile> {
    let body = serde_json::to_string_pretty(rows)?;
    Ok(ExportedFile::new(name, JSON_MIME, body.into_bytes()))
}
