//! Content extraction: turn a file into text for the description service.
//!
//! The enrichment pass only depends on [`Extractor`]; [`DocumentExtractor`] is the default and
//! covers plain text, Word, spreadsheets and PDF.

use calamine::Reader as _;
use quick_xml::events::Event;
use std::fs;
use std::io::Read as _;
use std::path::Path;

use crate::engine::tools::extension_of;
use crate::error::ExtractError;
use crate::utils::config::{DOCUMENT_EXTENSIONS, PLAIN_TEXT_EXTENSIONS};

/// Pluggable per-type text extraction.
pub trait Extractor: Send + Sync {
    /// Extract raw text from `path` (`size` is the on-disk size in bytes).
    fn extract(&self, path: &Path, size: u64) -> Result<String, ExtractError>;
}

/// Default extractor: plain text read lossily, `.docx`, `.xlsx`/`.xls`, `.pdf`.
#[derive(Clone, Debug)]
pub struct DocumentExtractor {
    max_file_size: u64,
}

impl DocumentExtractor {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

impl Extractor for DocumentExtractor {
    fn extract(&self, path: &Path, size: u64) -> Result<String, ExtractError> {
        let ext = extension_of(path);
        if !is_extractable(&ext) {
            return Err(ExtractError::Unsupported(if ext.is_empty() {
                "no extension".to_string()
            } else {
                format!(".{ext}")
            }));
        }
        if size > self.max_file_size {
            return Err(ExtractError::TooLarge {
                size,
                max: self.max_file_size,
            });
        }
        match ext.as_str() {
            "docx" => read_docx(path),
            "xlsx" | "xls" => read_spreadsheet(path),
            "pdf" => read_pdf(path),
            _ => read_text(path),
        }
    }
}

/// True for extensions (lower-case, no dot) the default extractor can read.
pub fn is_extractable(ext: &str) -> bool {
    PLAIN_TEXT_EXTENSIONS.contains(&ext) || DOCUMENT_EXTENSIONS.contains(&ext)
}

fn read_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Paragraph text of `word/document.xml`, one paragraph per line.
fn read_docx(path: &Path) -> Result<String, ExtractError> {
    let file = fs::File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ExtractError::Parse(format!("docx zip: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Parse("docx: missing word/document.xml".to_string()))?
        .read_to_string(&mut xml)?;

    let mut reader = quick_xml::Reader::from_str(&xml);
    let mut out = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                if let Ok(text) = e.unescape() {
                    out.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Parse(format!("docx xml: {e}"))),
            _ => {}
        }
    }
    Ok(out)
}

/// Every sheet, one tab-separated line per row.
fn read_spreadsheet(path: &Path) -> Result<String, ExtractError> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| ExtractError::Parse(format!("spreadsheet: {e}")))?;
    let mut out = String::new();
    for sheet in workbook.sheet_names() {
        let Ok(range) = workbook.worksheet_range(&sheet) else {
            continue;
        };
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
    }
    Ok(out)
}

fn read_pdf(path: &Path) -> Result<String, ExtractError> {
    pdf_extract::extract_text(path).map_err(|e| ExtractError::Parse(format!("pdf: {e}")))
}
