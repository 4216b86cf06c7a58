use crate::error::IngestError;
use lopdf::Document;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
        let document =
            Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (number, _object_id) in document.get_pages() {
            let text = document
                .extract_text(&[number])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;

            // Scanned pages come back empty; there is nothing to index.
            if !text.trim().is_empty() {
                pages.push(PageText { number, text });
            }
        }

        if pages.is_empty() {
            return Err(IngestError::PdfParse(format!(
                "no readable page text in {}",
                path.display()
            )));
        }

        Ok(pages)
    }
}
