//! Document fetch and text extraction.
//!
//! Downloads a document from a URL and extracts plain text. The format is
//! decided by the URL path extension (query string ignored): PDF via
//! `pdf-extract`, DOCX by reading `word/document.xml` out of the ZIP
//! container, anything else is treated as plain text.

use hackrx_core::{AppError, AppResult};
use std::io::Read;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
}

impl DocumentFormat {
    /// Decide the format from a URL, looking only at the path extension.
    ///
    /// Unknown extensions fall back to plain text; the extractor reports
    /// `UnsupportedFormat` only if the payload then fails to decode.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let extension = path.rsplit('.').next().unwrap_or("").to_lowercase();

        match extension.as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Text,
        }
    }
}

/// Fetch a document from a URL and extract its plain text.
///
/// Network failures map to `Transport`, extraction failures to `Document`.
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> AppResult<String> {
    tracing::info!("Fetching document from {}", redact_url(url));

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Transport(format!("Failed to fetch document: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Transport(format!(
            "Document fetch returned {}",
            status
        )));
    }

    let format = DocumentFormat::from_url(url);
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Transport(format!("Failed to read document body: {}", e)))?;

    let text = extract_text(format, &bytes)?;

    tracing::info!(
        "Extracted {} bytes of text from {:?} document",
        text.len(),
        format
    );

    Ok(text)
}

/// Extract plain text from a document payload.
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> AppResult<String> {
    match format {
        DocumentFormat::Pdf => extract_pdf(bytes),
        DocumentFormat::Docx => extract_docx(bytes),
        DocumentFormat::Text => String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::UnsupportedFormat("payload is not valid UTF-8 text".to_string())),
    }
}

fn extract_pdf(bytes: &[u8]) -> AppResult<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::Document(format!("Failed to extract PDF text: {}", e)))
}

/// DOCX is a ZIP container; the body lives in `word/document.xml`.
fn extract_docx(bytes: &[u8]) -> AppResult<String> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| AppError::Document(format!("Failed to open DOCX archive: {}", e)))?;

    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Document(format!("DOCX has no word/document.xml: {}", e)))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| AppError::Document(format!("Failed to read DOCX body: {}", e)))?;

    Ok(extract_docx_text_runs(&xml))
}

/// Pull the `<w:t>` text runs out of the document XML, inserting a newline at
/// each paragraph end (`</w:p>`).
fn extract_docx_text_runs(xml: &str) -> String {
    let mut text = String::new();
    let mut rest = xml;

    loop {
        // Next text run or paragraph close, whichever comes first
        let run_pos = rest.find("<w:t");
        let para_pos = rest.find("</w:p>");

        match (run_pos, para_pos) {
            (Some(run), Some(para)) if para < run => {
                text.push('\n');
                rest = &rest[para + "</w:p>".len()..];
            }
            (Some(run), _) => {
                let after_tag = &rest[run..];
                // The tag may carry attributes, e.g. <w:t xml:space="preserve">
                let Some(open_end) = after_tag.find('>') else {
                    break;
                };
                // Self-closing run (<w:t/>) holds no text
                if after_tag[..open_end].ends_with('/') {
                    rest = &after_tag[open_end + 1..];
                    continue;
                }
                let content = &after_tag[open_end + 1..];
                let Some(close) = content.find("</w:t>") else {
                    break;
                };
                text.push_str(&decode_xml_entities(&content[..close]));
                rest = &content[close + "</w:t>".len()..];
            }
            (None, Some(para)) => {
                text.push('\n');
                rest = &rest[para + "</w:p>".len()..];
            }
            (None, None) => break,
        }
    }

    text.trim().to_string()
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}

/// Strip credentials-bearing query strings before logging a URL.
fn redact_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_url() {
        assert_eq!(
            DocumentFormat::from_url("https://host/assets/policy.pdf?sv=abc&sig=def"),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_url("https://host/terms.docx"),
            DocumentFormat::Docx
        );
        assert_eq!(
            DocumentFormat::from_url("https://host/notes.txt"),
            DocumentFormat::Text
        );
        assert_eq!(
            DocumentFormat::from_url("https://host/no-extension"),
            DocumentFormat::Text
        );
    }

    #[test]
    fn test_format_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_url("https://host/POLICY.PDF"),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn test_extract_plain_text() {
        let text = extract_text(DocumentFormat::Text, b"hello policy").unwrap();
        assert_eq!(text, "hello policy");
    }

    #[test]
    fn test_extract_plain_text_invalid_utf8() {
        let result = extract_text(DocumentFormat::Text, &[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_docx_text_runs() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Knee surgery is covered</w:t></w:r>
                 <w:r><w:t xml:space="preserve"> after 2 years.</w:t></w:r></w:p>
            <w:p><w:r><w:t>Dental is excluded.</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let text = extract_docx_text_runs(xml);
        assert_eq!(
            text,
            "Knee surgery is covered after 2 years.\nDental is excluded."
        );
    }

    #[test]
    fn test_docx_entities_decoded() {
        let xml = "<w:p><w:t>Terms &amp; conditions &lt;apply&gt;</w:t></w:p>";
        assert_eq!(
            extract_docx_text_runs(xml),
            "Terms & conditions <apply>"
        );
    }

    #[test]
    fn test_docx_self_closing_run() {
        let xml = "<w:p><w:t/><w:t>after empty run</w:t></w:p>";
        assert_eq!(extract_docx_text_runs(xml), "after empty run");
    }

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("https://host/policy.pdf?sig=secret"),
            "https://host/policy.pdf"
        );
    }
}
