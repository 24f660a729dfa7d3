//! Link filtering by URL path.

use url::{ParseError, Url};

/// True if the URL path ends with `.pdf`, ignoring case, query and fragment.
///
/// Relative links are inspected the same way; any other unparseable link is
/// not a PDF.
pub fn looks_like_pdf(link: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => has_pdf_suffix(url.path()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let without_fragment = link.split('#').next().unwrap_or_default();
            let path = without_fragment.split('?').next().unwrap_or_default();
            has_pdf_suffix(path)
        }
        Err(_) => false,
    }
}

/// Whether a returned link should be kept for the output
pub fn keep_link(link: &str, include_non_pdf: bool) -> bool {
    !link.is_empty() && (include_non_pdf || looks_like_pdf(link))
}

fn has_pdf_suffix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".pdf")
}
