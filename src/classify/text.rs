//! Visible-text extraction for matching.

use crate::dom::DomNode;

/// Normalize an element's visible text: rendered text when the backend can
/// produce it (it reflects CSS visibility, which is what a human sees), raw
/// text content otherwise, trimmed and case-folded. Absent elements and
/// text-less elements yield the empty string.
pub async fn extract_text(node: Option<&dyn DomNode>) -> String {
    let Some(node) = node else {
        return String::new();
    };
    let raw = match node.inner_text().await {
        Some(rendered) if !rendered.is_empty() => rendered,
        _ => node.text_content().await.unwrap_or_default(),
    };
    raw.trim().to_lowercase()
}
