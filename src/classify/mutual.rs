//! Mutual-relationship detection.
//!
//! A mutual must never be acted on; a false negative here is the one
//! classification mistake that causes real damage, so the check runs over
//! the whole cell text rather than any particular badge element.

use crate::classify::keywords::KeywordSet;
use crate::classify::text::extract_text;
use crate::dom::DomNode;

/// True iff the cell's visible text carries any registered mutual phrase.
/// Text-less cells are never mutual.
pub async fn is_mutual(cell: &dyn DomNode, keywords: &KeywordSet) -> bool {
    let text = extract_text(Some(cell)).await;
    keywords.mutual().matches(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::snapshot::SnapshotDom;
    use crate::dom::{DescendantQuery, PageDom};

    async fn cell_is_mutual(body: &str) -> bool {
        let html = format!(r#"<div data-testid="UserCell">{}</div>"#, body);
        let dom = SnapshotDom::parse(&html);
        let cells = dom.find_all(DescendantQuery::ListCells).await.unwrap();
        is_mutual(cells[0].as_ref(), &KeywordSet::builtin()).await
    }

    #[tokio::test]
    async fn test_english_phrase() {
        assert!(cell_is_mutual("John Doe Follows you").await);
    }

    #[tokio::test]
    async fn test_case_insensitive() {
        assert!(cell_is_mutual("JOHN DOE FOLLOWS YOU").await);
    }

    #[tokio::test]
    async fn test_persian_phrase() {
        assert!(cell_is_mutual("جان دو شما را دنبال می‌کند").await);
    }

    #[tokio::test]
    async fn test_plain_handle_is_not_mutual() {
        assert!(!cell_is_mutual("John Doe @johndoe").await);
    }

    #[tokio::test]
    async fn test_empty_cell_is_not_mutual() {
        assert!(!cell_is_mutual("").await);
    }
}
