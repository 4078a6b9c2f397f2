//! Action-control discovery within a cell.

use crate::classify::keywords::KeywordSet;
use crate::classify::text::extract_text;
use crate::dom::{DescendantQuery, DomError, DomNode};

/// Find the control that performs the reversible action: the first
/// button-like descendant (native or role-annotated) whose visible label
/// carries a control keyword. Substring matching tolerates decorative
/// characters around the label. `None` is a skip condition, not an error.
pub async fn find_action_control(
    cell: &dyn DomNode,
    keywords: &KeywordSet,
) -> Result<Option<Box<dyn DomNode>>, DomError> {
    for control in cell.find_all(DescendantQuery::ActionControls).await? {
        let label = extract_text(Some(control.as_ref())).await;
        if keywords.control().matches(&label) {
            return Ok(Some(control));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::snapshot::SnapshotDom;
    use crate::dom::PageDom;

    async fn locate(cell_body: &str) -> Option<String> {
        let html = format!(r#"<div data-testid="UserCell">{}</div>"#, cell_body);
        let dom = SnapshotDom::parse(&html);
        let cells = dom.find_all(DescendantQuery::ListCells).await.unwrap();
        let found = find_action_control(cells[0].as_ref(), &KeywordSet::builtin())
            .await
            .unwrap();
        match found {
            Some(control) => Some(extract_text(Some(control.as_ref())).await),
            None => None,
        }
    }

    #[tokio::test]
    async fn test_following_control_is_found() {
        assert_eq!(
            locate(r#"<div role="button">Following</div>"#).await.as_deref(),
            Some("following")
        );
    }

    #[tokio::test]
    async fn test_first_match_wins_in_document_order() {
        let label = locate(
            r#"<div role="button">Message</div>
               <div role="button">Following</div>
               <div role="button">More</div>"#,
        )
        .await;
        assert_eq!(label.as_deref(), Some("following"));
    }

    #[tokio::test]
    async fn test_follow_button_is_not_a_match() {
        // "Follow" means the relationship is NOT active; acting on it would
        // follow a stranger, not unfollow one.
        assert_eq!(locate(r#"<button>Follow</button>"#).await, None);
    }

    #[tokio::test]
    async fn test_case_insensitive_label() {
        assert!(locate(r#"<button>FOLLOWING</button>"#).await.is_some());
    }

    #[tokio::test]
    async fn test_decorated_label_still_matches() {
        assert!(locate(r#"<button>✓ Following</button>"#).await.is_some());
    }

    #[tokio::test]
    async fn test_persian_label_matches() {
        assert!(locate(r#"<div role="button">دنبال می‌کنید</div>"#).await.is_some());
    }

    #[tokio::test]
    async fn test_anchor_with_button_role_counts() {
        assert!(locate(r#"<a role="button" href="/x">Unfollow</a>"#).await.is_some());
    }
}
