//! Per-cell classification pipeline.

pub mod control;
pub mod identity;
pub mod keywords;
pub mod mutual;
pub mod text;

pub use identity::{has_candidate_link, resolve_identity, IDENTITY_SENTINEL};
pub use keywords::{KeywordMatcher, KeywordSet};
pub use text::extract_text;

use crate::dom::{DomError, DomNode};

/// Outcome of classifying one cell. Computed fresh per cell, never cached.
pub enum Classification {
    /// The cell is actionable; carries the control to activate.
    ActOn(Box<dyn DomNode>),
    /// The other party follows back; protected from action.
    SkipMutual,
    /// No in-page link at all (ad or placeholder row).
    SkipNoLink,
    /// A real user row, but no reversible-action control present.
    SkipNoControl,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::ActOn(_) => "act_on",
            Classification::SkipMutual => "skip_mutual",
            Classification::SkipNoLink => "skip_no_link",
            Classification::SkipNoControl => "skip_no_control",
        }
    }
}

/// Run the classifiers in their strict order, short-circuiting at the first
/// decision: link gate, mutual protection, control discovery.
pub async fn classify_cell(
    cell: &dyn DomNode,
    keywords: &KeywordSet,
) -> Result<Classification, DomError> {
    if !has_candidate_link(cell).await? {
        return Ok(Classification::SkipNoLink);
    }
    if mutual::is_mutual(cell, keywords).await {
        return Ok(Classification::SkipMutual);
    }
    match control::find_action_control(cell, keywords).await? {
        Some(control) => Ok(Classification::ActOn(control)),
        None => Ok(Classification::SkipNoControl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::snapshot::SnapshotDom;
    use crate::dom::{DescendantQuery, PageDom};

    async fn classify(cell_body: &str) -> &'static str {
        let html = format!(r#"<div data-testid="UserCell">{}</div>"#, cell_body);
        let dom = SnapshotDom::parse(&html);
        let cells = dom.find_all(DescendantQuery::ListCells).await.unwrap();
        classify_cell(cells[0].as_ref(), &KeywordSet::builtin())
            .await
            .unwrap()
            .label()
    }

    #[tokio::test]
    async fn test_linkless_cell_short_circuits_before_mutual() {
        // Text says mutual, but the link gate runs first.
        assert_eq!(classify("Follows you, but no links").await, "skip_no_link");
    }

    #[tokio::test]
    async fn test_mutual_protected_even_with_control() {
        let label = classify(
            r#"<a href="/friend" role="link">Friend</a>
               Follows you
               <div role="button">Following</div>"#,
        )
        .await;
        assert_eq!(label, "skip_mutual");
    }

    #[tokio::test]
    async fn test_no_control_skips() {
        let label = classify(
            r#"<a href="/stranger" role="link">Stranger</a>
               <div role="button">Message</div>"#,
        )
        .await;
        assert_eq!(label, "skip_no_control");
    }

    #[tokio::test]
    async fn test_actionable_cell() {
        let label = classify(
            r#"<a href="/stranger" role="link">Stranger</a>
               <div role="button">Following</div>"#,
        )
        .await;
        assert_eq!(label, "act_on");
    }
}
