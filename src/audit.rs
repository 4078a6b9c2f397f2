//! Offline audit (dry run).
//!
//! Classifies every candidate cell of a saved page exactly the way a live
//! session would, but activates nothing. Useful for checking what a sweep
//! *would* do against a snapshot of your own following list before letting
//! it loose on the real page.

use serde::Serialize;

use crate::classify::{classify_cell, resolve_identity, Classification, KeywordSet};
use crate::dom::snapshot::SnapshotDom;
use crate::dom::{DescendantQuery, DomError, PageDom};

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub identity: String,
    pub classification: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub cells: usize,
    pub actionable: usize,
    pub mutual: usize,
    pub no_link: usize,
    pub no_control: usize,
    pub entries: Vec<AuditEntry>,
}

impl AuditReport {
    pub fn render_table(&self) -> String {
        let mut id_w = "identity".len();
        for e in &self.entries {
            id_w = id_w.max(e.identity.len());
        }

        let mut table = String::new();
        table.push_str(&format!("{:<id_w$}  classification\n", "identity"));
        for e in &self.entries {
            table.push_str(&format!("{:<id_w$}  {}\n", e.identity, e.classification));
        }
        table.push_str(&format!(
            "\ncells: {}  actionable: {}  mutual: {}  no-link: {}  no-control: {}\n",
            self.cells, self.actionable, self.mutual, self.no_link, self.no_control
        ));
        table
    }
}

/// Audit a saved HTML document.
pub async fn audit_html(html: &str, keywords: &KeywordSet) -> Result<AuditReport, DomError> {
    let dom = SnapshotDom::parse(html);
    audit_page(&dom, keywords).await
}

/// Audit any document the capability interface can reach.
pub async fn audit_page(
    page: &dyn PageDom,
    keywords: &KeywordSet,
) -> Result<AuditReport, DomError> {
    let cells = page.find_all(DescendantQuery::ListCells).await?;

    let mut report = AuditReport {
        cells: cells.len(),
        actionable: 0,
        mutual: 0,
        no_link: 0,
        no_control: 0,
        entries: Vec::with_capacity(cells.len()),
    };

    for cell in &cells {
        let classification = classify_cell(cell.as_ref(), keywords).await?;
        match classification {
            // The discovered control is dropped untouched; this pass never
            // activates anything.
            Classification::ActOn(_) => report.actionable += 1,
            Classification::SkipMutual => report.mutual += 1,
            Classification::SkipNoLink => report.no_link += 1,
            Classification::SkipNoControl => report.no_control += 1,
        }
        report.entries.push(AuditEntry {
            identity: resolve_identity(cell.as_ref()).await,
            classification: classification.label(),
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div data-testid="UserCell"><span>Sponsored</span></div>
          <div data-testid="UserCell">
            <a href="/friend" role="link">Friend</a> Follows you
            <div role="button">Following</div>
          </div>
          <div data-testid="UserCell">
            <a href="/stranger" role="link">Stranger</a>
            <div role="button">Following</div>
          </div>
          <div data-testid="cellInnerDiv">
            <a href="/pending" role="link">Pending</a>
            <div role="button">Requested</div>
          </div>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_audit_counts_and_entries() {
        let report = audit_html(PAGE, &KeywordSet::builtin()).await.unwrap();
        assert_eq!(report.cells, 4);
        assert_eq!(report.no_link, 1);
        assert_eq!(report.mutual, 1);
        assert_eq!(report.actionable, 1);
        assert_eq!(report.no_control, 1);

        assert_eq!(report.entries[0].identity, "unknown");
        assert_eq!(report.entries[1].identity, "friend");
        assert_eq!(report.entries[2].identity, "stranger");
        assert_eq!(report.entries[2].classification, "act_on");
        assert_eq!(report.entries[3].identity, "pending");
    }

    #[tokio::test]
    async fn test_audit_never_activates() {
        let dom = SnapshotDom::parse(PAGE);
        audit_page(&dom, &KeywordSet::builtin()).await.unwrap();
        assert!(dom.events().is_empty());
    }
}
