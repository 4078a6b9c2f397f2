//! Canonical identity extraction from a list cell.
//!
//! The first non-empty path segment of a profile link is the identity
//! token. A cell carries many links that are not profile links (status
//! permalinks, intent handoffs), and matching one of those as an identity
//! is a correctness bug, so exclusion runs before anything else. Links
//! explicitly role-marked as navigation win over unmarked ones.

use url::Url;

use crate::dom::{DescendantQuery, DomError, DomNode};

/// Returned when no qualifying profile link exists in a cell.
pub const IDENTITY_SENTINEL: &str = "unknown";

/// Path segments that disqualify a link from being a profile reference.
const EXCLUDED_PATH_SEGMENTS: &[&str] = &["status", "intent"];

/// Extract an identity token from a single href, or `None` when the href is
/// not a profile reference. Malformed and relative hrefs are non-matching,
/// never an error.
fn identity_from_href(href: &str) -> Option<String> {
    if !href.starts_with('/') {
        return None;
    }
    let base = Url::parse("https://host.invalid/").ok()?;
    let resolved = base.join(href).ok()?;
    let segments: Vec<&str> = resolved
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();
    let first = *segments.first()?;
    if segments
        .iter()
        .any(|s| EXCLUDED_PATH_SEGMENTS.contains(s))
    {
        return None;
    }
    Some(first.to_string())
}

/// Resolve the cell's identity token, or [`IDENTITY_SENTINEL`].
pub async fn resolve_identity(cell: &dyn DomNode) -> String {
    let Ok(links) = cell.find_all(DescendantQuery::Links).await else {
        return IDENTITY_SENTINEL.to_string();
    };

    let mut unmarked = None;
    for link in &links {
        let Some(href) = link.attr("href").await else {
            continue;
        };
        let Some(identity) = identity_from_href(&href) else {
            continue;
        };
        if link.attr("role").await.as_deref() == Some("link") {
            // Explicitly marked navigational profile link wins outright.
            return identity;
        }
        if unmarked.is_none() {
            unmarked = Some(identity);
        }
    }
    unmarked.unwrap_or_else(|| IDENTITY_SENTINEL.to_string())
}

/// Step-zero gate: does the cell carry any in-page link at all? Cells
/// without one are ad or placeholder rows, skipped before classification.
pub async fn has_candidate_link(cell: &dyn DomNode) -> Result<bool, DomError> {
    let links = cell.find_all(DescendantQuery::Links).await?;
    for link in &links {
        if link
            .attr("href")
            .await
            .is_some_and(|href| href.starts_with('/'))
        {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::snapshot::SnapshotDom;
    use crate::dom::PageDom;

    async fn resolve(cell_body: &str) -> String {
        let html = format!(r#"<div data-testid="UserCell">{}</div>"#, cell_body);
        let dom = SnapshotDom::parse(&html);
        let cells = dom.find_all(DescendantQuery::ListCells).await.unwrap();
        resolve_identity(cells[0].as_ref()).await
    }

    #[tokio::test]
    async fn test_marked_profile_link() {
        assert_eq!(
            resolve(r#"<a href="/johndoe" role="link">John</a>"#).await,
            "johndoe"
        );
    }

    #[tokio::test]
    async fn test_no_links_yields_sentinel() {
        assert_eq!(resolve("<span>no links here</span>").await, "unknown");
    }

    #[tokio::test]
    async fn test_status_permalink_is_excluded() {
        assert_eq!(
            resolve(r#"<a href="/johndoe/status/123456">post</a>"#).await,
            "unknown"
        );
    }

    #[tokio::test]
    async fn test_intent_link_is_excluded() {
        assert_eq!(
            resolve(r#"<a href="/intent/follow?user=x">follow</a>"#).await,
            "unknown"
        );
    }

    #[tokio::test]
    async fn test_underscores_and_digits_survive() {
        assert_eq!(resolve(r#"<a href="/user_123_test">u</a>"#).await, "user_123_test");
    }

    #[tokio::test]
    async fn test_absolute_and_relative_hrefs_are_non_matching() {
        assert_eq!(
            resolve(r#"<a href="https://elsewhere.example/johndoe">x</a>"#).await,
            "unknown"
        );
        assert_eq!(resolve(r#"<a href="johndoe">x</a>"#).await, "unknown");
    }

    #[tokio::test]
    async fn test_marked_link_preferred_over_earlier_unmarked() {
        let id = resolve(
            r#"<a href="/promoted_thing">ad</a>
               <a href="/johndoe" role="link">John</a>"#,
        )
        .await;
        assert_eq!(id, "johndoe");
    }

    #[tokio::test]
    async fn test_first_unmarked_wins_without_marked() {
        let id = resolve(
            r#"<a href="/first_user">a</a>
               <a href="/second_user">b</a>"#,
        )
        .await;
        assert_eq!(id, "first_user");
    }

    #[tokio::test]
    async fn test_query_and_fragment_are_ignored() {
        assert_eq!(
            resolve(r#"<a href="/johndoe?ref=sidebar#top">j</a>"#).await,
            "johndoe"
        );
    }

    #[tokio::test]
    async fn test_has_candidate_link() {
        let html = r#"
            <div data-testid="UserCell"><a href="/someone">x</a></div>
            <div data-testid="UserCell"><a href="https://offsite.example/a">x</a></div>
            <div data-testid="UserCell"><span>adtext</span></div>
        "#;
        let dom = SnapshotDom::parse(html);
        let cells = dom.find_all(DescendantQuery::ListCells).await.unwrap();
        assert!(has_candidate_link(cells[0].as_ref()).await.unwrap());
        assert!(!has_candidate_link(cells[1].as_ref()).await.unwrap());
        assert!(!has_candidate_link(cells[2].as_ref()).await.unwrap());
    }
}
