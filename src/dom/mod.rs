//! Narrow DOM capability interface.
//!
//! The classification heuristics and the session loop never touch a concrete
//! DOM library. They see the host page through two object-safe traits,
//! a document root ([`PageDom`]) and an element handle ([`DomNode`]), whose
//! whole surface is: extract text, find descendants matching a closed query,
//! activate, bring into view. The live backend ([`cdp`]) maps queries onto
//! CSS selectors over CDP; the offline backend ([`snapshot`]) matches the
//! same queries structurally against parsed HTML, which is what the test
//! suite and the audit mode run on.

pub mod browser;
pub mod cdp;
pub mod snapshot;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("dom backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

/// The structural markers this engine relies on, as a closed query set.
///
/// The host page was not designed for automation; these are the markers its
/// list UI is observed to carry. Centralizing them here keeps the heuristics
/// free of scattered selector literals and lets the offline backend mirror
/// the live one exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescendantQuery {
    /// Candidate user-list cells (the page uses either marker depending on
    /// context).
    ListCells,
    /// Anchor descendants carrying an href.
    Links,
    /// Button-like descendants: native buttons or explicit button roles.
    ActionControls,
    /// The stable confirmation-sheet affordance.
    ConfirmPrimary,
    /// Button-like elements whose test id carries the action keyword.
    ConfirmKeyword,
    /// Every native button in the document (confirmation full-scan fallback).
    AllButtons,
}

impl DescendantQuery {
    /// CSS equivalent used by the live CDP backend.
    pub fn css(self) -> &'static str {
        match self {
            DescendantQuery::ListCells => {
                r#"div[data-testid="UserCell"], div[data-testid="cellInnerDiv"]"#
            }
            DescendantQuery::Links => "a[href]",
            DescendantQuery::ActionControls => {
                r#"div[role="button"], button, a[role="button"]"#
            }
            DescendantQuery::ConfirmPrimary => r#"[data-testid="confirmationSheetConfirm"]"#,
            DescendantQuery::ConfirmKeyword => {
                r#"div[role="button"][data-testid*="unfollow"], button[data-testid*="unfollow"]"#
            }
            DescendantQuery::AllButtons => "button",
        }
    }
}

/// Capability handle to one rendered element.
///
/// The engine only reads from handles and invokes activation on discovered
/// sub-elements; it never mutates element structure.
#[async_trait]
pub trait DomNode: Send + Sync {
    /// Rendered text (innerText equivalent), when the backend can produce
    /// it. Reflects CSS visibility, so it is preferred for matching.
    async fn inner_text(&self) -> Option<String>;

    /// Raw text content (textContent equivalent).
    async fn text_content(&self) -> Option<String>;

    /// Attribute value, when present.
    async fn attr(&self, name: &str) -> Option<String>;

    /// Descendants matching `query`, in document order.
    async fn find_all(&self, query: DescendantQuery) -> Result<Vec<Box<dyn DomNode>>, DomError>;

    /// Simulated primary interaction (click).
    async fn activate(&self) -> Result<(), DomError>;

    /// Scroll the element into the viewport.
    async fn scroll_into_view(&self) -> Result<(), DomError>;
}

/// Capability handle to the document root.
#[async_trait]
pub trait PageDom: Send + Sync {
    /// Document-wide matches for `query`, in document order.
    async fn find_all(&self, query: DescendantQuery) -> Result<Vec<Box<dyn DomNode>>, DomError>;
}
