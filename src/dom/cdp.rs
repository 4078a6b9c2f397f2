//! Live DOM backend over CDP.
//!
//! Wraps a `chromiumoxide` page and its element handles behind the
//! [`PageDom`]/[`DomNode`] capability traits. Element handles are resolved
//! once per query; the session loop deliberately snapshots the cell list a
//! single time at start, so a handle invalidated by list virtualization
//! surfaces as a per-cell backend error and the loop moves on.

use anyhow::anyhow;
use async_trait::async_trait;
use chromiumoxide::{Element, Page};

use super::{DescendantQuery, DomError, DomNode, PageDom};

/// Live document handle.
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl PageDom for CdpPage {
    async fn find_all(&self, query: DescendantQuery) -> Result<Vec<Box<dyn DomNode>>, DomError> {
        let elements = self
            .page
            .find_elements(query.css())
            .await
            .map_err(|e| DomError::Backend(anyhow!("querySelectorAll failed: {}", e)))?;
        Ok(elements
            .into_iter()
            .map(|el| Box::new(CdpNode { el }) as Box<dyn DomNode>)
            .collect())
    }
}

/// Live element handle.
pub struct CdpNode {
    el: Element,
}

impl CdpNode {
    /// Evaluate a zero-argument function against this element and pull its
    /// string result, tolerating nulls and eval failures.
    async fn string_js(&self, function: &str) -> Option<String> {
        let ret = self.el.call_js_fn(function, false).await.ok()?;
        ret.result
            .value
            .and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

#[async_trait]
impl DomNode for CdpNode {
    async fn inner_text(&self) -> Option<String> {
        self.string_js("function() { return this.innerText; }").await
    }

    async fn text_content(&self) -> Option<String> {
        self.string_js("function() { return this.textContent; }")
            .await
    }

    async fn attr(&self, name: &str) -> Option<String> {
        self.el.attribute(name).await.ok().flatten()
    }

    async fn find_all(&self, query: DescendantQuery) -> Result<Vec<Box<dyn DomNode>>, DomError> {
        let elements = self
            .el
            .find_elements(query.css())
            .await
            .map_err(|e| DomError::Backend(anyhow!("scoped querySelectorAll failed: {}", e)))?;
        Ok(elements
            .into_iter()
            .map(|el| Box::new(CdpNode { el }) as Box<dyn DomNode>)
            .collect())
    }

    async fn activate(&self) -> Result<(), DomError> {
        self.el
            .click()
            .await
            .map_err(|e| DomError::Backend(anyhow!("click failed: {}", e)))?;
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<(), DomError> {
        self.el
            .scroll_into_view()
            .await
            .map_err(|e| DomError::Backend(anyhow!("scrollIntoView failed: {}", e)))?;
        Ok(())
    }
}
