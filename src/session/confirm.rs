//! Confirmation-dialog polling.

use std::time::Duration;

use tokio::time::Instant;

use crate::classify::keywords::KeywordSet;
use crate::classify::text::extract_text;
use crate::dom::{DescendantQuery, DomError, DomNode, PageDom};

/// Polls the document for the transient confirmation control the host page
/// may present after the primary action is activated.
///
/// Lookup strategy, in priority order:
/// 1. the stable confirmation-sheet marker,
/// 2. button-like elements whose test id carries the action keyword,
/// 3. a full scan of native buttons for a confirmation-keyword label.
///
/// A timeout is NOT an error: the page sometimes completes the action with
/// no dialog at all, so the caller treats `None` as presumed success.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationWaiter {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationWaiter {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(300),
            timeout: Duration::from_millis(7_000),
        }
    }
}

impl ConfirmationWaiter {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Wait for a confirmation control, bounded by the configured timeout.
    pub async fn wait(
        &self,
        page: &dyn PageDom,
        keywords: &KeywordSet,
    ) -> Result<Option<Box<dyn DomNode>>, DomError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(control) = self.scan(page, keywords).await? {
                return Ok(Some(control));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn scan(
        &self,
        page: &dyn PageDom,
        keywords: &KeywordSet,
    ) -> Result<Option<Box<dyn DomNode>>, DomError> {
        let primary = page.find_all(DescendantQuery::ConfirmPrimary).await?;
        if let Some(control) = primary.into_iter().next() {
            return Ok(Some(control));
        }

        let marked = page.find_all(DescendantQuery::ConfirmKeyword).await?;
        if let Some(control) = marked.into_iter().next() {
            return Ok(Some(control));
        }

        for button in page.find_all(DescendantQuery::AllButtons).await? {
            let label = extract_text(Some(button.as_ref())).await;
            if keywords.confirm().matches(&label) {
                return Ok(Some(button));
            }
        }
        Ok(None)
    }
}
