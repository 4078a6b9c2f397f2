//! Offline DOM backend over parsed HTML.
//!
//! `scraper` parses the markup once; the element tree is then lowered into an
//! owned, thread-safe form so handles stay valid without holding the parser's
//! borrow. This backend powers the audit (dry-run) mode and the whole test
//! suite: it answers the same [`DescendantQuery`] set as the live backend,
//! records every activation, and can synthesize the confirmation sheet the
//! host page shows after an action control is clicked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scraper::{ElementRef, Html};

use super::{DescendantQuery, DomError, DomNode, PageDom};

/// Reserved id for the synthesized confirmation control.
const CONFIRM_NODE_ID: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEventKind {
    Activated,
    ScrolledIntoView,
}

/// One interaction the engine performed against the snapshot.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub node_id: usize,
    pub label: String,
    pub kind: DomEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmBehavior {
    /// No confirmation sheet ever appears (the ambiguous-timeout path).
    Never,
    /// The sheet appears once an action control has been activated and
    /// disappears when the sheet itself is activated.
    AfterActivation,
}

#[derive(Debug)]
struct OwnedElement {
    id: usize,
    tag: String,
    attrs: HashMap<String, String>,
    /// Concatenated descendant text, as the parser saw it.
    text: String,
    children: Vec<Arc<OwnedElement>>,
}

impl OwnedElement {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn role_is(&self, role: &str) -> bool {
        self.attr("role") == Some(role)
    }

    fn matches(&self, query: DescendantQuery) -> bool {
        match query {
            DescendantQuery::ListCells => {
                self.tag == "div"
                    && matches!(
                        self.attr("data-testid"),
                        Some("UserCell") | Some("cellInnerDiv")
                    )
            }
            DescendantQuery::Links => self.tag == "a" && self.attr("href").is_some(),
            DescendantQuery::ActionControls => {
                (self.tag == "div" && self.role_is("button"))
                    || self.tag == "button"
                    || (self.tag == "a" && self.role_is("button"))
            }
            DescendantQuery::ConfirmPrimary => {
                self.attr("data-testid") == Some("confirmationSheetConfirm")
            }
            DescendantQuery::ConfirmKeyword => {
                let button_like =
                    (self.tag == "div" && self.role_is("button")) || self.tag == "button";
                button_like
                    && self
                        .attr("data-testid")
                        .is_some_and(|t| t.contains("unfollow"))
            }
            DescendantQuery::AllButtons => self.tag == "button",
        }
    }
}

fn lower(el: ElementRef<'_>, next_id: &mut usize) -> Arc<OwnedElement> {
    let id = *next_id;
    *next_id += 1;
    let attrs = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let text = el.text().collect::<String>();
    let children = el
        .children()
        .filter_map(ElementRef::wrap)
        .map(|child| lower(child, next_id))
        .collect();
    Arc::new(OwnedElement {
        id,
        tag: el.value().name().to_string(),
        attrs,
        text,
        children,
    })
}

fn collect_matches(
    el: &Arc<OwnedElement>,
    query: DescendantQuery,
    out: &mut Vec<Arc<OwnedElement>>,
) {
    for child in &el.children {
        if child.matches(query) {
            out.push(Arc::clone(child));
        }
        collect_matches(child, query, out);
    }
}

#[derive(Debug)]
struct SnapshotInner {
    root: Arc<OwnedElement>,
    confirm: ConfirmBehavior,
    confirm_node: Arc<OwnedElement>,
    /// True between an action-control activation and the confirmation
    /// activation that settles it.
    confirm_pending: AtomicBool,
    events: Mutex<Vec<DomEvent>>,
}

impl SnapshotInner {
    fn record(&self, el: &OwnedElement, kind: DomEventKind) {
        let label = el.text.trim().to_string();
        self.events
            .lock()
            .expect("snapshot event journal poisoned")
            .push(DomEvent {
                node_id: el.id,
                label,
                kind,
            });
    }
}

/// Parsed-HTML document handle implementing [`PageDom`].
#[derive(Clone)]
pub struct SnapshotDom {
    inner: Arc<SnapshotInner>,
}

impl SnapshotDom {
    /// Parse a document. No confirmation sheet will ever appear.
    pub fn parse(html: &str) -> Self {
        Self::build(html, ConfirmBehavior::Never)
    }

    /// Parse a document whose confirmation sheet appears after any action
    /// control is activated, mirroring the live page's dialog flow.
    pub fn parse_with_confirmation_sheet(html: &str) -> Self {
        Self::build(html, ConfirmBehavior::AfterActivation)
    }

    fn build(html: &str, confirm: ConfirmBehavior) -> Self {
        let document = Html::parse_document(html);
        let mut next_id = 0;
        let root = lower(document.root_element(), &mut next_id);

        let confirm_node = Arc::new(OwnedElement {
            id: CONFIRM_NODE_ID,
            tag: "button".to_string(),
            attrs: HashMap::from([(
                "data-testid".to_string(),
                "confirmationSheetConfirm".to_string(),
            )]),
            text: "Unfollow".to_string(),
            children: Vec::new(),
        });

        Self {
            inner: Arc::new(SnapshotInner {
                root,
                confirm,
                confirm_node,
                confirm_pending: AtomicBool::new(false),
                events: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Every interaction recorded so far, in occurrence order.
    pub fn events(&self) -> Vec<DomEvent> {
        self.inner
            .events
            .lock()
            .expect("snapshot event journal poisoned")
            .clone()
    }

    /// Labels of activated elements, in activation order.
    pub fn activations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == DomEventKind::Activated)
            .map(|e| e.label)
            .collect()
    }

    fn node(&self, el: Arc<OwnedElement>) -> Box<dyn DomNode> {
        Box::new(SnapshotNode {
            inner: Arc::clone(&self.inner),
            el,
        })
    }
}

#[async_trait]
impl PageDom for SnapshotDom {
    async fn find_all(&self, query: DescendantQuery) -> Result<Vec<Box<dyn DomNode>>, DomError> {
        let mut matches = Vec::new();
        if self.inner.root.matches(query) {
            matches.push(Arc::clone(&self.inner.root));
        }
        collect_matches(&self.inner.root, query, &mut matches);

        if query == DescendantQuery::ConfirmPrimary
            && self.inner.confirm == ConfirmBehavior::AfterActivation
            && self.inner.confirm_pending.load(Ordering::SeqCst)
        {
            matches.insert(0, Arc::clone(&self.inner.confirm_node));
        }

        Ok(matches.into_iter().map(|el| self.node(el)).collect())
    }
}

struct SnapshotNode {
    inner: Arc<SnapshotInner>,
    el: Arc<OwnedElement>,
}

#[async_trait]
impl DomNode for SnapshotNode {
    async fn inner_text(&self) -> Option<String> {
        // No layout offline: rendered text and raw text coincide.
        Some(self.el.text.clone())
    }

    async fn text_content(&self) -> Option<String> {
        Some(self.el.text.clone())
    }

    async fn attr(&self, name: &str) -> Option<String> {
        self.el.attrs.get(name).cloned()
    }

    async fn find_all(&self, query: DescendantQuery) -> Result<Vec<Box<dyn DomNode>>, DomError> {
        let mut matches = Vec::new();
        collect_matches(&self.el, query, &mut matches);
        Ok(matches
            .into_iter()
            .map(|el| {
                Box::new(SnapshotNode {
                    inner: Arc::clone(&self.inner),
                    el,
                }) as Box<dyn DomNode>
            })
            .collect())
    }

    async fn activate(&self) -> Result<(), DomError> {
        self.inner.record(&self.el, DomEventKind::Activated);
        if self.inner.confirm == ConfirmBehavior::AfterActivation {
            if self.el.id == CONFIRM_NODE_ID {
                self.inner.confirm_pending.store(false, Ordering::SeqCst);
            } else {
                self.inner.confirm_pending.store(true, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<(), DomError> {
        self.inner.record(&self.el, DomEventKind::ScrolledIntoView);
        Ok(())
    }
}
