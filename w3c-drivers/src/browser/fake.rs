//! Scripted in-memory browser.
//!
//! Pages are registered by URL. Each page holds plain nodes (text plus
//! attributes) and canned answers for `(scope, By)` queries, so a test states
//! exactly which elements a selector would match without needing a DOM or an
//! XPath engine. Tab bookkeeping follows WebDriver: new tabs do not take focus,
//! closing a tab leaves nothing focused, and an element read from a page
//! other than the focused one is reported as stale.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{Browser, BrowserError, By, TabHandle};

pub type NodeId = usize;

const BLANK: &str = "about:blank";

#[derive(Debug, Clone, Default)]
struct FakeNode {
    text: String,
    attrs: HashMap<String, String>,
}

/// One scripted page.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    nodes: Vec<FakeNode>,
    answers: HashMap<(Option<NodeId>, By), Vec<NodeId>>,
    failures: HashSet<(Option<NodeId>, By)>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with visible `text`.
    pub fn node(&mut self, text: impl Into<String>) -> NodeId {
        self.node_with(text, &[])
    }

    /// Add a node with visible `text` and attributes.
    pub fn node_with(&mut self, text: impl Into<String>, attrs: &[(&str, &str)]) -> NodeId {
        self.nodes.push(FakeNode {
            text: text.into(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self.nodes.len() - 1
    }

    /// Make `by`, evaluated from `scope` (`None` = document), match `nodes`.
    /// Repeated calls append.
    pub fn answer(&mut self, scope: Option<NodeId>, by: By, nodes: &[NodeId]) -> &mut Self {
        self.answers
            .entry((scope, by))
            .or_default()
            .extend_from_slice(nodes);
        self
    }

    /// Make `by`, evaluated from `scope`, fail with a command error.
    pub fn fail(&mut self, scope: Option<NodeId>, by: By) -> &mut Self {
        self.failures.insert((scope, by));
        self
    }

    fn query(&self, scope: Option<NodeId>, by: &By) -> Result<&[NodeId], BrowserError> {
        if self.failures.contains(&(scope, *by)) {
            return Err(BrowserError::Command(format!("scripted failure for {by}")));
        }
        Ok(self
            .answers
            .get(&(scope, *by))
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }
}

/// Handle to a node on a specific page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    url: String,
    node: NodeId,
}

#[derive(Debug, Clone)]
struct FakeTab {
    handle: TabHandle,
    url: String,
}

/// Scripted browser with one initially focused tab.
#[derive(Debug)]
pub struct FakeBrowser {
    pages: HashMap<String, FakePage>,
    tabs: Vec<FakeTab>,
    focus: Option<TabHandle>,
    next_tab: usize,
    visits: Vec<String>,
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBrowser {
    pub fn new() -> Self {
        let main = TabHandle::new("tab-0");
        Self {
            pages: HashMap::new(),
            tabs: vec![FakeTab {
                handle: main.clone(),
                url: BLANK.to_string(),
            }],
            focus: Some(main),
            next_tab: 1,
            visits: Vec::new(),
        }
    }

    /// Register `page` under `url`. Unregistered URLs load as empty pages.
    pub fn with_page(mut self, url: impl Into<String>, page: FakePage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Every URL navigated to, in order.
    pub fn visits(&self) -> &[String] {
        &self.visits
    }

    pub fn open_tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn focused(&self) -> Option<&TabHandle> {
        self.focus.as_ref()
    }

    fn focused_tab(&self) -> Result<&FakeTab, BrowserError> {
        let handle = self
            .focus
            .as_ref()
            .ok_or_else(|| BrowserError::NoSuchWindow("nothing focused".into()))?;
        self.tabs
            .iter()
            .find(|tab| &tab.handle == handle)
            .ok_or_else(|| BrowserError::NoSuchWindow(handle.to_string()))
    }

    fn focused_page(&self) -> Result<(&str, Option<&FakePage>), BrowserError> {
        let tab = self.focused_tab()?;
        Ok((tab.url.as_str(), self.pages.get(&tab.url)))
    }

    fn collect(
        &self,
        scope: Option<&FakeElement>,
        by: &By,
    ) -> Result<Vec<FakeElement>, BrowserError> {
        let (url, page) = self.focused_page()?;
        if let Some(scope) = scope {
            if scope.url != url {
                return Err(BrowserError::StaleElement);
            }
        }
        let Some(page) = page else {
            return Ok(Vec::new());
        };
        let nodes = page.query(scope.map(|s| s.node), by)?;
        Ok(nodes
            .iter()
            .map(|&node| FakeElement {
                url: url.to_string(),
                node,
            })
            .collect())
    }

    fn first(&self, scope: Option<&FakeElement>, by: &By) -> Result<FakeElement, BrowserError> {
        self.collect(scope, by)?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::NoSuchElement(by.to_string()))
    }

    fn node(&self, element: &FakeElement) -> Result<&FakeNode, BrowserError> {
        let (url, page) = self.focused_page()?;
        if element.url != url {
            return Err(BrowserError::StaleElement);
        }
        page.and_then(|p| p.nodes.get(element.node))
            .ok_or(BrowserError::StaleElement)
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Element = FakeElement;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        let focus = self
            .focus
            .clone()
            .ok_or_else(|| BrowserError::NoSuchWindow("nothing focused".into()))?;
        let tab = self
            .tabs
            .iter_mut()
            .find(|tab| tab.handle == focus)
            .ok_or_else(|| BrowserError::NoSuchWindow(focus.to_string()))?;
        tab.url = url.to_string();
        self.visits.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<Url, BrowserError> {
        let tab = self.focused_tab()?;
        Url::parse(&tab.url).map_err(|e| BrowserError::Command(e.to_string()))
    }

    async fn find(&self, by: &By) -> Result<FakeElement, BrowserError> {
        self.first(None, by)
    }

    async fn find_all(&self, by: &By) -> Result<Vec<FakeElement>, BrowserError> {
        self.collect(None, by)
    }

    async fn find_in(&self, scope: &FakeElement, by: &By) -> Result<FakeElement, BrowserError> {
        self.first(Some(scope), by)
    }

    async fn find_all_in(
        &self,
        scope: &FakeElement,
        by: &By,
    ) -> Result<Vec<FakeElement>, BrowserError> {
        self.collect(Some(scope), by)
    }

    async fn wait_for(&self, by: &By, timeout: Duration) -> Result<FakeElement, BrowserError> {
        match self.first(None, by) {
            Err(BrowserError::NoSuchElement(query)) => {
                Err(BrowserError::Timeout { query, timeout })
            }
            other => other,
        }
    }

    async fn text(&self, element: &FakeElement) -> Result<String, BrowserError> {
        Ok(self.node(element)?.text.clone())
    }

    async fn attr(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        Ok(self.node(element)?.attrs.get(name).cloned())
    }

    async fn current_tab(&self) -> Result<TabHandle, BrowserError> {
        Ok(self.focused_tab()?.handle.clone())
    }

    async fn tabs(&self) -> Result<Vec<TabHandle>, BrowserError> {
        Ok(self.tabs.iter().map(|tab| tab.handle.clone()).collect())
    }

    async fn open_tab(&mut self) -> Result<TabHandle, BrowserError> {
        let handle = TabHandle::new(format!("tab-{}", self.next_tab));
        self.next_tab += 1;
        self.tabs.push(FakeTab {
            handle: handle.clone(),
            url: BLANK.to_string(),
        });
        Ok(handle)
    }

    async fn switch_to(&mut self, tab: &TabHandle) -> Result<(), BrowserError> {
        if !self.tabs.iter().any(|t| &t.handle == tab) {
            return Err(BrowserError::NoSuchWindow(tab.to_string()));
        }
        self.focus = Some(tab.clone());
        Ok(())
    }

    async fn close_tab(&mut self) -> Result<(), BrowserError> {
        let focus = self
            .focus
            .take()
            .ok_or_else(|| BrowserError::NoSuchWindow("nothing focused".into()))?;
        self.tabs.retain(|tab| tab.handle != focus);
        Ok(())
    }
}
