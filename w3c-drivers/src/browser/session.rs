use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{BrowserError, By};

/// Opaque identifier of a browser tab (a WebDriver window handle).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TabHandle(String);

impl TabHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One browser session, driven strictly sequentially.
///
/// Queries and reads run against the focused tab; navigation and tab
/// management take `&mut self` because they change what "focused" means.
/// `find`/`find_in` fail with [`BrowserError::NoSuchElement`] when nothing
/// matches, while the `find_all` variants return an empty list.
#[async_trait]
pub trait Browser: Send + Sync {
    type Element: Clone + Send + Sync;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<Url, BrowserError>;

    async fn find(&self, by: &By) -> Result<Self::Element, BrowserError>;

    async fn find_all(&self, by: &By) -> Result<Vec<Self::Element>, BrowserError>;

    /// Query relative to `scope` (XPath `..` climbs from the scope element).
    async fn find_in(&self, scope: &Self::Element, by: &By)
        -> Result<Self::Element, BrowserError>;

    async fn find_all_in(
        &self,
        scope: &Self::Element,
        by: &By,
    ) -> Result<Vec<Self::Element>, BrowserError>;

    /// Wait up to `timeout` for `by` to match; fails with
    /// [`BrowserError::Timeout`] when it never does.
    async fn wait_for(&self, by: &By, timeout: Duration) -> Result<Self::Element, BrowserError>;

    /// Visible text of the element.
    async fn text(&self, element: &Self::Element) -> Result<String, BrowserError>;

    async fn attr(&self, element: &Self::Element, name: &str)
        -> Result<Option<String>, BrowserError>;

    async fn current_tab(&self) -> Result<TabHandle, BrowserError>;

    async fn tabs(&self) -> Result<Vec<TabHandle>, BrowserError>;

    /// Open a blank tab. Focus stays where it was.
    async fn open_tab(&mut self) -> Result<TabHandle, BrowserError>;

    async fn switch_to(&mut self, tab: &TabHandle) -> Result<(), BrowserError>;

    /// Close the focused tab. Nothing has focus afterwards until
    /// [`Browser::switch_to`] is called.
    async fn close_tab(&mut self) -> Result<(), BrowserError>;
}
