use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder, Locator};
use tracing::{debug, info};
use url::Url;

use super::capabilities::{build_capabilities, BrowserOptions};
use super::{Browser, BrowserError, By, TabHandle};

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Create a new session on the WebDriver service named in `options`.
    pub async fn connect(options: &BrowserOptions) -> Result<Self, BrowserError> {
        let client = ClientBuilder::native()
            .capabilities(build_capabilities(options))
            .connect(&options.webdriver_url)
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;

        info!(
            target: "w3c.browser",
            webdriver = %options.webdriver_url,
            headless = options.headless,
            "WebDriver session started"
        );
        Ok(Self { client })
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<(), BrowserError> {
        self.client
            .close()
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))
    }
}

/// Owned form of a [`By`]; `Locator` borrows its query.
enum Query {
    Css(String),
    Id(&'static str),
    XPath(&'static str),
}

impl Query {
    fn locator(&self) -> Locator<'_> {
        match self {
            Query::Css(css) => Locator::Css(css),
            Query::Id(id) => Locator::Id(id),
            Query::XPath(xpath) => Locator::XPath(xpath),
        }
    }
}

impl From<&By> for Query {
    fn from(by: &By) -> Self {
        match *by {
            By::Css(css) | By::Tag(css) => Query::Css(css.to_string()),
            By::Class(class) => Query::Css(format!(".{class}")),
            By::Id(id) => Query::Id(id),
            By::XPath(xpath) => Query::XPath(xpath),
        }
    }
}

fn lookup_error(err: CmdError, by: &By) -> BrowserError {
    if err.is_no_such_element() {
        BrowserError::NoSuchElement(by.to_string())
    } else {
        BrowserError::Command(err.to_string())
    }
}

fn command_error(err: CmdError) -> BrowserError {
    BrowserError::Command(err.to_string())
}

fn window_handle(tab: &TabHandle) -> Result<WindowHandle, BrowserError> {
    WindowHandle::try_from(tab.as_str().to_string())
        .map_err(|_| BrowserError::NoSuchWindow(tab.to_string()))
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = Element;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        debug!(target: "w3c.browser", %url, "navigating");
        self.client
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn current_url(&self) -> Result<Url, BrowserError> {
        self.client.current_url().await.map_err(command_error)
    }

    async fn find(&self, by: &By) -> Result<Element, BrowserError> {
        let query = Query::from(by);
        self.client
            .find(query.locator())
            .await
            .map_err(|e| lookup_error(e, by))
    }

    async fn find_all(&self, by: &By) -> Result<Vec<Element>, BrowserError> {
        let query = Query::from(by);
        self.client
            .find_all(query.locator())
            .await
            .map_err(|e| lookup_error(e, by))
    }

    async fn find_in(&self, scope: &Element, by: &By) -> Result<Element, BrowserError> {
        let query = Query::from(by);
        scope
            .find(query.locator())
            .await
            .map_err(|e| lookup_error(e, by))
    }

    async fn find_all_in(&self, scope: &Element, by: &By) -> Result<Vec<Element>, BrowserError> {
        let query = Query::from(by);
        scope
            .find_all(query.locator())
            .await
            .map_err(|e| lookup_error(e, by))
    }

    async fn wait_for(&self, by: &By, timeout: Duration) -> Result<Element, BrowserError> {
        let query = Query::from(by);
        self.client
            .wait()
            .at_most(timeout)
            .for_element(query.locator())
            .await
            .map_err(|e| match e {
                CmdError::WaitTimeout => BrowserError::Timeout {
                    query: by.to_string(),
                    timeout,
                },
                other => lookup_error(other, by),
            })
    }

    async fn text(&self, element: &Element) -> Result<String, BrowserError> {
        element.text().await.map_err(command_error)
    }

    async fn attr(&self, element: &Element, name: &str) -> Result<Option<String>, BrowserError> {
        element.attr(name).await.map_err(command_error)
    }

    async fn current_tab(&self) -> Result<TabHandle, BrowserError> {
        let handle = self.client.window().await.map_err(command_error)?;
        Ok(TabHandle::new(String::from(handle)))
    }

    async fn tabs(&self) -> Result<Vec<TabHandle>, BrowserError> {
        let handles = self.client.windows().await.map_err(command_error)?;
        Ok(handles
            .into_iter()
            .map(|handle| TabHandle::new(String::from(handle)))
            .collect())
    }

    async fn open_tab(&mut self) -> Result<TabHandle, BrowserError> {
        let response = self.client.new_window(true).await.map_err(command_error)?;
        Ok(TabHandle::new(String::from(response.handle)))
    }

    async fn switch_to(&mut self, tab: &TabHandle) -> Result<(), BrowserError> {
        let handle = window_handle(tab)?;
        self.client
            .switch_to_window(handle)
            .await
            .map_err(command_error)
    }

    async fn close_tab(&mut self) -> Result<(), BrowserError> {
        self.client.close_window().await.map_err(command_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_and_tag_queries_become_css() {
        match Query::from(&By::Class("tr-list__item__header")) {
            Query::Css(css) => assert_eq!(css, ".tr-list__item__header"),
            _ => panic!("expected css"),
        }
        match Query::from(&By::Tag("body")) {
            Query::Css(css) => assert_eq!(css, "body"),
            _ => panic!("expected css"),
        }
    }

    #[test]
    fn xpath_and_id_keep_their_kind() {
        assert!(matches!(Query::from(&By::Id("abstract")), Query::Id("abstract")));
        assert!(matches!(Query::from(&By::XPath("../../h2")), Query::XPath("../../h2")));
    }
}
