use tracing::debug;

use super::{Browser, BrowserError, TabHandle};

/// A secondary tab that is released explicitly.
///
/// Async code cannot close a tab from `Drop`, so the contract is structural:
/// run the work inside the tab, keep its result, call [`TabScope::close`],
/// and only then inspect the result.
///
/// ```ignore
/// let scope = TabScope::open(&mut browser, &main).await?;
/// let outcome = extract(&mut browser).await;
/// scope.close(&mut browser).await?;
/// let page = outcome?;
/// ```
#[derive(Debug)]
#[must_use = "a TabScope must be closed to restore focus to the main tab"]
pub struct TabScope {
    main: TabHandle,
    tab: TabHandle,
}

impl TabScope {
    /// Open a new tab and focus it.
    pub async fn open<B: Browser>(browser: &mut B, main: &TabHandle) -> Result<Self, BrowserError> {
        let tab = browser.open_tab().await?;
        browser.switch_to(&tab).await?;
        debug!(target: "w3c.browser", %tab, "secondary tab opened");
        Ok(Self {
            main: main.clone(),
            tab,
        })
    }

    /// Close the scoped tab and give focus back to the main tab.
    pub async fn close<B: Browser>(self, browser: &mut B) -> Result<(), BrowserError> {
        if browser.current_tab().await.ok().as_ref() != Some(&self.tab) {
            browser.switch_to(&self.tab).await?;
        }
        browser.close_tab().await?;
        browser.switch_to(&self.main).await?;
        debug!(target: "w3c.browser", tab = %self.tab, "secondary tab closed");
        Ok(())
    }
}

/// Close every tab other than `main` and focus `main`.
///
/// Returns how many stray tabs were closed.
pub async fn restore_main<B: Browser>(
    browser: &mut B,
    main: &TabHandle,
) -> Result<usize, BrowserError> {
    let mut closed = 0;
    for tab in browser.tabs().await? {
        if &tab == main {
            continue;
        }
        browser.switch_to(&tab).await?;
        browser.close_tab().await?;
        closed += 1;
    }
    browser.switch_to(main).await?;
    if closed > 0 {
        debug!(target: "w3c.browser", closed, "closed stray tabs");
    }
    Ok(closed)
}
