use std::time::Duration;

use tracing::{debug, warn};
use w3c_drivers::browser::{Browser, BrowserError, Presence};

use crate::fields::{optional_href, resolve_href, texts};
use crate::selectors::{COMMIT_HISTORY_LINK, COMMIT_MESSAGE, COMMIT_TIMELINE};

/// Follow the page's "Commit history" link and collect commit messages.
///
/// - no link (or an unusable one): `None`
/// - link followed but the timeline never renders within `timeout`: `Some(vec![])`
///
/// Navigates the focused tab away from the document page.
pub async fn read_history<B: Browser>(
    browser: &mut B,
    timeout: Duration,
) -> Result<Option<Vec<String>>, BrowserError> {
    let Some(href) = optional_href(browser, &COMMIT_HISTORY_LINK).await? else {
        debug!(target: "w3c.commits", "no commit history link");
        return Ok(None);
    };

    let base = browser.current_url().await?;
    let target = match resolve_href(&base, &href) {
        Ok(url) => url,
        Err(err) => {
            warn!(target: "w3c.commits", %href, error = %err, "unusable commit history link");
            return Ok(None);
        }
    };

    browser.goto(target.as_str()).await?;

    if browser
        .wait_for(&COMMIT_TIMELINE, timeout)
        .await
        .present()?
        .is_none()
    {
        warn!(
            target: "w3c.commits",
            url = %target,
            ?timeout,
            "commit timeline did not render"
        );
        return Ok(Some(Vec::new()));
    }

    let messages = texts(browser, None, &COMMIT_MESSAGE).await?;
    debug!(target: "w3c.commits", url = %target, count = messages.len(), "commit messages read");
    Ok(Some(messages))
}
