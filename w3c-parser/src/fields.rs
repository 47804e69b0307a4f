use chrono::NaiveDate;
use url::Url;
use w3c_drivers::browser::{Browser, BrowserError, By, Presence};

/// Trimmed, non-empty texts of every element matching `by` under `scope`
/// (or the whole page).
pub(crate) async fn texts<B: Browser>(
    browser: &B,
    scope: Option<&B::Element>,
    by: &By,
) -> Result<Vec<String>, BrowserError> {
    let elements = match scope {
        Some(scope) => browser.find_all_in(scope, by).await?,
        None => browser.find_all(by).await?,
    };
    let mut out = Vec::with_capacity(elements.len());
    for element in &elements {
        let text = browser.text(element).await?;
        let text = text.trim();
        if !text.is_empty() {
            out.push(text.to_string());
        }
    }
    Ok(out)
}

/// Trimmed text of the first page element matching `by`; `None` when there
/// is no such element or it is blank.
pub(crate) async fn optional_text<B: Browser>(
    browser: &B,
    by: &By,
) -> Result<Option<String>, BrowserError> {
    let Some(element) = browser.find(by).await.present()? else {
        return Ok(None);
    };
    let text = browser.text(&element).await?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// `href` attribute of the first page element matching `by`.
pub(crate) async fn optional_href<B: Browser>(
    browser: &B,
    by: &By,
) -> Result<Option<String>, BrowserError> {
    let Some(element) = browser.find(by).await.present()? else {
        return Ok(None);
    };
    Ok(browser
        .attr(&element, crate::selectors::HREF_ATTR)
        .await?
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty()))
}

/// Resolve a possibly relative `href` the way the page would.
pub(crate) fn resolve_href(base: &Url, href: &str) -> Result<Url, url::ParseError> {
    base.join(href.trim())
}

/// Listing dates are plain ISO calendar dates.
pub(crate) fn parse_published(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
}
