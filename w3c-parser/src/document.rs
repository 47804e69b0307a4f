use tracing::{debug, warn};
use url::Url;
use w3c_drivers::browser::{Browser, Presence};

use crate::commits;
use crate::error::ItemError;
use crate::fields::{optional_href, optional_text, resolve_href, texts};
use crate::listing::ListingEntry;
use crate::parser::ParserSettings;
use crate::selectors::{ABSTRACT, AUTHORS, DOC_STATE, EDITORS, PAGE_BODY, VERSION_LINK};

/// Fields read from a report's own page (and its commit history).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPage {
    pub text: String,
    pub abstract_text: Option<String>,
    pub version_link: Url,
    pub doc_type: Option<String>,
    pub authors: Vec<String>,
    pub editors: Vec<String>,
    pub commits: Option<Vec<String>>,
}

/// Navigate the focused tab to the entry's link and read the document.
///
/// Expects to run inside a secondary tab; the commit history, when linked,
/// is loaded into the same tab afterwards.
pub async fn read_document<B: Browser>(
    browser: &mut B,
    entry: &ListingEntry,
    settings: &ParserSettings,
) -> Result<DocumentPage, ItemError> {
    browser.goto(entry.link.as_str()).await?;

    let body = browser
        .wait_for(&PAGE_BODY, settings.element_timeout)
        .await
        .present()?
        .ok_or_else(|| ItemError::MissingBody {
            link: entry.link.clone(),
        })?;
    let text = browser.text(&body).await?;

    let abstract_text = optional_text(browser, &ABSTRACT).await?;
    if abstract_text.is_none() {
        debug!(target: "w3c.document", link = %entry.link, "no abstract");
    }

    let version_link = read_version_link(browser, entry).await?;
    let doc_type = optional_text(browser, &DOC_STATE).await?;
    let authors = texts(browser, None, &AUTHORS).await?;
    let editors = texts(browser, None, &EDITORS).await?;

    let commits = commits::read_history(browser, settings.commit_timeout).await?;

    Ok(DocumentPage {
        text,
        abstract_text,
        version_link,
        doc_type,
        authors,
        editors,
        commits,
    })
}

/// The dated "This version" link, falling back to the listing link.
async fn read_version_link<B: Browser>(
    browser: &B,
    entry: &ListingEntry,
) -> Result<Url, ItemError> {
    let Some(href) = optional_href(browser, &VERSION_LINK).await? else {
        warn!(
            target: "w3c.document",
            fallback = %entry.link,
            "no dated version link; using listing link"
        );
        return Ok(entry.link.clone());
    };

    let base = browser.current_url().await?;
    match resolve_href(&base, &href) {
        Ok(url) => Ok(url),
        Err(err) => {
            warn!(
                target: "w3c.document",
                %href,
                fallback = %entry.link,
                error = %err,
                "unusable dated version link; using listing link"
            );
            Ok(entry.link.clone())
        }
    }
}
