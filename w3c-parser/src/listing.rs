use chrono::NaiveDate;
use tracing::{debug, warn};
use url::Url;
use w3c_drivers::browser::{Browser, Presence};

use crate::error::ItemError;
use crate::fields::{parse_published, resolve_href, texts};
use crate::selectors::{
    DATETIME_ATTR, HREF_ATTR, ITEM_ANCHOR, ITEM_DELIVERERS, ITEM_FAMILY, ITEM_TAGS, ITEM_TIME,
};

/// Everything the index page says about one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    /// Latest-version URL from the listing anchor.
    pub link: Url,
    pub published: NaiveDate,
    pub tags: Vec<String>,
    pub deliverers: Vec<String>,
    /// Section heading the item is grouped under; empty when missing.
    pub family: String,
}

/// Read a listing item, starting from its header element.
///
/// Title, link and publication date are required; tags, deliverers and
/// family degrade to empty values.
pub async fn read_entry<B: Browser>(
    browser: &B,
    header: &B::Element,
    index_url: &Url,
) -> Result<ListingEntry, ItemError> {
    let anchor = browser
        .find_in(header, &ITEM_ANCHOR)
        .await
        .present()?
        .ok_or(ItemError::MissingTitle)?;

    let title = browser.text(&anchor).await?.trim().to_string();
    if title.is_empty() {
        return Err(ItemError::MissingTitle);
    }

    let href = browser
        .attr(&anchor, HREF_ATTR)
        .await?
        .filter(|href| !href.trim().is_empty())
        .ok_or_else(|| ItemError::MissingLink {
            title: title.clone(),
        })?;
    let link = resolve_href(index_url, &href).map_err(|source| ItemError::InvalidLink {
        title: title.clone(),
        href: href.clone(),
        source,
    })?;

    let published = read_published(browser, header, &title).await?;

    let tags = texts(browser, Some(header), &ITEM_TAGS).await?;
    let deliverers = texts(browser, Some(header), &ITEM_DELIVERERS).await?;

    let family = match browser.find_in(header, &ITEM_FAMILY).await.present()? {
        Some(heading) => browser.text(&heading).await?.trim().to_string(),
        None => String::new(),
    };
    if family.is_empty() {
        warn!(target: "w3c.listing", %title, "no family heading above listing item");
    }

    debug!(
        target: "w3c.listing",
        %title,
        %link,
        %published,
        tags = tags.len(),
        deliverers = deliverers.len(),
        "listing item read"
    );

    Ok(ListingEntry {
        title,
        link,
        published,
        tags,
        deliverers,
        family,
    })
}

async fn read_published<B: Browser>(
    browser: &B,
    header: &B::Element,
    title: &str,
) -> Result<NaiveDate, ItemError> {
    let missing = || ItemError::MissingDate {
        title: title.to_string(),
    };
    let time = browser
        .find_in(header, &ITEM_TIME)
        .await
        .present()?
        .ok_or_else(missing)?;
    let raw = browser
        .attr(&time, DATETIME_ATTR)
        .await?
        .ok_or_else(missing)?;
    parse_published(&raw).map_err(|source| ItemError::MalformedDate {
        title: title.to_string(),
        raw,
        source,
    })
}
