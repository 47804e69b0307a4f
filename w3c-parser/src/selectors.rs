//! Element queries for the three page kinds the harvester reads.
//!
//! Listing queries prefixed `ITEM_` are evaluated relative to a
//! [`LISTING_HEADER`] element.
use w3c_drivers::browser::By;

// Index page.
pub const LISTING_HEADER: By = By::Class("tr-list__item__header");
pub const ITEM_ANCHOR: By = By::Tag("a");
pub const ITEM_TIME: By = By::XPath("..//time");
pub const ITEM_TAGS: By = By::XPath("..//*[contains(text(), 'Tags')]/../dd");
pub const ITEM_DELIVERERS: By = By::XPath("..//*[contains(text(), 'Deliverers')]/../dd");
pub const ITEM_FAMILY: By = By::XPath("../../h2");

pub const DATETIME_ATTR: &str = "datetime";
pub const HREF_ATTR: &str = "href";

// Document page.
pub const PAGE_BODY: By = By::Tag("body");
pub const ABSTRACT: By = By::Id("abstract");
pub const VERSION_LINK: By =
    By::XPath("//dt[contains(text(), 'This version')]/following-sibling::dd[1]//a");
pub const DOC_STATE: By = By::XPath("//p[@id = 'w3c-state']/a");
pub const AUTHORS: By = By::XPath(
    "//dt[contains(text(), 'Authors')]/following-sibling::dd[@class='editor p-author h-card vcard']",
);
pub const EDITORS: By = By::XPath(
    "//dt[contains(text(), 'Editors')]/following-sibling::dd[@class='editor p-author h-card vcard']",
);
pub const COMMIT_HISTORY_LINK: By = By::XPath("//a[contains(text(), 'Commit history')]");

// Commit history page (GitHub).
pub const COMMIT_TIMELINE: By =
    By::XPath("//div[@class='TimelineItem TimelineItem--condensed pt-0 pb-2']");
pub const COMMIT_MESSAGE: By = By::XPath(
    "//div[@class='TimelineItem TimelineItem--condensed pt-0 pb-2']//p[contains(@class,'mb-1')]",
);
