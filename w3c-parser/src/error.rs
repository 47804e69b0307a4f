use url::Url;
use w3c_drivers::browser::BrowserError;

use crate::sink::SinkError;

/// Why a single listing item produced no record.
///
/// Every variant except [`ItemError::Browser`] is local to the item: the
/// traversal logs it and moves on. A browser failure means the session itself
/// misbehaved and ends the run.
#[derive(thiserror::Error, Debug)]
pub enum ItemError {
    #[error("listing item has no readable title")]
    MissingTitle,

    #[error("listing item `{title}` has no link")]
    MissingLink { title: String },

    #[error("listing item `{title}` links to `{href}`, which is not a URL")]
    InvalidLink {
        title: String,
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("listing item `{title}` has no publication date")]
    MissingDate { title: String },

    #[error("listing item `{title}` has publication date `{raw}`, expected YYYY-MM-DD")]
    MalformedDate {
        title: String,
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("document page {link} has no body")]
    MissingBody { link: Url },

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Failures that end a traversal.
#[derive(thiserror::Error, Debug)]
pub enum ParserError {
    #[error("browser failure: {0}")]
    Browser(#[from] BrowserError),

    #[error("sink failure: {0}")]
    Sink(#[from] SinkError),
}
