use std::time::Duration;

use tracing::{error, info};
use url::Url;
use w3c_drivers::browser::{Browser, TabHandle, TabScope, restore_main};

use crate::document::read_document;
use crate::error::{ItemError, ParserError};
use crate::listing::read_entry;
use crate::record::DocumentRecord;
use crate::selectors::LISTING_HEADER;
use crate::sink::{Acceptance, DocumentSink};

pub const W3C_TR_INDEX: &str = "https://www.w3.org/TR/";

#[derive(Debug, Clone)]
pub struct ParserSettings {
    pub index_url: Url,
    /// Ceiling for a document body to appear after navigation.
    pub element_timeout: Duration,
    /// Ceiling for the commit timeline to render.
    pub commit_timeout: Duration,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            index_url: Url::parse(W3C_TR_INDEX).expect("static index URL parses"),
            element_timeout: Duration::from_secs(20),
            commit_timeout: Duration::from_secs(10),
        }
    }
}

/// Outcome counters of one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Listing items found on the index.
    pub listed: usize,
    /// Records handed to the sink.
    pub emitted: usize,
    /// Items dropped with an item-level error.
    pub skipped: usize,
    /// The sink asked to stop before the listing was exhausted.
    pub stopped_early: bool,
}

/// Single-pass harvester over the technical reports index.
///
/// Owns the browser session for the duration of the run. The document cap
/// and the "last seen" watermark are enforced by the sink, not here.
pub struct W3cParser<B: Browser> {
    browser: B,
    settings: ParserSettings,
}

impl<B: Browser> W3cParser<B> {
    pub fn new(browser: B, settings: ParserSettings) -> Self {
        Self { browser, settings }
    }

    pub fn into_browser(self) -> B {
        self.browser
    }

    /// Visit every listing item once and forward each record to `sink`.
    ///
    /// Item-level failures are logged and skipped with focus restored to the
    /// main tab. Browser and sink failures end the run.
    pub async fn run<S: DocumentSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<HarvestSummary, ParserError> {
        let index = self.settings.index_url.clone();
        info!(target: "w3c.parser", url = %index, "entering index");

        self.browser.goto(index.as_str()).await?;
        let main = self.browser.current_tab().await?;
        let headers = self.browser.find_all(&LISTING_HEADER).await?;

        let mut summary = HarvestSummary {
            listed: headers.len(),
            ..HarvestSummary::default()
        };
        info!(target: "w3c.parser", items = summary.listed, "listing enumerated");

        for (position, header) in headers.iter().enumerate() {
            match self.process_item(&main, header).await {
                Ok(record) => {
                    info!(
                        target: "w3c.parser",
                        position,
                        title = %record.title,
                        link = %record.link,
                        "document harvested"
                    );
                    summary.emitted += 1;
                    if sink.accept(record).await? == Acceptance::Stop {
                        summary.stopped_early = position + 1 < headers.len();
                        break;
                    }
                }
                Err(ItemError::Browser(err)) => {
                    error!(
                        target: "w3c.parser",
                        position,
                        error = %err,
                        "browser failure; aborting traversal"
                    );
                    return Err(err.into());
                }
                Err(err) => {
                    error!(target: "w3c.parser", position, error = %err, "skipping listing item");
                    summary.skipped += 1;
                    restore_main(&mut self.browser, &main).await?;
                }
            }
        }

        info!(
            target: "w3c.parser",
            listed = summary.listed,
            emitted = summary.emitted,
            skipped = summary.skipped,
            stopped_early = summary.stopped_early,
            "traversal finished"
        );
        Ok(summary)
    }

    async fn process_item(
        &mut self,
        main: &TabHandle,
        header: &B::Element,
    ) -> Result<DocumentRecord, ItemError> {
        let entry = read_entry(&self.browser, header, &self.settings.index_url).await?;

        let scope = TabScope::open(&mut self.browser, main).await?;
        let page = read_document(&mut self.browser, &entry, &self.settings).await;
        scope.close(&mut self.browser).await?;

        Ok(DocumentRecord::assemble(entry, page?))
    }
}
