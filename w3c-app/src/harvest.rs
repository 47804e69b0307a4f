use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;
use w3c_config::HarvestConfig;
use w3c_drivers::browser::Browser;
use w3c_drivers::browser::capabilities::BrowserOptions;
use w3c_drivers::browser::driver::WebDriverBrowser;
use w3c_parser::{
    Acceptance, Admission, DocumentRecord, DocumentSink, HarvestPolicy, HarvestSummary,
    ParserSettings, SinkError, W3cParser,
};

/// One output line: the record plus the fingerprint to pass as `--last-seen`
/// next time.
#[derive(Serialize)]
struct OutputLine<'a> {
    fingerprint: String,
    #[serde(flatten)]
    record: &'a DocumentRecord,
}

/// Streams every admitted record as a JSON line and keeps nothing else
/// beyond the policy counters.
pub struct JsonLinesSink<W> {
    policy: HarvestPolicy,
    out: W,
    written: usize,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(policy: HarvestPolicy, out: W) -> Self {
        Self {
            policy,
            out,
            written: 0,
        }
    }

    /// Flush and return the number of lines written.
    pub fn finish(mut self) -> Result<usize, SinkError> {
        self.out.flush()?;
        Ok(self.written)
    }
}

#[async_trait]
impl<W: Write + Send> DocumentSink for JsonLinesSink<W> {
    async fn accept(&mut self, document: DocumentRecord) -> Result<Acceptance, SinkError> {
        let Admission::Keep {
            document,
            fingerprint,
            then,
        } = self.policy.admit(document)
        else {
            return Ok(Acceptance::Stop);
        };

        let line = OutputLine {
            fingerprint,
            record: &document,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(then)
    }
}

pub fn browser_options(cfg: &HarvestConfig) -> BrowserOptions {
    BrowserOptions {
        webdriver_url: cfg.browser.webdriver_url.clone(),
        headless: cfg.browser.headless,
        window_size: (cfg.browser.window_width, cfg.browser.window_height),
        user_agent: cfg.browser.user_agent.clone(),
        extra_args: cfg.browser.extra_args.clone(),
    }
}

pub fn parser_settings(cfg: &HarvestConfig) -> Result<ParserSettings> {
    let index_url = Url::parse(&cfg.parser.index_url)
        .with_context(|| format!("invalid index url: {}", cfg.parser.index_url))?;
    Ok(ParserSettings {
        index_url,
        element_timeout: Duration::from_secs(cfg.parser.element_timeout_secs),
        commit_timeout: Duration::from_secs(cfg.parser.commit_timeout_secs),
    })
}

fn open_output(cfg: &HarvestConfig) -> Result<Box<dyn Write + Send>> {
    match &cfg.harvest.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}

/// Drive one traversal over any browser, returning the browser so the caller
/// can shut it down whatever the outcome.
pub async fn harvest_with<B, W>(
    browser: B,
    settings: ParserSettings,
    sink: &mut JsonLinesSink<W>,
) -> (Result<HarvestSummary>, B)
where
    B: Browser,
    W: Write + Send,
{
    let mut parser = W3cParser::new(browser, settings);
    let result = parser.run(sink).await.map_err(anyhow::Error::from);
    (result, parser.into_browser())
}

pub async fn run(cfg: HarvestConfig) -> Result<()> {
    let settings = parser_settings(&cfg)?;
    let options = browser_options(&cfg);

    let policy = HarvestPolicy::new(
        cfg.harvest.max_count_documents,
        cfg.harvest.last_document_fingerprint.clone(),
    );
    let mut sink = JsonLinesSink::new(policy, open_output(&cfg)?);

    info!(
        target: "w3c.app",
        webdriver = %options.webdriver_url,
        headless = options.headless,
        index = %settings.index_url,
        max_documents = ?cfg.harvest.max_count_documents,
        "starting harvest"
    );
    let browser = WebDriverBrowser::connect(&options)
        .await
        .with_context(|| format!("failed to reach webdriver at {}", options.webdriver_url))?;

    let (result, browser) = harvest_with(browser, settings, &mut sink).await;
    if let Err(err) = browser.close().await {
        warn!(target: "w3c.app", error = %err, "browser session did not close cleanly");
    }

    let written = sink.finish()?;
    let summary = result?;
    info!(
        target: "w3c.app",
        written,
        listed = summary.listed,
        skipped = summary.skipped,
        stopped_early = summary.stopped_early,
        "harvest complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use w3c_config::HarvestConfigLoader;
    use w3c_drivers::browser::fake::{FakeBrowser, FakePage};
    use w3c_parser::selectors::{ITEM_ANCHOR, ITEM_TIME, LISTING_HEADER, PAGE_BODY};

    const INDEX: &str = "https://www.w3.org/TR/";

    fn site(slugs: &[&str]) -> FakeBrowser {
        site_with_bodies(slugs, |slug| format!("{slug} body"))
    }

    fn site_with_bodies(slugs: &[&str], body: impl Fn(&str) -> String) -> FakeBrowser {
        let mut index = FakePage::new();
        let mut browser = FakeBrowser::new();
        for slug in slugs {
            let header = index.node("");
            let href = format!("{slug}/");
            let anchor = index.node_with(slug.to_uppercase(), &[("href", href.as_str())]);
            let time = index.node_with("", &[("datetime", "2023-09-21")]);
            index
                .answer(None, LISTING_HEADER, &[header])
                .answer(Some(header), ITEM_ANCHOR, &[anchor])
                .answer(Some(header), ITEM_TIME, &[time]);

            let mut page = FakePage::new();
            let text = page.node(body(slug));
            page.answer(None, PAGE_BODY, &[text]);
            browser = browser.with_page(format!("{INDEX}{slug}/"), page);
        }
        browser.with_page(INDEX, index)
    }

    fn quick_settings() -> ParserSettings {
        ParserSettings {
            element_timeout: Duration::from_millis(10),
            commit_timeout: Duration::from_millis(10),
            ..ParserSettings::default()
        }
    }

    #[tokio::test]
    async fn writes_one_line_per_kept_record() {
        let mut sink = JsonLinesSink::new(HarvestPolicy::new(Some(2), None), Vec::new());
        let (result, browser) =
            harvest_with(site(&["a11y", "css3", "html5"]), quick_settings(), &mut sink).await;

        let summary = result.unwrap();
        assert!(summary.stopped_early);
        assert_eq!(browser.open_tab_count(), 1);

        let JsonLinesSink { out, written, .. } = sink;
        assert_eq!(written, 2);

        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["title"], "A11Y");
        assert_eq!(lines[1]["title"], "CSS3");
        assert_eq!(lines[0]["published"], "2023-09-21");
        assert_eq!(lines[0]["text"], "a11y body");
        assert_eq!(lines[0]["fingerprint"].as_str().unwrap().len(), 64);
        assert!(lines[0]["id"].is_string());
        assert!(lines[0]["loaded"].is_string());
    }

    #[tokio::test]
    async fn watermarked_record_is_not_written() {
        let mut first = JsonLinesSink::new(HarvestPolicy::new(None, None), Vec::new());
        let (result, _) = harvest_with(site(&["a11y", "css3"]), quick_settings(), &mut first).await;
        result.unwrap();
        let seen: serde_json::Value =
            serde_json::from_slice(first.out.split(|b| *b == b'\n').next().unwrap()).unwrap();
        let fingerprint = seen["fingerprint"].as_str().unwrap().to_string();

        let mut second =
            JsonLinesSink::new(HarvestPolicy::new(None, Some(fingerprint)), Vec::new());
        let (result, _) =
            harvest_with(site(&["html5", "a11y", "css3"]), quick_settings(), &mut second).await;
        assert!(result.unwrap().stopped_early);
        assert_eq!(second.finish().unwrap(), 1);
    }

    #[tokio::test]
    async fn uncapped_stream_holds_only_counters() {
        let slugs: Vec<String> = (0..200).map(|i| format!("report-{i}")).collect();
        let slugs: Vec<&str> = slugs.iter().map(String::as_str).collect();
        let browser = site_with_bodies(&slugs, |_| "x".repeat(10 * 1024));

        let mut sink = JsonLinesSink::new(HarvestPolicy::new(None, None), std::io::sink());
        let (result, _) = harvest_with(browser, quick_settings(), &mut sink).await;
        let summary = result.unwrap();
        assert_eq!(summary.emitted, 200);
        assert!(!summary.stopped_early);

        // Exhaustive: a record buffer added to the sink breaks this pattern.
        let JsonLinesSink {
            policy,
            out: _,
            written,
        } = sink;
        assert_eq!(written, 200);
        assert_eq!(policy.admitted(), 200);
        assert_eq!(
            std::mem::size_of::<JsonLinesSink<std::io::Sink>>(),
            std::mem::size_of::<HarvestPolicy>() + std::mem::size_of::<usize>()
        );
    }

    #[test]
    fn settings_follow_config() {
        let cfg = HarvestConfigLoader::new()
            .with_yaml_str(
                r#"
browser:
  webdriver_url: "http://grid:4444"
  headless: false
  window_width: 1280
  window_height: 720
parser:
  element_timeout_secs: 5
  commit_timeout_secs: 3
"#,
            )
            .load()
            .unwrap();

        let options = browser_options(&cfg);
        assert_eq!(options.webdriver_url, "http://grid:4444");
        assert!(!options.headless);
        assert_eq!(options.window_size, (1280, 720));

        let settings = parser_settings(&cfg).unwrap();
        assert_eq!(settings.index_url.as_str(), INDEX);
        assert_eq!(settings.element_timeout, Duration::from_secs(5));
        assert_eq!(settings.commit_timeout, Duration::from_secs(3));
    }

    #[test]
    fn output_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let mut cfg = HarvestConfigLoader::new().load().unwrap();
        cfg.harvest.output = Some(path.display().to_string());

        let mut out = open_output(&cfg).unwrap();
        out.write_all(b"{}\n").unwrap();
        out.flush().unwrap();
        drop(out);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}\n");
    }
}
