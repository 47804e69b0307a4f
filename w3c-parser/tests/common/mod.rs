#![allow(dead_code)]

use std::sync::OnceLock;

use w3c_common::observability::{LogConfig, LogFormat};
use w3c_drivers::browser::By;
use w3c_drivers::browser::fake::{FakeBrowser, FakePage};
use w3c_parser::selectors::*;

pub const INDEX: &str = "https://www.w3.org/TR/";

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "w3c-tests".to_string(),
            log_dir: Some(std::env::temp_dir().join("w3c-tests")),
            emit_stderr: true,
            format: if std::env::var("W3C_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        w3c_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// One report as it appears on the index and on its own page.
#[derive(Debug, Clone)]
pub struct Report {
    pub slug: &'static str,
    pub title: Option<&'static str>,
    /// Anchor `href` on the index; relative, as on the live index.
    pub href: Option<String>,
    pub published: &'static str,
    pub family: Option<&'static str>,
    pub tags: Vec<&'static str>,
    pub deliverers: Vec<&'static str>,
    pub has_body: bool,
    pub abstract_text: Option<&'static str>,
    pub version_href: Option<&'static str>,
    pub doc_type: Option<&'static str>,
    pub authors: Vec<&'static str>,
    pub editors: Vec<&'static str>,
    pub commits: Option<Commits>,
    /// Queries on the document page that fail with a driver error.
    pub broken: Vec<By>,
}

#[derive(Debug, Clone)]
pub struct Commits {
    pub messages: Vec<&'static str>,
    pub rendered: bool,
}

impl Report {
    pub fn new(slug: &'static str, title: &'static str) -> Self {
        Self {
            slug,
            title: Some(title),
            href: Some(format!("{slug}/")),
            published: "2024-04-08",
            family: Some("Standards"),
            tags: vec!["Security", "Web API"],
            deliverers: vec!["Web Authentication Working Group"],
            has_body: true,
            abstract_text: Some("This document defines an API."),
            version_href: Some("https://www.w3.org/TR/2024/REC-example-20240408/"),
            doc_type: Some("W3C Recommendation"),
            authors: vec!["Jane Doe (Example Corp)"],
            editors: vec!["John Roe (W3C)", "Ana Lima (Example Org)"],
            commits: None,
            broken: Vec::new(),
        }
    }

    pub fn without_title(mut self) -> Self {
        self.title = None;
        self
    }

    pub fn without_href(mut self) -> Self {
        self.href = None;
        self
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn with_commits(mut self, messages: Vec<&'static str>) -> Self {
        self.commits = Some(Commits {
            messages,
            rendered: true,
        });
        self
    }

    pub fn link(&self) -> String {
        format!("{INDEX}{}/", self.slug)
    }

    pub fn history_link(&self) -> String {
        format!("https://github.com/w3c/{}/commits/gh-pages", self.slug)
    }

    pub fn body_text(&self) -> String {
        format!("{} full text", self.slug)
    }
}

/// Build a browser whose index lists `reports` in order, with a document
/// page (and commit page) for each.
pub fn site(reports: &[Report]) -> FakeBrowser {
    let mut index = FakePage::new();
    let mut browser = FakeBrowser::new();

    for report in reports {
        let header = index.node("");
        index.answer(None, LISTING_HEADER, &[header]);

        if let Some(title) = report.title {
            let anchor = match &report.href {
                Some(href) => index.node_with(title, &[("href", href.as_str())]),
                None => index.node(title),
            };
            index.answer(Some(header), ITEM_ANCHOR, &[anchor]);
        }

        let time = index.node_with("", &[("datetime", report.published)]);
        index.answer(Some(header), ITEM_TIME, &[time]);

        for tag in &report.tags {
            let dd = index.node(*tag);
            index.answer(Some(header), ITEM_TAGS, &[dd]);
        }
        for deliverer in &report.deliverers {
            let dd = index.node(*deliverer);
            index.answer(Some(header), ITEM_DELIVERERS, &[dd]);
        }
        if let Some(family) = report.family {
            let h2 = index.node(family);
            index.answer(Some(header), ITEM_FAMILY, &[h2]);
        }

        browser = browser.with_page(report.link(), document_page(report));

        if let Some(commits) = &report.commits {
            let mut history = FakePage::new();
            if commits.rendered {
                let timeline = history.node("");
                history.answer(None, COMMIT_TIMELINE, &[timeline]);
                for message in &commits.messages {
                    let p = history.node(*message);
                    history.answer(None, COMMIT_MESSAGE, &[p]);
                }
            }
            browser = browser.with_page(report.history_link(), history);
        }
    }

    browser.with_page(INDEX, index)
}

fn document_page(report: &Report) -> FakePage {
    let mut page = FakePage::new();

    if report.has_body {
        let body = page.node(report.body_text());
        page.answer(None, PAGE_BODY, &[body]);
    }
    if let Some(text) = report.abstract_text {
        let node = page.node(text);
        page.answer(None, ABSTRACT, &[node]);
    }
    if let Some(href) = report.version_href {
        let node = page.node_with(href, &[("href", href)]);
        page.answer(None, VERSION_LINK, &[node]);
    }
    if let Some(state) = report.doc_type {
        let node = page.node(state);
        page.answer(None, DOC_STATE, &[node]);
    }
    for author in &report.authors {
        let node = page.node(*author);
        page.answer(None, AUTHORS, &[node]);
    }
    for editor in &report.editors {
        let node = page.node(*editor);
        page.answer(None, EDITORS, &[node]);
    }
    if report.commits.is_some() {
        let history = report.history_link();
        let node = page.node_with("Commit history", &[("href", history.as_str())]);
        page.answer(None, COMMIT_HISTORY_LINK, &[node]);
    }
    for by in &report.broken {
        page.fail(None, *by);
    }
    page
}
