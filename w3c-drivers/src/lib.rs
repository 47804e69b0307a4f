//! Driver layer for browser automation.
//!
//! This crate exposes the browser seam the harvester is written against and
//! a WebDriver-backed implementation of it.
//!
//! - [`browser::Browser`]: async element/tab operations over one session
//! - [`browser::driver::WebDriverBrowser`]: `fantoccini` client wrapper
//! - [`browser::tabs::TabScope`]: secondary tab with guaranteed release
//! - [`browser::capabilities`]: Chrome arguments and WebDriver capabilities
//! - `browser::fake::FakeBrowser` (feature `fake`): scripted in-memory pages
pub mod browser;
