//! Harvester for the W3C Technical Reports index.
//!
//! [`W3cParser`] walks `https://www.w3.org/TR/` once: every listing item is
//! read on the main tab, its document page (and commit history, when linked)
//! is read in a scoped secondary tab, and the assembled [`DocumentRecord`] is
//! handed to a [`DocumentSink`]. Deduplication, limits and persistence belong
//! to the sink.
//!
//! - [`selectors`]: every element query the harvester issues
//! - [`listing`], [`document`], [`commits`]: per-page extraction
//! - [`record`]: the emitted record and its fingerprint
//! - [`sink`]: the host boundary and an in-process collector

pub mod commits;
pub mod document;
pub mod error;
mod fields;
pub mod listing;
pub mod parser;
pub mod record;
pub mod selectors;
pub mod sink;

pub use error::{ItemError, ParserError};
pub use parser::{HarvestSummary, ParserSettings, W3C_TR_INDEX, W3cParser};
pub use record::{DocumentMetadata, DocumentRecord};
pub use sink::{Acceptance, Admission, DocumentSink, HarvestCollector, HarvestPolicy, SinkError};
