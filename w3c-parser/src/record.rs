use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::document::DocumentPage;
use crate::listing::ListingEntry;

/// One harvested technical report.
///
/// `id` and `loaded` stay empty until a host accepts the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub text: String,
    /// Dated version URL, or the listing URL when none was found.
    pub link: Url,
    pub published: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded: Option<DateTime<Utc>>,
    pub other: DocumentMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub doc_type: Option<String>,
    pub deliverers: Vec<String>,
    pub authors: Vec<String>,
    pub editors: Vec<String>,
    pub tags: Vec<String>,
    pub commits: Option<Vec<String>>,
    pub family: String,
}

impl DocumentRecord {
    pub(crate) fn assemble(entry: ListingEntry, page: DocumentPage) -> Self {
        Self {
            id: None,
            title: entry.title,
            abstract_text: page.abstract_text,
            text: page.text,
            link: page.version_link,
            published: entry.published,
            loaded: None,
            other: DocumentMetadata {
                doc_type: page.doc_type,
                deliverers: entry.deliverers,
                authors: page.authors,
                editors: page.editors,
                tags: entry.tags,
                commits: page.commits,
                family: entry.family,
            },
        }
    }

    /// Stable identity of the report version: blake3 over title, link and
    /// publication date, hex encoded. Host-assigned fields do not take part.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.title.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.link.as_str().as_bytes());
        hasher.update(&[0]);
        hasher.update(self.published.format("%Y-%m-%d").to_string().as_bytes());
        hex::encode(hasher.finalize().as_bytes())
    }

    /// Consume the record and return it with host identity attached.
    pub fn accepted(self, id: Uuid, loaded: DateTime<Utc>) -> Self {
        Self {
            id: Some(id),
            loaded: Some(loaded),
            ..self
        }
    }
}
