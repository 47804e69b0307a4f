use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::record::DocumentRecord;

/// What the host wants after taking a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Continue,
    /// End the traversal after the current item.
    Stop,
}

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receives every record the traversal produces, in listing order.
#[async_trait]
pub trait DocumentSink: Send {
    async fn accept(&mut self, document: DocumentRecord) -> Result<Acceptance, SinkError>;
}

/// Outcome of offering a record to a [`HarvestPolicy`].
#[derive(Debug)]
pub enum Admission {
    /// The record carries its host identity; `then` tells the traversal
    /// whether to go on.
    Keep {
        document: DocumentRecord,
        fingerprint: String,
        then: Acceptance,
    },
    /// Not kept. The traversal should stop.
    Refuse,
}

/// Document cap and "last seen" watermark, without holding any record.
///
/// ```
/// use w3c_parser::HarvestPolicy;
///
/// let policy = HarvestPolicy::new(Some(50), None);
/// assert_eq!(policy.admitted(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HarvestPolicy {
    max_count: Option<usize>,
    last_seen: Option<String>,
    admitted: usize,
}

impl HarvestPolicy {
    /// `last_seen` is a [`DocumentRecord::fingerprint`] from an earlier run.
    pub fn new(max_count: Option<usize>, last_seen: Option<String>) -> Self {
        Self {
            max_count,
            last_seen,
            admitted: 0,
        }
    }

    pub fn admitted(&self) -> usize {
        self.admitted
    }

    fn is_full(&self) -> bool {
        self.max_count.is_some_and(|max| self.admitted >= max)
    }

    /// Decide on one record. Kept records get an `id` and a `loaded` stamp.
    pub fn admit(&mut self, document: DocumentRecord) -> Admission {
        let fingerprint = document.fingerprint();
        if self.last_seen.as_deref() == Some(fingerprint.as_str()) {
            info!(target: "w3c.sink", title = %document.title, "reached last seen document");
            return Admission::Refuse;
        }
        if self.is_full() {
            return Admission::Refuse;
        }

        self.admitted += 1;
        let document = document.accepted(Uuid::new_v4(), Utc::now());
        debug!(target: "w3c.sink", title = %document.title, %fingerprint, "document accepted");

        let then = if self.is_full() {
            info!(target: "w3c.sink", count = self.admitted, "document cap reached");
            Acceptance::Stop
        } else {
            Acceptance::Continue
        };
        Admission::Keep {
            document,
            fingerprint,
            then,
        }
    }
}

/// In-process host: keeps every admitted record in memory.
///
/// ```
/// use w3c_parser::HarvestCollector;
///
/// let collector = HarvestCollector::new(Some(50), None);
/// assert!(collector.documents().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct HarvestCollector {
    policy: HarvestPolicy,
    documents: Vec<DocumentRecord>,
}

impl HarvestCollector {
    pub fn new(max_count: Option<usize>, last_seen: Option<String>) -> Self {
        Self::with_policy(HarvestPolicy::new(max_count, last_seen))
    }

    pub fn with_policy(policy: HarvestPolicy) -> Self {
        Self {
            policy,
            documents: Vec::new(),
        }
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<DocumentRecord> {
        self.documents
    }
}

#[async_trait]
impl DocumentSink for HarvestCollector {
    async fn accept(&mut self, document: DocumentRecord) -> Result<Acceptance, SinkError> {
        match self.policy.admit(document) {
            Admission::Keep { document, then, .. } => {
                self.documents.push(document);
                Ok(then)
            }
            Admission::Refuse => Ok(Acceptance::Stop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DocumentMetadata;
    use chrono::NaiveDate;
    use url::Url;

    fn record(title: &str) -> DocumentRecord {
        DocumentRecord {
            id: None,
            title: title.to_string(),
            abstract_text: Some("abstract".into()),
            text: "body".into(),
            link: Url::parse(&format!("https://www.w3.org/TR/{title}/")).unwrap(),
            published: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            loaded: None,
            other: DocumentMetadata::default(),
        }
    }

    #[tokio::test]
    async fn assigns_identity_on_acceptance() {
        let mut collector = HarvestCollector::new(None, None);
        let verdict = collector.accept(record("a")).await.unwrap();
        assert_eq!(verdict, Acceptance::Continue);

        let kept = &collector.documents()[0];
        assert!(kept.id.is_some());
        assert!(kept.loaded.is_some());
    }

    #[tokio::test]
    async fn stops_once_cap_is_reached() {
        let mut collector = HarvestCollector::new(Some(2), None);
        assert_eq!(collector.accept(record("a")).await.unwrap(), Acceptance::Continue);
        assert_eq!(collector.accept(record("b")).await.unwrap(), Acceptance::Stop);
        assert_eq!(collector.accept(record("c")).await.unwrap(), Acceptance::Stop);
        assert_eq!(collector.documents().len(), 2);
    }

    #[tokio::test]
    async fn last_seen_document_is_not_kept() {
        let seen = record("b").fingerprint();
        let mut collector = HarvestCollector::new(None, Some(seen));
        assert_eq!(collector.accept(record("a")).await.unwrap(), Acceptance::Continue);
        assert_eq!(collector.accept(record("b")).await.unwrap(), Acceptance::Stop);
        let titles: Vec<_> = collector
            .into_documents()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["a"]);
    }

    #[test]
    fn policy_counts_without_keeping_records() {
        let mut policy = HarvestPolicy::new(Some(2), None);

        let Admission::Keep {
            document,
            fingerprint,
            then,
        } = policy.admit(record("a"))
        else {
            panic!("first record must be kept");
        };
        assert_eq!(then, Acceptance::Continue);
        assert_eq!(fingerprint, record("a").fingerprint());
        assert!(document.id.is_some());

        assert!(matches!(
            policy.admit(record("b")),
            Admission::Keep { then: Acceptance::Stop, .. }
        ));
        assert!(matches!(policy.admit(record("c")), Admission::Refuse));
        assert_eq!(policy.admitted(), 2);
    }

    #[test]
    fn unlimited_policy_refuses_only_the_watermark() {
        let mut policy = HarvestPolicy::new(None, Some(record("z").fingerprint()));
        for title in ["a", "b", "c", "d"] {
            assert!(matches!(
                policy.admit(record(title)),
                Admission::Keep { then: Acceptance::Continue, .. }
            ));
        }
        assert!(matches!(policy.admit(record("z")), Admission::Refuse));
        assert_eq!(policy.admitted(), 4);
    }
}
