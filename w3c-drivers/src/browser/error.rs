use std::time::Duration;

/// Failures surfaced by a [`Browser`](super::Browser).
#[derive(thiserror::Error, Debug)]
pub enum BrowserError {
    /// The query matched nothing on the focused page.
    #[error("no element matches {0}")]
    NoSuchElement(String),

    /// A bounded wait expired before the element appeared.
    #[error("timed out after {timeout:?} waiting for {query}")]
    Timeout { query: String, timeout: Duration },

    /// The element belongs to a page that no longer has focus.
    #[error("element is not attached to the focused page")]
    StaleElement,

    /// No window has focus, or the requested tab does not exist.
    #[error("no such browser window: {0}")]
    NoSuchWindow(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The WebDriver session could not be created or ended.
    #[error("WebDriver session error: {0}")]
    Session(String),

    #[error("WebDriver command failed: {0}")]
    Command(String),
}

impl BrowserError {
    /// `true` when the error only says "the element is not there".
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            BrowserError::NoSuchElement(_) | BrowserError::Timeout { .. }
        )
    }
}

/// Turns "element absent" into `Ok(None)` while keeping every other failure.
///
/// ```
/// use w3c_drivers::browser::{BrowserError, Presence};
///
/// let missing: Result<u8, BrowserError> = Err(BrowserError::NoSuchElement("id `abstract`".into()));
/// assert_eq!(missing.present().unwrap(), None);
///
/// let broken: Result<u8, BrowserError> = Err(BrowserError::Command("session deleted".into()));
/// assert!(broken.present().is_err());
/// ```
pub trait Presence<T> {
    fn present(self) -> Result<Option<T>, BrowserError>;
}

impl<T> Presence<T> for Result<T, BrowserError> {
    fn present(self) -> Result<Option<T>, BrowserError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_absent() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_counts_as_absent() {
        let err = BrowserError::Timeout {
            query: "tag `body`".into(),
            timeout: Duration::from_secs(1),
        };
        assert!(err.is_absent());
        assert!(!BrowserError::StaleElement.is_absent());
    }

    #[test]
    fn present_passes_values_through() {
        let found: Result<&str, BrowserError> = Ok("Abstract");
        assert_eq!(found.present().unwrap(), Some("Abstract"));
    }
}
