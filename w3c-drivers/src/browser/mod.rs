#[cfg(feature = "chromium")]
pub mod capabilities;
#[cfg(feature = "chromium")]
pub mod driver;
pub mod error;
pub mod locator;
pub mod session;
pub mod tabs;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use error::{BrowserError, Presence};
pub use locator::By;
pub use session::{Browser, TabHandle};
pub use tabs::{restore_main, TabScope};
