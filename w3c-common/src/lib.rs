//! Shared plumbing for the W3C harvester crates.
//!
//! Kept deliberately small so every crate in the workspace can depend on it:
//!
//! - [`observability`]: centralised `tracing` initialisation used by the
//!   `w3c-harvest` binary and by integration tests.
//!
//! # Examples
//!
//! ```rust
//! use w3c_common::observability::{LogConfig, LogFormat};
//!
//! let cfg = LogConfig {
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.app_name, "w3c-harvest");
//! assert!(!cfg.emit_stderr);
//! ```

pub mod observability;
