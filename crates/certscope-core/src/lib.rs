//! # certscope core
//!
//! Shared building blocks for the certscope decoder and chain resolver:
//!
//! - **Errors**: serializable `thiserror` types, including the structured
//!   [`DecodeError`] (kind, byte offset, tag context, detail) that the
//!   decoder surfaces to hosts.
//! - **Configuration**: YAML files layered with `CERTSCOPE__*` environment
//!   overrides, with validation.
//! - **Settings**: the injected key-value store used to persist display
//!   options.
//!
//! ## Example
//!
//! ```
//! use certscope_core::config::AppConfig;
//!
//! let config = AppConfig::from_yaml("chain:\n  max_depth: 5\n").unwrap();
//! assert_eq!(config.chain.max_depth, 5);
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod error;
pub mod settings;

pub use config::AppConfig;
pub use error::{CertscopeError, DecodeError, DecodeErrorKind, Result};
pub use settings::{DisplayOptions, JsonFileSettings, MemorySettings, SettingsStore};
