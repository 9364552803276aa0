//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`platform`] - Platform identification, config directory lookup, and
//!   file hiding

pub mod platform;

pub use platform::{Platform, config_dir, get_home_dir, hide_file, is_windows};
