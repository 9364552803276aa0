//! Core types shared across liveupd: the update error taxonomy and the
//! user-facing error wrapper.

pub mod error;

pub use error::{ErrorContext, UpdateError, user_friendly_error};
