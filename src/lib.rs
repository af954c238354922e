//! Overlay: exact-match localization of live document trees
//!
//! A dictionary store that keeps a source → target translation map in one of three
//! interchangeable backends, and a localization engine that rewrites text nodes whose whole
//! trimmed content is a dictionary key, reacting to document mutations, storage changes and
//! a periodic tick.

pub mod config;
pub mod defaults;
pub mod dom;
pub mod engine;
pub mod error;
pub mod logging;
pub mod platform;
pub mod settings;
pub mod store;
pub mod tooling;
pub mod transfer;
pub mod types;

pub use engine::{LocalizationEngine, PassOutcome};
pub use error::ApiError;
pub use store::DictionaryStore;
pub use types::{BackendId, TranslationMap};
