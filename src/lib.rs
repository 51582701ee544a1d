//! Per-language storage for model fields.
//!
//! Models declare which of their fields are translatable. On registration
//! every such field gains one sibling field per configured language, and the
//! original attribute starts routing reads and writes to the current
//! language's sibling. A sync tool adds the matching columns to an existing
//! database, and an axum middleware keeps the current language in the URL.

pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod localization;
pub mod middleware;
pub mod schema;
pub mod sync;
pub mod urls;
