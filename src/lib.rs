//! Book review catalog service.
//!
//! The `books` module serves the catalog over HTTP; the `uploads` module issues
//! pre-signed cover upload URLs.

pub mod modules;

pub use modules::*;
