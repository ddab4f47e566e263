//! Short link engine service.
//!
//! This crate ties a [`Generator`](shortlink_generator::Generator) and a
//! [`Repository`](shortlink_core::Repository) together behind the
//! [`Shortener`] trait. Core types are re-exported from `shortlink_core`.

pub mod service;
pub mod settings;

pub use service::ShortenerService;
pub use settings::{ShortenerSettings, UrlPolicy};
pub use shortlink_core::{ShortLink, Shortener, ShortenerError};
