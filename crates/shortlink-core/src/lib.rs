//! Core types and traits for the shortlink engine.
//!
//! This crate provides the types shared by the generators, the storage
//! backends and the shortener service.

pub mod base62;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{DeletePolicy, ReadRepository, Repository, ShortLink};
pub use shortcode::ShortCode;
pub use shortener::Shortener;
