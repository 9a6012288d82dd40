//! # karmad Common Library
//!
//! Shared code for the karaoke madlib tools:
//! - Error type
//! - Configuration loading and root folder resolution
//! - Song catalog snapshot
//! - Madlib and template records plus their flat-file store
//! - Atomic file writes and id generation

pub mod atomic;
pub mod catalog;
pub mod config;
pub mod error;
pub mod madlib;
pub mod store;
pub mod uuid_utils;

pub use catalog::{Song, SongCatalog};
pub use error::{Error, Result};
pub use madlib::{Filling, Madlib, MadlibTemplate, SelectedWord};
pub use store::MadlibStore;
