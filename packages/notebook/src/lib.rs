#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chart gallery extraction from the census analysis notebook.
//!
//! The analysis notebook embeds its charts as base64 PNG outputs. This
//! crate pulls them out, drops duplicates and charts the dashboard already
//! renders live, and attaches a title, a caption and a longer sectioned
//! description to each.

pub mod describe;
pub mod detail;
pub mod gallery;

pub use describe::{ChartDescription, ChartKind, ChartSubject};
pub use detail::DescriptionSection;
pub use gallery::{GalleryImage, extract_gallery, gallery_from_str, try_extract_gallery};

use thiserror::Error;

/// Errors that can occur while reading a notebook.
#[derive(Debug, Error)]
pub enum NotebookError {
    /// The notebook file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The notebook is not valid JSON or not shaped like a notebook.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
