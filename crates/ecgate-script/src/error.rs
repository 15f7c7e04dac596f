//! Error types for ecgate-script

use ecgate_core::ItemId;
use std::path::PathBuf;
use thiserror::Error;

/// Content loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Neither the file name nor its top-level field identify the content
    #[error("could not tell what {} contains", .0.display())]
    UnknownContent(PathBuf),

    #[error("{0} is defined twice")]
    DuplicateItem(ItemId),

    #[error("unit '{0}' is defined twice")]
    DuplicateUnit(String),

    /// Invalid gate configuration
    #[error(transparent)]
    Core(#[from] ecgate_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
