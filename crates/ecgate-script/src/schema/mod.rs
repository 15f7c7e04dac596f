//! Schema definitions for RON content files

pub mod item;
pub mod state;
