//! ecgate Script - RON content loader
//!
//! Loads the content the gate runs against:
//! - Item databases (skills/items with notes and effect lists)
//! - Units for tools and demos
//! - Initial switch and variable state
//! - Gate configuration (tag spellings, plugin name)

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{Database, Loader};
pub use schema::item::{out_of_range_tags, ItemFile};
pub use schema::state::{StateFile, UnitFile};
