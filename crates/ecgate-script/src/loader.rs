//! RON content loader

use crate::error::{Error, Result};
use crate::schema::item::{out_of_range_tags, ItemFile};
use crate::schema::state::{StateFile, UnitFile};
use ecgate_core::{GateConfig, ItemDef, ItemId, Switches, Unit, Variables};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Loaded content
#[derive(Debug, Default)]
pub struct Database {
    /// Usable entries by ID
    pub items: IndexMap<ItemId, ItemDef>,
    /// Units by name
    pub units: IndexMap<String, Unit>,
    /// Gate configuration (defaults unless a config file was loaded)
    pub config: GateConfig,
    /// Initial switch values
    pub switches: Switches,
    /// Initial variable values
    pub variables: Variables,
}

impl Database {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an entry
    pub fn get_item(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.get(&id)
    }

    /// Get an entry by display name
    pub fn item_by_name(&self, name: &str) -> Option<&ItemDef> {
        self.items.values().find(|item| item.name == name)
    }

    /// Get a unit
    pub fn get_unit(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }
}

/// Loader for RON content files
pub struct Loader {
    db: Database,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            db: Database::new(),
        }
    }

    /// Load a single RON file
    ///
    /// The kind of file is taken from its name when it says `item`, `unit`,
    /// `state` or `config`, otherwise from its top-level field.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        debug!(file = %path.display(), "loading content");

        if filename.contains("item") || content.contains("items:") {
            self.load_items_str(&content)
        } else if filename.contains("unit") || content.contains("units:") {
            self.load_units_str(&content)
        } else if filename.contains("state") || content.contains("switches:") {
            self.load_state_str(&content)
        } else if filename.contains("config") || content.contains("tag_prefix:") {
            self.load_config_str(&content)
        } else {
            Err(Error::UnknownContent(path.to_path_buf()))
        }
    }

    /// Load entries from a RON string
    ///
    /// Notes are parsed as entries are added. Gate tags pointing past the end
    /// of an entry's effect list are reported with a warning.
    pub fn load_items_str(&mut self, content: &str) -> Result<()> {
        let file: ItemFile = ron::from_str(content)?;
        for mut item in file.items {
            if self.db.items.contains_key(&item.id) {
                return Err(Error::DuplicateItem(item.id));
            }
            item.refresh_meta();
            for tag in out_of_range_tags(&self.db.config, &item) {
                warn!(item = %item.id, name = %item.name, %tag, "gate tag has no matching effect");
            }
            self.db.items.insert(item.id, item);
        }
        Ok(())
    }

    /// Load units from a RON string
    pub fn load_units_str(&mut self, content: &str) -> Result<()> {
        let file: UnitFile = ron::from_str(content)?;
        for unit in file.units {
            if self.db.units.contains_key(&unit.name) {
                return Err(Error::DuplicateUnit(unit.name));
            }
            self.db.units.insert(unit.name.clone(), unit);
        }
        Ok(())
    }

    /// Load initial switch and variable values from a RON string
    pub fn load_state_str(&mut self, content: &str) -> Result<()> {
        let state: StateFile = ron::from_str(content)?;
        state.apply(&mut self.db.switches, &mut self.db.variables);
        Ok(())
    }

    /// Load the gate configuration from a RON string
    pub fn load_config_str(&mut self, content: &str) -> Result<()> {
        let config: GateConfig = ron::from_str(content)?;
        config.validate()?;
        self.db.config = config;
        Ok(())
    }

    /// Load all RON files from a directory
    ///
    /// Config files are loaded first so that tag checks on items use them.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                files.push(file_path);
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }
        files.sort_by_key(|p| {
            let is_config = p
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains("config"));
            (!is_config, p.clone())
        });
        for file_path in files {
            self.load_file(&file_path)?;
        }

        Ok(())
    }

    /// Finish loading and return the database
    pub fn finish(self) -> Database {
        self.db
    }

    /// Get the current database (for inspection during loading)
    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
