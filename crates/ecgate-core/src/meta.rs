//! Annotation tags parsed from a database entry's note field
//!
//! Designers write tags such as `<EC1Switch:10>` or `<Boss>` anywhere in the
//! note. Keys may contain any character except `<`, `>` and `:`; values run
//! to the next `>`. A later tag with the same key replaces an earlier one.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([^<>:]+)(:?)([^>]*)>").expect("tag pattern is valid")
});

/// Value of a single tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaValue {
    /// `<key:value>`
    Text(String),
    /// `<key>`
    Flag,
}

/// Parsed tags of one note, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta {
    tags: IndexMap<String, MetaValue>,
}

impl Meta {
    /// Create an empty tag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every tag out of a note
    pub fn parse(note: &str) -> Self {
        let mut meta = Self::new();
        for caps in TAG.captures_iter(note) {
            let key = caps[1].to_string();
            let value = if &caps[2] == ":" {
                MetaValue::Text(caps[3].to_string())
            } else {
                MetaValue::Flag
            };
            meta.tags.insert(key, value);
        }
        meta
    }

    /// Insert or replace a text tag
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), MetaValue::Text(value.into()));
    }

    /// Get a raw tag value
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.tags.get(key)
    }

    /// Get a tag's text, if it was written with a value
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.tags.get(key) {
            Some(MetaValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Whether a tag is present in either form
    pub fn contains(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// Return the text of the first key that is present
    ///
    /// Keys are tried in order, so earlier keys take precedence.
    pub fn first_text<I, S>(&self, keys: I) -> Option<&str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter().find_map(|key| self.text(key.as_ref()))
    }

    /// Tag keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no tags were found
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
