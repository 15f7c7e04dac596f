//! Host-owned switch and variable storage
//!
//! The gate only ever reads these tables. Hosts implement the traits over
//! their own storage; [`Switches`] and [`Variables`] are plain in-memory
//! versions for tools and tests.

use crate::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read access to boolean switches addressed by integer id
pub trait SwitchTable {
    /// Current value of a switch. Unknown, zero and negative ids are off.
    fn value(&self, id: i64) -> bool;
}

/// Read access to game variables addressed by integer id
pub trait VariableTable {
    /// Current value of a variable. Unset variables read as `0`.
    fn value(&self, id: i64) -> Value;
}

/// In-memory switch table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Switches {
    values: BTreeMap<i64, bool>,
}

impl Switches {
    /// Create a table with every switch off
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a switch on or off
    pub fn set(&mut self, id: i64, on: bool) {
        if on {
            self.values.insert(id, true);
        } else {
            self.values.remove(&id);
        }
    }

    /// Flip a switch and return its new value
    pub fn toggle(&mut self, id: i64) -> bool {
        let on = !SwitchTable::value(self, id);
        self.set(id, on);
        on
    }
}

impl SwitchTable for Switches {
    fn value(&self, id: i64) -> bool {
        self.values.get(&id).copied().unwrap_or(false)
    }
}

/// In-memory variable table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Variables {
    values: BTreeMap<i64, Value>,
}

impl Variables {
    /// Create a table with every variable at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable
    pub fn set(&mut self, id: i64, value: impl Into<Value>) {
        self.values.insert(id, value.into());
    }
}

impl VariableTable for Variables {
    fn value(&self, id: i64) -> Value {
        self.values.get(&id).cloned().unwrap_or(Value::Int(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switches_default_off() {
        let switches = Switches::new();
        assert!(!switches.value(1));
        assert!(!switches.value(0));
        assert!(!switches.value(-3));
    }

    #[test]
    fn test_switch_toggle() {
        let mut switches = Switches::new();
        switches.set(5, true);
        assert!(switches.value(5));
        assert!(!switches.toggle(5));
        assert!(!switches.value(5));
        assert!(switches.toggle(5));
    }

    #[test]
    fn test_variables_default_zero() {
        let mut variables = Variables::new();
        assert_eq!(variables.value(1), Value::Int(0));
        variables.set(1, 12);
        assert_eq!(variables.value(1), Value::Int(12));
    }
}
