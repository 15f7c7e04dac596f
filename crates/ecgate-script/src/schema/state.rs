//! Unit and initial game state schema

use ecgate_core::{Switches, Unit, Value, Variables};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A file of units: `(units: [ (name: "Harold", side: Actor, properties: {...}) ])`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitFile {
    pub units: Vec<Unit>,
}

/// Initial switch and variable values
///
/// ```text
/// (
///     switches: [5, 12],
///     variables: { 1: Int(15) },
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    /// Ids of switches that start on
    #[serde(default)]
    pub switches: Vec<i64>,
    /// Variables that start with a non-zero value
    #[serde(default)]
    pub variables: BTreeMap<i64, Value>,
}

impl StateFile {
    /// Write this state into the given tables
    pub fn apply(&self, switches: &mut Switches, variables: &mut Variables) {
        for &id in &self.switches {
            switches.set(id, true);
        }
        for (&id, value) in &self.variables {
            variables.set(id, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecgate_core::{SwitchTable, VariableTable};

    #[test]
    fn test_state_apply() {
        let state: StateFile =
            ron::from_str("(switches: [5], variables: { 1: Int(15) })").unwrap();
        let mut switches = Switches::new();
        let mut variables = Variables::new();
        state.apply(&mut switches, &mut variables);
        assert!(switches.value(5));
        assert!(!switches.value(4));
        assert_eq!(variables.value(1), Value::Int(15));
    }

    #[test]
    fn test_unit_file() {
        let file: UnitFile = ron::from_str(
            r#"(units: [(name: "Slime", side: Enemy, properties: { "hp": Int(30) }, states: [4])])"#,
        )
        .unwrap();
        assert_eq!(file.units[0].name, "Slime");
        assert!(file.units[0].is_state_affected(4));
    }
}
