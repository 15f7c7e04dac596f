//! Battle units as seen by condition scripts
//!
//! Scripts reach units through `subject` and `target`. Member access
//! (`target.hp`) goes to [`Battler::property`]; method calls
//! (`target.hpRate()`) go to [`Battler::call`]. Hosts implement [`Battler`]
//! over their own unit objects; [`Unit`] is a property-bag implementation.

use crate::{ExprError, Value, ValueMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Read-only view of a battle unit
pub trait Battler {
    /// Display name, used in logs and error messages
    fn name(&self) -> &str;

    /// Read a property by name. `None` reads as `undefined` in scripts.
    fn property(&self, name: &str) -> Option<Value>;

    /// Call a method by name
    fn call(&self, method: &str, args: &[Value]) -> Result<Value, ExprError> {
        let _ = args;
        Err(ExprError::NotAFunction {
            receiver: self.name().to_string(),
            name: method.to_string(),
        })
    }
}

/// Which side a unit fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Side {
    #[default]
    Actor,
    Enemy,
}

/// A unit backed by a property map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    #[serde(default)]
    pub side: Side,
    /// Numeric and text properties (`hp`, `mhp`, `level`, ...)
    #[serde(default)]
    pub properties: ValueMap,
    /// Ids of the states currently affecting the unit
    #[serde(default)]
    pub states: BTreeSet<u32>,
}

impl Unit {
    /// Create an actor with no properties
    pub fn actor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            side: Side::Actor,
            properties: ValueMap::new(),
            states: BTreeSet::new(),
        }
    }

    /// Create an enemy with no properties
    pub fn enemy(name: impl Into<String>) -> Self {
        Self {
            side: Side::Enemy,
            ..Self::actor(name)
        }
    }

    /// Builder-style property setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a property value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Get a numeric property as f64, defaulting to zero
    pub fn number(&self, key: &str) -> f64 {
        self.properties
            .get(key)
            .and_then(|v| v.as_float())
            .unwrap_or(0.0)
    }

    /// Add a state
    pub fn add_state(&mut self, state_id: u32) {
        self.states.insert(state_id);
    }

    /// Remove a state
    pub fn remove_state(&mut self, state_id: u32) -> bool {
        self.states.remove(&state_id)
    }

    /// Whether the unit is affected by a state
    pub fn is_state_affected(&self, state_id: u32) -> bool {
        self.states.contains(&state_id)
    }

    /// `current / max`, or zero when the max is not positive
    fn rate(&self, current: &str, max: &str) -> f64 {
        let max = self.number(max);
        if max > 0.0 {
            self.number(current) / max
        } else {
            0.0
        }
    }
}

fn expect_args(name: &str, args: &[Value], expected: usize) -> Result<(), ExprError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ExprError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        })
    }
}

impl Battler for Unit {
    fn name(&self) -> &str {
        &self.name
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::String(self.name.clone())),
            _ => self.properties.get(name).cloned(),
        }
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, ExprError> {
        match method {
            "hpRate" => {
                expect_args(method, args, 0)?;
                Ok(Value::Float(self.rate("hp", "mhp")))
            }
            "mpRate" => {
                expect_args(method, args, 0)?;
                Ok(Value::Float(self.rate("mp", "mmp")))
            }
            "tpRate" => {
                expect_args(method, args, 0)?;
                Ok(Value::Float(self.number("tp") / 100.0))
            }
            "isStateAffected" => {
                expect_args(method, args, 1)?;
                let state_id = args[0].as_int().ok_or_else(|| ExprError::TypeError {
                    expected: "int".to_string(),
                    got: args[0].type_name().to_string(),
                })?;
                let affected = u32::try_from(state_id)
                    .map(|id| self.is_state_affected(id))
                    .unwrap_or(false);
                Ok(Value::Bool(affected))
            }
            "isAlive" => {
                expect_args(method, args, 0)?;
                Ok(Value::Bool(self.number("hp") > 0.0))
            }
            "isDead" => {
                expect_args(method, args, 0)?;
                Ok(Value::Bool(self.number("hp") <= 0.0))
            }
            "isActor" => {
                expect_args(method, args, 0)?;
                Ok(Value::Bool(self.side == Side::Actor))
            }
            "isEnemy" => {
                expect_args(method, args, 0)?;
                Ok(Value::Bool(self.side == Side::Enemy))
            }
            _ => Err(ExprError::NotAFunction {
                receiver: self.name.clone(),
                name: method.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> Unit {
        Unit::actor("Harold")
            .with("hp", 50i64)
            .with("mhp", 200i64)
            .with("tp", 30i64)
    }

    #[test]
    fn test_properties() {
        let unit = knight();
        assert_eq!(unit.property("hp"), Some(Value::Int(50)));
        assert_eq!(unit.property("name"), Some(Value::from("Harold")));
        assert_eq!(unit.property("atk"), None);
    }

    #[test]
    fn test_rates() {
        let unit = knight();
        assert_eq!(unit.call("hpRate", &[]).unwrap(), Value::Float(0.25));
        assert_eq!(unit.call("mpRate", &[]).unwrap(), Value::Float(0.0));
        assert_eq!(unit.call("tpRate", &[]).unwrap(), Value::Float(0.3));
    }

    #[test]
    fn test_states() {
        let mut unit = knight();
        unit.add_state(4);
        assert_eq!(
            unit.call("isStateAffected", &[Value::Int(4)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            unit.call("isStateAffected", &[Value::Int(-1)]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_side() {
        let slime = Unit::enemy("Slime");
        assert_eq!(slime.call("isEnemy", &[]).unwrap(), Value::Bool(true));
        assert_eq!(slime.call("isActor", &[]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_unknown_method_and_arity() {
        let unit = knight();
        assert!(matches!(
            unit.call("fly", &[]),
            Err(ExprError::NotAFunction { .. })
        ));
        assert!(matches!(
            unit.call("hpRate", &[Value::Int(1)]),
            Err(ExprError::Arity { expected: 0, got: 1, .. })
        ));
    }
}
