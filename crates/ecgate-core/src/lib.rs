//! ecgate Core - per-effect application conditions
//!
//! This crate lets content designers gate individual effects of a skill or
//! item behind a switch or a boolean expression, written as tags in the
//! entry's note:
//!
//! ```text
//! <EC1Switch:10>                        effect 1 needs switch 10 on
//! <EC2Cond:target.hpRate() &lt; 0.5>     effect 2 needs a hurt target
//! ```
//!
//! - Note parsing (`Meta`) and effect descriptors (`ItemDef`, `EffectDef`)
//! - A sandboxed expression language (`Expr`) with `subject` and `target`
//! - Host capabilities as traits (`SwitchTable`, `VariableTable`,
//!   `TextEscaper`, `Battler`) with in-memory implementations
//! - The gate itself (`EffectGate`) and an action pipeline with hooks
//!   (`ActionPipeline`, `ActionHook`, `EffectHandler`)
//!
//! ## Example
//!
//! ```
//! use ecgate_core::{EffectDef, EffectGate, GateConfig, ItemDef, ItemId, Switches, Unit, Variables};
//!
//! let mut switches = Switches::new();
//! let variables = Variables::new();
//! let item = ItemDef::new(ItemId(1), "Smite", "<EC1Switch:3>", vec![EffectDef::recover_hp(0.0, 10.0)]);
//! let hero = Unit::actor("Hero");
//!
//! {
//!     let gate = EffectGate::new(GateConfig::default(), &switches, &variables);
//!     assert!(!gate.is_effect_allowed(&item, &item.effects[0], &hero, None).unwrap());
//! }
//!
//! switches.set(3, true);
//! let gate = EffectGate::new(GateConfig::default(), &switches, &variables);
//! assert!(gate.is_effect_allowed(&item, &item.effects[0], &hero, None).unwrap());
//! ```

mod config;
mod effect;
mod error;
mod escape;
mod expr;
mod gate;
mod identity;
mod item;
mod meta;
mod parser;
mod pipeline;
mod tables;
mod unit;
mod value;

pub use config::{GateConfig, DEFAULT_PLUGIN_NAME};
pub use effect::{EffectDef, EffectKind};
pub use error::{Error, ExprError, Result};
pub use escape::{decode_comparison_escapes, NoEscapes, TextEscaper, VariableEscaper};
pub use expr::{BinaryOp, EvalContext, Expr, UnaryOp};
pub use gate::{parse_int_prefix, EffectGate};
pub use identity::{EffectIndex, ItemId};
pub use item::ItemDef;
pub use meta::{Meta, MetaValue};
pub use pipeline::{ActionHook, ActionOutcome, ActionPipeline, EffectHandler};
pub use tables::{SwitchTable, Switches, VariableTable, Variables};
pub use unit::{Battler, Side, Unit};
pub use value::{Value, ValueMap};
