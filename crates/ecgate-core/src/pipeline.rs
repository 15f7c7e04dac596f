//! Action resolution with pre-application hooks
//!
//! The host resolves an action in two phases: the target-independent global
//! pass runs when the action starts, then every effect is applied to every
//! target. Hooks are consulted once before the global pass and before each
//! per-target application. Any hook returning `false` skips that step; any hook error aborts
//! the whole action.

use crate::{Battler, EffectDef, ItemDef, Result};
use tracing::trace;

/// Pre-condition checks registered with an [`ActionPipeline`]
pub trait ActionHook {
    /// Called before `effect` is applied to `target`
    fn before_item_effect(
        &self,
        subject: &dyn Battler,
        target: &dyn Battler,
        item: &ItemDef,
        effect: &EffectDef,
    ) -> Result<bool> {
        let _ = (subject, target, item, effect);
        Ok(true)
    }

    /// Called once before the global pass of `item`
    fn before_global(&self, subject: &dyn Battler, item: &ItemDef) -> Result<bool> {
        let _ = (subject, item);
        Ok(true)
    }
}

/// The host side of action resolution
///
/// Targets are addressed by slot so that hooks can read units between
/// applications that mutate them.
pub trait EffectHandler {
    /// The acting unit
    fn subject(&self) -> &dyn Battler;

    /// The unit in target slot `slot`
    fn target(&self, slot: usize) -> Option<&dyn Battler>;

    /// Apply one effect to one target
    fn apply_item_effect(&mut self, slot: usize, item: &ItemDef, effect: &EffectDef);

    /// Run the target-independent pass (common events)
    fn apply_global(&mut self, item: &ItemDef);
}

/// What happened while resolving one action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Per-target applications that ran
    pub applied: usize,
    /// Per-target applications skipped by a hook
    pub vetoed: usize,
    /// Target slots with no unit behind them
    pub missing_targets: usize,
    /// Whether the global pass ran
    pub global_applied: bool,
}

/// Runs actions through registered hooks
#[derive(Default)]
pub struct ActionPipeline<'h> {
    hooks: Vec<Box<dyn ActionHook + 'h>>,
}

impl<'h> ActionPipeline<'h> {
    /// Create a pipeline with no hooks
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a hook; hooks run in registration order
    pub fn register(&mut self, hook: impl ActionHook + 'h) {
        self.hooks.push(Box::new(hook));
    }

    /// Number of registered hooks
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Resolve `item` against the target slots in `targets`
    ///
    /// The global pass is checked and run first, so its conditions see units
    /// as they were before any per-target effect. Returns the first hook
    /// error without applying anything further.
    pub fn resolve<H: EffectHandler + ?Sized>(
        &self,
        handler: &mut H,
        item: &ItemDef,
        targets: &[usize],
    ) -> Result<ActionOutcome> {
        let mut outcome = ActionOutcome::default();
        if self.allows_global(handler.subject(), item)? {
            handler.apply_global(item);
            outcome.global_applied = true;
        }
        for &slot in targets {
            for effect in &item.effects {
                let allowed = {
                    let Some(target) = handler.target(slot) else {
                        outcome.missing_targets += 1;
                        break;
                    };
                    self.allows_item_effect(handler.subject(), target, item, effect)?
                };
                if allowed {
                    handler.apply_item_effect(slot, item, effect);
                    outcome.applied += 1;
                } else {
                    outcome.vetoed += 1;
                }
            }
        }
        trace!(item = %item.id, ?outcome, "action resolved");
        Ok(outcome)
    }

    fn allows_item_effect(
        &self,
        subject: &dyn Battler,
        target: &dyn Battler,
        item: &ItemDef,
        effect: &EffectDef,
    ) -> Result<bool> {
        for hook in &self.hooks {
            if !hook.before_item_effect(subject, target, item, effect)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn allows_global(&self, subject: &dyn Battler, item: &ItemDef) -> Result<bool> {
        for hook in &self.hooks {
            if !hook.before_global(subject, item)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EffectGate, EffectKind, Error, GateConfig, ItemId, Switches, Unit, Variables};

    /// Minimal host: recovers HP and records common events
    struct Battle {
        subject: Unit,
        targets: Vec<Unit>,
        common_events: Vec<u32>,
        global_passes: usize,
        steps: Vec<&'static str>,
    }

    impl Battle {
        fn new() -> Self {
            Self {
                subject: Unit::actor("Priest").with("hp", 50i64).with("mhp", 50i64),
                targets: vec![
                    Unit::actor("Knight").with("hp", 10i64).with("mhp", 100i64),
                    Unit::actor("Mage").with("hp", 60i64).with("mhp", 60i64),
                ],
                common_events: Vec::new(),
                global_passes: 0,
                steps: Vec::new(),
            }
        }
    }

    impl EffectHandler for Battle {
        fn subject(&self) -> &dyn Battler {
            &self.subject
        }

        fn target(&self, slot: usize) -> Option<&dyn Battler> {
            self.targets.get(slot).map(|u| u as &dyn Battler)
        }

        fn apply_item_effect(&mut self, slot: usize, _item: &ItemDef, effect: &EffectDef) {
            self.steps.push("effect");
            let unit = &mut self.targets[slot];
            if effect.kind == EffectKind::RecoverHp {
                let mhp = unit.number("mhp");
                let hp = (unit.number("hp") + effect.value2).min(mhp);
                unit.set("hp", hp);
            }
        }

        fn apply_global(&mut self, item: &ItemDef) {
            self.steps.push("global");
            self.global_passes += 1;
            for (_, effect) in item.common_events() {
                self.common_events.push(effect.data_id);
            }
        }
    }

    struct DenyAll;

    impl ActionHook for DenyAll {
        fn before_item_effect(
            &self,
            _subject: &dyn Battler,
            _target: &dyn Battler,
            _item: &ItemDef,
            _effect: &EffectDef,
        ) -> Result<bool> {
            Ok(false)
        }
    }

    fn heal(note: &str) -> ItemDef {
        ItemDef::new(
            ItemId(1),
            "Heal",
            note,
            vec![EffectDef::recover_hp(0.0, 30.0), EffectDef::common_event(8)],
        )
    }

    #[test]
    fn test_no_hooks_applies_everything() {
        let mut battle = Battle::new();
        let pipeline = ActionPipeline::new();
        let outcome = pipeline.resolve(&mut battle, &heal(""), &[0, 1]).unwrap();
        assert_eq!(outcome.applied, 4);
        assert!(outcome.global_applied);
        assert_eq!(battle.targets[0].number("hp"), 40.0);
        assert_eq!(battle.common_events, vec![8]);
    }

    #[test]
    fn test_per_target_condition() {
        let switches = Switches::new();
        let variables = Variables::new();
        let mut pipeline = ActionPipeline::new();
        pipeline.register(EffectGate::new(GateConfig::default(), &switches, &variables));

        let mut battle = Battle::new();
        let item = heal("<EC1Cond:target.hpRate() &lt; 1>");
        let outcome = pipeline.resolve(&mut battle, &item, &[0, 1]).unwrap();

        // Knight is hurt and healed, Mage is at full HP and skipped
        assert_eq!(outcome.vetoed, 1);
        assert_eq!(outcome.applied, 3);
        assert_eq!(battle.targets[0].number("hp"), 40.0);
        assert_eq!(battle.targets[1].number("hp"), 60.0);
    }

    #[test]
    fn test_condition_rechecked_each_time() {
        let switches = Switches::new();
        let variables = Variables::new();
        let mut pipeline = ActionPipeline::new();
        pipeline.register(EffectGate::new(GateConfig::default(), &switches, &variables));

        let mut battle = Battle::new();
        let item = heal("<EC1Cond:target.hp &lt; 60>");
        pipeline.resolve(&mut battle, &item, &[0]).unwrap();
        assert_eq!(battle.targets[0].number("hp"), 40.0);
        pipeline.resolve(&mut battle, &item, &[0]).unwrap();
        assert_eq!(battle.targets[0].number("hp"), 70.0);
        let outcome = pipeline.resolve(&mut battle, &item, &[0]).unwrap();
        assert_eq!(outcome.vetoed, 1);
        assert_eq!(battle.targets[0].number("hp"), 70.0);
    }

    #[test]
    fn test_global_veto() {
        let mut switches = Switches::new();
        let variables = Variables::new();
        let item = heal("<EC2Switch:5>");

        {
            let mut pipeline = ActionPipeline::new();
            pipeline.register(EffectGate::new(GateConfig::default(), &switches, &variables));
            let mut battle = Battle::new();
            let outcome = pipeline.resolve(&mut battle, &item, &[0]).unwrap();
            assert!(!outcome.global_applied);
            assert_eq!(battle.global_passes, 0);
            // slot 1 has no tags and still applies
            assert_eq!(outcome.applied, 1);
            assert_eq!(outcome.vetoed, 1);
        }

        switches.set(5, true);
        let mut pipeline = ActionPipeline::new();
        pipeline.register(EffectGate::new(GateConfig::default(), &switches, &variables));
        let mut battle = Battle::new();
        let outcome = pipeline.resolve(&mut battle, &item, &[0]).unwrap();
        assert!(outcome.global_applied);
        assert_eq!(battle.common_events, vec![8]);
    }

    #[test]
    fn test_script_error_aborts_action() {
        let switches = Switches::new();
        let variables = Variables::new();
        let mut pipeline = ActionPipeline::new();
        pipeline.register(EffectGate::new(GateConfig::default(), &switches, &variables));

        let mut battle = Battle::new();
        let item = heal("<EC1Cond:bogus(>");
        let err = pipeline.resolve(&mut battle, &item, &[0, 1]).unwrap_err();
        assert!(matches!(err, Error::Script { ref expression, .. } if expression == "bogus("));
        assert_eq!(battle.targets[0].number("hp"), 10.0);
        // the global pass had already run when the per-target check failed
        assert_eq!(battle.steps, vec!["global"]);
    }

    #[test]
    fn test_global_script_error_precedes_targets() {
        let switches = Switches::new();
        let variables = Variables::new();
        let mut pipeline = ActionPipeline::new();
        pipeline.register(EffectGate::new(GateConfig::default(), &switches, &variables));

        let mut battle = Battle::new();
        let item = heal("<EC2Cond:bogus(>");
        assert!(pipeline.resolve(&mut battle, &item, &[0, 1]).is_err());
        assert!(battle.steps.is_empty());
        assert_eq!(battle.targets[0].number("hp"), 10.0);
    }

    #[test]
    fn test_global_pass_runs_first() {
        let mut battle = Battle::new();
        let outcome = ActionPipeline::new()
            .resolve(&mut battle, &heal(""), &[0])
            .unwrap();
        assert!(outcome.global_applied);
        assert_eq!(battle.steps, vec!["global", "effect", "effect"]);
    }

    #[test]
    fn test_any_hook_can_veto() {
        let switches = Switches::new();
        let variables = Variables::new();
        let mut pipeline = ActionPipeline::new();
        pipeline.register(EffectGate::new(GateConfig::default(), &switches, &variables));
        pipeline.register(DenyAll);
        assert_eq!(pipeline.hook_count(), 2);

        let mut battle = Battle::new();
        let outcome = pipeline.resolve(&mut battle, &heal(""), &[0, 1]).unwrap();
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.vetoed, 4);
        assert!(outcome.global_applied);
    }

    #[test]
    fn test_missing_target_slot() {
        let mut battle = Battle::new();
        let outcome = ActionPipeline::new()
            .resolve(&mut battle, &heal(""), &[0, 7])
            .unwrap();
        assert_eq!(outcome.missing_targets, 1);
        assert_eq!(outcome.applied, 2);
    }
}
