//! The effect gate
//!
//! Decides, per effect slot, whether an effect may apply this invocation.
//! Two tag fields are consulted for slot `i` (see [`GateConfig`]):
//!
//! - a switch id (`<EC{i}Switch:10>`): passes iff the switch is on
//! - a condition (`<EC{i}Cond:target.hpRate() &lt; 0.5>`): passes iff the
//!   expression is truthy
//!
//! A missing or empty tag always passes; a condition of only whitespace
//! evaluates to nothing and blocks. The switch is checked first and a
//! failing switch skips the condition. A condition that fails to parse or
//! evaluate is fatal for the action: [`Error::Script`] is returned and must
//! not be swallowed by the caller.

use crate::escape::{decode_comparison_escapes, TextEscaper, VariableEscaper};
use crate::{
    ActionHook, Battler, EffectDef, EffectIndex, Error, EvalContext, Expr, ExprError, GateConfig,
    ItemDef, Meta, Result, SwitchTable, VariableTable,
};
use tracing::{debug, error, trace};

/// Parse an integer the way designers expect from the host's `parseInt`
///
/// Leading whitespace and a sign are accepted, parsing stops at the first
/// non-digit, and anything without digits reads as 0. Values beyond `i64`
/// saturate.
pub fn parse_int_prefix(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    if negative {
        -value
    } else {
        value
    }
}

/// Gate over host switch and variable tables
pub struct EffectGate<'a> {
    config: GateConfig,
    switches: &'a dyn SwitchTable,
    variables: &'a dyn VariableTable,
    escaper: Box<dyn TextEscaper + 'a>,
}

impl<'a> EffectGate<'a> {
    /// Create a gate that resolves `\V[n]` escapes from `variables`
    pub fn new(
        config: GateConfig,
        switches: &'a dyn SwitchTable,
        variables: &'a dyn VariableTable,
    ) -> Self {
        Self {
            config,
            switches,
            variables,
            escaper: Box::new(VariableEscaper::new(variables)),
        }
    }

    /// Replace the host escape service
    pub fn with_escaper(mut self, escaper: impl TextEscaper + 'a) -> Self {
        self.escaper = Box::new(escaper);
        self
    }

    /// The configuration in use
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Whether `effect`, taken from `item`, may apply
    ///
    /// The slot index is resolved from the effect's position in
    /// `item.effects`; an effect that is not in the list matches no tags.
    pub fn is_effect_allowed(
        &self,
        item: &ItemDef,
        effect: &EffectDef,
        subject: &dyn Battler,
        target: Option<&dyn Battler>,
    ) -> Result<bool> {
        let index = item.effect_index(effect);
        self.is_allowed(&item.meta, index, subject, target)
    }

    /// Whether the effect in slot `index` of the entry tagged with `meta` may
    /// apply
    pub fn is_allowed(
        &self,
        meta: &Meta,
        index: EffectIndex,
        subject: &dyn Battler,
        target: Option<&dyn Battler>,
    ) -> Result<bool> {
        if index.is_none() {
            return Ok(true);
        }
        if !self.switch_passes(meta, index) {
            trace!(%index, "effect switch is off");
            return Ok(false);
        }
        let allowed = self.condition_passes(meta, index, subject, target)?;
        trace!(%index, allowed, "effect condition evaluated");
        Ok(allowed)
    }

    /// Switch check for one slot; passes when no switch is configured
    pub fn switch_passes(&self, meta: &Meta, index: EffectIndex) -> bool {
        match self.annotation(meta, &self.config.switch_keys(index)) {
            None => true,
            Some(text) => self.switches.value(parse_int_prefix(&text)),
        }
    }

    /// Condition check for one slot; passes when no condition is configured
    pub fn condition_passes(
        &self,
        meta: &Meta,
        index: EffectIndex,
        subject: &dyn Battler,
        target: Option<&dyn Battler>,
    ) -> Result<bool> {
        let Some(source) = self.annotation(meta, &self.config.condition_keys(index)) else {
            return Ok(true);
        };
        if source.trim().is_empty() {
            return Ok(false);
        }
        let mut ctx = EvalContext::new(subject, self.switches, self.variables);
        if let Some(target) = target {
            ctx = ctx.with_target(target);
        }
        Expr::parse(&source)
            .and_then(|expr| expr.eval_bool(&ctx))
            .map_err(|source_error| self.script_error(source, source_error))
    }

    /// Decoded text of the first present key, or `None` when absent or empty
    fn annotation(&self, meta: &Meta, keys: &[String]) -> Option<String> {
        let raw = meta.first_text(keys)?;
        let text = self
            .escaper
            .convert_escapes(&decode_comparison_escapes(raw));
        (!text.is_empty()).then_some(text)
    }

    fn script_error(&self, expression: String, source: ExprError) -> Error {
        error!(
            plugin = %self.config.plugin_name,
            %expression,
            error = %source,
            "condition script failed"
        );
        Error::Script {
            plugin: self.config.plugin_name.clone(),
            expression,
            source,
        }
    }
}

impl ActionHook for EffectGate<'_> {
    fn before_item_effect(
        &self,
        subject: &dyn Battler,
        target: &dyn Battler,
        item: &ItemDef,
        effect: &EffectDef,
    ) -> Result<bool> {
        let allowed = self.is_effect_allowed(item, effect, subject, Some(target))?;
        if !allowed {
            debug!(
                item = %item.id,
                target = target.name(),
                kind = ?effect.kind,
                "effect vetoed for target"
            );
        }
        Ok(allowed)
    }

    /// A single failing common event vetoes the whole global pass, because
    /// the host applies those effects as one batch.
    fn before_global(&self, subject: &dyn Battler, item: &ItemDef) -> Result<bool> {
        for (index, _) in item.common_events() {
            if !self.is_allowed(&item.meta, index, subject, None)? {
                debug!(item = %item.id, %index, "common event vetoed, skipping global effects");
                return Ok(false);
            }
        }
        Ok(true)
    }
}
