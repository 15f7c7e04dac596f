//! Battle Demo
//!
//! Loads a small content set and resolves a few skills whose effects are
//! gated by switches and conditions:
//! - Holy Light only heals allies below full HP
//! - Judgement's common events are all vetoed until switch 5 is on
//! - Last Stand reads variable 1 through `\v[1]`
//! - Cursed Tome carries a broken condition and aborts
//!
//! Run with `RUST_LOG=debug` to see each veto.

use ecgate_core::{
    ActionPipeline, Battler, EffectDef, EffectGate, EffectHandler, EffectKind, ItemDef, Switches,
    Unit, Variables,
};
use ecgate_script::{Database, Loader};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The host side: owns the units and applies effects to them
struct Battle {
    subject: Unit,
    targets: Vec<Unit>,
    reserved_events: Vec<u32>,
}

impl Battle {
    fn new(db: &Database, subject: &str, targets: &[&str]) -> Result<Self, Box<dyn Error>> {
        let unit = |name: &str| {
            db.get_unit(name)
                .cloned()
                .ok_or_else(|| format!("unknown unit {}", name))
        };
        Ok(Self {
            subject: unit(subject)?,
            targets: targets.iter().map(|&n| unit(n)).collect::<Result<_, _>>()?,
            reserved_events: Vec::new(),
        })
    }

    fn slots(&self) -> Vec<usize> {
        (0..self.targets.len()).collect()
    }
}

impl EffectHandler for Battle {
    fn subject(&self) -> &dyn Battler {
        &self.subject
    }

    fn target(&self, slot: usize) -> Option<&dyn Battler> {
        self.targets.get(slot).map(|u| u as &dyn Battler)
    }

    fn apply_item_effect(&mut self, slot: usize, item: &ItemDef, effect: &EffectDef) {
        let Some(unit) = self.targets.get_mut(slot) else {
            return;
        };
        match effect.kind {
            EffectKind::RecoverHp => {
                let before = unit.number("hp");
                let after = (before + effect.value2).min(unit.number("mhp"));
                unit.set("hp", after);
                println!(
                    "  {} uses {}: {} HP {} -> {}",
                    self.subject.name, item.name, unit.name, before, after
                );
            }
            EffectKind::AddState => {
                unit.add_state(effect.data_id);
                println!(
                    "  {} uses {}: {} gains state {}",
                    self.subject.name, item.name, unit.name, effect.data_id
                );
            }
            _ => {}
        }
    }

    fn apply_global(&mut self, item: &ItemDef) {
        for (_, effect) in item.common_events() {
            self.reserved_events.push(effect.data_id);
            println!("  {} reserves common event {}", item.name, effect.data_id);
        }
    }
}

fn resolve(
    db: &Database,
    switches: &Switches,
    variables: &Variables,
    item_name: &str,
    battle: &mut Battle,
) -> Result<(), Box<dyn Error>> {
    let item = db
        .item_by_name(item_name)
        .ok_or_else(|| format!("unknown item {}", item_name))?;
    let mut pipeline = ActionPipeline::new();
    pipeline.register(EffectGate::new(db.config.clone(), switches, variables));

    println!("{}:", item.name);
    let slots = battle.slots();
    match pipeline.resolve(battle, item, &slots) {
        Ok(outcome) => {
            info!(item = %item.name, ?outcome, "action resolved");
            println!(
                "  applied {}, vetoed {}, global pass {}",
                outcome.applied,
                outcome.vetoed,
                if outcome.global_applied { "ran" } else { "skipped" }
            );
        }
        Err(e) => println!("  action aborted: {}", e),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let content_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/content")));

    println!("=== ecgate Battle Demo ===\n");

    let mut loader = Loader::new();
    loader.load_directory(&content_dir)?;
    let db = loader.finish();
    info!(items = db.items.len(), units = db.units.len(), "content loaded");

    let mut switches = db.switches.clone();
    let variables = db.variables.clone();

    let mut party = Battle::new(&db, "Priest", &["Knight", "Mage"])?;
    resolve(&db, &switches, &variables, "Holy Light", &mut party)?;
    resolve(&db, &switches, &variables, "Holy Light", &mut party)?;

    let mut ritual = Battle::new(&db, "Priest", &["Priest"])?;
    resolve(&db, &switches, &variables, "Judgement", &mut ritual)?;
    println!("  (turning switch 5 on)");
    switches.set(5, true);
    resolve(&db, &switches, &variables, "Judgement", &mut ritual)?;
    println!("  reserved events: {:?}", ritual.reserved_events);

    let mut stand = Battle::new(&db, "Priest", &["Knight"])?;
    resolve(&db, &switches, &variables, "Last Stand", &mut stand)?;

    let mut cursed = Battle::new(&db, "Priest", &["Mage"])?;
    resolve(&db, &switches, &variables, "Cursed Tome", &mut cursed)?;

    println!("\n=== Demo Complete ===");
    Ok(())
}
