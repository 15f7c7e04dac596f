//! Item database schema

use ecgate_core::{GateConfig, ItemDef};
use serde::{Deserialize, Serialize};

/// A file of usable entries: `(items: [ (id: 1, name: "...", note: "...", effects: [...]) ])`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFile {
    pub items: Vec<ItemDef>,
}

/// Gate tags in `item`'s note whose effect index has no effect behind it
///
/// Such tags can never match. They usually mean the effect list was edited
/// after the note was written, which shifts indices.
pub fn out_of_range_tags(config: &GateConfig, item: &ItemDef) -> Vec<String> {
    let suffixes: Vec<&str> = config
        .switch_tags
        .iter()
        .chain(&config.condition_tags)
        .map(String::as_str)
        .collect();
    item.meta
        .keys()
        .filter(|key| {
            let Some(rest) = key.strip_prefix(config.tag_prefix.as_str()) else {
                return false;
            };
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits == 0 || !suffixes.contains(&&rest[digits..]) {
                return false;
            }
            match rest[..digits].parse::<usize>() {
                Ok(index) => index == 0 || index > item.effects.len(),
                Err(_) => true,
            }
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecgate_core::{EffectDef, ItemId};

    #[test]
    fn test_out_of_range_tags() {
        let item = ItemDef::new(
            ItemId(1),
            "Fire",
            "<EC1Switch:2><EC3Cond:true><EC0条件:false><ECHO:1><EC2Other:4>",
            vec![EffectDef::recover_hp(0.0, 1.0), EffectDef::common_event(2)],
        );
        let tags = out_of_range_tags(&GateConfig::default(), &item);
        assert_eq!(tags, vec!["EC3Cond".to_string(), "EC0条件".to_string()]);
    }

    #[test]
    fn test_item_file_from_ron() {
        let file: ItemFile = ron::from_str(
            r#"(items: [(id: 3, name: "Ether", note: "<EC1Switch:1>", effects: [(kind: RecoverMp, value2: 20.0)])])"#,
        )
        .unwrap();
        assert_eq!(file.items.len(), 1);
        assert_eq!(file.items[0].effects[0].value2, 20.0);
    }
}
