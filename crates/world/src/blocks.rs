//! Block identifiers used by the generator.
//!
//! Ids are opaque tokens. The generator only ever asks whether a voxel is
//! air, stone-like, a fluid, or one of the placed ore/plant blocks.

use crate::chunk::BlockId;

pub const AIR: BlockId = 0;
pub const STONE: BlockId = 1;
pub const DIRT: BlockId = 2;
pub const GRASS: BlockId = 3;
pub const SAND: BlockId = 4;
pub const GRAVEL: BlockId = 5;
pub const WATER: BlockId = 6;
pub const ICE: BlockId = 7;
pub const SNOW: BlockId = 8;
pub const CLAY: BlockId = 9;
pub const BEDROCK: BlockId = 10;
pub const LAVA: BlockId = 11;
pub const DEEPSLATE: BlockId = 12;
pub const SNOW_LAYER: BlockId = 13;

// Ores
pub const COAL_ORE: BlockId = 14;
pub const IRON_ORE: BlockId = 15;
pub const GOLD_ORE: BlockId = 16;
pub const DIAMOND_ORE: BlockId = 17;
pub const COPPER_ORE: BlockId = 18;
pub const REDSTONE_ORE: BlockId = 19;
pub const LAPIS_ORE: BlockId = 20;
pub const EMERALD_ORE: BlockId = 21;
pub const DEEPSLATE_COAL_ORE: BlockId = 22;
pub const DEEPSLATE_IRON_ORE: BlockId = 23;
pub const DEEPSLATE_COPPER_ORE: BlockId = 24;
pub const DEEPSLATE_GOLD_ORE: BlockId = 25;
pub const DEEPSLATE_DIAMOND_ORE: BlockId = 26;
pub const DEEPSLATE_LAPIS_ORE: BlockId = 27;
pub const DEEPSLATE_EMERALD_ORE: BlockId = 28;

// Stone variants placed as blobs
pub const GRANITE: BlockId = 29;
pub const DIORITE: BlockId = 30;
pub const ANDESITE: BlockId = 31;

// Ground cover
pub const DANDELION: BlockId = 40;
pub const POPPY: BlockId = 41;
pub const AZURE_BLUET: BlockId = 42;
pub const OXEYE_DAISY: BlockId = 43;
pub const TALL_GRASS: BlockId = 44;
pub const DOUBLE_TALL_GRASS: BlockId = 45;
pub const FERN: BlockId = 46;
pub const BUSH: BlockId = 47;
pub const FIREFLY_BUSH: BlockId = 48;
pub const BROWN_MUSHROOM: BlockId = 49;
pub const RED_MUSHROOM: BlockId = 50;
pub const SWEET_BERRY_BUSH: BlockId = 51;

const NAMES: &[(&str, BlockId)] = &[
    ("air", AIR),
    ("stone", STONE),
    ("dirt", DIRT),
    ("grass", GRASS),
    ("sand", SAND),
    ("gravel", GRAVEL),
    ("water", WATER),
    ("ice", ICE),
    ("snow", SNOW),
    ("clay", CLAY),
    ("bedrock", BEDROCK),
    ("lava", LAVA),
    ("deepslate", DEEPSLATE),
    ("snow_layer", SNOW_LAYER),
    ("coal_ore", COAL_ORE),
    ("iron_ore", IRON_ORE),
    ("gold_ore", GOLD_ORE),
    ("diamond_ore", DIAMOND_ORE),
    ("copper_ore", COPPER_ORE),
    ("redstone_ore", REDSTONE_ORE),
    ("lapis_ore", LAPIS_ORE),
    ("emerald_ore", EMERALD_ORE),
    ("deepslate_coal_ore", DEEPSLATE_COAL_ORE),
    ("deepslate_iron_ore", DEEPSLATE_IRON_ORE),
    ("deepslate_copper_ore", DEEPSLATE_COPPER_ORE),
    ("deepslate_gold_ore", DEEPSLATE_GOLD_ORE),
    ("deepslate_diamond_ore", DEEPSLATE_DIAMOND_ORE),
    ("deepslate_lapis_ore", DEEPSLATE_LAPIS_ORE),
    ("deepslate_emerald_ore", DEEPSLATE_EMERALD_ORE),
    ("granite", GRANITE),
    ("diorite", DIORITE),
    ("andesite", ANDESITE),
    ("dandelion", DANDELION),
    ("poppy", POPPY),
    ("azure_bluet", AZURE_BLUET),
    ("oxeye_daisy", OXEYE_DAISY),
    ("tall_grass", TALL_GRASS),
    ("double_tall_grass", DOUBLE_TALL_GRASS),
    ("fern", FERN),
    ("bush", BUSH),
    ("firefly_bush", FIREFLY_BUSH),
    ("brown_mushroom", BROWN_MUSHROOM),
    ("red_mushroom", RED_MUSHROOM),
    ("sweet_berry_bush", SWEET_BERRY_BUSH),
];

/// Look up a block id by its registry name.
pub fn by_name(name: &str) -> Option<BlockId> {
    NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, id)| *id)
}

/// Registry name for a block id, if it is one the generator knows.
pub fn name_of(id: BlockId) -> Option<&'static str> {
    NAMES
        .iter()
        .find(|(_, candidate)| *candidate == id)
        .map(|(name, _)| *name)
}

/// Stone and deepslate are the only blocks carvers and veins may replace.
#[inline]
pub fn is_carvable(id: BlockId) -> bool {
    id == STONE || id == DEEPSLATE
}

#[inline]
pub fn is_fluid(id: BlockId) -> bool {
    id == WATER || id == LAVA
}

/// Ground that accepts plants.
#[inline]
pub fn is_plant_soil(id: BlockId) -> bool {
    id == GRASS || id == DIRT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for (name, id) in NAMES {
            assert_eq!(by_name(name), Some(*id));
            assert_eq!(name_of(*id), Some(*name));
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<BlockId> = NAMES.iter().map(|(_, id)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), NAMES.len());
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(by_name("obsidian"), None);
    }

    #[test]
    fn test_carvable() {
        assert!(is_carvable(STONE));
        assert!(is_carvable(DEEPSLATE));
        assert!(!is_carvable(BEDROCK));
        assert!(!is_carvable(COAL_ORE));
        assert!(!is_carvable(AIR));
    }
}
