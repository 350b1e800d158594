//! # Recipes
//!
//! The crafting table: inputs in, output plus XP out, all-or-nothing. The
//! default set is built in code; a content pipeline can replace it without
//! touching the router.

use aeon_core::{ItemKind, ResourceKind, SkillName};
use serde::{Deserialize, Serialize};

/// One crafting recipe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Stable recipe id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The skill trained.
    pub skill: SkillName,
    /// Minimum level in `skill`.
    pub level_req: u8,
    /// XP granted on success.
    pub xp: f64,
    /// Consumed inputs.
    pub inputs: Vec<(ItemKind, u32)>,
    /// Produced output.
    pub output: ItemKind,
    /// Output quantity.
    pub output_qty: u32,
    /// Station the recipe is worked at, if any.
    pub station: Option<ResourceKind>,
}

/// The built-in recipe set.
#[must_use]
pub fn default_recipes() -> Vec<Recipe> {
    vec![
        Recipe {
            id: "cook_shrimp".to_string(),
            name: "Cook Shrimp".to_string(),
            skill: SkillName::Cooking,
            level_req: 1,
            xp: 30.0,
            inputs: vec![(ItemKind::RawShrimp, 1)],
            output: ItemKind::CookedShrimp,
            output_qty: 1,
            station: Some(ResourceKind::Furnace),
        },
        Recipe {
            id: "cook_meat".to_string(),
            name: "Cook Meat".to_string(),
            skill: SkillName::Cooking,
            level_req: 1,
            xp: 30.0,
            inputs: vec![(ItemKind::RawMeat, 1)],
            output: ItemKind::CookedMeat,
            output_qty: 1,
            station: Some(ResourceKind::Furnace),
        },
        Recipe {
            id: "smelt_bronze".to_string(),
            name: "Smelt Bronze Bar".to_string(),
            skill: SkillName::Crafting,
            level_req: 1,
            xp: 12.5,
            inputs: vec![(ItemKind::CopperOre, 1), (ItemKind::TinOre, 1)],
            output: ItemKind::BronzeBar,
            output_qty: 1,
            station: Some(ResourceKind::Furnace),
        },
        Recipe {
            id: "forge_bronze_sword".to_string(),
            name: "Forge Bronze Sword".to_string(),
            skill: SkillName::Crafting,
            level_req: 10,
            xp: 25.0,
            inputs: vec![(ItemKind::BronzeBar, 2), (ItemKind::Logs, 1)],
            output: ItemKind::BronzeSword,
            output_qty: 1,
            station: Some(ResourceKind::Furnace),
        },
        Recipe {
            id: "carve_bone_spear".to_string(),
            name: "Carve Bone Spear".to_string(),
            skill: SkillName::Crafting,
            level_req: 1,
            xp: 10.0,
            inputs: vec![(ItemKind::Logs, 1), (ItemKind::Bones, 2)],
            output: ItemKind::BoneSpear,
            output_qty: 1,
            station: Some(ResourceKind::CraftingBench),
        },
        Recipe {
            id: "shape_wooden_shield".to_string(),
            name: "Shape Wooden Shield".to_string(),
            skill: SkillName::Crafting,
            level_req: 5,
            xp: 15.0,
            inputs: vec![(ItemKind::Logs, 2)],
            output: ItemKind::WoodenShield,
            output_qty: 1,
            station: Some(ResourceKind::CraftingBench),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_ids_unique() {
        let recipes = default_recipes();
        let mut ids: Vec<_> = recipes.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), recipes.len());
    }

    #[test]
    fn test_every_recipe_has_inputs() {
        for recipe in default_recipes() {
            assert!(!recipe.inputs.is_empty(), "{} has no inputs", recipe.id);
            assert!(recipe.output_qty > 0);
        }
    }
}
