//! Crafting-recipe extraction from wiki markup.
//!
//! Wiki pages describe recipes in several inconsistent ways: grid templates
//! in wikitext, rendered HTML tables, or plain prose. Extraction runs a
//! cheap gate check first, then tries each [`ParseStrategy`] in priority
//! order and keeps the first recipe found. Nothing here does I/O and
//! nothing here fails: a miss is simply `has_recipe: false`.

mod normalize;
mod strategies;

use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::{Deserialize, Serialize};

pub use normalize::{extract_quantity, normalize_item_name};
pub use strategies::ParseStrategy;

static CRAFTING_INDICATORS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)crafting",
        r"(?i)recipe",
        r"(?i)ingredients",
        r"(?i)\{\{[^}]*craft[^}]*\}\}",
        r"(?i)<table[^>]*craft",
        r"\|\s*[A-Za-z\s]+\s*\|\s*\d+",
        r"(?is)<table.*?ingredient.*?</table>",
        r"(?is)<table.*?quantity.*?</table>",
        r"(?is)<tr.*?<td.*?\d+.*?</td>",
        r"\d+\s+[A-Za-z\s]+",
    ])
    .expect("Invalid crafting indicator regex set")
});

/// One ingredient of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Normalized item name, never empty.
    pub item: String,
    /// Total count, at least 1.
    pub quantity: u32,
}

/// How a recipe is laid out.
///
/// The parsers only ever produce `Shaped` or `Shapeless`; the other
/// variants are kept so the wire format can carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeKind {
    /// Ingredients must be placed in a fixed grid pattern.
    #[default]
    Shaped,
    /// Any arrangement works.
    Shapeless,
    /// Furnace recipe.
    Smelting,
    /// Brewing stand recipe.
    Brewing,
    /// Could not tell.
    Unknown,
}

/// Output of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeOutput {
    /// Item produced.
    pub item: String,
    /// Count produced.
    pub quantity: u32,
}

/// A recipe recovered from markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingRecipe {
    /// Unique-by-item ingredient list, never empty.
    pub ingredients: Vec<Ingredient>,
    /// Layout kind.
    pub recipe_type: RecipeKind,
    /// Free-text arrangement hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Crafted item, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RecipeOutput>,
}

/// Result of running extraction over one page or section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Page title.
    pub title: String,
    /// Section index, if the markup came from a single section.
    #[serde(rename = "sectionIndex", default, skip_serializing_if = "Option::is_none")]
    pub section_index: Option<u32>,
    /// Whether a recipe was found.
    #[serde(rename = "hasRecipe")]
    pub has_recipe: bool,
    /// The recipe, when found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crafting_recipe: Option<CraftingRecipe>,
    /// The raw markup that was examined. Not sanitized.
    pub content: String,
}

/// Ingredient accumulator that keeps item names unique.
///
/// Repeated items have their quantities summed; empty names and zero
/// quantities are dropped.
#[derive(Debug, Default)]
pub(crate) struct IngredientList {
    items: Vec<Ingredient>,
}

impl IngredientList {
    pub(crate) fn add(&mut self, item: String, quantity: u32) {
        if item.is_empty() || quantity == 0 {
            return;
        }

        match self.items.iter_mut().find(|i| i.item == item) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.items.push(Ingredient { item, quantity }),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn into_vec(self) -> Vec<Ingredient> {
        self.items
    }
}

/// Cheap pre-filter: does this markup plausibly describe a recipe?
///
/// Deliberately permissive; any bare `<number> <words>` passes.
pub fn looks_like_crafting_section(raw: &str) -> bool {
    CRAFTING_INDICATORS.is_match(raw)
}

/// Extract a crafting recipe from raw page or section markup.
pub fn extract_crafting_recipe(raw: &str, title: &str, section_index: Option<u32>) -> ExtractionResult {
    let mut result = ExtractionResult {
        title: title.to_string(),
        section_index,
        has_recipe: false,
        crafting_recipe: None,
        content: raw.to_string(),
    };

    if !looks_like_crafting_section(raw) {
        tracing::debug!(title, "Content does not look like a crafting section");
        return result;
    }

    for strategy in ParseStrategy::PRIORITY {
        match strategy.parse(raw) {
            Some(recipe) => {
                tracing::debug!(
                    title,
                    strategy = strategy.name(),
                    ingredients = recipe.ingredients.len(),
                    "Extracted crafting recipe"
                );
                result.crafting_recipe = Some(recipe);
                result.has_recipe = true;
                break;
            }
            None => {
                tracing::debug!(title, strategy = strategy.name(), "No recipe from strategy");
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_gate_rejects_unrelated_text() {
        assert!(!looks_like_crafting_section("This page lists mob spawn rates."));
        let result = extract_crafting_recipe("This page lists mob spawn rates.", "Spawn", None);
        assert!(!result.has_recipe);
        assert!(result.crafting_recipe.is_none());
    }

    #[test]
    fn test_gate_accepts_indicators() {
        assert!(looks_like_crafting_section("Crafting"));
        assert!(looks_like_crafting_section("see the RECIPE below"));
        assert!(looks_like_crafting_section("{{Grid/Craft}}"));
        assert!(looks_like_crafting_section("<table class=\"crafttable\">"));
        assert!(looks_like_crafting_section("| Stone | 3"));
        assert!(looks_like_crafting_section("<table><tr><th>Quantity</th></tr></table>"));
        assert!(looks_like_crafting_section("<tr><td>\n7</td>"));
        assert!(looks_like_crafting_section("Deals 7 damage"));
    }

    #[test]
    fn test_template_beats_table() {
        let raw = "{{Crafting|A1=Stick|A2=Coal}}\n\
                   <table><tr><td>Diamond</td><td>3</td></tr></table>";
        let result = extract_crafting_recipe(raw, "Torch", Some(2));
        let recipe = result.crafting_recipe.unwrap();
        assert!(result.has_recipe);
        assert_eq!(result.section_index, Some(2));
        assert_eq!(
            recipe.ingredients,
            vec![
                Ingredient { item: "Stick".into(), quantity: 1 },
                Ingredient { item: "Coal".into(), quantity: 1 },
            ]
        );
        assert_eq!(recipe.pattern.as_deref(), Some("Arranged in crafting grid"));
    }

    #[test]
    fn test_falls_through_to_free_text() {
        let raw = "8 Nautilus Shell + 1 Heart of the Sea";
        let result = extract_crafting_recipe(raw, "Conduit", None);
        let recipe = result.crafting_recipe.unwrap();
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].quantity, 8);
        assert_eq!(recipe.ingredients[1].quantity, 1);
        assert_eq!(result.content, raw);
    }

    #[test]
    fn test_shapeless_detection() {
        let raw = "This is a Shapeless recipe. {{Recipe|item=4 Wool}}";
        let recipe = extract_crafting_recipe(raw, "Wool", None).crafting_recipe.unwrap();
        assert_eq!(recipe.recipe_type, RecipeKind::Shapeless);
        assert_eq!(recipe.ingredients[0].item, "Wool");
        assert_eq!(recipe.ingredients[0].quantity, 4);
    }

    #[test]
    fn test_gate_passes_but_nothing_parses() {
        let result = extract_crafting_recipe("Crafting is covered elsewhere", "Misc", Some(1));
        assert!(!result.has_recipe);
        assert!(result.crafting_recipe.is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let result = extract_crafting_recipe("{{Crafting|A1=2 Stick}}", "Ladder", Some(3));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["sectionIndex"], 3);
        assert_eq!(value["hasRecipe"], true);
        assert_eq!(value["crafting_recipe"]["recipe_type"], "shaped");
        assert_eq!(value["crafting_recipe"]["ingredients"][0]["item"], "Stick");
        assert!(value["crafting_recipe"].get("result").is_none());
    }

    #[test]
    fn test_reserved_kinds_serialize() {
        assert_eq!(serde_json::to_value(RecipeKind::Smelting).unwrap(), "smelting");
        assert_eq!(serde_json::to_value(RecipeKind::Brewing).unwrap(), "brewing");
        assert_eq!(serde_json::to_value(RecipeKind::Unknown).unwrap(), "unknown");
        assert_eq!(RecipeKind::default(), RecipeKind::Shaped);
    }

    #[test]
    fn test_ingredient_list_merges_and_drops() {
        let mut list = IngredientList::default();
        list.add("Iron Ingot".into(), 3);
        list.add(String::new(), 4);
        list.add("Stick".into(), 0);
        list.add("Iron Ingot".into(), 2);
        assert_eq!(
            list.into_vec(),
            vec![Ingredient { item: "Iron Ingot".into(), quantity: 5 }]
        );
    }

    fn markup_fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            (1u32..20, "(Stick|Iron Ingot|Wool)").prop_map(|(n, item)| format!("{n} {item} + ")),
            (1u32..9, "(Stick|Coal|Diamond)").prop_map(|(n, item)| format!("{{{{Crafting|A1={n} {item}|B2={item}}}}}")),
            (1u32..9, "(Stick|Diamond|Gold Ingot)")
                .prop_map(|(n, item)| format!("<tr><td>{item}</td><td>{n}</td></tr>")),
            Just("Ingredients: Stick, Stick & Coal\n".to_string()),
            "[a-zA-Z0-9 |{}=.\n]{0,20}",
        ]
    }

    proptest! {
        #[test]
        fn extracted_ingredients_are_unique(parts in prop::collection::vec(markup_fragment(), 1..8)) {
            let raw = parts.concat();
            let result = extract_crafting_recipe(&raw, "Prop", None);
            prop_assert_eq!(result.has_recipe, result.crafting_recipe.is_some());
            if let Some(recipe) = result.crafting_recipe {
                prop_assert!(!recipe.ingredients.is_empty());
                for (i, a) in recipe.ingredients.iter().enumerate() {
                    prop_assert!(!a.item.is_empty());
                    prop_assert!(a.quantity >= 1);
                    for b in &recipe.ingredients[i + 1..] {
                        prop_assert_ne!(&a.item, &b.item);
                    }
                }
            }
        }
    }
}
