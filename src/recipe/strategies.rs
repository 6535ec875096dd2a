//! The three recipe parse strategies.
//!
//! Each one is a pure function of the raw markup. None of them is
//! authoritative; the orchestrator tries them in [`ParseStrategy::PRIORITY`]
//! order and keeps the first recipe found.

use once_cell::sync::Lazy;
use regex::Regex;

use super::normalize::{extract_quantity, normalize_item_name};
use super::{CraftingRecipe, IngredientList, RecipeKind};
use crate::sanitize::HTML_TAG;

// `A1=1 Stick`, `item=4 Wool`, `ingredient2=[[Gold Ingot]]`
static TEMPLATE_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^(?:[a-z]\d|item|ingredient\d*)\s*=\s*(?:(\d+)\s*)?(.+)$")
        .expect("Invalid template parameter regex")
});

static TABLE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("Invalid table row regex"));

static TABLE_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<t[hd][^>]*>(.*?)</t[hd]>").expect("Invalid table cell regex")
});

// "8 Nautilus Shell + 1 Heart of the Sea"
static COUNTED_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s+([A-Za-z\s]+?)(?:\s*\+|$|\.)").expect("Invalid counted item regex")
});

static INGREDIENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:ingredients?|recipe)[ \t]*:[ \t]*([^\n]*)")
        .expect("Invalid ingredient line regex")
});

static LIST_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+&,]").expect("Invalid list separator regex"));

static SHAPELESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)shapeless").expect("Invalid shapeless regex"));

/// Table cells shorter than this are layout noise, not item names.
const MIN_TABLE_ITEM_LEN: usize = 3;

/// A recipe parse strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// `{{Crafting ...|A1=...}}` style template invocations.
    Template,
    /// Rendered HTML `<tr>`/`<td>` tables.
    Table,
    /// "8 Nautilus Shell + 1 Heart of the Sea" and "Ingredients: ..." prose.
    FreeText,
}

impl ParseStrategy {
    /// Most structured first.
    pub const PRIORITY: [ParseStrategy; 3] = [
        ParseStrategy::Template,
        ParseStrategy::Table,
        ParseStrategy::FreeText,
    ];

    /// Short name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            ParseStrategy::Template => "template",
            ParseStrategy::Table => "table",
            ParseStrategy::FreeText => "free-text",
        }
    }

    /// Run this strategy over raw markup.
    ///
    /// Returns `None` unless at least one ingredient was found.
    pub fn parse(self, raw: &str) -> Option<CraftingRecipe> {
        match self {
            ParseStrategy::Template => parse_template(raw),
            ParseStrategy::Table => parse_table(raw),
            ParseStrategy::FreeText => parse_free_text(raw),
        }
    }
}

fn parse_template(raw: &str) -> Option<CraftingRecipe> {
    let mut ingredients = IngredientList::default();
    let mut shapeless = false;

    // Templates nested inside a recipe template are its parameter values.
    let mut covered_until = 0;

    for (start, end) in template_spans(raw) {
        if start < covered_until {
            continue;
        }

        let params = split_template_params(&raw[start..end]);
        let Some((name, params)) = params.split_first() else {
            continue;
        };

        let name = name.trim().to_lowercase();
        if !(name.contains("craft") || name.contains("recipe")) {
            continue;
        }
        covered_until = end;
        if name.contains("shapeless") {
            shapeless = true;
        }

        for param in params {
            let param = param.trim();
            if param.to_lowercase().contains("shapeless") {
                shapeless = true;
            }

            let Some(caps) = TEMPLATE_PARAM.captures(param) else {
                continue;
            };
            let quantity = match caps.get(1) {
                Some(digits) => match digits.as_str().parse::<u32>() {
                    Ok(n) => n,
                    Err(_) => continue,
                },
                None => 1,
            };
            ingredients.add(normalize_item_name(&caps[2]), quantity);
        }
    }

    if ingredients.is_empty() {
        return None;
    }

    // The word can sit in prose next to the template rather than inside it.
    let recipe_type = if shapeless || SHAPELESS.is_match(raw) {
        RecipeKind::Shapeless
    } else {
        RecipeKind::Shaped
    };

    Some(CraftingRecipe {
        ingredients: ingredients.into_vec(),
        recipe_type,
        pattern: (recipe_type == RecipeKind::Shaped).then(|| "Arranged in crafting grid".to_string()),
        result: None,
    })
}

/// Byte ranges of every `{{...}}` body in `raw`, in document order.
///
/// Braces are matched with a stack, so `{{Crafting|note={{only|java}}}}`
/// yields the outer body as well as the inner one. Unclosed openers are
/// ignored.
fn template_spans(raw: &str) -> Vec<(usize, usize)> {
    let bytes = raw.as_bytes();
    let mut open = Vec::new();
    let mut spans = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'{', b'{') => {
                open.push(i + 2);
                i += 2;
            }
            (b'}', b'}') if !open.is_empty() => {
                if let Some(start) = open.pop() {
                    spans.push((start, i));
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    spans.sort_unstable();
    spans
}

/// Split a template body on `|`, leaving pipes inside `[[link|label]]` and
/// nested `{{...}}` alone.
fn split_template_params(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1);
        match bytes[i] {
            b'[' if next == Some(&b'[') => {
                depth += 1;
                i += 2;
                continue;
            }
            b'{' if next == Some(&b'{') => {
                depth += 1;
                i += 2;
                continue;
            }
            b']' if depth > 0 && next == Some(&b']') => {
                depth -= 1;
                i += 2;
                continue;
            }
            b'}' if depth > 0 && next == Some(&b'}') => {
                depth -= 1;
                i += 2;
                continue;
            }
            b'|' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    parts.push(&body[start..]);
    parts
}

fn parse_table(raw: &str) -> Option<CraftingRecipe> {
    let mut ingredients = IngredientList::default();

    for row in TABLE_ROW.captures_iter(raw) {
        let cells: Vec<&str> = TABLE_CELL
            .captures_iter(&row[1])
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .collect();

        if cells.len() < 2 {
            continue;
        }

        let item = normalize_item_name(cells[0]);
        let header = item.to_lowercase();
        if header.contains("ingredient") || header.contains("item") || header.contains("quantity") {
            continue;
        }

        if item.len() < MIN_TABLE_ITEM_LEN {
            continue;
        }

        // Attribute values like `width="32"` are not quantities.
        let quantity = extract_quantity(&HTML_TAG.replace_all(cells[1], " "))
            .or_else(|| extract_quantity(&HTML_TAG.replace_all(cells[0], " ")))
            .filter(|&n| n > 0)
            .unwrap_or(1);
        ingredients.add(item, quantity);
    }

    if ingredients.is_empty() {
        return None;
    }

    Some(CraftingRecipe {
        ingredients: ingredients.into_vec(),
        recipe_type: RecipeKind::Shaped,
        pattern: Some("Crafting table arrangement".to_string()),
        result: None,
    })
}

fn parse_free_text(raw: &str) -> Option<CraftingRecipe> {
    let mut ingredients = IngredientList::default();
    // Prose in rendered sections is split up by inline tags.
    let text = HTML_TAG.replace_all(raw, " ");

    for caps in COUNTED_ITEM.captures_iter(&text) {
        let Ok(quantity) = caps[1].parse::<u32>() else {
            continue;
        };
        ingredients.add(normalize_item_name(&caps[2]), quantity);
    }

    if ingredients.is_empty() {
        if let Some(line) = INGREDIENT_LINE.captures(&text) {
            for token in LIST_SEPARATOR.split(&line[1]) {
                ingredients.add(normalize_item_name(token), 1);
            }
        }
    }

    if ingredients.is_empty() {
        return None;
    }

    let shapeless = SHAPELESS.is_match(raw);
    Some(CraftingRecipe {
        ingredients: ingredients.into_vec(),
        recipe_type: if shapeless {
            RecipeKind::Shapeless
        } else {
            RecipeKind::Shaped
        },
        pattern: Some(
            if shapeless {
                "Any arrangement"
            } else {
                "Specific pattern required"
            }
            .to_string(),
        ),
        result: None,
    })
}
