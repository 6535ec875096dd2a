//! JSON payloads returned by the tools.
//!
//! Every string that leaves the server goes through [`crate::sanitize`]
//! here. Raw markup never reaches a caller.

use serde::Serialize;

use crate::error::Result;
use crate::recipe::{CraftingRecipe, ExtractionResult, IngredientList, RecipeOutput};
use crate::sanitize::{format_mcp_text, sanitize};
use crate::wiki::{SearchHit, SectionInfo};

/// Longest snippet returned per search hit.
pub const SNIPPET_CHARS: usize = 100;

/// Longest page summary returned.
pub const SUMMARY_CHARS: usize = 200;

#[derive(Serialize)]
struct SearchResults {
    results: Vec<SearchResult>,
}

#[derive(Serialize)]
struct SearchResult {
    #[serde(rename = "resultId")]
    result_id: usize,
    title: String,
    snippet: String,
}

#[derive(Serialize)]
struct Sections {
    sections: Vec<Section>,
}

#[derive(Serialize)]
struct Section {
    /// `null` for indexes the API reports as non-numeric (`"T-1"`).
    index: Option<u32>,
    title: String,
}

#[derive(Serialize)]
struct PageSummary {
    summary: String,
    sections: Vec<Section>,
}

#[derive(Serialize)]
struct PageSection {
    title: String,
    #[serde(rename = "sectionIndex")]
    section_index: Option<u32>,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    crafting_recipe: Option<CraftingRecipe>,
}

#[derive(Serialize)]
struct PageContent {
    title: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    crafting_recipe: Option<CraftingRecipe>,
}

#[derive(Serialize)]
struct Members {
    members: Vec<String>,
}

#[derive(Serialize)]
struct Categories {
    categories: Vec<String>,
}

#[derive(Serialize)]
struct Redirect {
    title: String,
}

/// `{"results": [{"resultId", "title", "snippet"}]}`
pub fn search_results(hits: &[SearchHit]) -> Result<String> {
    let results = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| SearchResult {
            result_id: i + 1,
            title: format_mcp_text(&hit.title),
            snippet: truncate(&format_mcp_text(&hit.snippet), SNIPPET_CHARS),
        })
        .collect();

    Ok(serde_json::to_string(&SearchResults { results })?)
}

/// `{"sections": [{"index", "title"}]}`
pub fn sections(sections: &[SectionInfo]) -> Result<String> {
    Ok(serde_json::to_string(&Sections {
        sections: section_list(sections),
    })?)
}

/// `{"summary", "sections"}` from the lead section's HTML.
pub fn page_summary(lead: &str, sections: &[SectionInfo]) -> Result<String> {
    Ok(serde_json::to_string(&PageSummary {
        summary: truncate(&sanitize(lead), SUMMARY_CHARS),
        sections: section_list(sections),
    })?)
}

/// `{"title", "sectionIndex", "content", "crafting_recipe"?}`
///
/// The extraction's raw `content` is replaced by its sanitized form.
pub fn page_section(extraction: &ExtractionResult) -> Result<String> {
    Ok(serde_json::to_string(&PageSection {
        title: format_mcp_text(&extraction.title),
        section_index: extraction.section_index,
        content: sanitize(&extraction.content),
        crafting_recipe: sanitized_recipe(extraction),
    })?)
}

/// `{"title", "content", "crafting_recipe"?}`
pub fn page_content(extraction: &ExtractionResult) -> Result<String> {
    Ok(serde_json::to_string(&PageContent {
        title: format_mcp_text(&extraction.title),
        content: sanitize(&extraction.content),
        crafting_recipe: sanitized_recipe(extraction),
    })?)
}

/// `{"members": [...]}`
pub fn category_members(members: &[String]) -> Result<String> {
    Ok(serde_json::to_string(&Members {
        members: members.iter().map(|m| format_mcp_text(m)).collect(),
    })?)
}

/// `{"categories": [...]}`
pub fn categories(categories: &[String]) -> Result<String> {
    Ok(serde_json::to_string(&Categories {
        categories: categories.iter().map(|c| format_mcp_text(c)).collect(),
    })?)
}

/// `{"title"}`
pub fn redirect(title: &str) -> Result<String> {
    Ok(serde_json::to_string(&Redirect {
        title: format_mcp_text(title),
    })?)
}

fn section_list(sections: &[SectionInfo]) -> Vec<Section> {
    sections
        .iter()
        .map(|s| Section {
            index: s.index.parse().ok(),
            title: format_mcp_text(&s.line),
        })
        .collect()
}

/// Sanitize every string in a recipe.
///
/// Cleanup can make two names equal or empty, so ingredients are merged
/// again; a recipe left with no ingredients is dropped.
fn sanitized_recipe(extraction: &ExtractionResult) -> Option<CraftingRecipe> {
    let recipe = extraction.crafting_recipe.as_ref()?;

    let mut ingredients = IngredientList::default();
    for ingredient in &recipe.ingredients {
        ingredients.add(format_mcp_text(&ingredient.item), ingredient.quantity);
    }
    if ingredients.is_empty() {
        tracing::debug!(title = %extraction.title, "Recipe lost all ingredients to sanitization");
        return None;
    }

    Some(CraftingRecipe {
        ingredients: ingredients.into_vec(),
        recipe_type: recipe.recipe_type,
        pattern: recipe.pattern.as_deref().map(format_mcp_text),
        result: recipe.result.as_ref().map(|r| RecipeOutput {
            item: format_mcp_text(&r.item),
            quantity: r.quantity,
        }),
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect::<String>().trim_end().to_string()
}
