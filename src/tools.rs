//! Tool definitions and registry for MCP server.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::error::{Error, Result};
use crate::format;
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::recipe::extract_crafting_recipe;
use crate::wiki::WikiService;

/// Default `limit` for category member listings.
pub const DEFAULT_MEMBER_LIMIT: u32 = 100;

/// Default `limit` for category listings.
pub const DEFAULT_CATEGORY_LIMIT: u32 = 10;

/// Largest `limit` the wiki API accepts for anonymous clients.
pub const MAX_LIMIT: u32 = 500;

/// Characters MediaWiki does not allow in page titles.
const ILLEGAL_TITLE_CHARS: &[char] = &['#', '<', '>', '[', ']', '|', '{', '}'];

/// Tool trait for implementing MCP tools.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult>;
}

/// Context passed to tools during execution.
pub struct ToolContext {
    /// Wiki queries.
    pub wiki: WikiService,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(wiki: WikiService) -> Self {
        Self { wiki }
    }
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    context: Arc<ToolContext>,
}

impl ToolRegistry {
    /// Create a new tool registry with the wiki tools.
    pub fn new(context: ToolContext) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
            context: Arc::new(context),
        };

        registry.register(Arc::new(SearchWikiTool));
        registry.register(Arc::new(GetPageSectionTool));
        registry.register(Arc::new(GetPageContentTool));
        registry.register(Arc::new(GetPageSummaryTool));
        registry.register(Arc::new(GetSectionsInPageTool));
        registry.register(Arc::new(ListCategoryMembersTool));
        registry.register(Arc::new(ListAllCategoriesTool));
        registry.register(Arc::new(GetCategoriesForPageTool));
        registry.register(Arc::new(ResolveRedirectTool));

        registry
    }

    /// Get tool definitions, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, arguments: serde_json::Value) -> Result<ToolCallResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        // Clients may omit `arguments` entirely for tools without required ones.
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };

        tool.execute(arguments, &self.context).await
    }

    /// Register a custom tool.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name.clone();
        self.tools.insert(name, tool);
    }
}

fn parse_args<T: DeserializeOwned>(arguments: serde_json::Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidParams(e.to_string()))
}

/// Reject titles the wiki could never resolve.
fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidParams("title must not be empty".into()));
    }
    if let Some(c) = title.chars().find(|c| ILLEGAL_TITLE_CHARS.contains(c)) {
        return Err(Error::InvalidParams(format!(
            "title \"{}\" contains illegal character '{}'",
            title, c
        )));
    }
    Ok(title)
}

/// Clients send JSON numbers as `2` or `2.0`; both mean the same index.
fn whole_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = f64::deserialize(deserializer)?;
    if n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&n) {
        Ok(n as u32)
    } else {
        Err(D::Error::custom(format!(
            "expected a non-negative integer, got {}",
            n
        )))
    }
}

fn optional_whole_number<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Whole(#[serde(deserialize_with = "whole_number")] u32);

    Ok(Option::<Whole>::deserialize(deserializer)?.map(|Whole(n)| n))
}

fn clamp_limit(limit: Option<u32>, default: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

fn title_schema(description: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": description
            }
        },
        "required": ["title"]
    })
}

#[derive(Debug, Deserialize)]
struct TitleArgs {
    /// Page title.
    title: String,
}

// ============================================================================
// Wiki Tools
// ============================================================================

/// Full-text search.
pub struct SearchWikiTool;

#[derive(Debug, Deserialize)]
struct SearchArgs {
    /// Search term.
    query: String,
}

#[async_trait::async_trait]
impl Tool for SearchWikiTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "MinecraftWiki_searchWiki".into(),
            description: "Search the Minecraft Wiki for a specific structure, entity, item or block. NOTE: Only use for basic search terms like item/block/structure/entity names - complex queries (like 'loot table of X' or 'how to craft Y') will not work. For best results: 1. Search for the basic entity/structure/etc name first, 2. Then use getPageSummary to see available sections, 3. Finally use getPageSection to get specific section content.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search term to find on the Minecraft Wiki."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args: SearchArgs = parse_args(arguments)?;
        let query = args.query.trim();
        if query.is_empty() {
            return Err(Error::InvalidParams("query must not be empty".into()));
        }

        let hits = context.wiki.search(query).await?;
        Ok(ToolCallResult::text(format::search_results(&hits)?))
    }
}

/// One section of a page, with crafting recipe extraction.
pub struct GetPageSectionTool;

#[derive(Debug, Deserialize)]
struct PageSectionArgs {
    /// Page title.
    title: String,
    /// Section index, 0 for the lead.
    #[serde(rename = "sectionIndex", deserialize_with = "whole_number")]
    section_index: u32,
}

#[async_trait::async_trait]
impl Tool for GetPageSectionTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "MinecraftWiki_getPageSection".into(),
            description: "Get a specific section from a Minecraft Wiki page. Should be used as step 3 after searching for the page and getting its summary. The section index corresponds to the order of sections on the page, starting with 0 for the main content, 1 for the first section, 2 for the second section, etc. If the section contains a crafting recipe, a structured `crafting_recipe` is included.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Title of the Minecraft Wiki page"
                    },
                    "sectionIndex": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Index of the section to retrieve (0 = main, 1 = first section, 2 = second section, etc.)"
                    }
                },
                "required": ["title", "sectionIndex"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args: PageSectionArgs = parse_args(arguments)?;
        let title = validate_title(&args.title)?;

        let raw = context.wiki.page_section(title, args.section_index).await?;
        let extraction = extract_crafting_recipe(&raw, title, Some(args.section_index));

        Ok(ToolCallResult::text(format::page_section(&extraction)?))
    }
}

/// Whole-page wikitext, with crafting recipe extraction.
pub struct GetPageContentTool;

#[async_trait::async_trait]
impl Tool for GetPageContentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "MinecraftWiki_getPageContent".into(),
            description: "Get the raw wikitext content of a specific Minecraft Wiki page. If the page contains a crafting recipe, a structured `crafting_recipe` is included.".into(),
            input_schema: title_schema(
                "Title of the Minecraft Wiki page to retrieve the raw wikitext content for.",
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args: TitleArgs = parse_args(arguments)?;
        let title = validate_title(&args.title)?;

        let raw = context.wiki.page_content(title).await?;
        let extraction = extract_crafting_recipe(&raw, title, None);

        Ok(ToolCallResult::text(format::page_content(&extraction)?))
    }
}

/// Lead section plus table of contents.
pub struct GetPageSummaryTool;

#[async_trait::async_trait]
impl Tool for GetPageSummaryTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "MinecraftWiki_getPageSummary".into(),
            description: "Step 2 of the recommended workflow: After finding a page through search, use this to get both the page summary AND a list of all available sections. This helps determine which specific section to retrieve next using getPageSection.".into(),
            input_schema: title_schema("Title of the Minecraft Wiki page"),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args: TitleArgs = parse_args(arguments)?;
        let title = validate_title(&args.title)?;

        let (lead, sections) = context.wiki.page_summary(title).await?;
        Ok(ToolCallResult::text(format::page_summary(&lead, &sections)?))
    }
}

/// Table of contents.
pub struct GetSectionsInPageTool;

#[async_trait::async_trait]
impl Tool for GetSectionsInPageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "MinecraftWiki_getSectionsInPage".into(),
            description: "Retrieves an overview of all sections in the page.".into(),
            input_schema: title_schema("Title of the page to retrieve sections for."),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args: TitleArgs = parse_args(arguments)?;
        let title = validate_title(&args.title)?;

        let sections = context.wiki.sections(title).await?;
        Ok(ToolCallResult::text(format::sections(&sections)?))
    }
}

/// Pages in a category.
pub struct ListCategoryMembersTool;

#[derive(Debug, Deserialize)]
struct CategoryMembersArgs {
    /// Category name without the `Category:` prefix.
    category: String,
    /// Maximum number of members.
    #[serde(default, deserialize_with = "optional_whole_number")]
    limit: Option<u32>,
}

#[async_trait::async_trait]
impl Tool for ListCategoryMembersTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "MinecraftWiki_listCategoryMembers".into(),
            description: "List all pages that are members of a specific category on the Minecraft Wiki.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "description": "The name of the category to list members from (e.g., 'Items', 'Blocks', 'Entities', 'Structure Blueprints')."
                    },
                    "limit": {
                        "type": "integer",
                        "description": "The maximum number of pages to return (default: 100, max: 500)."
                    }
                },
                "required": ["category"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args: CategoryMembersArgs = parse_args(arguments)?;
        let category = validate_title(&args.category)?;
        let category = category.strip_prefix("Category:").unwrap_or(category);

        let members = context
            .wiki
            .category_members(category, clamp_limit(args.limit, DEFAULT_MEMBER_LIMIT))
            .await?;
        Ok(ToolCallResult::text(format::category_members(&members)?))
    }
}

/// All categories on the wiki.
pub struct ListAllCategoriesTool;

#[derive(Debug, Deserialize)]
struct AllCategoriesArgs {
    /// Name prefix filter.
    prefix: Option<String>,
    /// Maximum number of categories.
    #[serde(default, deserialize_with = "optional_whole_number")]
    limit: Option<u32>,
}

#[async_trait::async_trait]
impl Tool for ListAllCategoriesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "MinecraftWiki_listAllCategories".into(),
            description: "List all categories in the Minecraft Wiki.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prefix": {
                        "type": "string",
                        "description": "Filters categories by prefix."
                    },
                    "limit": {
                        "type": "integer",
                        "description": "The maximum number of categories to return (default: 10, max: 500)."
                    }
                }
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args: AllCategoriesArgs = parse_args(arguments)?;
        let prefix = args.prefix.as_deref().map(str::trim).filter(|p| !p.is_empty());

        let categories = context
            .wiki
            .all_categories(prefix, clamp_limit(args.limit, DEFAULT_CATEGORY_LIMIT))
            .await?;
        Ok(ToolCallResult::text(format::categories(&categories)?))
    }
}

/// Categories of one page.
pub struct GetCategoriesForPageTool;

#[async_trait::async_trait]
impl Tool for GetCategoriesForPageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "MinecraftWiki_getCategoriesForPage".into(),
            description: "Get categories associated with a specific page.".into(),
            input_schema: title_schema("Title of the Minecraft Wiki page"),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args: TitleArgs = parse_args(arguments)?;
        let title = validate_title(&args.title)?;

        let categories = context.wiki.page_categories(title).await?;
        Ok(ToolCallResult::text(format::categories(&categories)?))
    }
}

/// Redirect resolution.
pub struct ResolveRedirectTool;

#[async_trait::async_trait]
impl Tool for ResolveRedirectTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "MinecraftWiki_resolveRedirect".into(),
            description: "Resolve a redirect and return the title of the target page.".into(),
            input_schema: title_schema("Title of the page to resolve the redirect for."),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args: TitleArgs = parse_args(arguments)?;
        let title = validate_title(&args.title)?;

        let target = context.wiki.resolve_redirect(title).await?;
        Ok(ToolCallResult::text(format::redirect(&target)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WikiConfig;
    use crate::protocol::ContentItem;
    use crate::wiki::WikiClient;
    use mockito::Matcher;

    fn registry_for(api_url: &str) -> ToolRegistry {
        let config = WikiConfig::new(api_url).unwrap();
        let wiki = WikiService::new(WikiClient::new(&config).unwrap());
        ToolRegistry::new(ToolContext::new(wiki))
    }

    fn text_of(result: &ToolCallResult) -> &str {
        match &result.content[0] {
            ContentItem::Text { text } => text,
        }
    }

    #[test]
    fn test_lists_nine_tools_sorted() {
        let registry = registry_for("http://127.0.0.1:9/api.php");
        let names: Vec<_> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "MinecraftWiki_getCategoriesForPage",
                "MinecraftWiki_getPageContent",
                "MinecraftWiki_getPageSection",
                "MinecraftWiki_getPageSummary",
                "MinecraftWiki_getSectionsInPage",
                "MinecraftWiki_listAllCategories",
                "MinecraftWiki_listCategoryMembers",
                "MinecraftWiki_resolveRedirect",
                "MinecraftWiki_searchWiki",
            ]
        );
    }

    #[test]
    fn test_unknown_tool() {
        let registry = registry_for("http://127.0.0.1:9/api.php");
        let err = tokio_test::block_on(registry.execute("MinecraftWiki_nope", json!({}))).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }

    #[test]
    fn test_argument_type_guards() {
        let registry = registry_for("http://127.0.0.1:9/api.php");

        let err = tokio_test::block_on(registry.execute(
            "MinecraftWiki_getPageSection",
            json!({"title": "Conduit", "sectionIndex": "two"}),
        ))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));

        let err = tokio_test::block_on(registry.execute(
            "MinecraftWiki_getPageSection",
            json!({"title": "Conduit", "sectionIndex": -1}),
        ))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));

        let err = tokio_test::block_on(registry.execute("MinecraftWiki_searchWiki", serde_json::Value::Null))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[test]
    fn test_malformed_titles_rejected() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Stone|Dirt").is_err());
        assert!(validate_title("{{Stone}}").is_err());
        assert_eq!(validate_title("  Heart of the Sea ").unwrap(), "Heart of the Sea");

        let registry = registry_for("http://127.0.0.1:9/api.php");
        let err = tokio_test::block_on(
            registry.execute("MinecraftWiki_getPageContent", json!({"title": "[[Stone]]"})),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[test]
    fn test_whole_number_arguments() {
        let args: PageSectionArgs =
            parse_args(json!({"title": "Conduit", "sectionIndex": 2.0})).unwrap();
        assert_eq!(args.section_index, 2);

        let args: PageSectionArgs =
            parse_args(json!({"title": "Conduit", "sectionIndex": 3})).unwrap();
        assert_eq!(args.section_index, 3);

        let err = parse_args::<PageSectionArgs>(json!({"title": "Conduit", "sectionIndex": 2.5}))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));

        let args: CategoryMembersArgs =
            parse_args(json!({"category": "Food", "limit": 50.0})).unwrap();
        assert_eq!(args.limit, Some(50));

        let args: AllCategoriesArgs = parse_args(json!({"limit": null})).unwrap();
        assert_eq!(args.limit, None);
        let args: AllCategoriesArgs = parse_args(json!({})).unwrap();
        assert_eq!(args.limit, None);
    }

    #[test]
    fn test_schemas_declare_integers() {
        let schema = GetPageSectionTool.definition().input_schema;
        assert_eq!(schema["properties"]["sectionIndex"]["type"], "integer");
        let schema = ListAllCategoriesTool.definition().input_schema;
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, DEFAULT_MEMBER_LIMIT), 100);
        assert_eq!(clamp_limit(Some(0), DEFAULT_MEMBER_LIMIT), 1);
        assert_eq!(clamp_limit(Some(9000), DEFAULT_CATEGORY_LIMIT), 500);
    }

    #[tokio::test]
    async fn test_page_section_tool_includes_recipe() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "parse".into()),
                Matcher::UrlEncoded("page".into(), "Conduit".into()),
                Matcher::UrlEncoded("section".into(), "2".into()),
            ]))
            .with_body(r#"{"parse":{"text":{"*":"<div><h3>Crafting</h3><p>8 Nautilus Shell + 1 Heart of the Sea</p></div>"}}}"#)
            .create_async()
            .await;

        let registry = registry_for(&format!("{}/api.php", server.url()));
        let result = registry
            .execute(
                "MinecraftWiki_getPageSection",
                json!({"title": "Conduit", "sectionIndex": 2}),
            )
            .await
            .unwrap();

        assert!(!result.is_error);
        let value: serde_json::Value = serde_json::from_str(text_of(&result)).unwrap();
        assert_eq!(value["title"], "Conduit");
        assert_eq!(value["sectionIndex"], 2);
        assert_eq!(value["content"], "Crafting 8 Nautilus Shell + 1 Heart of the Sea");
        assert_eq!(value["crafting_recipe"]["ingredients"][0]["item"], "Nautilus Shell");
        assert_eq!(value["crafting_recipe"]["ingredients"][0]["quantity"], 8);
    }

    #[tokio::test]
    async fn test_list_all_categories_without_arguments() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list".into(), "allcategories".into()),
                Matcher::UrlEncoded("aclimit".into(), "10".into()),
            ]))
            .with_body(r#"{"query":{"allcategories":[{"*":"Blocks"}]}}"#)
            .create_async()
            .await;

        let registry = registry_for(&format!("{}/api.php", server.url()));
        let result = registry
            .execute("MinecraftWiki_listAllCategories", serde_json::Value::Null)
            .await
            .unwrap();
        assert_eq!(text_of(&result), r#"{"categories":["Blocks"]}"#);
    }

    #[tokio::test]
    async fn test_category_prefix_is_stripped() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api.php")
            .match_query(Matcher::UrlEncoded("cmtitle".into(), "Category:Food".into()))
            .with_body(r#"{"query":{"categorymembers":[{"title":"Bread"}]}}"#)
            .create_async()
            .await;

        let registry = registry_for(&format!("{}/api.php", server.url()));
        let result = registry
            .execute(
                "MinecraftWiki_listCategoryMembers",
                json!({"category": "Category:Food", "limit": 3}),
            )
            .await
            .unwrap();
        assert_eq!(text_of(&result), r#"{"members":["Bread"]}"#);
    }
}
