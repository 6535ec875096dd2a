//! # minecraft-wiki-mcp
//!
//! MCP (Model Context Protocol) server for the Minecraft Wiki.
//!
//! This crate provides a standards-compliant MCP server that exposes
//! read-only Minecraft Wiki queries as tools for AI assistants such as
//! Claude Desktop and other MCP-compatible clients.
//!
//! ## Features
//!
//! - **MCP-compliant**: Implements JSON-RPC 2.0 over stdio (standard MCP transport)
//! - **Crafting recipes**: Section and page content carries a structured
//!   `crafting_recipe` when one can be recovered from templates, tables or prose
//! - **Clean output**: Every string is sanitized to plain printable text
//!
//! ## Available Tools
//!
//! - `MinecraftWiki_searchWiki`: Full-text search
//! - `MinecraftWiki_getPageSummary`: Lead paragraph plus table of contents
//! - `MinecraftWiki_getSectionsInPage`: Table of contents
//! - `MinecraftWiki_getPageSection`: One section, with recipe extraction
//! - `MinecraftWiki_getPageContent`: Whole-page wikitext, with recipe extraction
//! - `MinecraftWiki_listCategoryMembers`: Pages in a category
//! - `MinecraftWiki_listAllCategories`: Categories, optionally by prefix
//! - `MinecraftWiki_getCategoriesForPage`: Categories of a page
//! - `MinecraftWiki_resolveRedirect`: Redirect target
//!
//! ## Usage with Claude Desktop
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "minecraft-wiki": {
//!       "command": "minecraft-wiki-mcp",
//!       "args": ["--api-url", "https://minecraft.wiki/api.php"]
//!     }
//!   }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod format;
pub mod protocol;
pub mod recipe;
pub mod sanitize;
pub mod server;
pub mod tools;
pub mod wiki;

pub use config::WikiConfig;
pub use error::{Error, Result};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, McpMessage};
pub use recipe::{extract_crafting_recipe, CraftingRecipe, ExtractionResult, Ingredient, RecipeKind};
pub use server::McpServer;
pub use tools::{Tool, ToolContext, ToolRegistry};
pub use wiki::{WikiClient, WikiService};
