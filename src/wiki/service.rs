//! Wiki queries behind the MCP tools.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::WikiClient;
use crate::error::{Error, Result};
use crate::sanitize::HTML_TAG;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title.
    pub title: String,
    /// Matching excerpt, tags removed.
    #[serde(default)]
    pub snippet: String,
}

/// One entry of a page's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionInfo {
    /// Section index as reported by the API (`"1"`, or `"T-1"` for
    /// transcluded sections).
    pub index: String,
    /// Heading text.
    pub line: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<QueryBlock>,
    #[serde(default)]
    parse: Option<ParseBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBlock {
    #[serde(default)]
    search: Vec<SearchHit>,
    #[serde(default)]
    categorymembers: Vec<PageRef>,
    #[serde(default)]
    allcategories: Vec<CategoryName>,
    #[serde(default)]
    pages: HashMap<String, PageInfo>,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    title: String,
}

#[derive(Debug, Deserialize)]
struct CategoryName {
    #[serde(rename = "*")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(default)]
    title: String,
    // `""` in formatversion 1, `true` in formatversion 2; presence is what counts.
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    categories: Vec<PageRef>,
}

#[derive(Debug, Default, Deserialize)]
struct ParseBlock {
    #[serde(default)]
    text: Option<StarText>,
    #[serde(default)]
    wikitext: Option<StarText>,
    #[serde(default)]
    sections: Vec<SectionInfo>,
}

#[derive(Debug, Deserialize)]
struct StarText {
    #[serde(rename = "*")]
    content: String,
}

/// Read-only Minecraft Wiki queries.
#[derive(Debug, Clone)]
pub struct WikiService {
    client: WikiClient,
}

impl WikiService {
    /// Create a service on top of a client.
    pub fn new(client: WikiClient) -> Self {
        Self { client }
    }

    /// Full-text search.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response: ApiResponse = self
            .client
            .get(&[
                ("action", "query".into()),
                ("list", "search".into()),
                ("srsearch", query.to_string()),
            ])
            .await?;

        let hits = response.query.unwrap_or_default().search;
        Ok(hits
            .into_iter()
            .map(|hit| SearchHit {
                snippet: HTML_TAG.replace_all(&hit.snippet, "").into_owned(),
                title: hit.title,
            })
            .collect())
    }

    /// Rendered HTML of one section. Section 0 is the lead.
    pub async fn page_section(&self, title: &str, section_index: u32) -> Result<String> {
        let response: ApiResponse = self
            .client
            .get(&[
                ("action", "parse".into()),
                ("page", title.to_string()),
                ("section", section_index.to_string()),
            ])
            .await?;

        response
            .parse
            .and_then(|p| p.text)
            .map(|t| t.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No content found for section {} of \"{}\"",
                    section_index, title
                ))
            })
    }

    /// Raw wikitext of a whole page.
    pub async fn page_content(&self, title: &str) -> Result<String> {
        let response: ApiResponse = self
            .client
            .get(&[
                ("action", "parse".into()),
                ("page", title.to_string()),
                ("prop", "wikitext".into()),
            ])
            .await?;

        response
            .parse
            .and_then(|p| p.wikitext)
            .map(|t| t.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::NotFound(format!("No content found for page \"{}\"", title)))
    }

    /// Table of contents of a page.
    pub async fn sections(&self, title: &str) -> Result<Vec<SectionInfo>> {
        let response: ApiResponse = self
            .client
            .get(&[
                ("action", "parse".into()),
                ("page", title.to_string()),
                ("prop", "sections".into()),
            ])
            .await?;

        Ok(response.parse.unwrap_or_default().sections)
    }

    /// Lead section HTML plus the table of contents.
    pub async fn page_summary(&self, title: &str) -> Result<(String, Vec<SectionInfo>)> {
        let lead = self.page_section(title, 0).await?;
        let sections = self.sections(title).await?;
        Ok((lead, sections))
    }

    /// Titles of pages in `Category:<category>`.
    pub async fn category_members(&self, category: &str, limit: u32) -> Result<Vec<String>> {
        let response: ApiResponse = self
            .client
            .get(&[
                ("action", "query".into()),
                ("list", "categorymembers".into()),
                ("cmtitle", format!("Category:{}", category)),
                ("cmlimit", limit.to_string()),
            ])
            .await?;

        Ok(response
            .query
            .unwrap_or_default()
            .categorymembers
            .into_iter()
            .map(|m| m.title)
            .collect())
    }

    /// Category names, optionally filtered by prefix.
    pub async fn all_categories(&self, prefix: Option<&str>, limit: u32) -> Result<Vec<String>> {
        let mut params = vec![
            ("action", "query".to_string()),
            ("list", "allcategories".to_string()),
            ("aclimit", limit.to_string()),
        ];
        if let Some(prefix) = prefix {
            params.push(("acprefix", prefix.to_string()));
        }

        let response: ApiResponse = self.client.get(&params).await?;

        Ok(response
            .query
            .unwrap_or_default()
            .allcategories
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    /// Categories a page belongs to.
    pub async fn page_categories(&self, title: &str) -> Result<Vec<String>> {
        let response: ApiResponse = self
            .client
            .get(&[
                ("action", "query".into()),
                ("titles", title.to_string()),
                ("prop", "categories".into()),
            ])
            .await?;

        let page = single_page(response, title)?;
        Ok(page.categories.into_iter().map(|c| c.title).collect())
    }

    /// Follow redirects and return the target title.
    pub async fn resolve_redirect(&self, title: &str) -> Result<String> {
        let response: ApiResponse = self
            .client
            .get(&[
                ("action", "query".into()),
                ("titles", title.to_string()),
                ("redirects", "1".into()),
            ])
            .await?;

        Ok(single_page(response, title)?.title)
    }
}

fn single_page(response: ApiResponse, title: &str) -> Result<PageInfo> {
    let page = response
        .query
        .and_then(|q| q.pages.into_values().next())
        .ok_or_else(|| Error::NotFound(format!("No page information returned for \"{}\"", title)))?;

    if page.missing.is_some() {
        return Err(Error::NotFound(format!("Page \"{}\" not found", title)));
    }

    Ok(page)
}
