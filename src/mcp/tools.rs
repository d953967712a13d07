//! Tool registry for MCP tools.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::lookup::ThumbnailResolver;

use super::handlers::{GetThumbnailHandler, ResolveThumbnailsHandler};

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "resolve_thumbnails")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// Input properties shared by both lookup tools
fn lookup_properties() -> Value {
    serde_json::json!({
        "title": {
            "type": "string",
            "description": "Book title to search for"
        },
        "isbn": {
            "type": "string",
            "description": "ISBN-10 or ISBN-13; hyphens and spaces are ignored"
        },
        "url": {
            "type": "string",
            "description": "Product detail page link (e.g. https://www.amazon.co.jp/dp/4873115655)"
        }
    })
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a registry with the lookup tools bound to `resolver`
    pub fn from_resolver(resolver: Arc<ThumbnailResolver>) -> Self {
        let mut registry = Self {
            tools: BTreeMap::new(),
        };

        let mut properties = lookup_properties();
        properties["max_results"] = serde_json::json!({
            "type": "integer",
            "description": "Maximum number of candidates for a title search",
            "default": crate::models::DEFAULT_MAX_RESULTS,
            "minimum": 1
        });
        properties["rank"] = serde_json::json!({
            "type": "boolean",
            "description": "Reorder title results by similarity to the title instead of catalog order",
            "default": false
        });

        registry.register(Tool {
            name: "resolve_thumbnails".to_string(),
            description: "Find book cover thumbnails by title, ISBN, or product link. Returns candidates with identifier, link, title and thumbnail_url. Priority when several inputs are given: url, then isbn, then title.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": properties
            }),
            handler: Arc::new(ResolveThumbnailsHandler {
                resolver: resolver.clone(),
            }),
        });

        registry.register(Tool {
            name: "get_thumbnail".to_string(),
            description: "Get the single best cover thumbnail URL for a title, ISBN, or product link.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": lookup_properties()
            }),
            handler: Arc::new(GetThumbnailHandler { resolver }),
        });

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools, ordered by name
    pub fn all(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("Tool '{}' not found", name))?;

        tool.handler.execute(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockSource;

    fn registry() -> ToolRegistry {
        ToolRegistry::from_resolver(Arc::new(ThumbnailResolver::new(Arc::new(MockSource::new()))))
    }

    #[test]
    fn test_registry_has_lookup_tools() {
        let registry = registry();
        let names: Vec<&str> = registry.all().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["get_thumbnail", "resolve_thumbnails"]);

        let schema = &registry.get("resolve_thumbnails").unwrap().input_schema;
        assert_eq!(schema["properties"]["max_results"]["default"], 5);
        assert!(registry.get("get_thumbnail").unwrap().input_schema["properties"]
            .get("max_results")
            .is_none());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let err = registry()
            .execute("search_books", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.contains("not found"));
    }
}
