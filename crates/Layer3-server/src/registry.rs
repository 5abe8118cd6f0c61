//! Tool registry
//!
//! Registration returns an explicit result instead of panicking on duplicate
//! or malformed names, so callers can surface registration problems through
//! their own error channel.

use crate::tool::Tool;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Why a registration was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    #[error("tool '{0}' is already registered")]
    AlreadyExists(String),

    #[error("invalid tool name '{0}': only [A-Za-z0-9/_-] is allowed")]
    InvalidName(String),
}

/// Mapping from tool name to tool, with a category index
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    categories: HashMap<String, Vec<String>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the default tool set
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for tool in crate::tools::default_tools() {
            // Default tool names are static and known-valid
            let name = tool.name().to_string();
            if let Err(e) = registry.register(tool) {
                unreachable!("default tool '{name}' failed to register: {e}");
            }
        }
        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegisterError> {
        let name = tool.name().to_string();

        if !is_valid_name(&name) {
            return Err(RegisterError::InvalidName(name));
        }
        if self.tools.contains_key(&name) {
            return Err(RegisterError::AlreadyExists(name));
        }

        let category = tool.meta().category;
        self.categories
            .entry(category.clone())
            .or_default()
            .push(name.clone());

        info!(tool = %name, category = %category, "Tool registered");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Remove a tool; returns whether it existed
    pub fn unregister(&mut self, name: &str) -> bool {
        let Some(tool) = self.tools.remove(name) else {
            return false;
        };

        let category = tool.meta().category;
        if let Some(names) = self.categories.get_mut(&category) {
            names.retain(|n| n != name);
            if names.is_empty() {
                self.categories.remove(&category);
            }
        }

        info!(tool = %name, "Tool unregistered");
        true
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn categories(&self) -> Vec<&str> {
        self.categories.keys().map(|s| s.as_str()).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<Arc<dyn Tool>> {
        self.categories
            .get(category)
            .map(|names| names.iter().filter_map(|n| self.get(n)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ToolSchema;
    use crate::tool::{ToolContext, ToolMeta, ToolResponse};
    use async_trait::async_trait;
    use serde_json::Value;

    struct NamedTool {
        name: String,
        schema: ToolSchema,
    }

    impl NamedTool {
        fn new(name: &str) -> Arc<dyn Tool> {
            Arc::new(Self {
                name: name.to_string(),
                schema: ToolSchema::new(),
            })
        }
    }

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn schema(&self) -> &ToolSchema {
            &self.schema
        }

        fn meta(&self) -> ToolMeta {
            ToolMeta {
                category: "test".to_string(),
                ..Default::default()
            }
        }

        async fn execute(
            &self,
            _args: Value,
            _ctx: &ToolContext,
        ) -> deck_foundation::Result<ToolResponse> {
            Ok(ToolResponse::text("ok"))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(NamedTool::new("deck/echo")).is_ok());

        assert!(registry.contains("deck/echo"));
        assert!(registry.get("deck/echo").is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.by_category("test").len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(NamedTool::new("dup")).unwrap();

        let err = registry.register(NamedTool::new("dup")).unwrap_err();
        assert_eq!(err, RegisterError::AlreadyExists("dup".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut registry = ToolRegistry::new();

        let err = registry.register(NamedTool::new("bad name!")).unwrap_err();
        assert_eq!(err, RegisterError::InvalidName("bad name!".to_string()));

        let err = registry.register(NamedTool::new("")).unwrap_err();
        assert!(matches!(err, RegisterError::InvalidName(_)));
    }

    #[test]
    fn test_unregister_cleans_category_index() {
        let mut registry = ToolRegistry::new();
        registry.register(NamedTool::new("a")).unwrap();

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert!(registry.categories().is_empty());
    }

    #[test]
    fn test_with_defaults_has_ask_tool() {
        let registry = ToolRegistry::with_defaults();
        assert!(registry.contains("deck/ask"));
        assert_eq!(registry.by_category("core").len(), 1);
    }
}
