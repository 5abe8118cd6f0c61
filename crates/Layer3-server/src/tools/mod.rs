//! Built-in tools

mod ask;

pub use ask::AskTool;

use crate::tool::Tool;
use std::sync::Arc;

/// The default tool set registered at startup
pub fn default_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(AskTool::new())]
}
