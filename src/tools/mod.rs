//! Tool abstractions and the web search tool

pub mod tool;
pub mod web_search;

pub use tool::{Tool, ToolFuture, ToolRegistry};
pub use web_search::{SearchSnippet, WebSearchTool};
