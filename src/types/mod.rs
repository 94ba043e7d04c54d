pub mod result;

pub use result::{RunResult, TokenUsage};
