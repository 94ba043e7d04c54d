pub mod backend;
pub(crate) mod execution;
pub mod openai_client;
pub mod stream;

pub use backend::{AssistantTurn, ChatBackend, ChatCompletionRequest};
pub use openai_client::OpenAIClient;
