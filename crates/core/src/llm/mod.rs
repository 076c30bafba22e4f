pub mod error;
pub mod openai;

use crate::domain::query::AskQuery;

#[derive(Debug, Clone, Copy)]
pub enum Provider {
    OpenAi,
}

/// The text-generation collaborator. It receives one query and returns
/// free-form text that is expected, but not guaranteed, to follow the
/// three-heading answer format.
#[async_trait::async_trait]
pub trait AnswerClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate_answer(&self, query: &AskQuery) -> anyhow::Result<String>;
}
