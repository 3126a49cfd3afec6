use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Produce a completion for the given system and user prompts
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
