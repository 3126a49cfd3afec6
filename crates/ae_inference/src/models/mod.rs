use std::sync::Arc;

use ae_core::{Result, TextGenerator};

use crate::Config;

pub mod chat;

pub use chat::ChatCompletionModel;

/// Builds the text generator described by `config`. Fails fast when the credential is missing.
pub fn create_model(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    let model = ChatCompletionModel::new(config)?;
    tracing::info!(
        provider = %config.provider,
        model = model.model_name(),
        "Text generator configured"
    );
    Ok(Arc::new(model))
}
