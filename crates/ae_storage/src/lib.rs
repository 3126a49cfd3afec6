use std::sync::Arc;
use std::time::Duration;

use ae_core::{ArticleStore, Result};

pub mod backends;

pub use backends::*;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api/articles";

/// The store the pipeline talks to. `recorder` is set on dry runs and holds
/// every write that was held back.
pub struct ConfiguredStore {
    pub store: Arc<dyn ArticleStore>,
    pub recorder: Option<Arc<DryRunStore>>,
}

/// Builds the HTTP store. With `dry_run`, reads still go to the HTTP store and
/// writes are only recorded in memory.
pub fn create_store(base_url: &str, timeout: Duration, dry_run: bool) -> Result<ConfiguredStore> {
    let http = Arc::new(HttpArticleStore::new(base_url, timeout)?);
    if dry_run {
        tracing::info!(base_url, "Dry run: publishes will not reach the store");
        let recorder = Arc::new(DryRunStore::new(http));
        Ok(ConfiguredStore {
            store: recorder.clone(),
            recorder: Some(recorder),
        })
    } else {
        Ok(ConfiguredStore {
            store: http,
            recorder: None,
        })
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, ConfiguredStore};
    pub use ae_core::ArticleStore;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ae_core::PublishedArticle;

    fn published() -> PublishedArticle {
        PublishedArticle {
            title: "Enhanced".to_string(),
            url: "https://example.com/articles/1".to_string(),
            content: "Body".to_string(),
            author: String::new(),
            published_date: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dry_run_store_records_writes() {
        let configured = create_store("http://127.0.0.1:9/api/articles", Duration::from_secs(1), true).unwrap();
        let recorder = configured.recorder.expect("dry run recorder");

        assert_eq!(configured.store.publish_article(&published()).await.unwrap(), None);
        assert_eq!(recorder.published().await, vec![published()]);
    }

    #[test]
    fn test_live_store_has_no_recorder() {
        let configured = create_store(DEFAULT_BASE_URL, Duration::from_secs(1), false).unwrap();
        assert!(configured.recorder.is_none());
    }
}
