pub mod dry_run;
pub mod http;
pub mod memory;

pub use dry_run::DryRunStore;
pub use http::HttpArticleStore;
pub use memory::InMemoryStore;
