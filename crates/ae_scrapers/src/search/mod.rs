pub mod duckduckgo;

pub use duckduckgo::DuckDuckGoSearch;
