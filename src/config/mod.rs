//! Configuration Management
//!
//! Hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/wikiplan/config.toml)
//! 3. Project config (.wikiplan/config.toml)
//! 4. Environment variables (`VLLM_URL`, `WIKI_SERVICE_API_KEY`, `WIKIPLAN_*`)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
