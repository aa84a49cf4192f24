pub mod check;
pub mod config;
pub mod plan;
pub mod prompts;
pub mod request;
pub mod tree;
