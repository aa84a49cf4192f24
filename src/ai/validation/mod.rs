//! Model Output Validation
//!
//! Recovers JSON from raw model replies. Shape checks against each stage's
//! expected structure live with the stages themselves.

mod json_repair;

pub use json_repair::{extract_json_from_response, parse_or_repair};
