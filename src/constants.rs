//! Global Constants
//!
//! Centralized constants for budgeting and tuning.
//! All magic numbers should be defined here with documentation.

/// Content budget constants
pub mod budget {
    /// Maximum characters kept from a single file (~2000 tokens)
    pub const MAX_CHARS_PER_FILE: usize = 8_000;

    /// Maximum characters across all bundled files (~12500 tokens)
    pub const MAX_TOTAL_CHARS: usize = 50_000;

    /// Maximum number of files bundled or selected
    pub const MAX_FILES: usize = 10;

    /// Share of the truncation budget kept from the start of a file
    pub const HEAD_RATIO: f64 = 0.6;

    /// Share of the truncation budget kept from the end of a file
    pub const TAIL_RATIO: f64 = 0.3;

    /// Remaining budget required to admit one last truncated file
    pub const MIN_TERMINAL_REMAINDER: usize = 1_000;

    /// Characters per token for the observability heuristic
    pub const CHARS_PER_TOKEN: usize = 4;
}

/// Tree compression constants
pub mod tree {
    /// Default line budget for the hierarchy tree
    pub const DEFAULT_MAX_LINES: usize = 150;

    /// Deepest nesting level kept verbatim
    pub const MAX_DEPTH: usize = 4;

    /// Indentation columns per nesting level
    pub const INDENT_WIDTH: usize = 2;

    /// Line budget for the flat tree in section planning
    pub const FLAT_TREE_MAX_LINES: usize = 500;
}

/// Planning pipeline constants
pub mod pipeline {
    /// Minimum fallback matches before padding from the flat tree
    pub const FALLBACK_MIN_MATCHES: usize = 5;

    /// Maximum summary length in characters before clipping
    pub const MAX_SUMMARY_CHARS: usize = 500;

    /// Appended to a clipped summary
    pub const ELLIPSIS: &str = "...";

    /// Default output caps per stage (tokens)
    pub mod max_tokens {
        pub const SELECT_FILES: usize = 500;
        pub const SUMMARIZE: usize = 800;
        pub const PLAN_SECTIONS: usize = 2_000;
    }
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Health check timeout (seconds)
    pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

    /// Default model served by the generation endpoint
    pub const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-R1-Distill-Qwen-7B";

    /// Default OpenAI-compatible endpoint
    pub const DEFAULT_API_BASE: &str = "http://localhost:8000/v1";
}
