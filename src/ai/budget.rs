//! Content Budget Management
//!
//! Keeps unbounded repository content inside fixed size budgets before it is
//! placed into a generation prompt.
//!
//! ## Strategy
//! - Oversized files keep their head (60%) and tail (30%) around a marker
//! - Bundles are packed in input order and stop at the first overflow
//! - Hierarchy trees are depth-limited and line-capped
//!
//! All lengths are measured in characters, not bytes.

use std::borrow::Cow;
use std::ops::ControlFlow;

use tracing::debug;

use crate::constants::budget as budget_constants;
use crate::constants::tree as tree_constants;
use crate::types::{
    BudgetConfig, BundleEntry, Result, SourceFile, ValidationError, ValidationErrorKind,
};

/// Stateless content budgeting utilities
pub struct ContentBudgeter;

/// Fold state for [`ContentBudgeter::limit_bundle`]
#[derive(Default)]
struct BundleState {
    accepted: Vec<BundleEntry>,
    running_total: usize,
}

impl BundleState {
    fn accept(mut self, path: &str, content: String, truncated: bool) -> Self {
        self.running_total += content.chars().count();
        self.accepted.push(BundleEntry {
            path: path.to_string(),
            content,
            truncated,
        });
        self
    }
}

impl ContentBudgeter {
    /// Truncate `content` to roughly `max_chars` characters.
    ///
    /// Content that already fits is returned borrowed and untouched. Otherwise
    /// the result is `head(⌊0.6·max⌋) + marker + tail(⌊0.3·max⌋)`, where the
    /// marker states `len - max_chars` omitted characters. The marker length
    /// is not counted against `max_chars`.
    pub fn truncate(content: &str, max_chars: usize) -> Cow<'_, str> {
        let len = content.chars().count();
        if len <= max_chars {
            return Cow::Borrowed(content);
        }

        let head_len = (max_chars as f64 * budget_constants::HEAD_RATIO).floor() as usize;
        let tail_len = (max_chars as f64 * budget_constants::TAIL_RATIO).floor() as usize;

        let head_end = byte_offset(content, head_len);
        let tail_start = byte_offset(content, len - tail_len);

        let marker = truncation_marker(len - max_chars);
        let mut result = String::with_capacity(head_end + marker.len() + content.len() - tail_start);
        result.push_str(&content[..head_end]);
        result.push_str(&marker);
        result.push_str(&content[tail_start..]);
        Cow::Owned(result)
    }

    /// Pack files into the bundle budget, in input order.
    ///
    /// Stops once `max_files` entries are accepted. The first file that would
    /// overflow `max_total_chars` is either admitted truncated to the remaining
    /// space (when more than 1000 characters remain) or dropped; either way no
    /// later file is considered.
    pub fn limit_bundle(files: &[SourceFile], budget: &BudgetConfig) -> Vec<BundleEntry> {
        let flow = files
            .iter()
            .try_fold(BundleState::default(), |state, file| {
                if state.accepted.len() >= budget.max_files {
                    return ControlFlow::Break(state);
                }

                let content = Self::truncate(&file.content, budget.max_chars_per_file);
                let per_file_truncated = matches!(content, Cow::Owned(_));
                let content_len = content.chars().count();

                if state.running_total + content_len > budget.max_total_chars {
                    let remaining = budget.max_total_chars.saturating_sub(state.running_total);
                    if remaining > budget_constants::MIN_TERMINAL_REMAINDER {
                        let fitted = Self::truncate(&content, remaining).into_owned();
                        debug!(
                            "Bundle budget reached at {}: admitted with {} of {} chars remaining",
                            file.path, remaining, budget.max_total_chars
                        );
                        return ControlFlow::Break(state.accept(&file.path, fitted, true));
                    }

                    debug!(
                        "Bundle budget reached at {}: dropped ({} chars remaining)",
                        file.path, remaining
                    );
                    return ControlFlow::Break(state);
                }

                ControlFlow::Continue(state.accept(
                    &file.path,
                    content.into_owned(),
                    per_file_truncated,
                ))
            });

        let state = match flow {
            ControlFlow::Continue(state) | ControlFlow::Break(state) => state,
        };
        state.accepted
    }

    /// Compress an indented hierarchy listing to at most `max_lines + 1` lines.
    ///
    /// Lines up to depth 4 are kept verbatim. Each contiguous run of depth-5
    /// lines collapses into one marker line, deeper lines are dropped. A single
    /// trailing note is appended when any input line was omitted.
    pub fn simplify_tree(tree: &str, max_lines: usize) -> Cow<'_, str> {
        if tree.lines().count() <= max_lines {
            return Cow::Borrowed(tree);
        }

        let max_depth = tree_constants::MAX_DEPTH;
        let collapsed_marker = format!(
            "{}... [more files]",
            " ".repeat(max_depth * tree_constants::INDENT_WIDTH)
        );

        let mut output: Vec<&str> = Vec::with_capacity(max_lines + 1);
        let mut omitted = false;
        let mut in_collapsed_run = false;

        for line in tree.lines() {
            if output.len() >= max_lines {
                omitted = true;
                break;
            }

            let depth = indent_depth(line);
            if depth <= max_depth {
                output.push(line);
                in_collapsed_run = false;
                continue;
            }

            omitted = true;
            if depth == max_depth + 1 && !in_collapsed_run {
                output.push(&collapsed_marker);
                in_collapsed_run = true;
            }
        }

        if omitted {
            output.push("... [tree truncated]");
        }

        Cow::Owned(output.join("\n"))
    }

    /// Keep the first `max_lines` lines and append a note if any were cut
    pub fn limit_lines(text: &str, max_lines: usize) -> Cow<'_, str> {
        let total = text.lines().count();
        if total <= max_lines {
            return Cow::Borrowed(text);
        }

        let mut kept: Vec<String> = text.lines().take(max_lines).map(String::from).collect();
        kept.push(format!("... [{} more lines truncated]", total - max_lines));
        Cow::Owned(kept.join("\n"))
    }

    /// Rough token count (`ceil(chars / 4)`), for logging only
    pub fn estimate_tokens(text: &str) -> usize {
        text.chars().count().div_ceil(budget_constants::CHARS_PER_TOKEN)
    }

    /// Partition `items` into order-preserving batches of `batch_size`.
    /// The final batch may be shorter.
    pub fn batch<T: Clone>(items: &[T], batch_size: usize) -> Result<Vec<Vec<T>>> {
        if batch_size == 0 {
            return Err(ValidationError::new(
                ValidationErrorKind::Range,
                "batch size must be greater than 0",
            )
            .with_field("batch_size")
            .into());
        }

        Ok(items.chunks(batch_size).map(<[T]>::to_vec).collect())
    }
}

fn truncation_marker(omitted: usize) -> String {
    format!(
        "\n\n... [content truncated: {} characters omitted] ...\n\n",
        omitted
    )
}

/// Byte offset of the `n`th character (or the end of the string)
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// Nesting depth from leading indentation; tabs count as one level
fn indent_depth(line: &str) -> usize {
    let columns: usize = line
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| {
            if c == '\t' {
                tree_constants::INDENT_WIDTH
            } else {
                1
            }
        })
        .sum();

    if columns == line.chars().count() {
        // whitespace-only line
        return 0;
    }
    columns / tree_constants::INDENT_WIDTH
}
