//! JSON Extraction from Model Output
//!
//! Small reasoning models wrap their JSON in all sorts of noise:
//! `<think>` blocks, markdown fences, prose, trailing commas, or a reply cut
//! off by the token cap. This module recovers a `serde_json::Value` when one is
//! reasonably there and reports a parse error otherwise.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{PlanError, Result};

static THINK_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?(</think>|$)").ok());

const REPAIR_LEVELS: usize = 3;
const PREVIEW_CHARS: usize = 200;

/// Extract and parse JSON from a model reply
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    parse_or_repair(content).map(|(value, _)| value)
}

/// Parse JSON, repairing if needed. The flag reports whether repair was used.
pub fn parse_or_repair(raw: &str) -> Result<(Value, bool)> {
    let cleaned = preprocess(raw);

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok((value, false));
    }

    debug!("Direct JSON parse failed, attempting repair");

    for level in 1..=REPAIR_LEVELS {
        if let Ok(value) = serde_json::from_str::<Value>(&repair(&cleaned, level)) {
            warn!("JSON repaired at level {}", level);
            return Ok((value, true));
        }
    }

    if let Some(value) = embedded_json(&cleaned)
        .and_then(|slice| serde_json::from_str::<Value>(slice).ok())
    {
        warn!("JSON extracted from surrounding text");
        return Ok((value, true));
    }

    Err(PlanError::LlmApi(format!(
        "Failed to parse or repair JSON. Content preview: {}...",
        cleaned.chars().take(PREVIEW_CHARS).collect::<String>()
    )))
}

// =============================================================================
// Preprocessing
// =============================================================================

fn preprocess(raw: &str) -> String {
    let without_reasoning = strip_reasoning(raw);
    let unfenced = strip_code_fences(without_reasoning.trim());
    unfenced.trim_start_matches('\u{feff}').trim().to_string()
}

/// Drop `<think>...</think>` blocks; an unclosed block runs to the end.
fn strip_reasoning(raw: &str) -> String {
    match THINK_BLOCK.as_ref() {
        Some(re) => re.replace_all(raw, "").into_owned(),
        None => raw.to_string(),
    }
}

fn strip_code_fences(s: &str) -> &str {
    let mut body = s;
    if body.starts_with("```")
        && let Some(newline) = body.find('\n')
    {
        body = &body[newline + 1..];
    }
    body.strip_suffix("```").map(str::trim_end).unwrap_or(body)
}

// =============================================================================
// Repair Passes
// =============================================================================

/// Each level applies a superset of the previous one's fixes
fn repair(s: &str, level: usize) -> String {
    let mut out = drop_trailing_commas(s);
    if level >= 3 {
        out = out
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .collect();
    }
    if level >= 2 {
        out = close_open_strings(&out);
    }
    out = close_open_brackets(&out);
    if level >= 3 {
        out = last_complete_value(&out).to_string();
    }
    out
}

/// Tracks string/escape state while scanning JSON text
#[derive(Default)]
struct Scanner {
    in_string: bool,
    escape: bool,
}

impl Scanner {
    /// Feed one char; returns true when it is structural (outside a string)
    fn structural(&mut self, ch: char) -> bool {
        if self.escape {
            self.escape = false;
            return false;
        }
        match ch {
            '\\' if self.in_string => {
                self.escape = true;
                false
            }
            '"' => {
                self.in_string = !self.in_string;
                false
            }
            _ => !self.in_string,
        }
    }
}

fn drop_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|&(i, &ch)| {
            if ch != ',' {
                return true;
            }
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            !matches!(next, Some(']') | Some('}'))
        })
        .map(|(_, &ch)| ch)
        .collect()
}

fn close_open_brackets(s: &str) -> String {
    let mut scanner = Scanner::default();
    let mut stack = Vec::new();

    for ch in s.chars() {
        if !scanner.structural(ch) {
            continue;
        }
        match ch {
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = s.to_string();
    if scanner.in_string {
        out.push('"');
    }
    out.extend(stack.into_iter().rev());
    out
}

/// Close strings left open at a line break or at end of input
fn close_open_strings(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut in_string = false;
    let mut escape = false;

    for ch in s.chars() {
        if escape {
            escape = false;
        } else if ch == '\\' && in_string {
            escape = true;
        } else if ch == '"' {
            in_string = !in_string;
        } else if in_string && matches!(ch, '\n' | '\r') {
            out.push('"');
            in_string = false;
        }
        out.push(ch);
    }

    if in_string {
        out.push('"');
    }
    out
}

/// Cut at the end of the last top-level value that closed cleanly
fn last_complete_value(s: &str) -> &str {
    let mut scanner = Scanner::default();
    let mut depth: i32 = 0;
    let mut end = 0;

    for (i, ch) in s.char_indices() {
        if !scanner.structural(ch) {
            continue;
        }
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth == 0 {
                    end = i + 1;
                }
            }
            _ => {}
        }
    }

    if end > 0 { &s[..end] } else { s }
}

/// First balanced object or array embedded in prose
fn embedded_json(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let mut scanner = Scanner::default();
    let mut depth: i32 = 0;

    for (i, ch) in s[start..].char_indices() {
        if !scanner.structural(ch) {
            continue;
        }
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let (_, repaired) = parse_or_repair(r#"{"files": ["README.md"]}"#).unwrap();
        assert!(!repaired);
    }

    #[test]
    fn test_strip_code_fences() {
        let value = extract_json_from_response("```json\n{\"summary\": \"A tool\"}\n```").unwrap();
        assert_eq!(value["summary"], "A tool");
    }

    #[test]
    fn test_strip_think_block() {
        let input = "<think>\nThe repo has a Cargo.toml, {maybe}...\n</think>\n{\"files\": [\"Cargo.toml\"]}";
        let (value, repaired) = parse_or_repair(input).unwrap();
        assert!(!repaired);
        assert_eq!(value["files"][0], "Cargo.toml");
    }

    #[test]
    fn test_unclosed_think_block_is_not_json() {
        assert!(extract_json_from_response("<think>still reasoning {\"a\": 1}").is_err());
    }

    #[test]
    fn test_fix_trailing_comma() {
        let (value, repaired) = parse_or_repair(r#"{"files": ["a.rs", "b.rs",]}"#).unwrap();
        assert!(repaired);
        assert_eq!(value["files"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_close_truncated_output() {
        let (value, repaired) =
            parse_or_repair(r#"{"sections": [{"title": "Overview", "keyFiles": ["README.md"]"#)
                .unwrap();
        assert!(repaired);
        assert_eq!(value["sections"][0]["title"], "Overview");
    }

    #[test]
    fn test_extract_from_prose() {
        let input = "Here are the files:\n{\"files\": [\"src/main.rs\"]}\nLet me know!";
        let (value, repaired) = parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["files"][0], "src/main.rs");
    }

    #[test]
    fn test_garbage_is_error() {
        let err = extract_json_from_response("no structured output at all").unwrap_err();
        assert!(err.to_string().contains("Failed to parse or repair JSON"));
    }
}
