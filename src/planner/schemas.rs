//! JSON Schemas for Stage Outputs
//!
//! Each schema is sent to the gateway as guidance; the matching `*Output`
//! type is what the stage actually accepts.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::types::Section;

/// Schema provider for planning stages
pub struct StageSchemas;

impl StageSchemas {
    /// Stage 1: bounded list of repository-relative paths
    pub fn file_list(max_files: usize) -> Value {
        json!({
            "type": "object",
            "description": "Files that best explain what the repository does",
            "required": ["files"],
            "additionalProperties": false,
            "properties": {
                "files": {
                    "type": "array",
                    "description": "Repository-relative paths copied from the file list",
                    "maxItems": max_files,
                    "items": {"type": "string", "minLength": 1}
                }
            }
        })
    }

    /// Stage 2: single summary field
    pub fn summary() -> Value {
        json!({
            "type": "object",
            "description": "Short overview of the project",
            "required": ["summary"],
            "additionalProperties": false,
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "Two to four sentences describing the project",
                    "minLength": 1
                }
            }
        })
    }

    /// Stage 3: ordered documentation sections
    pub fn sections() -> Value {
        json!({
            "type": "object",
            "description": "Documentation wiki structure for the repository",
            "required": ["sections"],
            "additionalProperties": false,
            "properties": {
                "sections": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "required": ["title", "keyFiles", "tinySummary"],
                        "additionalProperties": false,
                        "properties": {
                            "title": {"type": "string", "minLength": 1},
                            "keyFiles": {
                                "type": "array",
                                "description": "Paths the section is written from",
                                "items": {"type": "string"}
                            },
                            "tinySummary": {
                                "type": "string",
                                "description": "One sentence on what the section covers",
                                "minLength": 1
                            }
                        }
                    }
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileListOutput {
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryOutput {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SectionsOutput {
    pub sections: Vec<Section>,
}
