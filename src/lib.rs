//! wikiplan - Documentation Planning for Repositories
//!
//! Turns a repository checkout into a documentation plan: the files worth
//! reading, a short project summary and an ordered list of wiki sections.
//!
//! ## Core Features
//!
//! - **Three-Stage Pipeline**: select files, summarize, plan sections
//! - **Deterministic Fallbacks**: file selection and summary survive gateway outages
//! - **Content Budgeting**: per-file and total character ceilings, tree compression
//! - **OpenAI-Compatible Gateway**: any vLLM style endpoint, per-stage profiles
//! - **Service Handler**: bearer-authorized `POST /docs-gen` request handling
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use wikiplan::{GatewayConfig, PlanningPipeline, PromptStore, RepoScanner, create_gateway};
//!
//! let repo = RepoScanner::new(".").describe()?;
//! let gateway = create_gateway(&GatewayConfig::default())?;
//! let pipeline = PlanningPipeline::new(gateway, Arc::new(PromptStore::builtin()));
//! let result = pipeline.run(&repo).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: gateway abstraction, prompts, budgeting, JSON repair
//! - [`planner`]: the pipeline stages and their fallbacks
//! - [`scanner`]: checkout walking and tree rendering
//! - [`service`]: request validation and authorization
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod planner;
pub mod scanner;
pub mod service;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};

pub use types::error::{ErrorCategory, LlmError, PlanError, Result};
pub use types::{
    BudgetConfig, BundleEntry, FileSelection, PlanningStage, RepositoryDescriptor, Section,
    SectionPlan, SourceFile, Summary,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use planner::{PlanSettings, PlanningPipeline, PlanningResult};
pub use scanner::RepoScanner;
pub use service::{DocsGenRequest, DocsGenService, ServiceResponse};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    ContentBudgeter, GatewayConfig, GenerationGateway, GenerationProfile, LlmResponse,
    PlanMetrics, PromptResolver, PromptStore, SharedGateway, StageProfiles, create_gateway,
};
