//! Parley core: communication-competence evaluation for code-generation
//! LLMs.
//!
//! A run classifies each model reply as a clarifying question or a direct
//! code attempt, then scores clarifying questions through a multi-judge
//! jury. Records flow through one at a time: there is no shared mutable
//! state beyond the immutable [`config::RunConfig`] loaded at startup.

pub mod classify;
pub mod config;
pub mod errors;
pub mod judge;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod record;

pub use config::{load_config, RunConfig};
pub use pipeline::{Pipeline, PipelineSummary, UNBOUNDED};
pub use record::{FinalScore, JudgeVote, Label, Record};
