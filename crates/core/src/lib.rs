//! Shared types for the signsort file organizer.
//!
//! This crate holds everything the engine and CLI agree on: the engine
//! configuration, the parsed-filename metadata record, and the lifecycle
//! event vocabulary emitted by the watch pipeline. It contains no async
//! code and no filesystem watching.

pub mod config;
pub mod error;
pub mod event;
pub mod metadata;

pub use config::EngineConfig;
pub use error::ConfigError;
pub use event::{EventKind, FailReason, PipelineEvent, SkipReason};
pub use metadata::FileMetadata;
